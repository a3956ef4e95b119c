//! Stream adapter over the current-identity watch channel.

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::watch;

use domain::User;

/// Yield the current identity, then every change until the service is dropped.
pub fn identity_changes(receiver: watch::Receiver<Option<User>>) -> BoxStream<'static, Option<User>> {
    stream::unfold((receiver, true), |(mut receiver, first)| async move {
        if !first && receiver.changed().await.is_err() {
            return None;
        }
        let value = receiver.borrow_and_update().clone();
        Some((value, (receiver, false)))
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::{UserKind, UserRole};

    fn user(email: &str) -> User {
        User {
            id: "1".to_string(),
            email: email.to_string(),
            name: "A".to_string(),
            kind: UserKind::Recipient,
            city: None,
            phone: None,
            is_verified: true,
            role: UserRole::User,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[tokio::test]
    async fn test_yields_current_then_changes() {
        let (tx, rx) = watch::channel(None);
        let mut changes = identity_changes(rx);

        assert_eq!(changes.next().await, Some(None));

        tx.send_replace(Some(user("a@x.com")));
        let next = changes.next().await.flatten().unwrap();
        assert_eq!(next.email, "a@x.com");

        tx.send_replace(None);
        assert_eq!(changes.next().await, Some(None));

        drop(tx);
        assert_eq!(changes.next().await, None);
    }
}
