//! Identity directory: every user the process knows about.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

use common::{AppError, AppResult};
use domain::{normalize_email, User, UserKind, UserRole, DEMO_DISPLAY_NAME, DEMO_EMAIL};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User directory trait for dependency injection.
///
/// Emails are compared case-insensitively and are unique.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a user by email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find a user by ID
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;

    /// Append a new user. Fails with `Conflict` if the email is taken.
    async fn insert(&self, user: User) -> AppResult<User>;

    /// Replace the record with the same ID
    async fn update(&self, user: User) -> AppResult<User>;

    /// Snapshot of all users in insertion order
    async fn list(&self) -> AppResult<Vec<User>>;
}

/// Concrete in-memory implementation of UserDirectory
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: RwLock<Vec<User>>,
}

impl InMemoryDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory holding the three demo accounts
    pub fn seeded() -> Self {
        Self {
            users: RwLock::new(seed_users()),
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = normalize_email(email);
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.has_email(&email)).cloned())
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, mut user: User) -> AppResult<User> {
        user.email = normalize_email(&user.email);

        let mut users = self.users.write().await;
        if users.iter().any(|u| u.has_email(&user.email)) {
            return Err(AppError::conflict("Email"));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, mut user: User) -> AppResult<User> {
        user.email = normalize_email(&user.email);

        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|u| u.id != user.id && u.has_email(&user.email))
        {
            return Err(AppError::conflict("Email"));
        }

        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(AppError::NotFound)?;
        *slot = user.clone();
        Ok(user)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }
}

fn seed_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_else(Utc::now)
}

fn seed_users() -> Vec<User> {
    let now = Utc::now();
    vec![
        User {
            id: "1".to_string(),
            email: DEMO_EMAIL.to_string(),
            name: DEMO_DISPLAY_NAME.to_string(),
            kind: UserKind::Donor,
            city: Some("Istanbul".to_string()),
            phone: Some("0555 123 45 67".to_string()),
            is_verified: true,
            role: UserRole::Admin,
            created_at: seed_date(2024, 1, 1),
            last_login: Some(now),
        },
        User {
            id: "2".to_string(),
            email: "admin@cocukurunleri.com".to_string(),
            name: "System Admin".to_string(),
            kind: UserKind::Donor,
            city: Some("Ankara".to_string()),
            phone: Some("0555 111 22 33".to_string()),
            is_verified: true,
            role: UserRole::Admin,
            created_at: seed_date(2024, 1, 1),
            last_login: Some(now),
        },
        User {
            id: "3".to_string(),
            email: "ahmet@ornek.com".to_string(),
            name: "Ahmet Yilmaz".to_string(),
            kind: UserKind::Donor,
            city: Some("Izmir".to_string()),
            phone: Some("0555 222 33 44".to_string()),
            is_verified: true,
            role: UserRole::User,
            created_at: seed_date(2024, 1, 5),
            last_login: Some(seed_date(2024, 1, 15)),
        },
    ]
}
