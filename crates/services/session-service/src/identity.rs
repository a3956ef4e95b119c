//! Identities synthesized for first-time sign-ins.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use domain::{
    User, UserKind, UserRole, DEMO_DISPLAY_NAME, DEMO_EMAIL, SYNTHETIC_CITIES,
    SYNTHETIC_PHONE_PREFIX,
};

/// Build a new identity for an email nobody has signed in with yet.
///
/// The demo account gets a fixed name and starts unverified; everyone else
/// is verified. Kind, city and phone are random.
pub fn synthesize_identity(email: &str) -> User {
    let mut rng = rand::rng();
    let is_demo = email == DEMO_EMAIL;
    let now = Utc::now();

    let name = if is_demo {
        DEMO_DISPLAY_NAME.to_string()
    } else {
        display_name_from_email(email)
    };

    let kind = if rng.random_bool(0.5) {
        UserKind::Donor
    } else {
        UserKind::Recipient
    };

    let city = SYNTHETIC_CITIES[rng.random_range(0..SYNTHETIC_CITIES.len())];
    let phone = format!(
        "{} {} {}",
        SYNTHETIC_PHONE_PREFIX,
        rng.random_range(100..1000),
        rng.random_range(10..100)
    );

    User {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        name,
        kind,
        city: Some(city.to_string()),
        phone: Some(phone),
        is_verified: !is_demo,
        role: UserRole::User,
        created_at: now,
        last_login: Some(now),
    }
}

/// Local part of the email with its first letter capitalized
pub fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name_from_email("zeynep.k@x.com"), "Zeynep.k");
        assert_eq!(display_name_from_email("@x.com"), "");
    }

    #[test]
    fn test_demo_identity_is_unverified() {
        let demo = synthesize_identity(DEMO_EMAIL);
        assert_eq!(demo.name, DEMO_DISPLAY_NAME);
        assert!(!demo.is_verified);

        let other = synthesize_identity("mehmet@x.com");
        assert_eq!(other.name, "Mehmet");
        assert!(other.is_verified);
    }

    #[test]
    fn test_synthetic_attributes_in_range() {
        for _ in 0..20 {
            let user = synthesize_identity("a@b.co");
            let city = user.city.unwrap();
            assert!(SYNTHETIC_CITIES.contains(&city.as_str()));

            let phone = user.phone.unwrap();
            let parts: Vec<&str> = phone.split(' ').collect();
            assert_eq!(parts[0], SYNTHETIC_PHONE_PREFIX);
            assert_eq!(parts[1].len(), 3);
            assert_eq!(parts[2].len(), 2);
        }
    }
}
