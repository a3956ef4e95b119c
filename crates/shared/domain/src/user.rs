//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{ROLE_ADMIN, ROLE_GUEST, ROLE_USER};

/// User roles enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "{}", ROLE_ADMIN),
            UserRole::User => write!(f, "{}", ROLE_USER),
        }
    }
}

/// Whether the account gives or receives donations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    Donor,
    Recipient,
}

impl std::fmt::Display for UserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserKind::Donor => write!(f, "donor"),
            UserKind::Recipient => write!(f, "recipient"),
        }
    }
}

/// Role as seen by the rest of the application: guests, admins, or the
/// user's own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerRole {
    Guest,
    Admin,
    Member(UserKind),
}

impl std::fmt::Display for ViewerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewerRole::Guest => write!(f, "{}", ROLE_GUEST),
            ViewerRole::Admin => write!(f, "{}", ROLE_ADMIN),
            ViewerRole::Member(kind) => write!(f, "{}", kind),
        }
    }
}

/// User domain entity
///
/// `role` is a cache: the session layer overwrites it from the admin
/// allow-list every time the record is loaded or persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: UserKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub is_verified: bool,
    #[serde(default)]
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Check if the cached role is admin
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Case-insensitive email comparison
    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }

    /// Stamp a successful sign-in
    pub fn touch_login(&mut self) {
        self.last_login = Some(Utc::now());
    }

    /// Merge a partial profile update into this record
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = normalize_email(&email);
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(city) = update.city {
            self.city = Some(city);
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
    }
}

/// Trim and lowercase an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registration data transfer object
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub city: String,
    pub user_kind: UserKind,
}

impl RegisterData {
    /// Display name built from first and last name
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// Partial profile update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub kind: Option<UserKind>,
    pub city: Option<String>,
    pub phone: Option<String>,
}

/// Outcome of an authentication call
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl AuthResponse {
    pub fn success(message: impl Into<String>, user: Option<User>) -> Self {
        Self {
            success: true,
            message: message.into(),
            user,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            user: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User {
            id: "7".to_string(),
            email: "sam@example.com".to_string(),
            name: "Sam".to_string(),
            kind: UserKind::Donor,
            city: None,
            phone: None,
            is_verified: false,
            role: UserRole::User,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn test_serialized_layout_uses_browser_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["type"], "donor");
        assert_eq!(json["isVerified"], false);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("city").is_none());
    }

    #[test]
    fn test_missing_role_defaults_to_user() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json.as_object_mut().unwrap().remove("role");
        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.role, UserRole::User);
    }

    #[test]
    fn test_apply_normalizes_email() {
        let mut user = sample();
        user.apply(ProfileUpdate {
            email: Some("  New@Example.COM ".to_string()),
            city: Some("Bursa".to_string()),
            ..Default::default()
        });
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.city.as_deref(), Some("Bursa"));
        assert_eq!(user.name, "Sam");
    }

    #[test]
    fn test_viewer_role_display() {
        assert_eq!(ViewerRole::Guest.to_string(), "guest");
        assert_eq!(ViewerRole::Admin.to_string(), "admin");
        assert_eq!(ViewerRole::Member(UserKind::Recipient).to_string(), "recipient");
    }
}
