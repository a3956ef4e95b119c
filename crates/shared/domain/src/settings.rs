//! Preference blobs persisted by settings screens.
//!
//! Each blob owns a fixed storage key and is read back on load; a missing or
//! unreadable blob falls back to `Default`.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A settings blob with a fixed storage key.
pub trait SettingsBlob: Serialize + DeserializeOwned + Default + Send + Sync {
    const STORAGE_KEY: &'static str;
}

/// Moderation settings edited on the admin panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSettings {
    pub auto_approve: bool,
    pub max_daily_donations: u32,
    pub email_notifications: bool,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            auto_approve: false,
            max_daily_donations: 3,
            email_notifications: true,
        }
    }
}

impl SettingsBlob for AdminSettings {
    const STORAGE_KEY: &'static str = "admin-settings";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    pub two_factor_enabled: bool,
    pub email_alerts: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            two_factor_enabled: false,
            email_alerts: true,
        }
    }
}

impl SettingsBlob for SecuritySettings {
    const STORAGE_KEY: &'static str = "security-settings";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub new_messages: bool,
    pub donation_status: bool,
    pub platform_announcements: bool,
    pub weekly_report: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            new_messages: true,
            donation_status: true,
            platform_announcements: false,
            weekly_report: true,
        }
    }
}

impl SettingsBlob for NotificationPreferences {
    const STORAGE_KEY: &'static str = "notification-preferences";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySettings {
    pub profile_visible: bool,
    pub donation_history_public: bool,
    pub search_engine_index: bool,
    /// Retention window in days
    pub data_retention: String,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            profile_visible: true,
            donation_history_public: true,
            search_engine_index: false,
            data_retention: "90".to_string(),
        }
    }
}

impl SettingsBlob for PrivacySettings {
    const STORAGE_KEY: &'static str = "privacy-settings";
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactMethod {
    #[default]
    Platform,
    Phone,
    Email,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationSettings {
    pub preferred_method: ContactMethod,
    pub allow_marketing: bool,
}

impl SettingsBlob for CommunicationSettings {
    const STORAGE_KEY: &'static str = "communication-settings";
}
