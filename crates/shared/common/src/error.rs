//! Error type shared by the session and catalog services.
//!
//! Each error has a stable code for logs and a message safe to show in a
//! notification. Storage and internal details are logged, never shown.

use domain::DomainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// An action needs a signed-in identity
    #[error("Please sign in first")]
    Unauthorized,

    #[error("Resource not found")]
    NotFound,

    /// Uniqueness violation; holds the thing that collided
    #[error("{0} already exists")]
    Conflict(String),

    /// Broken form or listing rule, shown verbatim
    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Stored record is malformed")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage file unavailable")]
    Io(#[from] std::io::Error),

    #[error("Internal error")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::NotFound => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller can fix this by changing input
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AppError::Unauthorized
                | AppError::NotFound
                | AppError::Conflict(_)
                | AppError::Validation(_)
        )
    }

    /// Message for a notification. Anything not caused by the user is
    /// logged with its detail and replaced by a generic line.
    pub fn user_message(&self) -> String {
        if self.is_user_error() {
            return self.to_string();
        }
        tracing::error!(code = self.code(), detail = ?self, "Operation failed");
        match self {
            AppError::Storage(_) => "Your session could not be saved".to_string(),
            AppError::Serialization(_) => "Stored data could not be read".to_string(),
            AppError::Io(_) => "Stored data could not be accessed".to_string(),
            _ => "An internal error occurred".to_string(),
        }
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        AppError::Conflict(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        AppError::Storage(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::Validation(err.message())
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// `None` as `AppError::NotFound`
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::ProductStatus;

    #[test]
    fn test_domain_rules_become_validation_errors() {
        let err: AppError = DomainError::invalid_form("Passwords do not match").into();
        assert!(matches!(&err, AppError::Validation(msg) if msg == "Passwords do not match"));

        let err: AppError = ProductStatus::Approved
            .require(ProductStatus::Pending, "Only pending products can be edited.")
            .unwrap_err()
            .into();
        assert_eq!(err.user_message(), "Only pending products can be edited.");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_conflict_names_the_collision() {
        assert_eq!(AppError::conflict("Email").user_message(), "Email already exists");
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::internal("lock poisoned");
        assert!(!err.is_user_error());
        assert_eq!(err.user_message(), "An internal error occurred");
        assert_eq!(
            AppError::storage("disk full").user_message(),
            "Your session could not be saved"
        );
    }

    #[test]
    fn test_option_ext() {
        let missing: Option<u8> = None;
        assert!(matches!(missing.ok_or_not_found(), Err(AppError::NotFound)));
        assert_eq!(Some(3).ok_or_not_found().unwrap(), 3);
    }
}
