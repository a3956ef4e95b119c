//! Errors raised by domain rules, before any storage is involved.

use thiserror::Error;

use crate::product::ProductStatus;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A form field broke one of its rules. The text is shown as-is.
    #[error("{0}")]
    InvalidForm(String),

    /// The listing is not in the status an action needs
    #[error("{rule}")]
    WrongStatus {
        expected: ProductStatus,
        actual: ProductStatus,
        rule: &'static str,
    },

    /// The listing reached a final status and can no longer change
    #[error("This listing is closed ({}).", .0.label())]
    ListingClosed(ProductStatus),
}

impl DomainError {
    pub fn invalid_form(msg: impl Into<String>) -> Self {
        DomainError::InvalidForm(msg.into())
    }

    /// Message for a notification
    pub fn message(&self) -> String {
        self.to_string()
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
