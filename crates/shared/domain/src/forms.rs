//! Client-side form validation.
//!
//! Screens validate these forms before calling a service, so validation
//! failures never reach the session or catalog layer. Each form declares the
//! order its rules are reported in; only the first violation is surfaced.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::constants::MIN_PASSWORD_LENGTH;
use crate::error::{DomainError, DomainResult};
use crate::user::{RegisterData, UserKind};

/// Anything, an `@`, anything, a dot, anything. No whitespace.
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Fails on empty or whitespace-only input
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("Please fill in all required fields.".into());
        return Err(error);
    }
    Ok(())
}

/// Fails unless the terms checkbox was ticked
pub fn accepted_terms(accepted: &bool) -> Result<(), ValidationError> {
    if !*accepted {
        let mut error = ValidationError::new("terms");
        error.message = Some("You must accept the terms of use.".into());
        return Err(error);
    }
    Ok(())
}

/// Sign-in form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(
        custom(function = "not_blank"),
        regex(path = *EMAIL_PATTERN, code = "email", message = "Please enter a valid email address.")
    )]
    pub email: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Order in which login rules are reported
pub const LOGIN_FORM_RULES: &[(&str, &str)] = &[
    ("email", "required"),
    ("password", "required"),
    ("email", "email"),
];

/// Registration form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegistrationForm {
    #[validate(custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(
        custom(function = "not_blank"),
        regex(path = *EMAIL_PATTERN, code = "email", message = "Please enter a valid email address.")
    )]
    pub email: String,
    #[validate(
        custom(function = "not_blank"),
        length(
            min = MIN_PASSWORD_LENGTH,
            code = "password_length",
            message = "Password must be at least 6 characters."
        )
    )]
    pub password: String,
    #[validate(must_match(
        other = "password",
        code = "password_mismatch",
        message = "Passwords do not match!"
    ))]
    pub confirm_password: String,
    #[validate(custom(function = "not_blank"))]
    pub phone: String,
    #[validate(custom(function = "not_blank"))]
    pub city: String,
    pub user_kind: UserKind,
    #[validate(custom(function = "accepted_terms"))]
    #[serde(default)]
    pub accept_terms: bool,
}

/// Order in which registration rules are reported
pub const REGISTRATION_FORM_RULES: &[(&str, &str)] = &[
    ("first_name", "required"),
    ("last_name", "required"),
    ("email", "required"),
    ("password", "required"),
    ("phone", "required"),
    ("city", "required"),
    ("email", "email"),
    ("password", "password_length"),
    ("confirm_password", "password_mismatch"),
    ("accept_terms", "terms"),
];

impl RegistrationForm {
    /// Validate and convert into the payload the session service accepts
    pub fn into_register_data(self) -> DomainResult<RegisterData> {
        check(&self, REGISTRATION_FORM_RULES)?;
        Ok(RegisterData {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: self.password,
            phone: self.phone,
            city: self.city,
            user_kind: self.user_kind,
        })
    }
}

/// Password change form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordChangeForm {
    #[validate(custom(function = "not_blank"))]
    pub current_password: String,
    #[validate(length(
        min = MIN_PASSWORD_LENGTH,
        code = "password_length",
        message = "Password must be at least 6 characters!"
    ))]
    pub new_password: String,
    #[validate(must_match(
        other = "new_password",
        code = "password_mismatch",
        message = "New passwords do not match!"
    ))]
    pub confirm_password: String,
}

/// Order in which password change rules are reported
pub const PASSWORD_CHANGE_RULES: &[(&str, &str)] = &[
    ("current_password", "required"),
    ("confirm_password", "password_mismatch"),
    ("new_password", "password_length"),
];

/// Run a form's validators and report the first violated rule.
pub fn check<T: Validate>(form: &T, rules: &[(&str, &str)]) -> DomainResult<()> {
    match form.validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(DomainError::invalid_form(first_violation(&errors, rules))),
    }
}

/// Pick the message of the first rule in `rules` that failed, falling back
/// to any reported error.
pub fn first_violation(errors: &ValidationErrors, rules: &[(&str, &str)]) -> String {
    let fields = errors.field_errors();

    let ordered = rules.iter().find_map(|(field, code)| {
        fields
            .get(*field)
            .and_then(|list| list.iter().find(|error| error.code == *code))
    });

    ordered
        .or_else(|| fields.values().flat_map(|list| list.iter()).next())
        .map(|error| {
            error
                .message
                .as_ref()
                .map(|msg| msg.to_string())
                .unwrap_or_else(|| error.code.to_string())
        })
        .unwrap_or_else(|| "Validation failed".to_string())
}
