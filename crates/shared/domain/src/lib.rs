//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Identities, listings, forms, settings blobs and the route model are shared
//! by the session service, the catalog service and the guards.

pub mod constants;
pub mod error;
pub mod forms;
pub mod product;
pub mod route;
pub mod settings;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use forms::{LoginForm, PasswordChangeForm, RegistrationForm};
pub use product::{
    AgeGroup, Donor, Product, ProductCategory, ProductCondition, ProductForm, ProductStatus,
    ProductUpdate, ShippingAddress,
};
pub use route::{Access, NavigationTarget, Route};
pub use settings::SettingsBlob;
pub use user::{
    normalize_email, AuthResponse, ProfileUpdate, RegisterData, User, UserKind, UserRole,
    ViewerRole,
};
