//! Domain-level constants.
//!
//! These constants define business rules, seeded identities and the
//! persisted storage layout.

// =============================================================================
// User Roles
// =============================================================================

/// Default role assigned to new users
pub const ROLE_USER: &str = "user";

/// Administrator role with elevated privileges
pub const ROLE_ADMIN: &str = "admin";

/// Role reported when nobody is signed in
pub const ROLE_GUEST: &str = "guest";

/// Email addresses compiled into the admin allow-list
pub const DEFAULT_ADMIN_EMAILS: &[&str] = &[
    "admin@cocukurunleri.com",
    "admin@example.com",
    "demo@email.com",
    "admin@test.com",
    "superadmin@cocukurunleri.com",
];

// =============================================================================
// Identities
// =============================================================================

/// Seeded demo account
pub const DEMO_EMAIL: &str = "demo@email.com";

/// Display name forced onto the demo account when it is synthesized
pub const DEMO_DISPLAY_NAME: &str = "Demo Admin User";

/// Cities handed out to synthesized identities
pub const SYNTHETIC_CITIES: &[&str] = &["Istanbul", "Ankara", "Izmir", "Bursa", "Antalya"];

/// Phone prefix for synthesized identities
pub const SYNTHETIC_PHONE_PREFIX: &str = "0555";

// =============================================================================
// Catalog
// =============================================================================

/// Donor id used when a listing is submitted without an identity
pub const PLACEHOLDER_DONOR_ID: &str = "current-user-id";

/// Donor name used when a listing is submitted without an identity
pub const PLACEHOLDER_DONOR_NAME: &str = "Current User";

/// Donor city used when a listing is submitted without an identity
pub const PLACEHOLDER_DONOR_CITY: &str = "Istanbul";

/// Number of listings returned by the "new arrivals" query
pub const NEW_PRODUCTS_LIMIT: usize = 10;

/// Prefix written into the notes of a rejected listing
pub const REJECTION_NOTE_PREFIX: &str = "Rejected: ";

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: u64 = 6;

/// Minimum product name length
pub const MIN_PRODUCT_NAME_LENGTH: u64 = 3;

/// Minimum product description length
pub const MIN_PRODUCT_DESCRIPTION_LENGTH: u64 = 20;

/// Maximum number of images per listing
pub const MAX_PRODUCT_IMAGES: u64 = 5;

// =============================================================================
// Storage layout
// =============================================================================

/// Key holding the serialized current user
pub const STORAGE_KEY_CURRENT_USER: &str = "currentUser";

/// Key holding the placeholder session token
pub const STORAGE_KEY_TOKEN: &str = "token";

/// Prefix of the placeholder session token
pub const TOKEN_PREFIX: &str = "mock-jwt-token-";
