//! Product listing entity and its enumerations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::constants::{
    MAX_PRODUCT_IMAGES, MIN_PRODUCT_DESCRIPTION_LENGTH, MIN_PRODUCT_NAME_LENGTH,
    PLACEHOLDER_DONOR_CITY, PLACEHOLDER_DONOR_ID, PLACEHOLDER_DONOR_NAME,
};
use crate::error::{DomainError, DomainResult};
use crate::user::User;

/// Listing category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Toys,
    Clothing,
    Books,
    Shoes,
    School,
    Furniture,
    Electronics,
    Other,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 8] = [
        ProductCategory::Toys,
        ProductCategory::Clothing,
        ProductCategory::Books,
        ProductCategory::Shoes,
        ProductCategory::School,
        ProductCategory::Furniture,
        ProductCategory::Electronics,
        ProductCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProductCategory::Toys => "Toys",
            ProductCategory::Clothing => "Clothing",
            ProductCategory::Books => "Books",
            ProductCategory::Shoes => "Shoes",
            ProductCategory::School => "School Supplies",
            ProductCategory::Furniture => "Furniture",
            ProductCategory::Electronics => "Electronics",
            ProductCategory::Other => "Other",
        }
    }
}

/// Physical condition, ordered from most to least usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCondition {
    New,
    LikeNew,
    Good,
    Fair,
    NeedsRepair,
}

impl ProductCondition {
    /// Usability rank, 1 is best
    pub fn rank(&self) -> u8 {
        match self {
            ProductCondition::New => 1,
            ProductCondition::LikeNew => 2,
            ProductCondition::Good => 3,
            ProductCondition::Fair => 4,
            ProductCondition::NeedsRepair => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductCondition::New => "New with tags",
            ProductCondition::LikeNew => "Like new",
            ProductCondition::Good => "Good",
            ProductCondition::Fair => "Fair",
            ProductCondition::NeedsRepair => "Needs repair",
        }
    }
}

/// Target age band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Baby,
    Toddler,
    Preschool,
    SchoolAge,
    Teen,
    AllAges,
}

impl AgeGroup {
    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Baby => "0-2 years",
            AgeGroup::Toddler => "2-4 years",
            AgeGroup::Preschool => "4-6 years",
            AgeGroup::SchoolAge => "6-12 years",
            AgeGroup::Teen => "12+ years",
            AgeGroup::AllAges => "All ages",
        }
    }
}

/// Listing lifecycle.
///
/// `Pending -> Approved -> Reserved -> Shipped -> Delivered`, with
/// `Pending -> Rejected` as a terminal branch. Nothing in the catalog
/// enforces these transitions; the listing workflow checks the few rules
/// screens care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Pending,
    Approved,
    Reserved,
    Shipped,
    Delivered,
    Rejected,
}

impl ProductStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProductStatus::Pending => "Pending approval",
            ProductStatus::Approved => "Published",
            ProductStatus::Reserved => "Reserved",
            ProductStatus::Shipped => "Shipped",
            ProductStatus::Delivered => "Delivered",
            ProductStatus::Rejected => "Rejected",
        }
    }

    /// Donors may only edit or withdraw listings still awaiting review
    pub fn is_editable(&self) -> bool {
        matches!(self, ProductStatus::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProductStatus::Delivered | ProductStatus::Rejected)
    }

    /// Ok when the listing is in `expected`, otherwise `rule` as the error
    pub fn require(self, expected: ProductStatus, rule: &'static str) -> DomainResult<()> {
        if self == expected {
            Ok(())
        } else {
            Err(DomainError::WrongStatus {
                expected,
                actual: self,
                rule,
            })
        }
    }

    /// Ok while the donor may still edit or withdraw the listing
    pub fn require_editable(self, rule: &'static str) -> DomainResult<()> {
        if self.is_editable() {
            Ok(())
        } else {
            Err(DomainError::WrongStatus {
                expected: ProductStatus::Pending,
                actual: self,
                rule,
            })
        }
    }

    /// Ok unless the listing reached a final status
    pub fn require_open(self) -> DomainResult<()> {
        if self.is_terminal() {
            Err(DomainError::ListingClosed(self))
        } else {
            Ok(())
        }
    }
}

/// Donor attribution carried by a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donor {
    pub id: String,
    pub name: String,
    pub city: String,
}

impl Donor {
    /// Attribution used when no identity is wired into a submission
    pub fn placeholder() -> Self {
        Self {
            id: PLACEHOLDER_DONOR_ID.to_string(),
            name: PLACEHOLDER_DONOR_NAME.to_string(),
            city: PLACEHOLDER_DONOR_CITY.to_string(),
        }
    }
}

impl From<&User> for Donor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            city: user
                .city
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_DONOR_CITY.to_string()),
        }
    }
}

/// Where a reserved donation is sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub district: String,
    pub phone: String,
    pub email: String,
}

/// Donation listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: ProductCategory,
    pub condition: ProductCondition,
    pub age_group: AgeGroup,
    pub images: Vec<String>,
    pub donor_id: String,
    pub donor_name: String,
    pub donor_city: String,
    pub status: ProductStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    pub is_urgent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Product {
    /// Build a freshly submitted listing. Status is always `Pending`.
    pub fn submitted(id: String, form: ProductForm) -> Self {
        let now = Utc::now();
        let donor = form.donor.unwrap_or_else(Donor::placeholder);
        Self {
            id,
            name: form.name,
            description: form.description,
            category: form.category,
            condition: form.condition,
            age_group: form.age_group,
            images: form.images,
            donor_id: donor.id,
            donor_name: donor.name,
            donor_city: donor.city,
            status: ProductStatus::Pending,
            recipient_id: None,
            created_at: now,
            updated_at: now,
            approved_at: None,
            shipping_address: None,
            tracking_number: None,
            is_urgent: form.is_urgent,
            notes: form.notes,
        }
    }

    /// Shallow-merge a partial update and stamp `updated_at`
    pub fn apply(&mut self, update: ProductUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(condition) = update.condition {
            self.condition = condition;
        }
        if let Some(age_group) = update.age_group {
            self.age_group = age_group;
        }
        if let Some(images) = update.images {
            self.images = images;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(recipient_id) = update.recipient_id {
            self.recipient_id = recipient_id;
        }
        if let Some(approved_at) = update.approved_at {
            self.approved_at = Some(approved_at);
        }
        if let Some(address) = update.shipping_address {
            self.shipping_address = Some(address);
        }
        if let Some(tracking_number) = update.tracking_number {
            self.tracking_number = Some(tracking_number);
        }
        if let Some(is_urgent) = update.is_urgent {
            self.is_urgent = is_urgent;
        }
        if let Some(notes) = update.notes {
            self.notes = Some(notes);
        }
        self.updated_at = Utc::now();
    }

    /// Case-insensitive match against name or description
    pub fn matches_text(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.name.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
    }
}

/// Listing submission form.
///
/// `status` is deliberately absent: submissions always start pending.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductForm {
    #[validate(length(
        min = MIN_PRODUCT_NAME_LENGTH,
        code = "name_length",
        message = "Product name must be at least 3 characters."
    ))]
    pub name: String,
    #[validate(length(
        min = MIN_PRODUCT_DESCRIPTION_LENGTH,
        code = "description_length",
        message = "Please write a more detailed description (at least 20 characters)."
    ))]
    pub description: String,
    pub category: ProductCategory,
    pub condition: ProductCondition,
    pub age_group: AgeGroup,
    #[validate(
        length(
            max = MAX_PRODUCT_IMAGES,
            code = "too_many_images",
            message = "You can upload at most 5 photos."
        ),
        custom(function = "non_blank_images")
    )]
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_urgent: bool,
    pub notes: Option<String>,
    #[serde(default)]
    pub donor: Option<Donor>,
    #[validate(custom(function = "crate::forms::accepted_terms"))]
    #[serde(default)]
    pub accept_terms: bool,
}

/// Order in which product form rules are reported
pub const PRODUCT_FORM_RULES: &[(&str, &str)] = &[
    ("accept_terms", "terms"),
    ("name", "name_length"),
    ("description", "description_length"),
    ("images", "too_many_images"),
    ("images", "blank_image"),
];

/// Partial listing update (shallow merge).
///
/// `recipient_id` is doubly optional so an update can clear it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ProductCategory>,
    pub condition: Option<ProductCondition>,
    pub age_group: Option<AgeGroup>,
    pub images: Option<Vec<String>>,
    pub status: Option<ProductStatus>,
    pub recipient_id: Option<Option<String>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub shipping_address: Option<ShippingAddress>,
    pub tracking_number: Option<String>,
    pub is_urgent: Option<bool>,
    pub notes: Option<String>,
}

impl ProductUpdate {
    pub fn status(status: ProductStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

/// Reject image references that are blank
pub fn non_blank_images(images: &[String]) -> Result<(), ValidationError> {
    if images.iter().any(|image| image.trim().is_empty()) {
        let mut error = ValidationError::new("blank_image");
        error.message = Some("Image references must not be empty.".into());
        return Err(error);
    }
    Ok(())
}
