//! Listing repository backed by an in-memory, newest-first list.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

use common::{AppError, AppResult};
use domain::{AgeGroup, Product, ProductCategory, ProductCondition, ProductStatus, ProductUpdate};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Product repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every listing, in collection order
    async fn list(&self) -> AppResult<Vec<Product>>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Product>>;

    /// Insert at the front of the collection
    async fn insert_first(&self, product: Product) -> AppResult<Product>;

    /// Merge `update` into the listing. Fails with `NotFound` when absent.
    async fn update(&self, id: &str, update: ProductUpdate) -> AppResult<Product>;

    /// Remove a listing. Returns whether anything was removed.
    async fn delete(&self, id: &str) -> AppResult<bool>;
}

/// Concrete in-memory implementation of ProductRepository
#[derive(Debug, Default)]
pub struct ProductStore {
    products: RwLock<Vec<Product>>,
}

impl ProductStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the demo listings
    pub fn seeded() -> Self {
        Self::with_products(seed_products())
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
        }
    }
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn list(&self) -> AppResult<Vec<Product>> {
        Ok(self.products.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_first(&self, product: Product) -> AppResult<Product> {
        let mut products = self.products.write().await;
        if products.iter().any(|p| p.id == product.id) {
            return Err(AppError::conflict("Product"));
        }
        products.insert(0, product.clone());
        Ok(product)
    }

    async fn update(&self, id: &str, update: ProductUpdate) -> AppResult<Product> {
        let mut products = self.products.write().await;
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AppError::NotFound)?;
        product.apply(update);
        Ok(product.clone())
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }
}

fn seed_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_else(Utc::now)
}

fn seed_products() -> Vec<Product> {
    vec![
        Product {
            id: "1".to_string(),
            name: "LEGO Classic Box".to_string(),
            description: "New and unopened in its box. A creative play set for children."
                .to_string(),
            category: ProductCategory::Toys,
            condition: ProductCondition::New,
            age_group: AgeGroup::SchoolAge,
            images: vec![
                "https://images.unsplash.com/photo-1594787318287-7871e8b9c0f5?w=400".to_string(),
            ],
            donor_id: "user1".to_string(),
            donor_name: "Ahmet Yilmaz".to_string(),
            donor_city: "Istanbul".to_string(),
            status: ProductStatus::Approved,
            recipient_id: None,
            created_at: seed_date(2024, 1, 15),
            updated_at: seed_date(2024, 1, 15),
            approved_at: Some(seed_date(2024, 1, 16)),
            shipping_address: None,
            tracking_number: None,
            is_urgent: false,
            notes: None,
        },
        Product {
            id: "2".to_string(),
            name: "Kids' Bicycle".to_string(),
            description: "20 inch wheels, suits ages 6-9. Only the tyres need replacing."
                .to_string(),
            category: ProductCategory::Other,
            condition: ProductCondition::NeedsRepair,
            age_group: AgeGroup::SchoolAge,
            images: vec![
                "https://images.unsplash.com/photo-1576435728678-68d0fbf94e91?w=400".to_string(),
            ],
            donor_id: "user2".to_string(),
            donor_name: "Ayse Kaya".to_string(),
            donor_city: "Ankara".to_string(),
            status: ProductStatus::Approved,
            recipient_id: None,
            created_at: seed_date(2024, 1, 10),
            updated_at: seed_date(2024, 1, 10),
            approved_at: Some(seed_date(2024, 1, 12)),
            shipping_address: None,
            tracking_number: None,
            is_urgent: true,
            notes: None,
        },
        Product {
            id: "3".to_string(),
            name: "Children's Book Set".to_string(),
            description: "Ten illustrated story books. All in good condition.".to_string(),
            category: ProductCategory::Books,
            condition: ProductCondition::Good,
            age_group: AgeGroup::Preschool,
            images: vec![
                "https://images.unsplash.com/photo-1544716278-ca5e3f4abd8c?w=400".to_string(),
            ],
            donor_id: "user3".to_string(),
            donor_name: "Mehmet Demir".to_string(),
            donor_city: "Izmir".to_string(),
            status: ProductStatus::Pending,
            recipient_id: None,
            created_at: seed_date(2024, 1, 20),
            updated_at: seed_date(2024, 1, 20),
            approved_at: None,
            shipping_address: None,
            tracking_number: None,
            is_urgent: false,
            notes: None,
        },
    ]
}
