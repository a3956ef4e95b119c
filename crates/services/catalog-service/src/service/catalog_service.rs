//! Catalog service - Listing reads, filters and mutations.
//!
//! Each operation resolves after a fixed simulated delay. Mutations are
//! applied before the delay, so sequential callers observe them in order.
//! Status transitions are not enforced here; see `ListingWorkflow`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use common::{delays, simulate, AppResult, LatencyConfig};
use domain::{Product, ProductCategory, ProductForm, ProductStatus, ProductUpdate, NEW_PRODUCTS_LIMIT};

use crate::query::{CatalogStats, DonorSummary, ProductQuery, SortOrder};
use crate::repository::ProductRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Catalog service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// All listings, newest submissions first
    async fn get_products(&self) -> AppResult<Vec<Product>>;

    async fn get_product_by_id(&self, id: &str) -> AppResult<Option<Product>>;

    /// Submit a listing. It always starts out pending.
    async fn add_product(&self, form: ProductForm) -> AppResult<Product>;

    /// Shallow-merge an update. Fails with `NotFound` for unknown ids.
    async fn update_product(&self, id: &str, update: ProductUpdate) -> AppResult<Product>;

    /// Returns whether a listing was removed
    async fn delete_product(&self, id: &str) -> AppResult<bool>;

    async fn get_user_products(&self, donor_id: &str) -> AppResult<Vec<Product>>;

    async fn get_products_by_category(&self, category: ProductCategory)
        -> AppResult<Vec<Product>>;

    /// Urgent and approved
    async fn get_urgent_products(&self) -> AppResult<Vec<Product>>;

    /// The most recently created approved listings
    async fn get_new_products(&self) -> AppResult<Vec<Product>>;

    async fn search(&self, query: ProductQuery) -> AppResult<Vec<Product>>;

    async fn stats(&self) -> AppResult<CatalogStats>;

    async fn donor_summary(&self, donor_id: &str) -> AppResult<DonorSummary>;
}

/// Concrete implementation of CatalogService using repository.
pub struct CatalogManager {
    repo: Arc<dyn ProductRepository>,
    latency: LatencyConfig,
}

impl CatalogManager {
    /// Create new catalog service instance with repository
    pub fn new(repo: Arc<dyn ProductRepository>, latency: LatencyConfig) -> Self {
        Self { repo, latency }
    }

    async fn filtered<F>(&self, millis: u64, keep: F) -> AppResult<Vec<Product>>
    where
        F: Fn(&Product) -> bool + Send,
    {
        let products: Vec<Product> = self
            .repo
            .list()
            .await?
            .into_iter()
            .filter(|p| keep(p))
            .collect();
        simulate(&self.latency, millis).await;
        Ok(products)
    }
}

#[async_trait]
impl CatalogService for CatalogManager {
    async fn get_products(&self) -> AppResult<Vec<Product>> {
        let products = self.repo.list().await?;
        debug!(count = products.len(), "Listing products");
        simulate(&self.latency, delays::LIST_PRODUCTS_MS).await;
        Ok(products)
    }

    async fn get_product_by_id(&self, id: &str) -> AppResult<Option<Product>> {
        let product = self.repo.find_by_id(id).await?;
        debug!(id, found = product.is_some(), "Product lookup");
        simulate(&self.latency, delays::LOOKUP_PRODUCT_MS).await;
        Ok(product)
    }

    async fn add_product(&self, form: ProductForm) -> AppResult<Product> {
        let product = Product::submitted(Uuid::new_v4().to_string(), form);
        let product = self.repo.insert_first(product).await?;
        info!(id = %product.id, name = %product.name, donor = %product.donor_id, "Product submitted");

        simulate(&self.latency, delays::ADD_PRODUCT_MS).await;
        Ok(product)
    }

    async fn update_product(&self, id: &str, update: ProductUpdate) -> AppResult<Product> {
        let product = self.repo.update(id, update).await?;
        info!(id, status = ?product.status, "Product updated");

        simulate(&self.latency, delays::UPDATE_PRODUCT_MS).await;
        Ok(product)
    }

    async fn delete_product(&self, id: &str) -> AppResult<bool> {
        let removed = self.repo.delete(id).await?;
        info!(id, removed, "Product delete");

        simulate(&self.latency, delays::DELETE_PRODUCT_MS).await;
        Ok(removed)
    }

    async fn get_user_products(&self, donor_id: &str) -> AppResult<Vec<Product>> {
        self.filtered(delays::USER_PRODUCTS_MS, |p| p.donor_id == donor_id)
            .await
    }

    async fn get_products_by_category(
        &self,
        category: ProductCategory,
    ) -> AppResult<Vec<Product>> {
        self.filtered(delays::FILTER_PRODUCTS_MS, |p| p.category == category)
            .await
    }

    async fn get_urgent_products(&self) -> AppResult<Vec<Product>> {
        self.filtered(delays::FILTER_PRODUCTS_MS, |p| {
            p.is_urgent && p.status == ProductStatus::Approved
        })
        .await
    }

    async fn get_new_products(&self) -> AppResult<Vec<Product>> {
        let approved = ProductQuery {
            sort: SortOrder::Newest,
            ..Default::default()
        }
        .apply(self.repo.list().await?);

        let recent: Vec<Product> = approved
            .into_iter()
            .filter(|p| p.status == ProductStatus::Approved)
            .take(NEW_PRODUCTS_LIMIT)
            .collect();

        simulate(&self.latency, delays::FILTER_PRODUCTS_MS).await;
        Ok(recent)
    }

    async fn search(&self, query: ProductQuery) -> AppResult<Vec<Product>> {
        let found = query.apply(self.repo.list().await?);
        debug!(?query, count = found.len(), "Product search");
        simulate(&self.latency, delays::LIST_PRODUCTS_MS).await;
        Ok(found)
    }

    async fn stats(&self) -> AppResult<CatalogStats> {
        let stats = CatalogStats::compute(&self.repo.list().await?);
        simulate(&self.latency, delays::LIST_PRODUCTS_MS).await;
        Ok(stats)
    }

    async fn donor_summary(&self, donor_id: &str) -> AppResult<DonorSummary> {
        let products = self.get_user_products(donor_id).await?;
        Ok(DonorSummary::compute(&products))
    }
}
