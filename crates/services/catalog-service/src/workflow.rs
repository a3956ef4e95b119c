//! Listing lifecycle rules enforced by the moderation and dashboard screens.
//!
//! The catalog itself accepts any status change. These actions add the few
//! checks the screens make before calling it.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use common::{AppResult, OptionExt};
use domain::{Product, ProductStatus, ProductUpdate, ShippingAddress, REJECTION_NOTE_PREFIX};

use crate::service::CatalogService;

/// Screen-level actions on a single listing.
#[derive(Clone)]
pub struct ListingWorkflow {
    catalog: Arc<dyn CatalogService>,
}

impl ListingWorkflow {
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self { catalog }
    }

    async fn load(&self, id: &str) -> AppResult<Product> {
        self.catalog.get_product_by_id(id).await?.ok_or_not_found()
    }

    async fn require(
        &self,
        id: &str,
        status: ProductStatus,
        rule: &'static str,
    ) -> AppResult<Product> {
        let product = self.load(id).await?;
        product.status.require(status, rule)?;
        Ok(product)
    }

    async fn editable(&self, id: &str, rule: &'static str) -> AppResult<Product> {
        let product = self.load(id).await?;
        product.status.require_editable(rule)?;
        Ok(product)
    }

    /// Publish a listing and stamp the approval time
    pub async fn approve(&self, id: &str) -> AppResult<Product> {
        self.load(id).await?.status.require_open()?;

        let update = ProductUpdate {
            status: Some(ProductStatus::Approved),
            approved_at: Some(Utc::now()),
            ..Default::default()
        };
        let product = self.catalog.update_product(id, update).await?;
        info!(id, "Listing approved");
        Ok(product)
    }

    /// Reject a listing, recording the reason in its notes
    pub async fn reject(&self, id: &str, reason: &str) -> AppResult<Product> {
        self.load(id).await?.status.require_open()?;

        let update = ProductUpdate {
            status: Some(ProductStatus::Rejected),
            notes: Some(format!("{}{}", REJECTION_NOTE_PREFIX, reason.trim())),
            ..Default::default()
        };
        let product = self.catalog.update_product(id, update).await?;
        info!(id, reason, "Listing rejected");
        Ok(product)
    }

    /// Reserve a published listing for `recipient_id`
    pub async fn request(&self, id: &str, recipient_id: &str) -> AppResult<Product> {
        self.require(
            id,
            ProductStatus::Approved,
            "Only published products can be requested.",
        )
        .await?;

        let update = ProductUpdate {
            status: Some(ProductStatus::Reserved),
            recipient_id: Some(Some(recipient_id.to_string())),
            ..Default::default()
        };
        self.catalog.update_product(id, update).await
    }

    /// Return a reserved listing to the catalog
    pub async fn cancel_request(&self, id: &str) -> AppResult<Product> {
        self.require(
            id,
            ProductStatus::Reserved,
            "Only reserved requests can be cancelled.",
        )
        .await?;

        let update = ProductUpdate {
            status: Some(ProductStatus::Approved),
            recipient_id: Some(None),
            ..Default::default()
        };
        self.catalog.update_product(id, update).await
    }

    /// Send a reserved listing to its recipient
    pub async fn ship(
        &self,
        id: &str,
        address: ShippingAddress,
        tracking_number: &str,
    ) -> AppResult<Product> {
        self.require(
            id,
            ProductStatus::Reserved,
            "Only reserved products can be shipped.",
        )
        .await?;

        let update = ProductUpdate {
            status: Some(ProductStatus::Shipped),
            shipping_address: Some(address),
            tracking_number: Some(tracking_number.trim().to_string()),
            ..Default::default()
        };
        let product = self.catalog.update_product(id, update).await?;
        info!(id, tracking_number, "Listing shipped");
        Ok(product)
    }

    /// Mark a shipped listing as received
    pub async fn confirm_delivery(&self, id: &str) -> AppResult<Product> {
        self.require(
            id,
            ProductStatus::Shipped,
            "Only shipped products can be marked as delivered.",
        )
        .await?;

        let product = self
            .catalog
            .update_product(id, ProductUpdate::status(ProductStatus::Delivered))
            .await?;
        info!(id, "Listing delivered");
        Ok(product)
    }

    /// Delete a listing that is still awaiting approval
    pub async fn withdraw(&self, id: &str) -> AppResult<bool> {
        self.editable(id, "Only pending products can be deleted.")
            .await?;
        self.catalog.delete_product(id).await
    }

    /// Edit a listing that is still awaiting approval. The status is kept.
    pub async fn revise(&self, id: &str, mut update: ProductUpdate) -> AppResult<Product> {
        self.editable(id, "Only pending products can be edited.")
            .await?;
        update.status = None;
        update.approved_at = None;
        self.catalog.update_product(id, update).await
    }
}
