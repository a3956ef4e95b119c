//! Catalog service scenario tests.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio_test::{assert_err, assert_ok};

use catalog_service_lib::config::CatalogServiceConfig;
use catalog_service_lib::query::{ProductQuery, SortOrder};
use catalog_service_lib::repository::ProductStore;
use catalog_service_lib::service::{CatalogManager, CatalogService};
use common::{AppError, LatencyConfig};
use domain::{
    AgeGroup, Donor, ProductCategory, ProductCondition, ProductForm, ProductStatus, ProductUpdate,
};

fn catalog() -> CatalogManager {
    CatalogManager::new(Arc::new(ProductStore::seeded()), LatencyConfig::disabled())
}

fn bike_form() -> ProductForm {
    ProductForm {
        name: "Bike".to_string(),
        description: "Small bike with training wheels, ready to ride".to_string(),
        category: ProductCategory::Other,
        condition: ProductCondition::Good,
        age_group: AgeGroup::Preschool,
        images: vec![],
        is_urgent: false,
        notes: None,
        donor: None,
        accept_terms: true,
    }
}

#[tokio::test]
async fn test_new_listing_lands_first_and_pending() {
    let catalog = catalog();
    let before = Utc::now();

    let added = catalog.add_product(bike_form()).await.unwrap();
    let products = catalog.get_products().await.unwrap();

    assert_eq!(products.len(), 4);
    assert_eq!(products[0].id, added.id);
    assert_eq!(products[0].name, "Bike");
    assert_eq!(products[0].status, ProductStatus::Pending);
    assert!(added.created_at >= before - Duration::seconds(1));
    assert!(added.created_at <= Utc::now());
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found_and_changes_nothing() {
    let catalog = catalog();

    let result = catalog
        .update_product("999", ProductUpdate::status(ProductStatus::Approved))
        .await;

    assert!(matches!(assert_err!(result), AppError::NotFound));
    assert_eq!(assert_ok!(catalog.get_products().await).len(), 3);
}

#[tokio::test]
async fn test_update_merges_and_stamps() {
    let catalog = catalog();
    let original = catalog.get_product_by_id("3").await.unwrap().unwrap();

    let update = ProductUpdate {
        is_urgent: Some(true),
        notes: Some("Collect before Friday".to_string()),
        ..Default::default()
    };
    let updated = catalog.update_product("3", update).await.unwrap();

    assert_eq!(updated.name, original.name);
    assert!(updated.is_urgent);
    assert!(updated.updated_at > original.updated_at);
    assert_eq!(
        catalog.get_product_by_id("3").await.unwrap().unwrap().notes,
        updated.notes
    );
}

#[tokio::test]
async fn test_any_status_change_is_accepted() {
    let catalog = catalog();
    let updated = catalog
        .update_product("3", ProductUpdate::status(ProductStatus::Delivered))
        .await
        .unwrap();
    assert_eq!(updated.status, ProductStatus::Delivered);
}

#[tokio::test]
async fn test_delete_then_lookup_is_none() {
    let catalog = catalog();
    assert!(catalog.delete_product("2").await.unwrap());
    assert_eq!(catalog.get_product_by_id("2").await.unwrap(), None);
    assert!(!catalog.delete_product("2").await.unwrap());
}

#[tokio::test]
async fn test_donor_attribution_from_form() {
    let catalog = catalog();
    let mut form = bike_form();
    form.donor = Some(Donor {
        id: "u-42".to_string(),
        name: "Selin Aksoy".to_string(),
        city: "Antalya".to_string(),
    });
    catalog.add_product(form).await.unwrap();

    let mine = catalog.get_user_products("u-42").await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].donor_city, "Antalya");

    let summary = catalog.donor_summary("u-42").await.unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.pending, 1);
}

#[tokio::test]
async fn test_category_and_search() {
    let catalog = catalog();
    let books = catalog
        .get_products_by_category(ProductCategory::Books)
        .await
        .unwrap();
    assert_eq!(books.len(), 1);

    let found = catalog
        .search(ProductQuery {
            text: Some("lego".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "1");

    let urgent_first = catalog
        .search(ProductQuery {
            sort: SortOrder::Urgent,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(urgent_first[0].id, "2");
}

#[tokio::test]
async fn test_stats_on_seed() {
    let stats = catalog().stats().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.approved, 2);
    assert_eq!(stats.urgent, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.shipped_today, 0);
}

#[tokio::test]
async fn test_unseeded_bootstrap_is_empty() {
    let config = CatalogServiceConfig {
        seed_demo: false,
        latency: LatencyConfig::disabled(),
    };
    let components = catalog_service_lib::bootstrap(&config);
    assert!(components.service.get_products().await.unwrap().is_empty());
}
