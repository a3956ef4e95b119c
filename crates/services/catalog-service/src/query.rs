//! Listing filters and the aggregate views shown on the admin panel and the
//! donor dashboard.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use domain::{Product, ProductCategory, ProductCondition, ProductStatus};

/// Sort order for catalog searches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    /// Urgent listings first, newest first within each group
    Urgent,
    /// Most usable condition first, newest first within each condition
    BestCondition,
}

/// Catalog search. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    pub category: Option<ProductCategory>,
    pub condition: Option<ProductCondition>,
    pub text: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl ProductQuery {
    pub fn matches(&self, product: &Product) -> bool {
        self.category.map_or(true, |c| product.category == c)
            && self.condition.map_or(true, |c| product.condition == c)
            && self
                .text
                .as_deref()
                .map_or(true, |term| product.matches_text(term))
    }

    /// Filter and sort `products`
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        let mut found: Vec<Product> = products.into_iter().filter(|p| self.matches(p)).collect();
        match self.sort {
            SortOrder::Newest => found.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Oldest => found.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortOrder::Urgent => found.sort_by(|a, b| {
                b.is_urgent
                    .cmp(&a.is_urgent)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
            SortOrder::BestCondition => found.sort_by(|a, b| {
                a.condition
                    .rank()
                    .cmp(&b.condition.rank())
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
        }
        found
    }
}

/// Admin panel counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total: usize,
    pub approved: usize,
    pub urgent: usize,
    pub pending: usize,
    pub shipped_today: usize,
}

impl CatalogStats {
    pub fn compute(products: &[Product]) -> Self {
        Self::compute_on(products, Utc::now().date_naive())
    }

    /// Counters with "today" fixed to `today`
    pub fn compute_on(products: &[Product], today: NaiveDate) -> Self {
        let count = |pred: &dyn Fn(&Product) -> bool| products.iter().filter(|p| pred(p)).count();
        Self {
            total: products.len(),
            approved: count(&|p| p.status == ProductStatus::Approved),
            urgent: count(&|p| p.is_urgent && p.status == ProductStatus::Approved),
            pending: count(&|p| p.status == ProductStatus::Pending),
            shipped_today: count(&|p| {
                p.status == ProductStatus::Shipped && p.updated_at.date_naive() == today
            }),
        }
    }
}

/// Listing count per category, in display order, skipping empty ones
pub fn category_counts(products: &[Product]) -> Vec<(ProductCategory, usize)> {
    ProductCategory::ALL
        .into_iter()
        .map(|category| {
            let count = products.iter().filter(|p| p.category == category).count();
            (category, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Per-donor counters for the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorSummary {
    pub total: usize,
    pub delivered: usize,
    pub pending: usize,
}

impl DonorSummary {
    pub fn compute(products: &[Product]) -> Self {
        let with_status = |s: ProductStatus| products.iter().filter(|p| p.status == s).count();
        Self {
            total: products.len(),
            delivered: with_status(ProductStatus::Delivered),
            pending: with_status(ProductStatus::Pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domain::{AgeGroup, ProductForm};

    fn product(name: &str, category: ProductCategory, age_days: i64, urgent: bool) -> Product {
        let form = ProductForm {
            name: name.to_string(),
            description: format!("{} described at length for the listing", name),
            category,
            condition: ProductCondition::Good,
            age_group: AgeGroup::AllAges,
            images: vec![],
            is_urgent: urgent,
            notes: None,
            donor: None,
            accept_terms: true,
        };
        let mut product = Product::submitted(name.to_lowercase(), form);
        product.created_at = Utc::now() - Duration::days(age_days);
        product
    }

    #[test]
    fn test_filters_combine() {
        let products = vec![
            product("Blocks", ProductCategory::Toys, 1, false),
            product("Coat", ProductCategory::Clothing, 2, false),
            product("Puzzle", ProductCategory::Toys, 3, false),
        ];
        let query = ProductQuery {
            category: Some(ProductCategory::Toys),
            text: Some("PUZ".to_string()),
            ..Default::default()
        };
        let found = query.apply(products);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Puzzle");
    }

    #[test]
    fn test_sort_orders() {
        let products = vec![
            product("Old", ProductCategory::Toys, 9, true),
            product("Mid", ProductCategory::Toys, 5, false),
            product("New", ProductCategory::Toys, 1, false),
        ];
        let names = |sort: SortOrder| -> Vec<String> {
            ProductQuery {
                sort,
                ..Default::default()
            }
            .apply(products.clone())
            .into_iter()
            .map(|p| p.name)
            .collect()
        };
        assert_eq!(names(SortOrder::Newest), vec!["New", "Mid", "Old"]);
        assert_eq!(names(SortOrder::Oldest), vec!["Old", "Mid", "New"]);
        assert_eq!(names(SortOrder::Urgent), vec!["Old", "New", "Mid"]);
    }

    #[test]
    fn test_best_condition_first() {
        let mut worn = product("Worn", ProductCategory::Toys, 1, false);
        worn.condition = ProductCondition::NeedsRepair;
        let mut boxed = product("Boxed", ProductCategory::Toys, 5, false);
        boxed.condition = ProductCondition::New;
        let good = product("Good", ProductCategory::Toys, 2, false);

        let found = ProductQuery {
            sort: SortOrder::BestCondition,
            ..Default::default()
        }
        .apply(vec![worn, good, boxed]);
        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Boxed", "Good", "Worn"]);
    }

    #[test]
    fn test_category_counts_in_display_order() {
        let counts = category_counts(&[
            product("Coat", ProductCategory::Clothing, 1, false),
            product("Blocks", ProductCategory::Toys, 1, false),
            product("Puzzle", ProductCategory::Toys, 2, false),
        ]);
        assert_eq!(
            counts,
            vec![(ProductCategory::Toys, 2), (ProductCategory::Clothing, 1)]
        );
    }

    #[test]
    fn test_stats_count_shipped_today_only() {
        let mut shipped = product("Shoes", ProductCategory::Shoes, 4, false);
        shipped.status = ProductStatus::Shipped;
        let mut shipped_earlier = shipped.clone();
        shipped_earlier.updated_at = Utc::now() - Duration::days(2);
        let mut urgent = product("Crib", ProductCategory::Furniture, 1, true);
        urgent.status = ProductStatus::Approved;

        let stats = CatalogStats::compute(&[
            shipped,
            shipped_earlier,
            urgent,
            product("Book", ProductCategory::Books, 1, true),
        ]);
        assert_eq!(
            stats,
            CatalogStats {
                total: 4,
                approved: 1,
                urgent: 1,
                pending: 1,
                shipped_today: 1,
            }
        );
    }

    #[test]
    fn test_donor_summary() {
        let mut delivered = product("Tablet", ProductCategory::Electronics, 3, false);
        delivered.status = ProductStatus::Delivered;
        let summary = DonorSummary::compute(&[
            delivered,
            product("Bag", ProductCategory::School, 1, false),
        ]);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.pending, 1);
    }
}
