// 🛍️ Product Entity - what gets sold
//
// Category is a closed set. It is stored as its display name ("Home & Kitchen")
// in SQL and CSV, and parsed back strictly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Column order used by both the SQL schema and the CSV export
pub const PRODUCT_COLUMNS: &[&str] = &["id", "name", "category", "price"];

// ============================================================================
// PRODUCT CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    Electronics,
    Clothing,
    Books,
    #[serde(rename = "Home & Kitchen")]
    HomeAndKitchen,
    Sports,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 5] = [
        ProductCategory::Electronics,
        ProductCategory::Clothing,
        ProductCategory::Books,
        ProductCategory::HomeAndKitchen,
        ProductCategory::Sports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Electronics => "Electronics",
            ProductCategory::Clothing => "Clothing",
            ProductCategory::Books => "Books",
            ProductCategory::HomeAndKitchen => "Home & Kitchen",
            ProductCategory::Sports => "Sports",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown product category: {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for ProductCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductCategory::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

// ============================================================================
// PRODUCT ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: ProductCategory,
    /// Unit price, never negative
    pub price: f64,
}

impl Product {
    pub fn new(id: i64, name: &str, category: ProductCategory, price: f64) -> Self {
        Product {
            id,
            name: name.to_string(),
            category,
            price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_matches_display() {
        for category in ProductCategory::ALL {
            let parsed: ProductCategory = category.to_string().parse().unwrap();
            assert_eq!(parsed, category);
        }

        assert_eq!(
            "Home & Kitchen".parse::<ProductCategory>().unwrap(),
            ProductCategory::HomeAndKitchen
        );
        assert!("Garden".parse::<ProductCategory>().is_err());
        assert!("electronics".parse::<ProductCategory>().is_err());
    }

    #[test]
    fn test_category_serde_uses_display_name() {
        let json = serde_json::to_string(&ProductCategory::HomeAndKitchen).unwrap();
        assert_eq!(json, "\"Home & Kitchen\"");
    }
}
