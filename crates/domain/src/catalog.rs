//! Catalog entities: categories, sizes, colors and products.
//!
//! The catalog is read-only from the order core's perspective; product
//! prices are read live when pricing a cart and captured permanently at
//! checkout.

use chrono::{DateTime, Utc};
use common::{CategoryId, ColorId, ProductId, SizeId};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Top-level storefront section a category belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    Men,
    Women,
    Kids,
    Accessories,
}

impl Section {
    /// Returns the section name as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Men => "men",
            Section::Women => "women",
            Section::Kids => "kids",
            Section::Accessories => "accessories",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "men" => Ok(Section::Men),
            "women" => Ok(Section::Women),
            "kids" => Ok(Section::Kids),
            "accessories" => Ok(Section::Accessories),
            other => Err(format!("unknown section: {other}")),
        }
    }
}

/// A product category inside a section (T-Shirts, Jeans, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub section: Section,
    pub name: String,
    pub slug: String,
}

/// A size option (S, M, L, XL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub id: SizeId,
    pub name: String,
}

/// A color option with a display name and hex code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub id: ColorId,
    pub name: String,
    pub code: String,
}

/// A catalog product.
///
/// The stock counter exists but is never decremented by the order core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category_id: CategoryId,
    pub price: Money,
    pub discount_price: Option<Money>,
    pub description: String,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price a buyer pays right now: the discount price when
    /// one is set, the regular price otherwise.
    pub fn effective_price(&self) -> Money {
        self.discount_price.unwrap_or(self.price)
    }
}
