//! Cart entities and cart mutation actions.

use chrono::{DateTime, Utc};
use common::{CartId, CartItemId, ColorId, ProductId, SizeId, UserId};
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::money::Money;

/// Who a cart belongs to: a registered user or an anonymous session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CartOwner {
    User(UserId),
    Session(String),
}

/// A shopping cart.
///
/// Created lazily on first access and never deleted; checkout clears its
/// items but keeps the cart row for reuse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub owner: CartOwner,
    pub created_at: DateTime<Utc>,
}

/// A line item inside a cart.
///
/// Uniqueness is per (cart, product, size, color); a missing size or
/// color matches exactly, not as a wildcard. Quantity is always positive:
/// decrementing to zero deletes the row instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub size_id: Option<SizeId>,
    pub color_id: Option<ColorId>,
    pub quantity: u32,
}

impl CartItem {
    /// Returns true if this item matches the given variant tuple exactly.
    pub fn matches(
        &self,
        product_id: ProductId,
        size_id: Option<SizeId>,
        color_id: Option<ColorId>,
    ) -> bool {
        self.product_id == product_id && self.size_id == size_id && self.color_id == color_id
    }
}

/// Mutation applied to an existing cart item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartAction {
    /// Quantity += 1.
    Increase,
    /// Quantity -= 1; the item is deleted when the result reaches zero.
    Decrease,
    /// Unconditional delete.
    Remove,
}

impl CartAction {
    /// Returns the action name as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CartAction::Increase => "increase",
            CartAction::Decrease => "decrease",
            CartAction::Remove => "remove",
        }
    }
}

impl std::fmt::Display for CartAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CartAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increase" => Ok(CartAction::Increase),
            "decrease" => Ok(CartAction::Decrease),
            "remove" => Ok(CartAction::Remove),
            other => Err(format!("unknown cart action: {other}")),
        }
    }
}

/// A cart item joined with its product and resolved variant names,
/// priced live against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Product,
    pub size_name: Option<String>,
    pub color_name: Option<String>,
}

impl CartLine {
    /// The unit price at this moment: discount price when set, regular
    /// price otherwise.
    pub fn unit_price(&self) -> Money {
        self.product.effective_price()
    }

    /// Quantity times the current unit price.
    pub fn total_price(&self) -> Money {
        self.unit_price().multiply(self.item.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::CategoryId;

    fn line(quantity: u32, price: i64, discount: Option<i64>) -> CartLine {
        let product = Product {
            id: ProductId::new(),
            name: "Denim Jacket".to_string(),
            category_id: CategoryId::new(),
            price: Money::from_minor(price),
            discount_price: discount.map(Money::from_minor),
            description: String::new(),
            stock: 5,
            created_at: Utc::now(),
        };
        CartLine {
            item: CartItem {
                id: CartItemId::new(),
                cart_id: CartId::new(),
                product_id: product.id,
                size_id: None,
                color_id: None,
                quantity,
            },
            product,
            size_name: None,
            color_name: None,
        }
    }

    #[test]
    fn total_uses_discount_price_when_present() {
        let line = line(2, 10000, Some(8000));
        assert_eq!(line.unit_price(), Money::from_minor(8000));
        assert_eq!(line.total_price(), Money::from_minor(16000));
    }

    #[test]
    fn total_uses_regular_price_otherwise() {
        let line = line(3, 5000, None);
        assert_eq!(line.total_price(), Money::from_minor(15000));
    }

    #[test]
    fn matches_requires_exact_variant_tuple() {
        let size = SizeId::new();
        let item = CartItem {
            id: CartItemId::new(),
            cart_id: CartId::new(),
            product_id: ProductId::new(),
            size_id: Some(size),
            color_id: None,
            quantity: 1,
        };

        assert!(item.matches(item.product_id, Some(size), None));
        // None is not a wildcard.
        assert!(!item.matches(item.product_id, None, None));
        assert!(!item.matches(item.product_id, Some(size), Some(ColorId::new())));
        assert!(!item.matches(ProductId::new(), Some(size), None));
    }

    #[test]
    fn cart_action_roundtrip() {
        for action in [CartAction::Increase, CartAction::Decrease, CartAction::Remove] {
            let parsed: CartAction = action.as_str().parse().unwrap();
            assert_eq!(parsed, action);
        }
        assert!("drop".parse::<CartAction>().is_err());
    }
}
