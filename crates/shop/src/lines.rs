//! Joining cart items with their catalog rows.

use common::CartId;
use domain::CartLine;
use store::{CartStore, CatalogStore};

use crate::ShopError;

/// Loads a cart's items joined with product and variant display names,
/// priced live against the catalog.
pub(crate) async fn load_cart_lines<S>(store: &S, cart_id: CartId) -> Result<Vec<CartLine>, ShopError>
where
    S: CartStore + CatalogStore,
{
    let items = store.cart_items(cart_id).await?;
    let mut lines = Vec::with_capacity(items.len());

    for item in items {
        let product = store
            .get_product(item.product_id)
            .await?
            .ok_or_else(|| ShopError::not_found("product", item.product_id))?;

        let size_name = match item.size_id {
            Some(id) => store.get_size(id).await?.map(|s| s.name),
            None => None,
        };
        let color_name = match item.color_id {
            Some(id) => store.get_color(id).await?.map(|c| c.name),
            None => None,
        };

        lines.push(CartLine {
            item,
            product,
            size_name,
            color_name,
        });
    }

    Ok(lines)
}
