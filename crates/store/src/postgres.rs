//! PostgreSQL-backed store implementation.

use async_trait::async_trait;
use chrono::Utc;
use common::{CartId, CartItemId, CategoryId, ColorId, OrderId, ProductId, SizeId, UserId};
use domain::{
    Cart, CartItem, CartOwner, Category, Color, Money, Order, OrderItem, OrderStatus,
    OrderStatusHistory, PaymentStatus, Product, Size,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Result, StoreError,
    store::{CartStore, CatalogStore, OrderStore},
};

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn parse_order_status(raw: &str) -> Result<OrderStatus> {
        raw.parse()
            .map_err(|_| StoreError::Data(format!("unknown order status in storage: {raw}")))
    }

    fn parse_payment_status(raw: &str) -> Result<PaymentStatus> {
        raw.parse()
            .map_err(|_| StoreError::Data(format!("unknown payment status in storage: {raw}")))
    }

    fn row_to_product(row: &PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            category_id: CategoryId::from_uuid(row.try_get("category_id")?),
            price: Money::from_minor(row.try_get("price")?),
            discount_price: row
                .try_get::<Option<i64>, _>("discount_price")?
                .map(Money::from_minor),
            description: row.try_get("description")?,
            stock: row.try_get("stock")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_cart(row: &PgRow) -> Result<Cart> {
        let user_id: Option<Uuid> = row.try_get("user_id")?;
        let session_id: Option<String> = row.try_get("session_id")?;

        let owner = match (user_id, session_id) {
            (Some(user), _) => CartOwner::User(UserId::from_uuid(user)),
            (None, Some(session)) => CartOwner::Session(session),
            (None, None) => {
                return Err(StoreError::Data("cart row has no owner".to_string()));
            }
        };

        Ok(Cart {
            id: CartId::from_uuid(row.try_get("id")?),
            owner,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_cart_item(row: &PgRow) -> Result<CartItem> {
        Ok(CartItem {
            id: CartItemId::from_uuid(row.try_get("id")?),
            cart_id: CartId::from_uuid(row.try_get("cart_id")?),
            product_id: ProductId::from_uuid(row.try_get("product_id")?),
            size_id: row
                .try_get::<Option<Uuid>, _>("size_id")?
                .map(SizeId::from_uuid),
            color_id: row
                .try_get::<Option<Uuid>, _>("color_id")?
                .map(ColorId::from_uuid),
            quantity: row.try_get::<i32, _>("quantity")? as u32,
        })
    }

    fn row_to_order(row: &PgRow) -> Result<Order> {
        Ok(Order {
            id: OrderId::from_uuid(row.try_get("id")?),
            user_id: UserId::from_uuid(row.try_get("user_id")?),
            full_name: row.try_get("full_name")?,
            address: row.try_get("address")?,
            city: row.try_get("city")?,
            phone: row.try_get("phone")?,
            subtotal: Money::from_minor(row.try_get("subtotal")?),
            discount: Money::from_minor(row.try_get("discount")?),
            total_amount: Money::from_minor(row.try_get("total_amount")?),
            payment_status: Self::parse_payment_status(
                row.try_get::<String, _>("payment_status")?.as_str(),
            )?,
            status: Self::parse_order_status(row.try_get::<String, _>("status")?.as_str())?,
            ordered_at: row.try_get("ordered_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_order_item(row: &PgRow) -> Result<OrderItem> {
        Ok(OrderItem {
            id: row.try_get("id")?,
            order_id: OrderId::from_uuid(row.try_get("order_id")?),
            product_id: ProductId::from_uuid(row.try_get("product_id")?),
            size: row.try_get("size")?,
            color: row.try_get("color")?,
            quantity: row.try_get::<i32, _>("quantity")? as u32,
            price: Money::from_minor(row.try_get("price")?),
        })
    }

    fn row_to_history(row: &PgRow) -> Result<OrderStatusHistory> {
        Ok(OrderStatusHistory {
            id: row.try_get("id")?,
            order_id: OrderId::from_uuid(row.try_get("order_id")?),
            from_status: Self::parse_order_status(
                row.try_get::<String, _>("from_status")?.as_str(),
            )?,
            to_status: Self::parse_order_status(row.try_get::<String, _>("to_status")?.as_str())?,
            changed_at: row.try_get("changed_at")?,
            changed_by: row
                .try_get::<Option<Uuid>, _>("changed_by")?
                .map(UserId::from_uuid),
        })
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn insert_category(&self, category: Category) -> Result<()> {
        sqlx::query(
            "INSERT INTO categories (id, section, name, slug) VALUES ($1, $2, $3, $4)",
        )
        .bind(category.id.as_uuid())
        .bind(category.section.as_str())
        .bind(&category.name)
        .bind(&category.slug)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_size(&self, size: Size) -> Result<()> {
        sqlx::query("INSERT INTO sizes (id, name) VALUES ($1, $2)")
            .bind(size.id.as_uuid())
            .bind(&size.name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_color(&self, color: Color) -> Result<()> {
        sqlx::query("INSERT INTO colors (id, name, code) VALUES ($1, $2, $3)")
            .bind(color.id.as_uuid())
            .bind(&color.name)
            .bind(&color.code)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_product(&self, product: Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, category_id, price, discount_price, description, stock, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.category_id.as_uuid())
        .bind(product.price.minor())
        .bind(product.discount_price.map(|m| m.minor()))
        .bind(&product.description)
        .bind(product.stock)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_product(&self, product: Product) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, category_id = $3, price = $4, discount_price = $5,
                description = $6, stock = $7
            WHERE id = $1
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.category_id.as_uuid())
        .bind(product.price.minor())
        .bind(product.discount_price.map(|m| m.minor()))
        .bind(&product.description)
        .bind(product.stock)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("product", product.id));
        }
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("product", id));
        }
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, category_id, price, discount_price, description, stock, created_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_product).transpose()
    }

    async fn get_size(&self, id: SizeId) -> Result<Option<Size>> {
        let row = sqlx::query("SELECT id, name FROM sizes WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(Size {
                id: SizeId::from_uuid(row.try_get("id")?),
                name: row.try_get("name")?,
            })
        })
        .transpose()
    }

    async fn get_color(&self, id: ColorId) -> Result<Option<Color>> {
        let row = sqlx::query("SELECT id, name, code FROM colors WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(Color {
                id: ColorId::from_uuid(row.try_get("id")?),
                name: row.try_get("name")?,
                code: row.try_get("code")?,
            })
        })
        .transpose()
    }
}

#[async_trait]
impl CartStore for PostgresStore {
    async fn get_or_create_cart(&self, owner: &CartOwner) -> Result<Cart> {
        let existing = match owner {
            CartOwner::User(user_id) => {
                sqlx::query(
                    "SELECT id, user_id, session_id, created_at FROM carts WHERE user_id = $1",
                )
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?
            }
            CartOwner::Session(session_id) => {
                sqlx::query(
                    "SELECT id, user_id, session_id, created_at FROM carts WHERE session_id = $1",
                )
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        if let Some(row) = existing {
            return Self::row_to_cart(&row);
        }

        let cart = Cart {
            id: CartId::new(),
            owner: owner.clone(),
            created_at: Utc::now(),
        };

        let (user_id, session_id) = match &cart.owner {
            CartOwner::User(user_id) => (Some(user_id.as_uuid()), None),
            CartOwner::Session(session_id) => (None, Some(session_id.clone())),
        };

        sqlx::query(
            "INSERT INTO carts (id, user_id, session_id, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(cart.id.as_uuid())
        .bind(user_id)
        .bind(session_id)
        .bind(cart.created_at)
        .execute(&self.pool)
        .await?;

        Ok(cart)
    }

    async fn cart_items(&self, cart_id: CartId) -> Result<Vec<CartItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, cart_id, product_id, size_id, color_id, quantity
            FROM cart_items
            WHERE cart_id = $1
            "#,
        )
        .bind(cart_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_cart_item).collect()
    }

    async fn get_cart_item(&self, item_id: CartItemId) -> Result<Option<CartItem>> {
        let row = sqlx::query(
            r#"
            SELECT id, cart_id, product_id, size_id, color_id, quantity
            FROM cart_items
            WHERE id = $1
            "#,
        )
        .bind(item_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_cart_item).transpose()
    }

    async fn find_cart_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        size_id: Option<SizeId>,
        color_id: Option<ColorId>,
    ) -> Result<Option<CartItem>> {
        // NULL size/color must match NULL exactly, hence IS NOT DISTINCT FROM.
        let row = sqlx::query(
            r#"
            SELECT id, cart_id, product_id, size_id, color_id, quantity
            FROM cart_items
            WHERE cart_id = $1
              AND product_id = $2
              AND size_id IS NOT DISTINCT FROM $3
              AND color_id IS NOT DISTINCT FROM $4
            "#,
        )
        .bind(cart_id.as_uuid())
        .bind(product_id.as_uuid())
        .bind(size_id.map(|id| id.as_uuid()))
        .bind(color_id.map(|id| id.as_uuid()))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_cart_item).transpose()
    }

    async fn insert_cart_item(&self, item: CartItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cart_items (id, cart_id, product_id, size_id, color_id, quantity)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(item.cart_id.as_uuid())
        .bind(item.product_id.as_uuid())
        .bind(item.size_id.map(|id| id.as_uuid()))
        .bind(item.color_id.map(|id| id.as_uuid()))
        .bind(item.quantity as i32)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_cart_item_quantity(&self, item_id: CartItemId, quantity: u32) -> Result<()> {
        let result = sqlx::query("UPDATE cart_items SET quantity = $2 WHERE id = $1")
            .bind(item_id.as_uuid())
            .bind(quantity as i32)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("cart item", item_id));
        }
        Ok(())
    }

    async fn delete_cart_item(&self, item_id: CartItemId) -> Result<()> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(item_id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("cart item", item_id));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn place_order(
        &self,
        cart_id: CartId,
        order: Order,
        items: Vec<OrderItem>,
    ) -> Result<()> {
        // Order, items and cart-clear commit together or not at all.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders
                (id, user_id, full_name, address, city, phone,
                 subtotal, discount, total_amount, payment_status, status,
                 ordered_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(&order.full_name)
        .bind(&order.address)
        .bind(&order.city)
        .bind(&order.phone)
        .bind(order.subtotal.minor())
        .bind(order.discount.minor())
        .bind(order.total_amount.minor())
        .bind(order.payment_status.as_str())
        .bind(order.status.as_str())
        .bind(order.ordered_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, size, color, quantity, price)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(item.id)
            .bind(item.order_id.as_uuid())
            .bind(item.product_id.as_uuid())
            .bind(&item.size)
            .bind(&item.color)
            .bind(item.quantity as i32)
            .bind(item.price.minor())
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, full_name, address, city, phone,
                   subtotal, discount, total_amount, payment_status, status,
                   ordered_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_order).transpose()
    }

    async fn order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, product_id, size, color, quantity, price
            FROM order_items
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_order_item).collect()
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, full_name, address, city, phone,
                   subtotal, discount, total_amount, payment_status, status,
                   ordered_at, updated_at
            FROM orders
            WHERE user_id = $1
            ORDER BY ordered_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_order).collect()
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, full_name, address, city, phone,
                   subtotal, discount, total_amount, payment_status, status,
                   ordered_at, updated_at
            FROM orders
            ORDER BY ordered_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_order).collect()
    }

    async fn apply_transition(
        &self,
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
        changed_by: Option<UserId>,
    ) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent transitions on the same order.
        let row = sqlx::query("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("order", order_id))?;

        let actual = Self::parse_order_status(row.try_get::<String, _>("status")?.as_str())?;
        if actual != from {
            return Err(StoreError::TransitionConflict {
                order_id,
                expected: from,
                actual,
            });
        }

        let now = Utc::now();

        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, user_id, full_name, address, city, phone,
                      subtotal, discount, total_amount, payment_status, status,
                      ordered_at, updated_at
            "#,
        )
        .bind(order_id.as_uuid())
        .bind(to.as_str())
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO order_status_history
                (id, order_id, from_status, to_status, changed_at, changed_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(now)
        .bind(changed_by.map(|id| id.as_uuid()))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Self::row_to_order(&updated)
    }

    async fn status_history(
        &self,
        order_id: OrderId,
        limit: usize,
    ) -> Result<Vec<OrderStatusHistory>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, from_status, to_status, changed_at, changed_by
            FROM order_status_history
            WHERE order_id = $1
            ORDER BY changed_at DESC
            LIMIT $2
            "#,
        )
        .bind(order_id.as_uuid())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_history).collect()
    }
}
