//! PostgreSQL integration tests.
//!
//! These tests use a shared PostgreSQL container and need a local Docker
//! daemon, so they are ignored by default. Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --ignored --test-threads=1
//! ```

use std::sync::Arc;

use chrono::Utc;
use common::{CartId, CartItemId, CategoryId, OrderId, ProductId, SizeId, UserId};
use domain::{
    CartItem, CartOwner, Category, Money, Order, OrderItem, OrderStatus, PaymentStatus, Product,
    Section, Size,
};
use sqlx::PgPool;
use store::{CartStore, CatalogStore, OrderStore, PostgresStore, StoreError};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for the schema
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!("../../../migrations/001_create_shop_tables.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query(
        "TRUNCATE TABLE order_status_history, order_items, orders, cart_items, carts, products, sizes, colors, categories",
    )
    .execute(&pool)
    .await
    .unwrap();

    PostgresStore::new(pool)
}

async fn seed_product(store: &PostgresStore, price: i64, discount: Option<i64>) -> Product {
    let category = Category {
        id: CategoryId::new(),
        section: Section::Men,
        name: "Shirts".to_string(),
        slug: format!("shirts-{}", Uuid::new_v4()),
    };
    store.insert_category(category.clone()).await.unwrap();

    let product = Product {
        id: ProductId::new(),
        name: "Oxford Shirt".to_string(),
        category_id: category.id,
        price: Money::from_minor(price),
        discount_price: discount.map(Money::from_minor),
        description: "A shirt".to_string(),
        stock: 10,
        created_at: Utc::now(),
    };
    store.insert_product(product.clone()).await.unwrap();
    product
}

fn make_order(user_id: UserId, total: i64) -> Order {
    let now = Utc::now();
    Order {
        id: OrderId::new(),
        user_id,
        full_name: "Asha Rao".to_string(),
        address: "12 Hill Road".to_string(),
        city: "Pune".to_string(),
        phone: "555-0100".to_string(),
        subtotal: Money::from_minor(total),
        discount: Money::zero(),
        total_amount: Money::from_minor(total),
        payment_status: PaymentStatus::Pending,
        status: OrderStatus::Pending,
        ordered_at: now,
        updated_at: now,
    }
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn product_roundtrip_preserves_prices() {
    let store = get_test_store().await;
    let product = seed_product(&store, 10000, Some(8000)).await;

    let fetched = store.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(fetched.price, Money::from_minor(10000));
    assert_eq!(fetched.discount_price, Some(Money::from_minor(8000)));
    assert_eq!(fetched.effective_price(), Money::from_minor(8000));
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn cart_is_created_lazily_and_reused() {
    let store = get_test_store().await;
    let owner = CartOwner::User(UserId::new());

    let first = store.get_or_create_cart(&owner).await.unwrap();
    let second = store.get_or_create_cart(&owner).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.owner, owner);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn find_cart_item_treats_null_exactly() {
    let store = get_test_store().await;
    let product = seed_product(&store, 5000, None).await;
    let cart = store
        .get_or_create_cart(&CartOwner::Session("sess-1".to_string()))
        .await
        .unwrap();

    let size = Size {
        id: SizeId::new(),
        name: "M".to_string(),
    };
    store.insert_size(size.clone()).await.unwrap();

    store
        .insert_cart_item(CartItem {
            id: CartItemId::new(),
            cart_id: cart.id,
            product_id: product.id,
            size_id: Some(size.id),
            color_id: None,
            quantity: 1,
        })
        .await
        .unwrap();

    let hit = store
        .find_cart_item(cart.id, product.id, Some(size.id), None)
        .await
        .unwrap();
    assert!(hit.is_some());

    let miss = store
        .find_cart_item(cart.id, product.id, None, None)
        .await
        .unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn place_order_is_atomic_and_clears_cart() {
    let store = get_test_store().await;
    let product = seed_product(&store, 5000, None).await;
    let user = UserId::new();
    let cart = store.get_or_create_cart(&CartOwner::User(user)).await.unwrap();

    store
        .insert_cart_item(CartItem {
            id: CartItemId::new(),
            cart_id: cart.id,
            product_id: product.id,
            size_id: None,
            color_id: None,
            quantity: 2,
        })
        .await
        .unwrap();

    let order = make_order(user, 10000);
    let order_id = order.id;
    let items = vec![OrderItem {
        id: Uuid::new_v4(),
        order_id,
        product_id: product.id,
        size: String::new(),
        color: String::new(),
        quantity: 2,
        price: Money::from_minor(5000),
    }];

    store.place_order(cart.id, order, items).await.unwrap();

    assert!(store.cart_items(cart.id).await.unwrap().is_empty());
    let fetched = store.get_order(order_id).await.unwrap().unwrap();
    assert_eq!(fetched.total_amount, Money::from_minor(10000));
    assert_eq!(fetched.status, OrderStatus::Pending);

    let items = store.order_items(order_id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].line_total(), Money::from_minor(10000));
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn transition_appends_history_and_conflicts_on_stale_status() {
    let store = get_test_store().await;
    let user = UserId::new();
    let order = make_order(user, 5000);
    let order_id = order.id;
    store
        .place_order(CartId::new(), order, vec![])
        .await
        .unwrap();

    let admin = UserId::new();
    let updated = store
        .apply_transition(
            order_id,
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            Some(admin),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Confirmed);

    let stale = store
        .apply_transition(order_id, OrderStatus::Pending, OrderStatus::Cancelled, None)
        .await;
    assert!(matches!(stale, Err(StoreError::TransitionConflict { .. })));

    let history = store.status_history(order_id, 20).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].from_status, OrderStatus::Pending);
    assert_eq!(history[0].to_status, OrderStatus::Confirmed);
    assert_eq!(history[0].changed_by, Some(admin));
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn list_orders_for_user_sorts_newest_first() {
    let store = get_test_store().await;
    let user = UserId::new();

    let mut older = make_order(user, 1000);
    older.ordered_at = Utc::now() - chrono::Duration::hours(2);
    let newer = make_order(user, 2000);
    let newer_id = newer.id;

    store
        .place_order(CartId::new(), older, vec![])
        .await
        .unwrap();
    store
        .place_order(CartId::new(), newer, vec![])
        .await
        .unwrap();
    store
        .place_order(CartId::new(), make_order(UserId::new(), 3000), vec![])
        .await
        .unwrap();

    let orders = store.list_orders_for_user(user).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].id, newer_id);
}
