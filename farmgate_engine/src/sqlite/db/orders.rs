use fg_common::Money;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    api::order_objects::{OrderItemView, Pagination},
    db_types::{CartItem, Order, OrderStatusType},
    traits::SettlementError,
};

/// Inserts a new order row. This is not atomic on its own. Embed this call inside a transaction together with the
/// stock reservations and line-item inserts, passing `&mut *tx` as the connection argument.
pub(crate) async fn insert_order(
    user_id: i64,
    total: Money,
    conn: &mut SqliteConnection,
) -> Result<Order, SettlementError> {
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (user_id, total) VALUES ($1, $2)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(total)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub(crate) async fn insert_order_item(
    order_id: i64,
    item: CartItem,
    unit_price: Money,
    conn: &mut SqliteConnection,
) -> Result<(), SettlementError> {
    sqlx::query("INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES ($1, $2, $3, $4)")
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(unit_price)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn fetch_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, SettlementError> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_for_user(
    order_id: i64,
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SettlementError> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND user_id = $2")
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// The order's line items joined with their product names, in insertion order.
pub async fn fetch_items_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItemView>, SettlementError> {
    let items = sqlx::query_as(
        r#"
            SELECT oi.product_id, p.name AS product_name, oi.quantity, oi.unit_price
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY oi.id
        "#,
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

/// One page of a user's orders, newest first.
pub async fn fetch_orders_for_user(
    user_id: i64,
    pagination: &Pagination,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SettlementError> {
    let orders = sqlx::query_as(
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
    )
    .bind(user_id)
    .bind(pagination.limit)
    .bind(pagination.offset())
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

pub async fn count_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<i64, SettlementError> {
    let total = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(conn)
        .await?;
    Ok(total)
}

pub(crate) async fn update_order_status(
    order_id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Order, SettlementError> {
    let result: Option<Order> =
        sqlx::query_as("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(order_id)
            .fetch_optional(conn)
            .await?;
    result.ok_or(SettlementError::OrderNotFound(order_id))
}

/// Moves the order from `from` to `to` only if it is still in `from`. Returns whether the transition was applied.
pub(crate) async fn transition_status(
    order_id: i64,
    from: OrderStatusType,
    to: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<bool, SettlementError> {
    let result =
        sqlx::query("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND status = $3")
            .bind(to)
            .bind(order_id)
            .bind(from)
            .execute(conn)
            .await?;
    let applied = result.rows_affected() == 1;
    if !applied {
        debug!("🗃️ Order #{order_id} was not {from}; status left unchanged");
    }
    Ok(applied)
}

/// True if at least one of the order's line items references a product from a farm owned by the given farmer.
pub async fn farmer_supplies_order(
    order_id: i64,
    farmer_id: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, SettlementError> {
    let supplies = sqlx::query_scalar(
        r#"
            SELECT EXISTS (
                SELECT 1
                FROM order_items oi
                JOIN products p ON p.id = oi.product_id
                JOIN farms f ON f.id = p.farm_id
                WHERE oi.order_id = $1 AND f.farmer_id = $2
            )
        "#,
    )
    .bind(order_id)
    .bind(farmer_id)
    .fetch_one(conn)
    .await?;
    Ok(supplies)
}
