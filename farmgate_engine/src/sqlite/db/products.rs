use log::trace;
use sqlx::SqliteConnection;

use crate::{db_types::Product, traits::SettlementError};

pub async fn fetch_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, SettlementError> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(product)
}

/// Draws down stock for a confirmed demand.
///
/// The availability check and the decrement are a single conditional UPDATE, so two reservations racing on the
/// same product cannot both succeed when their combined quantity exceeds what is available. Callers embed this in
/// the order-placement transaction by passing `&mut *tx`.
pub(crate) async fn reserve_stock(
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<(), SettlementError> {
    let result = sqlx::query(
        r#"
            UPDATE products
            SET quantity_available = quantity_available - $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND quantity_available >= $1
        "#,
    )
    .bind(quantity)
    .bind(product_id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 1 {
        trace!("🗃️ Reserved {quantity} units of product #{product_id}");
        return Ok(());
    }
    // Zero rows hit: the product is either gone or short on stock. Re-read to say which.
    match fetch_product(product_id, conn).await? {
        None => Err(SettlementError::ProductNotFound(product_id)),
        Some(product) => Err(SettlementError::InsufficientStock {
            product_id,
            name: product.name,
            requested: quantity,
            available: product.quantity_available,
        }),
    }
}
