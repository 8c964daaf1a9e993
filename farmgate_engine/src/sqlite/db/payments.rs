use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::{
    api::payment_objects::FarmPayment,
    db_types::{Payment, PaymentStatusType},
    traits::{SettlementAttempt, SettlementError},
};

pub async fn fetch_payment_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, SettlementError> {
    let payment =
        sqlx::query_as("SELECT * FROM payments WHERE order_id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(payment)
}

pub async fn fetch_payment_for_user(
    order_id: i64,
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, SettlementError> {
    let payment = sqlx::query_as(
        r#"
            SELECT p.* FROM payments p
            JOIN orders o ON o.id = p.order_id
            WHERE p.order_id = $1 AND o.user_id = $2
        "#,
    )
    .bind(order_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}

/// Writes a settlement attempt against the order's payment slot: inserted on the first attempt, overwritten on
/// retries. Callers must have already ruled out a `Completed` payment inside the same transaction.
pub(crate) async fn upsert_payment(
    order_id: i64,
    attempt: &SettlementAttempt,
    status: PaymentStatusType,
    paid_at: Option<DateTime<Utc>>,
    conn: &mut SqliteConnection,
) -> Result<Payment, SettlementError> {
    let payment = sqlx::query_as(
        r#"
            INSERT INTO payments (order_id, amount, method, status, transaction_id, paid_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (order_id) DO UPDATE SET
                method = excluded.method,
                status = excluded.status,
                transaction_id = excluded.transaction_id,
                paid_at = excluded.paid_at,
                updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(attempt.amount)
    .bind(attempt.method)
    .bind(status)
    .bind(&attempt.transaction_id)
    .bind(paid_at)
    .fetch_one(conn)
    .await?;
    Ok(payment)
}

/// Every payment whose order draws on the given farm's products, newest first.
pub async fn fetch_payments_for_farm(
    farm_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<FarmPayment>, SettlementError> {
    let payments = sqlx::query_as(
        r#"
            SELECT p.*, o.user_id AS buyer_id, o.total AS order_total
            FROM payments p
            JOIN orders o ON o.id = p.order_id
            WHERE EXISTS (
                SELECT 1 FROM order_items oi
                JOIN products pr ON pr.id = oi.product_id
                WHERE oi.order_id = o.id AND pr.farm_id = $1
            )
            ORDER BY p.created_at DESC, p.id DESC
        "#,
    )
    .bind(farm_id)
    .fetch_all(conn)
    .await?;
    Ok(payments)
}
