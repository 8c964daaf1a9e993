//! `SqliteDatabase` is the concrete SQLite implementation of the settlement engine backend.
//!
//! All multi-row mutations run inside a single pool transaction. Stock checks and decrements in particular are a
//! single conditional UPDATE executed within the order-placement transaction, so concurrent placements on the
//! same product serialize at the store rather than racing in application code.
use std::fmt::Debug;

use chrono::Utc;
use fg_common::Money;
use log::*;
use sqlx::SqlitePool;

use super::db::{self, farms, orders, payments, products};
use crate::{
    api::{
        order_objects::{OrderView, Pagination},
        payment_objects::FarmPayment,
    },
    db_types::{Farm, NewOrder, Order, OrderStatusType, Payment, PaymentStatusType, Product},
    traits::{SettlementAttempt, SettlementDatabase, SettlementError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database instance using the URL from the `FG_DATABASE_URL` environment variable.
    pub async fn new(max_connections: u32) -> Result<Self, SettlementError> {
        let url = db::db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SettlementError> {
        let pool = db::new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl SettlementDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn place_order(&self, order: NewOrder) -> Result<Order, SettlementError> {
        if order.items.is_empty() {
            return Err(SettlementError::InvalidOrder("An order needs at least one item".to_string()));
        }
        // Friendly pre-check, short-circuiting on the first bad line. The authoritative stock guard is the
        // conditional decrement inside the transaction below.
        let mut conn = self.pool.acquire().await?;
        let mut priced = Vec::with_capacity(order.items.len());
        let mut total = Money::default();
        for item in &order.items {
            if item.quantity < 1 {
                return Err(SettlementError::InvalidOrder(format!(
                    "Quantity for product {} must be at least 1",
                    item.product_id
                )));
            }
            let product = products::fetch_product(item.product_id, &mut conn)
                .await?
                .ok_or(SettlementError::ProductNotFound(item.product_id))?;
            if product.quantity_available < item.quantity {
                return Err(SettlementError::InsufficientStock {
                    product_id: product.id,
                    name: product.name,
                    requested: item.quantity,
                    available: product.quantity_available,
                });
            }
            total = total + product.price * item.quantity;
            priced.push((*item, product.price));
        }
        drop(conn);

        let mut tx = self.pool.begin().await?;
        for (item, _) in &priced {
            products::reserve_stock(item.product_id, item.quantity, &mut tx).await?;
        }
        let new_order = orders::insert_order(order.user_id, total, &mut tx).await?;
        for (item, unit_price) in &priced {
            orders::insert_order_item(new_order.id, *item, *unit_price, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Order #{} saved with {} line items, total {total}", new_order.id, priced.len());
        Ok(new_order)
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order(order_id, &mut conn).await
    }

    async fn fetch_order_for_user(&self, order_id: i64, user_id: i64) -> Result<Option<Order>, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_for_user(order_id, user_id, &mut conn).await
    }

    async fn fetch_order_view(&self, order_id: i64) -> Result<Option<OrderView>, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        let order = match orders::fetch_order(order_id, &mut conn).await? {
            Some(order) => order,
            None => return Ok(None),
        };
        let items = orders::fetch_items_for_order(order_id, &mut conn).await?;
        Ok(Some(OrderView::new(order, items)))
    }

    async fn fetch_orders_for_user(
        &self,
        user_id: i64,
        pagination: &Pagination,
    ) -> Result<(Vec<OrderView>, i64), SettlementError> {
        let mut conn = self.pool.acquire().await?;
        let page = orders::fetch_orders_for_user(user_id, pagination, &mut conn).await?;
        let total = orders::count_orders_for_user(user_id, &mut conn).await?;
        let mut views = Vec::with_capacity(page.len());
        for order in page {
            let items = orders::fetch_items_for_order(order.id, &mut conn).await?;
            views.push(OrderView::new(order, items));
        }
        Ok((views, total))
    }

    async fn update_order_status(&self, order_id: i64, status: OrderStatusType) -> Result<Order, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_order_status(order_id, status, &mut conn).await?;
        debug!("🗃️ Order #{order_id} status set to {status}");
        Ok(order)
    }

    async fn farmer_supplies_order(&self, order_id: i64, farmer_id: i64) -> Result<bool, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        orders::farmer_supplies_order(order_id, farmer_id, &mut conn).await
    }

    async fn record_settlement(&self, order_id: i64, attempt: SettlementAttempt) -> Result<Payment, SettlementError> {
        let mut tx = self.pool.begin().await?;
        if let Some(existing) = payments::fetch_payment_for_order(order_id, &mut tx).await? {
            if existing.status == PaymentStatusType::Completed {
                return Err(SettlementError::AlreadyPaid(order_id));
            }
        }
        let status = if attempt.approved { PaymentStatusType::Completed } else { PaymentStatusType::Failed };
        let paid_at = attempt.approved.then(Utc::now);
        let payment = payments::upsert_payment(order_id, &attempt, status, paid_at, &mut tx).await?;
        if attempt.approved {
            orders::transition_status(order_id, OrderStatusType::Pending, OrderStatusType::Processing, &mut tx)
                .await?;
        }
        tx.commit().await?;
        debug!("🗃️ Settlement [{}] recorded for order #{order_id}: {status}", payment.transaction_id);
        Ok(payment)
    }

    async fn fetch_payment_for_user(&self, order_id: i64, user_id: i64) -> Result<Option<Payment>, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payment_for_user(order_id, user_id, &mut conn).await
    }

    async fn fetch_farm(&self, farm_id: i64) -> Result<Option<Farm>, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        farms::fetch_farm(farm_id, &mut conn).await
    }

    async fn fetch_payments_for_farm(&self, farm_id: i64) -> Result<Vec<FarmPayment>, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payments_for_farm(farm_id, &mut conn).await
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_product(product_id, &mut conn).await
    }

    async fn close(&mut self) -> Result<(), SettlementError> {
        self.pool.close().await;
        Ok(())
    }
}
