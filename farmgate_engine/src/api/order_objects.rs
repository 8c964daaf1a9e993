use chrono::{DateTime, Utc};
use fg_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{
    db_types::{Order, OrderStatusType},
    traits::SettlementError,
};

//--------------------------------------      Pagination      ---------------------------------------------------------
/// A page request. `page` is 1-based.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    pub fn validate(&self) -> Result<(), SettlementError> {
        if self.page < 1 {
            return Err(SettlementError::InvalidPagination(format!("page must be at least 1, got {}", self.page)));
        }
        if self.limit < 1 {
            return Err(SettlementError::InvalidPagination(format!("limit must be positive, got {}", self.limit)));
        }
        Ok(())
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

//--------------------------------------    OrderItemView     ---------------------------------------------------------
/// One order line, joined with the product's display name.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItemView {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

//--------------------------------------      OrderView       ---------------------------------------------------------
/// An order materialized for display: the order row plus its line items and their product names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub id: i64,
    pub user_id: i64,
    pub total: Money,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

impl OrderView {
    pub fn new(order: Order, items: Vec<OrderItemView>) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            total: order.total,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items,
        }
    }
}

//--------------------------------------   OrderListResult    ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListResult {
    pub orders: Vec<OrderView>,
    pub pagination: PageInfo,
}

impl OrderListResult {
    pub fn new(orders: Vec<OrderView>, total: i64, pagination: &Pagination) -> Self {
        // ceil(total / limit); limit is validated positive before we get here
        let pages = (total + pagination.limit - 1) / pagination.limit;
        Self { orders, pagination: PageInfo { total, page: pagination.page, pages } }
    }
}
