use farmgate_engine::{db_types::CartItem, order_objects::Pagination};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<CartItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub order_id: i64,
    /// One of `CARD`, `BANK_TRANSFER`, `MOBILE_MONEY`, `CASH`.
    pub method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Query parameters for paginated listings; absent values fall back to page 1 with 10 entries.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OrderListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl From<OrderListParams> for Pagination {
    fn from(params: OrderListParams) -> Self {
        let defaults = Pagination::default();
        Pagination::new(params.page.unwrap_or(defaults.page), params.limit.unwrap_or(defaults.limit))
    }
}
