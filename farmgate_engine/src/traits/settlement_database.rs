use fg_common::Money;
use thiserror::Error;

use crate::{
    api::{
        order_objects::{OrderView, Pagination},
        payment_objects::FarmPayment,
    },
    db_types::{Farm, NewOrder, Order, OrderStatusType, Payment, PaymentMethod, Product},
};

/// The storage contract for the settlement engine.
///
/// Implementations own all transaction boundaries. Every multi-row mutation (placing an order, recording a
/// settlement) must be atomic: either every row change lands, or none do. Authorization decisions do NOT live
/// here; the [`crate::OrderFlowApi`] evaluates them before calling any mutating method.
#[allow(async_fn_in_trait)]
pub trait SettlementDatabase {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Validates the requested items and, in a single atomic transaction, draws down stock for every line and
    /// creates the order with unit prices captured from the catalog.
    ///
    /// Validation short-circuits on the first failing line. If any reservation fails inside the transaction,
    /// the entire order rolls back and no stock mutation is observable.
    async fn place_order(&self, order: NewOrder) -> Result<Order, SettlementError>;

    /// Fetches an order without any ownership scoping.
    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, SettlementError>;

    /// Fetches an order only if it belongs to the given user.
    async fn fetch_order_for_user(&self, order_id: i64, user_id: i64) -> Result<Option<Order>, SettlementError>;

    /// Fetches an order together with its line items and their product names, for display.
    async fn fetch_order_view(&self, order_id: i64) -> Result<Option<OrderView>, SettlementError>;

    /// Returns one page of the user's orders, newest first, along with the total number of orders the user has.
    async fn fetch_orders_for_user(
        &self,
        user_id: i64,
        pagination: &Pagination,
    ) -> Result<(Vec<OrderView>, i64), SettlementError>;

    /// Sets the order's status. The caller is responsible for checking that the transition is allowed.
    async fn update_order_status(&self, order_id: i64, status: OrderStatusType) -> Result<Order, SettlementError>;

    /// Returns true if at least one of the order's line items references a product belonging to a farm owned by
    /// the given farmer.
    async fn farmer_supplies_order(&self, order_id: i64, farmer_id: i64) -> Result<bool, SettlementError>;

    /// Records the outcome of a settlement attempt in a single atomic transaction:
    ///
    /// * If a payment record already exists with `Completed` status, fails with [`SettlementError::AlreadyPaid`]
    ///   and mutates nothing.
    /// * Otherwise the payment record is upserted (inserted on the first attempt, overwritten on retries).
    /// * On an approved attempt, the order advances from `Pending` to `Processing`. Declined attempts leave the
    ///   order untouched.
    ///
    /// Stock is not touched here; draw-down happened once, when the order was placed.
    async fn record_settlement(&self, order_id: i64, attempt: SettlementAttempt) -> Result<Payment, SettlementError>;

    /// Fetches the payment for an order, scoped to the order's owner.
    async fn fetch_payment_for_user(&self, order_id: i64, user_id: i64) -> Result<Option<Payment>, SettlementError>;

    /// Fetches a farm by id.
    async fn fetch_farm(&self, farm_id: i64) -> Result<Option<Farm>, SettlementError>;

    /// Fetches every payment made against orders containing at least one of the farm's products.
    async fn fetch_payments_for_farm(&self, farm_id: i64) -> Result<Vec<FarmPayment>, SettlementError>;

    /// Fetches a product by id.
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, SettlementError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), SettlementError> {
        Ok(())
    }
}

/// The outcome of consulting the settlement gateway, ready to be recorded against an order.
#[derive(Debug, Clone)]
pub struct SettlementAttempt {
    pub amount: Money,
    pub method: PaymentMethod,
    pub transaction_id: String,
    pub approved: bool,
}

#[derive(Debug, Clone, Error)]
pub enum SettlementError {
    #[error("We have an internal database engine error: {0}")]
    DatabaseError(String),
    #[error("Product with id {0} not found")]
    ProductNotFound(i64),
    #[error("Insufficient stock for product {product_id} - {name}: requested {requested}, available {available}")]
    InsufficientStock { product_id: i64, name: String, requested: i64, available: i64 },
    #[error("Order {0} not found")]
    OrderNotFound(i64),
    #[error("No payment found for order {0}")]
    PaymentNotFound(i64),
    #[error("Farm {0} not found")]
    FarmNotFound(i64),
    #[error("Order {0} has already been paid")]
    AlreadyPaid(i64),
    #[error("Order {order_id} is already {status} and cannot change status")]
    OrderAlreadyFinal { order_id: i64, status: OrderStatusType },
    #[error("Not authorized. {0}")]
    Forbidden(String),
    #[error("Invalid order request. {0}")]
    InvalidOrder(String),
    #[error("Invalid order status: {0}")]
    InvalidOrderStatus(String),
    #[error("Invalid payment method: {0}")]
    InvalidPaymentMethod(String),
    #[error("Invalid pagination parameters. {0}")]
    InvalidPagination(String),
}

impl From<sqlx::Error> for SettlementError {
    fn from(e: sqlx::Error) -> Self {
        SettlementError::DatabaseError(e.to_string())
    }
}
