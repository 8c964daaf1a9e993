use std::{fmt::Debug, sync::Arc};

use log::*;

use crate::{
    api::{
        order_objects::{OrderListResult, OrderView, Pagination},
        payment_objects::{FarmPayment, PaymentOutcome},
    },
    db_types::{Actor, CartItem, NewOrder, Order, OrderStatusType, Payment, PaymentMethod, PaymentStatusType},
    helpers::new_transaction_id,
    traits::{SettlementAttempt, SettlementDatabase, SettlementDecision, SettlementError, SettlementGateway},
};

/// `OrderFlowApi` is the primary API for the order and settlement flows: placing orders against farm inventory,
/// settling payments against placed orders, and moving orders through their lifecycle.
///
/// Every authorization rule is evaluated here, before any mutating call reaches the database.
pub struct OrderFlowApi<B> {
    db: B,
    gateway: Arc<dyn SettlementGateway>,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, gateway: Arc<dyn SettlementGateway>) -> Self {
        Self { db, gateway }
    }
}

impl<B> OrderFlowApi<B>
where B: SettlementDatabase
{
    /// Place a new order for the calling buyer.
    ///
    /// The buyer id is always taken from the authenticated actor, never from the request payload. On success the
    /// order is returned with its line items materialized for display.
    pub async fn place_order(&self, buyer: &Actor, items: Vec<CartItem>) -> Result<OrderView, SettlementError> {
        let order = self.db.place_order(NewOrder::new(buyer.id, items)).await?;
        debug!("🔄️📦️ Order #{} placed by user #{} for {}", order.id, buyer.id, order.total);
        self.materialize(order.id).await
    }

    /// Fetch a single order. Buyers can only ever see their own orders.
    pub async fn order_for_user(&self, buyer: &Actor, order_id: i64) -> Result<OrderView, SettlementError> {
        let order = self
            .db
            .fetch_order_for_user(order_id, buyer.id)
            .await?
            .ok_or(SettlementError::OrderNotFound(order_id))?;
        self.materialize(order.id).await
    }

    /// Fetch one page of the calling buyer's orders, newest first.
    pub async fn orders_for_user(
        &self,
        buyer: &Actor,
        pagination: Pagination,
    ) -> Result<OrderListResult, SettlementError> {
        pagination.validate()?;
        let (orders, total) = self.db.fetch_orders_for_user(buyer.id, &pagination).await?;
        trace!("🔄️📦️ Fetched {} of {total} orders for user #{}", orders.len(), buyer.id);
        Ok(OrderListResult::new(orders, total, &pagination))
    }

    /// Change an order's status.
    ///
    /// Only farmers may do this, and only for orders containing at least one product from a farm they own.
    /// Orders in a terminal state (`Delivered`, `Cancelled`) cannot change again.
    pub async fn update_order_status(
        &self,
        actor: &Actor,
        order_id: i64,
        new_status: OrderStatusType,
    ) -> Result<Order, SettlementError> {
        if !actor.is_farmer() {
            return Err(SettlementError::Forbidden("Only farmers may update order status".to_string()));
        }
        let order = self.db.fetch_order(order_id).await?.ok_or(SettlementError::OrderNotFound(order_id))?;
        if order.status.is_terminal() {
            return Err(SettlementError::OrderAlreadyFinal { order_id, status: order.status });
        }
        if !self.db.farmer_supplies_order(order_id, actor.id).await? {
            return Err(SettlementError::Forbidden("Not authorized to update this order".to_string()));
        }
        let updated = self.db.update_order_status(order_id, new_status).await?;
        info!("🔄️📦️ Order #{order_id} moved from {} to {} by farmer #{}", order.status, new_status, actor.id);
        Ok(updated)
    }

    /// Attempt to settle payment for one of the calling buyer's orders.
    ///
    /// A fresh transaction id is generated for each attempt and the gateway is consulted for the outcome. The
    /// attempt is recorded atomically; an order whose payment already completed is rejected without touching the
    /// existing record. Declined attempts leave the order `Pending` so the buyer can retry.
    pub async fn process_payment(
        &self,
        buyer: &Actor,
        order_id: i64,
        method: PaymentMethod,
    ) -> Result<PaymentOutcome, SettlementError> {
        let order = self
            .db
            .fetch_order_for_user(order_id, buyer.id)
            .await?
            .ok_or(SettlementError::OrderNotFound(order_id))?;
        // Refuse before consulting the gateway; the recording transaction re-checks atomically.
        if let Some(existing) = self.db.fetch_payment_for_user(order_id, buyer.id).await? {
            if existing.status == PaymentStatusType::Completed {
                return Err(SettlementError::AlreadyPaid(order_id));
            }
        }
        let transaction_id = new_transaction_id();
        let decision = self.gateway.authorize(order.id, order.total);
        let approved = decision == SettlementDecision::Approved;
        let attempt = SettlementAttempt { amount: order.total, method, transaction_id, approved };
        let payment = self.db.record_settlement(order.id, attempt).await?;
        debug!(
            "🔄️💰️ Settlement attempt [{}] for order #{order_id} recorded as {}",
            payment.transaction_id, payment.status
        );
        if approved {
            Ok(PaymentOutcome::settled(payment))
        } else {
            Ok(PaymentOutcome::declined(payment))
        }
    }

    /// Fetch the payment for one of the calling buyer's orders.
    pub async fn payment_for_order(&self, buyer: &Actor, order_id: i64) -> Result<Payment, SettlementError> {
        self.db
            .fetch_payment_for_user(order_id, buyer.id)
            .await?
            .ok_or(SettlementError::PaymentNotFound(order_id))
    }

    /// Fetch every payment against orders containing the given farm's products. Only the farm's owner may call
    /// this.
    pub async fn payments_for_farm(&self, actor: &Actor, farm_id: i64) -> Result<Vec<FarmPayment>, SettlementError> {
        if !actor.is_farmer() {
            return Err(SettlementError::Forbidden("Only farmers may view farm payments".to_string()));
        }
        let farm = self.db.fetch_farm(farm_id).await?.ok_or(SettlementError::FarmNotFound(farm_id))?;
        if farm.farmer_id != actor.id {
            return Err(SettlementError::Forbidden("Not authorized to view this farm's payments".to_string()));
        }
        let payments = self.db.fetch_payments_for_farm(farm_id).await?;
        trace!("🔄️💰️ {} payments fetched for farm #{farm_id}", payments.len());
        Ok(payments)
    }

    async fn materialize(&self, order_id: i64) -> Result<OrderView, SettlementError> {
        self.db.fetch_order_view(order_id).await?.ok_or(SettlementError::OrderNotFound(order_id))
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}
