use fg_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db_types::Payment;

//--------------------------------------   PaymentOutcome     ---------------------------------------------------------
/// The result of a settlement attempt, as reported back to the buyer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub success: bool,
    pub payment: Payment,
    pub message: String,
}

impl PaymentOutcome {
    pub fn settled(payment: Payment) -> Self {
        Self { success: true, payment, message: "Payment processed successfully".to_string() }
    }

    pub fn declined(payment: Payment) -> Self {
        Self { success: false, payment, message: "Payment failed. Please try again.".to_string() }
    }
}

//--------------------------------------     FarmPayment      ---------------------------------------------------------
/// A payment against an order that includes at least one of a farm's products, with enough order context for a
/// farmer to reconcile takings.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FarmPayment {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub payment: Payment,
    pub buyer_id: i64,
    pub order_total: Money,
}
