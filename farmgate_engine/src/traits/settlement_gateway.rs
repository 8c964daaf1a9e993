use fg_common::Money;
use log::*;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementDecision {
    Approved,
    Declined,
}

/// The source of settlement outcomes.
///
/// The engine treats the actual movement of funds as an external concern: it asks the gateway for a decision and
/// records the result. Substituting this trait gives deterministic settlement behaviour in tests.
pub trait SettlementGateway: Send + Sync {
    fn authorize(&self, order_id: i64, amount: Money) -> SettlementDecision;
}

/// The stand-in gateway used in production until a real processor is integrated: approves a configurable
/// fraction of attempts (0.9 by default).
#[derive(Debug, Clone, Copy)]
pub struct RandomSettlementGateway {
    success_rate: f64,
}

impl RandomSettlementGateway {
    pub fn new(success_rate: f64) -> Self {
        Self { success_rate: success_rate.clamp(0.0, 1.0) }
    }
}

impl Default for RandomSettlementGateway {
    fn default() -> Self {
        Self { success_rate: 0.9 }
    }
}

impl SettlementGateway for RandomSettlementGateway {
    fn authorize(&self, order_id: i64, amount: Money) -> SettlementDecision {
        let approved = rand::thread_rng().gen::<f64>() < self.success_rate;
        debug!("💳️ Settlement of {amount} for order #{order_id}: {}", if approved { "approved" } else { "declined" });
        if approved {
            SettlementDecision::Approved
        } else {
            SettlementDecision::Declined
        }
    }
}

/// A gateway that always returns the same decision.
#[derive(Debug, Clone, Copy)]
pub struct FixedSettlementGateway(pub SettlementDecision);

impl SettlementGateway for FixedSettlementGateway {
    fn authorize(&self, _order_id: i64, _amount: Money) -> SettlementDecision {
        self.0
    }
}
