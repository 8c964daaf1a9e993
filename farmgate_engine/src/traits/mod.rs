//! Behaviour contracts for the settlement engine.
//!
//! [`SettlementDatabase`] is implemented by storage backends (currently SQLite). [`SettlementGateway`] is the
//! payment-outcome collaborator; the production implementation simulates settlement, and tests substitute a
//! deterministic one.
mod settlement_database;
mod settlement_gateway;

pub use settlement_database::{SettlementAttempt, SettlementDatabase, SettlementError};
pub use settlement_gateway::{FixedSettlementGateway, RandomSettlementGateway, SettlementDecision, SettlementGateway};
