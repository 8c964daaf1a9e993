//! FarmGate Order & Settlement Engine
//!
//! The engine owns the one part of the marketplace where correctness is hard: multi-row state transitions over
//! shared inventory. It is responsible for atomically validating and reserving stock when an order is placed,
//! recording and reconciling payment outcomes, and enforcing who may move an order through its lifecycle.
//!
//! The library is divided into two main sections:
//! 1. Database management and control (the SQLite backend behind [`SqliteDatabase`]). You should never need to
//!    access the database directly; use the public API instead. The exception is the data types used in the
//!    database, which are defined in the [`db_types`] module and are public.
//! 2. The public API ([`OrderFlowApi`]). This is generic over any backend implementing
//!    [`traits::SettlementDatabase`], and is where every authorization decision is made.
//!
//! Catalog management, user registration and credential handling live elsewhere; the engine consumes an
//! authenticated [`db_types::Actor`] and the catalog's product and farm rows.
mod api;

pub mod db_types;
pub mod helpers;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use api::{order_flow_api::OrderFlowApi, order_objects, payment_objects};
