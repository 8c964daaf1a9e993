//! SQLite backend for the FarmGate settlement engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
