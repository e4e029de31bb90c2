//! SQLite backend for the Cabana pool ledger.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every check-and-write operation runs in
//! a `BEGIN IMMEDIATE` transaction, which takes the database write lock before
//! the first read.

mod encode;
mod schema;
mod store;
mod tx;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
