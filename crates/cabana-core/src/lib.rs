//! Core types, policies and services for the Cabana pool access ledger.
//!
//! No HTTP or database code lives here. Storage sits behind
//! [`store::PoolStore`]; the admission, exit and roster-removal rules are
//! pure functions that each backend runs inside its own transaction.

// Store futures carry explicit `Send` bounds in the trait signatures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod config;
pub mod directory;
pub mod error;
pub mod expiry;
pub mod ledger;
pub mod occupancy;
pub mod person;
pub mod registration;
pub mod store;

pub use error::{Error, Result};
