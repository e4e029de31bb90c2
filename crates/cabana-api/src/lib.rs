//! JSON REST API for the Cabana pool ledger.
//!
//! Exposes an axum [`Router`] backed by an [`AccessLedger`] over any
//! [`PoolStore`]. Authentication, TLS and transport concerns are the caller's
//! responsibility; the caller's identity arrives in headers (see
//! [`requester`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(cabana_api::api_router(ledger.clone()))
//! ```

pub mod accesses;
pub mod error;
pub mod guests;
pub mod pool;
pub mod requester;

use axum::{
  Router,
  routing::{delete, get, patch},
};
use cabana_core::{ledger::AccessLedger, store::PoolStore};

pub use error::ApiError;
pub use requester::Requester;

/// Build the API router for `ledger`.
///
/// The returned `Router<()>` can be merged or nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(ledger: AccessLedger<S>) -> Router<()>
where
  S: PoolStore + 'static,
{
  Router::new()
    // Accesses
    .route(
      "/pool/accesses",
      get(accesses::list::<S>).post(accesses::create::<S>),
    )
    .route("/pool/accesses/active", get(accesses::list_active::<S>))
    .route("/pool/accesses/{id}", get(accesses::get_one::<S>))
    .route("/pool/accesses/{id}/exit", patch(accesses::exit::<S>))
    // Occupancy
    .route("/pool/stats", get(pool::stats::<S>))
    // Guest roster
    .route("/pool/guests", get(guests::list::<S>).post(guests::create::<S>))
    .route("/pool/guests/{id}", delete(guests::remove::<S>))
    // Configuration
    .route(
      "/admin/pool-config",
      get(pool::get_config::<S>).put(pool::update_config::<S>),
    )
    .with_state(ledger)
}
