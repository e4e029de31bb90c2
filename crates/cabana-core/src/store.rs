//! The `PoolStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `cabana-store-sqlite`).
//! The services in [`crate::ledger`] and [`crate::directory`] depend on this
//! abstraction, not on any concrete backend.
//!
//! Operations that guard an invariant (`open_access`, `close_access`,
//! `remove_registration`, `update_config`) must read the state they check and
//! perform their write as one atomic unit. Backends apply the pure checks from
//! [`crate::ledger`] inside that unit.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  access::{AccessFilter, AccessRecord, NewAccess},
  config::{PoolConfig, PoolConfigPatch},
  person::DepartmentCode,
  registration::{NewRegistration, RegistrationEntry},
};

/// Abstraction over a pool ledger backend.
///
/// Backend errors convert into [`crate::Error`]; domain refusals raised inside
/// a backend transaction must convert back to the same domain variant.
pub trait PoolStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  // ── Configuration ─────────────────────────────────────────────────────

  /// The current configuration, or [`PoolConfig::default`] if none has
  /// been stored yet.
  fn load_config(
    &self,
  ) -> impl Future<Output = Result<PoolConfig, Self::Error>> + Send + '_;

  /// Store `config` only if no configuration exists; return whichever
  /// configuration is current afterwards.
  fn init_config(
    &self,
    config: PoolConfig,
  ) -> impl Future<Output = Result<PoolConfig, Self::Error>> + Send + '_;

  /// Atomically apply `patch` to the current configuration.
  fn update_config(
    &self,
    patch: PoolConfigPatch,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<PoolConfig, Self::Error>> + Send + '_;

  // ── Access records ────────────────────────────────────────────────────

  /// Admit a person: within one atomic unit, re-read the configuration,
  /// the active count, the person's active record and (for guests) the
  /// roster entry, run [`crate::ledger::check_admission`], and insert.
  fn open_access(
    &self,
    input: NewAccess,
  ) -> impl Future<Output = Result<AccessRecord, Self::Error>> + Send + '_;

  /// Close an active record: within one atomic unit, run
  /// [`crate::ledger::check_exit`] and set the exit time.
  fn close_access(
    &self,
    id: Uuid,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<AccessRecord, Self::Error>> + Send + '_;

  /// Retrieve an access record by id. Returns `None` if not found.
  fn get_access(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<AccessRecord>, Self::Error>> + Send + '_;

  /// List access records matching `filter`, newest entry first.
  fn list_accesses<'a>(
    &'a self,
    filter: &'a AccessFilter,
  ) -> impl Future<Output = Result<Vec<AccessRecord>, Self::Error>> + Send + 'a;

  // ── Guest roster ──────────────────────────────────────────────────────

  /// Add a roster entry stamped with `created_at`.
  fn add_registration(
    &self,
    input: NewRegistration,
    created_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<RegistrationEntry, Self::Error>> + Send + '_;

  fn get_registration(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<RegistrationEntry>, Self::Error>>
  + Send
  + '_;

  /// List roster entries, optionally for one department, newest first.
  fn list_registrations(
    &self,
    department: Option<DepartmentCode>,
  ) -> impl Future<Output = Result<Vec<RegistrationEntry>, Self::Error>> + Send + '_;

  /// Delete a roster entry. Fails with [`crate::Error::HasActiveAccess`] if
  /// an active record references it, checked in the same atomic unit as the
  /// delete.
  fn remove_registration(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Lift a backend error into the domain error type.
pub(crate) fn lift<E: Into<crate::Error>>(e: E) -> crate::Error { e.into() }
