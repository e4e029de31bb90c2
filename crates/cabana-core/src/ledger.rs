//! The access ledger: admission and exit rules, and the service that applies
//! them through a [`PoolStore`].
//!
//! The rules are pure functions over state a backend reads inside its own
//! transaction. [`AccessLedger`] never checks capacity itself from a stale
//! read; it hands the new record to [`PoolStore::open_access`], which
//! re-reads and decides atomically.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveTime, Offset as _, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  access::{AccessFilter, AccessRecord, AccessStatus, NewAccess},
  config::{PoolConfig, PoolConfigPatch},
  directory::RegistrationDirectory,
  occupancy::PoolStats,
  person::{DepartmentCode, PersonRef},
  store::{PoolStore, lift},
};

// ─── Rules ───────────────────────────────────────────────────────────────────

/// Ledger state observed inside an admission transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdmissionState {
  /// Number of records currently `active`.
  pub active_count:  u32,
  /// Whether the person being admitted already has an `active` record.
  pub person_active: bool,
}

/// Decide whether a person may enter given the current configuration and
/// ledger state.
pub fn check_admission(
  config: &PoolConfig,
  state: AdmissionState,
  input: &NewAccess,
) -> Result<()> {
  if !config.is_active {
    return Err(Error::PoolInactive);
  }
  check_duration(config, input.estimated_hours)?;
  if state.active_count >= config.max_capacity {
    return Err(Error::CapacityExceeded { max_capacity: config.max_capacity });
  }
  if state.person_active {
    return Err(Error::DuplicateAccess { person_id: input.person.person_id() });
  }
  Ok(())
}

pub fn check_duration(config: &PoolConfig, estimated_hours: u32) -> Result<()> {
  if !(1..=config.max_hours_per_visit).contains(&estimated_hours) {
    return Err(Error::InvalidDuration {
      requested: estimated_hours,
      max:       config.max_hours_per_visit,
    });
  }
  Ok(())
}

/// A record may be closed only once.
pub fn check_exit(record: &AccessRecord) -> Result<()> {
  match record.status {
    AccessStatus::Active => Ok(()),
    AccessStatus::Completed => Err(Error::AlreadyExited(record.id)),
  }
}

/// The exit timestamp to store: `now`, but never earlier than the entry.
pub fn exit_time(record: &AccessRecord, now: DateTime<Utc>) -> DateTime<Utc> {
  now.max(record.entry_time)
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Source of "now" for entry and exit timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// The single authority for opening and closing access records.
pub struct AccessLedger<S> {
  store:     Arc<S>,
  directory: RegistrationDirectory<S>,
  clock:     Clock,
  offset:    FixedOffset,
}

impl<S> Clone for AccessLedger<S> {
  fn clone(&self) -> Self {
    Self {
      store:     self.store.clone(),
      directory: self.directory.clone(),
      clock:     self.clock.clone(),
      offset:    self.offset,
    }
  }
}

impl<S: PoolStore> AccessLedger<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      directory: RegistrationDirectory::new(store.clone()),
      store,
      clock: Arc::new(Utc::now),
      offset: Utc.fix(),
    }
  }

  /// Replace the wall clock, e.g. with a fixed instant in tests.
  pub fn with_clock(mut self, clock: Clock) -> Self {
    self.directory = self.directory.with_clock(clock.clone());
    self.clock = clock;
    self
  }

  /// The building's UTC offset, used for "today" and opening hours.
  pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
    self.offset = offset;
    self
  }

  pub fn now(&self) -> DateTime<Utc> { (self.clock)() }

  pub fn directory(&self) -> &RegistrationDirectory<S> { &self.directory }

  // ── Admission ─────────────────────────────────────────────────────────

  /// Register an entry for `person` staying `estimated_hours`.
  pub async fn register_access(
    &self,
    person: PersonRef,
    estimated_hours: u32,
    person_name: Option<String>,
  ) -> Result<AccessRecord> {
    let person_id = person.person_id();
    let input = NewAccess::new(person, self.now(), estimated_hours)
      .inspect_err(|e| warn!(person_id = %person_id, error = %e, "access refused"))?
      .with_name(person_name);

    let record = self
      .store
      .open_access(input)
      .await
      .map_err(lift)
      .inspect_err(|e| warn!(person_id = %person_id, error = %e, "access refused"))?;

    info!(
      access_id = %record.id,
      person_id = %person_id,
      department = %record.department_code,
      hours = record.estimated_hours,
      "access registered"
    );
    Ok(record)
  }

  /// Register an entry for a roster guest, resolving their department,
  /// guest type and name through the directory.
  pub async fn register_guest_access(
    &self,
    guest_id: Uuid,
    estimated_hours: u32,
  ) -> Result<AccessRecord> {
    let entry = self.directory.get(guest_id).await?;
    self
      .register_access(entry.person(), estimated_hours, Some(entry.full_name()))
      .await
  }

  pub async fn register_owner_access(
    &self,
    owner_id: &str,
    department_code: DepartmentCode,
    owner_name: Option<String>,
    estimated_hours: u32,
  ) -> Result<AccessRecord> {
    let id = owner_id.trim();
    if id.is_empty() {
      return Err(Error::InvalidRegistration("owner id is required".into()));
    }
    let person = PersonRef::Owner { id: id.to_owned(), department_code };
    self.register_access(person, estimated_hours, owner_name).await
  }

  // ── Exit ──────────────────────────────────────────────────────────────

  /// Close an active record. Not idempotent: a second call on the same id
  /// fails with [`Error::AlreadyExited`].
  pub async fn mark_exit(&self, access_id: Uuid) -> Result<AccessRecord> {
    let record = self
      .store
      .close_access(access_id, self.now())
      .await
      .map_err(lift)?;
    info!(
      access_id = %record.id,
      person_id = %record.person.person_id(),
      department = %record.department_code,
      "exit marked"
    );
    Ok(record)
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn get(&self, access_id: Uuid) -> Result<AccessRecord> {
    self
      .store
      .get_access(access_id)
      .await
      .map_err(lift)?
      .ok_or(Error::AccessNotFound(access_id))
  }

  pub async fn list(&self, filter: &AccessFilter) -> Result<Vec<AccessRecord>> {
    self.store.list_accesses(filter).await.map_err(lift)
  }

  pub async fn list_active(&self) -> Result<Vec<AccessRecord>> {
    self.list(&AccessFilter::active()).await
  }

  /// Dashboard summary as of now. Counts may be slightly stale by the time
  /// they are displayed; admission never relies on them.
  pub async fn stats(&self) -> Result<PoolStats> {
    let now = self.now();
    let config = self.config().await?;
    let midnight = now
      .with_timezone(&self.offset)
      .date_naive()
      .and_time(NaiveTime::MIN)
      .and_local_timezone(self.offset)
      .earliest()
      .map_or(now, |dt| dt.with_timezone(&Utc));

    let mut records = self.list_active().await?;
    let today = self
      .list(&AccessFilter {
        entered_since: Some(midnight),
        ..Default::default()
      })
      .await?;
    records.extend(today.into_iter().filter(|r| !r.is_active()));

    Ok(PoolStats::compute(&config, &records, now, self.offset))
  }

  // ── Configuration ─────────────────────────────────────────────────────

  pub async fn config(&self) -> Result<PoolConfig> {
    self.store.load_config().await.map_err(lift)
  }

  pub async fn update_config(&self, patch: PoolConfigPatch) -> Result<PoolConfig> {
    let config = self
      .store
      .update_config(patch, self.now())
      .await
      .map_err(lift)?;
    info!(
      max_capacity = config.max_capacity,
      max_hours_per_visit = config.max_hours_per_visit,
      is_active = config.is_active,
      "pool configuration updated"
    );
    Ok(config)
  }
}
