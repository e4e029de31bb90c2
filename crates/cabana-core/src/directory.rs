//! The guest roster, scoped by department.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::{
  Error, Result,
  ledger::Clock,
  person::DepartmentCode,
  registration::{NewRegistration, RegistrationEntry},
  store::{PoolStore, lift},
};

/// Registers, lists and removes guests. Removal is refused while the guest
/// is inside the pool.
pub struct RegistrationDirectory<S> {
  store: Arc<S>,
  clock: Clock,
}

impl<S> Clone for RegistrationDirectory<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), clock: self.clock.clone() }
  }
}

impl<S: PoolStore> RegistrationDirectory<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, clock: Arc::new(Utc::now) }
  }

  /// Replace the clock that stamps `createdAt`.
  pub fn with_clock(mut self, clock: Clock) -> Self {
    self.clock = clock;
    self
  }

  pub async fn register(&self, input: NewRegistration) -> Result<RegistrationEntry> {
    let entry = self
      .store
      .add_registration(input.normalized()?, (self.clock)())
      .await
      .map_err(lift)?;
    info!(
      guest_id = %entry.id,
      department = %entry.department_code,
      guest_type = %entry.guest_type,
      "guest registered"
    );
    Ok(entry)
  }

  pub async fn remove(&self, id: Uuid) -> Result<()> {
    self.store.remove_registration(id).await.map_err(lift)?;
    info!(guest_id = %id, "guest removed");
    Ok(())
  }

  pub async fn get(&self, id: Uuid) -> Result<RegistrationEntry> {
    self
      .store
      .get_registration(id)
      .await
      .map_err(lift)?
      .ok_or(Error::GuestNotFound(id))
  }

  /// Guests registered for `department`, newest first.
  pub async fn list_by_department(
    &self,
    department: &DepartmentCode,
  ) -> Result<Vec<RegistrationEntry>> {
    self
      .store
      .list_registrations(Some(department.clone()))
      .await
      .map_err(lift)
  }

  /// Every registered guest, newest first.
  pub async fn list_all(&self) -> Result<Vec<RegistrationEntry>> {
    self.store.list_registrations(None).await.map_err(lift)
  }
}
