//! Access records: one occupancy session per record.
//!
//! A record is created `Active` on entry and moves to `Completed` exactly once
//! when the exit is marked. There are no other transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  Result, expiry,
  person::{DepartmentCode, PersonRef},
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AccessStatus {
  Active,
  Completed,
}

/// A persisted occupancy session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRecord {
  pub id:                 Uuid,
  pub person:             PersonRef,
  /// Display name captured at entry.
  pub person_name:        Option<String>,
  pub department_code:    DepartmentCode,
  pub entry_time:         DateTime<Utc>,
  pub estimated_hours:    u32,
  pub expected_exit_time: DateTime<Utc>,
  pub actual_exit_time:   Option<DateTime<Utc>>,
  pub status:             AccessStatus,
}

impl AccessRecord {
  pub fn is_active(&self) -> bool { self.status == AccessStatus::Active }
}

/// Input to [`crate::store::PoolStore::open_access`].
/// The record id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAccess {
  pub person:             PersonRef,
  pub person_name:        Option<String>,
  pub entry_time:         DateTime<Utc>,
  pub estimated_hours:    u32,
  pub expected_exit_time: DateTime<Utc>,
}

impl NewAccess {
  pub fn new(
    person: PersonRef,
    entry_time: DateTime<Utc>,
    estimated_hours: u32,
  ) -> Result<Self> {
    Ok(Self {
      person,
      person_name: None,
      entry_time,
      estimated_hours,
      expected_exit_time: expiry::expected_exit(entry_time, estimated_hours)?,
    })
  }

  pub fn with_name(mut self, name: Option<String>) -> Self {
    self.person_name = name.filter(|n| !n.trim().is_empty());
    self
  }

  pub fn department_code(&self) -> &DepartmentCode {
    self.person.department_code()
  }
}

/// Parameters for [`crate::store::PoolStore::list_accesses`].
/// Results are ordered by entry time, newest first.
#[derive(Debug, Clone, Default)]
pub struct AccessFilter {
  pub department:    Option<DepartmentCode>,
  pub status:        Option<AccessStatus>,
  /// Only records that entered at or after this instant.
  pub entered_since: Option<DateTime<Utc>>,
}

impl AccessFilter {
  pub fn active() -> Self {
    Self { status: Some(AccessStatus::Active), ..Default::default() }
  }
}

/// Whether a requester may close `record`: staff may close anything, owners
/// only records of their own department.
pub fn can_close(
  record: &AccessRecord,
  requester_department: Option<&DepartmentCode>,
  requester_is_staff: bool,
) -> bool {
  requester_is_staff || requester_department == Some(&record.department_code)
}
