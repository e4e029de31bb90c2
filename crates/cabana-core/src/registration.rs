//! Guest roster entries.
//!
//! An entry exists independently of any access record: a guest can be
//! registered and never visit the pool. Entries are never updated; they are
//! created and eventually removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  person::{DepartmentCode, GuestType, PersonRef},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationEntry {
  pub id:              Uuid,
  pub first_name:      String,
  pub last_name:       String,
  pub document_number: Option<String>,
  pub guest_type:      GuestType,
  pub department_code: DepartmentCode,
  /// The owner (or staff member) who registered the guest.
  pub registered_by:   String,
  pub created_at:      DateTime<Utc>,
}

impl RegistrationEntry {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }

  /// The person reference the ledger uses for this guest.
  pub fn person(&self) -> PersonRef {
    PersonRef::Guest {
      id:              self.id,
      department_code: self.department_code.clone(),
      guest_type:      self.guest_type,
    }
  }
}

/// Input to [`crate::store::PoolStore::add_registration`].
/// `id` is assigned by the store; `created_at` comes from the directory clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRegistration {
  pub first_name:      String,
  pub last_name:       String,
  pub document_number: Option<String>,
  pub guest_type:      GuestType,
  pub department_code: DepartmentCode,
  pub registered_by:   String,
}

impl NewRegistration {
  /// Trim text fields and reject blank required ones. A blank document
  /// number is treated as absent. Document numbers are not required to be
  /// unique.
  pub fn normalized(self) -> Result<Self> {
    let first_name = required("firstName", self.first_name)?;
    let last_name = required("lastName", self.last_name)?;
    let registered_by = required("registeredBy", self.registered_by)?;
    let document_number = self
      .document_number
      .map(|d| d.trim().to_owned())
      .filter(|d| !d.is_empty());

    Ok(Self {
      first_name,
      last_name,
      document_number,
      guest_type: self.guest_type,
      department_code: self.department_code,
      registered_by,
    })
  }
}

fn required(field: &str, value: String) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::InvalidRegistration(format!("{field} is required")));
  }
  Ok(trimmed.to_owned())
}
