//! Person references: who an access record belongs to.
//!
//! Owners are identified by an opaque id issued by the building's owner
//! directory (outside this service). Guests are identified by the UUID of
//! their [`RegistrationEntry`](crate::registration::RegistrationEntry).

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Department ──────────────────────────────────────────────────────────────

/// A unit identifier such as `603A` (floor, two-digit apartment, tower).
///
/// Stored trimmed and upper-cased so `603a` and `603A ` name the same unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DepartmentCode(String);

impl DepartmentCode {
  pub fn parse(raw: &str) -> Result<Self> {
    let code = raw.trim().to_ascii_uppercase();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
      return Err(Error::InvalidDepartment(raw.to_owned()));
    }
    Ok(Self(code))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  /// Split a conventional `<floor><apartment><tower>` code, e.g. `603A` into
  /// `(6, 3, 'A')`. Returns `None` for codes that don't follow the encoding.
  pub fn parts(&self) -> Option<(u32, u32, char)> {
    let tower = self.0.chars().last()?;
    if !tower.is_ascii_alphabetic() {
      return None;
    }
    let digits = &self.0[..self.0.len() - 1];
    if digits.len() < 3 || !digits.chars().all(|c| c.is_ascii_digit()) {
      return None;
    }
    let (floor, apartment) = digits.split_at(digits.len() - 2);
    Some((floor.parse().ok()?, apartment.parse().ok()?, tower))
  }
}

impl fmt::Display for DepartmentCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl TryFrom<String> for DepartmentCode {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::parse(&value) }
}

impl From<DepartmentCode> for String {
  fn from(value: DepartmentCode) -> Self { value.0 }
}

// ─── Guest type ──────────────────────────────────────────────────────────────

/// Why a guest is allowed in the building.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GuestType {
  /// A family member living in the unit.
  Resident,
  Friend,
  Tenant,
  /// A short-stay rental guest.
  Airbnb,
}

// ─── Person reference ────────────────────────────────────────────────────────

/// The two classes of people the ledger tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonCategory {
  Owner,
  Guest,
}

/// Who an access record belongs to. The person id is the key on which
/// "at most one active access" is enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
  tag = "personType",
  rename_all = "lowercase",
  rename_all_fields = "camelCase"
)]
pub enum PersonRef {
  Owner {
    id:              String,
    department_code: DepartmentCode,
  },
  Guest {
    id:              Uuid,
    department_code: DepartmentCode,
    guest_type:      GuestType,
  },
}

impl PersonRef {
  /// The uniqueness key used by the ledger.
  pub fn person_id(&self) -> String {
    match self {
      Self::Owner { id, .. } => id.clone(),
      Self::Guest { id, .. } => id.hyphenated().to_string(),
    }
  }

  pub fn department_code(&self) -> &DepartmentCode {
    match self {
      Self::Owner { department_code, .. }
      | Self::Guest { department_code, .. } => department_code,
    }
  }

  pub fn category(&self) -> PersonCategory {
    match self {
      Self::Owner { .. } => PersonCategory::Owner,
      Self::Guest { .. } => PersonCategory::Guest,
    }
  }

  pub fn guest_type(&self) -> Option<GuestType> {
    match self {
      Self::Owner { .. } => None,
      Self::Guest { guest_type, .. } => Some(*guest_type),
    }
  }
}
