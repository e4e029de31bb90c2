//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` suffix) so that string comparison matches time order.
//! UUIDs are stored as hyphenated lowercase strings. Enums use their
//! lowercase names.

use chrono::{DateTime, NaiveTime, SecondsFormat, Utc};
use cabana_core::{
  access::{AccessRecord, AccessStatus, NewAccess},
  config::{PoolConfig, format_hhmm, parse_hhmm},
  person::{DepartmentCode, GuestType, PersonRef},
  registration::{NewRegistration, RegistrationEntry},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ────────────────────────────────────────────────────────────────────

pub fn decode_guest_type(s: &str) -> Result<GuestType> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown guest type: {s:?}")))
}

pub fn decode_status(s: &str) -> Result<AccessStatus> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown access status: {s:?}")))
}

pub fn decode_department(s: &str) -> Result<DepartmentCode> {
  DepartmentCode::parse(s)
    .map_err(|_| Error::Decode(format!("invalid department code: {s:?}")))
}

pub fn decode_hhmm(s: &str) -> Result<NaiveTime> {
  parse_hhmm(s).map_err(|e| Error::Decode(e.to_string()))
}

const OWNER: &str = "owner";
const GUEST: &str = "guest";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawAccess::from_row`].
pub const ACCESS_COLUMNS: &str = "access_id, person_kind, person_id, guest_type, \
   person_name, department_code, entry_time, estimated_hours, \
   expected_exit_time, actual_exit_time, status";

/// Raw values read directly from (or about to be written to) an `accesses` row.
#[derive(Debug, Clone)]
pub struct RawAccess {
  pub access_id:          String,
  pub person_kind:        String,
  pub person_id:          String,
  pub guest_type:         Option<String>,
  pub person_name:        Option<String>,
  pub department_code:    String,
  pub entry_time:         String,
  pub estimated_hours:    u32,
  pub expected_exit_time: String,
  pub actual_exit_time:   Option<String>,
  pub status:             String,
}

impl RawAccess {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      access_id:          row.get(0)?,
      person_kind:        row.get(1)?,
      person_id:          row.get(2)?,
      guest_type:         row.get(3)?,
      person_name:        row.get(4)?,
      department_code:    row.get(5)?,
      entry_time:         row.get(6)?,
      estimated_hours:    row.get(7)?,
      expected_exit_time: row.get(8)?,
      actual_exit_time:   row.get(9)?,
      status:             row.get(10)?,
    })
  }

  /// Encode a not-yet-persisted record under the store-assigned `id`.
  pub fn from_new(id: Uuid, input: &NewAccess) -> Self {
    let (person_kind, guest_type) = match &input.person {
      PersonRef::Owner { .. } => (OWNER, None),
      PersonRef::Guest { guest_type, .. } => {
        (GUEST, Some(guest_type.as_ref().to_owned()))
      }
    };
    Self {
      access_id:          encode_uuid(id),
      person_kind:        person_kind.to_owned(),
      person_id:          input.person.person_id(),
      guest_type,
      person_name:        input.person_name.clone(),
      department_code:    input.department_code().to_string(),
      entry_time:         encode_dt(input.entry_time),
      estimated_hours:    input.estimated_hours,
      expected_exit_time: encode_dt(input.expected_exit_time),
      actual_exit_time:   None,
      status:             AccessStatus::Active.as_ref().to_owned(),
    }
  }

  pub fn into_record(self) -> Result<AccessRecord> {
    let department_code = decode_department(&self.department_code)?;
    let person = match self.person_kind.as_str() {
      OWNER => PersonRef::Owner {
        id:              self.person_id,
        department_code: department_code.clone(),
      },
      GUEST => {
        let guest_type = self
          .guest_type
          .as_deref()
          .ok_or_else(|| Error::Decode("guest access without guest type".into()))
          .and_then(decode_guest_type)?;
        PersonRef::Guest {
          id: decode_uuid(&self.person_id)?,
          department_code: department_code.clone(),
          guest_type,
        }
      }
      other => {
        return Err(Error::Decode(format!("unknown person kind: {other:?}")));
      }
    };

    Ok(AccessRecord {
      id: decode_uuid(&self.access_id)?,
      person,
      person_name: self.person_name,
      department_code,
      entry_time: decode_dt(&self.entry_time)?,
      estimated_hours: self.estimated_hours,
      expected_exit_time: decode_dt(&self.expected_exit_time)?,
      actual_exit_time: self.actual_exit_time.as_deref().map(decode_dt).transpose()?,
      status: decode_status(&self.status)?,
    })
  }
}

/// Column list matching [`RawRegistration::from_row`].
pub const REGISTRATION_COLUMNS: &str = "registration_id, first_name, last_name, \
   document_number, guest_type, department_code, registered_by, created_at";

/// Raw values read directly from (or about to be written to) a
/// `registrations` row.
#[derive(Debug, Clone)]
pub struct RawRegistration {
  pub registration_id: String,
  pub first_name:      String,
  pub last_name:       String,
  pub document_number: Option<String>,
  pub guest_type:      String,
  pub department_code: String,
  pub registered_by:   String,
  pub created_at:      String,
}

impl RawRegistration {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      registration_id: row.get(0)?,
      first_name:      row.get(1)?,
      last_name:       row.get(2)?,
      document_number: row.get(3)?,
      guest_type:      row.get(4)?,
      department_code: row.get(5)?,
      registered_by:   row.get(6)?,
      created_at:      row.get(7)?,
    })
  }

  pub fn from_new(id: Uuid, input: NewRegistration, created_at: DateTime<Utc>) -> Self {
    Self {
      registration_id: encode_uuid(id),
      first_name:      input.first_name,
      last_name:       input.last_name,
      document_number: input.document_number,
      guest_type:      input.guest_type.as_ref().to_owned(),
      department_code: input.department_code.to_string(),
      registered_by:   input.registered_by,
      created_at:      encode_dt(created_at),
    }
  }

  pub fn into_entry(self) -> Result<RegistrationEntry> {
    Ok(RegistrationEntry {
      id:              decode_uuid(&self.registration_id)?,
      first_name:      self.first_name,
      last_name:       self.last_name,
      document_number: self.document_number,
      guest_type:      decode_guest_type(&self.guest_type)?,
      department_code: decode_department(&self.department_code)?,
      registered_by:   self.registered_by,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values of the single `pool_config` row.
#[derive(Debug, Clone)]
pub struct RawConfig {
  pub max_capacity:        u32,
  pub max_hours_per_visit: u32,
  pub opening_time:        String,
  pub closing_time:        String,
  pub is_active:           bool,
  pub updated_at:          Option<String>,
}

impl RawConfig {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      max_capacity:        row.get(0)?,
      max_hours_per_visit: row.get(1)?,
      opening_time:        row.get(2)?,
      closing_time:        row.get(3)?,
      is_active:           row.get(4)?,
      updated_at:          row.get(5)?,
    })
  }

  pub fn from_config(config: &PoolConfig) -> Self {
    Self {
      max_capacity:        config.max_capacity,
      max_hours_per_visit: config.max_hours_per_visit,
      opening_time:        format_hhmm(config.opening_time),
      closing_time:        format_hhmm(config.closing_time),
      is_active:           config.is_active,
      updated_at:          config.updated_at.map(encode_dt),
    }
  }

  pub fn into_config(self) -> Result<PoolConfig> {
    Ok(PoolConfig {
      max_capacity:        self.max_capacity,
      max_hours_per_visit: self.max_hours_per_visit,
      opening_time:        decode_hhmm(&self.opening_time)?,
      closing_time:        decode_hhmm(&self.closing_time)?,
      is_active:           self.is_active,
      updated_at:          self.updated_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}
