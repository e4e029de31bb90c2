//! Pool configuration and its validation rules.
//!
//! The configuration is a single persisted row. A store with no row behaves
//! as if it held [`PoolConfig::default`]. Changes are expressed as a
//! [`PoolConfigPatch`] and validated as a whole before they are written.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Upper bound for `max_hours_per_visit`.
pub const MAX_HOURS_LIMIT: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfig {
  pub max_capacity:        u32,
  pub max_hours_per_visit: u32,
  #[serde(with = "hhmm")]
  pub opening_time:        NaiveTime,
  #[serde(with = "hhmm")]
  pub closing_time:        NaiveTime,
  pub is_active:           bool,
  pub updated_at:          Option<DateTime<Utc>>,
}

impl Default for PoolConfig {
  fn default() -> Self {
    Self {
      max_capacity:        10,
      max_hours_per_visit: 2,
      opening_time:        NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
      closing_time:        NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
      is_active:           true,
      updated_at:          None,
    }
  }
}

impl PoolConfig {
  /// Check every field constraint.
  pub fn validate(&self) -> Result<()> {
    if self.max_capacity < 1 {
      return Err(Error::InvalidConfig("maxCapacity must be at least 1".into()));
    }
    if !(1..=MAX_HOURS_LIMIT).contains(&self.max_hours_per_visit) {
      return Err(Error::InvalidConfig(format!(
        "maxHoursPerVisit must be between 1 and {MAX_HOURS_LIMIT}"
      )));
    }
    if self.opening_time >= self.closing_time {
      return Err(Error::InvalidConfig(
        "openingTime must be earlier than closingTime".into(),
      ));
    }
    Ok(())
  }

  /// Apply `patch` on top of `self`, returning the validated result.
  /// `self` is left untouched if validation fails.
  pub fn apply(&self, patch: &PoolConfigPatch, at: DateTime<Utc>) -> Result<Self> {
    let mut next = self.clone();
    if let Some(v) = patch.max_capacity {
      next.max_capacity = v;
    }
    if let Some(v) = patch.max_hours_per_visit {
      next.max_hours_per_visit = v;
    }
    if let Some(v) = &patch.opening_time {
      next.opening_time = parse_hhmm(v)?;
    }
    if let Some(v) = &patch.closing_time {
      next.closing_time = parse_hhmm(v)?;
    }
    if let Some(v) = patch.is_active {
      next.is_active = v;
    }
    next.validate()?;
    next.updated_at = Some(at);
    Ok(next)
  }

  /// Whether `time` (building-local) falls within opening hours.
  pub fn is_open_at(&self, time: NaiveTime) -> bool {
    self.is_active && self.opening_time <= time && time < self.closing_time
  }
}

/// A partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfigPatch {
  pub max_capacity:        Option<u32>,
  pub max_hours_per_visit: Option<u32>,
  /// `HH:MM`, 24-hour.
  pub opening_time:        Option<String>,
  pub closing_time:        Option<String>,
  pub is_active:           Option<bool>,
}

impl PoolConfigPatch {
  pub fn is_empty(&self) -> bool { self == &Self::default() }
}

/// Parse a strict `HH:MM` 24-hour time.
pub fn parse_hhmm(s: &str) -> Result<NaiveTime> {
  let bytes = s.as_bytes();
  let well_formed = bytes.len() == 5
    && bytes[2] == b':'
    && bytes
      .iter()
      .enumerate()
      .all(|(i, b)| i == 2 || b.is_ascii_digit());
  if !well_formed {
    return Err(Error::InvalidConfig(format!("{s:?} is not an HH:MM time")));
  }
  NaiveTime::parse_from_str(s, "%H:%M")
    .map_err(|_| Error::InvalidConfig(format!("{s:?} is not an HH:MM time")))
}

pub fn format_hhmm(t: NaiveTime) -> String { t.format("%H:%M").to_string() }

pub(crate) mod hhmm {
  use chrono::NaiveTime;
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&super::format_hhmm(*t))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
    let raw = String::deserialize(d)?;
    super::parse_hhmm(&raw).map_err(D::Error::custom)
  }
}
