//! Read-only occupancy figures derived from a set of access records.
//!
//! Everything here is recomputed on each call. The record set is bounded by
//! the pool's capacity plus the day's history, so there is nothing to cache.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{access::AccessRecord, config::PoolConfig, person::PersonCategory};

/// Number of active records.
pub fn current_occupancy(records: &[AccessRecord]) -> u32 {
  let active = records.iter().filter(|r| r.is_active()).count();
  u32::try_from(active).unwrap_or(u32::MAX)
}

/// Active records split by person class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
  pub owners: u32,
  pub guests: u32,
}

pub fn by_category(records: &[AccessRecord]) -> CategoryCounts {
  records
    .iter()
    .filter(|r| r.is_active())
    .fold(CategoryCounts::default(), |mut acc, r| {
      match r.person.category() {
        PersonCategory::Owner => acc.owners += 1,
        PersonCategory::Guest => acc.guests += 1,
      }
      acc
    })
}

pub fn remaining_capacity(records: &[AccessRecord], max_capacity: u32) -> u32 {
  max_capacity.saturating_sub(current_occupancy(records))
}

/// Occupancy as a percentage of capacity, rounded to the nearest integer.
pub fn occupancy_percent(records: &[AccessRecord], max_capacity: u32) -> u32 {
  if max_capacity == 0 {
    return 100;
  }
  let pct = f64::from(current_occupancy(records)) * 100.0 / f64::from(max_capacity);
  pct.round() as u32
}

/// Coarse occupancy band shown on dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyLevel {
  /// Below 70 %.
  Low,
  /// 70 % up to 90 %.
  High,
  /// 90 % and above.
  Critical,
}

impl OccupancyLevel {
  pub fn from_percent(pct: u32) -> Self {
    match pct {
      0..70 => Self::Low,
      70..90 => Self::High,
      _ => Self::Critical,
    }
  }
}

/// Records whose entry falls on `day` in the building's local `offset`.
pub fn entries_on(
  records: &[AccessRecord],
  day: NaiveDate,
  offset: FixedOffset,
) -> u32 {
  let n = records
    .iter()
    .filter(|r| r.entry_time.with_timezone(&offset).date_naive() == day)
    .count();
  u32::try_from(n).unwrap_or(u32::MAX)
}

/// The summary served to staff and owner dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
  pub current_occupancy:  u32,
  pub max_capacity:       u32,
  pub remaining_capacity: u32,
  pub occupancy_percent:  u32,
  pub level:              OccupancyLevel,
  pub today_entries:      u32,
  pub active_owners:      u32,
  pub active_guests:      u32,
  pub is_open:            bool,
}

impl PoolStats {
  /// Summarise `records` (which must include every active record and every
  /// record entered today) as of `now`.
  pub fn compute(
    config: &PoolConfig,
    records: &[AccessRecord],
    now: DateTime<Utc>,
    offset: FixedOffset,
  ) -> Self {
    let categories = by_category(records);
    let percent = occupancy_percent(records, config.max_capacity);
    let local_now = now.with_timezone(&offset);
    Self {
      current_occupancy:  current_occupancy(records),
      max_capacity:       config.max_capacity,
      remaining_capacity: remaining_capacity(records, config.max_capacity),
      occupancy_percent:  percent,
      level:              OccupancyLevel::from_percent(percent),
      today_entries:      entries_on(records, local_now.date_naive(), offset),
      active_owners:      categories.owners,
      active_guests:      categories.guests,
      is_open:            config.is_open_at(local_now.time()),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;
  use crate::{
    access::fixtures::{completed, guest_record, owner_record},
    expiry,
  };

  fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
  }

  fn sample() -> Vec<AccessRecord> {
    vec![
      owner_record("own-1", "603A", noon(), 1),
      owner_record("own-2", "701B", noon(), 2),
      guest_record("603A", noon(), 1),
      completed(guest_record("603A", noon(), 1)),
    ]
  }

  #[test]
  fn occupancy_counts_only_active_records() {
    let records = sample();
    assert_eq!(current_occupancy(&records), 3);
    assert_eq!(by_category(&records), CategoryCounts { owners: 2, guests: 1 });
  }

  #[test]
  fn remaining_capacity_never_negative() {
    let records = sample();
    assert_eq!(remaining_capacity(&records, 10), 7);
    assert_eq!(remaining_capacity(&records, 3), 0);
    assert_eq!(remaining_capacity(&records, 2), 0);
    assert_eq!(remaining_capacity(&[], 5), 5);
  }

  #[test]
  fn level_bands() {
    assert_eq!(OccupancyLevel::from_percent(0), OccupancyLevel::Low);
    assert_eq!(OccupancyLevel::from_percent(69), OccupancyLevel::Low);
    assert_eq!(OccupancyLevel::from_percent(70), OccupancyLevel::High);
    assert_eq!(OccupancyLevel::from_percent(90), OccupancyLevel::Critical);
    assert_eq!(OccupancyLevel::from_percent(120), OccupancyLevel::Critical);
  }

  #[test]
  fn entries_on_respects_local_offset() {
    let late = Utc.with_ymd_and_hms(2025, 1, 15, 23, 30, 0).unwrap();
    let records = vec![owner_record("own-1", "603A", late, 1)];
    let lima = FixedOffset::west_opt(5 * 3600).unwrap();
    let utc = FixedOffset::east_opt(0).unwrap();
    let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    assert_eq!(entries_on(&records, day, utc), 1);
    assert_eq!(entries_on(&records, day, lima), 1);
    let next = Utc.with_ymd_and_hms(2025, 1, 16, 2, 0, 0).unwrap();
    let records = vec![owner_record("own-1", "603A", next, 1)];
    assert_eq!(entries_on(&records, day, lima), 1);
    assert_eq!(entries_on(&records, day, utc), 0);
  }

  #[test]
  fn stats_summarise_dashboard_figures() {
    let config = PoolConfig { max_capacity: 4, ..PoolConfig::default() };
    let stats = PoolStats::compute(
      &config,
      &sample(),
      noon(),
      FixedOffset::east_opt(0).unwrap(),
    );
    assert_eq!(stats.current_occupancy, 3);
    assert_eq!(stats.remaining_capacity, 1);
    assert_eq!(stats.occupancy_percent, 75);
    assert_eq!(stats.level, OccupancyLevel::High);
    assert_eq!(stats.today_entries, 4);
    assert_eq!(stats.active_owners, 2);
    assert_eq!(stats.active_guests, 1);
    assert!(stats.is_open);
  }

  #[test]
  fn overtime_lists_only_active_records_past_expected_exit() {
    let records = sample();
    let later = noon() + Duration::minutes(90);
    let over = expiry::overtime(&records, later);
    assert_eq!(over.len(), 2);
    assert!(over.iter().all(|r| r.is_active() && r.estimated_hours == 1));
  }
}
