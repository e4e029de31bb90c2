//! Expected-exit arithmetic and overtime detection.
//!
//! Overtime is informational only. Nothing here closes a record; only an
//! explicit exit does.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, access::AccessRecord, config::MAX_HOURS_LIMIT};

/// `entry_time + hours`, in the same zone as `entry_time`. Fails with
/// [`Error::InvalidDuration`] when the sum is not representable.
pub fn expected_exit(
  entry_time: DateTime<Utc>,
  hours: u32,
) -> Result<DateTime<Utc>> {
  Duration::try_hours(i64::from(hours))
    .and_then(|d| entry_time.checked_add_signed(d))
    .ok_or(Error::InvalidDuration { requested: hours, max: MAX_HOURS_LIMIT })
}

/// Distance between `now` and an expected exit, in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRemaining {
  /// Absolute difference, truncated toward zero.
  pub minutes:     i64,
  /// `true` iff the expected exit is strictly before `now`.
  pub is_overtime: bool,
}

pub fn remaining(
  now: DateTime<Utc>,
  expected_exit_time: DateTime<Utc>,
) -> TimeRemaining {
  let diff = expected_exit_time - now;
  TimeRemaining {
    minutes:     diff.num_minutes().abs(),
    is_overtime: expected_exit_time < now,
  }
}

impl fmt::Display for TimeRemaining {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_overtime {
      write!(f, "{} min over", self.minutes)
    } else if self.minutes < 60 {
      write!(f, "{} min remaining", self.minutes)
    } else {
      write!(f, "{}h {}m remaining", self.minutes / 60, self.minutes % 60)
    }
  }
}

/// Active records whose expected exit has passed.
pub fn overtime(
  records: &[AccessRecord],
  now: DateTime<Utc>,
) -> Vec<&AccessRecord> {
  records
    .iter()
    .filter(|r| r.is_active() && r.expected_exit_time < now)
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, h, m, 0).unwrap()
  }

  #[test]
  fn expected_exit_adds_whole_hours() {
    assert_eq!(expected_exit(at(10, 0), 2).unwrap(), at(12, 0));
  }

  #[test]
  fn unrepresentable_expected_exit_is_an_invalid_duration() {
    assert!(matches!(
      expected_exit(at(10, 0), u32::MAX),
      Err(Error::InvalidDuration { requested: u32::MAX, .. })
    ));
  }

  #[test]
  fn remaining_at_expected_exit_is_zero_and_not_overtime() {
    let exit = expected_exit(at(9, 30), 3).unwrap();
    assert_eq!(remaining(exit, exit), TimeRemaining {
      minutes:     0,
      is_overtime: false,
    });
  }

  #[test]
  fn remaining_before_and_after_expected_exit() {
    let exit = expected_exit(at(10, 0), 2).unwrap();
    assert_eq!(remaining(at(11, 45), exit), TimeRemaining {
      minutes:     15,
      is_overtime: false,
    });
    assert_eq!(remaining(at(12, 10), exit), TimeRemaining {
      minutes:     10,
      is_overtime: true,
    });
  }

  #[test]
  fn partial_minutes_truncate_toward_zero() {
    let exit = at(12, 0);
    let now = exit - Duration::seconds(89);
    assert_eq!(remaining(now, exit).minutes, 1);
    let now = exit + Duration::seconds(59);
    let r = remaining(now, exit);
    assert_eq!(r.minutes, 0);
    assert!(r.is_overtime);
  }

  #[test]
  fn display_forms() {
    let short = TimeRemaining { minutes: 15, is_overtime: false };
    let long = TimeRemaining { minutes: 65, is_overtime: false };
    let over = TimeRemaining { minutes: 10, is_overtime: true };
    assert_eq!(short.to_string(), "15 min remaining");
    assert_eq!(long.to_string(), "1h 5m remaining");
    assert_eq!(over.to_string(), "10 min over");
  }
}
