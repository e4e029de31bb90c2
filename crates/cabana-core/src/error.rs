//! Error types for `cabana-core`.

use thiserror::Error;
use uuid::Uuid;

/// Every failure a pool operation can report to its caller.
///
/// All variants are recoverable; the caller decides how to present them.
/// Storage failures are carried through [`Error::Storage`] unchanged.
#[derive(Debug, Error)]
pub enum Error {
  #[error("pool is at capacity ({max_capacity} people)")]
  CapacityExceeded { max_capacity: u32 },

  #[error("{person_id} is already inside the pool")]
  DuplicateAccess { person_id: String },

  #[error("access record not found: {0}")]
  AccessNotFound(Uuid),

  #[error("guest not found: {0}")]
  GuestNotFound(Uuid),

  #[error("access {0} has already been closed")]
  AlreadyExited(Uuid),

  #[error("guest {0} is currently inside the pool")]
  HasActiveAccess(Uuid),

  #[error("invalid pool configuration: {0}")]
  InvalidConfig(String),

  #[error("estimated hours must be between 1 and {max}, got {requested}")]
  InvalidDuration { requested: u32, max: u32 },

  #[error("pool access is currently disabled")]
  PoolInactive,

  #[error("invalid registration: {0}")]
  InvalidRegistration(String),

  #[error("invalid department code: {0:?}")]
  InvalidDepartment(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Whether this error means the referenced record does not exist.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::AccessNotFound(_) | Self::GuestNotFound(_))
  }

  /// Whether this error is a conflict with the current ledger state.
  pub fn is_conflict(&self) -> bool {
    matches!(
      self,
      Self::CapacityExceeded { .. }
        | Self::DuplicateAccess { .. }
        | Self::AlreadyExited(_)
        | Self::HasActiveAccess(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
