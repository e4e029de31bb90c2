//! Error type for `cabana-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain rule refused the operation inside a transaction.
  #[error(transparent)]
  Pool(#[from] cabana_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column held a value no domain type accepts.
  #[error("undecodable column value: {0}")]
  Decode(String),
}

impl From<Error> for cabana_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Pool(inner) => inner,
      other => cabana_core::Error::Storage(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
