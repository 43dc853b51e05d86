//! Error type for `weave-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column holds a value outside its domain.
  #[error("invalid {column} value: {value:?}")]
  InvalidValue { column: &'static str, value: String },

  /// The progress row a transactional write depends on is missing.
  #[error("no progress row for user {0}")]
  ProgressMissing(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
