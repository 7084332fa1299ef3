//! Error type for `innorussian-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain rule was violated (duplicate name, unknown parent, ...).
  #[error(transparent)]
  Core(#[from] innorussian_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown card kind: {0:?}")]
  UnknownKind(String),
}

impl From<Error> for innorussian_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      other => innorussian_core::Error::Store(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
