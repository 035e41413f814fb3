//! Error type for `gita-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] gita_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored row violates an invariant the schema should have enforced.
  #[error("corrupt row: {0}")]
  Corrupt(String),

  /// The `(chapter, verse)` UNIQUE constraint rejected a write.
  #[error("verse {chapter}.{verse} already exists")]
  Duplicate { chapter: u8, verse: u32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for gita_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      Error::Duplicate { chapter, verse } => Self::Duplicate { chapter, verse },
      other => Self::Store(Box::new(other)),
    }
  }
}

/// Map a failed write on `(chapter, verse)` to [`Error::Duplicate`] when the
/// UNIQUE constraint was the cause.
pub(crate) fn classify_write(
  err: tokio_rusqlite::Error,
  chapter: u8,
  verse: u32,
) -> Error {
  match &err {
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _))
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
    {
      Error::Duplicate { chapter, verse }
    }
    _ => Error::Database(err),
  }
}
