//! Error types for `gita-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A field is missing, empty, or out of range. `field` names the first
  /// offending field in wire (camelCase) form.
  #[error("{message}")]
  Validation { field: String, message: String },

  #[error("verse {chapter}.{verse} already exists")]
  Duplicate { chapter: u8, verse: u32 },

  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Validation { field: field.into(), message: message.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
