//! Structured error types for the reliability engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  /// The failure source is empty; the existing artifact must be left alone.
  #[error("no data: failure source returned no events")]
  NoData,

  #[error("source unavailable: {0}")]
  SourceUnavailable(String),

  #[error("write failure: {0}")]
  WriteFailure(String),

  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("parse: {0}")]
  Parse(String),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl EngineError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn parse(msg: impl Into<String>) -> Self {
    Self::Parse(msg.into())
  }

  pub fn source_unavailable(msg: impl Into<String>) -> Self {
    Self::SourceUnavailable(msg.into())
  }

  pub fn write_failure(msg: impl Into<String>) -> Self {
    Self::WriteFailure(msg.into())
  }

  /// Stable machine-readable tag, used in JSON error lines.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::NoData => "no_data",
      Self::SourceUnavailable(_) => "source_unavailable",
      Self::WriteFailure(_) => "write_failure",
      Self::Validation { .. } => "validation",
      Self::Parse(_) => "parse",
      Self::Json(_) => "json",
    }
  }
}
