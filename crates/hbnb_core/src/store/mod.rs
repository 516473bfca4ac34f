//! Record store: in-memory record table plus whole-file JSON persistence.
//!
//! # Responsibility
//! - Own every live record, keyed by `"<TypeName>.<id>"`.
//! - Persist the full table to one JSON document and load it back.
//!
//! # Invariants
//! - Keys are always derived from a record's kind and id.
//! - `save` rewrites the whole backing file; there are no partial writes.
//! - Read paths reject malformed persisted state instead of masking it,
//!   except for unknown discriminators which are skipped.

use crate::model::record::ModelError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod record_store;

pub use record_store::{RecordStore, DEFAULT_STORE_FILE};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store persistence and lookup errors.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidData(String),
    Model { key: String, source: ModelError },
    NotFound(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "invalid store document: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::Model { key, source } => write!(f, "cannot rebuild `{key}`: {source}"),
            Self::NotFound(key) => write!(f, "record not found: {key}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Model { source, .. } => Some(source),
            Self::InvalidData(_) => None,
            Self::NotFound(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
