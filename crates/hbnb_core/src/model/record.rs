//! Record base entity.
//!
//! # Responsibility
//! - Assign identity and lifecycle timestamps to every record.
//! - Convert records to and from their persisted field mapping.
//! - Provide the human-readable representation used by the console.
//!
//! # Invariants
//! - `id` is assigned once and never changes.
//! - `created_at <= updated_at` at all times.
//! - Only fields declared by the record kind can be read or written.

use super::kind::{RecordBody, RecordKind};
use super::timestamp::{format_timestamp, parse_timestamp, Timestamp};
use log::warn;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Key carrying the kind discriminator in a persisted field mapping.
pub const CLASS_KEY: &str = "__class__";
pub const ID_KEY: &str = "id";
pub const CREATED_AT_KEY: &str = "created_at";
pub const UPDATED_AT_KEY: &str = "updated_at";

const READ_ONLY_FIELDS: &[&str] = &[ID_KEY, CREATED_AT_KEY, UPDATED_AT_KEY];

/// Opaque record identifier (UUID v4 text for generated ids).
pub type RecordId = String;

/// Persisted form of one record.
pub type FieldMapping = Map<String, Value>;

pub type ModelResult<T> = Result<T, ModelError>;

/// Error raised by record construction and field access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    InvalidTimestamp { field: String, value: String },
    TimestampOrder { created_at: String, updated_at: String },
    UnknownField { kind: RecordKind, field: String },
    ReadOnlyField(String),
    EmptyId,
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimestamp { field, value } => write!(
                f,
                "invalid timestamp `{value}` in `{field}`; expected YYYY-MM-DDTHH:MM:SS.ffffff"
            ),
            Self::TimestampOrder {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must be >= created_at ({created_at})"
            ),
            Self::UnknownField { kind, field } => {
                write!(f, "unknown field `{field}` for {kind}")
            }
            Self::ReadOnlyField(field) => write!(f, "field `{field}` is read-only"),
            Self::EmptyId => write!(f, "record id cannot be empty"),
        }
    }
}

impl Error for ModelError {}

/// One typed record instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: RecordId,
    created_at: Timestamp,
    updated_at: Timestamp,
    body: RecordBody,
}

impl Record {
    /// Creates a fresh record with a generated id.
    ///
    /// # Invariants
    /// - `created_at == updated_at == now`.
    /// - Every kind field starts unset.
    pub fn new(kind: RecordKind, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            body: RecordBody::empty(kind),
        }
    }

    /// Rebuilds a record from its persisted field mapping.
    ///
    /// `__class__` is ignored; the caller has already chosen `kind` from it.
    /// Missing `id` or timestamps fall back to the fresh-record defaults
    /// (generated id, `now`). Unknown keys are skipped with a warning.
    ///
    /// # Errors
    /// - `ModelError::InvalidTimestamp` when a timestamp is present but not
    ///   in the persisted format.
    /// - `ModelError::TimestampOrder` when `updated_at < created_at`.
    /// - `ModelError::EmptyId` when `id` is present but empty.
    pub fn from_field_mapping(
        kind: RecordKind,
        mapping: &FieldMapping,
        now: Timestamp,
    ) -> ModelResult<Self> {
        let mut record = Self::new(kind, now);

        for (key, value) in mapping {
            let Some(text) = value_to_text(value) else {
                continue;
            };
            match key.as_str() {
                CLASS_KEY => {}
                ID_KEY => {
                    if text.is_empty() {
                        return Err(ModelError::EmptyId);
                    }
                    record.id = text;
                }
                CREATED_AT_KEY => record.created_at = parse_timestamp(CREATED_AT_KEY, &text)?,
                UPDATED_AT_KEY => record.updated_at = parse_timestamp(UPDATED_AT_KEY, &text)?,
                field => match record.body.slot_mut(field) {
                    Some(slot) => *slot = Some(text),
                    None => warn!(
                        "event=record_rebuild module=model status=skip kind={} field={}",
                        kind, field
                    ),
                },
            }
        }

        if record.updated_at < record.created_at {
            return Err(ModelError::TimestampOrder {
                created_at: format_timestamp(&record.created_at),
                updated_at: format_timestamp(&record.updated_at),
            });
        }

        Ok(record)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> RecordKind {
        self.body.kind()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn body(&self) -> &RecordBody {
        &self.body
    }

    /// Composite store key, `"<TypeName>.<id>"`.
    pub fn key(&self) -> String {
        record_key(self.kind(), &self.id)
    }

    /// Refreshes `updated_at`. Never moves it before `created_at`.
    pub fn touch(&mut self, now: Timestamp) {
        self.updated_at = now.max(self.created_at);
    }

    /// Reads one kind field. Unset fields read as `""`.
    ///
    /// Returns `None` for names outside the kind's field set.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.body
            .slot(name)
            .map(|slot| slot.as_deref().unwrap_or(""))
    }

    /// Writes one kind field through the typed field table.
    ///
    /// # Errors
    /// - `ModelError::ReadOnlyField` for `id`, `created_at`, `updated_at`.
    /// - `ModelError::UnknownField` for names the kind does not declare.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> ModelResult<()> {
        if READ_ONLY_FIELDS.contains(&name) {
            return Err(ModelError::ReadOnlyField(name.to_string()));
        }
        let kind = self.kind();
        let slot = self
            .body
            .slot_mut(name)
            .ok_or_else(|| ModelError::UnknownField {
                kind,
                field: name.to_string(),
            })?;
        *slot = Some(value.into());
        Ok(())
    }

    /// Checks that `name` is a writable field of `kind` without a record.
    pub fn check_writable(kind: RecordKind, name: &str) -> ModelResult<()> {
        if READ_ONLY_FIELDS.contains(&name) {
            return Err(ModelError::ReadOnlyField(name.to_string()));
        }
        if kind.fields().contains(&name) {
            Ok(())
        } else {
            Err(ModelError::UnknownField {
                kind,
                field: name.to_string(),
            })
        }
    }

    /// Persisted field mapping, including the `__class__` discriminator.
    pub fn to_field_mapping(&self) -> FieldMapping {
        let mut mapping = self.attributes();
        mapping.insert(
            CLASS_KEY.to_string(),
            Value::String(self.kind().as_str().to_string()),
        );
        mapping
    }

    /// Every set attribute, without the discriminator.
    fn attributes(&self) -> FieldMapping {
        let mut mapping = Map::new();
        mapping.insert(ID_KEY.to_string(), Value::String(self.id.clone()));
        mapping.insert(
            CREATED_AT_KEY.to_string(),
            Value::String(format_timestamp(&self.created_at)),
        );
        mapping.insert(
            UPDATED_AT_KEY.to_string(),
            Value::String(format_timestamp(&self.updated_at)),
        );
        for name in self.kind().fields() {
            if let Some(Some(value)) = self.body.slot(name) {
                mapping.insert((*name).to_string(), Value::String(value.clone()));
            }
        }
        mapping
    }
}

impl Display for Record {
    /// `[TypeName] (id) {attributes}`
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] ({}) {}",
            self.kind(),
            self.id,
            Value::Object(self.attributes())
        )
    }
}

/// Builds the composite store key for a kind and id.
pub fn record_key(kind: RecordKind, id: &str) -> String {
    format!("{}.{}", kind.as_str(), id)
}

/// Text form of a persisted value. `null` means "unset".
pub(crate) fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
