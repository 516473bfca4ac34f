//! JSON file backed record store.
//!
//! # Responsibility
//! - Hold the record table and the clock used for record lifecycles.
//! - Serialize the table into one JSON object on every save.
//! - Rebuild the table from that object on reload.
//!
//! # Invariants
//! - `reload` replaces the in-memory table with the file contents.
//! - A missing backing file is an empty store, not an error.
//! - Deletions are only durable after the next `save`.

use super::{StoreError, StoreResult};
use crate::model::kind::RecordKind;
use crate::model::record::{Record, CLASS_KEY};
use crate::model::timestamp::{Clock, SystemClock, Timestamp};
use log::{debug, error, info, warn};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Backing file used when no path is configured.
pub const DEFAULT_STORE_FILE: &str = "file.json";

/// In-memory record table with whole-file JSON persistence.
pub struct RecordStore {
    path: PathBuf,
    records: BTreeMap<String, Record>,
    clock: Box<dyn Clock>,
    loaded: bool,
}

impl RecordStore {
    /// Creates an empty, not yet loaded store using the system clock.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Box::new(SystemClock))
    }

    /// Creates an empty, not yet loaded store with a caller-provided clock.
    pub fn with_clock(path: impl Into<PathBuf>, clock: Box<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            records: BTreeMap::new(),
            clock,
            loaded: false,
        }
    }

    /// Creates a store and loads the backing file.
    ///
    /// # Errors
    /// - Propagates every `reload` error.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::open_with_clock(path, Box::new(SystemClock))
    }

    pub fn open_with_clock(path: impl Into<PathBuf>, clock: Box<dyn Clock>) -> StoreResult<Self> {
        let mut store = Self::with_clock(path, clock);
        store.reload()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `reload` has completed at least once.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Current time according to the store clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Live view of every record, ordered by composite key.
    pub fn all(&self) -> &BTreeMap<String, Record> {
        &self.records
    }

    /// Records of one kind, ordered by composite key.
    pub fn all_of(&self, kind: RecordKind) -> impl Iterator<Item = &Record> {
        self.records
            .values()
            .filter(move |record| record.kind() == kind)
    }

    pub fn count(&self, kind: RecordKind) -> usize {
        self.all_of(kind).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Record> {
        self.records.get_mut(key)
    }

    /// Registers a record under its composite key, replacing any previous
    /// record with the same key. Returns the key.
    pub fn insert(&mut self, record: Record) -> String {
        let key = record.key();
        debug!(
            "event=record_insert module=store status=ok kind={} key={}",
            record.kind(),
            key
        );
        self.records.insert(key.clone(), record);
        key
    }

    /// Constructs a fresh record of `kind` and registers it. Returns the key.
    pub fn create(&mut self, kind: RecordKind) -> String {
        let record = Record::new(kind, self.clock.now());
        self.insert(record)
    }

    /// Removes a record from the table. Not durable until `save`.
    pub fn delete(&mut self, key: &str) -> Option<Record> {
        let removed = self.records.remove(key);
        debug!(
            "event=record_delete module=store status={} key={}",
            if removed.is_some() { "ok" } else { "missing" },
            key
        );
        removed
    }

    /// Refreshes one record's `updated_at`, then saves the whole store.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when `key` is not registered; nothing is
    ///   written in that case.
    /// - Propagates every `save` error.
    pub fn touch_and_save(&mut self, key: &str) -> StoreResult<()> {
        let now = self.clock.now();
        let record = self
            .records
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        record.touch(now);
        self.save()?;
        Ok(())
    }

    /// Writes every record to the backing file as one JSON object.
    ///
    /// Returns the number of records written.
    ///
    /// # Side effects
    /// - Overwrites the backing file in place. The write is not atomic; a
    ///   crash mid-write can leave a truncated file.
    pub fn save(&self) -> StoreResult<usize> {
        let started_at = Instant::now();
        let document: Map<String, Value> = self
            .records
            .iter()
            .map(|(key, record)| (key.clone(), Value::Object(record.to_field_mapping())))
            .collect();

        match self.write_document(&Value::Object(document)) {
            Ok(()) => {
                info!(
                    "event=store_save module=store status=ok records={} duration_ms={}",
                    self.records.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(self.records.len())
            }
            Err(err) => {
                error!(
                    "event=store_save module=store status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Replaces the table with the contents of the backing file.
    ///
    /// Returns the number of records loaded.
    ///
    /// # Errors
    /// - `StoreError::Io` / `StoreError::Json` when the file cannot be read
    ///   or parsed.
    /// - `StoreError::InvalidData` when the document or an entry is not a
    ///   JSON object.
    /// - `StoreError::Model` when an entry cannot be rebuilt, e.g. a
    ///   malformed timestamp. The table is left untouched on error.
    pub fn reload(&mut self) -> StoreResult<usize> {
        let started_at = Instant::now();
        info!("event=store_reload module=store status=start");

        match self.read_records() {
            Ok(records) => {
                self.records = records;
                self.loaded = true;
                info!(
                    "event=store_reload module=store status=ok records={} duration_ms={}",
                    self.records.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(self.records.len())
            }
            Err(err) => {
                error!(
                    "event=store_reload module=store status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn read_records(&self) -> StoreResult<BTreeMap<String, Record>> {
        let mut records = BTreeMap::new();
        if !self.path.exists() {
            info!("event=store_reload module=store status=missing_file");
            return Ok(records);
        }

        let text = std::fs::read_to_string(&self.path)?;
        let document: Value = serde_json::from_str(&text)?;
        let Value::Object(entries) = document else {
            return Err(StoreError::InvalidData(
                "top-level document must be a JSON object".to_string(),
            ));
        };

        for (key, entry) in entries {
            let Value::Object(mapping) = entry else {
                return Err(StoreError::InvalidData(format!(
                    "entry `{key}` must be a JSON object"
                )));
            };

            let discriminator = mapping.get(CLASS_KEY).and_then(Value::as_str);
            let Some(kind) = discriminator.and_then(RecordKind::parse) else {
                warn!(
                    "event=store_reload module=store status=skip key={} class={}",
                    key,
                    discriminator.unwrap_or("<missing>")
                );
                continue;
            };

            let record = Record::from_field_mapping(kind, &mapping, self.clock.now())
                .map_err(|source| StoreError::Model {
                    key: key.clone(),
                    source,
                })?;
            records.insert(record.key(), record);
        }

        Ok(records)
    }

    fn write_document(&self, document: &Value) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string(document)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}
