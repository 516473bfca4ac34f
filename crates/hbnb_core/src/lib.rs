//! Core of the HBNB record shell.
//! Typed records, the JSON-backed record store and the command console.

pub mod console;
pub mod logging;
pub mod model;
pub mod store;

pub use console::{Console, ConsoleError, Flow, ShellError, PROMPT};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::kind::{RecordBody, RecordKind};
pub use model::record::{
    record_key, FieldMapping, ModelError, ModelResult, Record, RecordId, CLASS_KEY,
};
pub use model::timestamp::{
    format_timestamp, parse_timestamp, Clock, ManualClock, SystemClock, Timestamp,
    TIMESTAMP_FORMAT,
};
pub use store::{RecordStore, StoreError, StoreResult, DEFAULT_STORE_FILE};

