//! Record domain model.
//!
//! # Responsibility
//! - Define the typed records held by the store.
//! - Own identity, timestamps and the persisted field mapping shape.
//!
//! # Invariants
//! - Every record is identified by an immutable id plus its kind.
//! - Record kinds form a closed set; there is no free-form attribute bag.

pub mod kind;
pub mod record;
pub mod timestamp;
