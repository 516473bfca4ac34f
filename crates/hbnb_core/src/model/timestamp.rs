//! Record timestamps and clock sources.
//!
//! # Responsibility
//! - Own the persisted timestamp text format.
//! - Provide injectable clocks so record lifecycles are testable.
//!
//! # Invariants
//! - Every timestamp produced by a clock has microsecond precision, so the
//!   persisted text form round-trips without loss.
//! - Formatting always emits exactly six fractional digits.

use super::record::{ModelError, ModelResult};
use chrono::{Local, NaiveDateTime, SubsecRound, TimeDelta};
use std::cell::Cell;
use std::rc::Rc;

/// Persisted timestamp format (`YYYY-MM-DDTHH:MM:SS.ffffff`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%6f";

/// Record timestamp. Naive local time, matching the persisted form.
pub type Timestamp = NaiveDateTime;

/// Renders a timestamp in the persisted format.
pub fn format_timestamp(value: &Timestamp) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a timestamp from the persisted format.
///
/// # Errors
/// - Returns `ModelError::InvalidTimestamp` when `value` does not match
///   `TIMESTAMP_FORMAT` exactly.
pub fn parse_timestamp(field: &str, value: &str) -> ModelResult<Timestamp> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| {
        ModelError::InvalidTimestamp {
            field: field.to_string(),
            value: value.to_string(),
        }
    })
}

/// Source of "now" for record lifecycles.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall clock in local time, truncated to microseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Local::now().naive_local().trunc_subsecs(6)
    }
}

/// Deterministic clock for tests and scripted runs.
///
/// Every call to `now()` returns the current instant and then moves the
/// clock forward by `step`. Clones share the same underlying instant, so a
/// test can keep a handle after moving one into a store.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Rc<Cell<Timestamp>>,
    step: TimeDelta,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn at(start: Timestamp) -> Self {
        Self::stepping(start, TimeDelta::zero())
    }

    /// Creates a clock that advances by `step` after every reading.
    pub fn stepping(start: Timestamp, step: TimeDelta) -> Self {
        Self {
            current: Rc::new(Cell::new(start.trunc_subsecs(6))),
            step,
        }
    }

    /// Moves the clock forward. Negative deltas are ignored; time never
    /// goes backwards.
    pub fn advance(&self, delta: TimeDelta) {
        if delta > TimeDelta::zero() {
            self.current
                .set((self.current.get() + delta).trunc_subsecs(6));
        }
    }

    /// Returns the next reading without advancing.
    pub fn peek(&self) -> Timestamp {
        self.current.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let now = self.current.get();
        self.advance(self.step);
        now
    }
}
