//! Line-oriented command shell.
//!
//! # Responsibility
//! - Parse interactive input into record commands.
//! - Execute them against an owned `RecordStore` and print the results.
//!
//! # Invariants
//! - The console is the only caller that turns store and model errors into
//!   user-facing messages.

pub mod parse;
pub mod shell;

pub use parse::{parse_line, split_args, Line, Verb};
pub use shell::{Console, ConsoleError, Flow, ShellError, PROMPT};
