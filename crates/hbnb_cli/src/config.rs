//! Process configuration for the `hbnb` binary.
//!
//! Every option can come from a flag or an `HBNB_*` environment variable;
//! flags win.

use clap::Parser;
use hbnb_core::{default_log_level, DEFAULT_STORE_FILE};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "hbnb")]
#[command(about = "Command interpreter for HBNB records", long_about = None)]
#[command(version)]
pub struct Config {
    /// JSON file holding every record
    #[arg(long, env = "HBNB_FILE", default_value = DEFAULT_STORE_FILE)]
    pub file: PathBuf,

    /// Directory for rotating log files; logging is off when unset
    #[arg(long, env = "HBNB_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "HBNB_LOG_LEVEL", default_value = default_log_level())]
    pub log_level: String,

    /// Script to execute instead of reading standard input
    pub script: Option<PathBuf>,
}
