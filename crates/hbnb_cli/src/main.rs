//! `hbnb` command interpreter.
//!
//! Opens the record store, then executes commands from a script file or
//! standard input. The `(hbnb) ` prompt is shown only when standard input
//! is a terminal.

mod config;

use clap::Parser;
use config::Config;
use hbnb_core::{init_logging, Console, RecordStore, PROMPT};
use log::info;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = Config::parse();
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("hbnb: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let store = RecordStore::open(&config.file)?;
    info!(
        "event=shell_start module=cli status=ok records={} file={}",
        store.len(),
        config.file.display()
    );

    let mut console = Console::new(store, io::stdout().lock());
    match &config.script {
        Some(script) => console.run(BufReader::new(File::open(script)?), None)?,
        None => {
            let stdin = io::stdin();
            let prompt = stdin.is_terminal().then_some(PROMPT);
            console.run(stdin.lock(), prompt)?;
        }
    }

    info!("event=shell_exit module=cli status=ok");
    Ok(())
}
