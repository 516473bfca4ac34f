//! Interactive command shell over a record store.
//!
//! # Responsibility
//! - Validate command arguments against the record kind whitelist.
//! - Call into the store and print results or literal error messages.
//!
//! # Invariants
//! - Validation failures print one literal message and never abort the
//!   loop.
//! - Every successful mutating command saves the store before returning.
//! - Commands that fail validation never write the backing file.
//! - A command whose save fails leaves the in-memory table as it was.

use super::parse::{parse_line, Line, Verb};
use crate::model::kind::RecordKind;
use crate::model::record::{record_key, ModelError, Record};
use crate::store::{RecordStore, StoreError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{BufRead, Write};

/// Prompt shown before each interactive line.
pub const PROMPT: &str = "(hbnb) ";

/// User-facing command failure, rendered as a literal message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    ClassNameMissing,
    ClassDoesntExist,
    InstanceIdMissing,
    NoInstanceFound,
    AttributeNameMissing,
    ValueMissing,
    AttributeDoesntExist,
    AttributeReadOnly,
    UnknownSyntax(String),
    NoHelp(String),
    Storage(String),
}

impl Display for ShellError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClassNameMissing => write!(f, "** class name missing **"),
            Self::ClassDoesntExist => write!(f, "** class doesn't exist **"),
            Self::InstanceIdMissing => write!(f, "** instance id missing **"),
            Self::NoInstanceFound => write!(f, "** no instance found **"),
            Self::AttributeNameMissing => write!(f, "** attribute name missing **"),
            Self::ValueMissing => write!(f, "** value missing **"),
            Self::AttributeDoesntExist => write!(f, "** attribute doesn't exist **"),
            Self::AttributeReadOnly => write!(f, "** attribute can't be updated **"),
            Self::UnknownSyntax(line) => write!(f, "*** Unknown syntax: {line}"),
            Self::NoHelp(topic) => write!(f, "*** No help on {topic}"),
            Self::Storage(details) => write!(f, "** storage error: {details} **"),
        }
    }
}

impl Error for ShellError {}

impl From<ModelError> for ShellError {
    fn from(value: ModelError) -> Self {
        match value {
            ModelError::ReadOnlyField(_) => Self::AttributeReadOnly,
            ModelError::UnknownField { .. } => Self::AttributeDoesntExist,
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<StoreError> for ShellError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(_) => Self::NoInstanceFound,
            other => {
                error!("event=command module=console status=error error={}", other);
                Self::Storage(other.to_string())
            }
        }
    }
}

/// Failure writing to the console output.
#[derive(Debug)]
pub enum ConsoleError {
    Io(std::io::Error),
}

impl Display for ConsoleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "console i/o failed: {err}"),
        }
    }
}

impl Error for ConsoleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// What the read loop should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

type Reply = Result<Option<String>, ShellError>;

/// Command shell owning a record store and an output sink.
pub struct Console<W: Write> {
    store: RecordStore,
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(store: RecordStore, out: W) -> Self {
        Self { store, out }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_parts(self) -> (RecordStore, W) {
        (self.store, self.out)
    }

    /// Reads lines until `quit`, `EOF` or end of input.
    ///
    /// When `prompt` is set it is printed before every line, and a newline
    /// is printed when input ends.
    pub fn run<R: BufRead>(&mut self, mut input: R, prompt: Option<&str>) -> Result<(), ConsoleError> {
        let mut line = String::new();
        loop {
            if let Some(prompt) = prompt {
                write!(self.out, "{prompt}")?;
                self.out.flush()?;
            }

            line.clear();
            if input.read_line(&mut line)? == 0 {
                if prompt.is_some() {
                    writeln!(self.out)?;
                }
                return Ok(());
            }

            if self.execute_line(line.trim_end_matches(['\n', '\r']))? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Executes one line and prints its output.
    pub fn execute_line(&mut self, line: &str) -> Result<Flow, ConsoleError> {
        let reply = match parse_line(line) {
            Line::Empty => Ok(None),
            Line::Quit => return Ok(Flow::Exit),
            Line::Help(topic) => help(topic.as_deref()),
            Line::Call { verb, args } => self.call(verb, &args),
            Line::UpdateMany { class, id, fields } => self.update_many(&class, &id, &fields),
            Line::Unknown(line) => Err(ShellError::UnknownSyntax(line)),
        };

        match reply {
            Ok(Some(text)) => writeln!(self.out, "{text}")?,
            Ok(None) => {}
            Err(err) => writeln!(self.out, "{err}")?,
        }
        self.out.flush()?;
        Ok(Flow::Continue)
    }

    fn call(&mut self, verb: Verb, args: &[String]) -> Reply {
        let reply = match verb {
            Verb::Create => self.create(args),
            Verb::Show => self.show(args),
            Verb::Destroy => self.destroy(args),
            Verb::All => self.all(args),
            Verb::Update => self.update(args),
            Verb::Count => self.count(args),
        };
        info!(
            "event=command module=console verb={} status={}",
            verb.as_str(),
            if reply.is_ok() { "ok" } else { "rejected" }
        );
        reply
    }

    fn create(&mut self, args: &[String]) -> Reply {
        let kind = require_kind(args)?;
        let mut record = Record::new(kind, self.store.now());
        for arg in &args[1..] {
            if let Some((name, value)) = arg.split_once('=') {
                record.set_field(name, value)?;
            }
        }

        let id = record.id().to_string();
        let key = self.store.insert(record);
        if let Err(err) = self.store.touch_and_save(&key) {
            self.store.delete(&key);
            return Err(err.into());
        }
        Ok(Some(id))
    }

    fn show(&mut self, args: &[String]) -> Reply {
        let key = self.require_key(args)?;
        let record = self.store.get(&key).ok_or(ShellError::NoInstanceFound)?;
        Ok(Some(record.to_string()))
    }

    fn destroy(&mut self, args: &[String]) -> Reply {
        let key = self.require_key(args)?;
        let removed = self.store.delete(&key);
        if let Err(err) = self.store.save() {
            if let Some(record) = removed {
                self.store.insert(record);
            }
            return Err(err.into());
        }
        Ok(None)
    }

    fn all(&mut self, args: &[String]) -> Reply {
        let rendered: Vec<String> = match args.first() {
            None => self.store.all().values().map(Record::to_string).collect(),
            Some(_) => {
                let kind = require_kind(args)?;
                self.store.all_of(kind).map(Record::to_string).collect()
            }
        };
        Ok(Some(format!("[{}]", rendered.join(", "))))
    }

    fn update(&mut self, args: &[String]) -> Reply {
        let key = self.require_key(args)?;
        let name = args.get(2).ok_or(ShellError::AttributeNameMissing)?;
        let value = args.get(3).ok_or(ShellError::ValueMissing)?;

        let record = self
            .store
            .get_mut(&key)
            .ok_or(ShellError::NoInstanceFound)?;
        let previous = record.clone();
        record.set_field(name, value.as_str())?;
        self.save_or_restore(&key, previous)?;
        Ok(None)
    }

    fn update_many(
        &mut self,
        class: &str,
        id: &str,
        fields: &[(String, Option<String>)],
    ) -> Reply {
        let args = [class.to_string(), id.to_string()];
        let key = self.require_key(&args)?;
        let kind = require_kind(&args)?;
        if fields.is_empty() {
            return Err(ShellError::AttributeNameMissing);
        }
        let mut updates = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            Record::check_writable(kind, name)?;
            let value = value.as_deref().ok_or(ShellError::ValueMissing)?;
            updates.push((name.as_str(), value));
        }

        let record = self
            .store
            .get_mut(&key)
            .ok_or(ShellError::NoInstanceFound)?;
        let previous = record.clone();
        for (name, value) in updates {
            record.set_field(name, value)?;
        }
        self.save_or_restore(&key, previous)?;
        info!(
            "event=command module=console verb=update status=ok fields={}",
            fields.len()
        );
        Ok(None)
    }

    fn count(&mut self, args: &[String]) -> Reply {
        let kind = require_kind(args)?;
        Ok(Some(self.store.count(kind).to_string()))
    }

    // Puts `previous` back when the save fails so memory matches the file.
    fn save_or_restore(&mut self, key: &str, previous: Record) -> Result<(), ShellError> {
        if let Err(err) = self.store.touch_and_save(key) {
            self.store.insert(previous);
            return Err(err.into());
        }
        Ok(())
    }

    fn require_key(&self, args: &[String]) -> Result<String, ShellError> {
        let kind = require_kind(args)?;
        let id = args.get(1).ok_or(ShellError::InstanceIdMissing)?;
        let key = record_key(kind, id);
        if self.store.get(&key).is_none() {
            return Err(ShellError::NoInstanceFound);
        }
        Ok(key)
    }
}

fn require_kind(args: &[String]) -> Result<RecordKind, ShellError> {
    let name = args.first().ok_or(ShellError::ClassNameMissing)?;
    RecordKind::parse(name).ok_or(ShellError::ClassDoesntExist)
}

fn help(topic: Option<&str>) -> Reply {
    match topic {
        None => {
            let mut names: Vec<&str> = Verb::all().iter().map(|verb| verb.as_str()).collect();
            names.extend(["help", "quit", "EOF"]);
            Ok(Some(format!(
                "Documented commands (type help <topic>):\n{}",
                names.join("  ")
            )))
        }
        Some("quit") | Some("EOF") => Ok(Some("Exits the command interpreter".to_string())),
        Some("help") => Ok(Some("Provides a description of a given command".to_string())),
        Some(name) => Verb::parse(name)
            .map(|verb| Some(verb.usage().to_string()))
            .ok_or_else(|| ShellError::NoHelp(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{help, ShellError};
    use crate::model::kind::RecordKind;
    use crate::model::record::ModelError;

    #[test]
    fn literal_messages_are_stable() {
        assert_eq!(ShellError::ClassNameMissing.to_string(), "** class name missing **");
        assert_eq!(ShellError::ClassDoesntExist.to_string(), "** class doesn't exist **");
        assert_eq!(ShellError::InstanceIdMissing.to_string(), "** instance id missing **");
        assert_eq!(ShellError::NoInstanceFound.to_string(), "** no instance found **");
        assert_eq!(
            ShellError::AttributeNameMissing.to_string(),
            "** attribute name missing **"
        );
        assert_eq!(ShellError::ValueMissing.to_string(), "** value missing **");
    }

    #[test]
    fn model_errors_map_to_attribute_messages() {
        let unknown = ShellError::from(ModelError::UnknownField {
            kind: RecordKind::User,
            field: "age".to_string(),
        });
        assert_eq!(unknown, ShellError::AttributeDoesntExist);

        let read_only = ShellError::from(ModelError::ReadOnlyField("id".to_string()));
        assert_eq!(read_only, ShellError::AttributeReadOnly);
    }

    #[test]
    fn help_covers_every_verb() {
        let listing = help(None).unwrap().unwrap();
        for name in ["create", "show", "destroy", "all", "update", "count", "quit"] {
            assert!(listing.contains(name), "missing {name} in help listing");
        }
        assert!(help(Some("count")).unwrap().unwrap().starts_with("count <Type>"));
        assert_eq!(
            help(Some("fly")).unwrap_err(),
            ShellError::NoHelp("fly".to_string())
        );
    }
}
