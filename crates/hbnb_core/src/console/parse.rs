//! Command line parsing.
//!
//! # Responsibility
//! - Turn one input line into a `Line` the shell can execute.
//! - Support both `verb Type args` and `Type.verb(args)` syntaxes with one
//!   consistent argument-splitting rule.
//!
//! # Invariants
//! - Parsing never fails; unrecognized input becomes `Line::Unknown`.
//! - Quotes group words and are removed from the resulting arguments.

use crate::model::record::value_to_text;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static DOT_CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\.([A-Za-z_]+)\((.*)\)$").expect("valid dot call regex")
});
static UPDATE_MAPPING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^,{]*?)\s*,\s*(\{.*\})\s*$").expect("valid update mapping regex")
});

/// Commands that operate on records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Create,
    Show,
    Destroy,
    All,
    Update,
    Count,
}

const VERBS: &[Verb] = &[
    Verb::Create,
    Verb::Show,
    Verb::Destroy,
    Verb::All,
    Verb::Update,
    Verb::Count,
];

impl Verb {
    pub fn parse(name: &str) -> Option<Self> {
        VERBS.iter().copied().find(|verb| verb.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Show => "show",
            Self::Destroy => "destroy",
            Self::All => "all",
            Self::Update => "update",
            Self::Count => "count",
        }
    }

    pub fn all() -> &'static [Verb] {
        VERBS
    }

    /// One-line help text.
    pub fn usage(self) -> &'static str {
        match self {
            Self::Create => {
                "create <Type> [field=value ...]: creates a record, saves it and prints its id"
            }
            Self::Show => "show <Type> <id>: prints the string representation of a record",
            Self::Destroy => "destroy <Type> <id>: deletes a record and saves the change",
            Self::All => "all [<Type>]: prints every record, optionally only of one type",
            Self::Update => {
                "update <Type> <id> <field> <value>: sets one field and saves the change"
            }
            Self::Count => "count <Type>: prints the number of records of a type",
        }
    }
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Empty,
    Quit,
    Help(Option<String>),
    Call { verb: Verb, args: Vec<String> },
    /// `Type.update("id", {"field": value, ...})`
    UpdateMany {
        class: String,
        id: String,
        /// `None` for JSON `null` values.
        fields: Vec<(String, Option<String>)>,
    },
    Unknown(String),
}

/// Parses one input line.
pub fn parse_line(line: &str) -> Line {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::Empty;
    }

    if let Some(captures) = DOT_CALL_RE.captures(trimmed) {
        return parse_dot_call(&captures[1], &captures[2], &captures[3])
            .unwrap_or_else(|| Line::Unknown(trimmed.to_string()));
    }

    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest),
        None => (trimmed, ""),
    };

    match head {
        "quit" | "EOF" => Line::Quit,
        "help" => Line::Help(split_args(rest).into_iter().next()),
        _ => match Verb::parse(head) {
            Some(verb) => Line::Call {
                verb,
                args: split_args(rest),
            },
            None => Line::Unknown(trimmed.to_string()),
        },
    }
}

fn parse_dot_call(class: &str, method: &str, inner: &str) -> Option<Line> {
    let verb = Verb::parse(method).filter(|verb| *verb != Verb::Create)?;

    if verb == Verb::Update {
        if let Some(captures) = UPDATE_MAPPING_RE.captures(inner) {
            let id = match split_call_args(&captures[1]).as_slice() {
                [id] => id.clone(),
                _ => return None,
            };
            let mapping: Map<String, Value> = serde_json::from_str(&captures[2]).ok()?;
            let fields = mapping
                .iter()
                .map(|(name, value)| (name.clone(), value_to_text(value)))
                .collect();
            return Some(Line::UpdateMany {
                class: class.to_string(),
                id,
                fields,
            });
        }
    }

    let call_args = split_call_args(inner);
    if call_args.len() > max_call_args(verb) {
        return None;
    }
    let mut args = vec![class.to_string()];
    args.extend(call_args);
    Some(Line::Call { verb, args })
}

// Positional arguments accepted inside `Type.verb(...)`, class excluded.
fn max_call_args(verb: Verb) -> usize {
    match verb {
        Verb::All | Verb::Count => 0,
        Verb::Show | Verb::Destroy => 1,
        Verb::Update => 3,
        Verb::Create => 0,
    }
}

/// Splits arguments on whitespace with shell-style quoting.
///
/// Single and double quotes group words and are removed. A backslash
/// escapes the next character outside single quotes. An unterminated
/// quote runs to the end of the line.
pub fn split_args(text: &str) -> Vec<String> {
    tokenize(text, None)
}

/// Splits the argument list of a `Type.verb(...)` call on commas.
///
/// Quoting follows `split_args`, so a quoted comma stays in its argument.
/// Unquoted whitespace around each argument is dropped.
pub fn split_call_args(text: &str) -> Vec<String> {
    tokenize(text, Some(','))
}

fn tokenize(text: &str, separator: Option<char>) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    // Unquoted whitespace inside a comma-separated argument, kept only if
    // more of the argument follows.
    let mut pending = String::new();
    let mut in_token = false;
    let mut seen_separator = false;
    let mut quote: Option<char> = None;
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some(open), ch) if ch == open => quote = None,
            (Some('"'), '\\') | (None, '\\') => {
                current.push_str(&std::mem::take(&mut pending));
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
                in_token = true;
            }
            (Some(_), ch) => current.push(ch),
            (None, ch) if Some(ch) == separator => {
                args.push(std::mem::take(&mut current));
                pending.clear();
                in_token = false;
                seen_separator = true;
            }
            (None, ch) if ch.is_whitespace() => match separator {
                None => {
                    if in_token {
                        args.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                Some(_) => {
                    if in_token {
                        pending.push(ch);
                    }
                }
            },
            (None, '"' | '\'') => {
                current.push_str(&std::mem::take(&mut pending));
                quote = Some(ch);
                in_token = true;
            }
            (None, ch) => {
                current.push_str(&std::mem::take(&mut pending));
                current.push(ch);
                in_token = true;
            }
        }
    }
    if in_token || seen_separator {
        args.push(current);
    }
    args
}
