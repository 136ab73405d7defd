//! `KEY: value` line records.
//!
//! Save files hold a single record; catalog files hold several records
//! separated by blank lines. Keys are case-insensitive and stored
//! upper-cased. Values are trimmed; lists are comma separated.

use std::fmt::Write as _;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("line {line}: expected 'KEY: value', got '{text}'")]
    MissingSeparator { line: usize, text: String },

    #[error("missing field '{0}'")]
    MissingKey(String),

    #[error("invalid value for '{key}': '{value}'")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field, replacing an earlier one with the same key.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let key = key.trim().to_uppercase();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_uppercase();
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn require(&self, key: &str) -> Result<&str, RecordError> {
        self.get(key)
            .ok_or_else(|| RecordError::MissingKey(key.to_uppercase()))
    }

    pub fn parse<T: FromStr>(&self, key: &str) -> Result<T, RecordError> {
        let value = self.require(key)?;
        value.parse().map_err(|_| RecordError::InvalidValue {
            key: key.to_uppercase(),
            value: value.to_string(),
        })
    }

    /// Comma separated list; a missing key or empty value is an empty list.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(value) => split_list(value),
            None => Vec::new(),
        }
    }

    /// Optional single value; a missing key or empty value is `None`.
    pub fn optional(&self, key: &str) -> Option<String> {
        self.get(key)
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.fields {
            // writing to a String cannot fail
            let _ = writeln!(out, "{}: {}", key, value);
        }
        out
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_line(line_no: usize, line: &str) -> Result<(String, String), RecordError> {
    let (key, value) = line
        .split_once(':')
        .ok_or_else(|| RecordError::MissingSeparator {
            line: line_no,
            text: line.to_string(),
        })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(RecordError::MissingSeparator {
            line: line_no,
            text: line.to_string(),
        });
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Parses a single record, ignoring blank lines and `#` comments.
pub fn parse_record(text: &str) -> Result<Record, RecordError> {
    let mut record = Record::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = parse_line(idx + 1, line)?;
        record.insert(&key, value);
    }
    Ok(record)
}

/// Parses blank-line separated records.
pub fn parse_records(text: &str) -> Result<Vec<Record>, RecordError> {
    let mut records = Vec::new();
    let mut current = Record::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.starts_with('#') {
            continue;
        }
        if line.is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        }
        let (key, value) = parse_line(idx + 1, line)?;
        current.insert(&key, value);
    }
    if !current.is_empty() {
        records.push(current);
    }

    Ok(records)
}

pub fn join_list(items: &[String]) -> String {
    items.join(",")
}
