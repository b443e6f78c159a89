// Record model: records are open JSON objects. Only two things about them
// are understood here: the `id` field (per-record URLs) and fields whose
// name ends in `_date` (whitespace cleanup before submission).

use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// One roster entry. Unknown fields are passed through untouched.
pub type Record = Map<String, Value>;

/// Ordered list of records as loaded from a data file.
pub type Dataset = Vec<Record>;

/// The object types the subscription API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum RecordType {
    School,
    Section,
    Student,
    Teacher,
    Term,
}

impl RecordType {
    pub const ALL: [RecordType; 5] = [
        RecordType::School,
        RecordType::Section,
        RecordType::Student,
        RecordType::Teacher,
        RecordType::Term,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::School => "school",
            RecordType::Section => "section",
            RecordType::Student => "student",
            RecordType::Teacher => "teacher",
            RecordType::Term => "term",
        }
    }

    /// Path segment of the collection endpoint, e.g. `students`.
    pub fn collection(self) -> String {
        format!("{}s", self.as_str())
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown record type '{0}', expected one of: school, section, student, teacher, term")]
pub struct UnknownRecordType(pub String);

impl FromStr for RecordType {
    type Err = UnknownRecordType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        RecordType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownRecordType(s.to_string()))
    }
}

/// Strip all whitespace from string values of `*_date` fields. Source
/// exports sometimes contain values like `"2019-08- 26"`.
pub fn clean_date_fields(record: &mut Record) {
    for (key, value) in record.iter_mut() {
        if !key.ends_with("_date") {
            continue;
        }
        if let Value::String(s) = value {
            if s.chars().any(char::is_whitespace) {
                s.retain(|c| !c.is_whitespace());
            }
        }
    }
}

/// The record's `id` as a URL path component (not yet encoded).
pub fn record_id(record: &Record) -> Option<String> {
    match record.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
