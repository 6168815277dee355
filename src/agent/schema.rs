//! Declarative Response Schemas
//!
//! A schema is a small value describing the shape an agent expects, so the
//! validator is one function over data instead of per-agent branching.
//! Checks are deliberately loose: unknown keys are ignored and only the
//! primitive kind of each required field is inspected.

use serde_json::Value;
use std::fmt;

use crate::types::lenient_integer;

/// Expected kind of a field value
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Integer no smaller than `min`; integral floats and numeric strings count
    Integer { min: i64 },
    Text,
    /// Array of strings
    TextList,
    /// String or null
    NullableText,
    /// Array of nested records
    Records(&'static RecordSchema),
}

/// One key of a record
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub kind: FieldKind,
    /// Optional fields may be absent; if present they must match `kind`
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(key: &'static str, kind: FieldKind) -> Self {
        Self { key, kind, required: true }
    }

    pub const fn optional(key: &'static str, kind: FieldKind) -> Self {
        Self { key, kind, required: false }
    }
}

/// Shape of one JSON object
#[derive(Debug)]
pub struct RecordSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

/// Top-level expectation for an agent's extracted candidate
#[derive(Debug, Clone, Copy)]
pub enum Schema {
    /// A sequence where every element matches the record schema
    Sequence(&'static RecordSchema),
    /// A bare string equal to one of the literals
    Literal(&'static [&'static str]),
}

/// First reason a candidate was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    NotASequence,
    NotARecord { index: usize },
    MissingKey { index: usize, key: &'static str },
    WrongKind { index: usize, key: &'static str },
    UnknownLiteral(String),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotASequence => write!(f, "expected a JSON array"),
            Self::NotARecord { index } => write!(f, "element {} is not an object", index),
            Self::MissingKey { index, key } => write!(f, "element {} is missing '{}'", index, key),
            Self::WrongKind { index, key } => {
                write!(f, "element {} has the wrong type for '{}'", index, key)
            }
            Self::UnknownLiteral(s) => write!(f, "unexpected value {:?}", s),
        }
    }
}

pub static QUESTION_RECORD: RecordSchema = RecordSchema {
    name: "Question",
    fields: &[
        FieldSpec::required("id", FieldKind::Integer { min: 1 }),
        FieldSpec::required("question", FieldKind::Text),
    ],
};

pub static TRACK_RECORD: RecordSchema = RecordSchema {
    name: "CareerTrack",
    fields: &[
        FieldSpec::required("title", FieldKind::Text),
        FieldSpec::required("avgSalary", FieldKind::Text),
        FieldSpec::required("skills", FieldKind::TextList),
        FieldSpec::required("tools", FieldKind::TextList),
        FieldSpec::required("growth", FieldKind::Text),
    ],
};

pub static TASK_RECORD: RecordSchema = RecordSchema {
    name: "RoadmapTask",
    fields: &[
        FieldSpec::required("task", FieldKind::Text),
        FieldSpec::optional("resourceLink", FieldKind::NullableText),
    ],
};

pub static WEEK_RECORD: RecordSchema = RecordSchema {
    name: "RoadmapWeek",
    fields: &[
        FieldSpec::required("week", FieldKind::Integer { min: 1 }),
        FieldSpec::required("tasks", FieldKind::Records(&TASK_RECORD)),
    ],
};

pub static QUESTION_SCHEMA: Schema = Schema::Sequence(&QUESTION_RECORD);
pub static TRACK_SCHEMA: Schema = Schema::Sequence(&TRACK_RECORD);
pub static ROADMAP_SCHEMA: Schema = Schema::Sequence(&WEEK_RECORD);
pub static LEVEL_SCHEMA: Schema = Schema::Literal(&["Beginner", "Intermediate", "Advanced"]);

/// Does `candidate` satisfy `schema`?
pub fn validate(candidate: &Value, schema: &Schema) -> bool {
    schema.check(candidate).is_ok()
}

impl Schema {
    /// Like `validate`, but reports the first violation
    pub fn check(&self, candidate: &Value) -> Result<(), Violation> {
        match self {
            Self::Sequence(record) => record.check_sequence(candidate),
            Self::Literal(allowed) => match candidate {
                Value::String(s) if allowed.contains(&s.as_str()) => Ok(()),
                Value::String(s) => Err(Violation::UnknownLiteral(s.clone())),
                other => Err(Violation::UnknownLiteral(other.to_string())),
            },
        }
    }
}

impl RecordSchema {
    fn check_sequence(&self, candidate: &Value) -> Result<(), Violation> {
        let items = candidate.as_array().ok_or(Violation::NotASequence)?;
        for (index, item) in items.iter().enumerate() {
            self.check_record(index, item)?;
        }
        Ok(())
    }

    fn check_record(&self, index: usize, item: &Value) -> Result<(), Violation> {
        let object = item.as_object().ok_or(Violation::NotARecord { index })?;

        for field in self.fields {
            match object.get(field.key) {
                None if field.required => {
                    return Err(Violation::MissingKey { index, key: field.key });
                }
                None => {}
                Some(value) => {
                    if !field.kind.matches(value) {
                        return Err(Violation::WrongKind { index, key: field.key });
                    }
                }
            }
        }

        Ok(())
    }
}

impl FieldKind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Integer { min } => match value {
                Value::Number(n) if n.as_u64().is_some() && n.as_i64().is_none() => true,
                _ => lenient_integer(value).map(|v| v >= *min).unwrap_or(false),
            },
            Self::Text => value.is_string(),
            Self::TextList => value
                .as_array()
                .map(|items| items.iter().all(Value::is_string))
                .unwrap_or(false),
            Self::NullableText => value.is_string() || value.is_null(),
            Self::Records(record) => record.check_sequence(value).is_ok(),
        }
    }
}
