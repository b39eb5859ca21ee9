//! Submission records as decoded from the upstream forms API.
//!
//! A submission carries up to three independent answer collections:
//! `questions`, `calculations` and `urlParameters`. Entry ids are not
//! unique across collections; a filter may match any of the three.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A scalar answer value.
///
/// The upstream API is loosely typed: the same question id may carry a
/// string in one submission and a number in the next. Equality is
/// structural with no coercion; numeric ordering coerces through
/// [`FieldValue::as_f64`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl FieldValue {
    /// Numeric view used by ordering conditions.
    ///
    /// Numbers pass through; strings are parsed. Anything else (and any
    /// unparsable string) yields `None`, which ordering conditions treat
    /// as never-matching rather than as an error.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            FieldValue::String(text) => text.trim().parse().ok(),
            FieldValue::Bool(_) | FieldValue::Null => None,
        }
    }
}

/// One answered entry inside a submission collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub id: String,
    #[serde(default)]
    pub value: FieldValue,
    /// Upstream decorations (`name`, `type`, ...) we relay untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One form submission.
///
/// Absent collections stay absent on the way back out; the proxy must not
/// rewrite payloads it merely filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<AnswerEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculations: Option<Vec<AnswerEntry>>,
    #[serde(
        default,
        rename = "urlParameters",
        skip_serializing_if = "Option::is_none"
    )]
    pub url_parameters: Option<Vec<AnswerEntry>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Submission {
    /// All entries across the three collections, missing ones treated as empty.
    pub fn entries(&self) -> impl Iterator<Item = &AnswerEntry> {
        self.questions
            .iter()
            .flatten()
            .chain(self.calculations.iter().flatten())
            .chain(self.url_parameters.iter().flatten())
    }
}
