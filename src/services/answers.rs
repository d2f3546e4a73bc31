//! Answer payloads and the type-aware comparison used when scoring.
//!
//! Answers arrive as loosely shaped JSON. They are decoded once into [`Answer`]
//! and every later step works on that closed set of cases.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::db::types::QuestionType;

/// A decoded answer value, either submitted by a candidate or stored as the authoritative key.
///
/// Serialized untagged so stored responses keep the shape the client sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum Answer {
    /// Single-choice option id.
    Single(String),
    /// Multi-select option ids. Order is irrelevant for comparison.
    Multi(Vec<String>),
    /// Numeric short answer.
    Numeric(f64),
    /// Short answer key stored as text, compared numerically when it parses.
    NumericText(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum AnswerDecodeError {
    #[error("answer lists may only contain option ids")]
    NonStringOption,
    #[error("unsupported answer shape: {0}")]
    UnsupportedShape(&'static str),
}

impl Answer {
    /// Decodes a submitted answer. `null` means the candidate cleared or skipped the question.
    pub(crate) fn from_submission(value: Value) -> Result<Option<Self>, AnswerDecodeError> {
        match value {
            Value::Null => Ok(None),
            Value::String(text) => Ok(Some(Self::Single(text))),
            Value::Number(number) => number
                .as_f64()
                .map(|parsed| Some(Self::Numeric(parsed)))
                .ok_or(AnswerDecodeError::UnsupportedShape("number")),
            Value::Array(items) => option_ids(items).map(|ids| Some(Self::Multi(ids))),
            Value::Bool(_) => Err(AnswerDecodeError::UnsupportedShape("boolean")),
            Value::Object(_) => Err(AnswerDecodeError::UnsupportedShape("object")),
        }
    }

    /// Decodes the authoritative key of a question. Short-answer keys stored as text become
    /// [`Answer::NumericText`]; everything else is classified purely by its JSON shape.
    ///
    /// A numeric-looking text key deliberately credits `42`, `"42"` and `"42.0"` alike
    /// instead of requiring the exact text.
    pub(crate) fn authoritative(
        question_type: QuestionType,
        value: Value,
    ) -> Result<Option<Self>, AnswerDecodeError> {
        match (question_type, value) {
            (QuestionType::Sa, Value::String(text)) => Ok(Some(Self::NumericText(text))),
            (_, other) => Self::from_submission(other),
        }
    }

    /// Compares a submitted answer against this authoritative answer.
    ///
    /// Dispatch is on the authoritative shape. Never fails: anything that does not line up
    /// is simply not a match.
    pub(crate) fn accepts(&self, submitted: &Answer) -> bool {
        match self {
            Self::Single(expected) => match submitted {
                Self::Single(given) | Self::NumericText(given) => given == expected,
                _ => false,
            },
            Self::Multi(expected) => match submitted {
                Self::Multi(given) => {
                    given.len() == expected.len()
                        && expected.iter().all(|option| given.contains(option))
                }
                _ => false,
            },
            Self::Numeric(expected) => {
                submitted_number(submitted).is_some_and(|given| given == *expected)
            }
            Self::NumericText(expected) => match parse_number(expected) {
                Some(expected) => submitted_number(submitted).is_some_and(|given| given == expected),
                None => matches!(
                    submitted,
                    Self::Single(given) | Self::NumericText(given) if given == expected
                ),
            },
        }
    }
}

fn option_ids(items: Vec<Value>) -> Result<Vec<String>, AnswerDecodeError> {
    items
        .into_iter()
        .map(|item| match item {
            Value::String(id) => Ok(id),
            _ => Err(AnswerDecodeError::NonStringOption),
        })
        .collect()
}

fn submitted_number(submitted: &Answer) -> Option<f64> {
    match submitted {
        Answer::Numeric(value) => Some(*value),
        Answer::Single(text) | Answer::NumericText(text) => parse_number(text),
        Answer::Multi(_) => None,
    }
}

/// Parses text with JSON number grammar, so "42", "4.2e1" and " 42 " parse while
/// "forty-two", "NaN" and "0x2A" do not.
fn parse_number(text: &str) -> Option<f64> {
    serde_json::from_str::<f64>(text).ok()
}

/// Compares a possibly-absent submission against a possibly-absent key. Missing on either
/// side earns nothing.
pub(crate) fn is_correct(authoritative: Option<&Answer>, submitted: Option<&Answer>) -> bool {
    match (authoritative, submitted) {
        (Some(expected), Some(given)) => expected.accepts(given),
        _ => false,
    }
}
