use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::services::answers::Answer;

/// Navigation state shown in the question palette. Scoring ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum ResponseStatus {
    #[default]
    NotVisited,
    Answered,
    NotAnswered,
    Marked,
    AnsweredMarked,
}

/// One question's saved state inside an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ResponseEntry {
    #[serde(default)]
    pub(crate) answer: Option<Answer>,
    #[serde(default)]
    pub(crate) status: ResponseStatus,
    #[serde(default, alias = "time_spent")]
    pub(crate) time_spent_seconds: u32,
}

/// Responses keyed by question id. Ordered so serialized attempts are stable.
pub(crate) type ResponseMap = BTreeMap<String, ResponseEntry>;

impl ResponseEntry {
    pub(crate) fn new(answer: Option<Answer>, status: ResponseStatus, time_spent_seconds: u32) -> Self {
        Self { answer, status, time_spent_seconds }
    }
}
