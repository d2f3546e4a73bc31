use serde::{Deserialize, Serialize};
use sqlx::Type;

/// Lifecycle of an exam attempt. `Submitted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "attemptstatus", rename_all = "snake_case")]
pub(crate) enum AttemptStatus {
    InProgress,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "questiontype", rename_all = "UPPERCASE")]
pub(crate) enum QuestionType {
    Mcq,
    Msq,
    Sa,
    Comprehension,
}
