use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::PrimitiveDateTime;
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{ExamAttempt, Question, TermPaper};
use crate::db::types::{AttemptStatus, QuestionType};
use crate::repositories::PaperFilter;
use crate::services::answers::{Answer, AnswerDecodeError};
use crate::services::attempts::SaveResponse;
use crate::services::responses::{ResponseMap, ResponseStatus};
use crate::services::scoring::{self, PaperScore, ScoreMap};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct StartExamRequest {
    #[serde(alias = "paperIds")]
    #[validate(length(min = 1, message = "paper_ids must contain at least one paper"))]
    pub(crate) paper_ids: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SaveResponseRequest {
    #[serde(alias = "questionId")]
    #[validate(length(min = 1, message = "question_id must not be empty"))]
    pub(crate) question_id: String,
    #[serde(default)]
    pub(crate) answer: Value,
    #[serde(default)]
    pub(crate) status: ResponseStatus,
    #[serde(default, alias = "time_spent", alias = "timeSpent")]
    pub(crate) time_spent_seconds: u32,
}

impl SaveResponseRequest {
    pub(crate) fn into_command(self) -> Result<SaveResponse, AnswerDecodeError> {
        Ok(SaveResponse {
            answer: Answer::from_submission(self.answer)?,
            question_id: self.question_id,
            status: self.status,
            time_spent_seconds: self.time_spent_seconds,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PaperQuery {
    #[serde(default)]
    pub(crate) subject_id: Option<String>,
    #[serde(default)]
    pub(crate) term: Option<String>,
    #[serde(default)]
    pub(crate) exam_type: Option<String>,
}

impl From<PaperQuery> for PaperFilter {
    fn from(query: PaperQuery) -> Self {
        fn non_blank(value: Option<String>) -> Option<String> {
            value.filter(|value| !value.trim().is_empty())
        }

        Self {
            subject_id: non_blank(query.subject_id),
            term: non_blank(query.term),
            exam_type: non_blank(query.exam_type),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SaveResponseAck {
    pub(crate) success: bool,
}

/// An attempt as returned to its owner. `overall` is only present once scores exist.
#[derive(Debug, Serialize)]
pub(crate) struct AttemptResponse {
    pub(crate) id: String,
    pub(crate) paper_ids: Vec<String>,
    pub(crate) status: AttemptStatus,
    pub(crate) started_at: String,
    pub(crate) submitted_at: Option<String>,
    pub(crate) total_duration_minutes: i32,
    pub(crate) time_remaining_seconds: i64,
    pub(crate) responses: ResponseMap,
    pub(crate) scores: Option<ScoreMap>,
    pub(crate) overall: Option<PaperScore>,
}

impl AttemptResponse {
    pub(crate) fn from_attempt(attempt: ExamAttempt, now: PrimitiveDateTime) -> Self {
        let time_remaining_seconds = if attempt.is_in_progress() {
            attempt.remaining_seconds_at(now)
        } else {
            attempt.time_remaining_seconds
        };
        let overall = attempt.scores.as_ref().map(scoring::overall);

        Self {
            id: attempt.id,
            paper_ids: attempt.paper_ids,
            status: attempt.status,
            started_at: format_primitive(attempt.started_at),
            submitted_at: attempt.submitted_at.map(format_primitive),
            total_duration_minutes: attempt.total_duration_minutes,
            time_remaining_seconds,
            responses: attempt.responses,
            scores: attempt.scores,
            overall,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PaperDetailResponse {
    #[serde(flatten)]
    pub(crate) paper: TermPaper,
    pub(crate) questions: Vec<PublicQuestion>,
}

/// Question as shown to candidates: no answer key and no per-option correctness flags.
#[derive(Debug, Serialize)]
pub(crate) struct PublicQuestion {
    pub(crate) id: String,
    pub(crate) paper_id: String,
    pub(crate) question_number: i32,
    pub(crate) question_type: QuestionType,
    pub(crate) question_text: String,
    pub(crate) options: Value,
    pub(crate) marks: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) parent_id: Option<String>,
}

impl From<Question> for PublicQuestion {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            paper_id: question.paper_id,
            question_number: question.question_number,
            question_type: question.question_type,
            question_text: question.question_text,
            options: strip_option_keys(question.options),
            marks: question.marks,
            section: question.section,
            parent_id: question.parent_id,
        }
    }
}

fn strip_option_keys(options: Value) -> Value {
    match options {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(mut option) => {
                        option.remove("is_correct");
                        Value::Object(option)
                    }
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}
