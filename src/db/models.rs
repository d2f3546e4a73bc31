use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::core::time::elapsed_seconds;
use crate::db::types::{AttemptStatus, QuestionType};
use crate::services::answers::Answer;
use crate::services::responses::ResponseMap;
use crate::services::scoring::ScoreMap;

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct Subject {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) code: String,
    pub(crate) level: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct TermPaper {
    pub(crate) id: String,
    pub(crate) subject_id: String,
    pub(crate) name: String,
    pub(crate) term: String,
    pub(crate) exam_type: String,
    pub(crate) duration_minutes: i32,
    pub(crate) total_marks: f64,
    pub(crate) total_questions: i32,
}

/// A question with its decoded answer key. Not `Serialize`: the key must go through a DTO
/// that decides whether to reveal it.
#[derive(Debug, Clone)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) paper_id: String,
    pub(crate) question_number: i32,
    pub(crate) question_type: QuestionType,
    pub(crate) question_text: String,
    pub(crate) options: serde_json::Value,
    pub(crate) correct_answer: Option<Answer>,
    pub(crate) marks: f64,
    pub(crate) section: Option<String>,
    pub(crate) parent_id: Option<String>,
}

#[derive(Debug, FromRow)]
pub(crate) struct QuestionRow {
    pub(crate) id: String,
    pub(crate) paper_id: String,
    pub(crate) question_number: i32,
    pub(crate) question_type: QuestionType,
    pub(crate) question_text: String,
    pub(crate) options: Json<serde_json::Value>,
    pub(crate) correct_answer: Option<Json<serde_json::Value>>,
    pub(crate) marks: f64,
    pub(crate) section: Option<String>,
    pub(crate) parent_id: Option<String>,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        let correct_answer = match row.correct_answer {
            Some(Json(value)) => Answer::authoritative(row.question_type, value)
                .unwrap_or_else(|err| {
                    tracing::warn!(
                        question_id = %row.id,
                        paper_id = %row.paper_id,
                        error = %err,
                        "Unusable answer key; question can never be credited"
                    );
                    None
                }),
            None => None,
        };

        Self {
            id: row.id,
            paper_id: row.paper_id,
            question_number: row.question_number,
            question_type: row.question_type,
            question_text: row.question_text,
            options: row.options.0,
            correct_answer,
            marks: row.marks.max(0.0),
            section: row.section,
            parent_id: row.parent_id,
        }
    }
}

/// One candidate's timed run through a fixed set of papers.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExamAttempt {
    pub(crate) id: String,
    pub(crate) owner_id: String,
    pub(crate) paper_ids: Vec<String>,
    pub(crate) status: AttemptStatus,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) submitted_at: Option<PrimitiveDateTime>,
    pub(crate) total_duration_minutes: i32,
    pub(crate) time_remaining_seconds: i64,
    pub(crate) responses: ResponseMap,
    pub(crate) scores: Option<ScoreMap>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

impl ExamAttempt {
    pub(crate) fn is_in_progress(&self) -> bool {
        self.status == AttemptStatus::InProgress
    }

    /// Advisory countdown at `now`. Never negative and never enforced.
    pub(crate) fn remaining_seconds_at(&self, now: PrimitiveDateTime) -> i64 {
        let allotted = i64::from(self.total_duration_minutes) * 60;
        (allotted - elapsed_seconds(self.started_at, now)).max(0)
    }

    /// Seals the attempt with its scores. Callers must have checked the status under a lock.
    pub(crate) fn finalize(&mut self, scores: ScoreMap, now: PrimitiveDateTime) {
        self.time_remaining_seconds = self.remaining_seconds_at(now);
        self.scores = Some(scores);
        self.status = AttemptStatus::Submitted;
        self.submitted_at = Some(now);
        self.updated_at = now;
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ExamAttemptRow {
    pub(crate) id: String,
    pub(crate) owner_id: String,
    pub(crate) paper_ids: Json<Vec<String>>,
    pub(crate) status: AttemptStatus,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) submitted_at: Option<PrimitiveDateTime>,
    pub(crate) total_duration_minutes: i32,
    pub(crate) time_remaining_seconds: i64,
    pub(crate) responses: Json<ResponseMap>,
    pub(crate) scores: Option<Json<ScoreMap>>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

impl From<ExamAttemptRow> for ExamAttempt {
    fn from(row: ExamAttemptRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            paper_ids: row.paper_ids.0,
            status: row.status,
            started_at: row.started_at,
            submitted_at: row.submitted_at,
            total_duration_minutes: row.total_duration_minutes,
            time_remaining_seconds: row.time_remaining_seconds,
            responses: row.responses.0,
            scores: row.scores.map(|scores| scores.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
