//! The attempt state machine: `IN_PROGRESS` until a single successful submit moves it to
//! the terminal `SUBMITTED` state.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::core::config::ExamSettings;
use crate::core::metrics;
use crate::core::time::primitive_now_utc;
use crate::db::models::ExamAttempt;
use crate::db::types::AttemptStatus;
use crate::repositories::{AttemptRepository, PaperCatalog, WriteOutcome};
use crate::services::answers::Answer;
use crate::services::responses::{ResponseEntry, ResponseMap, ResponseStatus};
use crate::services::scoring::{self, QuestionSets};

#[derive(Debug, Error)]
pub(crate) enum AttemptError {
    #[error("{0}")]
    Validation(String),
    #[error("Exam attempt not found")]
    NotFound,
    #[error("{0}")]
    InvalidState(String),
    #[error("Question bank unavailable: {0:#}")]
    Dependency(anyhow::Error),
    #[error("Attempt storage failed: {0:#}")]
    Storage(anyhow::Error),
}

pub(crate) type AttemptResult<T> = Result<T, AttemptError>;

/// One decoded save-response request.
#[derive(Debug, Clone)]
pub(crate) struct SaveResponse {
    pub(crate) question_id: String,
    pub(crate) answer: Option<Answer>,
    pub(crate) status: ResponseStatus,
    pub(crate) time_spent_seconds: u32,
}

#[derive(Clone)]
pub(crate) struct AttemptService {
    attempts: Arc<dyn AttemptRepository>,
    catalog: Arc<dyn PaperCatalog>,
    settings: ExamSettings,
}

impl AttemptService {
    pub(crate) fn new(
        attempts: Arc<dyn AttemptRepository>,
        catalog: Arc<dyn PaperCatalog>,
        settings: ExamSettings,
    ) -> Self {
        Self { attempts, catalog, settings }
    }

    pub(crate) async fn start(
        &self,
        owner_id: &str,
        paper_ids: Vec<String>,
    ) -> AttemptResult<ExamAttempt> {
        validate_paper_selection(&paper_ids)?;
        let total_duration_minutes = self.total_minutes(paper_ids.len())?;

        let now = primitive_now_utc();
        let attempt = ExamAttempt {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            paper_ids,
            status: AttemptStatus::InProgress,
            started_at: now,
            submitted_at: None,
            total_duration_minutes,
            time_remaining_seconds: i64::from(total_duration_minutes) * 60,
            responses: ResponseMap::new(),
            scores: None,
            created_at: now,
            updated_at: now,
        };

        self.attempts.create(&attempt).await.map_err(storage_error)?;

        ::metrics::counter!(metrics::ATTEMPTS_STARTED).increment(1);
        tracing::info!(
            attempt_id = %attempt.id,
            owner_id = %attempt.owner_id,
            papers = attempt.paper_ids.len(),
            total_duration_minutes,
            "Exam attempt started"
        );

        Ok(attempt)
    }

    pub(crate) async fn save_response(
        &self,
        attempt_id: &str,
        owner_id: &str,
        request: SaveResponse,
    ) -> AttemptResult<()> {
        if request.question_id.trim().is_empty() {
            return Err(AttemptError::Validation("question_id must not be empty".to_string()));
        }

        let entry = ResponseEntry::new(request.answer, request.status, request.time_spent_seconds);
        let outcome = self
            .attempts
            .upsert_response(attempt_id, owner_id, &request.question_id, &entry, primitive_now_utc())
            .await
            .map_err(storage_error)?;

        match outcome {
            WriteOutcome::Applied(()) => {
                ::metrics::counter!(metrics::RESPONSES_SAVED).increment(1);
                tracing::debug!(
                    attempt_id,
                    question_id = %request.question_id,
                    status = ?entry.status,
                    "Response saved"
                );
                Ok(())
            }
            WriteOutcome::Missing => Err(AttemptError::NotFound),
            WriteOutcome::NotInProgress => Err(already_submitted()),
        }
    }

    pub(crate) async fn submit(&self, attempt_id: &str, owner_id: &str) -> AttemptResult<ExamAttempt> {
        let attempt = self.get(attempt_id, owner_id).await?;
        if !attempt.is_in_progress() {
            return Err(already_submitted());
        }

        // Question sets are loaded outside the row lock.
        let question_sets = self.load_question_sets(&attempt.paper_ids).await?;
        let scorer = |paper_ids: &[String], responses: &ResponseMap| {
            scoring::score_papers(paper_ids, responses, &question_sets)
        };

        let outcome = self
            .attempts
            .finalize(attempt_id, owner_id, primitive_now_utc(), &scorer)
            .await
            .map_err(storage_error)?;

        let attempt = match outcome {
            WriteOutcome::Applied(attempt) => attempt,
            WriteOutcome::Missing => return Err(AttemptError::NotFound),
            WriteOutcome::NotInProgress => return Err(already_submitted()),
        };

        let overall = attempt.scores.as_ref().map(scoring::overall);
        if let Some(overall) = overall {
            ::metrics::histogram!(metrics::ATTEMPT_PERCENTAGE).record(overall.percentage);
        }
        ::metrics::counter!(metrics::ATTEMPTS_SUBMITTED).increment(1);
        tracing::info!(
            attempt_id = %attempt.id,
            owner_id = %attempt.owner_id,
            papers = attempt.paper_ids.len(),
            marks_earned = overall.map(|score| score.marks_earned),
            marks_total = overall.map(|score| score.marks_total),
            "Exam attempt submitted"
        );

        Ok(attempt)
    }

    pub(crate) async fn get(&self, attempt_id: &str, owner_id: &str) -> AttemptResult<ExamAttempt> {
        self.attempts
            .find_for_owner(attempt_id, owner_id)
            .await
            .map_err(storage_error)?
            .ok_or(AttemptError::NotFound)
    }

    pub(crate) async fn list_by_owner(&self, owner_id: &str) -> AttemptResult<Vec<ExamAttempt>> {
        self.attempts.list_by_owner(owner_id).await.map_err(storage_error)
    }

    fn total_minutes(&self, papers: usize) -> AttemptResult<i32> {
        u32::try_from(papers)
            .ok()
            .and_then(|papers| papers.checked_mul(self.settings.minutes_per_paper))
            .and_then(|minutes| i32::try_from(minutes).ok())
            .ok_or_else(|| AttemptError::Validation("Too many papers selected".to_string()))
    }

    async fn load_question_sets(&self, paper_ids: &[String]) -> AttemptResult<QuestionSets> {
        let mut sets = QuestionSets::with_capacity(paper_ids.len());
        for paper_id in paper_ids {
            let questions = self.catalog.questions_for_paper(paper_id).await.map_err(|err| {
                tracing::error!(paper_id = %paper_id, error = ?err, "Failed to load question set");
                AttemptError::Dependency(err)
            })?;
            sets.insert(paper_id.clone(), questions);
        }
        Ok(sets)
    }
}

fn validate_paper_selection(paper_ids: &[String]) -> AttemptResult<()> {
    if paper_ids.is_empty() {
        return Err(AttemptError::Validation("Select at least one paper".to_string()));
    }
    if paper_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(AttemptError::Validation("Paper ids must not be empty".to_string()));
    }

    let mut seen = HashSet::with_capacity(paper_ids.len());
    if let Some(duplicate) = paper_ids.iter().find(|id| !seen.insert(id.as_str())) {
        return Err(AttemptError::Validation(format!("Paper {duplicate} selected more than once")));
    }

    Ok(())
}

fn already_submitted() -> AttemptError {
    AttemptError::InvalidState("Exam attempt already submitted".to_string())
}

fn storage_error(err: anyhow::Error) -> AttemptError {
    tracing::error!(error = ?err, "Attempt repository failure");
    AttemptError::Storage(err)
}
