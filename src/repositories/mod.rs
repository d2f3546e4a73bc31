pub(crate) mod attempts;
pub(crate) mod catalog;

use async_trait::async_trait;
use time::PrimitiveDateTime;

use crate::db::models::{ExamAttempt, Question, Subject, TermPaper};
use crate::services::responses::{ResponseEntry, ResponseMap};
use crate::services::scoring::ScoreMap;

/// Computes the scores sealed into an attempt, given its papers and the responses read
/// under the row lock.
pub(crate) type Scorer<'a> = dyn Fn(&[String], &ResponseMap) -> ScoreMap + Send + Sync + 'a;

/// Result of a conditional write against an attempt scoped to its owner.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WriteOutcome<T> {
    Applied(T),
    /// No attempt with this id belongs to the caller.
    Missing,
    /// The attempt exists but is no longer in progress.
    NotInProgress,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PaperFilter {
    pub(crate) subject_id: Option<String>,
    pub(crate) term: Option<String>,
    pub(crate) exam_type: Option<String>,
}

#[async_trait]
pub(crate) trait AttemptRepository: Send + Sync {
    async fn create(&self, attempt: &ExamAttempt) -> anyhow::Result<()>;

    async fn find_for_owner(&self, id: &str, owner_id: &str)
        -> anyhow::Result<Option<ExamAttempt>>;

    /// Most recently started first.
    async fn list_by_owner(&self, owner_id: &str) -> anyhow::Result<Vec<ExamAttempt>>;

    /// Replaces one response entry. Must be atomic with respect to concurrent saves and
    /// must only apply while the attempt is in progress.
    async fn upsert_response(
        &self,
        id: &str,
        owner_id: &str,
        question_id: &str,
        entry: &ResponseEntry,
        now: PrimitiveDateTime,
    ) -> anyhow::Result<WriteOutcome<()>>;

    /// Seals the attempt. The status check, scoring and write happen under one lock so a
    /// concurrent finalize observes the sealed attempt.
    async fn finalize(
        &self,
        id: &str,
        owner_id: &str,
        now: PrimitiveDateTime,
        scorer: &Scorer<'_>,
    ) -> anyhow::Result<WriteOutcome<ExamAttempt>>;
}

/// Read-only view of subjects, papers and their question sets.
#[async_trait]
pub(crate) trait PaperCatalog: Send + Sync {
    async fn list_subjects(&self) -> anyhow::Result<Vec<Subject>>;

    async fn list_papers(&self, filter: &PaperFilter) -> anyhow::Result<Vec<TermPaper>>;

    async fn find_paper(&self, paper_id: &str) -> anyhow::Result<Option<TermPaper>>;

    /// Ordered by question number. An unknown paper yields an empty set.
    async fn questions_for_paper(&self, paper_id: &str) -> anyhow::Result<Vec<Question>>;
}
