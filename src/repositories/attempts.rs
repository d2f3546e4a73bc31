use anyhow::Context;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{ExamAttempt, ExamAttemptRow};
use crate::db::types::AttemptStatus;
use crate::repositories::{AttemptRepository, Scorer, WriteOutcome};
use crate::services::responses::ResponseEntry;

pub(crate) const COLUMNS: &str = "\
    id, owner_id, paper_ids, status, started_at, submitted_at, \
    total_duration_minutes, time_remaining_seconds, responses, scores, created_at, updated_at";

#[derive(Clone)]
pub(crate) struct PgAttemptRepository {
    pool: PgPool,
}

impl PgAttemptRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn status_of(&self, id: &str, owner_id: &str) -> anyhow::Result<Option<AttemptStatus>> {
        sqlx::query_scalar::<_, AttemptStatus>(
            "SELECT status FROM exam_attempts WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to read attempt status")
    }
}

#[async_trait]
impl AttemptRepository for PgAttemptRepository {
    async fn create(&self, attempt: &ExamAttempt) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO exam_attempts (\
                id, owner_id, paper_ids, status, started_at, submitted_at, \
                total_duration_minutes, time_remaining_seconds, responses, scores, \
                created_at, updated_at\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&attempt.id)
        .bind(&attempt.owner_id)
        .bind(Json(&attempt.paper_ids))
        .bind(attempt.status)
        .bind(attempt.started_at)
        .bind(attempt.submitted_at)
        .bind(attempt.total_duration_minutes)
        .bind(attempt.time_remaining_seconds)
        .bind(Json(&attempt.responses))
        .bind(attempt.scores.as_ref().map(Json))
        .bind(attempt.created_at)
        .bind(attempt.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert exam attempt")?;

        Ok(())
    }

    async fn find_for_owner(
        &self,
        id: &str,
        owner_id: &str,
    ) -> anyhow::Result<Option<ExamAttempt>> {
        let row = sqlx::query_as::<_, ExamAttemptRow>(&format!(
            "SELECT {COLUMNS} FROM exam_attempts WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch exam attempt")?;

        Ok(row.map(ExamAttempt::from))
    }

    async fn list_by_owner(&self, owner_id: &str) -> anyhow::Result<Vec<ExamAttempt>> {
        let rows = sqlx::query_as::<_, ExamAttemptRow>(&format!(
            "SELECT {COLUMNS} FROM exam_attempts WHERE owner_id = $1 \
             ORDER BY started_at DESC, created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list exam attempts")?;

        Ok(rows.into_iter().map(ExamAttempt::from).collect())
    }

    async fn upsert_response(
        &self,
        id: &str,
        owner_id: &str,
        question_id: &str,
        entry: &ResponseEntry,
        now: PrimitiveDateTime,
    ) -> anyhow::Result<WriteOutcome<()>> {
        // jsonb_set touches only this key, so concurrent saves of other questions are kept.
        let result = sqlx::query(
            "UPDATE exam_attempts \
             SET responses = jsonb_set(responses, ARRAY[$3::text], $4::jsonb, true), \
                 updated_at = $5 \
             WHERE id = $1 AND owner_id = $2 AND status = $6",
        )
        .bind(id)
        .bind(owner_id)
        .bind(question_id)
        .bind(Json(entry))
        .bind(now)
        .bind(AttemptStatus::InProgress)
        .execute(&self.pool)
        .await
        .context("Failed to save response")?;

        if result.rows_affected() > 0 {
            return Ok(WriteOutcome::Applied(()));
        }

        Ok(match self.status_of(id, owner_id).await? {
            None => WriteOutcome::Missing,
            Some(_) => WriteOutcome::NotInProgress,
        })
    }

    async fn finalize(
        &self,
        id: &str,
        owner_id: &str,
        now: PrimitiveDateTime,
        scorer: &Scorer<'_>,
    ) -> anyhow::Result<WriteOutcome<ExamAttempt>> {
        let mut tx = self.pool.begin().await.context("Failed to begin submit transaction")?;

        let row = sqlx::query_as::<_, ExamAttemptRow>(&format!(
            "SELECT {COLUMNS} FROM exam_attempts WHERE id = $1 AND owner_id = $2 FOR UPDATE"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to lock exam attempt")?;

        let Some(row) = row else {
            return Ok(WriteOutcome::Missing);
        };
        let mut attempt = ExamAttempt::from(row);
        if !attempt.is_in_progress() {
            return Ok(WriteOutcome::NotInProgress);
        }

        let scores = scorer(&attempt.paper_ids, &attempt.responses);
        attempt.finalize(scores, now);

        sqlx::query(
            "UPDATE exam_attempts \
             SET status = $3, submitted_at = $4, time_remaining_seconds = $5, scores = $6, \
                 updated_at = $7 \
             WHERE id = $1 AND owner_id = $2",
        )
        .bind(&attempt.id)
        .bind(&attempt.owner_id)
        .bind(attempt.status)
        .bind(attempt.submitted_at)
        .bind(attempt.time_remaining_seconds)
        .bind(attempt.scores.as_ref().map(Json))
        .bind(attempt.updated_at)
        .execute(&mut *tx)
        .await
        .context("Failed to persist submitted attempt")?;

        tx.commit().await.context("Failed to commit submit transaction")?;

        Ok(WriteOutcome::Applied(attempt))
    }
}
