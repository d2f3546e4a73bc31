use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::{Question, QuestionRow, Subject, TermPaper};
use crate::repositories::{PaperCatalog, PaperFilter};

const SUBJECT_COLUMNS: &str = "id, name, code, level";

const PAPER_COLUMNS: &str = "\
    id, subject_id, name, term, exam_type, duration_minutes, total_marks, total_questions";

const QUESTION_COLUMNS: &str = "\
    id, paper_id, question_number, question_type, question_text, options, correct_answer, \
    marks, section, parent_id";

#[derive(Clone)]
pub(crate) struct PgPaperCatalog {
    pool: PgPool,
}

impl PgPaperCatalog {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaperCatalog for PgPaperCatalog {
    async fn list_subjects(&self) -> anyhow::Result<Vec<Subject>> {
        sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects ORDER BY name, id"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list subjects")
    }

    async fn list_papers(&self, filter: &PaperFilter) -> anyhow::Result<Vec<TermPaper>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PAPER_COLUMNS} FROM term_papers WHERE TRUE"
        ));

        if let Some(subject_id) = &filter.subject_id {
            builder.push(" AND subject_id = ");
            builder.push_bind(subject_id);
        }
        if let Some(term) = &filter.term {
            builder.push(" AND term = ");
            builder.push_bind(term);
        }
        if let Some(exam_type) = &filter.exam_type {
            builder.push(" AND exam_type = ");
            builder.push_bind(exam_type);
        }

        builder.push(" ORDER BY subject_id, term, name");

        builder
            .build_query_as::<TermPaper>()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list papers")
    }

    async fn find_paper(&self, paper_id: &str) -> anyhow::Result<Option<TermPaper>> {
        sqlx::query_as::<_, TermPaper>(&format!(
            "SELECT {PAPER_COLUMNS} FROM term_papers WHERE id = $1"
        ))
        .bind(paper_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch paper")
    }

    async fn questions_for_paper(&self, paper_id: &str) -> anyhow::Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE paper_id = $1 \
             ORDER BY question_number, id"
        ))
        .bind(paper_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to fetch questions for paper {paper_id}"))?;

        Ok(rows.into_iter().map(Question::from).collect())
    }
}
