use axum::extract::{Path, Query, State};
use axum::Json;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::db::models::{Subject, TermPaper};
use crate::repositories::PaperFilter;
use crate::schemas::exam::{PaperDetailResponse, PaperQuery, PublicQuestion};

pub(in crate::api::exams) async fn list_subjects(
    _user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Subject>>, ApiError> {
    let subjects = state
        .catalog()
        .list_subjects()
        .await
        .map_err(|e| ApiError::internal(format!("{e:#}"), "Failed to list subjects"))?;

    Ok(Json(subjects))
}

pub(in crate::api::exams) async fn list_papers(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<PaperQuery>,
) -> Result<Json<Vec<TermPaper>>, ApiError> {
    let filter = PaperFilter::from(params);
    let papers = state
        .catalog()
        .list_papers(&filter)
        .await
        .map_err(|e| ApiError::internal(format!("{e:#}"), "Failed to list papers"))?;

    Ok(Json(papers))
}

pub(in crate::api::exams) async fn get_paper(
    Path(paper_id): Path<String>,
    _user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<PaperDetailResponse>, ApiError> {
    let paper = state
        .catalog()
        .find_paper(&paper_id)
        .await
        .map_err(|e| ApiError::internal(format!("{e:#}"), "Failed to fetch paper"))?;

    let Some(paper) = paper else {
        return Err(ApiError::NotFound("Paper not found".to_string()));
    };

    let questions = state
        .catalog()
        .questions_for_paper(&paper.id)
        .await
        .map_err(|e| ApiError::internal(format!("{e:#}"), "Failed to fetch questions"))?;

    Ok(Json(PaperDetailResponse {
        paper,
        questions: questions.into_iter().map(PublicQuestion::from).collect(),
    }))
}
