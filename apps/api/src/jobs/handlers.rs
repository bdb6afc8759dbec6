use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::jobs::assembler::build_job_list;
use crate::jobs::models::Job;
use crate::state::AppState;
use crate::store::StateDocument;

pub const DEFAULT_QUERY: &str = "IT Support";
pub const DEFAULT_LIMIT: i64 = 20;
pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct JobsQuery {
    pub query: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SavedFlag {
    pub saved: bool,
}

#[derive(Debug, Serialize)]
pub struct AppliedFlag {
    pub applied: bool,
}

/// GET /jobs?query=&limit=
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    params: Result<Query<JobsQuery>, QueryRejection>,
) -> Result<Json<Vec<Job>>, AppError> {
    let Query(params) = params.map_err(|e| AppError::Validation(e.body_text()))?;
    let query = params.query.unwrap_or_else(|| DEFAULT_QUERY.to_string());
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between {MIN_LIMIT} and {MAX_LIMIT}, got {limit}"
        )));
    }

    let raw = state.source.fetch_listings().await?;
    let doc = state.store.load().await?;
    let jobs = build_job_list(
        &raw,
        &query,
        limit as usize,
        &doc,
        state.config.selection,
    );

    info!(
        "Job search '{}' matched {} of {} upstream records",
        query,
        jobs.len(),
        raw.len()
    );
    Ok(Json(jobs))
}

/// POST /jobs/:id/save
pub async fn handle_save(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<SavedFlag>, AppError> {
    update_state(&state, |doc| doc.add_saved(&job_id)).await?;
    Ok(Json(SavedFlag { saved: true }))
}

/// POST /jobs/:id/unsave
pub async fn handle_unsave(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<SavedFlag>, AppError> {
    update_state(&state, |doc| doc.remove_saved(&job_id)).await?;
    Ok(Json(SavedFlag { saved: false }))
}

/// POST /jobs/:id/applied
pub async fn handle_mark_applied(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<AppliedFlag>, AppError> {
    update_state(&state, |doc| doc.add_applied(&job_id)).await?;
    Ok(Json(AppliedFlag { applied: true }))
}

/// POST /jobs/:id/undo-applied
pub async fn handle_undo_applied(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<AppliedFlag>, AppError> {
    update_state(&state, |doc| doc.remove_applied(&job_id)).await?;
    Ok(Json(AppliedFlag { applied: false }))
}

/// GET /saved
pub async fn handle_list_saved(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.store.load().await?.saved))
}

/// GET /applied
pub async fn handle_list_applied(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.store.load().await?.applied))
}

/// Load, mutate, write back. The whole file is rewritten even when nothing changed.
async fn update_state<F>(state: &AppState, mutate: F) -> Result<(), AppError>
where
    F: FnOnce(&mut StateDocument),
{
    let _guard = state.state_lock.lock().await;
    let mut doc = state.store.load().await?;
    mutate(&mut doc);
    state.store.save(&doc).await?;
    debug!(
        saved = doc.saved.len(),
        applied = doc.applied.len(),
        "State updated"
    );
    Ok(())
}
