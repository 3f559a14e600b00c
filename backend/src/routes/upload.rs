// src/routes/upload.rs

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::error::AppError;
use crate::routes::{auth::CurrentUser, AppState};
use crate::store::StoredAssignment;
use crate::upload::{group_batches, handle_upload, UploadBatch, UploadRequest, UploadSummary};

/// Multipart field that carries the file.
pub const FILE_FIELD: &str = "file";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Serialize)]
pub struct DistributionsResponse {
    pub distributions: Vec<StoredAssignment>,
}

#[derive(Serialize)]
pub struct BatchesResponse {
    pub batches: Vec<UploadBatch>,
}

/// POST /upload
///
/// Accepts a multipart form with a `file` field (.csv, .xlsx or .xls) and
/// splits its rows across the caller's agents.
pub async fn upload_file(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadSummary>, AppError> {
    let mut multipart = multipart?;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let bytes = field.bytes().await?;

        upload = Some(UploadRequest {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let request = upload
        .filter(|u| !u.file_name.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Please upload a file".to_string()))?;

    let summary = handle_upload(
        state.agents.as_ref(),
        state.assignments.as_ref(),
        user_id,
        request,
    )
    .await?;

    Ok(Json(summary))
}

/// GET /upload/distributions
///
/// Assignments whose agent has been deleted are left out.
pub async fn list_distributions(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<DistributionsResponse>, AppError> {
    let distributions = live_assignments(&state, user_id).await?;
    Ok(Json(DistributionsResponse { distributions }))
}

/// GET /upload/batches
pub async fn list_batches(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<BatchesResponse>, AppError> {
    let batches = group_batches(live_assignments(&state, user_id).await?);
    Ok(Json(BatchesResponse { batches }))
}

async fn live_assignments(
    state: &AppState,
    user_id: uuid::Uuid,
) -> Result<Vec<StoredAssignment>, AppError> {
    let all = state
        .assignments
        .list_assignments_by_uploader(user_id)
        .await?;
    let total = all.len();

    let live: Vec<StoredAssignment> = all.into_iter().filter(|a| a.agent.is_some()).collect();
    if live.len() != total {
        info!(
            "Skipped {} assignments with deleted agents for user {}",
            total - live.len(),
            user_id
        );
    }

    Ok(live)
}
