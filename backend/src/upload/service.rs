// src/upload/service.rs
//
// Upload orchestration: format check -> roster read -> parse -> distribute ->
// persist -> summary.
//
// FLOW:
// 1. Reject unsupported extensions (no I/O yet)
// 2. Read the uploader's roster once; fail fast when it is empty
// 3. Parse the bytes into ContactRecords
// 4. Reject uploads where no row survived parsing
// 5. Split records across the roster, in roster order
// 6. Write one distributed_lists row per agent in a single batch
// 7. Build the summary from the roster already in hand (no second read)

use std::collections::HashMap;

use chrono::{SubsecRound, Utc};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::roster::models::Agent;
use crate::store::{
    AgentDirectory, AssignmentStore, NewAssignment, SavedAssignment, StoreError, StoredAssignment,
};
use crate::upload::distributor::distribute;
use crate::upload::models::{FileInfo, UploadRequest, UploadSummary};
use crate::upload::parser::{parse_contacts, FileFormat, ParseError};

pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded and distributed successfully";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only CSV, XLSX, and XLS files are allowed (got '{0}')")]
    UnsupportedFormat(String),

    #[error("failed to read agent roster: {0}")]
    Roster(StoreError),

    #[error("No agents found. Please create agents first.")]
    NoAgents,

    #[error("Error parsing file: {0}")]
    Parse(#[from] ParseError),

    #[error("No valid data found in the file. Please check the format (FirstName, Phone, Notes).")]
    EmptyDataset,

    #[error("failed to persist distribution: {0}")]
    Persistence(StoreError),
}

/// Run the whole upload pipeline for one file.
pub async fn handle_upload(
    agents: &dyn AgentDirectory,
    store: &dyn AssignmentStore,
    uploader_id: Uuid,
    request: UploadRequest,
) -> Result<UploadSummary, UploadError> {
    info!(
        "Processing upload '{}' ({} bytes) for user {}",
        request.file_name,
        request.bytes.len(),
        uploader_id
    );

    let format = FileFormat::from_file_name(&request.file_name).ok_or_else(|| {
        warn!("Rejected upload '{}': unsupported extension", request.file_name);
        UploadError::UnsupportedFormat(request.file_name.clone())
    })?;

    let roster = agents.find_agents_by_owner(uploader_id).await.map_err(|err| {
        error!("Failed to load roster for user {}: {:?}", uploader_id, err);
        UploadError::Roster(err)
    })?;
    if roster.is_empty() {
        warn!("Rejected upload '{}': user {} has no agents", request.file_name, uploader_id);
        return Err(UploadError::NoAgents);
    }

    let records = parse_contacts(&request.bytes, format).map_err(|err| {
        warn!("Failed to parse '{}' as {}: {}", request.file_name, format.as_str(), err);
        err
    })?;

    if records.is_empty() {
        warn!("Upload '{}' contained no usable rows", request.file_name);
        return Err(UploadError::EmptyDataset);
    }

    let total_items = records.len();
    info!("Parsed {} records from '{}'", total_items, request.file_name);

    // Postgres keeps microseconds; truncate so every row and the summary agree.
    let upload_date = Utc::now().trunc_subsecs(6);

    let batch: Vec<NewAssignment> = distribute(records, &roster)
        .into_iter()
        .map(|assignment| NewAssignment {
            agent_id: assignment.agent.id,
            items: assignment.items,
            uploaded_by: uploader_id,
            file_name: request.file_name.clone(),
            upload_date,
        })
        .collect();

    let saved = store.save_batch(&batch).await.map_err(|err| {
        error!(
            "Failed to persist {} assignments for '{}': {:?}",
            batch.len(),
            request.file_name,
            err
        );
        UploadError::Persistence(err)
    })?;

    let distributions = resolve_assignments(&roster, saved, batch);

    info!(
        "Distributed {} records from '{}' across {} agents",
        total_items,
        request.file_name,
        distributions.len()
    );

    Ok(UploadSummary {
        message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        total_items,
        distributions,
        file_info: FileInfo {
            original_name: request.file_name,
            size: request.bytes.len(),
            mimetype: request.content_type,
            upload_time: upload_date,
        },
    })
}

/// Join freshly written rows with the roster that produced them.
fn resolve_assignments(
    roster: &[Agent],
    saved: Vec<SavedAssignment>,
    batch: Vec<NewAssignment>,
) -> Vec<StoredAssignment> {
    let by_id: HashMap<Uuid, &Agent> = roster.iter().map(|a| (a.id, a)).collect();

    saved
        .into_iter()
        .zip(batch)
        .map(|(row, assignment)| StoredAssignment {
            id: row.id,
            agent_id: assignment.agent_id,
            agent: by_id.get(&assignment.agent_id).map(|a| a.summary()),
            items: assignment.items,
            uploaded_by: assignment.uploaded_by,
            file_name: assignment.file_name,
            upload_date: assignment.upload_date,
            created_at: row.created_at,
        })
        .collect()
}
