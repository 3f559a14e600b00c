// src/upload/batches.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::store::StoredAssignment;

/// All assignments produced by one upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBatch {
    pub file_name: String,
    pub uploaded_by: Uuid,
    pub upload_date: DateTime<Utc>,
    pub agent_count: usize,
    pub total_items: usize,
    pub assignments: Vec<StoredAssignment>,
}

/// Group assignments by `(file_name, upload_date)`.
///
/// Batches come out in the order their first assignment appears, so a
/// newest-first input gives newest-first batches.
pub fn group_batches(assignments: Vec<StoredAssignment>) -> Vec<UploadBatch> {
    let mut batches: Vec<UploadBatch> = Vec::new();

    for assignment in assignments {
        let existing = batches.iter_mut().find(|b| {
            b.file_name == assignment.file_name && b.upload_date == assignment.upload_date
        });

        match existing {
            Some(batch) => {
                batch.agent_count += 1;
                batch.total_items += assignment.items.len();
                batch.assignments.push(assignment);
            }
            None => batches.push(UploadBatch {
                file_name: assignment.file_name.clone(),
                uploaded_by: assignment.uploaded_by,
                upload_date: assignment.upload_date,
                agent_count: 1,
                total_items: assignment.items.len(),
                assignments: vec![assignment],
            }),
        }
    }

    batches
}
