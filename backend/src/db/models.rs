use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::roster::models::AgentSummary;
use crate::store::StoredAssignment;
use crate::upload::models::ContactRecord;

/// Row of `distributed_lists` LEFT JOINed with `agents`.
///
/// The `agent_*` columns are NULL when the agent has since been deleted.
#[derive(Debug, Clone, FromRow)]
pub struct DistributedListRow {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub items: Json<Vec<ContactRecord>>,
    pub uploaded_by: Uuid,
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,

    pub agent_name: Option<String>,
    pub agent_email: Option<String>,
}

impl From<DistributedListRow> for StoredAssignment {
    fn from(row: DistributedListRow) -> Self {
        let agent = match (row.agent_name, row.agent_email) {
            (Some(name), Some(email)) => Some(AgentSummary {
                id: row.agent_id,
                name,
                email,
            }),
            _ => None,
        };

        StoredAssignment {
            id: row.id,
            agent_id: row.agent_id,
            agent,
            items: row.items.0,
            uploaded_by: row.uploaded_by,
            file_name: row.file_name,
            upload_date: row.upload_date,
            created_at: row.created_at,
        }
    }
}
