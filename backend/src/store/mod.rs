// src/store/mod.rs
//
// Persistence seams used by the upload pipeline and the roster routes.
//
// Two implementations:
// - `postgres`: sqlx + Postgres, used whenever DATABASE_URL is set
// - `memory`: in-process store, used for local runs without a database and in tests

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::roster::models::{Agent, AgentSummary, NewAgent};
use crate::upload::models::ContactRecord;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PgAgentDirectory, PgAssignmentStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One per-agent list about to be written.
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub agent_id: Uuid,
    pub items: Vec<ContactRecord>,
    pub uploaded_by: Uuid,
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
}

/// What the store assigned to a freshly written row.
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct SavedAssignment {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A persisted per-agent list, with the agent joined in.
///
/// `agent` is `None` when the agent was deleted after the upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAssignment {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub agent: Option<AgentSummary>,
    pub items: Vec<ContactRecord>,
    pub uploaded_by: Uuid,
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Roster of agents, scoped by owner.
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    /// Agents created by `owner_id`, oldest first.
    ///
    /// The order must be stable between calls; distribution depends on it.
    async fn find_agents_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Agent>>;

    /// Fails with `StoreError::Conflict` when the email is already taken.
    async fn create_agent(&self, owner_id: Uuid, agent: &NewAgent) -> StoreResult<Agent>;

    /// Returns `false` when no agent with that id belongs to `owner_id`.
    async fn delete_agent(&self, owner_id: Uuid, agent_id: Uuid) -> StoreResult<bool>;
}

/// Storage for the per-agent lists produced by uploads.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Write every assignment or none of them; rows come back in input order.
    async fn save_batch(&self, assignments: &[NewAssignment])
        -> StoreResult<Vec<SavedAssignment>>;

    /// Write a single assignment row.
    async fn save_assignment(&self, assignment: &NewAssignment) -> StoreResult<SavedAssignment> {
        let saved = self.save_batch(std::slice::from_ref(assignment)).await?;
        saved
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Unavailable("save returned no row".to_string()))
    }

    /// Everything `uploader_id` has uploaded, newest first.
    async fn list_assignments_by_uploader(
        &self,
        uploader_id: Uuid,
    ) -> StoreResult<Vec<StoredAssignment>>;
}

pub type DynAgentDirectory = Arc<dyn AgentDirectory>;
pub type DynAssignmentStore = Arc<dyn AssignmentStore>;
