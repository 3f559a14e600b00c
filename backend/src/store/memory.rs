// src/store/memory.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::roster::models::{Agent, NewAgent};
use crate::store::{
    AgentDirectory, AssignmentStore, NewAssignment, SavedAssignment, StoreError, StoreResult,
    StoredAssignment,
};

#[derive(Debug, Clone)]
struct AssignmentRow {
    id: Uuid,
    batch_seq: u64,
    created_at: DateTime<Utc>,
    assignment: NewAssignment,
}

#[derive(Debug, Default)]
struct Tables {
    /// Insertion order doubles as creation order.
    agents: Vec<Agent>,
    assignments: Vec<AssignmentRow>,
    next_batch_seq: u64,
}

/// In-process implementation of both store traits.
///
/// Used when no DATABASE_URL is configured and by the test suite. Everything
/// lives behind one lock, so a batch is committed atomically.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of assignment rows across all uploaders.
    pub async fn assignment_count(&self) -> usize {
        self.tables.read().await.assignments.len()
    }
}

#[async_trait]
impl AgentDirectory for MemoryStore {
    async fn find_agents_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Agent>> {
        let tables = self.tables.read().await;
        Ok(tables
            .agents
            .iter()
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn create_agent(&self, owner_id: Uuid, agent: &NewAgent) -> StoreResult<Agent> {
        let mut tables = self.tables.write().await;
        if tables
            .agents
            .iter()
            .any(|a| a.email.eq_ignore_ascii_case(&agent.email))
        {
            return Err(StoreError::Conflict(format!(
                "agent with email {} already exists",
                agent.email
            )));
        }

        let created = Agent {
            id: Uuid::new_v4(),
            owner_id,
            name: agent.name.clone(),
            email: agent.email.clone(),
            mobile: agent.mobile.clone(),
            created_at: Utc::now(),
        };
        tables.agents.push(created.clone());
        Ok(created)
    }

    async fn delete_agent(&self, owner_id: Uuid, agent_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.agents.len();
        tables
            .agents
            .retain(|a| !(a.id == agent_id && a.owner_id == owner_id));
        Ok(tables.agents.len() != before)
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn save_batch(
        &self,
        assignments: &[NewAssignment],
    ) -> StoreResult<Vec<SavedAssignment>> {
        let mut tables = self.tables.write().await;
        let batch_seq = tables.next_batch_seq;
        let now = Utc::now();

        // Stage first, then commit under the same write guard.
        let staged: Vec<AssignmentRow> = assignments
            .iter()
            .map(|assignment| AssignmentRow {
                id: Uuid::new_v4(),
                batch_seq,
                created_at: now,
                assignment: assignment.clone(),
            })
            .collect();
        let saved = staged
            .iter()
            .map(|row| SavedAssignment {
                id: row.id,
                created_at: row.created_at,
            })
            .collect();

        tables.next_batch_seq += 1;
        tables.assignments.extend(staged);
        Ok(saved)
    }

    async fn list_assignments_by_uploader(
        &self,
        uploader_id: Uuid,
    ) -> StoreResult<Vec<StoredAssignment>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&AssignmentRow> = tables
            .assignments
            .iter()
            .filter(|row| row.assignment.uploaded_by == uploader_id)
            .collect();
        // Newest batch first; stable sort keeps roster order inside a batch.
        rows.sort_by(|a, b| b.batch_seq.cmp(&a.batch_seq));

        Ok(rows
            .into_iter()
            .map(|row| StoredAssignment {
                id: row.id,
                agent_id: row.assignment.agent_id,
                agent: tables
                    .agents
                    .iter()
                    .find(|a| a.id == row.assignment.agent_id)
                    .map(Agent::summary),
                items: row.assignment.items.clone(),
                uploaded_by: row.assignment.uploaded_by,
                file_name: row.assignment.file_name.clone(),
                upload_date: row.assignment.upload_date,
                created_at: row.created_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_agent(email: &str) -> NewAgent {
        NewAgent {
            name: "Agent".into(),
            email: email.into(),
            mobile: "555".into(),
        }
    }

    #[tokio::test]
    async fn agents_are_scoped_by_owner_and_kept_in_creation_order() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        let a = store.create_agent(owner, &new_agent("a@x.io")).await.unwrap();
        store.create_agent(other, &new_agent("b@x.io")).await.unwrap();
        let c = store.create_agent(owner, &new_agent("c@x.io")).await.unwrap();

        let ids: Vec<Uuid> = store
            .find_agents_by_owner(owner)
            .await
            .unwrap()
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        store.create_agent(owner, &new_agent("dup@x.io")).await.unwrap();

        let err = store
            .create_agent(Uuid::new_v4(), &new_agent("DUP@x.io"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_requires_matching_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let agent = store.create_agent(owner, &new_agent("d@x.io")).await.unwrap();

        assert!(!store.delete_agent(Uuid::new_v4(), agent.id).await.unwrap());
        assert!(store.delete_agent(owner, agent.id).await.unwrap());
        assert!(store.find_agents_by_owner(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_assignment_writes_one_row_and_resolves_agent() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let agent = store.create_agent(owner, &new_agent("e@x.io")).await.unwrap();

        let saved = store
            .save_assignment(&NewAssignment {
                agent_id: agent.id,
                items: vec![],
                uploaded_by: owner,
                file_name: "leads.csv".into(),
                upload_date: Utc::now(),
            })
            .await
            .unwrap();

        let listed = store.list_assignments_by_uploader(owner).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, saved.id);
        assert_eq!(listed[0].created_at, saved.created_at);
        assert_eq!(listed[0].agent.as_ref().map(|a| a.id), Some(agent.id));

        store.delete_agent(owner, agent.id).await.unwrap();
        let listed = store.list_assignments_by_uploader(owner).await.unwrap();
        assert!(listed[0].agent.is_none());
    }
}
