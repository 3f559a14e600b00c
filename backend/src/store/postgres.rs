// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::types::Json;
use tracing::debug;
use uuid::Uuid;

use crate::db::models::DistributedListRow;
use crate::db::DbPool;
use crate::roster::models::{Agent, NewAgent};
use crate::store::{
    AgentDirectory, AssignmentStore, NewAssignment, SavedAssignment, StoreError, StoreResult,
    StoredAssignment,
};

/// Agent directory backed by the `agents` table.
#[derive(Clone)]
pub struct PgAgentDirectory {
    pool: DbPool,
}

impl PgAgentDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgentDirectory for PgAgentDirectory {
    async fn find_agents_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Agent>> {
        let agents = sqlx::query_as::<_, Agent>(
            r#"
            SELECT id, owner_id, name, email, mobile, created_at
            FROM agents
            WHERE owner_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(agents)
    }

    async fn create_agent(&self, owner_id: Uuid, agent: &NewAgent) -> StoreResult<Agent> {
        let result = sqlx::query_as::<_, Agent>(
            r#"
            INSERT INTO agents (id, owner_id, name, email, mobile)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, name, email, mobile, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&agent.name)
        .bind(&agent.email)
        .bind(&agent.mobile)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(created) => Ok(created),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                StoreError::Conflict(format!("agent with email {} already exists", agent.email)),
            ),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_agent(&self, owner_id: Uuid, agent_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM agents
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(agent_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Assignment store backed by the `distributed_lists` table.
#[derive(Clone)]
pub struct PgAssignmentStore {
    pool: DbPool,
}

impl PgAssignmentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentStore for PgAssignmentStore {
    async fn save_batch(
        &self,
        assignments: &[NewAssignment],
    ) -> StoreResult<Vec<SavedAssignment>> {
        // Dropping `tx` on an early return rolls the whole batch back.
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(assignments.len());

        for (position, assignment) in assignments.iter().enumerate() {
            let row = sqlx::query_as::<_, SavedAssignment>(
                r#"
                INSERT INTO distributed_lists (
                    id,
                    agent_id,
                    position,
                    items,
                    uploaded_by,
                    file_name,
                    upload_date
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(assignment.agent_id)
            .bind(position as i32)
            .bind(Json(&assignment.items))
            .bind(assignment.uploaded_by)
            .bind(&assignment.file_name)
            .bind(assignment.upload_date)
            .fetch_one(&mut *tx)
            .await?;

            debug!(
                "Inserted distributed_list {} for agent {} ({} items)",
                row.id,
                assignment.agent_id,
                assignment.items.len()
            );
            saved.push(row);
        }

        tx.commit().await?;
        Ok(saved)
    }

    async fn list_assignments_by_uploader(
        &self,
        uploader_id: Uuid,
    ) -> StoreResult<Vec<StoredAssignment>> {
        let rows = sqlx::query_as::<_, DistributedListRow>(
            r#"
            SELECT
                d.id,
                d.agent_id,
                d.items,
                d.uploaded_by,
                d.file_name,
                d.upload_date,
                d.created_at,
                a.name  AS agent_name,
                a.email AS agent_email
            FROM distributed_lists d
            LEFT JOIN agents a ON a.id = d.agent_id
            WHERE d.uploaded_by = $1
            ORDER BY d.created_at DESC, d.upload_date DESC, d.position ASC
            "#,
        )
        .bind(uploader_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(StoredAssignment::from).collect())
    }
}
