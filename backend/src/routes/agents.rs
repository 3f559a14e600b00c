// src/routes/agents.rs

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::roster::models::{Agent, NewAgent};
use crate::routes::{auth::CurrentUser, AppState};

#[derive(Serialize)]
pub struct AgentCreatedResponse {
    pub message: String,
    pub agent: Agent,
}

#[derive(Serialize)]
pub struct AgentsResponse {
    pub agents: Vec<Agent>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /agents
pub async fn create_agent(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<NewAgent>, JsonRejection>,
) -> Result<(StatusCode, Json<AgentCreatedResponse>), AppError> {
    let Json(payload) = payload?;
    let new_agent = payload
        .normalized()
        .ok_or_else(|| AppError::BadRequest("Please provide all required fields".to_string()))?;

    let agent = state.agents.create_agent(user_id, &new_agent).await?;
    info!("User {} created agent {}", user_id, agent.id);

    Ok((
        StatusCode::CREATED,
        Json(AgentCreatedResponse {
            message: "Agent created successfully".to_string(),
            agent,
        }),
    ))
}

/// GET /agents
///
/// Newest first; the upload pipeline uses the opposite order.
pub async fn list_agents(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<AgentsResponse>, AppError> {
    let mut agents = state.agents.find_agents_by_owner(user_id).await?;
    agents.reverse();
    Ok(Json(AgentsResponse { agents }))
}

/// DELETE /agents/{id}
pub async fn delete_agent(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    agent_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(agent_id) = agent_id?;
    if !state.agents.delete_agent(user_id, agent_id).await? {
        return Err(AppError::NotFound("Agent not found".to_string()));
    }

    info!("User {} deleted agent {}", user_id, agent_id);
    Ok(Json(MessageResponse {
        message: "Agent deleted successfully".to_string(),
    }))
}
