// src/roster/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A roster entry that contact records get assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: Uuid,
    /// User who created the agent; uploads only ever reach the uploader's own agents.
    pub owner_id: Uuid,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub created_at: DateTime<Utc>,
}

impl Agent {
    pub fn summary(&self) -> AgentSummary {
        AgentSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// The slice of an agent that is joined onto stored assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Body of `POST /agents`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAgent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile: String,
}

impl NewAgent {
    /// Trim every field and reject blanks.
    ///
    /// Emails are lowercased so the uniqueness check is case-insensitive.
    pub fn normalized(&self) -> Option<NewAgent> {
        let name = self.name.trim();
        let email = self.email.trim().to_lowercase();
        let mobile = self.mobile.trim();
        if name.is_empty() || email.is_empty() || mobile.is_empty() {
            return None;
        }

        Some(NewAgent {
            name: name.to_string(),
            email,
            mobile: mobile.to_string(),
        })
    }
}
