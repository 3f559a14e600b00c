// src/routes/health.rs

use axum::{extract::State, Json};
use serde_json::json;
use tracing::error;

use crate::routes::AppState;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    // Simple DB check: SELECT 1
    if let Some(pool) = &state.db {
        if let Err(err) = sqlx::query("SELECT 1").execute(pool).await {
            error!("DB health check failed: {:?}", err);
            return Json(json!({
                "status": "error",
                "db": "down",
            }));
        }
    }

    let store = if state.db.is_some() { "postgres" } else { "memory" };

    Json(json!({
        "status": "ok",
        "env": format!("{:?}", state.config.env),
        "store": store,
    }))
}
