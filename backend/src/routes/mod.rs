// src/routes/mod.rs

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::db::DbPool;
use crate::store::{
    DynAgentDirectory, DynAssignmentStore, MemoryStore, PgAgentDirectory, PgAssignmentStore,
};

pub mod agents;
pub mod auth;
pub mod health;
pub mod upload;

#[derive(Clone)]
pub struct AppState {
    /// Present only when running against Postgres; used by /health.
    pub db: Option<DbPool>,
    pub agents: DynAgentDirectory,
    pub assignments: DynAssignmentStore,
    pub config: Config,
}

impl AppState {
    pub fn postgres(pool: DbPool, config: Config) -> Self {
        Self {
            agents: Arc::new(PgAgentDirectory::new(pool.clone())),
            assignments: Arc::new(PgAssignmentStore::new(pool.clone())),
            db: Some(pool),
            config,
        }
    }

    pub fn in_memory(store: Arc<MemoryStore>, config: Config) -> Self {
        Self {
            db: None,
            agents: store.clone(),
            assignments: store,
            config,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.upload_max_bytes;
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/upload",
            post(upload::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/upload/distributions", get(upload::list_distributions))
        .route("/upload/batches", get(upload::list_batches))
        .route("/agents", post(agents::create_agent).get(agents::list_agents))
        .route("/agents/{id}", delete(agents::delete_agent))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(auth::USER_ID_HEADER),
        ])
        .allow_credentials(true)
}
