use std::net::SocketAddr;
use std::sync::Arc;

use contact_dispatch::config;
use contact_dispatch::db;
use contact_dispatch::routes::{build_router, AppState};
use contact_dispatch::store::MemoryStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load configuration
    let cfg = config::load()?;
    info!("Starting backend in {:?} mode", cfg.env);

    // 3. Pick the store: Postgres when configured, in-process otherwise
    let state = match cfg.database_url.as_deref() {
        Some(database_url) => {
            let pool = db::create_pool(database_url).await?;
            info!("Connected to Postgres");

            db::run_migrations(&pool).await?;
            info!("Migrations applied");

            AppState::postgres(pool, cfg.clone())
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
            AppState::in_memory(Arc::new(MemoryStore::new()), cfg.clone())
        }
    };

    // 4. Build router
    let app = build_router(state);

    // 5. Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.http_port));
    info!(
        "Listening on http://{} (upload limit {} bytes)",
        addr, cfg.upload_max_bytes
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
