mod analysis;
mod config;
mod db;
mod errors;
mod extraction;
mod extractors;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;
mod tenders;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{InMemoryTenderStore, PgTenderStore, TenderStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tender API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the record store
    let store: Arc<dyn TenderStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            info!("PostgreSQL store initialized");
            Arc::new(PgTenderStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; tenders are kept in memory and lost on restart");
            Arc::new(InMemoryTenderStore::new())
        }
    };

    // Initialize LLM client. A missing key only fails on first use.
    let llm = LlmClient::new(&config.llm)?;
    if config.llm.api_key.is_none() {
        warn!("LLM_API_KEY not set; analyze and extract will return 503");
    }
    info!("LLM client initialized (model: {})", llm.model());

    let state = AppState {
        store,
        completer: Arc::new(llm),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
