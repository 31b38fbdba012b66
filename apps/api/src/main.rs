mod config;
mod errors;
mod llm;
mod models;
mod routes;
mod screening;
mod state;
mod store;

use std::sync::Arc;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LlmMode};
use crate::llm::{GenerationBackend, OllamaBackend};
use crate::routes::build_router;
use crate::screening::question_bank::QuestionBank;
use crate::screening::responder::ResponseGenerator;
use crate::screening::service::ScreeningService;
use crate::state::AppState;
use crate::store::{MemoryRecordStore, PgRecordStore, RecordStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentScout screening API v{}", env!("CARGO_PKG_VERSION"));

    // Record store: PostgreSQL when configured, otherwise in-memory.
    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => Arc::new(PgRecordStore::connect(url).await?),
        None => {
            warn!("DATABASE_URL not set; records are kept in memory only");
            Arc::new(MemoryRecordStore::new())
        }
    };

    // Generation backend, resolved once at startup.
    let backend: Option<Arc<dyn GenerationBackend>> = match config.llm_mode {
        LlmMode::Ollama => {
            let backend = OllamaBackend::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
                config.llm_timeout,
            );
            info!("using Ollama model {}", backend.model());
            Some(Arc::new(backend))
        }
        LlmMode::Templates => None,
    };
    let responder = ResponseGenerator::with_timeout(backend, config.llm_timeout);
    info!("generation backend: {}", responder.backend_name());

    let bank = QuestionBank::new();
    let screening = Arc::new(ScreeningService::new(bank, responder, store.clone()));

    let state = AppState { store, screening };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
