//! Voice booking orchestrator
//!
//! Drives a spoken cleaning-service booking conversation over WebSocket:
//! extraction, address confirmation, provider matching, selection and
//! confirmation, with synthesized speech for every prompt.

mod ai;
mod api;
mod bookings;
mod config;
mod matcher;
mod profile;
mod prompts;
mod runtime;
mod session;
mod state_machine;

use ai::{http_client, HttpAiService, KokoroSpeech};
use api::{create_router, AppState};
use bookings::InMemoryLedger;
use config::AppConfig;
use matcher::{ProviderCatalog, ProviderMatcher};
use profile::StaticProfileDirectory;
use prompts::PromptBuilder;
use runtime::{spawn_maintenance, MessageOrchestrator, Ports};
use session::SessionStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voice_booking=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env();

    tracing::info!(path = %config.providers_file.display(), "Loading provider catalog");
    let catalog = ProviderCatalog::load(&config.providers_file)?;
    tracing::info!(providers = catalog.len(), "Provider catalog loaded");

    let prompts = PromptBuilder::from_optional_path(config.prompts_file.as_deref())?;

    // Collaborators
    let client = http_client(config.http_timeout)?;
    let ai_service = Arc::new(HttpAiService::new(client.clone(), &config.ai.base_url));
    let ledger = Arc::new(InMemoryLedger::new());
    let ports = Ports {
        extractor: ai_service.clone(),
        selector: ai_service,
        synthesizer: Arc::new(KokoroSpeech::new(client, &config.tts)),
        ledger: ledger.clone(),
        profiles: Arc::new(StaticProfileDirectory::new(config.profile.clone())),
    };

    let store = Arc::new(SessionStore::new(config.session_ttl));
    let orchestrator = Arc::new(MessageOrchestrator::new(
        store,
        ProviderMatcher::new(catalog),
        prompts,
        ports,
        config.max_turns,
    ));

    let state = AppState::new(orchestrator, ledger, config.session_ttl);

    let shutdown = CancellationToken::new();
    let maintenance = spawn_maintenance(
        state.sessions.clone(),
        config.sweep_interval,
        shutdown.clone(),
    );

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        ai = %config.ai.base_url,
        tts = %config.tts.base_url,
        "Voice booking server listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    maintenance.await?;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
    shutdown.cancel();
}
