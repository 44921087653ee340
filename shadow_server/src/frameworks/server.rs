// Framework bootstrap for the game server runtime.

use crate::domain::WordProvider;
use crate::frameworks::config;
use crate::interface_adapters::clients::words::{HttpWordProvider, NoWordService};
use crate::interface_adapters::http::{health_handler, not_found_handler};
use crate::interface_adapters::hub::ConnectionHub;
use crate::interface_adapters::net::ws_handler;
use crate::interface_adapters::repository::InMemorySessionRepository;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{GameService, GameSettings};

use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    run_with_settings(listener, GameSettings::default()).await
}

pub async fn run_with_settings(
    listener: tokio::net::TcpListener,
    settings: GameSettings,
) -> Result<()> {
    let address = listener.local_addr()?;
    // build state
    let state = build_state(settings)?;
    // Start the Web Server
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from((config::http_host(), config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run_with_settings(listener, config::game_settings()).await
}

fn build_word_provider(settings: &GameSettings) -> Result<Arc<dyn WordProvider>> {
    let Some(url) = config::word_service_url() else {
        tracing::info!("no word service configured; using the static word table");
        return Ok(Arc::new(NoWordService));
    };

    let client = HttpWordProvider::new(url.clone(), settings.word_provider_timeout)
        .map_err(|e| std::io::Error::other(format!("failed to initialize word client: {e}")))?;
    tracing::debug!(
        word_service_url = %url,
        word_service_timeout_ms = settings.word_provider_timeout.as_millis(),
        "word service configured"
    );
    Ok(Arc::new(client))
}

fn build_state(settings: GameSettings) -> Result<Arc<AppState>> {
    let words = build_word_provider(&settings)?;
    let hub = Arc::new(ConnectionHub::new());
    let service = GameService::new(
        Arc::new(InMemorySessionRepository::new()),
        words,
        hub.clone(),
        settings,
    );

    Ok(Arc::new(AppState { service, hub }))
}
