//! Webhook HTTP server (axum).

use crate::channels::line::{signature, LineClient, WebhookPayload};
use crate::config::{Config, Credentials};
use crate::dispatch::Dispatcher;
use crate::places::GooglePlacesClient;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Shared state for the webhook routes. Everything in it is immutable after startup.
#[derive(Clone)]
pub struct ServerState {
    pub channel_secret: Arc<str>,
    pub dispatcher: Arc<Dispatcher>,
    /// Port reported by the health probe; `serve` fills it from the bound listener.
    pub port: u16,
}

impl ServerState {
    pub fn new(channel_secret: impl Into<Arc<str>>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            channel_secret: channel_secret.into(),
            dispatcher,
            port: 0,
        }
    }
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/callback", post(callback))
        .with_state(state)
}

/// Run the server; binds to config.server.bind:config.server.port.
/// Fails before binding when the channel secret, access token or places API key is missing.
/// Blocks until shutdown (Ctrl+C or SIGTERM).
pub async fn run_server(config: Config) -> Result<()> {
    let credentials = Credentials::resolve(&config)?;

    let places = GooglePlacesClient::from_config(&config.places, credentials.places_api_key.clone())
        .context("building places client")?;
    let line = LineClient::new(
        Some(config.line.api_base.clone()),
        credentials.channel_access_token.clone(),
        config.line.timeout_secs.map(Duration::from_secs),
    )
    .context("building line client")?;
    let dispatcher = Dispatcher::from_config(&config, Arc::new(places), Arc::new(line));
    log::info!(
        "places search: radius {}m, type {}, language {}, on failure {:?}",
        config.places.radius,
        config.places.place_type,
        config.places.language,
        config.places.on_failure
    );

    let bind_addr = format!("{}:{}", config.server.bind.trim(), config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;

    let state = ServerState::new(credentials.channel_secret, Arc::new(dispatcher));
    serve(listener, state).await
}

/// Serve the webhook routes on an already-bound listener until shutdown.
pub async fn serve(listener: TcpListener, mut state: ServerState) -> Result<()> {
    let addr = listener.local_addr().context("reading listener address")?;
    state.port = addr.port();
    log::info!("webhook server listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("webhook server exited")?;
    log::info!("webhook server stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// POST /callback: verifies X-Line-Signature, dispatches each event, answers "OK".
async fn callback(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(provided) = headers
        .get(signature::SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        log::warn!("callback rejected: missing signature header");
        return (StatusCode::BAD_REQUEST, "missing signature").into_response();
    };
    log::debug!("callback body: {}", String::from_utf8_lossy(&body));

    if !signature::verify(&state.channel_secret, &body, provided) {
        log::warn!("callback rejected: invalid signature");
        return (StatusCode::BAD_REQUEST, "invalid signature").into_response();
    }

    let payload = match WebhookPayload::parse(&body) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("callback rejected: malformed payload: {}", e);
            return (StatusCode::BAD_REQUEST, "invalid payload").into_response();
        }
    };

    let events = payload.into_inbound_events();
    log::debug!("callback carries {} handled event(s)", events.len());
    for event in events {
        state.dispatcher.dispatch(event).await;
    }
    (StatusCode::OK, "OK").into_response()
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<ServerState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.port,
    }))
}
