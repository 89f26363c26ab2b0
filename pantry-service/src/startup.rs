//! Application startup and lifecycle management.

use crate::config::PantryConfig;
use crate::handlers;
use crate::models::{ENTRY_HEADERS, RATE_HEADERS};
use crate::services::{CsvSheet, EntryLog, MemorySheet, RateBook, Sheet};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    shared_secret::{shared_secret_middleware, SharedSecretStore},
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: PantryConfig,
    pub entries: EntryLog,
    pub rates: RateBook,
}

impl SharedSecretStore for AppState {
    fn shared_secret(&self) -> &str {
        self.config.admin.password.expose_secret()
    }
}

/// Open the entries and rates sheets: CSV files under the data directory,
/// or in-memory sheets when none is configured.
async fn open_sheets(config: &PantryConfig) -> Result<(Arc<dyn Sheet>, Arc<dyn Sheet>), AppError> {
    match (config.storage.entries_path(), config.storage.rates_path()) {
        (Some(entries_path), Some(rates_path)) => {
            let entries = CsvSheet::open("entries", &entries_path, &ENTRY_HEADERS)
                .await
                .map_err(AppError::from)?;
            let rates = CsvSheet::open("rates", &rates_path, &RATE_HEADERS)
                .await
                .map_err(AppError::from)?;
            tracing::info!(
                entries = %entries_path.display(),
                rates = %rates_path.display(),
                "Using CSV sheets"
            );
            Ok((Arc::new(entries), Arc::new(rates)))
        }
        _ => {
            tracing::warn!("No data directory configured; sheets are held in memory");
            Ok((
                Arc::new(MemorySheet::new("entries", &ENTRY_HEADERS)),
                Arc::new(MemorySheet::new("rates", &RATE_HEADERS)),
            ))
        }
    }
}

/// Routes open to the entry form.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/drafts", post(handlers::drafts::resume_draft))
        .route("/entries", post(handlers::entries::record_entry))
        .route("/entries/suggestions", get(handlers::entries::suggestions))
        .route("/rates", get(handlers::rates::list_rates))
}

/// Routes behind the shared admin password.
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/entries", get(handlers::entries::list_entries))
        .route(
            "/entries/:index",
            put(handlers::entries::update_entry).delete(handlers::entries::delete_entry),
        )
        .route("/bills", get(handlers::bills::get_bill))
        .route("/bills/export", get(handlers::bills::export_bill))
        .route("/usage", get(handlers::usage::get_usage))
        .route("/rates", put(handlers::rates::upsert_rate))
        .route_layer(from_fn_with_state(
            state,
            shared_secret_middleware::<AppState>,
        ))
}

/// Full router with middleware applied.
pub fn router(state: AppState) -> Router {
    public_routes()
        .merge(admin_routes(state.clone()))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Open storage and bind the listener. Port 0 picks a free port.
    pub async fn build(config: PantryConfig) -> Result<Self, AppError> {
        let (entries_sheet, rates_sheet) = open_sheets(&config).await?;

        let state = AppState {
            config: config.clone(),
            entries: EntryLog::new(entries_sheet),
            rates: RateBook::new(rates_sheet),
        };

        let http_addr: SocketAddr = config.common.bind_address().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Invalid bind address '{}': {}",
                config.common.bind_address(),
                e
            ))
        })?;
        let http_listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", http_addr, e);
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!("Pantry service: HTTP on port {}", http_port);

        Ok(Self {
            http_port,
            http_listener,
            state,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Serve until the listener fails or the task is dropped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.http_listener, router(self.state)).await
    }
}
