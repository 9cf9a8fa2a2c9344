//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::models::scan::{ScanOutcome, SymbolRsi};
use crate::monitor::{DetailView, Monitor, TableView, TickerChanges};
use crate::scanner::OverboughtScanner;
use crate::services::market_data::InstrumentSource;

#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<Monitor>,
    pub scanner: Arc<OverboughtScanner>,
    pub instruments: Arc<dyn InstrumentSource>,
    pub start_time: Arc<Instant>,
}

impl AppState {
    pub fn new(
        monitor: Arc<Monitor>,
        scanner: Arc<OverboughtScanner>,
        instruments: Arc<dyn InstrumentSource>,
    ) -> Self {
        Self {
            monitor,
            scanner,
            instruments,
            start_time: Arc::new(Instant::now()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanStarted {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OverboughtResponse {
    pub scanning: bool,
    pub updated_at: Option<String>,
    pub data: BTreeMap<String, SymbolRsi>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TickersRequest {
    pub symbols: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AutoOrderToggle {
    pub ticker: String,
    pub enabled: bool,
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "service": "rsi-radar"
    }))
}

async fn get_table(State(state): State<AppState>) -> Json<TableView> {
    Json(state.monitor.table().await)
}

async fn get_detail(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<DetailView>, StatusCode> {
    state
        .monitor
        .detail(&ticker)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Kick off a whole-venue scan in the background.
async fn start_scan(State(state): State<AppState>) -> Json<ScanStarted> {
    let status = match state.scanner.try_begin() {
        Err(ScanOutcome::Busy) => "busy",
        Err(_) => "cached",
        Ok(guard) => {
            let scanner = state.scanner.clone();
            let instruments = state.instruments.clone();
            tokio::spawn(async move {
                match instruments.linear_symbols().await {
                    Ok(symbols) => {
                        scanner.run(guard, &symbols).await;
                    }
                    Err(e) => {
                        error!(error = %e, "Overbought scan: failed to list instruments");
                    }
                }
            });
            "started"
        }
    };
    Json(ScanStarted {
        status: status.to_string(),
    })
}

async fn get_overbought(State(state): State<AppState>) -> Json<OverboughtResponse> {
    let snapshot = state.scanner.snapshot();
    let updated_at = state
        .scanner
        .has_scanned()
        .then(|| snapshot.updated_at());
    Json(OverboughtResponse {
        scanning: state.scanner.is_scanning(),
        updated_at,
        data: snapshot.entries.clone(),
    })
}

/// Replace the runtime ticker set; newly added tickers are refreshed right away.
async fn set_tickers(
    State(state): State<AppState>,
    Json(request): Json<TickersRequest>,
) -> Json<TickerChanges> {
    let changes = state.monitor.set_dynamic_tickers(&request.symbols).await;
    if !changes.added.is_empty() {
        let monitor = state.monitor.clone();
        tokio::spawn(async move { monitor.refresh_tables().await });
    }
    Json(changes)
}

async fn list_auto_orders(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "enabled": state.monitor.auto_orders().enabled().await }))
}

async fn toggle_auto_order(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<AutoOrderToggle>, StatusCode> {
    if !state.monitor.contains(&ticker).await {
        return Err(StatusCode::NOT_FOUND);
    }
    let enabled = state
        .monitor
        .auto_orders()
        .toggle(&ticker)
        .await
        .map_err(|e| {
            error!(error = %e, ticker = %ticker, "Failed to persist auto-order state");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    Ok(Json(AutoOrderToggle { ticker, enabled }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/table", get(get_table))
        .route("/api/detail/{ticker}", get(get_detail))
        .route("/api/overbought", get(get_overbought))
        .route("/api/overbought/scan", post(start_scan))
        .route("/api/tickers", post(set_tickers))
        .route("/api/auto-order", get(list_auto_orders))
        .route("/api/auto-order/{ticker}", post(toggle_auto_order))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    axum::serve(listener, app).await?;

    Ok(())
}
