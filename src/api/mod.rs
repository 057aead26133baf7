//! Read-only HTTP API
//!
//! Serves the shared status and reward history as JSON. When a control key
//! is configured, two extra routes switch staking on and off.


use crate::control::StakingController;
use crate::error::Result;
use crate::monitor::SharedStatus;
use crate::types::HistoryBucket;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Datelike, Timelike};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Staking control routes and their secret path component
#[derive(Clone)]
pub struct ControlRoute {
    pub key: String,
    pub controller: Arc<StakingController>,
}

#[derive(Clone)]
pub struct ApiState {
    pub status: SharedStatus,
    pub control: Option<ControlRoute>,
}

pub fn router(state: ApiState) -> Router {
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let mut app = Router::new()
        .route("/stat", get(stat))
        .route("/stakingrate", get(staking_rate))
        .route("/stakingrate/hourly", get(staking_rate_hourly))
        .route("/stakingrate/daily", get(staking_rate_daily));

    if state.control.is_some() {
        app = app.route("/staking/:key/:flag", get(staking_control));
    }

    app.layer(cors).with_state(state)
}

/// Bind to localhost and serve until cancelled
pub async fn serve(port: u16, state: ApiState, cancel: CancellationToken) -> Result<()> {
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    serve_on(listener, state, cancel).await
}

pub async fn serve_on(listener: TcpListener, state: ApiState, cancel: CancellationToken) -> Result<()> {
    tracing::info!("HTTP API listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    tracing::info!("HTTP API stopped");
    Ok(())
}

fn json_response<T: Serialize>(value: &T) -> Response {
    match serde_json::to_string(value) {
        Ok(body) => ([(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Oldest-first `[timestamp, avg, min, max]` rows
fn bucket_rows(buckets: &[HistoryBucket]) -> Vec<Value> {
    buckets
        .iter()
        .rev()
        .map(|b| json!([b.timestamp, b.avg, b.min, b.max]))
        .collect()
}

/// Oldest-first `[calendar field, avg]` rows
fn labelled_rows(buckets: &[HistoryBucket], label: impl Fn(DateTime<chrono::Utc>) -> u32) -> Vec<Value> {
    buckets
        .iter()
        .rev()
        .filter_map(|b| {
            let at = DateTime::from_timestamp(b.timestamp, 0)?;
            Some(json!([label(at), b.avg]))
        })
        .collect()
}

async fn stat(State(state): State<ApiState>) -> Response {
    json_response(&state.status.status())
}

async fn staking_rate(State(state): State<ApiState>) -> Response {
    let (hourly, daily) = state.status.histories();

    json_response(&json!({
        "daily": bucket_rows(&daily),
        "hourly": bucket_rows(&hourly),
    }))
}

async fn staking_rate_hourly(State(state): State<ApiState>) -> Response {
    let hourly = state.status.history(crate::types::Granularity::Hourly);
    json_response(&labelled_rows(&hourly, |t| t.hour()))
}

async fn staking_rate_daily(State(state): State<ApiState>) -> Response {
    let daily = state.status.history(crate::types::Granularity::Daily);
    json_response(&labelled_rows(&daily, |t| t.day()))
}

async fn staking_control(
    State(state): State<ApiState>,
    Path((key, flag)): Path<(String, String)>,
) -> Response {
    let Some(control) = state.control.as_ref().filter(|c| c.key == key) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let enabled = match flag.as_str() {
        "1" => true,
        "0" => false,
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    let outcome = control.controller.set_staking(enabled).await;
    json_response(&outcome.to_string())
}
