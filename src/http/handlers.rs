//! JSON handlers over the snapshot service.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::health::ConnectionHealth;
use crate::http::server::AppState;
use crate::upstream::Record;

#[derive(Debug, Default, Deserialize)]
pub struct RecordsQuery {
    /// Overrides the configured staleness threshold for this read.
    pub max_age_secs: Option<u64>,
}

#[derive(Serialize)]
pub struct RecordsResponse<'a> {
    pub columns: Vec<&'a str>,
    pub records: &'a [Record],
    pub captured_at: u64,
    pub age_secs: u64,
    pub stale: bool,
    pub connection: ConnectionHealth,
}

#[derive(Serialize)]
pub struct UnavailableResponse {
    pub error: String,
    pub connection: ConnectionHealth,
}

pub async fn get_records(State(state): State<AppState>, Query(query): Query<RecordsQuery>) -> Response {
    let max_age = query
        .max_age_secs
        .map(Duration::from_secs)
        .unwrap_or(state.default_max_age);
    let result = state.service.get_cached_or_fresh(max_age).await;
    let connection = state.service.get_connection_health();

    match result {
        Ok(cached) => {
            let snapshot = &cached.entry.snapshot;
            Json(RecordsResponse {
                columns: snapshot.columns(),
                records: snapshot.records(),
                captured_at: cached.entry.captured_at_unix,
                age_secs: cached.entry.age().as_secs(),
                stale: cached.stale,
                connection,
            })
            .into_response()
        }
        Err(unavailable) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(UnavailableResponse {
                error: unavailable.to_string(),
                connection,
            }),
        )
            .into_response(),
    }
}

pub async fn get_health(State(state): State<AppState>) -> Json<ConnectionHealth> {
    Json(state.service.get_connection_health())
}

pub async fn liveness() -> &'static str {
    "ok"
}
