//! Route table and handlers.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use contracts::{ContractError, PlanMessage, Report, StreamEvent};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::server::{
    admin::require_admin,
    api_types::HealthResponse,
    error::ApiError,
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/time", get(time))
        .route("/iot/report", post(ingest_report))
        .route("/iot/plan", post(ingest_plan))
        .route("/api/send", post(send))
        .route("/api/stream", get(stream))
        .route("/api/snapshot", get(snapshot))
        .with_state(state)
}

/// Decode a JSON body regardless of the declared content type
fn decode<T: DeserializeOwned>(kind: &'static str, body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::Payload(ContractError::payload_decode(kind, e.to_string())))
}

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service.to_string(),
            version: st.build.version.to_string(),
            subscribers: st.broadcaster.subscriber_count(),
            roles: st.aggregator.role_count(),
        }),
    )
}

pub(crate) async fn time() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

pub(crate) async fn ingest_report(
    State(st): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    require_admin(st.admin_secret.as_deref(), &headers)?;
    let report: Report = decode("report", &body)?;

    let outcome = st.aggregator.ingest_report(&report);
    let deviations = st.aggregator.apply_avg_deviation(&report);
    debug!(
        sender = ?outcome.sender_role,
        points = outcome.points_appended,
        deviations,
        "report applied"
    );

    st.publish_snapshot()?;
    Ok(StatusCode::ACCEPTED)
}

pub(crate) async fn ingest_plan(
    State(st): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    require_admin(st.admin_secret.as_deref(), &headers)?;
    let plan: PlanMessage = decode("plan", &body)?;

    if !st.aggregator.ingest_plan(&plan).changed() {
        debug!("plan changed nothing, republishing current snapshot");
    }

    st.publish_snapshot()?;
    Ok(StatusCode::ACCEPTED)
}

pub(crate) async fn send(
    State(st): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    require_admin(st.admin_secret.as_deref(), &headers)?;
    let payload: serde_json::Value = decode("message", &body)?;

    let report = st.broadcaster.broadcast(&payload)?;
    info!(
        delivered = report.delivered,
        pruned = report.pruned,
        "manual payload broadcast"
    );
    Ok(StatusCode::OK)
}

pub(crate) async fn snapshot(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    Json(st.aggregator.build_snapshot())
}

/// Live stream: handshake, cached payload, then every broadcast
///
/// The subscription is owned by the response stream, so a disconnecting
/// client drops it and leaves the fan-out.
pub(crate) async fn stream(State(st): State<Arc<AppState>>) -> Response {
    let subscription = st.broadcaster.subscribe_channel(st.subscriber_queue_capacity);
    debug!(subscriber = %subscription.id(), "stream opened");

    let events = subscription.map(|event: StreamEvent| {
        Ok::<Event, Infallible>(
            Event::default()
                .event(event.name)
                .id(event.id)
                .data(event.data),
        )
    });

    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));

    (
        headers,
        Sse::new(events).keep_alive(KeepAlive::new().interval(st.keep_alive)),
    )
        .into_response()
}
