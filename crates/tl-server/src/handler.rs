use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tl_ledger::{Ledger, PackageHistory, Record, TrackingProjection, ValidationReport};
use tl_types::{Digest, Payload, PreviousDigest, Timestamp, TrackingEvent};

use crate::error::{ServerError, ServerResult};
use crate::extractors::{extract_json, extract_path, null_as_empty};
use crate::router::AppState;
use crate::session::{lock, SessionId};

/// Submitted form fields. Missing and `null` fields deserialize as empty so
/// the presence check can report them.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EventForm {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub package_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
}

impl EventForm {
    /// Presence check: both fields must be non-blank.
    pub fn into_event(self) -> ServerResult<TrackingEvent> {
        let mut missing = Vec::new();
        if self.package_id.trim().is_empty() {
            missing.push("package_id");
        }
        if self.status.trim().is_empty() {
            missing.push("status");
        }
        if !missing.is_empty() {
            return Err(ServerError::InvalidEvent(format!(
                "please fill in: {}",
                missing.join(", ")
            )));
        }
        Ok(TrackingEvent::new(self.package_id, self.status))
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: SessionId,
}

/// One rendered record.
#[derive(Clone, Debug, Serialize)]
pub struct RecordView {
    pub index: usize,
    pub timestamp: Timestamp,
    pub payload: Payload,
    pub digest: Digest,
    pub previous_digest: PreviousDigest,
}

impl RecordView {
    fn new(index: usize, record: &Record) -> Self {
        Self {
            index,
            timestamp: record.timestamp(),
            payload: record.payload().clone(),
            digest: record.digest(),
            previous_digest: record.previous_digest(),
        }
    }
}

/// Full render of a session: every record plus the validation signal.
#[derive(Clone, Debug, Serialize)]
pub struct ChainView {
    pub records: Vec<RecordView>,
    pub valid: bool,
}

impl ChainView {
    pub fn render(ledger: &Ledger) -> Self {
        Self {
            records: ledger
                .records()
                .iter()
                .enumerate()
                .map(|(i, r)| RecordView::new(i, r))
                .collect(),
            valid: ledger.validate(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PackageView {
    pub package_id: String,
    pub latest_status: Option<String>,
    pub history: PackageHistory,
}

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info_handler(State(state): State<AppState>) -> ServerResult<Json<serde_json::Value>> {
    Ok(Json(json!({
        "name": "trackline-server",
        "version": env!("CARGO_PKG_VERSION"),
        "hash_algorithm": state.sessions.algorithm(),
        "active_sessions": state.sessions.len()?,
    })))
}

pub async fn create_session(
    State(state): State<AppState>,
) -> ServerResult<(StatusCode, Json<SessionCreated>)> {
    let session_id = state.sessions.create()?;
    Ok((StatusCode::CREATED, Json(SessionCreated { session_id })))
}

pub async fn delete_session(
    State(state): State<AppState>,
    path: Result<Path<SessionId>, PathRejection>,
) -> ServerResult<StatusCode> {
    let id = extract_path(path)?;
    state.sessions.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_records(
    State(state): State<AppState>,
    path: Result<Path<SessionId>, PathRejection>,
) -> ServerResult<Json<ChainView>> {
    let id = extract_path(path)?;
    let ledger = state.sessions.get(id)?;
    let guard = lock(&ledger)?;
    Ok(Json(ChainView::render(&guard)))
}

/// One user action: presence check, one append, then one re-render.
pub async fn submit_event(
    State(state): State<AppState>,
    path: Result<Path<SessionId>, PathRejection>,
    body: Result<Json<EventForm>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<ChainView>)> {
    let id = extract_path(path)?;
    let event = extract_json(body)?.into_event()?;
    let ledger = state.sessions.get(id)?;
    let mut guard = lock(&ledger)?;
    let digest = guard.append(event).digest();
    tracing::info!(session = %id, digest = %digest.short_hex(), "tracking event recorded");
    Ok((StatusCode::CREATED, Json(ChainView::render(&guard))))
}

pub async fn validate_session(
    State(state): State<AppState>,
    path: Result<Path<SessionId>, PathRejection>,
) -> ServerResult<Json<ValidationReport>> {
    let id = extract_path(path)?;
    let ledger = state.sessions.get(id)?;
    let guard = lock(&ledger)?;
    Ok(Json(guard.report()))
}

pub async fn package_history(
    State(state): State<AppState>,
    path: Result<Path<(SessionId, String)>, PathRejection>,
) -> ServerResult<Json<PackageView>> {
    let (id, package_id) = extract_path(path)?;
    let ledger = state.sessions.get(id)?;
    let projection = {
        let guard = lock(&ledger)?;
        TrackingProjection::build(&*guard)
    };
    let history = projection
        .package(&package_id)
        .cloned()
        .ok_or_else(|| ServerError::PackageNotFound(package_id.clone()))?;
    Ok(Json(PackageView {
        package_id,
        latest_status: history.latest_status().map(str::to_string),
        history,
    }))
}
