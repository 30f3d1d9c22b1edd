//! Extractor helpers that turn axum's rejections into [`ServerError`]s, so
//! malformed requests get the same JSON error body as every other failure.
//!
//! Handlers take `Result<Json<T>, JsonRejection>` / `Result<Path<T>, PathRejection>`
//! and unwrap them through these functions.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::Json;
use serde::{Deserialize, Deserializer};

use crate::error::ServerError;

/// Unwrap a JSON body. Any rejection (bad syntax, wrong types, missing
/// content type) is an invalid event.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, ServerError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| ServerError::InvalidEvent(err.body_text()))
}

/// Unwrap path parameters; a malformed session id is a bad request.
pub fn extract_path<T>(result: Result<Path<T>, PathRejection>) -> Result<T, ServerError> {
    result
        .map(|Path(v)| v)
        .map_err(|err| ServerError::BadRequest(err.body_text()))
}

/// Deserialize an optional string field, treating `null` like a missing field.
pub fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
