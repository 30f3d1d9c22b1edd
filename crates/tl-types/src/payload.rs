use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker payload carried by every genesis record.
pub const GENESIS_MARKER: &str = "Genesis Block";

/// A single package tracking update.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackingEvent {
    pub package_id: String,
    pub status: String,
}

impl TrackingEvent {
    pub fn new(package_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            package_id: package_id.into(),
            status: status.into(),
        }
    }
}

/// Data carried by a record.
///
/// Serialized untagged, so a record's payload reads as plain JSON: a string
/// for the genesis marker, `{"package_id": .., "status": ..}` for tracking
/// events, and any other JSON value as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// Fixed text marker (the genesis record uses [`GENESIS_MARKER`]).
    Marker(String),
    /// A package tracking event.
    Tracking(TrackingEvent),
    /// Any other structured value.
    Data(Value),
}

impl Payload {
    /// The genesis marker payload.
    pub fn genesis() -> Self {
        Self::Marker(GENESIS_MARKER.to_string())
    }

    /// Returns `true` if this is the genesis marker.
    pub fn is_genesis_marker(&self) -> bool {
        matches!(self, Self::Marker(m) if m == GENESIS_MARKER)
    }

    /// The tracking event, if this payload is one.
    pub fn as_tracking(&self) -> Option<&TrackingEvent> {
        match self {
            Self::Tracking(event) => Some(event),
            _ => None,
        }
    }

    /// The payload as a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Marker(marker) => Value::String(marker.clone()),
            Self::Tracking(event) => serde_json::json!({
                "package_id": event.package_id,
                "status": event.status,
            }),
            Self::Data(value) => value.clone(),
        }
    }

    /// Canonical bytes used in the record hash pre-image: compact JSON with
    /// object keys in lexicographic order.
    ///
    /// `serde_json::Map` is a `BTreeMap` while the `preserve_order` feature
    /// is off, so the `Display` rendering of a `Value` is already sorted and
    /// cannot fail.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        self.to_value().to_string().into_bytes()
    }
}

impl From<TrackingEvent> for Payload {
    fn from(event: TrackingEvent) -> Self {
        Self::Tracking(event)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match serde_json::from_value::<Payload>(value.clone()) {
            Ok(payload) => payload,
            Err(_) => Self::Data(value),
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marker(marker) => f.write_str(marker),
            Self::Tracking(event) => write!(f, "{}: {}", event.package_id, event.status),
            Self::Data(value) => write!(f, "{value}"),
        }
    }
}
