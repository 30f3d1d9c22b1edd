use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A UTC point in time, truncated to microsecond precision.
///
/// The canonical text form is RFC 3339 with exactly six fractional digits
/// and a `Z` suffix, e.g. `2024-05-01T12:00:00.123456Z`. That string is both
/// the serde representation and the timestamp's contribution to a record
/// hash, so a timestamp always re-serializes to the bytes it was hashed from.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current wall-clock time.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Wrap a `DateTime<Utc>`, dropping anything below microseconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(6))
    }

    /// Parse the canonical text form.
    ///
    /// Only the exact canonical rendering is accepted; offsets other than
    /// `Z`, missing or extra fractional digits are rejected.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| TypeError::InvalidTimestamp {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        let ts = Self::from_utc(dt.with_timezone(&Utc));
        if ts.to_canonical() != s {
            return Err(TypeError::InvalidTimestamp {
                input: s.to_string(),
                reason: "not in canonical form (UTC, microseconds, Z suffix)".into(),
            });
        }
        Ok(ts)
    }

    /// The underlying `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Canonical RFC 3339 rendering.
    pub fn to_canonical(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Canonical bytes used in the record hash pre-image.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        self.to_canonical().into_bytes()
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.to_canonical())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical())
    }
}

impl FromStr for Timestamp {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Timestamp {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.to_canonical()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_utc(dt)
    }
}
