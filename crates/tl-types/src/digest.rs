use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A 256-bit record digest.
///
/// Always rendered as 64 lowercase hex characters, both in `Display` and in
/// its serde form, so exported chains read the same way they are hashed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest([u8; 32]);

impl Digest {
    /// Wrap a pre-computed hash.
    pub const fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.short_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Digest {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.to_hex()
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Link from a record to its predecessor.
///
/// The genesis record has no predecessor and carries the fixed sentinel,
/// whose text form is `"0"`. Every other record links to the digest of the
/// record before it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PreviousDigest {
    Sentinel,
    Digest(Digest),
}

impl PreviousDigest {
    /// Text form of the sentinel link.
    pub const SENTINEL: &'static str = "0";

    /// Returns `true` for the genesis sentinel.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Sentinel)
    }

    /// The linked digest, if this is not the sentinel.
    pub fn digest(&self) -> Option<&Digest> {
        match self {
            Self::Sentinel => None,
            Self::Digest(d) => Some(d),
        }
    }

    /// Canonical bytes used in the record hash pre-image.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Debug for PreviousDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sentinel => write!(f, "PreviousDigest(sentinel)"),
            Self::Digest(d) => write!(f, "PreviousDigest({})", d.short_hex()),
        }
    }
}

impl fmt::Display for PreviousDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sentinel => f.write_str(Self::SENTINEL),
            Self::Digest(d) => write!(f, "{d}"),
        }
    }
}

impl FromStr for PreviousDigest {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::SENTINEL {
            Ok(Self::Sentinel)
        } else {
            Digest::from_hex(s).map(Self::Digest)
        }
    }
}

impl TryFrom<String> for PreviousDigest {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PreviousDigest> for String {
    fn from(link: PreviousDigest) -> Self {
        link.to_string()
    }
}

impl From<Digest> for PreviousDigest {
    fn from(digest: Digest) -> Self {
        Self::Digest(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let digest = Digest::from_hash([0xab; 32]);
        let parsed = Digest::from_hex(&digest.to_hex()).unwrap();
        assert_eq!(digest, parsed);
    }

    #[test]
    fn short_hex_is_8_chars() {
        let digest = Digest::from_hash([7; 32]);
        assert_eq!(digest.short_hex(), "07070707");
    }

    #[test]
    fn display_is_full_lowercase_hex() {
        let digest = Digest::from_hash([0xcd; 32]);
        let display = format!("{digest}");
        assert_eq!(display.len(), 64);
        assert!(display.chars().all(|c| c == 'c' || c == 'd'));
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(matches!(
            Digest::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
        assert_eq!(
            Digest::from_hex("abcd").unwrap_err(),
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn digest_serializes_as_hex_string() {
        let digest = Digest::from_hash([1; 32]);
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", digest.to_hex()));
    }

    #[test]
    fn sentinel_text_is_zero() {
        assert_eq!(PreviousDigest::Sentinel.to_string(), "0");
        assert_eq!(PreviousDigest::Sentinel.canonical_bytes(), b"0".to_vec());
        assert_eq!("0".parse::<PreviousDigest>().unwrap(), PreviousDigest::Sentinel);
    }

    #[test]
    fn linked_previous_parses_from_hex() {
        let digest = Digest::from_hash([9; 32]);
        let link: PreviousDigest = digest.to_hex().parse().unwrap();
        assert_eq!(link, PreviousDigest::Digest(digest));
        assert_eq!(link.digest(), Some(&digest));
        assert!(!link.is_sentinel());
    }

    #[test]
    fn previous_digest_json_forms() {
        let sentinel = serde_json::to_string(&PreviousDigest::Sentinel).unwrap();
        assert_eq!(sentinel, "\"0\"");

        let digest = Digest::from_hash([2; 32]);
        let parsed: PreviousDigest =
            serde_json::from_str(&format!("\"{}\"", digest.to_hex())).unwrap();
        assert_eq!(parsed, PreviousDigest::from(digest));
    }
}
