use serde::{Deserialize, Serialize};
use tl_crypto::{ChainLinked, HashChainVerifier, RecordHasher};
use tl_types::{Digest, Payload, PreviousDigest, Timestamp};

/// One immutable, hash-linked entry in a ledger.
///
/// The digest is computed once at construction from the other three fields
/// and can be recomputed from them at any time with [`Record::compute_digest`].
/// The serde form is the flat `{timestamp, payload, previous_digest, digest}`
/// object used when a chain is rendered or exported.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub(crate) timestamp: Timestamp,
    pub(crate) payload: Payload,
    pub(crate) previous_digest: PreviousDigest,
    pub(crate) digest: Digest,
}

impl Record {
    /// Build a record and compute its digest.
    pub fn new(
        timestamp: Timestamp,
        payload: Payload,
        previous_digest: PreviousDigest,
        hasher: &RecordHasher,
    ) -> Self {
        let mut record = Self {
            timestamp,
            payload,
            previous_digest,
            digest: Digest::from_hash([0; 32]),
        };
        record.digest = record.compute_digest(hasher);
        record
    }

    /// The genesis record: sentinel link and the fixed marker payload.
    pub fn genesis(timestamp: Timestamp, hasher: &RecordHasher) -> Self {
        Self::new(timestamp, Payload::genesis(), PreviousDigest::Sentinel, hasher)
    }

    /// Rehydrate a record exactly as stored, without recomputing its digest.
    ///
    /// Nothing is checked here; run the owning ledger's validation to learn
    /// whether the parts are consistent.
    pub fn from_parts(
        timestamp: Timestamp,
        payload: Payload,
        previous_digest: PreviousDigest,
        digest: Digest,
    ) -> Self {
        Self {
            timestamp,
            payload,
            previous_digest,
            digest,
        }
    }

    /// Hash pre-image: canonical timestamp, payload and previous digest,
    /// concatenated in that order.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = self.timestamp.canonical_bytes();
        bytes.extend_from_slice(&self.payload.canonical_bytes());
        bytes.extend_from_slice(&self.previous_digest.canonical_bytes());
        bytes
    }

    /// Recompute the digest from the stored fields.
    pub fn compute_digest(&self, hasher: &RecordHasher) -> Digest {
        HashChainVerifier::compute_digest(hasher, self)
    }

    /// Returns `true` if the stored digest matches a fresh recomputation.
    pub fn is_intact(&self, hasher: &RecordHasher) -> bool {
        self.compute_digest(hasher) == self.digest
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn previous_digest(&self) -> PreviousDigest {
        self.previous_digest
    }

    pub fn digest(&self) -> Digest {
        self.digest
    }

    /// Returns `true` if this record has the genesis shape.
    pub fn is_genesis(&self) -> bool {
        self.previous_digest.is_sentinel() && self.payload.is_genesis_marker()
    }
}

impl ChainLinked for Record {
    fn digest(&self) -> Digest {
        self.digest
    }

    fn previous_digest(&self) -> PreviousDigest {
        self.previous_digest
    }

    fn canonical_bytes(&self) -> Vec<u8> {
        Record::canonical_bytes(self)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use tl_types::TrackingEvent;

    use super::*;

    fn ts() -> Timestamp {
        Timestamp::from_utc(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    fn shipped() -> Payload {
        Payload::from(TrackingEvent::new("PKG1", "Shipped"))
    }

    #[test]
    fn canonical_bytes_concatenate_fields() {
        let record = Record::genesis(ts(), &RecordHasher::SHA256);
        assert_eq!(
            String::from_utf8(record.canonical_bytes()).unwrap(),
            "2024-05-01T12:00:00.000000Z\"Genesis Block\"0"
        );
    }

    #[test]
    fn digest_is_sha256_of_canonical_bytes() {
        let record = Record::new(
            ts(),
            shipped(),
            PreviousDigest::Digest(Digest::from_hash([3; 32])),
            &RecordHasher::SHA256,
        );
        let expected = RecordHasher::SHA256.hash(&record.canonical_bytes());
        assert_eq!(record.digest(), expected);
        assert!(record.is_intact(&RecordHasher::SHA256));
    }

    #[test]
    fn genesis_has_sentinel_and_marker() {
        let record = Record::genesis(ts(), &RecordHasher::SHA256);
        assert!(record.is_genesis());
        assert_eq!(record.previous_digest().to_string(), "0");
        assert!(record.payload().is_genesis_marker());
    }

    #[test]
    fn from_parts_keeps_stored_digest() {
        let bogus = Digest::from_hash([0xee; 32]);
        let record = Record::from_parts(ts(), shipped(), PreviousDigest::Sentinel, bogus);
        assert_eq!(record.digest(), bogus);
        assert!(!record.is_intact(&RecordHasher::SHA256));
    }

    #[test]
    fn json_shape_is_flat() {
        let record = Record::new(ts(), shipped(), PreviousDigest::Sentinel, &RecordHasher::SHA256);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["timestamp"], "2024-05-01T12:00:00.000000Z");
        assert_eq!(value["payload"]["package_id"], "PKG1");
        assert_eq!(value["previous_digest"], "0");
        assert_eq!(value["digest"], record.digest().to_hex());

        let back: Record = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
        assert!(back.is_intact(&RecordHasher::SHA256));
    }

    proptest! {
        #[test]
        fn digest_is_pure(
            id in "[A-Z0-9]{1,10}",
            status in "[A-Za-z ]{1,20}",
            secs in 0i64..4_000_000_000,
            prev in any::<[u8; 32]>(),
        ) {
            let timestamp = Timestamp::from_utc(Utc.timestamp_opt(secs, 0).unwrap());
            let record = Record::new(
                timestamp,
                Payload::from(TrackingEvent::new(id, status)),
                PreviousDigest::Digest(Digest::from_hash(prev)),
                &RecordHasher::SHA256,
            );
            for _ in 0..3 {
                prop_assert_eq!(record.compute_digest(&RecordHasher::SHA256), record.digest());
            }
        }
    }
}
