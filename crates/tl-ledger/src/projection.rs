use std::collections::BTreeMap;

use serde::Serialize;
use tl_types::{Digest, Timestamp};

use crate::traits::LedgerReader;

/// One status update for a package, located in the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PackageEvent {
    pub index: usize,
    pub timestamp: Timestamp,
    pub status: String,
    pub digest: Digest,
}

/// Ordered status history of a single package.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PackageHistory {
    pub package_id: String,
    pub events: Vec<PackageEvent>,
}

impl PackageHistory {
    /// Status of the most recent event.
    pub fn latest_status(&self) -> Option<&str> {
        self.events.last().map(|e| e.status.as_str())
    }
}

/// Per-package view derived from the tracking events in a chain.
///
/// Records whose payload is not a tracking event (genesis, free-form data)
/// are skipped. The projection is rebuilt from scratch on every call and
/// says nothing about chain validity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TrackingProjection {
    packages: BTreeMap<String, PackageHistory>,
}

impl TrackingProjection {
    pub fn build<R: LedgerReader + ?Sized>(reader: &R) -> Self {
        let mut packages: BTreeMap<String, PackageHistory> = BTreeMap::new();

        for (index, record) in reader.records().iter().enumerate() {
            let Some(event) = record.payload().as_tracking() else {
                continue;
            };
            packages
                .entry(event.package_id.clone())
                .or_insert_with(|| PackageHistory {
                    package_id: event.package_id.clone(),
                    events: Vec::new(),
                })
                .events
                .push(PackageEvent {
                    index,
                    timestamp: record.timestamp(),
                    status: event.status.clone(),
                    digest: record.digest(),
                });
        }

        Self { packages }
    }

    pub fn package(&self, package_id: &str) -> Option<&PackageHistory> {
        self.packages.get(package_id)
    }

    /// All package histories, ordered by package id.
    pub fn packages(&self) -> impl Iterator<Item = &PackageHistory> {
        self.packages.values()
    }

    /// Latest status of every package, ordered by package id.
    pub fn latest_statuses(&self) -> BTreeMap<&str, &str> {
        self.packages
            .values()
            .filter_map(|h| h.latest_status().map(|s| (h.package_id.as_str(), s)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
