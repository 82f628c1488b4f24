//! Freshness markers for cached fragments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered marker deciding whether a cached fragment is still valid.
///
/// Version-aware product families publish an explicit revision number; the
/// retention policy stamps entries with the fetch wall-clock time instead.
/// Within one product family only one kind is ever used, so the cross-kind
/// ordering (revisions sort before timestamps) never decides freshness in
/// practice.
///
/// Absence of a tag on a cache entry (`Option<VersionTag>` = `None`) means
/// the entry is always considered fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VersionTag {
    /// Explicit provider-published revision.
    Revision(u64),
    /// Wall-clock time of the fetch that produced the entry.
    Timestamp(DateTime<Utc>),
}

impl VersionTag {
    /// A timestamp tag for the current instant.
    pub fn now() -> Self {
        VersionTag::Timestamp(Utc::now())
    }

    /// The wall-clock instant carried by a timestamp tag, if this is one.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            VersionTag::Timestamp(at) => Some(*at),
            VersionTag::Revision(_) => None,
        }
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionTag::Revision(rev) => write!(f, "r{rev}"),
            VersionTag::Timestamp(at) => write!(f, "{}", at.to_rfc3339()),
        }
    }
}
