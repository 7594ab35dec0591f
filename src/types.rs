//! Core types for quake-report

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One seismic event from the feed
///
/// Records are immutable once built and carry no identity beyond their field
/// values. Two identical events in the feed stay two records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    magnitude: f64,
    place: String,
    occurred_at_millis: i64,
    detail_url: String,
}

impl Record {
    /// Create a new record
    pub fn new(
        magnitude: f64,
        place: impl Into<String>,
        occurred_at_millis: i64,
        detail_url: impl Into<String>,
    ) -> Self {
        Self {
            magnitude,
            place: place.into(),
            occurred_at_millis,
            detail_url: detail_url.into(),
        }
    }

    /// Event magnitude (fractional, unbounded)
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Free-text location; empty when the feed omitted it
    pub fn place(&self) -> &str {
        &self.place
    }

    /// Event time in milliseconds since the Unix epoch (UTC)
    pub fn occurred_at_millis(&self) -> i64 {
        self.occurred_at_millis
    }

    /// Event time as a UTC timestamp, `None` if out of chrono's range
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.occurred_at_millis).single()
    }

    /// Absolute URL of the human-readable detail page
    pub fn detail_url(&self) -> &str {
        &self.detail_url
    }
}

/// Sequence number of a load within one loader
///
/// Each `start` takes the next generation. A completion is delivered only if
/// its generation is still the current one.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Generation(pub u64);

impl Generation {
    /// Get the inner value
    pub fn get(&self) -> u64 {
        self.0
    }

    /// The generation that follows this one
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u64> for Generation {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a load produced no usable data
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableKind {
    /// The device had no network access; no request was made
    NoConnection,
    /// The fetch failed (timeout, status, I/O)
    Transport,
    /// The response was not an earthquake feed
    Parse,
    /// The request URL could not be built from the configuration
    InvalidRequest,
}

/// Outcome of one load
///
/// `Records(vec![])` means the server reported zero events. `Unavailable` means
/// nothing usable was produced and must not be shown as "no earthquakes".
#[derive(Clone, Debug, PartialEq)]
pub enum LoadResult {
    /// Parsed records in feed order (possibly empty)
    Records(Vec<Record>),
    /// No usable data
    Unavailable {
        /// Failure category, for diagnostics
        kind: UnavailableKind,
        /// Short user-facing explanation
        reason: String,
    },
}

impl LoadResult {
    /// Build an absence signal
    pub fn unavailable(kind: UnavailableKind, reason: impl Into<String>) -> Self {
        LoadResult::Unavailable {
            kind,
            reason: reason.into(),
        }
    }

    /// The records, if this result carries data
    pub fn records(&self) -> Option<&[Record]> {
        match self {
            LoadResult::Records(records) => Some(records),
            LoadResult::Unavailable { .. } => None,
        }
    }

    /// Whether this is the absence signal
    pub fn is_unavailable(&self) -> bool {
        matches!(self, LoadResult::Unavailable { .. })
    }
}

/// Event emitted during the load lifecycle
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A load was dispatched to a worker
    LoadStarted {
        /// Load generation
        generation: Generation,
        /// Fully built request URL
        url: String,
    },

    /// A load delivered records
    LoadDelivered {
        /// Load generation
        generation: Generation,
        /// Number of records delivered
        records: usize,
    },

    /// A load (or a refresh that never started one) produced no usable data
    LoadUnavailable {
        /// Load generation, `None` when no load was started
        #[serde(skip_serializing_if = "Option::is_none")]
        generation: Option<Generation>,
        /// Failure category
        kind: UnavailableKind,
        /// User-facing reason
        reason: String,
    },

    /// A superseded load finished and its result was dropped
    LoadDiscarded {
        /// Generation of the stale load
        generation: Generation,
    },

    /// The pipeline was reset
    Reset,
}
