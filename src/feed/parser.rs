//! GeoJSON feed parsing.
//!
//! Turns the raw bytes of a USGS event query response into [`Record`]s. A
//! document that is not a feed at all is a fatal [`ParseError`]; individual
//! features that lack a usable magnitude, time or detail URL are skipped and the
//! rest of the batch is kept.

use crate::error::ParseError;
use crate::types::Record;
use serde_json::Value;
use tracing::debug;

/// Why a single feature was left out of the output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The feature is not a JSON object or has no `properties` object
    MissingProperties,
    /// `properties.mag` is absent, null or not a number
    MissingMagnitude,
    /// `properties.time` is absent or not an integer
    MissingTime,
    /// `properties.url` is absent or empty
    MissingUrl,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            SkipReason::MissingProperties => "missing properties",
            SkipReason::MissingMagnitude => "missing or non-numeric mag",
            SkipReason::MissingTime => "missing or non-integer time",
            SkipReason::MissingUrl => "missing url",
        };
        f.write_str(reason)
    }
}

/// Result of parsing one feature
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureOutcome {
    /// The feature produced a record
    Record(Record),
    /// The feature was unusable
    Skipped(SkipReason),
}

/// Parse a feed document into records, in document order.
///
/// # Errors
///
/// Returns [`ParseError::Malformed`] if the bytes are not JSON and
/// [`ParseError::MissingFeatures`] if the root has no `features` array.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<Record>, ParseError> {
    let document: Value =
        serde_json::from_slice(bytes).map_err(|e| ParseError::Malformed(e.to_string()))?;

    let features = document
        .get("features")
        .and_then(Value::as_array)
        .ok_or(ParseError::MissingFeatures)?;

    let mut records = Vec::with_capacity(features.len());
    for (index, feature) in features.iter().enumerate() {
        match parse_feature(feature) {
            FeatureOutcome::Record(record) => records.push(record),
            FeatureOutcome::Skipped(reason) => {
                debug!(index, %reason, "Skipping feed feature");
            }
        }
    }

    debug!(
        parsed = records.len(),
        skipped = features.len() - records.len(),
        "Parsed earthquake feed"
    );
    Ok(records)
}

/// Parse a single GeoJSON feature.
///
/// `place` is optional and defaults to an empty string; every other field is
/// required.
pub fn parse_feature(feature: &Value) -> FeatureOutcome {
    let Some(properties) = feature.get("properties").filter(|p| p.is_object()) else {
        return FeatureOutcome::Skipped(SkipReason::MissingProperties);
    };

    let Some(magnitude) = properties.get("mag").and_then(Value::as_f64) else {
        return FeatureOutcome::Skipped(SkipReason::MissingMagnitude);
    };

    let Some(time) = properties.get("time").and_then(Value::as_i64) else {
        return FeatureOutcome::Skipped(SkipReason::MissingTime);
    };

    let Some(url) = properties
        .get("url")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
    else {
        return FeatureOutcome::Skipped(SkipReason::MissingUrl);
    };

    let place = properties
        .get("place")
        .and_then(Value::as_str)
        .unwrap_or_default();

    FeatureOutcome::Record(Record::new(magnitude, place, time, url))
}
