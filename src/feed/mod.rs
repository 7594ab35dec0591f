//! Earthquake feed access: request building, fetching and parsing.
//!
//! The three pieces are independent so the loader can compose them on a worker
//! task:
//!
//! ```text
//! LoadRequest::build -> FeedSource::fetch -> parse_feed
//! ```

/// Feed fetching over HTTP
pub mod client;
/// GeoJSON feed parsing
pub mod parser;
/// Request URL construction
pub mod request;

pub use client::{FeedSource, HttpFeedClient};
pub use parser::{FeatureOutcome, SkipReason, parse_feature, parse_feed};
pub use request::{
    DEFAULT_ENDPOINT, FORMAT_GEOJSON, LoadRequest, ORDER_BY_MAGNITUDE, ORDER_BY_TIME,
    RESULT_LIMIT,
};
