//! Request URL construction.

use crate::error::{Error, Result};
use url::Url;

/// USGS FDSN event query endpoint
pub const DEFAULT_ENDPOINT: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";

/// Response format requested from the server
pub const FORMAT_GEOJSON: &str = "geojson";

/// Maximum number of events requested per load
pub const RESULT_LIMIT: u32 = 10;

/// Sort by event time, newest first
pub const ORDER_BY_TIME: &str = "time";

/// Sort by magnitude, largest first
pub const ORDER_BY_MAGNITUDE: &str = "magnitude";

const MANAGED_KEYS: [&str; 4] = ["format", "limit", "minmag", "orderby"];

/// A fully parameterized feed request
///
/// Built fresh for every load and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    url: Url,
}

impl LoadRequest {
    /// Build the request URL for a base endpoint and the user's filters.
    ///
    /// `format` and `limit` are fixed. `min_magnitude` and `order_by` are passed
    /// through verbatim; the server decides what to do with values it does not
    /// understand. Any of the four keys already present on `base_endpoint` are
    /// replaced, so each appears exactly once. Other query pairs on the base are
    /// kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `base_endpoint` is not an absolute URL that can
    /// carry a query.
    pub fn build(base_endpoint: &str, min_magnitude: &str, order_by: &str) -> Result<Self> {
        let mut url = Url::parse(base_endpoint).map_err(|e| {
            Error::config(
                "feed.endpoint",
                format!("'{}' is not an absolute URL: {}", base_endpoint, e),
            )
        })?;
        if url.cannot_be_a_base() {
            return Err(Error::config(
                "feed.endpoint",
                format!("'{}' cannot carry query parameters", base_endpoint),
            ));
        }

        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !MANAGED_KEYS.contains(&&**key))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        url.set_query(None);
        {
            let mut query = url.query_pairs_mut();
            query.extend_pairs(retained);
            query
                .append_pair("format", FORMAT_GEOJSON)
                .append_pair("limit", &RESULT_LIMIT.to_string())
                .append_pair("minmag", min_magnitude)
                .append_pair("orderby", order_by);
        }

        Ok(Self { url })
    }

    /// The request URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The request URL as a string
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl std::fmt::Display for LoadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.url.as_str())
    }
}
