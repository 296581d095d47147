use std::convert::Infallible;

use devcamper_core::axum::extract::FromRequestParts;
use devcamper_core::axum::http::request::Parts;

/// Query-string keys that control shaping and pagination; never filter terms.
pub const RESERVED_PARAMS: [&str; 4] = ["select", "sort", "page", "limit"];

pub fn is_reserved(key: &str) -> bool {
    RESERVED_PARAMS.contains(&key)
}

/// The raw query-string parameters of one request, decoded and kept in
/// their original order. Repeated keys are preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a raw query string such as `averageCost%5Blte%5D=10000&page=2`.
    pub fn parse(raw: &str) -> Self {
        let pairs = form_urlencoded::parse(raw.trim_start_matches('?').as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// First value given for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Every pair whose key is not a reserved control parameter.
    pub fn filter_terms(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(k, _)| !is_reserved(k))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for QueryParams {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.uri.query().map(QueryParams::parse).unwrap_or_default())
    }
}
