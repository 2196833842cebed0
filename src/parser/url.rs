//! The request-target as a small value object.

use std::collections::HashMap;

/// Path and query string taken from the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    /// Everything before the first `?`.
    pub path: String,
    /// Everything after the first `?`, if present. Not decoded.
    pub raw_query: Option<String>,
}

impl Url {
    /// Split a raw request-target into path and query.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('?') {
            Some((path, query)) => Self {
                path: path.to_string(),
                raw_query: Some(query.to_string()),
            },
            None => Self {
                path: raw.to_string(),
                raw_query: None,
            },
        }
    }

    /// Query parameters as a map. Keys without `=` map to an empty string.
    pub fn query_params(&self) -> HashMap<String, String> {
        self.raw_query
            .as_deref()
            .map(|query| query
                .split('&')
                .filter(|s| !s.is_empty())
                .map(|pair| {
                    if let Some((k, v)) = pair.split_once('=') {
                        (k.to_string(), v.to_string())
                    } else {
                        (pair.to_string(), String::new())
                    }
                })
                .collect())
            .unwrap_or_default()
    }

    /// Get a single query parameter value.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_params().remove(name)
    }
}
