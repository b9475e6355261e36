use std::fmt;

use reqwest::Url;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::NodusError;

/// Upstream endpoints this server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Endpoint {
    GraphAndStatements,
    GraphAndAdvice,
    Search,
}

impl Endpoint {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::GraphAndStatements => "/graphAndStatements",
            Self::GraphAndAdvice => "/graphAndAdvice",
            Self::Search => "/search",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// One outbound call: endpoint, ordered query parameters, and JSON body.
///
/// Built fresh for every invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQueryRequest {
    pub endpoint: Endpoint,
    pub query: Vec<(&'static str, String)>,
    pub body: Map<String, Value>,
}

impl GraphQueryRequest {
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            query: Vec::new(),
            body: Map::new(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.body.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn with_optional_body(self, key: &str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.with_body(key, value),
            None => self,
        }
    }

    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn body_value(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// Full request URL under `api_base`, with the query string encoded the
    /// way the API expects (`application/x-www-form-urlencoded`).
    ///
    /// # Errors
    /// Returns `NodusError::Config` when `api_base` is not an absolute URL.
    pub fn url(&self, api_base: &str) -> Result<Url, NodusError> {
        let mut url = Url::parse(&format!("{api_base}{}", self.endpoint.path()))
            .map_err(|err| NodusError::Config(format!("invalid API base `{api_base}`: {err}")))?;
        if !self.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        Ok(url)
    }
}
