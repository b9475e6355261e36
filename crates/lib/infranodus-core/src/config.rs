use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://infranodus.com/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// Connection settings for the InfraNodus API.
///
/// Constructed once by the host (or once per tenant session) and handed to the
/// gateway; nothing in this crate reads process environment.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub api_key: String,
    pub api_base: String,
    pub request_timeout: Duration,
}

impl ApiConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
