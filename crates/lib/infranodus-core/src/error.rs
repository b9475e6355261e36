use thiserror::Error;

/// Input rejected before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required and must not be empty")]
    EmptyField { field: &'static str },

    #[error("invalid {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("invalid {field}: expected `user:graph[:query]`, got `{value}`")]
    MalformedId { field: &'static str, value: String },

    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

impl ValidationError {
    /// Name of the offending field, or the tool name for unknown tools.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::EmptyField { field } | Self::MalformedId { field, .. } => *field,
            Self::InvalidField { field, .. } => field.as_str(),
            Self::UnknownTool(name) => name.as_str(),
        }
    }
}

/// Errors produced while validating, calling, or decoding a tool invocation.
#[derive(Debug, Error)]
pub enum NodusError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Non-2xx status, transport failure, or timeout. `status` is `None` when no
    /// response was received.
    #[error("{}", remote_message(.status, .body))]
    RemoteApi { status: Option<u16>, body: String },

    /// HTTP 200 with an `error` field in the payload.
    #[error("{0}")]
    UpstreamDomain(String),

    #[error("failed to decode API response: {0}")]
    Decode(String),

    #[error("invalid API configuration: {0}")]
    Config(String),

    #[error("stream already registered: {0}")]
    StreamConflict(String),
}

impl NodusError {
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<reqwest::Error> for NodusError {
    fn from(err: reqwest::Error) -> Self {
        let body = if err.is_timeout() {
            format!("request timed out: {err}")
        } else {
            err.to_string()
        };
        Self::RemoteApi {
            status: err.status().map(|status| status.as_u16()),
            body,
        }
    }
}

fn remote_message(status: &Option<u16>, body: &str) -> String {
    match status {
        Some(status) => format!("API request failed ({status}): {body}"),
        None => format!("API request failed: {body}"),
    }
}

pub type NodusResult<T> = Result<T, NodusError>;
