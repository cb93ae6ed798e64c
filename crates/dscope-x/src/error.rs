use serde_json::Value;
use thiserror::Error;

/// Errors returned by the X API client.
#[derive(Debug, Error)]
pub enum XApiError {
    /// Non-success response, or a success response carrying an `errors` list.
    #[error("X API {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Every configured credential strategy failed, or none is configured.
    #[error("no valid X API credentials: {0}")]
    Credentials(String),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The account exists but has neither a bio nor any posts.
    #[error("@{handle} has an empty bio and no posts")]
    EmptyProfile { handle: String },
}

impl XApiError {
    /// HTTP-style status to surface to callers.
    ///
    /// Upstream statuses are preserved; transport failures map to 502, or 504
    /// for timeouts.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Api { status, .. } => *status,
            Self::Http(e) if e.is_timeout() => 504,
            Self::Http(e) => e.status().map_or(502, |s| s.as_u16()),
            Self::Credentials(_) | Self::Deserialize { .. } => 502,
            Self::InvalidBaseUrl { .. } => 500,
            Self::EmptyProfile { .. } => 404,
        }
    }

    /// Machine-readable code, when one is known.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            Self::Http(e) if e.is_timeout() => Some("Timeout"),
            Self::Credentials(_) => Some("CredentialsUnavailable"),
            Self::EmptyProfile { .. } => Some("EmptyProfile"),
            Self::Http(_) | Self::Deserialize { .. } | Self::InvalidBaseUrl { .. } => None,
        }
    }

    /// Build an [`XApiError::Api`] from a response body, pulling the code and
    /// detail from the first entry of `errors` or from top-level fields.
    pub(crate) fn from_body(status: u16, body: &Value) -> Self {
        let first = body
            .get("errors")
            .and_then(Value::as_array)
            .and_then(|errors| errors.first());

        let code = first
            .and_then(|e| e.get("code"))
            .and_then(value_to_string)
            .or_else(|| first.and_then(|e| e.get("title")).and_then(value_to_string))
            .or_else(|| body.get("title").and_then(value_to_string))
            .or_else(|| body.get("error").and_then(value_to_string));

        let message = first
            .and_then(|e| e.get("detail").or_else(|| e.get("message")))
            .and_then(value_to_string)
            .or_else(|| body.get("detail").and_then(value_to_string))
            .or_else(|| body.get("title").and_then(value_to_string))
            .or_else(|| body.get("error").and_then(value_to_string))
            .unwrap_or_else(|| "request failed".to_string());

        Self::Api {
            status,
            code,
            message,
        }
    }
}

/// Strings pass through; numeric codes are rendered as text.
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
