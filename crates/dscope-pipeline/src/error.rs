use dscope_core::ProfileError;
use dscope_model::ModelError;
use dscope_signals::Rejection;
use dscope_store::StoreError;
use dscope_x::XApiError;
use thiserror::Error;

/// Failure of one analysis run, carrying what a caller needs to respond:
/// an HTTP-style [`status`](Self::status), a stable [`code`](Self::code) and a
/// [`user_message`](Self::user_message) safe to show.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid handle: {0:?}")]
    InvalidHandle(String),

    #[error("account is not eligible for analysis: {}", .0.message)]
    Ineligible(Rejection),

    #[error("no meaningful signals found in the sampled posts")]
    NoSignals,

    #[error(transparent)]
    Upstream(#[from] XApiError),

    #[error("model service failed: {0}")]
    ModelUnavailable(#[source] ModelError),

    #[error("model output failed validation after repair: {0}")]
    InvalidModelOutput(#[source] ProfileError),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("failed to encode model input: {0}")]
    Encode(#[source] serde_json::Error),
}

impl PipelineError {
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidHandle(_) | Self::NoSignals => 400,
            Self::Ineligible(rejection) => rejection.http_status(),
            Self::Upstream(e) => e.status(),
            Self::ModelUnavailable(_) => 502,
            Self::InvalidModelOutput(_) | Self::Storage(_) | Self::Encode(_) => 500,
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::InvalidHandle(_) => "InvalidHandle",
            Self::Ineligible(rejection) => rejection.code.as_str(),
            Self::NoSignals => "NoSignals",
            Self::Upstream(e) => e.code().unwrap_or(match e.status() {
                402 => "CreditsDepleted",
                404 => "UserNotFound",
                _ => "UpstreamError",
            }),
            Self::ModelUnavailable(_) => "ModelUnavailable",
            Self::InvalidModelOutput(_) => "InvalidModelOutput",
            Self::Storage(_) => "StorageError",
            Self::Encode(_) => "InternalError",
        }
    }

    /// Message for the caller. Internal detail is only included for upstream
    /// platform errors, whose text comes from the platform itself.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidHandle(_) => {
                "A valid X handle (1-15 letters, digits or underscores) is required.".to_string()
            }
            Self::Ineligible(rejection) => rejection.message.clone(),
            Self::NoSignals => {
                "No meaningful signal was found in the sampled posts.".to_string()
            }
            Self::Upstream(XApiError::EmptyProfile { .. }) => {
                "The account has an empty bio and no posts to analyze.".to_string()
            }
            Self::Upstream(e) => match e.status() {
                402 => "X API credits are exhausted. Top up credits in the X developer portal."
                    .to_string(),
                404 => "The handle was not found or is not accessible.".to_string(),
                _ => e.to_string(),
            },
            Self::ModelUnavailable(_) => {
                "The analysis model is unavailable. Try again later.".to_string()
            }
            Self::InvalidModelOutput(_) => {
                "The analysis model returned an invalid result.".to_string()
            }
            Self::Storage(_) | Self::Encode(_) => "Internal server error.".to_string(),
        }
    }
}

/// Failure to assemble an [`Analyzer`](crate::Analyzer) from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(
        "no X API credentials configured; set X_CLIENT_ID/X_CLIENT_SECRET, \
         X_CONSUMER_KEY/X_CONSUMER_SECRET or X_BEARER_TOKEN"
    )]
    MissingCredentials,

    #[error("OPENAI_API_KEY is required to run analyses")]
    MissingModelKey,

    #[error("failed to build X API client: {0}")]
    XClient(#[source] XApiError),

    #[error("failed to build model client: {0}")]
    ModelClient(#[source] ModelError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(status: u16, code: Option<&str>) -> PipelineError {
        PipelineError::Upstream(XApiError::Api {
            status,
            code: code.map(str::to_string),
            message: "upstream".to_string(),
        })
    }

    #[test]
    fn upstream_status_is_preserved_with_default_codes() {
        let credits = upstream(402, None);
        assert_eq!(credits.status(), 402);
        assert_eq!(credits.code(), "CreditsDepleted");

        let missing = upstream(404, None);
        assert_eq!(missing.code(), "UserNotFound");

        let limited = upstream(429, Some("TooManyRequests"));
        assert_eq!(limited.status(), 429);
        assert_eq!(limited.code(), "TooManyRequests");
        assert_eq!(limited.user_message(), "X API 429: upstream");
    }

    #[test]
    fn upstream_code_from_body_wins_over_default() {
        let err = upstream(402, Some("UsageCapExceeded"));
        assert_eq!(err.code(), "UsageCapExceeded");
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let err = PipelineError::Encode(serde_json::from_str::<u8>("x").unwrap_err());
        assert_eq!(err.status(), 500);
        assert_eq!(err.user_message(), "Internal server error.");
    }

    #[test]
    fn model_failures_map_to_gateway_and_internal() {
        let unavailable = PipelineError::ModelUnavailable(ModelError::EmptyResponse);
        assert_eq!(unavailable.status(), 502);
        assert_eq!(unavailable.code(), "ModelUnavailable");

        let invalid = PipelineError::InvalidModelOutput(ProfileError::Invalid(vec![
            "axis_scores.authority_orientation.value 14 outside [-10, 10]".to_string(),
        ]));
        assert_eq!(invalid.status(), 500);
        assert_eq!(invalid.code(), "InvalidModelOutput");
    }
}
