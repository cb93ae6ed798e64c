use crate::app_config::{AppConfig, Environment, KeyPair};
use crate::ConfigError;

/// Lower and upper bound applied to `X_TWEET_SAMPLE_SIZE`.
const SAMPLE_SIZE_BOUNDS: (usize, usize) = (50, 400);

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can use a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // First non-blank value among a variable and its aliases.
    let first_of = |vars: &[&str]| -> Option<String> {
        vars.iter()
            .filter_map(|var| lookup(var).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    // A half-configured pair drops that strategy from the cascade.
    let key_pair = |id_vars: &[&str], secret_vars: &[&str]| -> Option<KeyPair> {
        match (first_of(id_vars), first_of(secret_vars)) {
            (Some(id), Some(secret)) => Some(KeyPair { id, secret }),
            (None, None) => None,
            (Some(_), None) => {
                tracing::warn!(
                    missing = secret_vars[0],
                    "credential pair incomplete; strategy skipped"
                );
                None
            }
            (None, Some(_)) => {
                tracing::warn!(
                    missing = id_vars[0],
                    "credential pair incomplete; strategy skipped"
                );
                None
            }
        }
    };

    let env = parse_environment(&or_default("DSCOPE_ENV", "development"));

    let bind_addr = or_default("DSCOPE_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("DSCOPE_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("DSCOPE_LOG_LEVEL", "info");
    let store_path = PathBuf::from(or_default("DSCOPE_STORE_PATH", "./data-store.json"));
    let cache_max_age_days = parse_u32("DSCOPE_CACHE_MAX_AGE_DAYS", "180")?;
    let http_timeout_secs = parse_u64("DSCOPE_HTTP_TIMEOUT_SECS", "10")?;
    let model_timeout_secs = parse_u64("DSCOPE_MODEL_TIMEOUT_SECS", "60")?;
    let user_agent = or_default("DSCOPE_USER_AGENT", "dscope/0.1 (discourse-profile)");

    let x_api_base_url = or_default("X_API_BASE_URL", "https://api.x.com/2");
    let x_client_credentials = key_pair(&["X_CLIENT_ID"], &["X_CLIENT_SECRET"]);
    let x_consumer_credentials = key_pair(
        &["X_CONSUMER_KEY", "TWITTER_CONSUMER_KEY", "TWITTER_API_KEY"],
        &[
            "X_CONSUMER_SECRET",
            "TWITTER_CONSUMER_SECRET",
            "TWITTER_API_SECRET",
        ],
    );
    let x_bearer_token =
        first_of(&["X_BEARER_TOKEN", "TWITTER_BEARER_TOKEN"]).map(|raw| decode_bearer(&raw));
    let x_sample_size = parse_sample_size(lookup("X_TWEET_SAMPLE_SIZE").ok().as_deref())
        .map_err(|reason| invalid("X_TWEET_SAMPLE_SIZE", reason))?;

    let openai_api_key = first_of(&["OPENAI_API_KEY"]);
    let openai_model = or_default("OPENAI_MODEL", "gpt-4o");
    let openai_base_url = or_default("OPENAI_BASE_URL", "https://api.openai.com/v1");

    let api_keys = or_default("DSCOPE_API_KEYS", "")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        store_path,
        cache_max_age_days,
        http_timeout_secs,
        model_timeout_secs,
        user_agent,
        x_api_base_url,
        x_client_credentials,
        x_consumer_credentials,
        x_bearer_token,
        x_sample_size,
        openai_api_key,
        openai_model,
        openai_base_url,
        api_keys,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

/// Parse the post sample cap, defaulting to 300 and clamping into 50..=400.
fn parse_sample_size(raw: Option<&str>) -> Result<usize, String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(300);
    };
    let value = raw.parse::<usize>().map_err(|e| e.to_string())?;
    Ok(value.clamp(SAMPLE_SIZE_BOUNDS.0, SAMPLE_SIZE_BOUNDS.1))
}

/// Tokens pasted from a developer portal are sometimes URL-encoded.
fn decode_bearer(raw: &str) -> String {
    percent_encoding::percent_decode_str(raw)
        .decode_utf8()
        .map_or_else(|_| raw.to_string(), std::borrow::Cow::into_owned)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
