use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(parse_environment("development"), Environment::Development);
}

#[test]
fn parse_environment_production() {
    assert_eq!(parse_environment("production"), Environment::Production);
}

#[test]
fn parse_environment_unknown_defaults_to_development() {
    assert_eq!(parse_environment("staging"), Environment::Development);
}

#[test]
fn build_app_config_applies_defaults() {
    let map = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.store_path.to_str(), Some("./data-store.json"));
    assert_eq!(cfg.cache_max_age_days, 180);
    assert_eq!(cfg.http_timeout_secs, 10);
    assert_eq!(cfg.model_timeout_secs, 60);
    assert_eq!(cfg.x_api_base_url, "https://api.x.com/2");
    assert_eq!(cfg.x_sample_size, 300);
    assert_eq!(cfg.openai_model, "gpt-4o");
    assert!(cfg.x_client_credentials.is_none());
    assert!(cfg.x_consumer_credentials.is_none());
    assert!(cfg.x_bearer_token.is_none());
    assert!(cfg.openai_api_key.is_none());
    assert!(cfg.api_keys.is_empty());
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("DSCOPE_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DSCOPE_BIND_ADDR"),
        "expected InvalidEnvVar(DSCOPE_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_timeout() {
    let mut map = HashMap::new();
    map.insert("DSCOPE_HTTP_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DSCOPE_HTTP_TIMEOUT_SECS"),
        "expected InvalidEnvVar(DSCOPE_HTTP_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn sample_size_is_clamped_into_bounds() {
    assert_eq!(parse_sample_size(Some("10")), Ok(50));
    assert_eq!(parse_sample_size(Some("1000")), Ok(400));
    assert_eq!(parse_sample_size(Some("120")), Ok(120));
    assert_eq!(parse_sample_size(Some("  ")), Ok(300));
    assert_eq!(parse_sample_size(None), Ok(300));
    assert!(parse_sample_size(Some("many")).is_err());
}

#[test]
fn half_configured_pair_skips_only_that_strategy() {
    let mut map = HashMap::new();
    map.insert("X_CLIENT_ID", "client");
    map.insert("X_CONSUMER_KEY", "consumer-key");
    map.insert("X_CONSUMER_SECRET", "consumer-secret");
    let cfg = build_app_config(lookup_from_map(&map)).expect("startup continues");
    assert!(cfg.x_client_credentials.is_none());
    assert_eq!(
        cfg.x_consumer_credentials.map(|pair| pair.id).as_deref(),
        Some("consumer-key")
    );
}

#[test]
fn secret_without_id_is_skipped() {
    let mut map = HashMap::new();
    map.insert("TWITTER_API_SECRET", "orphan-secret");
    let cfg = build_app_config(lookup_from_map(&map)).expect("startup continues");
    assert!(cfg.x_consumer_credentials.is_none());
}

#[test]
fn consumer_credentials_fall_back_to_legacy_names() {
    let mut map = HashMap::new();
    map.insert("TWITTER_API_KEY", "legacy-key");
    map.insert("TWITTER_CONSUMER_SECRET", "legacy-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let pair = cfg.x_consumer_credentials.expect("consumer pair");
    assert_eq!(pair.id, "legacy-key");
    assert_eq!(pair.secret, "legacy-secret");
}

#[test]
fn bearer_token_is_percent_decoded() {
    let mut map = HashMap::new();
    map.insert("TWITTER_BEARER_TOKEN", "AAAA%3Dabc%2Bdef");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.x_bearer_token.as_deref(), Some("AAAA=abc+def"));
}

#[test]
fn api_keys_are_split_and_trimmed() {
    let mut map = HashMap::new();
    map.insert("DSCOPE_API_KEYS", " one, two ,,three");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_keys, vec!["one", "two", "three"]);
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = HashMap::new();
    map.insert("OPENAI_API_KEY", "sk-very-secret");
    map.insert("X_CLIENT_ID", "client");
    map.insert("X_CLIENT_SECRET", "hunter2");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("sk-very-secret"));
    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("[redacted]"));
}
