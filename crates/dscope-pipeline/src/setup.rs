use std::sync::Arc;

use dscope_core::{AppConfig, Clock, SystemClock};
use dscope_model::{OpenAiClient, OpenAiConfig};
use dscope_store::{JsonFileStore, RecordStore};
use dscope_x::{CredentialChain, TokenCache, XClient, XClientConfig};

use crate::analyzer::{Analyzer, AnalyzerSettings};
use crate::error::SetupError;

/// Open the configured record store without building any network clients.
#[must_use]
pub fn open_store(config: &AppConfig) -> Arc<dyn RecordStore> {
    Arc::new(JsonFileStore::new(config.store_path.clone()))
}

/// Wire the X client, model client and file store from configuration.
///
/// # Errors
///
/// Returns [`SetupError`] when X credentials or the model API key are
/// missing, or a client cannot be constructed.
pub fn build_analyzer(config: &AppConfig) -> Result<Analyzer, SetupError> {
    let chain = CredentialChain::from_config(config);
    if chain.is_empty() {
        return Err(SetupError::MissingCredentials);
    }
    let api_key = config
        .openai_api_key
        .clone()
        .ok_or(SetupError::MissingModelKey)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let token_cache = Arc::new(TokenCache::new(Arc::clone(&clock)));
    let x_client = XClient::new(XClientConfig::from_app_config(config), chain, token_cache)
        .map_err(SetupError::XClient)?;

    let model = OpenAiClient::new(OpenAiConfig {
        api_key,
        model: config.openai_model.clone(),
        base_url: config.openai_base_url.clone(),
        timeout_secs: config.model_timeout_secs,
        user_agent: config.user_agent.clone(),
    })
    .map_err(SetupError::ModelClient)?;

    tracing::info!(
        model = %config.openai_model,
        store = %config.store_path.display(),
        sample_size = config.x_sample_size,
        "analyzer configured"
    );

    Ok(Analyzer::new(
        Arc::new(x_client),
        Arc::new(model),
        open_store(config),
        clock,
        AnalyzerSettings::from_app_config(config),
    ))
}
