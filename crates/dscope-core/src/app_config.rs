use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// An id/secret pair used for an OAuth client-credentials style exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub id: String,
    pub secret: String,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("id", &self.id)
            .field("secret", &"[redacted]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub store_path: PathBuf,
    pub cache_max_age_days: u32,
    pub http_timeout_secs: u64,
    pub model_timeout_secs: u64,
    pub user_agent: String,
    pub x_api_base_url: String,
    pub x_client_credentials: Option<KeyPair>,
    pub x_consumer_credentials: Option<KeyPair>,
    pub x_bearer_token: Option<String>,
    pub x_sample_size: usize,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub api_keys: Vec<String>,
}

impl AppConfig {
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.env == Environment::Development
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("store_path", &self.store_path)
            .field("cache_max_age_days", &self.cache_max_age_days)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("model_timeout_secs", &self.model_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("x_api_base_url", &self.x_api_base_url)
            .field("x_client_credentials", &self.x_client_credentials)
            .field("x_consumer_credentials", &self.x_consumer_credentials)
            .field(
                "x_bearer_token",
                &self.x_bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .field("x_sample_size", &self.x_sample_size)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("openai_model", &self.openai_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("api_keys", &format!("[{} redacted]", self.api_keys.len()))
            .finish()
    }
}
