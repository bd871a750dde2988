use serde::{Deserialize, Serialize};

pub const BASE_URL_ENV: &str = "SEARCHINDEX_BASE_URL";
pub const AUTH_URL_ENV: &str = "SEARCHINDEX_AUTH_URL";
pub const TIMEOUT_ENV: &str = "SEARCHINDEX_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Search service root, e.g. "https://search.api.globus.org"
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Auth service root; tokens are requested from `{auth_url}/v2/oauth2/token`
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub insecure_skip_verify: bool,
}

fn default_base_url() -> String {
    "https://search.api.globus.org".to_string()
}

fn default_auth_url() -> String {
    "https://auth.globus.org".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("searchindex-rs/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_url: default_auth_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
            insecure_skip_verify: false,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Defaults overridden by `SEARCHINDEX_*` environment variables
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(BASE_URL_ENV) {
            self.base_url = url;
        }
        if let Some(url) = lookup(AUTH_URL_ENV) {
            self.auth_url = url;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid {}", TIMEOUT_ENV),
            }
        }
        self
    }

    pub fn token_url(&self) -> String {
        format!("{}/v2/oauth2/token", self.auth_url.trim_end_matches('/'))
    }
}
