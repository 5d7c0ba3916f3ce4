use std::{env, time::Duration};

pub const DEFAULT_API_ROOT: &str = "https://api2.warera.io";

/// Configuration for the WarEra API client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// API root, without trailing slash
    pub api_root: String,
    /// Value of the Authorization header
    pub bearer_token: Option<String>,
    /// Lower bound of the random pause before each tRPC call
    pub min_delay: Duration,
    /// Upper bound of the random pause before each tRPC call
    pub max_delay: Duration,
    pub timeout: Duration
}

impl ApiConfig {
    /// Creates a configuration from environment variables, using defaults for anything unset
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let millis = |name: &str, fallback: Duration| {
            env::var(name)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(fallback)
        };

        let min_delay = millis("WARERA_REQUEST_DELAY_MIN_MS", defaults.min_delay);
        let max_delay = millis("WARERA_REQUEST_DELAY_MAX_MS", defaults.max_delay).max(min_delay);

        Self {
            api_root: env::var("WARERA_API_ROOT")
                .map(|root| root.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_root),
            bearer_token: env::var("WARERA_BEARER_TOKEN").ok().filter(|t| !t.trim().is_empty()),
            min_delay,
            max_delay,
            timeout: env::var("WARERA_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout)
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        if token.is_some() {
            self.bearer_token = token;
        }
        self
    }

    pub fn trpc_url(&self, procedure: &str) -> String {
        format!("{}/trpc/{}", self.api_root, procedure)
    }

    pub fn countries_url(&self) -> String {
        format!("{}/countries", self.api_root)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            bearer_token: None,
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(8),
            timeout: Duration::from_secs(30)
        }
    }
}
