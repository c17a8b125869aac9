//! Client configuration.
//!
//! The base URL is chosen once from the run mode and then frozen into a
//! `ClientConfig` that is handed to each client. Nothing here is global, so
//! clients pointed at different backends can live side by side.

use std::time::Duration;

use serde::Deserialize;

/// Base URL used in development mode.
pub const DEV_BASE_URL: &str = "http://localhost:8000/api";

/// Base URL used in every other mode. Relative to the serving origin.
pub const PROD_BASE_URL: &str = "/api";

/// Applied to every call unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Environment variable holding the run mode.
pub const MODE_ENV_VAR: &str = "ORDER_CLIENT_MODE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Development,
    Production,
}

impl Mode {
    /// `development` or `dev` (any case) selects development; anything else is production.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Mode::Development,
            _ => Mode::Production,
        }
    }

    pub fn from_env() -> Self {
        std::env::var(MODE_ENV_VAR)
            .map(|v| Mode::parse(&v))
            .unwrap_or(Mode::Production)
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Mode::Development => DEV_BASE_URL,
            Mode::Production => PROD_BASE_URL,
        }
    }
}

/// Immutable settings shared by every call a client makes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default = "default_timeout", rename = "timeout_secs", deserialize_with = "secs::deserialize")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn for_mode(mode: Mode) -> Self {
        Self::new(mode.base_url())
    }

    pub fn from_env() -> Self {
        Self::for_mode(Mode::from_env())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// True when the base URL has no scheme and must be resolved against an origin.
    pub fn is_relative(&self) -> bool {
        url::Url::parse(&self.base_url).is_err()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_mode(Mode::Production)
    }
}
