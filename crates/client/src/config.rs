//! Configuration loading and validation for `console-login`.
//!
//! All values are read from environment variables at startup. The process
//! exits with a clear message if a required variable is missing or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated login tool configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Console API base URL, e.g. `https://console.example.com/api/v1`. **Required.**
    pub api_base_url: String,

    /// Path of the public key endpoint below the base URL.
    #[serde(default = "default_public_key_path")]
    pub public_key_path: String,

    /// Path of the login endpoint below the base URL.
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// **Required.**
    pub login_username: String,

    /// Sealed before it is sent. **Required.**
    pub login_password: String,

    /// Bearer token sent on every request, if set.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_public_key_path() -> String {
    console_client::pubkey::DEFAULT_PUBLIC_KEY_PATH.into()
}
fn default_login_path() -> String {
    console_client::submit::DEFAULT_LOGIN_PATH.into()
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".into()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("public_key_path", &self.public_key_path)
            .field("login_path", &self.login_path)
            .field("login_username", &self.login_username)
            .field("login_password", &"[REDACTED]")
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.api_base_url, "API_BASE_URL")?;
        ensure_non_empty(&self.login_username, "LOGIN_USERNAME")?;
        ensure_non_empty(&self.login_password, "LOGIN_PASSWORD")?;

        let url = self.api_base_url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            anyhow::bail!("API_BASE_URL must be an http:// or https:// URL");
        }
        for (path, name) in [
            (&self.public_key_path, "PUBLIC_KEY_PATH"),
            (&self.login_path, "LOGIN_PATH"),
        ] {
            if !path.starts_with('/') {
                anyhow::bail!("{name} must start with '/'");
            }
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be > 0");
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
