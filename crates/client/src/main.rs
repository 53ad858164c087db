//! `console-login`: log in to the admin console with a sealed password.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise JSON logging.
//! 3. Build the HTTPS transport.
//! 4. Fetch the server public key and submit the login.
//! 5. Print the returned user to stdout.

mod config;
mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use config::Config;
use console_client::{ConsoleClient, HyperTransport, PublicKeyProvider};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Logging is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        api_base_url = %cfg.api_base_url,
        "console-login starting"
    );

    // -----------------------------------------------------------------------
    // 3. Transport
    // -----------------------------------------------------------------------
    let mut transport = HyperTransport::new(&cfg.api_base_url, cfg.request_timeout())
        .context("failed to create API transport")?;
    if let Some(token) = &cfg.api_token {
        transport = transport.with_bearer_token(token.as_str());
    }
    let transport = Arc::new(transport);

    // -----------------------------------------------------------------------
    // 4. Login
    // -----------------------------------------------------------------------
    let keys = PublicKeyProvider::with_path(Arc::clone(&transport), cfg.public_key_path.as_str());
    let client = ConsoleClient::with_provider(transport, keys).with_login_path(cfg.login_path.as_str());

    let response = client
        .login(&cfg.login_username, &cfg.login_password)
        .await
        .context("login failed")?;

    // -----------------------------------------------------------------------
    // 5. Report
    // -----------------------------------------------------------------------
    println!("{}", serde_json::to_string_pretty(&response.user)?);
    if response.token.is_some() {
        eprintln!("token issued");
    } else {
        eprintln!("no token issued (session cookie deployment)");
    }

    Ok(())
}
