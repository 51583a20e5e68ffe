//! Configuration module for environment variable parsing.
//!
//! Both secrets are required: the service fails closed at startup rather
//! than accepting unverified webhooks.

use std::env;

use thiserror::Error;
use url::Url;

/// Name reported by the health endpoint.
pub const SERVICE_NAME: &str = "sms-forwarder";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Slack incoming-webhook URL that formatted messages are posted to.
    pub slack_webhook_url: String,

    /// Twilio auth token used to verify inbound webhook signatures.
    pub twilio_auth_token: String,

    /// Port for the web server to listen on.
    pub port: u16,
}

/// Error constructing a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingVar(&'static str),

    #[error("SLACK_WEBHOOK_URL is not a valid URL: {0}")]
    InvalidWebhookUrl(#[from] url::ParseError),
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `SLACK_WEBHOOK_URL` and `TWILIO_AUTH_TOKEN` are required and must be
    /// non-empty. `PORT` is optional and defaults to 8080.
    pub fn from_env() -> Result<Self, ConfigError> {
        let slack_webhook_url = require_var("SLACK_WEBHOOK_URL")?;
        let twilio_auth_token = require_var("TWILIO_AUTH_TOKEN")?;

        // Catch copy-paste mistakes at startup instead of on the first delivery.
        Url::parse(&slack_webhook_url)?;

        Ok(Config {
            slack_webhook_url,
            twilio_auth_token,
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }
}

/// Read a required environment variable, treating empty values as missing.
fn require_var(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name)),
    }
}
