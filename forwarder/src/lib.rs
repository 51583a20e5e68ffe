//! SMS Forwarder - Twilio inbound-SMS to Slack relay.
//!
//! Receives inbound-SMS webhooks from Twilio on a shared business number,
//! verifies their signatures against the account auth token, and forwards
//! the message content to a Slack channel via an incoming webhook.
//!
//! ## Pipeline
//!
//! ```text
//! Twilio webhook → signature verification → formatting → Slack webhook
//! ```
//!
//! No persistence and no retry queue: Twilio's own retry on non-2xx
//! responses is the only recovery mechanism.

pub mod config;
pub mod error;
pub mod format;
pub mod notify;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError, SERVICE_NAME};
pub use error::{DeliveryError, RelayError};
pub use format::{format_message, ChatMessage, InboundSms};
pub use web::AppState;
