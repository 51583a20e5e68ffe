//! Web layer: the Twilio webhook endpoint and its signature verification.
//!
//! The handler rejects unauthenticated requests early; everything that
//! passes is formatted and relayed to Slack within the same request.

pub mod handlers;
pub mod signature;

pub use handlers::{health, inbound_sms, AppState, HealthResponse, OkResponse};
pub use signature::{public_url, verify_twilio_signature};
