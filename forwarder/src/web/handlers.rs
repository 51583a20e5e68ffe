//! Webhook endpoint handlers.
//!
//! One inbound route, one pipeline: verify the Twilio signature against the
//! reconstructed public URL, format the SMS, post it to Slack, answer
//! Twilio. Twilio retries on non-2xx, so the Slack call is awaited before
//! responding.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, OriginalUri, State},
    http::HeaderMap,
    Json,
};
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Config, SERVICE_NAME};
use crate::error::RelayError;
use crate::format::{format_message, InboundSms};
use crate::notify::post_to_slack;
use crate::web::signature::{public_url, verify_twilio_signature, SIGNATURE_HEADER};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: Client,
}

impl AppState {
    pub fn new(config: Config, http: Client) -> Self {
        Self {
            config: Arc::new(config),
            http,
        }
    }
}

/// Success response body.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub name: &'static str,
}

/// Health check endpoint. No auth required.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        name: SERVICE_NAME,
    })
}

/// Twilio inbound-SMS webhook endpoint.
///
/// Twilio sends application/x-www-form-urlencoded. The raw body is kept so
/// the signature can be verified over the complete parameter set, not just
/// the fields this service cares about.
pub async fn inbound_sms(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<OkResponse>, RelayError> {
    // Fail closed before touching the request body.
    if state.config.slack_webhook_url.trim().is_empty() {
        return Err(RelayError::Configuration("SLACK_WEBHOOK_URL"));
    }
    if state.config.twilio_auth_token.trim().is_empty() {
        return Err(RelayError::Configuration("TWILIO_AUTH_TOKEN"));
    }

    let body = body.map_err(|e| RelayError::Unexpected(e.to_string()))?;

    let params: Vec<(String, String)> = url::form_urlencoded::parse(&body)
        .into_owned()
        .collect();

    let sms = InboundSms {
        from: field(&params, "From"),
        to: field(&params, "To"),
        body: field(&params, "Body"),
        sid: field(&params, "MessageSid"),
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    // Twilio signed the URL it requested, which behind a proxy is not the
    // URL this process sees. Reconstruct from forwarded headers.
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let verification_url = public_url(&headers, path_and_query);

    if !verify_twilio_signature(
        &state.config.twilio_auth_token,
        signature,
        &verification_url,
        &params,
    ) {
        // Enough context to debug header-forwarding misconfiguration,
        // never the token or webhook URL.
        warn!(
            req_url = %uri,
            public_url = %verification_url,
            host = headers.get("host").and_then(|v| v.to_str().ok()),
            xf_host = headers.get("x-forwarded-host").and_then(|v| v.to_str().ok()),
            xf_proto = headers.get("x-forwarded-proto").and_then(|v| v.to_str().ok()),
            has_signature = !signature.is_empty(),
            sid = %sms.sid,
            from = %sms.from,
            to = %sms.to,
            "twilio_signature_invalid"
        );
        return Err(RelayError::Authentication);
    }

    let message = format_message(&sms);

    post_to_slack(&state.http, &state.config.slack_webhook_url, &message).await?;

    info!(
        sid = %sms.sid,
        from = %sms.from,
        to = %sms.to,
        body_length = sms.body.len(),
        "inbound_sms_forwarded"
    );

    Ok(Json(OkResponse { ok: true }))
}

/// First occurrence of a form field, empty string when absent.
fn field(params: &[(String, String)], name: &str) -> String {
    params
        .iter()
        .find(|(k, _)| k.as_str() == name)
        .map(|(_, v)| v.clone())
        .unwrap_or_default()
}
