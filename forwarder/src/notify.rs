//! Slack webhook delivery.
//!
//! One POST per authenticated inbound request, no retries: Twilio's own
//! retry policy on non-2xx responses is the recovery mechanism. Anything the
//! destination echoes back is redacted of webhook URLs before it can land in
//! an error message or a log line.

use reqwest::Client;
use serde::Serialize;
use tracing::info;

use crate::error::DeliveryError;
use crate::format::ChatMessage;

/// Replacement for a redacted webhook URL.
const REDACTED: &str = "[redacted]";

/// Prefix of Slack incoming-webhook URLs, used for pattern redaction.
const SLACK_HOOK_PREFIX: &str = "https://hooks.slack.com/services/";

/// JSON payload for Slack's incoming-webhook API.
#[derive(Serialize)]
struct SlackPayload {
    text: String,
    unfurl_links: bool,
    unfurl_media: bool,
}

/// Strip webhook URLs out of `text` before it is logged or returned.
///
/// Removes both the exact configured URL and any
/// `https://hooks.slack.com/services/...` run, in case the destination
/// echoes a differently-formatted variant back.
pub fn redact_webhook(text: &str, webhook_url: &str) -> String {
    let mut out = if webhook_url.is_empty() {
        text.to_string()
    } else {
        text.replace(webhook_url, REDACTED)
    };

    while let Some(start) = out.find(SLACK_HOOK_PREFIX) {
        let rest = &out[start..];
        let end = rest
            .find(|c: char| c.is_whitespace())
            .unwrap_or(rest.len());
        out.replace_range(start..start + end, REDACTED);
    }

    out
}

/// Post a formatted message to the Slack webhook.
///
/// Exactly one outbound call; the caller awaits it so Twilio sees the real
/// delivery outcome in the response status.
pub async fn post_to_slack(
    client: &Client,
    webhook_url: &str,
    message: &ChatMessage,
) -> Result<(), DeliveryError> {
    let payload = SlackPayload {
        text: message.text(),
        unfurl_links: message.unfurl_links,
        unfurl_media: message.unfurl_media,
    };

    let response = client
        .post(webhook_url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| DeliveryError::Transport(redact_webhook(&e.to_string(), webhook_url)))?;

    let status = response.status();
    if !status.is_success() {
        // Slack puts the failure reason in the body; tolerate a read failure.
        let body = response.text().await.unwrap_or_default();
        return Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body: redact_webhook(&body, webhook_url),
        });
    }

    info!(status = status.as_u16(), "slack_delivery_ok");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOOK: &str = "https://hooks.slack.com/services/T000/B000/secret";

    #[test]
    fn test_redact_configured_url() {
        let body = format!("no_service at {} (404)", HOOK);
        let redacted = redact_webhook(&body, HOOK);
        assert!(!redacted.contains(HOOK));
        assert_eq!(redacted, "no_service at [redacted] (404)");
    }

    #[test]
    fn test_redact_pattern_variant() {
        // Destination echoes a different hook URL than the configured one.
        let body = "rejected https://hooks.slack.com/services/T1/B1/other ok";
        let redacted = redact_webhook(body, HOOK);
        assert!(!redacted.contains("hooks.slack.com"));
        assert_eq!(redacted, "rejected [redacted] ok");
    }

    #[test]
    fn test_redact_multiple_occurrences() {
        let body = format!("{} and {}", HOOK, HOOK);
        let redacted = redact_webhook(&body, HOOK);
        assert_eq!(redacted, "[redacted] and [redacted]");
    }

    #[test]
    fn test_redact_no_match_passthrough() {
        assert_eq!(redact_webhook("plain error", HOOK), "plain error");
    }

    #[test]
    fn test_redact_empty_webhook_url() {
        assert_eq!(redact_webhook("plain error", ""), "plain error");
    }

    #[test]
    fn test_rejected_error_message_has_no_url() {
        let err = DeliveryError::Rejected {
            status: 404,
            body: redact_webhook(&format!("no_service {}", HOOK), HOOK),
        };
        assert!(!err.to_string().contains(HOOK));
    }
}
