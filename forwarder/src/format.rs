//! Slack message formatting for inbound SMS notifications.
//!
//! Pure functions only: no I/O, no side effects, never fails. The same
//! notification always renders to the same message.

/// Decoded form fields from a Twilio inbound-SMS webhook.
///
/// Twilio omits fields it has no value for; absence is represented as an
/// empty string, never as a crash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundSms {
    pub from: String,
    pub to: String,
    pub body: String,
    pub sid: String,
}

/// A rendered chat message: ordered lines plus link-preview suppression.
///
/// Constructed once per request and handed to the notifier unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub lines: Vec<String>,
    pub unfurl_links: bool,
    pub unfurl_media: bool,
}

impl ChatMessage {
    /// Render the message text as Slack expects it.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Placeholder rendered when the SMS body is empty.
const EMPTY_BODY_PLACEHOLDER: &str = "(empty body)";

/// Find the first `http://` or `https://` URL in `text`.
///
/// Greedy non-whitespace match, case-insensitive scheme. At most one URL is
/// extracted even when several are present.
pub fn first_url(text: &str) -> Option<&str> {
    let lower = text.to_ascii_lowercase();

    let start = ["http://", "https://"]
        .iter()
        .filter_map(|scheme| lower.find(scheme))
        .min()?;

    let rest = &text[start..];
    let end = rest
        .find(|c: char| c.is_whitespace())
        .unwrap_or(rest.len());

    Some(&rest[..end])
}

/// Format an inbound SMS as a Slack message.
///
/// Empty fields are omitted entirely rather than rendered as blank lines.
/// Unfurling is always suppressed so the forwarded content does not grow
/// inline previews in the channel.
pub fn format_message(sms: &InboundSms) -> ChatMessage {
    let mut lines = vec!["*Inbound SMS*".to_string()];

    if !sms.from.is_empty() {
        lines.push(format!("*From:* `{}`", sms.from));
    }
    if !sms.to.is_empty() {
        lines.push(format!("*To:* `{}`", sms.to));
    }
    if !sms.sid.is_empty() {
        lines.push(format!("*Sid:* `{}`", sms.sid));
    }

    lines.push(String::new());

    if sms.body.is_empty() {
        lines.push(EMPTY_BODY_PLACEHOLDER.to_string());
    } else {
        lines.push(sms.body.clone());
    }

    if let Some(url) = first_url(&sms.body) {
        lines.push(format!("*Link:* {}", url));
    }

    ChatMessage {
        lines,
        unfurl_links: false,
        unfurl_media: false,
    }
}
