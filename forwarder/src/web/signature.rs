//! Twilio webhook signature verification.
//!
//! Twilio signs each webhook with HMAC-SHA1 over the exact URL it requested
//! plus the sorted form parameters, keyed by the account's auth token and
//! base64-encoded.
//! Reference: https://www.twilio.com/docs/usage/security#validating-requests
//!
//! The URL part is the trap: behind a reverse proxy the internally-visible
//! URL is not what Twilio signed, so the externally-visible URL must be
//! reconstructed from forwarded headers before verifying.

use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use tracing::warn;

type HmacSha1 = Hmac<Sha1>;

/// Header carrying the claimed signature.
pub const SIGNATURE_HEADER: &str = "x-twilio-signature";

/// Reconstruct the URL Twilio believes it requested.
///
/// Scheme comes from `x-forwarded-proto`, defaulting to `https` when absent
/// (TLS-terminating proxies are the common deployment). Host comes from
/// `x-forwarded-host`, falling back to `host`. The path and query are taken
/// verbatim: the signing scheme is byte-exact, so no normalization.
pub fn public_url(headers: &HeaderMap, path_and_query: &str) -> String {
    let proto = header_str(headers, "x-forwarded-proto").unwrap_or("https");
    let host = header_str(headers, "x-forwarded-host")
        .or_else(|| header_str(headers, "host"))
        .unwrap_or("");

    format!("{}://{}{}", proto, host, path_and_query)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Verify a Twilio webhook signature.
///
/// The signing input is the full request URL followed by every form
/// parameter sorted by key, with key and value concatenated. Returns `true`
/// only on an exact constant-time match; any missing or malformed input
/// returns `false`, never panics.
pub fn verify_twilio_signature(
    auth_token: &str,
    signature: &str,
    url: &str,
    params: &[(String, String)],
) -> bool {
    if auth_token.is_empty() || signature.is_empty() || url.is_empty() {
        warn!(
            has_auth_token = !auth_token.is_empty(),
            has_signature = !signature.is_empty(),
            has_url = !url.is_empty(),
            "twilio_signature_missing_inputs"
        );
        return false;
    }

    let expected = match compute_signature(auth_token, url, params) {
        Some(s) => s,
        None => {
            warn!("twilio_signature_invalid_key");
            return false;
        }
    };

    let valid = constant_time_compare(&expected, signature);

    if !valid {
        warn!(
            expected_length = expected.len(),
            actual_length = signature.len(),
            "twilio_signature_mismatch"
        );
    }

    valid
}

/// Compute the expected signature: base64(HMAC-SHA1(token, url + sorted params)).
pub fn compute_signature(
    auth_token: &str,
    url: &str,
    params: &[(String, String)],
) -> Option<String> {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut data = url.to_string();
    for (key, value) in sorted {
        data.push_str(key);
        data.push_str(value);
    }

    let mut mac = HmacSha1::new_from_slice(auth_token.as_bytes()).ok()?;
    mac.update(data.as_bytes());

    Some(BASE64.encode(mac.finalize().into_bytes()))
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_public_url_from_forwarded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("example.com"));
        headers.insert("host", HeaderValue::from_static("internal.local"));

        assert_eq!(
            public_url(&headers, "/api/inbound-sms"),
            "https://example.com/api/inbound-sms"
        );
    }

    #[test]
    fn test_public_url_host_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("internal.local"));

        assert_eq!(
            public_url(&headers, "/api/inbound-sms"),
            "https://internal.local/api/inbound-sms"
        );
    }

    #[test]
    fn test_public_url_defaults_to_https() {
        let headers = HeaderMap::new();
        assert_eq!(public_url(&headers, "/x"), "https:///x");
    }

    #[test]
    fn test_public_url_preserves_query_verbatim() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-host", HeaderValue::from_static("example.com"));

        assert_eq!(
            public_url(&headers, "/api/inbound-sms?a=1&b=2"),
            "https://example.com/api/inbound-sms?a=1&b=2"
        );
    }

    #[test]
    fn test_verify_signature_round_trip() {
        let token = "test-auth-token";
        let url = "https://example.com/api/inbound-sms";
        let body = params(&[("From", "+15551234567"), ("Body", "hello")]);

        let signature = compute_signature(token, url, &body).unwrap();

        assert!(verify_twilio_signature(token, &signature, url, &body));
    }

    #[test]
    fn test_verify_signature_single_char_mutation() {
        let token = "test-auth-token";
        let url = "https://example.com/api/inbound-sms";
        let body = params(&[("From", "+15551234567"), ("Body", "hello")]);

        let signature = compute_signature(token, url, &body).unwrap();

        // Flip each character in turn; no near-match may pass.
        for i in 0..signature.len() {
            let mut mutated: Vec<u8> = signature.bytes().collect();
            mutated[i] = if mutated[i] == b'A' { b'B' } else { b'A' };
            let mutated = String::from_utf8(mutated).unwrap();
            if mutated == signature {
                continue;
            }
            assert!(!verify_twilio_signature(token, &mutated, url, &body));
        }
    }

    #[test]
    fn test_verify_signature_wrong_token() {
        let url = "https://example.com/api/inbound-sms";
        let body = params(&[("Body", "hello")]);

        let signature = compute_signature("right-token", url, &body).unwrap();

        assert!(!verify_twilio_signature("wrong-token", &signature, url, &body));
    }

    #[test]
    fn test_verify_signature_url_sensitive() {
        let token = "test-auth-token";
        let body = params(&[("Body", "hello")]);

        let signature =
            compute_signature(token, "https://example.com/api/inbound-sms", &body).unwrap();

        // Same body, different host: must fail.
        assert!(!verify_twilio_signature(
            token,
            &signature,
            "https://internal.local/api/inbound-sms",
            &body
        ));
    }

    #[test]
    fn test_verify_signature_param_order_independent() {
        let token = "test-auth-token";
        let url = "https://example.com/api/inbound-sms";

        let forward = params(&[("A", "1"), ("B", "2")]);
        let reverse = params(&[("B", "2"), ("A", "1")]);

        let signature = compute_signature(token, url, &forward).unwrap();

        assert!(verify_twilio_signature(token, &signature, url, &reverse));
    }

    #[test]
    fn test_verify_signature_missing_inputs() {
        let body = params(&[("Body", "hello")]);
        assert!(!verify_twilio_signature("", "sig", "https://x", &body));
        assert!(!verify_twilio_signature("token", "", "https://x", &body));
        assert!(!verify_twilio_signature("token", "sig", "", &body));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
