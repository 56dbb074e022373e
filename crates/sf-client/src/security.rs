//! Security utilities for handshake diagnostics.
//!
//! Response bodies from the token and identity endpoints end up in error
//! messages, and error messages end up in build logs. Everything that
//! carries a body MUST go through [`sanitize_error_message`] first.
//!
//! ```rust
//! use sf_buildpack_client::security::sanitize_error_message;
//!
//! let body = r#"{"access_token":"00Dxx0000000001!AQ0AQHqz.ZHg","id":"x"}"#;
//! let safe = sanitize_error_message(body);
//! assert!(!safe.contains("AQHqz"));
//! ```

use regex_lite::Regex;
use std::sync::LazyLock;

/// Longest sanitized message, in bytes, before the truncation marker.
pub const MAX_MESSAGE_LENGTH: usize = 500;

const TRUNCATION_MARKER: &str = "...[truncated]";

// Salesforce access tokens look like `<15+ char org id>!<opaque>`
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"00[A-Za-z0-9]{13,}![A-Za-z0-9_.]+").expect("token pattern is valid")
});

static SESSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sid=[A-Za-z0-9]{20,}").expect("session pattern is valid"));

static SECRET_FIELD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(access_token|refresh_token|client_secret|signature)"\s*:\s*"[^"]*""#)
        .expect("secret field pattern is valid")
});

/// Sanitize a message to prevent exposing sensitive data.
///
/// This function:
/// - Redacts JSON fields that hold tokens or secrets
/// - Removes anything that looks like an access token
/// - Removes session IDs
/// - Truncates messages longer than [`MAX_MESSAGE_LENGTH`] bytes
#[must_use]
pub fn sanitize_error_message(message: &str) -> String {
    let sanitized = SECRET_FIELD_PATTERN.replace_all(message, r#""$1":"[REDACTED]""#);
    let sanitized = TOKEN_PATTERN.replace_all(&sanitized, "[REDACTED_TOKEN]");
    let mut sanitized = SESSION_PATTERN
        .replace_all(&sanitized, "sid=[REDACTED]")
        .into_owned();

    if sanitized.len() > MAX_MESSAGE_LENGTH {
        let mut cut = MAX_MESSAGE_LENGTH;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str(TRUNCATION_MARKER);
    }

    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_access_token_shape() {
        let msg = "token 00Dxx0000001gPL!AR8AQJXg5oj8jXSgxJfA0lBog.39AsX.LVpxezPwuX5VAIrrbbHMuol7Pa failed";
        let sanitized = sanitize_error_message(msg);
        assert!(sanitized.contains("[REDACTED_TOKEN]"));
        assert!(!sanitized.contains("AR8AQJXg5oj8"));
        assert!(sanitized.ends_with("failed"));
    }

    #[test]
    fn test_redacts_secret_json_fields() {
        let body = r#"{"access_token":"abc","refresh_token":"def","client_secret":"ghi","id":"https://x"}"#;
        let sanitized = sanitize_error_message(body);
        assert!(!sanitized.contains("\"abc\""));
        assert!(!sanitized.contains("\"def\""));
        assert!(!sanitized.contains("\"ghi\""));
        assert!(sanitized.contains(r#""id":"https://x""#));
    }

    #[test]
    fn test_redacts_session_id() {
        let sanitized = sanitize_error_message("redirect?sid=ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        assert_eq!(sanitized, "redirect?sid=[REDACTED]");
    }

    #[test]
    fn test_truncates_long_messages() {
        let msg = "x".repeat(2000);
        let sanitized = sanitize_error_message(&msg);
        assert_eq!(
            sanitized.len(),
            MAX_MESSAGE_LENGTH + TRUNCATION_MARKER.len()
        );
        assert!(sanitized.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let msg = "é".repeat(400);
        let sanitized = sanitize_error_message(&msg);
        assert!(sanitized.ends_with(TRUNCATION_MARKER));
        assert!(sanitized.len() <= MAX_MESSAGE_LENGTH + TRUNCATION_MARKER.len());
    }

    #[test]
    fn test_short_clean_message_untouched() {
        let msg = r#"{"error":"invalid_grant","error_description":"expired access/refresh token"}"#;
        assert_eq!(sanitize_error_message(msg), msg);
    }
}
