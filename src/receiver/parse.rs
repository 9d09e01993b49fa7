//! Redirect request-line parsing and error classification
//!
//! Only one trusted loopback connection is ever accepted, so the request is
//! matched with plain patterns against its first line instead of a full HTTP
//! parser: no header parsing, no method or version validation. The whole
//! surface is a handful of functions with string in/out so a stricter parser
//! could replace it without touching the session lifecycle.
//!
//! `code` and `state` are extracted from the raw, still URL-encoded line and
//! returned as-is; diagnostics embedded in failures are URL-decoded for
//! readability.

use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::keys;
use crate::error::{AuthportError, Result};
use crate::receiver::session::ReceivedValues;

static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("code=([^ &]+)").expect("valid pattern"));
static STATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("state=([^ &]+)").expect("valid pattern"));
static ERROR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("error=([^ &]+)").expect("valid pattern"));

/// Marker in the raw request identifying a scope-denial error.
const SCOPE_DENIED_MARKER: &str = "scope_denied";
/// Marker in the raw request identifying a missing-CSRF error.
const NO_CSRF_MARKER: &str = "No+CSRF+value";

/// Classifies one raw redirect request line.
///
/// Error detection runs first; `code`/`state` extraction is only attempted
/// when no `error=` parameter is present.
pub(crate) fn parse_redirect(request: &str, redirect_uri: &str) -> Result<ReceivedValues> {
    check_for_error(request)?;
    extract_values(request, redirect_uri)
}

/// Scans the raw request line for an `error=` parameter and classifies it.
fn check_for_error(request: &str) -> Result<()> {
    let Some(caps) = ERROR_PATTERN.captures(request) else {
        return Ok(());
    };
    let diagnostic = format!(
        "Login failed with error '{}'. The full request is: {}",
        &caps[1],
        percent_decode(request)
    );
    if request.contains(SCOPE_DENIED_MARKER) {
        return Err(AuthportError::KnownLoginError {
            key: keys::SCOPE_DENIED,
            diagnostic,
        });
    }
    if request.contains(NO_CSRF_MARKER) {
        return Err(AuthportError::KnownLoginError {
            key: keys::NO_CSRF,
            diagnostic,
        });
    }
    Err(AuthportError::LoginFailed(diagnostic))
}

/// Extracts `code` and `state` from the raw (URL-encoded) request line.
fn extract_values(request: &str, redirect_uri: &str) -> Result<ReceivedValues> {
    let code = extract_value(request, &CODE_PATTERN)?;
    let state = extract_value(request, &STATE_PATTERN)?;
    Ok(ReceivedValues {
        code,
        state,
        redirect_uri: redirect_uri.to_string(),
    })
}

fn extract_value(request: &str, pattern: &Regex) -> Result<String> {
    pattern
        .captures(request)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| {
            AuthportError::MalformedRedirect(format!(
                "could not extract value with pattern '{pattern}' from: {}",
                percent_decode(request)
            ))
        })
}

/// Minimal percent-decoding for diagnostics.
///
/// Converts `+` to space and `%XX` sequences to the corresponding byte;
/// malformed sequences pass through unchanged.
pub(crate) fn percent_decode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'+' {
            out.push(' ');
            i += 1;
        } else if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(hex) = std::str::from_utf8(&bytes[i + 1..i + 3]) {
                if let Ok(byte) = u8::from_str_radix(hex, 16) {
                    out.push(byte as char);
                    i += 3;
                    continue;
                }
            }
            out.push(bytes[i] as char);
            i += 1;
        } else {
            out.push(bytes[i] as char);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const REDIRECT_URI: &str = "http://127.0.0.1:54321";

    // -----------------------------------------------------------------------
    // Successful extraction
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_extracts_code_and_state() {
        let values = parse_redirect("GET /?code=abc&state=xyz HTTP/1.1", REDIRECT_URI)
            .expect("request carries both values");
        assert_eq!(values.code, "abc");
        assert_eq!(values.state, "xyz");
        assert_eq!(values.redirect_uri, REDIRECT_URI);
    }

    #[test]
    fn test_parse_keeps_values_url_encoded() {
        let values = parse_redirect(
            "GET /?code=a%2Fb%3D&state=x%20y HTTP/1.1",
            REDIRECT_URI,
        )
        .expect("request carries both values");
        assert_eq!(values.code, "a%2Fb%3D", "code must stay URL-encoded");
        assert_eq!(values.state, "x%20y", "state must stay URL-encoded");
    }

    #[test]
    fn test_parse_handles_reversed_parameter_order() {
        let values = parse_redirect("GET /?state=xyz&code=abc HTTP/1.1", REDIRECT_URI)
            .expect("parameter order must not matter");
        assert_eq!(values.code, "abc");
        assert_eq!(values.state, "xyz");
    }

    // -----------------------------------------------------------------------
    // Error classification
    // -----------------------------------------------------------------------

    #[test]
    fn test_scope_denied_is_a_known_error() {
        let err = parse_redirect("GET /?error=scope_denied HTTP/1.1", REDIRECT_URI).unwrap_err();
        match err {
            AuthportError::KnownLoginError { key, diagnostic } => {
                assert_eq!(key, keys::SCOPE_DENIED);
                assert!(
                    diagnostic.contains("scope_denied"),
                    "diagnostic should carry the raw error: {diagnostic}"
                );
            }
            other => panic!("expected KnownLoginError, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_csrf_is_a_known_error() {
        let request =
            "GET /?error=request_forbidden&error_description=No+CSRF+value+in+cookies HTTP/1.1";
        let err = parse_redirect(request, REDIRECT_URI).unwrap_err();
        match err {
            AuthportError::KnownLoginError { key, .. } => assert_eq!(key, keys::NO_CSRF),
            other => panic!("expected KnownLoginError, got {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_error_is_generic_with_decoded_diagnostic() {
        let err = parse_redirect(
            "GET /?error=server_error&error_description=something+broke HTTP/1.1",
            REDIRECT_URI,
        )
        .unwrap_err();
        match err {
            AuthportError::LoginFailed(diagnostic) => {
                assert!(diagnostic.contains("server_error"));
                assert!(
                    diagnostic.contains("something broke"),
                    "diagnostic must be URL-decoded: {diagnostic}"
                );
            }
            other => panic!("expected LoginFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_error_wins_over_code_and_state() {
        // Even when code/state are present, an error parameter aborts first.
        let err = parse_redirect(
            "GET /?error=scope_denied&code=abc&state=xyz HTTP/1.1",
            REDIRECT_URI,
        )
        .unwrap_err();
        assert!(matches!(err, AuthportError::KnownLoginError { .. }));
    }

    // -----------------------------------------------------------------------
    // Malformed requests
    // -----------------------------------------------------------------------

    #[test]
    fn test_missing_code_is_malformed() {
        let err = parse_redirect("GET /?state=xyz HTTP/1.1", REDIRECT_URI).unwrap_err();
        assert!(matches!(err, AuthportError::MalformedRedirect(_)));
    }

    #[test]
    fn test_missing_state_is_malformed() {
        let err = parse_redirect("GET /?code=abc HTTP/1.1", REDIRECT_URI).unwrap_err();
        assert!(matches!(err, AuthportError::MalformedRedirect(_)));
    }

    #[test]
    fn test_bare_request_is_malformed_with_decoded_diagnostic() {
        let err = parse_redirect("GET /%20probe HTTP/1.1", REDIRECT_URI).unwrap_err();
        match err {
            AuthportError::MalformedRedirect(diagnostic) => assert!(
                diagnostic.contains("/ probe"),
                "diagnostic must carry the decoded request: {diagnostic}"
            ),
            other => panic!("expected MalformedRedirect, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // percent_decode
    // -----------------------------------------------------------------------

    #[test]
    fn test_percent_decode_plain_string_unchanged() {
        assert_eq!(percent_decode("hello"), "hello");
    }

    #[test]
    fn test_percent_decode_converts_plus_to_space() {
        assert_eq!(percent_decode("hello+world"), "hello world");
    }

    #[test]
    fn test_percent_decode_hex_sequence() {
        assert_eq!(percent_decode("a%20b"), "a b");
    }

    #[test]
    fn test_percent_decode_incomplete_percent_passes_through() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }
}
