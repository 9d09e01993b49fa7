//! PKCE S256 challenge generation
//!
//! Implements the Proof Key for Code Exchange (PKCE) extension to OAuth 2.0
//! as defined in RFC 7636, using the `S256` challenge method, plus the random
//! `state` nonce used for CSRF detection.
//!
//! # How PKCE works
//!
//! 1. The client generates a high-entropy random string called the `code_verifier`.
//! 2. The client computes a SHA-256 hash of the verifier and base64url-encodes
//!    it to produce the `code_challenge`.
//! 3. The authorization request carries `code_challenge` and
//!    `code_challenge_method=S256`; the verifier itself never appears in a
//!    browser-visible URL.
//! 4. The later token exchange sends the original `code_verifier`, proving
//!    possession.
//!
//! # References
//!
//! - RFC 7636 <https://www.rfc-editor.org/rfc/rfc7636>

use base64::Engine as _;
use sha2::{Digest, Sha256};

/// A PKCE S256 challenge pair consisting of a verifier and its derived
/// challenge value.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    /// The code verifier: a base64url-encoded (no padding) random string of
    /// exactly 43 characters derived from 32 random bytes.
    pub verifier: String,

    /// The code challenge: the base64url-encoded (no padding) SHA-256 digest
    /// of the UTF-8 representation of [`Self::verifier`].
    pub challenge: String,

    /// The challenge method. Always `"S256"` for challenges produced here.
    pub method: String,
}

/// Generates a fresh PKCE S256 challenge.
///
/// The verifier is 32 cryptographically random bytes encoded as a base64url
/// string without padding (43 characters); the challenge is
/// `BASE64URL(SHA256(verifier))` per RFC 7636 section 4.2.
pub fn generate() -> PkceChallenge {
    use rand::RngCore as _;

    let mut random_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut random_bytes);

    let verifier = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes);
    let challenge = challenge_for(&verifier);

    PkceChallenge {
        verifier,
        challenge,
        method: "S256".to_string(),
    }
}

/// Computes the S256 challenge for an existing verifier string.
pub fn challenge_for(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest.as_slice())
}

/// Generates a random `state` nonce: 16 random bytes encoded as base64url
/// without padding.
pub fn generate_state() -> String {
    use rand::RngCore as _;

    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_produces_correct_verifier_length() {
        let pkce = generate();
        assert_eq!(
            pkce.verifier.len(),
            43,
            "32 random bytes in base64url without padding produces 43 chars"
        );
    }

    #[test]
    fn test_challenge_is_correct_s256_of_verifier() {
        let pkce = generate();
        assert_eq!(
            pkce.challenge,
            challenge_for(&pkce.verifier),
            "challenge must equal base64url(SHA256(verifier))"
        );
    }

    #[test]
    fn test_method_is_always_s256() {
        assert_eq!(generate().method, "S256");
    }

    #[test]
    fn test_generate_produces_unique_verifiers() {
        let a = generate();
        let b = generate();
        assert_ne!(
            a.verifier, b.verifier,
            "successive calls must produce distinct verifiers"
        );
    }

    #[test]
    fn test_verifier_uses_url_safe_base64_no_padding() {
        let pkce = generate();
        assert!(
            pkce.verifier
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "verifier must only contain base64url characters, got: {}",
            pkce.verifier
        );
    }

    #[test]
    fn test_generate_state_produces_unique_values() {
        assert_ne!(generate_state(), generate_state());
    }

    #[test]
    fn test_generate_state_is_non_empty_base64url() {
        let state = generate_state();
        assert!(!state.is_empty());
        assert!(
            state
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "state must only contain base64url characters, got: {state}"
        );
    }

    /// RFC 7636 Appendix B specifies:
    ///   code_verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"
    ///   code_challenge = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
    #[test]
    fn test_s256_known_answer_rfc7636_appendix_b() {
        assert_eq!(
            challenge_for("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM",
            "S256 challenge must match RFC 7636 Appendix B test vector"
        );
    }
}
