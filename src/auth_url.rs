//! Authorization URL builder capability
//!
//! The receiver never constructs the browser-visible authorization URL
//! itself; it asks a builder for one once the redirect URI is known. The
//! [`StandardUrlBuilder`] covers the common OAuth2 authorization-code shape;
//! applications with exotic parameters supply their own implementation.

use url::Url;

use crate::error::{AuthportError, Result};
use crate::pkce;

/// Builds the browser-visible authorization URL for one login attempt.
pub trait AuthorizationUrlBuilder: Send + Sync {
    /// Builds the URL from the caller's `state`, the PKCE `code_verifier`,
    /// and the redirect URI published by the listener.
    ///
    /// The verifier itself must never be embedded; only its derived S256
    /// challenge may appear in the URL.
    fn build(&self, state: &str, code_verifier: &str, redirect_uri: &str) -> String;
}

/// Standard OAuth2 authorization-code-with-PKCE URL builder.
#[derive(Debug, Clone)]
pub struct StandardUrlBuilder {
    endpoint: Url,
    client_id: String,
    scopes: Vec<String>,
}

impl StandardUrlBuilder {
    /// Creates a builder for the given authorization endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AuthportError::Config`] when `endpoint` is not a valid URL.
    pub fn new(
        endpoint: &str,
        client_id: impl Into<String>,
        scopes: Vec<String>,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            AuthportError::Config(format!("invalid authorization endpoint URL: {e}"))
        })?;
        Ok(Self {
            endpoint,
            client_id: client_id.into(),
            scopes,
        })
    }
}

impl AuthorizationUrlBuilder for StandardUrlBuilder {
    fn build(&self, state: &str, code_verifier: &str, redirect_uri: &str) -> String {
        let challenge = pkce::challenge_for(code_verifier);
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("response_type", "code");
            query.append_pair("client_id", &self.client_id);
            query.append_pair("redirect_uri", redirect_uri);
            if !self.scopes.is_empty() {
                query.append_pair("scope", &self.scopes.join(" "));
            }
            query.append_pair("state", state);
            query.append_pair("code_challenge", &challenge);
            query.append_pair("code_challenge_method", "S256");
        }
        url.to_string()
    }
}
