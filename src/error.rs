//! Error types for authport
//!
//! All failures that can surface from a redirect receive attempt, using
//! `thiserror`. The enum is `Clone` because a pending login result is a
//! shared future that may hand the same failure to several waiters.

use thiserror::Error;

/// Main error type for authport operations
///
/// Known authorization errors carry a stable message-catalog key so a UI
/// can render a specific message; everything else is a generic failure
/// with a diagnostic string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The authorization server reported an error with a recognized marker
    #[error("Login failed: {diagnostic}")]
    KnownLoginError {
        /// Stable message-catalog key (`login.scopeDenied`, `login.noCSRF`)
        key: &'static str,
        /// Raw diagnostic built from the redirect request
        diagnostic: String,
    },

    /// The authorization server reported an error with no recognized marker
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// The redirect request carried neither an error nor both `code` and `state`
    #[error("Malformed redirect request: {0}")]
    MalformedRedirect(String),

    /// `open_browser_to_login` was called with no receive attempt in flight
    #[error("Redirect listener is not open")]
    ListenerNotOpen,

    /// No redirect arrived before the accept deadline
    #[error("Timed out waiting for the authorization redirect")]
    RedirectTimeout,

    /// Socket bind/accept/read/write failures
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type alias for authport operations
pub type Result<T> = std::result::Result<T, AuthportError>;
