//! Message catalog capability
//!
//! The HTML page shown to the user after the redirect gets its title and
//! message from an external catalog so the surrounding application can
//! localize them. The receiver only ever performs keyed lookups.

/// Message keys used by the redirect receiver.
pub mod keys {
    /// Title of the page shown after a successful login redirect
    pub const SUCCESS_TITLE: &str = "login.browser.success.title";
    /// Body of the page shown after a successful login redirect
    pub const SUCCESS_MESSAGE: &str = "login.browser.success.message";
    /// Title of the page shown after a failed login redirect
    pub const FAILED_TITLE: &str = "login.browser.failed.title";
    /// Body of the page shown after a failed login redirect
    pub const FAILED_MESSAGE: &str = "login.browser.failed.message";

    /// Classification key: the user denied one of the requested scopes
    pub const SCOPE_DENIED: &str = "login.scopeDenied";
    /// Classification key: the authorization server reported a missing CSRF value
    pub const NO_CSRF: &str = "login.noCSRF";
}

/// Keyed lookup of user-facing text.
pub trait MessageCatalog: Send + Sync {
    /// Returns the text for `key`. Implementations should fall back to the
    /// key itself for unknown keys rather than failing.
    fn get(&self, key: &str) -> String;
}

/// Built-in English catalog used when no localized catalog is supplied.
#[derive(Debug, Default, Clone)]
pub struct EnglishCatalog;

impl MessageCatalog for EnglishCatalog {
    fn get(&self, key: &str) -> String {
        match key {
            keys::SUCCESS_TITLE => "Login successful",
            keys::SUCCESS_MESSAGE => {
                "You are logged in. You can close this window and return to the application."
            }
            keys::FAILED_TITLE => "Login failed",
            keys::FAILED_MESSAGE => {
                "Something went wrong during login. Close this window and try again from the application."
            }
            keys::SCOPE_DENIED => "You must grant all requested permissions to log in.",
            keys::NO_CSRF => "The login request expired. Please try again.",
            other => other,
        }
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_catalog_resolves_success_keys() {
        let catalog = EnglishCatalog;
        assert_eq!(catalog.get(keys::SUCCESS_TITLE), "Login successful");
        assert!(catalog.get(keys::SUCCESS_MESSAGE).contains("logged in"));
    }

    #[test]
    fn test_english_catalog_resolves_failure_keys() {
        let catalog = EnglishCatalog;
        assert_eq!(catalog.get(keys::FAILED_TITLE), "Login failed");
        assert!(catalog.get(keys::FAILED_MESSAGE).contains("try again"));
    }

    #[test]
    fn test_unknown_key_falls_back_to_the_key_itself() {
        let catalog = EnglishCatalog;
        assert_eq!(catalog.get("login.browser.unknown"), "login.browser.unknown");
    }
}
