//! authport - loopback OAuth2 redirect receiver
//!
//! This library receives the browser redirect of an OAuth2
//! authorization-code-with-PKCE login: it binds a loopback TCP listener on
//! an OS-assigned port, publishes the redirect URI, hands the authorization
//! URL to a browser launcher, and resolves the `code`/`state` pair carried
//! by the single callback request.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `receiver`: listener setup, browser handoff, request handling
//! - `auth_url`: authorization URL builder capability
//! - `browser`: browser launcher capability
//! - `catalog`: message catalog capability for the redirect page
//! - `pkce`: PKCE S256 challenge and state nonce generation
//! - `config`: configuration management and validation
//! - `error`: error types and result alias
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use authport::{auth_url::StandardUrlBuilder, browser::SystemBrowser};
//! use authport::{catalog::EnglishCatalog, pkce, RedirectReceiver};
//!
//! #[tokio::main]
//! async fn main() -> authport::Result<()> {
//!     let url_builder = StandardUrlBuilder::new(
//!         "https://auth.example.com/oauth2/auth",
//!         "my-client",
//!         vec!["openid".to_string()],
//!     )?;
//!     let receiver = RedirectReceiver::new(
//!         Arc::new(SystemBrowser),
//!         Arc::new(url_builder),
//!         Arc::new(EnglishCatalog),
//!     );
//!
//!     let pending = receiver.receive_values(pkce::generate_state(), pkce::generate().verifier);
//!     let values = pending.values().await?;
//!     println!("code: {}", values.code);
//!     Ok(())
//! }
//! ```

pub mod auth_url;
pub mod browser;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod pkce;
pub mod receiver;

// Re-export commonly used types
pub use auth_url::AuthorizationUrlBuilder;
pub use browser::BrowserLauncher;
pub use catalog::MessageCatalog;
pub use config::Config;
pub use error::{AuthportError, Result};
pub use receiver::{PendingLogin, ReceivedValues, RedirectReceiver};
