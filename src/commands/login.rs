//! `login` command: drive one full redirect receive flow
//!
//! Generates a fresh state nonce and PKCE verifier, starts the receiver,
//! opens the browser (or prints the authorization URL), and waits for the
//! authorization redirect.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::auth_url::{AuthorizationUrlBuilder, StandardUrlBuilder};
use crate::browser::{BrowserLauncher, SystemBrowser};
use crate::catalog::EnglishCatalog;
use crate::config::Config;
use crate::error::Result;
use crate::pkce;
use crate::receiver::RedirectReceiver;

/// Runs a browser login and prints the received authorization values.
pub async fn run_login(config: Config, no_browser: bool, timeout: Option<u64>) -> Result<()> {
    run_login_with(config, no_browser, timeout, Arc::new(SystemBrowser)).await
}

async fn run_login_with(
    config: Config,
    no_browser: bool,
    timeout: Option<u64>,
    browser: Arc<dyn BrowserLauncher>,
) -> Result<()> {
    let state = pkce::generate_state();
    let challenge = pkce::generate();

    let url_builder = Arc::new(StandardUrlBuilder::new(
        &config.login.authorization_endpoint,
        config.login.client_id.clone(),
        config.login.scopes.clone(),
    )?);

    let accept_timeout = match timeout {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => config.accept_timeout(),
    };

    let auto_open = config.receiver.open_browser_on_start && !no_browser;
    let receiver = RedirectReceiver::new(
        browser,
        Arc::clone(&url_builder) as Arc<dyn AuthorizationUrlBuilder>,
        Arc::new(EnglishCatalog),
    )
    .with_accept_timeout(accept_timeout)
    .with_open_browser_on_start(auto_open);

    let pending = receiver.receive_values(state.clone(), challenge.verifier.clone());
    let redirect_uri = pending.redirect_uri().await?;
    info!("Waiting for the authorization redirect on {redirect_uri}");

    if no_browser {
        let url = url_builder.build(&state, &challenge.verifier, &redirect_uri);
        println!("Open the following URL in your browser to log in:\n{url}");
    } else if !auto_open {
        // Auto-open was turned off in config; the handoff still has to
        // happen, or the user waits on a redirect nothing can trigger.
        receiver.open_browser_to_login().await?;
    }

    let values = pending.values().await?;
    println!("Authorization redirect received.");
    println!("code:  {}", values.code);
    println!("state: {}", values.state);
    Ok(())
}
