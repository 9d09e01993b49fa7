//! Redirect session lifecycle
//!
//! One [`RedirectReceiver`] drives at most one live session at a time:
//! bind a loopback listener on an ephemeral port, publish the redirect URI
//! through a one-shot readiness gate, hand the authorization URL to the
//! browser launcher, then accept and handle exactly one HTTP request.
//!
//! The session runs on a spawned background task that exclusively owns the
//! listening socket from bind to close; callers interact through the
//! cloneable [`PendingLogin`] handle. A second `receive_values` call while
//! a session is unresolved returns the existing handle instead of binding
//! a second socket.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::auth_url::AuthorizationUrlBuilder;
use crate::browser::BrowserLauncher;
use crate::catalog::MessageCatalog;
use crate::error::{AuthportError, Result};
use crate::receiver::{parse, response};

/// Default deadline for the authorization redirect to arrive.
const DEFAULT_ACCEPT_TIMEOUT: Duration = Duration::from_secs(300);

/// The values extracted from a successful authorization redirect.
///
/// `code` and `state` are returned exactly as read from the wire, still
/// URL-encoded; decoding them is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedValues {
    /// The authorization code to exchange for tokens
    pub code: String,
    /// The caller-supplied correlation token echoed by the server
    pub state: String,
    /// The redirect URI the values arrived on
    pub redirect_uri: String,
}

type SharedValues = Shared<BoxFuture<'static, Result<ReceivedValues>>>;

/// Handle to an in-flight (or finished) receive attempt.
///
/// Cloning is cheap; every clone resolves to the same outcome.
#[derive(Clone)]
pub struct PendingLogin {
    values: SharedValues,
    ready: watch::Receiver<Option<String>>,
    done: Arc<AtomicBool>,
    state: String,
    code_verifier: String,
}

impl PendingLogin {
    /// Waits for the redirect to arrive and returns the extracted values.
    pub async fn values(&self) -> Result<ReceivedValues> {
        self.values.clone().await
    }

    /// Waits until the listener is bound and returns the redirect URI.
    ///
    /// The URI is published exactly once; callers arriving after that
    /// return immediately with the stored value.
    pub async fn redirect_uri(&self) -> Result<String> {
        let mut ready = self.ready.clone();
        // Resolve the watch ref into an owned value before matching; the
        // ref borrows `ready` and must not outlive it.
        let published = ready
            .wait_for(|uri| uri.is_some())
            .await
            .map(|uri| (*uri).clone().unwrap_or_default());
        match published {
            Ok(uri) => Ok(uri),
            // The session died before binding; surface its failure instead.
            Err(_) => self.values().await.map(|values| values.redirect_uri),
        }
    }

    /// Whether the attempt has already resolved, either way.
    ///
    /// Tracks the session task itself, so completion is visible even when
    /// nothing ever awaited `values()`; a session that timed out unobserved
    /// still reports resolved.
    pub fn is_resolved(&self) -> bool {
        self.done.load(Ordering::Acquire) || self.values.peek().is_some()
    }
}

impl std::fmt::Debug for PendingLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLogin")
            .field("state", &self.state)
            .field("resolved", &self.is_resolved())
            .finish_non_exhaustive()
    }
}

/// Receives OAuth2 authorization-code redirects on an ephemeral loopback port.
pub struct RedirectReceiver {
    browser: Arc<dyn BrowserLauncher>,
    url_builder: Arc<dyn AuthorizationUrlBuilder>,
    catalog: Arc<dyn MessageCatalog>,
    accept_timeout: Option<Duration>,
    open_browser_on_start: bool,
    pending: Mutex<Option<PendingLogin>>,
}

impl RedirectReceiver {
    /// Creates a receiver with the default accept deadline and automatic
    /// browser opening enabled.
    pub fn new(
        browser: Arc<dyn BrowserLauncher>,
        url_builder: Arc<dyn AuthorizationUrlBuilder>,
        catalog: Arc<dyn MessageCatalog>,
    ) -> Self {
        Self {
            browser,
            url_builder,
            catalog,
            accept_timeout: Some(DEFAULT_ACCEPT_TIMEOUT),
            open_browser_on_start: true,
            pending: Mutex::new(None),
        }
    }

    /// Sets the redirect accept deadline; `None` waits forever.
    #[must_use]
    pub fn with_accept_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.accept_timeout = timeout;
        self
    }

    /// Controls whether the session opens the browser itself as soon as the
    /// listener is bound. Disable it to time the handoff explicitly via
    /// [`Self::open_browser_to_login`].
    #[must_use]
    pub fn with_open_browser_on_start(mut self, open: bool) -> Self {
        self.open_browser_on_start = open;
        self
    }

    /// Starts a receive attempt, or returns the in-flight one.
    ///
    /// While a previous attempt is unresolved this is idempotent: the
    /// existing pending handle is returned and no second socket is bound.
    /// Once an attempt has resolved, a new call starts a fresh session on a
    /// fresh ephemeral port; redirect URIs are never reused.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn receive_values(
        &self,
        state: impl Into<String>,
        code_verifier: impl Into<String>,
    ) -> PendingLogin {
        let mut pending = self.pending.lock().unwrap();
        if let Some(existing) = pending.as_ref() {
            if !existing.is_resolved() {
                debug!("receive_values called while a session is in flight; returning the pending handle");
                return existing.clone();
            }
        }

        let state = state.into();
        let code_verifier = code_verifier.into();
        let (ready_tx, ready_rx) = watch::channel(None);

        let session = Session {
            state: state.clone(),
            code_verifier: code_verifier.clone(),
            browser: Arc::clone(&self.browser),
            url_builder: Arc::clone(&self.url_builder),
            catalog: Arc::clone(&self.catalog),
            accept_timeout: self.accept_timeout,
            open_browser: self.open_browser_on_start,
        };
        let done = Arc::new(AtomicBool::new(false));
        let session_done = Arc::clone(&done);
        let task = tokio::spawn(async move {
            let outcome = session.run(ready_tx).await;
            // Completion must be observable without any handle being polled.
            session_done.store(true, Ordering::Release);
            outcome
        });
        let values: SharedValues = async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => Err(AuthportError::Io(format!("redirect session task failed: {e}"))),
            }
        }
        .boxed()
        .shared();

        let handle = PendingLogin {
            values,
            ready: ready_rx,
            done,
            state,
            code_verifier,
        };
        *pending = Some(handle.clone());
        handle
    }

    /// Waits for the listener to come up, then opens the browser on the
    /// authorization URL built from the in-flight session's `state`,
    /// `code_verifier`, and the published redirect URI.
    ///
    /// # Errors
    ///
    /// Returns [`AuthportError::ListenerNotOpen`] immediately when no
    /// unresolved receive attempt exists. A readiness gate that closed
    /// before publishing (the session failed during bind) is a best-effort
    /// no-op: the failure itself surfaces through the pending handle.
    pub async fn open_browser_to_login(&self) -> Result<()> {
        let handle = {
            let pending = self.pending.lock().unwrap();
            pending.clone().filter(|h| !h.is_resolved())
        }
        .ok_or(AuthportError::ListenerNotOpen)?;

        let mut ready = handle.ready.clone();
        let published = ready
            .wait_for(|uri| uri.is_some())
            .await
            .map(|uri| (*uri).clone().unwrap_or_default());
        match published {
            Ok(redirect_uri) => {
                let url = self
                    .url_builder
                    .build(&handle.state, &handle.code_verifier, &redirect_uri);
                self.browser.open(&url);
                Ok(())
            }
            Err(_) => {
                warn!("Redirect session ended before the listener was bound; not opening the browser");
                Ok(())
            }
        }
    }
}

/// State owned by the background task for one receive attempt.
struct Session {
    state: String,
    code_verifier: String,
    browser: Arc<dyn BrowserLauncher>,
    url_builder: Arc<dyn AuthorizationUrlBuilder>,
    catalog: Arc<dyn MessageCatalog>,
    accept_timeout: Option<Duration>,
    open_browser: bool,
}

impl Session {
    /// Runs the full listen, accept, parse, respond sequence.
    ///
    /// The listener lives on this task's stack, so it is closed on every
    /// exit path when the task returns.
    async fn run(self, ready: watch::Sender<Option<String>>) -> Result<ReceivedValues> {
        let listener = bind_loopback()?;
        let port = listener
            .local_addr()
            .map_err(|e| AuthportError::Io(format!("could not read bound address: {e}")))?
            .port();
        let redirect_uri = format!("http://127.0.0.1:{port}");
        debug!("Redirect listener bound on {redirect_uri}");

        // The URI must be fully computed before any waiter is released; the
        // send is the happens-before edge for the browser handoff.
        let _ = ready.send(Some(redirect_uri.clone()));

        if self.open_browser {
            let url = self
                .url_builder
                .build(&self.state, &self.code_verifier, &redirect_uri);
            self.browser.open(&url);
        }

        let stream = self.accept_one(&listener).await?;
        self.handle_request(stream, &redirect_uri).await
    }

    /// Accepts the single expected connection, bounded by the configured
    /// deadline when one is set.
    async fn accept_one(&self, listener: &TcpListener) -> Result<TcpStream> {
        let accepted = match self.accept_timeout {
            Some(deadline) => tokio::time::timeout(deadline, listener.accept())
                .await
                .map_err(|_| AuthportError::RedirectTimeout)?,
            None => listener.accept().await,
        };
        let (stream, peer) = accepted
            .map_err(|e| AuthportError::Io(format!("failed to accept redirect connection: {e}")))?;
        debug!("Accepted redirect connection from {peer}");
        Ok(stream)
    }

    /// Reads the request line, classifies it, and always writes a response
    /// before the connection is released.
    async fn handle_request(
        &self,
        stream: TcpStream,
        redirect_uri: &str,
    ) -> Result<ReceivedValues> {
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let mut request_line = String::new();
        let outcome = match reader.read_line(&mut request_line).await {
            Ok(0) => Err(AuthportError::Io(
                "redirect connection closed before a request line arrived".to_string(),
            )),
            Ok(_) => {
                let request = request_line.trim_end();
                info!("{request}");
                parse::parse_redirect(request, redirect_uri)
            }
            Err(e) => Err(AuthportError::Io(format!(
                "failed to read redirect request: {e}"
            ))),
        };

        // The browser gets a page even when parsing failed; a write failure
        // after a successful parse does not invalidate the parsed values.
        let html = response::render_page(outcome.is_ok(), self.catalog.as_ref());
        if let Err(e) = response::write_response(&mut write_half, &html).await {
            warn!("Failed to write redirect response: {e}");
        }
        let _ = write_half.shutdown().await;
        drop(reader);

        outcome
    }
}

/// Binds a loopback listener on an OS-assigned port with backlog 1; only
/// the single authorization redirect is ever expected.
fn bind_loopback() -> Result<TcpListener> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));
    let socket = TcpSocket::new_v4()
        .map_err(|e| AuthportError::Io(format!("could not create redirect socket: {e}")))?;
    socket
        .bind(addr)
        .map_err(|e| AuthportError::Io(format!("could not bind redirect listener: {e}")))?;
    socket
        .listen(1)
        .map_err(|e| AuthportError::Io(format!("could not listen on redirect socket: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_loopback_uses_ephemeral_loopback_port() {
        let listener = bind_loopback().expect("bind must succeed");
        let addr = listener.local_addr().expect("bound address");
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0, "OS must assign a concrete port");
    }

    #[tokio::test]
    async fn test_bind_loopback_assigns_distinct_ports() {
        let a = bind_loopback().expect("first bind");
        let b = bind_loopback().expect("second bind");
        assert_ne!(
            a.local_addr().expect("addr").port(),
            b.local_addr().expect("addr").port(),
            "each session gets a fresh ephemeral port"
        );
    }
}
