//! Browser launcher capability
//!
//! Opening the system browser is fire and forget: no outcome is observed
//! and failures are not propagated, because the user can always copy the
//! authorization URL by hand.

use tracing::debug;

/// Opens a URL in the user's browser.
pub trait BrowserLauncher: Send + Sync {
    /// Fire-and-forget open; no return value is observed.
    fn open(&self, url: &str);
}

/// Launches the platform default browser.
#[derive(Debug, Default, Clone)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    /// Attempts to open `url` in the user's default browser.
    ///
    /// Errors are intentionally ignored; if the browser does not open the
    /// user can copy the URL from the terminal.
    fn open(&self, url: &str) {
        debug!("Opening system browser for {url}");
        #[cfg(target_os = "macos")]
        {
            let _ = std::process::Command::new("open").arg(url).spawn();
        }
        #[cfg(target_os = "linux")]
        {
            let _ = std::process::Command::new("xdg-open").arg(url).spawn();
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        {
            // On other platforms (e.g. Windows) we do not attempt to open the
            // browser; the user must copy the URL manually.
            let _ = url;
        }
    }
}
