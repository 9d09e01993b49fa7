//! Loopback OAuth2 redirect receiver
//!
//! # Module Layout
//!
//! - `session`  -- session lifecycle and the two public entry points,
//!   `receive_values` and `open_browser_to_login`
//! - `parse`    -- raw request-line parsing and error classification
//! - `response` -- HTML page rendering and HTTP response writing

mod parse;
mod response;
mod session;

pub use session::{PendingLogin, ReceivedValues, RedirectReceiver};
