//! Command-line interface definition for authport
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand};

/// authport - loopback OAuth2 redirect receiver
///
/// Runs a browser-based authorization-code-with-PKCE login against the
/// configured authorization server and prints the received values.
#[derive(Parser, Debug, Clone)]
#[command(name = "authport")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for authport
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a browser login and print the received authorization values
    Login {
        /// Print the authorization URL instead of opening the browser
        #[arg(long)]
        no_browser: bool,

        /// Override the redirect wait deadline in seconds (0 waits forever)
        #[arg(long)]
        timeout: Option<u64>,
    },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
