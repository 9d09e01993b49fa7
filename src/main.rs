//! authport - loopback OAuth2 redirect receiver CLI
//!
//! Main entry point for the authport command-line tool.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use authport::cli::{Cli, Commands};
use authport::commands;
use authport::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    let config = Config::load(std::path::Path::new(&cli.config))?;
    config.validate()?;

    match cli.command {
        Commands::Login {
            no_browser,
            timeout,
        } => {
            tracing::info!("Starting browser login flow");
            commands::login::run_login(config, no_browser, timeout).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "authport=debug"
    } else {
        "authport=info"
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
