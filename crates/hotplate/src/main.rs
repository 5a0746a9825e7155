//! hotplate CLI - live-reloading development file server.
//!
//! Serves a directory over HTTP and reloads connected browsers whenever
//! anything inside it changes.

mod error;
mod output;

use std::path::PathBuf;

use clap::Parser;
use hotplate_config::{CliSettings, Config};
use hotplate_server::{run_server, server_config_from_config};
use tracing_subscriber::EnvFilter;

use error::CliError;
use output::Output;

/// Serve a directory with automatic browser reload on change.
#[derive(Parser)]
#[command(name = "hotplate", version, about)]
struct Cli {
    /// Directory to serve (default: current directory).
    root: Option<PathBuf>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Disable the markdown fallback for missing HTML pages.
    #[arg(long)]
    no_markdown: bool,

    /// Serve without watching for changes.
    #[arg(long)]
    no_live_reload: bool,

    /// Path to configuration file (default: auto-discover hotplate.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    if let Err(err) = rt.block_on(serve(cli, &output)) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

/// Load configuration and run the server until shutdown.
async fn serve(cli: Cli, output: &Output) -> Result<(), CliError> {
    let cli_settings = CliSettings {
        host: cli.host,
        port: cli.port,
        root_dir: cli.root,
        markdown_fallback: cli.no_markdown.then_some(false),
        live_reload: cli.no_live_reload.then_some(false),
    };

    let config = Config::load(cli.config.as_deref(), Some(&cli_settings))?;
    let server_config = server_config_from_config(&config);

    if !server_config.root_dir.is_dir() {
        return Err(CliError::Validation(format!(
            "Not a directory: {}",
            server_config.root_dir.display()
        )));
    }

    output.info(&format!(
        "Serving {} on http://{}:{}",
        server_config.root_dir.display(),
        server_config.host,
        server_config.port
    ));
    if !server_config.live_reload {
        output.info("Live reload disabled");
    }

    run_server(server_config)
        .await
        .map_err(|err| CliError::Server(err.to_string()))
}
