//! HTTP server for the hotplate development file server.
//!
//! Serves a directory tree over HTTP, watches it for changes, and pushes a
//! reload signal to connected browsers over a WebSocket. Served HTML passes
//! through an ordered transformation chain that redirects directory requests
//! to their index, injects the reload script, optionally renders markdown
//! sources in place of missing HTML pages, and suppresses browser caching
//! for reloadable documents.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use hotplate_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         root_dir: PathBuf::from("site"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! filesystem change ──► FileWatcher ──► Debouncer ──► ClientRegistry
//!                                                          │ "refresh"
//! Browser ◄──WebSocket (/_monitoring_websocket)────────────┘
//!    │
//!    └──HTTP──► transformation chain ──► static files
//! ```

mod app;
mod live_reload;
mod state;
mod static_files;
mod transform;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use live_reload::{ClientRegistry, Debouncer, FileWatcher, REFRESH_MESSAGE};
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory served over HTTP and watched for changes.
    pub root_dir: PathBuf,
    /// Serve rendered `.md` siblings for missing `.html` pages.
    pub markdown_fallback: bool,
    /// Watch the root directory and reload connected browsers.
    pub live_reload: bool,
    /// Debounce window for change notifications, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8000,
            root_dir: PathBuf::from("."),
            markdown_fallback: true,
            live_reload: true,
            debounce_ms: 500,
        }
    }
}

/// Run the server.
///
/// Blocks until shutdown (Ctrl-C).
///
/// # Errors
///
/// Returns an error if the file watcher cannot be created or the listener
/// fails to bind.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = Arc::new(ClientRegistry::new());

    // The watcher must outlive the server; dropping it releases every watch.
    let _watcher = if config.live_reload {
        let broadcast_registry = Arc::clone(&registry);
        let debouncer = Debouncer::new(Duration::from_millis(config.debounce_ms), move || {
            broadcast_registry.broadcast(REFRESH_MESSAGE);
        });

        let mut watcher = FileWatcher::new(config.root_dir.clone(), debouncer);
        watcher.start()?;
        Some(watcher)
    } else {
        None
    };

    let state = Arc::new(AppState {
        registry,
        root_dir: config.root_dir.clone(),
        markdown_fallback: config.markdown_fallback,
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, root = %config.root_dir.display(), "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from hotplate config.
#[must_use]
pub fn server_config_from_config(config: &hotplate_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        root_dir: config.serve_resolved.root_dir.clone(),
        markdown_fallback: config.serve_resolved.markdown_fallback,
        live_reload: config.serve_resolved.live_reload,
        debounce_ms: config.serve_resolved.debounce_ms,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_server_config_from_config_maps_fields() {
        let config = hotplate_config::Config::load(
            None,
            Some(&hotplate_config::CliSettings {
                host: Some("0.0.0.0".to_owned()),
                port: Some(4040),
                root_dir: Some(PathBuf::from("/site")),
                markdown_fallback: Some(false),
                live_reload: None,
            }),
        )
        .unwrap();

        let server_config = server_config_from_config(&config);

        assert_eq!(server_config.host, "0.0.0.0");
        assert_eq!(server_config.port, 4040);
        assert_eq!(server_config.root_dir, PathBuf::from("/site"));
        assert!(!server_config.markdown_fallback);
        assert!(server_config.live_reload);
    }
}
