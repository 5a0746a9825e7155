//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::live_reload::ClientRegistry;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Registry of connected monitoring sockets.
    pub(crate) registry: Arc<ClientRegistry>,
    /// Directory served over HTTP.
    pub(crate) root_dir: PathBuf,
    /// Serve rendered `.md` siblings for missing `.html` pages.
    pub(crate) markdown_fallback: bool,
}
