//! Router construction.
//!
//! Builds the axum router and composes the transformation chain around it.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::live_reload;
use crate::state::AppState;
use crate::static_files;
use crate::transform;

/// Create the application router.
///
/// The transformation chain is composed here, outermost first: request
/// logging, cache suppression, directory redirect, script injection,
/// markdown fallback (when enabled), then the router dispatching the
/// monitoring upgrade route and the static-file handler.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route(live_reload::MONITORING_PATH, get(live_reload::ws_handler))
        .fallback(static_files::serve_file);

    if state.markdown_fallback {
        router = router.layer(transform::markdown::MarkdownFallbackLayer);
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(transform::cache::suppress_caching))
                .layer(middleware::from_fn(transform::redirect::redirect_to_index))
                .layer(middleware::from_fn(transform::inject::inject_reload_script)),
        )
        .with_state(state)
}
