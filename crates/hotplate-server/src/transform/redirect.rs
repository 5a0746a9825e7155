//! Directory requests redirect to their index page.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

/// Redirect any path ending in `/` (the root included) to `<path>index.html`.
///
/// Requests that do not end in `/` are delegated unchanged.
pub(crate) async fn redirect_to_index(req: Request, next: Next) -> Response {
    let path = req.uri().path();
    if path.ends_with('/') {
        let target = format!("{path}index.html");
        return Redirect::to(&target).into_response();
    }
    next.run(req).await
}
