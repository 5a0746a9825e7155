//! Live reload script injection.

use axum::body::{Body, to_bytes};
use axum::extract::Request;
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::html;

/// Script appended to the `<head>` of every served HTML document.
///
/// Connects back to the monitoring endpoint and reloads the page whenever
/// any message arrives.
pub(crate) const RELOAD_SCRIPT: &str = r#"var _monitoring_socket =
  new WebSocket("ws://" + location.host + "/_monitoring_websocket");

_monitoring_socket.onmessage = function (e) {
  location.reload(true);
}"#;

/// Inject [`RELOAD_SCRIPT`] into HTML responses.
///
/// Applies only to responses whose `Content-Type` is exactly `text/html` or
/// `text/html; charset=utf-8`, and only when the document has a `<head>`.
/// Every other response passes through byte-for-byte, its body never read.
pub(crate) async fn inject_reload_script(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    if !is_html(&response) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let Ok(bytes) = to_bytes(body, usize::MAX).await else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let injected = std::str::from_utf8(&bytes)
        .ok()
        .and_then(|document| html::append_head_script(document, RELOAD_SCRIPT));

    match injected {
        Some(document) => {
            // The body grew; let the transport recompute the length.
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(document))
        }
        None => Response::from_parts(parts, Body::from(bytes)),
    }
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| {
            content_type == "text/html" || content_type == "text/html; charset=utf-8"
        })
}
