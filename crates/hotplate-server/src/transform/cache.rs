//! Browser cache suppression for reloadable pages.

use axum::extract::Request;
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;

/// Mark top-level HTML documents as uncacheable.
///
/// Applies only to responses whose `Content-Type` is exactly
/// `text/html; charset=utf-8` — the reloadable pages. Static assets keep
/// their normal caching behavior.
pub(crate) async fn suppress_caching(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    let is_reloadable = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| content_type == "text/html; charset=utf-8");

    if is_reloadable {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    response
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware;
    use axum::routing::get;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;

    fn test_router(content_type: &'static str) -> Router {
        Router::new()
            .route(
                "/",
                get(move || async move {
                    Response::builder()
                        .header(header::CONTENT_TYPE, content_type)
                        .body(Body::from("body"))
                        .unwrap()
                }),
            )
            .layer(middleware::from_fn(suppress_caching))
    }

    async fn cache_control_for(content_type: &'static str) -> Option<String> {
        let response = test_router(content_type)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        response
            .headers()
            .get(header::CACHE_CONTROL)
            .map(|value| value.to_str().unwrap().to_owned())
    }

    #[tokio::test]
    async fn test_html_with_charset_gets_no_store() {
        assert_eq!(
            cache_control_for("text/html; charset=utf-8").await,
            Some("no-store".to_owned())
        );
    }

    #[tokio::test]
    async fn test_bare_html_is_not_marked() {
        assert_eq!(cache_control_for("text/html").await, None);
    }

    #[tokio::test]
    async fn test_css_is_not_marked() {
        assert_eq!(cache_control_for("text/css").await, None);
    }
}
