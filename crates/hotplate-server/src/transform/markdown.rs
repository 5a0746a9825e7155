//! Markdown fallback for missing HTML pages.
//!
//! When the static collaborator has no `foo.html`, a `foo.md` sibling is
//! looked up through the same inner service and served rendered, so a plain
//! markdown tree browses like a generated site. A failed lookup leaves the
//! original Not-Found response untouched.
//!
//! Written as a `tower` layer by hand because the retry re-enters the inner
//! service; the composition point stays in `app.rs` with the other
//! transformers.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, to_bytes};
use axum::extract::Request;
use axum::http::{StatusCode, Uri, header};
use axum::response::Response;
use pulldown_cmark::{Options, Parser};
use tower::{Layer, Service, ServiceExt};

/// Layer mounting [`MarkdownFallback`] around the inner router.
#[derive(Clone)]
pub(crate) struct MarkdownFallbackLayer;

impl<S> Layer<S> for MarkdownFallbackLayer {
    type Service = MarkdownFallback<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MarkdownFallback { inner }
    }
}

/// Retries Not-Found `.html` requests as `.md` and renders the result.
#[derive(Clone)]
pub(crate) struct MarkdownFallback<S> {
    inner: S,
}

impl<S> Service<Request> for MarkdownFallback<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        // The readied service handles the primary request; a clone handles
        // the retry.
        let retry_service = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, retry_service.clone());

        Box::pin(async move {
            let retry_req = build_retry_request(&req);

            let first = inner.call(req).await?;
            if first.status() != StatusCode::NOT_FOUND {
                return Ok(first);
            }
            let Some(retry_req) = retry_req else {
                return Ok(first);
            };

            let second = retry_service.oneshot(retry_req).await?;
            Ok(choose_response(first, second).await)
        })
    }
}

/// A request identical to `req` but with the final segment's `.html`
/// extension replaced by `.md`, or `None` when the path does not end in
/// `.html`.
fn build_retry_request(req: &Request) -> Option<Request> {
    let uri = markdown_uri(req.uri())?;
    let mut retry = Request::new(Body::empty());
    *retry.method_mut() = req.method().clone();
    *retry.uri_mut() = uri;
    *retry.headers_mut() = req.headers().clone();
    Some(retry)
}

/// Rewrite the final path segment's `.html` extension to `.md`.
fn markdown_uri(uri: &Uri) -> Option<Uri> {
    let stem = uri.path().strip_suffix(".html")?;
    let path_and_query = match uri.query() {
        Some(query) => format!("{stem}.md?{query}"),
        None => format!("{stem}.md"),
    };
    path_and_query.parse().ok()
}

/// Pick the final response: the rendered retry when it succeeded, otherwise
/// the original Not-Found response, untouched.
async fn choose_response(original: Response, retry: Response) -> Response {
    if retry.status() != StatusCode::OK {
        return original;
    }
    match render_markdown_response(retry).await {
        Some(rendered) => rendered,
        None => original,
    }
}

/// Convert an OK markdown response into an HTML document response.
async fn render_markdown_response(response: Response) -> Option<Response> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.ok()?;
    let source = String::from_utf8(bytes.to_vec()).ok()?;

    Some(
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
            .body(Body::from(render_document(&source)))
            .unwrap(),
    )
}

/// Render markdown source into a minimal HTML document.
///
/// The document carries a `<head>` so rendered pages pass through script
/// injection and participate in live reload like any other page.
fn render_document(source: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(source, options);
    let mut rendered = String::new();
    pulldown_cmark::html::push_html(&mut rendered, parser);

    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"/></head><body>\n{rendered}</body></html>\n"
    )
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use pretty_assertions::assert_eq;

    use super::*;

    const ORIGINAL_NOT_FOUND: &str = "original-not-found";

    fn test_router() -> MarkdownFallback<Router> {
        let inner = Router::new()
            .route(
                "/guide.md",
                get(|| async {
                    Response::builder()
                        .status(StatusCode::OK)
                        .header(header::CONTENT_TYPE, "text/markdown")
                        .body(Body::from("# Hi"))
                        .unwrap()
                }),
            )
            .route("/about.html", get(|| async { "about page" }))
            .fallback(|| async {
                (StatusCode::NOT_FOUND, ORIGINAL_NOT_FOUND).into_response()
            });
        MarkdownFallbackLayer.layer(inner)
    }

    async fn get_response(path: &str) -> Response {
        test_router()
            .oneshot(
                Request::builder()
                    .uri(path)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_html_served_from_markdown_sibling() {
        let response = get_response("/guide.html").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
        let body = body_string(response).await;
        assert!(body.contains("<h1>Hi</h1>"));
        assert!(body.contains("<head>"));
    }

    #[tokio::test]
    async fn test_double_not_found_returns_original_response() {
        let response = get_response("/missing.html").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, ORIGINAL_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_found_html_is_not_retried() {
        let response = get_response("/about.html").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "about page");
    }

    #[tokio::test]
    async fn test_non_html_not_found_passes_through() {
        let response = get_response("/guide.txt").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, ORIGINAL_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_markdown_source_is_served_directly() {
        let response = get_response("/guide.md").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "# Hi");
    }

    #[test]
    fn test_markdown_uri_rewrites_final_segment() {
        let uri: Uri = "/docs/guide.html".parse().unwrap();
        assert_eq!(markdown_uri(&uri).unwrap().path(), "/docs/guide.md");

        let uri: Uri = "/docs/guide.txt".parse().unwrap();
        assert!(markdown_uri(&uri).is_none());
    }

    #[test]
    fn test_render_document_wraps_body() {
        let document = render_document("# Title\n\nsome *text*");

        assert!(document.starts_with("<!DOCTYPE html>"));
        assert!(document.contains("<h1>Title</h1>"));
        assert!(document.contains("<em>text</em>"));
    }
}
