//! Static file serving from the configured root directory.
//!
//! The terminal handler of the transformation chain: given the root and a
//! request path, respond with the file bytes or Not Found. Everything above
//! it in the chain rewrites requests or responses.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

/// Serve a file from the root directory, or 404.
pub(crate) async fn serve_file(State(state): State<Arc<AppState>>, req: Request) -> Response {
    let Some(file_path) = resolve(&state.root_dir, req.uri().path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read(&file_path).await {
        Ok(content) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type_for(&file_path))
            .body(Body::from(content))
            .unwrap(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Map a request path onto the root directory.
///
/// Rejects any path with a component that is not a plain name, so a request
/// can never escape the root.
fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    if relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(relative))
}

/// Content type for a file path.
///
/// HTML is served with an explicit charset; the downstream transformers
/// match on this exact value.
fn content_type_for(path: &Path) -> String {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime == mime_guess::mime::TEXT_HTML {
        "text/html; charset=utf-8".to_owned()
    } else {
        mime.to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_resolve_plain_paths() {
        let root = Path::new("/site");

        assert_eq!(
            resolve(root, "/index.html"),
            Some(PathBuf::from("/site/index.html"))
        );
        assert_eq!(
            resolve(root, "/docs/guide.html"),
            Some(PathBuf::from("/site/docs/guide.html"))
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let root = Path::new("/site");

        assert_eq!(resolve(root, "/../etc/passwd"), None);
        assert_eq!(resolve(root, "/docs/../../etc/passwd"), None);
    }

    #[test]
    fn test_content_type_for_known_types() {
        assert_eq!(
            content_type_for(Path::new("index.html")),
            "text/html; charset=utf-8"
        );
        assert_eq!(content_type_for(Path::new("style.css")), "text/css");
        assert_eq!(content_type_for(Path::new("photo.png")), "image/png");
        assert_eq!(
            content_type_for(Path::new("blob.bin")),
            "application/octet-stream"
        );
    }
}
