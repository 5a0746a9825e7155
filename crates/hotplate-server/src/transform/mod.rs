//! Request/response transformation chain.
//!
//! Ordered transformers composed around the inner router; `create_router`
//! in `app.rs` is the single place the order is spelled out. Outer to inner:
//! request logging, cache suppression, directory redirect, script injection,
//! markdown fallback (configuration-gated), then the router itself.

pub(crate) mod cache;
pub(crate) mod html;
pub(crate) mod inject;
pub(crate) mod markdown;
pub(crate) mod redirect;
