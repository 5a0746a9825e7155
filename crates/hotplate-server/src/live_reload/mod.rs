//! Live reload pipeline.
//!
//! Change detection and notification: the watcher reports raw filesystem
//! events, the debouncer collapses bursts into single signals, and the
//! registry pushes the reload payload to every connected browser.

mod debouncer;
mod registry;
mod watcher;
mod websocket;

pub(crate) use debouncer::Debouncer;
pub(crate) use registry::{ClientRegistry, REFRESH_MESSAGE};
pub(crate) use watcher::FileWatcher;
pub(crate) use websocket::{MONITORING_PATH, ws_handler};
