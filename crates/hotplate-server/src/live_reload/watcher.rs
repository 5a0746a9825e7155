//! Recursive directory watcher.
//!
//! Establishes change notification on a directory tree and reduces every
//! event to a payload-free trigger of the debounced notifier. Downstream
//! never needs to know what changed, only that something did.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::debouncer::Debouncer;

/// Watches a directory tree and fires the debounced notifier on any change.
///
/// Watches are established once, at startup, on the root and on every
/// subdirectory found by a depth-first walk. Directories created after the
/// walk are not retroactively watched; they are still served, but changes
/// inside them do not trigger reloads until the server restarts. A directory
/// whose watch cannot be established is skipped and its siblings continue.
pub(crate) struct FileWatcher {
    root_dir: PathBuf,
    debouncer: Arc<Debouncer>,
    watcher: Option<RecommendedWatcher>,
}

impl FileWatcher {
    /// Create a watcher for `root_dir` that drives `debouncer`.
    pub(crate) fn new(root_dir: PathBuf, debouncer: Debouncer) -> Self {
        Self {
            root_dir,
            debouncer: Arc::new(debouncer),
            watcher: None,
        }
    }

    /// Establish the watches and start forwarding events.
    ///
    /// Raw events arrive on the notify callback thread and are bridged into
    /// the runtime over a channel; a spawned task triggers the debouncer for
    /// each change event. The watch handles live as long as `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying watcher cannot be created.
    /// Per-directory watch failures are swallowed (missing notifications are
    /// preferable to refusing to serve).
    pub(crate) fn start(&mut self) -> Result<(), notify::Error> {
        let (tx, mut rx) = mpsc::channel::<Event>(100);

        // Callback runs on the watcher's own thread, hence blocking_send.
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        })?;

        Self::watch_tree(&mut watcher, &self.root_dir);
        self.watcher = Some(watcher);

        let debouncer = Arc::clone(&self.debouncer);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if Self::is_change(&event.kind) {
                    debouncer.trigger();
                }
            }
        });

        Ok(())
    }

    /// Watch `dir` and, depth-first, every subdirectory below it.
    ///
    /// Each directory gets its own non-recursive watch, so a failure affects
    /// only that directory. Symlinked directories are not followed.
    fn watch_tree(watcher: &mut RecommendedWatcher, dir: &Path) {
        if let Err(err) = watcher.watch(dir, RecursiveMode::NonRecursive) {
            tracing::debug!(dir = %dir.display(), %err, "Skipping unwatchable directory");
        }

        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            if entry.file_type().is_ok_and(|file_type| file_type.is_dir()) {
                Self::watch_tree(watcher, &entry.path());
            }
        }
    }

    /// Whether an event kind counts as a change.
    ///
    /// Creations, modifications, removals and renames all collapse to the
    /// same signal; access events are noise.
    fn is_change(kind: &EventKind) -> bool {
        matches!(
            kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    /// Window kept small so tests stay fast; real time is required because
    /// notify events come from the OS.
    const WINDOW: Duration = Duration::from_millis(50);
    const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

    fn notified_watcher(root: &Path) -> (FileWatcher, mpsc::UnboundedReceiver<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(WINDOW, move || {
            let _ = tx.send(());
        });
        (FileWatcher::new(root.to_path_buf(), debouncer), rx)
    }

    #[test]
    fn test_access_events_are_not_changes() {
        use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};

        assert!(FileWatcher::is_change(&EventKind::Create(CreateKind::Any)));
        assert!(FileWatcher::is_change(&EventKind::Modify(ModifyKind::Any)));
        assert!(FileWatcher::is_change(&EventKind::Remove(RemoveKind::Any)));
        assert!(!FileWatcher::is_change(&EventKind::Access(AccessKind::Any)));
        assert!(!FileWatcher::is_change(&EventKind::Any));
    }

    #[tokio::test]
    async fn test_file_write_triggers_notification() {
        let dir = tempfile::tempdir().unwrap();
        let (mut watcher, mut rx) = notified_watcher(dir.path());
        watcher.start().unwrap();

        tokio::fs::write(dir.path().join("page.html"), "<html></html>")
            .await
            .unwrap();

        tokio::time::timeout(EVENT_TIMEOUT, rx.recv())
            .await
            .expect("notification should arrive")
            .expect("channel open");
    }

    #[tokio::test]
    async fn test_subdirectory_write_triggers_notification() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("docs").join("api");
        std::fs::create_dir_all(&nested).unwrap();

        let (mut watcher, mut rx) = notified_watcher(dir.path());
        watcher.start().unwrap();

        tokio::fs::write(nested.join("index.md"), "# API")
            .await
            .unwrap();

        tokio::time::timeout(EVENT_TIMEOUT, rx.recv())
            .await
            .expect("notification should arrive")
            .expect("channel open");
    }

    #[tokio::test]
    async fn test_missing_subdirectory_does_not_fail_start() {
        let dir = tempfile::tempdir().unwrap();
        let vanishing = dir.path().join("gone");
        std::fs::create_dir(&vanishing).unwrap();

        let (mut watcher, _rx) = notified_watcher(&vanishing);
        std::fs::remove_dir(&vanishing).unwrap();

        // Root watch fails, but start still succeeds.
        watcher.start().unwrap();
    }
}
