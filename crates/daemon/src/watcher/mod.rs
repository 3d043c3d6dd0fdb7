// Source watcher: notify events for the reviewed file → debounce → re-hash.
// This module handles raw event detection and filtering; `monitor` does the rest.

pub mod monitor;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, trace};

/// Filesystem change observed on the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsEventKind {
    Create,
    Modify,
    Remove,
}

/// Capacity for the internal event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Watches the directory containing the source file (non-recursively) and
/// forwards events that concern the file itself, including renames onto it.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
    target: PathBuf,
}

impl SourceWatcher {
    pub fn start(source: &Path) -> Result<(Self, mpsc::Receiver<FsEventKind>)> {
        let target = source
            .canonicalize()
            .with_context(|| format!("failed to canonicalize source path: {}", source.display()))?;
        let parent = target
            .parent()
            .ok_or_else(|| anyhow!("source path has no parent directory: {}", target.display()))?
            .to_path_buf();

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let target_for_filter = target.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Some(kind) = translate_event(&event, &target_for_filter) {
                    if tx.blocking_send(kind).is_err() {
                        debug!("source event channel closed");
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "source watcher error");
            }
        })
        .context("failed to create file watcher")?;

        watcher
            .watch(&parent, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch directory: {}", parent.display()))?;

        debug!(path = %target.display(), "source watcher started");

        Ok((Self { _watcher: watcher, target }, rx))
    }

    /// The canonicalized path of the watched file.
    pub fn target(&self) -> &Path {
        &self.target
    }
}

/// Map a `notify::Event` to a change on `target`, or `None` when the event is
/// about another file or carries no content change.
fn translate_event(event: &Event, target: &Path) -> Option<FsEventKind> {
    let kind = match &event.kind {
        EventKind::Create(_) => FsEventKind::Create,
        EventKind::Modify(modify_kind) => {
            use notify::event::ModifyKind;
            match modify_kind {
                ModifyKind::Metadata(_) => {
                    trace!("skipping metadata-only modify event");
                    return None;
                }
                _ => FsEventKind::Modify,
            }
        }
        EventKind::Remove(_) => FsEventKind::Remove,
        _ => {
            trace!(kind = ?event.kind, "skipping non-content event");
            return None;
        }
    };

    event.paths.iter().any(|p| p == target).then_some(kind)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode};
    use tempfile::TempDir;
    use tokio::time::{timeout, Duration};

    use super::*;

    fn make_event(kind: EventKind, paths: Vec<PathBuf>) -> Event {
        Event { kind, paths, attrs: Default::default() }
    }

    fn target() -> PathBuf {
        PathBuf::from("/docs/plan.md")
    }

    #[test]
    fn create_on_target() {
        let event = make_event(EventKind::Create(CreateKind::File), vec![target()]);
        assert_eq!(translate_event(&event, &target()), Some(FsEventKind::Create));
    }

    #[test]
    fn data_modify_on_target() {
        let event = make_event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), vec![target()]);
        assert_eq!(translate_event(&event, &target()), Some(FsEventKind::Modify));
    }

    #[test]
    fn rename_onto_target_counts_as_modify() {
        let event = make_event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            vec![PathBuf::from("/docs/.plan.md.swp"), target()],
        );
        assert_eq!(translate_event(&event, &target()), Some(FsEventKind::Modify));
    }

    #[test]
    fn remove_on_target() {
        let event = make_event(EventKind::Remove(RemoveKind::File), vec![target()]);
        assert_eq!(translate_event(&event, &target()), Some(FsEventKind::Remove));
    }

    #[test]
    fn ignores_siblings() {
        let event = make_event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            vec![PathBuf::from("/docs/plan.review.md"), PathBuf::from("/docs/.plan.md.comments.json")],
        );
        assert!(translate_event(&event, &target()).is_none());
    }

    #[test]
    fn ignores_metadata_and_access() {
        let metadata =
            make_event(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)), vec![target()]);
        assert!(translate_event(&metadata, &target()).is_none());

        let access = make_event(EventKind::Access(AccessKind::Read), vec![target()]);
        assert!(translate_event(&access, &target()).is_none());
    }

    #[tokio::test]
    async fn watcher_reports_modification() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("plan.md");
        fs::write(&source, "initial\n").unwrap();

        let (watcher, mut rx) = SourceWatcher::start(&source).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(&source, "edited\n").unwrap();

        let kind = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for modify event")
            .expect("channel closed");
        assert!(matches!(kind, FsEventKind::Modify | FsEventKind::Create));

        drop(watcher);
    }

    #[test]
    fn watcher_exposes_canonical_target() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("plan.md");
        fs::write(&source, "x").unwrap();
        let (watcher, _rx) = SourceWatcher::start(&source).unwrap();
        assert_eq!(watcher.target(), source.canonicalize().unwrap());
    }

    #[test]
    fn watcher_rejects_missing_source() {
        assert!(SourceWatcher::start(Path::new("/nonexistent/path/abc123/plan.md")).is_err());
    }
}
