// Coalesces source events and re-checks the file's fingerprint once they settle.
//
// The session's content is never reloaded. A changed or removed source only
// raises `source_changed`; the next run's snapshot load reports staleness.

use std::fs;
use std::io::ErrorKind;
use std::sync::Arc;

use marginalia_common::fingerprint::fingerprint;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, trace, warn};

use super::FsEventKind;
use crate::persist::debounce::{DebounceConfig, DebounceTimer};
use crate::session::DocumentSession;

/// Outcome of re-reading the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCheck {
    Unchanged,
    Changed,
    Removed,
    Unreadable,
}

/// Re-hash the source and flag the session if it no longer matches.
pub fn check_source(session: &DocumentSession) -> SourceCheck {
    let path = session.source_path();
    match fs::read(path) {
        Ok(bytes) => {
            if fingerprint(&bytes) == *session.fingerprint() {
                trace!(path = %path.display(), "source fingerprint unchanged");
                return SourceCheck::Unchanged;
            }
            if !session.source_changed() {
                warn!(path = %path.display(), "source file changed on disk; comments may no longer line up");
            }
            session.mark_source_changed();
            SourceCheck::Changed
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if !session.source_changed() {
                warn!(path = %path.display(), "source file was removed");
            }
            session.mark_source_changed();
            SourceCheck::Removed
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to re-read source file");
            SourceCheck::Unreadable
        }
    }
}

/// Consume watcher events until the channel closes or shutdown fires.
pub async fn run_monitor(
    mut events: mpsc::Receiver<FsEventKind>,
    session: Arc<DocumentSession>,
    config: DebounceConfig,
    mut shutdown: broadcast::Receiver<()>,
) {
    let timer = DebounceTimer::new(config);
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(kind) => {
                    trace!(?kind, "source event");
                    let session = Arc::clone(&session);
                    timer.schedule(move || {
                        check_source(&session);
                    });
                }
                None => break,
            },
            _ = shutdown.recv() => break,
        }
    }
    timer.cancel();
    debug!("source monitor stopped");
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::store::ArtifactStore;

    fn open(tmp: &TempDir, content: &str) -> Arc<DocumentSession> {
        let source = tmp.path().join("plan.md");
        fs::write(&source, content).unwrap();
        let store = ArtifactStore::new(tmp.path(), "plan.md");
        Arc::new(DocumentSession::open(&source, &store).unwrap())
    }

    fn source(tmp: &TempDir) -> PathBuf {
        tmp.path().join("plan.md")
    }

    #[test]
    fn unchanged_source_leaves_flag_clear() {
        let tmp = TempDir::new().unwrap();
        let session = open(&tmp, "same\n");
        fs::write(source(&tmp), "same\n").unwrap();
        assert_eq!(check_source(&session), SourceCheck::Unchanged);
        assert!(!session.source_changed());
    }

    #[test]
    fn edited_source_is_flagged() {
        let tmp = TempDir::new().unwrap();
        let session = open(&tmp, "before\n");
        fs::write(source(&tmp), "after\n").unwrap();
        assert_eq!(check_source(&session), SourceCheck::Changed);
        assert!(session.source_changed());
        assert_eq!(session.content(), "before\n");
    }

    #[test]
    fn removed_source_is_flagged() {
        let tmp = TempDir::new().unwrap();
        let session = open(&tmp, "gone\n");
        fs::remove_file(source(&tmp)).unwrap();
        assert_eq!(check_source(&session), SourceCheck::Removed);
        assert!(session.source_changed());
    }

    #[tokio::test(start_paused = true)]
    async fn bursts_are_coalesced_before_checking() {
        let tmp = TempDir::new().unwrap();
        let session = open(&tmp, "v1\n");
        let (tx, rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let monitor = tokio::spawn(run_monitor(
            rx,
            Arc::clone(&session),
            DebounceConfig::with_millis(100),
            shutdown_rx,
        ));

        fs::write(source(&tmp), "v2\n").unwrap();
        for _ in 0..5 {
            tx.send(FsEventKind::Modify).await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!session.source_changed());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(session.source_changed());

        shutdown_tx.send(()).unwrap();
        monitor.await.unwrap();
    }

    #[tokio::test]
    async fn monitor_exits_when_channel_closes() {
        let tmp = TempDir::new().unwrap();
        let session = open(&tmp, "x\n");
        let (tx, rx) = mpsc::channel(1);
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
        drop(tx);
        tokio::time::timeout(
            Duration::from_secs(1),
            run_monitor(rx, session, DebounceConfig::default(), shutdown_rx),
        )
        .await
        .expect("monitor should stop once events close");
    }
}
