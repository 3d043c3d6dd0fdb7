// Persistence engine: debounced dual-write of the sidecar and the review file.
//
// Mutations call `schedule()`. After the quiescence window the engine takes a
// consistent snapshot of the session and writes both artifacts. `flush()` and
// `shutdown()` run the same routine synchronously; a flush mutex serializes
// every caller so a timer flush and a forced flush never interleave.

pub mod debounce;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use marginalia_common::render::render;
use tracing::{debug, error};

use crate::session::DocumentSession;
use crate::store::ArtifactStore;
use debounce::{DebounceConfig, DebounceTimer};

/// What a completed flush wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    pub comments: usize,
    /// Whether the review file was written (false: removed or never existed).
    pub review_written: bool,
}

#[derive(Debug)]
pub struct PersistenceEngine {
    session: Arc<DocumentSession>,
    store: ArtifactStore,
    timer: DebounceTimer,
    flush_lock: Mutex<()>,
    flushes: AtomicU64,
}

impl PersistenceEngine {
    pub fn new(session: Arc<DocumentSession>, store: ArtifactStore, config: DebounceConfig) -> Arc<Self> {
        Arc::new(Self {
            session,
            store,
            timer: DebounceTimer::new(config),
            flush_lock: Mutex::new(()),
            flushes: AtomicU64::new(0),
        })
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// (Re)start the debounce window. Must be called inside a Tokio runtime.
    pub fn schedule(self: &Arc<Self>) {
        let engine = Arc::clone(self);
        self.timer.schedule(move || {
            if let Err(error) = engine.flush() {
                error!(?error, "debounced flush failed; will retry on next change");
            }
        });
        debug!(window_ms = self.timer.window().as_millis() as u64, "persistence flush scheduled");
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Number of flushes that completed successfully.
    pub fn flush_count(&self) -> u64 {
        self.flushes.load(Ordering::SeqCst)
    }

    /// Write both artifacts from the current session state.
    pub fn flush(&self) -> Result<FlushReport> {
        let _guard = self.flush_lock.lock().expect("flush lock poisoned");

        let snapshot = self.session.snapshot();
        self.store.save_snapshot(&snapshot)?;

        let review_written = if snapshot.comments.is_empty() {
            self.store.remove_review()?;
            false
        } else {
            self.store.write_review(&render(self.session.content(), &snapshot.comments))?;
            true
        };

        self.flushes.fetch_add(1, Ordering::SeqCst);
        let report = FlushReport { comments: snapshot.comments.len(), review_written };
        debug!(
            comments = report.comments,
            review_written,
            snapshot = %self.store.snapshot_path().display(),
            "session flushed"
        );
        Ok(report)
    }

    /// Cancel any pending debounce and flush now.
    pub fn flush_now(&self) -> Result<FlushReport> {
        if self.timer.cancel() {
            debug!("pending debounced flush superseded by forced flush");
        }
        self.flush()
    }

    /// Final flush on process exit.
    pub fn shutdown(&self) -> Result<FlushReport> {
        self.flush_now()
    }
}
