// Document session: the reviewed file, its fingerprint and its comments.
//
// Content and fingerprint are fixed at load. Everything mutable (the ledger,
// the stale notice, the external-change flag) sits behind one RwLock. Nothing
// in this module performs I/O while holding that lock.

pub mod ledger;

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use chrono::Utc;
use marginalia_common::error::ReviewError;
use marginalia_common::fingerprint::{fingerprint, Fingerprint};
use marginalia_common::types::{Comment, SessionSnapshot};
use tracing::{info, warn};

use crate::store::ArtifactStore;
use ledger::CommentLedger;

/// Shown when the prior session's snapshot was taken against different content.
pub const STALE_NOTICE: &str = "The source file has changed since the last review session. \
                                Previous comments may not align with the current content.";

#[derive(Debug, Default)]
struct SessionState {
    ledger: CommentLedger,
    stale_notice: Option<String>,
    source_changed: bool,
}

#[derive(Debug)]
pub struct DocumentSession {
    source_path: PathBuf,
    file_name: String,
    content: String,
    fingerprint: Fingerprint,
    state: RwLock<SessionState>,
}

impl DocumentSession {
    /// Read `source_path` once and resume from the sidecar in `store` when it
    /// was written against identical content.
    pub fn open(source_path: &Path, store: &ArtifactStore) -> Result<Self> {
        let bytes = std::fs::read(source_path)
            .with_context(|| format!("failed to read source file `{}`", source_path.display()))?;
        let file_name = source_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("source path `{}` has no file name", source_path.display()))?;

        let session = Self::from_bytes(source_path.to_path_buf(), file_name, &bytes);
        let prior = match store.load_snapshot() {
            Ok(prior) => prior,
            Err(error) => {
                warn!(?error, "ignoring unreadable session snapshot");
                None
            }
        };
        if let Some(prior) = prior {
            session.resume(prior);
        }
        Ok(session)
    }

    /// Build a session over in-memory bytes with an empty ledger.
    pub fn from_bytes(source_path: PathBuf, file_name: String, bytes: &[u8]) -> Self {
        Self {
            source_path,
            file_name,
            content: String::from_utf8_lossy(bytes).into_owned(),
            fingerprint: fingerprint(bytes),
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Apply the load protocol to a prior snapshot.
    ///
    /// Returns whether its comments were adopted.
    pub fn resume(&self, prior: SessionSnapshot) -> bool {
        let mut state = self.write_state();
        if prior.file_hash != self.fingerprint {
            warn!(
                file = %self.file_name,
                previous = %prior.file_hash,
                current = %self.fingerprint,
                "source changed since last review session; prior comments not loaded"
            );
            state.stale_notice = Some(STALE_NOTICE.to_string());
            return false;
        }

        let next_id = prior.resume_next_id();
        let adopted = state.ledger.restore(prior.comments, next_id);
        info!(file = %self.file_name, comments = adopted, next_id, "resumed review session");
        true
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn add_comment(&self, start_line: i64, end_line: i64, body: &str) -> Result<Comment, ReviewError> {
        self.write_state().ledger.add(start_line, end_line, body)
    }

    pub fn update_comment(&self, id: &str, body: &str) -> Result<Comment, ReviewError> {
        self.write_state().ledger.update(id, body)
    }

    pub fn delete_comment(&self, id: &str) -> bool {
        self.write_state().ledger.delete(id)
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.read_state().ledger.list()
    }

    /// Empty string when there is nothing to report.
    pub fn stale_notice(&self) -> String {
        self.read_state().stale_notice.clone().unwrap_or_default()
    }

    pub fn clear_stale_notice(&self) {
        self.write_state().stale_notice = None;
    }

    pub fn source_changed(&self) -> bool {
        self.read_state().source_changed
    }

    pub fn mark_source_changed(&self) {
        self.write_state().source_changed = true;
    }

    /// Consistent copy of the persistable state, stamped now.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.read_state();
        SessionSnapshot {
            file: self.file_name.clone(),
            file_hash: self.fingerprint.clone(),
            updated_at: Utc::now(),
            next_id: Some(state.ledger.next_id()),
            comments: state.ledger.list(),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().expect("session lock poisoned")
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().expect("session lock poisoned")
    }
}
