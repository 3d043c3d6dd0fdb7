// Review service: the operations the transport layer exposes.
//
// Each ledger mutation runs under the session lock, then schedules a debounced
// flush once the lock is released. Persistence failures never surface here.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use marginalia_common::error::ReviewError;
use marginalia_common::protocol::DocumentResponse;
use marginalia_common::types::Comment;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::persist::PersistenceEngine;
use crate::session::DocumentSession;

#[derive(Debug, Clone)]
pub struct ReviewService {
    session: Arc<DocumentSession>,
    persistence: Arc<PersistenceEngine>,
    shutdown_tx: Option<broadcast::Sender<()>>,
}

impl ReviewService {
    pub fn new(session: Arc<DocumentSession>, persistence: Arc<PersistenceEngine>) -> Self {
        Self { session, persistence, shutdown_tx: None }
    }

    /// Notify `shutdown_tx` when a client finishes the review.
    pub fn with_shutdown_notifier(mut self, shutdown_tx: broadcast::Sender<()>) -> Self {
        self.shutdown_tx = Some(shutdown_tx);
        self
    }

    pub fn session(&self) -> &Arc<DocumentSession> {
        &self.session
    }

    pub fn persistence(&self) -> &Arc<PersistenceEngine> {
        &self.persistence
    }

    pub fn get_document(&self) -> DocumentResponse {
        DocumentResponse {
            filename: self.session.file_name().to_string(),
            content: self.session.content().to_string(),
            source_changed: self.session.source_changed(),
        }
    }

    pub fn get_comments(&self) -> Vec<Comment> {
        self.session.comments()
    }

    pub fn add_comment(&self, start_line: i64, end_line: i64, body: &str) -> Result<Comment, ReviewError> {
        let comment = self.session.add_comment(start_line, end_line, body)?;
        self.persistence.schedule();
        Ok(comment)
    }

    pub fn update_comment(&self, id: &str, body: &str) -> Result<Comment, ReviewError> {
        let comment = self.session.update_comment(id, body)?;
        self.persistence.schedule();
        Ok(comment)
    }

    pub fn delete_comment(&self, id: &str) -> bool {
        let removed = self.session.delete_comment(id);
        if removed {
            self.persistence.schedule();
        }
        removed
    }

    pub fn get_stale_notice(&self) -> String {
        self.session.stale_notice()
    }

    pub fn clear_stale_notice(&self) {
        self.session.clear_stale_notice();
    }

    /// Location of the rendered review file.
    pub fn review_file(&self) -> PathBuf {
        self.persistence.store().review_path().to_path_buf()
    }

    /// Flush immediately and ask the host to shut down.
    ///
    /// The flush is attempted even if it fails; the error is returned so the
    /// caller can report it, and shutdown is still requested.
    pub fn finish(&self) -> Result<PathBuf> {
        let flushed = self.persistence.flush_now();
        if let Some(tx) = &self.shutdown_tx {
            info!("review finished, requesting shutdown");
            if tx.send(()).is_err() {
                warn!("no shutdown listener registered");
            }
        }
        flushed.map(|_| self.review_file())
    }
}
