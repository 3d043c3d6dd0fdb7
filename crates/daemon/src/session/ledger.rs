// Comment ledger: the insertion-ordered comment set of one review session.
//
// The ledger itself is not synchronized. It lives inside `DocumentSession`'s
// lock, and every method here assumes the caller holds the write guard.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use marginalia_common::error::ReviewError;
use marginalia_common::types::{comment_id, Comment};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct CommentLedger {
    comments: Vec<Comment>,
    next_id: u64,
}

impl Default for CommentLedger {
    fn default() -> Self {
        Self { comments: Vec::new(), next_id: 1 }
    }
}

impl CommentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt comments from a resumed snapshot.
    ///
    /// Comments that fail validation or repeat an earlier id are skipped.
    /// `next_id` is never lowered below what this ledger already allocated.
    /// Returns how many comments were adopted.
    pub fn restore(&mut self, comments: Vec<Comment>, next_id: u64) -> usize {
        let mut seen = HashSet::new();
        let mut adopted = Vec::with_capacity(comments.len());
        for comment in comments {
            if let Err(error) = validate_restored(&comment) {
                warn!(id = %comment.id, %error, "skipping invalid comment in session snapshot");
                continue;
            }
            if !seen.insert(comment.id.clone()) {
                warn!(id = %comment.id, "skipping duplicate comment id in session snapshot");
                continue;
            }
            adopted.push(comment);
        }

        self.comments = adopted;
        self.next_id = self.next_id.max(next_id);
        self.comments.len()
    }

    pub fn add(&mut self, start_line: i64, end_line: i64, body: &str) -> Result<Comment, ReviewError> {
        self.add_at(start_line, end_line, body, Utc::now())
    }

    fn add_at(
        &mut self,
        start_line: i64,
        end_line: i64,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<Comment, ReviewError> {
        validate_body(body)?;
        let (start_line, end_line) = validate_range(start_line, end_line)?;
        let following = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| ReviewError::validation("comment id space exhausted"))?;

        let comment = Comment {
            id: comment_id(self.next_id),
            start_line,
            end_line,
            body: body.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.next_id = following;
        self.comments.push(comment.clone());
        Ok(comment)
    }

    pub fn update(&mut self, id: &str, body: &str) -> Result<Comment, ReviewError> {
        validate_body(body)?;
        let comment = self
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ReviewError::not_found(id))?;
        comment.body = body.to_string();
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    /// Remove a comment. Returns whether it existed; ids are never reused.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(idx) = self.comments.iter().position(|c| c.id == id) else {
            return false;
        };
        self.comments.remove(idx);
        true
    }

    /// Insertion-ordered copy of every comment.
    pub fn list(&self) -> Vec<Comment> {
        self.comments.clone()
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }
}

fn validate_body(body: &str) -> Result<(), ReviewError> {
    if body.is_empty() {
        return Err(ReviewError::validation("comment body is required"));
    }
    Ok(())
}

fn validate_range(start_line: i64, end_line: i64) -> Result<(u32, u32), ReviewError> {
    if start_line < 1 || end_line < start_line {
        return Err(ReviewError::validation(format!(
            "invalid line range {start_line}-{end_line}"
        )));
    }
    let start = u32::try_from(start_line)
        .map_err(|_| ReviewError::validation(format!("start line {start_line} is too large")))?;
    let end = u32::try_from(end_line)
        .map_err(|_| ReviewError::validation(format!("end line {end_line} is too large")))?;
    Ok((start, end))
}

fn validate_restored(comment: &Comment) -> Result<(), ReviewError> {
    validate_body(&comment.body)?;
    validate_range(i64::from(comment.start_line), i64::from(comment.end_line))?;
    Ok(())
}
