// Core domain types shared by the daemon and its tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::fingerprint::Fingerprint;

/// Prefix of every comment id (`c1`, `c2`, ...).
pub const COMMENT_ID_PREFIX: &str = "c";

/// One line-range annotation on the reviewed document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    /// First annotated line (1-based, inclusive).
    pub start_line: u32,
    /// Last annotated line (1-based, inclusive). Also the anchor line in the review file.
    pub end_line: u32,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_single_line(&self) -> bool {
        self.start_line == self.end_line
    }
}

/// Format the id for the `n`-th allocated comment.
pub fn comment_id(n: u64) -> String {
    format!("{COMMENT_ID_PREFIX}{n}")
}

/// Numeric suffix of a comment id, if it has the `c<N>` shape.
pub fn comment_id_number(id: &str) -> Option<u64> {
    id.strip_prefix(COMMENT_ID_PREFIX)?.parse().ok()
}

/// Persisted sidecar: the session's comments plus the fingerprint they apply to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// File name of the reviewed source.
    pub file: String,
    pub file_hash: Fingerprint,
    pub updated_at: DateTime<Utc>,
    /// Next id to allocate. Absent in sidecars written by older builds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub comments: Vec<Comment>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Comment>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Comment>>::deserialize(deserializer)?.unwrap_or_default())
}

impl SessionSnapshot {
    /// Next id to allocate when resuming: the stored counter or one past the
    /// highest id suffix, whichever is larger. Defaults to 1.
    pub fn resume_next_id(&self) -> u64 {
        let from_ids = self
            .comments
            .iter()
            .filter_map(|c| comment_id_number(&c.id))
            .max()
            .map_or(1, |max| max.saturating_add(1));
        self.next_id.map_or(from_ids, |stored| stored.max(from_ids))
    }
}
