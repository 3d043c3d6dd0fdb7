// Review file (rendered annotations) persistence.

use std::fs;
use std::io::ErrorKind;

use anyhow::{Context, Result};

use super::{write_atomic, ArtifactStore};

impl ArtifactStore {
    pub fn write_review(&self, rendered: &str) -> Result<()> {
        write_atomic(self.review_path(), rendered.as_bytes())
    }

    /// Delete the review file. Returns whether one existed.
    pub fn remove_review(&self) -> Result<bool> {
        match fs::remove_file(self.review_path()) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error).with_context(|| {
                format!("failed to remove review file `{}`", self.review_path().display())
            }),
        }
    }
}
