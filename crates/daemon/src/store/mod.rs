// On-disk artifacts of a review session.
//
// sidecar:     <output_dir>/.<file_name>.comments.json
// review file: <output_dir>/<stem>.review<.ext>

pub mod review;
pub mod snapshot;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

/// Resolved artifact locations for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    snapshot_path: PathBuf,
    review_path: PathBuf,
}

impl ArtifactStore {
    /// Derive artifact paths for `file_name` under `output_dir`.
    pub fn new(output_dir: impl AsRef<Path>, file_name: &str) -> Self {
        let output_dir = output_dir.as_ref();
        Self {
            snapshot_path: output_dir.join(format!(".{file_name}.comments.json")),
            review_path: output_dir.join(review_file_name(file_name)),
        }
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn review_path(&self) -> &Path {
        &self.review_path
    }
}

/// `plan.md` -> `plan.review.md`, `NOTES` -> `NOTES.review`.
fn review_file_name(file_name: &str) -> String {
    let path = Path::new(file_name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}.review.{ext}"),
        None => format!("{stem}.review"),
    }
}

/// Replace `target` with `bytes` so readers see either the old or the new
/// file, never a partial one: write a sibling temp file, fsync, rename.
pub(crate) fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = temp_path_for(target);
    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("failed to create temp file `{}`", tmp_path.display()))?;
    let written = file
        .write_all(bytes)
        .and_then(|_| file.sync_data())
        .with_context(|| format!("failed to write temp file `{}`", tmp_path.display()));
    drop(file);
    if let Err(error) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    if let Err(error) = fs::rename(&tmp_path, target) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error).with_context(|| {
            format!(
                "failed to atomically move `{}` to `{}`",
                tmp_path.display(),
                target.display()
            )
        });
    }
    Ok(())
}

fn temp_path_for(target: &Path) -> PathBuf {
    let nonce = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
    let name = target.file_name().and_then(|n| n.to_str()).unwrap_or("artifact");
    target.with_file_name(format!(".{name}.tmp.{}.{nonce}", std::process::id()))
}
