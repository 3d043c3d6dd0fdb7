// Session snapshot (sidecar) persistence.

use std::fs;
use std::io::ErrorKind;

use anyhow::{Context, Result};
use marginalia_common::types::SessionSnapshot;

use super::{write_atomic, ArtifactStore};

impl ArtifactStore {
    /// Read the sidecar. `Ok(None)` when no prior session left one behind.
    pub fn load_snapshot(&self) -> Result<Option<SessionSnapshot>> {
        let path = self.snapshot_path();
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("failed to read snapshot `{}`", path.display()))
            }
        };

        let snapshot = serde_json::from_slice(&data)
            .with_context(|| format!("snapshot `{}` is not valid JSON", path.display()))?;
        Ok(Some(snapshot))
    }

    /// Atomically replace the sidecar with `snapshot`.
    pub fn save_snapshot(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let mut encoded =
            serde_json::to_vec_pretty(snapshot).context("failed to serialize session snapshot")?;
        encoded.push(b'\n');
        write_atomic(self.snapshot_path(), &encoded)
    }
}
