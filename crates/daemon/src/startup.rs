// Startup: source and output path resolution, TCP listener binding.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use tokio::net::TcpListener;
use tracing::info;

/// Resolved paths for one review run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPaths {
    /// Absolute path of the reviewed file.
    pub source: PathBuf,
    /// Final path component of `source`.
    pub file_name: String,
    /// Directory receiving the sidecar and review file.
    pub output_dir: PathBuf,
}

impl ReviewPaths {
    /// Resolve `source` and pick the output directory, creating it if needed.
    ///
    /// `output_dir` comes from the command line or config file; without one,
    /// artifacts land next to the source.
    pub fn resolve(source: &Path, output_dir: Option<&Path>) -> Result<Self> {
        let source = resolve_source(source)?;
        let file_name = source
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_owned)
            .ok_or_else(|| anyhow!("source path has no usable file name: {}", source.display()))?;
        let output_dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => source
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| anyhow!("source path has no parent directory: {}", source.display()))?,
        };
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;
        Ok(Self { source, file_name, output_dir })
    }
}

/// Absolute, symlink-resolved path to an existing regular file.
pub fn resolve_source(path: &Path) -> Result<PathBuf> {
    let resolved = path
        .canonicalize()
        .with_context(|| format!("cannot open source file {}", path.display()))?;
    if resolved.is_dir() {
        bail!("{} is a directory, expected a file", resolved.display());
    }
    Ok(resolved)
}

/// Bind the HTTP listener on `addr` (`host:port`).
pub async fn bind_listener(addr: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind review server on {addr}"))?;
    let local = listener.local_addr().context("failed to read bound address")?;
    info!(url = %format!("http://{local}"), "review server listening");
    Ok(listener)
}
