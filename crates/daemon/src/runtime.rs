// Review server lifecycle: open the session, serve until finish or a signal,
// then run the forced shutdown flush.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::api::router;
use crate::config::Config;
use crate::persist::{FlushReport, PersistenceEngine};
use crate::review::ReviewService;
use crate::session::DocumentSession;
use crate::startup::{bind_listener, ReviewPaths};
use crate::store::ArtifactStore;
use crate::watcher::{monitor::run_monitor, SourceWatcher};

/// Everything one review run needs, wired together but not yet serving.
pub struct ReviewApp {
    pub paths: ReviewPaths,
    pub service: ReviewService,
    shutdown_tx: broadcast::Sender<()>,
    finished: broadcast::Receiver<()>,
}

impl ReviewApp {
    /// Open (or resume) the session for `source`.
    pub fn open(source: &Path, config: &Config) -> Result<Self> {
        let paths = ReviewPaths::resolve(source, config.output_dir.as_deref())?;
        let store = ArtifactStore::new(&paths.output_dir, &paths.file_name);
        let session = Arc::new(DocumentSession::open(&paths.source, &store)?);
        let persistence = PersistenceEngine::new(Arc::clone(&session), store, config.debounce());

        let (shutdown_tx, finished) = broadcast::channel(4);
        let service =
            ReviewService::new(session, persistence).with_shutdown_notifier(shutdown_tx.clone());

        info!(
            source = %paths.source.display(),
            output_dir = %paths.output_dir.display(),
            comments = service.get_comments().len(),
            "review session opened"
        );
        Ok(Self { paths, service, shutdown_tx, finished })
    }

    /// Serve `listener` until `signal` resolves or a client finishes the
    /// review, then flush whatever is still pending.
    pub async fn serve<F>(self, listener: TcpListener, config: &Config, signal: F) -> Result<FlushReport>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let monitor = if config.watch { self.start_monitor(config) } else { None };

        let mut finished = self.finished;
        let shutdown = async move {
            tokio::select! {
                _ = signal => info!("shutdown signal received"),
                _ = finished.recv() => info!("review finished by client"),
            }
        };

        let served = axum::serve(listener, router(self.service.clone()))
            .with_graceful_shutdown(shutdown)
            .await
            .context("review server exited unexpectedly");

        let _ = self.shutdown_tx.send(());
        if let Some((watcher, task)) = monitor {
            let _ = task.await;
            drop(watcher);
        }

        let report = self.service.persistence().shutdown();
        match &report {
            Ok(report) => info!(
                comments = report.comments,
                review_written = report.review_written,
                "final flush complete"
            ),
            Err(error) => error!(?error, "final flush failed"),
        }
        served?;
        report
    }

    fn start_monitor(&self, config: &Config) -> Option<(SourceWatcher, JoinHandle<()>)> {
        match SourceWatcher::start(&self.paths.source) {
            Ok((watcher, events)) => {
                let task = tokio::spawn(run_monitor(
                    events,
                    Arc::clone(self.service.session()),
                    config.debounce(),
                    self.shutdown_tx.subscribe(),
                ));
                Some((watcher, task))
            }
            Err(error) => {
                warn!(?error, "source watcher unavailable; external edits will go unnoticed");
                None
            }
        }
    }
}

/// Run a review of `source` until the client finishes or the process is
/// asked to stop.
pub async fn run(source: &Path, config: Config) -> Result<()> {
    let app = ReviewApp::open(source, &config)?;
    let review_file = app.service.review_file();
    let listener = bind_listener(&config.bind_addr()).await?;
    let report = app.serve(listener, &config, shutdown_signal()).await?;
    if report.review_written {
        info!(review_file = %review_file.display(), "review file ready");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(?error, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                warn!(?error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
