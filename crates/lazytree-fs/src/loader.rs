//! Worker dispatch for listings and volume enumeration.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use lazytree_core::{ExpandError, LoadOutcome, LoadRequest};

use crate::source::DirectorySource;

/// A volume found during root enumeration.
#[derive(Debug)]
pub struct Volume {
    /// Mount point or drive root.
    pub path: PathBuf,
    /// Label, or the error hit while reading the volume.
    pub label: io::Result<String>,
}

/// Result of a worker task, to be applied on the controller's thread.
#[derive(Debug)]
pub enum LoadEvent {
    /// A directory listing finished.
    Listed {
        request: LoadRequest,
        outcome: LoadOutcome,
    },
    /// Root enumeration finished.
    Roots(io::Result<Vec<Volume>>),
}

/// Runs blocking source calls on the tokio blocking pool.
///
/// Dispatch methods must be called from within a Tokio runtime.
#[derive(Clone)]
pub struct Loader {
    source: Arc<dyn DirectorySource>,
    tx: mpsc::Sender<LoadEvent>,
}

impl Loader {
    /// Create a loader and the receiver its results arrive on.
    ///
    /// `capacity` must be non-zero; [`lazytree_core::BrowserConfig::validate`] checks it.
    pub fn new(
        source: Arc<dyn DirectorySource>,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<LoadEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { source, tx }, rx)
    }

    /// List `request.path` on a worker and post the outcome.
    ///
    /// A panicking listing is reported as [`ExpandError::Worker`] so the
    /// requesting node still reaches a terminal state.
    pub fn dispatch(&self, request: LoadRequest) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let path = request.path.clone();
            let outcome = tokio::task::spawn_blocking(move || source.list(&path))
                .await
                .unwrap_or_else(|e| Err(ExpandError::worker(e.to_string())));

            // Receiver gone means the controller was dropped.
            let _ = tx.send(LoadEvent::Listed { request, outcome }).await;
        });
    }

    /// Enumerate volumes and read their labels on a worker.
    pub fn dispatch_roots(&self) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || -> io::Result<Vec<Volume>> {
                let volumes = source.volumes()?;
                Ok(volumes
                    .into_iter()
                    .map(|path| {
                        let label = source.volume_label(&path);
                        Volume { path, label }
                    })
                    .collect())
            })
            .await
            .unwrap_or_else(|e| Err(io::Error::other(e.to_string())));

            let _ = tx.send(LoadEvent::Roots(result)).await;
        });
    }
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader").finish_non_exhaustive()
    }
}
