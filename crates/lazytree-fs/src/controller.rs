//! Root set ownership and expansion routing.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;

use lazytree_core::{
    BrowseWarning, BrowserConfig, Forest, LoadOutcome, LoadRequest, LoadState, Node, NodeId,
    NodeKind,
};

use crate::loader::{LoadEvent, Loader, Volume};
use crate::source::{DirectorySource, LocalSource};

/// What an expansion event led to.
///
/// Every variant means the event was consumed; callers stop propagating it
/// to ancestor rows regardless of which one they get.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandDisposition {
    /// The node was already loaded, so the event was a duplicate.
    Suppressed,
    /// A listing was sent to a worker.
    Dispatched,
    /// Nothing to do: a file, a marker, a load in flight, or an unknown id.
    Ignored,
}

/// Owns the root nodes and applies worker results.
///
/// The controller is meant to live on one thread (the interactive one). It
/// is the only place nodes are mutated, and it does so only from `&mut self`
/// methods, so no node state is shared with workers.
#[derive(Debug)]
pub struct TreeController {
    forest: Forest,
    loader: Loader,
    events: mpsc::Receiver<LoadEvent>,
    roots_state: LoadState,
    pending: usize,
    warnings: Vec<BrowseWarning>,
}

impl TreeController {
    /// Create a controller over the given source.
    pub fn new(source: impl DirectorySource, config: &BrowserConfig) -> Self {
        Self::with_source(Arc::new(source), config)
    }

    /// Create a controller over a shared source.
    pub fn with_source(source: Arc<dyn DirectorySource>, config: &BrowserConfig) -> Self {
        let (loader, events) = Loader::new(source, config.channel_capacity);
        Self {
            forest: Forest::new(),
            loader,
            events,
            roots_state: LoadState::NotLoaded,
            pending: 0,
            warnings: Vec::new(),
        }
    }

    /// Create a controller over the local filesystem.
    pub fn local(config: &BrowserConfig) -> Self {
        Self::new(LocalSource::from_config(config), config)
    }

    /// Root nodes in the order they were added.
    pub fn roots(&self) -> &[Node] {
        self.forest.roots()
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Look up any node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.forest.find(id)
    }

    /// Problems logged while building the root set.
    pub fn warnings(&self) -> &[BrowseWarning] {
        &self.warnings
    }

    /// Number of worker results not yet applied.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_idle(&self) -> bool {
        self.pending == 0
    }

    pub fn roots_state(&self) -> LoadState {
        self.roots_state
    }

    /// Start enumerating volumes. Only the first call does anything.
    ///
    /// Drive nodes are appended when the result is applied; volumes that
    /// cannot be described are skipped and logged.
    pub fn initialize_roots(&mut self) -> bool {
        if self.roots_state != LoadState::NotLoaded {
            return false;
        }
        self.roots_state = LoadState::Loading;
        self.pending += 1;
        tracing::debug!("enumerating volumes");
        self.loader.dispatch_roots();
        true
    }

    /// Add a directory as a root of its own, outside volume enumeration.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> NodeId {
        let node = Node::new(path, NodeKind::Folder);
        let id = node.id();
        self.forest.push(node);
        id
    }

    /// Handle an expansion gesture from the view.
    ///
    /// Loaded nodes are suppressed without side effects, since views fire
    /// the same event again for ancestors. Anything else goes to
    /// [`TreeController::request_expand`].
    pub fn on_expand(&mut self, id: NodeId) -> ExpandDisposition {
        match self.forest.find(id).map(Node::load_state) {
            Some(LoadState::Loaded) => {
                tracing::trace!(node = id.0, "suppressed duplicate expand");
                ExpandDisposition::Suppressed
            }
            Some(_) => self.request_expand(id),
            None => ExpandDisposition::Ignored,
        }
    }

    /// Ask a node to load and dispatch its listing if it agrees.
    pub fn request_expand(&mut self, id: NodeId) -> ExpandDisposition {
        let request = self.node_mut(id).and_then(Node::request_expand);
        match request {
            Some(request) => {
                self.dispatch(request);
                ExpandDisposition::Dispatched
            }
            None => ExpandDisposition::Ignored,
        }
    }

    /// Throw away a loaded node's children and list it again.
    ///
    /// Refused while the node's previous listing is still in flight.
    pub fn force_reload(&mut self, id: NodeId) -> ExpandDisposition {
        let Some(node) = self.node_mut(id) else {
            return ExpandDisposition::Ignored;
        };
        if !node.reset() {
            return ExpandDisposition::Ignored;
        }
        if let Some(path) = node.path() {
            tracing::info!(path = %path.display(), "reloading");
        }
        self.request_expand(id)
    }

    /// Apply one worker result. Must run on the controller's thread.
    pub fn apply(&mut self, event: LoadEvent) {
        self.pending = self.pending.saturating_sub(1);
        match event {
            LoadEvent::Listed { request, outcome } => self.apply_listing(request, outcome),
            LoadEvent::Roots(result) => self.apply_roots(result),
        }
    }

    /// Apply every result that has already arrived, without waiting.
    pub fn apply_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next worker result.
    ///
    /// Resolves to `None` at once when nothing is in flight.
    pub async fn next_event(&mut self) -> Option<LoadEvent> {
        if self.pending == 0 {
            return None;
        }
        self.events.recv().await
    }

    /// Apply results until no load is in flight.
    pub async fn settle(&mut self) {
        while let Some(event) = self.next_event().await {
            self.apply(event);
        }
    }

    /// Expand every expandable node down to `depth` levels below the roots.
    ///
    /// Depth 0 loads the roots themselves. Each level is settled before the
    /// next one is requested.
    pub async fn expand_to_depth(&mut self, depth: usize) {
        let mut level: Vec<NodeId> = self.roots().iter().map(Node::id).collect();

        for _ in 0..=depth {
            for &id in &level {
                self.on_expand(id);
            }
            self.settle().await;

            level = level
                .iter()
                .filter_map(|&id| self.node(id))
                .flat_map(Node::children)
                .filter(|child| child.is_expandable())
                .map(Node::id)
                .collect();
            if level.is_empty() {
                break;
            }
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let path = self.forest.find(id)?.path()?.to_path_buf();
        self.forest.find_mut(id, &path)
    }

    fn dispatch(&mut self, request: LoadRequest) {
        tracing::debug!(path = %request.path.display(), node = request.node.0, "dispatching listing");
        self.pending += 1;
        self.loader.dispatch(request);
    }

    fn apply_listing(&mut self, request: LoadRequest, outcome: LoadOutcome) {
        if let Err(err) = &outcome {
            tracing::debug!(path = %request.path.display(), error = %err, "listing failed");
        }

        match self.forest.find_mut(request.node, &request.path) {
            Some(node) => {
                if !node.complete_load(outcome) {
                    tracing::debug!(path = %request.path.display(), "ignored stale listing");
                }
            }
            None => log_dropped(&request.path),
        }
    }

    fn apply_roots(&mut self, result: io::Result<Vec<Volume>>) {
        match result {
            Ok(volumes) => {
                for volume in volumes {
                    match volume.label {
                        Ok(label) => self.forest.push(Node::drive(volume.path, label)),
                        Err(err) => {
                            tracing::warn!(path = %volume.path.display(), error = %err, "skipping volume");
                            self.warnings
                                .push(BrowseWarning::volume_unavailable(&volume.path, &err));
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to enumerate volumes");
                self.warnings.push(BrowseWarning::volume_listing(&err));
            }
        }
        self.roots_state = LoadState::Loaded;
    }
}

fn log_dropped(path: &Path) {
    tracing::debug!(path = %path.display(), "node dropped before its listing arrived");
}
