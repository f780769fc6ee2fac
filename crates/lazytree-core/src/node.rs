//! Filesystem nodes and their load state machine.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use compact_str::{CompactString, format_compact};
use serde::{Deserialize, Serialize};

use crate::error::ExpandError;

/// Label shown while a listing is in flight.
pub const LOADING_LABEL: &str = "Loading...";

/// Label shown when listing a directory was refused by the OS.
pub const ACCESS_DENIED_LABEL: &str = "Access Denied";

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a node within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Create a new NodeId from a u64.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocate a fresh id that no other node in this process carries.
    pub fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Classification of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A mounted volume or logical drive.
    Drive,
    /// A directory.
    Folder,
    /// Anything that is not listed as a directory, plus every synthetic marker.
    File,
}

impl NodeKind {
    /// Drives and folders can have children loaded into them.
    pub fn is_expandable(self) -> bool {
        matches!(self, Self::Drive | Self::Folder)
    }
}

/// Where a node is in its one-shot loading lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loading,
    /// Terminal. Only an explicit [`Node::reset`] leaves this state.
    Loaded,
}

/// Synthetic entries that stand in for real children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Marker {
    /// Seeded into every fresh expandable node so the view can draw an expander.
    Placeholder,
    /// Shown while the listing runs.
    Loading,
    /// The OS refused to list the directory.
    AccessDenied,
    /// Any other listing failure, with its description.
    Error(String),
}

impl Marker {
    /// Display label for this marker.
    pub fn label(&self) -> CompactString {
        match self {
            Self::Placeholder => CompactString::default(),
            Self::Loading => CompactString::new(LOADING_LABEL),
            Self::AccessDenied => CompactString::new(ACCESS_DENIED_LABEL),
            Self::Error(reason) => format_compact!("Error: {reason}"),
        }
    }
}

impl From<&ExpandError> for Marker {
    fn from(err: &ExpandError) -> Self {
        match err {
            ExpandError::AccessDenied { .. } => Self::AccessDenied,
            other => Self::Error(other.reason()),
        }
    }
}

/// Immediate entries of a directory, split the way the view shows them.
///
/// Each group keeps the order the OS returned it in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Subdirectories.
    pub directories: Vec<PathBuf>,
    /// Everything else.
    pub files: Vec<PathBuf>,
}

impl Listing {
    /// Create a listing from already-split groups.
    pub fn new(directories: Vec<PathBuf>, files: Vec<PathBuf>) -> Self {
        Self { directories, files }
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.directories.len() + self.files.len()
    }

    /// Check if the directory was empty.
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }
}

/// Result of running a listing for a node.
pub type LoadOutcome = Result<Listing, ExpandError>;

/// A listing a node wants performed off the interactive thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Node that issued the request.
    pub node: NodeId,
    /// Directory to list.
    pub path: PathBuf,
}

/// A single entry in the browsable tree.
///
/// Children are owned exclusively, so dropping a node drops its subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    path: Option<PathBuf>,
    name: CompactString,
    kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    marker: Option<Marker>,
    children: Vec<Node>,
    load_state: LoadState,
    /// Load-in-progress guard, kept apart from `load_state`.
    #[serde(skip)]
    in_flight: bool,
}

impl Node {
    /// Create a folder or file node named after the last segment of `path`.
    pub fn new(path: impl Into<PathBuf>, kind: NodeKind) -> Self {
        let path = path.into();
        let name = display_name(&path);
        Self::with_name(path, name, kind)
    }

    /// Create a drive node carrying the label the OS reported for the volume.
    pub fn drive(path: impl Into<PathBuf>, label: impl Into<CompactString>) -> Self {
        Self::with_name(path.into(), label.into(), NodeKind::Drive)
    }

    /// Create a synthetic marker node.
    ///
    /// Markers have no path, are always file-kind and never get a placeholder.
    pub fn marker(marker: Marker) -> Self {
        Self {
            id: NodeId::next(),
            path: None,
            name: marker.label(),
            kind: NodeKind::File,
            marker: Some(marker),
            children: Vec::new(),
            load_state: LoadState::NotLoaded,
            in_flight: false,
        }
    }

    fn with_name(path: PathBuf, name: CompactString, kind: NodeKind) -> Self {
        let mut node = Self {
            id: NodeId::next(),
            path: Some(path),
            name,
            kind,
            marker: None,
            children: Vec::new(),
            load_state: LoadState::NotLoaded,
            in_flight: false,
        };
        if kind.is_expandable() {
            node.children.push(Self::marker(Marker::Placeholder));
        }
        node
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Absolute path, `None` for markers.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn display_name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Whether a listing dispatched for this node has not been applied yet.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_expandable(&self) -> bool {
        self.kind.is_expandable()
    }

    pub fn is_marker(&self) -> bool {
        self.marker.is_some()
    }

    pub fn marker_kind(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    /// True while the node still shows only its initial placeholder.
    pub fn has_placeholder(&self) -> bool {
        matches!(self.children.as_slice(), [only] if only.marker == Some(Marker::Placeholder))
    }

    /// Start loading this node's children.
    ///
    /// Returns `None` for files and for nodes that are loading or loaded;
    /// otherwise the node moves to [`LoadState::Loading`], shows a single
    /// loading marker, and returns the listing to run. The guard is set
    /// before the request leaves the node, so a second call made before the
    /// result arrives is a no-op.
    pub fn request_expand(&mut self) -> Option<LoadRequest> {
        if !self.kind.is_expandable() || self.in_flight || self.load_state != LoadState::NotLoaded {
            return None;
        }
        let path = self.path.clone()?;

        self.load_state = LoadState::Loading;
        self.in_flight = true;
        self.children.clear();
        self.children.push(Self::marker(Marker::Loading));

        Some(LoadRequest {
            node: self.id,
            path,
        })
    }

    /// Apply the result of a listing started by [`Node::request_expand`].
    ///
    /// Directories are appended first, then files, each in listing order.
    /// Failures become a single marker child. Every outcome is terminal.
    /// The in-flight guard is cleared even when the result is stale, and a
    /// stale result (node not loading) leaves the children untouched.
    /// Returns whether the children were replaced.
    pub fn complete_load(&mut self, outcome: LoadOutcome) -> bool {
        self.in_flight = false;
        if self.load_state != LoadState::Loading {
            return false;
        }

        self.children.clear();
        match outcome {
            Ok(listing) => {
                self.children.reserve(listing.len());
                self.children.extend(
                    listing
                        .directories
                        .into_iter()
                        .map(|path| Self::new(path, NodeKind::Folder)),
                );
                self.children.extend(
                    listing
                        .files
                        .into_iter()
                        .map(|path| Self::new(path, NodeKind::File)),
                );
            }
            Err(err) => self.children.push(Self::marker(Marker::from(&err))),
        }

        self.load_state = LoadState::Loaded;
        true
    }

    /// Return a loaded node to [`LoadState::NotLoaded`] so it can be listed again.
    ///
    /// Drops the loaded subtree and reseeds the placeholder. Refused (returns
    /// `false`) for files, for nodes that are not loaded, and while a listing
    /// is still in flight.
    pub fn reset(&mut self) -> bool {
        if !self.kind.is_expandable() || self.in_flight || self.load_state != LoadState::Loaded {
            return false;
        }
        self.load_state = LoadState::NotLoaded;
        self.children.clear();
        self.children.push(Self::marker(Marker::Placeholder));
        true
    }

    /// Find a node in this subtree by id.
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Find a node by id, descending only into children that contain `path`.
    pub fn find_mut(&mut self, id: NodeId, path: &Path) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.children
            .iter_mut()
            .filter(|child| child.contains(path))
            .find_map(|child| child.find_mut(id, path))
    }

    /// Whether `path` is this node's path or lies beneath it.
    pub fn contains(&self, path: &Path) -> bool {
        self.path.as_deref().is_some_and(|own| path.starts_with(own))
    }

    /// Number of nodes in this subtree, markers and this node included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_len).sum::<usize>()
    }
}

/// Last path segment, or the whole path when there is none (`/`, `C:\`).
fn display_name(path: &Path) -> CompactString {
    match path.file_name() {
        Some(name) => CompactString::new(name.to_string_lossy()),
        None => CompactString::new(path.as_os_str().to_string_lossy()),
    }
}
