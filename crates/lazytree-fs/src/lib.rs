//! On-demand directory listing for lazytree.
//!
//! This crate turns the passive node model from `lazytree-core` into a
//! working browser: it talks to the filesystem, runs listings on the tokio
//! blocking pool, and funnels every result back through a single mutation
//! point.
//!
//! # Overview
//!
//! - [`DirectorySource`] abstracts the OS calls (volumes, labels, listings);
//!   [`LocalSource`] is the real implementation.
//! - [`Loader`] runs those calls on worker tasks and posts [`LoadEvent`]s
//!   through an mpsc channel.
//! - [`TreeController`] owns the root set and applies events on the thread
//!   that owns it. No node is ever touched from a worker.
//!
//! # Example
//!
//! ```rust,no_run
//! use lazytree_fs::{BrowserConfig, TreeController};
//!
//! # async fn demo() {
//! let mut controller = TreeController::local(&BrowserConfig::default());
//! controller.initialize_roots();
//! controller.settle().await;
//!
//! for root in controller.roots() {
//!     println!("{}", root.display_name());
//! }
//! # }
//! ```
//!
//! # Driving from an event loop
//!
//! Interactive callers poll [`TreeController::next_event`] alongside their
//! input stream and hand each event to [`TreeController::apply`]:
//!
//! ```rust,no_run
//! # use lazytree_fs::{BrowserConfig, TreeController};
//! # async fn demo(mut controller: TreeController) {
//! while let Some(event) = controller.next_event().await {
//!     controller.apply(event);
//!     // redraw here
//! }
//! # }
//! ```

mod controller;
mod loader;
mod source;

pub use controller::{ExpandDisposition, TreeController};
pub use loader::{LoadEvent, Loader, Volume};
pub use source::{DirectorySource, LocalSource};

// Re-export core types for convenience
pub use lazytree_core::{
    BrowseWarning, BrowserConfig, ExpandError, Forest, Listing, LoadOutcome, LoadRequest,
    LoadState, Marker, Node, NodeId, NodeKind, TreeStats, WarningKind,
};
