//! Core types for lazytree.
//!
//! This crate provides the node model shared by the rest of the workspace:
//! filesystem nodes with their tri-state load machine, the placeholder and
//! error marker protocol, error types, and configuration.
//!
//! Nothing here performs I/O. A node hands out a [`LoadRequest`] when it
//! starts loading and accepts the outcome later through
//! [`Node::complete_load`]; running the listing is the job of
//! `lazytree-fs`.

mod config;
mod error;
mod node;
mod tree;

pub use config::{BrowserConfig, BrowserConfigBuilder};
pub use error::{BrowseWarning, ExpandError, WarningKind};
pub use node::{
    ACCESS_DENIED_LABEL, LOADING_LABEL, Listing, LoadOutcome, LoadRequest, LoadState, Marker, Node,
    NodeId, NodeKind,
};
pub use tree::{Forest, TreeStats};
