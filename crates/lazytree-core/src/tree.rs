//! Root set container and statistics.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::node::{LoadState, Node, NodeId};

/// Counts over every node currently in a forest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Total number of nodes, markers included.
    pub total_nodes: usize,
    /// Number of synthetic marker nodes.
    pub markers: usize,
    /// Expandable nodes whose listing has been applied.
    pub loaded: usize,
    /// Expandable nodes waiting on a listing.
    pub loading: usize,
}

impl TreeStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one node (not its children).
    pub fn record(&mut self, node: &Node) {
        self.total_nodes += 1;
        if node.is_marker() {
            self.markers += 1;
        }
        match node.load_state() {
            LoadState::Loaded => self.loaded += 1,
            LoadState::Loading => self.loading += 1,
            LoadState::NotLoaded => {}
        }
    }
}

/// The ordered set of root nodes, one per drive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Forest {
    roots: Vec<Node>,
}

impl Forest {
    /// Create an empty forest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Root nodes in the order they were added.
    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    /// Append a root.
    pub fn push(&mut self, node: Node) {
        self.roots.push(node);
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Find any node by id.
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.roots.iter().find_map(|root| root.find(id))
    }

    /// Find a node by id, searching only the roots that contain `path`.
    ///
    /// Nested mount points are handled by trying every containing root.
    pub fn find_mut(&mut self, id: NodeId, path: &Path) -> Option<&mut Node> {
        self.roots
            .iter_mut()
            .filter(|root| root.contains(path))
            .find_map(|root| root.find_mut(id, path))
    }

    /// Compute statistics over the whole forest.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::new();
        let mut stack: Vec<&Node> = self.roots.iter().collect();
        while let Some(node) = stack.pop() {
            stats.record(node);
            stack.extend(node.children());
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::node::{Listing, NodeKind};

    #[test]
    fn test_tree_stats_default() {
        let stats = TreeStats::default();
        assert_eq!(stats.total_nodes, 0);
        assert_eq!(stats.loaded, 0);
    }

    #[test]
    fn test_forest_stats_counts_placeholders() {
        let mut forest = Forest::new();
        forest.push(Node::drive("/", "/"));
        forest.push(Node::drive("/mnt/data", "data"));

        let stats = forest.stats();
        assert_eq!(stats.total_nodes, 4);
        assert_eq!(stats.markers, 2);
        assert_eq!(stats.loaded, 0);
    }

    #[test]
    fn test_find_mut_tries_nested_roots() {
        let mut forest = Forest::new();
        forest.push(Node::drive("/", "/"));
        forest.push(Node::drive("/home", "home"));

        let home = &mut forest.roots[1];
        home.request_expand().unwrap();
        home.complete_load(Ok(Listing::new(vec![PathBuf::from("/home/alice")], vec![])));
        let alice = forest.roots[1].children()[0].id();

        let found = forest.find_mut(alice, Path::new("/home/alice")).unwrap();
        assert_eq!(found.kind(), NodeKind::Folder);
        assert_eq!(found.display_name(), "alice");
    }
}
