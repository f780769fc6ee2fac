use std::io;
use std::path::PathBuf;

use lazytree_core::{
    ACCESS_DENIED_LABEL, BrowserConfig, ExpandError, Forest, LOADING_LABEL, Listing, LoadState,
    Marker, Node, NodeId, NodeKind,
};

fn paths(items: &[&str]) -> Vec<PathBuf> {
    items.iter().map(PathBuf::from).collect()
}

#[test]
fn test_node_id_operations() {
    let id1 = NodeId::new(42);
    let id2 = NodeId::new(42);

    assert_eq!(id1, id2);
    assert_eq!(id1.0, 42);
}

#[test]
fn test_expandable_node_starts_with_placeholder() {
    for node in [
        Node::new("/srv/www", NodeKind::Folder),
        Node::drive("/", "/"),
    ] {
        assert_eq!(node.children().len(), 1);
        let child = &node.children()[0];
        assert_eq!(child.kind(), NodeKind::File);
        assert!(child.is_marker());
        assert!(child.path().is_none());
        assert!(node.has_placeholder());
        assert_eq!(node.load_state(), LoadState::NotLoaded);
    }
}

#[test]
fn test_drive_uses_reported_label() {
    let node = Node::drive("/mnt/backup", "Backup Disk");
    assert_eq!(node.display_name(), "Backup Disk");
    assert_eq!(node.kind(), NodeKind::Drive);
}

#[test]
fn test_request_expand_shows_loading_marker() {
    let mut node = Node::new("/srv/www", NodeKind::Folder);
    let request = node.request_expand().expect("first request dispatches");

    assert_eq!(request.path, PathBuf::from("/srv/www"));
    assert_eq!(node.load_state(), LoadState::Loading);
    assert_eq!(node.children().len(), 1);
    assert_eq!(node.children()[0].display_name(), LOADING_LABEL);
    assert_eq!(node.children()[0].marker_kind(), Some(&Marker::Loading));
}

#[test]
fn test_second_request_while_loading_is_noop() {
    let mut node = Node::new("/srv/www", NodeKind::Folder);
    node.request_expand().unwrap();
    let loading_id = node.children()[0].id();

    for _ in 0..5 {
        assert!(node.request_expand().is_none());
    }
    assert_eq!(node.children().len(), 1);
    assert_eq!(node.children()[0].id(), loading_id);
}

#[test]
fn test_directories_first_in_listing_order() {
    let mut node = Node::new("/d", NodeKind::Folder);
    node.request_expand().unwrap();
    let applied = node.complete_load(Ok(Listing::new(
        paths(&["/d/B", "/d/A"]),
        paths(&["/d/y.txt", "/d/x.txt"]),
    )));
    assert!(applied);

    let names: Vec<_> = node.children().iter().map(|c| c.display_name()).collect();
    let kinds: Vec<_> = node.children().iter().map(|c| c.kind()).collect();
    assert_eq!(names, ["B", "A", "y.txt", "x.txt"]);
    assert_eq!(
        kinds,
        [NodeKind::Folder, NodeKind::Folder, NodeKind::File, NodeKind::File]
    );
    assert_eq!(node.load_state(), LoadState::Loaded);
    assert!(!node.is_in_flight());

    // Loaded folders carry their own placeholder, files carry nothing.
    assert!(node.children()[0].has_placeholder());
    assert!(node.children()[2].children().is_empty());
}

#[test]
fn test_empty_directory_has_no_children() {
    let mut node = Node::new("/empty", NodeKind::Folder);
    node.request_expand().unwrap();
    node.complete_load(Ok(Listing::default()));

    assert!(node.children().is_empty());
    assert_eq!(node.load_state(), LoadState::Loaded);
}

#[test]
fn test_access_denied_substitution() {
    let mut node = Node::new("/root", NodeKind::Folder);
    node.request_expand().unwrap();
    node.complete_load(Err(ExpandError::io(
        "/root",
        io::Error::from(io::ErrorKind::PermissionDenied),
    )));

    assert_eq!(node.children().len(), 1);
    let child = &node.children()[0];
    assert_eq!(child.display_name(), ACCESS_DENIED_LABEL);
    assert_eq!(child.kind(), NodeKind::File);
    assert_eq!(node.load_state(), LoadState::Loaded);
}

#[test]
fn test_other_error_substitution() {
    let mut node = Node::new("/mnt/usb", NodeKind::Folder);
    node.request_expand().unwrap();
    node.complete_load(Err(ExpandError::io(
        "/mnt/usb",
        io::Error::other("device removed"),
    )));

    assert_eq!(node.children().len(), 1);
    assert_eq!(node.children()[0].display_name(), "Error: device removed");
    assert_eq!(node.load_state(), LoadState::Loaded);
}

#[test]
fn test_file_nodes_never_expand() {
    let mut node = Node::new("/etc/hosts", NodeKind::File);
    for _ in 0..3 {
        assert!(node.request_expand().is_none());
    }
    assert!(node.children().is_empty());
    assert_eq!(node.load_state(), LoadState::NotLoaded);

    let mut marker = Node::marker(Marker::AccessDenied);
    assert!(marker.request_expand().is_none());
    assert!(!marker.reset());
    assert_eq!(marker.load_state(), LoadState::NotLoaded);
}

#[test]
fn test_re_expand_after_loaded_changes_nothing() {
    let mut node = Node::new("/d", NodeKind::Folder);
    node.request_expand().unwrap();
    node.complete_load(Ok(Listing::new(paths(&["/d/sub"]), paths(&["/d/f"]))));
    let before: Vec<_> = node.children().iter().map(|c| c.id()).collect();

    assert!(node.request_expand().is_none());

    let after: Vec<_> = node.children().iter().map(|c| c.id()).collect();
    assert_eq!(before, after);
    assert_eq!(node.load_state(), LoadState::Loaded);
}

#[test]
fn test_reset_allows_a_fresh_load() {
    let mut node = Node::new("/d", NodeKind::Folder);
    node.request_expand().unwrap();
    node.complete_load(Err(ExpandError::worker("boom")));
    assert_eq!(node.children()[0].display_name(), "Error: boom");

    assert!(node.reset());
    assert!(node.has_placeholder());
    assert!(node.request_expand().is_some());
}

#[test]
fn test_forest_find_reaches_loaded_children() {
    let mut forest = Forest::new();
    let mut root = Node::drive("/", "/");
    root.request_expand().unwrap();
    root.complete_load(Ok(Listing::new(paths(&["/usr", "/var"]), vec![])));
    let var = root.children()[1].id();
    forest.push(root);

    assert_eq!(forest.find(var).unwrap().display_name(), "var");
    assert_eq!(forest.stats().loaded, 1);
}

#[test]
fn test_default_config() {
    let config = BrowserConfig::default();
    assert!(config.follow_symlinks);
    assert!(config.channel_capacity > 0);
}
