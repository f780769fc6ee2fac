use std::collections::HashSet;
use std::fs;

use tempfile::TempDir;

use lazytree_fs::{BrowserConfig, LoadState, Node, NodeKind, TreeController};

fn create_test_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::create_dir(root.join("dir1")).unwrap();
    fs::create_dir(root.join("dir2")).unwrap();
    fs::create_dir(root.join("dir1/subdir")).unwrap();

    fs::write(root.join("file1.txt"), "hello").unwrap();
    fs::write(root.join("file2.txt"), "world").unwrap();
    fs::write(root.join("dir1/nested.txt"), "nested").unwrap();

    temp
}

#[tokio::test]
async fn test_local_listing_puts_directories_first() {
    let temp = create_test_tree();
    let mut tree = TreeController::local(&BrowserConfig::default());
    let id = tree.open(temp.path());

    tree.on_expand(id);
    tree.settle().await;

    let node = tree.node(id).unwrap();
    assert_eq!(node.load_state(), LoadState::Loaded);
    assert_eq!(node.children().len(), 4);

    let kinds: Vec<_> = node.children().iter().map(Node::kind).collect();
    assert_eq!(
        kinds,
        [NodeKind::Folder, NodeKind::Folder, NodeKind::File, NodeKind::File]
    );

    let dirs: HashSet<_> = node.children()[..2]
        .iter()
        .map(Node::display_name)
        .collect();
    assert_eq!(dirs, HashSet::from(["dir1", "dir2"]));
}

#[tokio::test]
async fn test_local_expand_nested_folder() {
    let temp = create_test_tree();
    let mut tree = TreeController::local(&BrowserConfig::default());
    let id = tree.open(temp.path());

    tree.expand_to_depth(1).await;

    let root = tree.node(id).unwrap();
    let dir1 = root
        .children()
        .iter()
        .find(|c| c.display_name() == "dir1")
        .unwrap();
    let names: Vec<_> = dir1.children().iter().map(Node::display_name).collect();
    assert_eq!(names, ["subdir", "nested.txt"]);
}

#[tokio::test]
async fn test_local_missing_directory_shows_error() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("vanished");
    let mut tree = TreeController::local(&BrowserConfig::default());
    let id = tree.open(&missing);

    tree.on_expand(id);
    tree.settle().await;

    let node = tree.node(id).unwrap();
    assert_eq!(node.children().len(), 1);
    assert!(node.children()[0].display_name().starts_with("Error: "));
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinked_directory_follows_config() {
    let temp = create_test_tree();
    let link_home = TempDir::new().unwrap();
    std::os::unix::fs::symlink(temp.path().join("dir2"), link_home.path().join("link")).unwrap();

    let mut following = TreeController::local(&BrowserConfig::default());
    let id = following.open(link_home.path());
    following.on_expand(id);
    following.settle().await;
    assert_eq!(
        following.node(id).unwrap().children()[0].kind(),
        NodeKind::Folder
    );

    let config = BrowserConfig::builder().follow_symlinks(false).build().unwrap();
    let mut plain = TreeController::local(&config);
    let id = plain.open(link_home.path());
    plain.on_expand(id);
    plain.settle().await;
    assert_eq!(plain.node(id).unwrap().children()[0].kind(), NodeKind::File);
}

#[tokio::test]
async fn test_local_roots_are_drives() {
    let temp = TempDir::new().unwrap();
    let config = BrowserConfig::builder()
        .extra_roots(vec![temp.path().to_path_buf()])
        .build()
        .unwrap();
    let mut tree = TreeController::local(&config);

    tree.initialize_roots();
    tree.settle().await;

    assert!(!tree.roots().is_empty());
    assert!(tree.roots().iter().all(|r| r.kind() == NodeKind::Drive));
    assert!(
        tree.roots()
            .iter()
            .any(|r| r.path() == Some(temp.path()))
    );
}
