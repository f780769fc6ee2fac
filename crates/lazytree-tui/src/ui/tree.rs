//! Directory tree widget.

use std::collections::HashSet;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, StatefulWidget, Widget};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use lazytree_core::{Marker, Node, NodeId, NodeKind};

use crate::theme::Theme;

/// State for the tree view.
#[derive(Debug, Default, Clone)]
pub struct TreeState {
    /// Currently selected index in the flattened view.
    pub selected: usize,
    /// Scroll offset.
    pub offset: usize,
    /// Nodes the user has opened. Purely visual: closing never unloads.
    open: HashSet<NodeId>,
}

impl TreeState {
    /// Create new tree state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a node as open.
    pub fn open(&mut self, id: NodeId) {
        self.open.insert(id);
    }

    /// Mark a node as closed. Returns whether it was open.
    pub fn close(&mut self, id: NodeId) -> bool {
        self.open.remove(&id)
    }

    /// Check if a node is open.
    pub fn is_open(&self, id: NodeId) -> bool {
        self.open.contains(&id)
    }

    /// Forget open nodes that `keep` rejects.
    pub fn retain_open(&mut self, mut keep: impl FnMut(NodeId) -> bool) {
        self.open.retain(|id| keep(*id));
    }

    /// Number of nodes marked open.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Move selection up.
    pub fn move_up(&mut self, count: usize) {
        self.selected = self.selected.saturating_sub(count);
    }

    /// Move selection down.
    pub fn move_down(&mut self, count: usize, max: usize) {
        self.selected = (self.selected + count).min(max.saturating_sub(1));
    }

    /// Jump to top.
    pub fn jump_to_top(&mut self) {
        self.selected = 0;
    }

    /// Jump to bottom.
    pub fn jump_to_bottom(&mut self, max: usize) {
        self.selected = max.saturating_sub(1);
    }

    /// Keep the selection inside a list of `len` items.
    pub fn clamp(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Ensure selected item is visible, adjusting offset if needed.
    pub fn ensure_visible(&mut self, viewport_height: usize) {
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + viewport_height {
            self.offset = self.selected - viewport_height + 1;
        }
    }
}

/// How a visible row should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibleNodeKind {
    Drive { open: bool },
    Folder { open: bool },
    File,
    Marker { error: bool },
}

/// A flattened visible row in the tree.
#[derive(Debug, Clone)]
pub struct VisibleItem {
    pub id: NodeId,
    pub name: String,
    pub kind: VisibleNodeKind,
    pub depth: usize,
    /// Index of the parent row, `None` for roots.
    pub parent: Option<usize>,
    pub is_last_sibling: bool,
    pub parent_last_siblings: Vec<bool>,
}

/// Flatten the forest into the rows currently visible.
///
/// Children of open nodes are included. The bare placeholder is skipped:
/// it only exists so closed nodes show an expander.
pub fn flatten(roots: &[Node], state: &TreeState) -> Vec<VisibleItem> {
    let mut items = Vec::new();
    let count = roots.len();
    for (i, root) in roots.iter().enumerate() {
        flatten_node(root, 0, None, i + 1 == count, Vec::new(), state, &mut items);
    }
    items
}

fn flatten_node(
    node: &Node,
    depth: usize,
    parent: Option<usize>,
    is_last: bool,
    parent_last_siblings: Vec<bool>,
    state: &TreeState,
    items: &mut Vec<VisibleItem>,
) {
    let is_open = state.is_open(node.id());
    let kind = match (node.kind(), node.marker_kind()) {
        (_, Some(marker)) => VisibleNodeKind::Marker {
            error: matches!(marker, Marker::AccessDenied | Marker::Error(_)),
        },
        (NodeKind::Drive, None) => VisibleNodeKind::Drive { open: is_open },
        (NodeKind::Folder, None) => VisibleNodeKind::Folder { open: is_open },
        (NodeKind::File, None) => VisibleNodeKind::File,
    };

    let index = items.len();
    items.push(VisibleItem {
        id: node.id(),
        name: node.display_name().to_string(),
        kind,
        depth,
        parent,
        is_last_sibling: is_last,
        parent_last_siblings: parent_last_siblings.clone(),
    });

    if !is_open || !node.is_expandable() {
        return;
    }

    let children: Vec<&Node> = node
        .children()
        .iter()
        .filter(|child| child.marker_kind() != Some(&Marker::Placeholder))
        .collect();
    let child_count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        let mut child_parent_lasts = parent_last_siblings.clone();
        // Roots have no connector of their own, so their children only indent.
        child_parent_lasts.push(depth == 0 || is_last);

        flatten_node(
            child,
            depth + 1,
            Some(index),
            i + 1 == child_count,
            child_parent_lasts,
            state,
            items,
        );
    }
}

/// Tree view widget.
pub struct TreeView<'a> {
    roots: &'a [Node],
    theme: &'a Theme,
    block: Option<Block<'a>>,
}

impl<'a> TreeView<'a> {
    /// Create a new tree view.
    pub fn new(roots: &'a [Node], theme: &'a Theme) -> Self {
        Self {
            roots,
            theme,
            block: None,
        }
    }

    /// Set the block (border) for the widget.
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl StatefulWidget for TreeView<'_> {
    type State = TreeState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner_area = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner_area.height == 0 || inner_area.width == 0 {
            return;
        }

        let items = flatten(self.roots, state);
        let viewport_height = inner_area.height as usize;

        state.clamp(items.len());
        state.ensure_visible(viewport_height);

        let start = state.offset;
        let end = (start + viewport_height).min(items.len());

        for (row_idx, item_idx) in (start..end).enumerate() {
            let item = &items[item_idx];
            let y = inner_area.y + row_idx as u16;

            let mut prefix = String::new();
            for &parent_is_last in item.parent_last_siblings.iter().skip(1) {
                prefix.push_str(if parent_is_last { "  " } else { "│ " });
            }
            if item.depth > 0 {
                prefix.push_str(if item.is_last_sibling { "└─" } else { "├─" });
            }

            let expand_indicator = match item.kind {
                VisibleNodeKind::Drive { open: true } | VisibleNodeKind::Folder { open: true } => {
                    "▼ "
                }
                VisibleNodeKind::Drive { open: false }
                | VisibleNodeKind::Folder { open: false } => "▶ ",
                _ => "  ",
            };

            let style = match item.kind {
                VisibleNodeKind::Drive { .. } => self.theme.drive,
                VisibleNodeKind::Folder { .. } => self.theme.directory,
                VisibleNodeKind::File => self.theme.file,
                VisibleNodeKind::Marker { error: true } => self.theme.error_marker,
                VisibleNodeKind::Marker { error: false } => self.theme.marker,
            };

            let used = prefix.width() + expand_indicator.width();
            let available = (inner_area.width as usize).saturating_sub(used);
            let name = truncate(&item.name, available);

            let line = Line::from(vec![
                Span::styled(prefix, self.theme.tree_lines),
                Span::styled(expand_indicator, Style::default().fg(self.theme.muted)),
                Span::styled(name, style),
            ]);

            let line = if item_idx == state.selected {
                line.style(self.theme.selected)
            } else {
                line
            };

            let line_area = Rect::new(inner_area.x, y, inner_area.width, 1);
            Widget::render(line, line_area, buf);
        }
    }
}

/// Cut `text` to `width` display columns, marking the cut with an ellipsis.
fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}
