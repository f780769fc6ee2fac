//! Main application state and logic.

mod constants;
mod render;

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use ratatui::{DefaultTerminal, Frame};

use lazytree_core::NodeId;
use lazytree_fs::{ExpandDisposition, TreeController};

use crate::TuiConfig;
use crate::event::KeyAction;
use crate::theme::Theme;
use crate::ui::{TreeState, VisibleItem, VisibleNodeKind, flatten};

use self::constants::{PAGE_SIZE, TICK_INTERVAL_MS};
use self::render::{RenderContext, render_app};

/// Application result type.
pub type AppResult<T> = color_eyre::Result<T>;

/// Application mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    #[default]
    Normal,
    Help,
    Quit,
}

/// Main application state.
pub struct App {
    /// Owns the node tree; only mutated on the loop thread.
    controller: TreeController,
    /// Tree view state.
    tree_state: TreeState,
    /// Color theme.
    theme: Theme,
    /// Directory file themes are read from.
    themes_dir: PathBuf,
    /// Themes `t` cycles through.
    theme_names: Vec<String>,
    /// Current mode.
    mode: AppMode,
    /// Explicit folders to show instead of the drive list.
    start_paths: Vec<PathBuf>,
    /// Whether a redraw is needed.
    needs_redraw: bool,
}

impl App {
    /// Create an app browsing the local filesystem.
    pub fn new(config: TuiConfig) -> Self {
        let themes_dir = config.resolved_themes_dir();
        let theme = Theme::load_or_default(&config.theme, &themes_dir);
        Self::with_controller(TreeController::local(&config.browser), theme)
            .with_themes_dir(themes_dir)
    }

    /// Create an app over an existing controller.
    pub fn with_controller(controller: TreeController, theme: Theme) -> Self {
        Self {
            controller,
            tree_state: TreeState::new(),
            theme,
            themes_dir: PathBuf::new(),
            theme_names: Theme::BUILT_IN.iter().map(|name| name.to_string()).collect(),
            mode: AppMode::Normal,
            start_paths: Vec::new(),
            needs_redraw: true,
        }
    }

    /// Browse these folders instead of the drive list.
    pub fn with_start_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.start_paths = paths;
        self
    }

    /// Offer the theme files in `dir` alongside the built-ins.
    pub fn with_themes_dir(mut self, dir: PathBuf) -> Self {
        self.theme_names = Theme::available(&dir);
        self.themes_dir = dir;
        self
    }

    /// Current mode.
    pub fn mode(&self) -> AppMode {
        self.mode
    }

    /// Current theme.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// The controller driving the tree.
    pub fn controller(&self) -> &TreeController {
        &self.controller
    }

    /// Tree view state.
    pub fn tree_state(&self) -> &TreeState {
        &self.tree_state
    }

    /// Rows currently visible.
    pub fn visible_items(&self) -> Vec<VisibleItem> {
        flatten(self.controller.roots(), &self.tree_state)
    }

    /// Populate the roots: the start paths if any, otherwise the drives.
    pub fn start(&mut self) {
        if self.start_paths.is_empty() {
            self.controller.initialize_roots();
        } else {
            for path in std::mem::take(&mut self.start_paths) {
                self.controller.open(path);
            }
        }
    }

    /// Run the main event loop.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> AppResult<()> {
        self.start();

        let period = Duration::from_millis(TICK_INTERVAL_MS);
        let mut interval = tokio::time::interval(period);
        let mut events = EventStream::new();

        while self.mode != AppMode::Quit {
            if self.needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                self.needs_redraw = false;
            }

            tokio::select! {
                biased;

                Some(Ok(event)) = events.next() => {
                    match event {
                        Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                            self.handle_action(KeyAction::from_key_event(key_event));
                        }
                        Event::Resize(..) => {}
                        _ => continue,
                    }
                    self.needs_redraw = true;
                }

                Some(event) = self.controller.next_event() => {
                    self.controller.apply(event);
                    // Drain whatever else finished meanwhile before redrawing
                    self.controller.apply_pending();
                    self.needs_redraw = true;
                }

                _ = interval.tick() => {}
            }
        }

        Ok(())
    }

    /// Handle a key action.
    pub fn handle_action(&mut self, action: KeyAction) {
        if self.mode == AppMode::Help {
            if matches!(
                action,
                KeyAction::ToggleHelp | KeyAction::Cancel | KeyAction::Quit
            ) {
                self.mode = AppMode::Normal;
            } else if action == KeyAction::ForceQuit {
                self.mode = AppMode::Quit;
            }
            return;
        }

        let items = self.visible_items();
        let len = items.len();

        match action {
            KeyAction::MoveUp => self.tree_state.move_up(1),
            KeyAction::MoveDown => self.tree_state.move_down(1, len),
            KeyAction::PageUp => self.tree_state.move_up(PAGE_SIZE),
            KeyAction::PageDown => self.tree_state.move_down(PAGE_SIZE, len),
            KeyAction::JumpToTop => self.tree_state.jump_to_top(),
            KeyAction::JumpToBottom => self.tree_state.jump_to_bottom(len),
            KeyAction::Expand => {
                if let Some(item) = items.get(self.tree_state.selected) {
                    self.expand(item);
                }
            }
            KeyAction::Collapse => {
                if let Some(item) = items.get(self.tree_state.selected) {
                    self.collapse(item);
                }
            }
            KeyAction::Reload => {
                if let Some(item) = items.get(self.tree_state.selected) {
                    self.reload(item.id);
                }
            }
            KeyAction::ToggleTheme => {
                self.theme = self.theme.cycle(&self.theme_names, &self.themes_dir);
                tracing::debug!(theme = %self.theme.name, "theme changed");
            }
            KeyAction::ToggleHelp => self.mode = AppMode::Help,
            KeyAction::Quit | KeyAction::ForceQuit => self.mode = AppMode::Quit,
            KeyAction::Cancel | KeyAction::None => {}
        }
    }

    /// Open a folder or drive. The first open loads it; later opens only show it.
    fn expand(&mut self, item: &VisibleItem) {
        match item.kind {
            VisibleNodeKind::Drive { .. } | VisibleNodeKind::Folder { .. } => {
                self.tree_state.open(item.id);
                let disposition = self.controller.on_expand(item.id);
                tracing::trace!(node = item.id.0, ?disposition, "expand");
            }
            VisibleNodeKind::File | VisibleNodeKind::Marker { .. } => {}
        }
    }

    /// Close an open node, or move to its parent. Never unloads children.
    fn collapse(&mut self, item: &VisibleItem) {
        if self.tree_state.close(item.id) {
            return;
        }
        if let Some(parent) = item.parent {
            self.tree_state.selected = parent;
        }
    }

    /// List a node again. Its old subtree is gone, so open ids under it are dropped.
    fn reload(&mut self, id: NodeId) {
        if self.controller.force_reload(id) == ExpandDisposition::Dispatched {
            self.tree_state.open(id);
            let controller = &self.controller;
            self.tree_state
                .retain_open(|open| controller.node(open).is_some());
        }
    }

    /// Render the application.
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let buf = frame.buffer_mut();
        self.render_to_buffer(area, buf);
    }

    fn render_to_buffer(&mut self, area: Rect, buf: &mut Buffer) {
        let ctx = RenderContext {
            mode: self.mode,
            theme: &self.theme,
            roots: self.controller.roots(),
            in_flight: self.controller.pending(),
            warnings: self.controller.warnings().len(),
        };
        render_app(&ctx, &mut self.tree_state, area, buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.render_to_buffer(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use lazytree_core::{BrowserConfig, ExpandError, Listing, LoadState};
    use lazytree_fs::DirectorySource;

    use super::*;

    struct FixedSource;

    impl DirectorySource for FixedSource {
        fn volumes(&self) -> std::io::Result<Vec<PathBuf>> {
            Ok(vec![PathBuf::from("/")])
        }

        fn volume_label(&self, path: &Path) -> std::io::Result<String> {
            Ok(path.display().to_string())
        }

        fn list(&self, path: &Path) -> Result<Listing, ExpandError> {
            if path == Path::new("/") {
                Ok(Listing::new(
                    vec![PathBuf::from("/home")],
                    vec![PathBuf::from("/notes.txt")],
                ))
            } else {
                Ok(Listing::default())
            }
        }
    }

    async fn started_app() -> App {
        let controller = TreeController::new(FixedSource, &BrowserConfig::default());
        let mut app = App::with_controller(controller, Theme::dark());
        app.start();
        app.controller.settle().await;
        app
    }

    #[tokio::test]
    async fn test_expand_opens_and_loads_drive() {
        let mut app = started_app().await;
        assert_eq!(app.visible_items().len(), 1);

        app.handle_action(KeyAction::Expand);
        app.controller.settle().await;

        let names: Vec<_> = app.visible_items().into_iter().map(|i| i.name).collect();
        assert_eq!(names, ["/", "home", "notes.txt"]);
        assert_eq!(app.controller.roots()[0].load_state(), LoadState::Loaded);
    }

    #[tokio::test]
    async fn test_collapse_hides_but_keeps_children() {
        let mut app = started_app().await;
        app.handle_action(KeyAction::Expand);
        app.controller.settle().await;

        app.handle_action(KeyAction::Collapse);
        assert_eq!(app.visible_items().len(), 1);
        assert_eq!(app.controller.roots()[0].children().len(), 2);

        // Re-opening does not list again
        app.handle_action(KeyAction::Expand);
        assert!(app.controller.is_idle());
        assert_eq!(app.visible_items().len(), 3);
    }

    #[tokio::test]
    async fn test_collapse_on_child_selects_parent() {
        let mut app = started_app().await;
        app.handle_action(KeyAction::Expand);
        app.controller.settle().await;

        app.handle_action(KeyAction::JumpToBottom);
        assert_eq!(app.tree_state().selected, 2);
        app.handle_action(KeyAction::Collapse);
        assert_eq!(app.tree_state().selected, 0);
    }

    #[tokio::test]
    async fn test_expand_on_file_does_nothing() {
        let mut app = started_app().await;
        app.handle_action(KeyAction::Expand);
        app.controller.settle().await;

        app.handle_action(KeyAction::JumpToBottom);
        app.handle_action(KeyAction::Expand);
        assert!(app.controller.is_idle());
        assert_eq!(app.visible_items().len(), 3);
    }

    #[tokio::test]
    async fn test_reload_forgets_dropped_open_nodes() {
        let mut app = started_app().await;
        app.handle_action(KeyAction::Expand);
        app.controller.settle().await;
        app.handle_action(KeyAction::MoveDown);
        app.handle_action(KeyAction::Expand);
        app.controller.settle().await;
        assert_eq!(app.tree_state().open_count(), 2);

        app.handle_action(KeyAction::JumpToTop);
        app.handle_action(KeyAction::Reload);
        assert_eq!(app.tree_state().open_count(), 1);
        assert!(app.tree_state().is_open(app.controller.roots()[0].id()));

        app.controller.settle().await;
        let names: Vec<_> = app.visible_items().into_iter().map(|i| i.name).collect();
        assert_eq!(names, ["/", "home", "notes.txt"]);
    }

    #[tokio::test]
    async fn test_theme_cycle_keeps_file_theme() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("ocean.toml"),
            "background = \"#001f3f\"\nforeground = \"#ffffff\"\nmuted = \"#7f8c8d\"\n\
             accent = \"#39cccc\"\nerror = \"#ff4136\"\nselected_bg = \"#0074d9\"\n",
        )
        .unwrap();

        let controller = TreeController::new(FixedSource, &BrowserConfig::default());
        let theme = Theme::load("ocean", dir.path()).unwrap();
        let mut app =
            App::with_controller(controller, theme).with_themes_dir(dir.path().to_path_buf());

        let mut seen = Vec::new();
        for _ in 0..3 {
            app.handle_action(KeyAction::ToggleTheme);
            seen.push(app.theme().name.clone());
        }
        assert_eq!(seen, ["dark", "light", "ocean"]);
    }

    #[tokio::test]
    async fn test_help_mode_swallows_keys() {
        let mut app = started_app().await;
        app.handle_action(KeyAction::ToggleHelp);
        assert_eq!(app.mode(), AppMode::Help);

        app.handle_action(KeyAction::MoveDown);
        app.handle_action(KeyAction::Quit);
        assert_eq!(app.mode(), AppMode::Normal);

        app.handle_action(KeyAction::Quit);
        assert_eq!(app.mode(), AppMode::Quit);
    }

    #[tokio::test]
    async fn test_toggle_theme() {
        let mut app = started_app().await;
        app.handle_action(KeyAction::ToggleTheme);
        assert_eq!(app.theme().name, "light");
        app.handle_action(KeyAction::ToggleTheme);
        assert_eq!(app.theme().name, "dark");
    }

    #[tokio::test]
    async fn test_render_shows_in_flight_count() {
        let mut app = started_app().await;
        app.handle_action(KeyAction::Expand);

        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        (&mut app).render(area, &mut buf);

        let header: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert!(header.contains("lazytree"));
        assert!(header.contains("1 loading"));
        app.controller.settle().await;
    }
}
