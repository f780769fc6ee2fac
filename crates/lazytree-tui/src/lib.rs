//! Terminal user interface for lazytree.
//!
//! This crate draws the lazily loaded tree kept by
//! [`lazytree_fs::TreeController`] and turns key presses into expand
//! requests. Listing results are applied on the event loop, so the tree is
//! only ever mutated from one place.
//!
//! # Usage
//!
//! ```rust,no_run
//! use lazytree_tui::TuiConfig;
//!
//! let config = TuiConfig::load().unwrap_or_default();
//! lazytree_tui::run(config, Vec::new()).unwrap();
//! ```
//!
//! # Keyboard Navigation
//!
//! - `j`/`k` - Move down/up
//! - `l`/`Enter` - Expand (lists the folder the first time)
//! - `h` - Collapse, or go to the parent
//! - `R` - Reload the selected folder
//! - `t` - Toggle theme
//! - `?` - Help
//! - `q` - Quit

pub mod app;
mod event;
mod settings;
mod theme;
mod ui;

use std::path::PathBuf;

pub use app::{App, AppMode, AppResult};
pub use event::KeyAction;
pub use settings::{ConfigError, TuiConfig};
pub use theme::{Theme, ThemeError};

/// Run the TUI application.
///
/// With no `paths` the drives are shown as roots.
pub fn run(config: TuiConfig, paths: Vec<PathBuf>) -> AppResult<()> {
    let rt = tokio::runtime::Runtime::new()?;

    let terminal = ratatui::init();
    let result = rt.block_on(App::new(config).with_start_paths(paths).run(terminal));
    ratatui::restore();

    // Listings still running are abandoned
    rt.shutdown_timeout(std::time::Duration::from_millis(100));

    result
}
