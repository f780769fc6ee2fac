//! Color themes for the TUI.
//!
//! Built-in dark and light themes use a slate palette based on Tailwind CSS
//! colors. Further themes are loaded by name from `<name>.toml` files in the
//! themes directory, each holding a palette of hex colors:
//!
//! ```toml
//! background = "#0f172a"
//! foreground = "#f1f5f9"
//! muted = "#64748b"
//! accent = "#60a5fa"
//! error = "#ef4444"
//! selected_bg = "#334155"
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a theme file.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// The theme file could not be read.
    #[error("Cannot read theme {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The theme file is not a valid palette.
    #[error("Invalid theme {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A palette entry is not a color.
    #[error("Invalid color {value:?} for {field}")]
    Color { field: &'static str, value: String },
}

/// Palette as written in a theme file.
#[derive(Debug, Clone, Deserialize)]
struct PaletteFile {
    background: String,
    foreground: String,
    muted: String,
    accent: String,
    error: String,
    selected_bg: String,
}

impl PaletteFile {
    fn resolve(&self) -> Result<Palette, ThemeError> {
        Ok(Palette {
            background: parse_color("background", &self.background)?,
            foreground: parse_color("foreground", &self.foreground)?,
            muted: parse_color("muted", &self.muted)?,
            accent: parse_color("accent", &self.accent)?,
            error: parse_color("error", &self.error)?,
            selected_bg: parse_color("selected_bg", &self.selected_bg)?,
        })
    }
}

fn parse_color(field: &'static str, value: &str) -> Result<Color, ThemeError> {
    Color::from_str(value).map_err(|_| ThemeError::Color {
        field,
        value: value.to_string(),
    })
}

/// The handful of colors every style is derived from.
#[derive(Debug, Clone, Copy)]
struct Palette {
    background: Color,
    foreground: Color,
    muted: Color,
    accent: Color,
    error: Color,
    selected_bg: Color,
}

/// Color theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Name the theme was selected by.
    pub name: String,

    // Base colors
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub error: Color,
    pub info: Color,

    // Interactive elements
    pub selected: Style,

    // UI elements
    pub border: Style,
    pub title: Style,
    pub help_key: Style,
    pub help_desc: Style,

    // Tree elements
    pub tree_lines: Style,
    pub drive: Style,
    pub directory: Style,
    pub file: Style,
    pub marker: Style,
    pub error_marker: Style,

    // Header/Footer
    pub header: Style,
    pub footer: Style,
}

impl Theme {
    /// Names of the themes that need no file.
    pub const BUILT_IN: [&'static str; 2] = ["dark", "light"];

    /// Dark theme using a slate-based palette.
    pub fn dark() -> Self {
        Self::from_palette(
            "dark",
            Palette {
                background: Color::Rgb(15, 23, 42),   // slate-900
                foreground: Color::Rgb(241, 245, 249), // slate-100
                muted: Color::Rgb(100, 116, 139),     // slate-500
                accent: Color::Rgb(96, 165, 250),     // blue-400
                error: Color::Rgb(239, 68, 68),       // red-500
                selected_bg: Color::Rgb(51, 65, 85),  // slate-700
            },
        )
    }

    /// Light theme using a slate-based palette.
    pub fn light() -> Self {
        Self::from_palette(
            "light",
            Palette {
                background: Color::Rgb(248, 250, 252), // slate-50
                foreground: Color::Rgb(15, 23, 42),    // slate-900
                muted: Color::Rgb(100, 116, 139),      // slate-500
                accent: Color::Rgb(29, 78, 216),       // blue-700
                error: Color::Rgb(220, 38, 38),        // red-600
                selected_bg: Color::Rgb(226, 232, 240), // slate-200
            },
        )
    }

    fn from_palette(name: &str, p: Palette) -> Self {
        Self {
            name: name.to_string(),
            background: p.background,
            foreground: p.foreground,
            muted: p.muted,
            error: p.error,
            info: p.accent,

            selected: Style::new()
                .bg(p.selected_bg)
                .fg(p.foreground)
                .add_modifier(Modifier::BOLD),

            border: Style::new().fg(p.muted),
            title: Style::new().fg(p.accent).add_modifier(Modifier::BOLD),
            help_key: Style::new().fg(p.accent).add_modifier(Modifier::BOLD),
            help_desc: Style::new().fg(p.muted),

            tree_lines: Style::new().fg(p.muted),
            drive: Style::new().fg(p.accent).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            directory: Style::new().fg(p.accent).add_modifier(Modifier::BOLD),
            file: Style::new().fg(p.foreground),
            marker: Style::new().fg(p.muted).add_modifier(Modifier::ITALIC),
            error_marker: Style::new().fg(p.error).add_modifier(Modifier::ITALIC),

            header: Style::new().bg(p.selected_bg).fg(p.foreground),
            footer: Style::new().bg(p.selected_bg).fg(p.muted),
        }
    }

    /// Look up a built-in theme.
    pub fn built_in(name: &str) -> Option<Self> {
        match name {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    /// Resolve a theme by name: a built-in, or `<dir>/<name>.toml`.
    pub fn load(name: &str, dir: &Path) -> Result<Self, ThemeError> {
        if let Some(theme) = Self::built_in(name) {
            return Ok(theme);
        }

        let path = dir.join(format!("{name}.toml"));
        let content = std::fs::read_to_string(&path).map_err(|source| ThemeError::Read {
            path: path.clone(),
            source,
        })?;
        let palette: PaletteFile =
            toml::from_str(&content).map_err(|source| ThemeError::Parse { path, source })?;

        Ok(Self::from_palette(name, palette.resolve()?))
    }

    /// Resolve a theme, falling back to dark when it cannot be loaded.
    pub fn load_or_default(name: &str, dir: &Path) -> Self {
        Self::load(name, dir).unwrap_or_else(|err| {
            tracing::warn!(theme = name, error = %err, "falling back to dark theme");
            Self::dark()
        })
    }

    /// Names of every selectable theme: the built-ins, then each `*.toml`
    /// file in `dir` in name order. An unreadable directory adds nothing.
    pub fn available(dir: &Path) -> Vec<String> {
        let mut files: Vec<String> = std::fs::read_dir(dir)
            .into_iter()
            .flatten()
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .filter(|name| !Self::BUILT_IN.contains(&name.as_str()))
            .collect();
        files.sort();

        Self::BUILT_IN
            .iter()
            .map(|name| name.to_string())
            .chain(files)
            .collect()
    }

    /// Switch to the theme after this one in `names`, wrapping around.
    ///
    /// A theme missing from `names` moves to the first entry.
    pub fn cycle(&self, names: &[String], dir: &Path) -> Self {
        let next = names
            .iter()
            .position(|name| *name == self.name)
            .map_or(0, |i| (i + 1) % names.len());
        match names.get(next) {
            Some(name) => Self::load_or_default(name, dir),
            None => Self::dark(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const OCEAN: &str = r##"
background = "#001f3f"
foreground = "#ffffff"
muted = "#7f8c8d"
accent = "#39cccc"
error = "#ff4136"
selected_bg = "#0074d9"
"##;

    #[test]
    fn test_built_in_themes_need_no_file() {
        let dir = TempDir::new().unwrap();
        for name in Theme::BUILT_IN {
            assert_eq!(Theme::load(name, dir.path()).unwrap().name, name);
        }
    }

    #[test]
    fn test_load_theme_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ocean.toml"), OCEAN).unwrap();

        let theme = Theme::load("ocean", dir.path()).unwrap();
        assert_eq!(theme.name, "ocean");
        assert_eq!(theme.background, Color::Rgb(0, 0x1f, 0x3f));
        assert_eq!(theme.info, Color::Rgb(0x39, 0xcc, 0xcc));
    }

    #[test]
    fn test_missing_theme_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = Theme::load("nope", dir.path()).unwrap_err();
        assert!(matches!(err, ThemeError::Read { .. }));
    }

    #[test]
    fn test_bad_color_is_rejected() {
        let dir = TempDir::new().unwrap();
        let broken = OCEAN.replace("#ff4136", "not-a-color");
        std::fs::write(dir.path().join("broken.toml"), broken).unwrap();

        let err = Theme::load("broken", dir.path()).unwrap_err();
        assert!(matches!(err, ThemeError::Color { field: "error", .. }));
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Theme::load_or_default("nope", dir.path()).name, "dark");
    }

    #[test]
    fn test_available_lists_built_ins_then_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ocean.toml"), OCEAN).unwrap();
        std::fs::write(dir.path().join("amber.toml"), OCEAN).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a theme").unwrap();

        assert_eq!(
            Theme::available(dir.path()),
            ["dark", "light", "amber", "ocean"]
        );
    }

    #[test]
    fn test_available_without_dir_is_built_ins() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Theme::available(&dir.path().join("missing")), Theme::BUILT_IN);
    }

    #[test]
    fn test_cycle_keeps_file_themes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ocean.toml"), OCEAN).unwrap();
        let names = Theme::available(dir.path());

        let mut theme = Theme::load("ocean", dir.path()).unwrap();
        let mut seen = Vec::new();
        for _ in 0..3 {
            theme = theme.cycle(&names, dir.path());
            seen.push(theme.name.clone());
        }
        assert_eq!(seen, ["dark", "light", "ocean"]);
    }
}
