//! lazytree - browse drives and folders as a lazily loaded tree.
//!
//! Usage:
//!   lazytree [PATH...]        Launch interactive TUI (drives when no path given)
//!   lazytree list [PATH]      Expand a folder headlessly and print the tree
//!   lazytree drives           Print the drives found on this machine
//!   lazytree --help           Show help

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing::level_filters::LevelFilter;

use lazytree_core::{BrowserConfig, LoadState, Marker, Node};
use lazytree_fs::TreeController;
use lazytree_tui::TuiConfig;

#[derive(Parser)]
#[command(
    name = "lazytree",
    version,
    about = "Browse the filesystem as a tree that loads on demand",
    long_about = "lazytree shows every drive as a root and lists a folder only when you \
                  expand it.\n\n\
                  Launch the interactive TUI by running `lazytree`, or use \
                  subcommands for headless listings."
)]
struct Cli {
    /// Folders to browse instead of the drive list
    paths: Vec<PathBuf>,

    /// Theme name (dark, light, or a file in the themes directory)
    #[arg(short, long)]
    theme: Option<String>,

    /// Settings file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Explicit log level, overriding -v
    #[arg(long, global = true)]
    log_level: Option<LevelFilter>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Expand a folder through the tree controller and print it
    List {
        /// Folder to list
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Levels to expand below the folder
        #[arg(short, long, default_value = "1")]
        depth: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the drives shown as roots
    Drives {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Where log lines go.
enum LogTarget {
    Stderr,
    /// The TUI owns the terminal, so it logs to a file.
    File(PathBuf),
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let level = cli.log_level.unwrap_or_else(|| verbosity_level(cli.verbose));

    let settings = match &cli.config {
        Some(path) => TuiConfig::load_from(path),
        None => TuiConfig::load(),
    }
    .context("Failed to load settings")?;

    match cli.command {
        Some(Command::List {
            path,
            depth,
            format,
        }) => {
            init_logging(level, LogTarget::Stderr)?;
            run_list(&path, depth, format, &settings.browser)?;
        }
        Some(Command::Drives { format }) => {
            init_logging(level, LogTarget::Stderr)?;
            run_drives(format, &settings.browser)?;
        }
        None => {
            if let Some(log_path) = tui_log_path() {
                init_logging(level, LogTarget::File(log_path))?;
            }

            let paths = cli
                .paths
                .iter()
                .map(|p| p.canonicalize().with_context(|| format!("Invalid path: {}", p.display())))
                .collect::<Result<Vec<_>>>()?;

            let config = match cli.theme {
                Some(theme) => settings.with_theme(theme),
                None => settings,
            };
            lazytree_tui::run(config, paths)?;
        }
    }

    Ok(())
}

fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn tui_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("lazytree").join("lazytree.log"))
}

fn init_logging(level: LevelFilter, target: LogTarget) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_max_level(level);

    match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).init(),
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Cannot create log directory {}", parent.display()))?;
            }
            let file = File::create(&path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
    }

    Ok(())
}

/// Expand a folder headlessly and print the resulting tree.
fn run_list(path: &Path, depth: usize, format: OutputFormat, config: &BrowserConfig) -> Result<()> {
    let path = path.canonicalize().context("Invalid path")?;

    let rt = tokio::runtime::Runtime::new()?;
    let controller = rt.block_on(async {
        let mut controller = TreeController::local(config);
        controller.open(path.clone());
        controller.expand_to_depth(depth).await;
        controller
    });

    match format {
        OutputFormat::Text => {
            for root in controller.roots() {
                println!("{}", path.display());
                print_children(root, 1);
            }

            let stats = controller.forest().stats();
            println!();
            println!(
                " {} nodes, {} folders loaded, {} markers",
                stats.total_nodes, stats.loaded, stats.markers
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(controller.forest())?);
        }
    }

    Ok(())
}

/// Enumerate drives through the controller and print them.
fn run_drives(format: OutputFormat, config: &BrowserConfig) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let controller = rt.block_on(async {
        let mut controller = TreeController::local(config);
        controller.initialize_roots();
        controller.settle().await;
        controller
    });

    match format {
        OutputFormat::Text => {
            for root in controller.roots() {
                let path = root.path().map(|p| p.display().to_string()).unwrap_or_default();
                println!(" {:<24} {}", root.display_name(), path);
            }
            for warning in controller.warnings() {
                eprintln!("{}", warning.message);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(controller.roots())?);
        }
    }

    Ok(())
}

/// Print the loaded children of a node. Unloaded folders keep their expander.
fn print_children(node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);

    for child in node.children() {
        if child.marker_kind() == Some(&Marker::Placeholder) {
            continue;
        }
        let marker = match (child.is_expandable(), child.load_state()) {
            (true, LoadState::Loaded) => "▼ ",
            (true, _) => "▶ ",
            (false, _) => "  ",
        };
        let suffix = if child.is_expandable() { "/" } else { "" };
        println!("{indent}{marker}{}{suffix}", child.display_name());

        if child.load_state() == LoadState::Loaded {
            print_children(child, depth + 1);
        }
    }
}
