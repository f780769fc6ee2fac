//! Filesystem access behind a trait.

use std::fs::{self, DirEntry};
use std::io;
use std::path::{Path, PathBuf};

use sysinfo::Disks;

use lazytree_core::{BrowserConfig, ExpandError, Listing};

/// The OS calls the browser needs.
///
/// Implementations are called from worker threads and may block.
pub trait DirectorySource: Send + Sync + 'static {
    /// Mounted volumes or logical drives, in the order the OS reports them.
    fn volumes(&self) -> io::Result<Vec<PathBuf>>;

    /// Display label for a volume. Fails when the volume cannot be read.
    fn volume_label(&self, path: &Path) -> io::Result<String>;

    /// Immediate subdirectories and files of `path`, each group in OS order.
    fn list(&self, path: &Path) -> Result<Listing, ExpandError>;
}

/// [`DirectorySource`] backed by the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalSource {
    follow_symlinks: bool,
    extra_roots: Vec<PathBuf>,
}

impl LocalSource {
    /// Create a source with default settings.
    pub fn new() -> Self {
        Self::from_config(&BrowserConfig::default())
    }

    /// Create a source honouring the given configuration.
    pub fn from_config(config: &BrowserConfig) -> Self {
        Self {
            follow_symlinks: config.follow_symlinks,
            extra_roots: config.extra_roots.clone(),
        }
    }

    fn is_directory(&self, entry: &DirEntry) -> bool {
        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => true,
            Ok(file_type) if file_type.is_symlink() && self.follow_symlinks => {
                // Broken links stay files.
                fs::metadata(entry.path()).is_ok_and(|m| m.is_dir())
            }
            Ok(_) => false,
            Err(err) => {
                tracing::debug!(path = %entry.path().display(), error = %err, "unknown file type");
                false
            }
        }
    }
}

impl Default for LocalSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectorySource for LocalSource {
    fn volumes(&self) -> io::Result<Vec<PathBuf>> {
        let disks = Disks::new_with_refreshed_list();
        let mut volumes: Vec<PathBuf> = Vec::new();

        for disk in disks.list() {
            let mount = disk.mount_point().to_path_buf();
            if !volumes.contains(&mount) {
                volumes.push(mount);
            }
        }

        if volumes.is_empty() {
            volumes = fallback_volumes();
        }

        for root in &self.extra_roots {
            if !volumes.contains(root) {
                volumes.push(root.clone());
            }
        }

        Ok(volumes)
    }

    fn volume_label(&self, path: &Path) -> io::Result<String> {
        let metadata = fs::metadata(path)?;
        if !metadata.is_dir() {
            return Err(io::Error::other(format!(
                "{} is not a directory",
                path.display()
            )));
        }

        let label = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => path.display().to_string(),
        };
        Ok(label)
    }

    fn list(&self, path: &Path) -> Result<Listing, ExpandError> {
        let entries = fs::read_dir(path).map_err(|e| ExpandError::io(path, e))?;
        let mut listing = Listing::default();

        for entry in entries {
            let entry = entry.map_err(|e| ExpandError::io(path, e))?;
            if self.is_directory(&entry) {
                listing.directories.push(entry.path());
            } else {
                listing.files.push(entry.path());
            }
        }

        Ok(listing)
    }
}

/// Volumes to show when the disk list comes back empty (containers, sandboxes).
#[cfg(unix)]
fn fallback_volumes() -> Vec<PathBuf> {
    vec![PathBuf::from("/")]
}

#[cfg(windows)]
fn fallback_volumes() -> Vec<PathBuf> {
    (b'A'..=b'Z')
        .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
        .filter(|drive| drive.exists())
        .collect()
}

#[cfg(not(any(unix, windows)))]
fn fallback_volumes() -> Vec<PathBuf> {
    Vec::new()
}
