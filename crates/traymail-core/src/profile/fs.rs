//! Filesystem seam used by profile validation.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::expand::expand_placeholders;

/// The filesystem queries profile validation needs.
pub trait FileSystem {
    /// Returns true if something exists at `path`.
    fn path_exists(&self, path: &Path) -> bool;

    /// Returns true if `path` is a directory.
    fn is_directory(&self, path: &Path) -> bool;

    /// Names of the entries directly inside `path`.
    ///
    /// An unreadable directory has no entries.
    fn list_entries(&self, path: &Path) -> Vec<String>;

    /// The user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;

    /// Value of an environment variable.
    fn env_var(&self, name: &str) -> Option<String>;

    /// Expand platform placeholders in a typed path.
    ///
    /// # Errors
    ///
    /// Returns the name of the first placeholder without a value.
    fn expand(&self, raw: &str) -> Result<PathBuf, String> {
        expand_placeholders(raw, || self.home_dir(), |name| self.env_var(name))
    }
}

/// The real filesystem and process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFileSystem;

impl FileSystem for SystemFileSystem {
    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_entries(&self, path: &Path) -> Vec<String> {
        match std::fs::read_dir(path) {
            Ok(entries) => entries
                .filter_map(std::result::Result::ok)
                .filter_map(|entry| entry.file_name().into_string().ok())
                .collect(),
            Err(e) => {
                debug!("Cannot list {}: {e}", path.display());
                Vec::new()
            }
        }
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    fn env_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory filesystem for testing.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    dirs: BTreeSet<PathBuf>,
    files: BTreeSet<PathBuf>,
    home: Option<PathBuf>,
    vars: HashMap<String, String>,
}

impl MemoryFileSystem {
    /// Create an empty filesystem with no home directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the home directory (it is not created).
    #[must_use]
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Set an environment variable.
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Create a directory and its ancestors.
    #[must_use]
    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.add_dir(path.as_ref());
        self
    }

    /// Create a file and its ancestor directories.
    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files.insert(path.to_path_buf());
        self
    }

    fn add_dir(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }
}

impl FileSystem for MemoryFileSystem {
    fn path_exists(&self, path: &Path) -> bool {
        self.dirs.contains(path) || self.files.contains(path)
    }

    fn is_directory(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    fn list_entries(&self, path: &Path) -> Vec<String> {
        self.dirs
            .iter()
            .chain(self.files.iter())
            .filter(|entry| entry.parent() == Some(path))
            .filter_map(|entry| entry.file_name()?.to_str().map(str::to_string))
            .collect()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }

    fn env_var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
