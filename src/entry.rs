//! Planned rename value objects.

use std::fmt;
use std::path::{Path, PathBuf};

/// Location-based handle to a filesystem object.
///
/// A handle is only valid until the object it points at is renamed; a
/// successful rename hands back a fresh handle for the new location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileHandle(PathBuf);

impl FileHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Handle of the sibling called `name` (same parent directory).
    pub fn sibling(&self, name: &str) -> Self {
        match self.0.parent() {
            Some(parent) => Self(parent.join(name)),
            None => Self(PathBuf::from(name)),
        }
    }

    pub fn into_path(self) -> PathBuf {
        self.0
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<PathBuf> for FileHandle {
    fn from(p: PathBuf) -> Self {
        Self(p)
    }
}

impl From<&Path> for FileHandle {
    fn from(p: &Path) -> Self {
        Self(p.to_path_buf())
    }
}

/// One planned rename: `directory/old_name` becomes `directory/new_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub handle: FileHandle,
    pub directory: PathBuf,
    pub old_name: String,
    pub new_name: String,
    /// Opaque correlation token owned by the caller.
    pub row_id: Option<u64>,
}

impl Entry {
    /// Plan a rename of `directory/old_name` to `directory/new_name`.
    pub fn new(
        directory: impl Into<PathBuf>,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        let directory = directory.into();
        let old_name = old_name.into();
        Self {
            handle: FileHandle::new(directory.join(&old_name)),
            directory,
            old_name,
            new_name: new_name.into(),
            row_id: None,
        }
    }

    pub fn with_row(mut self, row_id: u64) -> Self {
        self.row_id = Some(row_id);
        self
    }

    pub fn source_path(&self) -> PathBuf {
        self.directory.join(&self.old_name)
    }

    pub fn target_path(&self) -> PathBuf {
        self.directory.join(&self.new_name)
    }

    /// True when the rename would leave the name as it is.
    pub fn is_noop(&self) -> bool {
        self.old_name == self.new_name
    }

    /// The entry that reverts this one once it has been applied.
    pub fn inverted(&self, current: FileHandle) -> Self {
        Self {
            handle: current,
            directory: self.directory.clone(),
            old_name: self.new_name.clone(),
            new_name: self.old_name.clone(),
            row_id: self.row_id,
        }
    }
}

/// Replace the `from` prefix of `path` with `to`; None when `path` is not under `from`.
pub(crate) fn rebase(path: &Path, from: &Path, to: &Path) -> Option<PathBuf> {
    let rel = path.strip_prefix(from).ok()?;
    if rel.as_os_str().is_empty() {
        Some(to.to_path_buf())
    } else {
        Some(to.join(rel))
    }
}
