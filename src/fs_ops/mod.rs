//! Filesystem backend abstraction used by the rename engine.
//!
//! The engine never touches `std::fs` directly: existence queries, in-place
//! renames and containment tests all go through [`FileSystem`], so callers can
//! plug in a remote or simulated backend.

mod helpers;
mod local;

pub use helpers::{io_error_with_help, rename_error};
pub use local::LocalFs;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use crate::entry::FileHandle;
use crate::errors::RenameError;

#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Whether `directory/name` currently exists (symlinks are not followed).
    fn exists(&self, directory: &Path, name: &str) -> bool;

    /// Rename the object behind `handle` in place to `new_name` (same directory).
    /// Must not replace an existing object; returns the handle of the new location.
    ///
    /// The executor stops waiting only for permits. Once this call is awaited,
    /// `cancel` is honoured only if the backend checks it: return
    /// [`RenameError::Cancelled`] when it is set before the rename is issued, and
    /// stop any long wait when it fires. A backend that ignores it holds the
    /// batch open until the call returns.
    async fn rename(
        &self,
        handle: &FileHandle,
        new_name: &str,
        cancel: &CancellationToken,
    ) -> Result<FileHandle, RenameError>;

    fn is_directory(&self, handle: &FileHandle) -> bool;

    fn path_of(&self, handle: &FileHandle) -> PathBuf {
        handle.path().to_path_buf()
    }

    /// True when `a` lies strictly beneath `b`.
    fn has_prefix(&self, a: &FileHandle, b: &FileHandle) -> bool {
        let (pa, pb) = (self.path_of(a), self.path_of(b));
        pa != pb && pa.starts_with(&pb)
    }
}
