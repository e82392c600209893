//! Local-disk backend.

use async_trait::async_trait;
use std::fs;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::entry::FileHandle;
use crate::errors::RenameError;
use crate::platform::rename_noreplace;

use super::FileSystem;
use super::helpers::rename_error;

/// Renames on the local filesystem without ever replacing an existing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for LocalFs {
    fn exists(&self, directory: &Path, name: &str) -> bool {
        fs::symlink_metadata(directory.join(name)).is_ok()
    }

    async fn rename(
        &self,
        handle: &FileHandle,
        new_name: &str,
        cancel: &CancellationToken,
    ) -> Result<FileHandle, RenameError> {
        // The syscall itself cannot be interrupted; cancellation only applies before it is issued.
        if cancel.is_cancelled() {
            return Err(RenameError::Cancelled);
        }
        let src = handle.path().to_path_buf();
        let dst = handle.sibling(new_name).into_path();
        trace!(src = %src.display(), dst = %dst.display(), "issuing rename");

        let joined = tokio::task::spawn_blocking(move || {
            let res = rename_noreplace(&src, &dst);
            (src, dst, res)
        })
        .await;

        match joined {
            Ok((_, dst, Ok(()))) => Ok(FileHandle::new(dst)),
            Ok((src, dst, Err(e))) => Err(rename_error(&src, &dst, e)),
            Err(e) => Err(RenameError::Failed {
                path: handle.path().to_path_buf(),
                reason: format!("rename worker failed: {e}"),
            }),
        }
    }

    fn is_directory(&self, handle: &FileHandle) -> bool {
        fs::symlink_metadata(handle.path())
            .map(|m| m.file_type().is_dir())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[tokio::test]
    async fn rename_in_place_returns_new_handle() {
        let dir = assert_fs::TempDir::new().unwrap();
        let f = dir.child("a.txt");
        f.write_str("hello").unwrap();

        let fs = LocalFs::new();
        let h = FileHandle::new(f.path());
        let new = fs
            .rename(&h, "b.txt", &CancellationToken::new())
            .await
            .expect("rename should succeed");

        assert_eq!(new.path(), dir.child("b.txt").path());
        assert!(!f.path().exists());
        assert!(fs.exists(dir.path(), "b.txt"));
    }

    #[tokio::test]
    async fn rename_refuses_to_clobber() {
        let dir = assert_fs::TempDir::new().unwrap();
        dir.child("a").write_str("a").unwrap();
        dir.child("b").write_str("b").unwrap();

        let fs = LocalFs::new();
        let err = fs
            .rename(&FileHandle::new(dir.child("a").path()), "b", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RenameError::TargetExists(_)), "got {err:?}");
        assert_eq!(std::fs::read_to_string(dir.child("b").path()).unwrap(), "b");
    }

    #[tokio::test]
    async fn cancelled_token_skips_rename() {
        let dir = assert_fs::TempDir::new().unwrap();
        dir.child("a").write_str("a").unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let err = LocalFs::new()
            .rename(&FileHandle::new(dir.child("a").path()), "z", &token)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(dir.child("a").path().exists());
    }

    #[test]
    fn directory_and_prefix_queries() {
        let dir = assert_fs::TempDir::new().unwrap();
        let sub = dir.child("sub");
        sub.create_dir_all().unwrap();
        let file = sub.child("f");
        file.touch().unwrap();

        let fs = LocalFs::new();
        let hd = FileHandle::new(sub.path());
        let hf = FileHandle::new(file.path());
        assert!(fs.is_directory(&hd));
        assert!(!fs.is_directory(&hf));
        assert!(fs.has_prefix(&hf, &hd));
        assert!(!fs.has_prefix(&hd, &hf));
        assert!(!fs.has_prefix(&hd, &hd));
    }
}
