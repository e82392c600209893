//! Windows implementations of platform helpers (best-effort).
//!
//! Notes:
//! - Windows lacks POSIX mode semantics; we do not attempt ACL management here.
//! - `std::fs::rename` replaces existing files on Windows, so the target is
//!   checked first; this can race with a concurrent creator of the target.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

/// Open log file for appending (best-effort; no symlink defense available via std on Windows).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Rename `src` to `dst`, failing with `AlreadyExists` instead of replacing `dst`.
pub fn rename_noreplace(src: &Path, dst: &Path) -> io::Result<()> {
    let case_only = src
        .to_string_lossy()
        .eq_ignore_ascii_case(&dst.to_string_lossy());
    if !case_only && fs::symlink_metadata(dst).is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", dst.display()),
        ));
    }
    fs::rename(src, dst)
}
