//! Unix implementations of platform helpers.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::fs::{MetadataExt, OpenOptionsExt, PermissionsExt};
use std::path::Path;

/// Open log file for appending; set 0600 only when creating a new file.
/// If the file already exists, we preserve its existing permissions to avoid
/// clobbering administrator adjustments (e.g. group-readable for log shipping).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let existed = path.exists();
    let f = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600) // applies on create
        .open(path)?;
    if !existed {
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(f)
}

/// Rename `src` to `dst`, failing with `AlreadyExists` instead of replacing `dst`.
///
/// Linux uses `renameat2(RENAME_NOREPLACE)`, which is atomic. Filesystems
/// without support (EINVAL/ENOSYS) and other Unixes fall back to a
/// check-then-rename, which can race with a concurrent creator of `dst`.
#[cfg(target_os = "linux")]
pub fn rename_noreplace(src: &Path, dst: &Path) -> io::Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_src = CString::new(src.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains null byte"))?;
    let c_dst = CString::new(dst.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains null byte"))?;

    let rc = unsafe {
        libc::syscall(
            libc::SYS_renameat2,
            libc::AT_FDCWD,
            c_src.as_ptr(),
            libc::AT_FDCWD,
            c_dst.as_ptr(),
            libc::RENAME_NOREPLACE,
        )
    };
    if rc == 0 {
        return Ok(());
    }
    let err = io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::EINVAL) | Some(libc::ENOSYS) => rename_checked(src, dst),
        // A case-only rename on a case-insensitive filesystem reports EEXIST for itself.
        Some(libc::EEXIST) if case_only_change(src, dst) => rename_case_only(src, dst),
        _ => Err(err),
    }
}

#[cfg(not(target_os = "linux"))]
pub fn rename_noreplace(src: &Path, dst: &Path) -> io::Result<()> {
    rename_checked(src, dst)
}

fn rename_checked(src: &Path, dst: &Path) -> io::Result<()> {
    if fs::symlink_metadata(dst).is_ok() {
        if case_only_change(src, dst) {
            return rename_case_only(src, dst);
        }
        return Err(already_exists(dst));
    }
    fs::rename(src, dst)
}

/// Rename between two names of one inode, then confirm the old name is gone
/// from the directory listing (two hard links `a` and `A` stay put otherwise).
fn rename_case_only(src: &Path, dst: &Path) -> io::Result<()> {
    fs::rename(src, dst)?;
    let (Some(dir), Some(old)) = (src.parent(), src.file_name()) else {
        return Ok(());
    };
    let still_listed = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .any(|e| e.file_name() == old);
    if still_listed {
        return Err(already_exists(dst));
    }
    Ok(())
}

fn already_exists(dst: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("{} already exists", dst.display()),
    )
}

/// `src` and `dst` name the same inode through names that differ only by case.
/// A hard link under another name does not count: `rename(2)` between two
/// links of one inode succeeds without doing anything.
fn case_only_change(src: &Path, dst: &Path) -> bool {
    let (Some(a), Some(b)) = (src.file_name(), dst.file_name()) else {
        return false;
    };
    src.parent() == dst.parent()
        && a != b
        && a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
        && same_file(src, dst)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::symlink_metadata(a), fs::symlink_metadata(b)) {
        (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
        _ => false,
    }
}
