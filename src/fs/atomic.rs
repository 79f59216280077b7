//! Atomic whole-file replacement.
//!
//! This module implements a TOCTOU-safe sequence using directory handles:
//! `open_dir(parent) -> openat(tmp, O_EXCL) -> write+fsync -> renameat(tmp, final) -> fsync(dirfd)`.
//! Readers observe either the previous document or the new one, never a prefix.
//!
//! The parent directory may itself be a symlink (a state directory on shared
//! storage). It is resolved once when opened; every later step goes through
//! the dirfd, and the final component is never followed.
use std::ffi::CString;
use std::fs;
use std::io::Write as _;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::TMP_SUFFIX;
use rustix::fd::OwnedFd;
use rustix::fs::{openat, renameat, unlinkat, AtFlags, Mode, OFlags, CWD};
use rustix::io::Errno;

fn errno_to_io(e: Errno) -> std::io::Error {
    std::io::Error::from_raw_os_error(e.raw_os_error())
}

fn invalid_input(msg: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, msg.to_string())
}

// Global counter to produce unique temporary names within a process.
static NEXT_TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Open a directory with `O_DIRECTORY` for atomic operations, following a symlinked `dir`.
///
/// # Errors
///
/// Returns an IO error if the directory cannot be opened.
pub fn open_dir(dir: &Path) -> std::io::Result<OwnedFd> {
    let c = CString::new(dir.as_os_str().as_bytes()).map_err(|_| invalid_input("invalid path"))?;
    openat(
        CWD,
        c.as_c_str(),
        OFlags::RDONLY | OFlags::DIRECTORY | OFlags::CLOEXEC,
        Mode::empty(),
    )
    .map_err(errno_to_io)
}

/// Fsync the parent directory of `path` for durability.
///
/// # Errors
///
/// Returns an IO error if the parent directory cannot be opened or fsynced.
pub fn fsync_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        let dir = fs::File::open(parent)?;
        dir.sync_all()?;
    }
    Ok(())
}

/// Fsync a directory using an already-open directory file descriptor.
///
/// This avoids a TOCTOU window from re-opening the directory by path.
fn fsync_dirfd(dirfd: &OwnedFd) -> std::io::Result<()> {
    rustix::fs::fsync(dirfd).map_err(errno_to_io)
}

/// Replace `path` with `bytes` atomically and durably.
///
/// The payload is staged in a uniquely named sibling, fsynced, renamed over
/// the destination and the parent directory is fsynced. On any failure the
/// staging file is removed and the destination is left as it was.
///
/// # Errors
///
/// Returns an IO error if staging, renaming or syncing fails.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let fname = path
        .file_name()
        .ok_or_else(|| invalid_input("path has no file name"))?;
    let pid = std::process::id();
    let ctr = NEXT_TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(".{}.{pid}.{ctr}{TMP_SUFFIX}", fname.to_string_lossy());

    let dirfd = open_dir(parent)?;
    let tmp_c = CString::new(tmp_name.as_str()).map_err(|_| invalid_input("invalid cstring"))?;
    let new_c = CString::new(fname.as_bytes()).map_err(|_| invalid_input("invalid cstring"))?;

    let fd = openat(
        &dirfd,
        tmp_c.as_c_str(),
        OFlags::WRONLY | OFlags::CREATE | OFlags::EXCL | OFlags::CLOEXEC | OFlags::NOFOLLOW,
        Mode::RUSR | Mode::WUSR,
    )
    .map_err(errno_to_io)?;
    let mut file = fs::File::from(fd);
    let staged = file.write_all(bytes).and_then(|()| file.sync_all());
    drop(file);
    if let Err(e) = staged {
        let _ = unlinkat(&dirfd, tmp_c.as_c_str(), AtFlags::empty());
        return Err(e);
    }

    if let Err(e) = renameat(&dirfd, tmp_c.as_c_str(), &dirfd, new_c.as_c_str()) {
        let _ = unlinkat(&dirfd, tmp_c.as_c_str(), AtFlags::empty());
        return Err(errno_to_io(e));
    }
    fsync_dirfd(&dirfd)
}
