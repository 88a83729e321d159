// Linux descriptor listing: scan /proc/<pid>/fd/.
//
// Each entry of the directory is named by the decimal descriptor number. The
// directory stream itself holds a descriptor while we read it, so that one is
// filtered out of the result.

use std::ffi::{CStr, CString, OsString};
use std::io;
use std::os::fd::RawFd;
use std::os::unix::ffi::OsStringExt;
use std::ptr::NonNull;

use crate::error::FiledesError;
use crate::fds::records::collect_fd_entries;

/// List the open descriptors of `pid` (the calling process when `None`).
pub fn list_open_fds(pid: Option<u32>) -> Result<Vec<RawFd>, FiledesError> {
    let pid = pid.unwrap_or_else(std::process::id);
    let path = fd_dir_path(pid);

    let dir = FdDir::open(&path)?;
    let self_fd = dir.raw_fd()?;
    log::trace!("scanning {path} through fd {self_fd}");

    let fds = collect_fd_entries(dir.entries(), self_fd)?;
    log::debug!("pid {pid}: {} open descriptors", fds.len());
    Ok(fds)
}

pub(crate) fn fd_dir_path(pid: u32) -> String {
    format!("/proc/{pid}/fd")
}

/// Owned `DIR*` stream, closed on drop.
struct FdDir {
    dir: NonNull<libc::DIR>,
}

impl FdDir {
    fn open(path: &str) -> Result<Self, FiledesError> {
        let c_path = CString::new(path).map_err(|e| FiledesError::QueryFailed {
            context: format!("opendir({path})"),
            source: io::Error::new(io::ErrorKind::InvalidInput, e),
        })?;
        let dir = unsafe { libc::opendir(c_path.as_ptr()) };
        NonNull::new(dir)
            .map(|dir| Self { dir })
            .ok_or_else(|| FiledesError::last_os_query(format!("opendir({path})")))
    }

    fn raw_fd(&self) -> Result<RawFd, FiledesError> {
        let fd = unsafe { libc::dirfd(self.dir.as_ptr()) };
        if fd < 0 {
            return Err(FiledesError::last_os_query("dirfd"));
        }
        Ok(fd)
    }

    fn entries(&self) -> Entries<'_> {
        Entries {
            dir: self,
            done: false,
        }
    }
}

impl Drop for FdDir {
    fn drop(&mut self) {
        unsafe { libc::closedir(self.dir.as_ptr()) };
    }
}

/// Lazy `readdir` sequence. Ends at the end of the stream or after the first
/// error.
struct Entries<'a> {
    dir: &'a FdDir,
    done: bool,
}

impl Iterator for Entries<'_> {
    type Item = io::Result<OsString>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // readdir signals errors only through errno, so clear it first.
        unsafe { *libc::__errno_location() = 0 };
        let entry = unsafe { libc::readdir(self.dir.dir.as_ptr()) };
        if entry.is_null() {
            self.done = true;
            let err = io::Error::last_os_error();
            return match err.raw_os_error() {
                Some(0) | None => None,
                Some(_) => Some(Err(err)),
            };
        }

        let name = unsafe { CStr::from_ptr((*entry).d_name.as_ptr()) };
        Some(Ok(OsString::from_vec(name.to_bytes().to_vec())))
    }
}
