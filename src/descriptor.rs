//! Inspection of individual descriptors, local or belonging to another process.

use std::cell::OnceCell;
use std::fmt;
use std::io;
use std::mem;
use std::os::fd::{AsRawFd, RawFd};

use serde::Serialize;

use crate::error::FiledesError;
use crate::fds::list_open_fds;
use crate::sockopt::{SockOptValue, get_socket_option, set_socket_option};

const S_IFMT: u32 = 0o170000;
const S_IFWHT: u32 = 0o160000;

/// File type of a descriptor, derived from the `st_mode` type bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileKind {
    AnonInode,
    Block,
    Character,
    Directory,
    Fifo,
    Symlink,
    Regular,
    Socket,
    Whiteout,
    Unknown(u32),
}

impl FileKind {
    pub fn from_mode(mode: u32) -> Self {
        let fmt = mode & S_IFMT;
        match fmt {
            0 => Self::AnonInode,
            S_IFWHT => Self::Whiteout,
            f if f == libc::S_IFBLK as u32 => Self::Block,
            f if f == libc::S_IFCHR as u32 => Self::Character,
            f if f == libc::S_IFDIR as u32 => Self::Directory,
            f if f == libc::S_IFIFO as u32 => Self::Fifo,
            f if f == libc::S_IFLNK as u32 => Self::Symlink,
            f if f == libc::S_IFREG as u32 => Self::Regular,
            f if f == libc::S_IFSOCK as u32 => Self::Socket,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AnonInode => "anon_inode",
            Self::Block => "block",
            Self::Character => "character",
            Self::Directory => "directory",
            Self::Fifo => "fifo",
            Self::Symlink => "symlink",
            Self::Regular => "regular",
            Self::Socket => "socket",
            Self::Whiteout => "whiteout",
            Self::Unknown(bits) => return write!(f, "unknown (0{bits:o})"),
        };
        f.write_str(name)
    }
}

impl Serialize for FileKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The subset of `struct stat` we report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FdStat {
    pub mode: u32,
    pub dev: u64,
    pub ino: u64,
    pub size: i64,
}

impl FdStat {
    fn from_raw(st: &libc::stat) -> Self {
        Self {
            mode: st.st_mode as u32,
            dev: st.st_dev as u64,
            ino: st.st_ino as u64,
            size: st.st_size as i64,
        }
    }
}

/// A descriptor number, optionally qualified by the process that owns it.
///
/// Descriptors of the calling process are inspected with `fstat(2)`; those of
/// other processes through `/proc/<pid>/fd/<fd>`. The stat result is cached.
#[derive(Debug)]
pub struct FileDescriptor {
    fd: RawFd,
    pid: Option<u32>,
    stat: OnceCell<FdStat>,
}

impl FileDescriptor {
    pub fn new(fd: RawFd, pid: Option<u32>) -> Self {
        Self {
            fd,
            pid,
            stat: OnceCell::new(),
        }
    }

    /// Wrap a descriptor held by the calling process.
    pub fn of(obj: &impl AsRawFd) -> Self {
        Self::new(obj.as_raw_fd(), None)
    }

    pub fn fd(&self) -> RawFd {
        self.fd
    }

    /// The owning pid; the calling process when none was given.
    pub fn pid(&self) -> u32 {
        self.pid.unwrap_or_else(std::process::id)
    }

    pub fn is_local(&self) -> bool {
        self.pid.is_none_or(|pid| pid == std::process::id())
    }

    pub fn stat(&self) -> Result<FdStat, FiledesError> {
        if let Some(st) = self.stat.get() {
            return Ok(*st);
        }
        let st = if self.is_local() {
            fstat_fd(self.fd)?
        } else {
            stat_pid_fd(self.pid(), self.fd)?
        };
        Ok(*self.stat.get_or_init(|| st))
    }

    pub fn mode(&self) -> Result<u32, FiledesError> {
        Ok(self.stat()?.mode)
    }

    pub fn kind(&self) -> Result<FileKind, FiledesError> {
        Ok(FileKind::from_mode(self.mode()?))
    }

    /// Socket option access, if this descriptor is a socket.
    pub fn socket(&self) -> Result<SocketHelper, FiledesError> {
        match self.kind()? {
            FileKind::Socket => Ok(SocketHelper { fd: self.fd }),
            other => Err(FiledesError::NotASocket {
                fd: self.fd,
                kind: other.to_string(),
            }),
        }
    }
}

impl AsRawFd for FileDescriptor {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl PartialEq<RawFd> for FileDescriptor {
    fn eq(&self, other: &RawFd) -> bool {
        self.fd == *other
    }
}

impl fmt::Display for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let locality = if self.is_local() { "local" } else { "remote" };
        match self.kind() {
            Ok(kind) => write!(f, "<{locality} {kind} file #{}>", self.fd),
            Err(_) => write!(f, "<{locality} file #{}>", self.fd),
        }
    }
}

/// Socket options of a single descriptor.
#[derive(Debug, Clone, Copy)]
pub struct SocketHelper {
    fd: RawFd,
}

impl SocketHelper {
    pub fn set_option(
        &self,
        level: libc::c_int,
        option: libc::c_int,
        value: impl Into<SockOptValue>,
    ) -> Result<(), FiledesError> {
        set_socket_option(self.fd, level, option, &value.into())
    }

    pub fn get_option(
        &self,
        level: libc::c_int,
        option: libc::c_int,
        bufsize: usize,
    ) -> Result<SockOptValue, FiledesError> {
        get_socket_option(self.fd, level, option, bufsize)
    }

    pub fn set_reuse(&self, value: bool) -> Result<(), FiledesError> {
        self.set_option(libc::SOL_SOCKET, libc::SO_REUSEADDR, value)
    }

    pub fn get_reuse(&self) -> Result<bool, FiledesError> {
        let v = self.get_option(libc::SOL_SOCKET, libc::SO_REUSEADDR, 0)?;
        Ok(v.as_int().is_some_and(|v| v != 0))
    }
}

/// List the open descriptors of `pid` wrapped for inspection.
pub fn fds_of(pid: Option<u32>) -> Result<Vec<FileDescriptor>, FiledesError> {
    Ok(list_open_fds(pid)?
        .into_iter()
        .map(|fd| FileDescriptor::new(fd, pid))
        .collect())
}

fn fstat_fd(fd: RawFd) -> Result<FdStat, FiledesError> {
    let mut st: libc::stat = unsafe { mem::zeroed() };
    if unsafe { libc::fstat(fd, &mut st) } < 0 {
        return Err(FiledesError::last_os_query(format!("fstat(fd {fd})")));
    }
    Ok(FdStat::from_raw(&st))
}

#[cfg(target_os = "linux")]
fn stat_pid_fd(pid: u32, fd: RawFd) -> Result<FdStat, FiledesError> {
    let path = format!("{}/{fd}", crate::fds::linux::fd_dir_path(pid));
    let c_path = std::ffi::CString::new(path.as_str()).map_err(|e| FiledesError::QueryFailed {
        context: format!("stat({path})"),
        source: io::Error::new(io::ErrorKind::InvalidInput, e),
    })?;
    let mut st: libc::stat = unsafe { mem::zeroed() };
    if unsafe { libc::stat(c_path.as_ptr(), &mut st) } < 0 {
        return Err(FiledesError::last_os_query(format!("stat({path})")));
    }
    Ok(FdStat::from_raw(&st))
}

#[cfg(not(target_os = "linux"))]
fn stat_pid_fd(pid: u32, fd: RawFd) -> Result<FdStat, FiledesError> {
    Err(FiledesError::QueryFailed {
        context: format!("stat of fd {fd} in pid {pid}"),
        source: io::Error::new(
            io::ErrorKind::Unsupported,
            "descriptors of other processes cannot be inspected on this platform",
        ),
    })
}
