// Platform-independent decoding shared by the descriptor providers.
//
// Kept free of syscalls so the record decoding and the directory-entry
// filtering can be exercised on any host.

use std::ffi::OsStr;
use std::mem;
use std::os::fd::RawFd;
use std::os::unix::ffi::OsStrExt;

use crate::error::FiledesError;

/// One entry of the `PROC_PIDLISTFDS` array, as laid out by `<sys/proc_info.h>`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ProcFdInfo {
    pub proc_fd: i32,
    pub proc_fdtype: u32,
}

pub const PROC_PIDLISTFD_SIZE: usize = mem::size_of::<ProcFdInfo>();

const _: () = assert!(PROC_PIDLISTFD_SIZE == 8);

/// Decode the descriptor numbers from a packed `proc_fdinfo` array.
///
/// Only whole records are decoded; trailing bytes that do not make up a full
/// record are ignored. Kernel order is preserved.
pub fn decode_fdinfo_records(buf: &[u8]) -> Vec<RawFd> {
    buf.chunks_exact(PROC_PIDLISTFD_SIZE)
        .map(|record| {
            // The byte buffer carries no alignment guarantee for the struct.
            let info: ProcFdInfo =
                unsafe { std::ptr::read_unaligned(record.as_ptr() as *const ProcFdInfo) };
            info.proc_fd
        })
        .collect()
}

/// Run the two-call `PROC_PIDLISTFDS` protocol over `query`.
///
/// `query(None)` returns the size the kernel wants; `query(Some(buf))` fills
/// `buf` and returns the bytes written, which may be fewer than were sized.
/// The buffer is owned here and freed on every path.
pub fn list_with_sizing<Q>(mut query: Q) -> Result<Vec<RawFd>, FiledesError>
where
    Q: FnMut(Option<&mut [u8]>) -> Result<usize, FiledesError>,
{
    let size = query(None)?;
    log::trace!("PROC_PIDLISTFDS needs {size} bytes");
    if size == 0 {
        return Ok(Vec::new());
    }

    let mut buffer: Vec<u8> = Vec::new();
    buffer.try_reserve_exact(size).map_err(|e| {
        FiledesError::ResourceExhausted(format!("fdinfo buffer of {size} bytes: {e}"))
    })?;
    buffer.resize(size, 0);

    let used = query(Some(buffer.as_mut_slice()))?.min(size);
    if used % PROC_PIDLISTFD_SIZE != 0 {
        log::trace!("ignoring {} trailing bytes", used % PROC_PIDLISTFD_SIZE);
    }

    Ok(decode_fdinfo_records(&buffer[..used]))
}

/// Parse a `/proc/<pid>/fd` entry name: ASCII digits only, nothing else.
pub fn parse_fd_name(name: &[u8]) -> Option<RawFd> {
    if name.is_empty() || !name.iter().all(u8::is_ascii_digit) {
        return None;
    }
    name.iter().try_fold(0 as RawFd, |acc, &b| {
        acc.checked_mul(10)?.checked_add(RawFd::from(b - b'0'))
    })
}

/// `.` and `..` (and anything else dot-prefixed) are not descriptors.
fn is_hidden(name: &OsStr) -> bool {
    name.as_bytes().first() == Some(&b'.')
}

/// Turn a lazy sequence of directory entry names into descriptor numbers.
///
/// Dot-prefixed names and `self_fd` (the descriptor doing the scan) are
/// filtered out. The first read error or unparsable name aborts the whole
/// collection; no partial list is returned.
pub fn collect_fd_entries<I, S>(entries: I, self_fd: RawFd) -> Result<Vec<RawFd>, FiledesError>
where
    I: IntoIterator<Item = std::io::Result<S>>,
    S: AsRef<OsStr>,
{
    entries
        .into_iter()
        .filter(|entry| !matches!(entry, Ok(name) if is_hidden(name.as_ref())))
        .map(|entry| {
            let name = entry.map_err(|source| FiledesError::QueryFailed {
                context: "reading descriptor directory".to_string(),
                source,
            })?;
            let name = name.as_ref();
            parse_fd_name(name.as_bytes()).ok_or_else(|| {
                FiledesError::ProtocolViolation(format!(
                    "descriptor entry {:?} is not a decimal number",
                    name
                ))
            })
        })
        .filter(|fd| {
            let own = matches!(fd, Ok(fd) if *fd == self_fd);
            if own {
                log::trace!("skipping scan descriptor {self_fd}");
            }
            !own
        })
        .collect()
}
