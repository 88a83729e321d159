// macOS descriptor listing: libproc `proc_pidinfo(PROC_PIDLISTFDS)`.
//
// The query is made twice: once without a buffer to learn the size, then
// again to fill an exactly-sized buffer. The second call may report fewer
// bytes than the first if descriptors were closed in between.

use std::io;
use std::os::fd::RawFd;

use crate::error::FiledesError;
use crate::fds::records::list_with_sizing;

const PROC_PIDLISTFDS: libc::c_int = 1;

unsafe extern "C" {
    fn proc_pidinfo(
        pid: libc::c_int,
        flavor: libc::c_int,
        arg: u64,
        buffer: *mut libc::c_void,
        buffersize: libc::c_int,
    ) -> libc::c_int;
}

/// List the open descriptors of `pid` (the calling process when `None`).
pub fn list_open_fds(pid: Option<u32>) -> Result<Vec<RawFd>, FiledesError> {
    let pid = pid.unwrap_or_else(std::process::id);
    let c_pid = libc::c_int::try_from(pid).map_err(|_| FiledesError::QueryFailed {
        context: format!("proc_pidinfo(PROC_PIDLISTFDS) for pid {pid}"),
        source: io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"),
    })?;

    let fds = list_with_sizing(|buf| query_fds(c_pid, buf))?;
    log::debug!("pid {pid}: {} open descriptors", fds.len());
    Ok(fds)
}

/// One `PROC_PIDLISTFDS` call. With no buffer the return value is the size
/// the kernel wants; with a buffer it is the number of bytes written.
fn query_fds(pid: libc::c_int, buffer: Option<&mut [u8]>) -> Result<usize, FiledesError> {
    let (ptr, len) = match buffer {
        Some(buf) => (
            buf.as_mut_ptr() as *mut libc::c_void,
            libc::c_int::try_from(buf.len()).unwrap_or(libc::c_int::MAX),
        ),
        None => (std::ptr::null_mut(), 0),
    };

    // libproc reports failure as 0 with errno set, so a clean errno is what
    // tells "no descriptors" apart from "no such process".
    unsafe { *libc::__error() = 0 };
    let ret = unsafe { proc_pidinfo(pid, PROC_PIDLISTFDS, 0, ptr, len) };
    let failed = ret < 0 || (ret == 0 && io::Error::last_os_error().raw_os_error() != Some(0));
    if failed {
        return Err(FiledesError::last_os_query(format!(
            "proc_pidinfo(PROC_PIDLISTFDS) failed for pid {pid}"
        )));
    }
    Ok(ret as usize)
}
