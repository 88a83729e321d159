//! Socket option access by raw descriptor number.
//!
//! Thin wrappers over `getsockopt(2)` / `setsockopt(2)`. Values are either a
//! C `int` or an opaque byte buffer, matching how the kernel treats them.

use std::io;
use std::mem;
use std::os::fd::RawFd;

use crate::error::FiledesError;

/// Largest buffer `get_socket_option` will hand to the kernel.
pub const SOCKOPT_MAX_BUFLEN: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SockOptValue {
    Int(libc::c_int),
    Bytes(Vec<u8>),
}

impl SockOptValue {
    pub fn as_int(&self) -> Option<libc::c_int> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Int(_) => None,
            Self::Bytes(b) => Some(b),
        }
    }
}

impl From<libc::c_int> for SockOptValue {
    fn from(v: libc::c_int) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for SockOptValue {
    fn from(v: bool) -> Self {
        Self::Int(libc::c_int::from(v))
    }
}

impl From<Vec<u8>> for SockOptValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&[u8]> for SockOptValue {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

/// Read a socket option.
///
/// With `bufsize == 0` the option is read as an `int`. Otherwise a buffer of
/// `bufsize` bytes is passed to the kernel and returned whole.
pub fn get_socket_option(
    fd: RawFd,
    level: libc::c_int,
    option: libc::c_int,
    bufsize: usize,
) -> Result<SockOptValue, FiledesError> {
    if bufsize == 0 {
        let mut val: libc::c_int = 0;
        let mut len = mem::size_of::<libc::c_int>() as libc::socklen_t;
        let ret = unsafe {
            libc::getsockopt(
                fd,
                level,
                option,
                &mut val as *mut libc::c_int as *mut libc::c_void,
                &mut len,
            )
        };
        if ret < 0 {
            return Err(getsockopt_error());
        }
        return Ok(SockOptValue::Int(val));
    }

    if bufsize > SOCKOPT_MAX_BUFLEN {
        return Err(FiledesError::InvalidArgument(format!(
            "getsockopt buffer size {bufsize} out of range (max {SOCKOPT_MAX_BUFLEN})"
        )));
    }

    let mut buf = vec![0u8; bufsize];
    let mut len = bufsize as libc::socklen_t;
    let ret = unsafe {
        libc::getsockopt(
            fd,
            level,
            option,
            buf.as_mut_ptr() as *mut libc::c_void,
            &mut len,
        )
    };
    if ret < 0 {
        return Err(getsockopt_error());
    }
    log::trace!("getsockopt(fd {fd}, {level}, {option}): kernel wrote {len} of {bufsize} bytes");
    Ok(SockOptValue::Bytes(buf))
}

/// Write a socket option.
pub fn set_socket_option(
    fd: RawFd,
    level: libc::c_int,
    option: libc::c_int,
    value: &SockOptValue,
) -> Result<(), FiledesError> {
    let ret = match value {
        SockOptValue::Int(v) => unsafe {
            libc::setsockopt(
                fd,
                level,
                option,
                v as *const libc::c_int as *const libc::c_void,
                mem::size_of::<libc::c_int>() as libc::socklen_t,
            )
        },
        SockOptValue::Bytes(b) => {
            let len = libc::socklen_t::try_from(b.len()).map_err(|_| {
                FiledesError::InvalidArgument(format!(
                    "setsockopt value of {} bytes is too large",
                    b.len()
                ))
            })?;
            unsafe {
                libc::setsockopt(
                    fd,
                    level,
                    option,
                    b.as_ptr() as *const libc::c_void,
                    len,
                )
            }
        }
    };
    if ret < 0 {
        return Err(FiledesError::SocketOption {
            op: "setsockopt",
            source: io::Error::last_os_error(),
        });
    }
    Ok(())
}

fn getsockopt_error() -> FiledesError {
    FiledesError::SocketOption {
        op: "getsockopt",
        source: io::Error::last_os_error(),
    }
}
