// Platform-selected open descriptor listing.
//
// On macOS: libproc `proc_pidinfo(PROC_PIDLISTFDS)` (two-call sizing protocol).
// On Linux: scan of /proc/<pid>/fd/.
//
// Both platforms export:
//   - list_open_fds(pid: Option<u32>) -> Result<Vec<RawFd>, FiledesError>

pub mod records;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
pub use macos::list_open_fds;

#[cfg(target_os = "linux")]
pub(crate) mod linux;
#[cfg(target_os = "linux")]
pub use linux::list_open_fds;

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
compile_error!("filedes needs /proc/<pid>/fd (Linux) or libproc (macOS)");
