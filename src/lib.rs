//! Open file descriptor listing and socket option access.
//!
//! [`list_open_fds`] reports the descriptor numbers a process has open, using
//! libproc on macOS and `/proc/<pid>/fd` on Linux. [`sockopt`] reads and
//! writes socket options by descriptor number, and [`descriptor`] inspects
//! individual descriptors.

pub mod cli;
pub mod descriptor;
pub mod error;
pub mod fds;
pub mod output;
pub mod sockopt;

pub use descriptor::{FileDescriptor, FileKind, SocketHelper, fds_of};
pub use error::FiledesError;
pub use fds::list_open_fds;
pub use sockopt::{SockOptValue, get_socket_option, set_socket_option};
