//! End-to-end descriptor listing against the live process table.
//!
//! Everything runs inside one `#[test]` so no other test thread opens or
//! closes descriptors while the exact-set comparisons are made.
//!
//! Run with: `cargo test --test fd_snapshot`

#![cfg(any(target_os = "linux", target_os = "macos"))]

use std::collections::BTreeSet;
use std::fs::File;
use std::os::fd::{AsRawFd, RawFd};
use std::process::{Command, Stdio};

use filedes::{FiledesError, list_open_fds};

/// Descriptors that `fcntl(F_GETFD)` accepts, below `limit`.
fn fcntl_open_fds(limit: RawFd) -> BTreeSet<RawFd> {
    (0..limit)
        .filter(|fd| unsafe { libc::fcntl(*fd, libc::F_GETFD) } != -1)
        .collect()
}

fn listed_set(pid: Option<u32>) -> BTreeSet<RawFd> {
    let fds = list_open_fds(pid).expect("list_open_fds failed");
    let set: BTreeSet<RawFd> = fds.iter().copied().collect();
    assert_eq!(set.len(), fds.len(), "duplicate descriptors in {fds:?}");
    set
}

fn assert_matches_fcntl(listed: &BTreeSet<RawFd>) {
    let limit = listed.iter().max().map_or(0, |m| m + 1).max(1024);
    let expected = fcntl_open_fds(limit);
    assert_eq!(
        listed, &expected,
        "listed descriptors differ from the fcntl scan"
    );
}

fn scratch_file(tag: &str) -> (std::path::PathBuf, File) {
    let path = std::env::temp_dir().join(format!("filedes-{tag}-{}", std::process::id()));
    let file = File::create(&path).expect("create scratch file");
    (path, file)
}

#[test]
fn open_descriptor_snapshot() {
    // Listing matches the process's real descriptor table, so the descriptor
    // used for the scan itself is not reported.
    let baseline = listed_set(None);
    assert_matches_fcntl(&baseline);

    // No-argument and explicit own-pid listings agree, and repeat calls are stable.
    assert_eq!(listed_set(Some(std::process::id())), baseline);
    assert_eq!(listed_set(None), baseline);

    // Three new descriptors show up.
    let (path_a, a) = scratch_file("a");
    let (path_b, b) = scratch_file("b");
    let (path_c, c) = scratch_file("c");
    let (fd_a, fd_b, fd_c) = (a.as_raw_fd(), b.as_raw_fd(), c.as_raw_fd());

    let with_three = listed_set(None);
    assert_matches_fcntl(&with_three);
    let mut expected = baseline.clone();
    expected.extend([fd_a, fd_b, fd_c]);
    assert_eq!(with_three, expected);

    // Closing the middle one removes exactly that descriptor.
    drop(b);
    let after_close = listed_set(None);
    assert_matches_fcntl(&after_close);
    expected.remove(&fd_b);
    assert_eq!(after_close, expected);

    drop(a);
    drop(c);
    assert_eq!(listed_set(None), baseline);
    for path in [path_a, path_b, path_c] {
        std::fs::remove_file(path).ok();
    }

    // Another process: its standard streams are listed.
    let mut child = Command::new("sleep")
        .arg("30")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn sleep");
    let child_pid = child.id();
    let child_fds = listed_set(Some(child_pid));
    assert!(
        [0, 1, 2].iter().all(|fd| child_fds.contains(fd)),
        "child descriptors: {child_fds:?}"
    );
    child.kill().ok();
    child.wait().ok();

    // Once reaped, the pid is gone: an error, never an empty list.
    let err = list_open_fds(Some(child_pid)).unwrap_err();
    assert!(matches!(err, FiledesError::QueryFailed { .. }), "{err}");

    let err = list_open_fds(Some(i32::MAX as u32)).unwrap_err();
    assert!(matches!(err, FiledesError::QueryFailed { .. }), "{err}");
}
