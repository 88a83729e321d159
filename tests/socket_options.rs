//! Socket option access through descriptor numbers found by listing.
//!
//! Run with: `cargo test --test socket_options`

#![cfg(any(target_os = "linux", target_os = "macos"))]

use std::net::{TcpListener, UdpSocket};
use std::os::fd::AsRawFd;

use filedes::{
    FileDescriptor, FileKind, SockOptValue, get_socket_option, list_open_fds, set_socket_option,
};

#[test]
fn listed_socket_is_reachable_by_number() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let fd = listener.as_raw_fd();
    assert!(list_open_fds(None).unwrap().contains(&fd));

    let desc = FileDescriptor::new(fd, None);
    assert_eq!(desc.kind().unwrap(), FileKind::Socket);

    let accepting = get_socket_option(fd, libc::SOL_SOCKET, libc::SO_ACCEPTCONN, 0).unwrap();
    assert_ne!(accepting, SockOptValue::Int(0));
}

#[test]
fn receive_buffer_size_can_be_changed() {
    let sock = UdpSocket::bind("127.0.0.1:0").unwrap();
    let fd = sock.as_raw_fd();

    let before = get_socket_option(fd, libc::SOL_SOCKET, libc::SO_RCVBUF, 0)
        .unwrap()
        .as_int()
        .unwrap();
    let wanted = if before > 16384 { 8192 } else { 65536 };
    set_socket_option(fd, libc::SOL_SOCKET, libc::SO_RCVBUF, &SockOptValue::Int(wanted)).unwrap();
    let after = get_socket_option(fd, libc::SOL_SOCKET, libc::SO_RCVBUF, 0)
        .unwrap()
        .as_int()
        .unwrap();
    assert_ne!(after, before);
}

#[test]
fn socket_helper_from_listing() {
    let sock = UdpSocket::bind("127.0.0.1:0").unwrap();
    let helper = FileDescriptor::of(&sock).socket().unwrap();

    helper.set_reuse(true).unwrap();
    assert!(helper.get_reuse().unwrap());

    let ty = helper.get_option(libc::SOL_SOCKET, libc::SO_TYPE, 0).unwrap();
    assert_eq!(ty, SockOptValue::Int(libc::SOCK_DGRAM));
}

#[test]
fn pipe_is_not_a_socket() {
    let mut fds = [0; 2];
    assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);

    let desc = FileDescriptor::new(fds[0], None);
    assert_eq!(desc.kind().unwrap(), FileKind::Fifo);
    assert!(matches!(
        desc.socket(),
        Err(filedes::FiledesError::NotASocket { .. })
    ));
    let err = get_socket_option(fds[0], libc::SOL_SOCKET, libc::SO_TYPE, 0).unwrap_err();
    assert_eq!(err.raw_os_error(), Some(libc::ENOTSOCK));

    unsafe {
        libc::close(fds[0]);
        libc::close(fds[1]);
    }
}
