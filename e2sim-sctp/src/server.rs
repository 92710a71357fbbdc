//! Listening side of the SCTP transport
//!
//! Used when the node waits for the RIC to connect in, and for the RIC end
//! of loopback runs.

use std::mem;
use std::net::{SocketAddr, ToSocketAddrs};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use libc::{c_int, sockaddr, sockaddr_storage, socklen_t};
use tracing::{debug, info};

use crate::association::{Result, SctpError, SctpSocket};
use crate::sys;

const LISTEN_BACKLOG: c_int = 128;

/// A bound and listening one-to-one SCTP socket
#[derive(Debug)]
pub struct SctpListener {
    fd: OwnedFd,
    local_addr: SocketAddr,
}

impl SctpListener {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

/// Binds and listens on `bind_addr:port`.
///
/// `port` must lie in 1..=65535. Callers treat any error as a startup
/// failure.
pub fn start_server(bind_addr: &str, port: u32) -> Result<SctpListener> {
    let port = u16::try_from(port)
        .ok()
        .filter(|p| *p != 0)
        .ok_or(SctpError::InvalidPort(port))?;

    let target = format!("{bind_addr}:{port}");
    let addr = (bind_addr, port)
        .to_socket_addrs()
        .map_err(|source| SctpError::Resolve {
            target: target.clone(),
            source,
        })?
        .next()
        .ok_or_else(|| SctpError::ConnectFailed {
            target,
            reason: "no address resolved".to_string(),
        })?;

    let fd = sys::sctp_socket(&addr).map_err(SctpError::SocketCreation)?;
    let reuse: c_int = 1;
    sys::setsockopt(&fd, libc::SOL_SOCKET, libc::SO_REUSEADDR, &reuse).map_err(SctpError::SockoptFailed)?;

    sys::bind(&fd, &addr).map_err(SctpError::BindFailed)?;
    if unsafe { libc::listen(fd.as_raw_fd(), LISTEN_BACKLOG) } < 0 {
        return Err(SctpError::ListenFailed(std::io::Error::last_os_error()));
    }

    let local_addr = sys::local_addr(&fd).map_err(SctpError::SockoptFailed)?;
    info!("SCTP server listening on {}", local_addr);
    Ok(SctpListener { fd, local_addr })
}

/// Blocks until a peer connects.
pub fn accept(listener: &SctpListener) -> Result<(SctpSocket, SocketAddr)> {
    let mut storage: sockaddr_storage = unsafe { mem::zeroed() };
    let mut len = mem::size_of::<sockaddr_storage>() as socklen_t;
    let fd = unsafe {
        libc::accept(
            listener.fd.as_raw_fd(),
            &mut storage as *mut _ as *mut sockaddr,
            &mut len,
        )
    };
    if fd < 0 {
        return Err(SctpError::AcceptFailed(std::io::Error::last_os_error()));
    }
    let fd = unsafe { OwnedFd::from_raw_fd(fd) };
    let peer = sys::from_sockaddr(&storage, len).ok_or_else(|| {
        SctpError::AcceptFailed(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "unknown peer address family",
        ))
    })?;

    debug!("Accepted SCTP association from {}", peer);
    Ok((SctpSocket::from_fd(fd, Some(peer)), peer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_zero_rejected() {
        assert!(matches!(start_server("127.0.0.1", 0), Err(SctpError::InvalidPort(0))));
    }

    #[test]
    fn test_port_out_of_range_rejected() {
        assert!(matches!(
            start_server("127.0.0.1", 70000),
            Err(SctpError::InvalidPort(70000))
        ));
    }
}
