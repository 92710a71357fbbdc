//! Client side SCTP association
//!
//! A one-to-one kernel SCTP socket used by the E2 node to reach the RIC.
//! Every SCTP message carries exactly one E2AP PDU, so no framing is added.

use std::io;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::os::fd::{AsRawFd, OwnedFd};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use libc::c_void;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::sys;

/// E2AP Payload Protocol Identifier (O-RAN E2GAP)
pub const E2AP_PPID: u32 = 70;
/// Default RIC E2 port
pub const DEFAULT_E2_PORT: u16 = 36421;
/// Largest message accepted by `receive`
pub const MAX_MESSAGE_SIZE: usize = 65536;

/// SCTP transport errors
#[derive(Debug, Error)]
pub enum SctpError {
    #[error("Socket creation failed: {0}")]
    SocketCreation(io::Error),
    #[error("Bind failed: {0}")]
    BindFailed(io::Error),
    #[error("Listen failed: {0}")]
    ListenFailed(io::Error),
    #[error("Accept failed: {0}")]
    AcceptFailed(io::Error),
    #[error("Connect to {target} failed: {reason}")]
    ConnectFailed { target: String, reason: String },
    #[error("Address resolution of {target} failed: {source}")]
    Resolve { target: String, source: io::Error },
    #[error("Send failed: {0}")]
    SendFailed(io::Error),
    #[error("Socket option failed: {0}")]
    SockoptFailed(io::Error),
    #[error("Invalid port {0}")]
    InvalidPort(u32),
    #[error("Association closed")]
    Closed,
}

/// Result type for SCTP operations
pub type Result<T> = std::result::Result<T, SctpError>;

/// Outcome of one blocking receive
#[derive(Debug)]
pub enum Received {
    /// One complete message
    Data(Vec<u8>),
    /// The receive timeout expired without data
    WouldBlock,
    /// A signal interrupted the call; not a connection failure
    Interrupted,
    /// The peer closed the association; the socket is already closed
    PeerClosed,
    /// Any other socket error
    Fatal(io::Error),
}

/// The byte-message transport an E2 connection runs over.
///
/// Implemented by the kernel SCTP socket and by in-memory peers in tests.
/// All methods take `&self`: the listener thread receives while the setup
/// helper and indication producers send.
pub trait E2Transport: Send + Sync {
    /// Sends one message in a single attempt.
    fn send(&self, data: &[u8]) -> Result<usize>;

    /// Blocks for at most the configured receive timeout.
    fn receive(&self) -> Received;

    /// Sets the receive timeout used by [`E2Transport::receive`].
    fn set_recv_timeout(&self, timeout: Duration) -> Result<()>;

    /// Closes the transport; pending and later receives report `PeerClosed`.
    fn close(&self);

    /// Remote endpoint, if connected
    fn peer_addr(&self) -> Option<SocketAddr>;
}

/// Kernel SCTP one-to-one socket
#[derive(Debug)]
pub struct SctpSocket {
    fd: OwnedFd,
    peer: Option<SocketAddr>,
    closed: AtomicBool,
}

impl SctpSocket {
    pub(crate) fn from_fd(fd: OwnedFd, peer: Option<SocketAddr>) -> Self {
        Self {
            fd,
            peer,
            closed: AtomicBool::new(false),
        }
    }

    /// Connects to `host:port`, trying every resolved address in order.
    ///
    /// `host` may be an IPv4 or IPv6 literal or a host name. Each candidate
    /// gets `timeout` to complete the association setup.
    pub fn connect_with_timeout(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        Self::connect_from(None, host, port, timeout)
    }

    /// Like [`SctpSocket::connect_with_timeout`], binding to `local` first.
    ///
    /// Candidates of a different address family than `local` are skipped.
    pub fn connect_from(local: Option<IpAddr>, host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let target = format!("{host}:{port}");
        let candidates: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|source| SctpError::Resolve {
                target: target.clone(),
                source,
            })?
            .collect();

        let mut last_error = String::from("no address resolved");
        for addr in candidates {
            debug!("Connecting to SCTP endpoint {}", addr);
            if local.is_some_and(|ip| ip.is_ipv4() != addr.is_ipv4()) {
                debug!("Skipping {}: address family differs from the local address", addr);
                continue;
            }
            let fd = match sys::sctp_socket(&addr) {
                Ok(fd) => fd,
                Err(e) => {
                    last_error = e.to_string();
                    warn!("SCTP socket for {} failed: {}", addr, e);
                    continue;
                }
            };
            if let Some(ip) = local {
                let bind_addr = SocketAddr::new(ip, 0);
                if let Err(e) = sys::bind(&fd, &bind_addr) {
                    last_error = e.to_string();
                    warn!("Binding SCTP socket to {} failed: {}", bind_addr, e);
                    continue;
                }
            }
            let initmsg = sys::SctpInitmsg {
                sinit_num_ostreams: 1,
                sinit_max_instreams: 1,
                ..Default::default()
            };
            if let Err(e) = sys::setsockopt(&fd, sys::SOL_SCTP, sys::SCTP_INITMSG, &initmsg) {
                warn!("Failed to set SCTP initmsg: {}", e);
            }
            match sys::connect_timeout(&fd, &addr, timeout) {
                Ok(()) => {
                    info!("SCTP association established with {}", addr);
                    return Ok(Self::from_fd(fd, Some(addr)));
                }
                Err(e) => {
                    warn!("SCTP connect to {} failed: {}", addr, e);
                    last_error = e.to_string();
                }
            }
        }

        Err(SctpError::ConnectFailed {
            target,
            reason: last_error,
        })
    }

    /// Local address of the socket
    pub fn local_addr(&self) -> Result<SocketAddr> {
        sys::local_addr(&self.fd).map_err(SctpError::SockoptFailed)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl E2Transport for SctpSocket {
    fn send(&self, data: &[u8]) -> Result<usize> {
        if self.is_closed() {
            return Err(SctpError::Closed);
        }
        let sent = sys::send_with_ppid(&self.fd, data, E2AP_PPID).map_err(SctpError::SendFailed)?;
        trace!("Sent {} bytes", sent);
        Ok(sent)
    }

    fn receive(&self) -> Received {
        if self.is_closed() {
            return Received::PeerClosed;
        }
        let mut buf = vec![0u8; MAX_MESSAGE_SIZE];
        let received = unsafe {
            libc::recv(
                self.fd.as_raw_fd(),
                buf.as_mut_ptr() as *mut c_void,
                buf.len(),
                0,
            )
        };

        if received < 0 {
            let err = io::Error::last_os_error();
            return match err.raw_os_error() {
                Some(code) if code == libc::EAGAIN || code == libc::EWOULDBLOCK => {
                    Received::WouldBlock
                }
                Some(libc::EINTR) => Received::Interrupted,
                _ if self.is_closed() => Received::PeerClosed,
                _ => Received::Fatal(err),
            };
        }
        if received == 0 {
            debug!("Peer closed the SCTP association");
            self.close();
            return Received::PeerClosed;
        }

        buf.truncate(received as usize);
        trace!("Received {} bytes", received);
        Received::Data(buf)
    }

    fn set_recv_timeout(&self, timeout: Duration) -> Result<()> {
        sys::set_recv_timeout(&self.fd, timeout).map_err(SctpError::SockoptFailed)
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            // The descriptor itself is released on drop; shutdown wakes any
            // thread blocked in recv
            unsafe {
                libc::shutdown(self.fd.as_raw_fd(), libc::SHUT_RDWR);
            }
        }
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolvable_host() {
        let result = SctpSocket::connect_with_timeout(
            "no-such-host.invalid",
            DEFAULT_E2_PORT,
            Duration::from_millis(100),
        );
        assert!(matches!(
            result,
            Err(SctpError::Resolve { .. }) | Err(SctpError::ConnectFailed { .. })
        ));
    }

    #[test]
    fn test_error_display() {
        let err = SctpError::ConnectFailed {
            target: "10.0.2.10:36421".to_string(),
            reason: "timed out".to_string(),
        };
        assert_eq!(err.to_string(), "Connect to 10.0.2.10:36421 failed: timed out");
        assert_eq!(SctpError::InvalidPort(0).to_string(), "Invalid port 0");
    }
}
