//! SCTP transport layer for e2sim
//!
//! E2AP runs over SCTP with one PDU per SCTP message. This crate drives the
//! Linux kernel SCTP stack through `libc` with one-to-one (`SOCK_STREAM`)
//! sockets and exposes the blocking primitives the E2 connection needs:
//!
//! - [`start_server`] / [`accept`] for the listening side
//! - [`SctpSocket::connect_with_timeout`] for the node side
//! - [`E2Transport::send`] / [`E2Transport::receive`], where `receive` honours
//!   a socket receive timeout and reports [`Received::WouldBlock`] instead of
//!   an error when it expires
//!
//! The kernel module must be loaded (`modprobe sctp`).
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use e2sim_sctp::{E2Transport, Received, SctpSocket};
//!
//! let socket = SctpSocket::connect_with_timeout("10.0.2.10", 36421, Duration::from_secs(10))?;
//! socket.set_recv_timeout(Duration::from_secs(2))?;
//! socket.send(&[0x00, 0x01])?;
//! if let Received::Data(pdu) = socket.receive() {
//!     println!("{} bytes from the RIC", pdu.len());
//! }
//! # Ok::<(), e2sim_sctp::SctpError>(())
//! ```

pub mod association;
pub mod server;
mod sys;

pub use association::{
    E2Transport, Received, Result, SctpError, SctpSocket, DEFAULT_E2_PORT, E2AP_PPID,
    MAX_MESSAGE_SIZE,
};
pub use server::{accept, start_server, SctpListener};
