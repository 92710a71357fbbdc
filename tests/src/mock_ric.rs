//! Mock RIC for integration testing
//!
//! [`mock_ric`] returns a connected pair: the [`MockRicTransport`] is handed
//! to the node in place of an SCTP association, the [`MockRic`] end plays
//! the E2 termination. Messages travel as encoded E2AP bytes, so both
//! codecs are exercised on every exchange.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use e2sim_e2ap::ies::GlobalRicId;
use e2sim_e2ap::messages::E2SetupRequest;
use e2sim_e2ap::procedures::{build_e2_setup_response, parse_e2_setup_request};
use e2sim_e2ap::{decode_e2ap_pdu, encode_e2ap_pdu, CodecError, E2apPdu, OutcomeKind, ProcedureCode};
use e2sim_sctp::{E2Transport, Received, SctpError};
use thiserror::Error;
use tracing::debug;

/// E2 termination port the mock pretends to listen on
pub const MOCK_RIC_PORT: u16 = 36421;

/// Mock RIC errors
#[derive(Debug, Error)]
pub enum MockRicError {
    #[error("No message within {0:?}")]
    Timeout(Duration),
    #[error("Node closed the association")]
    Disconnected,
    #[error("E2AP codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("Unexpected message: {0}")]
    Unexpected(String),
}

fn guard<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Node side of the in-memory association
pub struct MockRicTransport {
    inbound: Mutex<Receiver<Vec<u8>>>,
    outbound: Mutex<Option<Sender<Vec<u8>>>>,
    timeout: Mutex<Duration>,
    closed: AtomicBool,
}

impl E2Transport for MockRicTransport {
    fn send(&self, data: &[u8]) -> e2sim_sctp::Result<usize> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SctpError::Closed);
        }
        match guard(&self.outbound).as_ref() {
            Some(sender) => sender.send(data.to_vec()).map(|_| data.len()).map_err(|_| SctpError::Closed),
            None => Err(SctpError::Closed),
        }
    }

    fn receive(&self) -> Received {
        if self.closed.load(Ordering::SeqCst) {
            return Received::PeerClosed;
        }
        let timeout = *guard(&self.timeout);
        match guard(&self.inbound).recv_timeout(timeout) {
            Ok(bytes) => Received::Data(bytes),
            Err(RecvTimeoutError::Timeout) => Received::WouldBlock,
            Err(RecvTimeoutError::Disconnected) => Received::PeerClosed,
        }
    }

    fn set_recv_timeout(&self, timeout: Duration) -> e2sim_sctp::Result<()> {
        *guard(&self.timeout) = timeout;
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        guard(&self.outbound).take();
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        Some(SocketAddr::from((Ipv4Addr::LOCALHOST, MOCK_RIC_PORT)))
    }
}

/// RIC side of the in-memory association
pub struct MockRic {
    to_node: Mutex<Option<Sender<Vec<u8>>>>,
    from_node: Mutex<Receiver<Vec<u8>>>,
    global_ric_id: GlobalRicId,
}

/// Creates a connected mock RIC and the transport to attach to the node.
pub fn mock_ric() -> (MockRic, Arc<MockRicTransport>) {
    let (to_node, node_inbound) = mpsc::channel();
    let (node_outbound, from_node) = mpsc::channel();
    let transport = Arc::new(MockRicTransport {
        inbound: Mutex::new(node_inbound),
        outbound: Mutex::new(Some(node_outbound)),
        timeout: Mutex::new(Duration::from_millis(100)),
        closed: AtomicBool::new(false),
    });
    let ric = MockRic {
        to_node: Mutex::new(Some(to_node)),
        from_node: Mutex::new(from_node),
        global_ric_id: GlobalRicId {
            plmn: [0x00, 0xf1, 0x10],
            ric_id: 0x00abc,
        },
    };
    (ric, transport)
}

impl MockRic {
    /// Encodes and delivers one PDU to the node.
    pub fn send(&self, pdu: &E2apPdu) -> Result<(), MockRicError> {
        let bytes = encode_e2ap_pdu(pdu)?;
        debug!("Mock RIC sending {} ({} bytes)", pdu.message_name(), bytes.len());
        match guard(&self.to_node).as_ref() {
            Some(sender) => sender.send(bytes).map_err(|_| MockRicError::Disconnected),
            None => Err(MockRicError::Disconnected),
        }
    }

    /// Delivers raw bytes to the node, bypassing the encoder.
    pub fn send_raw(&self, bytes: &[u8]) -> Result<(), MockRicError> {
        match guard(&self.to_node).as_ref() {
            Some(sender) => sender.send(bytes.to_vec()).map_err(|_| MockRicError::Disconnected),
            None => Err(MockRicError::Disconnected),
        }
    }

    /// Next PDU sent by the node.
    pub fn recv(&self, timeout: Duration) -> Result<E2apPdu, MockRicError> {
        match guard(&self.from_node).recv_timeout(timeout) {
            Ok(bytes) => Ok(decode_e2ap_pdu(&bytes)?),
            Err(RecvTimeoutError::Timeout) => Err(MockRicError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(MockRicError::Disconnected),
        }
    }

    /// Every PDU the node sends within `window`.
    pub fn collect(&self, window: Duration) -> Vec<E2apPdu> {
        let deadline = Instant::now() + window;
        let mut pdus = Vec::new();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return pdus;
            }
            match self.recv(remaining) {
                Ok(pdu) => pdus.push(pdu),
                Err(_) => return pdus,
            }
        }
    }

    /// Waits for E2 SETUP REQUEST and accepts every offered RAN function.
    pub fn accept_setup(&self, timeout: Duration) -> Result<E2SetupRequest, MockRicError> {
        let pdu = self.recv(timeout)?;
        if pdu.procedure_code() != ProcedureCode::E2_SETUP || pdu.outcome() != OutcomeKind::Initiating {
            return Err(MockRicError::Unexpected(pdu.message_name().to_string()));
        }
        let request = parse_e2_setup_request(&pdu).map_err(|e| MockRicError::Unexpected(e.to_string()))?;
        self.send(&build_e2_setup_response(&request, self.global_ric_id))?;
        Ok(request)
    }

    /// Drops the RIC end; the node sees the peer close.
    pub fn close(&self) {
        guard(&self.to_node).take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use e2sim_e2ap::procedures::{build_e2_removal_request, build_e2_removal_response, is_e2_removal_response};

    #[test]
    fn test_transport_round_trip() {
        let (ric, transport) = mock_ric();
        ric.send(&build_e2_removal_request(4)).unwrap();

        let Received::Data(bytes) = transport.receive() else {
            panic!("expected data");
        };
        assert_eq!(decode_e2ap_pdu(&bytes).unwrap(), build_e2_removal_request(4));

        let reply = encode_e2ap_pdu(&build_e2_removal_response(4)).unwrap();
        assert_eq!(transport.send(&reply).unwrap(), reply.len());
        assert!(is_e2_removal_response(&ric.recv(Duration::from_secs(1)).unwrap()));
    }

    #[test]
    fn test_transport_timeout_and_close() {
        let (ric, transport) = mock_ric();
        transport.set_recv_timeout(Duration::from_millis(10)).unwrap();
        assert!(matches!(transport.receive(), Received::WouldBlock));

        ric.close();
        assert!(matches!(transport.receive(), Received::PeerClosed));

        transport.close();
        assert!(matches!(transport.send(&[0]), Err(SctpError::Closed)));
        assert!(matches!(ric.recv(Duration::from_millis(10)), Err(MockRicError::Disconnected)));
    }
}
