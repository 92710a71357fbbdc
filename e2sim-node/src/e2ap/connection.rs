//! E2 Connection Lifecycle
//!
//! One SCTP association to a RIC, driven by two OS threads:
//!
//! - the **listener** blocks on `receive` (bounded by the socket receive
//!   timeout) and runs the [`Dispatcher`] for every inbound message
//! - the **setup helper**, spawned by the listener, sends E2 SETUP REQUEST
//!   and waits on a condition variable until the response arrives or the
//!   retry interval passes, for at most `retries` attempts
//!
//! ```text
//! Disconnected -> Connecting -> AwaitingSetupResponse -> Ready -> ShuttingDown -> Closed
//! ```
//!
//! Failing to connect and exhausting the setup attempts are fatal: both go
//! through the [`TerminationHook`].

use std::fmt;
use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use e2sim_common::{log_e2ap_message, Direction, GlobalE2NodeId, SetupConfig};
use e2sim_e2ap::procedures::{build_e2_removal_request, build_e2_setup_request, E2SetupRequestParams};
use e2sim_e2ap::{encode_e2ap_pdu, CodecError, E2apPdu};
use e2sim_sctp::{E2Transport, Received, SctpError, SctpSocket};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::dispatcher::{Dispatcher, E2apLink};
use super::ran_function::RanFunctionRegistry;
use crate::e2sm::{E2apSender, IndicationSink};
use crate::lock;
use crate::o1::Endpoint;

/// Errors of one E2 connection
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Transport error: {0}")]
    Transport(#[from] SctpError),

    #[error("Connect failed: {0}")]
    Connect(SctpError),

    #[error("Not connected")]
    NotConnected,

    #[error("Failed to spawn connection thread: {0}")]
    Thread(io::Error),
}

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    AwaitingSetupResponse,
    Ready,
    ShuttingDown,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::AwaitingSetupResponse => write!(f, "AwaitingSetupResponse"),
            ConnectionState::Ready => write!(f, "Ready"),
            ConnectionState::ShuttingDown => write!(f, "ShuttingDown"),
            ConnectionState::Closed => write!(f, "Closed"),
        }
    }
}

/// Reaction to a fatal connection condition
pub trait TerminationHook: Send + Sync {
    fn terminate(&self, reason: &str);
}

/// Sends SIGTERM to the own process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalTermination;

impl TerminationHook for SignalTermination {
    fn terminate(&self, reason: &str) {
        error!("Fatal: {}; terminating", reason);
        // SAFETY: kill(2) on our own pid has no memory safety requirements.
        let ret = unsafe { libc::kill(libc::getpid(), libc::SIGTERM) };
        if ret != 0 {
            error!("Failed to signal termination: {}", io::Error::last_os_error());
        }
    }
}

/// Node state shared by every connection
#[derive(Debug)]
pub struct NodeContext {
    pub global_id: GlobalE2NodeId,
    pub registry: Arc<RanFunctionRegistry>,
    pub setup: SetupConfig,
    /// Local address to bind before connecting
    pub local_address: Option<IpAddr>,
}

/// One E2 connection to a RIC
pub struct E2Connection {
    weak_self: Weak<E2Connection>,
    context: Arc<NodeContext>,
    dispatcher: Dispatcher,
    hook: Arc<dyn TerminationHook>,
    transport: Mutex<Option<Arc<dyn E2Transport>>>,
    endpoint: Mutex<Option<Endpoint>>,
    state: Mutex<ConnectionState>,
    /// Cleared by the setup response and by shutdown
    retry_connection: AtomicBool,
    running: AtomicBool,
    shutdown_requested: AtomicBool,
    retry_lock: Mutex<()>,
    retry_cond: Condvar,
    listener: Mutex<Option<JoinHandle<()>>>,
    transaction_id: AtomicU8,
    setup_attempts: AtomicU32,
}

impl fmt::Debug for E2Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("E2Connection")
            .field("endpoint", &self.endpoint())
            .field("state", &self.state())
            .finish()
    }
}

impl E2Connection {
    pub fn new(context: Arc<NodeContext>, hook: Arc<dyn TerminationHook>) -> Arc<Self> {
        let dispatcher = Dispatcher::new(Arc::clone(&context.registry));
        Arc::new_cyclic(|weak_self| Self {
            weak_self: weak_self.clone(),
            context,
            dispatcher,
            hook,
            transport: Mutex::new(None),
            endpoint: Mutex::new(None),
            state: Mutex::new(ConnectionState::Disconnected),
            retry_connection: AtomicBool::new(false),
            running: AtomicBool::new(false),
            shutdown_requested: AtomicBool::new(false),
            retry_lock: Mutex::new(()),
            retry_cond: Condvar::new(),
            listener: Mutex::new(None),
            transaction_id: AtomicU8::new(0),
            setup_attempts: AtomicU32::new(0),
        })
    }

    pub fn state(&self) -> ConnectionState {
        *lock(&self.state)
    }

    pub fn endpoint(&self) -> Option<Endpoint> {
        lock(&self.endpoint).clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// E2 SETUP REQUEST messages sent so far
    pub fn setup_attempts(&self) -> u32 {
        self.setup_attempts.load(Ordering::SeqCst)
    }

    fn set_state(&self, to: ConnectionState) {
        let mut state = lock(&self.state);
        if *state != to {
            debug!("E2 connection state {} -> {}", *state, to);
            *state = to;
        }
    }

    fn transport(&self) -> Option<Arc<dyn E2Transport>> {
        lock(&self.transport).clone()
    }

    fn next_transaction_id(&self) -> u8 {
        self.transaction_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Connects to the RIC and starts the listener.
    ///
    /// A failed connect clears the retry flag and is fatal.
    pub fn run(self: &Arc<Self>, addr: &str, port: u16) -> Result<(), ConnectionError> {
        self.set_state(ConnectionState::Connecting);
        let timeout = Duration::from_secs(self.context.setup.connect_timeout_s);
        match SctpSocket::connect_from(self.context.local_address, addr, port, timeout) {
            Ok(socket) => self.attach(Arc::new(socket), Endpoint::new(addr, port)),
            Err(e) => {
                self.retry_connection.store(false, Ordering::SeqCst);
                self.set_state(ConnectionState::Closed);
                self.hook.terminate(&format!("cannot connect to RIC at {}: {}", Endpoint::new(addr, port), e));
                Err(ConnectionError::Connect(e))
            }
        }
    }

    /// Takes over an established transport and starts the listener.
    pub fn attach(self: &Arc<Self>, transport: Arc<dyn E2Transport>, endpoint: Endpoint) -> Result<(), ConnectionError> {
        let recv_timeout = Duration::from_millis(self.context.setup.recv_timeout_ms);
        if let Err(e) = transport.set_recv_timeout(recv_timeout) {
            transport.close();
            self.set_state(ConnectionState::Closed);
            self.hook.terminate(&format!("cannot set receive timeout on {endpoint}: {e}"));
            return Err(e.into());
        }

        info!("E2 connection to {} established", endpoint);
        *lock(&self.transport) = Some(transport);
        *lock(&self.endpoint) = Some(endpoint);
        self.running.store(true, Ordering::SeqCst);
        self.retry_connection.store(true, Ordering::SeqCst);
        self.set_state(ConnectionState::AwaitingSetupResponse);

        let connection = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("e2-listener".to_string())
            .spawn(move || connection.listen());
        match spawned {
            Ok(handle) => {
                *lock(&self.listener) = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                self.retry_connection.store(false, Ordering::SeqCst);
                if let Some(transport) = lock(&self.transport).take() {
                    transport.close();
                }
                self.set_state(ConnectionState::Closed);
                Err(ConnectionError::Thread(e))
            }
        }
    }

    fn listen(self: Arc<Self>) {
        let helper = {
            let connection = Arc::clone(&self);
            thread::Builder::new()
                .name("e2-setup".to_string())
                .spawn(move || connection.setup_retry_loop())
        };
        let helper = match helper {
            Ok(handle) => Some(handle),
            Err(e) => {
                self.hook.terminate(&format!("cannot spawn E2 setup helper: {e}"));
                None
            }
        };

        if let Some(transport) = self.transport() {
            while self.running.load(Ordering::SeqCst) {
                match transport.receive() {
                    Received::Data(bytes) => self.dispatcher.handle(&bytes, &*self, Instant::now()),
                    Received::WouldBlock => continue,
                    Received::Interrupted => {
                        debug!("Receive interrupted, continuing");
                        continue;
                    }
                    Received::PeerClosed => {
                        warn!("RIC closed the E2 association");
                        break;
                    }
                    Received::Fatal(e) => {
                        error!("E2 receive failed: {}", e);
                        break;
                    }
                }
            }
            transport.close();
        }

        self.running.store(false, Ordering::SeqCst);
        self.stop_retries();
        if let Some(handle) = helper {
            if handle.join().is_err() {
                error!("E2 setup helper panicked");
            }
        }
        self.set_state(ConnectionState::Closed);
        info!("E2 listener stopped");
    }

    fn setup_retry_loop(&self) {
        let interval = Duration::from_millis(self.context.setup.retry_interval_ms);
        let mut budget = self.context.setup.retries;

        while self.retry_connection.load(Ordering::SeqCst) && budget > 0 {
            budget -= 1;
            self.send_setup_request();

            let guard = lock(&self.retry_lock);
            let _ = self
                .retry_cond
                .wait_timeout_while(guard, interval, |_| self.retry_connection.load(Ordering::SeqCst))
                .unwrap_or_else(PoisonError::into_inner);
        }

        if self.retry_connection.swap(false, Ordering::SeqCst) {
            self.hook.terminate(&format!(
                "no E2 SETUP RESPONSE after {} attempts",
                self.setup_attempts()
            ));
        }
    }

    fn send_setup_request(&self) {
        let params = E2SetupRequestParams {
            transaction_id: self.next_transaction_id(),
            global_e2node_id: self.context.global_id,
            ran_functions: self.context.registry.ran_function_items(),
        };
        let attempt = self.setup_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            "Sending E2 SETUP REQUEST (attempt {}/{}, transaction {}, {} RAN functions)",
            attempt,
            self.context.setup.retries,
            params.transaction_id,
            params.ran_functions.len()
        );
        if let Err(e) = self.send_pdu(&build_e2_setup_request(&params)) {
            warn!("E2 SETUP REQUEST not sent: {}", e);
        }
    }

    /// Wakes the setup helper and makes it exit.
    fn stop_retries(&self) {
        let _guard = lock(&self.retry_lock);
        self.retry_connection.store(false, Ordering::SeqCst);
        self.retry_cond.notify_all();
    }

    /// Marks setup complete and stops the retries.
    pub fn on_setup_response(&self) {
        self.stop_retries();
        self.set_state(ConnectionState::Ready);
        info!("E2 setup complete after {} attempts", self.setup_attempts());
    }

    /// Stops both threads and closes the transport. Idempotent.
    ///
    /// Called on the listener thread the join is left to a later call.
    pub fn shutdown(&self) {
        if !self.shutdown_requested.swap(true, Ordering::SeqCst) {
            info!("Shutting down E2 connection");
            if self.state() != ConnectionState::Closed {
                self.set_state(ConnectionState::ShuttingDown);
            }
        }
        self.running.store(false, Ordering::SeqCst);
        self.stop_retries();

        let handle = lock(&self.listener).take();
        match handle {
            Some(handle) if handle.thread().id() == thread::current().id() => {
                *lock(&self.listener) = Some(handle);
            }
            Some(handle) => {
                if handle.join().is_err() {
                    error!("E2 listener panicked");
                }
            }
            None => self.set_state(ConnectionState::Closed),
        }
    }

    /// Sends E2 REMOVAL REQUEST; the response shuts the connection down.
    pub fn request_removal(&self) -> Result<(), ConnectionError> {
        let transaction_id = self.next_transaction_id();
        info!("Requesting E2 removal (transaction {})", transaction_id);
        self.send_pdu(&build_e2_removal_request(transaction_id))
    }

    /// Encodes and sends one PDU. Transport failures other than a closed
    /// association are fatal.
    pub fn send_pdu(&self, pdu: &E2apPdu) -> Result<(), ConnectionError> {
        let bytes = encode_e2ap_pdu(pdu)?;
        let transport = self.transport().ok_or(ConnectionError::NotConnected)?;
        log_e2ap_message(Direction::Tx, pdu.message_name(), &bytes);
        match transport.send(&bytes) {
            Ok(_) => Ok(()),
            Err(SctpError::Closed) => Err(ConnectionError::Transport(SctpError::Closed)),
            Err(e) => {
                self.hook.terminate(&format!("send of {} failed: {}", pdu.message_name(), e));
                Err(e.into())
            }
        }
    }
}

impl E2apSender for E2Connection {
    fn send_pdu(&self, pdu: &E2apPdu) -> Result<(), ConnectionError> {
        E2Connection::send_pdu(self, pdu)
    }
}

impl E2apLink for E2Connection {
    fn on_setup_response(&self) {
        E2Connection::on_setup_response(self)
    }

    fn shutdown(&self) {
        E2Connection::shutdown(self)
    }

    fn indication_sink(&self) -> IndicationSink {
        let sender: Weak<dyn E2apSender> = self.weak_self.clone();
        IndicationSink::new(sender)
    }
}
