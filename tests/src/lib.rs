//! Integration test framework for e2sim
#![allow(missing_docs)]
//!
//! This crate provides a mock RIC and test utilities for driving a complete
//! E2 node through its E2AP procedures without an SCTP stack.
//!
//! # Components
//!
//! - [`mock_ric`] - In-memory E2 association and the RIC end of it
//! - [`test_fixtures`] - Node configurations and RIC-side message builders
//! - [`test_utils`] - Utility functions for test setup and waiting
//!
//! # Test Categories
//!
//! 1. **E2 Setup Tests** - Setup handshake, retry bound, removal, peer close
//! 2. **RIC Subscription Tests** - Report Style 4 subscriptions, indications
//!    and deletion
//! 3. **RIC Control Tests** - Handover control and its acknowledgement

pub mod mock_ric;
pub mod test_fixtures;
pub mod test_utils;

pub use mock_ric::{mock_ric, MockRic, MockRicError, MockRicTransport, MOCK_RIC_PORT};
pub use test_fixtures::{test_node_config, TestNodeConfig, TEST_IMSI, TEST_RAN_FUNCTION_ID};
pub use test_utils::{
    init_test_logging, wait_until, TestResult, DEFAULT_POLL_INTERVAL, DEFAULT_TEST_TIMEOUT,
};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use e2sim_common::E2NodeConfig;
use e2sim_node::{E2Connection, E2NodeApp, Endpoint, TerminationHook};

/// Termination hook that counts instead of signalling the test process
#[derive(Debug, Default)]
pub struct RecordingHook {
    fired: AtomicUsize,
}

impl RecordingHook {
    pub fn count(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }
}

impl TerminationHook for RecordingHook {
    fn terminate(&self, reason: &str) {
        tracing::info!("Termination requested: {}", reason);
        self.fired.fetch_add(1, Ordering::SeqCst);
    }
}

/// A node attached to a mock RIC
pub struct TestNode {
    pub app: E2NodeApp,
    pub connection: Arc<E2Connection>,
    pub ric: MockRic,
    pub hook: Arc<RecordingHook>,
}

impl TestNode {
    /// Builds the node and attaches it to a fresh mock RIC. The setup
    /// helper starts sending E2 SETUP REQUEST right away.
    pub fn start(config: E2NodeConfig) -> TestResult<Self> {
        let hook = Arc::new(RecordingHook::default());
        let app = E2NodeApp::with_termination_hook(config, Arc::clone(&hook) as Arc<dyn TerminationHook>)?;
        let (ric, transport) = mock_ric();
        let connection = app.attach(transport, Endpoint::new("127.0.0.1", MOCK_RIC_PORT))?;
        Ok(Self {
            app,
            connection,
            ric,
            hook,
        })
    }

    /// Starts the node and completes the setup handshake.
    pub fn ready(config: E2NodeConfig) -> TestResult<Self> {
        let node = Self::start(config)?;
        node.ric.accept_setup(DEFAULT_TEST_TIMEOUT)?;
        wait_until(
            || node.connection.state() == e2sim_node::ConnectionState::Ready,
            DEFAULT_TEST_TIMEOUT,
        )?;
        Ok(node)
    }
}
