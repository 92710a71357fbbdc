//! e2sim-node - E2 Node Simulator Library
#![allow(missing_docs)]
//!
//! An E2 node that connects to a RIC over SCTP, runs the E2 setup
//! handshake and serves the E2SM-RC service model:
//!
//! - RIC subscriptions for Report Style 4, answered with RIC indications
//!   whenever a UE is admitted to or released from the cell
//! - RIC subscription deletion
//! - RIC control Style 3 (handover)
//! - E2 removal and E2 termination handover
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         E2NodeApp                            │
//! │  ┌──────────────┐      ┌────────────┐     ┌───────────────┐  │
//! │  │ E2Connection │─────►│ Dispatcher │────►│  RAN function │  │
//! │  │  listener +  │      └────────────┘     │   registry    │  │
//! │  │ setup helper │                         └───────┬───────┘  │
//! │  └──────┬───────┘                                 ▼          │
//! │         │ indications                     ┌───────────────┐  │
//! │         ◄─────────────────────────────────│  E2SM-RC      │  │
//! │         │                                 │  observers    │◄─┼── Environment
//! └─────────┼─────────────────────────────────┴───────────────┴──┘
//!           ▼
//!          RIC
//! ```
//!
//! Each connection runs on two OS threads; request handling is synchronous
//! on the listener thread, so inbound PDUs are processed in arrival order.
//!
//! # Example
//!
//! ```rust,ignore
//! use e2sim_node::{load_and_validate_e2node_config, E2NodeApp};
//!
//! let config = load_and_validate_e2node_config("config/e2sim.yaml")?;
//! let app = E2NodeApp::new(config)?;
//! app.connect_to_ric()?;
//! ```

pub mod app;
pub mod e2ap;
pub mod e2sm;
pub mod environment;
pub mod o1;
pub mod rc;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use app::{
    load_and_validate_e2node_config, load_e2node_config, load_e2node_config_from_str, validate_e2node_config,
    AppError, ConfigError, ConfigValidationError, E2NodeApp,
};
pub use e2ap::{
    ConnectionError, ConnectionState, Dispatcher, E2Connection, NodeContext, RanFunctionRegistry, SignalTermination,
    TerminationHook,
};
pub use e2sm::{E2sm, IndicationSink, SubscriptionAction, SubscriptionManager};
pub use environment::{EnvironmentManager, EnvironmentObserver, UeInfo, UeList};
pub use o1::{Endpoint, TxReferenceLevel};
pub use rc::{build_rc_service_model, RcContext};

/// Locks a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
