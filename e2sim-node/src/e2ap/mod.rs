//! E2AP node side
//!
//! - `connection` - SCTP association lifecycle, listener and setup helper threads
//! - `dispatcher` - Inbound PDU routing and response synthesis
//! - `ran_function` - RAN function registry and resolution chain

pub mod connection;
pub mod dispatcher;
pub mod ran_function;

pub use connection::{
    ConnectionError, ConnectionState, E2Connection, NodeContext, SignalTermination, TerminationHook,
};
pub use dispatcher::{Dispatcher, E2apLink};
pub use ran_function::{resolve_action, resolve_procedure, RanFunction, RanFunctionRegistry};
