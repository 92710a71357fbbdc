//! E2 node application context
//!
//! [`E2NodeApp`] is built once at start-up from the configuration. It owns
//! the node identity, the RAN function registry with one E2SM-RC instance
//! per configured RAN function, the environment and UE list shared by
//! those service models, the O1 gain state and the registry of live E2
//! connections.
//!
//! # E2 termination handover
//!
//! The connection registry is what makes an O1 handover possible: a new
//! connection is opened to the target E2 termination (running its own setup
//! handshake) and the connection bound to the source is shut down.

mod config_loader;

pub use config_loader::{
    load_and_validate_e2node_config, load_e2node_config, load_e2node_config_from_str, validate_e2node_config,
    ConfigError, ConfigValidationError,
};

use std::sync::{Arc, Mutex};

use e2sim_common::{E2NodeConfig, GlobalE2NodeId};
use e2sim_e2ap::{CodecError, RanFunctionId};
use e2sim_sctp::{accept, start_server, E2Transport, SctpError};
use thiserror::Error;
use tracing::{info, warn};

use crate::e2ap::{
    ConnectionError, E2Connection, NodeContext, RanFunctionRegistry, SignalTermination, TerminationHook,
};
use crate::environment::{EnvironmentManager, UeList};
use crate::lock;
use crate::o1::{parse_handover_request, Endpoint, O1Error, TxReferenceLevel};
use crate::rc::{build_rc_service_model, encode_ran_function_definition, RcContext};

/// Errors of the application context
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid node identity: {0}")]
    Identity(#[from] e2sim_common::Error),

    #[error("Cannot encode definition of RAN function {id}: {source}")]
    Definition { id: RanFunctionId, source: CodecError },

    #[error("RAN function {0} configured twice")]
    DuplicateRanFunction(RanFunctionId),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("No E2 connection to {0}")]
    UnknownEndpoint(Endpoint),

    #[error("Waiting for the RIC failed: {0}")]
    Listen(#[from] SctpError),

    #[error(transparent)]
    O1(#[from] O1Error),
}

/// The running E2 node
pub struct E2NodeApp {
    config: E2NodeConfig,
    context: Arc<NodeContext>,
    environment: Arc<EnvironmentManager>,
    ue_list: Arc<UeList>,
    tx_level: TxReferenceLevel,
    connections: Mutex<Vec<Arc<E2Connection>>>,
    hook: Arc<dyn TerminationHook>,
}

impl E2NodeApp {
    /// Builds the node; fatal conditions signal the own process.
    pub fn new(config: E2NodeConfig) -> Result<Self, AppError> {
        Self::with_termination_hook(config, Arc::new(SignalTermination))
    }

    pub fn with_termination_hook(config: E2NodeConfig, hook: Arc<dyn TerminationHook>) -> Result<Self, AppError> {
        let global_id = config.global_e2node_id()?;
        let environment = Arc::new(EnvironmentManager::new());
        let ue_list = Arc::new(UeList::new());
        let rc_context = Arc::new(RcContext {
            node_id: global_id,
            cell_id: config.cell_id,
            environment: Arc::clone(&environment),
            ue_list: Arc::clone(&ue_list),
        });

        let mut registry = RanFunctionRegistry::new();
        for function in &config.ran_functions {
            let e2sm = Arc::new(build_rc_service_model(Arc::clone(&rc_context)));
            let definition = encode_ran_function_definition(&e2sm).map_err(|source| AppError::Definition {
                id: function.id,
                source,
            })?;
            if !registry.register(function.id, function.revision, definition, e2sm) {
                return Err(AppError::DuplicateRanFunction(function.id));
            }
        }

        info!("E2 node {} ready with {} RAN function(s)", global_id, registry.len());

        let context = Arc::new(NodeContext {
            global_id,
            registry: Arc::new(registry),
            setup: config.setup.clone(),
            local_address: config.local_address,
        });
        let tx_level = TxReferenceLevel::new(config.tx_gain);

        Ok(Self {
            config,
            context,
            environment,
            ue_list,
            tx_level,
            connections: Mutex::new(Vec::new()),
            hook,
        })
    }

    pub fn config(&self) -> &E2NodeConfig {
        &self.config
    }

    pub fn global_id(&self) -> GlobalE2NodeId {
        self.context.global_id
    }

    pub fn registry(&self) -> &RanFunctionRegistry {
        &self.context.registry
    }

    pub fn environment(&self) -> &Arc<EnvironmentManager> {
        &self.environment
    }

    pub fn ue_list(&self) -> &Arc<UeList> {
        &self.ue_list
    }

    /// O1 transmit reference level
    pub fn tx_level(&self) -> &TxReferenceLevel {
        &self.tx_level
    }

    /// Live connections, oldest first
    pub fn connections(&self) -> Vec<Arc<E2Connection>> {
        lock(&self.connections).clone()
    }

    pub fn connection(&self, endpoint: &Endpoint) -> Option<Arc<E2Connection>> {
        lock(&self.connections)
            .iter()
            .find(|c| c.endpoint().as_ref() == Some(endpoint))
            .cloned()
    }

    /// Connects to the configured RIC.
    pub fn connect_to_ric(&self) -> Result<Arc<E2Connection>, AppError> {
        let ric = &self.config.ric;
        self.connect(&ric.address, ric.port)
    }

    /// Opens a connection and starts its setup handshake.
    pub fn connect(&self, addr: &str, port: u16) -> Result<Arc<E2Connection>, AppError> {
        let connection = E2Connection::new(Arc::clone(&self.context), Arc::clone(&self.hook));
        connection.run(addr, port)?;
        lock(&self.connections).push(Arc::clone(&connection));
        Ok(connection)
    }

    /// Listens on `bind_addr:port`, blocks until the RIC connects and runs the
    /// setup handshake over the accepted association.
    ///
    /// Only one RIC is accepted; the listening socket is closed afterwards.
    pub fn accept_from_ric(&self, bind_addr: &str, port: u32) -> Result<Arc<E2Connection>, AppError> {
        let listener = start_server(bind_addr, port)?;
        info!("Waiting for the RIC on {}", listener.local_addr());
        let (socket, peer) = accept(&listener)?;
        self.attach(Arc::new(socket), Endpoint::new(peer.ip().to_string(), peer.port()))
    }

    /// Runs a connection over an already established transport.
    pub fn attach(&self, transport: Arc<dyn E2Transport>, endpoint: Endpoint) -> Result<Arc<E2Connection>, AppError> {
        let connection = E2Connection::new(Arc::clone(&self.context), Arc::clone(&self.hook));
        connection.attach(transport, endpoint)?;
        lock(&self.connections).push(Arc::clone(&connection));
        Ok(connection)
    }

    /// Shuts the connection bound to `endpoint` down and forgets it.
    pub fn retire(&self, endpoint: &Endpoint) -> Result<(), AppError> {
        let connection = {
            let mut connections = lock(&self.connections);
            let index = connections
                .iter()
                .position(|c| c.endpoint().as_ref() == Some(endpoint))
                .ok_or_else(|| AppError::UnknownEndpoint(endpoint.clone()))?;
            connections.remove(index)
        };
        info!("Retiring E2 connection to {}", endpoint);
        connection.shutdown();
        Ok(())
    }

    /// Moves the node from one E2 termination to another.
    pub fn handover(&self, from: &Endpoint, to: &Endpoint) -> Result<Arc<E2Connection>, AppError> {
        if self.connection(from).is_none() {
            return Err(AppError::UnknownEndpoint(from.clone()));
        }
        info!("E2 termination handover {} -> {}", from, to);
        let connection = self.connect(&to.addr, to.port)?;
        self.retire(from)?;
        Ok(connection)
    }

    /// Applies an O1 handover POST body.
    pub fn apply_o1_handover(&self, body: &str) -> Result<Arc<E2Connection>, AppError> {
        let request = parse_handover_request(body)?;
        self.handover(&request.e2term.from, &request.e2term.to)
    }

    /// Shuts every connection down and stops every running action.
    pub fn shutdown(&self) {
        let connections: Vec<_> = lock(&self.connections).drain(..).collect();
        for connection in &connections {
            connection.shutdown();
        }
        let mut stopped = 0;
        for function in self.context.registry.functions() {
            stopped += function.e2sm.subscriptions().clear();
        }
        if stopped > 0 {
            warn!("Stopped {} running action(s) at shutdown", stopped);
        }
        info!("E2 node shut down ({} connection(s) closed)", connections.len());
    }
}
