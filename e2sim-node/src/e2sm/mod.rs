//! E2 Service Model framework
//!
//! A service model ([`E2sm`]) is what a RAN function runs. It owns:
//!
//! - the E2AP procedures it supports, each with its handler
//! - its services (Report, Insert, Control, Policy, Query), each a set of
//!   styles; a style names the trigger definition and action definition it
//!   uses
//! - trigger definitions by style and action definitions by format
//! - the [`SubscriptionManager`] holding its running actions
//!
//! ```text
//! RAN function ──► E2sm ──► Procedure ──► handler
//!                   │
//!                   ├──► Service ──► ServiceStyle ──► TriggerDefinition
//!                   │                             └─► ActionDefinition ──► SubscriptionAction
//!                   └──► SubscriptionManager
//! ```

mod subscription_manager;

pub use subscription_manager::{encode_subid, subid_of, ActionMap, SubId, SubscriptionManager};

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Weak};

use e2sim_e2ap::ies::{Cause, CauseRicRequest, CriticalityDiagnostics, RicActionId, RicActionNotAdmittedItem, RicRequestId};
use e2sim_e2ap::messages::{RicControlRequest, RicSubscriptionDeleteRequest, RicSubscriptionRequest};
use e2sim_e2ap::{E2apPdu, ProcedureCode, RanFunctionId};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::e2ap::ConnectionError;
use crate::rc::ReportStyle4Data;

/// Style number inside a service
pub type StyleId = i64;
/// Format number of an action or trigger definition
pub type FormatId = u8;

/// E2 service kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceKind {
    Report,
    Insert,
    Control,
    Policy,
    Query,
}

/// Event trigger definition of one trigger style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerDefinition {
    pub style: StyleId,
    pub name: String,
    pub format: FormatId,
}

/// One style of a service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStyle {
    pub id: StyleId,
    pub name: String,
    /// Trigger style this style is subscribed with
    pub trigger_style: StyleId,
    /// Action definition format this style accepts
    pub action_format: FormatId,
    pub header_format: FormatId,
    pub message_format: FormatId,
}

/// A service and its styles
#[derive(Debug, Clone)]
pub struct Service {
    kind: ServiceKind,
    styles: BTreeMap<StyleId, ServiceStyle>,
}

impl Service {
    pub fn new(kind: ServiceKind) -> Self {
        Self {
            kind,
            styles: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    /// Adds a style; false if its ID is taken.
    pub fn add_style(&mut self, style: ServiceStyle) -> bool {
        if self.styles.contains_key(&style.id) {
            return false;
        }
        self.styles.insert(style.id, style);
        true
    }

    pub fn style(&self, id: StyleId) -> Option<&ServiceStyle> {
        self.styles.get(&id)
    }

    pub fn styles(&self) -> impl Iterator<Item = &ServiceStyle> {
        self.styles.values()
    }
}

/// Something that can put an E2AP PDU on the wire
pub trait E2apSender: Send + Sync {
    fn send_pdu(&self, pdu: &E2apPdu) -> Result<(), ConnectionError>;
}

/// Outbound path of a running action, bound to the connection that
/// admitted its subscription.
///
/// Holds the connection weakly: once it is gone, sends are dropped.
#[derive(Clone)]
pub struct IndicationSink {
    sender: Weak<dyn E2apSender>,
}

impl IndicationSink {
    pub fn new(sender: Weak<dyn E2apSender>) -> Self {
        Self { sender }
    }

    /// Sink bound to `sender`
    pub fn from_arc(sender: &Arc<dyn E2apSender>) -> Self {
        Self::new(Arc::downgrade(sender))
    }

    /// Sends `pdu`; false if the connection is gone or the send failed.
    pub fn send(&self, pdu: &E2apPdu) -> bool {
        let Some(sender) = self.sender.upgrade() else {
            warn!("Dropping {}: connection is gone", pdu.message_name());
            return false;
        };
        match sender.send_pdu(pdu) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to send {}: {}", pdu.message_name(), e);
                false
            }
        }
    }
}

impl fmt::Debug for IndicationSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicationSink")
            .field("connected", &(self.sender.strong_count() > 0))
            .finish()
    }
}

/// Identity of one admitted action
#[derive(Debug, Clone)]
pub struct SubscriptionInfo {
    pub request_id: RicRequestId,
    pub ran_function_id: RanFunctionId,
    pub action_id: RicActionId,
    /// MNC length of the node PLMN, used to split UE IMSIs
    pub mnc_len: usize,
    pub sink: IndicationSink,
}

impl SubscriptionInfo {
    pub fn subid(&self) -> SubId {
        subid_of(self.request_id)
    }
}

/// Service-model specific input an action is started with
#[derive(Debug, Clone)]
pub enum ActionData {
    /// E2SM-RC Report Style 4 (UE information)
    RcReportStyle4(ReportStyle4Data),
}

/// A running subscription action
pub trait SubscriptionAction: Send + Sync {
    /// Starts the action. Starting twice is a logged no-op.
    fn start(self: Arc<Self>) -> bool;

    /// Stops the action. Stopping twice is a logged no-op.
    fn stop(&self) -> bool;
}

/// Builds the action for one admitted subscription action
pub type ActionStarter =
    Box<dyn Fn(SubscriptionInfo, ActionData) -> Arc<dyn SubscriptionAction> + Send + Sync>;

/// Why an action could not be started
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    #[error("action {action_id} of subscription {subid:#010x} already exists")]
    Duplicate { subid: SubId, action_id: RicActionId },

    #[error("action {action_id} of subscription {subid:#010x} failed to start")]
    StartFailed { subid: SubId, action_id: RicActionId },
}

impl ActionError {
    /// Cause reported in the not-admitted list
    pub fn cause(&self) -> Cause {
        match self {
            ActionError::Duplicate { .. } => Cause::RicRequest(CauseRicRequest::DuplicateAction),
            ActionError::StartFailed { .. } => Cause::RicRequest(CauseRicRequest::Unspecified),
        }
    }
}

/// Action definition of one format
pub struct ActionDefinition {
    format: FormatId,
    name: String,
    starter: ActionStarter,
}

impl ActionDefinition {
    pub fn new(format: FormatId, name: impl Into<String>, starter: ActionStarter) -> Self {
        Self {
            format,
            name: name.into(),
            starter,
        }
    }

    pub fn format(&self) -> FormatId {
        self.format
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the action, registers it under `(subid, action_id)` and
    /// starts it.
    pub fn start_action(
        &self,
        subscriptions: &SubscriptionManager,
        info: SubscriptionInfo,
        data: ActionData,
    ) -> Result<(), ActionError> {
        let subid = info.subid();
        let action_id = info.action_id;
        let action = (self.starter)(info, data);

        if !subscriptions.add_action(subid, action_id, Arc::clone(&action)) {
            return Err(ActionError::Duplicate { subid, action_id });
        }
        if !action.start() {
            subscriptions.del_action(subid, action_id);
            return Err(ActionError::StartFailed { subid, action_id });
        }
        info!("Started action {} of subscription {:#010x}", action_id, subid);
        Ok(())
    }
}

impl fmt::Debug for ActionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDefinition")
            .field("format", &self.format)
            .field("name", &self.name)
            .finish()
    }
}

/// Result of a RIC subscription request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubscriptionOutcome {
    pub succeeded: bool,
    pub admitted: Vec<RicActionId>,
    pub not_admitted: Vec<RicActionNotAdmittedItem>,
    pub cause: Option<Cause>,
    pub diagnostics: Option<CriticalityDiagnostics>,
}

impl SubscriptionOutcome {
    pub fn failed(cause: Cause) -> Self {
        Self {
            succeeded: false,
            cause: Some(cause),
            ..Default::default()
        }
    }

    pub fn admit(&mut self, action_id: RicActionId) {
        self.admitted.push(action_id);
    }

    pub fn reject(&mut self, action_id: RicActionId, cause: Cause) {
        self.not_admitted.push(RicActionNotAdmittedItem { action_id, cause });
    }
}

/// Result of a RIC subscription delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubscriptionDeleteOutcome {
    /// Number of actions stopped and removed
    pub removed: usize,
    pub cause: Option<Cause>,
}

impl SubscriptionDeleteOutcome {
    pub fn failed(cause: Cause) -> Self {
        Self {
            removed: 0,
            cause: Some(cause),
        }
    }

    /// Deleting nothing counts as failure.
    pub fn succeeded(&self) -> bool {
        self.removed > 0
    }
}

/// Result of a RIC control request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlOutcome {
    pub succeeded: bool,
    pub cause: Option<Cause>,
    /// Encoded service-model control outcome
    pub outcome: Option<Vec<u8>>,
}

impl ControlOutcome {
    pub fn success(outcome: Option<Vec<u8>>) -> Self {
        Self {
            succeeded: true,
            cause: None,
            outcome,
        }
    }

    pub fn failed(cause: Cause) -> Self {
        Self {
            succeeded: false,
            cause: Some(cause),
            outcome: None,
        }
    }
}

pub type SubscriptionHandler =
    Box<dyn Fn(&E2sm, &RicSubscriptionRequest, IndicationSink) -> SubscriptionOutcome + Send + Sync>;
pub type SubscriptionDeleteHandler =
    Box<dyn Fn(&E2sm, &RicSubscriptionDeleteRequest) -> SubscriptionDeleteOutcome + Send + Sync>;
pub type ControlHandler = Box<dyn Fn(&E2sm, &RicControlRequest) -> ControlOutcome + Send + Sync>;

/// A supported E2AP procedure and its handler
pub enum Procedure {
    Subscription(SubscriptionHandler),
    SubscriptionDelete(SubscriptionDeleteHandler),
    Control(ControlHandler),
    /// Node-initiated; nothing to handle
    Indication,
}

impl Procedure {
    pub fn code(&self) -> ProcedureCode {
        match self {
            Procedure::Subscription(_) => ProcedureCode::RIC_SUBSCRIPTION,
            Procedure::SubscriptionDelete(_) => ProcedureCode::RIC_SUBSCRIPTION_DELETE,
            Procedure::Control(_) => ProcedureCode::RIC_CONTROL,
            Procedure::Indication => ProcedureCode::RIC_INDICATION,
        }
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Procedure({})", self.code())
    }
}

/// Deletes every action of the requested subscription.
///
/// The standard RIC subscription delete handler.
pub fn delete_subscription(e2sm: &E2sm, request: &RicSubscriptionDeleteRequest) -> SubscriptionDeleteOutcome {
    let subid = subid_of(request.ric_request_id);
    let subscriptions = e2sm.subscriptions();
    let removed = subscriptions
        .get_actions(subid)
        .keys()
        .filter(|action_id| subscriptions.del_action(subid, **action_id))
        .count();

    if removed == 0 {
        warn!("Subscription {} has no actions to delete", request.ric_request_id);
        return SubscriptionDeleteOutcome::failed(Cause::RicRequest(CauseRicRequest::Unspecified));
    }
    info!("Deleted {} actions of subscription {}", removed, request.ric_request_id);
    SubscriptionDeleteOutcome {
        removed,
        cause: None,
    }
}

/// A service model instance
pub struct E2sm {
    short_name: String,
    oid: String,
    description: String,
    procedures: HashMap<ProcedureCode, Procedure>,
    services: HashMap<ServiceKind, Service>,
    triggers: HashMap<StyleId, TriggerDefinition>,
    actions: HashMap<FormatId, ActionDefinition>,
    subscriptions: SubscriptionManager,
}

impl E2sm {
    pub fn new(short_name: impl Into<String>, oid: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            oid: oid.into(),
            description: description.into(),
            procedures: HashMap::new(),
            services: HashMap::new(),
            triggers: HashMap::new(),
            actions: HashMap::new(),
            subscriptions: SubscriptionManager::new(),
        }
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Adds a procedure; false if one with the same code exists.
    pub fn add_procedure(&mut self, procedure: Procedure) -> bool {
        let code = procedure.code();
        if self.procedures.contains_key(&code) {
            warn!("{}: procedure {} already registered", self.short_name, code);
            return false;
        }
        debug!("{}: registered procedure {}", self.short_name, code);
        self.procedures.insert(code, procedure);
        true
    }

    pub fn resolve_procedure(&self, code: ProcedureCode) -> Option<&Procedure> {
        self.procedures.get(&code)
    }

    pub fn add_service(&mut self, service: Service) -> bool {
        if self.services.contains_key(&service.kind()) {
            return false;
        }
        self.services.insert(service.kind(), service);
        true
    }

    pub fn service(&self, kind: ServiceKind) -> Option<&Service> {
        self.services.get(&kind)
    }

    pub fn add_trigger(&mut self, trigger: TriggerDefinition) -> bool {
        if self.triggers.contains_key(&trigger.style) {
            return false;
        }
        self.triggers.insert(trigger.style, trigger);
        true
    }

    pub fn trigger(&self, style: StyleId) -> Option<&TriggerDefinition> {
        self.triggers.get(&style)
    }

    pub fn add_action_definition(&mut self, action: ActionDefinition) -> bool {
        if self.actions.contains_key(&action.format()) {
            return false;
        }
        self.actions.insert(action.format(), action);
        true
    }

    pub fn resolve_action(&self, format: FormatId) -> Option<&ActionDefinition> {
        self.actions.get(&format)
    }

    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }
}

impl fmt::Debug for E2sm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("E2sm")
            .field("short_name", &self.short_name)
            .field("oid", &self.oid)
            .field("procedures", &self.procedures.keys().collect::<Vec<_>>())
            .field("services", &self.services.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    struct RecordingSender {
        sent: Mutex<Vec<E2apPdu>>,
    }

    impl E2apSender for RecordingSender {
        fn send_pdu(&self, pdu: &E2apPdu) -> Result<(), ConnectionError> {
            self.sent.lock().unwrap().push(pdu.clone());
            Ok(())
        }
    }

    struct FlagAction {
        started: AtomicBool,
        accept_start: bool,
    }

    impl SubscriptionAction for FlagAction {
        fn start(self: Arc<Self>) -> bool {
            self.started.store(true, Ordering::SeqCst);
            self.accept_start
        }

        fn stop(&self) -> bool {
            self.started.store(false, Ordering::SeqCst);
            true
        }
    }

    fn test_info(sink: IndicationSink, action_id: RicActionId) -> SubscriptionInfo {
        SubscriptionInfo {
            request_id: RicRequestId::new(22, 6),
            ran_function_id: 1,
            action_id,
            mnc_len: 3,
            sink,
        }
    }

    fn test_data() -> ActionData {
        ActionData::RcReportStyle4(ReportStyle4Data::default())
    }

    fn flag_definition(accept_start: bool) -> ActionDefinition {
        ActionDefinition::new(
            1,
            "flag",
            Box::new(move |_, _| {
                Arc::new(FlagAction {
                    started: AtomicBool::new(false),
                    accept_start,
                }) as Arc<dyn SubscriptionAction>
            }),
        )
    }

    fn dead_sink() -> IndicationSink {
        let sender: Arc<dyn E2apSender> = Arc::new(RecordingSender {
            sent: Mutex::new(Vec::new()),
        });
        IndicationSink::from_arc(&sender)
    }

    #[test]
    fn test_sink_drops_after_connection_gone() {
        let sink = dead_sink();
        let pdu = e2sim_e2ap::procedures::build_e2_removal_request(1);
        assert!(!sink.send(&pdu));
    }

    #[test]
    fn test_sink_sends_while_connected() {
        let recorder = Arc::new(RecordingSender {
            sent: Mutex::new(Vec::new()),
        });
        let sender: Arc<dyn E2apSender> = recorder.clone();
        let sink = IndicationSink::from_arc(&sender);
        let pdu = e2sim_e2ap::procedures::build_e2_removal_request(1);
        assert!(sink.send(&pdu));
        assert_eq!(recorder.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_start_action_registers() {
        let manager = SubscriptionManager::new();
        let definition = flag_definition(true);
        definition
            .start_action(&manager, test_info(dead_sink(), 7), test_data())
            .unwrap();
        assert!(manager.get_actions(encode_subid(22, 6)).contains_key(&7));
    }

    #[test]
    fn test_start_action_duplicate() {
        let manager = SubscriptionManager::new();
        let definition = flag_definition(true);
        definition
            .start_action(&manager, test_info(dead_sink(), 7), test_data())
            .unwrap();
        let err = definition
            .start_action(&manager, test_info(dead_sink(), 7), test_data())
            .unwrap_err();
        assert_eq!(err.cause(), Cause::RicRequest(CauseRicRequest::DuplicateAction));
    }

    #[test]
    fn test_start_action_failure_unregisters() {
        let manager = SubscriptionManager::new();
        let definition = flag_definition(false);
        let err = definition
            .start_action(&manager, test_info(dead_sink(), 7), test_data())
            .unwrap_err();
        assert!(matches!(err, ActionError::StartFailed { action_id: 7, .. }));
        assert_eq!(manager.subscription_count(), 0);
    }

    #[test]
    fn test_delete_subscription_counts_removed() {
        let mut e2sm = E2sm::new("TEST", "1.2.3", "test");
        e2sm.add_action_definition(flag_definition(true));
        let definition = e2sm.resolve_action(1).unwrap();
        for action_id in [1, 2] {
            definition
                .start_action(e2sm.subscriptions(), test_info(dead_sink(), action_id), test_data())
                .unwrap();
        }

        let request = RicSubscriptionDeleteRequest {
            ric_request_id: RicRequestId::new(22, 6),
            ran_function_id: 1,
        };
        let outcome = delete_subscription(&e2sm, &request);
        assert!(outcome.succeeded());
        assert_eq!(outcome.removed, 2);

        let again = delete_subscription(&e2sm, &request);
        assert!(!again.succeeded());
        assert_eq!(again.cause, Some(Cause::RicRequest(CauseRicRequest::Unspecified)));
    }

    #[test]
    fn test_registration_is_add_only() {
        let mut e2sm = E2sm::new("TEST", "1.2.3", "test");
        assert!(e2sm.add_procedure(Procedure::Indication));
        assert!(!e2sm.add_procedure(Procedure::Indication));
        assert!(e2sm.resolve_procedure(ProcedureCode::RIC_INDICATION).is_some());
        assert!(e2sm.resolve_procedure(ProcedureCode::RIC_CONTROL).is_none());

        let mut report = Service::new(ServiceKind::Report);
        let style = ServiceStyle {
            id: 4,
            name: "UE Information".to_string(),
            trigger_style: 4,
            action_format: 1,
            header_format: 1,
            message_format: 2,
        };
        assert!(report.add_style(style.clone()));
        assert!(!report.add_style(style));
        assert!(e2sm.add_service(report));
        assert!(!e2sm.add_service(Service::new(ServiceKind::Report)));
        assert_eq!(e2sm.service(ServiceKind::Report).unwrap().style(4).unwrap().message_format, 2);
        assert!(e2sm.service(ServiceKind::Insert).is_none());
    }
}
