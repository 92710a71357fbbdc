//! E2AP PDU Dispatcher
//!
//! Decodes every inbound message and routes it by `(procedure code,
//! outcome)` through a fixed handler table. Handlers run on the listener
//! thread of the connection the message arrived on, in arrival order.
//!
//! | Procedure | Outcome | Action |
//! |-----------|---------|--------|
//! | E2setup | successful | stop the setup retries |
//! | E2setup | unsuccessful | log; retries continue |
//! | RICsubscription | initiating | resolve and run the subscription handler |
//! | RICsubscriptionDelete | initiating | resolve and run the delete handler |
//! | RICcontrol | initiating | resolve and run the control handler |
//! | E2removal | successful | shut the connection down |
//!
//! Anything else is logged and dropped. Undecodable messages get no
//! response since there is no request identity to answer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use e2sim_common::{log_e2ap_message, Direction};
use e2sim_e2ap::ies::{Cause, CauseRicRequest, CauseRicService};
use e2sim_e2ap::messages::{RicControlRequest, RicSubscriptionDeleteRequest, RicSubscriptionRequest};
use e2sim_e2ap::procedures::{
    build_ric_control_acknowledge, build_ric_control_failure, build_ric_subscription_delete_failure,
    build_ric_subscription_delete_response, build_ric_subscription_failure,
    build_ric_subscription_response, parse_e2_setup_failure, parse_e2_setup_response,
    parse_ric_control_request, parse_ric_subscription_delete_request,
    parse_ric_subscription_request, wants_control_ack,
};
use e2sim_e2ap::{decode_e2ap_pdu, E2apPdu, OutcomeKind, ProcedureCode};
use tracing::{debug, error, info, warn};

use super::ran_function::{resolve_procedure, RanFunctionRegistry};
use crate::e2sm::{
    ControlOutcome, E2apSender, IndicationSink, Procedure, SubscriptionDeleteOutcome,
    SubscriptionOutcome,
};

/// What the dispatcher needs from the connection a message arrived on
pub trait E2apLink: E2apSender {
    /// A successful E2 SETUP RESPONSE arrived.
    fn on_setup_response(&self);

    /// The connection must shut down.
    fn shutdown(&self);

    /// Sink that running actions send their indications through
    fn indication_sink(&self) -> IndicationSink;
}

type Handler = fn(&Dispatcher, &dyn E2apLink, E2apPdu);

/// Routes decoded E2AP PDUs to their handlers
pub struct Dispatcher {
    registry: Arc<RanFunctionRegistry>,
    table: HashMap<(ProcedureCode, OutcomeKind), Handler>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("ran_functions", &self.registry.len())
            .field("handlers", &self.table.len())
            .finish()
    }
}

impl Dispatcher {
    pub fn new(registry: Arc<RanFunctionRegistry>) -> Self {
        let mut table: HashMap<(ProcedureCode, OutcomeKind), Handler> = HashMap::new();
        table.insert((ProcedureCode::E2_SETUP, OutcomeKind::Successful), Self::handle_setup_response);
        table.insert((ProcedureCode::E2_SETUP, OutcomeKind::Unsuccessful), Self::handle_setup_failure);
        table.insert(
            (ProcedureCode::RIC_SUBSCRIPTION, OutcomeKind::Initiating),
            Self::handle_subscription_request,
        );
        table.insert(
            (ProcedureCode::RIC_SUBSCRIPTION_DELETE, OutcomeKind::Initiating),
            Self::handle_subscription_delete_request,
        );
        table.insert((ProcedureCode::RIC_CONTROL, OutcomeKind::Initiating), Self::handle_control_request);
        table.insert((ProcedureCode::E2_REMOVAL, OutcomeKind::Successful), Self::handle_removal_response);
        Self { registry, table }
    }

    pub fn registry(&self) -> &RanFunctionRegistry {
        &self.registry
    }

    /// Decodes and handles one inbound message.
    pub fn handle(&self, raw: &[u8], link: &dyn E2apLink, received_at: Instant) {
        let pdu = match decode_e2ap_pdu(raw) {
            Ok(pdu) => pdu,
            Err(e) => {
                log_e2ap_message(Direction::Rx, "undecodable", raw);
                warn!("Dropping undecodable E2AP message ({} bytes): {}", raw.len(), e);
                return;
            }
        };
        log_e2ap_message(Direction::Rx, pdu.message_name(), raw);

        let key = (pdu.procedure_code(), pdu.outcome());
        match self.table.get(&key) {
            Some(handler) => handler(self, link, pdu),
            None => info!("Ignoring {} {}", key.0, key.1),
        }
        debug!("Handled {} {} in {:?}", key.0, key.1, received_at.elapsed());
    }

    fn send(link: &dyn E2apLink, pdu: &E2apPdu) {
        if let Err(e) = link.send_pdu(pdu) {
            error!("Failed to send {}: {}", pdu.message_name(), e);
        }
    }

    fn handle_setup_response(&self, link: &dyn E2apLink, pdu: E2apPdu) {
        match parse_e2_setup_response(&pdu) {
            Ok(response) => info!(
                "E2 setup accepted by RIC {:06x} (transaction {}): {} accepted, {} rejected",
                response.global_ric_id.ric_id,
                response.transaction_id,
                response.accepted.len(),
                response.rejected.len()
            ),
            Err(e) => warn!("Malformed E2 SETUP RESPONSE: {}", e),
        }
        link.on_setup_response();
    }

    fn handle_setup_failure(&self, _link: &dyn E2apLink, pdu: E2apPdu) {
        match parse_e2_setup_failure(&pdu) {
            Ok(failure) => warn!(
                "E2 setup rejected (transaction {}): {:?}, time to wait {:?}",
                failure.transaction_id, failure.cause, failure.time_to_wait
            ),
            Err(e) => warn!("Malformed E2 SETUP FAILURE: {}", e),
        }
    }

    fn handle_subscription_request(&self, link: &dyn E2apLink, pdu: E2apPdu) {
        let request = match parse_ric_subscription_request(&pdu) {
            Ok(request) => request,
            Err(e) => {
                warn!("Malformed RIC SUBSCRIPTION REQUEST: {}", e);
                return;
            }
        };
        info!(
            "RIC subscription {} for RAN function {} with {} actions",
            request.ric_request_id,
            request.ran_function_id,
            request.subscription_details.actions.len()
        );
        let outcome = self.subscribe(&request, link.indication_sink());
        Self::send(link, &subscription_response(&request, outcome));
    }

    /// Runs the subscription resolution chain.
    pub fn subscribe(&self, request: &RicSubscriptionRequest, sink: IndicationSink) -> SubscriptionOutcome {
        let Some(function) = self.registry.resolve(request.ran_function_id) else {
            warn!("RIC subscription for unknown RAN function {}", request.ran_function_id);
            return SubscriptionOutcome::failed(Cause::RicRequest(CauseRicRequest::RanFunctionIdInvalid));
        };
        match resolve_procedure(&function.e2sm, ProcedureCode::RIC_SUBSCRIPTION) {
            Some(Procedure::Subscription(handler)) => handler(&function.e2sm, request, sink),
            _ => {
                warn!("{} does not support RIC subscription", function.e2sm.short_name());
                SubscriptionOutcome::failed(Cause::RicService(CauseRicService::RanFunctionNotSupported))
            }
        }
    }

    fn handle_subscription_delete_request(&self, link: &dyn E2apLink, pdu: E2apPdu) {
        let request = match parse_ric_subscription_delete_request(&pdu) {
            Ok(request) => request,
            Err(e) => {
                warn!("Malformed RIC SUBSCRIPTION DELETE REQUEST: {}", e);
                return;
            }
        };
        info!(
            "RIC subscription delete {} for RAN function {}",
            request.ric_request_id, request.ran_function_id
        );
        let outcome = self.unsubscribe(&request);
        Self::send(link, &subscription_delete_response(&request, outcome));
    }

    /// Runs the subscription delete resolution chain.
    pub fn unsubscribe(&self, request: &RicSubscriptionDeleteRequest) -> SubscriptionDeleteOutcome {
        let Some(function) = self.registry.resolve(request.ran_function_id) else {
            warn!("RIC subscription delete for unknown RAN function {}", request.ran_function_id);
            return SubscriptionDeleteOutcome::failed(Cause::RicRequest(CauseRicRequest::RanFunctionIdInvalid));
        };
        match resolve_procedure(&function.e2sm, ProcedureCode::RIC_SUBSCRIPTION_DELETE) {
            Some(Procedure::SubscriptionDelete(handler)) => handler(&function.e2sm, request),
            _ => {
                warn!("{} does not support RIC subscription delete", function.e2sm.short_name());
                SubscriptionDeleteOutcome::failed(Cause::RicService(CauseRicService::RanFunctionNotSupported))
            }
        }
    }

    fn handle_control_request(&self, link: &dyn E2apLink, pdu: E2apPdu) {
        let request = match parse_ric_control_request(&pdu) {
            Ok(request) => request,
            Err(e) => {
                warn!("Malformed RIC CONTROL REQUEST: {}", e);
                return;
            }
        };
        info!(
            "RIC control {} for RAN function {}",
            request.ric_request_id, request.ran_function_id
        );
        let outcome = self.control(&request);
        if let Some(response) = control_response(&request, outcome) {
            Self::send(link, &response);
        }
    }

    /// Runs the control resolution chain.
    pub fn control(&self, request: &RicControlRequest) -> ControlOutcome {
        let Some(function) = self.registry.resolve(request.ran_function_id) else {
            warn!("RIC control for unknown RAN function {}", request.ran_function_id);
            return ControlOutcome::failed(Cause::RicRequest(CauseRicRequest::RanFunctionIdInvalid));
        };
        match resolve_procedure(&function.e2sm, ProcedureCode::RIC_CONTROL) {
            Some(Procedure::Control(handler)) => handler(&function.e2sm, request),
            _ => {
                warn!("{} does not support RIC control", function.e2sm.short_name());
                ControlOutcome::failed(Cause::RicService(CauseRicService::RanFunctionNotSupported))
            }
        }
    }

    fn handle_removal_response(&self, link: &dyn E2apLink, _pdu: E2apPdu) {
        info!("E2 removal acknowledged, shutting the connection down");
        link.shutdown();
    }
}

/// Response PDU for a subscription outcome.
///
/// The admitted list is SIZE(1..maxofRICactionID), so an outcome that
/// admitted nothing is answered with a failure carrying the first
/// rejection cause.
pub fn subscription_response(request: &RicSubscriptionRequest, outcome: SubscriptionOutcome) -> E2apPdu {
    let rid = request.ric_request_id;
    let fid = request.ran_function_id;
    if outcome.succeeded && !outcome.admitted.is_empty() {
        return build_ric_subscription_response(rid, fid, &outcome.admitted, &outcome.not_admitted);
    }

    // A success needs at least one admitted action to be encodable, so a
    // handler success with nothing admitted is reported as a failure
    let cause = outcome
        .cause
        .or_else(|| outcome.not_admitted.first().map(|item| item.cause))
        .unwrap_or(Cause::RicRequest(CauseRicRequest::ActionNotSupported));
    warn!("RIC subscription {} failed: {:?}", rid, cause);
    build_ric_subscription_failure(rid, fid, cause, outcome.diagnostics)
}

/// Response PDU for a subscription delete outcome
pub fn subscription_delete_response(
    request: &RicSubscriptionDeleteRequest,
    outcome: SubscriptionDeleteOutcome,
) -> E2apPdu {
    let rid = request.ric_request_id;
    let fid = request.ran_function_id;
    if outcome.succeeded() {
        return build_ric_subscription_delete_response(rid, fid);
    }
    let cause = outcome
        .cause
        .unwrap_or(Cause::RicRequest(CauseRicRequest::Unspecified));
    build_ric_subscription_delete_failure(rid, fid, cause, None)
}

/// Response PDU for a control outcome; `None` when no ack was requested.
pub fn control_response(request: &RicControlRequest, outcome: ControlOutcome) -> Option<E2apPdu> {
    let rid = request.ric_request_id;
    let fid = request.ran_function_id;
    if outcome.succeeded {
        if !wants_control_ack(request) {
            debug!("RIC control {} succeeded, no ack requested", rid);
            return None;
        }
        return Some(build_ric_control_acknowledge(
            rid,
            fid,
            request.call_process_id.clone(),
            outcome.outcome,
        ));
    }

    let cause = outcome
        .cause
        .unwrap_or(Cause::RicRequest(CauseRicRequest::Unspecified));
    warn!("RIC control {} failed: {:?}", rid, cause);
    Some(build_ric_control_failure(
        rid,
        fid,
        request.call_process_id.clone(),
        cause,
        outcome.outcome,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, Weak};

    use e2sim_common::GlobalE2NodeId;
    use e2sim_e2ap::ies::{GlobalRicId, RicActionToBeSetupItem, RicActionType, RicControlAckRequest, RicRequestId};
    use e2sim_e2ap::pdu::{SuccessfulOutcome, UnsuccessfulOutcome};
    use e2sim_e2ap::procedures::{
        build_e2_removal_response, build_e2_setup_request, build_e2_setup_response,
        build_ric_control_request, build_ric_subscription_delete_request,
        build_ric_subscription_request, parse_e2_setup_request, E2SetupRequestParams,
    };
    use e2sim_e2ap::encode_e2ap_pdu;

    use crate::e2ap::ConnectionError;
    use crate::e2sm::{delete_subscription, E2sm};

    #[derive(Default)]
    struct RecordingLink {
        sent: Mutex<Vec<E2apPdu>>,
        setup_responses: AtomicUsize,
        shutdowns: AtomicUsize,
    }

    impl RecordingLink {
        fn sent(&self) -> Vec<E2apPdu> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl E2apSender for RecordingLink {
        fn send_pdu(&self, pdu: &E2apPdu) -> Result<(), ConnectionError> {
            self.sent.lock().unwrap().push(pdu.clone());
            Ok(())
        }
    }

    impl E2apLink for RecordingLink {
        fn on_setup_response(&self) {
            self.setup_responses.fetch_add(1, Ordering::SeqCst);
        }

        fn shutdown(&self) {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        }

        fn indication_sink(&self) -> IndicationSink {
            let sender: Weak<dyn E2apSender> = Weak::<RecordingLink>::new();
            IndicationSink::new(sender)
        }
    }

    fn test_dispatcher(admit: bool) -> Dispatcher {
        let mut e2sm = E2sm::new("TEST", "1.2.3", "test");
        e2sm.add_procedure(Procedure::Subscription(Box::new(move |_, request, _| {
            let mut outcome = SubscriptionOutcome {
                succeeded: true,
                ..Default::default()
            };
            for action in &request.subscription_details.actions {
                if admit {
                    outcome.admit(action.action_id);
                } else {
                    outcome.reject(action.action_id, Cause::RicRequest(CauseRicRequest::DuplicateAction));
                }
            }
            outcome
        })));
        e2sm.add_procedure(Procedure::SubscriptionDelete(Box::new(delete_subscription)));
        e2sm.add_procedure(Procedure::Control(Box::new(|_, _| ControlOutcome::success(None))));

        let mut registry = RanFunctionRegistry::new();
        registry.register(1, 1, vec![0x00], Arc::new(e2sm));
        registry.register(2, 1, vec![0x00], Arc::new(E2sm::new("BARE", "1.2.4", "bare")));
        Dispatcher::new(Arc::new(registry))
    }

    fn subscription_request(ran_function_id: u16) -> Vec<u8> {
        let action = RicActionToBeSetupItem {
            action_id: 7,
            action_type: RicActionType::Report,
            action_definition: Some(vec![0x00]),
            subsequent_action: None,
        };
        let pdu = build_ric_subscription_request(RicRequestId::new(22, 6), ran_function_id, vec![0x00], vec![action]);
        encode_e2ap_pdu(&pdu).unwrap()
    }

    fn subscription_failure_cause(pdu: &E2apPdu) -> Cause {
        match pdu {
            E2apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::RicSubscription(failure)) => failure.cause,
            other => panic!("expected subscription failure, got {}", other.message_name()),
        }
    }

    #[test]
    fn test_subscription_admitted() {
        let dispatcher = test_dispatcher(true);
        let link = RecordingLink::default();
        dispatcher.handle(&subscription_request(1), &link, Instant::now());

        let sent = link.sent();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            E2apPdu::SuccessfulOutcome(SuccessfulOutcome::RicSubscription(response)) => {
                assert_eq!(response.ric_request_id, RicRequestId::new(22, 6));
                assert_eq!(response.actions_admitted, vec![7]);
                assert!(response.actions_not_admitted.is_empty());
            }
            other => panic!("unexpected {}", other.message_name()),
        }
    }

    #[test]
    fn test_subscription_unknown_function() {
        let dispatcher = test_dispatcher(true);
        let link = RecordingLink::default();
        dispatcher.handle(&subscription_request(9), &link, Instant::now());
        assert_eq!(
            subscription_failure_cause(&link.sent()[0]),
            Cause::RicRequest(CauseRicRequest::RanFunctionIdInvalid)
        );
    }

    #[test]
    fn test_subscription_unsupported_procedure() {
        let dispatcher = test_dispatcher(true);
        let link = RecordingLink::default();
        dispatcher.handle(&subscription_request(2), &link, Instant::now());
        assert_eq!(
            subscription_failure_cause(&link.sent()[0]),
            Cause::RicService(CauseRicService::RanFunctionNotSupported)
        );
    }

    #[test]
    fn test_subscription_nothing_admitted_fails() {
        let dispatcher = test_dispatcher(false);
        let link = RecordingLink::default();
        dispatcher.handle(&subscription_request(1), &link, Instant::now());
        assert_eq!(
            subscription_failure_cause(&link.sent()[0]),
            Cause::RicRequest(CauseRicRequest::DuplicateAction)
        );
    }

    #[test]
    fn test_delete_without_actions_fails() {
        let dispatcher = test_dispatcher(true);
        let link = RecordingLink::default();
        let pdu = build_ric_subscription_delete_request(RicRequestId::new(22, 6), 1);
        dispatcher.handle(&encode_e2ap_pdu(&pdu).unwrap(), &link, Instant::now());

        match &link.sent()[0] {
            E2apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::RicSubscriptionDelete(failure)) => {
                assert_eq!(failure.cause, Cause::RicRequest(CauseRicRequest::Unspecified));
            }
            other => panic!("unexpected {}", other.message_name()),
        }
    }

    #[test]
    fn test_control_ack_only_when_requested() {
        let dispatcher = test_dispatcher(true);
        let rid = RicRequestId::new(1, 1);

        let link = RecordingLink::default();
        let no_ack = build_ric_control_request(rid, 1, vec![0x00], vec![0x00], Some(RicControlAckRequest::NoAck));
        dispatcher.handle(&encode_e2ap_pdu(&no_ack).unwrap(), &link, Instant::now());
        assert!(link.sent().is_empty());

        let absent = build_ric_control_request(rid, 1, vec![0x00], vec![0x00], None);
        dispatcher.handle(&encode_e2ap_pdu(&absent).unwrap(), &link, Instant::now());
        assert!(matches!(
            link.sent()[0],
            E2apPdu::SuccessfulOutcome(SuccessfulOutcome::RicControl(_))
        ));
    }

    #[test]
    fn test_control_failure_always_sent() {
        let dispatcher = test_dispatcher(true);
        let link = RecordingLink::default();
        let pdu = build_ric_control_request(
            RicRequestId::new(1, 1),
            2,
            vec![0x00],
            vec![0x00],
            Some(RicControlAckRequest::NoAck),
        );
        dispatcher.handle(&encode_e2ap_pdu(&pdu).unwrap(), &link, Instant::now());
        match &link.sent()[0] {
            E2apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::RicControl(failure)) => {
                assert_eq!(failure.cause, Cause::RicService(CauseRicService::RanFunctionNotSupported));
            }
            other => panic!("unexpected {}", other.message_name()),
        }
    }

    #[test]
    fn test_setup_response_stops_retries() {
        let dispatcher = test_dispatcher(true);
        let link = RecordingLink::default();
        let params = E2SetupRequestParams {
            transaction_id: 1,
            global_e2node_id: GlobalE2NodeId::new("001", "01", 1).unwrap(),
            ran_functions: dispatcher.registry().ran_function_items(),
        };
        let request = parse_e2_setup_request(&build_e2_setup_request(&params)).unwrap();
        let response = build_e2_setup_response(
            &request,
            GlobalRicId {
                plmn: [0x00, 0xf1, 0x10],
                ric_id: 0x12345,
            },
        );
        dispatcher.handle(&encode_e2ap_pdu(&response).unwrap(), &link, Instant::now());
        assert_eq!(link.setup_responses.load(Ordering::SeqCst), 1);
        assert!(link.sent().is_empty());
    }

    #[test]
    fn test_removal_response_shuts_down() {
        let dispatcher = test_dispatcher(true);
        let link = RecordingLink::default();
        let pdu = build_e2_removal_response(3);
        dispatcher.handle(&encode_e2ap_pdu(&pdu).unwrap(), &link, Instant::now());
        assert_eq!(link.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_undecodable_is_dropped() {
        let dispatcher = test_dispatcher(true);
        let link = RecordingLink::default();
        dispatcher.handle(&[], &link, Instant::now());
        assert!(link.sent().is_empty());
        assert_eq!(link.shutdowns.load(Ordering::SeqCst), 0);
    }
}
