//! RIC control integration tests
//!
//! Tests E2SM-RC Control Style 3 handover requests and their
//! acknowledgement against the mock RIC.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use e2sim_common::GlobalE2NodeId;
use e2sim_e2ap::ies::{Cause, CauseProtocol, CauseRicRequest, RicControlAckRequest};
use e2sim_e2ap::procedures::{build_ric_control_request, is_ric_control_acknowledge, parse_ric_control_failure};
use e2sim_e2ap::RicRequestId;
use e2sim_e2sm_rc::NrCgiIe;
use e2sim_node::environment::{HandoverListener, HandoverTarget};
use integration_tests::test_fixtures::{handover_control_header, handover_control_message, malformed_e2sm_payload};
use integration_tests::{
    init_test_logging, test_node_config, wait_until, MockRicError, TestNode, DEFAULT_TEST_TIMEOUT, TEST_IMSI,
    TEST_RAN_FUNCTION_ID,
};

const REQUEST_ID: RicRequestId = RicRequestId::new(30, 1);

#[derive(Default)]
struct Handovers(Mutex<Vec<HandoverTarget>>);

impl Handovers {
    fn recorded(&self) -> Vec<HandoverTarget> {
        self.0.lock().unwrap().clone()
    }
}

impl HandoverListener for Handovers {
    fn handover(&self, target: &HandoverTarget) {
        self.0.lock().unwrap().push(target.clone());
    }
}

fn target_cell() -> NrCgiIe {
    NrCgiIe::from(GlobalE2NodeId::new("310", "410", 77).unwrap().cell(3))
}

fn expected_target() -> HandoverTarget {
    HandoverTarget {
        imsi: TEST_IMSI.to_string(),
        mcc: "310".to_string(),
        mnc: "410".to_string(),
        gnb_id: 77,
    }
}

fn node_with_ue() -> (TestNode, Arc<Handovers>) {
    let node = TestNode::ready(test_node_config()).unwrap();
    let handovers = Arc::new(Handovers::default());
    node.app.environment().set_handover_listener(handovers.clone());
    node.app.ue_list().add_ue(TEST_IMSI, "10.0.0.2");
    (node, handovers)
}

/// Test a handover request that asks for an acknowledge
#[test]
fn test_handover_acknowledged() {
    init_test_logging();

    let (node, handovers) = node_with_ue();
    let request = build_ric_control_request(
        REQUEST_ID,
        TEST_RAN_FUNCTION_ID,
        handover_control_header(),
        handover_control_message(target_cell()),
        Some(RicControlAckRequest::Ack),
    );
    node.ric.send(&request).unwrap();

    assert!(is_ric_control_acknowledge(&node.ric.recv(DEFAULT_TEST_TIMEOUT).unwrap()));
    assert_eq!(handovers.recorded(), vec![expected_target()]);

    node.app.shutdown();
}

/// Test that `noAck` suppresses the acknowledge but not the handover
#[test]
fn test_handover_without_ack() {
    init_test_logging();

    let (node, handovers) = node_with_ue();
    let request = build_ric_control_request(
        REQUEST_ID,
        TEST_RAN_FUNCTION_ID,
        handover_control_header(),
        handover_control_message(target_cell()),
        Some(RicControlAckRequest::NoAck),
    );
    node.ric.send(&request).unwrap();

    wait_until(|| !handovers.recorded().is_empty(), DEFAULT_TEST_TIMEOUT).unwrap();
    assert_eq!(handovers.recorded(), vec![expected_target()]);
    assert!(matches!(
        node.ric.recv(Duration::from_millis(200)),
        Err(MockRicError::Timeout(_))
    ));

    node.app.shutdown();
}

/// Test that a handover of an unknown UE fails
#[test]
fn test_handover_of_unknown_ue() {
    init_test_logging();

    let (node, handovers) = node_with_ue();
    node.app.ue_list().remove_ue(TEST_IMSI);
    let request = build_ric_control_request(
        REQUEST_ID,
        TEST_RAN_FUNCTION_ID,
        handover_control_header(),
        handover_control_message(target_cell()),
        None,
    );
    node.ric.send(&request).unwrap();

    let failure = parse_ric_control_failure(&node.ric.recv(DEFAULT_TEST_TIMEOUT).unwrap()).unwrap();
    assert_eq!(failure.ric_request_id, REQUEST_ID);
    assert_eq!(failure.cause, Cause::RicRequest(CauseRicRequest::ControlMessageInvalid));
    assert!(handovers.recorded().is_empty());

    node.app.shutdown();
}

/// Test that an undecodable control message is refused and the node keeps
/// serving requests afterwards
#[test]
fn test_malformed_control_message() {
    init_test_logging();

    let (node, handovers) = node_with_ue();
    let malformed = build_ric_control_request(
        REQUEST_ID,
        TEST_RAN_FUNCTION_ID,
        handover_control_header(),
        malformed_e2sm_payload(),
        Some(RicControlAckRequest::Ack),
    );
    node.ric.send(&malformed).unwrap();

    let failure = parse_ric_control_failure(&node.ric.recv(DEFAULT_TEST_TIMEOUT).unwrap()).unwrap();
    assert_eq!(failure.ric_request_id, REQUEST_ID);
    assert_eq!(
        failure.cause,
        Cause::Protocol(CauseProtocol::AbstractSyntaxErrorFalselyConstructedMessage)
    );
    assert!(handovers.recorded().is_empty());

    let valid = build_ric_control_request(
        REQUEST_ID,
        TEST_RAN_FUNCTION_ID,
        handover_control_header(),
        handover_control_message(target_cell()),
        Some(RicControlAckRequest::Ack),
    );
    node.ric.send(&valid).unwrap();
    assert!(is_ric_control_acknowledge(&node.ric.recv(DEFAULT_TEST_TIMEOUT).unwrap()));
    assert_eq!(handovers.recorded(), vec![expected_target()]);

    node.app.shutdown();
}

/// Test that an undecodable E2AP message is dropped without a reply
#[test]
fn test_undecodable_pdu_dropped() {
    init_test_logging();

    let (node, handovers) = node_with_ue();
    node.ric.send_raw(&[0xFF, 0xFF, 0xFF]).unwrap();
    assert!(matches!(
        node.ric.recv(Duration::from_millis(200)),
        Err(MockRicError::Timeout(_))
    ));

    let valid = build_ric_control_request(
        REQUEST_ID,
        TEST_RAN_FUNCTION_ID,
        handover_control_header(),
        handover_control_message(target_cell()),
        Some(RicControlAckRequest::Ack),
    );
    node.ric.send(&valid).unwrap();
    assert!(is_ric_control_acknowledge(&node.ric.recv(DEFAULT_TEST_TIMEOUT).unwrap()));
    assert_eq!(handovers.recorded(), vec![expected_target()]);

    node.app.shutdown();
}
