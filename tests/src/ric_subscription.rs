//! RIC subscription integration tests
//!
//! Tests E2SM-RC Report Style 4 subscriptions end to end: admission, the
//! indications raised by UE admission events and subscription deletion.

use std::time::Duration;

use e2sim_e2ap::codec;
use e2sim_e2ap::ies::{
    Cause, CauseProtocol, CauseRicRequest, RicActionToBeSetupItem, RicActionType, RicIndicationType,
};
use e2sim_e2ap::procedures::{
    build_ric_subscription_delete_request, build_ric_subscription_request, is_ric_subscription_delete_response,
    parse_ric_indication, parse_ric_subscription_delete_failure, parse_ric_subscription_failure,
    parse_ric_subscription_response,
};
use e2sim_e2ap::RicRequestId;
use e2sim_e2sm_rc::{E2smRcIndicationHeader, E2smRcIndicationMessage, RrcState};
use e2sim_node::UeInfo;
use integration_tests::test_fixtures::{
    malformed_e2sm_payload, report_action, report_style4_definition, rrc_state_trigger,
};
use integration_tests::{
    init_test_logging, test_node_config, MockRicError, TestNode, DEFAULT_TEST_TIMEOUT, TEST_IMSI,
    TEST_RAN_FUNCTION_ID,
};

const RRC_STATE_CHANGED_TO: u32 = 202;
const REQUEST_ID: RicRequestId = RicRequestId::new(22, 6);
const QUIET: Duration = Duration::from_millis(200);

fn subscribe(node: &TestNode, actions: Vec<RicActionToBeSetupItem>) {
    let trigger = rrc_state_trigger(5, &[RrcState::RrcConnected]);
    node.ric
        .send(&build_ric_subscription_request(REQUEST_ID, TEST_RAN_FUNCTION_ID, trigger, actions))
        .unwrap();
}

/// Test admission of a Report Style 4 action and the indication raised when
/// a UE is admitted
#[test]
fn test_subscription_admits_and_reports() {
    init_test_logging();

    let node = TestNode::ready(test_node_config()).unwrap();
    subscribe(&node, vec![report_action(7, report_style4_definition(&[RRC_STATE_CHANGED_TO]))]);

    let response = parse_ric_subscription_response(&node.ric.recv(DEFAULT_TEST_TIMEOUT).unwrap()).unwrap();
    assert_eq!(response.ric_request_id, REQUEST_ID);
    assert_eq!(response.ran_function_id, TEST_RAN_FUNCTION_ID);
    assert_eq!(response.actions_admitted, vec![7]);
    assert!(response.actions_not_admitted.is_empty());
    assert_eq!(node.app.environment().observer_count(), 1);

    assert_eq!(node.app.environment().association_request(&UeInfo::new(TEST_IMSI, "10.0.0.2")), 0);
    assert!(node.app.ue_list().get_ue_info(TEST_IMSI).is_some());

    let indication = parse_ric_indication(&node.ric.recv(DEFAULT_TEST_TIMEOUT).unwrap()).unwrap();
    assert_eq!(indication.ric_request_id, REQUEST_ID);
    assert_eq!(indication.ran_function_id, TEST_RAN_FUNCTION_ID);
    assert_eq!(indication.action_id, 7);
    assert_eq!(indication.sequence_number, Some(0));
    assert_eq!(indication.indication_type, RicIndicationType::Report);

    let header: E2smRcIndicationHeader = codec::decode(&indication.header).unwrap();
    assert_eq!(header.condition_id, Some(5));
    let message: E2smRcIndicationMessage = codec::decode(&indication.message).unwrap();
    assert_eq!(message.ue_parameters.len(), 1);
    let ue = &message.ue_parameters[0];
    assert_eq!(ue.ue_id.gnb().imsi().to_string(), TEST_IMSI);
    assert_eq!(ue.ran_parameters.len(), 1);
    assert_eq!(ue.ran_parameters[0].id, RRC_STATE_CHANGED_TO);

    node.app.shutdown();
    assert_eq!(node.app.environment().observer_count(), 0);
}

/// Test that deleting a subscription stops its reports and that a second
/// delete fails
#[test]
fn test_subscription_delete() {
    init_test_logging();

    let node = TestNode::ready(test_node_config()).unwrap();
    subscribe(&node, vec![report_action(7, report_style4_definition(&[RRC_STATE_CHANGED_TO]))]);
    parse_ric_subscription_response(&node.ric.recv(DEFAULT_TEST_TIMEOUT).unwrap()).unwrap();

    let delete = build_ric_subscription_delete_request(REQUEST_ID, TEST_RAN_FUNCTION_ID);
    node.ric.send(&delete).unwrap();
    assert!(is_ric_subscription_delete_response(&node.ric.recv(DEFAULT_TEST_TIMEOUT).unwrap()));
    assert_eq!(node.app.environment().observer_count(), 0);

    node.app.environment().association_request(&UeInfo::new(TEST_IMSI, "10.0.0.2"));
    assert!(matches!(node.ric.recv(QUIET), Err(MockRicError::Timeout(_))));

    node.ric.send(&delete).unwrap();
    let failure = parse_ric_subscription_delete_failure(&node.ric.recv(DEFAULT_TEST_TIMEOUT).unwrap()).unwrap();
    assert_eq!(failure.ric_request_id, REQUEST_ID);
    assert_eq!(failure.cause, Cause::RicRequest(CauseRicRequest::Unspecified));

    node.app.shutdown();
}

/// Test that a subscription admitting no action is answered with a failure
#[test]
fn test_subscription_without_supported_actions() {
    init_test_logging();

    let node = TestNode::ready(test_node_config()).unwrap();
    let mut insert = report_action(3, report_style4_definition(&[RRC_STATE_CHANGED_TO]));
    insert.action_type = RicActionType::Insert;
    subscribe(&node, vec![insert]);

    let failure = parse_ric_subscription_failure(&node.ric.recv(DEFAULT_TEST_TIMEOUT).unwrap()).unwrap();
    assert_eq!(failure.ric_request_id, REQUEST_ID);
    assert_eq!(failure.cause, Cause::RicRequest(CauseRicRequest::ActionNotSupported));
    assert_eq!(node.app.environment().observer_count(), 0);

    node.app.shutdown();
}

/// Test that a subscription for an unknown RAN function is rejected
#[test]
fn test_subscription_unknown_ran_function() {
    init_test_logging();

    let node = TestNode::ready(test_node_config()).unwrap();
    let request = build_ric_subscription_request(
        REQUEST_ID,
        9,
        rrc_state_trigger(5, &[RrcState::RrcConnected]),
        vec![report_action(7, report_style4_definition(&[RRC_STATE_CHANGED_TO]))],
    );
    node.ric.send(&request).unwrap();

    let failure = parse_ric_subscription_failure(&node.ric.recv(DEFAULT_TEST_TIMEOUT).unwrap()).unwrap();
    assert_eq!(failure.ran_function_id, 9);
    assert_eq!(failure.cause, Cause::RicRequest(CauseRicRequest::RanFunctionIdInvalid));

    node.app.shutdown();
}

/// Test that a corrupted event trigger fails the request and a later valid
/// request is still admitted
#[test]
fn test_malformed_event_trigger() {
    init_test_logging();

    let node = TestNode::ready(test_node_config()).unwrap();
    let request = build_ric_subscription_request(
        REQUEST_ID,
        TEST_RAN_FUNCTION_ID,
        malformed_e2sm_payload(),
        vec![report_action(7, report_style4_definition(&[RRC_STATE_CHANGED_TO]))],
    );
    node.ric.send(&request).unwrap();

    let failure = parse_ric_subscription_failure(&node.ric.recv(DEFAULT_TEST_TIMEOUT).unwrap()).unwrap();
    assert_eq!(failure.ric_request_id, REQUEST_ID);
    assert_eq!(failure.cause, Cause::Protocol(CauseProtocol::TransferSyntaxError));
    assert_eq!(node.app.environment().observer_count(), 0);

    subscribe(&node, vec![report_action(7, report_style4_definition(&[RRC_STATE_CHANGED_TO]))]);
    let response = parse_ric_subscription_response(&node.ric.recv(DEFAULT_TEST_TIMEOUT).unwrap()).unwrap();
    assert_eq!(response.actions_admitted, vec![7]);

    node.app.shutdown();
}

/// Test that an action with a corrupted definition is not admitted while a
/// well-formed sibling is
#[test]
fn test_malformed_action_definition() {
    init_test_logging();

    let node = TestNode::ready(test_node_config()).unwrap();
    subscribe(
        &node,
        vec![
            report_action(2, malformed_e2sm_payload()),
            report_action(7, report_style4_definition(&[RRC_STATE_CHANGED_TO])),
        ],
    );

    let response = parse_ric_subscription_response(&node.ric.recv(DEFAULT_TEST_TIMEOUT).unwrap()).unwrap();
    assert_eq!(response.actions_admitted, vec![7]);
    assert_eq!(response.actions_not_admitted.len(), 1);
    assert_eq!(response.actions_not_admitted[0].action_id, 2);
    assert_eq!(
        response.actions_not_admitted[0].cause,
        Cause::RicRequest(CauseRicRequest::ActionNotSupported)
    );

    node.app.shutdown();
}
