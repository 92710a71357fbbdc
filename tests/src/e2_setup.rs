//! E2 setup integration tests
//!
//! Tests the setup handshake, its retry bound and connection teardown
//! against the mock RIC.

use std::time::Duration;

use e2sim_e2ap::pdu::InitiatingMessage;
use e2sim_e2ap::procedures::{build_e2_removal_response, parse_e2_removal_request};
use e2sim_e2ap::{E2apPdu, ProcedureCode};
use e2sim_node::ConnectionState;
use integration_tests::{
    init_test_logging, test_node_config, wait_until, TestNode, TestNodeConfig, DEFAULT_TEST_TIMEOUT,
    TEST_RAN_FUNCTION_ID,
};

/// Transaction ids of the E2 SETUP REQUESTs among `pdus`
fn setup_transactions(pdus: &[E2apPdu]) -> Vec<u8> {
    pdus.iter()
        .filter_map(|pdu| match pdu {
            E2apPdu::InitiatingMessage(InitiatingMessage::E2Setup(request)) => Some(request.transaction_id),
            _ => None,
        })
        .collect()
}

/// Test the setup request content and that a response stops the retries
#[test]
fn test_setup_response_stops_retries() {
    init_test_logging();

    let node = TestNode::start(TestNodeConfig::default().with_retry_interval(300).build()).unwrap();
    let request = node.ric.accept_setup(DEFAULT_TEST_TIMEOUT).unwrap();

    assert_eq!(request.transaction_id, 0);
    assert_eq!(request.ran_functions_added.len(), 1);
    assert_eq!(request.ran_functions_added[0].ran_function_id, TEST_RAN_FUNCTION_ID);
    assert!(!request.ran_functions_added[0].definition.is_empty());

    wait_until(|| node.connection.state() == ConnectionState::Ready, DEFAULT_TEST_TIMEOUT).unwrap();

    // Two full retry intervals pass without another request
    let later = node.ric.collect(Duration::from_millis(700));
    assert!(setup_transactions(&later).is_empty());
    assert_eq!(node.connection.setup_attempts(), 1);
    assert_eq!(node.hook.count(), 0);

    node.app.shutdown();
    assert_eq!(node.connection.state(), ConnectionState::Closed);
}

/// Test that an unanswered setup is retried exactly `retries` times and then
/// terminates the node
#[test]
fn test_setup_retries_bounded() {
    init_test_logging();

    let node = TestNode::start(TestNodeConfig::default().with_retry_interval(40).build()).unwrap();

    wait_until(|| node.hook.count() == 1, DEFAULT_TEST_TIMEOUT).unwrap();
    let sent = node.ric.collect(Duration::from_millis(200));

    assert_eq!(setup_transactions(&sent), vec![0, 1, 2]);
    assert_eq!(node.connection.setup_attempts(), 3);
    assert_eq!(node.hook.count(), 1);

    node.app.shutdown();
}

/// Test that E2 REMOVAL RESPONSE shuts the connection down
#[test]
fn test_e2_removal() {
    init_test_logging();

    let node = TestNode::ready(test_node_config()).unwrap();
    node.connection.request_removal().unwrap();

    let pdu = node.ric.recv(DEFAULT_TEST_TIMEOUT).unwrap();
    assert_eq!(pdu.procedure_code(), ProcedureCode::E2_REMOVAL);
    let request = parse_e2_removal_request(&pdu).unwrap();
    node.ric.send(&build_e2_removal_response(request.transaction_id)).unwrap();

    wait_until(|| node.connection.state() == ConnectionState::Closed, DEFAULT_TEST_TIMEOUT).unwrap();
    assert!(!node.connection.is_running());
    assert_eq!(node.hook.count(), 0);

    node.app.shutdown();
}

/// Test that the RIC closing the association stops the listener
#[test]
fn test_peer_close_stops_connection() {
    init_test_logging();

    let node = TestNode::ready(test_node_config()).unwrap();
    node.ric.close();

    wait_until(|| node.connection.state() == ConnectionState::Closed, DEFAULT_TEST_TIMEOUT).unwrap();
    assert!(!node.connection.is_running());
    assert_eq!(node.hook.count(), 0);

    node.app.shutdown();
}
