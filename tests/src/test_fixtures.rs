//! Test fixtures and configuration helpers
//!
//! Node configurations tuned for fast tests and the RIC-side message
//! builders the scenarios share.

use e2sim_common::{E2NodeConfig, Imsi, RanFunctionConfig, SetupConfig};
use e2sim_e2ap::codec;
use e2sim_e2ap::ies::{RicActionToBeSetupItem, RicActionType};
use e2sim_e2sm_rc::{
    E2smRcActionDefinition, E2smRcControlHeader, E2smRcControlMessage, E2smRcEventTrigger, EventTriggerFormat4,
    GnbUeId, NrCgiIe, RanParameterId, RanParameterItem, RanParameterStructure, RanParameterToBeReported,
    RanParameterValue, RanParameterValueType, RrcState, RrcStateItem, TriggerType, UeId, UeInfoChangeItem,
};

/// IMSI of the UE the scenarios admit
pub const TEST_IMSI: &str = "001010000000001";

/// RAN function served by [`test_node_config`]
pub const TEST_RAN_FUNCTION_ID: u16 = 1;

/// Node configuration with short timers
#[derive(Debug, Clone)]
pub struct TestNodeConfig {
    pub retries: u32,
    pub retry_interval_ms: u64,
    pub recv_timeout_ms: u64,
}

impl Default for TestNodeConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_interval_ms: 500,
            recv_timeout_ms: 20,
        }
    }
}

impl TestNodeConfig {
    pub fn with_retry_interval(mut self, retry_interval_ms: u64) -> Self {
        self.retry_interval_ms = retry_interval_ms;
        self
    }

    pub fn build(&self) -> E2NodeConfig {
        E2NodeConfig {
            mcc: "001".to_string(),
            mnc: "01".to_string(),
            gnb_id: 1,
            cell_id: 1,
            ran_functions: vec![RanFunctionConfig {
                id: TEST_RAN_FUNCTION_ID,
                revision: 1,
            }],
            setup: SetupConfig {
                retries: self.retries,
                retry_interval_ms: self.retry_interval_ms,
                recv_timeout_ms: self.recv_timeout_ms,
                connect_timeout_s: 1,
            },
            ..Default::default()
        }
    }
}

/// Default test node configuration
pub fn test_node_config() -> E2NodeConfig {
    TestNodeConfig::default().build()
}

/// Event trigger Format 4 asking for the given RRC states
pub fn rrc_state_trigger(condition_id: u16, states: &[RrcState]) -> Vec<u8> {
    let items = states
        .iter()
        .map(|state| RrcStateItem {
            state_changed_to: *state,
            logical_or: None,
        })
        .collect();
    let trigger = E2smRcEventTrigger::Format4(EventTriggerFormat4 {
        ue_info_changes: vec![UeInfoChangeItem {
            condition_id,
            trigger_type: TriggerType::RrcState(items),
            logical_or: None,
        }],
    });
    codec::encode(&trigger).expect("event trigger encodes")
}

/// Action definition Format 1 for Report Style 4
pub fn report_style4_definition(parameters: &[RanParameterId]) -> Vec<u8> {
    let parameters = parameters.iter().map(|id| RanParameterToBeReported::new(*id)).collect();
    codec::encode(&E2smRcActionDefinition::format1(4, parameters)).expect("action definition encodes")
}

pub fn report_action(action_id: u8, definition: Vec<u8>) -> RicActionToBeSetupItem {
    RicActionToBeSetupItem {
        action_id,
        action_type: RicActionType::Report,
        action_definition: Some(definition),
        subsequent_action: None,
    }
}

/// Control header for Style 3 handover of [`TEST_IMSI`]
pub fn handover_control_header() -> Vec<u8> {
    let imsi = Imsi::parse(TEST_IMSI, 2).expect("valid test IMSI");
    let header = E2smRcControlHeader {
        ue_id: UeId::Gnb(GnbUeId::from_imsi(&imsi).expect("IMSI fits the UE id")),
        style_type: 3,
        control_action_id: 1,
        decision: None,
    };
    codec::encode(&header).expect("control header encodes")
}

/// Control message carrying the target primary cell
pub fn handover_control_message(target: NrCgiIe) -> Vec<u8> {
    let cgi = codec::encode(&target).expect("NR CGI encodes");
    let nest = |id, items| RanParameterItem::new(id, RanParameterValueType::Structure(RanParameterStructure::new(items)));
    let leaf = RanParameterItem::new(4, RanParameterValueType::ElementFalse(Some(RanParameterValue::OctetString(cgi))));
    let tree = nest(1, vec![nest(2, vec![nest(3, vec![leaf])])]);
    codec::encode(&E2smRcControlMessage::new(vec![tree])).expect("control message encodes")
}

/// E2SM-RC payload that no decoder accepts: the outer SEQUENCE has its
/// extension bit set and announces -1 extension additions
pub fn malformed_e2sm_payload() -> Vec<u8> {
    vec![0x80, 0x00, 0x00, 0x80, 0x01, 0xFF]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_config_is_valid() {
        let config = test_node_config();
        assert!(e2sim_node::validate_e2node_config(&config).is_ok());
        assert_eq!(config.setup.retries, 3);
        assert_eq!(config.ran_functions.len(), 1);
    }

    #[test]
    fn test_short_retry_interval() {
        let config = TestNodeConfig::default().with_retry_interval(40).build();
        assert_eq!(config.setup.retry_interval_ms, 40);
        assert_eq!(config.global_e2node_id().unwrap().gnb_id().value(), 1);
    }

    #[test]
    fn test_malformed_payload_rejected() {
        let bytes = malformed_e2sm_payload();
        assert!(codec::decode::<E2smRcControlMessage>(&bytes).is_err());
        assert!(codec::decode::<E2smRcEventTrigger>(&bytes).is_err());
        assert!(codec::decode::<E2smRcActionDefinition>(&bytes).is_err());
    }
}
