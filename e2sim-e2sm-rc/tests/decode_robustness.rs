//! Decoding of damaged E2SM-RC payloads
//!
//! The RIC hands these over as opaque octet strings, so any byte pattern can
//! reach the decoders. Each must fail with an error, never unwind.

use std::panic;

use e2sim_common::Imsi;
use e2sim_e2ap::codec::{self, AsnType};
use e2sim_e2sm_rc::{
    E2smRcActionDefinition, E2smRcControlHeader, E2smRcControlMessage, E2smRcEventTrigger, EventTriggerFormat4,
    GnbUeId, RanParameterItem, RanParameterStructure, RanParameterToBeReported, RanParameterValue,
    RanParameterValueType, RrcState, RrcStateItem, TriggerType, UeId, UeInfoChangeItem,
};
use proptest::prelude::*;
use proptest::sample::Index;

/// Extension bit set on the outer SEQUENCE, extension count -1
const NEGATIVE_EXTENSION_COUNT: [u8; 6] = [0x80, 0x00, 0x00, 0x80, 0x01, 0xFF];

fn control_message() -> Vec<u8> {
    let leaf = RanParameterItem::new(
        4,
        RanParameterValueType::ElementFalse(Some(RanParameterValue::OctetString(vec![0x00, 0xF1, 0x10, 0, 0, 0, 0x40, 0x01]))),
    );
    let tree = RanParameterItem::new(
        1,
        RanParameterValueType::Structure(RanParameterStructure::new(vec![RanParameterItem::new(
            2,
            RanParameterValueType::List(vec![RanParameterStructure::new(vec![leaf])]),
        )])),
    );
    codec::encode(&E2smRcControlMessage::new(vec![tree])).unwrap()
}

fn control_header() -> Vec<u8> {
    let imsi = Imsi::parse("001010000000001", 2).unwrap();
    codec::encode(&E2smRcControlHeader {
        ue_id: UeId::Gnb(GnbUeId::from_imsi(&imsi).unwrap()),
        style_type: 3,
        control_action_id: 1,
        decision: None,
    })
    .unwrap()
}

fn event_trigger() -> Vec<u8> {
    codec::encode(&E2smRcEventTrigger::Format4(EventTriggerFormat4 {
        ue_info_changes: vec![UeInfoChangeItem {
            condition_id: 5,
            trigger_type: TriggerType::RrcState(vec![RrcStateItem {
                state_changed_to: RrcState::RrcConnected,
                logical_or: None,
            }]),
            logical_or: None,
        }],
    }))
    .unwrap()
}

fn action_definition() -> Vec<u8> {
    codec::encode(&E2smRcActionDefinition::format1(4, vec![RanParameterToBeReported::new(202)])).unwrap()
}

fn decodes_without_panic<T: AsnType>(bytes: &[u8]) -> bool {
    panic::catch_unwind(|| {
        let _ = codec::decode::<T>(bytes);
    })
    .is_ok()
}

fn all_decode_without_panic(bytes: &[u8]) -> bool {
    decodes_without_panic::<E2smRcControlMessage>(bytes)
        && decodes_without_panic::<E2smRcControlHeader>(bytes)
        && decodes_without_panic::<E2smRcEventTrigger>(bytes)
        && decodes_without_panic::<E2smRcActionDefinition>(bytes)
}

#[test]
fn test_negative_extension_count_rejected() {
    assert!(codec::decode::<E2smRcControlMessage>(&NEGATIVE_EXTENSION_COUNT).is_err());
    assert!(codec::decode::<E2smRcEventTrigger>(&NEGATIVE_EXTENSION_COUNT).is_err());
    assert!(codec::decode::<E2smRcActionDefinition>(&NEGATIVE_EXTENSION_COUNT).is_err());
}

#[test]
fn test_truncated_payloads_fail_cleanly() {
    for bytes in [control_message(), control_header(), event_trigger(), action_definition()] {
        for len in 0..bytes.len() {
            assert!(all_decode_without_panic(&bytes[..len]), "truncated at {len}");
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    #[test]
    fn test_random_payloads_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        prop_assert!(all_decode_without_panic(&bytes));
    }

    #[test]
    fn test_mutated_payloads_never_panic(
        seed in any::<Index>(),
        mutations in prop::collection::vec((any::<Index>(), any::<u8>()), 1..6),
    ) {
        let seeds = [control_message(), control_header(), event_trigger(), action_definition()];
        let mut bytes = seed.get(&seeds).clone();
        for (at, value) in mutations {
            let i = at.index(bytes.len());
            bytes[i] = value;
        }
        prop_assert!(all_decode_without_panic(&bytes));
    }
}
