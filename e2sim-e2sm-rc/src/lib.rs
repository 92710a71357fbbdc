//! E2SM-RC service model types
//!
//! Aligned PER model of the O-RAN E2SM-RC v1.03 structures the simulator
//! exchanges inside E2AP octet strings. Every top-level structure implements
//! [`AsnType`](e2sim_e2ap::AsnType), so it goes through
//! [`e2sim_e2ap::codec::encode`] and [`e2sim_e2ap::codec::decode`].
//!
//! # Modules
//!
//! - `event_trigger` - Event trigger definition (Format 4, UE information change)
//! - `action_definition` - Action definition (Format 1, RAN parameters to report)
//! - `indication` - Indication header (Format 1) and message (Format 2)
//! - `control` - Control header (Format 1) and message (Format 1)
//! - `ran_function_definition` - Capability description sent at E2 setup
//! - `ran_parameter` - RAN parameter definitions and values
//! - `ue_id` - gNB UE identity
//! - `nr_cgi` - NR cell global identity

pub mod action_definition;
pub mod control;
pub mod event_trigger;
pub mod indication;
pub mod nr_cgi;
pub mod ran_function_definition;
pub mod ran_parameter;
pub mod ue_id;

pub use action_definition::{E2smRcActionDefinition, RanParameterToBeReported, RicStyleType};
pub use control::{ControlActionId, E2smRcControlHeader, E2smRcControlMessage};
pub use event_trigger::{
    E2smRcEventTrigger, EventTriggerConditionId, EventTriggerFormat4, LogicalOr, RrcState,
    RrcStateItem, TriggerType, UeInfoChangeItem,
};
pub use indication::{E2smRcIndicationHeader, E2smRcIndicationMessage};
pub use nr_cgi::NrCgiIe;
pub use ran_function_definition::E2smRcRanFunctionDefinition;
pub use ran_parameter::{
    RanParameterDefinition, RanParameterId, RanParameterItem, RanParameterStructure,
    RanParameterValue, RanParameterValueType,
};
pub use ue_id::{GnbUeId, UeId};

/// Short name of the RC RAN function
pub const SHORT_NAME: &str = "ORAN-E2SM-RC";
/// ASN.1 object identifier of E2SM-RC
pub const E2SM_RC_OID: &str = "1.3.6.1.4.1.53148.1.1.2.3";
/// Human readable description of the RC RAN function
pub const DESCRIPTION: &str = "RAN Control";
