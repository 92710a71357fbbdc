//! E2SM-RC service model
//!
//! Builds the RAN Control [`E2sm`] served by a RAN function:
//!
//! - Report Style 4 (UE Information) with event trigger Format 4 and
//!   action definition Format 1; each admitted action runs an
//!   [`RrcStateObserver`] that reports UE admission events
//! - Control Style 3 action 1 (Handover Control)
//!
//! The same registrations render the RAN function definition advertised in
//! E2 SETUP REQUEST.

mod control;
pub mod parameter_tree;
mod rrc_state_observer;
mod service_model;

pub use control::handle_control;
pub use parameter_tree::SubscriptionParametersTree;
pub use rrc_state_observer::RrcStateObserver;
pub use service_model::{handle_subscription, ReportStyle4Data, RrcTrigger};

use std::sync::Arc;

use e2sim_common::{GlobalE2NodeId, NrCgi};
use e2sim_e2ap::codec::{self, CodecError};
use e2sim_e2ap::messages::{RicControlRequest, RicSubscriptionRequest};
use e2sim_e2sm_rc::ran_function_definition::{
    ControlActionItem, ControlStyleItem, EventTriggerStyleItem, RanFunctionName, ReportStyleItem,
};
use e2sim_e2sm_rc::{ControlActionId, E2smRcRanFunctionDefinition, DESCRIPTION, E2SM_RC_OID, SHORT_NAME};

use crate::e2sm::{
    delete_subscription, ActionData, ActionDefinition, E2sm, FormatId, IndicationSink, Procedure, Service,
    ServiceKind, ServiceStyle, StyleId, SubscriptionAction, TriggerDefinition,
};
use crate::environment::{EnvironmentManager, UeList};

pub const REPORT_STYLE_UE_INFORMATION: StyleId = 4;
pub const TRIGGER_STYLE_UE_INFORMATION_CHANGE: StyleId = 4;
pub const EVENT_TRIGGER_FORMAT_4: FormatId = 4;
pub const ACTION_DEFINITION_FORMAT_1: FormatId = 1;
pub const INDICATION_HEADER_FORMAT_1: FormatId = 1;
pub const INDICATION_MESSAGE_FORMAT_2: FormatId = 2;

pub const CONTROL_STYLE_CONNECTED_MODE_MOBILITY: StyleId = 3;
pub const CONTROL_ACTION_HANDOVER: ControlActionId = 1;
pub const CONTROL_HEADER_FORMAT_1: FormatId = 1;
pub const CONTROL_MESSAGE_FORMAT_1: FormatId = 1;
pub const CONTROL_OUTCOME_FORMAT_1: FormatId = 1;

/// What the RC service model needs from the node
#[derive(Debug)]
pub struct RcContext {
    pub node_id: GlobalE2NodeId,
    /// Cell served by this node
    pub cell_id: u8,
    pub environment: Arc<EnvironmentManager>,
    /// UEs known to RAN control
    pub ue_list: Arc<UeList>,
}

impl RcContext {
    pub fn primary_cell(&self) -> NrCgi {
        self.node_id.cell(self.cell_id)
    }

    pub fn mnc_len(&self) -> usize {
        self.node_id.plmn().mnc_len()
    }
}

/// Builds the E2SM-RC service model with its procedures, services, trigger
/// and action definitions registered.
pub fn build_rc_service_model(ctx: Arc<RcContext>) -> E2sm {
    let mut e2sm = E2sm::new(SHORT_NAME, E2SM_RC_OID, DESCRIPTION);

    let subscription_ctx = Arc::clone(&ctx);
    e2sm.add_procedure(Procedure::Subscription(Box::new(
        move |e2sm: &E2sm, request: &RicSubscriptionRequest, sink: IndicationSink| {
            handle_subscription(&subscription_ctx, e2sm, request, sink)
        },
    )));
    e2sm.add_procedure(Procedure::SubscriptionDelete(Box::new(delete_subscription)));
    let control_ctx = Arc::clone(&ctx);
    e2sm.add_procedure(Procedure::Control(Box::new(move |_: &E2sm, request: &RicControlRequest| {
        handle_control(&control_ctx, request)
    })));
    e2sm.add_procedure(Procedure::Indication);

    let mut report = Service::new(ServiceKind::Report);
    report.add_style(ServiceStyle {
        id: REPORT_STYLE_UE_INFORMATION,
        name: "UE Information".to_string(),
        trigger_style: TRIGGER_STYLE_UE_INFORMATION_CHANGE,
        action_format: ACTION_DEFINITION_FORMAT_1,
        header_format: INDICATION_HEADER_FORMAT_1,
        message_format: INDICATION_MESSAGE_FORMAT_2,
    });
    e2sm.add_service(report);

    let mut control = Service::new(ServiceKind::Control);
    control.add_style(ServiceStyle {
        id: CONTROL_STYLE_CONNECTED_MODE_MOBILITY,
        name: "Connected Mode Mobility Control".to_string(),
        trigger_style: 0,
        action_format: 0,
        header_format: CONTROL_HEADER_FORMAT_1,
        message_format: CONTROL_MESSAGE_FORMAT_1,
    });
    e2sm.add_service(control);

    e2sm.add_trigger(TriggerDefinition {
        style: TRIGGER_STYLE_UE_INFORMATION_CHANGE,
        name: "UE Information Change".to_string(),
        format: EVENT_TRIGGER_FORMAT_4,
    });

    e2sm.add_action_definition(ActionDefinition::new(
        ACTION_DEFINITION_FORMAT_1,
        "RAN Parameters for Report",
        Box::new(move |info, data| {
            let ActionData::RcReportStyle4(data) = data;
            RrcStateObserver::new(info, data, Arc::clone(&ctx)) as Arc<dyn SubscriptionAction>
        }),
    ));

    e2sm
}

/// RAN function definition advertising the registered capabilities
pub fn ran_function_definition(e2sm: &E2sm) -> E2smRcRanFunctionDefinition {
    let mut definition = E2smRcRanFunctionDefinition::new(RanFunctionName {
        short_name: e2sm.short_name().to_string(),
        oid: e2sm.oid().to_string(),
        description: e2sm.description().to_string(),
        instance: None,
    });

    if let Some(trigger) = e2sm.trigger(TRIGGER_STYLE_UE_INFORMATION_CHANGE) {
        definition.event_trigger_styles.push(EventTriggerStyleItem {
            style_type: trigger.style,
            name: trigger.name.clone(),
            format_type: i64::from(trigger.format),
        });
    }

    if let Some(report) = e2sm.service(ServiceKind::Report) {
        for style in report.styles() {
            let parameters = if style.id == REPORT_STYLE_UE_INFORMATION {
                parameter_tree::report_style4_parameters()
            } else {
                Vec::new()
            };
            definition.report_styles.push(ReportStyleItem {
                style_type: style.id,
                name: style.name.clone(),
                supported_event_trigger_style: style.trigger_style,
                action_format_type: i64::from(style.action_format),
                indication_header_format_type: i64::from(style.header_format),
                indication_message_format_type: i64::from(style.message_format),
                parameters,
            });
        }
    }

    if let Some(control) = e2sm.service(ServiceKind::Control) {
        for style in control.styles() {
            let actions = if style.id == CONTROL_STYLE_CONNECTED_MODE_MOBILITY {
                vec![ControlActionItem {
                    action_id: CONTROL_ACTION_HANDOVER,
                    name: "Handover Control".to_string(),
                    parameters: parameter_tree::handover_control_parameters(),
                }]
            } else {
                Vec::new()
            };
            definition.control_styles.push(ControlStyleItem {
                style_type: style.id,
                name: style.name.clone(),
                actions,
                header_format_type: i64::from(style.header_format),
                message_format_type: i64::from(style.message_format),
                call_process_id_format_type: None,
                outcome_format_type: i64::from(CONTROL_OUTCOME_FORMAT_1),
            });
        }
    }

    definition
}

/// Encoded RAN function definition for E2 SETUP REQUEST
pub fn encode_ran_function_definition(e2sm: &E2sm) -> Result<Vec<u8>, CodecError> {
    codec::encode(&ran_function_definition(e2sm))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use e2sim_e2ap::ProcedureCode;

    pub(crate) fn test_context() -> Arc<RcContext> {
        Arc::new(RcContext {
            node_id: GlobalE2NodeId::new("001", "01", 1).unwrap(),
            cell_id: 1,
            environment: Arc::new(EnvironmentManager::new()),
            ue_list: Arc::new(UeList::new()),
        })
    }

    #[test]
    fn test_service_model_registrations() {
        let e2sm = build_rc_service_model(test_context());

        for code in [
            ProcedureCode::RIC_SUBSCRIPTION,
            ProcedureCode::RIC_SUBSCRIPTION_DELETE,
            ProcedureCode::RIC_CONTROL,
            ProcedureCode::RIC_INDICATION,
        ] {
            assert!(e2sm.resolve_procedure(code).is_some(), "{code}");
        }
        assert!(e2sm.resolve_procedure(ProcedureCode::E2_SETUP).is_none());

        let report = e2sm.service(ServiceKind::Report).unwrap();
        assert_eq!(report.style(REPORT_STYLE_UE_INFORMATION).unwrap().name, "UE Information");
        assert!(e2sm.service(ServiceKind::Control).is_some());
        assert!(e2sm.service(ServiceKind::Policy).is_none());
        assert_eq!(e2sm.trigger(4).unwrap().format, EVENT_TRIGGER_FORMAT_4);
        assert_eq!(e2sm.resolve_action(1).unwrap().format(), ACTION_DEFINITION_FORMAT_1);
        assert!(e2sm.resolve_action(2).is_none());
    }

    #[test]
    fn test_ran_function_definition_rendering() {
        let e2sm = build_rc_service_model(test_context());
        let definition = ran_function_definition(&e2sm);

        assert_eq!(definition.name.short_name, SHORT_NAME);
        assert_eq!(definition.name.oid, E2SM_RC_OID);
        assert_eq!(definition.event_trigger_styles.len(), 1);
        assert_eq!(definition.event_trigger_styles[0].format_type, 4);

        let report = &definition.report_styles[0];
        assert_eq!(report.style_type, 4);
        assert_eq!(report.indication_message_format_type, 2);
        assert!(report.parameters.iter().any(|p| p.id == parameter_tree::RRC_STATE_CHANGED_TO));

        let control = &definition.control_styles[0];
        assert_eq!(control.style_type, 3);
        assert_eq!(control.actions[0].action_id, CONTROL_ACTION_HANDOVER);
    }

    #[test]
    fn test_ran_function_definition_encodes() {
        let e2sm = build_rc_service_model(test_context());
        let bytes = encode_ran_function_definition(&e2sm).unwrap();
        let decoded: E2smRcRanFunctionDefinition = codec::decode(&bytes).unwrap();
        assert_eq!(decoded, ran_function_definition(&e2sm));
    }

    #[test]
    fn test_context_identity() {
        let ctx = test_context();
        assert_eq!(ctx.mnc_len(), 2);
        assert_eq!(ctx.primary_cell().gnb_id().value(), 1);
        assert_eq!(ctx.primary_cell().cell_id(), 1);
    }
}
