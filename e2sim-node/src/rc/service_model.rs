//! RIC SUBSCRIPTION handling for Report Style 4

use e2sim_e2ap::codec;
use e2sim_e2ap::ies::{Cause, CauseProtocol, CauseRicRequest, RicActionToBeSetupItem, RicActionType};
use e2sim_e2ap::messages::RicSubscriptionRequest;
use e2sim_e2sm_rc::action_definition::ActionDefinitionFormat;
use e2sim_e2sm_rc::{E2smRcActionDefinition, E2smRcEventTrigger, EventTriggerConditionId, LogicalOr, RrcState, TriggerType};
use tracing::{debug, info, warn};

use super::parameter_tree::SubscriptionParametersTree;
use super::{RcContext, REPORT_STYLE_UE_INFORMATION};
use crate::e2sm::{ActionData, E2sm, IndicationSink, ServiceKind, SubscriptionInfo, SubscriptionOutcome};

/// One RRC state condition of an event trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RrcTrigger {
    pub condition_id: EventTriggerConditionId,
    pub state: RrcState,
    pub logical_or: bool,
}

/// Input of a Report Style 4 action
#[derive(Debug, Clone, Default)]
pub struct ReportStyle4Data {
    pub triggers: Vec<RrcTrigger>,
    /// Parameters the subscriber asked for
    pub parameters: SubscriptionParametersTree,
}

impl ReportStyle4Data {
    /// Condition ID of the first trigger whose state is one of `states`.
    pub fn matching_condition(&self, states: &[RrcState]) -> Option<EventTriggerConditionId> {
        self.triggers
            .iter()
            .find(|trigger| states.contains(&trigger.state))
            .map(|trigger| trigger.condition_id)
    }
}

fn transfer_syntax_error() -> Cause {
    Cause::Protocol(CauseProtocol::TransferSyntaxError)
}

fn action_not_supported() -> Cause {
    Cause::RicRequest(CauseRicRequest::ActionNotSupported)
}

/// Decodes event trigger Format 4 into its RRC state conditions.
fn decode_triggers(definition: &[u8]) -> Result<Vec<RrcTrigger>, Cause> {
    if definition.is_empty() {
        warn!("Subscription without event trigger definition");
        return Err(transfer_syntax_error());
    }
    let trigger: E2smRcEventTrigger = codec::decode(definition).map_err(|e| {
        warn!("Failed to decode event trigger: {}", e);
        transfer_syntax_error()
    })?;

    let E2smRcEventTrigger::Format4(format4) = trigger;
    let mut triggers = Vec::new();
    for item in format4.ue_info_changes {
        match item.trigger_type {
            TriggerType::RrcState(states) => {
                triggers.extend(states.into_iter().map(|state| RrcTrigger {
                    condition_id: item.condition_id,
                    state: state.state_changed_to,
                    logical_or: state.logical_or == Some(LogicalOr::True),
                }));
            }
            TriggerType::UeIdChange(_) => {
                warn!("Condition {}: UE ID change trigger is not supported, skipping", item.condition_id);
            }
        }
    }

    if triggers.is_empty() {
        warn!("Event trigger carries no RRC state condition");
        return Err(transfer_syntax_error());
    }
    Ok(triggers)
}

/// Handles RIC SUBSCRIPTION REQUEST for the RC service model.
///
/// An undecodable or empty event trigger fails the whole request. Otherwise
/// every action ends up in the admitted or the not-admitted list and the
/// outcome is a success.
pub fn handle_subscription(
    ctx: &RcContext,
    e2sm: &E2sm,
    request: &RicSubscriptionRequest,
    sink: IndicationSink,
) -> SubscriptionOutcome {
    let triggers = match decode_triggers(&request.subscription_details.event_trigger_definition) {
        Ok(triggers) => triggers,
        Err(cause) => return SubscriptionOutcome::failed(cause),
    };
    debug!("Subscription {} triggers: {:?}", request.ric_request_id, triggers);

    let mut outcome = SubscriptionOutcome::default();
    for action in &request.subscription_details.actions {
        if action.action_type != RicActionType::Report {
            warn!(
                "Action {} of {}: type {:?} is not supported",
                action.action_id, request.ric_request_id, action.action_type
            );
            outcome.reject(action.action_id, action_not_supported());
            continue;
        }

        match admit_report_action(ctx, e2sm, request, action, &triggers, sink.clone()) {
            Ok(()) => outcome.admit(action.action_id),
            Err(cause) => {
                warn!(
                    "Action {} of {} not admitted: {:?}",
                    action.action_id, request.ric_request_id, cause
                );
                outcome.reject(action.action_id, cause);
            }
        }
    }

    info!(
        "Subscription {}: {} admitted, {} not admitted",
        request.ric_request_id,
        outcome.admitted.len(),
        outcome.not_admitted.len()
    );
    outcome.succeeded = true;
    outcome
}

fn admit_report_action(
    ctx: &RcContext,
    e2sm: &E2sm,
    request: &RicSubscriptionRequest,
    action: &RicActionToBeSetupItem,
    triggers: &[RrcTrigger],
    sink: IndicationSink,
) -> Result<(), Cause> {
    let report = e2sm.service(ServiceKind::Report).ok_or_else(action_not_supported)?;

    let Some(encoded) = action.action_definition.as_deref() else {
        return Err(action_not_supported());
    };
    let definition: E2smRcActionDefinition = codec::decode(encoded).map_err(|e| {
        warn!("Failed to decode action definition: {}", e);
        action_not_supported()
    })?;
    let action_definition = e2sm
        .resolve_action(definition.format_id())
        .ok_or_else(action_not_supported)?;

    let ActionDefinitionFormat::Format1(format1) = &definition.format;
    if format1.ran_parameters.is_empty() {
        return Err(action_not_supported());
    }

    if definition.style_type != REPORT_STYLE_UE_INFORMATION {
        return Err(Cause::RicRequest(CauseRicRequest::Unspecified));
    }
    let style = report
        .style(definition.style_type)
        .ok_or(Cause::RicRequest(CauseRicRequest::Unspecified))?;
    if style.action_format != action_definition.format() {
        return Err(action_not_supported());
    }

    let data = ReportStyle4Data {
        triggers: triggers.to_vec(),
        parameters: SubscriptionParametersTree::from_reported(&format1.ran_parameters),
    };
    let info = SubscriptionInfo {
        request_id: request.ric_request_id,
        ran_function_id: request.ran_function_id,
        action_id: action.action_id,
        mnc_len: ctx.mnc_len(),
        sink,
    };
    action_definition
        .start_action(e2sm.subscriptions(), info, ActionData::RcReportStyle4(data))
        .map_err(|e| {
            warn!("{}", e);
            e.cause()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Weak};

    use e2sim_e2ap::ies::RicRequestId;
    use e2sim_e2ap::messages::RicSubscriptionDetails;
    use e2sim_e2sm_rc::{EventTriggerFormat4, RanParameterToBeReported, RrcStateItem, UeInfoChangeItem};

    use crate::e2sm::{encode_subid, E2apSender};
    use crate::rc::tests::test_context;
    use crate::rc::{build_rc_service_model, parameter_tree};

    struct NoConnection;

    impl E2apSender for NoConnection {
        fn send_pdu(&self, _pdu: &e2sim_e2ap::E2apPdu) -> Result<(), crate::e2ap::ConnectionError> {
            Ok(())
        }
    }

    fn sink() -> IndicationSink {
        IndicationSink::new(Weak::<NoConnection>::new())
    }

    fn trigger(items: Vec<UeInfoChangeItem>) -> Vec<u8> {
        codec::encode(&E2smRcEventTrigger::Format4(EventTriggerFormat4 { ue_info_changes: items })).unwrap()
    }

    fn rrc_connected_trigger(condition_id: EventTriggerConditionId) -> Vec<u8> {
        trigger(vec![UeInfoChangeItem {
            condition_id,
            trigger_type: TriggerType::RrcState(vec![RrcStateItem {
                state_changed_to: RrcState::RrcConnected,
                logical_or: None,
            }]),
            logical_or: None,
        }])
    }

    fn action_definition(style: i64, ids: &[u32]) -> Vec<u8> {
        let parameters = ids.iter().map(|id| RanParameterToBeReported::new(*id)).collect();
        codec::encode(&E2smRcActionDefinition::format1(style, parameters)).unwrap()
    }

    fn report_action(action_id: u8, definition: Option<Vec<u8>>) -> RicActionToBeSetupItem {
        RicActionToBeSetupItem {
            action_id,
            action_type: RicActionType::Report,
            action_definition: definition,
            subsequent_action: None,
        }
    }

    fn request(trigger: Vec<u8>, actions: Vec<RicActionToBeSetupItem>) -> RicSubscriptionRequest {
        RicSubscriptionRequest {
            ric_request_id: RicRequestId::new(22, 6),
            ran_function_id: 1,
            subscription_details: RicSubscriptionDetails {
                event_trigger_definition: trigger,
                actions,
            },
        }
    }

    fn setup() -> (Arc<RcContext>, E2sm) {
        let ctx = test_context();
        let e2sm = build_rc_service_model(Arc::clone(&ctx));
        (ctx, e2sm)
    }

    #[test]
    fn test_admits_report_style4_action() {
        let (ctx, e2sm) = setup();
        let req = request(
            rrc_connected_trigger(5),
            vec![report_action(7, Some(action_definition(4, &[parameter_tree::RRC_STATE_CHANGED_TO])))],
        );

        let outcome = handle_subscription(&ctx, &e2sm, &req, sink());
        assert!(outcome.succeeded);
        assert_eq!(outcome.admitted, vec![7]);
        assert!(outcome.not_admitted.is_empty());

        let actions = e2sm.subscriptions().get_actions(encode_subid(22, 6));
        assert!(actions.contains_key(&7));
        assert_eq!(ctx.environment.observer_count(), 1);
    }

    #[test]
    fn test_missing_trigger_fails_request() {
        let (ctx, e2sm) = setup();
        let req = request(Vec::new(), vec![report_action(7, Some(action_definition(4, &[202])))]);

        let outcome = handle_subscription(&ctx, &e2sm, &req, sink());
        assert!(!outcome.succeeded);
        assert_eq!(outcome.cause, Some(Cause::Protocol(CauseProtocol::TransferSyntaxError)));
        assert!(e2sm.subscriptions().subscription_count() == 0);
    }

    #[test]
    fn test_trigger_without_rrc_state_fails_request() {
        let (ctx, e2sm) = setup();
        let only_ue_id = trigger(vec![UeInfoChangeItem {
            condition_id: 1,
            trigger_type: TriggerType::UeIdChange(3),
            logical_or: None,
        }]);
        let req = request(only_ue_id, vec![report_action(7, Some(action_definition(4, &[202])))]);

        let outcome = handle_subscription(&ctx, &e2sm, &req, sink());
        assert!(!outcome.succeeded);
        assert_eq!(outcome.cause, Some(Cause::Protocol(CauseProtocol::TransferSyntaxError)));
    }

    #[test]
    fn test_unsupported_trigger_items_are_skipped() {
        let triggers = decode_triggers(&trigger(vec![
            UeInfoChangeItem {
                condition_id: 1,
                trigger_type: TriggerType::UeIdChange(3),
                logical_or: None,
            },
            UeInfoChangeItem {
                condition_id: 2,
                trigger_type: TriggerType::RrcState(vec![
                    RrcStateItem {
                        state_changed_to: RrcState::RrcInactive,
                        logical_or: Some(LogicalOr::True),
                    },
                    RrcStateItem {
                        state_changed_to: RrcState::Any,
                        logical_or: None,
                    },
                ]),
                logical_or: None,
            },
        ]))
        .unwrap();

        assert_eq!(
            triggers,
            vec![
                RrcTrigger {
                    condition_id: 2,
                    state: RrcState::RrcInactive,
                    logical_or: true,
                },
                RrcTrigger {
                    condition_id: 2,
                    state: RrcState::Any,
                    logical_or: false,
                },
            ]
        );
    }

    #[test]
    fn test_action_rejections() {
        let (ctx, e2sm) = setup();
        let mut insert = report_action(1, Some(action_definition(4, &[202])));
        insert.action_type = RicActionType::Insert;
        let req = request(
            rrc_connected_trigger(5),
            vec![
                insert,
                report_action(2, None),
                report_action(3, Some(Vec::new())),
                report_action(4, Some(action_definition(2, &[202]))),
            ],
        );

        let outcome = handle_subscription(&ctx, &e2sm, &req, sink());
        assert!(outcome.succeeded);
        assert!(outcome.admitted.is_empty());

        let causes: Vec<_> = outcome.not_admitted.iter().map(|item| (item.action_id, item.cause)).collect();
        let not_supported = Cause::RicRequest(CauseRicRequest::ActionNotSupported);
        assert_eq!(
            causes,
            vec![
                (1, not_supported),
                (2, not_supported),
                (3, not_supported),
                (4, Cause::RicRequest(CauseRicRequest::Unspecified)),
            ]
        );
        assert!(e2sm.subscriptions().subscription_count() == 0);
    }

    #[test]
    fn test_duplicate_action_not_admitted() {
        let (ctx, e2sm) = setup();
        let req = request(
            rrc_connected_trigger(5),
            vec![report_action(7, Some(action_definition(4, &[202])))],
        );

        assert_eq!(handle_subscription(&ctx, &e2sm, &req, sink()).admitted, vec![7]);
        let repeat = handle_subscription(&ctx, &e2sm, &req, sink());
        assert!(repeat.admitted.is_empty());
        assert_eq!(
            repeat.not_admitted[0].cause,
            Cause::RicRequest(CauseRicRequest::DuplicateAction)
        );
        assert_eq!(ctx.environment.observer_count(), 1);
    }

    #[test]
    fn test_matching_condition() {
        let data = ReportStyle4Data {
            triggers: vec![
                RrcTrigger {
                    condition_id: 1,
                    state: RrcState::RrcIdle,
                    logical_or: false,
                },
                RrcTrigger {
                    condition_id: 9,
                    state: RrcState::Any,
                    logical_or: false,
                },
            ],
            parameters: SubscriptionParametersTree::new(),
        };
        assert_eq!(data.matching_condition(&[RrcState::RrcConnected, RrcState::Any]), Some(9));
        assert_eq!(data.matching_condition(&[RrcState::RrcIdle]), Some(1));
        assert_eq!(ReportStyle4Data::default().matching_condition(&[RrcState::Any]), None);
    }
}
