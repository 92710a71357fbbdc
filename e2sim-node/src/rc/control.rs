//! RIC CONTROL handling: Control Style 3 handover

use e2sim_common::NrCgi;
use e2sim_e2ap::codec;
use e2sim_e2ap::ies::{Cause, CauseProtocol, CauseRicRequest};
use e2sim_e2ap::messages::RicControlRequest;
use e2sim_e2sm_rc::{E2smRcControlHeader, E2smRcControlMessage, NrCgiIe};
use tracing::{info, warn};

use super::parameter_tree::TARGET_NR_CGI;
use super::{RcContext, CONTROL_ACTION_HANDOVER, CONTROL_STYLE_CONNECTED_MODE_MOBILITY};
use crate::e2sm::ControlOutcome;
use crate::environment::HandoverTarget;

fn abstract_syntax_error() -> Cause {
    Cause::Protocol(CauseProtocol::AbstractSyntaxErrorFalselyConstructedMessage)
}

fn control_message_invalid() -> Cause {
    Cause::RicRequest(CauseRicRequest::ControlMessageInvalid)
}

/// Target cell of a handover control message
fn target_cell(message: &E2smRcControlMessage) -> Option<NrCgi> {
    let octets = message.find(TARGET_NR_CGI)?.element_value()?.as_octets()?;
    match codec::decode::<NrCgiIe>(octets) {
        Ok(cgi) => Some(cgi.into()),
        Err(e) => {
            warn!("Malformed target NR CGI: {}", e);
            None
        }
    }
}

/// Handles RIC CONTROL REQUEST for the RC service model.
pub fn handle_control(ctx: &RcContext, request: &RicControlRequest) -> ControlOutcome {
    let header: E2smRcControlHeader = match codec::decode(&request.header) {
        Ok(header) => header,
        Err(e) => {
            warn!("Failed to decode control header: {}", e);
            return ControlOutcome::failed(abstract_syntax_error());
        }
    };
    if header.style_type != CONTROL_STYLE_CONNECTED_MODE_MOBILITY
        || header.control_action_id != CONTROL_ACTION_HANDOVER
    {
        warn!(
            "Control style {} action {} is not supported",
            header.style_type, header.control_action_id
        );
        return ControlOutcome::failed(Cause::RicRequest(CauseRicRequest::ActionNotSupported));
    }

    let message: E2smRcControlMessage = match codec::decode(&request.message) {
        Ok(message) => message,
        Err(e) => {
            warn!("Failed to decode control message: {}", e);
            return ControlOutcome::failed(abstract_syntax_error());
        }
    };
    let Some(cell) = target_cell(&message) else {
        return ControlOutcome::failed(control_message_invalid());
    };

    let imsi = header.ue_id.gnb().imsi().to_string();
    if ctx.ue_list.get_ue_info(&imsi).is_none() {
        warn!("Handover of unknown UE {}", imsi);
        return ControlOutcome::failed(control_message_invalid());
    }

    let target = HandoverTarget {
        imsi,
        mcc: cell.plmn.mcc_digits(),
        mnc: cell.plmn.mnc_digits(),
        gnb_id: cell.gnb_id().value(),
    };
    info!("RAN control requested handover {}", target);
    ctx.environment.handover(&target);
    ControlOutcome::success(None)
}
