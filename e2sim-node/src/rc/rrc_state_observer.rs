//! Report Style 4 action: reports RRC state changes of UEs
//!
//! The observer registers with the environment for admission events. On
//! association it reports the RRC state plus the master node, primary cell
//! and neighbour cell parameters the subscriber asked for; on
//! disassociation only the RRC state.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

use e2sim_common::logging::{log_e2sm_message, Direction};
use e2sim_common::Imsi;
use e2sim_e2ap::codec;
use e2sim_e2ap::ies::{bits_from_value, RicIndicationType};
use e2sim_e2ap::procedures::{build_ric_indication, RicIndicationParams};
use e2sim_e2sm_rc::{
    E2smRcIndicationHeader, E2smRcIndicationMessage, EventTriggerConditionId, GnbUeId, NrCgiIe, RanParameterId,
    RanParameterItem, RanParameterStructure, RanParameterValue, RanParameterValueType, RrcState, UeId,
};
use tracing::{debug, info, warn};

use super::parameter_tree::*;
use super::{RcContext, ReportStyle4Data};
use crate::e2sm::{SubscriptionAction, SubscriptionInfo};
use crate::environment::{CellMeasurements, EnvironmentObserver, EventMask, ObserverId, UeInfo};
use crate::lock;

const MASTER_NODE_GNB_ID_BITS: usize = 29;

pub struct RrcStateObserver {
    info: SubscriptionInfo,
    data: ReportStyle4Data,
    ctx: Arc<RcContext>,
    registration: Mutex<Option<ObserverId>>,
    sequence: AtomicU16,
}

impl RrcStateObserver {
    pub fn new(info: SubscriptionInfo, data: ReportStyle4Data, ctx: Arc<RcContext>) -> Arc<Self> {
        Arc::new(Self {
            info,
            data,
            ctx,
            registration: Mutex::new(None),
            sequence: AtomicU16::new(0),
        })
    }

    pub fn is_running(&self) -> bool {
        lock(&self.registration).is_some()
    }

    fn ue_id(&self, imsi: &str) -> e2sim_common::Result<UeId> {
        let imsi = Imsi::parse(imsi, self.info.mnc_len)?;
        Ok(UeId::Gnb(GnbUeId::from_imsi(&imsi)?))
    }

    /// Builds and sends one indication; false if nothing went out.
    fn report(&self, condition_id: EventTriggerConditionId, imsi: &str, parameters: Vec<RanParameterItem>) -> bool {
        if parameters.is_empty() {
            debug!("Subscription {}: no requested parameter to report", self.info.request_id);
            return true;
        }
        let ue_id = match self.ue_id(imsi) {
            Ok(ue_id) => ue_id,
            Err(e) => {
                warn!("Cannot build UE ID for {}: {}", imsi, e);
                return false;
            }
        };

        let header = E2smRcIndicationHeader::new(Some(condition_id));
        let message = E2smRcIndicationMessage::single_ue(ue_id, parameters);
        let (header, message) = match (codec::encode(&header), codec::encode(&message)) {
            (Ok(header), Ok(message)) => (header, message),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Failed to encode indication for UE {}: {}", imsi, e);
                return false;
            }
        };
        log_e2sm_message(Direction::Tx, "E2SM-RC-IndicationHeader", &header);
        log_e2sm_message(Direction::Tx, "E2SM-RC-IndicationMessage", &message);

        let sequence_number = self.sequence.fetch_add(1, Ordering::Relaxed);
        let pdu = build_ric_indication(RicIndicationParams {
            ric_request_id: self.info.request_id,
            ran_function_id: self.info.ran_function_id,
            action_id: self.info.action_id,
            sequence_number: Some(sequence_number),
            indication_type: RicIndicationType::Report,
            header,
            message,
            call_process_id: None,
        });
        self.info.sink.send(&pdu)
    }
}

impl SubscriptionAction for RrcStateObserver {
    fn start(self: Arc<Self>) -> bool {
        let mut registration = lock(&self.registration);
        if let Some(id) = *registration {
            warn!("RRC state observer already started as {}", id);
            return true;
        }
        let observer: Arc<dyn EnvironmentObserver> = Arc::clone(&self) as Arc<dyn EnvironmentObserver>;
        let id = self.ctx.environment.add_observer(observer, EventMask::ADMISSION);
        info!(
            "RRC state observer {} started for {} action {}",
            id, self.info.request_id, self.info.action_id
        );
        *registration = Some(id);
        true
    }

    fn stop(&self) -> bool {
        let Some(id) = lock(&self.registration).take() else {
            warn!("RRC state observer of {} is not running", self.info.request_id);
            return true;
        };
        self.ctx.environment.delete_observer(id);
        info!("RRC state observer {} stopped", id);
        true
    }
}

impl EnvironmentObserver for RrcStateObserver {
    fn association_request(&self, ue: &UeInfo) -> bool {
        let Some(condition_id) = self
            .data
            .matching_condition(&[RrcState::RrcConnected, RrcState::Any])
        else {
            return true;
        };
        self.ctx.ue_list.add_ue(&ue.imsi, &ue.endpoint);
        let parameters = ue_parameters(&self.data.parameters, &self.ctx, ue);
        self.report(condition_id, &ue.imsi, parameters)
    }

    fn disassociation_request(&self, ue: &UeInfo) -> bool {
        self.ctx.ue_list.remove_ue(&ue.imsi);
        let Some(condition_id) = self
            .data
            .matching_condition(&[RrcState::RrcInactive, RrcState::Any])
        else {
            return true;
        };
        self.report(condition_id, &ue.imsi, vec![rrc_state(RrcState::RrcInactive)])
    }
}

fn element(id: RanParameterId, value: RanParameterValue) -> RanParameterItem {
    RanParameterItem::new(id, RanParameterValueType::ElementFalse(Some(value)))
}

fn structure(id: RanParameterId, items: Vec<RanParameterItem>) -> Option<RanParameterItem> {
    (!items.is_empty())
        .then(|| RanParameterItem::new(id, RanParameterValueType::Structure(RanParameterStructure::new(items))))
}

fn rrc_state(state: RrcState) -> RanParameterItem {
    element(RRC_STATE_CHANGED_TO, RanParameterValue::Int(state.index() as i64))
}

fn path(prefix: &[RanParameterId], id: RanParameterId) -> Vec<RanParameterId> {
    let mut path = prefix.to_vec();
    path.push(id);
    path
}

fn nr_cgi(cgi: e2sim_common::NrCgi) -> Option<RanParameterValue> {
    match codec::encode(&NrCgiIe::from(cgi)) {
        Ok(bytes) => Some(RanParameterValue::OctetString(bytes)),
        Err(e) => {
            warn!("Failed to encode NR CGI: {}", e);
            None
        }
    }
}

fn measurements(
    tree: &SubscriptionParametersTree,
    prefix: &[RanParameterId],
    ids: [RanParameterId; 3],
    measurements: &CellMeasurements,
) -> Vec<RanParameterItem> {
    let values = [measurements.rsrp, measurements.rsrq, measurements.sinr];
    ids.into_iter()
        .zip(values)
        .filter(|(id, _)| tree.includes(&path(prefix, *id)))
        .map(|(id, value)| element(id, RanParameterValue::Int(value)))
        .collect()
}

/// RAN parameters of an associating UE, limited to what `tree` asks for
fn ue_parameters(tree: &SubscriptionParametersTree, ctx: &RcContext, ue: &UeInfo) -> Vec<RanParameterItem> {
    let mut parameters = Vec::new();
    if tree.includes(&[RRC_STATE_CHANGED_TO]) {
        parameters.push(rrc_state(RrcState::RrcConnected));
    }

    let mut master_node = Vec::new();
    if tree.includes(&[MASTER_NODE, MASTER_NODE_GNB_ID]) {
        let gnb_id = u64::from(ctx.node_id.gnb_id().value());
        master_node.push(element(
            MASTER_NODE_GNB_ID,
            RanParameterValue::BitString(bits_from_value(gnb_id, MASTER_NODE_GNB_ID_BITS)),
        ));
    }

    let primary = [MASTER_NODE, PRIMARY_CELL_OF_MCG];
    let mut primary_cell = Vec::new();
    if tree.includes(&path(&primary, PRIMARY_CELL_NR_CGI)) {
        if let Some(value) = nr_cgi(ctx.primary_cell()) {
            primary_cell.push(element(PRIMARY_CELL_NR_CGI, value));
        }
    }
    let primary_measurements = measurements(
        tree,
        &path(&primary, PRIMARY_CELL_MEASUREMENTS),
        [PRIMARY_CELL_RSRP, PRIMARY_CELL_RSRQ, PRIMARY_CELL_SINR],
        &ue.measurements,
    );
    primary_cell.extend(structure(PRIMARY_CELL_MEASUREMENTS, primary_measurements));
    master_node.extend(structure(PRIMARY_CELL_OF_MCG, primary_cell));

    let neighbour = [MASTER_NODE, LIST_OF_NEIGHBOR_CELLS, NEIGHBOR_CELL_ITEM];
    if tree.includes(&neighbour[..2]) {
        let cells: Vec<RanParameterStructure> = ctx
            .environment
            .anr_entries(&ue.imsi)
            .iter()
            .filter_map(|entry| {
                let mut items = Vec::new();
                if tree.includes(&path(&neighbour, NEIGHBOR_NR_CGI)) {
                    items.extend(nr_cgi(entry.nr_cgi).map(|value| element(NEIGHBOR_NR_CGI, value)));
                }
                if tree.includes(&path(&neighbour, NEIGHBOR_PCI)) {
                    items.push(element(NEIGHBOR_PCI, RanParameterValue::Int(i64::from(entry.pci))));
                }
                items.extend(measurements(
                    tree,
                    &neighbour,
                    [NEIGHBOR_RSRP, NEIGHBOR_RSRQ, NEIGHBOR_SINR],
                    &entry.measurements,
                ));
                (!items.is_empty()).then(|| RanParameterStructure::new(items))
            })
            .collect();
        if !cells.is_empty() {
            master_node.push(RanParameterItem::new(LIST_OF_NEIGHBOR_CELLS, RanParameterValueType::List(cells)));
        }
    }

    parameters.extend(structure(MASTER_NODE, master_node));
    parameters
}

#[cfg(test)]
mod tests {
    use super::*;

    use e2sim_e2ap::pdu::InitiatingMessage;
    use e2sim_e2ap::{E2apPdu, RicRequestId};
    use e2sim_e2sm_rc::ran_parameter::find_ran_parameter;

    use crate::e2ap::ConnectionError;
    use crate::e2sm::{E2apSender, IndicationSink};
    use crate::environment::AnrEntry;
    use crate::rc::tests::test_context;
    use crate::rc::RrcTrigger;

    const IMSI: &str = "001010000000042";

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<E2apPdu>>,
    }

    impl E2apSender for Recorder {
        fn send_pdu(&self, pdu: &E2apPdu) -> Result<(), ConnectionError> {
            self.sent.lock().unwrap().push(pdu.clone());
            Ok(())
        }
    }

    fn observer(
        ctx: &Arc<RcContext>,
        recorder: &Arc<Recorder>,
        states: &[RrcState],
        paths: &[&[RanParameterId]],
    ) -> Arc<RrcStateObserver> {
        let sender: Arc<dyn E2apSender> = recorder.clone();
        let mut tree = SubscriptionParametersTree::new();
        for path in paths {
            tree.insert_path(path);
        }
        let data = ReportStyle4Data {
            triggers: states
                .iter()
                .map(|state| RrcTrigger {
                    condition_id: 5,
                    state: *state,
                    logical_or: false,
                })
                .collect(),
            parameters: tree,
        };
        let info = SubscriptionInfo {
            request_id: RicRequestId::new(22, 6),
            ran_function_id: 1,
            action_id: 7,
            mnc_len: 2,
            sink: IndicationSink::from_arc(&sender),
        };
        RrcStateObserver::new(info, data, Arc::clone(ctx))
    }

    fn indications(recorder: &Recorder) -> Vec<(u16, E2smRcIndicationHeader, E2smRcIndicationMessage)> {
        recorder
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|pdu| match pdu {
                E2apPdu::InitiatingMessage(InitiatingMessage::RicIndication(indication)) => (
                    indication.sequence_number.unwrap(),
                    codec::decode(&indication.header).unwrap(),
                    codec::decode(&indication.message).unwrap(),
                ),
                other => panic!("unexpected PDU {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_start_stop_idempotent() {
        let ctx = test_context();
        let recorder = Arc::new(Recorder::default());
        let observer = observer(&ctx, &recorder, &[RrcState::RrcConnected], &[&[RRC_STATE_CHANGED_TO]]);

        assert!(Arc::clone(&observer).start());
        assert!(Arc::clone(&observer).start());
        assert!(observer.is_running());
        assert_eq!(ctx.environment.observer_count(), 1);

        assert!(observer.stop());
        assert!(observer.stop());
        assert!(!observer.is_running());
        assert_eq!(ctx.environment.observer_count(), 0);
    }

    #[test]
    fn test_association_reports_rrc_state() {
        let ctx = test_context();
        let recorder = Arc::new(Recorder::default());
        let observer = observer(&ctx, &recorder, &[RrcState::RrcConnected], &[&[RRC_STATE_CHANGED_TO]]);
        Arc::clone(&observer).start();

        assert_eq!(ctx.environment.association_request(&UeInfo::new(IMSI, "10.0.0.2")), 0);
        assert_eq!(ctx.ue_list.get_ue_info(IMSI).unwrap().endpoint, "10.0.0.2");

        let sent = indications(&recorder);
        assert_eq!(sent.len(), 1);
        let (sequence, header, message) = &sent[0];
        assert_eq!(*sequence, 0);
        assert_eq!(header.condition_id, Some(5));

        let ue = &message.ue_parameters[0];
        assert_eq!(ue.ue_id.gnb().imsi().to_string(), IMSI);
        assert_eq!(ue.ran_parameters, vec![rrc_state(RrcState::RrcConnected)]);
    }

    #[test]
    fn test_association_without_matching_state_is_noop() {
        let ctx = test_context();
        let recorder = Arc::new(Recorder::default());
        let observer = observer(&ctx, &recorder, &[RrcState::RrcInactive], &[&[RRC_STATE_CHANGED_TO]]);
        Arc::clone(&observer).start();

        assert_eq!(ctx.environment.association_request(&UeInfo::new(IMSI, "10.0.0.2")), 0);
        assert!(ctx.ue_list.get_ue_info(IMSI).is_none());
        assert!(indications(&recorder).is_empty());
    }

    #[test]
    fn test_disassociation_reports_only_rrc_state() {
        let ctx = test_context();
        let recorder = Arc::new(Recorder::default());
        let observer = observer(
            &ctx,
            &recorder,
            &[RrcState::Any],
            &[&[RRC_STATE_CHANGED_TO], &[MASTER_NODE]],
        );
        Arc::clone(&observer).start();
        let ue = UeInfo::new(IMSI, "10.0.0.2");

        ctx.environment.association_request(&ue);
        ctx.environment.disassociation_request(&ue);
        assert!(ctx.ue_list.get_ue_info(IMSI).is_none());

        let sent = indications(&recorder);
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, 0);
        assert_eq!(sent[1].0, 1);
        assert!(find_ran_parameter(&sent[0].2.ue_parameters[0].ran_parameters, MASTER_NODE).is_some());
        assert_eq!(
            sent[1].2.ue_parameters[0].ran_parameters,
            vec![rrc_state(RrcState::RrcInactive)]
        );
    }

    #[test]
    fn test_parameters_follow_subscription_tree() {
        let ctx = test_context();
        let measured = CellMeasurements {
            rsrp: -80,
            rsrq: -10,
            sinr: 20,
        };
        ctx.environment.anr_update(
            IMSI,
            vec![AnrEntry {
                nr_cgi: ctx.node_id.cell(2),
                pci: 17,
                measurements: measured,
            }],
        );
        let ue = UeInfo::new(IMSI, "10.0.0.2").with_measurements(measured);

        let tree = SubscriptionParametersTree::from_path(&[
            MASTER_NODE,
            PRIMARY_CELL_OF_MCG,
            PRIMARY_CELL_MEASUREMENTS,
            PRIMARY_CELL_RSRP,
        ]);
        let parameters = ue_parameters(&tree, &ctx, &ue);
        assert_eq!(parameters.len(), 1);
        assert!(find_ran_parameter(&parameters, RRC_STATE_CHANGED_TO).is_none());
        assert_eq!(
            find_ran_parameter(&parameters, PRIMARY_CELL_RSRP).and_then(|v| v.element_value()).and_then(|v| v.as_int()),
            Some(-80)
        );
        assert!(find_ran_parameter(&parameters, PRIMARY_CELL_RSRQ).is_none());
        assert!(find_ran_parameter(&parameters, MASTER_NODE_GNB_ID).is_none());
        assert!(find_ran_parameter(&parameters, LIST_OF_NEIGHBOR_CELLS).is_none());

        let everything = SubscriptionParametersTree::from_path(&[MASTER_NODE]);
        let parameters = ue_parameters(&everything, &ctx, &ue);
        assert!(find_ran_parameter(&parameters, MASTER_NODE_GNB_ID).is_some());
        let cgi = find_ran_parameter(&parameters, PRIMARY_CELL_NR_CGI)
            .and_then(|v| v.element_value())
            .and_then(|v| v.as_octets())
            .unwrap();
        let cgi: NrCgiIe = codec::decode(cgi).unwrap();
        assert_eq!(e2sim_common::NrCgi::from(cgi), ctx.primary_cell());
        assert_eq!(
            find_ran_parameter(&parameters, NEIGHBOR_PCI).and_then(|v| v.element_value()).and_then(|v| v.as_int()),
            Some(17)
        );
    }

    #[test]
    fn test_dropped_connection_fails_report() {
        let ctx = test_context();
        let recorder = Arc::new(Recorder::default());
        let observer = observer(&ctx, &recorder, &[RrcState::RrcConnected], &[&[RRC_STATE_CHANGED_TO]]);
        Arc::clone(&observer).start();
        drop(recorder);

        assert_eq!(ctx.environment.association_request(&UeInfo::new(IMSI, "10.0.0.2")), 1);
    }
}
