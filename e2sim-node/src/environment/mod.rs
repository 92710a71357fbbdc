//! Environment Manager
//!
//! The environment is the simulated radio side of the node: UEs attach and
//! detach, neighbour relation (ANR) tables and flow counters change. Report
//! actions subscribe to these events through an observer registry; RAN
//! control pushes handover decisions back into it.
//!
//! Observers are registered by value and addressed afterwards by the
//! [`ObserverId`] returned from [`EnvironmentManager::add_observer`], so an
//! observer never needs a handle to itself.

mod ue_list;

pub use ue_list::{UeEntry, UeList};

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::BitOr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use e2sim_common::NrCgi;
use tracing::{debug, info, warn};

use crate::lock;

/// Event classes an observer can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventMask(u8);

impl EventMask {
    pub const NONE: Self = Self(0);
    /// UE association and disassociation
    pub const ADMISSION: Self = Self(1 << 0);
    /// Neighbour relation table updates
    pub const ANR: Self = Self(1 << 1);
    /// Flow counter updates
    pub const FLOW: Self = Self(1 << 2);
    pub const ALL: Self = Self(0b111);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }
}

impl BitOr for EventMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Registration token handed out by [`EnvironmentManager::add_observer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer-{}", self.0)
    }
}

/// Radio measurements of one cell as seen by a UE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellMeasurements {
    /// Reference signal received power
    pub rsrp: i64,
    /// Reference signal received quality
    pub rsrq: i64,
    /// Signal to interference plus noise ratio
    pub sinr: i64,
}

/// A UE as announced by the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UeInfo {
    /// 15-digit IMSI
    pub imsi: String,
    /// Address the UE is reachable at
    pub endpoint: String,
    /// Serving cell measurements
    pub measurements: CellMeasurements,
}

impl UeInfo {
    pub fn new(imsi: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            imsi: imsi.into(),
            endpoint: endpoint.into(),
            measurements: CellMeasurements::default(),
        }
    }

    pub fn with_measurements(mut self, measurements: CellMeasurements) -> Self {
        self.measurements = measurements;
        self
    }
}

/// One neighbour cell entry of a UE's ANR table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnrEntry {
    pub nr_cgi: NrCgi,
    /// Physical cell ID
    pub pci: u16,
    pub measurements: CellMeasurements,
}

/// Traffic counters of one UE flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlowEntry {
    pub flow_id: u32,
    pub uplink_bytes: u64,
    pub downlink_bytes: u64,
}

/// Handover decision taken by RAN control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoverTarget {
    /// UE to move
    pub imsi: String,
    /// Target PLMN
    pub mcc: String,
    pub mnc: String,
    /// Target gNB (top 29 bits of the NR cell identity)
    pub gnb_id: u32,
}

impl fmt::Display for HandoverTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UE {} -> gNB {} (PLMN {}-{})",
            self.imsi, self.gnb_id, self.mcc, self.mnc
        )
    }
}

/// Callbacks the environment delivers to subscribed observers.
///
/// Every method has a no-op default so an observer only implements the
/// classes it registered for.
pub trait EnvironmentObserver: Send + Sync {
    /// A UE associated; returns false if the observer failed to handle it.
    fn association_request(&self, _ue: &UeInfo) -> bool {
        true
    }

    /// A UE disassociated; returns false if the observer failed to handle it.
    fn disassociation_request(&self, _ue: &UeInfo) -> bool {
        true
    }

    fn anr_update(&self, _imsi: &str, _entries: &[AnrEntry]) {}

    fn flow_update(&self, _imsi: &str, _entry: &FlowEntry) {}
}

/// Receiver of handover decisions
pub trait HandoverListener: Send + Sync {
    fn handover(&self, target: &HandoverTarget);
}

struct Registration {
    observer: Arc<dyn EnvironmentObserver>,
    mask: EventMask,
}

/// Observer registry and per-UE radio state
#[derive(Default)]
pub struct EnvironmentManager {
    observers: Mutex<BTreeMap<ObserverId, Registration>>,
    next_id: AtomicU64,
    anr: Mutex<HashMap<String, Vec<AnrEntry>>>,
    flows: Mutex<HashMap<String, FlowEntry>>,
    handover_listener: Mutex<Option<Arc<dyn HandoverListener>>>,
}

impl fmt::Debug for EnvironmentManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentManager")
            .field("observers", &self.observer_count())
            .finish()
    }
}

impl EnvironmentManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer` for the event classes in `mask`.
    pub fn add_observer(&self, observer: Arc<dyn EnvironmentObserver>, mask: EventMask) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.observers).insert(id, Registration { observer, mask });
        debug!("Registered {} with mask {:#05b}", id, mask.0);
        id
    }

    /// Unregisters an observer; false if `id` is unknown.
    pub fn delete_observer(&self, id: ObserverId) -> bool {
        let removed = lock(&self.observers).remove(&id).is_some();
        if removed {
            debug!("Unregistered {}", id);
        } else {
            warn!("Cannot unregister unknown {}", id);
        }
        removed
    }

    pub fn observer_count(&self) -> usize {
        lock(&self.observers).len()
    }

    /// Observers registered for `class`, collected so callbacks run unlocked
    fn observers_for(&self, class: EventMask) -> Vec<Arc<dyn EnvironmentObserver>> {
        lock(&self.observers)
            .values()
            .filter(|r| r.mask.contains(class))
            .map(|r| Arc::clone(&r.observer))
            .collect()
    }

    /// Fans a UE association out; returns how many observers failed.
    pub fn association_request(&self, ue: &UeInfo) -> usize {
        info!("UE {} associated from {}", ue.imsi, ue.endpoint);
        self.observers_for(EventMask::ADMISSION)
            .iter()
            .filter(|o| !o.association_request(ue))
            .count()
    }

    /// Fans a UE disassociation out; returns how many observers failed.
    pub fn disassociation_request(&self, ue: &UeInfo) -> usize {
        info!("UE {} disassociated", ue.imsi);
        lock(&self.flows).remove(&ue.imsi);
        self.observers_for(EventMask::ADMISSION)
            .iter()
            .filter(|o| !o.disassociation_request(ue))
            .count()
    }

    /// Stores the latest ANR table of `imsi` and notifies observers.
    pub fn anr_update(&self, imsi: &str, entries: Vec<AnrEntry>) {
        debug!("ANR update for UE {}: {} neighbours", imsi, entries.len());
        for observer in self.observers_for(EventMask::ANR) {
            observer.anr_update(imsi, &entries);
        }
        lock(&self.anr).insert(imsi.to_string(), entries);
    }

    /// Latest ANR table of `imsi`, empty if none was reported
    pub fn anr_entries(&self, imsi: &str) -> Vec<AnrEntry> {
        lock(&self.anr).get(imsi).cloned().unwrap_or_default()
    }

    pub fn flow_update(&self, imsi: &str, entry: FlowEntry) {
        for observer in self.observers_for(EventMask::FLOW) {
            observer.flow_update(imsi, &entry);
        }
        lock(&self.flows).insert(imsi.to_string(), entry);
    }

    pub fn flow(&self, imsi: &str) -> Option<FlowEntry> {
        lock(&self.flows).get(imsi).copied()
    }

    pub fn set_handover_listener(&self, listener: Arc<dyn HandoverListener>) {
        *lock(&self.handover_listener) = Some(listener);
    }

    /// Forwards a handover decision; false if nobody listens.
    pub fn handover(&self, target: &HandoverTarget) -> bool {
        let listener = lock(&self.handover_listener).clone();
        match listener {
            Some(listener) => {
                info!("Handover {}", target);
                listener.handover(target);
                true
            }
            None => {
                warn!("No handover listener for {}", target);
                false
            }
        }
    }
}
