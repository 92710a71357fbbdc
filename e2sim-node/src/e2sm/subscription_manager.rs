//! Subscription registry of one service model
//!
//! Running actions are keyed by `subid` (packed RIC request ID) and action
//! ID. A subscription entry exists only while it holds at least one action.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex};

use e2sim_e2ap::ies::{RicActionId, RicRequestId};
use tracing::{debug, warn};

use super::SubscriptionAction;
use crate::lock;

/// Packed `(ricRequestorID, ricInstanceID)`
pub type SubId = u32;

/// Actions of one subscription, ordered by action ID
pub type ActionMap = BTreeMap<RicActionId, Arc<dyn SubscriptionAction>>;

/// Packs requestor and instance ID into one key.
///
/// Each half keeps only its low 16 bits, so IDs that differ only above bit
/// 15 collide.
pub fn encode_subid(requestor_id: u32, instance_id: u32) -> SubId {
    ((requestor_id & 0xFFFF) << 16) | (instance_id & 0xFFFF)
}

/// [`encode_subid`] of a RIC request ID
pub fn subid_of(request_id: RicRequestId) -> SubId {
    encode_subid(
        u32::from(request_id.requestor_id),
        u32::from(request_id.instance_id),
    )
}

/// Registry of running subscription actions.
///
/// Removing an action stops it.
#[derive(Default)]
pub struct SubscriptionManager {
    subscriptions: Mutex<HashMap<SubId, ActionMap>>,
}

impl fmt::Debug for SubscriptionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionManager")
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `action`; false if `(subid, action_id)` is already taken.
    pub fn add_action(&self, subid: SubId, action_id: RicActionId, action: Arc<dyn SubscriptionAction>) -> bool {
        let mut subscriptions = lock(&self.subscriptions);
        let actions = subscriptions.entry(subid).or_default();
        if actions.contains_key(&action_id) {
            warn!("Action {} of subscription {:#010x} already exists", action_id, subid);
            return false;
        }
        actions.insert(action_id, action);
        debug!("Added action {} to subscription {:#010x}", action_id, subid);
        true
    }

    /// Removes and stops one action; false if it is not registered.
    pub fn del_action(&self, subid: SubId, action_id: RicActionId) -> bool {
        let removed = {
            let mut subscriptions = lock(&self.subscriptions);
            let Some(actions) = subscriptions.get_mut(&subid) else {
                return false;
            };
            let removed = actions.remove(&action_id);
            if actions.is_empty() {
                subscriptions.remove(&subid);
            }
            removed
        };

        match removed {
            Some(action) => {
                action.stop();
                debug!("Removed action {} from subscription {:#010x}", action_id, subid);
                true
            }
            None => false,
        }
    }

    /// Removes and stops every action of `subid`; false if it is unknown.
    pub fn del_subscription(&self, subid: SubId) -> bool {
        let removed = lock(&self.subscriptions).remove(&subid);
        match removed {
            Some(actions) => {
                for action in actions.values() {
                    action.stop();
                }
                debug!("Removed subscription {:#010x} ({} actions)", subid, actions.len());
                true
            }
            None => false,
        }
    }

    /// Snapshot of the actions of `subid`; empty if it is unknown.
    pub fn get_actions(&self, subid: SubId) -> ActionMap {
        lock(&self.subscriptions)
            .get(&subid)
            .cloned()
            .unwrap_or_default()
    }

    pub fn subscription_count(&self) -> usize {
        lock(&self.subscriptions).len()
    }

    /// Stops and drops every subscription; returns how many actions ran.
    pub fn clear(&self) -> usize {
        let all: Vec<ActionMap> = lock(&self.subscriptions).drain().map(|(_, a)| a).collect();
        let mut stopped = 0;
        for action in all.iter().flat_map(|actions| actions.values()) {
            action.stop();
            stopped += 1;
        }
        stopped
    }
}
