//! Attached UE registry
//!
//! Filled by report actions when a UE associates and read by RAN control to
//! route requests to a UE. A single mutex guards every access.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use crate::lock;

/// One attached UE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UeEntry {
    /// 15-digit IMSI
    pub imsi: String,
    /// Address the UE is reachable at
    pub endpoint: String,
}

/// Mutex-guarded map of attached UEs keyed by IMSI
#[derive(Debug, Default)]
pub struct UeList {
    ues: Mutex<HashMap<String, UeEntry>>,
}

impl UeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or refreshes a UE; returns false if it replaced an entry.
    pub fn add_ue(&self, imsi: &str, endpoint: &str) -> bool {
        let entry = UeEntry {
            imsi: imsi.to_string(),
            endpoint: endpoint.to_string(),
        };
        let replaced = lock(&self.ues).insert(imsi.to_string(), entry).is_some();
        debug!("UE {} at {} added to UE list", imsi, endpoint);
        !replaced
    }

    /// Removes a UE; returns false if it was not listed.
    pub fn remove_ue(&self, imsi: &str) -> bool {
        let removed = lock(&self.ues).remove(imsi).is_some();
        if removed {
            debug!("UE {} removed from UE list", imsi);
        }
        removed
    }

    pub fn get_ue_info(&self, imsi: &str) -> Option<UeEntry> {
        lock(&self.ues).get(imsi).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.ues).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
