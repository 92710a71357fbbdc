//! RAN Function Registry
//!
//! Maps RAN function IDs to the encoded definition advertised at E2 setup
//! and the service model that serves requests for the function.
//! Registration is add-only.

use std::collections::BTreeMap;
use std::sync::Arc;

use e2sim_e2ap::ies::RanFunctionItem;
use e2sim_e2ap::{ProcedureCode, RanFunctionId};
use tracing::{info, warn};

use crate::e2sm::{ActionDefinition, E2sm, FormatId, Procedure};

/// A registered RAN function
#[derive(Debug, Clone)]
pub struct RanFunction {
    pub id: RanFunctionId,
    pub revision: u16,
    /// Encoded RAN function definition
    pub definition: Vec<u8>,
    pub e2sm: Arc<E2sm>,
}

impl RanFunction {
    /// Setup request item advertising this function
    pub fn item(&self) -> RanFunctionItem {
        RanFunctionItem {
            ran_function_id: self.id,
            definition: self.definition.clone(),
            revision: self.revision,
            oid: self.e2sm.oid().to_string(),
        }
    }
}

/// RAN functions of one node, keyed by ID
#[derive(Debug, Default)]
pub struct RanFunctionRegistry {
    functions: BTreeMap<RanFunctionId, RanFunction>,
}

impl RanFunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a RAN function; false (and no change) if the ID is taken.
    pub fn register(
        &mut self,
        id: RanFunctionId,
        revision: u16,
        definition: Vec<u8>,
        e2sm: Arc<E2sm>,
    ) -> bool {
        if self.functions.contains_key(&id) {
            warn!("RAN function {} already registered, ignoring {}", id, e2sm.short_name());
            return false;
        }
        info!(
            "Registered RAN function {} rev {} ({}, {} byte definition)",
            id,
            revision,
            e2sm.short_name(),
            definition.len()
        );
        self.functions.insert(
            id,
            RanFunction {
                id,
                revision,
                definition,
                e2sm,
            },
        );
        true
    }

    pub fn resolve(&self, id: RanFunctionId) -> Option<&RanFunction> {
        self.functions.get(&id)
    }

    /// Items advertised in E2 SETUP REQUEST, ordered by ID
    pub fn ran_function_items(&self) -> Vec<RanFunctionItem> {
        self.functions.values().map(RanFunction::item).collect()
    }

    pub fn functions(&self) -> impl Iterator<Item = &RanFunction> {
        self.functions.values()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

pub fn resolve_procedure(e2sm: &E2sm, code: ProcedureCode) -> Option<&Procedure> {
    e2sm.resolve_procedure(code)
}

pub fn resolve_action(e2sm: &E2sm, format: FormatId) -> Option<&ActionDefinition> {
    e2sm.resolve_action(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_e2sm() -> Arc<E2sm> {
        let mut e2sm = E2sm::new("TEST", "1.3.6.1.4.1.53148.1.1.2.3", "test");
        e2sm.add_procedure(Procedure::Indication);
        Arc::new(e2sm)
    }

    #[test]
    fn test_register_is_add_only() {
        let mut registry = RanFunctionRegistry::new();
        assert!(registry.register(1, 1, vec![0x01], test_e2sm()));
        assert!(!registry.register(1, 2, vec![0x02], test_e2sm()));

        let function = registry.resolve(1).unwrap();
        assert_eq!(function.revision, 1);
        assert_eq!(function.definition, vec![0x01]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_absent() {
        let registry = RanFunctionRegistry::new();
        assert!(registry.resolve(3).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ran_function_items_sorted() {
        let mut registry = RanFunctionRegistry::new();
        registry.register(7, 1, vec![0x07], test_e2sm());
        registry.register(2, 3, vec![0x02], test_e2sm());

        let items = registry.ran_function_items();
        let ids: Vec<_> = items.iter().map(|i| i.ran_function_id).collect();
        assert_eq!(ids, vec![2, 7]);
        assert_eq!(items[0].revision, 3);
        assert_eq!(items[0].oid, "1.3.6.1.4.1.53148.1.1.2.3");
    }

    #[test]
    fn test_resolution_chain() {
        let e2sm = test_e2sm();
        assert!(resolve_procedure(&e2sm, ProcedureCode::RIC_INDICATION).is_some());
        assert!(resolve_procedure(&e2sm, ProcedureCode::RIC_SUBSCRIPTION).is_none());
        assert!(resolve_action(&e2sm, 1).is_none());
    }
}
