//! RC RAN parameter catalog and subscription parameter trees
//!
//! Report Style 4 parameters:
//!
//! ```text
//! 202    RRC State Changed To
//! 21501  Master Node
//! ├── 21502  gNB ID
//! ├── 17001  Primary Cell of MCG
//! │   ├── 17003  NR CGI
//! │   └── 17010  Measurements
//! │       ├── 17011  RSRP
//! │       ├── 17012  RSRQ
//! │       └── 17013  SINR
//! └── 17002  List of Neighbor cells
//!     └── 17100  Neighbor Cell Item
//!         ├── 17101  NR CGI
//!         ├── 17102  PCI
//!         ├── 17103  RSRP
//!         ├── 17104  RSRQ
//!         └── 17105  SINR
//! ```
//!
//! Control Style 3 action 1 (Handover Control):
//!
//! ```text
//! 1  Target Primary Cell ID
//! └── 2  CHOICE Target Cell
//!     └── 3  NR Cell
//!         └── 4  NR CGI
//! ```

use e2sim_e2sm_rc::ran_function_definition::RanParameterDescription;
use e2sim_e2sm_rc::ran_parameter::RanParameterDefinitionItem;
use e2sim_e2sm_rc::{RanParameterDefinition, RanParameterId, RanParameterToBeReported};

pub const RRC_STATE_CHANGED_TO: RanParameterId = 202;
pub const MASTER_NODE: RanParameterId = 21501;
pub const MASTER_NODE_GNB_ID: RanParameterId = 21502;
pub const PRIMARY_CELL_OF_MCG: RanParameterId = 17001;
pub const LIST_OF_NEIGHBOR_CELLS: RanParameterId = 17002;
pub const PRIMARY_CELL_NR_CGI: RanParameterId = 17003;
pub const PRIMARY_CELL_MEASUREMENTS: RanParameterId = 17010;
pub const PRIMARY_CELL_RSRP: RanParameterId = 17011;
pub const PRIMARY_CELL_RSRQ: RanParameterId = 17012;
pub const PRIMARY_CELL_SINR: RanParameterId = 17013;
pub const NEIGHBOR_CELL_ITEM: RanParameterId = 17100;
pub const NEIGHBOR_NR_CGI: RanParameterId = 17101;
pub const NEIGHBOR_PCI: RanParameterId = 17102;
pub const NEIGHBOR_RSRP: RanParameterId = 17103;
pub const NEIGHBOR_RSRQ: RanParameterId = 17104;
pub const NEIGHBOR_SINR: RanParameterId = 17105;

pub const TARGET_PRIMARY_CELL_ID: RanParameterId = 1;
pub const TARGET_CELL: RanParameterId = 2;
pub const TARGET_NR_CELL: RanParameterId = 3;
pub const TARGET_NR_CGI: RanParameterId = 4;

fn item(id: RanParameterId, name: &str, definition: Option<RanParameterDefinition>) -> RanParameterDefinitionItem {
    RanParameterDefinitionItem {
        id,
        name: name.to_string(),
        definition: definition.map(Box::new),
    }
}

fn leaf(id: RanParameterId, name: &str) -> RanParameterDefinitionItem {
    item(id, name, None)
}

fn primary_cell_definition() -> RanParameterDefinition {
    RanParameterDefinition::Structure(vec![
        leaf(PRIMARY_CELL_NR_CGI, "NR CGI"),
        item(
            PRIMARY_CELL_MEASUREMENTS,
            "Measurements",
            Some(RanParameterDefinition::Structure(vec![
                leaf(PRIMARY_CELL_RSRP, "RSRP"),
                leaf(PRIMARY_CELL_RSRQ, "RSRQ"),
                leaf(PRIMARY_CELL_SINR, "SINR"),
            ])),
        ),
    ])
}

fn neighbor_cells_definition() -> RanParameterDefinition {
    RanParameterDefinition::List(vec![item(
        NEIGHBOR_CELL_ITEM,
        "Neighbor Cell Item",
        Some(RanParameterDefinition::Structure(vec![
            leaf(NEIGHBOR_NR_CGI, "NR CGI"),
            leaf(NEIGHBOR_PCI, "PCI"),
            leaf(NEIGHBOR_RSRP, "RSRP"),
            leaf(NEIGHBOR_RSRQ, "RSRQ"),
            leaf(NEIGHBOR_SINR, "SINR"),
        ])),
    )])
}

/// Parameters advertised for Report Style 4
pub fn report_style4_parameters() -> Vec<RanParameterDescription> {
    vec![
        RanParameterDescription {
            id: RRC_STATE_CHANGED_TO,
            name: "RRC State Changed To".to_string(),
            definition: None,
        },
        RanParameterDescription {
            id: MASTER_NODE,
            name: "Master Node".to_string(),
            definition: Some(RanParameterDefinition::Structure(vec![
                leaf(MASTER_NODE_GNB_ID, "gNB ID"),
                item(PRIMARY_CELL_OF_MCG, "Primary Cell of MCG", Some(primary_cell_definition())),
                item(LIST_OF_NEIGHBOR_CELLS, "List of Neighbor cells", Some(neighbor_cells_definition())),
            ])),
        },
    ]
}

/// Parameters advertised for the Handover Control action
pub fn handover_control_parameters() -> Vec<RanParameterDescription> {
    vec![RanParameterDescription {
        id: TARGET_PRIMARY_CELL_ID,
        name: "Target Primary Cell ID".to_string(),
        definition: Some(RanParameterDefinition::Structure(vec![item(
            TARGET_CELL,
            "CHOICE Target Cell",
            Some(RanParameterDefinition::Structure(vec![item(
                TARGET_NR_CELL,
                "NR Cell",
                Some(RanParameterDefinition::Structure(vec![leaf(TARGET_NR_CGI, "NR CGI")])),
            )])),
        )])),
    }]
}

/// One requested parameter and the sub-parameters requested under it.
///
/// A node without children requests the parameter wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterNode {
    pub id: RanParameterId,
    pub children: Vec<ParameterNode>,
}

impl ParameterNode {
    pub fn new(id: RanParameterId) -> Self {
        Self {
            id,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn from_definition_item(item: &RanParameterDefinitionItem) -> Self {
        Self {
            id: item.id,
            children: item
                .definition
                .as_deref()
                .map(children_of)
                .unwrap_or_default(),
        }
    }
}

fn children_of(definition: &RanParameterDefinition) -> Vec<ParameterNode> {
    definition
        .items()
        .iter()
        .map(ParameterNode::from_definition_item)
        .collect()
}

fn find(nodes: &[ParameterNode], id: RanParameterId) -> Option<&ParameterNode> {
    nodes.iter().find(|n| n.id == id)
}

/// The parameters one subscription action asked to be reported
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubscriptionParametersTree {
    roots: Vec<ParameterNode>,
}

impl SubscriptionParametersTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree holding the single chain `path`.
    pub fn from_path(path: &[RanParameterId]) -> Self {
        let mut tree = Self::new();
        tree.insert_path(path);
        tree
    }

    /// Tree of an action definition Format 1 parameter list
    pub fn from_reported(parameters: &[RanParameterToBeReported]) -> Self {
        let roots = parameters
            .iter()
            .map(|p| ParameterNode {
                id: p.id,
                children: p.definition.as_ref().map(children_of).unwrap_or_default(),
            })
            .collect();
        Self { roots }
    }

    /// Adds the chain `path`, sharing existing prefixes.
    pub fn insert_path(&mut self, path: &[RanParameterId]) {
        let mut level = &mut self.roots;
        for id in path {
            let index = match level.iter().position(|n| n.id == *id) {
                Some(index) => index,
                None => {
                    level.push(ParameterNode::new(*id));
                    level.len() - 1
                }
            };
            level = &mut level[index].children;
        }
    }

    pub fn roots(&self) -> &[ParameterNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// End node of `path` if the whole path exists.
    fn walk(&self, path: &[RanParameterId]) -> Option<&ParameterNode> {
        let (first, rest) = path.split_first()?;
        let mut node = find(&self.roots, *first)?;
        for id in rest {
            node = find(&node.children, *id)?;
        }
        Some(node)
    }

    /// True if every ID of `path` is present, level by level.
    pub fn hierarchy_match(&self, path: &[RanParameterId]) -> bool {
        self.walk(path).is_some()
    }

    /// End node of `path` if the path exists and ends at a leaf.
    pub fn get_hierarchy_leaf(&self, path: &[RanParameterId]) -> Option<&ParameterNode> {
        self.walk(path).filter(|node| node.is_leaf())
    }

    /// True if the subscriber asked for `path`: either the whole path is in
    /// the tree or a wholesale request covers it.
    pub fn includes(&self, path: &[RanParameterId]) -> bool {
        if path.is_empty() {
            return false;
        }
        let mut level = self.roots.as_slice();
        for id in path {
            let Some(node) = find(level, *id) else {
                return false;
            };
            if node.is_leaf() {
                return true;
            }
            level = &node.children;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_parameter_match() {
        let tree = SubscriptionParametersTree::from_path(&[RRC_STATE_CHANGED_TO]);
        assert!(tree.hierarchy_match(&[202]));
        assert!(!tree.hierarchy_match(&[202, 999]));
        assert!(!tree.hierarchy_match(&[]));
    }

    #[test]
    fn test_deep_leaf() {
        let tree = SubscriptionParametersTree::from_path(&[21501, 17001, 17010, 17011]);
        let leaf = tree.get_hierarchy_leaf(&[21501, 17001, 17010, 17011]).unwrap();
        assert_eq!(leaf.id, 17011);

        assert!(tree.get_hierarchy_leaf(&[21501, 17001, 17010]).is_none());
        assert!(tree.get_hierarchy_leaf(&[21501]).is_none());
        assert!(tree.get_hierarchy_leaf(&[21501, 17001, 17010, 17012]).is_none());
        assert!(tree.get_hierarchy_leaf(&[21501, 17002]).is_none());
    }

    #[test]
    fn test_includes_wholesale() {
        let tree = SubscriptionParametersTree::from_path(&[MASTER_NODE]);
        assert!(tree.includes(&[MASTER_NODE]));
        assert!(tree.includes(&[MASTER_NODE, PRIMARY_CELL_OF_MCG, PRIMARY_CELL_MEASUREMENTS]));
        assert!(tree.includes(&[MASTER_NODE, LIST_OF_NEIGHBOR_CELLS]));
        assert!(!tree.includes(&[RRC_STATE_CHANGED_TO]));
    }

    #[test]
    fn test_includes_partial() {
        let tree = SubscriptionParametersTree::from_path(&[21501, 17001, 17010, 17011]);
        assert!(tree.includes(&[MASTER_NODE]));
        assert!(tree.includes(&[MASTER_NODE, PRIMARY_CELL_OF_MCG]));
        assert!(tree.includes(&[21501, 17001, 17010, 17011]));
        assert!(!tree.includes(&[21501, 17001, 17010, 17012]));
        assert!(!tree.includes(&[MASTER_NODE, MASTER_NODE_GNB_ID]));
        assert!(!tree.includes(&[MASTER_NODE, LIST_OF_NEIGHBOR_CELLS]));
    }

    #[test]
    fn test_insert_path_shares_prefix() {
        let mut tree = SubscriptionParametersTree::new();
        tree.insert_path(&[21501, 17001]);
        tree.insert_path(&[21501, 21502]);
        assert_eq!(tree.roots().len(), 1);
        assert_eq!(tree.roots()[0].children.len(), 2);
    }

    #[test]
    fn test_from_reported_follows_definitions() {
        let master_node = report_style4_parameters().remove(1);
        let reported = vec![
            RanParameterToBeReported::new(RRC_STATE_CHANGED_TO),
            RanParameterToBeReported {
                id: master_node.id,
                definition: master_node.definition,
            },
        ];
        let tree = SubscriptionParametersTree::from_reported(&reported);
        assert!(tree.get_hierarchy_leaf(&[202]).is_some());
        assert!(tree.get_hierarchy_leaf(&[21501, 17001, 17010, 17013]).is_some());
        assert!(tree.get_hierarchy_leaf(&[21501, 17002, 17100, 17102]).is_some());
        assert!(tree.hierarchy_match(&[21501, 17002]));
    }

    #[test]
    fn test_handover_catalog() {
        let params = handover_control_parameters();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].id, TARGET_PRIMARY_CELL_ID);
    }
}
