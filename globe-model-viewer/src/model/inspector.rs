use std::collections::{HashMap, VecDeque};

use bevy::prelude::*;

use super::glb::NodeTable;

/// glTF node index carried by a spawned scene entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GltfNodeIndex(pub usize);

/// What the inspector knows about a clicked part of the model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementInfo {
    pub node_id: Option<usize>,
    pub name: Option<String>,
    pub has_position_matrix: bool,
}

impl ElementInfo {
    pub fn describe(node_id: Option<usize>, table: &NodeTable) -> Self {
        let Some(node_id) = node_id else {
            return Self::default();
        };

        let node = table.node(node_id);
        Self {
            node_id: Some(node_id),
            name: node.and_then(|node| node.name.clone()),
            has_position_matrix: node.is_some_and(|node| node.has_local_transform),
        }
    }
}

/// Hands out node indices for spawned entity names.
///
/// Names repeat in real files, so each name owns a queue of indices in
/// depth-first order and matching entities must be visited in the same order.
pub struct NodeNameMatcher {
    queues: HashMap<String, VecDeque<usize>>,
}

impl NodeNameMatcher {
    pub fn new(table: &NodeTable) -> Self {
        let mut queues: HashMap<String, VecDeque<usize>> = HashMap::new();
        for index in table.depth_first_order() {
            queues
                .entry(table.spawn_name(index))
                .or_default()
                .push_back(index);
        }
        Self { queues }
    }

    pub fn claim(&mut self, name: &str) -> Option<usize> {
        self.queues.get_mut(name)?.pop_front()
    }
}
