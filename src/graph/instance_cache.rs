use std::sync::Arc;

use crate::internal::sync::{HashMap, Mutex, OnceSlot};
use crate::node::NodeId;
use crate::provider::AnyArc;

/// Memoized instances of one graph, keyed by node.
///
/// Each node owns one cell, created under the map lock and initialized
/// outside it. Racing callers block on the cell, so a node is invoked at
/// most once per cache, while a factory may still resolve other cached
/// bindings of the same graph.
pub(crate) struct InstanceCache {
    instances: Mutex<HashMap<NodeId, Arc<OnceSlot<AnyArc>>>>,
}

impl InstanceCache {
    pub(crate) fn new() -> Self {
        Self {
            instances: Mutex::new(HashMap::default()),
        }
    }

    pub(crate) fn get_or_create(&self, node: NodeId, create: impl FnOnce() -> AnyArc) -> AnyArc {
        let cell = self.instances.lock().entry(node).or_default().clone();
        cell.get_or_init(create).clone()
    }

    /// Number of initialized entries.
    pub(crate) fn len(&self) -> usize {
        self.instances.lock().values().filter(|cell| cell.get().is_some()).count()
    }
}
