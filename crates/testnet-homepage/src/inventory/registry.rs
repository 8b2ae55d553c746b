//! The set of currently tracked nodes, keyed by inventory name.

use crate::node::Node;

use parking_lot::RwLock;
use std::{
    collections::HashMap,
    sync::Arc,
};

/// Name to tracked node. Only the inventory watcher mutates it; readers take
/// the read lock and see either a fully constructed node or none at all.
#[derive(Debug, Default)]
pub struct Registry {
    nodes: RwLock<HashMap<String, Arc<Node>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.read().contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Node>> {
        self.nodes.read().get(name).cloned()
    }

    /// Tracked names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Runs `f` over every tracked node while holding the read lock.
    pub fn with_nodes<R>(&self, f: impl FnOnce(&HashMap<String, Arc<Node>>) -> R) -> R {
        f(&self.nodes.read())
    }

    /// Returns the node previously registered under the same name, if any.
    pub(crate) fn insert(&self, node: Arc<Node>) -> Option<Arc<Node>> {
        self.nodes.write().insert(node.name().to_string(), node)
    }

    pub(crate) fn remove(&self, name: &str) -> Option<Arc<Node>> {
        self.nodes.write().remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        inventory::NodeInfo,
        test_utils::FakeBeacon,
    };

    fn node(name: &str) -> Arc<Node> {
        Arc::new(Node::new(
            name,
            NodeInfo::default(),
            Arc::new(FakeBeacon::new(name)),
        ))
    }

    #[test]
    fn test_insert_get_remove() {
        let registry = Registry::new();
        assert!(registry.is_empty());

        assert!(registry.insert(node("node-b")).is_none());
        assert!(registry.insert(node("node-a")).is_none());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["node-a", "node-b"]);
        assert_eq!(registry.get("node-a").unwrap().name(), "node-a");

        let removed = registry.remove("node-b").unwrap();
        assert_eq!(removed.name(), "node-b");
        assert!(!registry.contains("node-b"));
        assert!(registry.remove("node-b").is_none());
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let registry = Registry::new();
        registry.insert(node("Node-A"));
        registry.insert(node("node-a"));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("Node-A"));
        assert!(!registry.contains("NODE-A"));
    }

    #[test]
    fn test_with_nodes_sees_all_entries() {
        let registry = Registry::new();
        registry.insert(node("node-a"));
        registry.insert(node("node-b"));

        let total = registry.with_nodes(|nodes| nodes.values().filter(|n| !n.healthy()).count());

        assert_eq!(total, 2);
    }
}
