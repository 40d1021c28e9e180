use std::collections::{HashMap, HashSet};

use crate::ir::{BreakMode, Node};

#[derive(Debug, Default, Clone)]
pub struct ChildMap {
    children: HashMap<String, Vec<String>>,
}

impl ChildMap {
    /// Children in node order, from every stored edge.
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        for node in nodes {
            let Some(parent) = node.parent_id.as_deref() else {
                continue;
            };
            if parent == node.contact_id {
                continue;
            }
            let list = children.entry(parent.to_string()).or_default();
            if !list.contains(&node.contact_id) {
                list.push(node.contact_id.clone());
            }
        }
        Self { children }
    }

    pub fn children(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `id` followed by all of its descendants, depth first. Terminates on malformed graphs.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current.to_string());
            for child in self.children(current).iter().rev() {
                if !seen.contains(child.as_str()) {
                    stack.push(child.as_str());
                }
            }
        }
        order
    }
}

fn parents_by_id(nodes: &[Node]) -> HashMap<&str, Option<&str>> {
    nodes
        .iter()
        .map(|node| (node.contact_id.as_str(), node.parent_id.as_deref()))
        .collect()
}

/// Whether walking parent links upward from `start` reaches `target`.
fn chain_reaches(
    parents: &HashMap<&str, Option<&str>>,
    start: &str,
    target: &str,
) -> bool {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut cursor = Some(start);
    while let Some(current) = cursor {
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            return false;
        }
        cursor = parents.get(current).copied().flatten();
    }
    false
}

/// The parent `node_id` may legally take, or `None` when the request is invalid.
pub fn resolve_parent(nodes: &[Node], node_id: &str, parent_id: Option<&str>) -> Option<String> {
    let parent_id = parent_id?;
    if parent_id == node_id {
        return None;
    }
    let parents = parents_by_id(nodes);
    if !parents.contains_key(parent_id) {
        return None;
    }
    if chain_reaches(&parents, parent_id, node_id) {
        tracing::debug!(node = node_id, parent = parent_id, "rejected parent: would form a cycle");
        return None;
    }
    Some(parent_id.to_string())
}

/// Returns false when `node_id` is not in `nodes`.
///
/// Invalid parents detach the node instead. A successful assignment copies
/// the parent's cluster onto the node and its whole subtree.
pub fn set_parent(nodes: &mut [Node], node_id: &str, parent_id: Option<&str>) -> bool {
    if !nodes.iter().any(|node| node.contact_id == node_id) {
        return false;
    }
    let next_parent = resolve_parent(nodes, node_id, parent_id);
    let inherited_cluster = next_parent.as_deref().map(|parent| {
        nodes
            .iter()
            .find(|node| node.contact_id == parent)
            .and_then(|node| node.cluster_id.clone())
    });

    for node in nodes.iter_mut() {
        if node.contact_id == node_id {
            node.parent_id = next_parent.clone();
        }
    }

    if let Some(cluster_id) = inherited_cluster {
        let subtree: HashSet<String> = ChildMap::from_nodes(nodes)
            .descendants(node_id)
            .into_iter()
            .collect();
        for node in nodes.iter_mut() {
            if subtree.contains(&node.contact_id) {
                node.cluster_id = cluster_id.clone();
            }
        }
    }
    true
}

pub fn break_relationships(nodes: &mut [Node], node_id: &str, mode: BreakMode) {
    let boss = matches!(mode, BreakMode::Boss | BreakMode::All);
    let reports = matches!(mode, BreakMode::Reports | BreakMode::All);
    for node in nodes.iter_mut() {
        if boss && node.contact_id == node_id {
            node.parent_id = None;
        }
        if reports && node.parent_id.as_deref() == Some(node_id) {
            node.parent_id = None;
        }
    }
}

/// Direct reports of the removed node become roots; nothing else is deleted.
pub fn remove_node(nodes: &mut Vec<Node>, node_id: &str) -> bool {
    let before = nodes.len();
    nodes.retain(|node| node.contact_id != node_id);
    if nodes.len() == before {
        return false;
    }
    for node in nodes.iter_mut() {
        if node.parent_id.as_deref() == Some(node_id) {
            node.parent_id = None;
        }
    }
    true
}
