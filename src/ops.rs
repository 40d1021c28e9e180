use std::collections::{HashMap, HashSet};

use crate::cluster::{ClusterIds, cluster_label};
use crate::config::LayoutConfig;
use crate::graph::{self, ChildMap};
use crate::ir::{BreakMode, CardVariant, Canvas, Cluster, Contact, ContactLookup, Diagram, Node, Point};
use crate::layout::{Bounds, compute_layout};
use crate::rank::SeniorityKey;

/// Drops a contact onto the canvas, or moves its existing card to `position`.
pub fn add_or_update_node(
    diagram: &Diagram,
    contact_id: &str,
    position: Point,
    config: &LayoutConfig,
) -> Diagram {
    let mut next = diagram.clone();
    let x = position.x.max(0.0);
    let y = position.y.max(0.0);
    match next.node_mut(contact_id) {
        Some(node) => {
            node.x = x;
            node.y = y;
        }
        None => {
            let card = config.card(next.card_variant);
            let mut node = Node::new(contact_id, x, y);
            node.width = Some(card.width);
            node.height = Some(card.height);
            next.nodes.push(node);
            tracing::debug!(contact = contact_id, "added node");
        }
    }
    grow_canvas(&mut next, config);
    next
}

pub fn remove_node(diagram: &Diagram, contact_id: &str) -> Diagram {
    let mut next = diagram.clone();
    if graph::remove_node(&mut next.nodes, contact_id) {
        tracing::debug!(contact = contact_id, "removed node");
    }
    next
}

pub fn set_parent(diagram: &Diagram, contact_id: &str, parent_id: Option<&str>) -> Diagram {
    let mut next = diagram.clone();
    graph::set_parent(&mut next.nodes, contact_id, parent_id);
    next
}

pub fn break_relationships(diagram: &Diagram, contact_id: &str, mode: BreakMode) -> Diagram {
    let mut next = diagram.clone();
    graph::break_relationships(&mut next.nodes, contact_id, mode);
    next
}

/// Replaces a node's follow-up tags; blanks and duplicates are dropped.
pub fn set_tags<S: AsRef<str>>(diagram: &Diagram, contact_id: &str, tags: &[S]) -> Diagram {
    let mut next = diagram.clone();
    if let Some(node) = next.node_mut(contact_id) {
        let mut seen = HashSet::new();
        node.tags = tags
            .iter()
            .map(|tag| tag.as_ref().trim())
            .filter(|tag| !tag.is_empty() && seen.insert(tag.to_string()))
            .map(str::to_string)
            .collect();
    }
    next
}

pub fn reflow<C: ContactLookup + ?Sized>(
    diagram: &Diagram,
    contacts: &C,
    config: &LayoutConfig,
) -> Diagram {
    compute_layout(diagram, contacts, config)
}

/// Switches every card to `variant` and reflows.
pub fn resize<C: ContactLookup + ?Sized>(
    diagram: &Diagram,
    variant: CardVariant,
    contacts: &C,
    config: &LayoutConfig,
) -> Diagram {
    let card = config.card(variant);
    let mut next = diagram.clone();
    next.card_variant = variant;
    for node in &mut next.nodes {
        node.width = Some(card.width);
        node.height = Some(card.height);
    }
    compute_layout(&next, contacts, config)
}

/// Drags a node together with all of its descendants.
///
/// Each moved card is clamped at the canvas origin independently; the canvas
/// only ever grows here. Run [`reflow`] afterwards to normalize spacing.
pub fn move_subtree(
    diagram: &Diagram,
    contact_id: &str,
    dx: f32,
    dy: f32,
    config: &LayoutConfig,
) -> Diagram {
    if (dx == 0.0 && dy == 0.0) || !diagram.contains(contact_id) {
        return diagram.clone();
    }
    let subtree: HashSet<String> = ChildMap::from_nodes(&diagram.nodes)
        .descendants(contact_id)
        .into_iter()
        .collect();

    let mut next = diagram.clone();
    let variant = next.card_variant;
    for node in &mut next.nodes {
        if !subtree.contains(&node.contact_id) {
            continue;
        }
        let (width, height) = node.size(variant, config);
        node.x = (node.x + dx).max(0.0);
        node.y = (node.y + dy).max(0.0);
        node.width = Some(width);
        node.height = Some(height);
    }
    grow_canvas(&mut next, config);
    tracing::trace!(contact = contact_id, moved = subtree.len(), dx, dy, "moved subtree");
    next
}

/// Topmost card under `(x, y)`, skipping `exclude`.
pub fn node_at<'a>(
    diagram: &'a Diagram,
    x: f32,
    y: f32,
    exclude: Option<&str>,
    config: &LayoutConfig,
) -> Option<&'a Node> {
    diagram.nodes.iter().rev().find(|node| {
        if exclude == Some(node.contact_id.as_str()) {
            return false;
        }
        let (width, height) = node.size(diagram.card_variant, config);
        let mut bounds = Bounds::empty();
        bounds.include_rect(node.x, node.y, width, height);
        bounds.contains_point(x, y)
    })
}

/// Makes the card under the drop point the new manager of `contact_id`.
pub fn drop_on_node(
    diagram: &Diagram,
    contact_id: &str,
    x: f32,
    y: f32,
    config: &LayoutConfig,
) -> Diagram {
    let Some(target) = node_at(diagram, x, y, Some(contact_id), config) else {
        return diagram.clone();
    };
    let target = target.contact_id.clone();
    set_parent(diagram, contact_id, Some(&target))
}

/// Deletes a cluster record; its nodes stay and become unclustered.
pub fn remove_cluster(diagram: &Diagram, cluster_id: &str) -> Diagram {
    let mut next = diagram.clone();
    next.clusters.retain(|cluster| cluster.id != cluster_id);
    for node in &mut next.nodes {
        if node.cluster_id.as_deref() == Some(cluster_id) {
            node.cluster_id = None;
        }
    }
    next
}

/// Rebuilds the diagram from `contacts`: clusters by label, managers by inferred rank.
///
/// Membership becomes exactly the given contacts. Existing cards keep their
/// size and tags; new ones get the diagram's variant defaults.
pub fn auto_cluster(diagram: &Diagram, contacts: &[Contact], config: &LayoutConfig) -> Diagram {
    let mut next = diagram.clone();
    next.nodes.clear();
    next.clusters.clear();
    next.canvas = Canvas::minimum(config);

    let mut seen = HashSet::new();
    let contacts: Vec<&Contact> = contacts
        .iter()
        .filter(|contact| seen.insert(contact.id.as_str()))
        .collect();
    if contacts.is_empty() {
        return next;
    }

    let mut buckets: Vec<(String, Vec<&Contact>)> = Vec::new();
    let mut bucket_index: HashMap<String, usize> = HashMap::new();
    for contact in contacts.iter().copied() {
        let label = cluster_label(contact, &config.fallback_cluster_label);
        let slot = *bucket_index.entry(label.clone()).or_insert_with(|| {
            buckets.push((label, Vec::new()));
            buckets.len() - 1
        });
        buckets[slot].1.push(contact);
    }
    buckets.sort_by(|a, b| a.0.cmp(&b.0));

    let card = config.card(diagram.card_variant);
    let mut ids = ClusterIds::new();
    for (label, members) in &buckets {
        let cluster_id = ids.next(label);
        next.clusters.push(Cluster::new(&cluster_id, label));

        let mut ranked: Vec<(SeniorityKey, &Contact)> = members
            .iter()
            .map(|contact| (SeniorityKey::new(&contact.id, Some(*contact)), *contact))
            .collect();
        ranked.sort_by(|a, b| a.0.cmp(&b.0));

        let parents = assign_managers(&ranked);
        for ((_, contact), parent) in ranked.iter().zip(parents) {
            let existing = diagram.node(&contact.id);
            let mut node = Node::new(&contact.id, 0.0, 0.0);
            node.width = Some(existing.and_then(|n| n.width).unwrap_or(card.width));
            node.height = Some(existing.and_then(|n| n.height).unwrap_or(card.height));
            node.tags = existing.map(|n| n.tags.clone()).unwrap_or_default();
            node.parent_id = parent;
            node.cluster_id = Some(cluster_id.clone());
            next.nodes.push(node);
        }
    }
    tracing::debug!(
        contacts = contacts.len(),
        clusters = next.clusters.len(),
        "auto-clustered diagram"
    );
    compute_layout(&next, &contacts_by_id(&contacts), config)
}

/// Greedy manager pick for members sorted most senior first.
///
/// The most senior rank present becomes the roots; everyone else reports to the
/// closest strictly more senior member, preferring whoever has the fewest reports.
fn assign_managers(ranked: &[(SeniorityKey, &Contact)]) -> Vec<Option<String>> {
    let Some(top) = ranked.first().map(|(key, _)| key.rank) else {
        return Vec::new();
    };
    let mut reports = vec![0usize; ranked.len()];
    let mut parents = Vec::with_capacity(ranked.len());
    for (key, _) in ranked {
        if key.rank == top {
            parents.push(None);
            continue;
        }
        let best = ranked
            .iter()
            .enumerate()
            .filter(|(_, (candidate, _))| candidate.rank < key.rank)
            .min_by(|(ia, (a, _)), (ib, (b, _))| {
                let distance_a = key.rank.index() - a.rank.index();
                let distance_b = key.rank.index() - b.rank.index();
                distance_a
                    .cmp(&distance_b)
                    .then(reports[*ia].cmp(&reports[*ib]))
                    .then_with(|| a.cmp(b))
            })
            .map(|(idx, (candidate, _))| (idx, candidate.id.clone()));
        match best {
            Some((idx, id)) => {
                reports[idx] += 1;
                parents.push(Some(id));
            }
            None => parents.push(None),
        }
    }
    parents
}

fn contacts_by_id(contacts: &[&Contact]) -> HashMap<String, Contact> {
    contacts
        .iter()
        .map(|contact| (contact.id.clone(), (*contact).clone()))
        .collect()
}

fn grow_canvas(diagram: &mut Diagram, config: &LayoutConfig) {
    let mut extent = Bounds::empty();
    for node in &diagram.nodes {
        let (width, height) = node.size(diagram.card_variant, config);
        extent.include_rect(node.x, node.y, width, height);
    }
    if extent.is_empty() {
        return;
    }
    diagram.canvas.width = diagram
        .canvas
        .width
        .max(extent.max_x + config.canvas_margin)
        .max(config.min_canvas_width);
    diagram.canvas.height = diagram
        .canvas
        .height
        .max(extent.max_y + config.canvas_margin)
        .max(config.min_canvas_height);
}
