use std::cmp::Ordering;
use std::collections::HashMap;

use super::Bounds;
use super::tree::{TreeInput, build_forest, layout_tree};
use crate::cluster::cluster_label;
use crate::config::LayoutConfig;
use crate::ir::{Canvas, Cluster, ContactLookup, Diagram, Node};

struct Group<'a> {
    id: Option<&'a str>,
    label: String,
    nodes: Vec<Node>,
}

fn collect_groups<'a, C: ContactLookup + ?Sized>(
    diagram: &'a Diagram,
    contacts: &C,
    config: &LayoutConfig,
) -> Vec<Group<'a>> {
    let mut groups: Vec<Group<'a>> = Vec::new();
    let mut by_id: HashMap<Option<&'a str>, usize> = HashMap::new();
    for node in &diagram.nodes {
        let key = node.cluster_id.as_deref();
        let slot = *by_id.entry(key).or_insert_with(|| {
            groups.push(Group {
                id: key,
                label: String::new(),
                nodes: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].nodes.push(node.clone());
    }

    for group in &mut groups {
        let Some(id) = group.id else {
            continue;
        };
        group.label = match diagram.cluster(id) {
            Some(cluster) => cluster.label.clone(),
            None => group
                .nodes
                .iter()
                .find_map(|node| contacts.contact(&node.contact_id))
                .map(|contact| cluster_label(contact, &config.fallback_cluster_label))
                .unwrap_or_else(|| id.to_string()),
        };
    }

    let existing: HashMap<&str, usize> = diagram
        .clusters
        .iter()
        .enumerate()
        .map(|(idx, cluster)| (cluster.id.as_str(), idx))
        .collect();
    groups.sort_by(|a, b| group_order(a, b, &existing));
    groups
}

/// Known clusters keep their order, new ones follow by label, the unclustered group goes last.
fn group_order(a: &Group<'_>, b: &Group<'_>, existing: &HashMap<&str, usize>) -> Ordering {
    let (Some(id_a), Some(id_b)) = (a.id, b.id) else {
        return a.id.is_none().cmp(&b.id.is_none());
    };
    match (existing.get(id_a), existing.get(id_b)) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.label.cmp(&b.label).then_with(|| id_a.cmp(id_b)),
    }
}

/// Full reflow: every node and cluster repositioned from the relationship graph.
pub fn compute_layout<C: ContactLookup + ?Sized>(
    diagram: &Diagram,
    contacts: &C,
    config: &LayoutConfig,
) -> Diagram {
    let mut next = diagram.clone();
    next.nodes.clear();
    next.clusters.clear();
    next.canvas = Canvas::minimum(config);
    if diagram.nodes.is_empty() {
        return next;
    }

    let card = config.card(diagram.card_variant);
    let groups = collect_groups(diagram, contacts, config);
    let mut cursor_x = config.canvas_margin;
    let mut extent = Bounds::empty();

    for group in &groups {
        let cluster_x = cursor_x;
        let cluster_y = config.canvas_margin;
        let base_x = cluster_x + config.cluster_padding_x;
        let base_y = cluster_y + config.cluster_padding_y + config.label_height;

        let input = TreeInput {
            nodes: &group.nodes,
            contacts,
            variant: diagram.card_variant,
            config,
        };
        let placed = layout_tree(&input, (base_x, base_y));

        let content_width = (placed.bounds.max_x - base_x).max(card.width);
        let content_height = (placed.bounds.max_y - base_y).max(card.height);
        let cluster_width = config.cluster_padding_x * 2.0 + content_width;
        let cluster_height =
            config.cluster_padding_y * 2.0 + config.label_height + content_height;
        extent.include_rect(cluster_x, cluster_y, cluster_width, cluster_height);
        cursor_x += cluster_width + config.cluster_gap_x;

        if let Some(id) = group.id {
            next.clusters.push(Cluster {
                id: id.to_string(),
                label: group.label.clone(),
                x: cluster_x,
                y: cluster_y,
                width: cluster_width,
                height: cluster_height,
            });
        }
        next.nodes.extend(placed.nodes);
    }

    next.canvas = Canvas {
        width: (extent.max_x + config.canvas_margin).max(config.min_canvas_width),
        height: (extent.max_y + config.canvas_margin).max(config.min_canvas_height),
    };
    tracing::debug!(
        diagram = %diagram.id,
        nodes = next.nodes.len(),
        clusters = next.clusters.len(),
        width = next.canvas.width,
        height = next.canvas.height,
        "reflowed diagram"
    );
    next
}

/// Parent/child pairs the tree layout places, as `(parent, child)` indices into `diagram.nodes`.
///
/// Edges leaving a cluster, dangling parents, and the cut link of every stored
/// cycle are absent. Ordered by child index.
pub fn layout_edges<C: ContactLookup + ?Sized>(
    diagram: &Diagram,
    contacts: &C,
    config: &LayoutConfig,
) -> Vec<(usize, usize)> {
    let mut members: HashMap<Option<&str>, Vec<usize>> = HashMap::new();
    for (idx, node) in diagram.nodes.iter().enumerate() {
        members
            .entry(node.cluster_id.as_deref())
            .or_default()
            .push(idx);
    }

    let mut edges = Vec::new();
    for indices in members.values() {
        let nodes: Vec<Node> = indices.iter().map(|&idx| diagram.nodes[idx].clone()).collect();
        let input = TreeInput {
            nodes: &nodes,
            contacts,
            variant: diagram.card_variant,
            config,
        };
        let forest = build_forest(&input);
        for (parent, children) in forest.children.iter().enumerate() {
            edges.extend(children.iter().map(|&child| (indices[parent], indices[child])));
        }
    }
    edges.sort_by_key(|&(_, child)| child);
    edges
}
