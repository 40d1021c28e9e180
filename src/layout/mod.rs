mod compose;
mod tree;
pub(crate) mod types;
pub use compose::{compute_layout, layout_edges};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::{CardVariant, Cluster, Contact, Diagram, Node};
    use chrono::Utc;

    fn diagram(nodes: Vec<Node>) -> Diagram {
        let mut diagram = Diagram::new("Test", Utc::now(), &LayoutConfig::default());
        diagram.nodes = nodes;
        diagram
    }

    fn node(id: &str, parent: Option<&str>, cluster: Option<&str>) -> Node {
        let mut node = Node::new(id, 0.0, 0.0);
        node.parent_id = parent.map(str::to_string);
        node.cluster_id = cluster.map(str::to_string);
        node
    }

    fn no_contacts() -> Vec<Contact> {
        Vec::new()
    }

    #[test]
    fn empty_diagram_gets_minimum_canvas() {
        let config = LayoutConfig::default();
        let mut input = diagram(Vec::new());
        input.clusters.push(Cluster::new("stale", "Stale"));
        input.canvas.width = 5000.0;
        let out = compute_layout(&input, &no_contacts(), &config);
        assert!(out.nodes.is_empty());
        assert!(out.clusters.is_empty());
        assert_eq!(out.canvas.width, 900.0);
        assert_eq!(out.canvas.height, 600.0);
    }

    #[test]
    fn single_node_cluster_geometry() {
        let config = LayoutConfig::default();
        let mut input = diagram(vec![node("a", None, Some("ops"))]);
        input.clusters.push(Cluster::new("ops", "Operations"));
        let out = compute_layout(&input, &no_contacts(), &config);
        let placed = &out.nodes[0];
        assert_eq!(placed.x, 60.0 + 32.0);
        assert_eq!(placed.y, 60.0 + 40.0 + 24.0);
        assert_eq!(placed.width, Some(220.0));
        let cluster = &out.clusters[0];
        assert_eq!(cluster.label, "Operations");
        assert_eq!(cluster.x, 60.0);
        assert_eq!(cluster.width, 32.0 * 2.0 + 220.0);
        assert_eq!(cluster.height, 40.0 * 2.0 + 24.0 + 110.0);
    }

    #[test]
    fn clusters_do_not_overlap_and_keep_existing_order() {
        let config = LayoutConfig::default();
        let mut input = diagram(vec![
            node("a", None, Some("zeta")),
            node("b", None, Some("alpha")),
            node("c", None, Some("beta")),
            node("d", None, None),
        ]);
        input.clusters = vec![Cluster::new("zeta", "Zeta"), Cluster::new("ghost", "Ghost")];
        let contacts = vec![
            Contact::new("b", "B", "B", "").with_functional_area("Alpha"),
            Contact::new("c", "C", "C", ""),
        ];
        let out = compute_layout(&input, &contacts, &config);
        let ids: Vec<&str> = out.clusters.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "beta"]);
        assert_eq!(out.clusters[1].label, "Alpha");
        assert_eq!(out.clusters[2].label, "General");
        for pair in out.clusters.windows(2) {
            assert!(pair[0].x + pair[0].width + config.cluster_gap_x <= pair[1].x + 0.01);
        }
        let unclustered = out.nodes.iter().find(|n| n.contact_id == "d").unwrap();
        assert!(unclustered.cluster_id.is_none());
        let last = out.clusters.last().unwrap();
        assert!(unclustered.x > last.x + last.width);
    }

    #[test]
    fn unknown_cluster_without_contact_uses_id_as_label() {
        let config = LayoutConfig::default();
        let input = diagram(vec![node("a", None, Some("custom-team"))]);
        let out = compute_layout(&input, &no_contacts(), &config);
        assert_eq!(out.clusters[0].label, "custom-team");
    }

    #[test]
    fn canvas_grows_past_minimum_for_wide_forests() {
        let config = LayoutConfig::default();
        let mut nodes = vec![node("root", None, Some("c"))];
        for idx in 0..6 {
            nodes.push(node(&format!("r{idx}"), Some("root"), Some("c")));
        }
        let out = compute_layout(&diagram(nodes), &no_contacts(), &config);
        let widest = 6.0 * 220.0 + 5.0 * 70.0;
        assert_eq!(out.canvas.width, 60.0 + 32.0 * 2.0 + widest + 60.0);
        for node in &out.nodes {
            assert!(node.x + node.width.unwrap() <= out.canvas.width);
            assert!(node.y + node.height.unwrap() <= out.canvas.height);
        }
    }

    #[test]
    fn full_variant_uses_larger_defaults() {
        let config = LayoutConfig::default();
        let mut input = diagram(vec![node("a", None, None)]);
        input.card_variant = CardVariant::Full;
        let out = compute_layout(&input, &no_contacts(), &config);
        assert_eq!(out.nodes[0].width, Some(320.0));
        assert_eq!(out.nodes[0].height, Some(200.0));
    }

    #[test]
    fn layout_keeps_stored_parents() {
        let config = LayoutConfig::default();
        let input = diagram(vec![node("a", Some("b"), None), node("b", Some("a"), None)]);
        let out = compute_layout(&input, &no_contacts(), &config);
        let a = out.nodes.iter().find(|n| n.contact_id == "a").unwrap();
        assert_eq!(a.parent_id.as_deref(), Some("b"));
    }

    #[test]
    fn layout_edges_skip_foreign_and_dangling_parents() {
        let config = LayoutConfig::default();
        let input = diagram(vec![
            node("boss", None, Some("ops")),
            node("report", Some("boss"), Some("ops")),
            node("outsider", Some("boss"), Some("sales")),
            node("orphan", Some("missing"), Some("ops")),
        ]);
        assert_eq!(layout_edges(&input, &no_contacts(), &config), vec![(0, 1)]);
    }
}
