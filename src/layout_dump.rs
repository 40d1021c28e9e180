use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::ir::{CardVariant, ContactLookup, Diagram};
use crate::layout::layout_edges;
use crate::rank::infer_rank;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Everything a renderer needs to draw a diagram, with connectors resolved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub id: String,
    pub name: String,
    pub variant: CardVariant,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub clusters: Vec<ClusterDump>,
    pub connectors: Vec<ConnectorDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub contact_id: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub rank: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub parent_id: Option<String>,
    pub cluster_id: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDump {
    pub id: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Parent bottom-center to child top-center.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorDump {
    pub from: String,
    pub to: String,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_diagram<C: ContactLookup + ?Sized>(
        diagram: &Diagram,
        contacts: &C,
        config: &LayoutConfig,
    ) -> Self {
        let nodes = diagram
            .nodes
            .iter()
            .map(|node| {
                let contact = contacts.contact(&node.contact_id);
                let (width, height) = node.size(diagram.card_variant, config);
                NodeDump {
                    contact_id: node.contact_id.clone(),
                    name: contact.map(|c| c.display_name()),
                    title: contact.map(|c| c.title.clone()),
                    rank: contact.map(|c| infer_rank(&c.title).label().to_string()),
                    x: node.x,
                    y: node.y,
                    width,
                    height,
                    parent_id: node.parent_id.clone(),
                    cluster_id: node.cluster_id.clone(),
                    tags: node.tags.clone(),
                }
            })
            .collect();

        let clusters = diagram
            .clusters
            .iter()
            .map(|cluster| ClusterDump {
                id: cluster.id.clone(),
                label: cluster.label.clone(),
                x: cluster.x,
                y: cluster.y,
                width: cluster.width,
                height: cluster.height,
            })
            .collect();

        Self {
            id: diagram.id.clone(),
            name: diagram.name.clone(),
            variant: diagram.card_variant,
            width: diagram.canvas.width,
            height: diagram.canvas.height,
            nodes,
            clusters,
            connectors: connectors(diagram, contacts, config),
        }
    }
}

/// One connector per parent edge the tree layout places.
pub fn connectors<C: ContactLookup + ?Sized>(
    diagram: &Diagram,
    contacts: &C,
    config: &LayoutConfig,
) -> Vec<ConnectorDump> {
    layout_edges(diagram, contacts, config)
        .into_iter()
        .map(|(parent, child)| {
            let parent = &diagram.nodes[parent];
            let child = &diagram.nodes[child];
            let (parent_width, parent_height) = parent.size(diagram.card_variant, config);
            let (child_width, _) = child.size(diagram.card_variant, config);
            ConnectorDump {
                from: parent.contact_id.clone(),
                to: child.contact_id.clone(),
                points: vec![
                    [parent.x + parent_width / 2.0, parent.y + parent_height],
                    [child.x + child_width / 2.0, child.y],
                ],
            }
        })
        .collect()
}

/// Pretty JSON to `output`, or stdout when no path is given.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => std::fs::write(path, json).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").map_err(|source| Error::Io {
                path: "<stdout>".into(),
                source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Contact, Node};
    use crate::layout::compute_layout;
    use chrono::Utc;

    fn sample() -> Diagram {
        let mut diagram = Diagram::new("Dump", Utc::now(), &LayoutConfig::default());
        let mut boss = Node::new("boss", 100.0, 100.0);
        boss.cluster_id = Some("ops".to_string());
        let mut report = Node::new("report", 50.0, 300.0);
        report.parent_id = Some("boss".to_string());
        report.cluster_id = Some("ops".to_string());
        let mut stray = Node::new("stray", 600.0, 300.0);
        stray.parent_id = Some("boss".to_string());
        diagram.nodes = vec![boss, report, stray];
        diagram
    }

    #[test]
    fn connectors_run_bottom_center_to_top_center() {
        let config = LayoutConfig::default();
        let lines = connectors(&sample(), &[] as &[Contact], &config);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].from, "boss");
        assert_eq!(lines[0].points, vec![[210.0, 210.0], [160.0, 300.0]]);
    }

    #[test]
    fn stored_cycle_draws_the_edges_the_layout_keeps() {
        let config = LayoutConfig::default();
        let mut diagram = sample();
        diagram.nodes[0].parent_id = Some("report".to_string());
        let laid_out = compute_layout(&diagram, &[] as &[Contact], &config);
        let lines = connectors(&laid_out, &[] as &[Contact], &config);
        assert_eq!(lines.len(), 1);
        assert_eq!((lines[0].from.as_str(), lines[0].to.as_str()), ("boss", "report"));
        let boss = laid_out.node("boss").unwrap();
        let report = laid_out.node("report").unwrap();
        assert_eq!(lines[0].points[0], [boss.x + 110.0, boss.y + 110.0]);
        assert_eq!(lines[0].points[1], [report.x + 110.0, report.y]);
        assert!(report.y > boss.y);
    }

    #[test]
    fn cycle_cut_follows_seniority() {
        let config = LayoutConfig::default();
        let mut diagram = sample();
        diagram.nodes[0].parent_id = Some("report".to_string());
        let contacts = vec![Contact::new("report", "Rae", "Ito", "Chief Executive Officer")];
        let lines = connectors(&diagram, &contacts, &config);
        assert_eq!(lines.len(), 1);
        assert_eq!((lines[0].from.as_str(), lines[0].to.as_str()), ("report", "boss"));
    }

    #[test]
    fn dump_resolves_contact_details() {
        let config = LayoutConfig::default();
        let contacts = vec![Contact::new("boss", "Grace", "Hopper", "Chief Technology Officer")];
        let dump = LayoutDump::from_diagram(&sample(), &contacts, &config);
        assert_eq!(dump.variant, CardVariant::Small);
        assert_eq!(dump.nodes[0].name.as_deref(), Some("Grace Hopper"));
        assert_eq!(dump.nodes[0].rank.as_deref(), Some("C-Suite"));
        assert!(dump.nodes[1].name.is_none());
        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["nodes"][1]["contactId"], "report");
        assert_eq!(json["connectors"][0]["to"], "report");
        assert_eq!(json["variant"], "small");
    }
}
