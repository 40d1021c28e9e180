use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardVariant {
    #[default]
    Small,
    Full,
}

impl CardVariant {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "small" => Some(Self::Small),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}

/// Which edges `break_relationships` removes around a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakMode {
    Boss,
    Reports,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Read-only view of a record in the external contact store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    pub functional_area: String,
    pub therapeutic_area: String,
    pub brand: String,
}

impl Contact {
    pub fn new(id: &str, first_name: &str, last_name: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn with_functional_area(mut self, area: &str) -> Self {
        self.functional_area = area.to_string();
        self
    }

    pub fn with_therapeutic_area(mut self, area: &str) -> Self {
        self.therapeutic_area = area.to_string();
        self
    }

    pub fn with_brand(mut self, brand: &str) -> Self {
        self.brand = brand.to_string();
        self
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Anything the engine can resolve a contact id against.
pub trait ContactLookup {
    fn contact(&self, id: &str) -> Option<&Contact>;
}

impl ContactLookup for [Contact] {
    fn contact(&self, id: &str) -> Option<&Contact> {
        self.iter().find(|contact| contact.id == id)
    }
}

impl ContactLookup for Vec<Contact> {
    fn contact(&self, id: &str) -> Option<&Contact> {
        self.as_slice().contact(id)
    }
}

impl ContactLookup for HashMap<String, Contact> {
    fn contact(&self, id: &str) -> Option<&Contact> {
        self.get(id)
    }
}

impl ContactLookup for BTreeMap<String, Contact> {
    fn contact(&self, id: &str) -> Option<&Contact> {
        self.get(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub contact_id: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub cluster_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Node {
    pub fn new(contact_id: &str, x: f32, y: f32) -> Self {
        Self {
            contact_id: contact_id.to_string(),
            x,
            y,
            width: None,
            height: None,
            parent_id: None,
            cluster_id: None,
            tags: Vec::new(),
        }
    }

    /// Card size, falling back to the variant's metrics for unset dimensions.
    pub fn size(&self, variant: CardVariant, config: &LayoutConfig) -> (f32, f32) {
        let card = config.card(variant);
        (
            self.width.unwrap_or(card.width),
            self.height.unwrap_or(card.height),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

impl Cluster {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    pub fn minimum(config: &LayoutConfig) -> Self {
        Self {
            width: config.min_canvas_width,
            height: config.min_canvas_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(default = "default_canvas")]
    pub canvas: Canvas,
    #[serde(default)]
    pub card_variant: CardVariant,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_canvas() -> Canvas {
    Canvas::minimum(&LayoutConfig::default())
}

impl Diagram {
    pub fn new(name: &str, now: DateTime<Utc>, config: &LayoutConfig) -> Self {
        let name = name.trim();
        Self {
            id: format!("org-{}", uuid::Uuid::new_v4().simple()),
            name: if name.is_empty() {
                "Untitled".to_string()
            } else {
                name.to_string()
            },
            nodes: Vec::new(),
            clusters: Vec::new(),
            canvas: Canvas::minimum(config),
            card_variant: config.default_variant,
            created_at: now,
            updated_at: now,
        }
    }

    /// Blank names keep the current one.
    pub fn renamed(&self, name: &str) -> Self {
        let mut next = self.clone();
        let name = name.trim();
        if !name.is_empty() {
            next.name = name.to_string();
        }
        next
    }

    pub fn touched(&self, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.updated_at = now;
        next
    }

    pub fn node(&self, contact_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.contact_id == contact_id)
    }

    pub fn node_mut(&mut self, contact_id: &str) -> Option<&mut Node> {
        self.nodes
            .iter_mut()
            .find(|node| node.contact_id == contact_id)
    }

    pub fn contains(&self, contact_id: &str) -> bool {
        self.node(contact_id).is_some()
    }

    pub fn cluster(&self, cluster_id: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|cluster| cluster.id == cluster_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_diagram_defaults_blank_name() {
        let config = LayoutConfig::default();
        let diagram = Diagram::new("   ", Utc::now(), &config);
        assert_eq!(diagram.name, "Untitled");
        assert!(diagram.id.starts_with("org-"));
        assert_eq!(diagram.canvas, Canvas::minimum(&config));
        assert_eq!(diagram.card_variant, CardVariant::Small);
        assert!(diagram.nodes.is_empty());
    }

    #[test]
    fn rename_ignores_blank() {
        let diagram = Diagram::new("Board", Utc::now(), &LayoutConfig::default());
        assert_eq!(diagram.renamed("  ").name, "Board");
        assert_eq!(diagram.renamed(" Commercial ").name, "Commercial");
    }

    #[test]
    fn node_size_falls_back_to_variant() {
        let config = LayoutConfig::default();
        let mut node = Node::new("a", 0.0, 0.0);
        assert_eq!(node.size(CardVariant::Small, &config), (220.0, 110.0));
        assert_eq!(node.size(CardVariant::Full, &config), (320.0, 200.0));
        node.width = Some(100.0);
        assert_eq!(node.size(CardVariant::Full, &config), (100.0, 200.0));
    }

    #[test]
    fn diagram_json_uses_camel_case() {
        let mut diagram = Diagram::new("Board", Utc::now(), &LayoutConfig::default());
        let mut node = Node::new("c1", 10.0, 20.0);
        node.parent_id = Some("c0".to_string());
        diagram.nodes.push(node);
        let json = serde_json::to_value(&diagram).unwrap();
        assert_eq!(json["cardVariant"], "small");
        assert_eq!(json["nodes"][0]["contactId"], "c1");
        assert_eq!(json["nodes"][0]["parentId"], "c0");
        let back: Diagram = serde_json::from_value(json).unwrap();
        assert_eq!(back, diagram);
    }

    #[test]
    fn contact_lookup_over_slices_and_maps() {
        let contacts = vec![Contact::new("a", "Ada", "Lovelace", "CTO")];
        assert_eq!(contacts.contact("a").map(|c| c.display_name()), Some("Ada Lovelace".to_string()));
        let map: HashMap<String, Contact> = contacts
            .iter()
            .cloned()
            .map(|contact| (contact.id.clone(), contact))
            .collect();
        assert!(map.contact("a").is_some());
        assert!(map.contact("b").is_none());
    }
}
