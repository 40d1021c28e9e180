use std::collections::HashMap;

use crate::ir::Contact;

/// Functional area, then therapeutic area, then brand; `fallback` when all are blank.
pub fn cluster_label(contact: &Contact, fallback: &str) -> String {
    [
        contact.functional_area.as_str(),
        contact.therapeutic_area.as_str(),
        contact.brand.as_str(),
    ]
    .into_iter()
    .map(str::trim)
    .find(|value| !value.is_empty())
    .unwrap_or(fallback)
    .to_string()
}

pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_dash = false;
    for ch in label.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "cluster".to_string()
    } else {
        slug
    }
}

/// Hands out unique cluster ids: `marketing`, `marketing-1`, `marketing-2`, ...
#[derive(Debug, Default)]
pub struct ClusterIds {
    counts: HashMap<String, usize>,
}

impl ClusterIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, label: &str) -> String {
        let base = slugify(label);
        loop {
            let count = self.counts.entry(base.clone()).or_insert(0);
            let candidate = if *count == 0 {
                base.clone()
            } else {
                format!("{base}-{count}")
            };
            *count += 1;
            if candidate == base || !self.counts.contains_key(&candidate) {
                self.counts.entry(candidate.clone()).or_insert(1);
                return candidate;
            }
        }
    }
}
