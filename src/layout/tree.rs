use std::collections::{HashMap, HashSet};

use super::Bounds;
use crate::config::LayoutConfig;
use crate::ir::{CardVariant, ContactLookup, Node};
use crate::rank::SeniorityKey;

pub(super) struct TreeInput<'a, C: ContactLookup + ?Sized> {
    pub nodes: &'a [Node],
    pub contacts: &'a C,
    pub variant: CardVariant,
    pub config: &'a LayoutConfig,
}

pub(super) struct PlacedTree {
    pub nodes: Vec<Node>,
    pub bounds: Bounds,
}

/// Parent links of one cluster with every malformed edge cut.
pub(super) struct Forest {
    pub children: Vec<Vec<usize>>,
    pub roots: Vec<usize>,
    pub sizes: Vec<(f32, f32)>,
}

pub(super) fn build_forest<C: ContactLookup + ?Sized>(input: &TreeInput<'_, C>) -> Forest {
    let nodes = input.nodes;
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (idx, node) in nodes.iter().enumerate() {
        index.entry(node.contact_id.as_str()).or_insert(idx);
    }
    let keys: Vec<SeniorityKey> = nodes
        .iter()
        .map(|node| SeniorityKey::new(&node.contact_id, input.contacts.contact(&node.contact_id)))
        .collect();

    let mut parent: Vec<Option<usize>> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| {
            node.parent_id
                .as_deref()
                .and_then(|id| index.get(id).copied())
                .filter(|&parent| parent != idx)
        })
        .collect();
    break_cycles(&mut parent, &keys);

    let mut children = vec![Vec::new(); nodes.len()];
    let mut roots = Vec::new();
    for (idx, parent) in parent.iter().enumerate() {
        match parent {
            Some(parent) => children[*parent].push(idx),
            None => roots.push(idx),
        }
    }
    let by_key = |a: &usize, b: &usize| keys[*a].cmp(&keys[*b]).then(a.cmp(b));
    roots.sort_by(by_key);
    for list in &mut children {
        list.sort_by(by_key);
    }

    let sizes = nodes
        .iter()
        .map(|node| node.size(input.variant, input.config))
        .collect();
    Forest {
        children,
        roots,
        sizes,
    }
}

/// Cuts the most senior member of every stored cycle loose so it becomes a root.
fn break_cycles(parent: &mut [Option<usize>], keys: &[SeniorityKey]) {
    // 0 = unvisited, 1 = on the current walk, 2 = settled
    let mut state = vec![0u8; parent.len()];
    for start in 0..parent.len() {
        if state[start] != 0 {
            continue;
        }
        let mut path = Vec::new();
        let mut cursor = Some(start);
        while let Some(current) = cursor {
            match state[current] {
                0 => {
                    state[current] = 1;
                    path.push(current);
                    cursor = parent[current];
                }
                1 => {
                    if let Some(pos) = path.iter().position(|&idx| idx == current) {
                        let cut = path[pos..]
                            .iter()
                            .copied()
                            .min_by(|a, b| keys[*a].cmp(&keys[*b]).then(a.cmp(b)));
                        if let Some(cut) = cut {
                            tracing::trace!(node = %keys[cut].id, "broke stored parent cycle");
                            parent[cut] = None;
                        }
                    }
                    break;
                }
                _ => break,
            }
        }
        for idx in path {
            state[idx] = 2;
        }
    }
}

pub(super) fn subtree_widths(forest: &Forest, gap: f32) -> Vec<f32> {
    let mut memo = vec![None; forest.sizes.len()];
    let mut path = HashSet::new();
    for idx in 0..forest.sizes.len() {
        subtree_width(idx, forest, gap, &mut memo, &mut path);
    }
    memo.into_iter()
        .enumerate()
        .map(|(idx, width)| width.unwrap_or(forest.sizes[idx].0))
        .collect()
}

fn subtree_width(
    idx: usize,
    forest: &Forest,
    gap: f32,
    memo: &mut [Option<f32>],
    path: &mut HashSet<usize>,
) -> f32 {
    if let Some(width) = memo[idx] {
        return width;
    }
    let own = forest.sizes[idx].0;
    if !path.insert(idx) {
        return own;
    }
    let children = &forest.children[idx];
    let width = if children.is_empty() {
        own
    } else {
        let mut total = 0.0;
        for &child in children {
            total += subtree_width(child, forest, gap, memo, path);
        }
        total += gap * (children.len() as f32 - 1.0);
        own.max(total)
    };
    path.remove(&idx);
    memo[idx] = Some(width);
    width
}

/// Y offset of each depth level, relative to the top row.
pub(super) fn depth_offsets(forest: &Forest, row_gap: f32, fallback_height: f32) -> Vec<f32> {
    let mut heights: Vec<f32> = Vec::new();
    let mut seen = vec![false; forest.sizes.len()];
    let mut stack: Vec<(usize, usize)> = forest.roots.iter().map(|&root| (root, 0)).collect();
    while let Some((idx, depth)) = stack.pop() {
        if seen[idx] {
            continue;
        }
        seen[idx] = true;
        if heights.len() <= depth {
            heights.resize(depth + 1, 0.0);
        }
        heights[depth] = heights[depth].max(forest.sizes[idx].1);
        for &child in &forest.children[idx] {
            stack.push((child, depth + 1));
        }
    }
    if heights.is_empty() {
        heights.push(fallback_height);
    }

    let mut offsets = Vec::with_capacity(heights.len());
    let mut cumulative = 0.0;
    for height in heights {
        offsets.push(cumulative);
        cumulative += height + row_gap;
    }
    offsets
}

struct Placer<'a> {
    forest: &'a Forest,
    widths: &'a [f32],
    offsets: &'a [f32],
    top: f32,
    gap: f32,
    row_gap: f32,
    placed: Vec<Option<(f32, f32)>>,
    order: Vec<usize>,
}

impl Placer<'_> {
    fn place(&mut self, idx: usize, left: f32, depth: usize) {
        if self.placed[idx].is_some() {
            return;
        }
        let (width, height) = self.forest.sizes[idx];
        let subtree = self.widths[idx];
        let offset = self
            .offsets
            .get(depth)
            .copied()
            .unwrap_or(depth as f32 * (height + self.row_gap));
        self.placed[idx] = Some((left + (subtree - width) / 2.0, self.top + offset));
        self.order.push(idx);

        let forest = self.forest;
        let children = &forest.children[idx];
        if children.is_empty() {
            return;
        }
        let total: f32 = children.iter().map(|&child| self.widths[child]).sum::<f32>()
            + self.gap * (children.len() as f32 - 1.0);
        let mut child_left = left + (subtree - total) / 2.0;
        for &child in children {
            self.place(child, child_left, depth + 1);
            child_left += self.widths[child] + self.gap;
        }
    }
}

/// Tidy-tree placement of one cluster's nodes with the top-left of the content at `origin`.
pub(super) fn layout_tree<C: ContactLookup + ?Sized>(
    input: &TreeInput<'_, C>,
    origin: (f32, f32),
) -> PlacedTree {
    let config = input.config;
    let card = config.card(input.variant);
    let forest = build_forest(input);
    let widths = subtree_widths(&forest, config.level_gap_x);
    let offsets = depth_offsets(&forest, config.row_gap_y, card.height);

    let root_gap = if forest.roots.len() > 1 {
        config.root_gap()
    } else {
        0.0
    };
    let total_root_width: f32 = forest.roots.iter().map(|&root| widths[root]).sum::<f32>()
        + root_gap * forest.roots.len().saturating_sub(1) as f32;
    let content_width = total_root_width.max(card.width);
    let mut next_left = origin.0 + (content_width - total_root_width) / 2.0;

    let mut placer = Placer {
        forest: &forest,
        widths: &widths,
        offsets: &offsets,
        top: origin.1,
        gap: config.level_gap_x,
        row_gap: config.row_gap_y,
        placed: vec![None; input.nodes.len()],
        order: Vec::with_capacity(input.nodes.len()),
    };
    for &root in &forest.roots {
        placer.place(root, next_left, 0);
        next_left += widths[root] + root_gap;
    }

    let mut bounds = Bounds::empty();
    let mut nodes = Vec::with_capacity(placer.order.len());
    for &idx in &placer.order {
        let Some((x, y)) = placer.placed[idx] else {
            continue;
        };
        let (width, height) = forest.sizes[idx];
        let mut node = input.nodes[idx].clone();
        node.x = x;
        node.y = y;
        node.width = Some(width);
        node.height = Some(height);
        bounds.include_rect(x, y, width, height);
        nodes.push(node);
    }
    PlacedTree { nodes, bounds }
}
