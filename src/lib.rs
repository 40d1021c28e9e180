#[cfg(feature = "cli")]
pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod graph;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod ops;
pub mod rank;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{LayoutConfig, load_config};
pub use error::{Error, Result};
pub use ir::{
    BreakMode, CardVariant, Canvas, Cluster, Contact, ContactLookup, Diagram, Node, Point,
};
pub use layout::compute_layout;
pub use layout_dump::LayoutDump;
pub use ops::{
    add_or_update_node, auto_cluster, break_relationships, drop_on_node, move_subtree, node_at,
    reflow, remove_cluster, remove_node, resize, set_parent, set_tags,
};
pub use rank::{Rank, infer_rank};
