//! The node tree and its caching machinery
//!
//! This module contains the tree structures at the heart of the layout
//! core:
//! - **NodeTree**: arena-owned tree of nodes, the single mutation and
//!   query surface
//! - **Node**: per-node state record plus the [`NodePolicy`] override seam
//! - **CachedRect**: the lazily evaluated, invalidatable rectangle cache
//!
//! # Architecture
//!
//! ```text
//! mutation → constraint clamp → cache invalidation (pushed down the tree)
//! rect read → cached? return : regenerate from parent content area (pulled)
//! ```

pub mod cached_rect;
pub mod node;
pub mod node_tree;

pub use cached_rect::{CachedRect, RectKind};
pub use node::{DefaultPolicy, Node, NodePolicy};
pub use node_tree::{NodeId, NodeTree};
