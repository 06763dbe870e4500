//! # uitree
//!
//! The node/layout core of a retained-mode GUI toolkit: a tree of
//! positioned, sized nodes whose geometry is declared in unified
//! (relative + absolute) dimensions and whose screen-space rectangles are
//! derived lazily, cached per node, and invalidated coherently as the tree
//! mutates.
//!
//! # Architecture
//!
//! ```text
//! set_area / add_child → constraint clamp → push cache invalidation down
//! unclipped_outer_rect → pull recompute from cached parent content area
//! ```
//!
//! Widget layers build on the [`NodeTree`] surface: typed geometry and
//! tree mutators, cached rect queries, a typed event registry, string
//! property reflection, and the [`NodePolicy`] seam for overriding rect
//! derivation per node kind.

pub mod alignment;
pub mod constraints;
pub mod error;
pub mod events;
pub mod geometry;
pub mod properties;
pub mod tree;
pub mod unified;

pub use alignment::{HorizontalAlignment, VerticalAlignment};
pub use constraints::{scale_to_aspect, AspectMode};
pub use error::{Error, Result};
pub use events::{EventKind, NodeEvent, SubscriptionId};
pub use geometry::{align_to_pixels, Point, Quaternion, Rect, Size};
pub use tree::{CachedRect, DefaultPolicy, Node, NodeId, NodePolicy, NodeTree, RectKind};
pub use unified::{UDim, URect, USize, UVector2};
