//! Node state and the per-node derivation policy
//!
//! A [`Node`] is the record the tree arena stores per element: declared
//! geometry, interpretation flags, tree links, and the two rectangle
//! caches. Nodes are not manipulated directly; every operation goes
//! through [`NodeTree`](crate::NodeTree) so cache invalidation and event
//! firing stay coherent.

use crate::alignment::HorizontalAlignment;
use crate::alignment::VerticalAlignment;
use crate::constraints::AspectMode;
use crate::error::Result;
use crate::geometry::Quaternion;
use crate::geometry::Rect;
use crate::geometry::Size;
use crate::tree::cached_rect::CachedRect;
use crate::tree::cached_rect::RectKind;
use crate::tree::node_tree::NodeId;
use crate::tree::node_tree::NodeTree;
use crate::unified::URect;
use crate::unified::USize;
use std::cell::Cell;
use std::fmt;

/// Per-node rectangle derivation policy
///
/// The override seam for widget layers: a plain node's inner rectangle is
/// its outer rectangle, and children resolve against the inner (client) or
/// outer (non-client) rectangle. A widget with a frame implements
/// [`inner_rect`](Self::inner_rect) to carve out the content inset; more
/// advanced widgets can redirect the child content areas entirely.
///
/// Default methods read the node's caches, so overriding nothing costs
/// nothing. Implementations must not invalidate the cache they are
/// generating for.
///
/// # Examples
///
/// ```
/// use uitree::{NodeId, NodePolicy, NodeTree, Rect, Result};
///
/// /// A frame that insets content by a fixed border
/// #[derive(Debug)]
/// struct Framed {
///     border: f32,
/// }
///
/// impl NodePolicy for Framed {
///     fn inner_rect(&self, tree: &NodeTree, node: NodeId, skip: bool) -> Result<Rect> {
///         let outer = tree.unclipped_outer_rect_fresh(node, skip)?;
///         Ok(outer.inset(self.border))
///     }
/// }
/// ```
pub trait NodePolicy: fmt::Debug {
  /// Generates the node's unclipped inner rectangle
  ///
  /// Default: the outer rectangle unchanged (cached read unless
  /// `skip_pixel_alignment` forces the unrounded path).
  fn inner_rect(&self, tree: &NodeTree, node: NodeId, skip_pixel_alignment: bool) -> Result<Rect> {
    if skip_pixel_alignment {
      tree.unclipped_outer_rect_fresh(node, true)
    } else {
      tree.unclipped_outer_rect(node)
    }
  }

  /// The area client children resolve their geometry against
  ///
  /// Default: the unclipped inner rectangle.
  fn client_child_content_area(
    &self,
    tree: &NodeTree,
    node: NodeId,
    skip_pixel_alignment: bool,
  ) -> Result<Rect> {
    if skip_pixel_alignment {
      tree.unclipped_inner_rect_fresh(node, true)
    } else {
      tree.unclipped_inner_rect(node)
    }
  }

  /// The area non-client children resolve their geometry against
  ///
  /// Default: the unclipped outer rectangle.
  fn non_client_child_content_area(
    &self,
    tree: &NodeTree,
    node: NodeId,
    skip_pixel_alignment: bool,
  ) -> Result<Rect> {
    if skip_pixel_alignment {
      tree.unclipped_outer_rect_fresh(node, true)
    } else {
      tree.unclipped_outer_rect(node)
    }
  }
}

/// The no-override policy every plain node carries
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl NodePolicy for DefaultPolicy {}

/// State of one node in the tree
///
/// Field access from outside the crate goes through the
/// [`NodeTree`](crate::NodeTree) accessors, which validate the handle and
/// keep the caching invariant intact.
#[derive(Debug)]
pub struct Node {
  /// Back-reference; `None` for roots. Not owned.
  pub(crate) parent: Option<NodeId>,
  /// Owned children, insertion order = z-order = paint order
  pub(crate) children: Vec<NodeId>,

  /// Declared geometry in unified dimensions, parent-relative
  pub(crate) area: URect,
  /// How the declared x position is anchored
  pub(crate) horizontal_alignment: HorizontalAlignment,
  /// How the declared y position is anchored
  pub(crate) vertical_alignment: VerticalAlignment,
  /// Declared minimum size, resolved against the root container size
  pub(crate) min_size: USize,
  /// Declared maximum size; a zero component disables that axis
  pub(crate) max_size: USize,
  /// Aspect-ratio policy applied to the resolved pixel size
  pub(crate) aspect_mode: AspectMode,
  /// Target width:height ratio when `aspect_mode` is not `Ignore`
  pub(crate) aspect_ratio: f32,
  /// Round resolved rectangles to integer pixel boundaries
  pub(crate) pixel_aligned: bool,
  /// Resolve against the parent's outer (true) or inner (false) area
  pub(crate) non_client: bool,
  /// Pass-through orientation state, unused in rect derivation
  pub(crate) rotation: Quaternion,

  /// Last resolved pixel size, refreshed whenever the outer rect cache
  /// regenerates
  pub(crate) pixel_size: Cell<Size>,
  /// Cache of the full occupied screen rectangle
  pub(crate) outer_rect: CachedRect,
  /// Cache of the content-bearing screen rectangle
  pub(crate) inner_rect: CachedRect,

  /// Rect derivation overrides for this node
  pub(crate) policy: Box<dyn NodePolicy>,
}

impl Node {
  /// Creates a standalone node with default geometry
  ///
  /// Zero area, Left/Top alignment, no minimum, disabled maximum, no
  /// aspect enforcement, pixel-aligned, client, identity rotation.
  pub(crate) fn new(policy: Box<dyn NodePolicy>) -> Self {
    Self {
      parent: None,
      children: Vec::new(),
      area: URect::ZERO,
      horizontal_alignment: HorizontalAlignment::Left,
      vertical_alignment: VerticalAlignment::Top,
      min_size: USize::ZERO,
      max_size: USize::ZERO,
      aspect_mode: AspectMode::Ignore,
      aspect_ratio: 1.0,
      pixel_aligned: true,
      non_client: false,
      rotation: Quaternion::IDENTITY,
      pixel_size: Cell::new(Size::ZERO),
      outer_rect: CachedRect::new(RectKind::Outer),
      inner_rect: CachedRect::new(RectKind::Inner),
      policy,
    }
  }

  /// Invalidates both rectangle caches
  pub(crate) fn invalidate_rects(&self) {
    self.outer_rect.invalidate();
    self.inner_rect.invalidate();
  }
}
