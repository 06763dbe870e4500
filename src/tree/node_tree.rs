//! The node tree
//!
//! [`NodeTree`] owns every node in an arena of generational slots and is
//! the single entry point for tree mutation, geometry mutation and
//! rectangle queries. Routing everything through the tree is what keeps
//! the caching protocol honest: any mutation that can change a resolved
//! rectangle invalidates the affected caches before it returns, and reads
//! recompute lazily from the cached parent state.
//!
//! # Handles
//!
//! Nodes are addressed by [`NodeId`], a generational index into the arena.
//! Destroying a node bumps its slot's generation, so handles held past a
//! destroy surface [`Error::StaleNode`] instead of silently reading a
//! recycled slot.
//!
//! # Ownership
//!
//! A node exclusively owns its children: destroying it destroys the whole
//! subtree, children first. The parent link is a plain back-reference,
//! valid only while attached.

use crate::alignment::HorizontalAlignment;
use crate::alignment::VerticalAlignment;
use crate::constraints::clamp_size;
use crate::constraints::constrain_to_max_size;
use crate::constraints::constrain_to_min_size;
use crate::constraints::resolved_size_limits;
use crate::constraints::scale_to_aspect;
use crate::constraints::AspectMode;
use crate::error::Error;
use crate::error::Result;
use crate::events::EventKind;
use crate::events::EventRegistry;
use crate::events::NodeEvent;
use crate::events::SubscriptionId;
use crate::geometry::align_to_pixels;
use crate::geometry::Point;
use crate::geometry::Quaternion;
use crate::geometry::Rect;
use crate::geometry::Size;
use crate::tree::cached_rect::CachedRect;
use crate::tree::cached_rect::RectKind;
use crate::tree::node::DefaultPolicy;
use crate::tree::node::Node;
use crate::tree::node::NodePolicy;
use crate::unified::UDim;
use crate::unified::URect;
use crate::unified::USize;
use crate::unified::UVector2;
use std::fmt;
use tracing::debug;
use tracing::trace;

/// Generational handle to a node in a [`NodeTree`]
///
/// Cheap to copy and safe to hold indefinitely: a handle whose node was
/// destroyed stops resolving rather than aliasing whatever reused the
/// slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
  index: u32,
  generation: u32,
}

impl NodeId {
  /// A handle that never resolves to a live node
  ///
  /// Useful as a placeholder in caller-side data structures and tests.
  pub const fn dangling() -> Self {
    Self {
      index: u32::MAX,
      generation: u32::MAX,
    }
  }
}

impl fmt::Display for NodeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "node {}v{}", self.index, self.generation)
  }
}

/// One arena slot; the generation survives the node so stale handles can
/// be told apart from reuse
#[derive(Debug)]
struct Slot {
  generation: u32,
  node: Option<Node>,
}

/// The tree of positioned, sized nodes
///
/// Single-threaded by contract: rectangle caches use interior mutability,
/// so the tree is not `Sync` and concurrent use requires an external lock,
/// consistent with a single-UI-thread execution model.
///
/// # Examples
///
/// ```
/// use uitree::{NodeTree, Rect, Size, UDim, USize, UVector2};
///
/// let mut tree = NodeTree::new(Size::new(800.0, 600.0));
///
/// // a root filling the display
/// let root = tree.create_node();
/// tree.set_size(root, USize::new(UDim::relative(1.0), UDim::relative(1.0))).unwrap();
///
/// // a child half the root's width and 100 pixels tall
/// let child = tree.create_node();
/// tree.add_child(root, child).unwrap();
/// tree.set_area(
///     child,
///     UVector2::ZERO,
///     USize::new(UDim::relative(0.5), UDim::absolute(100.0)),
/// ).unwrap();
///
/// assert_eq!(
///     tree.unclipped_outer_rect(child).unwrap(),
///     Rect::from_xywh(0.0, 0.0, 400.0, 100.0),
/// );
/// ```
pub struct NodeTree {
  slots: Vec<Slot>,
  free_list: Vec<u32>,
  root_container_size: Size,
  events: EventRegistry,
}

impl NodeTree {
  /// Creates an empty tree
  ///
  /// `root_container_size` (typically the display size) is the base extent
  /// parentless nodes resolve against, and the resolution base for
  /// min/max sizes.
  pub fn new(root_container_size: Size) -> Self {
    Self {
      slots: Vec::new(),
      free_list: Vec::new(),
      root_container_size,
      events: EventRegistry::new(),
    }
  }

  /// The base extent for parentless nodes and min/max resolution
  pub fn root_container_size(&self) -> Size {
    self.root_container_size
  }

  /// Changes the root container size
  ///
  /// Stores only; follow with
  /// [`notify_screen_area_changed`](Self::notify_screen_area_changed) on
  /// each root so dependent caches are invalidated, mirroring how an outer
  /// windowing layer reacts to a display resize.
  pub fn set_root_container_size(&mut self, size: Size) {
    self.root_container_size = size;
  }

  // ---------------------------------------------------------------------
  // Arena
  // ---------------------------------------------------------------------

  /// Creates a standalone node with default geometry and policy
  ///
  /// The node is a root until attached with [`add_child`](Self::add_child).
  pub fn create_node(&mut self) -> NodeId {
    self.create_node_with_policy(Box::new(DefaultPolicy))
  }

  /// Creates a standalone node with a custom derivation policy
  pub fn create_node_with_policy(&mut self, policy: Box<dyn NodePolicy>) -> NodeId {
    let node = Node::new(policy);
    match self.free_list.pop() {
      Some(index) => {
        let slot = &mut self.slots[index as usize];
        slot.node = Some(node);
        NodeId {
          index,
          generation: slot.generation,
        }
      }
      None => {
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
          generation: 0,
          node: Some(node),
        });
        NodeId {
          index,
          generation: 0,
        }
      }
    }
  }

  /// Destroys a node and, recursively, every node it owns
  ///
  /// Detaches from the parent first (firing `ChildRemoved`), then frees
  /// the subtree children-first. All handles into the subtree become
  /// stale.
  pub fn destroy_node(&mut self, id: NodeId) -> Result<()> {
    if let Some(parent) = self.node(id)?.parent {
      self.remove_child(parent, id)?;
    }
    self.destroy_subtree(id)
  }

  fn destroy_subtree(&mut self, id: NodeId) -> Result<()> {
    let children = self.node(id)?.children.clone();
    for child in children {
      self.destroy_subtree(child)?;
    }
    let slot = &mut self.slots[id.index as usize];
    slot.node = None;
    slot.generation = slot.generation.wrapping_add(1);
    self.free_list.push(id.index);
    debug!(node = %id, "destroyed node");
    Ok(())
  }

  /// Number of live nodes in the arena
  pub fn len(&self) -> usize {
    self.slots.iter().filter(|slot| slot.node.is_some()).count()
  }

  /// Returns true if the arena holds no live nodes
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn node(&self, id: NodeId) -> Result<&Node> {
    self
      .slots
      .get(id.index as usize)
      .filter(|slot| slot.generation == id.generation)
      .and_then(|slot| slot.node.as_ref())
      .ok_or(Error::StaleNode { node: id })
  }

  fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
    self
      .slots
      .get_mut(id.index as usize)
      .filter(|slot| slot.generation == id.generation)
      .and_then(|slot| slot.node.as_mut())
      .ok_or(Error::StaleNode { node: id })
  }

  // ---------------------------------------------------------------------
  // Tree structure
  // ---------------------------------------------------------------------

  /// Attaches `child` to `parent`, at the back of the child list
  ///
  /// Z-order follows the child list, so the new child paints on top of its
  /// siblings. A child attached elsewhere is detached from its previous
  /// parent first (firing `ChildRemoved` there); from the outside,
  /// ownership transfers in one step. Fires `ChildAdded` with the child.
  ///
  /// Fails with [`Error::CyclicAttachment`] when the two nodes are
  /// identical or already in an ancestor/descendant relationship in either
  /// direction, leaving both untouched.
  pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
    self.node(parent)?;
    self.node(child)?;
    if parent == child || self.is_ancestor(parent, child)? || self.is_ancestor(child, parent)? {
      return Err(Error::CyclicAttachment { parent, child });
    }

    if let Some(previous) = self.node(child)?.parent {
      self.remove_child(previous, child)?;
    }

    self.node_mut(parent)?.children.push(child);
    self.node_mut(child)?.parent = Some(parent);
    debug!(parent = %parent, child = %child, "attached child");

    self.notify_screen_area_changed(child, true)?;
    self.fire(EventKind::ChildAdded, child);
    Ok(())
  }

  /// Detaches `child` from `parent`
  ///
  /// The removed node becomes a valid standalone root; remaining siblings
  /// keep their order. Fires `ChildRemoved` with the child. Fails with
  /// [`Error::NotAChild`] when the node is not currently attached there.
  pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
    let position = self
      .node(parent)?
      .children
      .iter()
      .position(|&candidate| candidate == child)
      .ok_or(Error::NotAChild { parent, child })?;

    self.node_mut(parent)?.children.remove(position);
    self.node_mut(child)?.parent = None;
    debug!(parent = %parent, child = %child, "detached child");

    // detached nodes resolve against the root container from now on
    self.notify_screen_area_changed(child, true)?;
    self.fire(EventKind::ChildRemoved, child);
    Ok(())
  }

  /// The node's parent, or `None` for a root
  pub fn parent_node(&self, id: NodeId) -> Result<Option<NodeId>> {
    Ok(self.node(id)?.parent)
  }

  /// The node's children in z-order (back of slice paints last)
  pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
    Ok(&self.node(id)?.children)
  }

  /// Number of children attached to the node
  pub fn child_count(&self, id: NodeId) -> Result<usize> {
    Ok(self.node(id)?.children.len())
  }

  /// The child at the given z-order index
  pub fn child_at(&self, id: NodeId, index: usize) -> Result<NodeId> {
    let children = &self.node(id)?.children;
    children
      .get(index)
      .copied()
      .ok_or(Error::IndexOutOfBounds {
        parent: id,
        index,
        len: children.len(),
      })
  }

  /// Whether `candidate` is a direct child of `parent`
  pub fn is_child(&self, parent: NodeId, candidate: NodeId) -> Result<bool> {
    Ok(self.node(parent)?.children.contains(&candidate))
  }

  /// Whether `candidate` is an ancestor (parent, grandparent, …) of `id`
  pub fn is_ancestor(&self, id: NodeId, candidate: NodeId) -> Result<bool> {
    let mut current = self.node(id)?.parent;
    while let Some(ancestor) = current {
      if ancestor == candidate {
        return Ok(true);
      }
      current = self.node(ancestor)?.parent;
    }
    Ok(false)
  }

  // ---------------------------------------------------------------------
  // Events
  // ---------------------------------------------------------------------

  /// Registers a handler for one event kind
  ///
  /// Delivery is synchronous and in registration order; see
  /// [`events`](crate::events) for the full contract.
  pub fn subscribe(
    &mut self,
    kind: EventKind,
    handler: impl FnMut(&NodeEvent) + 'static,
  ) -> SubscriptionId {
    self.events.subscribe(kind, handler)
  }

  /// Removes a subscription, returning whether it existed
  pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
    self.events.unsubscribe(id)
  }

  fn fire(&mut self, kind: EventKind, node: NodeId) {
    self.events.fire(&NodeEvent { kind, node });
  }

  // ---------------------------------------------------------------------
  // Geometry accessors
  // ---------------------------------------------------------------------

  /// The declared area in unified dimensions, parent-relative
  pub fn area(&self, id: NodeId) -> Result<URect> {
    Ok(self.node(id)?.area)
  }

  /// The declared position (top-left corner of the area)
  pub fn position(&self, id: NodeId) -> Result<UVector2> {
    Ok(self.node(id)?.area.position())
  }

  /// The declared x position
  pub fn x_position(&self, id: NodeId) -> Result<UDim> {
    Ok(self.node(id)?.area.position().x)
  }

  /// The declared y position
  pub fn y_position(&self, id: NodeId) -> Result<UDim> {
    Ok(self.node(id)?.area.position().y)
  }

  /// The declared size
  pub fn size(&self, id: NodeId) -> Result<USize> {
    Ok(self.node(id)?.area.size())
  }

  /// The declared width
  pub fn width(&self, id: NodeId) -> Result<UDim> {
    Ok(self.node(id)?.area.size().width)
  }

  /// The declared height
  pub fn height(&self, id: NodeId) -> Result<UDim> {
    Ok(self.node(id)?.area.size().height)
  }

  /// The declared minimum size
  pub fn min_size(&self, id: NodeId) -> Result<USize> {
    Ok(self.node(id)?.min_size)
  }

  /// The declared maximum size; a zero component disables that axis
  pub fn max_size(&self, id: NodeId) -> Result<USize> {
    Ok(self.node(id)?.max_size)
  }

  /// The aspect-ratio enforcement mode
  pub fn aspect_mode(&self, id: NodeId) -> Result<AspectMode> {
    Ok(self.node(id)?.aspect_mode)
  }

  /// The target aspect ratio
  pub fn aspect_ratio(&self, id: NodeId) -> Result<f32> {
    Ok(self.node(id)?.aspect_ratio)
  }

  /// Whether resolved rectangles are rounded to pixel boundaries
  pub fn is_pixel_aligned(&self, id: NodeId) -> Result<bool> {
    Ok(self.node(id)?.pixel_aligned)
  }

  /// Whether the node resolves against the parent's outer area
  pub fn is_non_client(&self, id: NodeId) -> Result<bool> {
    Ok(self.node(id)?.non_client)
  }

  /// The stored rotation
  pub fn rotation(&self, id: NodeId) -> Result<Quaternion> {
    Ok(self.node(id)?.rotation)
  }

  /// The horizontal alignment
  pub fn horizontal_alignment(&self, id: NodeId) -> Result<HorizontalAlignment> {
    Ok(self.node(id)?.horizontal_alignment)
  }

  /// The vertical alignment
  pub fn vertical_alignment(&self, id: NodeId) -> Result<VerticalAlignment> {
    Ok(self.node(id)?.vertical_alignment)
  }

  /// The last resolved pixel size
  ///
  /// Refreshed whenever the outer rect cache regenerates and on every area
  /// change; reading a rect first guarantees freshness.
  pub fn pixel_size(&self, id: NodeId) -> Result<Size> {
    Ok(self.node(id)?.pixel_size.get())
  }

  // ---------------------------------------------------------------------
  // Geometry mutation
  // ---------------------------------------------------------------------

  /// Sets the node's declared area
  ///
  /// The single authoritative geometry entry point: the size is clamped to
  /// the declared min/max in exact unit math, the pixel size recomputed,
  /// caches invalidated, children notified, and `Moved`/`Sized` fired
  /// independently when the position or resolved size actually changed.
  pub fn set_area(&mut self, id: NodeId, position: UVector2, size: USize) -> Result<()> {
    self.set_area_raw(id, position, size, false, true)
  }

  /// Sets the declared area from a rectangle
  pub fn set_area_rect(&mut self, id: NodeId, area: URect) -> Result<()> {
    self.set_area(id, area.position(), area.size())
  }

  /// Sets the declared position, preserving the size
  pub fn set_position(&mut self, id: NodeId, position: UVector2) -> Result<()> {
    let size = self.node(id)?.area.size();
    self.set_area_raw(id, position, size, false, true)
  }

  /// Sets the declared x position
  pub fn set_x_position(&mut self, id: NodeId, x: UDim) -> Result<()> {
    let y = self.node(id)?.area.position().y;
    self.set_position(id, UVector2::new(x, y))
  }

  /// Sets the declared y position
  pub fn set_y_position(&mut self, id: NodeId, y: UDim) -> Result<()> {
    let x = self.node(id)?.area.position().x;
    self.set_position(id, UVector2::new(x, y))
  }

  /// Sets the declared size, preserving the position
  pub fn set_size(&mut self, id: NodeId, size: USize) -> Result<()> {
    let position = self.node(id)?.area.position();
    self.set_area(id, position, size)
  }

  /// Sets the declared width
  pub fn set_width(&mut self, id: NodeId, width: UDim) -> Result<()> {
    let height = self.node(id)?.area.size().height;
    self.set_size(id, USize::new(width, height))
  }

  /// Sets the declared height
  pub fn set_height(&mut self, id: NodeId, height: UDim) -> Result<()> {
    let width = self.node(id)?.area.size().width;
    self.set_size(id, USize::new(width, height))
  }

  /// Low-level area mutation with full control over sizing semantics
  ///
  /// `top_left_sizing` marks a resize anchored at the top/left edges (a
  /// drag on those handles): when the size is pinned at a limit the
  /// position must not drift, so it only updates when the resolved size
  /// actually changed. `fire_events=false` suppresses `Moved`/`Sized` for
  /// callers that already emitted a more specific notification.
  pub fn set_area_raw(
    &mut self,
    id: NodeId,
    position: UVector2,
    size: USize,
    top_left_sizing: bool,
    fire_events: bool,
  ) -> Result<()> {
    // screen rects will be stale regardless of what changes below
    self.node(id)?.invalidate_rects();

    let old_pixel_size = self.node(id)?.pixel_size.get();

    let base = self.parent_content_size(id, false)?;
    let root = self.root_container_size;
    let (min_size, max_size) = {
      let node = self.node(id)?;
      (node.min_size, node.max_size)
    };

    // clamp in unit math so the stored area resolves to the clamped
    // pixel extent; max is applied last and wins over a conflicting min
    let mut new_size = size;
    constrain_to_min_size(base, root, min_size, &mut new_size);
    constrain_to_max_size(base, root, max_size, &mut new_size);

    self.node_mut(id)?.area.set_size(new_size);

    let pixel_size = self.calculate_pixel_size(id, false)?;
    self.node(id)?.pixel_size.set(pixel_size);
    let sized = pixel_size != old_pixel_size;

    let mut moved = false;
    if (!top_left_sizing || sized) && position != self.node(id)?.area.position() {
      self.node_mut(id)?.area.set_position(position);
      moved = true;
    }

    if fire_events {
      if moved {
        self.on_moved(id)?;
      }
      if sized {
        self.on_sized(id)?;
      }
    }
    Ok(())
  }

  /// Sets the minimum size and re-applies the current area
  ///
  /// Fires `Sized` if the new constraint changes the resolved size.
  pub fn set_min_size(&mut self, id: NodeId, size: USize) -> Result<()> {
    self.node_mut(id)?.min_size = size;
    let area = self.node(id)?.area;
    self.set_area_rect(id, area)
  }

  /// Sets the maximum size and re-applies the current area
  ///
  /// A zero component disables that axis. Fires `Sized` if the new
  /// constraint changes the resolved size.
  pub fn set_max_size(&mut self, id: NodeId, size: USize) -> Result<()> {
    self.node_mut(id)?.max_size = size;
    let area = self.node(id)?.area;
    self.set_area_rect(id, area)
  }

  /// Sets the aspect mode and re-applies the current area
  pub fn set_aspect_mode(&mut self, id: NodeId, mode: AspectMode) -> Result<()> {
    self.node_mut(id)?.aspect_mode = mode;
    let area = self.node(id)?.area;
    self.set_area_rect(id, area)
  }

  /// Sets the target aspect ratio and re-applies the current area
  ///
  /// Ignored while the aspect mode is [`AspectMode::Ignore`].
  pub fn set_aspect_ratio(&mut self, id: NodeId, ratio: f32) -> Result<()> {
    self.node_mut(id)?.aspect_ratio = ratio;
    let area = self.node(id)?.area;
    self.set_area_rect(id, area)
  }

  /// Enables or disables pixel alignment and re-applies the current area
  pub fn set_pixel_aligned(&mut self, id: NodeId, setting: bool) -> Result<()> {
    self.node_mut(id)?.pixel_aligned = setting;
    let area = self.node(id)?.area;
    self.set_area_rect(id, area)
  }

  /// Changes how the declared x position is anchored
  ///
  /// The stored area is untouched; only its resolved meaning changes.
  /// Fires `HorizontalAlignmentChanged` when the value actually changed.
  pub fn set_horizontal_alignment(
    &mut self,
    id: NodeId,
    alignment: HorizontalAlignment,
  ) -> Result<()> {
    if self.node(id)?.horizontal_alignment == alignment {
      return Ok(());
    }
    self.node_mut(id)?.horizontal_alignment = alignment;
    self.notify_screen_area_changed(id, true)?;
    self.fire(EventKind::HorizontalAlignmentChanged, id);
    Ok(())
  }

  /// Changes how the declared y position is anchored
  ///
  /// Fires `VerticalAlignmentChanged` when the value actually changed.
  pub fn set_vertical_alignment(&mut self, id: NodeId, alignment: VerticalAlignment) -> Result<()> {
    if self.node(id)?.vertical_alignment == alignment {
      return Ok(());
    }
    self.node_mut(id)?.vertical_alignment = alignment;
    self.notify_screen_area_changed(id, true)?;
    self.fire(EventKind::VerticalAlignmentChanged, id);
    Ok(())
  }

  /// Selects the parent area the node resolves against
  ///
  /// Non-client nodes use the parent's outer (full) area, client nodes the
  /// inner (content) area. Fires `NonClientChanged` when the value
  /// actually changed.
  pub fn set_non_client(&mut self, id: NodeId, setting: bool) -> Result<()> {
    if self.node(id)?.non_client == setting {
      return Ok(());
    }
    self.node_mut(id)?.non_client = setting;
    self.notify_screen_area_changed(id, true)?;
    self.fire(EventKind::NonClientChanged, id);
    Ok(())
  }

  /// Stores a new rotation and fires `Rotated`
  ///
  /// Rotation is pass-through state; it does not affect rect derivation.
  pub fn set_rotation(&mut self, id: NodeId, rotation: Quaternion) -> Result<()> {
    self.node_mut(id)?.rotation = rotation;
    self.fire(EventKind::Rotated, id);
    Ok(())
  }

  // ---------------------------------------------------------------------
  // Internal event flows
  // ---------------------------------------------------------------------

  fn on_moved(&mut self, id: NodeId) -> Result<()> {
    self.notify_screen_area_changed(id, true)?;
    self.fire(EventKind::Moved, id);
    Ok(())
  }

  fn on_sized(&mut self, id: NodeId) -> Result<()> {
    self.notify_screen_area_changed(id, false)?;
    let children = self.node(id)?.children.clone();
    for child in children {
      self.on_parent_sized(child)?;
    }
    self.fire(EventKind::Sized, id);
    Ok(())
  }

  /// Reacts to a parent resize: invalidate, re-resolve, and re-fire the
  /// node's own `Moved`/`Sized` when its screen geometry actually changed
  fn on_parent_sized(&mut self, id: NodeId) -> Result<()> {
    self.node(id)?.invalidate_rects();

    let old_pixel_size = self.node(id)?.pixel_size.get();
    let new_pixel_size = self.calculate_pixel_size(id, false)?;
    self.node(id)?.pixel_size.set(new_pixel_size);

    // a relative position or non-default anchor shifts with the parent
    let moved = {
      let node = self.node(id)?;
      node.area.position().x.scale != 0.0
        || node.area.position().y.scale != 0.0
        || node.horizontal_alignment != HorizontalAlignment::Left
        || node.vertical_alignment != VerticalAlignment::Top
    };
    let sized = new_pixel_size != old_pixel_size || self.inner_rect_size_changed(id)?;

    if moved {
      self.on_moved(id)?;
    }
    if sized {
      self.on_sized(id)?;
    }

    self.fire(EventKind::ParentSized, id);
    Ok(())
  }

  /// Whether regenerating the inner rect changes its size
  fn inner_rect_size_changed(&self, id: NodeId) -> Result<bool> {
    let node = self.node(id)?;
    let old_size = node.inner_rect.get(self, id)?.size;
    node.inner_rect.invalidate();
    Ok(old_size != node.inner_rect.get(self, id)?.size)
  }

  // ---------------------------------------------------------------------
  // Rect derivation
  // ---------------------------------------------------------------------

  /// The node's full occupied screen rectangle, cached
  pub fn unclipped_outer_rect(&self, id: NodeId) -> Result<Rect> {
    let node = self.node(id)?;
    node.outer_rect.get(self, id)
  }

  /// The outer rectangle, freshly generated
  ///
  /// With `skip_pixel_alignment` the unrounded ideal geometry is computed
  /// without touching the cache; see
  /// [`CachedRect::get_fresh`](crate::tree::CachedRect::get_fresh).
  pub fn unclipped_outer_rect_fresh(&self, id: NodeId, skip_pixel_alignment: bool) -> Result<Rect> {
    let node = self.node(id)?;
    node.outer_rect.get_fresh(self, id, skip_pixel_alignment)
  }

  /// The node's content-bearing screen rectangle, cached
  ///
  /// Identical to the outer rect for plain nodes; policies carve out
  /// insets for framed widgets.
  pub fn unclipped_inner_rect(&self, id: NodeId) -> Result<Rect> {
    let node = self.node(id)?;
    node.inner_rect.get(self, id)
  }

  /// The inner rectangle, freshly generated
  pub fn unclipped_inner_rect_fresh(&self, id: NodeId, skip_pixel_alignment: bool) -> Result<Rect> {
    let node = self.node(id)?;
    node.inner_rect.get_fresh(self, id, skip_pixel_alignment)
  }

  /// The inner or outer rectangle, selected by flag
  pub fn unclipped_rect(&self, id: NodeId, inner: bool) -> Result<Rect> {
    if inner {
      self.unclipped_inner_rect(id)
    } else {
      self.unclipped_outer_rect(id)
    }
  }

  /// Direct access to the outer rect cache
  pub fn outer_rect_cache(&self, id: NodeId) -> Result<&CachedRect> {
    Ok(&self.node(id)?.outer_rect)
  }

  /// Direct access to the inner rect cache
  pub fn inner_rect_cache(&self, id: NodeId) -> Result<&CachedRect> {
    Ok(&self.node(id)?.inner_rect)
  }

  /// The area children of this node resolve their geometry against
  ///
  /// Client children use the policy's client content area (the inner rect
  /// by default), non-client children the non-client content area (the
  /// outer rect by default).
  pub fn child_content_area(&self, id: NodeId, non_client: bool) -> Result<Rect> {
    self.child_content_area_fresh(id, non_client, false)
  }

  fn child_content_area_fresh(
    &self,
    id: NodeId,
    non_client: bool,
    skip_pixel_alignment: bool,
  ) -> Result<Rect> {
    let node = self.node(id)?;
    if non_client {
      node
        .policy
        .non_client_child_content_area(self, id, skip_pixel_alignment)
    } else {
      node
        .policy
        .client_child_content_area(self, id, skip_pixel_alignment)
    }
  }

  /// Dispatches a cache's generator; called by [`CachedRect`]
  pub(crate) fn generate_rect(
    &self,
    id: NodeId,
    kind: RectKind,
    skip_pixel_alignment: bool,
  ) -> Result<Rect> {
    match kind {
      RectKind::Outer => self.outer_rect_impl(id, skip_pixel_alignment),
      RectKind::Inner => {
        let node = self.node(id)?;
        node.policy.inner_rect(self, id, skip_pixel_alignment)
      }
    }
  }

  /// Default outer rect generator
  ///
  /// Resolves the declared area against the parent content area (or the
  /// root container for roots), applies the alignment anchor, and rounds
  /// the final screen offset when pixel-aligned. The result is
  /// screen-absolute because the parent content rect already is.
  fn outer_rect_impl(&self, id: NodeId, skip_pixel_alignment: bool) -> Result<Rect> {
    let pixel_size = self.calculate_pixel_size(id, skip_pixel_alignment)?;
    if !skip_pixel_alignment {
      self.node(id)?.pixel_size.set(pixel_size);
    }

    let (parent, non_client, pixel_aligned, position, horizontal, vertical) = {
      let node = self.node(id)?;
      (
        node.parent,
        node.non_client,
        node.pixel_aligned,
        node.area.position(),
        node.horizontal_alignment,
        node.vertical_alignment,
      )
    };

    let parent_rect = match parent {
      Some(parent_id) => self.child_content_area_fresh(parent_id, non_client, skip_pixel_alignment)?,
      None => Rect::new(Point::ZERO, self.root_container_size),
    };
    let parent_size = parent_rect.size;

    let resolved = position.resolve(parent_size);
    let mut origin = Point::new(
      parent_rect.origin.x
        + resolved.x
        + horizontal.offset_for(parent_size.width, pixel_size.width),
      parent_rect.origin.y + resolved.y + vertical.offset_for(parent_size.height, pixel_size.height),
    );

    if pixel_aligned && !skip_pixel_alignment {
      origin.x = align_to_pixels(origin.x);
      origin.y = align_to_pixels(origin.y);
    }

    Ok(Rect::new(origin, pixel_size))
  }

  /// Resolves the node's pixel size without touching the rect caches
  ///
  /// The full constraint pipeline: resolve the declared size against the
  /// parent content extent, clamp to min/max (resolved against the root
  /// container size), enforce the aspect ratio, round when pixel-aligned.
  pub fn calculate_pixel_size(&self, id: NodeId, skip_pixel_alignment: bool) -> Result<Size> {
    let (min_size, max_size, area_size, aspect_mode, aspect_ratio, pixel_aligned) = {
      let node = self.node(id)?;
      (
        node.min_size,
        node.max_size,
        node.area.size(),
        node.aspect_mode,
        node.aspect_ratio,
        node.pixel_aligned,
      )
    };

    let (min, max) = resolved_size_limits(min_size, max_size, self.root_container_size);
    let base = self.parent_content_size(id, skip_pixel_alignment)?;

    let mut size = area_size.resolve(base);
    size = clamp_size(size, min, max);
    size = scale_to_aspect(size, aspect_mode, aspect_ratio);

    if pixel_aligned && !skip_pixel_alignment {
      size.width = align_to_pixels(size.width);
      size.height = align_to_pixels(size.height);
    }
    Ok(size)
  }

  /// The pixel size of the parent, or the root container size for roots
  pub fn parent_pixel_size(&self, id: NodeId, skip_pixel_alignment: bool) -> Result<Size> {
    let parent = self.node(id)?.parent;
    match parent {
      Some(parent_id) => {
        if skip_pixel_alignment {
          self.calculate_pixel_size(parent_id, true)
        } else {
          Ok(self.node(parent_id)?.pixel_size.get())
        }
      }
      None => Ok(self.root_container_size),
    }
  }

  /// The extent this node's declared geometry resolves against
  fn parent_content_size(&self, id: NodeId, skip_pixel_alignment: bool) -> Result<Size> {
    let (parent, non_client) = {
      let node = self.node(id)?;
      (node.parent, node.non_client)
    };
    match parent {
      Some(parent_id) => Ok(
        self
          .child_content_area_fresh(parent_id, non_client, skip_pixel_alignment)?
          .size,
      ),
      None => Ok(self.root_container_size),
    }
  }

  /// Invalidates the node's cached rects, optionally over the whole
  /// subtree
  ///
  /// The hook an outer layer calls when the screen-space base of a root
  /// changed (display resize); normal geometry and tree mutations call it
  /// internally. Recomputation happens lazily on the next rect read.
  pub fn notify_screen_area_changed(&self, id: NodeId, recursive: bool) -> Result<()> {
    trace!(node = %id, recursive, "invalidating cached screen rects");
    let node = self.node(id)?;
    node.invalidate_rects();
    if recursive {
      for &child in &node.children {
        self.notify_screen_area_changed(child, true)?;
      }
    }
    Ok(())
  }
}

impl fmt::Debug for NodeTree {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("NodeTree")
      .field("nodes", &self.len())
      .field("root_container_size", &self.root_container_size)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tree() -> NodeTree {
    NodeTree::new(Size::new(800.0, 600.0))
  }

  fn full_size() -> USize {
    USize::new(UDim::relative(1.0), UDim::relative(1.0))
  }

  #[test]
  fn test_new_node_defaults() {
    let mut tree = tree();
    let id = tree.create_node();

    assert_eq!(tree.area(id).unwrap(), URect::ZERO);
    assert_eq!(
      tree.horizontal_alignment(id).unwrap(),
      HorizontalAlignment::Left
    );
    assert_eq!(tree.vertical_alignment(id).unwrap(), VerticalAlignment::Top);
    assert_eq!(tree.aspect_mode(id).unwrap(), AspectMode::Ignore);
    assert!(tree.is_pixel_aligned(id).unwrap());
    assert!(!tree.is_non_client(id).unwrap());
    assert_eq!(tree.parent_node(id).unwrap(), None);
    assert_eq!(tree.child_count(id).unwrap(), 0);
    assert_eq!(tree.rotation(id).unwrap(), Quaternion::IDENTITY);
  }

  #[test]
  fn test_parentless_node_resolves_against_root_container() {
    let mut tree = tree();
    let id = tree.create_node();
    tree
      .set_size(id, USize::new(UDim::relative(0.5), UDim::absolute(120.0)))
      .unwrap();

    assert_eq!(
      tree.unclipped_outer_rect(id).unwrap(),
      Rect::from_xywh(0.0, 0.0, 400.0, 120.0)
    );
    assert_eq!(tree.pixel_size(id).unwrap(), Size::new(400.0, 120.0));
  }

  #[test]
  fn test_child_resolves_against_parent_content_area() {
    let mut tree = tree();
    let root = tree.create_node();
    tree.set_size(root, full_size()).unwrap();
    let child = tree.create_node();
    tree.add_child(root, child).unwrap();
    tree
      .set_area(
        child,
        UVector2::new(UDim::absolute(10.0), UDim::relative(0.5)),
        USize::new(UDim::relative(0.25), UDim::absolute(40.0)),
      )
      .unwrap();

    assert_eq!(
      tree.unclipped_outer_rect(child).unwrap(),
      Rect::from_xywh(10.0, 300.0, 200.0, 40.0)
    );
  }

  #[test]
  fn test_cached_read_is_stable_until_invalidated() {
    let mut tree = tree();
    let id = tree.create_node();
    tree
      .set_size(id, USize::new(UDim::absolute(100.0), UDim::absolute(50.0)))
      .unwrap();

    let first = tree.unclipped_outer_rect(id).unwrap();
    assert!(tree.outer_rect_cache(id).unwrap().is_valid());
    let second = tree.unclipped_outer_rect(id).unwrap();
    assert_eq!(first, second);

    tree
      .set_position(id, UVector2::new(UDim::absolute(5.0), UDim::ZERO))
      .unwrap();
    assert!(!tree.outer_rect_cache(id).unwrap().is_valid());
    assert_eq!(
      tree.unclipped_outer_rect(id).unwrap(),
      Rect::from_xywh(5.0, 0.0, 100.0, 50.0)
    );
  }

  #[test]
  fn test_get_fresh_skip_does_not_pollute_cache() {
    let mut tree = tree();
    let id = tree.create_node();
    tree.set_pixel_aligned(id, true).unwrap();
    tree
      .set_area(
        id,
        UVector2::new(UDim::absolute(10.3), UDim::ZERO),
        USize::new(UDim::absolute(100.6), UDim::absolute(50.0)),
      )
      .unwrap();

    let ideal = tree.unclipped_outer_rect_fresh(id, true).unwrap();
    assert_eq!(ideal.x(), 10.3);
    assert_eq!(ideal.width(), 100.6);
    // the probe must not have validated the cache with unrounded data
    let cached = tree.unclipped_outer_rect(id).unwrap();
    assert_eq!(cached, Rect::from_xywh(10.0, 0.0, 101.0, 50.0));
  }

  #[test]
  fn test_pixel_alignment_rounds_resolved_rect() {
    let mut tree = tree();
    let id = tree.create_node();
    tree
      .set_area(
        id,
        UVector2::new(UDim::absolute(0.5), UDim::absolute(1.4)),
        USize::new(UDim::absolute(99.5), UDim::absolute(49.4)),
      )
      .unwrap();

    assert_eq!(
      tree.unclipped_outer_rect(id).unwrap(),
      Rect::from_xywh(1.0, 1.0, 100.0, 49.0)
    );

    tree.set_pixel_aligned(id, false).unwrap();
    assert_eq!(
      tree.unclipped_outer_rect(id).unwrap(),
      Rect::from_xywh(0.5, 1.4, 99.5, 49.4)
    );
  }

  #[test]
  fn test_add_child_rejects_related_nodes() {
    let mut tree = tree();
    let a = tree.create_node();
    let b = tree.create_node();
    let c = tree.create_node();
    tree.add_child(a, b).unwrap();
    tree.add_child(b, c).unwrap();

    assert!(matches!(
      tree.add_child(a, a),
      Err(Error::CyclicAttachment { .. })
    ));
    assert!(matches!(
      tree.add_child(c, a),
      Err(Error::CyclicAttachment { .. })
    ));
    assert!(matches!(
      tree.add_child(a, c),
      Err(Error::CyclicAttachment { .. })
    ));
    // structure is untouched
    assert_eq!(tree.parent_node(c).unwrap(), Some(b));
    assert_eq!(tree.children(a).unwrap(), &[b]);
  }

  #[test]
  fn test_stale_handle_after_destroy() {
    let mut tree = tree();
    let root = tree.create_node();
    let child = tree.create_node();
    tree.add_child(root, child).unwrap();

    tree.destroy_node(root).unwrap();
    assert!(matches!(
      tree.area(root),
      Err(Error::StaleNode { .. })
    ));
    assert!(matches!(
      tree.area(child),
      Err(Error::StaleNode { .. })
    ));

    // slot reuse must not resurrect the old handle
    let replacement = tree.create_node();
    assert_ne!(replacement, root);
    assert!(tree.area(replacement).is_ok());
    assert!(tree.area(root).is_err());
  }

  #[test]
  fn test_child_at_bounds_checked() {
    let mut tree = tree();
    let root = tree.create_node();
    let child = tree.create_node();
    tree.add_child(root, child).unwrap();

    assert_eq!(tree.child_at(root, 0).unwrap(), child);
    assert!(matches!(
      tree.child_at(root, 1),
      Err(Error::IndexOutOfBounds { len: 1, index: 1, .. })
    ));
  }

  #[test]
  fn test_non_client_resolves_against_outer_area() {
    #[derive(Debug)]
    struct Framed;
    impl NodePolicy for Framed {
      fn inner_rect(&self, tree: &NodeTree, node: NodeId, skip: bool) -> Result<Rect> {
        Ok(tree.unclipped_outer_rect_fresh(node, skip)?.inset(10.0))
      }
    }

    let mut tree = tree();
    let frame = tree.create_node_with_policy(Box::new(Framed));
    tree
      .set_size(frame, USize::new(UDim::absolute(200.0), UDim::absolute(100.0)))
      .unwrap();

    let client = tree.create_node();
    tree.add_child(frame, client).unwrap();
    tree.set_size(client, full_size()).unwrap();

    let non_client = tree.create_node();
    tree.add_child(frame, non_client).unwrap();
    tree.set_non_client(non_client, true).unwrap();
    tree.set_size(non_client, full_size()).unwrap();

    // client children fill the inset content area
    assert_eq!(
      tree.unclipped_outer_rect(client).unwrap(),
      Rect::from_xywh(10.0, 10.0, 180.0, 80.0)
    );
    // non-client children fill the full outer area
    assert_eq!(
      tree.unclipped_outer_rect(non_client).unwrap(),
      Rect::from_xywh(0.0, 0.0, 200.0, 100.0)
    );
  }

  #[test]
  fn test_y_position_returns_y_component() {
    let mut tree = tree();
    let id = tree.create_node();
    tree
      .set_position(id, UVector2::new(UDim::absolute(3.0), UDim::absolute(7.0)))
      .unwrap();

    assert_eq!(tree.x_position(id).unwrap(), UDim::absolute(3.0));
    assert_eq!(tree.y_position(id).unwrap(), UDim::absolute(7.0));
  }

  #[test]
  fn test_top_left_sizing_holds_position_at_limit() {
    let mut tree = tree();
    let id = tree.create_node();
    tree
      .set_min_size(id, USize::new(UDim::absolute(100.0), UDim::absolute(100.0)))
      .unwrap();
    tree
      .set_area(
        id,
        UVector2::new(UDim::absolute(50.0), UDim::absolute(50.0)),
        USize::new(UDim::absolute(100.0), UDim::absolute(100.0)),
      )
      .unwrap();

    // dragging the top-left handle past the minimum: size is pinned, so
    // the position must not move
    tree
      .set_area_raw(
        id,
        UVector2::new(UDim::absolute(80.0), UDim::absolute(80.0)),
        USize::new(UDim::absolute(70.0), UDim::absolute(70.0)),
        true,
        true,
      )
      .unwrap();
    assert_eq!(
      tree.position(id).unwrap(),
      UVector2::new(UDim::absolute(50.0), UDim::absolute(50.0))
    );
    assert_eq!(tree.pixel_size(id).unwrap(), Size::new(100.0, 100.0));

    // the same drag without the anchor flag moves freely
    tree
      .set_area_raw(
        id,
        UVector2::new(UDim::absolute(80.0), UDim::absolute(80.0)),
        USize::new(UDim::absolute(70.0), UDim::absolute(70.0)),
        false,
        true,
      )
      .unwrap();
    assert_eq!(
      tree.position(id).unwrap(),
      UVector2::new(UDim::absolute(80.0), UDim::absolute(80.0))
    );
  }
}
