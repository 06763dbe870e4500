//! Lazily cached screen rectangles
//!
//! Deriving a node's screen rectangle walks ancestors and re-applies
//! constraint and alignment math, so the result is cached and the cache
//! invalidated whenever any state feeding the computation changes. The
//! protocol is push-invalidate / pull-recompute: mutations eagerly mark
//! caches stale down the tree, and the expensive recompute happens lazily
//! on the next read.
//!
//! The invariant the tree must uphold: whenever `valid` is true, the cached
//! value equals what the generator would produce for the current tree
//! state. Every mutation that feeds a generator therefore invalidates the
//! affected caches before returning.

use crate::error::Result;
use crate::geometry::Rect;
use crate::tree::node_tree::NodeId;
use crate::tree::node_tree::NodeTree;
use std::cell::Cell;

/// Which of a node's two rectangle generators a cache is bound to
///
/// The original design bound caches to per-instance generator callbacks;
/// here the generator is named by this tag and dispatched by the tree,
/// with per-node customization living in
/// [`NodePolicy`](crate::tree::NodePolicy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectKind {
  /// The node's full occupied screen rectangle
  Outer,
  /// The node's content-bearing sub-rectangle
  Inner,
}

/// A lazily evaluated, invalidatable rectangle cache
///
/// Interior mutability keeps reads `&self`: the tree is single-threaded by
/// contract, and a read that repopulates the cache is not an observable
/// mutation.
#[derive(Debug)]
pub struct CachedRect {
  kind: RectKind,
  cached: Cell<Rect>,
  valid: Cell<bool>,
}

impl CachedRect {
  /// Creates an invalid cache bound to the given generator
  ///
  /// No initial value is computed; the first read regenerates.
  pub fn new(kind: RectKind) -> Self {
    Self {
      kind,
      cached: Cell::new(Rect::ZERO),
      valid: Cell::new(false),
    }
  }

  /// Returns the cached rectangle, regenerating it first if stale
  pub fn get(&self, tree: &NodeTree, node: NodeId) -> Result<Rect> {
    if !self.valid.get() {
      self.regenerate(tree, node)?;
    }
    Ok(self.cached.get())
  }

  /// Returns a freshly generated rectangle, optionally skipping pixel
  /// alignment
  ///
  /// With the cache stale and alignment not skipped this is the same as
  /// [`get`](Self::get), taking the chance to repopulate the cache. In
  /// every other case the generator runs directly and the cache is left
  /// untouched. The skipping path answers "what would this rectangle be
  /// without pixel rounding" so a node can derive its aligned geometry
  /// from the unrounded ideal instead of compounding ancestor rounding.
  pub fn get_fresh(&self, tree: &NodeTree, node: NodeId, skip_pixel_alignment: bool) -> Result<Rect> {
    if !self.valid.get() && !skip_pixel_alignment {
      return self.get(tree, node);
    }
    tree.generate_rect(node, self.kind, skip_pixel_alignment)
  }

  /// Marks the cache stale; idempotent
  pub fn invalidate(&self) {
    self.valid.set(false);
  }

  /// Returns whether the cached value is current
  pub fn is_valid(&self) -> bool {
    self.valid.get()
  }

  /// Unconditionally regenerates and validates the cache
  ///
  /// Always invokes the generator with pixel alignment active, so the
  /// cached value reflects the node's configuration exactly.
  pub fn regenerate(&self, tree: &NodeTree, node: NodeId) -> Result<()> {
    let rect = tree.generate_rect(node, self.kind, false)?;
    self.cached.set(rect);
    self.valid.set(true);
    Ok(())
  }

  /// The generator this cache is bound to
  pub fn kind(&self) -> RectKind {
    self.kind
  }
}
