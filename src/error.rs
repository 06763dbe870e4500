//! Error types for uitree
//!
//! Every fallible operation on the node tree reports one of the variants
//! here. They all belong to a single "invalid request" class: the caller
//! asked for something the current tree state cannot satisfy, the call is
//! rejected before any mutation takes place, and the tree remains exactly
//! as it was. None of them indicate internal corruption.
//!
//! All errors use the `thiserror` crate for minimal boilerplate and
//! proper error trait implementations.

use crate::tree::NodeId;
use thiserror::Error;

/// Result type alias for uitree operations
///
/// # Examples
///
/// ```
/// use uitree::Result;
///
/// fn relayout() -> Result<()> {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all node tree operations
///
/// # Examples
///
/// ```
/// use uitree::{Error, NodeTree, Size};
///
/// let mut tree = NodeTree::new(Size::new(800.0, 600.0));
/// let a = tree.create_node();
/// let b = tree.create_node();
///
/// // b was never attached, so detaching it is an invalid request
/// assert!(matches!(
///     tree.remove_child(a, b),
///     Err(Error::NotAChild { .. })
/// ));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
  /// Attachment would create a cycle or re-link an already related pair
  ///
  /// Raised by `add_child` when the two nodes are identical or already in
  /// an ancestor/descendant relationship in either direction.
  #[error("cannot attach {child} to {parent}: nodes are already related")]
  CyclicAttachment { parent: NodeId, child: NodeId },

  /// The node is not currently a child of the given parent
  #[error("{child} is not a child of {parent}")]
  NotAChild { parent: NodeId, child: NodeId },

  /// The handle refers to a node that was destroyed (or never existed)
  #[error("{node} does not refer to a live node")]
  StaleNode { node: NodeId },

  /// A child index was past the end of the parent's child list
  #[error("child index {index} is out of range for {parent} with {len} children")]
  IndexOutOfBounds {
    parent: NodeId,
    index: usize,
    len: usize,
  },

  /// The named property does not exist on nodes
  #[error("unknown property '{name}'")]
  UnknownProperty { name: String },

  /// The property value string could not be parsed
  #[error("invalid value '{value}' for property '{name}'")]
  InvalidPropertyValue { name: String, value: String },
}
