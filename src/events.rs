//! Node event notification
//!
//! The tree publishes a structured notification whenever observable node
//! state changes: geometry, alignment, rotation, tree membership. Handlers
//! are registered per [`EventKind`] and invoked synchronously on the same
//! thread, in registration order, at the trigger point itself. A handler
//! receives only the event payload, never the tree, so dispatch cannot
//! re-enter a mutation in progress.
//!
//! Subscriptions are owned by the caller via the returned
//! [`SubscriptionId`] and removed with
//! [`NodeTree::unsubscribe`](crate::NodeTree::unsubscribe).

use crate::tree::NodeId;
use rustc_hash::FxHashMap;
use std::fmt;

/// The kinds of notification the tree fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
  /// The node's resolved pixel size changed
  Sized,
  /// The node's declared position changed
  Moved,
  /// The node's parent was resized (fired at the affected child)
  ParentSized,
  /// The node's horizontal alignment changed
  HorizontalAlignmentChanged,
  /// The node's vertical alignment changed
  VerticalAlignmentChanged,
  /// The node's rotation changed
  Rotated,
  /// The node was attached to a parent
  ChildAdded,
  /// The node was detached from its parent
  ChildRemoved,
  /// The node's non-client flag changed
  NonClientChanged,
}

/// Payload delivered to handlers: what happened, and to which node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeEvent {
  pub kind: EventKind,
  /// The affected node. For `ChildAdded`/`ChildRemoved` this is the child;
  /// for `ParentSized` it is the child whose parent resized.
  pub node: NodeId,
}

/// Handle identifying one subscription, for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&NodeEvent)>;

/// Registry of event handlers keyed by event kind
///
/// Owned by the tree; exposed for direct use when wiring a notification
/// sink without a tree (tests, adapters).
#[derive(Default)]
pub struct EventRegistry {
  handlers: FxHashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
  next_id: u64,
}

impl EventRegistry {
  /// Creates an empty registry
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers a handler for one event kind
  pub fn subscribe(
    &mut self,
    kind: EventKind,
    handler: impl FnMut(&NodeEvent) + 'static,
  ) -> SubscriptionId {
    let id = SubscriptionId(self.next_id);
    self.next_id += 1;
    self
      .handlers
      .entry(kind)
      .or_default()
      .push((id, Box::new(handler)));
    id
  }

  /// Removes a subscription, returning whether it existed
  pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
    for handlers in self.handlers.values_mut() {
      if let Some(index) = handlers.iter().position(|(handler_id, _)| *handler_id == id) {
        handlers.remove(index);
        return true;
      }
    }
    false
  }

  /// Delivers an event to every handler registered for its kind
  pub fn fire(&mut self, event: &NodeEvent) {
    if let Some(handlers) = self.handlers.get_mut(&event.kind) {
      for (_, handler) in handlers.iter_mut() {
        handler(event);
      }
    }
  }

  /// Number of live subscriptions across all kinds
  pub fn subscription_count(&self) -> usize {
    self.handlers.values().map(Vec::len).sum()
  }
}

impl fmt::Debug for EventRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("EventRegistry")
      .field("subscriptions", &self.subscription_count())
      .finish()
  }
}
