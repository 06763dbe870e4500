//! End-to-end layout scenarios driving the public NodeTree surface

use std::cell::Cell;
use std::rc::Rc;

use uitree::{
  AspectMode, HorizontalAlignment, NodeId, NodePolicy, NodeTree, Rect, Result, Size, UDim, USize,
  UVector2, VerticalAlignment,
};

fn full_size() -> USize {
  USize::new(UDim::relative(1.0), UDim::relative(1.0))
}

#[test]
fn display_resize_propagates_through_notify_screen_area_changed() {
  let mut tree = NodeTree::new(Size::new(800.0, 600.0));
  let root = tree.create_node();
  tree.set_size(root, full_size()).unwrap();

  let child = tree.create_node();
  tree.add_child(root, child).unwrap();
  tree
    .set_area(
      child,
      UVector2::ZERO,
      USize::new(UDim::relative(0.5), UDim::absolute(100.0)),
    )
    .unwrap();

  assert_eq!(
    tree.unclipped_outer_rect(child).unwrap(),
    Rect::from_xywh(0.0, 0.0, 400.0, 100.0)
  );

  // the outer layer reacts to a display resize by notifying the root;
  // the child must re-resolve on its next read without explicit help
  tree.set_root_container_size(Size::new(400.0, 600.0));
  tree.notify_screen_area_changed(root, true).unwrap();

  assert_eq!(
    tree.unclipped_outer_rect(child).unwrap(),
    Rect::from_xywh(0.0, 0.0, 200.0, 100.0)
  );
}

#[test]
fn centre_alignment_offsets_from_parent_centre() {
  let mut tree = NodeTree::new(Size::new(800.0, 600.0));
  let parent = tree.create_node();
  tree
    .set_size(
      parent,
      USize::new(UDim::absolute(200.0), UDim::absolute(100.0)),
    )
    .unwrap();

  let child = tree.create_node();
  tree.add_child(parent, child).unwrap();
  tree
    .set_size(
      child,
      USize::new(UDim::absolute(50.0), UDim::absolute(20.0)),
    )
    .unwrap();
  tree
    .set_horizontal_alignment(child, HorizontalAlignment::Centre)
    .unwrap();

  // x origin is the parent's centre minus half the child's width, not 0
  let rect = tree.unclipped_outer_rect(child).unwrap();
  assert_eq!(rect.x(), 100.0 - 25.0);
  assert_eq!(rect.y(), 0.0);

  tree
    .set_vertical_alignment(child, VerticalAlignment::Bottom)
    .unwrap();
  assert_eq!(tree.unclipped_outer_rect(child).unwrap().y(), 80.0);
}

#[test]
fn right_alignment_interprets_position_from_far_edge() {
  let mut tree = NodeTree::new(Size::new(800.0, 600.0));
  let parent = tree.create_node();
  tree
    .set_size(
      parent,
      USize::new(UDim::absolute(200.0), UDim::absolute(100.0)),
    )
    .unwrap();

  let child = tree.create_node();
  tree.add_child(parent, child).unwrap();
  tree
    .set_area(
      child,
      UVector2::new(UDim::absolute(-10.0), UDim::ZERO),
      USize::new(UDim::absolute(50.0), UDim::absolute(20.0)),
    )
    .unwrap();
  tree
    .set_horizontal_alignment(child, HorizontalAlignment::Right)
    .unwrap();

  // declared offset shifts back from the right edge
  assert_eq!(tree.unclipped_outer_rect(child).unwrap().x(), 140.0);
}

#[test]
fn min_and_max_size_clamp_to_exact_pixel_bounds() {
  let mut tree = NodeTree::new(Size::new(800.0, 600.0));
  let node = tree.create_node();
  tree
    .set_min_size(
      node,
      USize::new(UDim::absolute(100.0), UDim::absolute(80.0)),
    )
    .unwrap();
  tree
    .set_max_size(
      node,
      USize::new(UDim::absolute(200.0), UDim::absolute(150.0)),
    )
    .unwrap();

  // below the minimum resolves to exactly the minimum
  tree
    .set_size(node, USize::new(UDim::absolute(50.0), UDim::absolute(40.0)))
    .unwrap();
  assert_eq!(tree.pixel_size(node).unwrap(), Size::new(100.0, 80.0));
  // and the stored unified size round-trips to the same pixels
  let stored = tree.size(node).unwrap().resolve(Size::new(800.0, 600.0));
  assert!((stored.width - 100.0).abs() < 1e-3);
  assert!((stored.height - 80.0).abs() < 1e-3);

  // above the maximum resolves to exactly the maximum
  tree
    .set_size(
      node,
      USize::new(UDim::absolute(500.0), UDim::absolute(400.0)),
    )
    .unwrap();
  assert_eq!(tree.pixel_size(node).unwrap(), Size::new(200.0, 150.0));

  // within bounds is unaffected
  tree
    .set_size(
      node,
      USize::new(UDim::absolute(150.0), UDim::absolute(100.0)),
    )
    .unwrap();
  assert_eq!(tree.pixel_size(node).unwrap(), Size::new(150.0, 100.0));
}

#[test]
fn zero_max_size_component_disables_that_axis() {
  let mut tree = NodeTree::new(Size::new(800.0, 600.0));
  let node = tree.create_node();
  tree
    .set_max_size(node, USize::new(UDim::absolute(200.0), UDim::ZERO))
    .unwrap();
  tree
    .set_size(
      node,
      USize::new(UDim::absolute(500.0), UDim::absolute(500.0)),
    )
    .unwrap();

  assert_eq!(tree.pixel_size(node).unwrap(), Size::new(200.0, 500.0));
}

#[test]
fn aspect_expand_covers_requested_area() {
  let mut tree = NodeTree::new(Size::new(800.0, 600.0));
  let node = tree.create_node();
  tree.set_aspect_mode(node, AspectMode::Expand).unwrap();
  tree.set_aspect_ratio(node, 2.0).unwrap();
  tree
    .set_size(
      node,
      USize::new(UDim::absolute(100.0), UDim::absolute(100.0)),
    )
    .unwrap();

  let size = tree.pixel_size(node).unwrap();
  assert_eq!(size.width / size.height, 2.0);
  // must cover the requested area, growing a dimension rather than
  // shrinking one
  assert!(size.width >= 100.0 && size.height >= 100.0);
  assert_eq!(size, Size::new(200.0, 100.0));
}

#[test]
fn aspect_shrink_fits_requested_area() {
  let mut tree = NodeTree::new(Size::new(800.0, 600.0));
  let node = tree.create_node();
  tree.set_aspect_mode(node, AspectMode::Shrink).unwrap();
  tree.set_aspect_ratio(node, 2.0).unwrap();
  tree
    .set_size(
      node,
      USize::new(UDim::absolute(100.0), UDim::absolute(100.0)),
    )
    .unwrap();

  assert_eq!(tree.pixel_size(node).unwrap(), Size::new(100.0, 50.0));
}

/// Counts how often the parent's content area is consulted, which happens
/// only while a child rect is being generated
#[derive(Debug)]
struct CountingPolicy {
  hits: Rc<Cell<usize>>,
}

impl NodePolicy for CountingPolicy {
  fn client_child_content_area(
    &self,
    tree: &NodeTree,
    node: NodeId,
    skip_pixel_alignment: bool,
  ) -> Result<Rect> {
    self.hits.set(self.hits.get() + 1);
    if skip_pixel_alignment {
      tree.unclipped_inner_rect_fresh(node, true)
    } else {
      tree.unclipped_inner_rect(node)
    }
  }
}

#[test]
fn cached_reads_do_not_regenerate() {
  let hits = Rc::new(Cell::new(0));
  let mut tree = NodeTree::new(Size::new(800.0, 600.0));
  let parent = tree.create_node_with_policy(Box::new(CountingPolicy {
    hits: Rc::clone(&hits),
  }));
  tree
    .set_size(
      parent,
      USize::new(UDim::absolute(400.0), UDim::absolute(300.0)),
    )
    .unwrap();
  let child = tree.create_node();
  tree.add_child(parent, child).unwrap();
  tree.set_size(child, full_size()).unwrap();

  let first = tree.unclipped_outer_rect(child).unwrap();
  let after_first = hits.get();
  assert!(after_first > 0);

  // a second read without intervening mutation serves the cache and never
  // re-enters the generator
  let second = tree.unclipped_outer_rect(child).unwrap();
  assert_eq!(first, second);
  assert_eq!(hits.get(), after_first);

  // a mutation that changes the resolved rect regenerates on next read
  tree
    .set_size(
      child,
      USize::new(UDim::relative(0.5), UDim::relative(1.0)),
    )
    .unwrap();
  let third = tree.unclipped_outer_rect(child).unwrap();
  assert_ne!(third, second);
  assert!(hits.get() > after_first);
}

#[test]
fn pixel_alignment_does_not_compound_across_levels() {
  // a fractional display makes every relative size fractional
  let mut tree = NodeTree::new(Size::new(801.0, 601.0));
  let parent = tree.create_node();
  tree
    .set_size(
      parent,
      USize::new(UDim::relative(0.5), UDim::relative(0.5)),
    )
    .unwrap();
  let child = tree.create_node();
  tree.add_child(parent, child).unwrap();
  tree
    .set_size(child, USize::new(UDim::relative(0.5), UDim::absolute(50.0)))
    .unwrap();

  // aligned path: parent rounds 400.5 up to 401, child resolves against
  // the rounded parent and rounds again
  assert_eq!(tree.unclipped_outer_rect(parent).unwrap().width(), 401.0);
  assert_eq!(tree.unclipped_outer_rect(child).unwrap().width(), 201.0);

  // the skip probe reports the ideal geometry derived from the parent's
  // own unrounded ideal, not from its rounded cache
  let ideal = tree.unclipped_outer_rect_fresh(child, true).unwrap();
  assert_eq!(ideal.width(), 200.25);

  // and probing never pollutes the authoritative cache
  assert_eq!(tree.unclipped_outer_rect(child).unwrap().width(), 201.0);
}

#[test]
fn framed_policy_insets_content_for_client_children_only() {
  #[derive(Debug)]
  struct Framed {
    border: f32,
  }
  impl NodePolicy for Framed {
    fn inner_rect(&self, tree: &NodeTree, node: NodeId, skip: bool) -> Result<Rect> {
      Ok(tree.unclipped_outer_rect_fresh(node, skip)?.inset(self.border))
    }
  }

  let mut tree = NodeTree::new(Size::new(800.0, 600.0));
  let frame = tree.create_node_with_policy(Box::new(Framed { border: 8.0 }));
  tree
    .set_area(
      frame,
      UVector2::new(UDim::absolute(100.0), UDim::absolute(50.0)),
      USize::new(UDim::absolute(200.0), UDim::absolute(100.0)),
    )
    .unwrap();

  let content = tree.create_node();
  tree.add_child(frame, content).unwrap();
  tree.set_size(content, full_size()).unwrap();

  let decoration = tree.create_node();
  tree.add_child(frame, decoration).unwrap();
  tree.set_non_client(decoration, true).unwrap();
  tree.set_size(decoration, full_size()).unwrap();

  assert_eq!(
    tree.unclipped_inner_rect(frame).unwrap(),
    Rect::from_xywh(108.0, 58.0, 184.0, 84.0)
  );
  assert_eq!(
    tree.unclipped_outer_rect(content).unwrap(),
    Rect::from_xywh(108.0, 58.0, 184.0, 84.0)
  );
  assert_eq!(
    tree.unclipped_outer_rect(decoration).unwrap(),
    Rect::from_xywh(100.0, 50.0, 200.0, 100.0)
  );

  // moving the frame shifts both kinds of children coherently
  tree
    .set_position(frame, UVector2::new(UDim::absolute(0.0), UDim::absolute(0.0)))
    .unwrap();
  assert_eq!(
    tree.unclipped_outer_rect(content).unwrap(),
    Rect::from_xywh(8.0, 8.0, 184.0, 84.0)
  );
  assert_eq!(
    tree.unclipped_outer_rect(decoration).unwrap(),
    Rect::from_xywh(0.0, 0.0, 200.0, 100.0)
  );
}

#[test]
fn detached_node_resolves_against_root_container_again() {
  let mut tree = NodeTree::new(Size::new(800.0, 600.0));
  let parent = tree.create_node();
  tree
    .set_size(
      parent,
      USize::new(UDim::absolute(200.0), UDim::absolute(200.0)),
    )
    .unwrap();
  let child = tree.create_node();
  tree.add_child(parent, child).unwrap();
  tree.set_size(child, USize::new(UDim::relative(0.5), UDim::relative(0.5))).unwrap();

  assert_eq!(
    tree.unclipped_outer_rect(child).unwrap().size,
    Size::new(100.0, 100.0)
  );

  tree.remove_child(parent, child).unwrap();
  assert_eq!(
    tree.unclipped_outer_rect(child).unwrap().size,
    Size::new(400.0, 300.0)
  );
}
