//! String-keyed property reflection
//!
//! Tooling layers (layout loaders, inspectors, script bindings) address
//! node geometry by property name instead of typed accessors. Values
//! travel as strings in the same text formats the types themselves
//! round-trip through: brace notation for unified values, canonical enum
//! spellings for alignments and aspect modes.
//!
//! Unrecognized *names* are errors; unrecognized *alignment spellings*
//! fall back to `Left`/`Top` per the alignment contract, and unrecognized
//! aspect modes to `Ignore`.

use crate::alignment::HorizontalAlignment;
use crate::alignment::VerticalAlignment;
use crate::constraints::AspectMode;
use crate::error::Error;
use crate::error::Result;
use crate::tree::NodeId;
use crate::tree::NodeTree;
use std::str::FromStr;

/// Parses with the property-layer error mapping
fn parse<T: FromStr>(name: &str, value: &str) -> Result<T> {
  value.parse().map_err(|_| Error::InvalidPropertyValue {
    name: name.to_string(),
    value: value.to_string(),
  })
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
  match value {
    "true" | "True" => Ok(true),
    "false" | "False" => Ok(false),
    _ => Err(Error::InvalidPropertyValue {
      name: name.to_string(),
      value: value.to_string(),
    }),
  }
}

impl NodeTree {
  /// Reads a geometry property as a string
  ///
  /// # Examples
  ///
  /// ```
  /// use uitree::{NodeTree, Size};
  ///
  /// let mut tree = NodeTree::new(Size::new(800.0, 600.0));
  /// let node = tree.create_node();
  ///
  /// assert_eq!(tree.property(node, "HorizontalAlignment").unwrap(), "Left");
  /// assert_eq!(tree.property(node, "Size").unwrap(), "{{0,0},{0,0}}");
  /// ```
  pub fn property(&self, id: NodeId, name: &str) -> Result<String> {
    match name {
      "Area" => Ok(self.area(id)?.to_string()),
      "Position" => Ok(self.position(id)?.to_string()),
      "Size" => Ok(self.size(id)?.to_string()),
      "MinSize" => Ok(self.min_size(id)?.to_string()),
      "MaxSize" => Ok(self.max_size(id)?.to_string()),
      "AspectMode" => Ok(self.aspect_mode(id)?.to_string()),
      "AspectRatio" => Ok(self.aspect_ratio(id)?.to_string()),
      "PixelAligned" => Ok(self.is_pixel_aligned(id)?.to_string()),
      "NonClient" => Ok(self.is_non_client(id)?.to_string()),
      "HorizontalAlignment" => Ok(self.horizontal_alignment(id)?.to_string()),
      "VerticalAlignment" => Ok(self.vertical_alignment(id)?.to_string()),
      "Rotation" => Ok(self.rotation(id)?.to_string()),
      _ => Err(Error::UnknownProperty {
        name: name.to_string(),
      }),
    }
  }

  /// Writes a geometry property from a string
  ///
  /// Goes through the same mutators as the typed API, so constraint
  /// clamping, cache invalidation and event firing all apply.
  ///
  /// # Examples
  ///
  /// ```
  /// use uitree::{NodeTree, Size, UDim};
  ///
  /// let mut tree = NodeTree::new(Size::new(800.0, 600.0));
  /// let node = tree.create_node();
  ///
  /// tree.set_property(node, "Size", "{{0.5,0},{0,100}}").unwrap();
  /// assert_eq!(tree.width(node).unwrap(), UDim::new(0.5, 0.0));
  ///
  /// // unrecognized alignment spellings fall back to the default
  /// tree.set_property(node, "VerticalAlignment", "Sideways").unwrap();
  /// assert_eq!(tree.property(node, "VerticalAlignment").unwrap(), "Top");
  /// ```
  pub fn set_property(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
    match name {
      "Area" => self.set_area_rect(id, parse(name, value)?),
      "Position" => self.set_position(id, parse(name, value)?),
      "Size" => self.set_size(id, parse(name, value)?),
      "MinSize" => self.set_min_size(id, parse(name, value)?),
      "MaxSize" => self.set_max_size(id, parse(name, value)?),
      "AspectMode" => self.set_aspect_mode(id, AspectMode::from_name(value)),
      "AspectRatio" => self.set_aspect_ratio(id, parse(name, value)?),
      "PixelAligned" => self.set_pixel_aligned(id, parse_bool(name, value)?),
      "NonClient" => self.set_non_client(id, parse_bool(name, value)?),
      "HorizontalAlignment" => {
        self.set_horizontal_alignment(id, HorizontalAlignment::from_name(value))
      }
      "VerticalAlignment" => self.set_vertical_alignment(id, VerticalAlignment::from_name(value)),
      "Rotation" => self.set_rotation(id, parse(name, value)?),
      _ => Err(Error::UnknownProperty {
        name: name.to_string(),
      }),
    }
  }
}
