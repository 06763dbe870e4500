//! Pixel-space geometry types
//!
//! This module provides the fundamental geometric primitives the node tree
//! resolves into. All units are screen pixels.
//!
//! # Coordinate System
//!
//! The coordinate system has its origin at the top-left corner:
//! - Positive X extends to the right
//! - Positive Y extends downward
//!
//! Resolved rectangles are screen-absolute: a node's rectangle lives in the
//! same space as its parent's content rectangle, which is itself already in
//! screen space.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rounds a resolved coordinate to the nearest pixel boundary
///
/// This is the single rounding rule used for pixel alignment throughout the
/// crate: round half away from zero (`1.5` becomes `2.0`, `-1.5` becomes
/// `-2.0`), which is what [`f32::round`] implements. It is applied to a
/// node's resolved size and to its final screen offset; `skip` paths that
/// probe a node's ideal geometry bypass it entirely.
///
/// # Examples
///
/// ```
/// use uitree::align_to_pixels;
///
/// assert_eq!(align_to_pixels(1.4), 1.0);
/// assert_eq!(align_to_pixels(1.5), 2.0);
/// assert_eq!(align_to_pixels(-1.5), -2.0);
/// ```
pub fn align_to_pixels(value: f32) -> f32 {
  value.round()
}

/// A 2D point in screen pixel space
///
/// # Examples
///
/// ```
/// use uitree::Point;
///
/// let p = Point::new(10.0, 20.0);
/// assert_eq!(p.x, 10.0);
/// assert_eq!(p.y, 20.0);
/// assert_eq!(Point::ZERO, Point::new(0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
  /// X coordinate (horizontal position, increases to the right)
  pub x: f32,
  /// Y coordinate (vertical position, increases downward)
  pub y: f32,
}

impl Point {
  /// The zero point at the origin (0, 0)
  pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

  /// Creates a new point at the given coordinates
  pub const fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }

  /// Translates this point by another point's coordinates
  ///
  /// # Examples
  ///
  /// ```
  /// use uitree::Point;
  ///
  /// let moved = Point::new(10.0, 20.0).translate(Point::new(5.0, 3.0));
  /// assert_eq!(moved, Point::new(15.0, 23.0));
  /// ```
  pub fn translate(self, other: Point) -> Self {
    Self {
      x: self.x + other.x,
      y: self.y + other.y,
    }
  }
}

impl fmt::Display for Point {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.x, self.y)
  }
}

/// A 2D size in screen pixels
///
/// # Examples
///
/// ```
/// use uitree::Size;
///
/// let size = Size::new(100.0, 50.0);
/// assert_eq!(size.width, 100.0);
/// assert_eq!(size.height, 50.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
  /// Width (horizontal extent)
  pub width: f32,
  /// Height (vertical extent)
  pub height: f32,
}

impl Size {
  /// A size with zero width and height
  pub const ZERO: Self = Self {
    width: 0.0,
    height: 0.0,
  };

  /// Creates a new size with the given dimensions
  pub const fn new(width: f32, height: f32) -> Self {
    Self { width, height }
  }

  /// Returns true if either width or height is zero or negative
  ///
  /// # Examples
  ///
  /// ```
  /// use uitree::Size;
  ///
  /// assert!(Size::ZERO.is_empty());
  /// assert!(Size::new(0.0, 10.0).is_empty());
  /// assert!(!Size::new(10.0, 10.0).is_empty());
  /// ```
  pub fn is_empty(self) -> bool {
    self.width <= 0.0 || self.height <= 0.0
  }
}

impl fmt::Display for Size {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}×{}", self.width, self.height)
  }
}

/// An axis-aligned rectangle in screen pixel space
///
/// Defined by an origin point (top-left corner) and a size.
///
/// # Examples
///
/// ```
/// use uitree::{Point, Rect, Size};
///
/// let rect = Rect::new(Point::new(10.0, 20.0), Size::new(100.0, 50.0));
/// assert_eq!(rect.x(), 10.0);
/// assert_eq!(rect.y(), 20.0);
/// assert_eq!(rect.width(), 100.0);
/// assert_eq!(rect.height(), 50.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
  /// The top-left corner of the rectangle
  pub origin: Point,
  /// The size (width and height) of the rectangle
  pub size: Size,
}

impl Rect {
  /// A zero-sized rectangle at the origin
  pub const ZERO: Self = Self {
    origin: Point::ZERO,
    size: Size::ZERO,
  };

  /// Creates a new rectangle from an origin point and size
  pub const fn new(origin: Point, size: Size) -> Self {
    Self { origin, size }
  }

  /// Creates a rectangle from x, y, width, height components
  ///
  /// # Examples
  ///
  /// ```
  /// use uitree::Rect;
  ///
  /// let rect = Rect::from_xywh(10.0, 20.0, 100.0, 50.0);
  /// assert_eq!(rect.x(), 10.0);
  /// assert_eq!(rect.width(), 100.0);
  /// ```
  pub const fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
    Self {
      origin: Point::new(x, y),
      size: Size::new(width, height),
    }
  }

  /// Returns the x coordinate of the left edge
  pub fn x(self) -> f32 {
    self.origin.x
  }

  /// Returns the y coordinate of the top edge
  pub fn y(self) -> f32 {
    self.origin.y
  }

  /// Returns the width
  pub fn width(self) -> f32 {
    self.size.width
  }

  /// Returns the height
  pub fn height(self) -> f32 {
    self.size.height
  }

  /// Returns the x coordinate of the right edge
  pub fn max_x(self) -> f32 {
    self.origin.x + self.size.width
  }

  /// Returns the y coordinate of the bottom edge
  pub fn max_y(self) -> f32 {
    self.origin.y + self.size.height
  }

  /// Returns true if this rectangle contains the given point
  ///
  /// Points on the boundary are considered inside. This is the containment
  /// query hit-testing callers build on.
  ///
  /// # Examples
  ///
  /// ```
  /// use uitree::{Point, Rect};
  ///
  /// let rect = Rect::from_xywh(10.0, 10.0, 20.0, 20.0);
  /// assert!(rect.contains_point(Point::new(15.0, 15.0)));
  /// assert!(rect.contains_point(Point::new(10.0, 10.0)));
  /// assert!(!rect.contains_point(Point::new(5.0, 5.0)));
  /// ```
  pub fn contains_point(self, point: Point) -> bool {
    point.x >= self.x() && point.x <= self.max_x() && point.y >= self.y() && point.y <= self.max_y()
  }

  /// Shrinks the rectangle by the given amount on every edge
  ///
  /// Negative amounts grow it. Useful for policies that carve a content
  /// inset out of the outer rectangle.
  ///
  /// # Examples
  ///
  /// ```
  /// use uitree::Rect;
  ///
  /// let rect = Rect::from_xywh(10.0, 10.0, 20.0, 20.0);
  /// assert_eq!(rect.inset(5.0), Rect::from_xywh(15.0, 15.0, 10.0, 10.0));
  /// ```
  pub fn inset(self, amount: f32) -> Self {
    Self::from_xywh(
      self.x() + amount,
      self.y() + amount,
      self.width() - amount * 2.0,
      self.height() - amount * 2.0,
    )
  }
}

impl fmt::Display for Rect {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{} {}]", self.origin, self.size)
  }
}

/// Error produced when parsing a [`Quaternion`] from its text form
#[derive(Error, Debug, Clone, PartialEq)]
#[error("expected 'w:_ x:_ y:_ z:_', found '{0}'")]
pub struct ParseQuaternionError(pub String);

/// A rotation, stored on nodes as pass-through state
///
/// Rotation does not participate in rectangle derivation; the node tree
/// stores it and reports changes so a rendering layer can apply it when
/// drawing. The text form used by property reflection is
/// `"w:1 x:0 y:0 z:0"`.
///
/// # Examples
///
/// ```
/// use uitree::Quaternion;
///
/// let q = Quaternion::IDENTITY;
/// assert_eq!(q.to_string(), "w:1 x:0 y:0 z:0");
/// assert_eq!("w:1 x:0 y:0 z:0".parse::<Quaternion>().unwrap(), q);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
  pub w: f32,
  pub x: f32,
  pub y: f32,
  pub z: f32,
}

impl Quaternion {
  /// The identity rotation
  pub const IDENTITY: Self = Self {
    w: 1.0,
    x: 0.0,
    y: 0.0,
    z: 0.0,
  };

  /// Creates a quaternion from its components
  pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
    Self { w, x, y, z }
  }
}

impl Default for Quaternion {
  fn default() -> Self {
    Self::IDENTITY
  }
}

impl fmt::Display for Quaternion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "w:{} x:{} y:{} z:{}", self.w, self.x, self.y, self.z)
  }
}

impl FromStr for Quaternion {
  type Err = ParseQuaternionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut components = [1.0f32, 0.0, 0.0, 0.0];
    let mut seen = 0;
    for token in s.split_whitespace() {
      let (name, number) = token
        .split_once(':')
        .ok_or_else(|| ParseQuaternionError(s.to_string()))?;
      let slot = match name {
        "w" => 0,
        "x" => 1,
        "y" => 2,
        "z" => 3,
        _ => return Err(ParseQuaternionError(s.to_string())),
      };
      components[slot] = number
        .parse()
        .map_err(|_| ParseQuaternionError(s.to_string()))?;
      seen += 1;
    }
    if seen != 4 {
      return Err(ParseQuaternionError(s.to_string()));
    }
    Ok(Self::new(
      components[0],
      components[1],
      components[2],
      components[3],
    ))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_align_to_pixels_rounds_half_away_from_zero() {
    assert_eq!(align_to_pixels(0.4), 0.0);
    assert_eq!(align_to_pixels(0.5), 1.0);
    assert_eq!(align_to_pixels(-0.5), -1.0);
    assert_eq!(align_to_pixels(99.5), 100.0);
    assert_eq!(align_to_pixels(100.0), 100.0);
  }

  #[test]
  fn test_point_translate() {
    let p = Point::new(10.0, 20.0).translate(Point::new(5.0, 3.0));
    assert_eq!(p, Point::new(15.0, 23.0));
  }

  #[test]
  fn test_size_is_empty() {
    assert!(Size::ZERO.is_empty());
    assert!(Size::new(-1.0, 10.0).is_empty());
    assert!(!Size::new(10.0, 10.0).is_empty());
  }

  #[test]
  fn test_rect_accessors() {
    let rect = Rect::from_xywh(10.0, 20.0, 100.0, 50.0);
    assert_eq!(rect.x(), 10.0);
    assert_eq!(rect.y(), 20.0);
    assert_eq!(rect.max_x(), 110.0);
    assert_eq!(rect.max_y(), 70.0);
  }

  #[test]
  fn test_rect_contains_point_boundary_inclusive() {
    let rect = Rect::from_xywh(10.0, 10.0, 20.0, 20.0);
    assert!(rect.contains_point(Point::new(10.0, 10.0)));
    assert!(rect.contains_point(Point::new(30.0, 30.0)));
    assert!(!rect.contains_point(Point::new(30.1, 30.0)));
  }

  #[test]
  fn test_rect_inset() {
    let rect = Rect::from_xywh(0.0, 0.0, 100.0, 60.0);
    assert_eq!(rect.inset(10.0), Rect::from_xywh(10.0, 10.0, 80.0, 40.0));
  }

  #[test]
  fn test_quaternion_round_trip() {
    let q = Quaternion::new(0.5, 0.25, -0.25, 1.0);
    let parsed: Quaternion = q.to_string().parse().unwrap();
    assert_eq!(parsed, q);
  }

  #[test]
  fn test_quaternion_parse_rejects_garbage() {
    assert!("1 0 0 0".parse::<Quaternion>().is_err());
    assert!("w:1 x:0 y:0".parse::<Quaternion>().is_err());
  }
}
