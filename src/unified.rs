//! Unified dimensions
//!
//! A unified dimension combines a fraction of a parent-relative base extent
//! with a fixed pixel offset: `scale * base + offset`. Declaring geometry in
//! unified dimensions lets a node say "half my parent's width plus 10
//! pixels" in a single value, and lets the tree re-resolve everything when
//! any ancestor extent changes.
//!
//! # Composition
//!
//! All arithmetic is componentwise, which makes resolution distribute over
//! composition: for any dimensions `a`, `b` and base extent `base`,
//!
//! ```text
//! (a + b).resolve(base) == a.resolve(base) + b.resolve(base)
//! ```
//!
//! # Text form
//!
//! Every type here round-trips through a brace-delimited text form used by
//! property reflection: `"{0.5,10}"` for a [`UDim`], with composites nesting
//! (`"{{0.5,0},{0,10}}"` and so on).

use crate::geometry::Point;
use crate::geometry::Rect;
use crate::geometry::Size;
use std::fmt;
use std::ops::Add;
use std::ops::Mul;
use std::ops::Neg;
use std::ops::Sub;
use std::str::FromStr;
use thiserror::Error;

/// Error produced when parsing a unified value from its text form
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseUnifiedError {
  /// The input was not a well-formed brace expression
  #[error("malformed unified value '{0}'")]
  Syntax(String),

  /// A numeric component failed to parse
  #[error("invalid number in unified value: {0}")]
  Number(#[from] std::num::ParseFloatError),
}

/// A single unified dimension: `scale * base + offset`
///
/// # Examples
///
/// ```
/// use uitree::UDim;
///
/// // half the base extent plus ten pixels
/// let dim = UDim::new(0.5, 10.0);
/// assert_eq!(dim.resolve(200.0), 110.0);
///
/// // purely relative and purely absolute shorthands
/// assert_eq!(UDim::relative(0.25).resolve(400.0), 100.0);
/// assert_eq!(UDim::absolute(32.0).resolve(400.0), 32.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UDim {
  /// Fraction of the base extent
  pub scale: f32,
  /// Fixed pixel offset
  pub offset: f32,
}

impl UDim {
  /// A dimension that always resolves to zero
  pub const ZERO: Self = Self {
    scale: 0.0,
    offset: 0.0,
  };

  /// Creates a dimension from a scale and a pixel offset
  pub const fn new(scale: f32, offset: f32) -> Self {
    Self { scale, offset }
  }

  /// Creates a purely relative dimension (no pixel offset)
  pub const fn relative(scale: f32) -> Self {
    Self { scale, offset: 0.0 }
  }

  /// Creates a purely absolute dimension (no relative part)
  pub const fn absolute(offset: f32) -> Self {
    Self { scale: 0.0, offset }
  }

  /// Resolves this dimension against a base extent in pixels
  pub fn resolve(self, base: f32) -> f32 {
    self.scale * base + self.offset
  }
}

impl Add for UDim {
  type Output = Self;

  fn add(self, rhs: Self) -> Self {
    Self::new(self.scale + rhs.scale, self.offset + rhs.offset)
  }
}

impl Sub for UDim {
  type Output = Self;

  fn sub(self, rhs: Self) -> Self {
    Self::new(self.scale - rhs.scale, self.offset - rhs.offset)
  }
}

impl Neg for UDim {
  type Output = Self;

  fn neg(self) -> Self {
    Self::new(-self.scale, -self.offset)
  }
}

impl Mul<f32> for UDim {
  type Output = Self;

  fn mul(self, rhs: f32) -> Self {
    Self::new(self.scale * rhs, self.offset * rhs)
  }
}

impl fmt::Display for UDim {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{{{},{}}}", self.scale, self.offset)
  }
}

impl FromStr for UDim {
  type Err = ParseUnifiedError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let inner = strip_braces(s)?;
    let (scale, offset) = inner
      .split_once(',')
      .ok_or_else(|| ParseUnifiedError::Syntax(s.to_string()))?;
    Ok(Self::new(scale.trim().parse()?, offset.trim().parse()?))
  }
}

/// A position expressed in unified dimensions
///
/// # Examples
///
/// ```
/// use uitree::{Size, UDim, UVector2};
///
/// let pos = UVector2::new(UDim::relative(0.5), UDim::absolute(20.0));
/// let point = pos.resolve(Size::new(200.0, 100.0));
/// assert_eq!(point.x, 100.0);
/// assert_eq!(point.y, 20.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UVector2 {
  pub x: UDim,
  pub y: UDim,
}

impl UVector2 {
  /// A vector that always resolves to the origin
  pub const ZERO: Self = Self {
    x: UDim::ZERO,
    y: UDim::ZERO,
  };

  /// Creates a vector from two dimensions
  pub const fn new(x: UDim, y: UDim) -> Self {
    Self { x, y }
  }

  /// Resolves against a base size, x against width and y against height
  pub fn resolve(self, base: Size) -> Point {
    Point::new(self.x.resolve(base.width), self.y.resolve(base.height))
  }
}

impl Add for UVector2 {
  type Output = Self;

  fn add(self, rhs: Self) -> Self {
    Self::new(self.x + rhs.x, self.y + rhs.y)
  }
}

impl Sub for UVector2 {
  type Output = Self;

  fn sub(self, rhs: Self) -> Self {
    Self::new(self.x - rhs.x, self.y - rhs.y)
  }
}

impl fmt::Display for UVector2 {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{{{},{}}}", self.x, self.y)
  }
}

impl FromStr for UVector2 {
  type Err = ParseUnifiedError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let [x, y] = parse_components::<2>(s)?;
    Ok(Self::new(x, y))
  }
}

/// A size expressed in unified dimensions
///
/// # Examples
///
/// ```
/// use uitree::{Size, UDim, USize};
///
/// // half the parent's width, a fixed 100 pixels tall
/// let size = USize::new(UDim::relative(0.5), UDim::absolute(100.0));
/// assert_eq!(size.resolve(Size::new(800.0, 600.0)), Size::new(400.0, 100.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct USize {
  pub width: UDim,
  pub height: UDim,
}

impl USize {
  /// A size that always resolves to zero
  pub const ZERO: Self = Self {
    width: UDim::ZERO,
    height: UDim::ZERO,
  };

  /// Creates a size from two dimensions
  pub const fn new(width: UDim, height: UDim) -> Self {
    Self { width, height }
  }

  /// Resolves against a base size, width against width and height against
  /// height
  pub fn resolve(self, base: Size) -> Size {
    Size::new(
      self.width.resolve(base.width),
      self.height.resolve(base.height),
    )
  }
}

impl fmt::Display for USize {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{{{},{}}}", self.width, self.height)
  }
}

impl FromStr for USize {
  type Err = ParseUnifiedError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let [width, height] = parse_components::<2>(s)?;
    Ok(Self::new(width, height))
  }
}

/// A rectangle expressed in unified dimensions
///
/// Stored as its min (top-left) and max (bottom-right) corners; the size is
/// derived as the dimension difference, so moving the rectangle preserves
/// its size and resizing it anchors the min corner.
///
/// # Examples
///
/// ```
/// use uitree::{UDim, URect, USize, UVector2};
///
/// let mut area = URect::from_position_size(
///     UVector2::new(UDim::absolute(10.0), UDim::absolute(10.0)),
///     USize::new(UDim::relative(1.0), UDim::absolute(50.0)),
/// );
/// assert_eq!(area.size().height, UDim::absolute(50.0));
///
/// area.set_position(UVector2::ZERO);
/// assert_eq!(area.size().height, UDim::absolute(50.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct URect {
  /// Top-left corner
  pub min: UVector2,
  /// Bottom-right corner
  pub max: UVector2,
}

impl URect {
  /// A rectangle that always resolves to a zero rect at the origin
  pub const ZERO: Self = Self {
    min: UVector2::ZERO,
    max: UVector2::ZERO,
  };

  /// Creates a rectangle from its two corners
  pub const fn new(min: UVector2, max: UVector2) -> Self {
    Self { min, max }
  }

  /// Creates a rectangle from a position and a size
  pub fn from_position_size(position: UVector2, size: USize) -> Self {
    Self {
      min: position,
      max: UVector2::new(position.x + size.width, position.y + size.height),
    }
  }

  /// Returns the position (top-left corner)
  pub fn position(self) -> UVector2 {
    self.min
  }

  /// Returns the size as the difference of the corners
  pub fn size(self) -> USize {
    USize::new(self.max.x - self.min.x, self.max.y - self.min.y)
  }

  /// Moves the rectangle to a new position, preserving its size
  pub fn set_position(&mut self, position: UVector2) {
    let size = self.size();
    self.min = position;
    self.max = UVector2::new(position.x + size.width, position.y + size.height);
  }

  /// Resizes the rectangle, keeping the min corner anchored
  pub fn set_size(&mut self, size: USize) {
    self.max = UVector2::new(self.min.x + size.width, self.min.y + size.height);
  }

  /// Resolves against a base size into a pixel rectangle
  ///
  /// The position resolves to an offset from the base origin; callers add
  /// the base rect's own origin to obtain screen coordinates.
  pub fn resolve(self, base: Size) -> Rect {
    Rect::new(self.min.resolve(base), self.size().resolve(base))
  }
}

impl fmt::Display for URect {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{{{},{},{},{}}}",
      self.min.x, self.min.y, self.max.x, self.max.y
    )
  }
}

impl FromStr for URect {
  type Err = ParseUnifiedError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let [min_x, min_y, max_x, max_y] = parse_components::<4>(s)?;
    Ok(Self::new(
      UVector2::new(min_x, min_y),
      UVector2::new(max_x, max_y),
    ))
  }
}

/// Strips one level of surrounding braces, rejecting anything else
fn strip_braces(s: &str) -> Result<&str, ParseUnifiedError> {
  s.trim()
    .strip_prefix('{')
    .and_then(|rest| rest.strip_suffix('}'))
    .ok_or_else(|| ParseUnifiedError::Syntax(s.to_string()))
}

/// Parses `N` comma-separated [`UDim`] groups from a braced composite
fn parse_components<const N: usize>(s: &str) -> Result<[UDim; N], ParseUnifiedError> {
  let inner = strip_braces(s)?;
  let mut parts = Vec::new();
  let mut depth = 0usize;
  let mut start = 0;
  for (index, ch) in inner.char_indices() {
    match ch {
      '{' => depth += 1,
      '}' => {
        depth = depth
          .checked_sub(1)
          .ok_or_else(|| ParseUnifiedError::Syntax(s.to_string()))?;
      }
      ',' if depth == 0 => {
        parts.push(inner[start..index].trim());
        start = index + 1;
      }
      _ => {}
    }
  }
  if depth != 0 {
    return Err(ParseUnifiedError::Syntax(s.to_string()));
  }
  parts.push(inner[start..].trim());

  if parts.len() != N {
    return Err(ParseUnifiedError::Syntax(s.to_string()));
  }
  let mut dims = [UDim::ZERO; N];
  for (slot, part) in dims.iter_mut().zip(parts) {
    *slot = part.parse()?;
  }
  Ok(dims)
}
