//! Size constraint resolution
//!
//! Three constraint families act on a node's resolved pixel size, in this
//! order: min/max clamping, aspect-ratio enforcement, pixel alignment.
//! This module holds the first two; pixel alignment is
//! [`align_to_pixels`](crate::geometry::align_to_pixels).
//!
//! Min/max clamping happens twice. At mutation time the declared unified
//! size is rewritten in exact unit math so the stored area round-trips
//! through resolution to the clamped pixel value. At resolve time the
//! pixel size is clamped again, which also covers sizes that drift out of
//! bounds when an ancestor extent changes.

use crate::geometry::Size;
use crate::unified::USize;
use tracing::warn;

/// Policy for enforcing a width:height ratio on resolved sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectMode {
  /// No ratio is enforced
  #[default]
  Ignore,
  /// Shrink one extent so the result fits inside the requested size
  Shrink,
  /// Expand one extent so the result covers the requested size
  Expand,
}

impl AspectMode {
  /// Parses the canonical spelling, defaulting to `Ignore` on anything else
  pub fn from_name(name: &str) -> Self {
    match name {
      "Shrink" => Self::Shrink,
      "Expand" => Self::Expand,
      _ => Self::Ignore,
    }
  }
}

impl std::fmt::Display for AspectMode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      Self::Ignore => "Ignore",
      Self::Shrink => "Shrink",
      Self::Expand => "Expand",
    };
    f.write_str(name)
  }
}

/// Adjusts a pixel size to satisfy `width / height == ratio`
///
/// `Shrink` keeps the size inside the requested extents, `Expand` keeps it
/// covering them; in both modes one extent is preserved and the other
/// recomputed from the ratio. Empty sizes and `Ignore` pass through
/// unchanged.
///
/// # Examples
///
/// ```
/// use uitree::{AspectMode, Size, scale_to_aspect};
///
/// let requested = Size::new(100.0, 100.0);
/// assert_eq!(
///     scale_to_aspect(requested, AspectMode::Expand, 2.0),
///     Size::new(200.0, 100.0),
/// );
/// assert_eq!(
///     scale_to_aspect(requested, AspectMode::Shrink, 2.0),
///     Size::new(100.0, 50.0),
/// );
/// ```
pub fn scale_to_aspect(size: Size, mode: AspectMode, ratio: f32) -> Size {
  if mode == AspectMode::Ignore || size.width <= 0.0 || size.height <= 0.0 {
    return size;
  }

  let expected_width = size.height * ratio;
  let keep_height = if mode == AspectMode::Shrink {
    expected_width <= size.width
  } else {
    expected_width >= size.width
  };

  if keep_height {
    Size::new(expected_width, size.height)
  } else {
    Size::new(size.width, size.width / ratio)
  }
}

/// Resolves declared min/max sizes against the root container size
///
/// A zero component in the max size disables that axis. When an enabled max
/// undercuts the min, max wins and the conflict is logged.
pub fn resolved_size_limits(min_size: USize, max_size: USize, root: Size) -> (Size, Size) {
  let mut min = min_size.resolve(root);
  let max = max_size.resolve(root);

  if max.width != 0.0 && min.width > max.width {
    warn!(
      min = min.width,
      max = max.width,
      "resolved minimum width exceeds maximum, maximum wins"
    );
    min.width = max.width;
  }
  if max.height != 0.0 && min.height > max.height {
    warn!(
      min = min.height,
      max = max.height,
      "resolved minimum height exceeds maximum, maximum wins"
    );
    min.height = max.height;
  }

  (min, max)
}

/// Clamps a pixel size to resolved limits, zero max components disabling
/// that axis
pub fn clamp_size(size: Size, min: Size, max: Size) -> Size {
  let mut out = size;

  if out.width < min.width {
    out.width = min.width;
  } else if max.width != 0.0 && out.width > max.width {
    out.width = max.width;
  }

  if out.height < min.height {
    out.height = min.height;
  } else if max.height != 0.0 && out.height > max.height {
    out.height = max.height;
  }

  out
}

/// Rewrites a unified size so it resolves to at least the minimum
///
/// When an axis resolves below the minimum, its offset is capped at the
/// minimum's offset and its scale recomputed as
/// `(min_px - offset) / base_extent`, making the stored value resolve to
/// exactly the minimum pixel extent. Returns whether anything changed.
///
/// `base` is the extent the size resolves against (the parent content
/// size); `root` is the root container size the min size resolves against.
pub fn constrain_to_min_size(base: Size, root: Size, min_size: USize, size: &mut USize) -> bool {
  let pixel = size.resolve(base);
  let min = min_size.resolve(root);
  let mut changed = false;

  if pixel.width < min.width {
    size.width.offset = size.width.offset.min(min_size.width.offset);
    size.width.scale = if base.width != 0.0 {
      (min.width - size.width.offset) / base.width
    } else {
      0.0
    };
    changed = true;
  }

  if pixel.height < min.height {
    size.height.offset = size.height.offset.min(min_size.height.offset);
    size.height.scale = if base.height != 0.0 {
      (min.height - size.height.offset) / base.height
    } else {
      0.0
    };
    changed = true;
  }

  changed
}

/// Rewrites a unified size so it resolves to at most the maximum
///
/// The mirror of [`constrain_to_min_size`]; axes whose maximum resolves to
/// zero are unconstrained. Returns whether anything changed.
pub fn constrain_to_max_size(base: Size, root: Size, max_size: USize, size: &mut USize) -> bool {
  let pixel = size.resolve(base);
  let max = max_size.resolve(root);
  let mut changed = false;

  if max.width > 0.0 && pixel.width > max.width {
    size.width.offset = size.width.offset.max(max_size.width.offset);
    size.width.scale = if base.width != 0.0 {
      (max.width - size.width.offset) / base.width
    } else {
      0.0
    };
    changed = true;
  }

  if max.height > 0.0 && pixel.height > max.height {
    size.height.offset = size.height.offset.max(max_size.height.offset);
    size.height.scale = if base.height != 0.0 {
      (max.height - size.height.offset) / base.height
    } else {
      0.0
    };
    changed = true;
  }

  changed
}
