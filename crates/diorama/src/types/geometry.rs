/*! Geometry types for screen and viewport coordinates. */

use serde::{Deserialize, Serialize};

/// Rectangle in screen or viewport coordinates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
  /// Left edge.
  pub x: f64,
  /// Top edge.
  pub y: f64,
  /// Width.
  pub w: f64,
  /// Height.
  pub h: f64,
}

impl Bounds {
  /// Empty rectangle at the origin.
  pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

  /// Rectangle from origin and extent.
  pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
    Self { x, y, w, h }
  }

  /// Bottom edge in a top-left-origin space (`y + h`).
  pub fn max_y(&self) -> f64 {
    self.y + self.h
  }

  /// Check if two bounds match within a margin of error.
  pub fn matches(&self, other: &Bounds, margin: f64) -> bool {
    (self.x - other.x).abs() <= margin
      && (self.y - other.y).abs() <= margin
      && (self.w - other.w).abs() <= margin
      && (self.h - other.h).abs() <= margin
  }
}

/// Width and height of a screen or viewport.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Size {
  /// Horizontal extent.
  pub width: f64,
  /// Vertical extent.
  pub height: f64,
}

impl Size {
  /// Size from width and height.
  pub const fn new(width: f64, height: f64) -> Self {
    Self { width, height }
  }
}
