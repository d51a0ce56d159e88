use crate::types::Size;
use objc2_core_graphics::{CGDisplayBounds, CGMainDisplayID};

/// Main display size in points.
pub(super) fn main_screen_size() -> Size {
  let bounds = CGDisplayBounds(CGMainDisplayID());
  Size::new(bounds.size.width, bounds.size.height)
}
