/*!
Screen-to-viewport projection.

Window frames arrive top-left-origin; proxies live in a bottom-left-origin
layer space. The y-axis is flipped against the screen height, then each axis
is scaled independently.
*/

use crate::types::{Bounds, Size};

/// Map a window's screen frame into viewport coordinates.
///
/// No clamping or rounding: degenerate and sub-pixel frames pass through.
pub fn project(frame: Bounds, screen: Size, viewport: Size) -> Bounds {
  let flipped_y = screen.height - frame.max_y();
  let scale_x = viewport.width / screen.width;
  let scale_y = viewport.height / screen.height;

  Bounds {
    x: scale_x * frame.x,
    y: scale_y * flipped_y,
    w: scale_x * frame.w,
    h: scale_y * frame.h,
  }
}
