/*! On-screen window enumeration via `CGWindowListCopyWindowInfo`. */

#![allow(unsafe_code)]
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use super::cf_utils::{
  get_cf_f64, get_cf_i64, get_cf_string, get_cf_window_bounds, retain_cf_dictionary,
};
use crate::types::{Bounds, MirrorError, MirrorResult, ProcessId, WindowId, WindowSnapshot};
use objc2_core_foundation::{CFArray, CFDictionary};
use objc2_core_graphics::{kCGNullWindowID, CGWindowListCopyWindowInfo, CGWindowListOption};

/// Enumerate on-screen windows, frontmost first.
pub(super) fn enumerate_windows() -> MirrorResult<Vec<WindowSnapshot>> {
  objc2::rc::autoreleasepool(|_pool| enumerate_windows_inner())
}

fn enumerate_windows_inner() -> MirrorResult<Vec<WindowSnapshot>> {
  let Some(window_list_info) =
    CGWindowListCopyWindowInfo(CGWindowListOption::OptionOnScreenOnly, kCGNullWindowID)
  else {
    return Err(MirrorError::AcquisitionFailed(
      "CGWindowListCopyWindowInfo returned null".to_string(),
    ));
  };

  let count = CFArray::count(&window_list_info);
  let mut windows = Vec::with_capacity(count.max(0) as usize);

  for idx in 0..count {
    let dict_ref = unsafe { CFArray::value_at_index(&window_list_info, idx).cast::<CFDictionary>() };
    let Some(dict) = retain_cf_dictionary(dict_ref) else {
      continue;
    };
    if let Some(window) = parse_window(&dict) {
      windows.push(window);
    }
  }

  Ok(windows)
}

/// Entries without a window number are unusable and dropped. Every other
/// missing field falls back to a neutral value.
fn parse_window(dict: &CFDictionary) -> Option<WindowSnapshot> {
  let id = get_cf_i64(dict, "kCGWindowNumber").and_then(|n| u32::try_from(n).ok())?;

  let frame = get_cf_window_bounds(dict).map_or(Bounds::ZERO, |rect| {
    Bounds::new(
      rect.origin.x,
      rect.origin.y,
      rect.size.width,
      rect.size.height,
    )
  });

  Some(WindowSnapshot {
    id: WindowId(id),
    name: get_cf_string(dict, "kCGWindowName").unwrap_or_default(),
    owner_pid: get_cf_i64(dict, "kCGWindowOwnerPID")
      .and_then(|pid| u32::try_from(pid).ok())
      .map(ProcessId),
    stack_layer: get_cf_i64(dict, "kCGWindowLayer").map_or(0, |layer| layer as i32),
    opacity: get_cf_f64(dict, "kCGWindowAlpha").unwrap_or(0.0),
    frame,
  })
}
