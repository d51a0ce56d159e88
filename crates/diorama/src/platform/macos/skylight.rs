/*!
Private CoreGraphics Services bindings for desktop (space) membership.

A dedicated space at an absolute level above the normal desktop makes any
window added to it visible on every desktop. The space must be hidden and
destroyed before the process exits, which [`CgsSpace`]'s `Drop` does.
*/

#![allow(unsafe_code)]
#![allow(non_camel_case_types)]

use crate::platform::SpaceMembership;
use crate::types::{MirrorError, MirrorResult, WindowId};
use objc2::rc::Retained;
use objc2_foundation::{NSArray, NSNumber};

type CGSConnectionID = usize;
type CGSSpaceID = u64;

/// Space flag used for user-created spaces.
const SPACE_FLAG: isize = 1;

/// Absolute level of the all-desktops space.
const SPACE_LEVEL: isize = 1;

#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
  fn _CGSDefaultConnection() -> CGSConnectionID;

  fn CGSSpaceCreate(
    cid: CGSConnectionID,
    flag: isize,
    options: *const std::ffi::c_void,
  ) -> CGSSpaceID;

  fn CGSSpaceDestroy(cid: CGSConnectionID, space: CGSSpaceID);

  fn CGSSpaceSetAbsoluteLevel(cid: CGSConnectionID, space: CGSSpaceID, level: isize);

  fn CGSAddWindowsToSpaces(
    cid: CGSConnectionID,
    windows: &NSArray<NSNumber>,
    spaces: &NSArray<NSNumber>,
  );

  fn CGSRemoveWindowsFromSpaces(
    cid: CGSConnectionID,
    windows: &NSArray<NSNumber>,
    spaces: &NSArray<NSNumber>,
  );

  fn CGSShowSpaces(cid: CGSConnectionID, spaces: &NSArray<NSNumber>);

  fn CGSHideSpaces(cid: CGSConnectionID, spaces: &NSArray<NSNumber>);
}

fn connection() -> CGSConnectionID {
  unsafe { _CGSDefaultConnection() }
}

fn number_array(values: &[u64]) -> Retained<NSArray<NSNumber>> {
  let numbers: Vec<Retained<NSNumber>> = values.iter().map(|&v| NSNumber::new_u64(v)).collect();
  NSArray::from_retained_slice(&numbers)
}

/// A window-server space shown on every desktop.
#[derive(Debug)]
pub struct CgsSpace {
  identifier: CGSSpaceID,
}

impl CgsSpace {
  /// Create and show the space.
  pub fn new() -> MirrorResult<Self> {
    let cid = connection();
    let identifier = unsafe { CGSSpaceCreate(cid, SPACE_FLAG, std::ptr::null()) };
    if identifier == 0 {
      return Err(MirrorError::SpaceFailed(
        "CGSSpaceCreate returned no space".to_string(),
      ));
    }
    unsafe {
      CGSSpaceSetAbsoluteLevel(cid, identifier, SPACE_LEVEL);
      CGSShowSpaces(cid, &number_array(&[identifier]));
    }
    log::debug!("Created all-desktops space {identifier}");
    Ok(Self { identifier })
  }

  fn spaces(&self) -> Retained<NSArray<NSNumber>> {
    number_array(&[self.identifier])
  }
}

impl SpaceMembership for CgsSpace {
  fn join(&mut self, window: WindowId) -> MirrorResult<()> {
    let windows = number_array(&[u64::from(window.0)]);
    unsafe { CGSAddWindowsToSpaces(connection(), &windows, &self.spaces()) };
    Ok(())
  }

  fn leave(&mut self, window: WindowId) -> MirrorResult<()> {
    let windows = number_array(&[u64::from(window.0)]);
    unsafe { CGSRemoveWindowsFromSpaces(connection(), &windows, &self.spaces()) };
    Ok(())
  }
}

impl Drop for CgsSpace {
  fn drop(&mut self) {
    let cid = connection();
    unsafe {
      CGSHideSpaces(cid, &self.spaces());
      CGSSpaceDestroy(cid, self.identifier);
    }
    log::debug!("Destroyed all-desktops space {}", self.identifier);
  }
}
