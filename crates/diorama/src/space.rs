/*!
Scoped desktop membership for the host window.

`SpaceGuard::join` shows the host window on every desktop and `leave` runs
when the guard is dropped, including during a panic unwind.
*/

use crate::platform::SpaceMembership;
use crate::types::{MirrorResult, WindowId};

/// Keeps `window` joined to all desktops for the guard's lifetime.
#[must_use = "the window leaves all desktops as soon as the guard is dropped"]
pub struct SpaceGuard<M: SpaceMembership> {
  membership: M,
  window: WindowId,
  joined: bool,
}

impl<M: SpaceMembership> std::fmt::Debug for SpaceGuard<M> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SpaceGuard")
      .field("window", &self.window)
      .field("joined", &self.joined)
      .finish_non_exhaustive()
  }
}

impl<M: SpaceMembership> SpaceGuard<M> {
  /// Join `window` to all desktops.
  pub fn join(mut membership: M, window: WindowId) -> MirrorResult<Self> {
    membership.join(window)?;
    log::debug!("Window {window} joined all desktops");
    Ok(Self {
      membership,
      window,
      joined: true,
    })
  }

  /// The window that was joined.
  pub const fn window(&self) -> WindowId {
    self.window
  }

  /// Leave now and report the outcome, instead of leaving silently on drop.
  pub fn leave(mut self) -> MirrorResult<()> {
    self.joined = false;
    self.membership.leave(self.window)
  }
}

impl<M: SpaceMembership> Drop for SpaceGuard<M> {
  fn drop(&mut self) {
    if !self.joined {
      return;
    }
    self.joined = false;
    match self.membership.leave(self.window) {
      Ok(()) => log::debug!("Window {} left all desktops", self.window),
      Err(e) => log::warn!("Failed to leave desktops for window {}: {e}", self.window),
    }
  }
}
