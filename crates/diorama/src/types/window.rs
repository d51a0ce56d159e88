/*! Window snapshot types: one poll's view of the on-screen windows. */

use super::{Bounds, ProcessId, Size, WindowId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One on-screen window as reported by a single poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSnapshot {
  /// Window-server window number.
  pub id: WindowId,
  /// Window title. Empty when the window server withholds it.
  pub name: String,
  /// Owning process. `None` when the window server did not report one.
  pub owner_pid: Option<ProcessId>,
  /// Window-server layer class (0 = normal, higher = floating/system).
  pub stack_layer: i32,
  /// Window alpha in `[0, 1]`.
  pub opacity: f64,
  /// Frame in screen space, top-left origin.
  pub frame: Bounds,
}

/// Ordered front-to-back list of window snapshots. Index 0 is topmost.
///
/// Order is the only source of stacking order. Window IDs are unique: when a
/// source reports the same ID twice, the frontmost entry wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotList {
  windows: Vec<WindowSnapshot>,
}

impl SnapshotList {
  /// Build a list from windows given front-to-back, dropping duplicate IDs.
  pub fn from_front_to_back(windows: impl IntoIterator<Item = WindowSnapshot>) -> Self {
    let mut seen = HashSet::new();
    let windows = windows
      .into_iter()
      .filter(|w| seen.insert(w.id))
      .collect();
    Self { windows }
  }

  /// Number of windows.
  pub fn len(&self) -> usize {
    self.windows.len()
  }

  /// True when no window is on screen.
  pub fn is_empty(&self) -> bool {
    self.windows.is_empty()
  }

  /// Iterate front-to-back.
  pub fn iter(&self) -> std::slice::Iter<'_, WindowSnapshot> {
    self.windows.iter()
  }

  /// Window IDs, front-to-back.
  pub fn ids(&self) -> impl Iterator<Item = WindowId> + '_ {
    self.windows.iter().map(|w| w.id)
  }

  /// Copy of this list with the given windows left out. Order is preserved.
  #[must_use]
  pub fn without(&self, excluded: &HashSet<WindowId>) -> Self {
    Self {
      windows: self
        .windows
        .iter()
        .filter(|w| !excluded.contains(&w.id))
        .cloned()
        .collect(),
    }
  }
}

/// One poll's output: the snapshot plus the screen it was measured on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Acquisition {
  /// Windows front-to-back, host window already left out.
  pub windows: SnapshotList,
  /// Main screen size at acquisition time.
  pub screen: Size,
}

impl<'a> IntoIterator for &'a SnapshotList {
  type Item = &'a WindowSnapshot;
  type IntoIter = std::slice::Iter<'a, WindowSnapshot>;

  fn into_iter(self) -> Self::IntoIter {
    self.windows.iter()
  }
}
