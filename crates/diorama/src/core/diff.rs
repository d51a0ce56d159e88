/*!
Snapshot differ.

Classifies window IDs across two snapshots. Order is ignored here; the
reconciler recovers stacking order from the new snapshot itself.
*/

use std::collections::HashSet;

use crate::types::{SnapshotList, WindowId};

/// Partition of window IDs between an old and a new snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
  /// In `new`, not in `old`.
  pub added: HashSet<WindowId>,
  /// In `old`, not in `new`.
  pub removed: HashSet<WindowId>,
  /// In both.
  pub retained: HashSet<WindowId>,
}

/// Compute added/removed/retained IDs between two snapshots.
pub fn diff(old: &SnapshotList, new: &SnapshotList) -> SnapshotDiff {
  let old_ids: HashSet<WindowId> = old.ids().collect();
  let new_ids: HashSet<WindowId> = new.ids().collect();

  SnapshotDiff {
    added: new_ids.difference(&old_ids).copied().collect(),
    removed: old_ids.difference(&new_ids).copied().collect(),
    retained: new_ids.intersection(&old_ids).copied().collect(),
  }
}


#[cfg(test)]
mod proptests {
  use super::*;
  use crate::types::{Bounds, WindowSnapshot};
  use proptest::prelude::*;

  fn snapshot() -> impl Strategy<Value = SnapshotList> {
    prop::collection::vec(0u32..40, 0..25).prop_map(|ids| {
      SnapshotList::from_front_to_back(ids.into_iter().map(|id| WindowSnapshot {
        id: WindowId(id),
        name: String::new(),
        owner_pid: None,
        stack_layer: 0,
        opacity: 1.0,
        frame: Bounds::ZERO,
      }))
    })
  }

  proptest! {
    /// added, removed and retained never overlap
    #[test]
    fn sets_are_disjoint(old in snapshot(), new in snapshot()) {
      let d = diff(&old, &new);
      prop_assert!(d.added.is_disjoint(&d.removed));
      prop_assert!(d.added.is_disjoint(&d.retained));
      prop_assert!(d.removed.is_disjoint(&d.retained));
    }

    /// added ∪ retained = ids(new), removed ∪ retained = ids(old)
    #[test]
    fn sets_cover_both_snapshots(old in snapshot(), new in snapshot()) {
      let d = diff(&old, &new);
      let new_ids: HashSet<WindowId> = new.ids().collect();
      let old_ids: HashSet<WindowId> = old.ids().collect();

      let added_or_retained: HashSet<WindowId> = d.added.union(&d.retained).copied().collect();
      let removed_or_retained: HashSet<WindowId> = d.removed.union(&d.retained).copied().collect();
      prop_assert_eq!(added_or_retained, new_ids);
      prop_assert_eq!(removed_or_retained, old_ids);
    }

    /// diff(S, S) retains everything and adds/removes nothing
    #[test]
    fn self_diff_is_identity(s in snapshot()) {
      let d = diff(&s, &s);
      prop_assert!(d.added.is_empty());
      prop_assert!(d.removed.is_empty());
      prop_assert_eq!(d.retained, s.ids().collect::<HashSet<_>>());
    }
  }
}
