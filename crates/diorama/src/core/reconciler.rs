/*!
Scene reconciler.

Owns the `WindowId → proxy` map and the last committed snapshot. Each cycle
runs as one scene transaction:

1. detach proxies of removed windows
2. create proxies for added windows
3. project frame + opacity for every window in the new snapshot
4. restack every proxy from the new snapshot's order

The map and the committed snapshot only change after the scene commits, so a
failed commit leaves both exactly as they were.
*/

use std::collections::{HashMap, HashSet};

use super::diff::{diff, SnapshotDiff};
use super::projection::project;
use crate::platform::Scene;
use crate::types::{CycleReport, MirrorResult, Size, SnapshotList, WindowId};

/// Stacking index for the entry at `position` in a snapshot of `count`
/// windows. Position 0 gets `count`; later entries strictly decrease.
pub(crate) fn stacking_index(count: usize, position: usize) -> i64 {
  i64::try_from(count.saturating_sub(position)).unwrap_or(i64::MAX)
}

/// Keeps a scene's proxies in 1:1 correspondence with the committed snapshot.
pub struct Reconciler<S: Scene> {
  scene: S,
  proxies: HashMap<WindowId, S::Proxy>,
  committed: SnapshotList,
}

impl<S: Scene> std::fmt::Debug for Reconciler<S> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Reconciler")
      .field("proxies", &self.proxies.len())
      .field("committed", &self.committed.len())
      .finish_non_exhaustive()
  }
}

impl<S: Scene> Reconciler<S> {
  /// Start with an empty scene and an empty committed snapshot.
  pub fn new(scene: S) -> Self {
    Self {
      scene,
      proxies: HashMap::new(),
      committed: SnapshotList::default(),
    }
  }

  /// Last successfully committed snapshot.
  pub const fn committed(&self) -> &SnapshotList {
    &self.committed
  }

  /// The scene proxies live in.
  pub const fn scene(&self) -> &S {
    &self.scene
  }

  /// Mutable scene access for host-side changes such as viewport resizes.
  pub fn scene_mut(&mut self) -> &mut S {
    &mut self.scene
  }

  /// Number of live proxies. Always equals `committed().len()`.
  pub fn proxy_count(&self) -> usize {
    self.proxies.len()
  }

  /// Whether `id` currently has a proxy in the scene.
  pub fn has_proxy(&self, id: WindowId) -> bool {
    self.proxies.contains_key(&id)
  }

  /// Diff `new` against the committed snapshot and apply the result.
  pub fn reconcile(&mut self, new: SnapshotList, screen: Size) -> MirrorResult<CycleReport> {
    let changes = diff(&self.committed, &new);
    self.apply(&changes, new, screen)
  }

  /// Apply a diff and a new snapshot as one scene transaction.
  ///
  /// `changes` is expected to be `diff(committed, new)`. The proxy map is
  /// checked against `new` regardless: a window in `new` without a proxy
  /// gets one and a proxy whose window is not in `new` is destroyed, so a
  /// stale or hand-built diff cannot break the 1:1 correspondence.
  ///
  /// On success `new` (minus windows whose proxy could not be created)
  /// becomes the committed snapshot. On failure the scene is rolled back and
  /// nothing here changes.
  pub fn apply(
    &mut self,
    changes: &SnapshotDiff,
    new: SnapshotList,
    screen: Size,
  ) -> MirrorResult<CycleReport> {
    let viewport = self.scene.viewport_size();
    let new_ids: HashSet<WindowId> = new.ids().collect();
    self.scene.begin();

    let mut removed: Vec<WindowId> = Vec::new();
    for (id, proxy) in &mut self.proxies {
      if new_ids.contains(id) {
        continue;
      }
      if !changes.removed.contains(id) {
        log::debug!("Window {id} is gone but was not diffed as removed, detaching anyway");
      }
      self.scene.detach(proxy);
      removed.push(*id);
    }

    let mut created: HashMap<WindowId, S::Proxy> = HashMap::new();
    let mut skipped: HashSet<WindowId> = HashSet::new();
    for id in new.ids() {
      if self.proxies.contains_key(&id) {
        continue;
      }
      if !changes.added.contains(&id) {
        log::debug!("Window {id} has no proxy but was not diffed as added, creating one");
      }
      match self.scene.create_proxy(id) {
        Ok(proxy) => {
          created.insert(id, proxy);
        }
        Err(e) => {
          log::debug!("Skipping window {id} this cycle: {e}");
          skipped.insert(id);
        }
      }
    }

    let count = new.len();
    for (position, window) in new.iter().enumerate() {
      let proxy = match created.get_mut(&window.id) {
        Some(proxy) => proxy,
        None => match self.proxies.get_mut(&window.id) {
          Some(proxy) => proxy,
          None => continue,
        },
      };

      self
        .scene
        .set_frame(proxy, project(window.frame, screen, viewport));
      self.scene.set_opacity(proxy, window.opacity);
      self
        .scene
        .set_stacking_index(proxy, stacking_index(count, position));
    }

    if let Err(e) = self.scene.commit() {
      self.scene.rollback();
      return Err(e);
    }

    for id in &removed {
      self.proxies.remove(id);
    }
    let retained = count - created.len() - skipped.len();
    let mut added: Vec<WindowId> = created.keys().copied().collect();
    self.proxies.extend(created);

    let mut skipped_ids: Vec<WindowId> = skipped.iter().copied().collect();
    added.sort_unstable();
    removed.sort_unstable();
    skipped_ids.sort_unstable();

    let report = CycleReport {
      added,
      removed,
      skipped: skipped_ids,
      retained,
      window_count: count,
    };

    self.committed = if skipped.is_empty() {
      new
    } else {
      new.without(&skipped)
    };

    Ok(report)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::{HeadlessProxy, HeadlessScene};
  use crate::types::{Bounds, MirrorError, ProcessId, WindowSnapshot};

  const SCREEN: Size = Size::new(1000.0, 800.0);

  fn make_window(id: u32, frame: Bounds) -> WindowSnapshot {
    WindowSnapshot {
      id: WindowId(id),
      name: format!("Window {id}"),
      owner_pid: Some(ProcessId(100)),
      stack_layer: 0,
      opacity: 1.0,
      frame,
    }
  }

  fn list(ids: &[u32]) -> SnapshotList {
    SnapshotList::from_front_to_back(
      ids
        .iter()
        .map(|&id| make_window(id, Bounds::new(0.0, 0.0, 200.0, 100.0))),
    )
  }

  fn reconciler() -> Reconciler<HeadlessScene> {
    Reconciler::new(HeadlessScene::new(SCREEN))
  }

  /// Scene that can refuse proxies for given windows or fail its commit.
  struct FlakyScene {
    inner: HeadlessScene,
    refuse: HashSet<WindowId>,
    fail_commit: bool,
  }

  impl FlakyScene {
    fn new() -> Self {
      Self {
        inner: HeadlessScene::new(SCREEN),
        refuse: HashSet::new(),
        fail_commit: false,
      }
    }
  }

  impl Scene for FlakyScene {
    type Proxy = HeadlessProxy;

    fn viewport_size(&self) -> Size {
      self.inner.viewport_size()
    }

    fn begin(&mut self) {
      self.inner.begin();
    }

    fn create_proxy(&mut self, window_id: WindowId) -> MirrorResult<HeadlessProxy> {
      if self.refuse.contains(&window_id) {
        return Err(MirrorError::ProxyCreationFailed {
          window_id,
          reason: "window closed".to_string(),
        });
      }
      self.inner.create_proxy(window_id)
    }

    fn set_frame(&mut self, proxy: &mut HeadlessProxy, frame: Bounds) {
      self.inner.set_frame(proxy, frame);
    }

    fn set_opacity(&mut self, proxy: &mut HeadlessProxy, opacity: f64) {
      self.inner.set_opacity(proxy, opacity);
    }

    fn set_stacking_index(&mut self, proxy: &mut HeadlessProxy, index: i64) {
      self.inner.set_stacking_index(proxy, index);
    }

    fn detach(&mut self, proxy: &mut HeadlessProxy) {
      self.inner.detach(proxy);
    }

    fn commit(&mut self) -> MirrorResult<()> {
      if self.fail_commit {
        return Err(MirrorError::TransactionFailed("commit refused".to_string()));
      }
      self.inner.commit()
    }

    fn rollback(&mut self) {
      self.inner.rollback();
    }
  }

  mod scenario_tests {
    use super::*;

    #[test]
    fn replaces_removed_window_and_restacks() {
      let mut r = reconciler();
      r.reconcile(list(&[1, 2]), SCREEN).unwrap();

      let report = r.reconcile(list(&[2, 3]), SCREEN).unwrap();
      assert_eq!(report.added, vec![WindowId(3)]);
      assert_eq!(report.removed, vec![WindowId(1)]);
      assert_eq!(report.retained, 1);

      let scene = r.scene();
      assert!(scene.node_for(WindowId(1)).is_none(), "proxy 1 destroyed");
      assert_eq!(scene.node_for(WindowId(2)).map(|n| n.stacking_index), Some(2));
      assert_eq!(scene.node_for(WindowId(3)).map(|n| n.stacking_index), Some(1));
      assert_eq!(scene.node_count(), 2);
    }

    #[test]
    fn retained_proxy_is_not_recreated() {
      let mut r = reconciler();
      r.reconcile(list(&[1, 2]), SCREEN).unwrap();
      let before = r.scene().node_for(WindowId(2)).cloned();

      r.reconcile(list(&[2, 3]), SCREEN).unwrap();
      let after = r.scene().node_for(WindowId(2)).cloned();
      assert_eq!(
        before.map(|n| n.window_id),
        after.map(|n| n.window_id),
        "proxy 2 should survive"
      );
      assert_eq!(r.scene().nodes().filter(|n| n.window_id == WindowId(2)).count(), 1);
    }

    #[test]
    fn first_window_gets_highest_stacking_index() {
      let mut r = reconciler();
      let report = r.reconcile(list(&[5]), SCREEN).unwrap();

      assert_eq!(report.added, vec![WindowId(5)]);
      assert_eq!(r.proxy_count(), 1);
      assert_eq!(r.scene().node_for(WindowId(5)).map(|n| n.stacking_index), Some(1));
    }

    #[test]
    fn moved_window_gets_flipped_frame() {
      let mut r = reconciler();
      r.reconcile(
        SnapshotList::from_front_to_back([make_window(7, Bounds::new(0.0, 0.0, 200.0, 100.0))]),
        SCREEN,
      )
      .unwrap();
      let commits = r.scene().commit_count();

      let report = r
        .reconcile(
          SnapshotList::from_front_to_back([make_window(7, Bounds::new(10.0, 10.0, 200.0, 100.0))]),
          SCREEN,
        )
        .unwrap();

      assert!(report.added.is_empty() && report.removed.is_empty());
      assert_eq!(report.retained, 1);
      assert_eq!(
        r.scene().node_for(WindowId(7)).map(|n| n.frame),
        Some(Bounds::new(10.0, 690.0, 200.0, 100.0))
      );
      assert_eq!(r.scene().commit_count(), commits + 1);
      assert_eq!(r.scene().node_count(), 1, "no create/destroy");
    }
  }

  mod update_tests {
    use super::*;

    #[test]
    fn applies_projection_and_opacity() {
      let mut r = Reconciler::new(HeadlessScene::new(Size::new(500.0, 400.0)));
      let mut window = make_window(1, Bounds::new(100.0, 0.0, 200.0, 400.0));
      window.opacity = 0.25;
      r.reconcile(SnapshotList::from_front_to_back([window]), SCREEN)
        .unwrap();

      let node = r.scene().node_for(WindowId(1)).unwrap();
      assert_eq!(node.frame, Bounds::new(50.0, 200.0, 100.0, 200.0));
      assert_eq!(node.opacity, 0.25);
    }

    #[test]
    fn degenerate_frame_is_still_applied() {
      let mut r = reconciler();
      r.reconcile(list(&[1]), SCREEN).unwrap();
      r.reconcile(
        SnapshotList::from_front_to_back([make_window(1, Bounds::new(10.0, 10.0, 0.0, 0.0))]),
        SCREEN,
      )
      .unwrap();

      let node = r.scene().node_for(WindowId(1)).unwrap();
      assert_eq!(node.frame, Bounds::new(10.0, 790.0, 0.0, 0.0));
    }

    #[test]
    fn reorder_without_membership_change_restacks() {
      let mut r = reconciler();
      r.reconcile(list(&[1, 2, 3]), SCREEN).unwrap();
      let report = r.reconcile(list(&[3, 1, 2]), SCREEN).unwrap();

      assert!(!report.has_structural_change());
      assert_eq!(
        r.scene().stacking_order(),
        vec![WindowId(3), WindowId(1), WindowId(2)]
      );
    }

    #[test]
    fn viewport_resize_is_picked_up_next_cycle() {
      let mut r = reconciler();
      r.reconcile(list(&[1]), SCREEN).unwrap();
      r.scene_mut().set_viewport_size(Size::new(500.0, 400.0));
      r.reconcile(list(&[1]), SCREEN).unwrap();

      let node = r.scene().node_for(WindowId(1)).unwrap();
      assert_eq!(node.frame, Bounds::new(0.0, 350.0, 100.0, 50.0));
    }
  }

  mod idempotence_tests {
    use super::*;

    #[test]
    fn same_snapshot_creates_and_destroys_nothing() {
      let mut r = reconciler();
      r.reconcile(list(&[1, 2, 3]), SCREEN).unwrap();

      let report = r.reconcile(list(&[1, 2, 3]), SCREEN).unwrap();
      assert!(report.added.is_empty());
      assert!(report.removed.is_empty());
      assert_eq!(report.retained, 3);
      assert_eq!(r.proxy_count(), 3);
      assert_eq!(r.scene().node_count(), 3);
    }

    #[test]
    fn empty_snapshot_removes_all_proxies() {
      let mut r = reconciler();
      r.reconcile(list(&[1, 2]), SCREEN).unwrap();
      let report = r.reconcile(SnapshotList::default(), SCREEN).unwrap();

      assert_eq!(report.removed, vec![WindowId(1), WindowId(2)]);
      assert_eq!(r.proxy_count(), 0);
      assert_eq!(r.scene().node_count(), 0);
      assert!(r.committed().is_empty());
    }
  }

  mod failure_tests {
    use super::*;

    #[test]
    fn removed_window_without_proxy_is_a_no_op() {
      let mut r = reconciler();
      let changes = SnapshotDiff {
        removed: HashSet::from([WindowId(42)]),
        ..SnapshotDiff::default()
      };
      let report = r.apply(&changes, SnapshotList::default(), SCREEN).unwrap();
      assert!(report.removed.is_empty(), "nothing was destroyed");
      assert_eq!(r.proxy_count(), 0);
    }

    #[test]
    fn proxy_creation_failure_skips_and_retries() {
      let mut scene = FlakyScene::new();
      scene.refuse.insert(WindowId(2));
      let mut r = Reconciler::new(scene);

      let report = r.reconcile(list(&[1, 2]), SCREEN).unwrap();
      assert_eq!(report.added, vec![WindowId(1)]);
      assert_eq!(report.skipped, vec![WindowId(2)]);
      assert!(!r.has_proxy(WindowId(2)));
      assert_eq!(
        r.committed().ids().collect::<Vec<_>>(),
        vec![WindowId(1)],
        "skipped window is left out of the committed snapshot"
      );

      r.scene_mut().refuse.clear();
      let report = r.reconcile(list(&[1, 2]), SCREEN).unwrap();
      assert_eq!(report.added, vec![WindowId(2)], "retried as added");
      assert!(r.has_proxy(WindowId(2)));
      assert_eq!(
        r.scene().inner.node_for(WindowId(2)).map(|n| n.stacking_index),
        Some(1)
      );
    }

    #[test]
    fn failed_commit_leaves_state_untouched() {
      let mut r = Reconciler::new(FlakyScene::new());
      r.reconcile(list(&[1, 2]), SCREEN).unwrap();

      r.scene_mut().fail_commit = true;
      let result = r.reconcile(list(&[2, 3]), SCREEN);
      assert!(matches!(result, Err(MirrorError::TransactionFailed(_))));

      assert_eq!(r.committed().ids().collect::<Vec<_>>(), vec![WindowId(1), WindowId(2)]);
      assert!(r.has_proxy(WindowId(1)), "removed proxy is kept");
      assert!(!r.has_proxy(WindowId(3)), "created proxy is discarded");
      assert_eq!(r.scene().inner.node_count(), 2);
      assert!(!r.scene().inner.has_pending_changes());

      r.scene_mut().fail_commit = false;
      let report = r.reconcile(list(&[2, 3]), SCREEN).unwrap();
      assert_eq!(report.added, vec![WindowId(3)]);
      assert_eq!(report.removed, vec![WindowId(1)], "diffed against last commit");
    }
  }

  mod diff_mismatch_tests {
    use super::*;

    #[test]
    fn retained_window_without_proxy_gets_one() {
      let mut r = reconciler();
      let changes = SnapshotDiff {
        retained: HashSet::from([WindowId(1)]),
        ..SnapshotDiff::default()
      };

      let report = r.apply(&changes, list(&[1]), SCREEN).unwrap();

      assert_eq!(report.added, vec![WindowId(1)]);
      assert_eq!(report.retained, 0);
      assert!(r.has_proxy(WindowId(1)));
      assert_eq!(r.proxy_count(), r.committed().len());
      assert_eq!(r.scene().node_for(WindowId(1)).map(|n| n.stacking_index), Some(1));

      let report = r.reconcile(list(&[1]), SCREEN).unwrap();
      assert!(!report.has_structural_change(), "stays mirrored afterwards");
    }

    #[test]
    fn proxy_missing_from_new_snapshot_is_destroyed() {
      let mut r = reconciler();
      r.reconcile(list(&[1, 2]), SCREEN).unwrap();

      let report = r.apply(&SnapshotDiff::default(), list(&[1]), SCREEN).unwrap();

      assert_eq!(report.removed, vec![WindowId(2)]);
      assert!(!r.has_proxy(WindowId(2)));
      assert!(r.scene().node_for(WindowId(2)).is_none());
      assert_eq!(r.proxy_count(), r.committed().len());
    }

    #[test]
    fn removed_id_still_in_new_snapshot_keeps_its_proxy() {
      let mut r = reconciler();
      r.reconcile(list(&[1]), SCREEN).unwrap();
      let changes = SnapshotDiff {
        removed: HashSet::from([WindowId(1)]),
        ..SnapshotDiff::default()
      };

      let report = r.apply(&changes, list(&[1]), SCREEN).unwrap();

      assert!(report.removed.is_empty());
      assert!(r.has_proxy(WindowId(1)));
      assert_eq!(r.scene().node_count(), 1);
    }
  }

  mod stacking_index_tests {
    use super::*;

    #[test]
    fn front_gets_count_and_back_gets_one() {
      assert_eq!(stacking_index(4, 0), 4);
      assert_eq!(stacking_index(4, 3), 1);
    }
  }
}
