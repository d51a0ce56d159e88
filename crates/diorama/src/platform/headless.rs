/*!
In-memory scene graph.

Stages every mutation and applies the batch on commit, so an aborted
transaction leaves no trace. Used for headless runs and tests.
*/

use std::collections::BTreeMap;

use super::traits::Scene;
use crate::types::{Bounds, MirrorResult, Size, WindowId};

/// Committed state of one proxy node.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
  /// Window this node mirrors.
  pub window_id: WindowId,
  /// Projected frame in viewport space.
  pub frame: Bounds,
  /// Alpha copied from the window.
  pub opacity: f64,
  /// Higher is nearer the front.
  pub stacking_index: i64,
}

/// Proxy handle into a [`HeadlessScene`].
#[derive(Debug)]
pub struct HeadlessProxy {
  node: u64,
  window_id: WindowId,
}

impl HeadlessProxy {
  /// Window this proxy mirrors.
  pub const fn window_id(&self) -> WindowId {
    self.window_id
  }
}

#[derive(Debug)]
enum StagedOp {
  Insert { node: u64, window_id: WindowId },
  Frame(u64, Bounds),
  Opacity(u64, f64),
  Stacking(u64, i64),
  Detach(u64),
}

/// Scene graph held entirely in memory.
#[derive(Debug)]
pub struct HeadlessScene {
  viewport: Size,
  nodes: BTreeMap<u64, SceneNode>,
  staged: Vec<StagedOp>,
  next_node: u64,
  commits: u64,
}

impl HeadlessScene {
  /// Empty scene with the given viewport.
  pub fn new(viewport: Size) -> Self {
    Self {
      viewport,
      nodes: BTreeMap::new(),
      staged: Vec::new(),
      next_node: 1,
      commits: 0,
    }
  }

  /// Resize the viewport, as a host window resize would.
  pub fn set_viewport_size(&mut self, viewport: Size) {
    self.viewport = viewport;
  }

  /// Committed nodes, in creation order.
  pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
    self.nodes.values()
  }

  /// Number of committed nodes.
  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  /// Committed node mirroring `window_id`, if any.
  pub fn node_for(&self, window_id: WindowId) -> Option<&SceneNode> {
    self.nodes.values().find(|n| n.window_id == window_id)
  }

  /// Window IDs ordered by stacking index, frontmost first.
  pub fn stacking_order(&self) -> Vec<WindowId> {
    let mut nodes: Vec<&SceneNode> = self.nodes.values().collect();
    nodes.sort_by(|a, b| b.stacking_index.cmp(&a.stacking_index));
    nodes.into_iter().map(|n| n.window_id).collect()
  }

  /// Number of successful commits so far.
  pub const fn commit_count(&self) -> u64 {
    self.commits
  }

  /// True when changes are staged but not yet committed.
  pub fn has_pending_changes(&self) -> bool {
    !self.staged.is_empty()
  }

  fn apply(&mut self, op: StagedOp) {
    match op {
      StagedOp::Insert { node, window_id } => {
        self.nodes.insert(
          node,
          SceneNode {
            window_id,
            frame: Bounds::ZERO,
            opacity: 1.0,
            stacking_index: 0,
          },
        );
      }
      StagedOp::Frame(node, frame) => {
        if let Some(n) = self.nodes.get_mut(&node) {
          n.frame = frame;
        }
      }
      StagedOp::Opacity(node, opacity) => {
        if let Some(n) = self.nodes.get_mut(&node) {
          n.opacity = opacity;
        }
      }
      StagedOp::Stacking(node, index) => {
        if let Some(n) = self.nodes.get_mut(&node) {
          n.stacking_index = index;
        }
      }
      StagedOp::Detach(node) => {
        self.nodes.remove(&node);
      }
    }
  }
}

impl Scene for HeadlessScene {
  type Proxy = HeadlessProxy;

  fn viewport_size(&self) -> Size {
    self.viewport
  }

  fn begin(&mut self) {
    if !self.staged.is_empty() {
      log::warn!(
        "HeadlessScene: begin with {} uncommitted changes, discarding",
        self.staged.len()
      );
      self.staged.clear();
    }
  }

  fn create_proxy(&mut self, window_id: WindowId) -> MirrorResult<HeadlessProxy> {
    let node = self.next_node;
    self.next_node += 1;
    self.staged.push(StagedOp::Insert { node, window_id });
    Ok(HeadlessProxy { node, window_id })
  }

  fn set_frame(&mut self, proxy: &mut HeadlessProxy, frame: Bounds) {
    self.staged.push(StagedOp::Frame(proxy.node, frame));
  }

  fn set_opacity(&mut self, proxy: &mut HeadlessProxy, opacity: f64) {
    self.staged.push(StagedOp::Opacity(proxy.node, opacity));
  }

  fn set_stacking_index(&mut self, proxy: &mut HeadlessProxy, index: i64) {
    self.staged.push(StagedOp::Stacking(proxy.node, index));
  }

  fn detach(&mut self, proxy: &mut HeadlessProxy) {
    self.staged.push(StagedOp::Detach(proxy.node));
  }

  fn commit(&mut self) -> MirrorResult<()> {
    for op in std::mem::take(&mut self.staged) {
      self.apply(op);
    }
    self.commits += 1;
    Ok(())
  }

  fn rollback(&mut self) {
    self.staged.clear();
  }
}
