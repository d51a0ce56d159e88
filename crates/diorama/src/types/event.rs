/*! Event types emitted by the poll loop. */

use super::WindowId;
use serde::Serialize;

/// Outcome of one committed reconciliation cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
  /// Windows that received a new proxy, ascending.
  pub added: Vec<WindowId>,
  /// Windows whose proxy was destroyed, ascending.
  pub removed: Vec<WindowId>,
  /// Windows that appeared but could not be bound to a proxy. Retried next cycle.
  pub skipped: Vec<WindowId>,
  /// Number of windows whose proxy was kept and updated in place.
  pub retained: usize,
  /// Number of windows in the snapshot that was applied.
  pub window_count: usize,
}

impl CycleReport {
  /// True when the cycle created, destroyed or skipped anything.
  pub fn has_structural_change(&self) -> bool {
    !self.added.is_empty() || !self.removed.is_empty() || !self.skipped.is_empty()
  }
}

/// Events emitted when the mirror changes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum Event {
  #[serde(rename = "cycle:committed")]
  CycleCommitted(CycleReport),

  #[serde(rename = "cycle:aborted")]
  CycleAborted { reason: String },

  #[serde(rename = "acquisition:failed")]
  AcquisitionFailed { reason: String },
}
