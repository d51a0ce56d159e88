/*! Error types for Diorama operations. */

use super::WindowId;

/// Errors that can occur while mirroring windows.
///
/// None of these are fatal to the poll loop: every cycle recomputes from live
/// window-server state, so a failed cycle heals on the next one.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
  /// The window list could not be read for this cycle.
  #[error("Window list unavailable: {0}")]
  AcquisitionFailed(String),

  /// A proxy could not be bound to a window (usually closed mid-cycle).
  #[error("Failed to create proxy for window {window_id}: {reason}")]
  ProxyCreationFailed { window_id: WindowId, reason: String },

  /// The scene could not commit the cycle atomically.
  #[error("Scene transaction failed: {0}")]
  TransactionFailed(String),

  #[error("Space operation failed: {0}")]
  SpaceFailed(String),

  #[error("Operation not supported: {0}")]
  NotSupported(String),
}

/// Result type for Diorama operations.
pub type MirrorResult<T> = Result<T, MirrorError>;
