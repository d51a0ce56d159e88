/*!
Platform abstraction traits.

These traits define the contract between core code and platform implementations.
Platform-specific code (e.g., macOS) implements these traits.
Core code only uses these traits - never platform-specific types directly.
*/

use crate::types::{Bounds, MirrorResult, Size, WindowId, WindowSnapshot};

/// Source of on-screen window lists.
pub trait WindowSource: Send + 'static {
  /// Fetch all visible windows, front-to-back (index 0 = topmost).
  ///
  /// An error means no usable data for this cycle.
  fn fetch_windows(&self) -> MirrorResult<Vec<WindowSnapshot>>;

  /// Fetch main screen dimensions in points.
  fn fetch_screen_size(&self) -> Size;
}

/// A scene graph that can host live window proxies.
///
/// Mutations between [`Scene::begin`] and [`Scene::commit`] form one
/// transaction: nothing becomes visible until commit, and [`Scene::rollback`]
/// discards everything staged since `begin`.
///
/// Scenes are not required to be `Send`. A scene bound to one thread (such as
/// a layer tree owned by the main thread) is driven through a
/// [`SnapshotFeed`](crate::SnapshotFeed) by that thread.
pub trait Scene {
  /// Node that mirrors one window's live contents.
  type Proxy;

  /// Current size of the host viewport.
  fn viewport_size(&self) -> Size;

  /// Open a transaction.
  fn begin(&mut self);

  /// Create and insert a proxy mirroring `window_id`, aspect-preserving and
  /// without shadow.
  fn create_proxy(&mut self, window_id: WindowId) -> MirrorResult<Self::Proxy>;

  /// Place a proxy, in viewport coordinates.
  fn set_frame(&mut self, proxy: &mut Self::Proxy, frame: Bounds);

  /// Set a proxy's opacity in `[0, 1]`.
  fn set_opacity(&mut self, proxy: &mut Self::Proxy, opacity: f64);

  /// Higher = more front.
  fn set_stacking_index(&mut self, proxy: &mut Self::Proxy, index: i64);

  /// Detach a proxy from the scene. The proxy is dropped by the caller after
  /// a successful commit.
  fn detach(&mut self, proxy: &mut Self::Proxy);

  /// Make every staged change visible at once.
  fn commit(&mut self) -> MirrorResult<()>;

  /// Discard every change staged since `begin`.
  fn rollback(&mut self);
}

/// Process-scoped membership of the host window in "all desktops".
pub trait SpaceMembership {
  /// Show `window` on every desktop.
  fn join(&mut self, window: WindowId) -> MirrorResult<()>;

  /// Undo [`SpaceMembership::join`].
  fn leave(&mut self, window: WindowId) -> MirrorResult<()>;
}
