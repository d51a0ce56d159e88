/*!
Core Mirror instance - owns the reconciler, event broadcasting and polling.

# Module Structure

- `mod.rs` - Mirror struct, builder, events
- `feed.rs` - snapshot feed for scenes owned by one thread (e.g. main thread)
- `diff.rs` - snapshot differ (added / removed / retained)
- `projection.rs` - screen-to-viewport geometry
- `reconciler.rs` - proxy map + transactional scene updates

# Example

```ignore
use diorama::{CurrentPlatform, HeadlessScene, MirrorBuilder, Size};

let mirror = MirrorBuilder::new()
    .exclude_window(host_window_id)
    .build(CurrentPlatform, HeadlessScene::new(Size::new(800.0, 500.0)));

let mut events = mirror.subscribe();
while let Ok(event) = events.recv().await {
    // handle event
}
```

`Mirror` reconciles on its poll thread, so it needs a `Send` scene. A scene
that must stay on the main thread (`LayerScene`) uses `build_feed` instead and
applies each acquired snapshot from the host's run loop:

```ignore
let feed = MirrorBuilder::new().build_feed(CurrentPlatform);
let mut reconciler = Reconciler::new(LayerScene::new(root_layer, mtm));

// On every run loop tick:
feed.apply_pending(&mut reconciler);
```
*/

mod diff;
mod feed;
mod projection;
mod reconciler;

pub use diff::{diff, SnapshotDiff};
pub use feed::SnapshotFeed;
pub use projection::project;
pub use reconciler::Reconciler;

use crate::platform::{Scene, WindowSource};
use crate::polling::{self, Acquirer, PollingConfig, PollingHandle};
use crate::types::{Event, SnapshotList, WindowId};
use async_broadcast::{InactiveReceiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;

const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Broadcast channel that drops the oldest event when full, plus the
/// inactive receiver that keeps it open without subscribers.
fn event_channel(capacity: usize) -> (Sender<Event>, InactiveReceiver<Event>) {
  let (mut tx, rx) = async_broadcast::broadcast(capacity.max(1));
  tx.set_overflow(true); // Drop oldest messages when full
  (tx, rx.deactivate())
}

/// Main Mirror instance - owns the reconciler, event broadcasting, and polling.
///
/// Polling starts automatically when created and stops when the last clone is
/// dropped. Clone is cheap (Arc bumps).
pub struct Mirror<S: Scene> {
  reconciler: Arc<Mutex<Reconciler<S>>>,
  events_tx: Sender<Event>,
  events_keepalive: InactiveReceiver<Event>,
  polling: Arc<Mutex<Option<PollingHandle>>>,
}

impl<S: Scene> Clone for Mirror<S> {
  fn clone(&self) -> Self {
    Self {
      reconciler: Arc::clone(&self.reconciler),
      events_tx: self.events_tx.clone(),
      events_keepalive: self.events_keepalive.clone(),
      polling: Arc::clone(&self.polling),
    }
  }
}

impl<S: Scene> std::fmt::Debug for Mirror<S> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Mirror").finish_non_exhaustive()
  }
}

/// Builder for configuring a Mirror instance.
///
/// # Example
///
/// ```ignore
/// let mirror = MirrorBuilder::new()
///     .exclude_window(host_window_id)
///     .interval_ms(250)
///     .build(source, scene);
/// ```
#[derive(Debug, Clone, Copy)]
#[must_use = "Builder does nothing until .build() is called"]
pub struct MirrorBuilder {
  config: PollingConfig,
  event_channel_capacity: usize,
}

impl Default for MirrorBuilder {
  fn default() -> Self {
    Self {
      config: PollingConfig::default(),
      event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
    }
  }
}

impl MirrorBuilder {
  /// Create a builder with default options.
  pub fn new() -> Self {
    Self::default()
  }

  /// Leave a window out of every snapshot.
  ///
  /// Set to the host window so the mirror never mirrors itself.
  pub const fn exclude_window(mut self, window_id: u32) -> Self {
    self.config.exclude_window = Some(WindowId(window_id));
    self
  }

  /// Delay between the end of one cycle and the start of the next. Default: 250ms.
  pub const fn interval_ms(mut self, ms: u64) -> Self {
    self.config.interval_ms = ms;
    self
  }

  /// Capacity of the event broadcast channel. Default: 256.
  pub const fn event_channel_capacity(mut self, capacity: usize) -> Self {
    self.event_channel_capacity = capacity;
    self
  }

  /// Build the Mirror and start polling `source` into `scene`.
  ///
  /// The scene is reconciled on the poll thread. For a scene that must stay
  /// on its owner's thread, use [`MirrorBuilder::build_feed`].
  #[must_use = "Mirror instance must be stored to keep polling active"]
  pub fn build<W, S>(self, source: W, scene: S) -> Mirror<S>
  where
    W: WindowSource,
    S: Scene + Send + 'static,
    S::Proxy: Send,
  {
    Mirror::create_with_config(source, scene, self)
  }

  /// Start polling `source` without a scene. Snapshots are handed to
  /// whichever thread applies them.
  #[must_use = "SnapshotFeed must be stored to keep polling active"]
  pub fn build_feed<W: WindowSource>(self, source: W) -> SnapshotFeed {
    SnapshotFeed::start(source, self.config, self.event_channel_capacity)
  }
}

impl<S> Mirror<S>
where
  S: Scene + Send + 'static,
  S::Proxy: Send,
{
  /// Create a Mirror with default options.
  ///
  /// For custom configuration, use [`MirrorBuilder`].
  #[must_use = "Mirror instance must be stored to keep polling active"]
  pub fn new<W: WindowSource>(source: W, scene: S) -> Self {
    MirrorBuilder::default().build(source, scene)
  }

  fn create_with_config<W: WindowSource>(source: W, scene: S, builder: MirrorBuilder) -> Self {
    let (events_tx, events_keepalive) = event_channel(builder.event_channel_capacity);

    let mirror = Mirror {
      reconciler: Arc::new(Mutex::new(Reconciler::new(scene))),
      events_tx,
      events_keepalive,
      polling: Arc::new(Mutex::new(None)),
    };

    let mut acquirer = Acquirer::new(source, builder.config.exclude_window);
    let reconciler = Arc::clone(&mirror.reconciler);
    let events = mirror.events_tx.clone();
    let polling_handle = polling::start_polling(builder.config.interval_ms, move || {
      polling::poll_iteration(&mut acquirer, &reconciler, &events);
    });
    *mirror.polling.lock() = Some(polling_handle);

    mirror
  }
}

impl<S: Scene> Mirror<S> {
  /// Subscribe to events from this instance.
  pub fn subscribe(&self) -> async_broadcast::Receiver<Event> {
    self.events_keepalive.activate_cloned()
  }

  /// Inspect the reconciler. Blocks the poll loop while the closure runs.
  pub fn read<R>(&self, f: impl FnOnce(&Reconciler<S>) -> R) -> R {
    f(&self.reconciler.lock())
  }

  /// Mutate the scene between cycles (e.g. after a host viewport resize).
  ///
  /// Runs on the same serialized context as reconciliation.
  pub fn with_scene<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
    f(self.reconciler.lock().scene_mut())
  }

  /// Last committed snapshot.
  pub fn committed_windows(&self) -> SnapshotList {
    self.read(|r| r.committed().clone())
  }
}
