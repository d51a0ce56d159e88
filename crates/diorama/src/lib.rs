/*!
Diorama - a live miniature mirror of the on-screen windows

```ignore
use diorama::{CurrentPlatform, HeadlessScene, MirrorBuilder, Size};

// Polling starts as soon as the mirror is built
let mirror = MirrorBuilder::new()
  .exclude_window(host_window_number)
  .build(CurrentPlatform, HeadlessScene::new(Size::new(480.0, 300.0)));

// Structural changes (windows appearing/disappearing) are broadcast
let mut events = mirror.subscribe();
while let Ok(event) = events.recv().await {
    // handle event
}

// Inspect what the scene currently shows
let windows = mirror.committed_windows();

// Polling stops when the last mirror handle is dropped
drop(mirror);
```

Scenes that must stay on one thread, like `LayerScene` on the main thread,
are fed instead of mirrored: the poll thread only acquires, and the owning
thread applies.

```ignore
let feed = MirrorBuilder::new().build_feed(CurrentPlatform);
let mut reconciler = Reconciler::new(LayerScene::new(root_layer, mtm));

// From a run loop timer on the main thread
feed.apply_pending(&mut reconciler);
```
*/

mod core;
mod platform;
mod polling;
mod space;

mod types;
pub use types::*;

pub use crate::core::{
  diff, project, Mirror, MirrorBuilder, Reconciler, SnapshotDiff, SnapshotFeed,
};
pub use crate::platform::{
  CurrentPlatform, HeadlessProxy, HeadlessScene, Scene, SceneNode, SpaceMembership, WindowSource,
};
pub use crate::polling::DEFAULT_POLLING_INTERVAL_MS;
pub use crate::space::SpaceGuard;

#[cfg(target_os = "macos")]
pub use crate::platform::{CgsSpace, LayerScene, PluginLayer};
