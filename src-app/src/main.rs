/*!
Headless diorama runner.

Mirrors the current session's windows into a 16:10 scene and prints every
structural change as one JSON line until interrupted. On macOS the scene is a
tree of live window layers owned by the main thread; elsewhere it is the
in-memory headless scene.

`DIORAMA_VIEWPORT=WIDTHxHEIGHT` overrides the viewport size and
`DIORAMA_INTERVAL_MS` the polling interval. `DIORAMA_HOST_WINDOW` names the
window number of the host surface: it is left out of every snapshot and, on
macOS, shown on all desktops while the runner is alive.
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use diorama::{
  CurrentPlatform, MirrorBuilder, Reconciler, Scene, Size, SnapshotFeed,
  DEFAULT_POLLING_INTERVAL_MS,
};

const DEFAULT_VIEWPORT: Size = Size::new(480.0, 300.0);

fn parse_viewport(raw: &str) -> Option<Size> {
  let (w, h) = raw.split_once('x')?;
  let width: f64 = w.trim().parse().ok()?;
  let height: f64 = h.trim().parse().ok()?;
  (width > 0.0 && height > 0.0).then_some(Size::new(width, height))
}

fn viewport_from_env() -> Size {
  match std::env::var("DIORAMA_VIEWPORT") {
    Ok(raw) => parse_viewport(&raw).unwrap_or_else(|| {
      log::warn!("Ignoring malformed DIORAMA_VIEWPORT {raw:?}");
      DEFAULT_VIEWPORT
    }),
    Err(_) => DEFAULT_VIEWPORT,
  }
}

fn host_window_from_env() -> Option<u32> {
  let raw = std::env::var("DIORAMA_HOST_WINDOW").ok()?;
  let parsed = raw.trim().parse().ok();
  if parsed.is_none() {
    log::warn!("Ignoring malformed DIORAMA_HOST_WINDOW {raw:?}");
  }
  parsed
}

#[cfg(target_os = "macos")]
fn join_all_desktops(window: u32) -> Option<diorama::SpaceGuard<diorama::CgsSpace>> {
  let joined = diorama::CgsSpace::new()
    .and_then(|space| diorama::SpaceGuard::join(space, diorama::WindowId(window)));
  match joined {
    Ok(guard) => Some(guard),
    Err(e) => {
      log::warn!("Host window {window} stays on its own desktop: {e}");
      None
    }
  }
}

fn interval_from_env() -> u64 {
  std::env::var("DIORAMA_INTERVAL_MS")
    .ok()
    .and_then(|raw| raw.parse().ok())
    .filter(|&ms| ms > 0)
    .unwrap_or(DEFAULT_POLLING_INTERVAL_MS)
}

/// Apply acquisitions on the calling thread until `stop` is raised.
fn drive<S: Scene>(feed: &SnapshotFeed, reconciler: &mut Reconciler<S>, stop: &AtomicBool) {
  while !stop.load(Ordering::Acquire) {
    if let Some(acquisition) = feed.wait(Duration::from_millis(100)) {
      feed.apply(reconciler, acquisition);
    }
  }
  log::info!("Final scene: {} windows mirrored", reconciler.proxy_count());
}

#[cfg(target_os = "macos")]
fn run_scene(feed: &SnapshotFeed, viewport: Size, stop: &AtomicBool) {
  use diorama::LayerScene;
  use objc2_core_foundation::{CGPoint, CGRect, CGSize};
  use objc2_foundation::MainThreadMarker;
  use objc2_quartz_core::CALayer;

  let Some(mtm) = MainThreadMarker::new() else {
    log::error!("Layer scene must be driven from the main thread");
    return;
  };
  let root = CALayer::layer();
  root.setFrame(CGRect::new(
    CGPoint::new(0.0, 0.0),
    CGSize::new(viewport.width, viewport.height),
  ));
  let mut reconciler = Reconciler::new(LayerScene::new(root, mtm));
  drive(feed, &mut reconciler, stop);
}

#[cfg(not(target_os = "macos"))]
fn run_scene(feed: &SnapshotFeed, viewport: Size, stop: &AtomicBool) {
  let mut reconciler = Reconciler::new(diorama::HeadlessScene::new(viewport));
  drive(feed, &mut reconciler, stop);
}

fn main() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("diorama=info"))
    .init();

  let runtime = match tokio::runtime::Builder::new_multi_thread()
    .enable_all()
    .build()
  {
    Ok(runtime) => runtime,
    Err(e) => {
      log::error!("Failed to start async runtime: {e}");
      return;
    }
  };

  let viewport = viewport_from_env();
  let interval_ms = interval_from_env();
  log::info!(
    "Mirroring into {}x{} viewport every {interval_ms}ms",
    viewport.width,
    viewport.height
  );

  let host_window = host_window_from_env();
  #[cfg(target_os = "macos")]
  let _space = host_window.and_then(join_all_desktops);

  let mut builder = MirrorBuilder::new().interval_ms(interval_ms);
  if let Some(window) = host_window {
    builder = builder.exclude_window(window);
  }
  let feed = builder.build_feed(CurrentPlatform);
  let stop = Arc::new(AtomicBool::new(false));

  let mut events = feed.subscribe();
  let stop_on_close = Arc::clone(&stop);
  runtime.spawn(async move {
    loop {
      match events.recv().await {
        Ok(event) => match serde_json::to_string(&event) {
          Ok(line) => println!("{line}"),
          Err(e) => log::error!("Failed to serialize event: {e}"),
        },
        Err(e) => {
          log::error!("Event stream closed: {e}");
          stop_on_close.store(true, Ordering::Release);
          break;
        }
      }
    }
  });

  let stop_on_signal = Arc::clone(&stop);
  runtime.spawn(async move {
    match tokio::signal::ctrl_c().await {
      Ok(()) => log::info!("Interrupted, stopping"),
      Err(e) => log::error!("Failed to listen for Ctrl-C: {e}"),
    }
    stop_on_signal.store(true, Ordering::Release);
  });

  // The scene stays on this thread; the runtime only carries events and signals.
  run_scene(&feed, viewport, &stop);
}
