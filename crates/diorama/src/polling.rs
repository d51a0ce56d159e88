/*!
Internal polling implementation.

One background thread runs the acquisition half of every cycle: read the
window list and drop the host window. What happens to the result depends on
the owner. `Mirror` reconciles it right there under the reconciler lock;
`SnapshotFeed` hands it to the thread that owns the scene. The wait starts
after the work finishes, so the effective period is work time + interval.

Consumers don't interact with this directly - polling is owned by `Mirror`
and `SnapshotFeed`.
*/

use crate::core::Reconciler;
use crate::platform::{Scene, WindowSource};
use crate::types::{
  Acquisition, CycleReport, Event, MirrorResult, SnapshotList, WindowId, WindowSnapshot,
};
use async_broadcast::Sender;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Delay between the end of one cycle and the start of the next.
pub const DEFAULT_POLLING_INTERVAL_MS: u64 = 250;

/// Handle to the polling thread. Stops and joins on drop.
pub(crate) struct PollingHandle {
  stop_signal: Arc<AtomicBool>,
  thread: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for PollingHandle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PollingHandle").finish_non_exhaustive()
  }
}

impl Drop for PollingHandle {
  fn drop(&mut self) {
    self.stop_signal.store(true, Ordering::SeqCst);
    if let Some(t) = self.thread.take() {
      t.thread().unpark();
      drop(t.join());
    }
  }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PollingConfig {
  pub(crate) exclude_window: Option<WindowId>,
  pub(crate) interval_ms: u64,
}

impl Default for PollingConfig {
  fn default() -> Self {
    Self {
      exclude_window: None,
      interval_ms: DEFAULT_POLLING_INTERVAL_MS,
    }
  }
}

/// Emit an event, logging if the channel overflows.
pub(crate) fn emit(events: &Sender<Event>, event: Event) {
  if let Err(e) = events.try_broadcast(event) {
    if e.is_full() {
      log::error!(
        "Event channel overflow - events are being dropped. \
         Consider increasing the channel capacity or processing events faster."
      );
    }
  }
}

/// Build the cycle's snapshot, leaving out the host window.
fn exclude_host(windows: Vec<WindowSnapshot>, exclude: Option<WindowId>) -> SnapshotList {
  SnapshotList::from_front_to_back(windows.into_iter().filter(|w| exclude != Some(w.id)))
}

/// Window source plus the acquisition state carried between cycles.
pub(crate) struct Acquirer<W> {
  source: W,
  exclude_window: Option<WindowId>,
  failing: bool,
}

impl<W: WindowSource> Acquirer<W> {
  pub(crate) const fn new(source: W, exclude_window: Option<WindowId>) -> Self {
    Self {
      source,
      exclude_window,
      failing: false,
    }
  }

  /// Acquire a snapshot. A failed acquisition counts as an empty snapshot.
  ///
  /// `acquisition:failed` is emitted when the source goes from working to
  /// failing, not on every failed cycle.
  pub(crate) fn acquire(&mut self, events: &Sender<Event>) -> Acquisition {
    let windows = match self.source.fetch_windows() {
      Ok(windows) => {
        if self.failing {
          log::info!("Window list available again");
          self.failing = false;
        }
        exclude_host(windows, self.exclude_window)
      }
      Err(e) => {
        if self.failing {
          log::debug!("Window list still unavailable: {e}");
        } else {
          log::warn!("Window list unavailable, mirroring an empty snapshot: {e}");
          emit(
            events,
            Event::AcquisitionFailed {
              reason: e.to_string(),
            },
          );
          self.failing = true;
        }
        SnapshotList::default()
      }
    };

    Acquisition {
      windows,
      screen: self.source.fetch_screen_size(),
    }
  }
}

/// Log a reconcile outcome and broadcast it when it matters.
pub(crate) fn report_cycle(result: MirrorResult<CycleReport>, events: &Sender<Event>) {
  match result {
    Ok(report) => {
      log::trace!("Cycle committed: {} windows", report.window_count);
      if report.has_structural_change() {
        log::debug!(
          "Mirror changed: +{:?} -{:?} skipped {:?}",
          report.added,
          report.removed,
          report.skipped
        );
        emit(events, Event::CycleCommitted(report));
      }
    }
    Err(e) => {
      log::warn!("Reconciliation cycle aborted, keeping last committed scene: {e}");
      emit(
        events,
        Event::CycleAborted {
          reason: e.to_string(),
        },
      );
    }
  }
}

/// One full cycle for a scene shared with the poll thread.
pub(crate) fn poll_iteration<W: WindowSource, S: Scene>(
  acquirer: &mut Acquirer<W>,
  reconciler: &Mutex<Reconciler<S>>,
  events: &Sender<Event>,
) {
  // OS queries happen before taking the lock.
  let acquired = acquirer.acquire(events);
  let result = reconciler
    .lock()
    .reconcile(acquired.windows, acquired.screen);
  report_cycle(result, events);
}

/// Sleep for `interval`, waking early only when stopped.
fn wait(interval: Duration, stop_signal: &AtomicBool) {
  let deadline = Instant::now() + interval;
  while !stop_signal.load(Ordering::SeqCst) {
    let now = Instant::now();
    if now >= deadline {
      break;
    }
    thread::park_timeout(deadline - now);
  }
}

/// Run `cycle` on a new thread every `interval_ms` until the handle drops.
pub(crate) fn start_polling(
  interval_ms: u64,
  mut cycle: impl FnMut() + Send + 'static,
) -> PollingHandle {
  let stop_signal = Arc::new(AtomicBool::new(false));
  let stop_signal_clone = Arc::clone(&stop_signal);

  let thread = thread::spawn(move || {
    let interval = Duration::from_millis(interval_ms);
    while !stop_signal_clone.load(Ordering::SeqCst) {
      cycle();
      wait(interval, &stop_signal_clone);
    }
  });

  PollingHandle {
    stop_signal,
    thread: Some(thread),
  }
}
