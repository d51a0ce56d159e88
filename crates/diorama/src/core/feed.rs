/*!
Snapshot feed for scenes owned by one thread.

The poll thread only acquires: it reads the window list, drops the host
window and parks the result in a single slot, replacing any snapshot nobody
has applied yet. The thread that owns the scene (usually the main thread,
from a run loop timer) takes the newest snapshot and reconciles it. Only the
newest snapshot matters because every apply diffs against the last committed
state, not against the previous acquisition.
*/

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_broadcast::{InactiveReceiver, Sender};
use parking_lot::{Condvar, Mutex};

use super::{event_channel, Reconciler};
use crate::platform::{Scene, WindowSource};
use crate::polling::{self, Acquirer, PollingConfig, PollingHandle};
use crate::types::{Acquisition, Event};

/// Latest acquisition waiting to be applied.
#[derive(Debug, Default)]
struct Slot {
  pending: Mutex<Option<Acquisition>>,
  ready: Condvar,
}

impl Slot {
  fn publish(&self, acquisition: Acquisition) {
    let replaced = self.pending.lock().replace(acquisition).is_some();
    if replaced {
      log::trace!("Replaced an acquisition that was never applied");
    }
    self.ready.notify_all();
  }
}

/// Polls the window source in the background and hands each snapshot to the
/// thread that owns the scene.
///
/// Polling stops when the last clone is dropped. Events from acquisition and
/// from [`SnapshotFeed::apply`] go to the same subscribers.
pub struct SnapshotFeed {
  slot: Arc<Slot>,
  events_tx: Sender<Event>,
  events_keepalive: InactiveReceiver<Event>,
  polling: Arc<Mutex<Option<PollingHandle>>>,
}

impl Clone for SnapshotFeed {
  fn clone(&self) -> Self {
    Self {
      slot: Arc::clone(&self.slot),
      events_tx: self.events_tx.clone(),
      events_keepalive: self.events_keepalive.clone(),
      polling: Arc::clone(&self.polling),
    }
  }
}

impl std::fmt::Debug for SnapshotFeed {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SnapshotFeed")
      .field("pending", &self.slot.pending.lock().is_some())
      .field("polling", &self.polling.lock().is_some())
      .finish_non_exhaustive()
  }
}

impl SnapshotFeed {
  pub(super) fn start<W: WindowSource>(
    source: W,
    config: PollingConfig,
    event_channel_capacity: usize,
  ) -> Self {
    let (events_tx, events_keepalive) = event_channel(event_channel_capacity);
    let slot = Arc::new(Slot::default());

    let mut acquirer = Acquirer::new(source, config.exclude_window);
    let publish_to = Arc::clone(&slot);
    let events = events_tx.clone();
    let polling_handle = polling::start_polling(config.interval_ms, move || {
      publish_to.publish(acquirer.acquire(&events));
    });

    Self {
      slot,
      events_tx,
      events_keepalive,
      polling: Arc::new(Mutex::new(Some(polling_handle))),
    }
  }

  /// Subscribe to events from this feed.
  pub fn subscribe(&self) -> async_broadcast::Receiver<Event> {
    self.events_keepalive.activate_cloned()
  }

  /// Take the newest acquisition, if one arrived since the last take.
  pub fn take(&self) -> Option<Acquisition> {
    self.slot.pending.lock().take()
  }

  /// Like [`SnapshotFeed::take`], but blocks up to `timeout` for the next
  /// acquisition when none is pending.
  pub fn wait(&self, timeout: Duration) -> Option<Acquisition> {
    let deadline = Instant::now() + timeout;
    let mut pending = self.slot.pending.lock();
    while pending.is_none() {
      if self.slot.ready.wait_until(&mut pending, deadline).timed_out() {
        break;
      }
    }
    pending.take()
  }

  /// Reconcile `acquisition` into `reconciler` on the calling thread and
  /// broadcast the outcome.
  pub fn apply<S: Scene>(&self, reconciler: &mut Reconciler<S>, acquisition: Acquisition) {
    let result = reconciler.reconcile(acquisition.windows, acquisition.screen);
    polling::report_cycle(result, &self.events_tx);
  }

  /// Apply the newest pending acquisition, if any. Returns whether a cycle
  /// ran. Meant to be called from the scene owner's run loop.
  pub fn apply_pending<S: Scene>(&self, reconciler: &mut Reconciler<S>) -> bool {
    match self.take() {
      Some(acquisition) => {
        self.apply(reconciler, acquisition);
        true
      }
      None => false,
    }
  }
}
