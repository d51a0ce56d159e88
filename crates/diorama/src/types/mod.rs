/*! Core types for Diorama. */

#![allow(missing_docs)]

mod error;
mod event;
mod geometry;
mod ids;
mod window;

pub use error::{MirrorError, MirrorResult};
pub use event::{CycleReport, Event};
pub use geometry::{Bounds, Size};
pub use ids::{ProcessId, WindowId};
pub use window::{Acquisition, SnapshotList, WindowSnapshot};
