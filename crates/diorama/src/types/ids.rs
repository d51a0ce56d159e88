/*! Branded ID types for type-safe window references. */

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Window identifier as reported by the window server. Stable for the
/// lifetime of one window instance.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  From,
  Into,
)]
pub struct WindowId(pub u32);

/// Process ID - branded type to distinguish from other u32 values.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
pub struct ProcessId(pub u32);
