/*!
macOS platform implementation.

Window lists come from `CGWindowListCopyWindowInfo`, proxies are
`CAPluginLayer`s and desktop membership uses private CGS spaces.
*/

mod cf_utils;
mod display;
mod layer_scene;
mod skylight;
mod window_list;

pub use layer_scene::{LayerScene, PluginLayer};
pub use skylight::CgsSpace;

use crate::platform::WindowSource;
use crate::types::{MirrorResult, Size, WindowSnapshot};

/// Window source for the running macOS session.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentPlatform;

impl WindowSource for CurrentPlatform {
  fn fetch_windows(&self) -> MirrorResult<Vec<WindowSnapshot>> {
    window_list::enumerate_windows()
  }

  fn fetch_screen_size(&self) -> Size {
    display::main_screen_size()
  }
}
