/*! Platform abstraction layer. */

mod headless;
mod traits;

pub use headless::{HeadlessProxy, HeadlessScene, SceneNode};
pub use traits::{Scene, SpaceMembership, WindowSource};

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "macos")]
pub use macos::{CgsSpace, CurrentPlatform, LayerScene, PluginLayer};

#[cfg(not(target_os = "macos"))]
pub use unsupported::CurrentPlatform;

#[cfg(not(target_os = "macos"))]
mod unsupported {
  use super::WindowSource;
  use crate::types::{MirrorError, MirrorResult, Size, WindowSnapshot};

  /// Placeholder source for targets without a window server backend.
  #[derive(Debug, Clone, Copy, Default)]
  pub struct CurrentPlatform;

  impl WindowSource for CurrentPlatform {
    fn fetch_windows(&self) -> MirrorResult<Vec<WindowSnapshot>> {
      Err(MirrorError::NotSupported(
        "window enumeration requires macOS".to_string(),
      ))
    }

    fn fetch_screen_size(&self) -> Size {
      Size::new(0.0, 0.0)
    }
  }

}
