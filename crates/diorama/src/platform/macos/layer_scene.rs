/*!
CoreAnimation scene backed by `CAPluginLayer`s.

Each proxy is a private `CAPluginLayer` configured to draw a window-server
window by number, so the window server keeps its contents live. One
reconcile pass is wrapped in a single `CATransaction`.

Layers belong to the main thread. A `LayerScene` needs a
[`MainThreadMarker`] to build and is neither `Send` nor `Sync`, so it is
driven through [`SnapshotFeed`](crate::SnapshotFeed) rather than
[`Mirror`](crate::Mirror).
*/

#![allow(unsafe_code)]
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use crate::platform::Scene;
use crate::types::{Bounds, MirrorError, MirrorResult, Size, WindowId};
use objc2::msg_send;
use objc2::rc::Retained;
use objc2::runtime::AnyClass;
use objc2_core_foundation::{CGPoint, CGRect, CGSize};
use objc2_foundation::{MainThreadMarker, NSString};
use objc2_quartz_core::{CALayer, CATransaction};

const PLUGIN_TYPE: &str = "com.apple.WindowServer.CGSWindow";
const PLUGIN_GRAVITY: &str = "resizeAspect";
/// Zero disables the window shadow.
const PLUGIN_FLAGS: u32 = 0;

/// A live window layer inside a [`LayerScene`].
#[derive(Debug)]
pub struct PluginLayer {
  layer: Retained<CALayer>,
  window_id: WindowId,
}

impl PluginLayer {
  /// Window-server number this layer draws.
  pub const fn window_id(&self) -> WindowId {
    self.window_id
  }

  /// The underlying `CAPluginLayer`.
  pub fn layer(&self) -> &CALayer {
    &self.layer
  }
}

/// Scene whose proxies are sublayers of a host-provided root layer.
#[derive(Debug)]
pub struct LayerScene {
  root: Retained<CALayer>,
  open: bool,
  _mtm: MainThreadMarker,
}

impl LayerScene {
  /// Mirror into `root`. Its bounds are the viewport.
  pub const fn new(root: Retained<CALayer>, mtm: MainThreadMarker) -> Self {
    Self {
      root,
      open: false,
      _mtm: mtm,
    }
  }

  /// Root layer the proxies are added to.
  pub fn root(&self) -> &CALayer {
    &self.root
  }
}

fn make_plugin_layer(window_id: WindowId) -> MirrorResult<Retained<CALayer>> {
  let Some(class) = AnyClass::get(c"CAPluginLayer") else {
    return Err(MirrorError::ProxyCreationFailed {
      window_id,
      reason: "CAPluginLayer is unavailable".to_string(),
    });
  };

  let layer: Option<Retained<CALayer>> = unsafe { msg_send![class, layer] };
  let Some(layer) = layer else {
    return Err(MirrorError::ProxyCreationFailed {
      window_id,
      reason: "CAPluginLayer allocation returned nil".to_string(),
    });
  };

  let plugin_type = NSString::from_str(PLUGIN_TYPE);
  let gravity = NSString::from_str(PLUGIN_GRAVITY);
  unsafe {
    let _: () = msg_send![&*layer, setPluginType: &*plugin_type];
    let _: () = msg_send![&*layer, setPluginId: u64::from(window_id.0)];
    let _: () = msg_send![&*layer, setPluginGravity: &*gravity];
    let _: () = msg_send![&*layer, setPluginFlags: PLUGIN_FLAGS];
  }
  Ok(layer)
}

impl Scene for LayerScene {
  type Proxy = PluginLayer;

  fn viewport_size(&self) -> Size {
    let bounds = self.root.bounds();
    Size::new(bounds.size.width, bounds.size.height)
  }

  fn begin(&mut self) {
    if self.open {
      log::warn!("Transaction already open, committing it before starting a new one");
      CATransaction::commit();
    }
    CATransaction::begin();
    self.open = true;
  }

  fn create_proxy(&mut self, window_id: WindowId) -> MirrorResult<PluginLayer> {
    let layer = make_plugin_layer(window_id)?;
    self.root.addSublayer(&layer);
    Ok(PluginLayer { layer, window_id })
  }

  fn set_frame(&mut self, proxy: &mut PluginLayer, frame: Bounds) {
    proxy.layer.setFrame(CGRect::new(
      CGPoint::new(frame.x, frame.y),
      CGSize::new(frame.w, frame.h),
    ));
  }

  fn set_opacity(&mut self, proxy: &mut PluginLayer, opacity: f64) {
    proxy.layer.setOpacity(opacity as f32);
  }

  fn set_stacking_index(&mut self, proxy: &mut PluginLayer, index: i64) {
    proxy.layer.setZPosition(index as f64);
  }

  fn detach(&mut self, proxy: &mut PluginLayer) {
    proxy.layer.removeFromSuperlayer();
  }

  fn commit(&mut self) -> MirrorResult<()> {
    if self.open {
      CATransaction::commit();
      CATransaction::flush();
      self.open = false;
    }
    Ok(())
  }

  fn rollback(&mut self) {
    // CoreAnimation cannot discard an open transaction; close it so the
    // transaction stack stays balanced.
    if self.open {
      log::warn!("Rolling back a layer transaction is not supported, committing as-is");
      CATransaction::commit();
      self.open = false;
    }
  }
}
