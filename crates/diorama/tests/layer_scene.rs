//! Builds live window layers on the main thread.
//!
//! Runs without the default harness so `main` owns the main thread, which
//! `LayerScene` requires.

#[cfg(target_os = "macos")]
mod layers {
  use diorama::{Bounds, LayerScene, Reconciler, Size, SnapshotList, WindowId, WindowSnapshot};
  use objc2_core_foundation::{CGPoint, CGRect, CGSize};
  use objc2_foundation::MainThreadMarker;
  use objc2_quartz_core::CALayer;

  const SCREEN: Size = Size::new(1000.0, 800.0);

  fn make_window(id: u32, frame: Bounds) -> WindowSnapshot {
    WindowSnapshot {
      id: WindowId(id),
      name: format!("Window {id}"),
      owner_pid: None,
      stack_layer: 0,
      opacity: 1.0,
      frame,
    }
  }

  /// `(x, y, w, h, z)` of every sublayer, frontmost first.
  fn sublayer_geometry(root: &CALayer) -> Vec<(f64, f64, f64, f64, f64)> {
    let mut geometry: Vec<_> = root
      .sublayers()
      .map(|layers| {
        layers
          .iter()
          .map(|layer| {
            let frame = layer.frame();
            (
              frame.origin.x,
              frame.origin.y,
              frame.size.width,
              frame.size.height,
              layer.zPosition(),
            )
          })
          .collect()
      })
      .unwrap_or_default();
    geometry.sort_by(|a, b| b.4.total_cmp(&a.4));
    geometry
  }

  pub fn run() {
    let mtm = MainThreadMarker::new().expect("integration test runs on the main thread");
    let root = CALayer::layer();
    root.setFrame(CGRect::new(CGPoint::new(0.0, 0.0), CGSize::new(500.0, 400.0)));
    let mut reconciler = Reconciler::new(LayerScene::new(root, mtm));

    let front = make_window(1, Bounds::new(0.0, 0.0, 500.0, 400.0));
    let back = make_window(2, Bounds::new(500.0, 400.0, 500.0, 400.0));
    let report = reconciler
      .reconcile(SnapshotList::from_front_to_back([front.clone(), back]), SCREEN)
      .expect("layer transaction commits");

    assert_eq!(report.added, vec![WindowId(1), WindowId(2)]);
    assert!(report.skipped.is_empty(), "skipped {:?}", report.skipped);
    assert_eq!(
      sublayer_geometry(reconciler.scene().root()),
      vec![
        (0.0, 200.0, 250.0, 200.0, 2.0),
        (250.0, 0.0, 250.0, 200.0, 1.0),
      ]
    );

    let report = reconciler
      .reconcile(SnapshotList::from_front_to_back([front]), SCREEN)
      .expect("layer transaction commits");

    assert_eq!(report.removed, vec![WindowId(2)]);
    assert_eq!(
      sublayer_geometry(reconciler.scene().root()),
      vec![(0.0, 200.0, 250.0, 200.0, 1.0)]
    );
    println!("layer_scene: ok");
  }
}

fn main() {
  #[cfg(target_os = "macos")]
  layers::run();
}
