//! Integration tests for viewshed analysis over the mock scene
//!
//! Run with: cargo test --test viewshed_integration_tests

use geovis_runtime::geovis::geodesy::WGS84;
use geovis_runtime::geovis::host::{MockScene, SceneHandle, SceneHost};
use geovis_runtime::geovis::viewshed::ViewshedAnalysis;
use std::sync::{Arc, Mutex};

fn scene() -> (Arc<Mutex<MockScene>>, SceneHandle) {
    let mock = MockScene::new().shared();
    let handle: SceneHandle = mock.clone();
    (mock, handle)
}

#[test]
fn test_integration_partial_occlusion() {
    let (mock, handle) = scene();
    let observer = WGS84.from_degrees(116.39, 39.9, 50.0);
    let target = WGS84.from_degrees(116.39, 39.91, 0.0);

    // Small building north-east of the observer, off the center line
    mock.lock()
        .unwrap()
        .add_obstacle(WGS84.from_degrees(116.392, 39.9045, 0.0), 60.0);

    let mut analysis = ViewshedAnalysis::new(handle, observer, target).unwrap();
    analysis.enable_shadow_occlusion().unwrap();
    analysis.show_frustum_outline().unwrap();

    assert_eq!(analysis.visible_count(), 72);
    assert!(analysis.occluded_count() > 0);
    assert!(analysis.occluded_count() < 72);

    {
        let scene = mock.lock().unwrap();
        assert_eq!(scene.shadow_map_slot(), analysis.shadow_map());
        assert_eq!(scene.primitive_count(), 1);
    }

    drop(analysis);
    let scene = mock.lock().unwrap();
    assert_eq!(scene.entity_count(), 0);
    assert_eq!(scene.shadow_map_count(), 0);
    assert_eq!(scene.shadow_map_slot(), None);
}

#[test]
fn test_integration_analyses_are_independent() {
    let (mock, handle) = scene();
    let observer = WGS84.from_degrees(116.39, 39.9, 100.0);

    let mut north = ViewshedAnalysis::new(handle.clone(), observer, WGS84.from_degrees(116.39, 39.909, 0.0)).unwrap();
    let east = ViewshedAnalysis::new(handle, observer, WGS84.from_degrees(116.4017, 39.9, 0.0)).unwrap();
    assert_eq!(mock.lock().unwrap().entity_count(), 288);

    north.destroy();
    assert_eq!(mock.lock().unwrap().entity_count(), 144);
    assert_eq!(east.entities().len(), 144);
}
