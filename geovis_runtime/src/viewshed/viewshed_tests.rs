use std::sync::{Arc, Mutex};
use super::*;
use crate::geodesy::WGS84;
use crate::host::MockScene;

/// Observer 100 m up, target on the ground about 1 km north.
fn points() -> (DVec3, DVec3) {
    (
        WGS84.from_degrees(116.39, 39.9, 100.0),
        WGS84.from_degrees(116.39, 39.909, 0.0),
    )
}

fn setup() -> (Arc<Mutex<MockScene>>, SceneHandle) {
    let mock = MockScene::new().shared();
    let handle: SceneHandle = mock.clone();
    (mock, handle)
}

/// Sphere 500 m north of the observer that covers the whole fan.
fn add_wall(mock: &Arc<Mutex<MockScene>>) {
    mock.lock().unwrap().add_obstacle(WGS84.from_degrees(116.39, 39.9045, 0.0), 400.0);
}

#[test]
fn test_light_camera() {
    let (observer, target) = points();
    let camera = light_camera(observer, target, DVec3::Z).unwrap();

    assert!((camera.direction - (target - observer).normalize()).length() < 1e-12);
    assert!(camera.up.dot(camera.direction).abs() < 1e-9);
    assert!(camera.right.dot(camera.direction).abs() < 1e-9);
    assert!((camera.frustum.fov - 60f64.to_radians()).abs() < 1e-12);
    assert_eq!(camera.frustum.aspect_ratio, 1.0);
    assert_eq!(camera.frustum.near, 1.0);
    assert!((camera.frustum.far - (observer.distance(target) + 100.0)).abs() < 1e-9);

    assert!(light_camera(observer, observer, DVec3::Z).is_none());
}

#[test]
fn test_unobstructed_view_is_all_visible() {
    let (mock, handle) = setup();
    let (observer, target) = points();

    let analysis = ViewshedAnalysis::new(handle, observer, target).unwrap();

    assert!(!analysis.is_inert());
    assert_eq!(analysis.samples().len(), SAMPLE_SEGMENTS + 1);
    assert_eq!(analysis.visible_count(), 72);
    assert_eq!(analysis.occluded_count(), 0);
    assert_eq!(analysis.entities().len(), 144);
    assert_eq!(mock.lock().unwrap().entity_count(), 144);
}

#[test]
fn test_observer_on_flat_ground_sees_everything() {
    let (mock, handle) = setup();
    let observer = WGS84.from_degrees(116.39, 39.9, 0.0);
    let target = WGS84.from_degrees(116.39, 39.909, 0.0);

    let samples = compute_visibility(&*mock.lock().unwrap(), observer, target, 60f64.to_radians());
    for (visible, outer) in samples.visible.iter().zip(&samples.outer) {
        assert!(observer.distance(*visible) > 900.0);
        assert!(visible.distance(*outer) < 1e-6);
    }

    let analysis = ViewshedAnalysis::new(handle, observer, target).unwrap();
    assert_eq!(analysis.visible_count(), 72);
    assert_eq!(analysis.occluded_count(), 0);
}

#[test]
fn test_blocked_view_is_all_occluded() {
    let (mock, handle) = setup();
    add_wall(&mock);
    let (observer, target) = points();

    let analysis = ViewshedAnalysis::new(handle, observer, target).unwrap();

    assert_eq!(analysis.visible_count(), 72);
    assert_eq!(analysis.occluded_count(), 72);
    assert_eq!(mock.lock().unwrap().entity_count(), 288);

    let samples = analysis.samples();
    for (hit, outer) in samples.visible.iter().zip(&samples.outer) {
        assert!(observer.distance(*hit) < observer.distance(*outer));
    }
}

#[test]
fn test_patch_styles() {
    let (mock, handle) = setup();
    add_wall(&mock);
    let (observer, target) = points();
    let analysis = ViewshedAnalysis::new(handle, observer, target).unwrap();

    let scene = mock.lock().unwrap();
    let visible = scene.entity(analysis.visible_patches[0]).unwrap().polygon.as_ref().unwrap();
    assert_eq!(visible.hierarchy.len(), 3);
    assert!(visible.per_position_height);
    assert_eq!(visible.material.constant_color(), Some(Color::LIME.with_alpha(0.65)));

    let occluded = scene.entity(analysis.occluded_patches[0]).unwrap().polygon.as_ref().unwrap();
    assert_eq!(occluded.hierarchy.len(), 4);
    assert_eq!(occluded.material.constant_color(), Some(Color::RED.with_alpha(0.65)));

    let edge = scene.entity(analysis.occluded_outlines[0]).unwrap().polyline.as_ref().unwrap();
    let ring = edge.positions.value(scene.clock().current_time);
    assert_eq!(ring.len(), 5);
    assert_eq!(ring.first(), ring.last());
}

#[test]
fn test_visible_points_rest_on_terrain() {
    let (mock, handle) = setup();
    mock.lock().unwrap().set_terrain_height(30.0);
    let (observer, _) = points();
    let target = WGS84.from_degrees(116.39, 39.909, 30.0);

    let analysis = ViewshedAnalysis::new(handle, observer, target).unwrap();
    for point in &analysis.samples().visible {
        let height = WGS84.cartesian_to_cartographic(*point).unwrap().height;
        assert!((height - 30.0).abs() < 1e-6);
    }
}

#[test]
fn test_occlusion_threshold() {
    let samples = VisibilitySamples {
        visible: vec![DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0)],
        outer: vec![DVec3::ZERO, DVec3::new(1.4, 0.0, 0.0), DVec3::new(3.0, 0.0, 0.0)],
    };
    assert!(!samples.is_occluded(0));
    assert!(samples.is_occluded(1));
    assert!(!samples.is_occluded(2));
    assert!(!VisibilitySamples::default().is_occluded(0));
}

#[test]
fn test_coincident_points_are_inert() {
    let (mock, handle) = setup();
    let (observer, _) = points();

    let mut analysis = ViewshedAnalysis::new(handle, observer, observer).unwrap();
    analysis.enable_shadow_occlusion().unwrap();
    analysis.show_frustum_outline().unwrap();

    assert!(analysis.is_inert());
    assert!(analysis.samples().is_empty());
    let scene = mock.lock().unwrap();
    assert_eq!(scene.entity_count(), 0);
    assert_eq!(scene.shadow_map_count(), 0);
    assert_eq!(scene.primitive_count(), 0);
}

#[test]
fn test_shadow_occlusion_restores_previous_slot() {
    let (mock, handle) = setup();
    let previous = {
        let mut scene = mock.lock().unwrap();
        let key = scene.create_shadow_map(ShadowMapDesc::default()).unwrap();
        scene.set_shadow_map_slot(Some(key)).unwrap();
        key
    };
    let (observer, target) = points();
    let mut analysis = ViewshedAnalysis::new(handle, observer, target).unwrap();

    analysis.enable_shadow_occlusion().unwrap();
    analysis.enable_shadow_occlusion().unwrap();
    {
        let scene = mock.lock().unwrap();
        let key = analysis.shadow_map().unwrap();
        assert_eq!(scene.shadow_map_slot(), Some(key));
        assert_eq!(scene.shadow_map_count(), 2);

        let desc = scene.shadow_map(key).unwrap();
        assert_eq!(desc.size, 2048);
        assert!(desc.soft_shadows);
        assert!(desc.is_point_light);
        assert_eq!(desc.light_position, observer);
    }

    analysis.destroy();
    let scene = mock.lock().unwrap();
    assert_eq!(scene.shadow_map_slot(), Some(previous));
    assert_eq!(scene.shadow_map_count(), 1);
}

#[test]
fn test_frustum_outline() {
    let (mock, handle) = setup();
    let (observer, target) = points();
    let mut analysis = ViewshedAnalysis::new(handle, observer, target).unwrap();

    analysis.show_frustum_outline().unwrap();
    analysis.show_frustum_outline().unwrap();
    {
        let scene = mock.lock().unwrap();
        assert_eq!(scene.primitive_count(), 1);
        let Some(PrimitiveDesc::FrustumOutline { color, origin, .. }) =
            scene.primitive(analysis.frustum_outline().unwrap())
        else {
            panic!("expected a frustum outline");
        };
        assert_eq!(*color, Color::YELLOW.with_alpha(0.5));
        assert_eq!(*origin, observer);
    }

    analysis.destroy();
    assert_eq!(mock.lock().unwrap().primitive_count(), 0);
}

#[test]
fn test_double_destroy_leaves_nothing() {
    let (mock, handle) = setup();
    add_wall(&mock);
    let (observer, target) = points();
    let mut analysis = ViewshedAnalysis::new(handle, observer, target).unwrap();
    analysis.enable_shadow_occlusion().unwrap();

    analysis.destroy();
    analysis.destroy();

    assert!(analysis.entities().is_empty());
    assert_eq!(analysis.visible_count(), 0);
    let scene = mock.lock().unwrap();
    assert_eq!(scene.entity_count(), 0);
    assert_eq!(scene.shadow_map_count(), 0);
    assert_eq!(scene.shadow_map_slot(), None);
}

#[test]
fn test_destroy_after_scene_destroyed() {
    let (mock, handle) = setup();
    let (observer, target) = points();
    let mut analysis = ViewshedAnalysis::new(handle, observer, target).unwrap();

    mock.lock().unwrap().destroy();
    analysis.destroy();

    assert!(analysis.entities().is_empty());
    assert!(analysis.shadow_map().is_none());
}

#[test]
fn test_new_on_destroyed_scene_fails() {
    let (mock, handle) = setup();
    mock.lock().unwrap().destroy();
    let (observer, target) = points();

    assert!(ViewshedAnalysis::new(handle, observer, target).is_err());
}

#[test]
fn test_drop_removes_visuals() {
    let (mock, handle) = setup();
    let (observer, target) = points();
    {
        let mut analysis = ViewshedAnalysis::new(handle, observer, target).unwrap();
        analysis.show_frustum_outline().unwrap();
    }
    let scene = mock.lock().unwrap();
    assert_eq!(scene.entity_count(), 0);
    assert_eq!(scene.primitive_count(), 0);
}
