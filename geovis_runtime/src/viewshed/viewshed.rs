/// ViewshedAnalysis - what an observer can see toward a target.
///
/// A fan of rays across the light camera's field of view is cast from the
/// observer. Each ray stops at the first obstacle or terrain hit, capped at
/// the observer-target range. Visible ground is drawn as lime triangles
/// from the observer; ground hidden behind a hit is drawn as red quads
/// reaching out to the range limit. An optional shadow map from the same
/// light camera lets the host shade occluded geometry.

use glam::{DQuat, DVec3};
use crate::camera::{CameraState, PerspectiveFrustum, Ray};
use crate::error::Result;
use crate::host::{
    lock_scene, EntityDesc, EntityKey, PolygonGraphics, PolylineGraphics, PrimitiveDesc,
    PrimitiveKey, Property, SceneHandle, SceneHost, ShadowMapDesc, ShadowMapKey, SurfaceMaterial,
};
use crate::material::Color;

/// Number of ray segments across the field of view (segments + 1 rays)
pub const SAMPLE_SEGMENTS: usize = 72;

const LIGHT_FOV_DEG: f64 = 60.0;
const LIGHT_NEAR: f64 = 1.0;
/// Light camera reaches this far past the target
const LIGHT_FAR_MARGIN: f64 = 100.0;

/// A hit this far from its range-limit point leaves hidden ground behind it
const OCCLUSION_THRESHOLD: f64 = 0.5;

const PATCH_ALPHA: f32 = 0.65;
const OUTLINE_WIDTH: f64 = 1.5;
const SHADOW_MAP_SIZE: u32 = 2048;
const FRUSTUM_OUTLINE_ALPHA: f32 = 0.5;

/// Ray results in fan order, both projected onto the terrain surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibilitySamples {
    /// Where each ray stopped
    pub visible: Vec<DVec3>,
    /// Where each ray would end at the observer-target range
    pub outer: Vec<DVec3>,
}

impl VisibilitySamples {
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Whether segment `i` (between rays i and i+1) hides ground.
    /// Segments past the last ray are never occluded.
    pub fn is_occluded(&self, i: usize) -> bool {
        let gap = |j: usize| match (self.visible.get(j), self.outer.get(j)) {
            (Some(visible), Some(outer)) => Some(visible.distance(*outer)),
            _ => None,
        };
        match (gap(i), gap(i + 1)) {
            (Some(a), Some(b)) => a > OCCLUSION_THRESHOLD || b > OCCLUSION_THRESHOLD,
            _ => false,
        }
    }
}

/// Light camera looking from `observer` to `target`, oriented with the
/// host camera's up vector. `None` when both points coincide.
pub fn light_camera(observer: DVec3, target: DVec3, host_up: DVec3) -> Option<CameraState> {
    let direction = (target - observer).try_normalize()?;
    let distance = observer.distance(target);
    let frustum = PerspectiveFrustum::new(
        LIGHT_FOV_DEG.to_radians(),
        1.0,
        LIGHT_NEAR,
        distance + LIGHT_FAR_MARGIN,
    );
    Some(CameraState::new(observer, direction, host_up, frustum))
}

/// `position` moved onto the terrain at its longitude/latitude.
///
/// Falls back to its own height without terrain data, and to the input when
/// it has no geodetic projection.
pub fn surface_point(host: &dyn SceneHost, position: DVec3) -> DVec3 {
    let ellipsoid = host.ellipsoid();
    let Some(carto) = ellipsoid.cartesian_to_cartographic(position) else {
        return position;
    };
    let height = host.globe_height(&carto).unwrap_or(carto.height);
    ellipsoid.cartographic_to_cartesian(&carto.with_height(height))
}

/// Cast `SAMPLE_SEGMENTS + 1` rays from `observer` across `fov`, centered
/// on the direction to `target`.
pub fn compute_visibility(host: &dyn SceneHost, observer: DVec3, target: DVec3, fov: f64) -> VisibilitySamples {
    let mut samples = VisibilitySamples::default();
    let Some(forward) = (target - observer).try_normalize() else {
        return samples;
    };
    let max_distance = observer.distance(target);

    let observer_up = observer.normalize_or_zero();
    let right = forward
        .cross(observer_up)
        .try_normalize()
        .or_else(|| host.camera().right.try_normalize())
        .unwrap_or_else(|| forward.any_orthonormal_vector());
    let up = right.cross(forward).normalize();

    let half = fov * 0.5;
    for i in 0..=SAMPLE_SEGMENTS {
        let angle = -half + fov * i as f64 / SAMPLE_SEGMENTS as f64;
        let direction = DQuat::from_axis_angle(up, angle) * forward;
        let ray = Ray::new(observer, direction);
        let outer = ray.point_at(max_distance);

        // Hits inside the near plane are the observer's own ground.
        let beyond_near = |p: &DVec3| observer.distance(*p) >= LIGHT_NEAR;
        let mut hit = host
            .pick_from_ray(&ray, &[])
            .map(|hit| hit.position)
            .filter(beyond_near)
            .or_else(|| host.globe_pick(&ray).filter(beyond_near))
            .unwrap_or(outer);
        if observer.distance(hit) > max_distance {
            hit = outer;
        }

        samples.visible.push(surface_point(host, hit));
        samples.outer.push(surface_point(host, outer));
    }
    samples
}

/// Viewshed between one observer and one target.
///
/// Visuals are built on construction. `destroy` (also run on drop) removes
/// everything this analysis added and gives the host its previous shadow
/// map slot back.
pub struct ViewshedAnalysis {
    scene: SceneHandle,
    observer: DVec3,
    target: DVec3,
    light_camera: Option<CameraState>,
    samples: VisibilitySamples,
    visible_patches: Vec<EntityKey>,
    visible_outlines: Vec<EntityKey>,
    occluded_patches: Vec<EntityKey>,
    occluded_outlines: Vec<EntityKey>,
    frustum_outline: Option<PrimitiveKey>,
    shadow_map: Option<ShadowMapKey>,
    /// Host slot before the first `enable_shadow_occlusion`
    previous_slot: Option<Option<ShadowMapKey>>,
}

impl ViewshedAnalysis {
    /// Analyze the view from `observer` toward `target`.
    ///
    /// Coincident points give an inert analysis with no visuals.
    pub fn new(scene: SceneHandle, observer: DVec3, target: DVec3) -> Result<Self> {
        let mut analysis = Self {
            scene,
            observer,
            target,
            light_camera: None,
            samples: VisibilitySamples::default(),
            visible_patches: Vec::new(),
            visible_outlines: Vec::new(),
            occluded_patches: Vec::new(),
            occluded_outlines: Vec::new(),
            frustum_outline: None,
            shadow_map: None,
            previous_slot: None,
        };

        let scene = analysis.scene.clone();
        let mut host = lock_scene(&scene)?;

        analysis.light_camera = light_camera(observer, target, host.camera().up);
        let Some(camera) = analysis.light_camera else {
            crate::geovis_warn!("geovis::Viewshed", "Observer and target coincide, analysis is inert");
            return Ok(analysis);
        };

        analysis.samples = compute_visibility(&*host, observer, target, camera.frustum.fov);
        analysis.build_visuals(&mut *host)?;
        drop(host);

        crate::geovis_debug!(
            "geovis::Viewshed",
            "Viewshed built: {} visible, {} occluded segments",
            analysis.visible_count(),
            analysis.occluded_count()
        );
        Ok(analysis)
    }

    fn build_visuals(&mut self, host: &mut dyn SceneHost) -> Result<()> {
        if self.samples.len() < 3 {
            return Ok(());
        }

        let origin = surface_point(host, self.observer);
        let visible_fill = SurfaceMaterial::color(Color::LIME.with_alpha(PATCH_ALPHA));
        let occluded_fill = SurfaceMaterial::color(Color::RED.with_alpha(PATCH_ALPHA));

        for i in 0..self.samples.len() - 1 {
            let v0 = self.samples.visible[i];
            let v1 = self.samples.visible[i + 1];

            self.visible_patches.push(host.add_entity(patch(vec![origin, v0, v1], visible_fill.clone()))?);
            self.visible_outlines.push(host.add_entity(outline(vec![origin, v0, v1, origin], Color::LIME))?);

            if self.samples.is_occluded(i) {
                let o0 = self.samples.outer[i];
                let o1 = self.samples.outer[i + 1];
                self.occluded_patches.push(host.add_entity(patch(vec![v0, v1, o1, o0], occluded_fill.clone()))?);
                self.occluded_outlines.push(host.add_entity(outline(vec![v0, v1, o1, o0, v0], Color::RED))?);
            }
        }
        Ok(())
    }

    pub fn observer(&self) -> DVec3 {
        self.observer
    }

    pub fn target(&self) -> DVec3 {
        self.target
    }

    pub fn is_inert(&self) -> bool {
        self.light_camera.is_none()
    }

    pub fn light_camera(&self) -> Option<&CameraState> {
        self.light_camera.as_ref()
    }

    pub fn samples(&self) -> &VisibilitySamples {
        &self.samples
    }

    /// Visible triangle patches currently in the scene.
    pub fn visible_count(&self) -> usize {
        self.visible_patches.len()
    }

    /// Occluded quad patches currently in the scene.
    pub fn occluded_count(&self) -> usize {
        self.occluded_patches.len()
    }

    /// Every entity this analysis owns (patches and outlines).
    pub fn entities(&self) -> Vec<EntityKey> {
        self.visible_patches
            .iter()
            .chain(&self.visible_outlines)
            .chain(&self.occluded_patches)
            .chain(&self.occluded_outlines)
            .copied()
            .collect()
    }

    pub fn shadow_map(&self) -> Option<ShadowMapKey> {
        self.shadow_map
    }

    pub fn frustum_outline(&self) -> Option<PrimitiveKey> {
        self.frustum_outline
    }

    // ===== HOST EXTRAS =====

    /// Install a soft point-light shadow map rendered from the light camera
    /// in the host's occlusion slot. Calling again replaces the map.
    pub fn enable_shadow_occlusion(&mut self) -> Result<()> {
        let Some(camera) = self.light_camera else {
            return Ok(());
        };
        let mut host = lock_scene(&self.scene)?;

        if self.previous_slot.is_none() {
            self.previous_slot = Some(host.shadow_map_slot());
        }
        if let Some(old) = self.shadow_map.take() {
            host.destroy_shadow_map(old)?;
        }

        let key = host.create_shadow_map(ShadowMapDesc {
            light_position: camera.position,
            light_direction: camera.direction,
            light_up: camera.up,
            frustum: camera.frustum,
            size: SHADOW_MAP_SIZE,
            soft_shadows: true,
            is_point_light: true,
            ..ShadowMapDesc::default()
        })?;
        self.shadow_map = Some(key);
        host.set_shadow_map_slot(Some(key))
    }

    /// Draw the light camera's frustum as a wireframe.
    pub fn show_frustum_outline(&mut self) -> Result<()> {
        let Some(camera) = self.light_camera else {
            return Ok(());
        };
        if self.frustum_outline.is_some() {
            return Ok(());
        }

        let mut host = lock_scene(&self.scene)?;
        let key = host.add_primitive(PrimitiveDesc::FrustumOutline {
            origin: camera.position,
            direction: camera.direction,
            up: camera.up,
            frustum: camera.frustum,
            color: Color::YELLOW.with_alpha(FRUSTUM_OUTLINE_ALPHA),
        })?;
        self.frustum_outline = Some(key);
        Ok(())
    }

    // ===== TEARDOWN =====

    /// Remove every visual and hand the occlusion slot back. Idempotent.
    ///
    /// Against a destroyed host only the in-memory state is reset. Host
    /// errors are logged, never returned.
    pub fn destroy(&mut self) {
        let entities = self.entities();
        self.visible_patches.clear();
        self.visible_outlines.clear();
        self.occluded_patches.clear();
        self.occluded_outlines.clear();
        let primitive = self.frustum_outline.take();
        let shadow_map = self.shadow_map.take();
        let previous_slot = self.previous_slot.take();

        if entities.is_empty() && primitive.is_none() && shadow_map.is_none() {
            return;
        }

        let mut host = match lock_scene(&self.scene) {
            Ok(host) => host,
            Err(e) => {
                crate::geovis_warn!("geovis::Viewshed", "Viewshed state reset without host: {}", e);
                return;
            }
        };
        if host.is_destroyed() {
            crate::geovis_warn!("geovis::Viewshed", "Scene already destroyed, viewshed state reset");
            return;
        }

        if let Some(key) = primitive {
            if let Err(e) = host.remove_primitive(key) {
                crate::geovis_warn!("geovis::Viewshed", "Failed to remove frustum outline: {}", e);
            }
        }
        for key in entities {
            if let Err(e) = host.remove_entity(key) {
                crate::geovis_warn!("geovis::Viewshed", "Failed to remove viewshed entity: {}", e);
            }
        }
        if let Some(key) = shadow_map {
            if let Err(e) = host.set_shadow_map_slot(previous_slot.flatten()) {
                crate::geovis_warn!("geovis::Viewshed", "Failed to restore shadow map slot: {}", e);
                let _ = host.set_shadow_map_slot(None);
            }
            if let Err(e) = host.destroy_shadow_map(key) {
                crate::geovis_warn!("geovis::Viewshed", "Failed to destroy shadow map: {}", e);
            }
        }
    }
}

impl Drop for ViewshedAnalysis {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn patch(hierarchy: Vec<DVec3>, material: SurfaceMaterial) -> EntityDesc {
    EntityDesc {
        polygon: Some(PolygonGraphics { hierarchy, per_position_height: true, material }),
        ..EntityDesc::default()
    }
}

fn outline(positions: Vec<DVec3>, color: Color) -> EntityDesc {
    EntityDesc {
        polyline: Some(PolylineGraphics {
            positions: Property::Constant(positions),
            width: OUTLINE_WIDTH,
            material: SurfaceMaterial::color(color),
            clamp_to_ground: true,
        }),
        ..EntityDesc::default()
    }
}

#[cfg(test)]
#[path = "viewshed_tests.rs"]
mod tests;
