/// PositionMarker - a draggable point that reports where it sits.
///
/// The marker entity reads its position through a callback, so dragging
/// only updates shared state. A post-render hook keeps the screen anchor
/// of the overlay readout in sync with the camera.

use std::sync::{Arc, Mutex};
use glam::{DVec2, DVec3};
use crate::error::Result;
use crate::geodesy::round_to;
use crate::host::{
    lock_scene, BillboardGraphics, EntityDesc, EntityKey, FrameEvent, PickedObject,
    PointGraphics, PositionSource, SceneHandle, SceneHost, Subscription,
};

/// Overlay sits this far above the marker, in pixels
const OVERLAY_OFFSET_PX: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct PositionMarkerOptions {
    /// Billboard image; a yellow point when `None`
    pub image: Option<String>,
    /// Billboard size in pixels
    pub size: f64,
    pub enable_dragging: bool,
}

impl Default for PositionMarkerOptions {
    fn default() -> Self {
        Self {
            image: None,
            size: 32.0,
            enable_dragging: true,
        }
    }
}

/// Lon/lat in degrees (6 decimals) and height in meters (2 decimals).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerReadout {
    pub lon: f64,
    pub lat: f64,
    pub height: f64,
}

/// Where to draw the overlay: `pixel` is the marker on the canvas,
/// `bottom` the overlay's distance from the canvas bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenAnchor {
    pub pixel: DVec2,
    pub bottom: f64,
}

#[derive(Debug)]
struct MarkerShared {
    position: DVec3,
    anchor: Option<ScreenAnchor>,
}

type UpdateCallback = Box<dyn FnMut(DVec3) + Send>;
type RemoveCallback = Box<dyn FnOnce() + Send>;

pub struct PositionMarker {
    scene: SceneHandle,
    options: PositionMarkerOptions,
    shared: Arc<Mutex<MarkerShared>>,
    entity: Option<EntityKey>,
    post_render: Subscription,
    dragging: bool,
    on_update: Option<UpdateCallback>,
    on_remove: Option<RemoveCallback>,
}

impl PositionMarker {
    /// Add the marker entity and its post-render hook.
    pub fn new(scene: SceneHandle, position: DVec3, options: PositionMarkerOptions) -> Result<Self> {
        let shared = Arc::new(Mutex::new(MarkerShared { position, anchor: None }));

        let (entity, hook) = {
            let mut host = lock_scene(&scene)?;

            let reader = Arc::clone(&shared);
            let mut desc = EntityDesc::named("PositionMarker");
            desc.position = Some(PositionSource::callback(move |_| {
                reader.lock().ok().map(|s| s.position)
            }));
            match &options.image {
                Some(image) => {
                    desc.billboard = Some(BillboardGraphics { image: image.clone(), scale: options.size / 32.0 });
                }
                None => desc.point = Some(PointGraphics::default()),
            }
            let entity = host.add_entity(desc)?;

            let writer = Arc::clone(&shared);
            let hook = host.subscribe(
                FrameEvent::PostRender,
                Box::new(move |host: &mut dyn SceneHost| {
                    if let Ok(mut state) = writer.lock() {
                        state.anchor = anchor_for(host, state.position);
                    }
                }),
            );
            match hook {
                Ok(hook) => (entity, hook),
                Err(e) => {
                    let _ = host.remove_entity(entity);
                    return Err(e);
                }
            }
        };

        crate::geovis_debug!("geovis::Marker", "Position marker placed");

        Ok(Self {
            scene,
            options,
            shared,
            entity: Some(entity),
            post_render: Subscription::new(hook),
            dragging: false,
            on_update: None,
            on_remove: None,
        })
    }

    pub fn entity(&self) -> Option<EntityKey> {
        self.entity
    }

    pub fn is_removed(&self) -> bool {
        self.entity.is_none()
    }

    pub fn position(&self) -> Option<DVec3> {
        self.shared.lock().ok().map(|s| s.position)
    }

    /// Called with the new position after every move.
    pub fn on_update<F: FnMut(DVec3) + Send + 'static>(&mut self, callback: F) {
        self.on_update = Some(Box::new(callback));
    }

    /// Called once when the marker is removed.
    pub fn on_remove<F: FnOnce() + Send + 'static>(&mut self, callback: F) {
        self.on_remove = Some(Box::new(callback));
    }

    pub fn set_position(&mut self, position: DVec3) {
        if let Ok(mut state) = self.shared.lock() {
            state.position = position;
        }
        if let Some(callback) = self.on_update.as_mut() {
            callback(position);
        }
    }

    /// Rounded geodetic readout of the current position.
    pub fn readout(&self) -> Option<MarkerReadout> {
        let position = self.position()?;
        let host = lock_scene(&self.scene).ok()?;
        let carto = host.ellipsoid().cartesian_to_cartographic(position)?;
        Some(MarkerReadout {
            lon: round_to(carto.longitude_degrees(), 6),
            lat: round_to(carto.latitude_degrees(), 6),
            height: round_to(carto.height, 2),
        })
    }

    /// Overlay placement computed by the last rendered frame.
    pub fn screen_anchor(&self) -> Option<ScreenAnchor> {
        self.shared.lock().ok().and_then(|s| s.anchor)
    }

    // ===== DRAGGING =====

    /// Start dragging when `pixel` lands on this marker.
    pub fn begin_drag(&mut self, pixel: DVec2) -> bool {
        if !self.options.enable_dragging {
            return false;
        }
        let Some(entity) = self.entity else {
            return false;
        };
        let Ok(host) = lock_scene(&self.scene) else {
            return false;
        };
        self.dragging = host.pick(pixel) == Some(PickedObject::Entity(entity));
        self.dragging
    }

    /// Move to the terrain under `pixel`. Ignored while not dragging or
    /// when the ray misses the globe.
    pub fn drag_to(&mut self, pixel: DVec2) -> Option<DVec3> {
        if !self.dragging {
            return None;
        }
        let position = {
            let host = lock_scene(&self.scene).ok()?;
            let ray = host.camera().pick_ray(pixel, host.canvas_size());
            host.globe_pick(&ray)?
        };
        self.set_position(position);
        Some(position)
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    // ===== TEARDOWN =====

    /// Remove the entity and hook. Idempotent.
    pub fn remove(&mut self) {
        let Some(entity) = self.entity.take() else {
            return;
        };
        self.dragging = false;

        match lock_scene(&self.scene) {
            Ok(mut host) if !host.is_destroyed() => {
                self.post_render.release(&mut *host);
                if let Err(e) = host.remove_entity(entity) {
                    crate::geovis_warn!("geovis::Marker", "Failed to remove marker entity: {}", e);
                }
            }
            _ => self.post_render.forget(),
        }

        if let Some(callback) = self.on_remove.take() {
            callback();
        }
    }
}

impl Drop for PositionMarker {
    fn drop(&mut self) {
        self.remove();
    }
}

fn anchor_for(host: &dyn SceneHost, position: DVec3) -> Option<ScreenAnchor> {
    let pixel = host.cartesian_to_canvas(position)?;
    Some(ScreenAnchor {
        pixel,
        bottom: host.canvas_size().y - pixel.y + OVERLAY_OFFSET_PX,
    })
}

#[cfg(test)]
#[path = "position_marker_tests.rs"]
mod tests;
