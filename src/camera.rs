//! Camera and orbit control
//!
//! `SceneCamera` is the perspective camera the renderer draws through.
//! `OrbitControl` keeps the camera on a sphere around a target point and is
//! driven by mouse input (drag to orbit, wheel to zoom).

use macroquad::camera::{Camera3D, Projection};
use macroquad::input::{is_mouse_button_down, mouse_position, mouse_wheel, MouseButton};
use macroquad::math::Vec3;
use crate::config::CameraConfig;

/// Elevation limit so the camera never flips over the poles
const MAX_ELEVATION: f32 = 1.4;

/// Perspective camera state
#[derive(Debug, Clone, PartialEq)]
pub struct SceneCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fovy: f32,
    /// Width / height of the output surface
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl SceneCamera {
    pub fn new(position: Vec3, target: Vec3, fovy: f32) -> Self {
        Self {
            position,
            target,
            up: Vec3::Y,
            fovy,
            aspect: 1.0,
            near: 0.01,
            far: 1000.0,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self::new(
            Vec3::from(config.position),
            Vec3::from(config.target),
            config.fovy_degrees.to_radians(),
        );
        camera.near = config.near;
        camera.far = config.far;
        camera
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Build the macroquad camera, optionally restricted to a pixel viewport
    pub fn to_camera3d(&self, viewport: Option<(i32, i32, i32, i32)>) -> Camera3D {
        Camera3D {
            position: self.position,
            target: self.target,
            up: self.up,
            fovy: self.fovy,
            aspect: Some(self.aspect),
            projection: Projection::Perspective,
            viewport,
            z_near: self.near,
            z_far: self.far,
            ..Default::default()
        }
    }
}

/// Orbit state around a target (spherical coordinates)
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControl {
    pub target: Vec3,
    /// Horizontal angle, radians (0 = looking down -Z from +Z)
    pub azimuth: f32,
    /// Vertical angle, radians
    pub elevation: f32,
    pub distance: f32,
    rotate_speed: f32,
    zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,
}

impl OrbitControl {
    /// Derive orbit state from the camera's current placement
    pub fn from_camera(camera: &SceneCamera, config: &CameraConfig) -> Self {
        let offset = camera.position - camera.target;
        let distance = offset.length().max(config.orbit_min_distance);
        let elevation = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let azimuth = offset.x.atan2(offset.z);

        Self {
            target: camera.target,
            azimuth,
            elevation,
            distance,
            rotate_speed: config.orbit_rotate_speed,
            zoom_speed: config.orbit_zoom_speed,
            min_distance: config.orbit_min_distance,
            max_distance: config.orbit_max_distance.max(distance),
        }
    }

    /// Orbit by a mouse delta in pixels
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.azimuth -= dx * self.rotate_speed;
        self.elevation = (self.elevation + dy * self.rotate_speed).clamp(-MAX_ELEVATION, MAX_ELEVATION);
    }

    /// Zoom by wheel steps (positive = closer)
    pub fn zoom(&mut self, steps: f32) {
        self.distance = (self.distance * (1.0 - steps * self.zoom_speed))
            .clamp(self.min_distance, self.max_distance);
    }

    /// Camera position for the current orbit state
    pub fn eye(&self) -> Vec3 {
        let (sin_el, cos_el) = self.elevation.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        self.target + Vec3::new(cos_el * sin_az, sin_el, cos_el * cos_az) * self.distance
    }

    /// Move the camera to the orbit position, looking at the target
    pub fn apply(&self, camera: &mut SceneCamera) {
        let eye = self.eye();
        camera.set_position(eye.x, eye.y, eye.z);
        camera.look_at(self.target);
    }
}

/// Mouse tracking for the orbit control
#[derive(Debug, Default)]
pub struct OrbitInput {
    /// None until the first mouse read
    last_mouse: Option<(f32, f32)>,
}

impl OrbitInput {
    /// Read host input and update the orbit (left drag orbits, wheel zooms)
    pub fn update(&mut self, orbit: &mut OrbitControl, camera: &mut SceneCamera) {
        let mut changed = false;

        if let Some((dx, dy)) = self.drag_delta(mouse_position(), is_mouse_button_down(MouseButton::Left)) {
            orbit.rotate(dx, dy);
            changed = true;
        }

        let scroll = mouse_wheel().1;
        if scroll.abs() > 0.1 {
            orbit.zoom(scroll.signum());
            changed = true;
        }

        if changed {
            orbit.apply(camera);
        }
    }

    /// Mouse movement since the previous read while the button is held.
    /// The first read only records the position.
    fn drag_delta(&mut self, mouse: (f32, f32), pressed: bool) -> Option<(f32, f32)> {
        let (last_x, last_y) = self.last_mouse.replace(mouse)?;
        let delta = (mouse.0 - last_x, mouse.1 - last_y);
        (pressed && delta != (0.0, 0.0)).then_some(delta)
    }
}
