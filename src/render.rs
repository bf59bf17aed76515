//! Scene renderer
//!
//! The frame loop talks to a `Renderer` and never to macroquad directly, so
//! it can be driven by a recording double in tests.
//!
//! `MacroquadRenderer` tessellates each geometry once and keeps a GPU-ready
//! mesh per `GeometryId`. Every draw rewrites that mesh's vertices in place:
//! positions go to world space on the CPU and colours are baked with a
//! per-vertex Lambert term (Gouraud style), so no shader is needed.

use std::collections::HashMap;
use std::fmt;
use macroquad::camera::{set_camera, set_default_camera};
use macroquad::color::{Color, BLUE, GREEN, RED, WHITE};
use macroquad::math::Vec3;
use macroquad::models::{draw_line_3d, draw_mesh, Mesh, Vertex};
use macroquad::text::draw_text;
use macroquad::window::clear_background;
use crate::camera::SceneCamera;
use crate::config::RenderConfig;
use crate::geometry::{GeometryId, GeometryLibrary, MeshData};
use crate::scene::{GlobalTransform, Light, SceneGraph};

/// Per draw call capacity requested from macroquad in the window config.
/// macroquad clamps (and so cuts holes in) any single mesh bigger than this.
/// Both stay under the 16-bit index limit.
pub const DRAW_CALL_VERTEX_CAPACITY: usize = 16_384;
pub const DRAW_CALL_INDEX_CAPACITY: usize = 32_768;

/// Banner anchor, pixels from the top-left corner
const BANNER_X: f32 = 10.0;
const BANNER_Y: f32 = 10.0;

/// Error type for a render pass
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A mesh node points at geometry the scene does not own
    UnknownGeometry(GeometryId),
    /// Tessellation does not fit one draw call
    MeshTooLarge { vertices: usize, indices: usize },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::UnknownGeometry(id) => write!(f, "unknown geometry {}", id),
            RenderError::MeshTooLarge { vertices, indices } => write!(
                f,
                "mesh too large ({} vertices, {} indices; draw call limit {} vertices, {} indices)",
                vertices, indices, DRAW_CALL_VERTEX_CAPACITY, DRAW_CALL_INDEX_CAPACITY
            ),
        }
    }
}

impl std::error::Error for RenderError {}

/// Check that a tessellation can be drawn in a single macroquad draw call
pub fn check_draw_call(data: &MeshData) -> Result<(), RenderError> {
    let vertices = data.vertex_count();
    let indices = data.indices.len();
    if vertices > DRAW_CALL_VERTEX_CAPACITY || indices > DRAW_CALL_INDEX_CAPACITY {
        return Err(RenderError::MeshTooLarge { vertices, indices });
    }
    Ok(())
}

/// Drawing backend used by the frame loop
pub trait Renderer {
    /// Clear color, depth and stencil
    fn clear_buffers(&mut self);
    /// Draw every mesh in the scene through the camera
    fn render(&mut self, scene: &SceneGraph, camera: &SceneCamera) -> Result<(), RenderError>;
    /// Restrict drawing to a pixel rectangle of the output surface
    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
}

/// Scene lights flattened for shading, colours premultiplied by intensity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightRig {
    ambient: Vec3,
    points: Vec<(Vec3, Vec3)>,
}

fn rgb(color: Color) -> Vec3 {
    Vec3::new(color.r, color.g, color.b)
}

impl LightRig {
    pub fn from_lights(lights: &[Light]) -> Self {
        let mut rig = Self::default();
        for light in lights {
            match *light {
                Light::Ambient { color, intensity } => rig.ambient += rgb(color) * intensity,
                Light::Point { color, intensity, position } => {
                    rig.points.push((position, rgb(color) * intensity))
                }
            }
        }
        rig
    }

    pub fn from_scene(scene: &SceneGraph) -> Self {
        Self::from_lights(&scene.lights())
    }

    /// Light reaching a surface point, per channel, clamped to 1.0
    pub fn shade(&self, normal: Vec3, world_pos: Vec3) -> Vec3 {
        let mut total = self.ambient;
        for &(position, color) in &self.points {
            let to_light = position - world_pos;
            let dist = to_light.length();
            if dist < 0.001 {
                continue;
            }
            let n_dot_l = normal.dot(to_light / dist).max(0.0);
            total += color * (n_dot_l / (1.0 + dist + dist * dist));
        }
        total.min(Vec3::ONE)
    }

    /// Base colour lit at a surface point, alpha untouched
    pub fn lit_color(&self, base: Color, normal: Vec3, world_pos: Vec3) -> Color {
        let light = self.shade(normal, world_pos);
        Color::new(base.r * light.x, base.g * light.y, base.b * light.z, base.a)
    }
}

/// Tessellated geometry plus the GPU mesh rewritten for every node using it
pub struct CachedMesh {
    data: MeshData,
    mesh: Mesh,
}

impl CachedMesh {
    fn build(data: MeshData) -> Result<Self, RenderError> {
        check_draw_call(&data)?;
        let indices = data.indices.iter().map(|&i| i as u16).collect();
        let vertices = vec![Vertex::new(0.0, 0.0, 0.0, 0.0, 0.0, WHITE); data.vertex_count()];
        Ok(Self {
            data,
            mesh: Mesh { vertices, indices, texture: None },
        })
    }

    /// Move vertices into world space and bake lighting into their colours
    pub fn prepare(&mut self, world: &GlobalTransform, base: Color, lights: &LightRig) -> &Mesh {
        let normal_matrix = world.normal_matrix();
        let positions = self.data.positions.iter();
        let normals = self.data.normals.iter();
        for ((vertex, &local), &normal) in self.mesh.vertices.iter_mut().zip(positions).zip(normals) {
            let p = world.transform_point(local);
            let n = (normal_matrix * normal).normalize_or_zero();
            *vertex = Vertex::new(p.x, p.y, p.z, 0.0, 0.0, lights.lit_color(base, n, p));
        }
        &self.mesh
    }

    #[cfg(test)]
    pub fn vertex_count(&self) -> usize {
        self.data.vertex_count()
    }
}

/// Per-geometry tessellation cache
#[derive(Default)]
pub struct MeshCache {
    entries: HashMap<GeometryId, CachedMesh>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached mesh for `id`, tessellating on first use
    pub fn get_or_build(&mut self, library: &GeometryLibrary, id: GeometryId) -> Result<&mut CachedMesh, RenderError> {
        if !self.entries.contains_key(&id) {
            let geometry = library.get(id).ok_or(RenderError::UnknownGeometry(id))?;
            let cached = CachedMesh::build(geometry.tessellate())?;
            self.entries.insert(id, cached);
        }
        self.entries.get_mut(&id).ok_or(RenderError::UnknownGeometry(id))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Renderer drawing through macroquad's immediate-mode GPU path
pub struct MacroquadRenderer {
    clear_color: Color,
    viewport: Option<(i32, i32, i32, i32)>,
    cache: MeshCache,
    /// Lights never change after the scene is built; rebuilt only if the count does
    lights: Option<(usize, LightRig)>,
    axes_size: Option<f32>,
    banner: Option<String>,
    banner_font_size: f32,
}

impl MacroquadRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        let [r, g, b] = config.clear_color;
        Self {
            clear_color: Color::new(r, g, b, 1.0),
            viewport: None,
            cache: MeshCache::new(),
            lights: None,
            axes_size: config.show_axes.then_some(config.axes_size),
            banner: config.banner.clone(),
            banner_font_size: config.banner_font_size,
        }
    }

    fn draw_axes(size: f32) {
        draw_line_3d(Vec3::ZERO, Vec3::X * size, RED);
        draw_line_3d(Vec3::ZERO, Vec3::Y * size, GREEN);
        draw_line_3d(Vec3::ZERO, Vec3::Z * size, BLUE);
    }

    fn draw_banner(&self) {
        if let Some(text) = &self.banner {
            // draw_text takes the baseline, so push down by the font size
            draw_text(text, BANNER_X, BANNER_Y + self.banner_font_size, self.banner_font_size, WHITE);
        }
    }
}

impl Renderer for MacroquadRenderer {
    fn clear_buffers(&mut self) {
        clear_background(self.clear_color);
    }

    fn render(&mut self, scene: &SceneGraph, camera: &SceneCamera) -> Result<(), RenderError> {
        set_camera(&camera.to_camera3d(self.viewport));

        let light_count = scene.light_count();
        if self.lights.as_ref().is_some_and(|(count, _)| *count != light_count) {
            self.lights = None;
        }
        let lights = &self.lights.get_or_insert_with(|| (light_count, LightRig::from_scene(scene))).1;

        let mut result = Ok(());
        for visit in scene.traverse() {
            match self.cache.get_or_build(scene.geometries(), visit.mesh.geometry) {
                Ok(cached) => draw_mesh(cached.prepare(&visit.world, visit.mesh.material.color, lights)),
                // Keep drawing the rest; report the first failure
                Err(e) => {
                    if result.is_ok() {
                        result = Err(e);
                    }
                }
            }
        }

        if let Some(size) = self.axes_size {
            Self::draw_axes(size);
        }

        set_default_camera();
        self.draw_banner();
        result
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.viewport = Some((x, y, width, height));
    }
}
