//! Primitive geometry and materials
//!
//! Pure constructors for the shapes the scene is built from (sphere,
//! cylinder, cone, torus, box, plane) plus tessellation into indexed
//! triangle lists. Geometry is immutable once created and shared by id
//! through the `GeometryLibrary`.
//!
//! Conventions:
//! - Cylinders and cones are centered on the origin along the Y axis
//! - Cone apex points towards +Y
//! - Tori lie in the XY plane, the arc starting at +X and sweeping towards +Y
//! - Planes lie in the XY plane facing +Z

use macroquad::color::Color;
use macroquad::math::Vec3;
use std::f32::consts::{PI, TAU};
use std::fmt;

/// Parametric description of a primitive shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
        height_segments: u32,
        top_cap: bool,
        bottom_cap: bool,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
        arc: f32,
    },
    Cuboid {
        width: f32,
        height: f32,
        depth: f32,
    },
    Plane {
        width: f32,
        height: f32,
    },
}

impl Geometry {
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Geometry::Sphere { radius, width_segments, height_segments }
    }

    /// Straight cylinder with optional caps
    pub fn cylinder(radius: f32, height: f32, radial_segments: u32, height_segments: u32, top_cap: bool, bottom_cap: bool) -> Self {
        Geometry::Cylinder {
            radius_top: radius,
            radius_bottom: radius,
            height,
            radial_segments,
            height_segments,
            top_cap,
            bottom_cap,
        }
    }

    /// Cone (cylinder with a zero top radius), optional base cap
    pub fn cone(radius: f32, height: f32, radial_segments: u32, height_segments: u32, bottom_cap: bool) -> Self {
        Geometry::Cylinder {
            radius_top: 0.0,
            radius_bottom: radius,
            height,
            radial_segments,
            height_segments,
            top_cap: false,
            bottom_cap,
        }
    }

    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32, arc: f32) -> Self {
        Geometry::Torus { radius, tube, radial_segments, tubular_segments, arc }
    }

    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Geometry::Cuboid { width, height, depth }
    }

    pub fn plane(width: f32, height: f32) -> Self {
        Geometry::Plane { width, height }
    }

    /// Build the indexed triangle list for this shape.
    /// Segment counts are clamped to the minimum that still forms a closed shape.
    pub fn tessellate(&self) -> MeshData {
        match *self {
            Geometry::Sphere { radius, width_segments, height_segments } => {
                tessellate_sphere(radius, width_segments.max(3), height_segments.max(2))
            }
            Geometry::Cylinder { radius_top, radius_bottom, height, radial_segments, height_segments, top_cap, bottom_cap } => {
                tessellate_cylinder(
                    radius_top,
                    radius_bottom,
                    height,
                    radial_segments.max(3),
                    height_segments.max(1),
                    top_cap,
                    bottom_cap,
                )
            }
            Geometry::Torus { radius, tube, radial_segments, tubular_segments, arc } => {
                tessellate_torus(radius, tube, radial_segments.max(3), tubular_segments.max(3), arc)
            }
            Geometry::Cuboid { width, height, depth } => tessellate_cuboid(width, height, depth),
            Geometry::Plane { width, height } => tessellate_plane(width, height),
        }
    }
}

/// Tessellated geometry in local space
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[cfg(test)]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push(&mut self, position: Vec3, normal: Vec3) -> u32 {
        self.positions.push(position);
        self.normals.push(normal);
        (self.positions.len() - 1) as u32
    }

    fn tri(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }
}

fn tessellate_sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let row = width_segments + 1;

    for iy in 0..=height_segments {
        let phi = iy as f32 / height_segments as f32 * PI;
        for ix in 0..=width_segments {
            let theta = ix as f32 / width_segments as f32 * TAU;
            let normal = Vec3::new(-theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin());
            mesh.push(normal * radius, normal);
        }
    }

    // Pole rows collapse to a single point, so only one triangle per quad there
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                mesh.tri(a, b, d);
            }
            if iy != height_segments - 1 {
                mesh.tri(b, c, d);
            }
        }
    }

    mesh
}

fn tessellate_cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
    height_segments: u32,
    top_cap: bool,
    bottom_cap: bool,
) -> MeshData {
    let mut mesh = MeshData::default();
    let half = height / 2.0;
    let row = radial_segments + 1;
    let slope = if height.abs() > f32::EPSILON { (radius_bottom - radius_top) / height } else { 0.0 };

    // Side wall, top ring first
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let radius = v * (radius_bottom - radius_top) + radius_top;
        for ix in 0..=radial_segments {
            let theta = ix as f32 / radial_segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            let position = Vec3::new(radius * sin, half - v * height, radius * cos);
            let normal = Vec3::new(sin, slope, cos).normalize();
            mesh.push(position, normal);
        }
    }

    for iy in 0..height_segments {
        for ix in 0..radial_segments {
            let a = iy * row + ix;
            let b = (iy + 1) * row + ix;
            let c = (iy + 1) * row + ix + 1;
            let d = iy * row + ix + 1;
            mesh.tri(a, b, d);
            mesh.tri(b, c, d);
        }
    }

    if top_cap && radius_top > 0.0 {
        push_cap(&mut mesh, radius_top, half, radial_segments, true);
    }
    if bottom_cap && radius_bottom > 0.0 {
        push_cap(&mut mesh, radius_bottom, -half, radial_segments, false);
    }

    mesh
}

fn push_cap(mesh: &mut MeshData, radius: f32, y: f32, radial_segments: u32, top: bool) {
    let normal = if top { Vec3::Y } else { Vec3::NEG_Y };
    let center = mesh.push(Vec3::new(0.0, y, 0.0), normal);
    let first = center + 1;

    for ix in 0..=radial_segments {
        let theta = ix as f32 / radial_segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        mesh.push(Vec3::new(radius * sin, y, radius * cos), normal);
    }

    for ix in 0..radial_segments {
        let (a, b) = (first + ix, first + ix + 1);
        if top {
            mesh.tri(a, b, center);
        } else {
            mesh.tri(b, a, center);
        }
    }
}

fn tessellate_torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32, arc: f32) -> MeshData {
    let mut mesh = MeshData::default();
    let row = tubular_segments + 1;

    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * arc;
            let ring = radius + tube * v.cos();
            let position = Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin());
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            mesh.push(position, (position - center).normalize_or_zero());
        }
    }

    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            mesh.tri(a, b, d);
            mesh.tri(b, c, d);
        }
    }

    mesh
}

fn tessellate_cuboid(width: f32, height: f32, depth: f32) -> MeshData {
    let (hx, hy, hz) = (width / 2.0, height / 2.0, depth / 2.0);
    let mut mesh = MeshData::default();

    // (normal, u axis, v axis) per face; corners are normal +/- u +/- v
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    ];
    let half = Vec3::new(hx, hy, hz);

    for (normal, u, v) in faces {
        let base = mesh.positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let corner = normal + u * su + v * sv;
            mesh.push(corner * half, normal);
        }
        mesh.tri(base, base + 1, base + 2);
        mesh.tri(base, base + 2, base + 3);
    }

    mesh
}

fn tessellate_plane(width: f32, height: f32) -> MeshData {
    let (hw, hh) = (width / 2.0, height / 2.0);
    let mut mesh = MeshData::default();
    for (x, y) in [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)] {
        mesh.push(Vec3::new(x, y, 0.0), Vec3::Z);
    }
    mesh.tri(0, 1, 2);
    mesh.tri(0, 2, 3);
    mesh
}

/// Handle into a `GeometryLibrary`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(u32);

impl GeometryId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "geometry#{}", self.0)
    }
}

/// Append-only store of shared geometry
#[derive(Debug, Default)]
pub struct GeometryLibrary {
    entries: Vec<Geometry>,
}

impl GeometryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, geometry: Geometry) -> GeometryId {
        self.entries.push(geometry);
        GeometryId((self.entries.len() - 1) as u32)
    }

    pub fn get(&self, id: GeometryId) -> Option<&Geometry> {
        self.entries.get(id.index())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Surface appearance of a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
}

impl Material {
    /// Lit material with a flat base color
    pub fn standard(color: Color) -> Self {
        Self { color }
    }
}

/// Named colors used by the scene
pub mod palette {
    use macroquad::color::Color;

    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const RED: Color = Color { r: 1.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const BROWN: Color = Color { r: 0.647, g: 0.165, b: 0.165, a: 1.0 };
    pub const ORANGE: Color = Color { r: 1.0, g: 0.647, b: 0.0, a: 1.0 };

    /// Look up a color by name (case-insensitive)
    pub fn named(name: &str) -> Option<Color> {
        match name.to_ascii_lowercase().as_str() {
            "white" => Some(WHITE),
            "black" => Some(BLACK),
            "red" => Some(RED),
            "brown" => Some(BROWN),
            "orange" => Some(ORANGE),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_indices_in_range(mesh: &MeshData) {
        let count = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
        assert_eq!(mesh.indices.len() % 3, 0);
        assert_eq!(mesh.positions.len(), mesh.normals.len());
    }

    #[test]
    fn test_sphere_counts_and_radius() {
        let mesh = Geometry::sphere(0.01, 8, 8).tessellate();

        assert_eq!(mesh.vertex_count(), 81);
        // Pole rows contribute one triangle per quad
        assert_eq!(mesh.triangle_count(), 8 * (2 * 8 - 2));
        assert!(mesh.positions.iter().all(|p| (p.length() - 0.01).abs() < 1e-5));
        assert_indices_in_range(&mesh);
    }

    #[test]
    fn test_cylinder_caps() {
        let open = Geometry::cylinder(0.07, 0.7, 16, 16, false, false).tessellate();
        let capped = Geometry::cylinder(0.07, 0.7, 16, 16, true, false).tessellate();

        assert_eq!(open.vertex_count(), 17 * 17);
        assert_eq!(capped.vertex_count(), 17 * 17 + 1 + 17);
        assert_eq!(capped.triangle_count(), open.triangle_count() + 16);
        assert_indices_in_range(&capped);

        let max_y = capped.positions.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        let min_y = capped.positions.iter().map(|p| p.y).fold(f32::MAX, f32::min);
        assert!((max_y - 0.35).abs() < 1e-5);
        assert!((min_y + 0.35).abs() < 1e-5);
    }

    #[test]
    fn test_cone_apex_points_up() {
        let mesh = Geometry::cone(0.15, 0.6, 16, 16, true).tessellate();
        let top = mesh.positions.iter().filter(|p| (p.y - 0.3).abs() < 1e-5);

        assert!(top.clone().count() > 0);
        assert!(top.into_iter().all(|p| p.x.abs() < 1e-5 && p.z.abs() < 1e-5));
        assert_indices_in_range(&mesh);
    }

    #[test]
    fn test_half_torus_stays_above_x_axis() {
        let mesh = Geometry::torus(0.2, 0.05, 16, 32, PI).tessellate();

        assert_eq!(mesh.vertex_count(), 17 * 33);
        assert!(mesh.positions.iter().all(|p| p.y >= -0.051));
        assert_indices_in_range(&mesh);
    }

    #[test]
    fn test_cuboid_extents() {
        let mesh = Geometry::cuboid(0.1, 0.1, 0.5).tessellate();

        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.positions.iter().all(|p| p.x.abs() <= 0.0501 && p.z.abs() <= 0.2501));
        assert!(mesh.positions.iter().any(|p| (p.z - 0.25).abs() < 1e-5));
    }

    #[test]
    fn test_plane_faces_z() {
        let mesh = Geometry::plane(10.0, 10.0).tessellate();

        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.normals.iter().all(|n| *n == Vec3::Z));
        assert!(mesh.positions.iter().all(|p| p.z == 0.0 && p.x.abs() == 5.0));
    }

    #[test]
    fn test_degenerate_segments_are_clamped() {
        let mesh = Geometry::sphere(1.0, 0, 0).tessellate();
        assert_eq!(mesh.vertex_count(), 4 * 3);
        assert_indices_in_range(&mesh);
    }

    #[test]
    fn test_library_ids() {
        let mut library = GeometryLibrary::new();
        let a = library.insert(Geometry::plane(1.0, 1.0));
        let b = library.insert(Geometry::cuboid(1.0, 1.0, 1.0));

        assert_ne!(a, b);
        assert_eq!(library.len(), 2);
        assert_eq!(library.get(b), Some(&Geometry::cuboid(1.0, 1.0, 1.0)));
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(palette::named("Brown"), Some(palette::BROWN));
        assert_eq!(palette::named("WHITE"), Some(palette::WHITE));
        assert_eq!(palette::named("Chartreuse"), None);
    }
}
