//! Snowman composites
//!
//! Builds the figure part by part. Each `build_*` function creates the mesh
//! nodes for one composite shape and attaches them straight to the scene
//! root; the grouping has no identity once attached.
//!
//! Fingers take their Z rotation from the arm after the arm is placed. This
//! is a value copy at build time, not a live parent-child link.

use macroquad::math::Vec3;
use std::f32::consts::PI;
use crate::geometry::{palette, Geometry, Material};
use crate::scene::{Light, MeshNode, NodeId, SceneGraph, Transform};

const FINGERS_PER_HAND: usize = 3;

/// Placement of one arm and its fingers
#[derive(Debug, Clone, Copy)]
pub struct ArmPlacement {
    pub position: Vec3,
    pub rotation_z: f32,
    /// Position of the first finger; the rest step back along Z
    pub finger_origin: Vec3,
    pub finger_spacing: f32,
}

impl ArmPlacement {
    pub const LEFT: ArmPlacement = ArmPlacement {
        position: Vec3::new(-0.8, 0.5, 0.0),
        rotation_z: PI / 3.75,
        finger_origin: Vec3::new(-1.20, 0.90, 0.08),
        finger_spacing: 0.1,
    };

    pub const RIGHT: ArmPlacement = ArmPlacement {
        position: Vec3::new(0.8, 0.5, 0.0),
        rotation_z: -PI / 3.75,
        finger_origin: Vec3::new(1.22, 0.95, 0.10),
        finger_spacing: 0.1,
    };
}

/// What `build` attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub meshes: usize,
    pub lights: usize,
}

fn add_mesh(graph: &mut SceneGraph, geometry: Geometry, color: macroquad::color::Color, transform: Transform) -> NodeId {
    let geometry = graph.add_geometry(geometry);
    graph.attach(MeshNode::new(geometry, Material::standard(color), transform))
}

fn at(x: f32, y: f32, z: f32) -> Transform {
    Transform::from_position(Vec3::new(x, y, z))
}

/// Build the complete figure, floor and lights
pub fn build(graph: &mut SceneGraph) -> BuildSummary {
    let meshes_before = graph.mesh_count();
    let lights_before = graph.light_count();

    build_body(graph);
    build_arm(graph, &ArmPlacement::LEFT);
    build_arm(graph, &ArmPlacement::RIGHT);
    build_head(graph);
    build_scarf(graph);
    build_bottom(graph);
    build_face(graph);
    build_buttons(graph);
    build_hat(graph);
    build_lights(graph);
    build_floor(graph);

    BuildSummary {
        meshes: graph.mesh_count() - meshes_before,
        lights: graph.light_count() - lights_before,
    }
}

pub fn build_body(graph: &mut SceneGraph) -> NodeId {
    add_mesh(graph, Geometry::sphere(1.0, 32, 32), palette::WHITE, Transform::IDENTITY)
}

/// One stick arm plus three fingers fanned around its tip; returns the arm and its fingers
pub fn build_arm(graph: &mut SceneGraph, placement: &ArmPlacement) -> (NodeId, [NodeId; FINGERS_PER_HAND]) {
    let mut arm_transform = Transform::from_position(placement.position).with_scale(Vec3::new(1.0, 1.7, 1.0));
    arm_transform.set_rotation_z(placement.rotation_z);
    let arm = add_mesh(
        graph,
        Geometry::cylinder(0.07, 0.7, 16, 16, true, false),
        palette::BROWN,
        arm_transform,
    );

    // Read back what was attached: fingers follow the arm as placed
    let arm_rotation_z = graph.mesh(arm).map(|m| m.transform.rotation.z).unwrap_or(placement.rotation_z);

    let finger_geometry = graph.add_geometry(Geometry::cylinder(0.03, 0.3, 16, 16, true, false));
    let material = Material::standard(palette::BROWN);
    let mut fingers = [NodeId::ROOT; FINGERS_PER_HAND];

    for (i, slot) in fingers.iter_mut().enumerate() {
        let position = placement.finger_origin - Vec3::new(0.0, 0.0, i as f32 * placement.finger_spacing);
        let mut transform = Transform::from_position(position);
        match i {
            0 => transform.set_rotation_x(PI / 6.0),
            2 => transform.set_rotation_x(-PI / 6.0),
            _ => {}
        }
        transform.set_rotation_z(arm_rotation_z);
        *slot = graph.attach(MeshNode::new(finger_geometry, material, transform));
    }

    (arm, fingers)
}

pub fn build_head(graph: &mut SceneGraph) -> NodeId {
    add_mesh(graph, Geometry::sphere(0.8, 32, 32), palette::WHITE, at(0.0, 1.5, 0.0))
}

/// Scarf ring plus the curled end and the loose strip hanging off it
pub fn build_scarf(graph: &mut SceneGraph) -> [NodeId; 3] {
    let ring = add_mesh(
        graph,
        Geometry::cylinder(0.65, 0.2, 16, 16, true, false),
        palette::RED,
        at(0.0, 0.8, 0.0),
    );

    let mut end_transform = at(0.3, 0.7, 0.5);
    end_transform.set_rotation_x(PI / 6.0);
    let end = add_mesh(graph, Geometry::torus(0.25, 0.08, 16, 32, PI), palette::RED, end_transform);

    let mut loose_transform = at(0.55, 0.5, 0.55);
    loose_transform.set_rotation_x(PI / 2.0);
    let loose = add_mesh(graph, Geometry::cuboid(0.1, 0.1, 0.5), palette::RED, loose_transform);

    [ring, end, loose]
}

pub fn build_bottom(graph: &mut SceneGraph) -> NodeId {
    add_mesh(graph, Geometry::sphere(1.2, 32, 32), palette::WHITE, at(0.0, -1.5, 0.0))
}

/// Eyes, carrot nose and a half-torus smile
pub fn build_face(graph: &mut SceneGraph) -> [NodeId; 4] {
    let eye_geometry = graph.add_geometry(Geometry::sphere(0.15, 16, 16));
    let black = Material::standard(palette::BLACK);
    let left_eye = graph.attach(MeshNode::new(eye_geometry, black, at(-0.4, 1.8, 0.5)));
    let right_eye = graph.attach(MeshNode::new(eye_geometry, black, at(0.4, 1.8, 0.5)));

    let mut nose_transform = at(0.0, 1.5, 0.9);
    nose_transform.set_rotation_x(PI / 2.0);
    let nose = add_mesh(graph, Geometry::cone(0.15, 0.6, 16, 16, true), palette::ORANGE, nose_transform);

    // Upper half-torus turned upside down
    let mut mouth_transform = at(0.0, 1.2, 0.7);
    mouth_transform.set_rotation_z(PI);
    let mouth = add_mesh(graph, Geometry::torus(0.2, 0.05, 16, 32, PI), palette::BLACK, mouth_transform);

    [left_eye, right_eye, nose, mouth]
}

pub fn build_buttons(graph: &mut SceneGraph) -> [NodeId; 3] {
    let geometry = graph.add_geometry(Geometry::sphere(0.1, 16, 16));
    let black = Material::standard(palette::BLACK);
    [(0.0, 0.5, 0.9), (0.0, 0.0, 1.0), (0.0, -0.5, 0.9)]
        .map(|(x, y, z)| graph.attach(MeshNode::new(geometry, black, at(x, y, z))))
}

/// Top hat: tall crown plus a thin brim at its base
pub fn build_hat(graph: &mut SceneGraph) -> [NodeId; 2] {
    let crown_y = 2.5;
    let crown = add_mesh(
        graph,
        Geometry::cylinder(0.4, 0.6, 32, 34, true, false),
        palette::BLACK,
        at(0.0, crown_y, 0.0),
    );
    let brim = add_mesh(
        graph,
        Geometry::cylinder(0.6, 0.01, 32, 34, true, false),
        palette::BLACK,
        at(0.0, crown_y - 0.3, 0.0),
    );
    [crown, brim]
}

pub fn build_lights(graph: &mut SceneGraph) -> [NodeId; 2] {
    let ambient = graph.attach(Light::ambient(palette::WHITE, 0.8));
    let point = graph.attach(Light::point(palette::WHITE, 5.0, Vec3::new(1.0, 0.0, 2.0)));
    [ambient, point]
}

/// Snow-covered ground, a plane laid flat under the figure
pub fn build_floor(graph: &mut SceneGraph) -> NodeId {
    let mut transform = at(0.0, -2.0, 0.0);
    transform.set_rotation_x(-PI / 2.0);
    add_mesh(graph, Geometry::plane(10.0, 10.0), palette::WHITE, transform)
}
