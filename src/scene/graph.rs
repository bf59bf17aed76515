//! Scene Graph
//!
//! Arena-backed ownership tree rooted at a single implicit root node.
//! Nodes are only ever added: there is no detach or reparent, so a `NodeId`
//! stays valid for the lifetime of the graph.

use macroquad::color::Color;
use macroquad::math::Vec3;
use crate::geometry::{Geometry, GeometryId, GeometryLibrary, Material};
use super::transform::{GlobalTransform, Transform};

/// Index of a node in the scene arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The scene root. Always present, identity transform.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A renderable node: transform plus shared geometry and material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshNode {
    pub transform: Transform,
    pub geometry: GeometryId,
    pub material: Material,
}

impl MeshNode {
    pub fn new(geometry: GeometryId, material: Material, transform: Transform) -> Self {
        Self { transform, geometry, material }
    }
}

/// Scene light
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Uniform light from every direction
    Ambient { color: Color, intensity: f32 },
    /// Omnidirectional light at a position (relative to parent)
    Point { color: Color, intensity: f32, position: Vec3 },
}

impl Light {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Light::Ambient { color, intensity }
    }

    pub fn point(color: Color, intensity: f32, position: Vec3) -> Self {
        Light::Point { color, intensity, position }
    }
}

/// Payload of a scene node
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneNode {
    /// Pure grouping node (the root is one)
    Group(Transform),
    Mesh(MeshNode),
    Light(Light),
}

impl SceneNode {
    /// Local transform contributed to children
    pub fn local_transform(&self) -> Transform {
        match self {
            SceneNode::Group(t) => *t,
            SceneNode::Mesh(mesh) => mesh.transform,
            SceneNode::Light(Light::Point { position, .. }) => Transform::from_position(*position),
            SceneNode::Light(Light::Ambient { .. }) => Transform::IDENTITY,
        }
    }
}

impl From<MeshNode> for SceneNode {
    fn from(mesh: MeshNode) -> Self {
        SceneNode::Mesh(mesh)
    }
}

impl From<Light> for SceneNode {
    fn from(light: Light) -> Self {
        SceneNode::Light(light)
    }
}

struct Slot {
    node: SceneNode,
    children: Vec<NodeId>,
}

/// Ownership tree of scene nodes plus the geometry they share
pub struct SceneGraph {
    slots: Vec<Slot>,
    geometries: GeometryLibrary,
    mesh_count: usize,
    light_count: usize,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                node: SceneNode::Group(Transform::IDENTITY),
                children: Vec::new(),
            }],
            geometries: GeometryLibrary::new(),
            mesh_count: 0,
            light_count: 0,
        }
    }

    /// Register a geometry for meshes to share
    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.insert(geometry)
    }

    pub fn geometries(&self) -> &GeometryLibrary {
        &self.geometries
    }

    /// Attach a node as a child of the root
    pub fn attach(&mut self, node: impl Into<SceneNode>) -> NodeId {
        self.attach_to(NodeId::ROOT, node)
    }

    /// Attach a node under an explicit parent.
    /// An unknown parent falls back to the root so the node is never lost.
    pub fn attach_to(&mut self, parent: NodeId, node: impl Into<SceneNode>) -> NodeId {
        let node = node.into();
        match node {
            SceneNode::Mesh(_) => self.mesh_count += 1,
            SceneNode::Light(_) => self.light_count += 1,
            SceneNode::Group(_) => {}
        }

        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Slot { node, children: Vec::new() });

        let parent = if parent.index() < id.index() { parent } else { NodeId::ROOT };
        self.slots[parent.index()].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.slots.get(id.index()).map(|slot| &slot.node)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.slots.get_mut(id.index()).map(|slot| &mut slot.node)
    }

    pub fn mesh(&self, id: NodeId) -> Option<&MeshNode> {
        match self.node(id)? {
            SceneNode::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn mesh_mut(&mut self, id: NodeId) -> Option<&mut MeshNode> {
        match self.node_mut(id)? {
            SceneNode::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Number of mesh nodes attached so far
    pub fn mesh_count(&self) -> usize {
        self.mesh_count
    }

    pub fn light_count(&self) -> usize {
        self.light_count
    }

    /// Every mesh with its composed world transform, depth-first in insertion order
    pub fn traverse(&self) -> Traversal<'_> {
        Traversal {
            graph: self,
            stack: vec![(NodeId::ROOT, GlobalTransform::IDENTITY)],
        }
    }

    /// World transform of one mesh node, found by walking the tree
    #[cfg(test)]
    pub fn world_of(&self, id: NodeId) -> Option<GlobalTransform> {
        let target = self.mesh(id)?;
        self.traverse()
            .find(|visit| std::ptr::eq(visit.mesh, target))
            .map(|visit| visit.world)
    }

    /// Lights in world space (point light positions composed with their parents)
    pub fn lights(&self) -> Vec<Light> {
        let mut lights = Vec::with_capacity(self.light_count);
        let mut stack = vec![(NodeId::ROOT, GlobalTransform::IDENTITY)];
        while let Some((id, parent)) = stack.pop() {
            let slot = &self.slots[id.index()];
            let world = GlobalTransform::from_parent_and_local(&parent, &slot.node.local_transform());
            match slot.node {
                SceneNode::Light(Light::Point { color, intensity, .. }) => {
                    lights.push(Light::point(color, intensity, world.position()));
                }
                SceneNode::Light(light) => lights.push(light),
                _ => {}
            }
            stack.extend(slot.children.iter().rev().map(|&child| (child, world)));
        }
        lights
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// One mesh visited by `SceneGraph::traverse`
#[derive(Debug, Clone, Copy)]
pub struct MeshVisit<'a> {
    pub mesh: &'a MeshNode,
    pub world: GlobalTransform,
}

/// Depth-first iterator over meshes; parents before children, siblings in insertion order
pub struct Traversal<'a> {
    graph: &'a SceneGraph,
    stack: Vec<(NodeId, GlobalTransform)>,
}

impl<'a> Iterator for Traversal<'a> {
    type Item = MeshVisit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let graph = self.graph;
        while let Some((id, parent)) = self.stack.pop() {
            let slot = &graph.slots[id.index()];
            let world = GlobalTransform::from_parent_and_local(&parent, &slot.node.local_transform());
            self.stack.extend(slot.children.iter().rev().map(|&child| (child, world)));

            if let SceneNode::Mesh(mesh) = &slot.node {
                return Some(MeshVisit { mesh, world });
            }
        }
        None
    }
}
