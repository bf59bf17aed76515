//! Scene Module
//!
//! The in-memory scene: local transforms, the node arena and its traversal.
//! Built once at startup; afterwards only particle positions change.

pub mod graph;
pub mod transform;

pub use graph::{Light, MeshNode, NodeId, SceneGraph};
pub use transform::{GlobalTransform, Transform};
