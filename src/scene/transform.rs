//! Transform Components
//!
//! Two-tier transform system:
//! - Transform: local position/rotation/scale (relative to parent)
//! - GlobalTransform: composed world-space matrix (for rendering)
//!
//! For nodes with parents, GlobalTransform = parent.GlobalTransform * self.Transform.
//! World transforms are recomputed during traversal, never cached.

use macroquad::math::{EulerRot, Mat3, Mat4, Quat, Vec3};

/// Local transform relative to parent (or the scene root if attached there).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position relative to parent
    pub position: Vec3,
    /// Euler angles in radians, applied in XYZ order
    pub rotation: Vec3,
    /// Per-axis scale factors
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform (origin, no rotation, scale 1)
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Create transform at a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Builder-style scale override
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn set_position_y(&mut self, y: f32) {
        self.position.y = y;
    }

    /// Set the X euler angle, leaving Y and Z untouched
    pub fn set_rotation_x(&mut self, angle: f32) {
        self.rotation.x = angle;
    }

    /// Set the Z euler angle, leaving X and Y untouched
    pub fn set_rotation_z(&mut self, angle: f32) {
        self.rotation.z = angle;
    }

    /// Rotation as a quaternion (XYZ euler order)
    pub fn quaternion(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Convert to a 4x4 transformation matrix (scale, then rotate, then translate)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quaternion(), self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// World-space transform, composed from the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalTransform {
    matrix: Mat4,
}

impl GlobalTransform {
    pub const IDENTITY: GlobalTransform = GlobalTransform {
        matrix: Mat4::IDENTITY,
    };

    /// Compute child's global transform from parent's global and child's local
    pub fn from_parent_and_local(parent: &GlobalTransform, local: &Transform) -> Self {
        Self {
            matrix: parent.matrix * local.to_matrix(),
        }
    }

    /// World position (translation component)
    pub fn position(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    /// Transform a point from local space to world space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.matrix.transform_point3(point)
    }

    /// Inverse-transpose of the linear part, for surface normals.
    /// Computed once per node; results still need normalizing.
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.matrix).inverse().transpose()
    }
}

impl Default for GlobalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
