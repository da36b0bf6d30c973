use glam::{Mat4, Quat, Vec3};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn from_axis_angle(axis: Vec3, angle: f32, position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::from_axis_angle(axis.normalize(), angle),
            scale: Vec3::ONE,
        }
    }

    /// Scale, then rotate, then translate.
    pub fn to_matrix(&self) -> Mat4 {
        let translation = Mat4::from_translation(self.position);
        let rotation = Mat4::from_quat(self.rotation);
        let scale = Mat4::from_scale(self.scale);
        translation * rotation * scale
    }

    /// Inverse transpose of the model matrix, for transforming normals.
    pub fn normal_matrix(&self) -> Mat4 {
        self.to_matrix().inverse().transpose()
    }
}
