use glam::{Mat4, Quat, Vec3};

/// Translation / rotation / scale, the decomposed form of a node transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Builds a transform from glTF node fields.
    ///
    /// `rotation` is in document order `[x, y, z, w]`. A zero-length
    /// quaternion is treated as identity; anything else is normalized.
    pub fn from_gltf(
        translation: Option<[f32; 3]>,
        rotation: Option<[f32; 4]>,
        scale: Option<[f32; 3]>,
    ) -> Self {
        let mut transform = Self::default();

        if let Some(t) = translation {
            transform.translation = Vec3::from_array(t);
        }
        if let Some([x, y, z, w]) = rotation {
            transform.rotation = quat_from_gltf(x, y, z, w);
        }
        if let Some(s) = scale {
            transform.scale = Vec3::from_array(s);
        }

        transform
    }

    /// Creates the model matrix (local -> parent), composed as `T * R * S`.
    pub fn compute_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

// glam stores quaternions as (x, y, z, w), the same order glTF writes them.
fn quat_from_gltf(x: f32, y: f32, z: f32, w: f32) -> Quat {
    let q = Quat::from_xyzw(x, y, z, w);
    let len = q.length();
    if !len.is_finite() || len <= f32::EPSILON {
        Quat::IDENTITY
    } else {
        q / len
    }
}
