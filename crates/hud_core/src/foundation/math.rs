//! Math utilities and types
//!
//! Provides the fundamental math types used by the transform chain and
//! cursor mapping. Everything is a thin alias over nalgebra so the rest
//! of the crate never names the library directly.

pub use nalgebra::{Matrix3, Matrix4, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Math utility functions
pub mod utils {
    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * std::f32::consts::PI / 180.0
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * 180.0 / std::f32::consts::PI
    }
}

/// Scale only the two in-plane basis vectors of a plane-to-world matrix.
///
/// The third (depth) basis vector and the translation are copied
/// untouched. Depth must never be scaled: distance-based sorting and
/// in-front tests read it directly.
pub fn scale_plane_axes(matrix: &Mat4, scale: f32) -> Mat4 {
    let mut scaled = *matrix;
    for row in 0..3 {
        scaled[(row, 0)] *= scale;
        scaled[(row, 1)] *= scale;
    }
    scaled
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_deg_to_rad() {
        assert_relative_eq!(utils::deg_to_rad(180.0), std::f32::consts::PI);
        assert_relative_eq!(utils::rad_to_deg(std::f32::consts::PI), 180.0);
    }

    #[test]
    fn test_scale_plane_axes_leaves_depth_untouched() {
        let m = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        let scaled = scale_plane_axes(&m, 2.0);

        // In-plane basis vectors doubled
        assert_relative_eq!(scaled[(0, 0)], 2.0);
        assert_relative_eq!(scaled[(1, 1)], 2.0);

        // Depth basis and translation unchanged
        assert_relative_eq!(scaled[(2, 2)], 1.0);
        assert_relative_eq!(scaled[(0, 3)], 1.0);
        assert_relative_eq!(scaled[(1, 3)], 2.0);
        assert_relative_eq!(scaled[(2, 3)], 3.0);
    }

    #[test]
    fn test_scale_plane_axes_identity_scale_is_noop() {
        let m = Mat4::new_rotation(Vec3::new(0.3, 0.1, 0.7));
        assert_eq!(scale_plane_axes(&m, 1.0), m);
    }
}
