//! Camera collaborator interface
//!
//! The host game's camera and physics services are consumed read-only
//! during layout and targeting; this trait is the full surface the core
//! depends on.

use crate::foundation::math::{Mat4, Vec3};

/// Ray-cast hit result from the host's physics service
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space hit position
    pub position: Vec3,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Read-only camera/physics services supplied by the host
pub trait CameraService {
    /// Camera-to-world matrix for the current frame
    fn world_matrix(&self) -> Mat4;

    /// Distance to the near clipping plane
    fn near_plane(&self) -> f32;

    /// Field-of-view-derived scale factor for screen-space planes
    fn fov_scale(&self) -> f32;

    /// DPI/resolution scale factor applied when a plane opts in
    fn resolution_scale(&self) -> f32 {
        1.0
    }

    /// Cast a ray into the host world, for targeting utilities
    fn cast_ray(&self, _origin: Vec3, _direction: Vec3) -> Option<RayHit> {
        None
    }
}

/// Camera with fixed parameters, for tests and headless frames
#[derive(Debug, Clone)]
pub struct FixedCamera {
    /// Camera-to-world matrix
    pub world: Mat4,
    /// Near-plane distance
    pub near: f32,
    /// FOV-derived scale factor
    pub fov_scale: f32,
    /// Resolution scale factor
    pub resolution_scale: f32,
}

impl Default for FixedCamera {
    fn default() -> Self {
        Self {
            world: Mat4::identity(),
            near: 0.05,
            fov_scale: 1.0,
            resolution_scale: 1.0,
        }
    }
}

/// Anchor matrix for a plane at the first obstruction along a ray
///
/// Targeting convenience for markers that sit on whatever a cursor or
/// weapon ray hits; feed the result to a custom space's update
/// function. `None` when the host reports no hit.
pub fn anchor_at_hit(
    camera: &dyn CameraService,
    origin: Vec3,
    direction: Vec3,
) -> Option<Mat4> {
    camera
        .cast_ray(origin, direction)
        .map(|hit| Mat4::new_translation(&hit.position))
}

impl CameraService for FixedCamera {
    fn world_matrix(&self) -> Mat4 {
        self.world
    }

    fn near_plane(&self) -> f32 {
        self.near
    }

    fn fov_scale(&self) -> f32 {
        self.fov_scale
    }

    fn resolution_scale(&self) -> f32 {
        self.resolution_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlatGround;

    impl CameraService for FlatGround {
        fn world_matrix(&self) -> Mat4 {
            Mat4::identity()
        }

        fn near_plane(&self) -> f32 {
            0.05
        }

        fn fov_scale(&self) -> f32 {
            1.0
        }

        fn cast_ray(&self, origin: Vec3, direction: Vec3) -> Option<RayHit> {
            // Intersect with the y = 0 plane
            if direction.y >= 0.0 {
                return None;
            }
            let distance = -origin.y / direction.y;
            Some(RayHit {
                position: origin + direction * distance,
                distance,
            })
        }
    }

    #[test]
    fn test_anchor_at_hit_translates_to_the_hit_point() {
        let anchor = anchor_at_hit(
            &FlatGround,
            Vec3::new(2.0, 10.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
        )
        .unwrap();
        assert_eq!(anchor[(0, 3)], 2.0);
        assert_eq!(anchor[(1, 3)], 0.0);
    }

    #[test]
    fn test_anchor_at_hit_without_hit_is_none() {
        // Looking up never hits the ground, and the default camera
        // reports no physics at all
        let up = Vec3::new(0.0, 1.0, 0.0);
        assert!(anchor_at_hit(&FlatGround, Vec3::new(0.0, 1.0, 0.0), up).is_none());
        assert!(anchor_at_hit(&FixedCamera::default(), Vec3::zeros(), up).is_none());
    }
}
