//! Space-node transform hierarchy
//!
//! Composes nested coordinate frames once per frame, in strict
//! parent-to-child order. Element nodes pair with a space node to know
//! which plane they lay out and hit-test in; the root space node is the
//! camera-facing default frame.

pub mod camera;
pub mod node;

pub use camera::{anchor_at_hit, CameraService, FixedCamera, RayHit};
pub use node::{
    CameraSpaceParams, MatrixUpdateFn, ScaleUpdateFn, SpaceGraph, SpaceKey, SpaceNode,
};
