//! Space nodes and the per-frame transform chain
//!
//! Each node's plane-to-world matrix is fully determined by its
//! parent's already-computed matrix plus its own parameters, so the
//! update pass runs in strict parent-before-child order. Creation order
//! guarantees that ordering: a child cannot be created without its
//! parent's key already existing.

use slotmap::{new_key_type, SlotMap};

use super::camera::CameraService;
use crate::foundation::math::{scale_plane_axes, Mat4, Unit, Vec2, Vec3};

new_key_type! {
    /// Stable handle to a space node
    pub struct SpaceKey;
}

/// Per-frame matrix supplier for fully custom frames
pub type MatrixUpdateFn = Box<dyn FnMut() -> Mat4>;

/// Per-frame scale supplier for scaled frames
pub type ScaleUpdateFn = Box<dyn FnMut() -> f32>;

/// Parameters for a camera-anchored frame
///
/// The defaults reproduce a fixed screen-space HUD; rotation and offset
/// allow arbitrary world-anchored or rotated variants.
#[derive(Debug, Clone, Default)]
pub struct CameraSpaceParams {
    /// Apply the camera's resolution scale on top of the FOV scale
    pub use_resolution_scale: bool,
    /// Rotation as (axis, angle in radians); identity when absent
    pub rotation: Option<(Unit<Vec3>, f32)>,
    /// Translation from the camera; defaults to the near-plane distance
    pub offset: Option<Vec3>,
}

/// Composition rule for one space node
enum SpaceKind {
    /// Screen/camera space: scale x rotation x translation x camera
    Camera(CameraSpaceParams),
    /// Caller-supplied matrix, or a pure parent passthrough
    Custom(Option<MatrixUpdateFn>),
    /// Parent matrix with only the in-plane basis vectors scaled
    Scaled {
        scale: f32,
        update: Option<ScaleUpdateFn>,
    },
}

/// One node of the transform hierarchy
///
/// Holds the matrix and cursor state computed by the most recent update
/// pass. None of these fields may be read before that pass completes
/// for the current frame.
pub struct SpaceNode {
    parent: Option<SpaceKey>,
    kind: SpaceKind,
    plane_to_world: Mat4,
    is_in_front: bool,
    is_facing_camera: bool,
    cursor_pos: Vec2,
}

impl SpaceNode {
    fn new(parent: Option<SpaceKey>, kind: SpaceKind) -> Self {
        Self {
            parent,
            kind,
            plane_to_world: Mat4::identity(),
            is_in_front: true,
            is_facing_camera: true,
            cursor_pos: Vec2::zeros(),
        }
    }

    /// Parent space key; lookup-only, never lifetime-owning
    pub fn parent(&self) -> Option<SpaceKey> {
        self.parent
    }

    /// Plane-to-world matrix from the most recent update pass
    pub fn plane_to_world(&self) -> &Mat4 {
        &self.plane_to_world
    }

    /// Whether the plane sits in front of the camera
    pub fn is_in_front(&self) -> bool {
        self.is_in_front
    }

    /// Whether the plane faces the camera
    pub fn is_facing_camera(&self) -> bool {
        self.is_facing_camera
    }

    /// Cursor position expressed in this node's local plane units
    pub fn cursor_pos(&self) -> Vec2 {
        self.cursor_pos
    }
}

/// Snapshot of the parent state a child derives from
#[derive(Clone, Copy)]
struct ParentFrame {
    matrix: Mat4,
    is_in_front: bool,
    is_facing_camera: bool,
    cursor_pos: Vec2,
}

/// Arena of space nodes updated in parent-before-child order
pub struct SpaceGraph {
    nodes: SlotMap<SpaceKey, SpaceNode>,
    /// Creation order; parents always precede their children
    order: Vec<SpaceKey>,
    root: SpaceKey,
}

impl SpaceGraph {
    /// Create a graph holding only the camera-facing root frame
    pub fn new() -> Self {
        Self::with_root(CameraSpaceParams::default())
    }

    /// Create a graph whose root frame uses the given camera parameters
    pub fn with_root(params: CameraSpaceParams) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SpaceNode::new(None, SpaceKind::Camera(params)));
        Self {
            nodes,
            order: vec![root],
            root,
        }
    }

    /// The default camera-facing frame
    pub fn root(&self) -> SpaceKey {
        self.root
    }

    /// Look up a node
    pub fn node(&self, key: SpaceKey) -> Option<&SpaceNode> {
        self.nodes.get(key)
    }

    /// Add a camera-anchored frame under the root
    pub fn add_camera(&mut self, params: CameraSpaceParams) -> SpaceKey {
        self.insert(Some(self.root), SpaceKind::Camera(params))
    }

    /// Add a custom frame under `parent`
    ///
    /// Without an update function the node is a pure passthrough used
    /// for hierarchical grouping.
    pub fn add_custom(&mut self, parent: SpaceKey, update: Option<MatrixUpdateFn>) -> SpaceKey {
        let parent = self.valid_parent(parent);
        self.insert(Some(parent), SpaceKind::Custom(update))
    }

    /// Add a scaled frame under `parent`
    pub fn add_scaled(&mut self, parent: SpaceKey, scale: f32) -> SpaceKey {
        let parent = self.valid_parent(parent);
        self.insert(
            Some(parent),
            SpaceKind::Scaled {
                scale,
                update: None,
            },
        )
    }

    /// Change a scaled frame's factor
    ///
    /// Takes effect at the next update pass. A no-op for any other node
    /// kind.
    pub fn set_scale(&mut self, key: SpaceKey, scale: f32) {
        if let Some(SpaceNode {
            kind: SpaceKind::Scaled { scale: current, .. },
            ..
        }) = self.nodes.get_mut(key)
        {
            *current = scale;
        }
    }

    /// Drive a scaled frame's factor from a per-frame function
    pub fn set_scale_update(&mut self, key: SpaceKey, update: ScaleUpdateFn) {
        if let Some(SpaceNode {
            kind: SpaceKind::Scaled { update: slot, .. },
            ..
        }) = self.nodes.get_mut(key)
        {
            *slot = Some(update);
        }
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether only the root exists
    pub fn is_empty(&self) -> bool {
        self.order.len() <= 1
    }

    fn valid_parent(&self, parent: SpaceKey) -> SpaceKey {
        if self.nodes.contains_key(parent) {
            parent
        } else {
            log::warn!("Space parent {:?} does not exist, attaching to root", parent);
            self.root
        }
    }

    fn insert(&mut self, parent: Option<SpaceKey>, kind: SpaceKind) -> SpaceKey {
        let key = self.nodes.insert(SpaceNode::new(parent, kind));
        self.order.push(key);
        key
    }

    /// Recompute every plane-to-world matrix for this frame
    ///
    /// Runs exactly once per layout pass. `cursor_screen` is the raw
    /// cursor position in screen coordinates; each node ends up with
    /// the position mapped into its own plane units.
    pub fn update(&mut self, camera: &dyn CameraService, cursor_screen: Vec2) {
        for i in 0..self.order.len() {
            let key = self.order[i];
            let parent = self
                .nodes
                .get(key)
                .and_then(|node| node.parent)
                .and_then(|parent| self.nodes.get(parent))
                .map(|parent| ParentFrame {
                    matrix: parent.plane_to_world,
                    is_in_front: parent.is_in_front,
                    is_facing_camera: parent.is_facing_camera,
                    cursor_pos: parent.cursor_pos,
                });

            let Some(node) = self.nodes.get_mut(key) else {
                continue;
            };

            match &mut node.kind {
                SpaceKind::Camera(params) => {
                    node.plane_to_world = camera_plane(camera, params);
                    node.is_in_front = true;
                    node.is_facing_camera = true;
                    node.cursor_pos = cursor_screen;
                }
                SpaceKind::Custom(update) => match (update.as_mut(), parent) {
                    (Some(update), _) => {
                        node.plane_to_world = update();
                        let (in_front, facing) =
                            facing_flags(&node.plane_to_world, &camera.world_matrix());
                        node.is_in_front = in_front;
                        node.is_facing_camera = facing;
                        node.cursor_pos = parent.map_or(cursor_screen, |p| p.cursor_pos);
                    }
                    (None, Some(parent)) => {
                        node.plane_to_world = parent.matrix;
                        node.is_in_front = parent.is_in_front;
                        node.is_facing_camera = parent.is_facing_camera;
                        node.cursor_pos = parent.cursor_pos;
                    }
                    (None, None) => {
                        node.plane_to_world = camera.world_matrix();
                        node.cursor_pos = cursor_screen;
                    }
                },
                SpaceKind::Scaled { scale, update } => {
                    if let Some(update) = update.as_mut() {
                        *scale = update();
                    }
                    let factor = *scale;
                    let Some(parent) = parent else {
                        continue;
                    };
                    // Facing flags come from the parent verbatim
                    node.is_in_front = parent.is_in_front;
                    node.is_facing_camera = parent.is_facing_camera;
                    if factor == 1.0 {
                        // Exact passthrough, bit-for-bit
                        node.plane_to_world = parent.matrix;
                        node.cursor_pos = parent.cursor_pos;
                    } else {
                        node.plane_to_world = scale_plane_axes(&parent.matrix, factor);
                        node.cursor_pos = parent.cursor_pos / factor;
                    }
                }
            }
        }
    }
}

impl Default for SpaceGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Compose a camera-anchored plane matrix
///
/// Column-vector convention: local transforms apply right to left, so
/// this is camera x translation x rotation x scale. The depth axis is
/// never part of the scale.
fn camera_plane(camera: &dyn CameraService, params: &CameraSpaceParams) -> Mat4 {
    let mut factor = camera.fov_scale();
    if params.use_resolution_scale {
        factor *= camera.resolution_scale();
    }

    let offset = params
        .offset
        .unwrap_or_else(|| Vec3::new(0.0, 0.0, -camera.near_plane()));
    let rotation = params
        .rotation
        .map_or_else(Mat4::identity, |(axis, angle)| {
            Mat4::from_axis_angle(&axis, angle)
        });

    camera.world_matrix()
        * Mat4::new_translation(&offset)
        * rotation
        * Mat4::new_nonuniform_scaling(&Vec3::new(factor, factor, 1.0))
}

/// Orientation flags for an arbitrary plane relative to the camera
fn facing_flags(plane: &Mat4, camera_world: &Mat4) -> (bool, bool) {
    // Camera looks down its local -Z axis
    let forward = -Vec3::new(camera_world[(0, 2)], camera_world[(1, 2)], camera_world[(2, 2)]);
    let normal = Vec3::new(plane[(0, 2)], plane[(1, 2)], plane[(2, 2)]);
    let to_plane = Vec3::new(plane[(0, 3)], plane[(1, 3)], plane[(2, 3)])
        - Vec3::new(
            camera_world[(0, 3)],
            camera_world[(1, 3)],
            camera_world[(2, 3)],
        );

    let in_front = to_plane.dot(&forward) > 0.0;
    let facing = normal.dot(&forward) < 0.0;
    (in_front, facing)
}
