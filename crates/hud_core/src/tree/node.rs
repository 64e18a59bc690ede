//! Element nodes, widget hooks, and the draw command queue
//!
//! The tree core owns membership and traversal; concrete widget
//! behavior plugs in through [`HudElement`]. Widgets never talk to the
//! draw backend directly — they push commands into a per-frame queue
//! which the tree flushes to the backend in layer order, keeping the
//! traversal independent of any rendering API.

use slotmap::new_key_type;

use crate::foundation::math::{Mat4, Vec2, Vec4};
use crate::input::{BindSource, HudCursor};
use crate::interop::NodeToken;
use crate::space::SpaceKey;
use crate::text::RichText;

new_key_type! {
    /// Stable handle to an element node inside the provider tree
    pub struct ElementKey;
}

/// Number of draw layers; z-offsets map into this range
pub const DRAW_LAYER_COUNT: u8 = 8;

/// Map a node's z-offset hint to its draw layer
///
/// Offsets are centered so negative values select background layers.
pub fn draw_layer(z_offset: i32) -> u8 {
    let centered = z_offset.saturating_add(i32::from(DRAW_LAYER_COUNT / 2));
    centered.clamp(0, i32::from(DRAW_LAYER_COUNT - 1)) as u8
}

/// Scene-graph storage unit
///
/// Created unregistered; live only while a parent is recorded. The
/// child list and parent reference are kept mutually consistent by the
/// tree operations.
pub(crate) struct ElementNode {
    /// Local visibility flag; an invisible node hides its whole subtree
    pub visible: bool,
    /// Parent key while registered
    pub parent: Option<ElementKey>,
    /// Ordered child list; traversal order, last = focused
    pub children: Vec<ElementKey>,
    /// Draw-layer hint
    pub z_offset: i32,
    /// Coordinate frame this element lays out in
    pub space: SpaceKey,
    /// Leaf behavior hook
    pub widget: Option<Box<dyn HudElement>>,
    /// Cached rich text, readable and writable across the boundary
    pub text: Option<RichText>,
    /// Accessor tuple of a foreign module's subtree grafted here
    ///
    /// A remote node has no local widget or children; its passes are
    /// forwarded through the tuple's capability functions, and its
    /// visibility comes from the tuple's query. Once the foreign side
    /// unregisters, every capability is inert and the subtree simply
    /// stops traversing.
    pub remote: Option<crate::interop::NodeAccessor>,
}

impl ElementNode {
    pub(crate) fn new(space: SpaceKey) -> Self {
        Self {
            visible: true,
            parent: None,
            children: Vec::new(),
            z_offset: 0,
            space,
            widget: None,
            text: None,
            remote: None,
        }
    }
}

/// Frame data handed to a widget's layout callback
pub struct LayoutContext {
    /// Plane-to-world matrix of the element's space, fresh this frame
    pub plane_to_world: Mat4,
    /// Whether the plane faces the camera
    pub is_facing_camera: bool,
    /// Whether the plane sits in front of the camera
    pub is_in_front: bool,
    /// Full-rebuild request flag
    pub refresh: bool,
}

/// Frame data handed to a widget's draw callback
pub struct DrawContext<'a> {
    queue: &'a mut DrawQueue,
    /// Plane-to-world matrix of the element's space
    pub plane_to_world: Mat4,
    /// Draw layer derived from the node's z-offset
    pub layer: u8,
    /// The node's cached rich text, if any
    pub text: Option<&'a RichText>,
}

impl DrawContext<'_> {
    /// Queue a solid quad on this element's plane
    pub fn push_quad(&mut self, size: Vec2, color: Vec4) {
        self.queue.commands.push(DrawCommand::Quad {
            plane_to_world: self.plane_to_world,
            size,
            color,
            layer: self.layer,
        });
    }

    /// Queue a rich-text draw on this element's plane
    pub fn push_text(&mut self, text: RichText) {
        self.queue.commands.push(DrawCommand::Text {
            plane_to_world: self.plane_to_world,
            text,
            layer: self.layer,
        });
    }
}

/// Frame data handed to a widget's input callback
pub struct InputContext<'a> {
    /// Cursor arbiter; the only place it is mutated
    pub cursor: &'a mut HudCursor,
    /// Debounced bind signals from the key-binding collaborator
    pub binds: &'a dyn BindSource,
    /// This element's identity token, for capture requests
    pub token: NodeToken,
    /// Cursor position in this element's local plane units
    pub cursor_pos: Vec2,
    /// Whether the element's plane faces the camera
    pub is_facing_camera: bool,
}

/// Behavior hook for concrete leaf widgets
///
/// All callbacks default to no-ops so grouping nodes need no widget at
/// all.
pub trait HudElement {
    /// Per-frame layout, after the element's space transform is fresh
    fn layout(&mut self, _ctx: &mut LayoutContext) {}

    /// Queue draw commands for this frame
    fn draw(&mut self, _ctx: &mut DrawContext) {}

    /// React to cursor and bind input; may claim cursor capture
    fn handle_input(&mut self, _ctx: &mut InputContext) {}
}

/// One queued draw call
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Solid quad on a plane
    Quad {
        /// Plane-to-world matrix
        plane_to_world: Mat4,
        /// Quad size in plane units
        size: Vec2,
        /// RGBA fill color
        color: Vec4,
        /// Draw layer
        layer: u8,
    },
    /// Rich text on a plane
    Text {
        /// Plane-to-world matrix
        plane_to_world: Mat4,
        /// Text to draw
        text: RichText,
        /// Draw layer
        layer: u8,
    },
}

impl DrawCommand {
    fn layer(&self) -> u8 {
        match self {
            Self::Quad { layer, .. } | Self::Text { layer, .. } => *layer,
        }
    }
}

/// Per-frame accumulation of draw commands, flushed in layer order
#[derive(Debug, Default)]
pub struct DrawQueue {
    commands: Vec<DrawCommand>,
}

impl DrawQueue {
    pub(crate) fn clear(&mut self) {
        self.commands.clear();
    }

    pub(crate) fn context<'a>(
        &'a mut self,
        plane_to_world: Mat4,
        layer: u8,
        text: Option<&'a RichText>,
    ) -> DrawContext<'a> {
        DrawContext {
            queue: self,
            plane_to_world,
            layer,
            text,
        }
    }

    /// Stable-sort by layer and hand everything to the backend
    ///
    /// Backend failures are logged and absorbed; one bad draw call must
    /// not take down the frame.
    pub(crate) fn flush(&mut self, backend: &mut dyn DrawBackend) {
        self.commands.sort_by_key(DrawCommand::layer);

        if let Err(e) = backend.begin_frame() {
            log::warn!("Draw backend rejected frame start: {}", e);
            self.commands.clear();
            return;
        }

        for command in self.commands.drain(..) {
            let result = match &command {
                DrawCommand::Quad {
                    plane_to_world,
                    size,
                    color,
                    ..
                } => backend.draw_quad(plane_to_world, *size, *color),
                DrawCommand::Text {
                    plane_to_world,
                    text,
                    ..
                } => backend.draw_text(plane_to_world, text),
            };
            if let Err(e) = result {
                log::warn!("Draw command failed: {}", e);
            }
        }

        if let Err(e) = backend.end_frame() {
            log::warn!("Draw backend rejected frame end: {}", e);
        }
    }
}

/// Backend-agnostic immediate-mode draw interface
///
/// Supplied by the host; the tree flushes its per-frame queue through
/// this once per draw pass.
pub trait DrawBackend {
    /// Begin the HUD draw pass
    fn begin_frame(&mut self) -> Result<(), Box<dyn std::error::Error>>;

    /// Draw a solid quad on the given plane
    fn draw_quad(
        &mut self,
        plane_to_world: &Mat4,
        size: Vec2,
        color: Vec4,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Draw rich text on the given plane
    fn draw_text(
        &mut self,
        plane_to_world: &Mat4,
        text: &RichText,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// End the HUD draw pass
    fn end_frame(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}
