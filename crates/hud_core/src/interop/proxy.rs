//! Consumer-side proxies over accessor tuples
//!
//! A proxy reconstructs a typed view from the opaque tuple so consumer
//! code is written against ordinary traits while only primitive data
//! and function handles cross the boundary. Proxies are cheap and
//! re-resolve through the accessor on every call; nothing resolved is
//! cached across frames except the parent token used for reparenting
//! detection.

use super::accessor::{NodeAccessor, NodeToken};
use super::member::TreeMember;
use super::value::ApiValue;
use crate::text::RichText;

/// Capability of nodes that may be attached to a parent
pub trait HasParent {
    /// Identity of the current parent, freshly queried
    fn parent_token(&self) -> Option<NodeToken>;

    /// Whether the node is currently registered to any parent
    fn is_registered(&self) -> bool;
}

/// Capability of nodes that own an ordered child list
pub trait HasChildren {
    /// Append a child to the traversal order
    fn add_child(&self, child: &NodeAccessor);

    /// Detach a child; absent children are a no-op
    fn remove_child(&self, child: NodeToken);

    /// Move a child to the end of the traversal order
    fn set_focus(&self, child: NodeToken);
}

/// Result of the once-per-frame parent poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentChange {
    /// Parent identity matches the cached one
    Unchanged,
    /// Node was reparented (or orphaned) since the last poll
    Changed(Option<NodeToken>),
}

/// Typed consumer view over one provider node
///
/// Reparenting is detected by comparing a cached parent token against a
/// freshly queried one each frame. The one-frame detection lag is part
/// of the contract; collaborators rely on the settle behavior, so do
/// not replace the poll with push notification.
pub struct NodeProxy {
    accessor: NodeAccessor,
    cached_parent: Option<NodeToken>,
}

impl NodeProxy {
    /// Wrap an accessor tuple received across the boundary
    pub fn new(accessor: NodeAccessor) -> Self {
        let cached_parent = accessor.read(TreeMember::GetParent.code()).as_token();
        Self {
            accessor,
            cached_parent,
        }
    }

    /// The wrapped accessor tuple
    pub fn accessor(&self) -> &NodeAccessor {
        &self.accessor
    }

    /// The node's identity token
    pub fn identity(&self) -> NodeToken {
        self.accessor.identity()
    }

    /// The node's own visibility flag; false once the provider side is
    /// gone
    pub fn is_visible(&self) -> bool {
        self.accessor.is_visible()
    }

    /// Set the node's visibility flag
    pub fn set_visible(&self, visible: bool) {
        self.accessor
            .write(TreeMember::SetVisible.code(), ApiValue::Bool(visible));
    }

    /// The node's z-offset hint, defaulting to 0 on a stale token
    pub fn z_offset(&self) -> i32 {
        self.accessor
            .read(TreeMember::GetZOffset.code())
            .as_int()
            .and_then(|z| i32::try_from(z).ok())
            .unwrap_or(0)
    }

    /// Set the node's z-offset hint
    pub fn set_z_offset(&self, z_offset: i32) {
        self.accessor
            .write(TreeMember::SetZOffset.code(), ApiValue::Int(i64::from(z_offset)));
    }

    /// Fetch and reconstruct the node's cached rich text
    pub fn text(&self) -> Option<RichText> {
        RichText::from_value(&self.accessor.read(TreeMember::GetText.code()))
    }

    /// Replace the node's cached rich text
    pub fn set_text(&self, text: &RichText) {
        self.accessor
            .write(TreeMember::SetText.code(), text.to_value());
    }

    /// Register this node under another node
    pub fn register_to(&self, parent: &NodeProxy) {
        parent.add_child(&self.accessor);
    }

    /// Compare the cached parent token against a fresh query
    ///
    /// Call once per frame; the cache updates on change, so detection
    /// lags an actual reparent by at most one frame.
    pub fn poll_parent(&mut self) -> ParentChange {
        let fresh = self.accessor.read(TreeMember::GetParent.code()).as_token();
        if fresh == self.cached_parent {
            ParentChange::Unchanged
        } else {
            self.cached_parent = fresh;
            ParentChange::Changed(fresh)
        }
    }

    /// Forward the layout capability
    pub fn layout(&self, refresh: bool) {
        self.accessor.layout(refresh);
    }

    /// Forward the draw capability for one layer
    pub fn draw(&self, layer: u8) {
        self.accessor.draw(layer);
    }

    /// Forward the input capability
    pub fn handle_input(&self) {
        self.accessor.handle_input();
    }
}

impl HasParent for NodeProxy {
    fn parent_token(&self) -> Option<NodeToken> {
        self.accessor.read(TreeMember::GetParent.code()).as_token()
    }

    fn is_registered(&self) -> bool {
        self.accessor
            .read(TreeMember::IsRegistered.code())
            .as_bool()
            .unwrap_or(false)
    }
}

impl HasChildren for NodeProxy {
    fn add_child(&self, child: &NodeAccessor) {
        self.accessor.write(
            TreeMember::AddChild.code(),
            ApiValue::Accessor(child.clone()),
        );
    }

    fn remove_child(&self, child: NodeToken) {
        self.accessor
            .write(TreeMember::RemoveChild.code(), ApiValue::Token(child));
    }

    fn set_focus(&self, child: NodeToken) {
        self.accessor
            .write(TreeMember::SetFocus.code(), ApiValue::Token(child));
    }
}
