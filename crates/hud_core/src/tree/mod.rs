//! Scene graph / element tree
//!
//! Owns parent-child relationships, the registration lifecycle, focus
//! order, and the three per-frame traversal passes. Single-threaded and
//! frame-driven: the host clock runs Layout, then Draw, then Input
//! exactly once per tick, and every structural operation is expected to
//! run on that same tick.
//!
//! Error policy: all structural misuse (double registration, removing
//! an absent child, operations on destroyed tokens) resolves as a
//! silent no-op. A single malformed frame must never crash the shared
//! tree that other modules depend on.

pub mod export;
pub mod node;

pub use node::{
    draw_layer, DrawBackend, DrawCommand, DrawContext, DrawQueue, ElementKey, HudElement,
    InputContext, LayoutContext, DRAW_LAYER_COUNT,
};

use slotmap::{Key, KeyData, SlotMap};

use crate::config::HudConfig;
use crate::input::{BindSource, HudCursor, NullBinds};
use crate::interop::NodeToken;
use crate::space::{CameraService, CameraSpaceParams, SpaceGraph, SpaceKey};
use crate::text::RichText;
use node::ElementNode;

/// Convert a slotmap key to its wire token
///
/// Slotmap versioning gives the token invariant for free: once a node
/// is removed, its key (and therefore its token) is never handed out
/// for a different node.
pub(crate) fn token_of(key: ElementKey) -> NodeToken {
    NodeToken::from_raw(key.data().as_ffi())
}

/// Convert a wire token back to a slotmap key
///
/// A token from a destroyed node simply misses every lookup.
pub(crate) fn key_of(token: NodeToken) -> ElementKey {
    ElementKey::from(KeyData::from_ffi(token.as_raw()))
}

/// The provider-side element tree
///
/// Owns the node storage, the space-node transform chain, the cursor
/// arbiter, and the per-frame draw queue. Cross-module consumers reach
/// all of this exclusively through exported accessor tuples.
pub struct HudTree {
    nodes: SlotMap<ElementKey, ElementNode>,
    spaces: SpaceGraph,
    cursor: HudCursor,
    binds: Box<dyn BindSource>,
    draw_queue: DrawQueue,
    root: ElementKey,
}

impl HudTree {
    /// Create a tree with a registered root node in the default
    /// camera-facing frame
    pub fn new(config: &HudConfig) -> Self {
        let spaces = SpaceGraph::with_root(CameraSpaceParams {
            use_resolution_scale: config.space.use_resolution_scale,
            ..CameraSpaceParams::default()
        });
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(ElementNode::new(spaces.root()));
        log::debug!("HUD tree created, root {:?}", token_of(root));
        Self {
            nodes,
            spaces,
            cursor: HudCursor::new(config.cursor.visible),
            binds: Box::new(NullBinds),
            draw_queue: DrawQueue::default(),
            root,
        }
    }

    /// Identity token of the root node
    pub fn root(&self) -> NodeToken {
        token_of(self.root)
    }

    /// Inject the key-binding collaborator
    pub fn set_bind_source(&mut self, binds: Box<dyn BindSource>) {
        self.binds = binds;
    }

    /// The space-node transform chain
    pub fn spaces(&self) -> &SpaceGraph {
        &self.spaces
    }

    /// Mutable access to the transform chain, for adding frames
    pub fn spaces_mut(&mut self) -> &mut SpaceGraph {
        &mut self.spaces
    }

    /// The cursor arbiter
    pub fn cursor(&self) -> &HudCursor {
        &self.cursor
    }

    /// Mutable cursor access for the host driver (position updates)
    pub fn cursor_mut(&mut self) -> &mut HudCursor {
        &mut self.cursor
    }

    // ---- lifecycle ------------------------------------------------------

    /// Create an unregistered element in the root space
    pub fn create_element(&mut self) -> NodeToken {
        let space = self.spaces.root();
        token_of(self.nodes.insert(ElementNode::new(space)))
    }

    /// Create an unregistered element with a widget, in the given space
    pub fn create_widget_element(
        &mut self,
        widget: Box<dyn HudElement>,
        space: SpaceKey,
    ) -> NodeToken {
        let mut node = ElementNode::new(space);
        node.widget = Some(widget);
        token_of(self.nodes.insert(node))
    }

    /// Graft a foreign module's subtree here as a remote node
    ///
    /// The accessor's identity stays the foreign module's business; the
    /// returned token names the local wrapper node. Traversal forwards
    /// layout, draw, and input through the tuple's capability
    /// functions.
    pub fn create_remote_element(&mut self, accessor: crate::interop::NodeAccessor) -> NodeToken {
        let space = self.spaces.root();
        let mut node = ElementNode::new(space);
        node.remote = Some(accessor);
        token_of(self.nodes.insert(node))
    }

    /// Attach a child accessor under `parent`, local or foreign
    ///
    /// A token resolving to a local node registers directly; anything
    /// else is wrapped as a remote node. Grafting the same foreign
    /// identity twice under one parent is a no-op.
    pub fn graft(&mut self, parent: NodeToken, child: crate::interop::NodeAccessor) {
        if !self.contains(parent) {
            return;
        }
        let identity = child.identity();
        if self.contains(identity) {
            self.register_child(parent, identity);
            return;
        }
        if self.resolve_child(key_of(parent), identity).is_some() {
            return;
        }
        let wrapper = self.create_remote_element(child);
        self.register_child(parent, wrapper);
        log::debug!("Grafted foreign subtree {:?} under {:?}", identity, parent);
    }

    /// Whether a token still resolves to a live node
    pub fn contains(&self, token: NodeToken) -> bool {
        self.nodes.contains_key(key_of(token))
    }

    /// Destroy a node, invalidating its token permanently
    ///
    /// Local children are cleared first so no child is left pointing at
    /// a dangling parent; the children themselves survive, back in the
    /// unregistered state. Any cursor capture the node held is dropped.
    pub fn destroy(&mut self, token: NodeToken) {
        let key = key_of(token);
        let Some(children) = self.nodes.get(key).map(|node| node.children.clone()) else {
            return;
        };
        for child in children {
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.parent = None;
            }
        }
        self.unregister(token);
        self.cursor.try_release(token);
        self.nodes.remove(key);
        log::debug!("Destroyed element {:?}", token);
    }

    // ---- registration ---------------------------------------------------

    /// Register `child` under `parent`
    ///
    /// Redundant registration to the same parent is a no-op that does
    /// not duplicate the child entry. Registration while attached to a
    /// different parent is refused. Returns whether the child is
    /// registered to `parent` afterwards.
    pub fn register(&mut self, child: NodeToken, parent: NodeToken) -> bool {
        let (child_key, parent_key) = (key_of(child), key_of(parent));
        if child_key == parent_key || !self.nodes.contains_key(parent_key) {
            return false;
        }
        match self.nodes.get(child_key).map(|node| node.parent) {
            None => false,
            Some(Some(current)) => current == parent_key,
            Some(None) => {
                if self.is_ancestor(child_key, parent_key) {
                    log::warn!("Refusing cyclic registration of {:?}", child);
                    return false;
                }
                self.nodes[parent_key].children.push(child_key);
                self.nodes[child_key].parent = Some(parent_key);
                true
            }
        }
    }

    /// Detach a node from its parent; safe to call when already
    /// unregistered
    pub fn unregister(&mut self, token: NodeToken) {
        let key = key_of(token);
        let Some(parent) = self.nodes.get(key).and_then(|node| node.parent) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|&child| child != key);
        }
        if let Some(node) = self.nodes.get_mut(key) {
            node.parent = None;
        }
    }

    /// Add `child` under `parent`, redirecting through the child's own
    /// registration
    ///
    /// A child already owned by a different parent is left alone; a
    /// child already owned by this parent is a no-op.
    pub fn register_child(&mut self, parent: NodeToken, child: NodeToken) {
        let child_parent = self.nodes.get(key_of(child)).map(|node| node.parent);
        match child_parent {
            Some(None) => {
                self.register(child, parent);
            }
            Some(Some(current)) if current == key_of(parent) => {}
            _ => {
                log::debug!(
                    "Ignoring register_child for {:?}: owned elsewhere or stale",
                    child
                );
            }
        }
    }

    /// Remove `child` from `parent`; removing an absent child is a
    /// no-op
    ///
    /// `child` may be a foreign identity; its wrapper node is found by
    /// scanning the parent's children and destroyed along with the
    /// detachment, since nothing else refers to it.
    pub fn remove_child(&mut self, parent: NodeToken, child: NodeToken) {
        let Some(child_key) = self.resolve_child(key_of(parent), child) else {
            return;
        };
        if self
            .nodes
            .get(child_key)
            .is_some_and(|node| node.remote.is_some())
        {
            self.destroy(token_of(child_key));
        } else {
            self.unregister(token_of(child_key));
        }
    }

    /// Move `child` to the end of `parent`'s traversal order
    ///
    /// Drawn last (on top), offered input first. A child not found in
    /// the list is a no-op. Foreign identities resolve through their
    /// wrapper node.
    pub fn set_focus(&mut self, parent: NodeToken, child: NodeToken) {
        let parent_key = key_of(parent);
        let Some(child_key) = self.resolve_child(parent_key, child) else {
            return;
        };
        let Some(parent_node) = self.nodes.get_mut(parent_key) else {
            return;
        };
        let Some(index) = parent_node
            .children
            .iter()
            .position(|&key| key == child_key)
        else {
            return;
        };
        let focused = parent_node.children.remove(index);
        parent_node.children.push(focused);
    }

    /// Find the child entry a token names: either a local node or the
    /// wrapper around a foreign subtree with that identity
    fn resolve_child(&self, parent: ElementKey, token: NodeToken) -> Option<ElementKey> {
        let key = key_of(token);
        if self
            .nodes
            .get(key)
            .is_some_and(|node| node.parent == Some(parent))
        {
            return Some(key);
        }
        let parent_node = self.nodes.get(parent)?;
        parent_node.children.iter().copied().find(|&child| {
            self.nodes
                .get(child)
                .and_then(|node| node.remote.as_ref())
                .is_some_and(|remote| remote.identity() == token)
        })
    }

    fn is_ancestor(&self, candidate: ElementKey, of: ElementKey) -> bool {
        let mut current = self.nodes.get(of).and_then(|node| node.parent);
        while let Some(key) = current {
            if key == candidate {
                return true;
            }
            current = self.nodes.get(key).and_then(|node| node.parent);
        }
        false
    }

    // ---- node attribute access ------------------------------------------

    /// Parent token, if the node is registered
    pub fn parent_of(&self, token: NodeToken) -> Option<NodeToken> {
        self.nodes
            .get(key_of(token))
            .and_then(|node| node.parent)
            .map(token_of)
    }

    /// Whether the node currently has a parent
    pub fn is_registered(&self, token: NodeToken) -> bool {
        self.nodes
            .get(key_of(token))
            .is_some_and(|node| node.parent.is_some())
    }

    /// Child tokens in traversal order
    pub fn children_of(&self, token: NodeToken) -> Vec<NodeToken> {
        self.nodes
            .get(key_of(token))
            .map(|node| node.children.iter().copied().map(token_of).collect())
            .unwrap_or_default()
    }

    /// The node's own visibility flag
    pub fn is_visible(&self, token: NodeToken) -> bool {
        self.nodes
            .get(key_of(token))
            .is_some_and(|node| node.visible)
    }

    /// Set the node's visibility flag
    pub fn set_visible(&mut self, token: NodeToken, visible: bool) {
        if let Some(node) = self.nodes.get_mut(key_of(token)) {
            node.visible = visible;
        }
    }

    /// The node's z-offset hint
    pub fn z_offset(&self, token: NodeToken) -> i32 {
        self.nodes
            .get(key_of(token))
            .map_or(0, |node| node.z_offset)
    }

    /// Set the node's z-offset hint
    pub fn set_z_offset(&mut self, token: NodeToken, z_offset: i32) {
        if let Some(node) = self.nodes.get_mut(key_of(token)) {
            node.z_offset = z_offset;
        }
    }

    /// The node's cached rich text
    pub fn text(&self, token: NodeToken) -> Option<&RichText> {
        self.nodes.get(key_of(token)).and_then(|node| node.text.as_ref())
    }

    /// Replace the node's cached rich text
    pub fn set_text(&mut self, token: NodeToken, text: RichText) {
        if let Some(node) = self.nodes.get_mut(key_of(token)) {
            node.text = Some(text);
        }
    }

    /// The space the node lays out in
    pub fn space_of(&self, token: NodeToken) -> Option<SpaceKey> {
        self.nodes.get(key_of(token)).map(|node| node.space)
    }

    /// Re-anchor the node to a different space
    pub fn set_space(&mut self, token: NodeToken, space: SpaceKey) {
        if self.spaces.node(space).is_none() {
            return;
        }
        if let Some(node) = self.nodes.get_mut(key_of(token)) {
            node.space = space;
        }
    }

    // ---- per-frame passes ------------------------------------------------

    /// Layout pass: refresh every space transform (parent before
    /// child), then walk the visible element tree top-down
    pub fn layout(&mut self, camera: &dyn CameraService, refresh: bool) {
        let cursor_screen = self.cursor.screen_pos();
        self.spaces.update(camera, cursor_screen);
        self.layout_subtree(self.root, refresh);
    }

    /// Layout a single subtree against the already-computed transforms
    ///
    /// This is what a node's exported layout capability runs; the
    /// full-tree pass above is the root case.
    pub(crate) fn layout_subtree(&mut self, start: ElementKey, refresh: bool) {
        let mut order = Vec::new();
        self.collect_visible(start, false, &mut order);
        for key in order {
            if let Some(remote) = self.remote_of(key) {
                remote.layout(refresh);
                continue;
            }
            let Some((space, widget)) = self
                .nodes
                .get_mut(key)
                .map(|node| (node.space, node.widget.take()))
            else {
                continue;
            };
            let Some(mut widget) = widget else {
                continue;
            };
            if let Some(space) = self.spaces.node(space) {
                let mut ctx = LayoutContext {
                    plane_to_world: *space.plane_to_world(),
                    is_facing_camera: space.is_facing_camera(),
                    is_in_front: space.is_in_front(),
                    refresh,
                };
                widget.layout(&mut ctx);
            }
            if let Some(node) = self.nodes.get_mut(key) {
                node.widget = Some(widget);
            }
        }
    }

    /// Draw pass: forward order, invisible subtrees skipped wholesale,
    /// queued commands flushed to the backend in layer order
    pub fn draw(&mut self, backend: &mut dyn DrawBackend) {
        self.draw_queue.clear();
        self.draw_subtree(self.root);
        self.draw_queue.flush(backend);
    }

    pub(crate) fn draw_subtree(&mut self, start: ElementKey) {
        self.draw_subtree_layer(start, None);
    }

    /// Queue draw commands for a subtree, optionally restricted to one
    /// layer
    ///
    /// The layer restriction backs the exported per-layer draw
    /// capability: a composing module calls it once per layer and each
    /// node contributes only where its z-offset puts it.
    pub(crate) fn draw_subtree_layer(&mut self, start: ElementKey, only_layer: Option<u8>) {
        let mut order = Vec::new();
        self.collect_visible(start, false, &mut order);
        for key in order {
            if let Some(remote) = self.remote_of(key) {
                // A foreign subtree draws through its own capability,
                // once per layer for a full pass
                match only_layer {
                    Some(layer) => remote.draw(layer),
                    None => {
                        for layer in 0..DRAW_LAYER_COUNT {
                            remote.draw(layer);
                        }
                    }
                }
                continue;
            }
            let Some((space, z_offset, widget)) = self
                .nodes
                .get_mut(key)
                .map(|node| (node.space, node.z_offset, node.widget.take()))
            else {
                continue;
            };
            let Some(mut widget) = widget else {
                continue;
            };
            let layer = draw_layer(z_offset);
            if only_layer.is_none_or(|selected| selected == layer) {
                if let Some(space) = self.spaces.node(space) {
                    let plane = *space.plane_to_world();
                    let text = self.nodes.get(key).and_then(|node| node.text.clone());
                    let mut ctx = self.draw_queue.context(plane, layer, text.as_ref());
                    widget.draw(&mut ctx);
                }
            }
            if let Some(node) = self.nodes.get_mut(key) {
                node.widget = Some(widget);
            }
        }
    }

    /// Input pass: reverse order, so the most recently focused element
    /// is offered input first and may claim capture before siblings or
    /// ancestors see it
    pub fn handle_input(&mut self) {
        self.input_subtree(self.root);
    }

    pub(crate) fn input_subtree(&mut self, start: ElementKey) {
        let mut order = Vec::new();
        self.collect_visible(start, true, &mut order);
        for key in order {
            if let Some(remote) = self.remote_of(key) {
                remote.handle_input();
                continue;
            }
            let Some((space, widget)) = self
                .nodes
                .get_mut(key)
                .map(|node| (node.space, node.widget.take()))
            else {
                continue;
            };
            let Some(mut widget) = widget else {
                continue;
            };
            if let Some(space) = self.spaces.node(space) {
                let mut ctx = InputContext {
                    cursor_pos: space.cursor_pos(),
                    is_facing_camera: space.is_facing_camera(),
                    token: token_of(key),
                    cursor: &mut self.cursor,
                    binds: self.binds.as_ref(),
                };
                widget.handle_input(&mut ctx);
            }
            if let Some(node) = self.nodes.get_mut(key) {
                node.widget = Some(widget);
            }
        }
    }

    fn remote_of(&self, key: ElementKey) -> Option<crate::interop::NodeAccessor> {
        self.nodes.get(key).and_then(|node| node.remote.clone())
    }

    /// Collect the traversal order for one pass
    ///
    /// Forward: node before its children, children in list order (draw
    /// z-ordering). Reverse: children in reverse list order before the
    /// node (input priority). Invisible nodes prune their whole
    /// subtree regardless of descendant flags. A grafted foreign
    /// subtree also answers through its own visibility capability.
    fn collect_visible(&self, key: ElementKey, reverse: bool, out: &mut Vec<ElementKey>) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        if !node.visible {
            return;
        }
        if node.remote.as_ref().is_some_and(|remote| !remote.is_visible()) {
            return;
        }
        if reverse {
            for &child in node.children.iter().rev() {
                self.collect_visible(child, reverse, out);
            }
            out.push(key);
        } else {
            out.push(key);
            for &child in &node.children {
                self.collect_visible(child, reverse, out);
            }
        }
    }

    /// Visit order of the draw pass, as tokens (diagnostics and tests)
    pub fn draw_order(&self) -> Vec<NodeToken> {
        let mut order = Vec::new();
        self.collect_visible(self.root, false, &mut order);
        order.into_iter().map(token_of).collect()
    }

    /// Visit order of the input pass, as tokens (diagnostics and tests)
    pub fn input_order(&self) -> Vec<NodeToken> {
        let mut order = Vec::new();
        self.collect_visible(self.root, true, &mut order);
        order.into_iter().map(token_of).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> HudTree {
        HudTree::new(&HudConfig::default())
    }

    #[test]
    fn test_register_child_relationship() {
        let mut t = tree();
        let a = t.create_element();
        let b = t.create_element();
        t.register_child(t.root(), a);
        t.register_child(a, b);

        assert_eq!(t.parent_of(b), Some(a));
        assert_eq!(t.children_of(a), vec![b]);
        assert!(t.is_registered(b));

        t.remove_child(a, b);
        assert_eq!(t.parent_of(b), None);
        assert!(t.children_of(a).is_empty());
    }

    #[test]
    fn test_redundant_register_does_not_duplicate() {
        let mut t = tree();
        let a = t.create_element();
        assert!(t.register(a, t.root()));
        assert!(t.register(a, t.root()));
        assert_eq!(t.children_of(t.root()).len(), 1);
    }

    #[test]
    fn test_register_to_second_parent_is_refused() {
        let mut t = tree();
        let a = t.create_element();
        let b = t.create_element();
        let c = t.create_element();
        t.register_child(t.root(), a);
        t.register_child(t.root(), b);
        t.register_child(a, c);

        // c already belongs to a; b's claim is ignored
        t.register_child(b, c);
        assert_eq!(t.parent_of(c), Some(a));
        assert!(t.children_of(b).is_empty());
        assert!(!t.register(c, b));
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let mut t = tree();
        let a = t.create_element();
        t.register_child(t.root(), a);

        t.unregister(a);
        let after_once = t.children_of(t.root());
        t.unregister(a);
        assert_eq!(t.children_of(t.root()), after_once);
        assert_eq!(t.parent_of(a), None);
    }

    #[test]
    fn test_focus_reorders_draw_and_input() {
        let mut t = tree();
        let x = t.create_element();
        let y = t.create_element();
        let z = t.create_element();
        for child in [x, y, z] {
            t.register_child(t.root(), child);
        }

        t.set_focus(t.root(), x);
        assert_eq!(t.children_of(t.root()), vec![y, z, x]);

        let draw: Vec<_> = t.draw_order().into_iter().skip(1).collect();
        assert_eq!(draw, vec![y, z, x]);
        let input: Vec<_> = t.input_order();
        assert_eq!(&input[..3], &[x, z, y]);
    }

    #[test]
    fn test_focus_on_absent_child_is_noop() {
        let mut t = tree();
        let a = t.create_element();
        let stranger = t.create_element();
        t.register_child(t.root(), a);
        t.set_focus(t.root(), stranger);
        assert_eq!(t.children_of(t.root()), vec![a]);
    }

    #[test]
    fn test_invisible_subtree_is_pruned() {
        let mut t = tree();
        let parent = t.create_element();
        let child = t.create_element();
        t.register_child(t.root(), parent);
        t.register_child(parent, child);

        t.set_visible(parent, false);
        // child stays individually visible but is not traversed
        assert!(t.is_visible(child));
        assert!(!t.draw_order().contains(&child));
        assert!(!t.input_order().contains(&parent));
    }

    #[test]
    fn test_destroy_clears_children_and_token() {
        let mut t = tree();
        let parent = t.create_element();
        let child = t.create_element();
        t.register_child(t.root(), parent);
        t.register_child(parent, child);
        t.cursor_mut().capture(parent);

        t.destroy(parent);
        assert!(!t.contains(parent));
        // child survives, unregistered
        assert!(t.contains(child));
        assert!(!t.is_registered(child));
        // capture the node held is gone
        assert!(!t.cursor().is_captured());
        // operations on the dead token are silent no-ops
        t.set_visible(parent, true);
        t.unregister(parent);
        assert_eq!(t.parent_of(parent), None);
    }

    #[test]
    fn test_resolution_scale_config_reaches_root_frame() {
        use crate::config::SpaceConfig;
        use crate::space::FixedCamera;

        let config = HudConfig {
            space: SpaceConfig {
                use_resolution_scale: true,
            },
            ..HudConfig::default()
        };
        let mut t = HudTree::new(&config);
        let camera = FixedCamera {
            resolution_scale: 2.0,
            ..FixedCamera::default()
        };
        t.layout(&camera, false);

        // FOV scale 1.0 doubled by the opted-in resolution factor
        let root_space = t.spaces().node(t.spaces().root()).unwrap();
        assert_eq!(root_space.plane_to_world()[(0, 0)], 2.0);

        // Default config leaves the resolution factor out
        let mut plain = HudTree::new(&HudConfig::default());
        plain.layout(&camera, false);
        let plain_root = plain.spaces().node(plain.spaces().root()).unwrap();
        assert_eq!(plain_root.plane_to_world()[(0, 0)], 1.0);
    }

    #[test]
    fn test_cyclic_registration_refused() {
        let mut t = tree();
        let a = t.create_element();
        let b = t.create_element();
        t.register_child(t.root(), a);
        t.register_child(a, b);
        assert!(!t.register(a, b));
        assert_eq!(t.parent_of(a), Some(t.root()));
    }
}
