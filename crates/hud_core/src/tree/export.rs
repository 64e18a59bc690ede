//! Provider-side accessor export
//!
//! Builds the fixed capability tuple for any live node so consumers in
//! other modules can drive it without shared types. Every closure holds
//! a weak tree handle and re-resolves the token on each call: a token
//! whose node has been destroyed, or a tree that has been torn down,
//! turns every capability into a silent no-op. Writes use
//! `try_borrow_mut`, so a provider accessor invoked re-entrantly from
//! inside another pending accessor call is absorbed rather than
//! faulting.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::{key_of, HudTree};
use crate::interop::{ApiValue, MemberCode, NodeAccessor, NodeToken, TreeMember};
use crate::text::RichText;

/// Export an accessor tuple for the given node
///
/// The tuple stays valid-but-inert after the node is destroyed; it is
/// never reissued for a different node.
pub fn export_node(tree: &Rc<RefCell<HudTree>>, token: NodeToken) -> NodeAccessor {
    let visible = {
        let tree = Rc::downgrade(tree);
        move || {
            with_tree(&tree, |t| t.is_visible(token)).unwrap_or(false)
        }
    };
    let layout = {
        let tree = Rc::downgrade(tree);
        move |refresh: bool| {
            with_tree_mut(&tree, |t| t.layout_subtree(key_of(token), refresh));
        }
    };
    let draw = {
        let tree = Rc::downgrade(tree);
        move |layer: u8| {
            with_tree_mut(&tree, |t| t.draw_subtree_layer(key_of(token), Some(layer)));
        }
    };
    let input = {
        let tree = Rc::downgrade(tree);
        move || {
            with_tree_mut(&tree, |t| t.input_subtree(key_of(token)));
        }
    };
    let get_or_set = {
        let tree = Rc::downgrade(tree);
        move |data: ApiValue, code: MemberCode| dispatch(&tree, token, &data, code)
    };

    NodeAccessor::new(
        token,
        Rc::new(visible),
        Rc::new(layout),
        Rc::new(draw),
        Rc::new(input),
        Rc::new(get_or_set),
    )
}

/// Export the tree's root accessor, the steady-state output of the
/// registration handshake
pub fn export_root(tree: &Rc<RefCell<HudTree>>) -> NodeAccessor {
    let root = tree.borrow().root();
    export_node(tree, root)
}

fn with_tree<R>(tree: &Weak<RefCell<HudTree>>, f: impl FnOnce(&HudTree) -> R) -> Option<R> {
    let tree = tree.upgrade()?;
    let borrowed = tree.try_borrow().ok()?;
    Some(f(&borrowed))
}

fn with_tree_mut<R>(tree: &Weak<RefCell<HudTree>>, f: impl FnOnce(&mut HudTree) -> R) -> Option<R> {
    let Some(tree) = tree.upgrade() else {
        return None;
    };
    let Ok(mut borrowed) = tree.try_borrow_mut() else {
        log::warn!("Re-entrant accessor write absorbed as no-op");
        return None;
    };
    Some(f(&mut borrowed))
}

/// Generic member dispatch for one node
///
/// Absent payload signals a read, anything else a write. Unknown codes
/// and shape mismatches answer [`ApiValue::None`] with no side effects;
/// widget-range codes belong to leaf widgets and are equally inert
/// here.
fn dispatch(
    tree: &Weak<RefCell<HudTree>>,
    token: NodeToken,
    data: &ApiValue,
    code: MemberCode,
) -> ApiValue {
    let Some(member) = TreeMember::from_code(code) else {
        log::trace!("Unknown member code {} on {:?}, ignoring", code, token);
        return ApiValue::None;
    };

    match member {
        TreeMember::Identity => with_tree(tree, |t| t.contains(token))
            .filter(|live| *live)
            .map_or(ApiValue::None, |_| ApiValue::Token(token)),
        TreeMember::GetParent => with_tree(tree, |t| t.parent_of(token))
            .flatten()
            .map_or(ApiValue::None, ApiValue::Token),
        TreeMember::IsRegistered => with_tree(tree, |t| t.is_registered(token))
            .map_or(ApiValue::None, ApiValue::Bool),
        TreeMember::GetVisible => {
            with_tree(tree, |t| t.is_visible(token)).map_or(ApiValue::None, ApiValue::Bool)
        }
        TreeMember::SetVisible => {
            if let Some(visible) = data.as_bool() {
                with_tree_mut(tree, |t| t.set_visible(token, visible));
            }
            ApiValue::None
        }
        TreeMember::GetZOffset => with_tree(tree, |t| t.z_offset(token))
            .map_or(ApiValue::None, |z| ApiValue::Int(i64::from(z))),
        TreeMember::SetZOffset => {
            if let Some(z) = data.as_int().and_then(|z| i32::try_from(z).ok()) {
                with_tree_mut(tree, |t| t.set_z_offset(token, z));
            }
            ApiValue::None
        }
        TreeMember::AddChild => {
            // An accessor payload may name a node of another module's
            // tree; those graft in as remote children
            if let Some(child) = data.as_accessor() {
                let child = child.clone();
                with_tree_mut(tree, |t| t.graft(token, child));
            } else if let Some(child) = data.as_token() {
                with_tree_mut(tree, |t| t.register_child(token, child));
            }
            ApiValue::None
        }
        TreeMember::RemoveChild => {
            if let Some(child) = payload_token(data) {
                with_tree_mut(tree, |t| t.remove_child(token, child));
            }
            ApiValue::None
        }
        TreeMember::SetFocus => {
            if let Some(child) = payload_token(data) {
                with_tree_mut(tree, |t| t.set_focus(token, child));
            }
            ApiValue::None
        }
        TreeMember::GetText => with_tree(tree, |t| t.text(token).map(RichText::to_value))
            .flatten()
            .unwrap_or(ApiValue::None),
        TreeMember::SetText => {
            if let Some(text) = RichText::from_value(data) {
                with_tree_mut(tree, |t| t.set_text(token, text));
            }
            ApiValue::None
        }
    }
}

/// Child references arrive either as a bare token or a nested accessor
fn payload_token(data: &ApiValue) -> Option<NodeToken> {
    data.as_token()
        .or_else(|| data.as_accessor().map(NodeAccessor::identity))
}
