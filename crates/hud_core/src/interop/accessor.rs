//! Accessor tuples and identity tokens
//!
//! The only things a consumer ever holds for a provider-side object: an
//! opaque identity token plus a fixed-arity tuple of capability
//! functions. The tuple layout is the protocol contract — exact arity
//! and ordering must match between provider and consumer builds of a
//! given protocol version; version skew is handled solely by the
//! unknown-member-code rule, never by structural negotiation.

use std::rc::Rc;

use super::member::MemberCode;
use super::value::ApiValue;

/// Opaque identity for a cross-module object
///
/// Compared for equality only, never dereferenced by the consumer. The
/// provider maintains the authoritative map from token to live object,
/// and guarantees a token is never reused for a different object after
/// the original is unregistered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeToken(u64);

impl NodeToken {
    /// Wrap a provider-assigned raw token value
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw token value, for the provider's own bookkeeping
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

/// Visibility query capability
pub type VisibleFn = Rc<dyn Fn() -> bool>;
/// Layout callback capability; the flag requests a full refresh
pub type LayoutFn = Rc<dyn Fn(bool)>;
/// Draw callback capability, keyed by draw-layer index
pub type DrawFn = Rc<dyn Fn(u8)>;
/// Input callback capability
pub type InputFn = Rc<dyn Fn()>;
/// Generic read/write entry point keyed by member code
pub type GetOrSetFn = Rc<dyn Fn(ApiValue, MemberCode) -> ApiValue>;

/// Fixed tuple of capability functions exposing one provider object
///
/// Calls are synchronous, re-entrant-safe function calls with the cost
/// profile of a local virtual call; nothing is queued. Once the
/// provider side unregisters the object, every capability becomes a
/// silent no-op (reads answer [`ApiValue::None`]).
#[derive(Clone)]
pub struct NodeAccessor {
    identity: NodeToken,
    visible: VisibleFn,
    layout: LayoutFn,
    draw: DrawFn,
    input: InputFn,
    get_or_set: GetOrSetFn,
}

impl NodeAccessor {
    /// Assemble an accessor tuple from its capability functions
    ///
    /// Providers call this when first exposing an object; the argument
    /// order here is the wire contract.
    pub fn new(
        identity: NodeToken,
        visible: VisibleFn,
        layout: LayoutFn,
        draw: DrawFn,
        input: InputFn,
        get_or_set: GetOrSetFn,
    ) -> Self {
        Self {
            identity,
            visible,
            layout,
            draw,
            input,
            get_or_set,
        }
    }

    /// The object's identity token
    pub fn identity(&self) -> NodeToken {
        self.identity
    }

    /// Query the object's own visibility flag
    pub fn is_visible(&self) -> bool {
        (self.visible)()
    }

    /// Invoke the layout callback; `refresh` requests a full rebuild
    pub fn layout(&self, refresh: bool) {
        (self.layout)(refresh);
    }

    /// Invoke the draw callback for the given layer index
    pub fn draw(&self, layer: u8) {
        (self.draw)(layer);
    }

    /// Invoke the input callback
    pub fn handle_input(&self) {
        (self.input)();
    }

    /// Generic read/write entry point
    ///
    /// `data` absent ([`ApiValue::None`]) signals a read; anything else
    /// is a write. Unknown codes answer [`ApiValue::None`] without side
    /// effects.
    pub fn get_or_set(&self, data: ApiValue, code: MemberCode) -> ApiValue {
        (self.get_or_set)(data, code)
    }

    /// Convenience read-shaped call
    pub fn read(&self, code: MemberCode) -> ApiValue {
        self.get_or_set(ApiValue::None, code)
    }

    /// Convenience write-shaped call; the result is ignored unless the
    /// member code defines otherwise
    pub fn write(&self, code: MemberCode, data: ApiValue) -> ApiValue {
        self.get_or_set(data, code)
    }
}

impl PartialEq for NodeAccessor {
    /// Identity-token equality; capability handles are never compared
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for NodeAccessor {}

impl std::fmt::Debug for NodeAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeAccessor")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
