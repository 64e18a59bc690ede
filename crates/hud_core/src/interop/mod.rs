//! Module-boundary interop protocol
//!
//! Lets a provider module expose mutable object graphs to arbitrary
//! consumer modules using only plain data and function handles. Nothing
//! crossing the boundary is dereferenced directly: consumers hold opaque
//! identity tokens and a fixed tuple of capability functions, and every
//! read/write goes through the generic [`get_or_set`] entry point keyed
//! by an integer member code.
//!
//! Architecture:
//! - [`value`]: tagged-union payload type (`ApiValue`)
//! - [`member`]: member enumeration codes and unknown-code tolerance
//! - [`accessor`]: the accessor tuple and identity tokens
//! - [`proxy`]: consumer-side typed views over accessor tuples
//! - [`handshake`]: one-time registration handshake over a message bus
//!
//! [`get_or_set`]: accessor::NodeAccessor::get_or_set

pub mod accessor;
pub mod handshake;
pub mod member;
pub mod proxy;
pub mod value;

pub use accessor::{NodeAccessor, NodeToken};
pub use handshake::{
    BusMessage, ChannelId, LocalBus, MessageBus, RegistrationClient, RegistrationError,
    RegistrationHost, UnregisterFn, REGISTRATION_CHANNEL, REGISTRATION_QUEUE_CHANNEL,
};
pub use member::{MemberCode, TreeMember, WIDGET_MEMBER_BASE};
pub use proxy::{HasChildren, HasParent, NodeProxy, ParentChange};
pub use value::ApiValue;
