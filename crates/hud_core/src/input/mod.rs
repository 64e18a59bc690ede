//! Input subsystem
//!
//! The cursor-capture arbiter owned by the tree, plus the interface to
//! the external key-binding collaborator. The core only consumes
//! already-debounced bind signals; chord matching lives upstream.

pub mod binds;
pub mod cursor;

pub use binds::{BindAction, BindSource, NullBinds};
pub use cursor::HudCursor;
