//! Key-binding collaborator interface
//!
//! The bind subsystem lives outside this core. It delivers named,
//! already-debounced boolean signals per logical action; the input pass
//! reads them and nothing more.

/// Logical input actions the core's input pass may consult
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindAction {
    /// Primary select / click
    Select,
    /// Navigate back / close
    Back,
    /// Delete the focused item
    Delete,
    /// Confirm / commit
    Enter,
    /// Scroll up one step
    ScrollUp,
    /// Scroll down one step
    ScrollDown,
}

/// Source of debounced bind signals
pub trait BindSource {
    /// Whether the action was newly pressed this tick
    fn is_pressed(&self, action: BindAction) -> bool;

    /// Whether the action is pressed and being held
    fn is_held(&self, action: BindAction) -> bool;
}

/// Bind source that reports nothing pressed
///
/// Used by tests and headless frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBinds;

impl BindSource for NullBinds {
    fn is_pressed(&self, _action: BindAction) -> bool {
        false
    }

    fn is_held(&self, _action: BindAction) -> bool {
        false
    }
}
