//! Cursor-capture arbiter
//!
//! Single per-tree authority over exclusive pointer ownership. At most
//! one element token holds capture at a time; capture is won by
//! explicit request, not by z-order. Granting capture to a new token
//! silently revokes the previous holder, which detects the loss by
//! polling [`HudCursor::is_capturing`]. This models drag-to-resize,
//! slider, and text-edit interactions where exactly one element should
//! receive pointer motion once capture is won.

use crate::foundation::math::Vec2;
use crate::interop::NodeToken;

/// Cursor state and capture slot
///
/// Mutated only during the input pass; read-only elsewhere in the
/// frame.
#[derive(Debug, Clone)]
pub struct HudCursor {
    screen_pos: Vec2,
    visible: bool,
    captured: Option<NodeToken>,
}

impl HudCursor {
    /// Create a cursor with the given initial visibility
    pub fn new(visible: bool) -> Self {
        Self {
            screen_pos: Vec2::zeros(),
            visible,
            captured: None,
        }
    }

    /// Current position in screen coordinates
    pub fn screen_pos(&self) -> Vec2 {
        self.screen_pos
    }

    /// Update the screen position (driven by the host once per frame)
    pub fn set_screen_pos(&mut self, pos: Vec2) {
        self.screen_pos = pos;
    }

    /// Whether the cursor is currently shown
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the cursor
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            log::debug!("Cursor visibility changed to {}", visible);
        }
        self.visible = visible;
    }

    /// Token currently holding capture, if any
    pub fn captured(&self) -> Option<NodeToken> {
        self.captured
    }

    /// Whether any element currently holds capture
    pub fn is_captured(&self) -> bool {
        self.captured.is_some()
    }

    /// Whether the given token currently holds capture
    pub fn is_capturing(&self, token: NodeToken) -> bool {
        self.captured == Some(token)
    }

    /// Unconditionally reassign capture to the given token
    ///
    /// Any previous holder is revoked without notification.
    pub fn capture(&mut self, token: NodeToken) {
        if self.captured != Some(token) {
            log::trace!("Cursor captured by {:?}", token);
        }
        self.captured = Some(token);
    }

    /// Claim capture only if free or already held by this token
    ///
    /// Returns whether the token holds capture afterwards.
    pub fn try_capture(&mut self, token: NodeToken) -> bool {
        match self.captured {
            None => {
                self.capture(token);
                true
            }
            Some(holder) => holder == token,
        }
    }

    /// Release capture only if held by the given token
    ///
    /// Releasing capture not currently held is a no-op that returns
    /// false, never an error.
    pub fn try_release(&mut self, token: NodeToken) -> bool {
        if self.captured == Some(token) {
            log::trace!("Cursor released by {:?}", token);
            self.captured = None;
            true
        } else {
            false
        }
    }

    /// Drop capture regardless of holder
    ///
    /// Called when the holding element is destroyed mid-frame.
    pub fn release_all(&mut self) {
        self.captured = None;
    }
}

impl Default for HudCursor {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(raw: u64) -> NodeToken {
        NodeToken::from_raw(raw)
    }

    #[test]
    fn test_capture_is_exclusive() {
        let mut cursor = HudCursor::default();
        let (t1, t2) = (token(1), token(2));

        cursor.capture(t1);
        assert!(cursor.is_capturing(t1));

        cursor.capture(t2);
        assert!(!cursor.is_capturing(t1));
        assert!(cursor.is_capturing(t2));

        // The revoked holder cannot release what it no longer owns
        assert!(!cursor.try_release(t1));
        assert!(cursor.is_capturing(t2));
    }

    #[test]
    fn test_try_capture_respects_holder() {
        let mut cursor = HudCursor::default();
        let (t1, t2) = (token(1), token(2));

        assert!(cursor.try_capture(t1));
        // Redundant claim by the holder succeeds
        assert!(cursor.try_capture(t1));
        // A competing claim fails while capture is held
        assert!(!cursor.try_capture(t2));

        assert!(cursor.try_release(t1));
        assert!(cursor.try_capture(t2));
    }

    #[test]
    fn test_release_all_clears_holder() {
        let mut cursor = HudCursor::default();
        cursor.capture(token(9));
        cursor.release_all();
        assert!(!cursor.is_captured());
        assert!(!cursor.try_release(token(9)));
    }
}
