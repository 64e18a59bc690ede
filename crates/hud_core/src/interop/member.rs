//! Member enumeration codes
//!
//! Small integer codes, agreed by convention between provider and
//! consumer, identifying which logical property or operation a
//! `get_or_set` call addresses. Codes are stable once published; a
//! receiver that does not recognize a code answers with a harmless
//! default rather than raising, which is the entire forward/backward
//! compatibility story of the protocol.

/// Wire representation of a member code
pub type MemberCode = u16;

/// First code reserved for leaf-widget properties
///
/// Everything below this is owned by the tree core; concrete widgets
/// define their numeric/text properties from here up.
pub const WIDGET_MEMBER_BASE: MemberCode = 128;

/// Tree-level member codes understood by every element node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TreeMember {
    /// Read the node's identity token
    Identity = 1,
    /// Write: append a child token to this node's child list
    AddChild = 2,
    /// Write: detach a child token from this node
    RemoveChild = 3,
    /// Write: move a child token to the end of the traversal order
    SetFocus = 4,
    /// Read the parent's identity token, if registered
    GetParent = 5,
    /// Read whether the node currently has a parent
    IsRegistered = 6,
    /// Read the node's local visibility flag
    GetVisible = 7,
    /// Write the node's local visibility flag
    SetVisible = 8,
    /// Read the draw-layer hint
    GetZOffset = 9,
    /// Write the draw-layer hint
    SetZOffset = 10,
    /// Read the node's cached rich text in tuple form
    GetText = 11,
    /// Write the node's cached rich text from tuple form
    SetText = 12,
}

impl TreeMember {
    /// Decode a wire code, returning `None` for anything this build of
    /// the protocol does not know about
    pub fn from_code(code: MemberCode) -> Option<Self> {
        match code {
            1 => Some(Self::Identity),
            2 => Some(Self::AddChild),
            3 => Some(Self::RemoveChild),
            4 => Some(Self::SetFocus),
            5 => Some(Self::GetParent),
            6 => Some(Self::IsRegistered),
            7 => Some(Self::GetVisible),
            8 => Some(Self::SetVisible),
            9 => Some(Self::GetZOffset),
            10 => Some(Self::SetZOffset),
            11 => Some(Self::GetText),
            12 => Some(Self::SetText),
            _ => None,
        }
    }

    /// Encode for the wire
    pub fn code(self) -> MemberCode {
        self as MemberCode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for member in [
            TreeMember::Identity,
            TreeMember::AddChild,
            TreeMember::RemoveChild,
            TreeMember::SetFocus,
            TreeMember::GetParent,
            TreeMember::IsRegistered,
            TreeMember::GetVisible,
            TreeMember::SetVisible,
            TreeMember::GetZOffset,
            TreeMember::SetZOffset,
            TreeMember::GetText,
            TreeMember::SetText,
        ] {
            assert_eq!(TreeMember::from_code(member.code()), Some(member));
        }
    }

    #[test]
    fn test_unknown_codes_decode_to_none() {
        assert_eq!(TreeMember::from_code(0), None);
        assert_eq!(TreeMember::from_code(99), None);
        assert_eq!(TreeMember::from_code(WIDGET_MEMBER_BASE), None);
        assert_eq!(TreeMember::from_code(MemberCode::MAX), None);
    }
}
