//! Tagged-union value type crossing the module boundary
//!
//! Accessor calls carry one of these in each direction. Keeping the
//! payload a closed, self-describing union turns "unexpected shape" into
//! a checked branch on the consumer side instead of a runtime cast
//! failure. Key principle borrowed from the event system pattern: a
//! small enum of plain variants, with typed extractors returning
//! `Option` so callers degrade gracefully.

use super::accessor::{NodeAccessor, NodeToken};
use crate::foundation::math::Vec2;

/// Self-describing value passed through `get_or_set` calls
///
/// `None` doubles as the read-request payload and the harmless default
/// returned for unknown member codes or stale tokens.
#[derive(Clone, Default)]
pub enum ApiValue {
    /// Absent payload: signals a read, or a no-op result
    #[default]
    None,
    /// Boolean flag
    Bool(bool),
    /// Signed integer (member codes use this for z-offsets and counts)
    Int(i64),
    /// Single-precision float
    Float(f32),
    /// 2D vector (cursor positions, sizes)
    Vec2(Vec2),
    /// Owned string
    Str(String),
    /// Opaque identity token, equality-comparable only
    Token(NodeToken),
    /// Nested accessor tuple for a child object
    Accessor(NodeAccessor),
    /// Ordered list of nested values (rich-text runs, child enumerations)
    List(Vec<ApiValue>),
}

impl ApiValue {
    /// Whether this value is the absent/read-request payload
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Extract a boolean, if that is what this value holds
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Extract a signed integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Extract a float
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Extract a 2D vector
    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            Self::Vec2(value) => Some(*value),
            _ => None,
        }
    }

    /// Extract a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Extract an identity token
    pub fn as_token(&self) -> Option<NodeToken> {
        match self {
            Self::Token(token) => Some(*token),
            _ => None,
        }
    }

    /// Extract a nested accessor tuple
    pub fn as_accessor(&self) -> Option<&NodeAccessor> {
        match self {
            Self::Accessor(accessor) => Some(accessor),
            _ => None,
        }
    }

    /// Extract a nested value list
    pub fn as_list(&self) -> Option<&[ApiValue]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ApiValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::Int(v) => write!(f, "Int({v})"),
            Self::Float(v) => write!(f, "Float({v})"),
            Self::Vec2(v) => write!(f, "Vec2({}, {})", v.x, v.y),
            Self::Str(v) => write!(f, "Str({v:?})"),
            Self::Token(t) => write!(f, "Token({t:?})"),
            Self::Accessor(a) => write!(f, "Accessor({:?})", a.identity()),
            Self::List(v) => write!(f, "List(len={})", v.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractors_are_shape_checked() {
        let value = ApiValue::Int(42);
        assert_eq!(value.as_int(), Some(42));
        assert_eq!(value.as_bool(), None);
        assert_eq!(value.as_str(), None);
        assert!(!value.is_none());
    }

    #[test]
    fn test_none_is_default() {
        assert!(ApiValue::default().is_none());
    }
}
