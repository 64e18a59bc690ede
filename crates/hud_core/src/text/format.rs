//! Glyph formatting carried alongside text runs
//!
//! Formatting is always carried explicitly per run, never inferred from
//! content.

use bitflags::bitflags;

use crate::foundation::math::Vec4;

bitflags! {
    /// Font style flags for a text run
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FontStyle: u32 {
        /// No styling
        const REGULAR = 0;
        /// Bold weight
        const BOLD = 1 << 0;
        /// Italic slant
        const ITALIC = 1 << 1;
        /// Underlined
        const UNDERLINE = 1 << 2;
    }
}

/// Horizontal alignment of a text block within its element bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlignment {
    /// Left-aligned text
    Left,
    /// Center-aligned text
    Center,
    /// Right-aligned text
    Right,
}

impl TextAlignment {
    /// Encode for the interop tuple form
    pub fn code(self) -> i64 {
        match self {
            Self::Left => 0,
            Self::Center => 1,
            Self::Right => 2,
        }
    }

    /// Decode from the interop tuple form, defaulting to left for
    /// codes from a newer protocol version
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Center,
            2 => Self::Right,
            _ => Self::Left,
        }
    }
}

/// Formatting applied to one run of characters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphFormat {
    /// Text color (RGBA, 0.0 to 1.0 per channel)
    pub color: Vec4,

    /// Style flags (bold, italic, underline)
    pub style: FontStyle,

    /// Glyph size in local plane units
    pub size: f32,

    /// Block alignment hint
    pub alignment: TextAlignment,
}

impl Default for GlyphFormat {
    fn default() -> Self {
        Self {
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            style: FontStyle::REGULAR,
            size: 1.0,
            alignment: TextAlignment::Left,
        }
    }
}

impl GlyphFormat {
    /// Create a format with the given color, keeping other defaults
    pub fn with_color(color: Vec4) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// Builder-style style override
    pub fn style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    /// Builder-style size override
    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Builder-style alignment override
    pub fn alignment(mut self, alignment: TextAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_flags_compose() {
        let style = FontStyle::BOLD | FontStyle::ITALIC;
        assert!(style.contains(FontStyle::BOLD));
        assert!(!style.contains(FontStyle::UNDERLINE));
    }

    #[test]
    fn test_alignment_codes() {
        assert_eq!(TextAlignment::from_code(TextAlignment::Center.code()), TextAlignment::Center);
        // Codes from a newer protocol version degrade to the default
        assert_eq!(TextAlignment::from_code(42), TextAlignment::Left);
    }
}
