//! Rich text value type
//!
//! An ordered sequence of (character-run, format) pairs plus a default
//! format. Immutable-by-convention: concatenation operators clone their
//! operands, so a value reconstructed from a shared interop tuple is
//! never mutated in place by arithmetic on it.

pub mod format;

pub use format::{FontStyle, GlyphFormat, TextAlignment};

use crate::interop::ApiValue;

/// One formatted run of characters
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Raw characters of this run
    pub chars: String,
    /// Formatting carried by this run
    pub format: GlyphFormat,
}

/// Ordered, formatted string sequence crossing the interop boundary
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RichText {
    runs: Vec<TextRun>,
    default_format: GlyphFormat,
}

impl RichText {
    /// Create an empty rich text value with a default format
    pub fn new(default_format: GlyphFormat) -> Self {
        Self {
            runs: Vec::new(),
            default_format,
        }
    }

    /// Create from a raw string using the given default format
    pub fn from_str(text: impl Into<String>, default_format: GlyphFormat) -> Self {
        let mut value = Self::new(default_format);
        value.add_str(text);
        value
    }

    /// Create from a single pre-formatted run
    pub fn from_run(text: impl Into<String>, format: GlyphFormat) -> Self {
        Self {
            runs: vec![TextRun {
                chars: text.into(),
                format,
            }],
            default_format: format,
        }
    }

    /// Create from an ordered collection of (run, format) tuples
    ///
    /// Used when reconstructing a provider-exposed node's cached text
    /// on the consumer side of the boundary.
    pub fn from_runs<I>(runs: I, default_format: GlyphFormat) -> Self
    where
        I: IntoIterator<Item = (String, GlyphFormat)>,
    {
        Self {
            runs: runs
                .into_iter()
                .map(|(chars, format)| TextRun { chars, format })
                .collect(),
            default_format,
        }
    }

    /// The format applied to runs appended without an explicit one
    pub fn default_format(&self) -> GlyphFormat {
        self.default_format
    }

    /// The ordered runs of this value
    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    /// Total character count across all runs
    pub fn char_count(&self) -> usize {
        self.runs.iter().map(|run| run.chars.chars().count()).sum()
    }

    /// Whether this value holds no characters at all
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|run| run.chars.is_empty())
    }

    /// Append a raw string in the default format
    pub fn add_str(&mut self, text: impl Into<String>) {
        self.runs.push(TextRun {
            chars: text.into(),
            format: self.default_format,
        });
    }

    /// Append a single formatted run
    pub fn add_run(&mut self, text: impl Into<String>, format: GlyphFormat) {
        self.runs.push(TextRun {
            chars: text.into(),
            format,
        });
    }

    /// Append another rich text value, flattening its runs in order
    pub fn add_text(&mut self, other: &RichText) {
        self.runs.extend(other.runs.iter().cloned());
    }

    /// Serialize to the interop tuple form
    ///
    /// Each run becomes `[chars, size, style, alignment, r, g, b, a]`;
    /// the whole value is the list of runs.
    pub fn to_value(&self) -> ApiValue {
        ApiValue::List(
            self.runs
                .iter()
                .map(|run| {
                    ApiValue::List(vec![
                        ApiValue::Str(run.chars.clone()),
                        ApiValue::Float(run.format.size),
                        ApiValue::Int(i64::from(run.format.style.bits())),
                        ApiValue::Int(run.format.alignment.code()),
                        ApiValue::Float(run.format.color.x),
                        ApiValue::Float(run.format.color.y),
                        ApiValue::Float(run.format.color.z),
                        ApiValue::Float(run.format.color.w),
                    ])
                })
                .collect(),
        )
    }

    /// Reconstruct from the interop tuple form
    ///
    /// Malformed runs are skipped rather than faulting; a payload that
    /// is not a list at all yields `None`.
    pub fn from_value(value: &ApiValue) -> Option<Self> {
        let runs = value.as_list()?;
        let mut text = Self::new(GlyphFormat::default());
        for run in runs {
            let Some(fields) = run.as_list() else {
                continue;
            };
            let (Some(chars), Some(size), Some(style), Some(align)) = (
                fields.first().and_then(ApiValue::as_str),
                fields.get(1).and_then(ApiValue::as_float),
                fields.get(2).and_then(ApiValue::as_int),
                fields.get(3).and_then(ApiValue::as_int),
            ) else {
                continue;
            };
            let channel = |i: usize| fields.get(i).and_then(ApiValue::as_float).unwrap_or(1.0);
            let format = GlyphFormat {
                color: crate::foundation::math::Vec4::new(
                    channel(4),
                    channel(5),
                    channel(6),
                    channel(7),
                ),
                style: FontStyle::from_bits_truncate(u32::try_from(style).unwrap_or(0)),
                size,
                alignment: TextAlignment::from_code(align),
            };
            text.add_run(chars, format);
        }
        if let Some(first) = text.runs.first() {
            text.default_format = first.format;
        }
        Some(text)
    }
}

impl From<&str> for RichText {
    fn from(text: &str) -> Self {
        Self::from_str(text, GlyphFormat::default())
    }
}

impl std::ops::Add for RichText {
    type Output = RichText;

    /// Order-preserving, associative concatenation; operands are moved
    /// or cloned, never aliased
    fn add(mut self, rhs: RichText) -> RichText {
        self.runs.extend(rhs.runs);
        self
    }
}

impl std::ops::Add<&str> for RichText {
    type Output = RichText;

    fn add(mut self, rhs: &str) -> RichText {
        self.add_str(rhs);
        self
    }
}

impl std::fmt::Display for RichText {
    /// Concatenated raw runs with formatting stripped
    ///
    /// For diagnostics and accessibility readers; never re-parsed.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for run in &self.runs {
            f.write_str(&run.chars)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec4;

    fn red() -> GlyphFormat {
        GlyphFormat::with_color(Vec4::new(1.0, 0.0, 0.0, 1.0))
    }

    #[test]
    fn test_concatenation_preserves_order() {
        let a = RichText::from_run("A", red());
        let b = RichText::from_run("B", GlyphFormat::default());
        let c = RichText::from_run("C", red().style(FontStyle::BOLD));

        let left = (a.clone() + b.clone()) + c.clone();
        let right = a + (b + c);
        assert_eq!(left, right);
        assert_eq!(left.to_string(), "ABC");
    }

    #[test]
    fn test_add_does_not_mutate_clones() {
        let shared = RichText::from_run("shared", red());
        let copy = shared.clone();
        let _combined = copy + "more";
        assert_eq!(shared.to_string(), "shared");
        assert_eq!(shared.runs().len(), 1);
    }

    #[test]
    fn test_tuple_round_trip_preserves_formats() {
        let fmt1 = red().size(2.0);
        let fmt2 = GlyphFormat::default().style(FontStyle::BOLD | FontStyle::UNDERLINE);
        let original = RichText::from_runs(
            [("A".to_string(), fmt1), ("B".to_string(), fmt2)],
            fmt1,
        );

        let rebuilt = RichText::from_value(&original.to_value()).unwrap();
        assert_eq!(rebuilt.to_string(), "AB");
        assert_eq!(rebuilt.runs()[0].format, fmt1);
        assert_eq!(rebuilt.runs()[1].format, fmt2);
    }

    #[test]
    fn test_from_value_rejects_non_lists() {
        assert!(RichText::from_value(&ApiValue::Int(3)).is_none());
        // Malformed runs inside a list are skipped, not fatal
        let value = ApiValue::List(vec![ApiValue::Bool(true)]);
        let text = RichText::from_value(&value).unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn test_flattening_append() {
        let mut base = RichText::from_str("Hello ", GlyphFormat::default());
        let tail = RichText::from_runs(
            [
                ("wor".to_string(), red()),
                ("ld".to_string(), GlyphFormat::default()),
            ],
            GlyphFormat::default(),
        );
        base.add_text(&tail);
        assert_eq!(base.to_string(), "Hello world");
        assert_eq!(base.runs().len(), 3);
    }
}
