//! Span-based text substitution.

use std::ops::Range;

/// Replacement text for one byte span of the original text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Substitution {
    /// Byte range in the original text.
    pub span: Range<usize>,
    /// Text that replaces the span.
    pub replacement: String,
}

impl Substitution {
    /// Create a substitution.
    #[must_use]
    pub fn new(span: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }
}

/// Apply substitutions to `text`, returning a new string.
///
/// Substitutions must be sorted by span and must not overlap; scanning
/// passes produce them in that order.
///
/// # Example
///
/// ```
/// use rd_renderer::{Substitution, apply_substitutions};
///
/// let out = apply_substitutions("a-b-c", &[Substitution::new(0..1, "x"), Substitution::new(4..5, "z")]);
/// assert_eq!(out, "x-b-z");
/// ```
#[must_use]
pub fn apply_substitutions(text: &str, substitutions: &[Substitution]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for substitution in substitutions {
        debug_assert!(substitution.span.start >= cursor, "overlapping substitutions");
        out.push_str(&text[cursor..substitution.span.start]);
        out.push_str(&substitution.replacement);
        cursor = substitution.span.end;
    }
    out.push_str(&text[cursor..]);

    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_no_substitutions() {
        assert_eq!(apply_substitutions("unchanged", &[]), "unchanged");
    }

    #[test]
    fn test_replacement_lengths_differ() {
        let text = r#"<a href="x">1</a><a href="y">2</a>"#;
        let subs = [
            Substitution::new(9..10, "/long/url/one"),
            Substitution::new(26..27, ""),
        ];

        assert_eq!(
            apply_substitutions(text, &subs),
            r#"<a href="/long/url/one">1</a><a href="">2</a>"#
        );
    }

    #[test]
    fn test_adjacent_spans() {
        let subs = [Substitution::new(0..2, "A"), Substitution::new(2..4, "B")];
        assert_eq!(apply_substitutions("aabb", &subs), "AB");
    }
}
