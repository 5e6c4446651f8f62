//! HTML tag attribute parsing.
//!
//! Parses the attribute text of a tag (`src="a.png" alt='A' width=20`).

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Attribute name to decoded value, ordered by name.
pub type Attributes = BTreeMap<String, String>;

/// One `name=value` pair: double-quoted, single-quoted, or unquoted up to whitespace.
static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<name>\w[\w:.-]*)\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<uq>[^\s"']+))"#)
        .unwrap()
});

/// Parse tag attributes into a map.
///
/// Values are HTML-entity decoded. When a name occurs twice the last value
/// wins. Attributes without a value (`ismap`) are skipped.
///
/// # Example
///
/// ```
/// use rd_renderer::parse_attributes;
///
/// let attrs = parse_attributes(r#" src="a.png" alt='Tom &amp; Jerry' width=20"#);
/// assert_eq!(attrs["src"], "a.png");
/// assert_eq!(attrs["alt"], "Tom & Jerry");
/// assert_eq!(attrs["width"], "20");
/// ```
#[must_use]
pub fn parse_attributes(text: &str) -> Attributes {
    let mut attributes = Attributes::new();

    for caps in ATTRIBUTE_RE.captures_iter(text) {
        let value = caps
            .name("dq")
            .or_else(|| caps.name("sq"))
            .or_else(|| caps.name("uq"))
            .map_or("", |m| m.as_str());
        let decoded = html_escape::decode_html_entities(value).into_owned();
        attributes.insert(caps["name"].to_owned(), decoded);
    }

    attributes
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_empty() {
        assert!(parse_attributes("").is_empty());
        assert!(parse_attributes("   ").is_empty());
    }

    #[test]
    fn test_double_quoted() {
        let attrs = parse_attributes(r#"src="../_images/diagram.png""#);
        assert_eq!(attrs["src"], "../_images/diagram.png");
    }

    #[test]
    fn test_single_quoted_with_double_quote_inside() {
        let attrs = parse_attributes(r#"alt='Say "hi"'"#);
        assert_eq!(attrs["alt"], r#"Say "hi""#);
    }

    #[test]
    fn test_unquoted_terminated_by_whitespace() {
        let attrs = parse_attributes("width=200 height=100");
        assert_eq!(attrs["width"], "200");
        assert_eq!(attrs["height"], "100");
    }

    #[test]
    fn test_spaces_around_equals() {
        let attrs = parse_attributes(r#"alt = "Diagram""#);
        assert_eq!(attrs["alt"], "Diagram");
    }

    #[test]
    fn test_empty_quoted_value() {
        let attrs = parse_attributes(r#"alt="""#);
        assert_eq!(attrs["alt"], "");
    }

    #[test]
    fn test_entities_decoded() {
        let attrs = parse_attributes(r#"title="a &lt; b &amp;&amp; c" alt="&#169; 2013""#);
        assert_eq!(attrs["title"], "a < b && c");
        assert_eq!(attrs["alt"], "\u{a9} 2013");
    }

    #[test]
    fn test_duplicate_last_wins() {
        let attrs = parse_attributes(r#"class="a" class="b""#);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs["class"], "b");
    }

    #[test]
    fn test_multiline_and_hyphenated_names() {
        let attrs = parse_attributes("\n  src=\"a.png\"\n  data-zoom=\"2\"\n  alt=\"A\"");
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs["data-zoom"], "2");
    }

    #[test]
    fn test_valueless_attribute_skipped() {
        let attrs = parse_attributes(r#"ismap src="a.png""#);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs["src"], "a.png");
    }
}
