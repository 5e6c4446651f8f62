//! General index page.
//!
//! The generator stores the index as nested JSON arrays:
//!
//! ```text
//! [[category, [entry, ...]], ...]
//! entry    = [term, [subentry, ...]]
//! subentry = [] | [title, link] | [[title, link], ...] | entry | [entry, ...] | null
//! ```
//!
//! [`parse_index`] turns that into [`IndexCategory`] values and
//! [`render_index`] into nested definition lists.

use std::collections::HashSet;

use rd_renderer::{LinkResolver, Reference, ResolvedTarget, normalize_ampersands, resolve_target};
use rd_storage::DocumentId;
use serde::Serialize;
use serde_json::Value;

/// Link title marking the main definition of a term.
pub const MAIN_ENTRY: &str = "main";

/// Links pointing at documents start with this prefix.
const DOCUMENT_LINK_PREFIX: &str = "../";

/// One letter (or "Symbols") of the index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndexCategory {
    pub name: String,
    pub entries: Vec<IndexEntry>,
}

/// Indexed term with its targets and sub-terms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub term: String,
    /// Targets of the term, in order. The first one is linked from the term
    /// itself, the others from `[1]`, `[2]`...
    pub links: Vec<IndexLink>,
    pub children: Vec<IndexEntry>,
}

/// Target of an index term.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndexLink {
    /// `main` for the main definition, usually empty otherwise.
    pub title: String,
    /// Link relative to the index document.
    pub link: String,
}

impl IndexLink {
    fn is_main(&self) -> bool {
        self.title == MAIN_ENTRY
    }
}

/// Parse the `genindexentries` value of the index fragment.
///
/// Malformed categories and entries are skipped.
#[must_use]
pub fn parse_index(raw: &Value) -> Vec<IndexCategory> {
    let Some(categories) = raw.as_array() else {
        tracing::warn!("General index is not a list");
        return Vec::new();
    };

    categories
        .iter()
        .filter_map(|category| {
            let items = category.as_array()?;
            let Some(name) = items.first().and_then(Value::as_str) else {
                tracing::warn!(%category, "Skipping malformed index category");
                return None;
            };
            let entries = items
                .get(1)
                .and_then(Value::as_array)
                .map(|entries| entries.iter().filter_map(parse_entry).collect())
                .unwrap_or_default();
            Some(IndexCategory {
                name: name.to_owned(),
                entries,
            })
        })
        .collect()
}

/// Parse `[term, [subentry, ...]]`.
///
/// Leading subentries that link to a document become the term's links. At
/// least one subentry is always consumed before the rest is read as
/// children, even when it carried no link.
fn parse_entry(value: &Value) -> Option<IndexEntry> {
    let items = value.as_array()?;
    let term = items.first()?.as_str()?;
    let subentries = items
        .get(1)
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice);

    let mut links = Vec::new();
    let mut consumed = 0;
    for subentry in subentries {
        match leading_links(subentry) {
            Some(found) => {
                links.extend(found);
                consumed += 1;
            }
            None => break,
        }
    }
    let consumed = consumed.max(1).min(subentries.len());

    let children = subentries[consumed..]
        .iter()
        .flat_map(child_entries)
        .collect();

    Some(IndexEntry {
        term: term.to_owned(),
        links,
        children,
    })
}

/// `[title, link]` with a document link.
fn document_link(value: &Value) -> Option<IndexLink> {
    match value.as_array()?.as_slice() {
        [Value::String(title), Value::String(link)] if link.starts_with(DOCUMENT_LINK_PREFIX) => {
            Some(IndexLink {
                title: title.clone(),
                link: link.clone(),
            })
        }
        _ => None,
    }
}

/// Links of a subentry that is a link pair or a list starting with one.
fn leading_links(subentry: &Value) -> Option<Vec<IndexLink>> {
    if let Some(link) = document_link(subentry) {
        return Some(vec![link]);
    }
    let items = subentry.as_array()?;
    document_link(items.first()?)?;
    Some(items.iter().filter_map(document_link).collect())
}

/// Children held by one subentry: a single entry or a list of entries.
fn child_entries(subentry: &Value) -> Vec<IndexEntry> {
    if let Some(entry) = subentry
        .as_array()
        .filter(|items| items.first().is_some_and(Value::is_string))
        .and_then(|_| parse_entry(subentry))
    {
        return vec![entry];
    }
    subentry
        .as_array()
        .map(|items| items.iter().filter_map(parse_entry).collect())
        .unwrap_or_default()
}

/// Anchor id of a category heading.
///
/// Lowercase alphanumerics with runs of other characters collapsed to `-`.
/// A name without any alphanumeric falls back to its position.
#[must_use]
pub fn category_slug(name: &str, position: usize) -> String {
    let mut slug = String::new();
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        format!("index-{position}")
    } else {
        format!("index-{slug}")
    }
}

/// Category slugs with collisions suffixed by the category position.
fn unique_slugs(categories: &[IndexCategory]) -> Vec<String> {
    let mut taken = HashSet::new();
    categories
        .iter()
        .enumerate()
        .map(|(position, category)| {
            let base = category_slug(&category.name, position);
            let mut slug = base.clone();
            let mut suffix = position;
            while !taken.insert(slug.clone()) {
                slug = format!("{base}-{suffix}");
                suffix += 1;
            }
            slug
        })
        .collect()
}

/// Render the general index held by `current`.
///
/// Emits a jump box linking every category, then a heading and a definition
/// list per category, in input order.
pub fn render_index(
    categories: &[IndexCategory],
    current: &DocumentId,
    resolver: &dyn LinkResolver,
    default_document: &DocumentId,
) -> String {
    let slugs = unique_slugs(categories);

    let jump_links: Vec<String> = categories
        .iter()
        .zip(&slugs)
        .map(|(category, slug)| {
            let target = ResolvedTarget::new(current.as_str(), Some(slug.as_str()));
            format!(
                r#"<a href="{}"><strong>{}</strong></a>"#,
                normalize_ampersands(&resolver.resolve(&target)),
                html_escape::encode_text(&category.name)
            )
        })
        .collect();

    let mut html = format!(
        "<div class=\"genindex-jumpbox\">{}</div>\n",
        jump_links.join(" | ")
    );

    let writer = EntryWriter {
        current,
        resolver,
        default_document,
    };
    for (category, slug) in categories.iter().zip(&slugs) {
        html.push_str(&format!(
            "<h2 id=\"{slug}\">{}</h2>\n",
            html_escape::encode_text(&category.name)
        ));
        html.push_str("<dl class=\"genindex\">\n");
        writer.write_entries(&mut html, &category.entries);
        html.push_str("</dl>\n");
    }

    html
}

struct EntryWriter<'a> {
    current: &'a DocumentId,
    resolver: &'a dyn LinkResolver,
    default_document: &'a DocumentId,
}

impl EntryWriter<'_> {
    fn write_entries(&self, html: &mut String, entries: &[IndexEntry]) {
        for entry in entries {
            html.push_str("<dt>");
            html.push_str(&self.term(entry));
            html.push_str("</dt>\n");
            if !entry.children.is_empty() {
                html.push_str("<dd><dl>\n");
                self.write_entries(html, &entry.children);
                html.push_str("</dl></dd>\n");
            }
        }
    }

    fn term(&self, entry: &IndexEntry) -> String {
        let term = html_escape::encode_text(&entry.term);
        if entry.links.is_empty() {
            return term.into_owned();
        }

        entry
            .links
            .iter()
            .enumerate()
            .map(|(position, link)| {
                let label = if position == 0 {
                    term.to_string()
                } else {
                    format!("[{position}]")
                };
                let anchor = format!(r#"<a href="{}">{label}</a>"#, self.url(&link.link));
                if link.is_main() {
                    format!("<strong>{anchor}</strong>")
                } else {
                    anchor
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn url(&self, link: &str) -> String {
        let reference = Reference::classify(link);
        match resolve_target(self.current, &reference, self.default_document) {
            Some(target) => normalize_ampersands(&self.resolver.resolve(&target)),
            None => normalize_ampersands(link),
        }
    }
}
