//! Navigation structures derived from a fragment's metadata.
//!
//! Table of contents, previous/next links, breadcrumb and the flat "quick
//! navigation" block. Every function receives the fragment and the document
//! it was loaded for; nothing is kept between calls.

use std::sync::LazyLock;

use rd_renderer::{
    LinkOptions, LinkResolver, ResolvedTarget, normalize_ampersands, normalize_document,
    normalize_href_ampersands, resolve_from_directory, rewrite_links,
};
use rd_storage::{DocumentFragment, DocumentId, NavLinkRef, Storage};
use regex::Regex;
use serde::Serialize;

/// Empty list left behind by leaf sections.
static EMPTY_LIST_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<ul>\s*</ul>").unwrap());

/// Opening of the outermost list and its first item.
static FIRST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<ul>\s*<li>").unwrap());

/// List structure tokens of a TOC: list open/close and links.
static TOC_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)(?P<open><ul\b[^>]*>)|(?P<close></ul>)|<a\b[^>]*?\shref="(?P<href>[^"]*)"[^>]*>(?P<text>.*?)</a>"#)
        .unwrap()
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Options for [`table_of_contents`].
#[derive(Clone, Debug, Default)]
pub struct TocOptions {
    /// Link rewriting options.
    pub links: LinkOptions,
    /// Escape every `&` of the rewritten `href` values (XML-strict hosts).
    pub xhtml: bool,
}

/// Rewritten table of contents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Toc {
    /// TOC HTML with links rewritten and empty sublevels removed. The first
    /// top-level item carries `class="current"`.
    pub html: String,
    /// Menu tree parsed from [`Toc::html`].
    pub entries: Vec<MenuEntry>,
}

/// Entry of the TOC menu tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub title: String,
    pub url: String,
    /// Set on the first top-level entry only.
    pub current: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuEntry>,
}

/// Previous or next topic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub title: String,
    pub url: String,
}

/// Breadcrumb item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BreadcrumbItem {
    pub title: String,
    pub url: String,
    /// `true` for the trailing item, the current document.
    pub active: bool,
}

/// Flat navigation block for page headers.
///
/// Absent links are empty strings, paired with a `has_*` flag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QuickNavigation {
    pub home_title: String,
    pub home_url: String,
    pub previous_title: String,
    pub previous_url: String,
    pub next_title: String,
    pub next_url: String,
    pub index_url: String,
    pub has_previous: bool,
    pub has_next: bool,
    pub has_index: bool,
}

/// Remove empty `<ul></ul>` lists until none remain.
///
/// Removing an inner empty list can leave its parent empty, so the pass is
/// repeated.
#[must_use]
pub fn remove_empty_sublevels(html: &str) -> String {
    let mut html = html.to_owned();
    loop {
        let stripped = EMPTY_LIST_RE.replace_all(&html, "");
        if stripped.len() == html.len() {
            return html;
        }
        html = stripped.into_owned();
    }
}

/// Build the table of contents of `current`.
///
/// Returns `None` when the fragment has no `toc`.
pub fn table_of_contents(
    fragment: &DocumentFragment,
    current: &DocumentId,
    resolver: &dyn LinkResolver,
    options: &TocOptions,
) -> Option<Toc> {
    let toc = fragment.toc.as_deref()?;
    let rewritten = rewrite_links(toc, current, resolver, &options.links);
    let mut html = remove_empty_sublevels(&rewritten);
    if options.xhtml {
        html = normalize_href_ampersands(&html);
    }

    let mut entries = parse_menu(&html);
    if let Some(first) = entries.first_mut() {
        first.current = true;
    }

    Some(Toc {
        html: mark_first_item(&html),
        entries,
    })
}

/// Mark the first top-level item `class="current"`.
fn mark_first_item(html: &str) -> String {
    FIRST_ITEM_RE
        .replace(html, r#"<ul><li class="current">"#)
        .into_owned()
}

/// Parse the nested `<ul>` structure of a TOC into menu entries.
///
/// Only lists and links are considered. A nested list becomes the children
/// of the last link seen at the enclosing level.
#[must_use]
pub fn parse_menu(html: &str) -> Vec<MenuEntry> {
    let mut levels: Vec<Vec<MenuEntry>> = vec![Vec::new()];

    for caps in TOC_TOKEN_RE.captures_iter(html) {
        if caps.name("open").is_some() {
            levels.push(Vec::new());
        } else if caps.name("close").is_some() {
            if levels.len() > 1 {
                close_level(&mut levels);
            }
        } else if let (Some(href), Some(text)) = (caps.name("href"), caps.name("text")) {
            let title = TAG_RE.replace_all(text.as_str(), "");
            let entry = MenuEntry {
                title: html_escape::decode_html_entities(title.trim()).into_owned(),
                url: html_escape::decode_html_entities(href.as_str()).into_owned(),
                current: false,
                children: Vec::new(),
            };
            if let Some(level) = levels.last_mut() {
                level.push(entry);
            }
        }
    }

    while levels.len() > 1 {
        close_level(&mut levels);
    }
    levels.pop().unwrap_or_default()
}

fn close_level(levels: &mut Vec<Vec<MenuEntry>>) {
    let Some(closed) = levels.pop() else {
        return;
    };
    let Some(parent) = levels.last_mut() else {
        return;
    };
    match parent.last_mut() {
        Some(owner) => owner.children.extend(closed),
        None => parent.extend(closed),
    }
}

/// Resolve a `prev`/`next`/`parents` link of `current`.
///
/// These links are relative to the page one level above the document.
#[must_use]
pub fn resolve_navigation_link(current: &DocumentId, link: &str) -> ResolvedTarget {
    let (path, anchor) = match link.rsplit_once('#') {
        Some((path, anchor)) => (path, Some(anchor)),
        None => (link, None),
    };
    let resolved = resolve_from_directory(current.as_str(), &format!("../{path}"));
    ResolvedTarget::new(normalize_document(&resolved), anchor)
}

fn navigation_link(
    current: &DocumentId,
    link: &NavLinkRef,
    resolver: &dyn LinkResolver,
) -> NavLink {
    let target = resolve_navigation_link(current, &link.link);
    NavLink {
        title: link.title.clone(),
        url: normalize_ampersands(&resolver.resolve(&target)),
    }
}

/// Previous topic of `current`, if any.
pub fn previous(
    fragment: &DocumentFragment,
    current: &DocumentId,
    resolver: &dyn LinkResolver,
) -> Option<NavLink> {
    fragment
        .prev
        .as_ref()
        .map(|link| navigation_link(current, link, resolver))
}

/// Next topic of `current`, if any.
pub fn next(
    fragment: &DocumentFragment,
    current: &DocumentId,
    resolver: &dyn LinkResolver,
) -> Option<NavLink> {
    fragment
        .next
        .as_ref()
        .map(|link| navigation_link(current, link, resolver))
}

/// Breadcrumb of `current`, from the root down to the document itself.
pub fn breadcrumb(
    fragment: &DocumentFragment,
    current: &DocumentId,
    resolver: &dyn LinkResolver,
) -> Vec<BreadcrumbItem> {
    let mut items: Vec<BreadcrumbItem> = fragment
        .parents
        .iter()
        .map(|parent| {
            let link = navigation_link(current, parent, resolver);
            BreadcrumbItem {
                title: link.title,
                url: link.url,
                active: false,
            }
        })
        .collect();

    let target = ResolvedTarget::new(current.as_str(), None);
    items.push(BreadcrumbItem {
        title: fragment.title.clone().unwrap_or_default(),
        url: normalize_ampersands(&resolver.resolve(&target)),
        active: true,
    });

    items
}

/// Quick navigation block of `current`.
///
/// `home_title` is the title of the root parent, or the document's own title
/// when it has no parents.
pub fn quick_navigation(
    fragment: &DocumentFragment,
    current: &DocumentId,
    resolver: &dyn LinkResolver,
    storage: &dyn Storage,
    default_document: &DocumentId,
) -> QuickNavigation {
    let url_of = |document: &str| {
        normalize_ampersands(&resolver.resolve(&ResolvedTarget::new(document, None)))
    };

    let home_title = fragment
        .parents
        .first()
        .map(|parent| parent.title.clone())
        .or_else(|| fragment.title.clone())
        .unwrap_or_default();

    let mut navigation = QuickNavigation {
        home_title,
        home_url: url_of(default_document.as_str()),
        ..QuickNavigation::default()
    };

    if let Some(link) = previous(fragment, current, resolver) {
        navigation.previous_title = link.title;
        navigation.previous_url = link.url;
        navigation.has_previous = true;
    }
    if let Some(link) = next(fragment, current, resolver) {
        navigation.next_title = link.title;
        navigation.next_url = link.url;
        navigation.has_next = true;
    }
    let general_index = DocumentId::general_index();
    if storage.exists(&general_index) {
        navigation.index_url = url_of(general_index.as_str());
        navigation.has_index = true;
    }

    navigation
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rd_storage::MockStorage;

    use super::*;

    fn id(value: &str) -> DocumentId {
        DocumentId::parse(value).unwrap()
    }

    fn page_link(target: &ResolvedTarget) -> String {
        format!("/page?doc={target}")
    }

    fn nav(title: &str, link: &str) -> NavLinkRef {
        NavLinkRef {
            title: title.to_owned(),
            link: link.to_owned(),
        }
    }

    fn intro_fragment() -> DocumentFragment {
        DocumentFragment {
            title: Some("Introduction".to_owned()),
            prev: Some(nav("Guide", "../")),
            next: Some(nav("Setup", "../setup/")),
            parents: vec![nav("Guide", "../")],
            toc: Some(concat!(
                "<ul>\n",
                r##"<li><a class="reference internal" href="#">Introduction</a><ul>"##,
                "\n",
                r##"<li><a class="reference internal" href="#usage">Usage</a><ul>"##,
                "\n</ul>\n</li>\n</ul>\n</li>\n</ul>\n",
            )
            .to_owned()),
            ..DocumentFragment::default()
        }
    }

    #[test]
    fn test_remove_empty_sublevels_nested() {
        assert_eq!(remove_empty_sublevels("<ul><li></li><ul></ul></li></ul>"), "<ul><li></li></li></ul>");
        assert_eq!(remove_empty_sublevels("<ul>\n<ul> </ul>\n</ul>"), "");
        assert_eq!(remove_empty_sublevels("<p>text</p>"), "<p>text</p>");
    }

    #[test]
    fn test_table_of_contents_rewrites_and_collapses() {
        let toc = table_of_contents(
            &intro_fragment(),
            &id("guide/intro/"),
            &page_link,
            &TocOptions::default(),
        )
        .unwrap();

        assert!(!toc.html.contains("<ul>\n</ul>"));
        assert!(toc.html.contains(r#"href="/page?doc=guide/intro/""#));
        assert!(toc.html.contains(r#"href="/page?doc=guide/intro/#usage""#));
    }

    #[test]
    fn test_table_of_contents_entries() {
        let toc = table_of_contents(
            &intro_fragment(),
            &id("guide/intro/"),
            &page_link,
            &TocOptions::default(),
        )
        .unwrap();

        assert_eq!(
            toc.entries,
            vec![MenuEntry {
                title: "Introduction".to_owned(),
                url: "/page?doc=guide/intro/".to_owned(),
                current: true,
                children: vec![MenuEntry {
                    title: "Usage".to_owned(),
                    url: "/page?doc=guide/intro/#usage".to_owned(),
                    current: false,
                    children: Vec::new(),
                }],
            }]
        );
    }

    #[test]
    fn test_table_of_contents_missing() {
        let fragment = DocumentFragment::default();
        assert!(table_of_contents(&fragment, &id("guide/"), &page_link, &TocOptions::default()).is_none());
    }

    #[test]
    fn test_table_of_contents_xhtml_ampersands() {
        let fragment = DocumentFragment {
            toc: Some(r##"<ul><li><a class="reference internal" href="#">Top</a></li></ul>"##.to_owned()),
            ..DocumentFragment::default()
        };
        let resolver = |target: &ResolvedTarget| format!("/index.php?id=3&doc={target}");

        let plain = table_of_contents(&fragment, &id("guide/"), &resolver, &TocOptions::default()).unwrap();
        let strict = table_of_contents(
            &fragment,
            &id("guide/"),
            &resolver,
            &TocOptions {
                xhtml: true,
                ..TocOptions::default()
            },
        )
        .unwrap();

        assert_eq!(plain.html, strict.html);
        assert!(strict.html.contains("id=3&amp;doc=guide/"));
        assert_eq!(strict.entries[0].url, "/index.php?id=3&doc=guide/");
    }

    #[test]
    fn test_mark_first_item() {
        assert_eq!(
            mark_first_item("<ul>\n<li><a href=\"/a\">A</a></li><li><a href=\"/b\">B</a></li></ul>"),
            "<ul><li class=\"current\"><a href=\"/a\">A</a></li><li><a href=\"/b\">B</a></li></ul>"
        );
        assert_eq!(mark_first_item("<p>no list</p>"), "<p>no list</p>");
    }

    #[test]
    fn test_table_of_contents_marks_current_item() {
        let fragment = DocumentFragment {
            toc: Some(
                "<ul>\n<li><a class=\"reference internal\" href=\"#\">Top</a></li>\n<li><a class=\"reference internal\" href=\"#b\">B</a></li>\n</ul>"
                    .to_owned(),
            ),
            ..DocumentFragment::default()
        };

        let toc = table_of_contents(&fragment, &id("guide/"), &page_link, &TocOptions::default()).unwrap();

        assert!(toc.html.starts_with("<ul><li class=\"current\"><a "));
        assert_eq!(toc.html.matches("class=\"current\"").count(), 1);
        assert_eq!(toc.entries.len(), 2);
        assert!(toc.entries[0].current);
        assert!(!toc.entries[1].current);
    }

    #[test]
    fn test_parse_menu_siblings_and_decoding() {
        let html = r#"<ul><li><a href="/a?x=1&amp;y=2"><em>A</em> &amp; B</a></li><li><a href="/c">C</a></li></ul>"#;

        let entries = parse_menu(html);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "A & B");
        assert_eq!(entries[0].url, "/a?x=1&y=2");
        assert_eq!(entries[1].title, "C");
    }

    #[test]
    fn test_parse_menu_unbalanced() {
        let entries = parse_menu(r#"<ul><li><a href="/a">A</a><ul><li><a href="/b">B</a>"#);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].children[0].title, "B");
    }

    #[test]
    fn test_resolve_navigation_link() {
        let current = id("guide/intro/");
        assert_eq!(resolve_navigation_link(&current, "../"), ResolvedTarget::new("guide/", None));
        assert_eq!(
            resolve_navigation_link(&current, "../setup/"),
            ResolvedTarget::new("guide/setup/", None)
        );
        assert_eq!(
            resolve_navigation_link(&id("guide/"), "../#top"),
            ResolvedTarget::new("", Some("top"))
        );
    }

    #[test]
    fn test_previous_and_next() {
        let fragment = intro_fragment();
        let current = id("guide/intro/");

        assert_eq!(
            previous(&fragment, &current, &page_link),
            Some(NavLink {
                title: "Guide".to_owned(),
                url: "/page?doc=guide/".to_owned(),
            })
        );
        assert_eq!(
            next(&fragment, &current, &page_link).unwrap().url,
            "/page?doc=guide/setup/"
        );
        assert!(previous(&DocumentFragment::default(), &current, &page_link).is_none());
    }

    #[test]
    fn test_breadcrumb_root_to_leaf() {
        let fragment = DocumentFragment {
            title: Some("Install".to_owned()),
            parents: vec![nav("Guide", "../../"), nav("Setup", "../")],
            ..DocumentFragment::default()
        };

        let items = breadcrumb(&fragment, &id("guide/setup/install/"), &page_link);

        assert_eq!(
            items,
            vec![
                BreadcrumbItem {
                    title: "Guide".to_owned(),
                    url: "/page?doc=guide/".to_owned(),
                    active: false,
                },
                BreadcrumbItem {
                    title: "Setup".to_owned(),
                    url: "/page?doc=guide/setup/".to_owned(),
                    active: false,
                },
                BreadcrumbItem {
                    title: "Install".to_owned(),
                    url: "/page?doc=guide/setup/install/".to_owned(),
                    active: true,
                },
            ]
        );
    }

    #[test]
    fn test_breadcrumb_without_parents() {
        let items = breadcrumb(&DocumentFragment::default(), &id("index/"), &page_link);

        assert_eq!(items.len(), 1);
        assert!(items[0].active);
        assert_eq!(items[0].title, "");
    }

    #[test]
    fn test_quick_navigation_with_index() {
        let storage = MockStorage::new().with_json("genindex/", r#"{"genindexentries": []}"#);

        let navigation = quick_navigation(
            &intro_fragment(),
            &id("guide/intro/"),
            &page_link,
            &storage,
            &DocumentId::index(),
        );

        assert_eq!(
            navigation,
            QuickNavigation {
                home_title: "Guide".to_owned(),
                home_url: "/page?doc=index/".to_owned(),
                previous_title: "Guide".to_owned(),
                previous_url: "/page?doc=guide/".to_owned(),
                next_title: "Setup".to_owned(),
                next_url: "/page?doc=guide/setup/".to_owned(),
                index_url: "/page?doc=genindex/".to_owned(),
                has_previous: true,
                has_next: true,
                has_index: true,
            }
        );
    }

    #[test]
    fn test_quick_navigation_flags_absent() {
        let fragment = DocumentFragment {
            title: Some("Home".to_owned()),
            ..DocumentFragment::default()
        };

        let navigation = quick_navigation(
            &fragment,
            &DocumentId::index(),
            &page_link,
            &MockStorage::new(),
            &DocumentId::index(),
        );

        assert_eq!(navigation.home_title, "Home");
        assert!(!navigation.has_previous);
        assert!(!navigation.has_next);
        assert!(!navigation.has_index);
        assert_eq!(navigation.index_url, "");
    }
}
