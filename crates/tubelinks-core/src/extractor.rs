//! Finds YouTube watch-page links in a page snapshot.
//!
//! An anchor qualifies when its resolved address starts with
//! [`WATCH_URL_PREFIX`] and it contains a descendant whose id is
//! [`VIDEO_TITLE_ID`]. The record's text comes from that descendant, not from
//! the anchor. After all anchors, one record describing the page itself is
//! always appended, so the output is never empty.

use crate::record::{CURRENT_PAGE, LinkRecord, PageSnapshot, UNTITLED};
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Address prefix of a YouTube video page
pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Id of the element YouTube renders the video title into
pub const VIDEO_TITLE_ID: &str = "video-title";

lazy_static! {
    static ref ANCHOR: Selector = Selector::parse("a").unwrap();
    static ref VIDEO_TITLE: Selector = Selector::parse("#video-title").unwrap();
    static ref BASE: Selector = Selector::parse("base[href]").unwrap();
    static ref TITLE: Selector = Selector::parse("title").unwrap();
}

/// Extract link records from a snapshot taken inside a tab
pub fn extract_from_snapshot(snapshot: &PageSnapshot) -> Vec<LinkRecord> {
    let document = Html::parse_document(&snapshot.html);
    extract_links(&document, &snapshot.url, snapshot.title.as_deref())
}

/// Extract link records from a parsed document
///
/// `page_title` stands in for `document.title`; when it is `None` the
/// document's own `<title>` element is used.
pub fn extract_links(document: &Html, page_url: &str, page_title: Option<&str>) -> Vec<LinkRecord> {
    let base = document_base(document, page_url);
    let mut links = Vec::new();
    let mut anchors = 0usize;

    for anchor in document.select(&ANCHOR) {
        anchors += 1;
        if let Some(record) = video_link(anchor, base.as_ref()) {
            links.push(record);
        }
    }

    tracing::debug!(
        "Scanned {} anchors, {} YouTube video links",
        anchors,
        links.len()
    );

    let title = match page_title {
        Some(title) => collapse_whitespace(title),
        None => document_title(document),
    };
    let title = if title.is_empty() {
        CURRENT_PAGE.to_string()
    } else {
        title
    };
    links.push(LinkRecord::new(page_url, title));

    links
}

/// Build the record for a qualifying anchor, or `None` if it does not qualify
pub fn video_link(anchor: ElementRef<'_>, base: Option<&Url>) -> Option<LinkRecord> {
    let href = anchor.value().attr("href")?;
    let href = resolve_href(base, href);
    if !is_watch_url(&href) {
        return None;
    }

    let title = anchor.select(&VIDEO_TITLE).next()?;
    let text = text_content(title);
    let text = if text.is_empty() {
        UNTITLED.to_string()
    } else {
        text
    };

    Some(LinkRecord::new(href, text))
}

/// Check the literal watch-page prefix, case-sensitively
pub fn is_watch_url(href: &str) -> bool {
    href.starts_with(WATCH_URL_PREFIX)
}

/// Resolve an `href` attribute the way `HTMLAnchorElement.href` does
///
/// Unparseable values come back as written.
pub fn resolve_href(base: Option<&Url>, href: &str) -> String {
    let href = href.trim();
    let resolved = match base {
        Some(base) => base.join(href),
        None => Url::parse(href),
    };
    resolved.map(String::from).unwrap_or_else(|_| href.to_string())
}

fn document_base(document: &Html, page_url: &str) -> Option<Url> {
    let page = Url::parse(page_url).ok();
    let declared = document
        .select(&BASE)
        .next()
        .and_then(|base| base.value().attr("href"));

    match (page, declared) {
        (Some(page), Some(href)) => page.join(href.trim()).ok().or(Some(page)),
        (None, Some(href)) => Url::parse(href.trim()).ok(),
        (page, None) => page,
    }
}

fn document_title(document: &Html) -> String {
    document
        .select(&TITLE)
        .next()
        .map(|title| collapse_whitespace(&title.text().collect::<String>()))
        .unwrap_or_default()
}

fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
