use serde::{Deserialize, Serialize};

/// Label used when a link or page has no usable text
pub const UNTITLED: &str = "无标题";

/// Label used for the self-record when the page has no title
pub const CURRENT_PAGE: &str = "当前页面";

/// A single exported row: an address and the text shown for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    url: String,
    text: String,
}

impl LinkRecord {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// What the content-scope executor hands back from a tab
///
/// The serialized DOM plus the page's own address and title; everything the
/// extractor needs, with no handle into the live page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    pub title: Option<String>,
    pub html: String,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>, title: Option<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title,
            html: html.into(),
        }
    }
}
