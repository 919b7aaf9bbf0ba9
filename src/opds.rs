//! OPDS catalog documents.

use crate::media::{NAVIGATION_TYPE, OPENSEARCH_TYPE};
use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

/// Path of the OpenSearch description document.
pub const SEARCH_DEFINITION_PATH: &str = "/opensearch.xml";

/// Relation of the feed link to the root menu.
pub const REL_START: &str = "start";
/// Relation of the feed link to the search description.
pub const REL_SEARCH: &str = "search";
/// Entry leading to another catalog.
pub const REL_SUBSECTION: &str = "subsection";
/// Entry leading to a downloadable book.
pub const REL_ACQUISITION: &str = "http://opds-spec.org/acquisition";
/// Cover image of a book.
pub const REL_IMAGE: &str = "http://opds-spec.org/image";
/// Image files listed in a directory.
pub const REL_THUMBNAIL: &str = "http://opds-spec.org/image/thumbnail";

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const OPDS_NS: &str = "http://opds-spec.org/2010/catalog";
const DC_NS: &str = "http://purl.org/dc/terms/";
const OPENSEARCH_NS: &str = "http://a9.com/-/spec/opensearch/1.1/";

/// Static OpenSearch description; clients expand `{searchTerms}`.
pub const OPENSEARCH_DESCRIPTION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OpenSearchDescription xmlns="http://a9.com/-/spec/opensearch/1.1/">
  <InputEncoding>UTF-8</InputEncoding>
  <OutputEncoding>UTF-8</OutputEncoding>
  <Url type="application/atom+xml;profile=opds-catalog;kind=acquisition" template="/search?q={searchTerms}"/>
</OpenSearchDescription>"#;

/// OPDS feed link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Link relation type (e.g., "start", "subsection", acquisition).
    pub rel: String,
    /// URL of the linked resource.
    pub href: String,
    /// MIME type of the linked resource.
    pub link_type: String,
    /// Optional title for the link.
    pub title: Option<String>,
}

impl Link {
    /// Link without a title.
    pub fn new(rel: impl Into<String>, href: impl Into<String>, link_type: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            link_type: link_type.into(),
            title: None,
        }
    }

    /// Set the link title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// OPDS feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Unique identifier for the entry.
    pub id: String,
    /// Entry title.
    pub title: String,
    /// Last update timestamp.
    pub updated: Option<DateTime<Utc>>,
    /// Free-text description.
    pub content: Option<String>,
    /// Links associated with this entry.
    pub links: Vec<Link>,
}

impl Entry {
    /// Entry with no timestamp, content or links.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            updated: None,
            content: None,
            links: Vec::new(),
        }
    }

    /// First link with the given relation.
    pub fn link(&self, rel: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.rel == rel)
    }
}

/// An assembled catalog document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    /// Feed identifier (the request path).
    pub id: String,
    /// Feed title.
    pub title: String,
    /// Construction time.
    pub updated: DateTime<Utc>,
    /// Feed-level links.
    pub links: Vec<Link>,
    /// Entries in display order.
    pub entries: Vec<Entry>,
    /// Total match count, search results only.
    pub total_results: Option<usize>,
}

/// OPDS feed builder.
pub struct FeedBuilder {
    feed: Feed,
}

impl FeedBuilder {
    /// Create a new feed builder.
    pub fn new(id: impl Into<String>, title: impl Into<String>, updated: DateTime<Utc>) -> Self {
        Self {
            feed: Feed {
                id: id.into(),
                title: title.into(),
                updated,
                links: Vec::new(),
                entries: Vec::new(),
                total_results: None,
            },
        }
    }

    /// Add the start link pointing at the root menu.
    pub fn start_link(mut self) -> Self {
        self.feed
            .links
            .push(Link::new(REL_START, "/", NAVIGATION_TYPE));
        self
    }

    /// Add the search link pointing at the OpenSearch description.
    pub fn search_link(mut self) -> Self {
        self.feed
            .links
            .push(Link::new(REL_SEARCH, SEARCH_DEFINITION_PATH, OPENSEARCH_TYPE));
        self
    }

    /// Append an entry.
    pub fn entry(mut self, entry: Entry) -> Self {
        self.feed.entries.push(entry);
        self
    }

    /// Append entries.
    pub fn entries(mut self, entries: impl IntoIterator<Item = Entry>) -> Self {
        self.feed.entries.extend(entries);
        self
    }

    /// Record the total number of search results.
    pub fn total_results(mut self, total: usize) -> Self {
        self.feed.total_results = Some(total);
        self
    }

    /// Finish the feed.
    pub fn build(self) -> Feed {
        self.feed
    }
}

impl Feed {
    /// Serialize as an Atom/OPDS document.
    pub fn to_xml(&self) -> String {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        // XML declaration - writing to Vec can't fail
        let _ = writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)));

        let mut feed = BytesStart::new("feed");
        feed.push_attribute(("xmlns", ATOM_NS));
        feed.push_attribute(("xmlns:dc", DC_NS));
        feed.push_attribute(("xmlns:opds", OPDS_NS));
        if self.total_results.is_some() {
            feed.push_attribute(("xmlns:opensearch", OPENSEARCH_NS));
        }
        let _ = writer.write_event(Event::Start(feed));

        write_text_element(&mut writer, "id", &self.id);
        write_text_element(&mut writer, "title", &self.title);
        write_text_element(&mut writer, "updated", &self.updated.to_rfc3339());

        for link in &self.links {
            write_link(&mut writer, link);
        }

        for entry in &self.entries {
            write_entry(&mut writer, entry);
        }

        if let Some(total) = self.total_results {
            write_text_element(&mut writer, "opensearch:totalResults", &total.to_string());
        }

        let _ = writer.write_event(Event::End(BytesEnd::new("feed")));

        String::from_utf8(writer.into_inner().into_inner()).unwrap_or_default()
    }
}

/// Write a simple text element.
fn write_text_element<W: std::io::Write>(writer: &mut Writer<W>, name: &str, text: &str) {
    let _ = writer.write_event(Event::Start(BytesStart::new(name)));
    let _ = writer.write_event(Event::Text(BytesText::new(text)));
    let _ = writer.write_event(Event::End(BytesEnd::new(name)));
}

/// Write a link element.
fn write_link<W: std::io::Write>(writer: &mut Writer<W>, link: &Link) {
    let mut elem = BytesStart::new("link");
    elem.push_attribute(("rel", link.rel.as_str()));
    elem.push_attribute(("href", link.href.as_str()));
    elem.push_attribute(("type", link.link_type.as_str()));
    if let Some(title) = &link.title {
        elem.push_attribute(("title", title.as_str()));
    }
    let _ = writer.write_event(Event::Empty(elem));
}

/// Write an entry element.
fn write_entry<W: std::io::Write>(writer: &mut Writer<W>, entry: &Entry) {
    let _ = writer.write_event(Event::Start(BytesStart::new("entry")));

    write_text_element(writer, "id", &entry.id);
    write_text_element(writer, "title", &entry.title);

    if let Some(updated) = &entry.updated {
        write_text_element(writer, "updated", &updated.to_rfc3339());
    }

    if let Some(content) = &entry.content {
        let mut elem = BytesStart::new("content");
        elem.push_attribute(("type", "text"));
        let _ = writer.write_event(Event::Start(elem));
        let _ = writer.write_event(Event::Text(BytesText::new(content)));
        let _ = writer.write_event(Event::End(BytesEnd::new("content")));
    }

    for link in &entry.links {
        write_link(writer, link);
    }

    let _ = writer.write_event(Event::End(BytesEnd::new("entry")));
}
