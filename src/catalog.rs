//! Assembly of catalog feeds from the library tree.

use crate::clock::Clock;
use crate::error::{AppError, Result};
use crate::library::{
    self, COVER_FILE, PathKind, SHELF_PREFIX, TrustedRoot, VisibilityPolicy, shelf_href, walk,
};
use crate::media::{self, ACQUISITION_TYPE, NAVIGATION_TYPE};
use crate::opds::{
    Entry, Feed, FeedBuilder, Link, REL_ACQUISITION, REL_SUBSECTION, REL_THUMBNAIL,
};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Path of the newest-books feed.
pub const NEWEST_PATH: &str = "/new";

/// Path of the search-results feed.
pub const SEARCH_PATH: &str = "/search";

/// What a `/shelf` request points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShelfItem {
    /// A file to download.
    File(PathBuf),
    /// A directory to list.
    Directory(PathBuf, PathKind),
}

/// Builds every feed of the catalog. Holds only immutable configuration, so a
/// single instance serves all requests concurrently.
pub struct Catalog {
    root: TrustedRoot,
    policy: VisibilityPolicy,
    title: String,
    clock: Arc<dyn Clock>,
}

impl Catalog {
    /// Create a catalog over `root`.
    pub fn new(
        root: TrustedRoot,
        policy: VisibilityPolicy,
        title: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            root,
            policy,
            title: title.into(),
            clock,
        }
    }

    /// Served directory.
    pub fn root(&self) -> &TrustedRoot {
        &self.root
    }

    /// Visibility options.
    pub fn policy(&self) -> &VisibilityPolicy {
        &self.policy
    }

    fn builder(&self, id: &str, title: impl Into<String>) -> FeedBuilder {
        FeedBuilder::new(id, title, self.clock.now())
            .start_link()
            .search_link()
    }

    /// Root menu: newest books and the whole shelf.
    pub fn root_menu(&self) -> Feed {
        let mut newest = Entry::new(NEWEST_PATH, "Newest books");
        newest.content = Some("The 15 latest books added to the library".to_string());
        newest.links.push(
            Link::new(REL_SUBSECTION, NEWEST_PATH, ACQUISITION_TYPE).with_title("Newest books"),
        );

        let mut all = Entry::new(SHELF_PREFIX, "All books");
        all.content = Some("Browse the library folder by folder".to_string());
        all.links
            .push(Link::new(REL_SUBSECTION, SHELF_PREFIX, ACQUISITION_TYPE).with_title("All books"));

        self.builder("/", self.title.as_str())
            .entry(newest)
            .entry(all)
            .build()
    }

    /// Feed listing the visible children of `dir`, requested as `request_path`.
    pub fn browse(&self, request_path: &str, dir: &Path) -> Feed {
        let mut children: Vec<(String, PathBuf)> = match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| (e.file_name().to_string_lossy().to_string(), e.path()))
                .collect(),
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Cannot list directory");
                Vec::new()
            }
        };
        children.sort_by(|a, b| a.0.cmp(&b.0));

        let entries = children
            .into_iter()
            .filter(|(name, _)| !self.policy.is_hidden(name))
            .filter_map(|(_, path)| self.item_entry(&path));

        self.builder(request_path, format!("Catalog in {}", request_path))
            .entries(entries)
            .build()
    }

    /// The most recently modified books.
    pub fn newest(&self) -> Feed {
        let leaves = walk::newest(self.root.path(), &self.policy, walk::NEWEST_LIMIT);

        let entries = leaves.into_iter().filter_map(|leaf| {
            let mut entry = self.item_entry(&leaf.path)?;
            entry.updated = Some(DateTime::<Utc>::from(leaf.modified));
            Some(entry)
        });

        self.builder(NEWEST_PATH, "Newest books")
            .entries(entries)
            .build()
    }

    /// Files whose name contains `query`, across the whole library.
    pub fn search(&self, query: &str) -> Result<Feed> {
        if query.is_empty() {
            return Err(AppError::BadRequest(
                "query param 'q' empty or missing".to_string(),
            ));
        }

        let entries: Vec<Entry> = walk::search(self.root.path(), &self.policy, query)
            .into_iter()
            .filter_map(|leaf| self.item_entry(&leaf.path))
            .collect();
        let total = entries.len();

        Ok(self
            .builder(
                SEARCH_PATH,
                format!("Folders containing files matching query {}", query),
            )
            .entries(entries)
            .total_results(total)
            .build())
    }

    /// Resolve the part of a `/shelf` URL after the prefix.
    pub fn shelf_item(&self, request_path: &str) -> Result<ShelfItem> {
        let path = self.root.resolve(request_path)?;
        let relative = self.root.relative(&path).unwrap_or(Path::new(""));
        let kind = library::classify(&path);

        let hidden = if kind == PathKind::File && self.is_companion_cover(&path) {
            // Companion covers stay downloadable even when calibre files are hidden.
            relative.parent().is_some_and(|p| self.policy.is_path_hidden(p))
        } else {
            self.policy.is_path_hidden(relative)
                || self.policy.is_path_hidden(Path::new(request_path))
        };

        if hidden {
            tracing::info!(path = %path.display(), "Hidden path requested");
            return Err(AppError::NotFound(request_path.to_string()));
        }

        Ok(match kind {
            PathKind::File => ShelfItem::File(path),
            kind => ShelfItem::Directory(path, kind),
        })
    }

    fn is_companion_cover(&self, path: &Path) -> bool {
        self.policy.calibre_covers && path.file_name().is_some_and(|n| n == COVER_FILE)
    }

    /// Entry for a file or directory below the root, classified fresh.
    fn item_entry(&self, path: &Path) -> Option<Entry> {
        if !self.root.contains(path) {
            tracing::debug!(path = %path.display(), "Skipping entry resolving outside the library");
            return None;
        }
        let relative = self.root.relative(path)?;
        let name = path.file_name()?.to_string_lossy().to_string();
        let kind = library::classify(path);

        let (rel, link_type) = match kind {
            PathKind::DirOfFiles => (REL_SUBSECTION, ACQUISITION_TYPE),
            PathKind::DirOfDirs => (REL_SUBSECTION, NAVIGATION_TYPE),
            PathKind::File if media::is_image(&name) => {
                (REL_THUMBNAIL, media::type_for_path(path))
            }
            PathKind::File => (REL_ACQUISITION, media::type_for_path(path)),
        };

        let mut entry = Entry::new(format!("{}/{}", SHELF_PREFIX, relative.display()), &name);
        entry
            .links
            .push(Link::new(rel, shelf_href(relative), link_type).with_title(&name));

        if rel == REL_ACQUISITION
            && let Some(cover) = library::find_cover(&self.root, path, &self.policy)
        {
            entry.links.push(cover);
        }

        Some(entry)
    }
}
