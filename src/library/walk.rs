//! Filtered depth-first traversal of the library.

use super::VisibilityPolicy;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::{DirEntry, WalkDir};

/// Number of entries in the newest-books feed.
pub const NEWEST_LIMIT: usize = 14;

/// A visible file found by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Absolute path.
    pub path: PathBuf,
    /// File name.
    pub name: String,
    /// Modification time of the target file, `UNIX_EPOCH` when unavailable.
    pub modified: SystemTime,
}

impl Leaf {
    fn from_entry(entry: &DirEntry) -> Self {
        // Follows symlinks, unlike `DirEntry::metadata`.
        let modified = std::fs::metadata(entry.path())
            .ok()
            .and_then(|m| m.modified().ok())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        Self {
            path: entry.path().to_path_buf(),
            name: entry.file_name().to_string_lossy().to_string(),
            modified,
        }
    }
}

/// Pre-order walk below `root`, children in lexical order.
///
/// Hidden directories are pruned together with everything below them. The
/// root itself is always yielded. Unreadable entries are logged and skipped.
pub fn walk<'a>(
    root: &Path,
    policy: &'a VisibilityPolicy,
) -> impl Iterator<Item = DirEntry> + use<'a> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| {
            entry.depth() == 0 || !policy.is_hidden(&entry.file_name().to_string_lossy())
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable entry");
                None
            }
        })
}

/// Visible entries that resolve to a regular file.
fn visible_files<'a>(
    root: &Path,
    policy: &'a VisibilityPolicy,
) -> impl Iterator<Item = DirEntry> + use<'a> {
    walk(root, policy).filter(|entry| entry.path().is_file())
}

/// The most recently modified files, newest first, ties broken by name.
pub fn newest(root: &Path, policy: &VisibilityPolicy, limit: usize) -> Vec<Leaf> {
    let mut leaves: Vec<Leaf> = visible_files(root, policy)
        .map(|entry| Leaf::from_entry(&entry))
        .collect();

    leaves.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.path.cmp(&b.path))
    });
    leaves.truncate(limit);
    leaves
}

/// Files whose name contains `query`, case-insensitively, in walk order.
pub fn search(root: &Path, policy: &VisibilityPolicy, query: &str) -> Vec<Leaf> {
    let query = query.to_lowercase();
    visible_files(root, policy)
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .to_lowercase()
                .contains(&query)
        })
        .map(|entry| Leaf::from_entry(&entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::Duration;

    fn touch(path: &Path, secs: u64) {
        fs::write(path, "Fixture").unwrap();
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    fn policy() -> VisibilityPolicy {
        VisibilityPolicy {
            hide_dot_files: true,
            hide_calibre_files: true,
            ..Default::default()
        }
    }

    #[test]
    fn prunes_hidden_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".Trash/deep")).unwrap();
        touch(&root.join(".Trash/deep/mybook.epub"), 10);
        touch(&root.join("visible.epub"), 10);

        let policy = policy();
        let names: Vec<_> = walk(root, &policy)
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();

        assert!(names.contains(&"visible.epub".to_string()));
        assert!(!names.iter().any(|n| n == ".Trash" || n == "deep" || n == "mybook.epub"));
    }

    #[test]
    fn walk_is_preorder_and_lexical() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        touch(&root.join("b/2.txt"), 1);
        touch(&root.join("a/1.txt"), 1);
        touch(&root.join("c.txt"), 1);

        let policy = VisibilityPolicy::default();
        let relative: Vec<_> = walk(root, &policy)
            .skip(1)
            .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
            .collect();

        let expected: Vec<PathBuf> = ["a", "a/1.txt", "b", "b/2.txt", "c.txt"]
            .iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(relative, expected);
    }

    #[test]
    fn newest_orders_by_mtime_then_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        touch(&root.join("old.epub"), 100);
        touch(&root.join("sub/b.epub"), 300);
        touch(&root.join("a.epub"), 300);
        touch(&root.join("mid.epub"), 200);

        let names: Vec<_> = newest(root, &VisibilityPolicy::default(), NEWEST_LIMIT)
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, ["a.epub", "b.epub", "mid.epub", "old.epub"]);
    }

    #[test]
    fn newest_caps_at_limit() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..20 {
            touch(&dir.path().join(format!("book{:02}.epub", i)), 1000 + i);
        }

        let leaves = newest(dir.path(), &VisibilityPolicy::default(), NEWEST_LIMIT);
        assert_eq!(leaves.len(), 14);
        assert_eq!(leaves[0].name, "book19.epub");
        assert!(leaves.windows(2).all(|w| w[0].modified >= w[1].modified));
    }

    #[cfg(unix)]
    #[test]
    fn linked_files_report_target_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("target.epub"), 500);
        std::os::unix::fs::symlink("target.epub", root.join("link.epub")).unwrap();

        let leaves = newest(root, &VisibilityPolicy::default(), NEWEST_LIMIT);
        assert_eq!(leaves.len(), 2);
        assert!(
            leaves
                .iter()
                .all(|l| l.modified == SystemTime::UNIX_EPOCH + Duration::from_secs(500))
        );
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("mybook")).unwrap();
        fs::create_dir(root.join(".hidden")).unwrap();
        touch(&root.join("mybook/MyBook.epub"), 1);
        touch(&root.join("mybook/mybook copy.txt"), 1);
        touch(&root.join("mybook/nomatch.txt"), 1);
        touch(&root.join(".hidden/mybook.epub"), 1);

        let names: Vec<_> = search(root, &policy(), "MYBOOK")
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, ["MyBook.epub", "mybook copy.txt"]);
    }
}
