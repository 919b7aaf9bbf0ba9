//! Hiding of dotfiles and calibre companion files.

/// Substrings marking calibre companion files. Matched anywhere in the name.
const CALIBRE_MARKERS: [&str; 6] = [
    ".opf",
    "cover.",
    "metadata.db",
    "metadata_db_prefs_backup.json",
    ".caltrash",
    ".calnotes",
];

/// Per-server visibility and caching options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityPolicy {
    /// Hide names starting with a dot.
    pub hide_dot_files: bool,
    /// Hide calibre companion files.
    pub hide_calibre_files: bool,
    /// Attach sibling `cover.jpg` files as covers.
    pub calibre_covers: bool,
    /// Send no-cache headers.
    pub no_cache: bool,
}

impl VisibilityPolicy {
    /// Whether a single path component is hidden. First matching rule wins.
    pub fn is_hidden(&self, name: &str) -> bool {
        if name == "." || name == ".." {
            return false;
        }

        if self.hide_dot_files && name.starts_with('.') {
            return true;
        }

        self.hide_calibre_files && CALIBRE_MARKERS.iter().any(|m| name.contains(m))
    }

    /// Whether any component of a root-relative path is hidden.
    pub fn is_path_hidden(&self, relative: &std::path::Path) -> bool {
        relative
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .any(|name| self.is_hidden(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn all_hidden() -> VisibilityPolicy {
        VisibilityPolicy {
            hide_dot_files: true,
            hide_calibre_files: true,
            ..Default::default()
        }
    }

    #[test]
    fn dot_entries_never_hidden() {
        let policy = all_hidden();
        assert!(!policy.is_hidden("."));
        assert!(!policy.is_hidden(".."));
    }

    #[test]
    fn dotfiles_follow_option() {
        assert!(all_hidden().is_hidden(".Trash"));
        assert!(!VisibilityPolicy::default().is_hidden(".Trash"));
    }

    #[test]
    fn calibre_markers_are_substrings() {
        let policy = all_hidden();
        assert!(policy.is_hidden("metadata.opf"));
        assert!(policy.is_hidden("cover.jpg"));
        assert!(policy.is_hidden("mycover.mobi.png"));
        assert!(policy.is_hidden("metadata.db-journal"));
        assert!(policy.is_hidden("metadata_db_prefs_backup.json"));
        assert!(policy.is_hidden("x.caltrash"));
        assert!(policy.is_hidden("y.calnotes"));
        assert!(!policy.is_hidden("discoverer.txt"));
        assert!(!policy.is_hidden("coverage.epub"));
    }

    #[test]
    fn calibre_markers_need_option() {
        let policy = VisibilityPolicy {
            hide_dot_files: true,
            ..Default::default()
        };
        assert!(!policy.is_hidden("metadata.opf"));
        assert!(!policy.is_hidden("cover.jpg"));
    }

    #[test]
    fn hidden_parent_hides_path() {
        let policy = all_hidden();
        assert!(policy.is_path_hidden(Path::new(".Trash/mybook.epub")));
        assert!(policy.is_path_hidden(Path::new("author/metadata.opf")));
        assert!(!policy.is_path_hidden(Path::new("author/mybook.epub")));
    }
}
