//! File / directory-of-files / directory-of-directories classification.

use std::path::Path;

/// Kind of a filesystem path as seen by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PathKind {
    /// Plain file (also the fallback when the path cannot be stat'ed).
    #[default]
    File,
    /// Directory holding at least one non-directory child.
    DirOfFiles,
    /// Directory holding only directories, or nothing at all.
    DirOfDirs,
}

/// Classify `path` from a fresh stat. Visibility rules are not applied to children.
pub fn classify(path: &Path) -> PathKind {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot stat path");
            return PathKind::File;
        }
    };

    if !metadata.is_dir() {
        return PathKind::File;
    }

    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot read directory");
            return PathKind::DirOfDirs;
        }
    };

    let has_file = entries
        .filter_map(|e| e.ok())
        .any(|e| e.file_type().map(|t| !t.is_dir()).unwrap_or(false));

    if has_file {
        PathKind::DirOfFiles
    } else {
        PathKind::DirOfDirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn classifies_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("shelf/series")).unwrap();
        fs::create_dir(root.join("books")).unwrap();
        fs::write(root.join("books/a.epub"), "a").unwrap();
        fs::create_dir(root.join("books/extras")).unwrap();
        fs::create_dir(root.join("empty")).unwrap();

        assert_eq!(classify(&root.join("books/a.epub")), PathKind::File);
        assert_eq!(classify(&root.join("books")), PathKind::DirOfFiles);
        assert_eq!(classify(&root.join("shelf")), PathKind::DirOfDirs);
        assert_eq!(classify(&root.join("empty")), PathKind::DirOfDirs);
    }

    #[test]
    fn hidden_children_still_count() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".hidden"), "x").unwrap();
        assert_eq!(classify(dir.path()), PathKind::DirOfFiles);
    }

    #[test]
    fn missing_path_defaults_to_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(classify(&dir.path().join("missing")), PathKind::File);
    }
}
