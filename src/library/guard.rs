//! Containment of request paths inside the served directory.

use crate::error::{AppError, Result};
use std::path::{Component, Path, PathBuf};

/// Canonical directory outside of which nothing is served.
#[derive(Debug, Clone)]
pub struct TrustedRoot {
    path: PathBuf,
}

impl TrustedRoot {
    /// Canonicalize `path` and check it is a directory.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let canonical = std::fs::canonicalize(path).map_err(|e| {
            AppError::Config(format!("Cannot open library {}: {}", path.display(), e))
        })?;

        if !canonical.is_dir() {
            return Err(AppError::Config(format!(
                "Library root is not a directory: {}",
                canonical.display()
            )));
        }

        Ok(Self { path: canonical })
    }

    /// Canonical root path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a `/`-separated request path against the root.
    ///
    /// The joined path is normalized lexically, then symlinks are resolved and
    /// the result must still lie at or below the root.
    pub fn resolve(&self, request_path: &str) -> Result<PathBuf> {
        let joined = request_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.path.clone(), |path, segment| path.join(segment));
        let candidate = normalize(&joined);

        let canonical = std::fs::canonicalize(&candidate).map_err(|e| {
            tracing::info!(path = %candidate.display(), error = %e, "Cannot canonicalize path");
            AppError::PathRejected(request_path.to_string())
        })?;

        if !canonical.starts_with(&self.path) {
            tracing::warn!(
                path = %canonical.display(),
                root = %self.path.display(),
                "Path escapes library root"
            );
            return Err(AppError::PathRejected(request_path.to_string()));
        }

        Ok(canonical)
    }

    /// Whether `path` still lies at or below the root once symlinks are resolved.
    pub fn contains(&self, path: &Path) -> bool {
        std::fs::canonicalize(path).is_ok_and(|canonical| canonical.starts_with(&self.path))
    }

    /// Path relative to the root, if `path` lies below it.
    pub fn relative<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        path.strip_prefix(&self.path).ok()
    }
}

/// Lexically remove `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn library() -> (tempfile::TempDir, TrustedRoot) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("mybook")).unwrap();
        fs::write(dir.path().join("mybook/mybook.epub"), "Fixture").unwrap();
        let root = TrustedRoot::new(dir.path()).unwrap();
        (dir, root)
    }

    #[test]
    fn normalize_is_lexical() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/a/../../b")), PathBuf::from("/b"));
    }

    #[test]
    fn resolves_inside_root() {
        let (_dir, root) = library();
        let resolved = root.resolve("/mybook/mybook.epub").unwrap();
        assert!(resolved.starts_with(root.path()));
        assert_eq!(root.resolve("").unwrap(), root.path());
        assert_eq!(root.resolve("/mybook/../").unwrap(), root.path());
    }

    #[test]
    fn rejects_traversal() {
        let (_dir, root) = library();
        assert!(matches!(
            root.resolve("/../../../../mybook"),
            Err(AppError::PathRejected(_))
        ));
        assert!(matches!(root.resolve(".."), Err(AppError::PathRejected(_))));
    }

    #[test]
    fn rejects_missing() {
        let (_dir, root) = library();
        assert!(matches!(
            root.resolve("/mybook/missing.epub"),
            Err(AppError::PathRejected(_))
        ));
    }

    #[test]
    fn rejects_sibling_with_common_prefix() {
        let parent = tempfile::tempdir().unwrap();
        fs::create_dir(parent.path().join("lib")).unwrap();
        fs::create_dir(parent.path().join("lib2")).unwrap();
        let root = TrustedRoot::new(parent.path().join("lib")).unwrap();
        assert!(root.resolve("/../lib2").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn rejects_symlink_out_of_root() {
        let (dir, root) = library();
        let outside = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("escape")).unwrap();
        assert!(root.resolve("/escape").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn contains_follows_links() {
        let (dir, root) = library();
        let outside = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("escape")).unwrap();
        std::os::unix::fs::symlink("mybook", dir.path().join("alias")).unwrap();

        assert!(root.contains(&root.path().join("mybook/mybook.epub")));
        assert!(root.contains(&root.path().join("alias")));
        assert!(!root.contains(&root.path().join("escape")));
        assert!(!root.contains(&root.path().join("missing")));
    }

    #[test]
    fn root_must_be_directory() {
        let (dir, _root) = library();
        assert!(TrustedRoot::new(dir.path().join("mybook/mybook.epub")).is_err());
        assert!(TrustedRoot::new(dir.path().join("nope")).is_err());
    }
}
