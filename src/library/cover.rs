//! Companion cover lookup.

use super::{TrustedRoot, VisibilityPolicy};
use crate::opds::{Link, REL_IMAGE};
use std::path::Path;

/// Calibre stores a book's cover next to it under this name.
pub const COVER_FILE: &str = "cover.jpg";

/// Cover link for the book at `item`, if companion covers are enabled and a
/// `cover.jpg` sits in the same directory.
pub fn find_cover(root: &TrustedRoot, item: &Path, policy: &VisibilityPolicy) -> Option<Link> {
    if !policy.calibre_covers {
        return None;
    }

    let cover = item.parent()?.join(COVER_FILE);
    if !cover.is_file() || !root.contains(&cover) {
        return None;
    }

    let relative = root.relative(&cover)?;
    Some(Link::new(
        REL_IMAGE,
        super::shelf_href(relative),
        crate::media::type_for_path(&cover),
    ))
}
