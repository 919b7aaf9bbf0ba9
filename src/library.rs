//! Filesystem side of the catalog: containment, classification, visibility,
//! covers and traversal.

mod classify;
mod cover;
mod guard;
mod visibility;
pub mod walk;

pub use classify::{PathKind, classify};
pub use cover::{COVER_FILE, find_cover};
pub use guard::{TrustedRoot, normalize};
pub use visibility::VisibilityPolicy;

use std::path::Path;

/// URL prefix under which the library tree is browsed and downloaded.
pub const SHELF_PREFIX: &str = "/shelf";

/// Browse/download URL for a root-relative path, each segment percent-encoded.
pub fn shelf_href(relative: &Path) -> String {
    let mut href = String::from(SHELF_PREFIX);
    for component in relative.components() {
        href.push('/');
        href.push_str(&urlencoding::encode(&component.as_os_str().to_string_lossy()));
    }
    href
}
