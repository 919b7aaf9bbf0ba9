//! Media types for served files and catalog documents.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

/// Navigation feed (links to sub-catalogs).
pub const NAVIGATION_TYPE: &str = "application/atom+xml;profile=opds-catalog;kind=navigation";

/// Acquisition feed (links to downloadable books).
pub const ACQUISITION_TYPE: &str = "application/atom+xml;profile=opds-catalog;kind=acquisition";

/// OpenSearch description document.
pub const OPENSEARCH_TYPE: &str = "application/opensearchdescription+xml";

/// Fallback for extensions missing from the table.
pub const DEFAULT_TYPE: &str = "application/octet-stream";

/// Ebook formats whose media type overrides the generic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookFormat {
    /// EPUB format (Electronic Publication).
    Epub,
    /// MOBI format (Mobipocket eBook).
    Mobi,
    /// CBZ format (Comic Book ZIP archive).
    Cbz,
    /// CBR format (Comic Book RAR archive).
    Cbr,
    /// FB2 format (FictionBook).
    Fb2,
    /// PDF format (Portable Document Format).
    Pdf,
}

impl BookFormat {
    /// Every overridden format.
    pub const ALL: [BookFormat; 6] = [
        BookFormat::Epub,
        BookFormat::Mobi,
        BookFormat::Cbz,
        BookFormat::Cbr,
        BookFormat::Fb2,
        BookFormat::Pdf,
    ];

    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            BookFormat::Epub => "application/epub+zip",
            BookFormat::Mobi => "application/x-mobipocket-ebook",
            BookFormat::Cbz => "application/x-cbz",
            BookFormat::Cbr => "application/x-cbr",
            BookFormat::Fb2 => "text/fb2+xml",
            BookFormat::Pdf => "application/pdf",
        }
    }

    /// Lowercase file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            BookFormat::Epub => "epub",
            BookFormat::Mobi => "mobi",
            BookFormat::Cbz => "cbz",
            BookFormat::Cbr => "cbr",
            BookFormat::Fb2 => "fb2",
            BookFormat::Pdf => "pdf",
        }
    }

    /// Try to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }
}

const GENERIC_TYPES: &[(&str, &str)] = &[
    ("avif", "image/avif"),
    ("azw", "application/vnd.amazon.ebook"),
    ("azw3", "application/vnd.amazon.ebook"),
    ("css", "text/css; charset=utf-8"),
    ("djvu", "image/vnd.djvu"),
    ("doc", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("gif", "image/gif"),
    ("htm", "text/html; charset=utf-8"),
    ("html", "text/html; charset=utf-8"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("js", "text/javascript; charset=utf-8"),
    ("json", "application/json"),
    ("m4b", "audio/mp4"),
    ("md", "text/markdown; charset=utf-8"),
    ("mp3", "audio/mpeg"),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("png", "image/png"),
    ("rtf", "application/rtf"),
    ("svg", "image/svg+xml"),
    ("txt", "text/plain; charset=utf-8"),
    ("webp", "image/webp"),
    ("xml", "text/xml; charset=utf-8"),
    ("zip", "application/zip"),
];

/// Extension table, built on first use and never mutated afterwards.
static TYPES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut table: HashMap<_, _> = GENERIC_TYPES.iter().copied().collect();
    for format in BookFormat::ALL {
        table.insert(format.extension(), format.mime_type());
    }
    table
});

/// Force the table to be built. Called once before serving starts.
pub fn init() {
    LazyLock::force(&TYPES);
}

/// Media type for a file, looked up by extension.
pub fn type_for_path(path: impl AsRef<Path>) -> &'static str {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|e| TYPES.get(e.to_lowercase().as_str()).copied())
        .unwrap_or(DEFAULT_TYPE)
}

/// Whether the file name has an image extension served as a thumbnail.
pub fn is_image(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e, "png" | "jpg" | "jpeg" | "gif"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ebook_overrides_win() {
        assert_eq!(type_for_path("a/b.epub"), "application/epub+zip");
        assert_eq!(type_for_path("b.mobi"), "application/x-mobipocket-ebook");
        assert_eq!(type_for_path("b.cbz"), "application/x-cbz");
        assert_eq!(type_for_path("b.cbr"), "application/x-cbr");
        assert_eq!(type_for_path("b.fb2"), "text/fb2+xml");
        assert_eq!(type_for_path("b.PDF"), "application/pdf");
    }

    #[test]
    fn generic_and_unknown_types() {
        assert_eq!(type_for_path("notes.txt"), "text/plain; charset=utf-8");
        assert_eq!(type_for_path("cover.jpg"), "image/jpeg");
        assert_eq!(type_for_path("archive.xyz"), DEFAULT_TYPE);
        assert_eq!(type_for_path("README"), DEFAULT_TYPE);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(BookFormat::from_extension("EPUB"), Some(BookFormat::Epub));
        assert_eq!(BookFormat::from_extension("fb2"), Some(BookFormat::Fb2));
        assert_eq!(BookFormat::from_extension("txt"), None);
    }

    #[test]
    fn image_names() {
        assert!(is_image("cover.jpg"));
        assert!(is_image("scan.png"));
        assert!(!is_image("scan.PNG"));
        assert!(!is_image("book.epub"));
        assert!(!is_image("jpg"));
    }
}
