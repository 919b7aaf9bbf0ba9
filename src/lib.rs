//! dir-opds: serve a directory tree of ebooks as an OPDS catalog.
//!
//! Every request is answered straight from the filesystem: directories
//! become navigation or acquisition feeds, files are downloaded as-is.
//!
//! # Features
//!
//! - OPDS 1.2 navigation and acquisition feeds
//! - Newest books feed
//! - OpenSearch description and search across the whole tree
//! - Hiding of dotfiles and calibre companion files
//! - Calibre `cover.jpg` covers
//! - Path traversal protection

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Feed assembly.
pub mod catalog;
/// Time source for feeds.
pub mod clock;
/// Configuration and CLI.
pub mod config;
/// Error types.
pub mod error;
/// Filesystem access.
pub mod library;
/// Media types.
pub mod media;
/// OPDS feed generation.
pub mod opds;
/// HTTP server.
pub mod server;


pub use catalog::Catalog;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Cli, Command, Config};
pub use error::{AppError, Result};
pub use server::AppState;
