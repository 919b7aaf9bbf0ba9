use crate::library::VisibilityPolicy;
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Serve a directory of ebooks as an OPDS catalog.
#[derive(Parser, Debug, Clone)]
#[command(name = "dir-opds")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file.
    #[arg(short, long, env = "DIR_OPDS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, env = "DIR_OPDS_DEBUG", global = true)]
    pub debug: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the server (default if no command given).
    Serve(ServeArgs),

    /// Write a default config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}

/// Overrides accepted by `serve`. Unset flags keep the config file value.
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Address to bind the server to.
    #[arg(short, long, env = "DIR_OPDS_BIND")]
    pub bind: Option<SocketAddr>,

    /// Directory to serve.
    #[arg(short, long, env = "DIR_OPDS_DIR")]
    pub dir: Option<PathBuf>,

    /// Hide files whose name starts with a dot.
    #[arg(long, env = "DIR_OPDS_HIDE_DOT_FILES")]
    pub hide_dot_files: bool,

    /// Hide calibre companion files (metadata.opf, cover.jpg, metadata.db...).
    #[arg(long, env = "DIR_OPDS_HIDE_CALIBRE_FILES")]
    pub hide_calibre_files: bool,

    /// Link the calibre `cover.jpg` next to a book as its cover.
    #[arg(long, env = "DIR_OPDS_CALIBRE_COVERS")]
    pub calibre_covers: bool,

    /// Send headers asking clients not to cache feeds and files.
    #[arg(long, env = "DIR_OPDS_NO_CACHE")]
    pub no_cache: bool,
}

/// Main configuration from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Served directory and visibility options.
    #[serde(default)]
    pub library: LibraryConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Catalog title.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            title: default_title(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::new(
        std::net::IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        8080,
    )
}

fn default_title() -> String {
    "My Library".to_string()
}

/// Library configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Directory served as the catalog root.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Hide dotfiles.
    #[serde(default)]
    pub hide_dot_files: bool,

    /// Hide calibre companion files.
    #[serde(default)]
    pub hide_calibre_files: bool,

    /// Attach sibling `cover.jpg` files as covers.
    #[serde(default)]
    pub calibre_covers: bool,

    /// Disable client caching.
    #[serde(default)]
    pub no_cache: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            hide_dot_files: false,
            hide_calibre_files: false,
            calibre_covers: false,
            no_cache: false,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("./books")
}

impl LibraryConfig {
    /// Visibility options applied to every request.
    pub fn policy(&self) -> VisibilityPolicy {
        VisibilityPolicy {
            hide_dot_files: self.hide_dot_files,
            hide_calibre_files: self.hide_calibre_files,
            calibre_covers: self.calibre_covers,
            no_cache: self.no_cache,
        }
    }
}

impl Config {
    /// Load configuration from file.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to parse config file: {}", e))
        })
    }

    /// Find config file in default locations.
    pub fn find_config_file() -> Option<PathBuf> {
        let candidates = [
            PathBuf::from("config.toml"),
            PathBuf::from("dir-opds.toml"),
            dirs::config_dir()
                .map(|p| p.join("dir-opds").join("config.toml"))
                .unwrap_or_default(),
            PathBuf::from("/etc/dir-opds/config.toml"),
        ];

        candidates.into_iter().find(|p| p.is_file())
    }

    /// Apply `serve` flags on top of the file values. Boolean flags only ever
    /// switch an option on.
    pub fn apply(&mut self, args: &ServeArgs) {
        if let Some(bind) = args.bind {
            self.server.bind = bind;
        }
        if let Some(dir) = &args.dir {
            self.library.root = dir.clone();
        }
        self.library.hide_dot_files |= args.hide_dot_files;
        self.library.hide_calibre_files |= args.hide_calibre_files;
        self.library.calibre_covers |= args.calibre_covers;
        self.library.no_cache |= args.no_cache;
    }

    /// Generate default config file content.
    pub fn generate_default() -> String {
        r#"# dir-opds configuration

[server]
bind = "0.0.0.0:8080"
title = "My Library"

[library]
# Directory served as the catalog root
root = "./books"
# Hide files and folders starting with a dot
hide_dot_files = false
# Hide calibre companion files (metadata.opf, cover.jpg, metadata.db, ...)
hide_calibre_files = false
# Use the calibre cover.jpg next to a book as its cover
calibre_covers = false
# Ask clients not to cache feeds and downloads
no_cache = false
"#
        .to_string()
    }
}
