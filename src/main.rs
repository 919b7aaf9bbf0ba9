//! dir-opds server entry point.

use clap::Parser;
use dir_opds::{
    SystemClock,
    config::{Cli, Command, Config, ServeArgs},
    server,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "dir_opds=debug,tower_http=debug"
    } else {
        "dir_opds=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Find or load config
    let config_path = cli.config.clone().or_else(Config::find_config_file);

    let config = if let Some(ref path) = config_path {
        tracing::info!(path = %path.display(), "Loading config");
        Config::load(path)?
    } else {
        Config::default()
    };

    match cli.command {
        Some(Command::Init { force }) => cmd_init(force),
        Some(Command::Serve(args)) => cmd_serve(config, args).await,
        None => cmd_serve(config, ServeArgs::default()).await,
    }
}

/// Write the default config file.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let config_path = PathBuf::from("config.toml");

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, Config::generate_default())?;
    println!("Created config file: {}", config_path.display());
    println!("\nEdit config.toml to point [library] root at your books.");
    println!("Then run: dir-opds serve");

    Ok(())
}

/// Start the server.
async fn cmd_serve(mut config: Config, args: ServeArgs) -> anyhow::Result<()> {
    config.apply(&args);

    let state = server::AppState::new(&config, Arc::new(SystemClock))?;

    tracing::info!(
        bind = %config.server.bind,
        root = %state.catalog.root().path().display(),
        "Starting dir-opds server"
    );

    let app = server::create_router(state);

    let listener = TcpListener::bind(config.server.bind).await?;
    tracing::info!(address = %config.server.bind, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
