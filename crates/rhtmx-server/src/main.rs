// File: src/main.rs
// Purpose: Reference server: serve, pre-render or list the demo app's routes

mod demo;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rhtmx::{App, Config};
use tower_livereload::LiveReloadLayer;
use tracing::info;

#[derive(Parser)]
#[command(name = "rhtmx-server")]
#[command(version, about = "RHTMX reference server", long_about = None)]
struct Cli {
    /// Project root holding rhtmx.toml and the app directory
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the app (default)
    Serve {
        /// Overrides server.port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Pre-render static pages and write the route manifest
    Build,

    /// Print routes in matching order
    Routes,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::load(cli.root.join("rhtmx.toml"))?.with_env_overrides();

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => serve(config, cli.root, port).await,
        Commands::Build => build(config, cli.root).await,
        Commands::Routes => routes(config, cli.root),
    }
}

async fn serve(mut config: Config, root: PathBuf, port: Option<u16>) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let app = App::load(config, root, demo::catalog())?;
    info!("Loaded {} routes", app.registry().load().routes().len());

    let router = app.router();
    let router = if app.config().dev.hot_reload {
        let livereload = LiveReloadLayer::new();
        let reloader = livereload.reloader();
        app.watch(move || reloader.reload())?;
        info!("Hot reload: enabled");
        router.layer(livereload)
    } else {
        router
    };

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, router).await?;
    Ok(())
}

async fn build(config: Config, root: PathBuf) -> Result<()> {
    let app = App::load(config, root, demo::catalog())?;
    let report = app.build().await?;

    for page in &report.pages {
        println!("  {}", page);
    }
    for skipped in &report.skipped {
        println!("  {} (skipped: {})", skipped.pattern, skipped.reason);
    }
    Ok(())
}

fn routes(config: Config, root: PathBuf) -> Result<()> {
    let app = App::load(config, root, demo::catalog())?;
    let registry = app.registry().load();

    for route in registry.routes() {
        println!("  {:<24} {:<10} {}", route.pattern(), "page", route.file);
    }
    for route in registry.api_routes() {
        let methods = route
            .methods()
            .iter()
            .map(|method| method.as_str())
            .collect::<Vec<_>>()
            .join(",");
        println!("  {:<24} {:<10} {}", route.pattern(), methods, route.file);
    }
    Ok(())
}
