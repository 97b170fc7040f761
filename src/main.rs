mod app;
mod cache;
mod config;
mod controller;
mod event;
mod logging;
mod snipper;
mod transport;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "snip")]
#[command(about = "A terminal client for weekly status snippets")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/snip/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Snippet server URL, overriding the config file
  #[arg(short, long)]
  server: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let _log_guard = logging::init_tracing()?;

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Override server if specified on command line
  if let Some(server) = args.server {
    config.server.url = server;
    config.fetch_url()?;
  }

  tracing::info!(server = %config.server.url, "starting snip");

  // Initialize and run the app
  let mut app = app::App::new(&config)?;
  app.run().await?;

  Ok(())
}
