//! Greeting server
//!
//! Binds the configured address and answers `/` and `/greet/{npm}` until
//! killed.

use clap::Parser;
use greet_http::config::{load_server_config, ServerConfig};
use greet_http::http::Listener;
use greet_http::logging;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "greet_server")]
#[command(about = "Minimal HTTP/1.1 greeting server", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind, overrides the configuration file
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overrides the configuration file
    #[arg(short, long)]
    port: Option<u16>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_server_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    config.validate()?;

    tracing::info!(
        student = %config.student_name,
        npm = %config.student_npm,
        deflate_level = config.deflate_level,
        max_connections = ?config.max_connections,
        "starting greet server"
    );

    let router = Arc::new(config.router());
    let listener = Listener::bind(&config.host, config.port)?
        .max_connections(config.max_connections)
        .max_message_bytes(config.max_message_bytes);

    listener.run(router)?;
    Ok(())
}
