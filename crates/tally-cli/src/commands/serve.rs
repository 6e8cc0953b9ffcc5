//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use tally_server::ServerConfig;

use super::open_db;

pub async fn cmd_serve(db_path: &Path, host: &str, port: u16) -> Result<()> {
    let config = ServerConfig::new(host, port);

    println!("🚀 Starting Tally web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!("   CORS origins: {}", config.cors_origins.join(", "));

    let db = open_db(db_path)?;
    tally_server::serve(db, config)
        .await
        .context("Server error")
}
