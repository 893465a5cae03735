#![cfg(not(tarpaulin_include))]

use assembly_tracker::app;
use assembly_tracker::config::ServerConfig;
use std::env;

/// Main entry point for the slot board web application
///
/// # Arguments
/// * Optional positional `<host> <port>`; `ASSEMBLY_BIND` and
///   `ASSEMBLY_MAX_UPLOAD_MB` override them
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = ServerConfig::from_sources(&args, |key| env::var(key).ok())?;

    log::info!(
        "Starting slot board (max upload {} MiB)",
        config.max_upload_bytes / (1024 * 1024)
    );
    app::run(config).await
}
