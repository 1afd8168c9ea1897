use clap::Parser;
use sheets_backend::{
    BackendConfig, GoogleEndpoints, logging::init_logging, resolve_settings, start_server,
};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Plugin backend for the Google Sheets datasource.
///
/// Serves one datasource: health checks, spreadsheet listing and queries
/// against the Google Sheets API.
#[derive(Parser, Debug)]
#[command(name = "sheets_backend")]
#[command(version, about)]
struct Args {
    /// Address to bind the HTTP server.
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind_addr: SocketAddr,

    /// JSON file with the datasource instance settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Datasource id served when no settings file is given.
    #[arg(long, default_value_t = 1)]
    datasource_id: u64,

    /// Log at debug level.
    #[arg(long)]
    debug: bool,

    /// Log to stderr instead of the rolling log file.
    #[arg(long)]
    log_to_stderr: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    init_logging(log_level, !args.log_to_stderr)?;

    let settings = resolve_settings(args.config.as_deref(), args.datasource_id)?;
    tracing::info!(
        id = settings.id,
        name = %settings.name,
        "Serving datasource"
    );

    let config = BackendConfig {
        bind_addr: args.bind_addr,
        settings,
        endpoints: GoogleEndpoints::default(),
    };
    start_server(config).await?;
    Ok(())
}
