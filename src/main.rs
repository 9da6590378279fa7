//!
//! studio server binary
//! --------------------
//! Command-line entry point. Configuration comes from `STUDIO_*` environment
//! variables and flags; see `--help`.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use studio::config::{has_flag, ServerConfig, USAGE};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    // Init logging
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).init();

    let cfg = ServerConfig::from_env_and_args(&args)?;
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(target: "studio", "studio starting: RUST_LOG='{}', addr={}", rust_log, cfg.socket_addr());

    studio::server::run_with_config(cfg).await
}
