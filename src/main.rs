use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rmr", about = "Read My Receipts — fleet receipt dashboard")]
struct Cli {
    /// Config file path (defaults to ~/.config/rmr/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Listen address override, e.g. 127.0.0.1:8090.
    #[arg(long)]
    bind: Option<String>,
    /// Log at debug level (an explicit RUST_LOG still wins).
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "rmr=debug,rmr_core=debug,rmr_fleet=debug,rmr_web=debug"
    } else {
        "rmr=info,rmr_core=info,rmr_fleet=info,rmr_web=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let mut config = match cli.config.as_deref() {
        Some(path) => rmr_core::config::Config::load_from(path)?,
        None => rmr_core::config::Config::load()?,
    };
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    tracing::info!(bind = %config.server.bind, config = ?cli.config, "rmr starting");

    let bind = config.server.bind.clone();
    let state = rmr_web::init(config);
    rmr_web::serve(state, &bind).await
}
