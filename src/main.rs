use anyhow::Result;
use promptforge::cli::{self, Args, ConfigDiscovery};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match ConfigDiscovery::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the configured filter
    let default_filter = if args.verbose {
        "promptforge=debug"
    } else {
        config.log_filter()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting promptforge {}", env!("CARGO_PKG_VERSION"));

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling");
            ctrl_c.cancel();
        }
    });

    if let Err(e) = cli::run(args, config, cancel).await {
        error!("Command failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    debug!("Done");
    Ok(())
}
