use std::sync::Arc;

use dirhttpd::config::Config;
use dirhttpd::server::{self, Dispatcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let dispatcher = Arc::new(Dispatcher::from_config(&cfg));

    tracing::info!(root = %cfg.root.display(), "Serving directory listings");

    tokio::select! {
        res = server::listener::run(&cfg, Arc::clone(&dispatcher)) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    dispatcher.shutdown().await;

    Ok(())
}
