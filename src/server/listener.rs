use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::server::dispatcher::Dispatcher;

pub async fn run(cfg: &Config, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    serve(listener, dispatcher).await
}

/// Accepts connections until the dispatcher is stopped.
pub async fn serve(listener: TcpListener, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    let mut stopped = dispatcher.registry().subscribe();

    while !dispatcher.is_stopped() {
        let (socket, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::error!(error = %e, "Accept failed");
                    continue;
                }
            },
            _ = stopped.changed() => break,
        };

        info!("Accepted connection from {}", peer);
        if let Err(e) = dispatcher.dispatch(socket).await {
            tracing::warn!(peer = %peer, error = %e, "Connection rejected");
        }
    }

    Ok(())
}
