use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::http::connection::Connection;
use crate::server::ServerContext;

/// Pause after a failed accept so a persistent error (e.g. EMFILE) does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub async fn bind(addr: &str) -> anyhow::Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accepts and serves connections one at a time, forever.
///
/// Nothing a client does ends this loop: accept errors back off and retry,
/// connection errors are logged and the next accept proceeds.
pub async fn accept_loop(worker: usize, listener: Arc<TcpListener>, ctx: Arc<ServerContext>) {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(worker, error = %e, "accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };

        debug!(worker, %peer, "Accepted connection");
        ctx.access_log
            .message(&format!("Client IP: {} connected using worker {}", peer.ip(), worker));

        let mut conn = Connection::new(socket, Arc::clone(&ctx));
        if let Err(e) = conn.run().await {
            error!(worker, "Connection error from {}: {}", peer, e);
        }

        ctx.access_log
            .message(&format!("Disconnected client IP: {} from worker {}", peer.ip(), worker));
    }
}
