//! Worker pool and supervisor.
//!
//! `prefork` worker tasks plus the main loop (worker 0) all run the same
//! accept loop against one shared listener. The OS hands each connection to exactly
//! one pending `accept`, which is the only load balancing there is.
//!
//! A worker that dies (a panic inside a handler) is joined by the supervisor
//! and replaced under the same id, so the pool never shrinks.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::{AbortHandle, JoinError, JoinSet};
use tracing::{error, info, warn};

use crate::server::ServerContext;
use crate::server::listener::accept_loop;

/// Id of the main accept loop, present even with no extra workers.
pub const MAIN_WORKER: usize = 0;

type Exit = (usize, Result<(), JoinError>);

pub struct WorkerPool {
    listener: Arc<TcpListener>,
    ctx: Arc<ServerContext>,
    prefork: usize,
}

impl WorkerPool {
    pub fn new(listener: TcpListener, ctx: Arc<ServerContext>, prefork: usize) -> Self {
        Self {
            listener: Arc::new(listener),
            ctx,
            prefork,
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the pool. Every accept loop, including the main one, lives in the
    /// supervised set, so this only returns if the set runs empty. Callers
    /// stop the pool by dropping this future.
    pub async fn run(self) -> anyhow::Result<()> {
        let mut workers = JoinSet::new();

        for id in MAIN_WORKER..=self.prefork {
            self.spawn_worker(&mut workers, id);
        }
        info!(workers = self.prefork + 1, "worker pool started");
        self.ctx
            .access_log
            .message(&format!("Started {} workers plus the main loop", self.prefork));

        while let Some(exit) = workers.join_next().await {
            self.reap(&mut workers, exit);
        }

        warn!("worker pool is empty");
        Ok(())
    }

    fn spawn_worker(&self, workers: &mut JoinSet<Exit>, id: usize) {
        let listener = Arc::clone(&self.listener);
        let ctx = Arc::clone(&self.ctx);

        // inner task so a panic surfaces as a JoinError tagged with its id
        workers.spawn(async move {
            let inner = tokio::spawn(accept_loop(id, listener, ctx));
            let _abort = AbortOnDrop(inner.abort_handle());
            (id, inner.await)
        });
    }

    fn reap(&self, workers: &mut JoinSet<Exit>, exit: Result<Exit, JoinError>) {
        match exit {
            Ok((id, Ok(()))) => {
                warn!(worker = id, "worker exited, respawning");
                self.spawn_worker(workers, id);
            }
            Ok((id, Err(e))) => {
                error!(worker = id, error = %e, "worker terminated, respawning");
                self.ctx
                    .access_log
                    .message(&format!("Worker {id} terminated, respawning"));
                self.spawn_worker(workers, id);
            }
            Err(e) => {
                error!(error = %e, "worker supervisor task failed");
            }
        }
    }
}

/// Aborts the wrapped worker when its supervising task is dropped.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}
