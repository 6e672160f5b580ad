use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use lantern::access_log::AccessLog;
use lantern::config::Config;
use lantern::http::mime::MimeRegistry;
use lantern::server::{ServerContext, WorkerPool, listener};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "lantern=info".into()),
        )
        .init();

    let cfg = Config::load();

    if let Some(dir) = &cfg.docroot {
        std::env::set_current_dir(dir)
            .with_context(|| format!("can't change to directory {}", dir.display()))?;
    }
    let root = std::env::current_dir().context("document root is not accessible")?;

    let access_log = AccessLog::create(&cfg.log_file)
        .with_context(|| format!("error opening log file {}", cfg.log_file.display()))?;
    tracing::info!("Using {} as the log file", cfg.log_file.display());

    let mimes = load_mimes(&cfg);
    let ctx = ServerContext::new(root, mimes, access_log).with_read_timeout(cfg.read_timeout());
    let ctx = Arc::new(ctx);

    let listener = listener::bind(&cfg.listen_addr()).await?;
    let port = listener.local_addr()?.port();
    ctx.access_log
        .message(&format!("Server is listening on port: {port}"));

    let pool = WorkerPool::new(listener, Arc::clone(&ctx), cfg.prefork);

    tokio::select! {
        res = pool.run() => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn load_mimes(cfg: &Config) -> MimeRegistry {
    let Some(path) = &cfg.mime_file else {
        return MimeRegistry::default();
    };

    match MimeRegistry::load(path) {
        Ok(mimes) => {
            if mimes.is_empty() {
                tracing::warn!("{} defines no mime types; every file will be refused", path.display());
            }
            tracing::info!(types = mimes.len(), "Using {} as the supported mime type file", path.display());
            mimes
        }
        Err(e) => {
            tracing::warn!(error = %e, "{}: using default mimes", path.display());
            MimeRegistry::default()
        }
    }
}
