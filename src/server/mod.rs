//! Listening socket, worker pool and the state workers share.

pub mod context;
pub mod listener;
pub mod pool;

pub use context::ServerContext;
pub use pool::WorkerPool;
