//! Lantern - minimal preforking HTTP/1.1 origin server
//!
//! Core library for request handling, document-root resolution and the
//! worker pool.

pub mod access_log;
pub mod config;
pub mod docroot;
pub mod http;
pub mod server;
