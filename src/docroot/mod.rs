//! Document root: turning request targets into files and listings.
//!
//! - **`decode`**: percent-decoding of request targets
//! - **`resolve`**: classification of a decoded path under the root
//! - **`file`**: content-type lookup and static file streaming
//! - **`listing`**: index-file fallback and HTML directory listings

pub mod decode;
pub mod file;
pub mod listing;
pub mod resolve;

pub use resolve::{Resource, resolve};
