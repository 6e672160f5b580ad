//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.1 subset: one request per connection, GET,
//! HEAD and TRACE only, no Content-Length, the connection close delimits
//! the body.
//!
//! # Architecture
//!
//! - **`connection`**: Per-connection state machine (read, process, close)
//! - **`parser`**: Extracts method, target and Host from the request bytes
//! - **`request`**: Parsed request representation
//! - **`response`**: Status codes, response head and error bodies
//! - **`writer`**: Writes heads and bodies to the client stream
//! - **`mime`**: Extension to content-type registry
//! - **`error`**: Request-scoped error taxonomy
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Single bounded read
//!        └──────┬──────┘
//!               │ bytes received (0 bytes → Closing)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Parse, resolve, write head + body, log
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │    Closing       │ ← Shut the stream down
//!        └──────┬───────────┘
//!               ▼
//!             Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use lantern::http::connection::Connection;
//!
//! let (socket, _addr) = listener.accept().await?;
//! let mut conn = Connection::new(socket, Arc::clone(&ctx));
//! conn.run().await?;
//! ```

pub mod connection;
pub mod error;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
