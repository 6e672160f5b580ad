use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::access_log::AccessRecord;
use crate::docroot::decode::percent_decode;
use crate::docroot::file::serve_file;
use crate::docroot::listing::serve_directory;
use crate::docroot::{Resource, resolve};
use crate::http::error::ServeError;
use crate::http::parser::parse_request;
use crate::http::request::{Method, Request};
use crate::http::response::StatusCode;
use crate::http::writer::{BUFFER_SIZE, ResponseWriter};
use crate::server::ServerContext;

/// Handles exactly one request on an accepted stream, then closes it.
pub struct Connection<S> {
    stream: S,
    ctx: Arc<ServerContext>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Bytes),
    Closing,
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, ctx: Arc<ServerContext>) -> Self {
        Self {
            stream,
            ctx,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await? {
                        Some(raw) => ConnectionState::Processing(raw),
                        None => ConnectionState::Closing,
                    };
                }

                ConnectionState::Processing(raw) => {
                    self.process(&raw).await?;
                    self.state = ConnectionState::Closing;
                }

                ConnectionState::Closing => {
                    if let Err(e) = self.stream.shutdown().await {
                        tracing::debug!(error = %e, "shutdown after response failed");
                    }
                }

                ConnectionState::Closed => break,
            }
        }

        Ok(())
    }

    /// Reads the request with a single bounded read. Requests larger than
    /// the buffer are truncated.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Bytes>> {
        let mut buffer = BytesMut::with_capacity(BUFFER_SIZE);

        let n = match self.ctx.read_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.stream.read_buf(&mut buffer)).await {
                Ok(n) => n?,
                Err(_) => {
                    tracing::warn!(timeout = ?limit, "client sent nothing before timeout");
                    return Ok(None);
                }
            },
            None => self.stream.read_buf(&mut buffer).await?,
        };

        if n == 0 {
            // Client closed connection
            return Ok(None);
        }

        Ok(Some(buffer.freeze()))
    }

    async fn process(&mut self, raw: &Bytes) -> std::io::Result<()> {
        let (record, written) = match parse_request(raw) {
            Ok(request) => {
                let (status, written) = self.respond(&request).await;
                let record = AccessRecord {
                    method: request.method.as_str().to_string(),
                    host: request.host.clone(),
                    resource: request.target.clone(),
                    status: status.as_u16(),
                };
                (record, written)
            }

            Err(e) => {
                tracing::debug!(error = %e, "rejecting unparsable request");
                let status = e.to_request_error().status();
                let written = ResponseWriter::new(&mut self.stream)
                    .error(status, e.head_only())
                    .await;
                let record = AccessRecord {
                    method: e.method().to_string(),
                    host: e.host().to_string(),
                    resource: e.resource().to_string(),
                    status: status.as_u16(),
                };
                (record, written)
            }
        };

        // logged even when the socket failed part-way through
        self.ctx.access_log.record(&record);
        written?;

        self.stream.flush().await
    }

    async fn respond(&mut self, request: &Request) -> (StatusCode, std::io::Result<()>) {
        let ctx = &self.ctx;
        let head_only = request.method.is_head();
        let mut writer = ResponseWriter::new(&mut self.stream);

        let served = match request.method {
            Method::TRACE => trace(&mut writer, request).await,
            Method::GET | Method::HEAD => match resolve(&request.target, &ctx.root, &ctx.mimes).await {
                Ok(Resource::File { path, content_type }) => {
                    serve_file(&mut writer, &path, &content_type, head_only).await
                }
                Ok(Resource::Directory { path, base_path }) => {
                    let display = percent_decode(&base_path).unwrap_or_else(|_| base_path.clone());
                    serve_directory(&mut writer, &path, &base_path, &display, head_only).await
                }
                Err(e) => Err(ServeError::Rejected(e)),
            },
        };

        match served {
            Ok(()) => (StatusCode::Ok, Ok(())),
            Err(ServeError::Rejected(e)) => {
                let status = e.status();
                tracing::debug!(resource = %request.target, error = %e, "request rejected");
                (status, writer.error(status, head_only).await)
            }
            Err(ServeError::Io(e)) => (StatusCode::Ok, Err(e)),
        }
    }
}

/// Echoes the request bytes back exactly as they were read.
async fn trace<S>(writer: &mut ResponseWriter<'_, S>, request: &Request) -> Result<(), ServeError>
where
    S: AsyncWrite + Unpin,
{
    writer.write_head(StatusCode::Ok, "message/http").await?;
    writer.write_body(&request.raw).await?;
    Ok(())
}
