use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::response::{ResponseHead, StatusCode, error_body};

/// Chunk size used when streaming file bodies.
pub const BUFFER_SIZE: usize = 8192;

/// Writes a response onto a client stream: one head, then at most one body.
///
/// Nothing is buffered across calls; each method hands its bytes to the
/// stream before returning.
pub struct ResponseWriter<'a, S> {
    stream: &'a mut S,
}

impl<'a, S> ResponseWriter<'a, S>
where
    S: AsyncWrite + Unpin,
{
    pub fn new(stream: &'a mut S) -> Self {
        Self { stream }
    }

    pub async fn write_head(&mut self, status: StatusCode, content_type: &str) -> std::io::Result<()> {
        let head = ResponseHead::new(status, content_type);
        self.stream.write_all(&head.to_bytes()).await
    }

    pub async fn write_body(&mut self, body: &[u8]) -> std::io::Result<()> {
        self.stream.write_all(body).await
    }

    /// Copies `source` to the client in `BUFFER_SIZE` chunks until EOF.
    pub async fn stream_body<R>(&mut self, source: &mut R) -> std::io::Result<u64>
    where
        R: AsyncRead + Unpin,
    {
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut sent = 0u64;

        loop {
            let n = source.read(&mut buffer).await?;
            if n == 0 {
                break;
            }

            self.stream.write_all(&buffer[..n]).await?;
            sent += n as u64;
        }

        Ok(sent)
    }

    /// Error responder: `text/html` head, then the fixed template unless HEAD.
    pub async fn error(&mut self, status: StatusCode, head_only: bool) -> std::io::Result<()> {
        self.write_head(status, "text/html").await?;

        if !head_only {
            self.write_body(error_body(status).as_bytes()).await?;
        }

        Ok(())
    }

    pub async fn flush(&mut self) -> std::io::Result<()> {
        self.stream.flush().await
    }
}
