use std::path::PathBuf;

use anyhow::Context;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::{Response, StatusCode};

/// Serializes the status line and headers of `resp`.
///
/// Headers come out in ascending key order, so the same response always
/// produces the same bytes.
pub fn serialize_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        resp.version,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers, sorted by the map
    for (k, v) in resp.headers.iter() {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// Writes one response to a stream: the serialized head, then the file body
/// for a 200 that names one.
pub struct ResponseWriter {
    head: Vec<u8>,
    written: usize,
    body: Option<PathBuf>,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        let body = match response.status {
            StatusCode::Ok => response.file_path.clone(),
            StatusCode::BadRequest | StatusCode::NotFound => None,
        };

        Self {
            head: serialize_head(response),
            written: 0,
            body,
        }
    }

    /// Writes the whole response and flushes. Any failure aborts the
    /// response; nothing is retried.
    pub async fn write_to_stream<W: AsyncWrite + Unpin>(
        &mut self,
        stream: &mut W,
    ) -> anyhow::Result<()> {
        while self.written < self.head.len() {
            let n = stream.write(&self.head[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        if let Some(path) = &self.body {
            let mut file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            tokio::io::copy(&mut file, stream)
                .await
                .with_context(|| format!("streaming {}", path.display()))?;
        }

        stream.flush().await?;
        Ok(())
    }
}
