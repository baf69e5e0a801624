use std::fmt;
use std::io;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::{Instant, timeout_at};

const READ_CHUNK: usize = 1024;

/// Why a line ended before its CRLF terminator arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    EndOfStream,
    Timeout,
}

impl fmt::Display for Interruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interruption::EndOfStream => write!(f, "end of stream"),
            Interruption::Timeout => write!(f, "read deadline exceeded"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    /// The source stopped before a terminator was found. `buffered` counts
    /// the bytes of the unfinished line that were already received.
    #[error("incomplete line: {cause} with {buffered} bytes buffered")]
    Incomplete { cause: Interruption, buffered: usize },

    #[error("line exceeds {0} bytes")]
    TooLong(usize),

    #[error("line is not valid UTF-8")]
    InvalidEncoding,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Reads CRLF-terminated lines from a byte source.
///
/// Every call to [`LineReader::read_line`] gets a fresh deadline of `timeout`,
/// so a client is only cut off for a single silent line, never for the total
/// time the connection has been open. Bytes past the returned line stay
/// buffered for the next call.
pub struct LineReader<R> {
    src: R,
    buf: BytesMut,
    timeout: Duration,
    max_line: usize,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(src: R, timeout: Duration, max_line: usize) -> Self {
        Self {
            src,
            buf: BytesMut::with_capacity(READ_CHUNK),
            timeout,
            max_line,
        }
    }

    /// Returns the next line with its CRLF stripped.
    pub async fn read_line(&mut self) -> Result<String, LineError> {
        let deadline = Instant::now() + self.timeout;

        loop {
            if let Some(pos) = find_crlf(&self.buf) {
                if pos > self.max_line {
                    return Err(LineError::TooLong(self.max_line));
                }
                let line = self.buf.split_to(pos + 2);
                let text = std::str::from_utf8(&line[..pos])
                    .map_err(|_| LineError::InvalidEncoding)?;
                return Ok(text.to_string());
            }

            // One extra byte allows for a trailing '\r' whose '\n' is in flight.
            if self.buf.len() > self.max_line + 1 {
                return Err(LineError::TooLong(self.max_line));
            }

            self.buf.reserve(READ_CHUNK);
            match timeout_at(deadline, self.src.read_buf(&mut self.buf)).await {
                Err(_) => {
                    return Err(LineError::Incomplete {
                        cause: Interruption::Timeout,
                        buffered: self.buf.len(),
                    });
                }
                Ok(Ok(0)) => {
                    return Err(LineError::Incomplete {
                        cause: Interruption::EndOfStream,
                        buffered: self.buf.len(),
                    });
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) if e.kind() == io::ErrorKind::TimedOut => {
                    return Err(LineError::Incomplete {
                        cause: Interruption::Timeout,
                        buffered: self.buf.len(),
                    });
                }
                Ok(Err(e)) => return Err(LineError::Io(e)),
            }
        }
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(input: &'static [u8]) -> LineReader<&'static [u8]> {
        LineReader::new(input, Duration::from_secs(1), 64)
    }

    #[tokio::test]
    async fn reads_lines_and_strips_terminator() {
        let mut lines = reader(b"first\r\nsecond\r\n\r\n");

        assert_eq!(lines.read_line().await.unwrap(), "first");
        assert_eq!(lines.read_line().await.unwrap(), "second");
        assert_eq!(lines.read_line().await.unwrap(), "");
    }

    #[tokio::test]
    async fn bare_newline_is_not_a_terminator() {
        let mut lines = reader(b"a\nb\r\n");
        assert_eq!(lines.read_line().await.unwrap(), "a\nb");
    }

    #[tokio::test]
    async fn end_of_stream_reports_partial_bytes() {
        let mut lines = reader(b"GET /");
        let err = lines.read_line().await.unwrap_err();

        assert!(matches!(
            err,
            LineError::Incomplete { cause: Interruption::EndOfStream, buffered: 5 }
        ));
    }

    #[tokio::test]
    async fn end_of_stream_with_nothing_buffered() {
        let mut lines = reader(b"");
        let err = lines.read_line().await.unwrap_err();

        assert!(matches!(
            err,
            LineError::Incomplete { cause: Interruption::EndOfStream, buffered: 0 }
        ));
    }

    #[tokio::test]
    async fn rejects_overlong_lines() {
        let long = [b'a'; 100];
        let mut lines = LineReader::new(&long[..], Duration::from_secs(1), 64);

        assert!(matches!(lines.read_line().await, Err(LineError::TooLong(64))));
    }

    #[tokio::test]
    async fn rejects_invalid_utf8() {
        let mut lines = reader(b"\xff\xfe\r\n");
        assert!(matches!(lines.read_line().await, Err(LineError::InvalidEncoding)));
    }

    #[tokio::test]
    async fn times_out_on_silent_source() {
        let (_client, server) = tokio::io::duplex(64);
        let mut lines = LineReader::new(server, Duration::from_millis(50), 64);

        let err = lines.read_line().await.unwrap_err();
        assert!(matches!(
            err,
            LineError::Incomplete { cause: Interruption::Timeout, buffered: 0 }
        ));
    }
}
