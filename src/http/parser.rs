use std::io;

use tokio::io::AsyncRead;

use crate::http::HTTP_VERSION;
use crate::http::header::{HeaderMap, canonical_key, is_valid_key};
use crate::http::reader::{Interruption, LineError, LineReader};
use crate::http::request::{Method, Request};
use crate::http::response::StatusCode;

/// A request that was received but cannot be served.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("malformed start line: {0:?}")]
    MalformedStartLine(String),

    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(String),

    #[error("malformed header line: {0:?}")]
    MalformedHeader(String),

    #[error("invalid header key: {0:?}")]
    InvalidHeaderKey(String),

    #[error("missing Host header")]
    MissingHost,

    #[error("line exceeds {0} bytes")]
    LineTooLong(usize),

    #[error("more than {0} header lines")]
    TooManyHeaders(usize),

    #[error("request line is not valid UTF-8")]
    InvalidEncoding,

    #[error("empty request target")]
    EmptyTarget,

    #[error("request target must start with '/': {0:?}")]
    RelativeTarget(String),

    #[error("request target escapes the document root: {0:?}")]
    PathEscape(String),
}

impl ParseError {
    /// The status code the client receives for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ParseError::MalformedStartLine(_)
            | ParseError::UnsupportedMethod(_)
            | ParseError::UnsupportedVersion(_)
            | ParseError::MalformedHeader(_)
            | ParseError::InvalidHeaderKey(_)
            | ParseError::MissingHost
            | ParseError::LineTooLong(_)
            | ParseError::TooManyHeaders(_)
            | ParseError::InvalidEncoding
            | ParseError::EmptyTarget
            | ParseError::RelativeTarget(_)
            | ParseError::PathEscape(_) => StatusCode::BadRequest,
        }
    }
}

/// Outcome of a failed attempt to read one request.
///
/// `bytes_received` tells an idle client (nothing sent for this request)
/// apart from one that stopped halfway through.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("end of stream (bytes received: {bytes_received})")]
    EndOfStream { bytes_received: bool },

    #[error("read timed out (bytes received: {bytes_received})")]
    Timeout { bytes_received: bool },

    #[error(transparent)]
    Io(io::Error),
}

impl RequestError {
    fn from_line(err: LineError, earlier_lines: bool) -> Self {
        match err {
            LineError::Incomplete { cause, buffered } => {
                let bytes_received = earlier_lines || buffered > 0;
                match cause {
                    Interruption::EndOfStream => RequestError::EndOfStream { bytes_received },
                    Interruption::Timeout => RequestError::Timeout { bytes_received },
                }
            }
            LineError::TooLong(max) => RequestError::Parse(ParseError::LineTooLong(max)),
            LineError::InvalidEncoding => RequestError::Parse(ParseError::InvalidEncoding),
            LineError::Io(e) => RequestError::Io(e),
        }
    }
}

/// Reads the next request from `lines`: a start line, at most `max_headers`
/// header lines, and the empty line that ends them. Requests carry no body.
pub async fn read_request<R: AsyncRead + Unpin>(
    lines: &mut LineReader<R>,
    max_headers: usize,
) -> Result<Request, RequestError> {
    let start_line = lines
        .read_line()
        .await
        .map_err(|e| RequestError::from_line(e, false))?;
    let (method, target, version) = parse_start_line(&start_line)?;

    let mut headers = HeaderMap::new();
    let mut header_lines = 0;
    loop {
        let line = lines
            .read_line()
            .await
            .map_err(|e| RequestError::from_line(e, true))?;
        if line.is_empty() {
            break;
        }

        // Duplicates count too, so the head stays within max_headers lines.
        header_lines += 1;
        if header_lines > max_headers {
            return Err(ParseError::TooManyHeaders(max_headers).into());
        }

        let (key, value) = parse_header_line(&line)?;
        headers.insert(&key, value);
    }

    Ok(finish_request(method, target, version, headers)?)
}

/// Splits a start line into method, target and protocol version.
///
/// The line is split at its first two spaces; any further spaces stay in the
/// version segment, which then fails validation.
pub fn parse_start_line(line: &str) -> Result<(Method, String, String), ParseError> {
    let (method, rest) = line
        .split_once(' ')
        .ok_or_else(|| ParseError::MalformedStartLine(line.to_string()))?;
    let (target, version) = rest
        .split_once(' ')
        .ok_or_else(|| ParseError::MalformedStartLine(line.to_string()))?;

    let method = Method::from_str(method)
        .ok_or_else(|| ParseError::UnsupportedMethod(method.to_string()))?;

    if version != HTTP_VERSION {
        return Err(ParseError::UnsupportedVersion(version.to_string()));
    }

    Ok((method, target.to_string(), version.to_string()))
}

/// Splits a header line into its canonical key and value.
///
/// Leading spaces of the value are dropped; everything after them is kept
/// byte for byte, trailing spaces included.
pub fn parse_header_line(line: &str) -> Result<(String, String), ParseError> {
    let (key, value) = match line.split_once(':') {
        Some((key, value)) if !key.is_empty() => (key, value),
        _ => return Err(ParseError::MalformedHeader(line.to_string())),
    };

    if !is_valid_key(key) {
        return Err(ParseError::InvalidHeaderKey(key.to_string()));
    }

    Ok((canonical_key(key), value.trim_start_matches(' ').to_string()))
}

fn finish_request(
    method: Method,
    target: String,
    version: String,
    mut headers: HeaderMap,
) -> Result<Request, ParseError> {
    let host = headers.remove("Host").ok_or(ParseError::MissingHost)?;
    let close = headers.remove("Connection").is_some_and(|v| v == "close");

    Ok(Request {
        method,
        target,
        version,
        headers,
        host,
        close,
    })
}
