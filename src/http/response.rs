use std::path::PathBuf;
use std::time::SystemTime;

use crate::http::HTTP_VERSION;
use crate::http::header::HeaderMap;
use crate::http::request::Request;

/// HTTP status codes produced by the server.
///
/// - `Ok` (200): the file is served
/// - `BadRequest` (400): malformed request or a target outside the document root
/// - `NotFound` (404): no such file, or the target is a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use sitan::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
        }
    }

    /// Maps a numeric code back onto the supported set.
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(StatusCode::Ok),
            400 => Some(StatusCode::BadRequest),
            404 => Some(StatusCode::NotFound),
            _ => None,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use sitan::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::BadRequest.reason_phrase(), "Bad Request");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
        }
    }
}

/// An HTTP response ready to be written to a client.
///
/// The body is never held in memory: a 200 response names the file to stream
/// through `file_path`, and every other response has no body.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Protocol version for the status line
    pub version: String,
    /// Headers, keyed by canonical name
    pub headers: HeaderMap,
    /// The valid request this answers, if there was one
    pub request: Option<Request>,
    /// File whose content forms the body
    pub file_path: Option<PathBuf>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/html")
///     .file(path)
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HeaderMap,
    request: Option<Request>,
    file_path: Option<PathBuf>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            request: None,
            file_path: None,
        }
    }

    /// Adds or replaces a header. The key is canonicalized.
    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Sets the file streamed as the body.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Links the response to the request it answers.
    pub fn request(mut self, request: Request) -> Self {
        self.request = Some(request);
        self
    }

    /// Builds the final Response.
    ///
    /// A `Date` header is added unless one was set explicitly.
    pub fn build(mut self) -> Response {
        if !self.headers.contains_key("Date") {
            self.headers.insert("Date", httpdate::fmt_http_date(SystemTime::now()));
        }

        Response {
            status: self.status,
            version: HTTP_VERSION.to_string(),
            headers: self.headers,
            request: self.request,
            file_path: self.file_path,
        }
    }
}

impl Response {
    /// Creates a 400 Bad Request response. It always closes the connection.
    pub fn bad_request() -> Self {
        ResponseBuilder::new(StatusCode::BadRequest)
            .header("Connection", "close")
            .build()
    }

    /// Creates a 404 Not Found response for `request`, closing the
    /// connection only if the client asked for it.
    pub fn not_found(request: Request) -> Self {
        let mut builder = ResponseBuilder::new(StatusCode::NotFound);
        if request.close {
            builder = builder.header("Connection", "close");
        }
        builder.request(request).build()
    }

    /// Whether the connection must be closed once this response is written.
    pub fn closes_connection(&self) -> bool {
        self.status == StatusCode::BadRequest || self.headers.get("Connection") == Some("close")
    }
}
