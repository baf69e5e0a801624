use std::fmt;

use crate::http::HTTP_VERSION;
use crate::http::header::HeaderMap;

/// HTTP request methods.
///
/// The server only serves static files, so GET is the single method it
/// accepts. Anything else is rejected by the parser with 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// # Example
    ///
    /// ```
    /// # use sitan::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// assert_eq!(Method::from_str("POST"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed HTTP request.
///
/// `Host` and `Connection` never appear in `headers`: the host is lifted into
/// its own field and `Connection: close` is reflected only by `close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method
    pub method: Method,
    /// The request target exactly as received (e.g. "/index.html")
    pub target: String,
    /// HTTP version (always "HTTP/1.1" for parsed requests)
    pub version: String,
    /// Remaining headers, keyed by canonical name
    pub headers: HeaderMap,
    /// Value of the mandatory Host header
    pub host: String,
    /// Whether the client sent `Connection: close`
    pub close: bool,
}

impl Request {
    /// Retrieves a header value by canonical name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Whether the connection may serve another request after this one.
    pub fn keep_alive(&self) -> bool {
        !self.close
    }
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Method,
    target: Option<String>,
    version: Option<String>,
    headers: HeaderMap,
    host: Option<String>,
    close: bool,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            target: None,
            version: None,
            headers: HeaderMap::new(),
            host: None,
            close: false,
        }
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn close(mut self, close: bool) -> Self {
        self.close = close;
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method,
            target: self.target.ok_or("target missing")?,
            version: self.version.unwrap_or_else(|| HTTP_VERSION.to_string()),
            headers: self.headers,
            host: self.host.ok_or("host missing")?,
            close: self.close,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
