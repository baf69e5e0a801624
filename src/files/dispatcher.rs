use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::StaticFilesConfig;
use crate::files::resolver::{clean, resolve};
use crate::http::mime;
use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};

/// Turns valid requests into responses for files under a document root.
///
/// Holds only read-only state, so a single instance is shared by every
/// connection task.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    root: PathBuf,
    index_file: String,
}

impl Dispatcher {
    /// Creates a dispatcher serving `root`, made absolute and cleaned here.
    pub fn new(root: impl AsRef<Path>, index_file: impl Into<String>) -> io::Result<Self> {
        let root = clean(&std::path::absolute(root.as_ref())?);
        Ok(Self {
            root,
            index_file: index_file.into(),
        })
    }

    pub fn from_config(cfg: &StaticFilesConfig) -> io::Result<Self> {
        Self::new(&cfg.root, cfg.index_file.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn dispatch(&self, request: Request) -> Response {
        let path = match resolve(&self.root, &request.target, &self.index_file) {
            Ok(path) => path,
            Err(e) => {
                debug!(request_target = %request.target, error = %e, "Rejected request target");
                return Response::bad_request();
            }
        };

        // Anything stat cannot describe as a regular file is treated as absent.
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) if !m.is_dir() => m,
            Ok(_) => {
                debug!(path = %path.display(), "Target is a directory");
                return Response::not_found(request);
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Target not found");
                return Response::not_found(request);
            }
        };

        let mut builder = ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", mime::content_type(&path))
            .header("Content-Length", metadata.len().to_string());

        if let Ok(modified) = metadata.modified() {
            builder = builder.header("Last-Modified", httpdate::fmt_http_date(modified));
        }
        if request.close {
            builder = builder.header("Connection", "close");
        }

        debug!(path = %path.display(), size = metadata.len(), "Serving file");
        builder.file(path).request(request).build()
    }
}
