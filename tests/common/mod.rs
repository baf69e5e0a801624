//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// A scratch document root, removed on drop.
pub struct TempRoot {
    path: PathBuf,
}

impl TempRoot {
    pub fn new(name: &str) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "sitan-{}-{}-{}",
            name,
            std::process::id(),
            id
        ));
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, rel: &str, contents: &[u8]) -> PathBuf {
        let file = self.path.join(rel);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&file, contents).unwrap();
        file
    }

    pub fn mkdir(&self, rel: &str) {
        std::fs::create_dir_all(self.path.join(rel)).unwrap();
    }
}

impl Drop for TempRoot {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// A response as a client sees it.
#[derive(Debug)]
pub struct ParsedResponse {
    pub version: String,
    pub status: u16,
    pub reason: String,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

/// Splits `bytes` into consecutive responses. Bodies are delimited by
/// Content-Length; a response without it has no body.
pub fn parse_responses(mut bytes: &[u8]) -> Vec<ParsedResponse> {
    let mut out = Vec::new();

    while !bytes.is_empty() {
        let end = bytes
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("response head is terminated");
        let head = std::str::from_utf8(&bytes[..end]).unwrap();
        let mut lines = head.split("\r\n");

        let status_line = lines.next().unwrap();
        let mut parts = status_line.splitn(3, ' ');
        let version = parts.next().unwrap().to_string();
        let status = parts.next().unwrap().parse().unwrap();
        let reason = parts.next().unwrap().to_string();

        let mut headers = BTreeMap::new();
        for line in lines {
            let (k, v) = line.split_once(": ").unwrap();
            headers.insert(k.to_string(), v.to_string());
        }

        let body_len: usize = headers
            .get("Content-Length")
            .map(|v| v.parse().unwrap())
            .unwrap_or(0);
        let body_start = end + 4;
        let body = bytes[body_start..body_start + body_len].to_vec();
        bytes = &bytes[body_start + body_len..];

        out.push(ParsedResponse {
            version,
            status,
            reason,
            headers,
            body,
        });
    }

    out
}
