//! Sitan - Static File Server
//!
//! Core library for the HTTP protocol, document-root file serving and the
//! connection accept loop.

pub mod config;
pub mod files;
pub mod http;
pub mod server;
