//! Static file serving
//!
//! Maps request targets onto the document root and builds the responses
//! for them.

pub mod dispatcher;
pub mod resolver;

pub use dispatcher::Dispatcher;
