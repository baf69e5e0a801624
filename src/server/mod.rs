//! TCP accept loop.

pub mod listener;
