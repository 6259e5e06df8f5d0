//! Common utilities for the library.
//!

pub mod formatter;
pub mod loader;
pub mod log;
