//! Streaming dump scanner

mod scan;
pub mod sql;

pub use scan::{Window, WindowConfig};
