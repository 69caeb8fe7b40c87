//! Extract a single `CREATE TABLE` statement from a SQL dump stream
#![warn(missing_docs)]
#![warn(clippy::large_stack_frames)]

pub mod lexer;

pub use lexer::sql::{extract, Error, Extractor, Step, Target};
pub use lexer::WindowConfig;
