use std::error;
use std::fmt;
use std::io;

/// Extraction errors
#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// I/O Error
    Io(io::Error),
    /// Table name is empty or only whitespace
    EmptyTableName,
    /// Window cannot hold the lookahead needed to match the target
    WindowTooSmall {
        /// configured capacity
        capacity: usize,
        /// configured shift
        shift: usize,
        /// bytes of lookahead required
        lookahead: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(ref err) => err.fmt(f),
            Self::EmptyTableName => f.write_str("empty table name"),
            Self::WindowTooSmall {
                capacity,
                shift,
                lookahead,
            } => write!(
                f,
                "window of {capacity} bytes shifted by {shift} cannot guarantee {lookahead} bytes of lookahead"
            ),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
