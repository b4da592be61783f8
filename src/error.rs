use std::fmt;

/// Error produced while building or rendering a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Failed to grow storage, the current shape has been dropped
    OutOfMemory {
        /// Which storage failed to grow
        what: &'static str,
        /// Number of elements requested
        requested: usize,
    },
    /// Coordinate (24.8 fixed point) does not fit into the packed cell coordinate
    CoordinateOutOfRange { x: i32, y: i32 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfMemory { what, requested } => {
                write!(f, "out of memory: {} ({} elements)", what, requested)
            }
            Error::CoordinateOutOfRange { x, y } => write!(
                f,
                "coordinate out of range: {},{} (fixed point {},{})",
                *x as f32 / 256.0,
                *y as f32 / 256.0,
                x,
                y
            ),
        }
    }
}

impl std::error::Error for Error {}

impl From<Error> for std::io::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::OutOfMemory { .. } => Self::new(std::io::ErrorKind::OutOfMemory, error),
            Error::CoordinateOutOfRange { .. } => {
                Self::new(std::io::ErrorKind::InvalidInput, error)
            }
        }
    }
}
