use std::path::PathBuf;

/// Boxed error produced by a user-supplied transform.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All errors that can occur within labelset.
///
/// Every failing operation surfaces one of these synchronously to its caller.
/// Nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The label table is malformed: a bad row, invalid UTF-8, broken quoting.
    #[error("label table parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Index outside `[0, len)`.
    #[error("index {index} out of bounds for dataset of length {len}")]
    OutOfBounds { index: i64, len: usize },

    /// A sample file referenced by the label table does not exist.
    #[error("sample file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but is not a decodable image.
    #[error("failed to decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure raised inside a user-supplied transform.
    #[error("transform failed: {0}")]
    Transform(#[source] BoxError),

    /// One-hot encoding of a label that is not a valid class index.
    #[error("label {label} out of range for {num_classes} classes")]
    ClassOutOfRange { label: usize, num_classes: usize },

    /// Per-channel statistics do not match the tensor's channel count.
    #[error("channel mismatch: expected {expected} channels, got {got}")]
    ChannelMismatch { expected: usize, got: usize },

    /// Invalid configuration file or value.
    #[error("config error: {0}")]
    Config(String),

    /// Generic message for cases not covered above.
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an error from any string message.
    pub fn msg(s: impl Into<String>) -> Self {
        Error::Msg(s.into())
    }

    /// Wrap an arbitrary error raised by a transform.
    pub fn transform<E>(e: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Transform(e.into())
    }

    /// Whether this is an [`Error::OutOfBounds`].
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Error::OutOfBounds { .. })
    }

    /// Whether this is an [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Convenience Result type used throughout labelset.
pub type Result<T> = std::result::Result<T, Error>;

/// Macro for early return with a formatted error message.
/// Usage: `bail!("something went wrong: {}", detail)`
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::Msg(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_keeps_source() {
        let err = Error::transform("bad pixel");
        assert_eq!(err.to_string(), "transform failed: bad pixel");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn predicates() {
        let oob = Error::OutOfBounds { index: -1, len: 3 };
        assert!(oob.is_out_of_bounds());
        assert!(!oob.is_not_found());
        assert!(Error::NotFound(PathBuf::from("x.png")).is_not_found());
    }

    #[test]
    fn bail_returns_msg() {
        fn fails() -> Result<()> {
            crate::bail!("broken {}", 7);
        }
        match fails() {
            Err(Error::Msg(m)) => assert_eq!(m, "broken 7"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
