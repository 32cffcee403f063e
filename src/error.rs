//! The one error type every fallible operation in this crate returns.
//!
//! The engine reports all failures the same way: an [`Error`] carrying the
//! diagnostic text recorded for the failing call — decode trouble, encode
//! trouble, I/O, validation, capability refusals. Callers that care about
//! the cause read the message; the crate itself never branches on it.

use thiserror::Error;

/// Diagnostic from a failed engine call.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    message: String,
}

impl Error {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The diagnostic text recorded for the failing call.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(format!("IO error: {e}"))
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Self::new(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_diagnostic() {
        let e = Error::new("decode failed: bad marker");
        assert_eq!(e.to_string(), "decode failed: bad marker");
        assert_eq!(e.message(), "decode failed: bad marker");
    }

    #[test]
    fn io_errors_keep_their_context() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let e = Error::from(io);
        assert!(e.to_string().starts_with("IO error:"));
        assert!(e.to_string().contains("denied"));
    }
}
