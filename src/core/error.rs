//! Error types for mediafire-dl
//!
//! Every failure that can happen while resolving a share link or streaming a
//! file ends up as one of the variants below. The CLI reports them per URL and
//! moves on to the next one.

use std::fmt;

/// Main error type for mediafire-dl operations
#[derive(Debug)]
pub enum Error {
    /// The share page had no direct download link (file not public, or the
    /// page layout changed)
    LinkResolution { url: String },

    /// Too many confirmation pages were chained together
    RedirectLoop { url: String, hops: usize },

    /// Read or write failure while the body was streaming
    TransferIo(std::io::Error),

    /// Network read or connect timed out
    Timeout(String),

    /// Network connectivity issues
    Network(String),

    /// HTTP-specific error
    Http(String),

    /// Invalid configuration or parameters
    InvalidInput(String),
}

impl Error {
    /// Whether a fresh attempt at the same request could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Timeout(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LinkResolution { url } => {
                write!(
                    f,
                    "Permission denied: {}. Maybe you need to change permission over 'Anyone with the link'?",
                    url
                )
            }
            Error::RedirectLoop { url, hops } => {
                write!(f, "Gave up on {} after {} confirmation pages", url, hops)
            }
            Error::TransferIo(err) => {
                write!(f, "Transfer failed: {}", err)
            }
            Error::Timeout(msg) => {
                write!(f, "Timed out: {}", msg)
            }
            Error::Network(msg) => {
                write!(f, "Network error: {}", msg)
            }
            Error::Http(msg) => {
                write!(f, "HTTP error: {}", msg)
            }
            Error::InvalidInput(msg) => {
                write!(f, "Invalid input: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::TransferIo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => Error::Timeout(err.to_string()),
            _ => Error::TransferIo(err),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err.to_string())
        } else if err.is_connect() {
            Error::Network(err.to_string())
        } else {
            Error::Http(err.to_string())
        }
    }
}

/// Convenience result type for mediafire-dl operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_resolution_message_mentions_permission() {
        let err = Error::LinkResolution {
            url: "https://www.mediafire.com/file/abc/x.zip/file".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Permission denied: https://www.mediafire.com/file/abc/x.zip/file"));
        assert!(msg.contains("Anyone with the link"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(Error::Network("reset".to_string()).is_transient());
        assert!(Error::Timeout("read".to_string()).is_transient());
        assert!(!Error::Http("404".to_string()).is_transient());
        assert!(!Error::LinkResolution { url: String::new() }.is_transient());
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error as _;

        let err = Error::from(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"));
        assert!(matches!(err, Error::TransferIo(_)));
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Transfer failed: pipe closed");
    }

    #[test]
    fn test_io_timeout_becomes_timeout() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::TimedOut, "no data for 30s"));
        assert!(matches!(err, Error::Timeout(ref msg) if msg == "no data for 30s"));
    }
}
