//! Streaming types for mediafire-dl
//!
//! Body streams, destinations and the options that drive a transfer.

use std::fmt;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::TryStreamExt;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::core::progress::TransferProgress;

/// Size of each read from the response body
pub const CHUNK_SIZE: usize = 512 * 1024;

/// A response body exposed as `AsyncRead`
pub enum DownloadStream {
    /// HTTP stream using reqwest
    Http(Box<dyn AsyncRead + Send + Unpin>),
}

impl AsyncRead for DownloadStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match &mut *self {
            DownloadStream::Http(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

/// Creates a DownloadStream from an HTTP response
pub fn create_http_stream(response: reqwest::Response) -> DownloadStream {
    let stream = Box::new(tokio_util::io::StreamReader::new(
        response.bytes_stream().map_err(|e| {
            let kind = if e.is_timeout() {
                std::io::ErrorKind::TimedOut
            } else {
                std::io::ErrorKind::Other
            };
            std::io::Error::new(kind, e)
        }),
    ));
    DownloadStream::Http(stream)
}

/// Writable handle accepted as a download destination
pub type SinkHandle = Box<dyn AsyncWrite + Send + Unpin>;

/// Where a download ends up
pub enum Destination {
    /// File path, or a directory to place the derived filename in.
    /// Written through a temporary sibling and renamed on success.
    Path(PathBuf),
    /// Caller-owned writer, written directly
    Sink(SinkHandle),
}

impl Destination {
    /// Standard output as a sink
    pub fn stdout() -> Self {
        Destination::Sink(Box::new(tokio::io::stdout()))
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Destination::Sink(_) => f.write_str("Sink(..)"),
        }
    }
}

impl From<PathBuf> for Destination {
    fn from(path: PathBuf) -> Self {
        Destination::Path(path)
    }
}

impl From<&str> for Destination {
    fn from(path: &str) -> Self {
        Destination::Path(PathBuf::from(path))
    }
}

/// What a successful download produced
pub enum Downloaded {
    /// Final location of the renamed file
    File(PathBuf),
    /// The sink that was written to, flushed
    Sink(SinkHandle),
}

impl Downloaded {
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Downloaded::File(path) => Some(path),
            Downloaded::Sink(_) => None,
        }
    }
}

impl fmt::Debug for Downloaded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Downloaded::File(path) => f.debug_tuple("File").field(path).finish(),
            Downloaded::Sink(_) => f.write_str("Sink(..)"),
        }
    }
}

/// Progress callback function type
pub type ProgressCallback = Arc<dyn Fn(&TransferProgress) + Send + Sync>;

/// Options for download operations
#[derive(Clone)]
pub struct DownloadOptions {
    /// Optional progress callback, invoked after every chunk
    pub progress: Option<ProgressCallback>,

    /// Bytes read from the body per chunk
    pub chunk_size: usize,

    /// Suppress announcements and progress reporting
    pub quiet: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            progress: None,
            chunk_size: CHUNK_SIZE,
            quiet: false,
        }
    }
}

impl fmt::Debug for DownloadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadOptions")
            .field("progress", &self.progress.is_some())
            .field("chunk_size", &self.chunk_size)
            .field("quiet", &self.quiet)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = DownloadOptions::default();
        assert_eq!(options.chunk_size, 512 * 1024);
        assert!(!options.quiet);
        assert!(options.progress.is_none());
    }

    #[test]
    fn test_destination_from_str() {
        match Destination::from("out/file.zip") {
            Destination::Path(path) => assert_eq!(path, PathBuf::from("out/file.zip")),
            Destination::Sink(_) => panic!("Expected path destination"),
        }
    }

    #[test]
    fn test_destination_debug_hides_sink() {
        let sink = Destination::Sink(Box::new(tokio::io::sink()));
        assert_eq!(format!("{sink:?}"), "Sink(..)");
    }
}
