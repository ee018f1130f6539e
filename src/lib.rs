//! # mediafire-dl Library
//!
//! Downloads files shared on MediaFire. A share URL normally answers with an
//! HTML confirmation page; the library follows the embedded direct link and
//! streams the file to disk, replacing the destination only once the whole
//! body has arrived.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Save under the name the server announces
//!     mediafire_dl::get("https://www.mediafire.com/file/abc123/file.zip/file", None).await?;
//!
//!     // Save to a specific file
//!     mediafire_dl::get("https://www.mediafire.com/file/abc123/file.zip/file", Some("./archive.zip")).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Progress Tracking
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     mediafire_dl::get_with_progress(
//!         "https://www.mediafire.com/file/abc123/file.zip/file",
//!         None,
//!         |progress| eprintln!("{progress}"),
//!     ).await?;
//!
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

pub use crate::core::error::{Error, Result};
pub use crate::core::format::{format_duration, format_millis, human_bytes, human_rate, scale_bytes};
pub use crate::core::progress::TransferProgress;
pub use crate::core::resolver::{extract_download_link, filename_from_disposition, Resolved};
pub use crate::core::stream::{
    Destination, DownloadOptions, DownloadStream, Downloaded, ProgressCallback, SinkHandle, CHUNK_SIZE,
};

/// Advanced API: build a downloader or resolver with custom configuration
///
/// # Examples
/// ```rust,no_run
/// use mediafire_dl::{Downloader, Resolver, ResolverConfig, DownloadOptions};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ResolverConfig {
///     max_redirects: 2,
///     retries: 0,
///     ..Default::default()
/// };
///
/// let downloader = Downloader::with_resolver(Resolver::with_config(config)?);
/// for url in ["https://www.mediafire.com/file/a/x.zip/file", "https://www.mediafire.com/file/b/y.zip/file"] {
///     downloader.download(url, None, &DownloadOptions::default()).await?;
/// }
/// # Ok(())
/// # }
/// ```
pub use crate::core::{Downloader, Resolver, ResolverConfig};

// Internal modules
mod core;

/// Download a shared file
///
/// # Arguments
/// * `url` - MediaFire share URL or direct link
/// * `dest` - Optional destination path or directory. If None, the server-provided filename is used
///
/// Returns the path of the written file.
pub async fn get(url: &str, dest: Option<&str>) -> Result<PathBuf> {
    let options = DownloadOptions {
        quiet: true,
        ..Default::default()
    };
    get_with_options(url, dest, options).await
}

/// Download with progress tracking
///
/// The callback receives a [`TransferProgress`] after every chunk.
pub async fn get_with_progress<F>(url: &str, dest: Option<&str>, progress: F) -> Result<PathBuf>
where
    F: Fn(&TransferProgress) + Send + Sync + 'static,
{
    let options = DownloadOptions {
        progress: Some(Arc::new(progress)),
        ..Default::default()
    };
    get_with_options(url, dest, options).await
}

/// Download with custom options
///
/// # Examples
/// ```rust,no_run
/// use mediafire_dl::DownloadOptions;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = DownloadOptions {
///     chunk_size: 64 * 1024,
///     quiet: true,
///     ..Default::default()
/// };
///
/// mediafire_dl::get_with_options("https://www.mediafire.com/file/abc123/file.zip/file", Some("downloads/"), options).await?;
/// # Ok(())
/// # }
/// ```
pub async fn get_with_options(url: &str, dest: Option<&str>, options: DownloadOptions) -> Result<PathBuf> {
    let downloader = Downloader::new()?;
    let destination = dest.map(Destination::from);

    match downloader.download(url, destination, &options).await? {
        Downloaded::File(path) => Ok(path),
        Downloaded::Sink(_) => Err(Error::InvalidInput("expected a file destination".to_string())),
    }
}

/// Download straight into a writer (stdout, a socket, an in-memory buffer...)
pub async fn get_to_writer(url: &str, writer: SinkHandle, options: DownloadOptions) -> Result<SinkHandle> {
    let downloader = Downloader::new()?;

    match downloader.download(url, Some(Destination::Sink(writer)), &options).await? {
        Downloaded::Sink(sink) => Ok(sink),
        Downloaded::File(path) => Err(Error::InvalidInput(format!(
            "expected a sink destination, wrote {}",
            path.display()
        ))),
    }
}
