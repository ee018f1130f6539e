//! Core download functionality for mediafire-dl
//!
//! Streams a resolved response into a destination in fixed-size chunks.
//! File destinations are written through a temporary sibling that only
//! replaces the target once every byte has arrived.

use std::path::{Path, PathBuf};
use std::time::Instant;

use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::core::error::{Error, Result};
use crate::core::progress::TransferProgress;
use crate::core::resolver::{Resolved, Resolver};
use crate::core::stream::{Destination, DownloadOptions, Downloaded};

/// High-level downloader: resolve, then stream
#[derive(Debug, Clone)]
pub struct Downloader {
    resolver: Resolver,
}

impl Downloader {
    /// Create a new downloader with default configuration
    pub fn new() -> Result<Self> {
        Ok(Self {
            resolver: Resolver::new()?,
        })
    }

    /// Create a downloader around an existing resolver (and its session)
    pub fn with_resolver(resolver: Resolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Resolve a share URL and download the file it points to
    pub async fn download(
        &self,
        url: &str,
        destination: Option<Destination>,
        options: &DownloadOptions,
    ) -> Result<Downloaded> {
        let resolved = self.resolver.resolve(url).await?;
        self.save(resolved, destination, options).await
    }

    /// Stream an already resolved response into `destination`
    pub async fn save(
        &self,
        resolved: Resolved,
        destination: Option<Destination>,
        options: &DownloadOptions,
    ) -> Result<Downloaded> {
        let total = resolved.content_length();
        let origin = resolved.origin.clone();

        match destination {
            Some(Destination::Sink(mut sink)) => {
                announce(options, &origin, "<stream>");
                let mut stream = resolved.into_stream();
                stream_to_writer(&mut stream, &mut sink, total, options).await?;
                Ok(Downloaded::Sink(sink))
            }
            Some(Destination::Path(path)) => {
                let target = target_path(Some(&path), resolved.filename(), &origin)?;
                self.save_to_path(resolved, &target, total, options).await
            }
            None => {
                let target = target_path(None, resolved.filename(), &origin)?;
                self.save_to_path(resolved, &target, total, options).await
            }
        }
    }

    async fn save_to_path(
        &self,
        resolved: Resolved,
        target: &Path,
        total: Option<u64>,
        options: &DownloadOptions,
    ) -> Result<Downloaded> {
        let shown = std::path::absolute(target).unwrap_or_else(|_| target.to_path_buf());
        announce(options, &resolved.origin, &shown.display().to_string());

        let stream = resolved.into_stream();
        let path = stream_to_path(stream, target, total, options).await?;
        Ok(Downloaded::File(path))
    }
}

/// Print the source/destination header unless quiet
fn announce(options: &DownloadOptions, origin: &str, to: &str) {
    if options.quiet {
        return;
    }
    eprintln!("Downloading...");
    eprintln!("From: {origin}");
    eprintln!("To: {to}");
}

/// Picks the file to write.
///
/// No destination means the server-provided name in the working directory;
/// an existing directory, or a path ending in a separator, gets the
/// server-provided name appended.
pub fn target_path(destination: Option<&Path>, filename: Option<String>, origin: &str) -> Result<PathBuf> {
    let named = |dir: Option<&Path>| -> Result<PathBuf> {
        let name = filename.clone().ok_or_else(|| {
            Error::InvalidInput(format!(
                "Could not determine a filename for {origin}, pass --output"
            ))
        })?;
        Ok(match dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        })
    };

    match destination {
        None => named(None),
        Some(dir) if dir.is_dir() || names_directory(dir) => named(Some(dir)),
        Some(path) => Ok(path.to_path_buf()),
    }
}

fn names_directory(path: &Path) -> bool {
    path.to_string_lossy().ends_with(['/', std::path::MAIN_SEPARATOR])
}

/// Stream `reader` into `path` through a temporary sibling file.
///
/// The target is replaced atomically on success. On any failure, or if the
/// future is dropped, the temporary file is removed and the target keeps its
/// previous state.
pub async fn stream_to_path<R>(
    mut reader: R,
    path: &Path,
    total: Option<u64>,
    options: &DownloadOptions,
) -> Result<PathBuf>
where
    R: AsyncRead + Unpin,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&dir).await?;

    let prefix = match path.file_name() {
        Some(name) => format!(".{}.", name.to_string_lossy()),
        None => ".mediafire-dl.".to_string(),
    };
    let temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".part")
        .tempfile_in(&dir)?;
    debug!("writing {} via {}", path.display(), temp.path().display());

    let mut file = tokio::fs::File::from_std(temp.as_file().try_clone()?);
    stream_to_writer(&mut reader, &mut file, total, options).await?;
    file.sync_all().await?;
    drop(file);

    temp.persist(path).map_err(|e| Error::TransferIo(e.error))?;
    debug!("renamed into {}", path.display());
    Ok(path.to_path_buf())
}

/// Copy `reader` into `writer` chunk by chunk, reporting progress.
///
/// Returns the number of bytes written. A body shorter than `total` is an
/// error.
pub async fn stream_to_writer<R, W>(
    reader: &mut R,
    writer: &mut W,
    total: Option<u64>,
    options: &DownloadOptions,
) -> Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buffer = vec![0u8; options.chunk_size.max(1)];
    let mut transferred = 0u64;
    let start = Instant::now();

    loop {
        let filled = read_chunk(reader, &mut buffer).await?;
        if filled == 0 {
            break;
        }

        writer.write_all(&buffer[..filled]).await?;
        transferred += filled as u64;

        if !options.quiet {
            if let Some(ref progress) = options.progress {
                progress(&TransferProgress::new(transferred, total, start.elapsed()));
            }
        }
    }

    writer.flush().await?;

    if let Some(expected) = total {
        if transferred < expected {
            return Err(Error::TransferIo(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("body ended after {transferred} of {expected} bytes"),
            )));
        }
    }

    Ok(transferred)
}

/// Fill `buffer` unless the body ends first; returns bytes read
async fn read_chunk<R>(reader: &mut R, buffer: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;
    while filled < buffer.len() {
        let n = reader.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
