//! # mediafire-dl CLI
//!
//! Command-line interface for the mediafire-dl library.
//! Downloads one or more MediaFire shared files, one after another.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::{debug, error};
use mediafire_dl::{Destination, DownloadOptions, Downloaded, Downloader, Error, Resolver, ResolverConfig};

mod cli;

/// Exit status after Ctrl-C
const EXIT_INTERRUPTED: u8 = 130;

/// Command-line interface for mediafire-dl
#[derive(Parser)]
#[command(name = "mediafire-dl")]
#[command(about = "Simple command-line tool to download files from MediaFire")]
#[command(long_about = "Downloads files shared on MediaFire:
  mediafire-dl https://www.mediafire.com/file/abc123/file.zip/file
  mediafire-dl URL1 URL2 -o downloads/     # Several files into a directory
  mediafire-dl URL -o archive.zip          # Custom filename
  mediafire-dl URL -o - > archive.zip      # Stream to stdout

Files are written to a temporary sibling and renamed into place only when
the transfer completes. The exit status is non-zero if any URL failed.")]
#[command(version = env!("MFDL_VERSION"))]
struct Cli {
    /// MediaFire share URLs, downloaded in order
    #[arg(required = true)]
    urls: Vec<String>,

    /// Output file, existing directory, or "-" for stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Don't print source, destination or progress
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Connect and read timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Confirmation pages to follow before giving up
    #[arg(long, default_value_t = 5)]
    max_redirects: usize,

    /// Retries for network errors before the transfer starts
    #[arg(long, default_value_t = 3)]
    retries: u32,
}

/// Output destination types
#[derive(Debug, PartialEq)]
enum OutputDestination {
    /// Server-provided filename in the working directory
    Auto,
    Directory(String),
    File(String),
    Stdout,
}

impl OutputDestination {
    fn destination(&self) -> Option<Destination> {
        match self {
            OutputDestination::Auto => None,
            OutputDestination::Directory(dir) => Some(Destination::from(dir.as_str())),
            OutputDestination::File(path) => Some(Destination::from(path.as_str())),
            OutputDestination::Stdout => Some(Destination::stdout()),
        }
    }
}

/// Resolve output destination from CLI arguments
fn resolve_output(output: Option<&str>, url_count: usize) -> mediafire_dl::Result<OutputDestination> {
    match output {
        None | Some("") => Ok(OutputDestination::Auto),
        Some("-") => Ok(OutputDestination::Stdout),
        Some(dir) if Path::new(dir).is_dir() || dir.ends_with(['/', std::path::MAIN_SEPARATOR]) => {
            Ok(OutputDestination::Directory(dir.to_string()))
        }
        Some(file) if url_count > 1 => Err(Error::InvalidInput(format!(
            "--output {file} names a single file but {url_count} URLs were given; pass a directory instead"
        ))),
        Some(file) => Ok(OutputDestination::File(file.to_string())),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            error!("❌ Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let default_filter = if cli.verbose { "mediafire_dl=debug,warn" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    debug!("mediafire-dl v{} starting", env!("MFDL_VERSION"));

    let output = resolve_output(cli.output.as_deref(), cli.urls.len())?;

    let config = ResolverConfig {
        max_redirects: cli.max_redirects,
        timeout: Duration::from_secs(cli.timeout),
        connect_timeout: Duration::from_secs(cli.timeout.min(10)),
        retries: cli.retries,
        ..Default::default()
    };
    let resolver = Resolver::with_config(config).context("Failed to set up the HTTP session")?;
    let downloader = Downloader::with_resolver(resolver);

    let mut failed = 0usize;
    for url in &cli.urls {
        let progress = (!cli.quiet).then(cli::ProgressManager::new);
        let options = DownloadOptions {
            quiet: cli.quiet,
            progress: progress.as_ref().map(|p| p.callback()),
            ..Default::default()
        };

        let outcome = tokio::select! {
            result = downloader.download(url, output.destination(), &options) => result,
            _ = tokio::signal::ctrl_c() => {
                if let Some(ref progress) = progress {
                    progress.abandon();
                }
                eprintln!("⚠️  Interrupted, partial download removed");
                return Ok(ExitCode::from(EXIT_INTERRUPTED));
            }
        };

        match outcome {
            Ok(Downloaded::File(path)) => {
                if let Some(ref progress) = progress {
                    progress.finish(format!("✅ Saved {}", path.display()));
                }
            }
            Ok(Downloaded::Sink(_)) => {
                if let Some(ref progress) = progress {
                    progress.finish("✅ Download completed!".to_string());
                }
            }
            Err(e) => {
                failed += 1;
                if let Some(ref progress) = progress {
                    progress.abandon();
                }
                error!("❌ {url}: {e}");
            }
        }
    }

    if failed > 0 {
        debug!("{failed} of {} downloads failed", cli.urls.len());
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_output_auto() {
        assert_eq!(resolve_output(None, 3).unwrap(), OutputDestination::Auto);
        assert_eq!(resolve_output(Some(""), 1).unwrap(), OutputDestination::Auto);
    }

    #[test]
    fn test_resolve_output_stdout() {
        assert_eq!(resolve_output(Some("-"), 1).unwrap(), OutputDestination::Stdout);
    }

    #[test]
    fn test_resolve_output_custom_file() {
        assert_eq!(
            resolve_output(Some("my-archive.zip"), 1).unwrap(),
            OutputDestination::File("my-archive.zip".to_string())
        );
    }

    #[test]
    fn test_resolve_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dir_str = dir.path().to_str().unwrap();
        assert_eq!(
            resolve_output(Some(dir_str), 2).unwrap(),
            OutputDestination::Directory(dir_str.to_string())
        );
        assert_eq!(
            resolve_output(Some("not-yet-created/"), 2).unwrap(),
            OutputDestination::Directory("not-yet-created/".to_string())
        );
    }

    #[test]
    fn test_resolve_output_file_with_many_urls() {
        let err = resolve_output(Some("one-file.zip"), 2).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "mediafire-dl",
            "-q",
            "--output",
            "out/",
            "--max-redirects",
            "2",
            "https://www.mediafire.com/file/a/x.zip/file",
            "https://www.mediafire.com/file/b/y.zip/file",
        ])
        .unwrap();

        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.urls.len(), 2);
        assert_eq!(cli.output.as_deref(), Some("out/"));
        assert_eq!(cli.max_redirects, 2);
        assert_eq!(cli.timeout, 30);
        assert_eq!(cli.retries, 3);
    }

    #[test]
    fn test_cli_requires_a_url() {
        assert!(Cli::try_parse_from(["mediafire-dl"]).is_err());
    }
}
