//! Share-link resolution for mediafire-dl
//!
//! MediaFire share URLs usually answer with an HTML confirmation page rather
//! than the file. The page embeds the real link (on a `download*` host), which
//! is followed until a response carries `Content-Disposition`.

use std::time::Duration;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_LENGTH};
use reqwest::{Client, ClientBuilder};

use crate::core::error::{Error, Result};
use crate::core::stream::{create_http_stream, DownloadStream};

/// Direct links always live on a `download*` host
static DOWNLOAD_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"href="((http|https)://download[^"]+)"#).expect("download link regex is valid")
});

/// Configuration for the resolving session
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Confirmation pages followed before giving up
    pub max_redirects: usize,

    /// Per-read timeout; also bounds waiting for response headers
    pub timeout: Duration,

    /// TCP connect timeout
    pub connect_timeout: Duration,

    /// Extra attempts for a request that failed at the network level
    pub retries: u32,

    /// Base delay for exponential backoff between attempts
    pub retry_delay: Duration,

    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_redirects: 5,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            retries: 3,
            retry_delay: Duration::from_millis(1000),
            user_agent: format!("mediafire-dl/{}", env!("MFDL_VERSION")),
        }
    }
}

/// Execute an operation with retry logic for network errors
pub(crate) async fn retry_on_network_error<F, Fut, T>(
    retries: u32,
    base_delay: Duration,
    operation: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_transient() && attempt < retries => {
                attempt += 1;
                let delay = base_delay * (1 << (attempt - 1));
                warn!("{e} (attempt {attempt}), retrying in {delay:?}");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Finds the first direct download link in a confirmation page
pub fn extract_download_link(contents: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        DOWNLOAD_LINK
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// Extracts the filename from a `Content-Disposition` value.
///
/// Handles `filename*=UTF-8''name%20x.zip`, `filename="name.zip"` and
/// unquoted `filename=name.zip`. Directory components are stripped.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    if let Some(pos) = header.find("filename*=") {
        let value = header[pos + 10..].trim();
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            if let Ok(decoded) = urlencoding::decode(encoded[..end].trim()) {
                if let Some(name) = last_component(&decoded) {
                    return Some(name);
                }
            }
        }
    }

    let pos = header.find("filename=")?;
    let value = header[pos + 9..].trim();

    let raw = match value.strip_prefix('"') {
        Some(stripped) => &stripped[..stripped.find('"')?],
        None => value[..value.find(';').unwrap_or(value.len())].trim(),
    };
    last_component(raw)
}

/// Keeps only the final path component; rejects empty and dot names
fn last_component(name: &str) -> Option<String> {
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    match name {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

/// A response that is known to carry the file itself
#[derive(Debug)]
pub struct Resolved {
    /// URL the user asked for
    pub origin: String,
    /// Confirmation pages followed to get here
    pub hops: usize,
    pub response: reqwest::Response,
}

/// Header value as text: UTF-8 when valid, otherwise each byte as latin-1
fn header_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

impl Resolved {
    /// Final URL after confirmation pages and HTTP redirects
    pub fn url(&self) -> &reqwest::Url {
        self.response.url()
    }

    /// Body size announced by the server
    pub fn content_length(&self) -> Option<u64> {
        self.response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
    }

    /// Filename from `Content-Disposition`, falling back to the URL path
    pub fn filename(&self) -> Option<String> {
        let from_header = self
            .response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| filename_from_disposition(&header_text(v.as_bytes())));

        from_header.or_else(|| {
            self.url()
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .and_then(|segment| urlencoding::decode(segment).ok())
                .and_then(|segment| last_component(&segment))
        })
    }

    /// Consumes the response into a readable body
    pub fn into_stream(self) -> DownloadStream {
        create_http_stream(self.response)
    }
}

/// Follows share links to the file, reusing one HTTP session
#[derive(Debug, Clone)]
pub struct Resolver {
    client: Client,
    config: ResolverConfig,
}

impl Resolver {
    /// Create a resolver with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ResolverConfig::default())
    }

    /// Create a resolver with custom configuration
    pub fn with_config(config: ResolverConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .tcp_keepalive(Duration::from_secs(60))
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::InvalidInput(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Use a prepared client; timeouts and user agent in `config` are not applied
    pub fn with_client(client: Client, config: ResolverConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves a share URL to the response carrying the file
    pub async fn resolve(&self, url: &str) -> Result<Resolved> {
        let mut current = url.to_string();
        let mut hops = 0;

        loop {
            debug!("GET {current}");
            let response = self.get(&current).await?;

            if response.headers().contains_key(CONTENT_DISPOSITION) {
                debug!("{current} is the file ({hops} confirmation pages)");
                return Ok(Resolved {
                    origin: url.to_string(),
                    hops,
                    response,
                });
            }

            // Confirmation page, look for the real link whatever the status
            debug!("{current} answered {} without a file", response.status());
            let page = response.text().await?;
            let next = extract_download_link(&page).ok_or_else(|| Error::LinkResolution {
                url: url.to_string(),
            })?;

            hops += 1;
            if hops > self.config.max_redirects {
                return Err(Error::RedirectLoop {
                    url: url.to_string(),
                    hops: self.config.max_redirects,
                });
            }
            debug!("confirmation page {hops} points to {next}");
            current = next;
        }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let client = &self.client;
        retry_on_network_error(self.config.retries, self.config.retry_delay, || {
            let request = client.get(url);
            async move { Ok(request.send().await?) }
        })
        .await
    }
}
