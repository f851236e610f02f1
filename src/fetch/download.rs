//! Media download into temporary files

use super::source::{
    confirm_token_from_html, drive_download_url_at, drive_file_id, DRIVE_DOWNLOAD_ENDPOINT,
};
use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Download settings
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Whole-request timeout
    pub timeout: Duration,

    pub user_agent: String,

    /// Downloads larger than this are aborted
    pub max_bytes: u64,

    /// Where Drive share links are downloaded from
    pub drive_endpoint: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            user_agent: format!("accent-analyzer/{}", env!("CARGO_PKG_VERSION")),
            max_bytes: 512 * 1024 * 1024,
            drive_endpoint: DRIVE_DOWNLOAD_ENDPOINT.to_string(),
        }
    }
}

impl FetchConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_drive_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.drive_endpoint = endpoint.into();
        self
    }
}

/// A downloaded media file; deleted when dropped
#[derive(Debug)]
pub struct DownloadedMedia {
    file: NamedTempFile,
    pub bytes: u64,
    pub content_type: Option<String>,
}

impl DownloadedMedia {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Downloads remote media with blocking HTTP
///
/// A fresh cookie-aware client is built per download, so Google Drive's
/// confirmation cookie stays scoped to one request.
#[derive(Debug, Clone, Default)]
pub struct MediaFetcher {
    config: FetchConfig,
}

impl MediaFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Download `url` into a temp file with a `.mp4` suffix
    pub fn fetch(&self, url: &Url) -> Result<DownloadedMedia> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;

        log::info!("Downloading media from {}", url);

        let response = match drive_file_id(url) {
            Some(file_id) => self.fetch_drive(&client, &file_id)?,
            None => get(&client, url)?,
        };

        let response = response
            .error_for_status()
            .with_context(|| format!("Server rejected download of {}", url))?;

        let content_type = content_type(&response);
        if content_type.as_deref().is_some_and(is_html) {
            anyhow::bail!(
                "Got HTML instead of a video file. Check that the URL is a direct download link."
            );
        }

        if let Some(len) = response.content_length() {
            if len > self.config.max_bytes {
                anyhow::bail!(
                    "Media is {} bytes, over the {} byte limit",
                    len,
                    self.config.max_bytes
                );
            }
        }

        let mut file = tempfile::Builder::new()
            .prefix("accent-media-")
            .suffix(".mp4")
            .tempfile()
            .context("Failed to create temp file for download")?;

        let mut limited = response.take(self.config.max_bytes + 1);
        let bytes = std::io::copy(&mut limited, file.as_file_mut())
            .with_context(|| format!("Failed while downloading {}", url))?;

        if bytes > self.config.max_bytes {
            anyhow::bail!("Media exceeds the {} byte limit", self.config.max_bytes);
        }
        if bytes == 0 {
            anyhow::bail!("Download of {} returned no data", url);
        }

        log::debug!("Downloaded {} bytes to {:?}", bytes, file.path());

        Ok(DownloadedMedia {
            file,
            bytes,
            content_type,
        })
    }

    /// Drive serves a warning page for large files; retry once with its token
    fn fetch_drive(&self, client: &Client, file_id: &str) -> Result<Response> {
        let endpoint = &self.config.drive_endpoint;
        let url = drive_download_url_at(endpoint, file_id, None)?;
        let response = get(client, &url)?;

        if !content_type(&response).as_deref().is_some_and(is_html) {
            return Ok(response);
        }

        let cookie_token = response
            .cookies()
            .find(|c| c.name().starts_with("download_warning"))
            .map(|c| c.value().to_string());

        let token = match cookie_token {
            Some(token) => Some(token),
            None => {
                let body = response
                    .text()
                    .context("Failed to read Google Drive response")?;
                confirm_token_from_html(&body)
            }
        };

        match token {
            Some(token) => {
                log::debug!("Google Drive asked for confirmation; retrying with token");
                let confirmed = drive_download_url_at(endpoint, file_id, Some(&token))?;
                get(client, &confirmed)
            }
            None => anyhow::bail!(
                "Google Drive returned a web page for file {}. Is the file shared publicly?",
                file_id
            ),
        }
    }
}

fn get(client: &Client, url: &Url) -> Result<Response> {
    client
        .get(url.clone())
        .send()
        .with_context(|| format!("Request to {} failed", url))
}

fn content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase())
}

fn is_html(content_type: &str) -> bool {
    content_type.contains("text/html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_detection() {
        assert!(is_html("text/html; charset=utf-8"));
        assert!(!is_html("video/mp4"));
    }

    #[test]
    fn test_default_limits() {
        let config = FetchConfig::default().with_max_bytes(10);
        assert_eq!(config.max_bytes, 10);
        assert!(config.user_agent.starts_with("accent-analyzer/"));
        assert_eq!(config.drive_endpoint, DRIVE_DOWNLOAD_ENDPOINT);
    }
}
