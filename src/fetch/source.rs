//! Media source parsing and video-URL rules

use anyhow::{Context, Result};
use reqwest::Url;
use std::fmt;
use std::path::PathBuf;

/// Hosts accepted as video sources even without a file extension
const VIDEO_DOMAINS: &[&str] = &[
    "loom.com",
    "youtube.com",
    "vimeo.com",
    "dropbox.com",
    "drive.google.com",
    "googleapis.com",
];

/// Path suffixes accepted as direct video links
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".avi", ".mov", ".wmv", ".flv", ".webm"];

/// Where the media to analyze comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// http(s) URL, downloaded to a temp file
    Remote(Url),
    /// Local file, read in place
    Local(PathBuf),
}

impl MediaSource {
    /// Parse a URL, `file://` URI or local path (`~` is expanded)
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            anyhow::bail!("Empty media source");
        }

        if let Some(path) = input.strip_prefix("file://") {
            let decoded = urlencoding::decode(path)
                .with_context(|| format!("Invalid file URI: {}", input))?;
            return Ok(MediaSource::Local(PathBuf::from(decoded.into_owned())));
        }

        let lower = input.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(input).with_context(|| format!("Invalid URL: {}", input))?;
            return Ok(MediaSource::Remote(url));
        }

        let expanded = shellexpand::tilde(input);
        Ok(MediaSource::Local(PathBuf::from(expanded.as_ref())))
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::Remote(url) => write!(f, "{}", url),
            MediaSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Whether a URL looks like a downloadable video
///
/// Requires a scheme and host, plus either a known video host or a video
/// file extension.
pub fn is_valid_video_url(url: &str) -> bool {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return false,
    };
    let host = match parsed.host_str() {
        Some(h) if !h.is_empty() => h.to_ascii_lowercase(),
        _ => return false,
    };

    let domain_match = VIDEO_DOMAINS.iter().any(|d| host.contains(d));
    let lower = url.to_ascii_lowercase();
    let extension_match = VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext));

    domain_match || extension_match
}

/// File id of a Google Drive share link
///
/// Handles `/file/d/<id>/...` links and `?id=<id>` download links.
pub fn drive_file_id(url: &Url) -> Option<String> {
    if !url.host_str()?.contains("drive.google.com") {
        return None;
    }

    if let Some(rest) = url.path().split("/file/d/").nth(1) {
        let id = rest.split('/').next().unwrap_or_default();
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }

    url.query_pairs()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.into_owned())
        .filter(|id| !id.is_empty())
}

/// Google Drive's direct-download endpoint
pub const DRIVE_DOWNLOAD_ENDPOINT: &str = "https://drive.google.com/uc";

/// Direct-download URL for a Drive file
pub fn drive_download_url(file_id: &str, confirm: Option<&str>) -> Result<Url> {
    drive_download_url_at(DRIVE_DOWNLOAD_ENDPOINT, file_id, confirm)
}

/// Direct-download URL for a Drive file on the given endpoint
pub fn drive_download_url_at(endpoint: &str, file_id: &str, confirm: Option<&str>) -> Result<Url> {
    let mut url = Url::parse(endpoint)
        .with_context(|| format!("Invalid Google Drive endpoint: {}", endpoint))?;
    {
        let mut q = url.query_pairs_mut();
        q.append_pair("export", "download");
        if let Some(token) = confirm {
            q.append_pair("confirm", token);
        }
        q.append_pair("id", file_id);
    }
    Ok(url)
}

/// Confirmation token embedded in a Drive "virus scan warning" page
pub fn confirm_token_from_html(body: &str) -> Option<String> {
    let start = body.find("confirm=")? + "confirm=".len();
    let token: String = body[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sources() {
        assert!(matches!(
            MediaSource::parse("https://example.com/a.mp4").unwrap(),
            MediaSource::Remote(_)
        ));
        assert_eq!(
            MediaSource::parse("file:///tmp/My%20Clip.mp4").unwrap(),
            MediaSource::Local(PathBuf::from("/tmp/My Clip.mp4"))
        );
        assert_eq!(
            MediaSource::parse("/tmp/clip.wav").unwrap(),
            MediaSource::Local(PathBuf::from("/tmp/clip.wav"))
        );
        assert!(MediaSource::parse("   ").is_err());
    }

    #[test]
    fn test_valid_video_urls() {
        assert!(is_valid_video_url("https://example.com/talk.mp4"));
        assert!(is_valid_video_url("https://www.loom.com/share/abc123"));
        assert!(is_valid_video_url("https://drive.google.com/file/d/XYZ/view"));
        assert!(is_valid_video_url("http://cdn.example.org/clip.WEBM"));
    }

    #[test]
    fn test_invalid_video_urls() {
        assert!(!is_valid_video_url("not a url"));
        assert!(!is_valid_video_url("https://example.com/page.html"));
        assert!(!is_valid_video_url("file:///tmp/clip.mp4"));
        assert!(!is_valid_video_url("/relative/clip.mp4"));
    }

    #[test]
    fn test_drive_file_id() {
        let share = Url::parse("https://drive.google.com/file/d/1AbC-_x/view?usp=sharing").unwrap();
        assert_eq!(drive_file_id(&share).as_deref(), Some("1AbC-_x"));

        let direct = Url::parse("https://drive.google.com/uc?export=download&id=QQQ").unwrap();
        assert_eq!(drive_file_id(&direct).as_deref(), Some("QQQ"));

        let other = Url::parse("https://example.com/file/d/abc/view").unwrap();
        assert_eq!(drive_file_id(&other), None);
    }

    #[test]
    fn test_drive_download_url() {
        let url = drive_download_url("abc", None).unwrap();
        assert_eq!(url.as_str(), "https://drive.google.com/uc?export=download&id=abc");

        let url = drive_download_url("abc", Some("t0k")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://drive.google.com/uc?export=download&confirm=t0k&id=abc"
        );

        let url = drive_download_url_at("http://127.0.0.1:8080/uc", "abc", None).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/uc?export=download&id=abc");
        assert!(drive_download_url_at("not a url", "abc", None).is_err());
    }

    #[test]
    fn test_confirm_token() {
        let html = r#"<a href="/uc?export=download&amp;confirm=Ab_9-x&amp;id=1">Download</a>"#;
        assert_eq!(confirm_token_from_html(html).as_deref(), Some("Ab_9-x"));
        assert_eq!(confirm_token_from_html("<html>nothing</html>"), None);
    }
}
