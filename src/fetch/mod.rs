//! Fetching media from URLs and local paths

mod download;
mod source;

pub use download::{DownloadedMedia, FetchConfig, MediaFetcher};
pub use source::{
    confirm_token_from_html, drive_download_url, drive_download_url_at, drive_file_id,
    is_valid_video_url, MediaSource, DRIVE_DOWNLOAD_ENDPOINT,
};
