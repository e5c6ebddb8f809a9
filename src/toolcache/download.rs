use std::path::{Path, PathBuf};

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncWriteExt;

use crate::error::SetupError;

#[async_trait]
pub trait Downloader: Send + Sync {
    /// Fetch `url` into `dest_dir` and return the path of the written file.
    async fn download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, SetupError>;
}

pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self, SetupError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SetupError::Download(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, SetupError> {
        let dest = dest_dir.join(archive_file_name(url));

        tracing::info!("downloading {url}");

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SetupError::Download(format!("request to {url} failed: {e}")))?
            .error_for_status()
            .map_err(|e| SetupError::Download(e.to_string()))?;

        let pb = match response.content_length() {
            Some(total) => ProgressBar::new(total),
            None => ProgressBar::new_spinner(),
        };
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("=> "));
        }
        pb.set_message("Downloading");

        let mut file = tokio::fs::File::create(&dest).await?;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| SetupError::Download(format!("download stream failed: {e}")))?
        {
            file.write_all(&chunk).await?;
            pb.inc(chunk.len() as u64);
        }
        file.flush().await?;
        drop(file);

        pb.finish_with_message("Download complete");
        tracing::debug!("downloaded {url} to {}", dest.display());

        Ok(dest)
    }
}

/// File name for a downloaded archive: the last path segment of the URL.
pub fn archive_file_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("download")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_last_url_segment() {
        assert_eq!(
            archive_file_name("https://github.com/sbt/sbt/releases/download/v1.5.5/sbt-1.5.5.tgz"),
            "sbt-1.5.5.tgz"
        );
    }

    #[test]
    fn file_name_ignores_query_and_fragment() {
        assert_eq!(
            archive_file_name("https://example.com/a/graalvm.tar.gz?token=x#frag"),
            "graalvm.tar.gz"
        );
    }

    #[test]
    fn file_name_falls_back_for_trailing_slash() {
        assert_eq!(archive_file_name("https://example.com/dir/"), "download");
    }
}
