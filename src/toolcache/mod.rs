pub mod cache;
pub mod download;
pub mod extract;

use std::path::{Path, PathBuf};

use crate::config::ToolcacheConfig;
use crate::error::SetupError;

use self::cache::Toolcache;
use self::download::Downloader;
use self::extract::ArchiveFormat;

/// A tool that can be fetched from a release archive and kept in the toolcache.
pub trait CachedTool {
    /// Human readable name used in log lines.
    fn display_name(&self) -> String;

    fn cache_name(&self) -> String;

    fn cache_version(&self) -> String;

    fn download_url(&self) -> Result<String, SetupError>;

    fn archive_format(&self) -> ArchiveFormat;

    /// Directory inside the extracted archive that becomes the cache entry.
    fn tool_root(&self, extracted: &Path) -> PathBuf;

    /// Whether a cache entry found under the right key really holds the
    /// requested release.
    fn is_current(&self, _root: &Path) -> Result<bool, SetupError> {
        Ok(true)
    }
}

pub struct ToolResolver<D> {
    cache: Toolcache,
    config: ToolcacheConfig,
    downloader: D,
}

impl<D: Downloader> ToolResolver<D> {
    pub fn new(cache: Toolcache, config: ToolcacheConfig, downloader: D) -> Self {
        Self {
            cache,
            config,
            downloader,
        }
    }

    #[cfg(test)]
    pub fn cache(&self) -> &Toolcache {
        &self.cache
    }

    #[cfg(test)]
    pub fn downloader(&self) -> &D {
        &self.downloader
    }

    /// Root directory of the cached tool, installing it first on a miss.
    ///
    /// A miss installs at most once; the entry written by that install is
    /// returned without being checked again.
    pub async fn resolve<T: CachedTool>(&self, tool: &T) -> Result<PathBuf, SetupError> {
        let name = tool.cache_name();
        let version = tool.cache_version();

        if let Some(root) = self.find_current(tool, &name, &version)? {
            tracing::info!(
                "using locally cached {} from {}",
                tool.display_name(),
                root.display()
            );
            return Ok(root);
        }

        self.install(tool, &name, &version).await?;

        self.cache
            .find_local_tool(&name, &version)
            .ok_or_else(|| SetupError::CacheEntryMissing {
                tool: name,
                version,
                root: self.cache.root().to_path_buf(),
            })
    }

    fn find_current<T: CachedTool>(
        &self,
        tool: &T,
        name: &str,
        version: &str,
    ) -> Result<Option<PathBuf>, SetupError> {
        let versions = self.cache.find_local_tool_versions(name)?;
        if !versions.contains(&cache::clean_version(version)) {
            tracing::debug!(
                "{name} {version} is not cached (cached versions: [{}])",
                versions.join(", ")
            );
            return Ok(None);
        }

        let Some(root) = self.cache.find_local_tool(name, version) else {
            return Ok(None);
        };

        if tool.is_current(&root)? {
            Ok(Some(root))
        } else {
            Ok(None)
        }
    }

    async fn install<T: CachedTool>(
        &self,
        tool: &T,
        name: &str,
        version: &str,
    ) -> Result<PathBuf, SetupError> {
        let url = tool.download_url()?;
        let scratch = self.config.scratch_dir()?;

        tracing::info!("installing {} from {url}", tool.display_name());
        let archive = self.downloader.download(&url, scratch.path()).await?;

        let extracted = scratch.path().join("extracted");
        extract::extract(&archive, tool.archive_format(), &extracted)?;
        tracing::debug!("extracted {} to {}", archive.display(), extracted.display());

        let root = tool.tool_root(&extracted);
        if !root.is_dir() {
            return Err(SetupError::Extract(format!(
                "archive from {url} does not contain {}",
                root.strip_prefix(&extracted).unwrap_or(&root).display()
            )));
        }

        let cached = self.cache.cache_dir(&root, name, version)?;
        tracing::debug!(
            "cached {} at {}. Contents: {}",
            tool.display_name(),
            cached.display(),
            list_dir(&cached)
        );
        Ok(cached)
    }
}

/// Comma separated listing of a directory for debug output.
pub fn list_dir(path: &Path) -> String {
    match std::fs::read_dir(path) {
        Ok(entries) => {
            let mut names: Vec<String> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names.join(", ")
        }
        Err(e) => format!("<unreadable: {e}>"),
    }
}
