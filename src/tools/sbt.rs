use std::path::{Path, PathBuf};

use crate::agent::AgentEnvironment;
use crate::config::{Target, TargetOs};
use crate::error::SetupError;
use crate::toolcache::download::Downloader;
use crate::toolcache::extract::ArchiveFormat;
use crate::toolcache::{list_dir, CachedTool, ToolResolver};

const RELEASES_URL: &str = "https://github.com/sbt/sbt/releases/download";

#[derive(Debug, Clone)]
pub struct SbtRequest {
    pub version: String,
    pub target: Target,
}

pub fn sbt_extension(os: TargetOs) -> &'static str {
    match os {
        TargetOs::Windows => "zip",
        TargetOs::Linux | TargetOs::MacOs => "tgz",
    }
}

impl SbtRequest {
    pub fn failure_message(&self, err: &SetupError) -> String {
        format!("Error installing sbt {}. {err}", self.version)
    }
}

impl CachedTool for SbtRequest {
    fn display_name(&self) -> String {
        format!("sbt {}", self.version)
    }

    fn cache_name(&self) -> String {
        "sbt".to_string()
    }

    fn cache_version(&self) -> String {
        self.version.clone()
    }

    fn download_url(&self) -> Result<String, SetupError> {
        let version = &self.version;
        let ext = sbt_extension(self.target.os);
        Ok(format!("{RELEASES_URL}/v{version}/sbt-{version}.{ext}"))
    }

    fn archive_format(&self) -> ArchiveFormat {
        ArchiveFormat::for_os(self.target.os)
    }

    fn tool_root(&self, extracted: &Path) -> PathBuf {
        extracted.join("sbt")
    }
}

/// Resolve sbt from the toolcache and put its launcher on PATH.
pub async fn setup<D: Downloader>(
    request: &SbtRequest,
    resolver: &ToolResolver<D>,
    agent: &mut impl AgentEnvironment,
) -> Result<PathBuf, SetupError> {
    let root = resolver.resolve(request).await?;

    let bin_dir = root.join("bin");
    tracing::debug!(
        "resolved sbt bin directory at {}. Contents: {}",
        bin_dir.display(),
        list_dir(&bin_dir)
    );
    agent.prepend_path(&bin_dir)?;

    Ok(bin_dir)
}
