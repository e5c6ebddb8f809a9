pub mod components;
pub mod node;
pub mod version;

use std::path::{Path, PathBuf};

use crate::agent::AgentEnvironment;
use crate::config::{Target, TargetArch, TargetOs};
use crate::error::SetupError;
use crate::toolcache::download::Downloader;
use crate::toolcache::extract::ArchiveFormat;
use crate::toolcache::{list_dir, CachedTool, ToolResolver};

use self::version::GraalVersion;

const RELEASES_URL: &str = "https://github.com/graalvm/graalvm-ce-builds/releases/download";

#[derive(Debug, Clone)]
pub struct GraalRequest {
    pub version: GraalVersion,
    pub java_version: u32,
    pub target: Target,
    pub native_image: bool,
    pub llvm_toolchain: bool,
    pub prefix_node_executables: bool,
}

pub fn graal_platform(os: TargetOs) -> &'static str {
    match os {
        TargetOs::Linux => "linux",
        TargetOs::MacOs => "darwin",
        TargetOs::Windows => "windows",
    }
}

pub fn graal_arch(target: &Target) -> Result<&'static str, SetupError> {
    match (target.arch, target.os) {
        (TargetArch::X64, _) => Ok("amd64"),
        (TargetArch::Arm64, TargetOs::Linux) => Ok("aarch64"),
        (TargetArch::Arm64, _) => Err(SetupError::UnsupportedTarget(
            "GraalVM CE only supports \"arm64\" (AArch64) runtime architectures when running on linux hosts at this time.".to_string(),
        )),
    }
}

pub fn graal_extension(os: TargetOs) -> &'static str {
    match os {
        TargetOs::Windows => "zip",
        TargetOs::Linux | TargetOs::MacOs => "tar.gz",
    }
}

/// `JAVA_HOME` for a cached distribution. macOS bundles keep it under `Home`.
pub fn graal_home(root: &Path, os: TargetOs) -> PathBuf {
    match os {
        TargetOs::MacOs => root.join("Home"),
        TargetOs::Linux | TargetOs::Windows => root.to_path_buf(),
    }
}

impl GraalRequest {
    fn distribution_name(&self) -> String {
        format!("graalvm-ce-java{}-{}", self.java_version, self.version.full())
    }

    pub fn failure_message(&self, err: &SetupError) -> String {
        format!(
            "Error installing GraalVM {} for Java {} on {}. {err}",
            self.version, self.java_version, self.target.arch
        )
    }
}

impl CachedTool for GraalRequest {
    fn display_name(&self) -> String {
        format!("GraalVM {} for Java {}", self.version, self.java_version)
    }

    fn cache_name(&self) -> String {
        format!("graalvm-ce-java{}", self.java_version)
    }

    fn cache_version(&self) -> String {
        self.version.short()
    }

    fn download_url(&self) -> Result<String, SetupError> {
        let full = self.version.full();
        Ok(format!(
            "{RELEASES_URL}/vm-{full}/graalvm-ce-java{java}-{platform}-{arch}-{full}.{ext}",
            java = self.java_version,
            platform = graal_platform(self.target.os),
            arch = graal_arch(&self.target)?,
            ext = graal_extension(self.target.os),
        ))
    }

    fn archive_format(&self) -> ArchiveFormat {
        ArchiveFormat::for_os(self.target.os)
    }

    fn tool_root(&self, extracted: &Path) -> PathBuf {
        let root = extracted.join(self.distribution_name());
        match self.target.os {
            TargetOs::MacOs => root.join("Contents"),
            TargetOs::Linux | TargetOs::Windows => root,
        }
    }

    // Entries are keyed by the short version, so several updates of one
    // release share a slot; the release file tells them apart.
    fn is_current(&self, root: &Path) -> Result<bool, SetupError> {
        let installed = version::installed_version(&graal_home(root, self.target.os))?;
        if installed == self.version {
            return Ok(true);
        }
        tracing::warn!(
            "locally cached GraalVM {installed} does not equal required {}",
            self.version
        );
        Ok(false)
    }
}

/// Resolve GraalVM, publish it to the agent and apply the component and
/// Node.js settings.
pub async fn setup<D: Downloader>(
    request: &GraalRequest,
    resolver: &ToolResolver<D>,
    agent: &mut impl AgentEnvironment,
) -> Result<PathBuf, SetupError> {
    let root = resolver.resolve(request).await?;
    configure_local_tool(request, &root, agent)
}

fn configure_local_tool(
    request: &GraalRequest,
    root: &Path,
    agent: &mut impl AgentEnvironment,
) -> Result<PathBuf, SetupError> {
    let home = graal_home(root, request.target.os);
    tracing::debug!(
        "setting GRAALVM_HOME and JAVA_HOME to {}. Contents: {}",
        home.display(),
        list_dir(&home)
    );
    let home_str = home.to_string_lossy();
    agent.set_variable("GRAALVM_HOME", &home_str)?;
    agent.set_variable("JAVA_HOME", &home_str)?;

    let bin_dir = home.join("bin");
    tracing::debug!(
        "using GraalVM bin directory at {}. Contents: {}",
        bin_dir.display(),
        list_dir(&bin_dir)
    );
    agent.prepend_path(&bin_dir)?;

    let selected = components::selected(request.native_image, request.llvm_toolchain);
    components::install(&bin_dir, &selected, &request.target)?;

    node::configure_prefix(&bin_dir, request.prefix_node_executables)?;

    Ok(bin_dir)
}
