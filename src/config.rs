use std::fmt;
use std::path::PathBuf;

use crate::error::SetupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOs {
    Linux,
    MacOs,
    Windows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetArch {
    X64,
    Arm64,
}

impl TargetArch {
    /// Architecture segment used in toolcache entry paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetArch::X64 => "x64",
            TargetArch::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for TargetArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub os: TargetOs,
    pub arch: TargetArch,
}

impl Target {
    pub fn current() -> Result<Self, SetupError> {
        let os = match std::env::consts::OS {
            "linux" => TargetOs::Linux,
            "macos" => TargetOs::MacOs,
            "windows" => TargetOs::Windows,
            other => {
                return Err(SetupError::UnsupportedTarget(format!(
                    "Unsupported platform '{other}'. Only Linux, macOS or Windows hosts are supported."
                )))
            }
        };
        let arch = match std::env::consts::ARCH {
            "x86_64" => TargetArch::X64,
            "aarch64" => TargetArch::Arm64,
            other => {
                return Err(SetupError::UnsupportedTarget(format!(
                    "Unsupported architecture '{other}'. Only \"x64\" (AMD64) or \"arm64\" (AArch64) runtime architectures are supported."
                )))
            }
        };
        Ok(Self { os, arch })
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let (os, arch) = s.split_once('-')?;
        let os = match os {
            "linux" => TargetOs::Linux,
            "macos" => TargetOs::MacOs,
            "windows" => TargetOs::Windows,
            _ => return None,
        };
        let arch = match arch {
            "x64" => TargetArch::X64,
            "arm64" => TargetArch::Arm64,
            _ => return None,
        };
        Some(Self { os, arch })
    }

    pub fn is_windows(&self) -> bool {
        self.os == TargetOs::Windows
    }

    /// Name of an executable in a `bin` directory for this target.
    pub fn script_name(&self, base: &str) -> String {
        if self.is_windows() {
            format!("{base}.cmd")
        } else {
            base.to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolcacheConfig {
    pub tools_dir: PathBuf,
    pub temp_dir: PathBuf,
}

impl ToolcacheConfig {
    pub fn new(tools_dir: Option<PathBuf>, temp_dir: Option<PathBuf>) -> Self {
        let tools_dir = tools_dir
            .or_else(|| std::env::var_os("RUNNER_TOOL_CACHE").map(PathBuf::from))
            .unwrap_or_else(Self::default_tools_dir);
        let temp_dir = temp_dir.unwrap_or_else(std::env::temp_dir);
        Self {
            tools_dir,
            temp_dir,
        }
    }

    fn default_tools_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(".toolcache")
    }

    /// Fresh scratch directory for one download and extraction.
    pub fn scratch_dir(&self) -> Result<tempfile::TempDir, SetupError> {
        std::fs::create_dir_all(&self.temp_dir)?;
        Ok(tempfile::Builder::new()
            .prefix("toolcache-setup-")
            .tempdir_in(&self.temp_dir)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_all_supported_targets() {
        let cases = [
            ("linux-x64", TargetOs::Linux, TargetArch::X64),
            ("linux-arm64", TargetOs::Linux, TargetArch::Arm64),
            ("macos-x64", TargetOs::MacOs, TargetArch::X64),
            ("macos-arm64", TargetOs::MacOs, TargetArch::Arm64),
            ("windows-x64", TargetOs::Windows, TargetArch::X64),
            ("windows-arm64", TargetOs::Windows, TargetArch::Arm64),
        ];
        for (input, os, arch) in cases {
            assert_eq!(Target::from_str(input), Some(Target { os, arch }), "{input}");
        }
    }

    #[test]
    fn rejects_unknown_targets() {
        assert_eq!(Target::from_str("linux"), None);
        assert_eq!(Target::from_str("freebsd-x64"), None);
        assert_eq!(Target::from_str("linux-aarch64"), None);
    }

    #[test]
    fn script_name_adds_cmd_on_windows() {
        let windows = Target::from_str("windows-x64").unwrap();
        let linux = Target::from_str("linux-x64").unwrap();
        assert_eq!(windows.script_name("gu"), "gu.cmd");
        assert_eq!(linux.script_name("gu"), "gu");
    }

    #[test]
    fn explicit_dirs_take_priority() {
        let tools = tempdir().unwrap();
        let temp = tempdir().unwrap();
        let config = ToolcacheConfig::new(
            Some(tools.path().to_path_buf()),
            Some(temp.path().to_path_buf()),
        );
        assert_eq!(config.tools_dir, tools.path());
        assert_eq!(config.temp_dir, temp.path());
    }

    #[test]
    fn scratch_dir_is_created_under_temp_dir() {
        let temp = tempdir().unwrap();
        let config = ToolcacheConfig::new(
            Some(temp.path().join("tools")),
            Some(temp.path().join("nested").join("tmp")),
        );
        let scratch = config.scratch_dir().unwrap();
        assert!(scratch.path().starts_with(temp.path().join("nested").join("tmp")));
        assert!(scratch.path().is_dir());
    }
}
