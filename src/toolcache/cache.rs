use std::path::{Path, PathBuf};

use crate::config::TargetArch;
use crate::error::SetupError;

/// Versioned tool store laid out as `<root>/<tool>/<version>/<arch>/`.
///
/// An entry only counts once its `<arch>.complete` marker exists next to it,
/// so a half-copied directory from an interrupted run is never returned.
#[derive(Debug, Clone)]
pub struct Toolcache {
    root: PathBuf,
    arch: TargetArch,
}

impl Toolcache {
    pub fn new(root: impl Into<PathBuf>, arch: TargetArch) -> Self {
        Self {
            root: root.into(),
            arch,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, tool: &str, version: &str) -> PathBuf {
        self.root.join(tool).join(version).join(self.arch.as_str())
    }

    fn marker_path(&self, tool: &str, version: &str) -> PathBuf {
        self.root
            .join(tool)
            .join(version)
            .join(format!("{}.complete", self.arch.as_str()))
    }

    /// Names of the tools that have at least one directory in the cache.
    pub fn tools(&self) -> Result<Vec<String>, SetupError> {
        list_dirs(&self.root)
    }

    pub fn find_local_tool_versions(&self, tool: &str) -> Result<Vec<String>, SetupError> {
        let versions = list_dirs(&self.root.join(tool))?
            .into_iter()
            .filter(|version| self.marker_path(tool, version).is_file())
            .collect();
        Ok(versions)
    }

    pub fn find_local_tool(&self, tool: &str, version: &str) -> Option<PathBuf> {
        let version = clean_version(version);
        let path = self.entry_path(tool, &version);
        if path.is_dir() && self.marker_path(tool, &version).is_file() {
            Some(path)
        } else {
            None
        }
    }

    /// Copy `source` into the cache as `(tool, version)`, replacing any
    /// existing entry.
    pub fn cache_dir(&self, source: &Path, tool: &str, version: &str) -> Result<PathBuf, SetupError> {
        let version = clean_version(version);
        let dest = self.entry_path(tool, &version);
        let marker = self.marker_path(tool, &version);

        tracing::debug!("caching {} as {tool} {version}", source.display());

        if marker.exists() {
            std::fs::remove_file(&marker)?;
        }
        if dest.exists() {
            std::fs::remove_dir_all(&dest)?;
        }
        std::fs::create_dir_all(&dest)?;

        copy_dir_contents(source, &dest)?;
        std::fs::write(&marker, b"")?;

        Ok(dest)
    }
}

/// Normalise a version the way the cache stores it: valid semver is
/// re-rendered without a leading `v`, anything else is kept as given.
pub fn clean_version(version: &str) -> String {
    let trimmed = version.trim();
    let candidate = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('='))
        .unwrap_or(trimmed);
    match semver::Version::parse(candidate) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

fn list_dirs(path: &Path) -> Result<Vec<String>, SetupError> {
    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    names.sort();
    Ok(names)
}

fn copy_dir_contents(src: &Path, dest: &Path) -> Result<(), SetupError> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let target = dest.join(entry.file_name());

        if file_type.is_dir() {
            std::fs::create_dir_all(&target)?;
            copy_dir_contents(&entry.path(), &target)?;
        } else if file_type.is_symlink() {
            copy_symlink(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> Result<(), SetupError> {
    let link = std::fs::read_link(src)?;
    std::os::unix::fs::symlink(link, dest)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dest: &Path) -> Result<(), SetupError> {
    if src.is_dir() {
        std::fs::create_dir_all(dest)?;
        copy_dir_contents(src, dest)
    } else {
        std::fs::copy(src, dest)?;
        Ok(())
    }
}

pub fn dir_size(path: &Path) -> u64 {
    let mut size = 0;
    if let Ok(entries) = std::fs::read_dir(path) {
        for entry in entries.flatten() {
            let p = entry.path();
            if p.is_dir() {
                size += dir_size(&p);
            } else if let Ok(meta) = p.metadata() {
                size += meta.len();
            }
        }
    }
    size
}
