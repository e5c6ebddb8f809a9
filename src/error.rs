use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid version '{input}': {reason}")]
    InvalidVersion { input: String, reason: String },

    #[error("{0}")]
    UnsupportedTarget(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("extraction failed: {0}")]
    Extract(String),

    #[error("Error resolving installed GraalVM version. Unable to read version information from 'release' file at {path}. {reason}")]
    ReleaseFile { path: PathBuf, reason: String },

    #[error("Error installing GraalVM \"{component}\" component. {stderr}")]
    ComponentInstall { component: String, stderr: String },

    #[error("Error setting up GraalVM NodeJS executables prefix: Configured setting: prefixNodeExecutables := '{prefix}'")]
    NodePrefix { prefix: bool },

    #[error("{tool} {version} was cached but could not be found in the toolcache at {root}")]
    CacheEntryMissing {
        tool: String,
        version: String,
        root: PathBuf,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for SetupError {
    fn from(err: zip::result::ZipError) -> Self {
        SetupError::Extract(err.to_string())
    }
}
