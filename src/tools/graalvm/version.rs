use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::SetupError;

const VERSION_KEY: &str = "GRAALVM_VERSION";

/// GraalVM CE release number, `MAJOR.MINOR.PATCH` with an optional `.UPDATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraalVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub update: Option<u32>,
}

impl GraalVersion {
    pub fn short(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }

    pub fn full(&self) -> String {
        match self.update {
            Some(update) => format!("{}.{update}", self.short()),
            None => self.short(),
        }
    }
}

impl fmt::Display for GraalVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full())
    }
}

impl FromStr for GraalVersion {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| SetupError::InvalidVersion {
            input: s.to_string(),
            reason: format!("{reason}. Expected MAJOR.MINOR.PATCH or MAJOR.MINOR.PATCH.UPDATE, e.g. 22.3.0"),
        };

        let parts: Vec<&str> = s.split('.').collect();
        if !(3..=4).contains(&parts.len()) {
            return Err(invalid("wrong number of components"));
        }

        let mut numbers = Vec::with_capacity(parts.len());
        for part in &parts {
            let number = parse_component(part)
                .ok_or_else(|| invalid("components must be numbers without leading zeros"))?;
            numbers.push(number);
        }
        if numbers[0] == 0 {
            return Err(invalid("major version must not be 0"));
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            update: numbers.get(3).copied(),
        })
    }
}

fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

/// Version reported by the `release` file of a GraalVM home directory.
pub fn installed_version(graal_home: &Path) -> Result<GraalVersion, SetupError> {
    let release_file = graal_home.join("release");
    tracing::debug!(
        "verifying installed GraalVM version using 'release' file at {}",
        release_file.display()
    );

    let release_error = |reason: String| SetupError::ReleaseFile {
        path: release_file.clone(),
        reason,
    };

    let contents =
        std::fs::read_to_string(&release_file).map_err(|e| release_error(e.to_string()))?;
    let raw = release_value(&contents, VERSION_KEY)
        .ok_or_else(|| release_error(format!("no {VERSION_KEY} entry found")))?;
    let installed = raw
        .parse::<GraalVersion>()
        .map_err(|e| release_error(e.to_string()))?;

    tracing::debug!(
        "resolved installed release version {installed} at {}",
        graal_home.display()
    );
    Ok(installed)
}

/// Quoted value of the first `KEY = "value"` line, matching the key
/// case-insensitively at the start of the line.
fn release_value<'a>(contents: &'a str, key: &str) -> Option<&'a str> {
    contents.lines().find_map(|line| {
        let (name, rest) = line.split_once('=')?;
        if !name.trim_end().eq_ignore_ascii_case(key) {
            return None;
        }
        let rest = rest.trim_start().strip_prefix('"')?;
        let end = rest.find('"')?;
        Some(&rest[..end])
    })
}
