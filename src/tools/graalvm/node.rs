use std::path::Path;

use crate::error::SetupError;

const PREFIX: &str = "graal-";
const NODE_BINARIES: [&str; 3] = ["node", "npm", "npx"];
const EXTENSIONS: [&str; 4] = ["", ".cmd", ".bat", ".exe"];

/// Every bare Node.js executable name GraalVM may ship.
pub fn node_executables() -> Vec<String> {
    EXTENSIONS
        .iter()
        .flat_map(|ext| NODE_BINARIES.iter().map(move |base| format!("{base}{ext}")))
        .collect()
}

/// `(from, to)` renames needed to reach the requested prefix state, given
/// the file names present in the bin directory.
pub fn plan_renames(entries: &[String], prefix: bool) -> Vec<(String, String)> {
    let executables = node_executables();
    entries
        .iter()
        .filter_map(|name| {
            if prefix {
                executables
                    .contains(name)
                    .then(|| (name.clone(), format!("{PREFIX}{name}")))
            } else {
                let bare = name.strip_prefix(PREFIX)?;
                executables
                    .iter()
                    .any(|e| e == bare)
                    .then(|| (name.clone(), bare.to_string()))
            }
        })
        .collect()
}

/// Add or remove the `graal-` prefix on the bundled Node.js executables.
pub fn configure_prefix(bin_dir: &Path, prefix: bool) -> Result<(), SetupError> {
    apply_renames(bin_dir, prefix).map_err(|e| {
        tracing::debug!("renaming Node.js executables in {} failed: {e}", bin_dir.display());
        SetupError::NodePrefix { prefix }
    })
}

fn apply_renames(bin_dir: &Path, prefix: bool) -> std::io::Result<()> {
    let mut entries: Vec<String> = std::fs::read_dir(bin_dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    entries.sort();

    let renames = plan_renames(&entries, prefix);
    tracing::debug!(
        "resolved GraalVM Node binaries: {}",
        renames
            .iter()
            .map(|(from, _)| from.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    for (from, to) in renames {
        let old_path = bin_dir.join(&from);
        let new_path = bin_dir.join(&to);
        tracing::debug!("renaming {} to {}", old_path.display(), new_path.display());
        std::fs::rename(&old_path, &new_path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut entries: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        entries.sort();
        entries
    }

    fn touch(dir: &Path, files: &[&str]) {
        for f in files {
            std::fs::write(dir.join(f), b"").unwrap();
        }
    }

    #[test]
    fn executable_set_has_twelve_names() {
        let all = node_executables();
        assert_eq!(all.len(), 12);
        for expected in ["node", "npm", "npx", "node.cmd", "npx.bat", "npm.exe"] {
            assert!(all.iter().any(|n| n == expected), "{expected}");
        }
    }

    #[test]
    fn plan_prefixes_only_known_names() {
        let plan = plan_renames(&names(&["java", "node", "npm.cmd", "nodejs", "graal-npx"]), true);
        assert_eq!(
            plan,
            vec![
                ("node".to_string(), "graal-node".to_string()),
                ("npm.cmd".to_string(), "graal-npm.cmd".to_string()),
            ]
        );
    }

    #[test]
    fn plan_unprefixes_only_known_names() {
        let plan = plan_renames(
            &names(&["graal-node", "graal-java", "graal-npx.exe", "npm"]),
            false,
        );
        assert_eq!(
            plan,
            vec![
                ("graal-node".to_string(), "node".to_string()),
                ("graal-npx.exe".to_string(), "npx.exe".to_string()),
            ]
        );
    }

    #[test]
    fn prefixing_renames_and_leaves_other_files() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["node", "npm.cmd", "java", "gu"]);

        configure_prefix(dir.path(), true).unwrap();

        assert_eq!(
            listing(dir.path()),
            names(&["graal-node", "graal-npm.cmd", "gu", "java"])
        );
    }

    #[test]
    fn prefixing_twice_is_idempotent() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["node", "npm.cmd", "java"]);

        configure_prefix(dir.path(), true).unwrap();
        let after_first = listing(dir.path());
        configure_prefix(dir.path(), true).unwrap();

        assert_eq!(listing(dir.path()), after_first);
    }

    #[test]
    fn unprefixing_restores_bare_names() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["graal-node", "graal-npx", "java"]);

        configure_prefix(dir.path(), false).unwrap();

        assert_eq!(listing(dir.path()), names(&["java", "node", "npx"]));
    }

    #[test]
    fn missing_bin_dir_reports_configured_flag() {
        let dir = tempdir().unwrap();
        let err = configure_prefix(&dir.path().join("missing"), true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error setting up GraalVM NodeJS executables prefix: Configured setting: prefixNodeExecutables := 'true'"
        );
    }
}
