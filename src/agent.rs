//! Side effects on the CI agent running the task.
//!
//! The agent picks up PATH entries, variables and the task result from
//! logging commands (`##vso[...]`) written to stdout. Everything that
//! publishes a resolved tool goes through [`AgentEnvironment`] so task code
//! can be exercised without a real agent process.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::SetupError;

pub trait AgentEnvironment {
    /// Prepend `dir` to PATH for this and all following pipeline steps.
    fn prepend_path(&mut self, dir: &Path) -> Result<(), SetupError>;

    fn set_variable(&mut self, name: &str, value: &str) -> Result<(), SetupError>;

    /// Mark the task as failed. The process is expected to exit afterwards.
    fn set_failed(&mut self, message: &str);
}

pub struct PipelineAgent<W: Write> {
    out: W,
    update_process: bool,
}

impl PipelineAgent<std::io::Stdout> {
    /// Agent writing to stdout that also mirrors changes into this process.
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
            update_process: true,
        }
    }
}

impl<W: Write> PipelineAgent<W> {
    #[cfg(test)]
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            update_process: false,
        }
    }

    fn command(
        &mut self,
        name: &str,
        properties: &[(&str, &str)],
        data: &str,
    ) -> std::io::Result<()> {
        let line = format_command(name, properties, data);
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }
}

impl<W: Write> AgentEnvironment for PipelineAgent<W> {
    fn prepend_path(&mut self, dir: &Path) -> Result<(), SetupError> {
        let dir_str = dir.to_string_lossy();
        tracing::debug!("prepending {dir_str} to PATH");
        self.command("task.prependpath", &[], &dir_str)?;

        if self.update_process {
            let current = std::env::var_os("PATH").unwrap_or_default();
            std::env::set_var("PATH", prepend_to(dir, &current));
        }
        Ok(())
    }

    fn set_variable(&mut self, name: &str, value: &str) -> Result<(), SetupError> {
        tracing::debug!("setting variable {name}={value}");
        self.command("task.setvariable", &[("variable", name)], value)?;

        if self.update_process {
            std::env::set_var(name.replace('.', "_").to_uppercase(), value);
        }
        Ok(())
    }

    fn set_failed(&mut self, message: &str) {
        tracing::error!("{message}");
        if let Err(e) = self.command("task.complete", &[("result", "Failed")], message) {
            tracing::error!("failed to report task result: {e}");
        }
    }
}

fn prepend_to(dir: &Path, current: &OsString) -> OsString {
    let mut paths: Vec<PathBuf> = vec![dir.to_path_buf()];
    paths.extend(std::env::split_paths(current).filter(|p| p != dir));
    std::env::join_paths(paths).unwrap_or_else(|_| current.clone())
}

pub fn format_command(name: &str, properties: &[(&str, &str)], data: &str) -> String {
    let mut line = format!("##vso[{name}");
    if !properties.is_empty() {
        line.push(' ');
        for (key, value) in properties {
            line.push_str(&format!("{key}={};", escape_property(value)));
        }
    }
    line.push(']');
    line.push_str(&escape_data(data));
    line
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%AZP25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(';', "%3B").replace(']', "%5D")
}
