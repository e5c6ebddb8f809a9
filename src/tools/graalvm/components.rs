use std::path::Path;
use std::process::Command;

use crate::config::Target;
use crate::error::SetupError;

pub const NATIVE_IMAGE: &str = "native-image";
pub const LLVM_TOOLCHAIN: &str = "llvm-toolchain";

/// Components to add, in install order.
pub fn selected(native_image: bool, llvm_toolchain: bool) -> Vec<&'static str> {
    [(native_image, NATIVE_IMAGE), (llvm_toolchain, LLVM_TOOLCHAIN)]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, component)| component)
        .collect()
}

/// Install each component with the distribution's `gu` updater.
pub fn install(bin_dir: &Path, components: &[&str], target: &Target) -> Result<(), SetupError> {
    let gu = bin_dir.join(target.script_name("gu"));

    for component in components {
        tracing::info!(
            "installing GraalVM \"{component}\" component using {}",
            gu.display()
        );

        let output = Command::new(&gu)
            .args(["-A", "-N", "install", "-n", *component])
            .output()
            .map_err(|e| SetupError::ComponentInstall {
                component: component.to_string(),
                stderr: format!("failed to run {}: {e}", gu.display()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SetupError::ComponentInstall {
                component: component.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
    }

    Ok(())
}
