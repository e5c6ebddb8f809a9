use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand};

/// Install build tools into a CI agent toolcache and put them on PATH.
///
/// Task inputs can be given as flags or through the agent's `INPUT_*`
/// environment variables.
#[derive(Parser, Debug)]
#[command(name = "toolcache-setup")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Toolcache root directory
    #[arg(long, global = true, env = "AGENT_TOOLSDIRECTORY")]
    pub tools_dir: Option<PathBuf>,

    /// Directory for downloads and extraction scratch space
    #[arg(long, global = true, env = "AGENT_TEMPDIRECTORY")]
    pub temp_dir: Option<PathBuf>,

    /// Target platform (linux-x64, linux-arm64, macos-x64, macos-arm64,
    /// windows-x64, windows-arm64). Defaults to the host.
    #[arg(long, global = true)]
    pub target: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install sbt and prepend its bin directory to PATH
    Sbt {
        /// Exact sbt release, e.g. 1.6.2
        #[arg(long, env = "INPUT_SBTVERSION")]
        sbt_version: String,
    },

    /// Install GraalVM CE, set GRAALVM_HOME/JAVA_HOME and prepend its bin directory to PATH
    Graalvm {
        /// GraalVM release, MAJOR.MINOR.PATCH[.UPDATE], e.g. 22.3.0
        #[arg(long, env = "INPUT_GRAALVERSION")]
        graal_version: String,

        /// Java feature release of the distribution, e.g. 17
        #[arg(long, env = "INPUT_JAVAVERSION")]
        java_version: u32,

        /// Install the native-image component
        #[arg(long, env = "INPUT_NATIVEIMAGE", required = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        native_image: bool,

        /// Install the llvm-toolchain component
        #[arg(long, env = "INPUT_LLVMTOOLCHAIN", required = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        llvm_toolchain: bool,

        /// Rename bundled node/npm/npx to graal-node/graal-npm/graal-npx
        #[arg(long, env = "INPUT_PREFIXNODEEXECUTABLES", required = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        prefix_node_executables: bool,
    },

    /// Show toolcache location and cached tools
    Info,
}
