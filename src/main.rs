mod agent;
mod cli;
mod config;
mod error;
mod toolcache;
mod tools;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use indicatif::HumanBytes;

use agent::{AgentEnvironment, PipelineAgent};
use cli::{Cli, Command};
use config::{Target, ToolcacheConfig};
use error::SetupError;
use toolcache::cache::{dir_size, Toolcache};
use toolcache::download::HttpDownloader;
use toolcache::ToolResolver;
use tools::graalvm::GraalRequest;
use tools::sbt::SbtRequest;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("toolcache_setup=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    let config = ToolcacheConfig::new(cli.tools_dir, cli.temp_dir);

    if let Command::Info = cli.command {
        return match run_info(&config, cli.target.as_deref()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e:#}");
                ExitCode::FAILURE
            }
        };
    }

    let mut agent = PipelineAgent::stdout();

    let target = match resolve_target(cli.target.as_deref()) {
        Ok(target) => target,
        Err(e) => {
            agent.set_failed(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let failure = match cli.command {
        Command::Sbt { sbt_version } => {
            let request = SbtRequest {
                version: sbt_version,
                target,
            };
            run_sbt(&request, &config, &mut agent)
                .await
                .err()
                .map(|e| request.failure_message(&e))
        }
        Command::Graalvm {
            graal_version,
            java_version,
            native_image,
            llvm_toolchain,
            prefix_node_executables,
        } => match graal_version.parse() {
            Ok(version) => {
                let request = GraalRequest {
                    version,
                    java_version,
                    target,
                    native_image,
                    llvm_toolchain,
                    prefix_node_executables,
                };
                run_graalvm(&request, &config, &mut agent)
                    .await
                    .err()
                    .map(|e| request.failure_message(&e))
            }
            Err(e) => Some(format!(
                "Error installing GraalVM {graal_version} for Java {java_version} on {}. {e}",
                target.arch
            )),
        },
        Command::Info => None,
    };

    match failure {
        Some(message) => {
            agent.set_failed(&message);
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}

fn resolve_target(target: Option<&str>) -> Result<Target, SetupError> {
    match target {
        Some(t) => Target::from_str(t).ok_or_else(|| {
            SetupError::UnsupportedTarget(format!(
                "invalid target: {t}. Use: linux-x64, linux-arm64, macos-x64, macos-arm64, windows-x64, windows-arm64"
            ))
        }),
        None => Target::current(),
    }
}

fn resolver(
    config: &ToolcacheConfig,
    target: &Target,
) -> Result<ToolResolver<HttpDownloader>, SetupError> {
    let cache = Toolcache::new(&config.tools_dir, target.arch);
    Ok(ToolResolver::new(cache, config.clone(), HttpDownloader::new()?))
}

async fn run_sbt(
    request: &SbtRequest,
    config: &ToolcacheConfig,
    agent: &mut impl AgentEnvironment,
) -> Result<(), SetupError> {
    let resolver = resolver(config, &request.target)?;
    let bin_dir = tools::sbt::setup(request, &resolver, agent).await?;
    tracing::info!("sbt {} ready at {}", request.version, bin_dir.display());
    Ok(())
}

async fn run_graalvm(
    request: &GraalRequest,
    config: &ToolcacheConfig,
    agent: &mut impl AgentEnvironment,
) -> Result<(), SetupError> {
    let resolver = resolver(config, &request.target)?;
    let bin_dir = tools::graalvm::setup(request, &resolver, agent).await?;
    tracing::info!(
        "GraalVM {} for Java {} ready at {}",
        request.version,
        request.java_version,
        bin_dir.display()
    );
    Ok(())
}

fn run_info(config: &ToolcacheConfig, target: Option<&str>) -> Result<()> {
    let target = resolve_target(target)?;
    let cache = Toolcache::new(&config.tools_dir, target.arch);

    eprintln!("Toolcache directory: {}", config.tools_dir.display());
    eprintln!("Temp directory:      {}", config.temp_dir.display());

    let tools = cache.tools()?;
    if tools.is_empty() {
        eprintln!("Toolcache is empty");
    }

    for tool in &tools {
        let versions = cache.find_local_tool_versions(tool)?;
        if versions.is_empty() {
            continue;
        }
        eprintln!("  {tool}");
        for version in &versions {
            if let Some(path) = cache.find_local_tool(tool, version) {
                eprintln!("    {version} ({})", HumanBytes(dir_size(&path)));
            }
        }
    }

    eprintln!("\nTarget platform: {:?}-{}", target.os, target.arch);
    Ok(())
}
