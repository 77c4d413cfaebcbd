use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for stereoview")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests (GPU tests skip without an adapter)
    Test,
    /// Run the headless GPU tests, failing if no adapter is available
    Gpu,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            run_fmt()?;
            run_clippy()?;
            run_tests()?;
            run_doc()?;
        }
        Commands::Fmt => run_fmt()?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => run_tests()?,
        Commands::Gpu => run_gpu_tests()?,
        Commands::Doc => run_doc()?,
        Commands::Build => cargo("build", &["build", "--workspace"], &[])?,
    }

    Ok(())
}

/// Run one cargo invocation, failing the task if it exits unsuccessfully.
fn cargo(step: &str, args: &[&str], envs: &[(&str, &str)]) -> Result<()> {
    println!("==> Running cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .envs(envs.iter().copied())
        .status()?;
    if !status.success() {
        anyhow::bail!("cargo {step} failed");
    }
    Ok(())
}

fn run_fmt() -> Result<()> {
    cargo("fmt", &["fmt", "--all", "--", "--check"], &[])
}

fn run_clippy() -> Result<()> {
    cargo(
        "clippy",
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
        &[],
    )
}

fn run_tests() -> Result<()> {
    cargo("test", &["test", "--workspace"], &[])
}

fn run_gpu_tests() -> Result<()> {
    cargo(
        "gpu test",
        &[
            "test",
            "-p",
            "stereoview-render-wgpu",
            "--test",
            "headless",
        ],
        &[("STEREOVIEW_REQUIRE_GPU", "1")],
    )
}

fn run_doc() -> Result<()> {
    cargo("doc", &["doc", "--workspace", "--no-deps"], &[])
}
