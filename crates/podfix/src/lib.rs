//! # podfix
//!
//! Command-line tools that keep a Flutter iOS project's CocoaPods wiring
//! intact.
//!
//! ## Overview
//!
//! Xcode sometimes drops the base configurations of the `Runner` target, or
//! a merge mangles `ios/Flutter/*.xcconfig`. `pod install` then warns that
//! it cannot set the base configuration and the build picks up the wrong
//! settings. `podfix` repairs and checks that wiring:
//!
//! - **fix-pods** - Rewrites the include files and links them into the target
//! - **set-bundle-id** - Sets `PRODUCT_BUNDLE_IDENTIFIER` on every configuration
//! - **verify** - Read-only check, non-zero exit on any problem (CI friendly)
//! - **init** - Writes a starter `podfix.toml`
//!
//! ## Quick Start
//!
//! ```bash
//! # From the Flutter project root (where pubspec.yaml lives)
//! podfix fix-pods
//! (cd ios && pod install)
//! podfix verify --json target/podfix-verify.json
//! ```
//!
//! Each command is also installed as a stand-alone binary:
//! `fix-ios-pods`, `ios-set-bundle-id` and `verify-ios-pods`.
//!
//! ## Configuration
//!
//! Paths default to the standard Flutter layout. Projects that differ can
//! record their layout in `podfix.toml`; see [`config`].
//!
//! ## Logging
//!
//! Diagnostics go to stderr through `tracing`. Set `RUST_LOG` or pass `-v`
//! to see them; the reports themselves are always printed to stdout.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use podfix_sdk::{
    IncludeStatus, VerifyReport, link_base_configurations, set_bundle_identifier,
    write_include_files,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

pub mod config;

use config::{CONFIG_FILE_NAME, ConfigResolver, PodfixConfig};

/// Options shared by every command and binary.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Path to podfix.toml (default: discovered from the current directory upward)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FixPodsArgs {
    /// Flutter project root (default: the directory holding podfix.toml, else the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SetBundleIdArgs {
    /// Path to the .xcodeproj bundle (default: from podfix.toml, else ios/Runner.xcodeproj)
    pub project: Option<PathBuf>,

    /// Bundle identifier to set (default: from podfix.toml, else com.sizelove.adhdapp)
    pub bundle_id: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Flutter project root (default: the directory holding podfix.toml, else the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Also write the report as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,
}

/// Repairs and verifies the CocoaPods wiring of a Flutter iOS project.
#[derive(Parser, Debug)]
#[command(name = "podfix", author, version, about = "Flutter iOS CocoaPods wiring repair", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrite Flutter/{Debug,Profile,Release}.xcconfig and set them as the target's base configurations.
    FixPods(FixPodsArgs),
    /// Set PRODUCT_BUNDLE_IDENTIFIER on every build configuration of the target.
    SetBundleId(SetBundleIdArgs),
    /// Check include files, base configurations and Pods support files without changing anything.
    Verify(VerifyArgs),
    /// Write a starter podfix.toml.
    Init {
        #[arg(long, default_value = CONFIG_FILE_NAME)]
        output: PathBuf,
    },
}

/// Entry point of the `podfix` binary.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.common.verbose);

    let result = match cli.command {
        Command::FixPods(args) => fix_pods(&cli.common, &args).map(|()| true),
        Command::SetBundleId(args) => set_bundle_id(&cli.common, &args).map(|()| true),
        Command::Verify(args) => verify(&cli.common, &args),
        Command::Init { output } => init_config(&output).map(|()| true),
    };
    exit_code(result)
}

/// Writes the include files and links them into the target.
pub fn fix_pods(common: &CommonArgs, args: &FixPodsArgs) -> Result<()> {
    let resolver = ConfigResolver::load(common.config.as_deref())?;
    let layout = resolver.layout(args.root.as_deref());

    write_include_files(&layout).context("Failed to write include files")?;
    link_base_configurations(&layout)?;

    println!("✅ iOS Base Configurations fixed. You can now run 'cd ios && pod install'.");
    Ok(())
}

/// Sets the bundle identifier on every configuration of the target.
pub fn set_bundle_id(common: &CommonArgs, args: &SetBundleIdArgs) -> Result<()> {
    let resolver = ConfigResolver::load(common.config.as_deref())?;
    let layout = resolver.layout(None);
    let xcodeproj = args
        .project
        .clone()
        .unwrap_or_else(|| layout.xcodeproj_path());
    let bundle_id = resolver.bundle_id(args.bundle_id.clone());

    set_bundle_identifier(&xcodeproj, &layout.target, &bundle_id)?;

    println!(
        "✅ Set PRODUCT_BUNDLE_IDENTIFIER={bundle_id} for target {} (all configs)",
        layout.target
    );
    Ok(())
}

/// Prints the verification report. Returns whether every check passed.
pub fn verify(common: &CommonArgs, args: &VerifyArgs) -> Result<bool> {
    let resolver = ConfigResolver::load(common.config.as_deref())?;
    let layout = resolver.layout(args.root.as_deref());

    let report = podfix_sdk::verify(&layout)?;
    print!("{}", render_verify_report(&report));

    if let Some(path) = &args.json {
        write_json(path, &report)?;
    }
    Ok(report.passed())
}

/// Writes a starter `podfix.toml` to `output`. Never overwrites.
pub fn init_config(output: &Path) -> Result<()> {
    if output.exists() {
        bail!(
            "{} already exists; remove it or pass --output <path>",
            output.display()
        );
    }
    std::fs::write(output, PodfixConfig::generate_starter_toml())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Wrote {}", output.display());
    Ok(())
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Maps a command result to the process exit status, printing fatal errors.
///
/// `Ok(false)` is a completed run that found problems.
pub fn exit_code(result: Result<bool>) -> ExitCode {
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("❌ {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn render_verify_report(report: &VerifyReport) -> String {
    let mut out = format!("▶ Base Configurations ({} target):\n", report.target);
    for base in &report.base_configurations {
        out.push_str(&format!(
            "  {:<7} -> {}\n",
            base.name,
            base.path.as_deref().unwrap_or("(none)")
        ));
    }

    out.push_str("▶ xcconfig checks:\n");
    for check in &report.include_files {
        let line = match check.status {
            IncludeStatus::Ok => format!("  {}: OK\n", check.path),
            IncludeStatus::Missing => format!("  ⚠ missing {}\n", check.path),
            IncludeStatus::NotCanonical => format!(
                "  {}: ⚠ not canonical (first two lines differ)\n",
                check.path
            ),
        };
        out.push_str(&line);
    }

    out.push_str("▶ Pods support files:\n");
    for file in &report.support_files {
        let status = if file.exists {
            "OK"
        } else {
            "⚠ missing (run: cd ios && pod install)"
        };
        out.push_str(&format!("  {}: {status}\n", file.path));
    }

    if report.passed() {
        out.push_str("✅ verification passed\n");
    }
    out
}

fn write_json(path: &Path, report: &VerifyReport) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let contents = serde_json::to_string_pretty(report)?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
