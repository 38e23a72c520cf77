//! Utility element compiler CLI
//!
//! Compiles a serialized compilation unit and prints its rows.
//!
//! # Usage
//!
//! ```bash
//! # Compile a unit written as YAML
//! utilc compile bundle.yaml
//!
//! # Target x64 with a config file
//! utilc compile bundle.json --platform x64 --config utilc.yaml
//! ```
//!
//! Rows go to stdout as JSON, diagnostics to stderr. The exit code is non-zero
//! when any error was reported.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use setup_util_compiler::markup_types::CompilationUnit;
use setup_util_compiler::{CompilerConfig, Platform, UnitCompiler};

#[derive(Parser)]
#[command(name = "utilc")]
#[command(version)]
#[command(about = "Compile utility search and permission markup into linker rows")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile one serialized compilation unit (.yaml, .yml or .json)
    Compile {
        /// Unit file
        unit: PathBuf,

        /// Compiler configuration (YAML); defaults to the file named by UTILC_CONFIG
        #[arg(long)]
        config: Option<PathBuf>,

        /// Target platform: x86, x64, arm, arm64
        #[arg(long)]
        platform: Option<Platform>,

        /// Treat warnings as errors
        #[arg(long)]
        warnings_as_errors: bool,
    },
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compile {
            unit,
            config,
            platform,
            warnings_as_errors,
        } => cmd_compile(&unit, config.as_deref(), platform, warnings_as_errors),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Returns whether the unit compiled without errors.
fn cmd_compile(
    unit_path: &Path,
    config_path: Option<&Path>,
    platform: Option<Platform>,
    warnings_as_errors: bool,
) -> Result<bool> {
    let mut config = match config_path {
        Some(path) => CompilerConfig::load(path)?,
        None => CompilerConfig::from_env()?,
    };
    if let Some(platform) = platform {
        config.platform = platform;
    }
    config.warnings_as_errors |= warnings_as_errors;

    let unit = load_unit(unit_path)?;
    let compiled = UnitCompiler::new(config)
        .compile(&unit)
        .with_context(|| format!("Failed to compile {}", unit_path.display()))?;

    for diagnostic in &compiled.diagnostics {
        eprintln!("{}", diagnostic);
    }

    let json = serde_json::to_string_pretty(&compiled.to_wire())?;
    println!("{}", json);

    Ok(compiled.is_success())
}

fn load_unit(path: &Path) -> Result<CompilationUnit> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let unit = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?
    };
    Ok(unit)
}
