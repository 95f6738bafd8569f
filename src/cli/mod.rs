//! CLI module for the Hash module resolver
//!
//! ## Commands
//!
//! - `check <file>` - Resolve a module and everything it imports
//! - `deps <file>` - Print modules in load order with their direct imports
//! - `exports <file>` - Print a module's namespace
//!
//! ## Global options
//!
//! - `--root <dir>` - Project root no import may escape (default: current directory)
//! - `--ext <ext>` - Module file extension (default: `hash`)
//! - `--verbose` - Log at `debug` level
//!
//! ## Design
//!
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};

use crate::frontend::resolver::{DEFAULT_EXTENSION, ResolverConfig};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already rendered for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Module resolver for the Hash programming language
#[derive(Parser, Debug)]
#[command(name = "hash")]
#[command(version = VERSION)]
#[command(about = "Resolve and inspect Hash modules", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Project root; imports may not leave it (default: current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Module file extension
    #[arg(long = "ext", global = true, value_name = "EXT", default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalOptions {
    /// Resolver configuration, with a relative `--root` made absolute against `cwd`.
    pub fn resolver_config(&self, cwd: &Path) -> ResolverConfig {
        let root = match &self.root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => cwd.join(root),
            None => cwd.to_path_buf(),
        };
        ResolverConfig::new(root).with_extension(self.extension.as_str())
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a module and everything it imports
    Check {
        /// Entry module
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print modules in load order (dependencies first) with their direct imports
    Deps {
        /// Entry module
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the names a module exports
    Exports {
        /// Module to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called.
pub fn run() {
    let cli = Cli::parse();
    init_tracing(cli.options.verbose);

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Structured logging with an env-based filter, defaulting to `info`. `--verbose` forces `debug`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let cwd = env::current_dir()
        .map_err(|e| CliError::failure(format!("Cannot determine the current directory: {e}")))?;
    let config = cli.options.resolver_config(&cwd);

    // FILE arguments are relative to the working directory, not the project root.
    let mut out = std::io::stdout().lock();
    match cli.command {
        Command::Check { file } => commands::check(&mut out, config, &cwd.join(file)),
        Command::Deps { file } => commands::deps(&mut out, config, &cwd.join(file)),
        Command::Exports { file } => commands::exports(&mut out, config, &cwd.join(file)),
    }
}

// ============================================================================
// Tests
// ============================================================================
