//! CLI module for the ZeroUnit generator
//!
//! ## Commands
//!
//! - `generate <snapshot>` - Generate the harness source for a compilation snapshot
//! - `discover <snapshot>` - List the test methods a snapshot contains
//!
//! ## Modules
//!
//! - `commands` - Command implementations
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

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
    /// User-facing error message (already formatted for display)
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

/// Attribute-free test discovery and harness generation
#[derive(Parser, Debug)]
#[command(name = "zerounit")]
#[command(version = VERSION)]
#[command(about = "Generate a concurrent test harness from a compilation snapshot", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the harness source unit
    Generate {
        /// Compilation snapshot (JSON)
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,
        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE", conflicts_with = "out_dir")]
        output: Option<PathBuf>,
        /// Write `<DIR>/<hint name>`
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
        /// Spaces per indentation level
        #[arg(long, value_name = "N", default_value_t = 4)]
        indent: usize,
        /// Name of the generated source unit
        #[arg(long, value_name = "NAME")]
        hint_name: Option<String>,
    },

    /// List discovered test methods
    Discover {
        /// Compilation snapshot (JSON)
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

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

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Generate {
            snapshot,
            output,
            out_dir,
            indent,
            hint_name,
        } => {
            let destination = match (output, out_dir) {
                (Some(file), _) => commands::Destination::File(file),
                (None, Some(dir)) => commands::Destination::Directory(dir),
                (None, None) => commands::Destination::Stdout,
            };
            commands::generate(&snapshot, destination, indent, hint_name)
        }
        Command::Discover { snapshot } => commands::discover(&snapshot),
    }
}

// ============================================================================
// Tests
// ============================================================================
