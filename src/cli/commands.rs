//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::codegen::GeneratorConfig;
use crate::discovery::{CandidateMethod, Completion, Invocation};
use crate::generator::{GeneratedSource, Generator};
use crate::model::Compilation;

use super::{CliError, CliResult, ExitCode};

/// Maximum snapshot size (100 MB)
///
/// Larger snapshots are rejected before reading.
const MAX_SNAPSHOT_SIZE: u64 = 100 * 1024 * 1024;

/// Where `generate` writes its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
    /// `<dir>/<hint name>`
    Directory(PathBuf),
}

// ============================================================================
// Snapshot loading
// ============================================================================

/// Read a snapshot file into a string.
///
/// Returns an error if the file cannot be accessed or exceeds `MAX_SNAPSHOT_SIZE`.
pub fn read_snapshot(path: &Path) -> CliResult<String> {
    let metadata = fs::metadata(path)
        .map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", path.display(), e)))?;

    if metadata.len() > MAX_SNAPSHOT_SIZE {
        return Err(CliError::failure(format!(
            "Snapshot '{}' is too large ({} bytes, max {} bytes)",
            path.display(),
            metadata.len(),
            MAX_SNAPSHOT_SIZE
        )));
    }

    fs::read_to_string(path).map_err(|e| CliError::failure(format!("Error reading file '{}': {}", path.display(), e)))
}

/// Read and validate a compilation snapshot. Invalid snapshots are rendered as diagnostics.
pub fn load_compilation(path: &Path) -> CliResult<Compilation> {
    let text = read_snapshot(path)?;
    Compilation::from_json(&path.display().to_string(), &text)
        .map_err(|err| CliError::failure(format!("{:?}", miette::Report::new(err))))
}

// ============================================================================
// Commands
// ============================================================================

/// Generate the harness source for a snapshot.
pub fn generate(
    snapshot: &Path,
    destination: Destination,
    indent: usize,
    hint_name: Option<String>,
) -> CliResult<ExitCode> {
    let compilation = load_compilation(snapshot)?;

    let mut config = GeneratorConfig::new().with_indent_width(indent);
    if let Some(name) = hint_name {
        config = config.with_hint_name(name);
    }

    let source = Generator::new(config).generate(&compilation);
    if source.is_empty() {
        warn!(
            "startup routine is declared in a non-partial type; {} is empty",
            source.hint_name
        );
    }

    write_source(&source, destination)?;
    Ok(ExitCode::SUCCESS)
}

fn write_source(source: &GeneratedSource, destination: Destination) -> CliResult<()> {
    let path = match destination {
        Destination::Stdout => {
            let mut stdout = io::stdout().lock();
            return stdout
                .write_all(source.text.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|e| CliError::failure(format!("Error writing to stdout: {}", e)));
        }
        Destination::File(path) => path,
        Destination::Directory(dir) => {
            fs::create_dir_all(&dir)
                .map_err(|e| CliError::failure(format!("Error creating directory '{}': {}", dir.display(), e)))?;
            dir.join(&source.hint_name)
        }
    };

    fs::write(&path, &source.text)
        .map_err(|e| CliError::failure(format!("Error writing file '{}': {}", path.display(), e)))?;
    info!("wrote {}", path.display());
    Ok(())
}

/// List the tests a snapshot contains, one per line.
pub fn discover(snapshot: &Path) -> CliResult<ExitCode> {
    let compilation = load_compilation(snapshot)?;
    let candidates = Generator::new(GeneratorConfig::default()).candidates(&compilation);

    let mut stdout = io::stdout().lock();
    for candidate in &candidates {
        writeln!(stdout, "{}", describe_candidate(candidate))
            .map_err(|e| CliError::failure(format!("Error writing to stdout: {}", e)))?;
    }
    info!("{} test method(s) discovered", candidates.len());
    Ok(ExitCode::SUCCESS)
}

/// `{index} {label} [{static|instance}, {sync|async}{, disposable}]`
pub fn describe_candidate(candidate: &CandidateMethod) -> String {
    let invocation = match candidate.invocation {
        Invocation::Static => "static",
        Invocation::Instance => "instance",
    };
    let completion = match candidate.completion {
        Completion::FireAndForget => "sync",
        Completion::Awaitable => "async",
    };
    let disposable = if candidate.disposes_fixture() { ", disposable" } else { "" };
    format!(
        "{} {} [{}, {}{}]",
        candidate.index, candidate.label, invocation, completion, disposable
    )
}
