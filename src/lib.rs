#![forbid(unsafe_code)]
//! ZeroUnit harness generator
//!
//! ZeroUnit finds test methods in a host program without attributes or reflection and generates the program that
//! runs them. Discovery works on a static-analysis snapshot of the host ([`model::Compilation`]); emission produces a
//! single C# source unit whose harness runs every test concurrently, streams progress, and exits with the number of
//! failed tests.
//!
//! ```text
//! SemanticModel ──► discovery::discover ──► Vec<CandidateMethod> ─┐
//!               └─► discovery::resolve_host ──► HostProgram ──────┴─► codegen::generate_program ──► String
//! ```
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Semantic models**: identifiers are trusted. A [`model::Compilation`] loaded through
//!   [`model::Compilation::from_json`] has been validated; a hand-built one from [`model::CompilationBuilder`] is
//!   valid by construction.

pub mod cli;
pub mod codegen;
pub mod discovery;
pub mod generator;
pub mod model;

pub use codegen::{GeneratorConfig, generate_program};
pub use discovery::{CandidateMethod, HostProgram, QualifiedName, discover, resolve_host};
pub use generator::{GeneratedSource, Generator};
pub use model::{Compilation, CompilationBuilder, SemanticModel, SnapshotError};
