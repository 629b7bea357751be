//! Harness source generation
//!
//! Turns a resolved host and the discovered candidates into one C# source unit. Generation is a pure function of
//! its inputs: the same host, candidates and configuration always produce the same bytes.
//!
//! ## Modules
//!
//! - `config` - Generator settings
//! - `writer` - Indentation-tracking output buffer
//! - `test_call` - Call fragment for a single test
//! - `run_tests` - Run-all, stub and dispatch routines
//! - `program` - The enclosing source unit

pub mod config;
pub mod program;
pub mod run_tests;
pub mod test_call;
pub mod writer;

pub use config::GeneratorConfig;
pub use program::generate_program;
pub use writer::CodeWriter;
