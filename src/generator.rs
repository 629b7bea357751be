//! Generation pipeline
//!
//! One pass: resolve the host, discover candidates, assemble the source unit. The two halves sit behind traits so
//! embedders can swap discovery (e.g. a cached symbol index) or emission (e.g. a dry run that only reports counts)
//! without touching the other.

use tracing::{debug, info};

use crate::codegen::{GeneratorConfig, generate_program};
use crate::discovery::{self, CandidateMethod, HostProgram};
use crate::model::SemanticModel;

// ============================================================================
// Discovery interface
// ============================================================================

/// Decide which methods are tests and where the harness lives.
pub trait TestDiscovery {
    /// Candidates in dispatch order; indices contiguous from zero.
    fn discover(&self, model: &dyn SemanticModel) -> Vec<CandidateMethod>;

    fn resolve_host(&self, model: &dyn SemanticModel) -> HostProgram;
}

/// Eligibility gates over declaration order.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTestDiscovery;

impl TestDiscovery for DefaultTestDiscovery {
    fn discover(&self, model: &dyn SemanticModel) -> Vec<CandidateMethod> {
        discovery::discover(model)
    }

    fn resolve_host(&self, model: &dyn SemanticModel) -> HostProgram {
        discovery::resolve_host(model)
    }
}

// ============================================================================
// Harness generator interface
// ============================================================================

/// Turn a host and its candidates into source text.
pub trait HarnessGenerator {
    fn generate_harness(
        &self,
        host: &HostProgram,
        candidates: &[CandidateMethod],
        config: &GeneratorConfig,
    ) -> String;
}

/// C# harness emission.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHarnessGenerator;

impl HarnessGenerator for DefaultHarnessGenerator {
    fn generate_harness(
        &self,
        host: &HostProgram,
        candidates: &[CandidateMethod],
        config: &GeneratorConfig,
    ) -> String {
        generate_program(host, candidates, config)
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// A generated source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    pub hint_name: String,
    pub text: String,
}

impl GeneratedSource {
    /// True when the host's startup routine cannot be extended.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Runs discovery and emission with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Generator<D = DefaultTestDiscovery, H = DefaultHarnessGenerator> {
    config: GeneratorConfig,
    discovery: D,
    harness: H,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            discovery: DefaultTestDiscovery,
            harness: DefaultHarnessGenerator,
        }
    }
}

impl<D: TestDiscovery, H: HarnessGenerator> Generator<D, H> {
    pub fn with_discovery<D2: TestDiscovery>(self, discovery: D2) -> Generator<D2, H> {
        Generator {
            config: self.config,
            discovery,
            harness: self.harness,
        }
    }

    pub fn with_harness<H2: HarnessGenerator>(self, harness: H2) -> Generator<D, H2> {
        Generator {
            config: self.config,
            discovery: self.discovery,
            harness,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Discovered candidates without generating anything.
    pub fn candidates(&self, model: &dyn SemanticModel) -> Vec<CandidateMethod> {
        self.discovery.discover(model)
    }

    /// Run a full pass over `model`.
    pub fn generate(&self, model: &dyn SemanticModel) -> GeneratedSource {
        let host = self.discovery.resolve_host(model);
        // Skip discovery when nothing will be emitted.
        let candidates = match host {
            HostProgram::NotPartial => Vec::new(),
            HostProgram::Synthesized | HostProgram::Reopened(_) => self.discovery.discover(model),
        };
        debug!(host = ?host, candidates = candidates.len(), "generating harness");

        let text = self.harness.generate_harness(&host, &candidates, &self.config);
        info!(hint_name = %self.config.hint_name, tests = candidates.len(), bytes = text.len(), "generated harness");

        GeneratedSource {
            hint_name: self.config.hint_name.clone(),
            text,
        }
    }
}
