//! Capability inference and conformance synthesis for Vireo.
//!
//! Given an aggregate declaration (struct, class, enum, possibly generic),
//! this crate decides whether the type structurally possesses a named
//! capability by inspecting its stored members, honors explicit opt-in and
//! opt-out markings, synthesizes unconditional or conditional conformance
//! records, and produces location-aware diagnostics with fix-it edits when
//! a claim conflicts with storage.
//!
//! The pieces, leaf first:
//! - [`marking`]: tri-state positive/inverse annotation state, frozen at
//!   declaration definition.
//! - [`conformance`]: the synthesizer and the pass-wide record registry.
//! - [`storage`]: the member walk and structural validation.
//! - [`query`]: the memoized, cycle-detecting "lacks capability?" query.
//! - [`advise`]: fix-its and provenance notes for containment failures.
//! - [`provenance`]: serializable "why (not)?" reports.
//!
//! Evaluation is single-threaded and synchronous; the caches and registries
//! are pass-scoped, owned by the [`Session`], and written at most once per
//! key.

pub mod advise;
pub mod conformance;
pub mod decls;
pub mod marking;
pub mod provenance;
pub mod query;
pub mod storage;

use vireo_ast::Span;
use vireo_types::{Capability, DeclId, Type};

// Re-export for convenience.
pub use vireo_diag::{Category, DiagLabel, Diagnostic, FixIt, FixItPlacement, Severity, SourceLocation};

pub use conformance::{
    ConformanceHost, ConformanceId, ConformanceOrigin, ConformanceRecord, ConformanceRegistry,
    ExtensionId, SyntheticExtension,
};
pub use decls::{AggregateDecl, AggregateInfo, AggregateKind, CaseInfo, DeclTable, FieldInfo};
pub use marking::{Marking, MarkingKind, MarkingState};
pub use provenance::{CapabilityProvenance, CapabilityStatus};
pub use query::{QueryCache, QueryStats};
pub use storage::StorageVisitor;

/// Failures internal to the engine. None of these are user diagnostics:
/// contract violations indicate an engine bug in the caller; cycles are
/// reported to the immediate caller, which treats the queried type
/// conservatively.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The capability query was invoked on a type that still contains
    /// unresolved generic parameters; the caller forgot to substitute into
    /// a concrete context first.
    #[error("capability query on `{ty}`, which still contains unresolved generic parameters")]
    UnresolvedParameter { ty: String },

    /// A capability query re-entered itself.
    #[error("cycle while deciding whether `{ty}` lacks `{capability}`")]
    Cycle { ty: String, capability: Capability },

    /// An unreachable state was reached; an engine bug.
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

impl EngineError {
    pub fn is_cycle(&self) -> bool {
        matches!(self, EngineError::Cycle { .. })
    }
}

pub(crate) fn span_to_loc(span: Span) -> SourceLocation {
    SourceLocation {
        file_id: span.file.0,
        start: span.start,
        end: span.end,
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Pass-scoped state: the declaration table, the conformance registry, the
/// query cache, and the diagnostic sink. All mutation of the shared
/// registries flows through the methods here (or the module functions they
/// delegate to), each of which writes any given key at most once.
#[derive(Debug, Default)]
pub struct Session {
    pub decls: DeclTable,
    pub conformances: ConformanceRegistry,
    pub cache: QueryCache,
    pub diagnostics: Vec<Diagnostic>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide and manufacture the conformance record for
    /// `(decl, capability)`. Idempotent. See [`conformance::synthesize`].
    pub fn synthesize_conformance(
        &mut self,
        decl: DeclId,
        capability: Capability,
    ) -> Result<Option<ConformanceId>, EngineError> {
        conformance::synthesize(
            &self.decls,
            &mut self.conformances,
            &mut self.diagnostics,
            decl,
            capability,
        )
    }

    /// Whether the concrete `ty` lacks `capability`. See
    /// [`query::lacks_capability`] for the contract.
    pub fn lacks_capability(
        &mut self,
        ty: &Type,
        capability: Capability,
    ) -> Result<bool, EngineError> {
        query::lacks_capability(self, ty, capability)
    }

    /// Validate a conformance record against the entity's storage,
    /// diagnosing the first offending member. Returns `true` iff valid.
    pub fn check_conformance(&mut self, id: ConformanceId) -> Result<bool, EngineError> {
        storage::check_capability_conformance(self, id)
    }

    /// The marking resolver: the frozen positive/inverse state for
    /// `(decl, capability)`.
    pub fn resolve_marking(&self, decl: DeclId, capability: Capability) -> Marking {
        marking::resolve(&self.decls, decl, capability)
    }

    /// Build a provenance report for `(decl, capability)`.
    pub fn capability_provenance(
        &mut self,
        decl: DeclId,
        capability: Capability,
    ) -> Result<CapabilityProvenance, EngineError> {
        provenance::capability_provenance(self, decl, capability)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == Severity::Error)
    }
}

#[cfg(test)]
mod conform_tests;


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
