//! Conformance records and the synthesizer.
//!
//! The synthesizer decides, from marking state alone, whether a declaration
//! gets a conformance record and what shape it takes. It never consults the
//! recursive capability query, so it can run early without request cycles.
//! Decisions (including declines) are memoized per (declaration, capability)
//! and the registry guarantees at most one record and at most one synthetic
//! host context per key.

use std::collections::BTreeMap;

use vireo_diag::{Category, Diagnostic};
use vireo_types::{
    build_generic_signature, Capability, DeclId, GenericSignature, Requirement, Type,
};

use crate::decls::DeclTable;
use crate::marking::{MarkingKind, MarkingState};
use crate::{span_to_loc, EngineError};

/// Identifies a conformance record in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConformanceId(pub u32);

/// Identifies a synthetic extension context in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtensionId(pub u32);

/// Whether the conformance was written by the user or manufactured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConformanceOrigin {
    /// Named in the declaration's inheritance clause.
    Declared,
    /// Manufactured by the synthesizer.
    Synthesized,
}

/// The declaration context owning a conformance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConformanceHost {
    /// The aggregate declaration itself.
    Aggregate,
    /// A synthetic extension generated to carry conditional requirements.
    /// Never shown to the user as hand-written code.
    SyntheticExtension(ExtensionId),
}

/// The registered fact that a declaration satisfies a capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConformanceRecord {
    pub decl: DeclId,
    pub capability: Capability,
    pub origin: ConformanceOrigin,
    /// Conditional requirements; empty means unconditional.
    pub requirements: Vec<Requirement>,
    pub host: ConformanceHost,
}

impl ConformanceRecord {
    pub fn is_conditional(&self) -> bool {
        !self.requirements.is_empty()
    }
}

/// A compiler-generated extension hosting conditional requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticExtension {
    pub decl: DeclId,
    pub signature: GenericSignature,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Pass-wide store of conformance records and synthetic extensions.
///
/// Every key is written at most once; later lookups read the memoized
/// decision.
#[derive(Debug, Default)]
pub struct ConformanceRegistry {
    records: Vec<ConformanceRecord>,
    extensions: Vec<SyntheticExtension>,
    decisions: BTreeMap<(DeclId, Capability), Option<ConformanceId>>,
    /// Extended-type bindings for synthetic extensions, registered up front
    /// so later queries need not re-derive them.
    extended_types: BTreeMap<ExtensionId, Type>,
}

impl ConformanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, id: ConformanceId) -> &ConformanceRecord {
        &self.records[id.0 as usize]
    }

    pub fn extension(&self, id: ExtensionId) -> &SyntheticExtension {
        &self.extensions[id.0 as usize]
    }

    /// The memoized decision for `(decl, capability)`, if one was made.
    pub fn decision(&self, decl: DeclId, capability: Capability) -> Option<Option<ConformanceId>> {
        self.decisions.get(&(decl, capability)).copied()
    }

    /// The visible conformance record for `(decl, capability)`, if any.
    pub fn lookup(&self, decl: DeclId, capability: Capability) -> Option<ConformanceId> {
        self.decisions.get(&(decl, capability)).copied().flatten()
    }

    /// The extended type bound for a synthetic extension.
    pub fn extended_type(&self, ext: ExtensionId) -> Option<&Type> {
        self.extended_types.get(&ext)
    }

    fn add_record(&mut self, record: ConformanceRecord) -> ConformanceId {
        let id = ConformanceId(self.records.len() as u32);
        self.records.push(record);
        id
    }

    fn add_extension(&mut self, ext: SyntheticExtension) -> ExtensionId {
        let id = ExtensionId(self.extensions.len() as u32);
        self.extensions.push(ext);
        id
    }

    fn cache_extended_type(&mut self, ext: ExtensionId, ty: Type) {
        let previous = self.extended_types.insert(ext, ty);
        debug_assert!(previous.is_none(), "extended type bound twice");
    }

    fn decide(&mut self, decl: DeclId, capability: Capability, outcome: Option<ConformanceId>) {
        let previous = self.decisions.insert((decl, capability), outcome);
        debug_assert!(previous.is_none(), "conformance decided twice");
    }
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

/// Decide whether `decl` gets a conformance record for `capability` and
/// manufacture it if so.
///
/// Driven entirely by the declaration's marking state:
/// - explicit positive wins, even over an explicit inverse (which is
///   diagnosed as a contradiction, non-fatally);
/// - an explicit inverse declines synthesis;
/// - an inferred inverse on a generic declaration produces a conditional
///   record requiring every generic parameter to conform, hosted in a
///   synthetic extension; on a non-generic declaration it declines, since
///   some concrete member lacks the capability outright;
/// - no marking at all produces an unconditional record.
///
/// Idempotent: re-invocation returns the memoized outcome.
pub fn synthesize(
    decls: &DeclTable,
    registry: &mut ConformanceRegistry,
    diagnostics: &mut Vec<Diagnostic>,
    decl: DeclId,
    capability: Capability,
) -> Result<Option<ConformanceId>, EngineError> {
    if let Some(previous) = registry.decision(decl, capability) {
        return Ok(previous);
    }

    let info = decls.decl(decl);
    let marking = *info.own_marking(capability);

    let outcome = match marking.positive.kind() {
        MarkingKind::Explicit => {
            if let MarkingState::Explicit(inverse_span) = marking.inverse {
                diagnostics.push(
                    Diagnostic::error(
                        Category::ContradictoryMarking,
                        format!(
                            "{} `{}` cannot be both `{}` and `{}`",
                            info.kind.display(),
                            info.name,
                            capability.name(),
                            capability.inverse_spelling(),
                        ),
                    )
                    .at(span_to_loc(inverse_span))
                    .with_help(format!(
                        "the explicit `{}` takes precedence; remove one of the two",
                        capability.name()
                    )),
                );
            }
            Some(registry.add_record(ConformanceRecord {
                decl,
                capability,
                origin: ConformanceOrigin::Declared,
                requirements: Vec::new(),
                host: ConformanceHost::Aggregate,
            }))
        }

        MarkingKind::Inferred => {
            // The elaborator never infers the positive form of a capability,
            // only its inverse.
            return Err(EngineError::Invariant(format!(
                "inferred positive marking for `{}: {}`",
                info.name,
                capability.name()
            )));
        }

        MarkingKind::None => match marking.inverse.kind() {
            MarkingKind::Explicit => None,

            MarkingKind::Inferred => {
                if info.generic_params().is_empty() {
                    // A concrete member lacks the capability; an
                    // empty-requirement conditional record would vacuously
                    // conform, so decline instead.
                    None
                } else {
                    Some(synthesize_conditional(decls, registry, decl, capability))
                }
            }

            MarkingKind::None => Some(registry.add_record(ConformanceRecord {
                decl,
                capability,
                origin: ConformanceOrigin::Synthesized,
                requirements: Vec::new(),
                host: ConformanceHost::Aggregate,
            })),
        },
    };

    registry.decide(decl, capability, outcome);
    Ok(outcome)
}

/// Build the conditional record: requirements `<T_1: C, ..., T_n: C>` over
/// every generic parameter, hosted in a synthetic extension whose signature
/// extends the declaration's own.
fn synthesize_conditional(
    decls: &DeclTable,
    registry: &mut ConformanceRegistry,
    decl: DeclId,
    capability: Capability,
) -> ConformanceId {
    let base = decls.generic_signature(decl);
    let requirements: Vec<Requirement> = base
        .params
        .iter()
        .map(|param| Requirement {
            param: param.clone(),
            capability,
        })
        .collect();
    let signature = build_generic_signature(&base, requirements.iter().cloned());

    let ext = registry.add_extension(SyntheticExtension { decl, signature });
    // Bind the extension to its extended type now, so later lookups read it
    // instead of re-deriving the binding.
    registry.cache_extended_type(ext, Type::nominal(decl, decls.identity_args(decl)));

    registry.add_record(ConformanceRecord {
        decl,
        capability,
        origin: ConformanceOrigin::Synthesized,
        requirements,
        host: ConformanceHost::SyntheticExtension(ext),
    })
}
