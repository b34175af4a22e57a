//! Capability markings: per-(entity, capability) annotation state.
//!
//! Each declaration carries, for every capability, two independent tri-state
//! values: the positive form (`S: Duplicable`) and the inverse form
//! (`S: ~Duplicable`). Both are elaborated once, when the declaration is
//! defined in the [`DeclTable`](crate::decls::DeclTable), and immutable
//! afterward. Resolution is a pure lookup; all derivation happens at
//! definition time.

use vireo_ast::Span;
use vireo_types::{Capability, DeclId, Type};

use crate::decls::{AggregateKind, DeclTable, GenericParamInfo};

/// One tri-state marking value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkingState {
    /// Nothing written and nothing derived.
    None,
    /// Derived by the engine, not user-written.
    Inferred(Span),
    /// User-written in the declaration's inheritance clause.
    Explicit(Span),
}

/// The kind of a marking value, without its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkingKind {
    None,
    Inferred,
    Explicit,
}

impl MarkingState {
    pub fn kind(self) -> MarkingKind {
        match self {
            MarkingState::None => MarkingKind::None,
            MarkingState::Inferred(_) => MarkingKind::Inferred,
            MarkingState::Explicit(_) => MarkingKind::Explicit,
        }
    }

    pub fn span(self) -> Option<Span> {
        match self {
            MarkingState::None => None,
            MarkingState::Inferred(span) | MarkingState::Explicit(span) => Some(span),
        }
    }

    pub fn is_explicit(self) -> bool {
        matches!(self, MarkingState::Explicit(_))
    }
}

/// The positive and inverse marking for one (entity, capability) pair.
///
/// Both being explicit is a user contradiction; the synthesizer diagnoses it
/// and resolves in favor of the explicit positive form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marking {
    pub positive: MarkingState,
    pub inverse: MarkingState,
}

impl Marking {
    pub fn none() -> Self {
        Self {
            positive: MarkingState::None,
            inverse: MarkingState::None,
        }
    }
}

/// Resolve the marking for `(decl, capability)`.
///
/// Pure lookup over the declaration's already-elaborated attributes; no
/// recursion and no diagnostics.
pub fn resolve(decls: &DeclTable, decl: DeclId, capability: Capability) -> Marking {
    *decls.decl(decl).own_marking(capability)
}

// ---------------------------------------------------------------------------
// Definition-time elaboration
// ---------------------------------------------------------------------------

/// Elaborate the marking for one capability while a declaration is being
/// defined. Explicit states come from the inheritance clause; an inferred
/// inverse comes from a shallow may-lack scan over the member types.
pub(crate) fn elaborate(
    decls: &DeclTable,
    kind: AggregateKind,
    inherited: &[vireo_ast::InheritedEntry],
    params: &[GenericParamInfo],
    member_types: &[(Span, Type)],
    capability: Capability,
) -> Marking {
    let mut marking = Marking::none();
    for entry in inherited {
        if entry.name != capability.name() {
            continue;
        }
        let slot = if entry.inverse {
            &mut marking.inverse
        } else {
            &mut marking.positive
        };
        if matches!(*slot, MarkingState::None) {
            *slot = MarkingState::Explicit(entry.span);
        }
    }

    // Classes box their contents and interfaces declare no storage, so
    // neither ever picks up an inferred inverse from members.
    let structural = matches!(kind, AggregateKind::Struct | AggregateKind::Enum);
    if structural
        && matches!(marking.positive, MarkingState::None)
        && matches!(marking.inverse, MarkingState::None)
    {
        for (span, ty) in member_types {
            if may_lack(decls, params, ty, capability) {
                marking.inverse = MarkingState::Inferred(*span);
                break;
            }
        }
    }

    marking
}

/// Whether `ty` may lack `capability` in general: a bare generic parameter
/// without a positive bound, or a member whose declaration carries an
/// explicit or inferred inverse. Consults only declarations already defined;
/// forward and self references are treated as capability-present (the
/// query layer settles those).
fn may_lack(
    decls: &DeclTable,
    params: &[GenericParamInfo],
    ty: &Type,
    capability: Capability,
) -> bool {
    match ty.reference_storage_referent() {
        Type::Param(p) => params
            .get(p.index as usize)
            .is_some_and(|info| !info.bounds.contains(&capability)),
        Type::Nominal { decl, args } => {
            let Some(info) = decls.lookup_defined(*decl) else {
                return false;
            };
            let marking = info.own_marking(capability);
            if marking.positive.is_explicit() {
                return false;
            }
            match marking.inverse {
                MarkingState::Explicit(_) => true,
                MarkingState::Inferred(_) => {
                    if info.generic_params().is_empty() {
                        true
                    } else {
                        args.iter().any(|arg| may_lack(decls, params, arg, capability))
                    }
                }
                MarkingState::None => false,
            }
        }
        Type::Tuple(elems) => elems
            .iter()
            .any(|elem| may_lack(decls, params, elem, capability)),
        Type::PackExpansion(pattern) => may_lack(decls, params, pattern, capability),
        Type::Int | Type::Bool | Type::String | Type::Unit | Type::Error => false,
        // reference_storage_referent already unwrapped these
        Type::WeakStorage(_) | Type::UnownedStorage(_) => unreachable!(),
    }
}
