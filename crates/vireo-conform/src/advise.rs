//! The diagnostic advisor: fix-its and provenance notes for containment
//! failures.
//!
//! When a stored member prevents a capability, the advisor produces the
//! universal suggestion first — add the inverse marking to the enclosing
//! declaration, as a mechanical fix-it — and then at most one best-effort
//! note explaining where the offending type's incapability comes from.

use vireo_diag::{Category, Diagnostic};
use vireo_types::{Capability, DeclId, Type};

use crate::decls::DeclTable;
use crate::marking::MarkingState;
use crate::span_to_loc;

/// Build the advisor output for a containment failure: the primary fix-it
/// diagnostic on the enclosing declaration, then any secondary note.
pub fn advise(
    decls: &DeclTable,
    enclosing: DeclId,
    offending: &Type,
    capability: Capability,
) -> Vec<Diagnostic> {
    let mut out = vec![add_inverse_fixit(decls, enclosing, capability)];
    if let Some(note) = provenance_note(decls, enclosing, offending, capability) {
        out.push(note);
    }
    out
}

/// The universal suggestion: make the enclosing declaration non-conforming
/// by adding the capability's inverse to its inheritance clause.
///
/// An empty clause gets `": ~C"` inserted at the opening brace; a non-empty
/// clause gets `", ~C"` appended right after its last entry.
fn add_inverse_fixit(decls: &DeclTable, enclosing: DeclId, capability: Capability) -> Diagnostic {
    let info = decls.decl(enclosing);
    let diag = Diagnostic::note(
        Category::CapabilityViolation,
        format!(
            "consider making {} `{}` non-{} by adding `{}`",
            info.kind.display(),
            info.name,
            capability.name(),
            capability.inverse_spelling(),
        ),
    )
    .at(span_to_loc(info.span));

    match info.inheritance_clause_end() {
        None => diag.with_insert(
            span_to_loc(info.braces_start),
            format!(": {}", capability.inverse_spelling()),
        ),
        Some(end) => diag.with_insert_after(
            span_to_loc(end),
            format!(", {}", capability.inverse_spelling()),
        ),
    }
}

/// At most one secondary note. A generic parameter declared in the same
/// module gets a note at its declaration; otherwise a nominal with a known
/// source location gets a note distinguishing an explicit inverse marking
/// from an inferred one. One level deep only; never recurses.
fn provenance_note(
    decls: &DeclTable,
    enclosing: DeclId,
    offending: &Type,
    capability: Capability,
) -> Option<Diagnostic> {
    let enclosing_module = decls.decl(enclosing).declaring_module();

    match offending.reference_storage_referent() {
        Type::Param(param) => {
            let owner = decls.decl(param.owner);
            if owner.declaring_module() != enclosing_module {
                return None;
            }
            let param_info = owner.generic_params().get(param.index as usize)?;
            Some(
                Diagnostic::note(
                    Category::ParameterPreventsCapability,
                    format!(
                        "generic parameter `{}` is not required to be `{}` here",
                        param.name,
                        capability.name(),
                    ),
                )
                .at(span_to_loc(param_info.span))
                .with_help(format!(
                    "add the requirement `{}: {}` to allow the conformance",
                    param.name,
                    capability.name()
                )),
            )
        }

        Type::Nominal { decl, .. } => {
            let info = decls.decl(*decl);
            if info.span.is_synthetic() {
                return None;
            }
            match info.own_marking(capability).inverse {
                MarkingState::Explicit(span) => Some(
                    Diagnostic::note(
                        Category::MemberPreventsCapability,
                        format!(
                            "`{}` is explicitly declared `{}` here",
                            info.name,
                            capability.inverse_spelling(),
                        ),
                    )
                    .at(span_to_loc(span)),
                ),
                MarkingState::Inferred(span) => Some(
                    Diagnostic::note(
                        Category::MemberPreventsCapability,
                        format!(
                            "`{}` cannot be `{}` because of its own storage",
                            info.name,
                            capability.name(),
                        ),
                    )
                    .at(span_to_loc(span)),
                ),
                // The type became non-conforming through a declared-but-
                // invalid conformance; nothing useful to point at.
                MarkingState::None => None,
            }
        }

        _ => None,
    }
}
