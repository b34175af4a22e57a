//! Walking an aggregate's instance storage.
//!
//! The walk visits stored fields (structs, classes) or case payloads
//! (enums) strictly in declaration order, substituting type arguments and
//! stripping reference-storage wrappers, and stops at the first member the
//! callback claims. Capability checking builds on the walk:
//! [`violates_capability`] finds the first member lacking a capability and,
//! when diagnosing, reports exactly that member and nothing after it.

use vireo_ast::Span;
use vireo_diag::{Category, Diagnostic};
use vireo_types::{Capability, DeclId, GenericSignature, Type};

use crate::advise;
use crate::conformance::{self, ConformanceId};
use crate::decls::{AggregateKind, CaseInfo, DeclTable, FieldInfo};
use crate::query;
use crate::{span_to_loc, EngineError, Session};

/// Callback interface for the storage walk. Each method returns `true` to
/// stop the walk at that member.
pub trait StorageVisitor {
    /// A stored field, with its substituted, wrapper-stripped type.
    fn on_field(&mut self, field: &FieldInfo, ty: &Type) -> bool;

    /// An enum case payload, with its substituted type.
    fn on_payload(&mut self, case: &CaseInfo, ty: &Type) -> bool;
}

/// Visit the instance storage of `decl` as seen through the given type
/// arguments. Returns `true` iff the visitor stopped the walk.
pub fn visit_storage(
    decls: &DeclTable,
    decl: DeclId,
    args: &[Type],
    visitor: &mut dyn StorageVisitor,
) -> bool {
    let info = decls.decl(decl);
    match info.kind {
        AggregateKind::Struct | AggregateKind::Class => {
            for field in info.stored_members() {
                let ty = field
                    .ty
                    .substitute(decl, args)
                    .reference_storage_referent()
                    .clone();
                if visitor.on_field(field, &ty) {
                    return true;
                }
            }
            false
        }
        AggregateKind::Enum => {
            for case in info.cases() {
                let Some(payload) = &case.payload else {
                    continue;
                };
                let ty = payload.substitute(decl, args);
                if visitor.on_payload(case, &ty) {
                    return true;
                }
            }
            false
        }
        AggregateKind::Interface => false,
    }
}

/// A member produced by the walk, with enough identity for diagnostics.
#[derive(Debug, Clone)]
pub(crate) struct Member {
    pub name: String,
    pub span: Span,
    pub ty: Type,
    /// Whether this is an enum case payload rather than a stored field.
    pub is_payload: bool,
}

struct CollectMembers {
    out: Vec<Member>,
}

impl StorageVisitor for CollectMembers {
    fn on_field(&mut self, field: &FieldInfo, ty: &Type) -> bool {
        self.out.push(Member {
            name: field.name.clone(),
            span: field.span,
            ty: ty.clone(),
            is_payload: false,
        });
        false
    }

    fn on_payload(&mut self, case: &CaseInfo, ty: &Type) -> bool {
        self.out.push(Member {
            name: case.name.clone(),
            span: case.span,
            ty: ty.clone(),
            is_payload: true,
        });
        false
    }
}

fn collect_members(decls: &DeclTable, decl: DeclId, args: &[Type]) -> Vec<Member> {
    let mut collector = CollectMembers { out: Vec::new() };
    visit_storage(decls, decl, args, &mut collector);
    collector.out
}

// ---------------------------------------------------------------------------
// Capability checking over storage
// ---------------------------------------------------------------------------

/// Whether `decl`, seen through `args` under the context signature `sig`,
/// structurally lacks `capability`.
///
/// Classes can box arbitrary content and interfaces declare no storage, so
/// both always return `false`. Members whose type carries an error
/// placeholder are treated as capability-present. When `diagnose` is set,
/// the first offending member (and only the first) is reported, together
/// with the advisor's fix-it and notes. A cycle encountered while checking a
/// member aborts only that member's query; the member is conservatively
/// treated as lacking the capability.
pub fn violates_capability(
    session: &mut Session,
    decl: DeclId,
    args: &[Type],
    sig: &GenericSignature,
    capability: Capability,
    diagnose: bool,
) -> Result<bool, EngineError> {
    Ok(find_first_offender(session, decl, args, sig, capability, diagnose)?.is_some())
}

/// The first member of `decl` lacking `capability`, if any.
pub(crate) fn find_first_offender(
    session: &mut Session,
    decl: DeclId,
    args: &[Type],
    sig: &GenericSignature,
    capability: Capability,
    diagnose: bool,
) -> Result<Option<Member>, EngineError> {
    let info = session.decls.decl(decl);
    if matches!(info.kind, AggregateKind::Class | AggregateKind::Interface) {
        return Ok(None);
    }

    for member in collect_members(&session.decls, decl, args) {
        if member.ty.has_error() {
            continue;
        }

        let lacks = match lacks_in_context(session, &member.ty, sig, capability) {
            Ok(lacks) => lacks,
            // Conservative: a member we cannot decide is assumed to lack
            // the capability, but only when we are here to report it.
            Err(EngineError::Cycle { .. }) if diagnose => true,
            Err(err) => return Err(err),
        };
        if !lacks {
            continue;
        }

        if diagnose {
            let info = session.decls.decl(decl);
            let member_kind = if member.is_payload {
                "associated value of enum case"
            } else {
                "stored property"
            };
            session.diagnostics.push(
                Diagnostic::error(
                    Category::CapabilityViolation,
                    format!(
                        "{member_kind} `{}` of {} `{}` has non-{} type `{}`",
                        member.name,
                        info.kind.display(),
                        info.name,
                        capability.name(),
                        member.ty,
                    ),
                )
                .at(span_to_loc(member.span)),
            );
            let advice = advise::advise(&session.decls, decl, &member.ty, capability);
            session.diagnostics.extend(advice);
        }
        return Ok(Some(member));
    }

    Ok(None)
}

/// Whether `ty` lacks `capability` in a possibly-generic context.
///
/// Generic parameters are decided against the context signature and their
/// declared bounds; fully concrete types go through the memoized query;
/// partially substituted nominals are decided by their conformance record's
/// requirements.
pub(crate) fn lacks_in_context(
    session: &mut Session,
    ty: &Type,
    sig: &GenericSignature,
    capability: Capability,
) -> Result<bool, EngineError> {
    let ty = ty.reference_storage_referent();
    if !ty.has_type_parameter() {
        return query::lacks_capability(session, ty, capability);
    }

    match ty {
        Type::PackExpansion(pattern) => lacks_in_context(session, pattern, sig, capability),

        Type::Param(param) => {
            let owner = session.decls.decl(param.owner);
            let bounded = owner
                .generic_params()
                .get(param.index as usize)
                .is_some_and(|info| info.bounds.contains(&capability));
            Ok(!(bounded || sig.requires(param, capability)))
        }

        Type::Nominal { decl, args } => {
            let Some(id) = conformance::synthesize(
                &session.decls,
                &mut session.conformances,
                &mut session.diagnostics,
                *decl,
                capability,
            )?
            else {
                return Ok(true);
            };
            let record = session.conformances.record(id).clone();
            for req in &record.requirements {
                let arg = args
                    .get(req.param.index as usize)
                    .cloned()
                    .unwrap_or(Type::Error);
                if lacks_in_context(session, &arg, sig, req.capability)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }

        Type::Tuple(elems) => {
            for elem in elems {
                if lacks_in_context(session, elem, sig, capability)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }

        // has_type_parameter() is false for all of these.
        Type::Int
        | Type::Bool
        | Type::String
        | Type::Unit
        | Type::Error
        | Type::WeakStorage(_)
        | Type::UnownedStorage(_) => unreachable!("concrete types handled above"),
    }
}

/// Validate a conformance record structurally, diagnosing the first
/// offending member if the entity's storage does not support the claim.
///
/// Returns `true` iff the conformance is valid.
pub fn check_capability_conformance(
    session: &mut Session,
    id: ConformanceId,
) -> Result<bool, EngineError> {
    let record = session.conformances.record(id).clone();
    let args = session.decls.identity_args(record.decl);
    let base = session.decls.generic_signature(record.decl);
    let sig = vireo_types::build_generic_signature(&base, record.requirements.iter().cloned());
    let violates = violates_capability(
        session,
        record.decl,
        &args,
        &sig,
        record.capability,
        true,
    )?;
    Ok(!violates)
}
