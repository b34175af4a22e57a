//! Capability provenance reports.
//!
//! Answers "why does / doesn't this declaration possess this capability?"
//! with the marking state, the synthesis outcome, conditional requirements,
//! and the first offending member when storage is the reason. The report is
//! serializable so external tooling can expose the engine's reasoning.

use serde::Serialize;

use vireo_types::{Capability, DeclId};

use crate::conformance::{self, ConformanceOrigin};
use crate::marking::{MarkingKind, MarkingState};
use crate::storage;
use crate::{EngineError, Session};

/// Overall outcome for a (declaration, capability) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityStatus {
    /// An unconditional conformance record exists and its storage holds up.
    Possessed,
    /// A conditional record exists; possession depends on the arguments.
    Conditional,
    /// An explicit inverse marking declined the conformance.
    Declined,
    /// No record, or a declared record contradicted by storage.
    StructurallyLacking,
}

/// Marking state without location, for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkingSummary {
    None,
    Inferred,
    Explicit,
}

impl From<MarkingState> for MarkingSummary {
    fn from(state: MarkingState) -> Self {
        match state.kind() {
            MarkingKind::None => MarkingSummary::None,
            MarkingKind::Inferred => MarkingSummary::Inferred,
            MarkingKind::Explicit => MarkingSummary::Explicit,
        }
    }
}

/// Provenance analysis for a single (declaration, capability) pair.
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityProvenance {
    pub entity: String,
    pub capability: String,
    pub status: CapabilityStatus,
    pub positive_marking: MarkingSummary,
    pub inverse_marking: MarkingSummary,
    /// Requirements of a conditional record, rendered `T: Capability`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_requirements: Option<Vec<String>>,
    /// First member whose type prevents the capability, if storage is the
    /// reason possession fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offending_member: Option<String>,
}

/// Build the provenance report for `(decl, capability)`.
pub fn capability_provenance(
    session: &mut Session,
    decl: DeclId,
    capability: Capability,
) -> Result<CapabilityProvenance, EngineError> {
    let info = session.decls.decl(decl);
    let entity = info.name.clone();
    let marking = *info.own_marking(capability);

    let outcome = conformance::synthesize(
        &session.decls,
        &mut session.conformances,
        &mut session.diagnostics,
        decl,
        capability,
    )?;

    let mut conditional_requirements = None;
    let mut offending_member = None;
    let status = match outcome {
        None => {
            if marking.inverse.is_explicit() {
                CapabilityStatus::Declined
            } else {
                offending_member = first_offender_name(session, decl, capability)?;
                CapabilityStatus::StructurallyLacking
            }
        }
        Some(id) => {
            let record = session.conformances.record(id).clone();
            if record.is_conditional() {
                conditional_requirements = Some(
                    record
                        .requirements
                        .iter()
                        .map(|req| format!("{}: {}", req.param.name, req.capability))
                        .collect(),
                );
                CapabilityStatus::Conditional
            } else if record.origin == ConformanceOrigin::Declared {
                // The claim may be contradicted by storage.
                match first_offender_name(session, decl, capability)? {
                    Some(member) => {
                        offending_member = Some(member);
                        CapabilityStatus::StructurallyLacking
                    }
                    None => CapabilityStatus::Possessed,
                }
            } else {
                CapabilityStatus::Possessed
            }
        }
    };

    Ok(CapabilityProvenance {
        entity,
        capability: capability.name().to_string(),
        status,
        positive_marking: marking.positive.into(),
        inverse_marking: marking.inverse.into(),
        conditional_requirements,
        offending_member,
    })
}

fn first_offender_name(
    session: &mut Session,
    decl: DeclId,
    capability: Capability,
) -> Result<Option<String>, EngineError> {
    let args = session.decls.identity_args(decl);
    let sig = session.decls.generic_signature(decl);
    let offender = match storage::find_first_offender(session, decl, &args, &sig, capability, false)
    {
        Ok(offender) => offender,
        // Self-referential storage: report it as the reason without a name.
        Err(EngineError::Cycle { .. }) => None,
        Err(err) => return Err(err),
    };
    Ok(offender.map(|member| member.name))
}
