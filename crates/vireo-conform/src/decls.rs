//! The pass-scoped declaration table.
//!
//! Aggregate declarations are registered here once and elaborated at
//! definition time: generic-parameter bounds are resolved against the
//! capability table and capability markings are computed and frozen.
//! Everything downstream (synthesis, queries, diagnostics) reads this table
//! and never mutates a declaration.

use std::collections::{BTreeMap, BTreeSet};

use vireo_ast::{GenericParamDecl, InheritedEntry, ModuleId, Span};
use vireo_types::{
    Capability, DeclId, GenericSignature, ParamRef, Requirement, Type,
};

use crate::marking::{self, Marking};

/// What sort of aggregate a declaration is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    Struct,
    /// Reference type; can box arbitrary content regardless of declared
    /// storage, so it never structurally lacks a capability.
    Class,
    Enum,
    /// Declares no storage of its own.
    Interface,
}

impl AggregateKind {
    pub fn display(self) -> &'static str {
        match self {
            AggregateKind::Struct => "struct",
            AggregateKind::Class => "class",
            AggregateKind::Enum => "enum",
            AggregateKind::Interface => "interface",
        }
    }
}

/// An elaborated generic parameter: declared bounds resolved to capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericParamInfo {
    pub name: String,
    pub span: Span,
    /// Positive capability bounds written on the parameter.
    pub bounds: BTreeSet<Capability>,
    /// Inverse bounds written on the parameter.
    pub inverse_bounds: BTreeSet<Capability>,
}

/// A stored field of a struct or class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub span: Span,
    pub ty: Type,
}

/// One case of an enum. Cases without a payload contribute no storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseInfo {
    pub name: String,
    pub span: Span,
    pub payload: Option<Type>,
}

/// Input form of a declaration, before elaboration.
#[derive(Debug, Clone)]
pub struct AggregateDecl {
    pub name: String,
    pub kind: AggregateKind,
    pub module: ModuleId,
    /// Span of the declaration's name.
    pub span: Span,
    /// Location of the opening brace; fix-it anchor for empty clauses.
    pub braces_start: Span,
    pub inherited: Vec<InheritedEntry>,
    pub generic_params: Vec<GenericParamDecl>,
    pub fields: Vec<FieldInfo>,
    pub cases: Vec<CaseInfo>,
}

impl AggregateDecl {
    /// A bare declaration with no clause, parameters, or members.
    pub fn new(name: impl Into<String>, kind: AggregateKind, module: ModuleId, span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            module,
            span,
            braces_start: span,
            inherited: Vec::new(),
            generic_params: Vec::new(),
            fields: Vec::new(),
            cases: Vec::new(),
        }
    }
}

/// A fully elaborated declaration. Markings are frozen at definition time.
#[derive(Debug, Clone)]
pub struct AggregateInfo {
    pub name: String,
    pub kind: AggregateKind,
    pub module: ModuleId,
    pub span: Span,
    pub braces_start: Span,
    pub inherited: Vec<InheritedEntry>,
    generic_params: Vec<GenericParamInfo>,
    fields: Vec<FieldInfo>,
    cases: Vec<CaseInfo>,
    markings: BTreeMap<Capability, Marking>,
}

impl AggregateInfo {
    /// Stored fields in declaration order (structs and classes).
    pub fn stored_members(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// All enum cases in declaration order.
    pub fn cases(&self) -> &[CaseInfo] {
        &self.cases
    }

    /// Enum cases that carry a payload, in declaration order.
    pub fn cases_with_payload(&self) -> impl Iterator<Item = &CaseInfo> {
        self.cases.iter().filter(|case| case.payload.is_some())
    }

    pub fn generic_params(&self) -> &[GenericParamInfo] {
        &self.generic_params
    }

    /// End of the written inheritance clause, if the clause is non-empty.
    pub fn inheritance_clause_end(&self) -> Option<Span> {
        self.inherited.last().map(|entry| entry.span)
    }

    /// The frozen marking for `capability`.
    pub fn own_marking(&self, capability: Capability) -> &Marking {
        self.markings
            .get(&capability)
            .expect("markings elaborated for every capability")
    }

    pub fn declaring_module(&self) -> ModuleId {
        self.module
    }
}

// ---------------------------------------------------------------------------
// Declaration table
// ---------------------------------------------------------------------------

/// Pass-scoped registry of aggregate declarations.
///
/// Slots can be reserved before definition so member types may refer to the
/// declaration being defined (self-referential storage).
#[derive(Debug, Default)]
pub struct DeclTable {
    slots: Vec<Option<AggregateInfo>>,
}

impl DeclTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an id for a declaration defined later.
    pub fn reserve(&mut self) -> DeclId {
        let id = DeclId(self.slots.len() as u32);
        self.slots.push(None);
        id
    }

    /// Define a previously reserved declaration, elaborating its generic
    /// parameters and capability markings. Markings are immutable afterward.
    pub fn define(&mut self, id: DeclId, decl: AggregateDecl) {
        let slot_index = id.0 as usize;
        assert!(
            self.slots
                .get(slot_index)
                .is_some_and(|slot| slot.is_none()),
            "declaration id {} already defined or never reserved",
            id.0
        );

        let generic_params: Vec<GenericParamInfo> = decl
            .generic_params
            .iter()
            .map(|param| GenericParamInfo {
                name: param.name.node.clone(),
                span: param.name.span,
                bounds: resolve_bound_names(&param.bounds),
                inverse_bounds: resolve_bound_names(&param.inverse_bounds),
            })
            .collect();

        // Member types in declaration order, paired with the span the
        // inferred-inverse marking should point at.
        let mut member_types: Vec<(Span, Type)> = Vec::new();
        match decl.kind {
            AggregateKind::Struct | AggregateKind::Class => {
                for field in &decl.fields {
                    member_types.push((field.span, field.ty.clone()));
                }
            }
            AggregateKind::Enum => {
                for case in &decl.cases {
                    if let Some(payload) = &case.payload {
                        member_types.push((case.span, payload.clone()));
                    }
                }
            }
            AggregateKind::Interface => {}
        }

        let mut markings = BTreeMap::new();
        for capability in Capability::all() {
            let mut marking = marking::elaborate(
                self,
                decl.kind,
                &decl.inherited,
                &generic_params,
                &member_types,
                *capability,
            );
            // A parameter-level inverse bound also marks the aggregate:
            // `G<T: ~Duplicable>` infers `~Duplicable` for `G` itself.
            if matches!(marking.positive, crate::marking::MarkingState::None)
                && matches!(marking.inverse, crate::marking::MarkingState::None)
            {
                if let Some(param) = generic_params
                    .iter()
                    .find(|param| param.inverse_bounds.contains(capability))
                {
                    marking.inverse = crate::marking::MarkingState::Inferred(param.span);
                }
            }
            markings.insert(*capability, marking);
        }

        self.slots[slot_index] = Some(AggregateInfo {
            name: decl.name,
            kind: decl.kind,
            module: decl.module,
            span: decl.span,
            braces_start: decl.braces_start,
            inherited: decl.inherited,
            generic_params,
            fields: decl.fields,
            cases: decl.cases,
            markings,
        });
    }

    /// Reserve and define in one step, for declarations that do not refer
    /// to themselves.
    pub fn insert(&mut self, decl: AggregateDecl) -> DeclId {
        let id = self.reserve();
        self.define(id, decl);
        id
    }

    pub fn decl(&self, id: DeclId) -> &AggregateInfo {
        self.slots
            .get(id.0 as usize)
            .and_then(|slot| slot.as_ref())
            .expect("declaration id refers to a defined declaration")
    }

    /// Lookup that tolerates reserved-but-undefined slots.
    pub(crate) fn lookup_defined(&self, id: DeclId) -> Option<&AggregateInfo> {
        self.slots.get(id.0 as usize).and_then(|slot| slot.as_ref())
    }

    /// A [`ParamRef`] for the given parameter of `decl`.
    pub fn param_ref(&self, decl: DeclId, index: usize) -> ParamRef {
        let info = self.decl(decl);
        ParamRef {
            owner: decl,
            index: index as u32,
            name: info.generic_params[index].name.clone(),
        }
    }

    /// Identity type arguments for `decl`: each parameter as itself.
    pub fn identity_args(&self, decl: DeclId) -> Vec<Type> {
        (0..self.decl(decl).generic_params().len())
            .map(|index| Type::Param(self.param_ref(decl, index)))
            .collect()
    }

    /// The declaration's inherent generic signature: its parameters plus
    /// requirements from written positive bounds.
    pub fn generic_signature(&self, decl: DeclId) -> GenericSignature {
        let info = self.decl(decl);
        let params: Vec<ParamRef> = (0..info.generic_params().len())
            .map(|index| self.param_ref(decl, index))
            .collect();
        let mut sig = GenericSignature::new(params.clone());
        for (index, param) in info.generic_params().iter().enumerate() {
            for capability in &param.bounds {
                sig.requirements.push(Requirement {
                    param: params[index].clone(),
                    capability: *capability,
                });
            }
        }
        sig
    }
}

/// Resolve written bound names against the capability table. Names that do
/// not name a capability are ordinary interface bounds and play no part in
/// capability checking.
fn resolve_bound_names(names: &[vireo_ast::Spanned<String>]) -> BTreeSet<Capability> {
    names
        .iter()
        .filter_map(|name| Capability::from_name(&name.node))
        .collect()
}
