//! Semantic type representations for Vireo.
//!
//! This crate defines the types the conformance engine reasons about. These
//! are distinct from the written annotations in `vireo-ast`: a semantic type
//! is fully resolved except for generic parameters, which remain opaque
//! variables until a concrete context substitutes them away.

use std::fmt;

pub mod capability;

pub use capability::{Capability, CapabilityDescriptor};

/// Unique identifier for an aggregate declaration in the session's
/// declaration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

/// A reference to a generic parameter of an aggregate declaration.
///
/// `owner` is the declaration that introduced the parameter and `index` its
/// position in that declaration's parameter list. The name is carried for
/// display only; identity is `(owner, index)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamRef {
    pub owner: DeclId,
    pub index: u32,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Type {
    // -- Primitives --
    Int,
    Bool,
    String,
    Unit,

    // -- Aggregates --
    /// A nominal aggregate applied to type arguments: `Pair<Int, T>`.
    Nominal { decl: DeclId, args: Vec<Type> },

    /// An unresolved generic parameter (interface type).
    Param(ParamRef),

    /// Fixed-size product of types.
    Tuple(Vec<Type>),

    // -- Reference storage wrappers --
    /// `weak` indirection; the referent carries the capability question.
    WeakStorage(Box<Type>),
    /// `unowned` indirection; the referent carries the capability question.
    UnownedStorage(Box<Type>),

    /// A variadic pack expansion (`repeat T`); queried via its pattern.
    PackExpansion(Box<Type>),

    /// Placeholder left behind by earlier resolution failures. Treated as
    /// possessing every capability so one error does not cascade.
    Error,
}

impl Type {
    pub fn nominal(decl: DeclId, args: Vec<Type>) -> Self {
        Type::Nominal { decl, args }
    }

    pub fn param(owner: DeclId, index: u32, name: impl Into<String>) -> Self {
        Type::Param(ParamRef {
            owner,
            index,
            name: name.into(),
        })
    }

    /// Whether this type still contains unresolved generic parameters.
    pub fn has_type_parameter(&self) -> bool {
        match self {
            Type::Param(_) => true,
            Type::Nominal { args, .. } => args.iter().any(Type::has_type_parameter),
            Type::Tuple(elems) => elems.iter().any(Type::has_type_parameter),
            Type::WeakStorage(inner)
            | Type::UnownedStorage(inner)
            | Type::PackExpansion(inner) => inner.has_type_parameter(),
            Type::Int | Type::Bool | Type::String | Type::Unit | Type::Error => false,
        }
    }

    /// Whether this type contains an error placeholder anywhere.
    pub fn has_error(&self) -> bool {
        match self {
            Type::Error => true,
            Type::Nominal { args, .. } => args.iter().any(Type::has_error),
            Type::Tuple(elems) => elems.iter().any(Type::has_error),
            Type::WeakStorage(inner)
            | Type::UnownedStorage(inner)
            | Type::PackExpansion(inner) => inner.has_error(),
            Type::Int | Type::Bool | Type::String | Type::Unit | Type::Param(_) => false,
        }
    }

    /// Strip reference-storage wrappers to reach the referent type.
    pub fn reference_storage_referent(&self) -> &Type {
        match self {
            Type::WeakStorage(inner) | Type::UnownedStorage(inner) => {
                inner.reference_storage_referent()
            }
            other => other,
        }
    }

    /// Substitute generic parameters of `owner` with `args`, by position.
    ///
    /// Parameters belonging to other declarations are left untouched; a
    /// parameter index past the end of `args` is also left untouched (the
    /// caller supplied a partial context).
    pub fn substitute(&self, owner: DeclId, args: &[Type]) -> Type {
        match self {
            Type::Param(p) if p.owner == owner => args
                .get(p.index as usize)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            Type::Param(_) => self.clone(),
            Type::Nominal { decl, args: inner } => Type::Nominal {
                decl: *decl,
                args: inner.iter().map(|t| t.substitute(owner, args)).collect(),
            },
            Type::Tuple(elems) => {
                Type::Tuple(elems.iter().map(|t| t.substitute(owner, args)).collect())
            }
            Type::WeakStorage(inner) => {
                Type::WeakStorage(Box::new(inner.substitute(owner, args)))
            }
            Type::UnownedStorage(inner) => {
                Type::UnownedStorage(Box::new(inner.substitute(owner, args)))
            }
            Type::PackExpansion(inner) => {
                Type::PackExpansion(Box::new(inner.substitute(owner, args)))
            }
            Type::Int | Type::Bool | Type::String | Type::Unit | Type::Error => self.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
            Type::Bool => write!(f, "Bool"),
            Type::String => write!(f, "String"),
            Type::Unit => write!(f, "Unit"),
            Type::Nominal { decl, args } => {
                write!(f, "decl#{}", decl.0)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::Param(p) => write!(f, "{}", p.name),
            Type::Tuple(elems) => {
                write!(f, "#(")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, ")")
            }
            Type::WeakStorage(inner) => write!(f, "weak {inner}"),
            Type::UnownedStorage(inner) => write!(f, "unowned {inner}"),
            Type::PackExpansion(inner) => write!(f, "repeat {inner}"),
            Type::Error => write!(f, "<error>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Generic signatures
// ---------------------------------------------------------------------------

/// A requirement that a generic parameter conforms to a capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Requirement {
    pub param: ParamRef,
    pub capability: Capability,
}

/// The generic signature of a declaration or synthetic extension: its
/// parameters plus capability requirements over them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenericSignature {
    pub params: Vec<ParamRef>,
    pub requirements: Vec<Requirement>,
}

impl GenericSignature {
    pub fn new(params: Vec<ParamRef>) -> Self {
        Self {
            params,
            requirements: Vec::new(),
        }
    }

    /// Whether this signature requires `param` to conform to `capability`.
    pub fn requires(&self, param: &ParamRef, capability: Capability) -> bool {
        self.requirements
            .iter()
            .any(|req| req.capability == capability && req.param == *param)
    }
}

/// Build a new signature from a base signature and added requirements.
///
/// Requirements already present in the base are not duplicated; parameter
/// lists are taken from the base unchanged.
pub fn build_generic_signature(
    base: &GenericSignature,
    added: impl IntoIterator<Item = Requirement>,
) -> GenericSignature {
    let mut sig = base.clone();
    for req in added {
        if !sig.requires(&req.param, req.capability) {
            sig.requirements.push(req);
        }
    }
    sig
}
