//! The memoized capability query: "does this concrete type lack C?"
//!
//! The cache has three states per key — absent, in progress, resolved — and
//! doubles as the cycle detector: a re-entrant query for an in-progress key
//! fails with [`EngineError::Cycle`] instead of recursing. Resolved entries
//! are written once per pass and never invalidated; hit/miss counters are
//! exposed so tests can observe that a second identical query performs no
//! recomputation.

use std::collections::BTreeMap;

use vireo_types::{Capability, Type};

use crate::conformance::{self, ConformanceOrigin};
use crate::storage;
use crate::{EngineError, Session};

/// One cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CacheEntry {
    /// Computation has begun but not finished; hitting this is a cycle.
    InProgress,
    /// Memoized result: whether the type lacks the capability.
    Done(bool),
}

/// Counters for cache behavior, observable in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    pub hits: u64,
    pub misses: u64,
}

/// Pass-wide query cache keyed by (canonical type, capability).
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: BTreeMap<(Type, Capability), CacheEntry>,
    stats: QueryStats,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> QueryStats {
        self.stats
    }
}

/// Whether the concrete `ty` lacks `capability`.
///
/// Contract: `ty` must be free of unresolved generic parameters — the caller
/// substitutes into a concrete context first. Pack expansions are queried
/// through their pattern type.
pub fn lacks_capability(
    session: &mut Session,
    ty: &Type,
    capability: Capability,
) -> Result<bool, EngineError> {
    if ty.has_type_parameter() {
        return Err(EngineError::UnresolvedParameter { ty: ty.to_string() });
    }

    // Pack expansions do not themselves carry conformances.
    let ty = match ty {
        Type::PackExpansion(pattern) => pattern.as_ref(),
        other => other,
    };

    let key = (ty.clone(), capability);
    match session.cache.entries.get(&key) {
        Some(CacheEntry::Done(lacks)) => {
            session.cache.stats.hits += 1;
            return Ok(*lacks);
        }
        Some(CacheEntry::InProgress) => {
            return Err(EngineError::Cycle {
                ty: ty.to_string(),
                capability,
            });
        }
        None => {
            session.cache.stats.misses += 1;
        }
    }

    session
        .cache
        .entries
        .insert(key.clone(), CacheEntry::InProgress);
    match compute_lacks(session, ty, capability) {
        Ok(lacks) => {
            session.cache.entries.insert(key, CacheEntry::Done(lacks));
            Ok(lacks)
        }
        Err(err) => {
            // Leave no in-progress marker behind; the pass continues with
            // other queries.
            session.cache.entries.remove(&key);
            Err(err)
        }
    }
}

fn compute_lacks(
    session: &mut Session,
    ty: &Type,
    capability: Capability,
) -> Result<bool, EngineError> {
    match ty {
        // Invalid types are treated as capability-present so one resolution
        // failure does not cascade.
        Type::Error => Ok(false),

        Type::Int | Type::Bool | Type::String | Type::Unit => Ok(false),

        Type::WeakStorage(inner) | Type::UnownedStorage(inner) | Type::PackExpansion(inner) => {
            lacks_capability(session, inner, capability)
        }

        Type::Tuple(elems) => {
            for elem in elems {
                if lacks_capability(session, elem, capability)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }

        Type::Param(_) => {
            debug_assert!(false, "precondition checked before compute");
            Err(EngineError::UnresolvedParameter { ty: ty.to_string() })
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

            if record.is_conditional() {
                // Conditional conformance: the type lacks the capability
                // exactly when a required argument does.
                for req in &record.requirements {
                    let arg = args
                        .get(req.param.index as usize)
                        .cloned()
                        .unwrap_or(Type::Error);
                    if lacks_capability(session, &arg, req.capability)? {
                        return Ok(true);
                    }
                }
                return Ok(false);
            }

            match record.origin {
                // The synthesizer only produces unconditional records when
                // marking elaboration saw no member that may lack.
                ConformanceOrigin::Synthesized => Ok(false),
                // A user-written claim is validated structurally on first
                // use. Self-referential storage re-enters this query and is
                // caught by the in-progress cache state.
                ConformanceOrigin::Declared => {
                    let sig = session.decls.generic_signature(*decl);
                    storage::violates_capability(session, *decl, args, &sig, capability, false)
                }
            }
        }
    }
}
