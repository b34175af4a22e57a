//! The capability enumeration and its descriptor table.
//!
//! A capability is a named structural property a type may or may not
//! possess. Every capability has a source-writable inverse form spelled
//! with a leading `~`. The set is fixed but extensible: adding a capability
//! means adding a variant and a descriptor table entry; no dispatch site
//! changes.

use std::fmt;

/// A capability with an invertible source form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Values can be freely duplicated (the default assumption).
    Duplicable,
    /// Values can outlive the scope that produced them.
    Detachable,
}

/// Static metadata for one capability.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityDescriptor {
    pub capability: Capability,
    /// Spelling used in inheritance clauses and diagnostics.
    pub name: &'static str,
    /// Whether types possess the capability absent any marking.
    pub default_assumed: bool,
}

/// Descriptor table, indexed by discriminant order of [`Capability::ALL`].
/// Extend by adding an entry; lookup code never changes.
const DESCRIPTORS: &[CapabilityDescriptor] = &[
    CapabilityDescriptor {
        capability: Capability::Duplicable,
        name: "Duplicable",
        default_assumed: true,
    },
    CapabilityDescriptor {
        capability: Capability::Detachable,
        name: "Detachable",
        default_assumed: true,
    },
];

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::Duplicable, Capability::Detachable];

    pub fn all() -> &'static [Capability] {
        &Self::ALL
    }

    pub fn descriptor(self) -> &'static CapabilityDescriptor {
        DESCRIPTORS
            .iter()
            .find(|d| d.capability == self)
            .expect("descriptor table covers every capability")
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Inverse spelling as written in source: `~Duplicable`.
    pub fn inverse_spelling(self) -> String {
        format!("~{}", self.name())
    }

    /// Resolve a clause entry name to a capability, if it names one.
    pub fn from_name(name: &str) -> Option<Capability> {
        DESCRIPTORS
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.capability)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
