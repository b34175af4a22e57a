//! Error reporting and diagnostics for Vireo.
//!
//! This crate provides structured diagnostics with source location tracking
//! and mechanically applicable fix-it edits. Diagnostics are created by the
//! conformance engine and rendered here for display; nothing in a
//! user-facing message leaks internal engine state.

use std::fmt;

// ---------------------------------------------------------------------------
// Diagnostic severity and categories
// ---------------------------------------------------------------------------

/// How severe a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// Broad category for diagnostics. Used for filtering and grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// A stored member lacks a capability its container claims.
    CapabilityViolation,
    /// A declaration names both a capability and its inverse.
    ContradictoryMarking,
    /// A generic parameter prevents a capability from holding.
    ParameterPreventsCapability,
    /// A member type's own declaration prevents a capability from holding.
    MemberPreventsCapability,
    /// A capability query re-entered itself.
    CapabilityCycle,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::CapabilityViolation,
        Category::ContradictoryMarking,
        Category::ParameterPreventsCapability,
        Category::MemberPreventsCapability,
        Category::CapabilityCycle,
    ];

    pub fn all() -> &'static [Category] {
        &Self::ALL
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::CapabilityViolation => "capability_violation",
            Category::ContradictoryMarking => "contradictory_marking",
            Category::ParameterPreventsCapability => "parameter_prevents_capability",
            Category::MemberPreventsCapability => "member_prevents_capability",
            Category::CapabilityCycle => "capability_cycle",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Category::CapabilityViolation => "E0101",
            Category::ContradictoryMarking => "E0102",
            Category::ParameterPreventsCapability => "E0103",
            Category::MemberPreventsCapability => "E0104",
            Category::CapabilityCycle => "E0105",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Category::CapabilityViolation => {
                "A stored member's type lacks a capability its container requires."
            }
            Category::ContradictoryMarking => {
                "A declaration claims both a capability and its inverse."
            }
            Category::ParameterPreventsCapability => {
                "A generic parameter's declaration prevents the capability."
            }
            Category::MemberPreventsCapability => {
                "A member type's own declaration prevents the capability."
            }
            Category::CapabilityCycle => {
                "A capability query depends on its own result."
            }
        }
    }

    pub fn example_fix(self) -> &'static str {
        match self {
            Category::CapabilityViolation => {
                "Add the inverse marking to the container or make the member conform."
            }
            Category::ContradictoryMarking => "Remove one of the two clause entries.",
            Category::ParameterPreventsCapability => {
                "Constrain the parameter to the capability where it is used."
            }
            Category::MemberPreventsCapability => {
                "Make the member's declaration conform, or store it indirectly."
            }
            Category::CapabilityCycle => {
                "Break the self-referential storage with an indirection."
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Source locations
// ---------------------------------------------------------------------------

/// A source location for diagnostics.
///
/// Uses byte offsets. Callers convert from `vireo-ast` spans to this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file_id: u32,
    pub start: u32,
    pub end: u32,
}

// ---------------------------------------------------------------------------
// Fix-it edits
// ---------------------------------------------------------------------------

/// Where a fix-it's text lands relative to its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixItPlacement {
    /// Insert at the location's start offset.
    Insert,
    /// Insert immediately after the location's end offset.
    InsertAfter,
}

/// A suggested, mechanically applicable source edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixIt {
    pub location: SourceLocation,
    pub placement: FixItPlacement,
    pub text: String,
}

impl FixIt {
    /// Byte offset at which `text` is inserted.
    pub fn insertion_offset(&self) -> u32 {
        match self.placement {
            FixItPlacement::Insert => self.location.start,
            FixItPlacement::InsertAfter => self.location.end,
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostic
// ---------------------------------------------------------------------------

/// A structured diagnostic message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Stable diagnostic code (e.g. E0101).
    pub code: Option<String>,
    pub severity: Severity,
    pub category: Category,
    /// Primary message: what went wrong.
    pub message: String,
    /// Where it went wrong.
    pub location: Option<SourceLocation>,
    /// Additional labeled spans (e.g., "the parameter was declared here").
    pub labels: Vec<DiagLabel>,
    /// Suggested source edits.
    pub fixits: Vec<FixIt>,
    /// Suggested fix in prose, if any.
    pub help: Option<String>,
}

/// A labeled source span within a diagnostic.
#[derive(Debug, Clone)]
pub struct DiagLabel {
    pub location: SourceLocation,
    pub message: String,
}

impl Diagnostic {
    pub fn error(category: Category, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, category, message)
    }

    pub fn warning(category: Category, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, category, message)
    }

    pub fn note(category: Category, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Note, category, message)
    }

    fn with_severity(severity: Severity, category: Category, message: impl Into<String>) -> Self {
        Self {
            code: Some(category.code().to_string()),
            severity,
            category,
            message: message.into(),
            location: None,
            labels: Vec::new(),
            fixits: Vec::new(),
            help: None,
        }
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_label(mut self, location: SourceLocation, message: impl Into<String>) -> Self {
        self.labels.push(DiagLabel {
            location,
            message: message.into(),
        });
        self
    }

    /// Attach a fix-it inserting `text` at `location`'s start offset.
    pub fn with_insert(mut self, location: SourceLocation, text: impl Into<String>) -> Self {
        self.fixits.push(FixIt {
            location,
            placement: FixItPlacement::Insert,
            text: text.into(),
        });
        self
    }

    /// Attach a fix-it inserting `text` immediately after `location`.
    pub fn with_insert_after(mut self, location: SourceLocation, text: impl Into<String>) -> Self {
        self.fixits.push(FixIt {
            location,
            placement: FixItPlacement::InsertAfter,
            text: text.into(),
        });
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        };
        if let Some(code) = &self.code {
            write!(f, "{prefix}[{code}]: {}", self.message)?;
        } else {
            write!(f, "{prefix}: {}", self.message)?;
        }
        for fixit in &self.fixits {
            write!(
                f,
                "\n  fix-it: insert `{}` at offset {}",
                fixit.text,
                fixit.insertion_offset()
            )?;
        }
        if let Some(help) = &self.help {
            write!(f, "\n  help: {help}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Error type for crates that produce diagnostics
// ---------------------------------------------------------------------------

/// Error type wrapping one or more diagnostics.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}", .0.first().map(|d| d.to_string()).unwrap_or_default())]
pub struct DiagnosticError(pub Vec<Diagnostic>);

impl DiagnosticError {
    pub fn single(diag: Diagnostic) -> Self {
        Self(vec![diag])
    }

    pub fn multiple(diags: Vec<Diagnostic>) -> Self {
        Self(diags)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.0
    }
}
