//! Source model for Vireo.
//!
//! This crate defines the pieces of the source surface the conformance
//! engine needs: file ids, byte-offset spans, module identity, and the
//! written form of inheritance clauses and generic-parameter lists.
//! Semantic types live in `vireo-types`; this crate only records what
//! appears in source and where.

/// Identifies a source file in the compilation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

/// A byte offset range within a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub file: FileId,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// Create a span that covers both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        debug_assert_eq!(
            self.file, other.file,
            "cannot merge spans from different files"
        );
        Span {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// A synthetic span for compiler-generated declarations.
    pub fn synthetic() -> Self {
        Self {
            file: FileId(u32::MAX),
            start: 0,
            end: 0,
        }
    }

    pub fn is_synthetic(self) -> bool {
        self.file == FileId(u32::MAX)
    }
}

/// A value paired with its source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned {
            node: f(self.node),
            span: self.span,
        }
    }
}

/// Identifies a module (compilation unit) in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

// ---------------------------------------------------------------------------
// Inheritance clauses
// ---------------------------------------------------------------------------

/// One entry of a declaration's inheritance clause, as written.
///
/// `Point: Duplicable` produces `{ name: "Duplicable", inverse: false }`;
/// `Buffer: ~Duplicable` produces `{ name: "Duplicable", inverse: true }`.
/// Entries naming ordinary base types (not capabilities) are carried
/// unchanged; the engine skips them when resolving markings but still uses
/// their spans to find the end of the clause for fix-it placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritedEntry {
    pub name: String,
    pub inverse: bool,
    pub span: Span,
}

impl InheritedEntry {
    pub fn positive(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            inverse: false,
            span,
        }
    }

    pub fn inverse(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            inverse: true,
            span,
        }
    }
}

/// A generic parameter as declared in source: `G<T>` or `G<T: ~Duplicable>`.
///
/// Bounds are recorded by name; the engine resolves them against the
/// capability table during declaration elaboration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericParamDecl {
    pub name: Spanned<String>,
    /// Positive capability bounds written on the parameter (`T: Duplicable`).
    pub bounds: Vec<Spanned<String>>,
    /// Inverse bounds written on the parameter (`T: ~Duplicable`).
    pub inverse_bounds: Vec<Spanned<String>>,
}

impl GenericParamDecl {
    pub fn plain(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: Spanned::new(name.into(), span),
            bounds: Vec::new(),
            inverse_bounds: Vec::new(),
        }
    }
}
