//! Abstract syntax tree for the top level of a Hash module.
//!
//! Only what the module system consumes is modelled: the ordered top-level items, their names and
//! spans, and the namespace references found inside declaration bodies.

use std::fmt;

/// Source location span (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.len()).into()
    }
}

/// A node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

pub type Ident = String;

/// A parsed module: its top-level items in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub items: Vec<Spanned<Item>>,
}

/// Top-level items
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Decl(Decl),
    Import(ImportDecl),
}

// ============================================================================
// Declarations
// ============================================================================

/// What a top-level binding defines, judged from the shape of its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// `x := 1;`, `x: i32 = f(2);`
    Variable,
    /// `f := (a, b) => a + b;`
    Function,
    /// `Point := struct(x: f64, y: f64);`, `Color := enum(Red, Green);`, `Id := type u64;`
    TypeDef,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclKind::Variable => write!(f, "variable"),
            DeclKind::Function => write!(f, "function"),
            DeclKind::TypeDef => write!(f, "type"),
        }
    }
}

/// A named top-level definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub name: Spanned<Ident>,
    pub kind: DeclKind,
    /// Span of the right-hand side (the opaque body).
    pub body: Span,
    /// Every qualified path (`alias::Name`, `a::b::Name`) found in the type annotation or body,
    /// in source order.
    pub qualified_refs: Vec<Spanned<QualifiedRef>>,
}

/// A path through namespaces: `a::Name`, `a::b::Name`, or `a::Name { ... }` when `constructs` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedRef {
    /// Every segment in order; always at least two.
    pub path: Vec<Ident>,
    pub constructs: bool,
}

impl QualifiedRef {
    /// The leftmost segment, looked up in the enclosing module's scope.
    pub fn root(&self) -> &str {
        self.path.first().map(String::as_str).unwrap_or_default()
    }

    /// The final segment.
    pub fn member(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for QualifiedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.join("::"))
    }
}

// ============================================================================
// Imports
// ============================================================================

/// An `import("path")` expression together with the pattern it is bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// The raw path string, exactly as written (escapes processed).
    pub path: Spanned<String>,
    pub target: ImportTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportTarget {
    /// `import("lib/c");` binds the module under its base name.
    Bare,
    /// `c := import("lib/c");`
    Alias(Spanned<Ident>),
    /// `{Point, Vec2: V} := import("lib/a");`
    Destructure(Vec<DestructureEntry>),
}

/// One `name` or `name: local` entry of a destructuring import pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct DestructureEntry {
    pub name: Spanned<Ident>,
    pub alias: Option<Spanned<Ident>>,
}

impl DestructureEntry {
    /// The name this entry introduces into the importing scope.
    pub fn local(&self) -> &Spanned<Ident> {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}
