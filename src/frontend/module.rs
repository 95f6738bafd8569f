//! Module records for multi-file Hash projects
//!
//! A [`Module`] is one source file seen as a namespace of exported declarations. Modules are owned
//! by the [`ModuleTable`](super::table::ModuleTable); everything else refers to them through a
//! [`ModuleId`] handle, or to their declarations through a [`DeclRef`].

use std::fmt;
use std::path::{Path, PathBuf};

use hash_syntax::ast::{QualifiedRef, Span, Spanned};

use super::errors::ModuleError;
use super::imports::{ImportBinding, ImportSite, LocalScope};
use super::namespace::Namespace;

pub use hash_syntax::ast::DeclKind as DeclarationKind;

// ============================================================================
// Identity
// ============================================================================

/// Canonical identity of a module: its normalized absolute path.
///
/// Keys are only minted by the [`PathResolver`](super::resolver::PathResolver), which guarantees
/// there are no `.`/`..` segments, separators are `/`-normalized and the module extension is always
/// present. Two spellings of the same file therefore compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleKey {
    path: PathBuf,
    /// `/`-separated path relative to the project root, used for display.
    relative: String,
}

impl ModuleKey {
    pub(crate) fn new(path: PathBuf, relative: String) -> Self {
        Self { path, relative }
    }

    /// Absolute path of the module file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the project root, always `/`-separated.
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Directory that relative imports inside this module are resolved against.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("/"))
    }

    /// Final path segment without its extension (`lib/sub/c.hash` → `c`).
    ///
    /// This is the alias a qualified import binds when none is written.
    pub fn base_name(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relative)
    }
}

/// Handle to a module owned by a [`ModuleTable`](super::table::ModuleTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub(crate) u32);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a declaration: the owning module plus its position in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclRef {
    pub module: ModuleId,
    pub index: usize,
}

// ============================================================================
// Declarations
// ============================================================================

/// Visibility of a top-level declaration.
///
/// Every declaration the parser produces is `Public`. `Private` exists so that export restriction can
/// be introduced without changing the shape of [`Declaration`] or [`Namespace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn is_exported(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// A named top-level definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    /// Where the name is written; used for diagnostics.
    pub name_span: Span,
    pub kind: DeclarationKind,
    pub visibility: Visibility,
    pub payload: DeclarationPayload,
}

/// The opaque part of a declaration. Only what import resolution needs is kept.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeclarationPayload {
    pub body: Span,
    /// Qualified paths (`alias::Name`, `a::b::Name`) used inside the declaration, checked once
    /// imports are bound.
    pub qualified_refs: Vec<Spanned<QualifiedRef>>,
}

/// One top-level item as produced by a [`ModuleParser`](super::loader::ModuleParser), in source
/// order.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleItem {
    Declaration(Declaration),
    Import(ImportSite),
}

// ============================================================================
// Module record
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleState {
    Loading,
    Ready,
    /// Holds the failure that stopped the load, re-surfaced to every later importer.
    Failed(ModuleError),
}

/// A module record in the table.
#[derive(Debug)]
pub struct Module {
    pub key: ModuleKey,
    pub state: ModuleState,
    /// Source text, kept for diagnostics.
    pub source: String,
    pub declarations: Vec<Declaration>,
    pub namespace: Namespace,
    /// Everything bound at the module's top level: its own declarations and its imports.
    pub scope: LocalScope,
    /// Bindings produced by this module's imports, in source order.
    pub imports: Vec<ImportBinding>,
    /// Modules imported directly, deduplicated, in first-import order.
    pub dependencies: Vec<ModuleId>,
}

impl Module {
    pub(crate) fn loading(key: ModuleKey) -> Self {
        Self {
            key,
            state: ModuleState::Loading,
            source: String::new(),
            declarations: Vec::new(),
            namespace: Namespace::default(),
            scope: LocalScope::default(),
            imports: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == ModuleState::Ready
    }

    /// Look up an exported declaration by name.
    pub fn export(&self, name: &str) -> Option<&Declaration> {
        self.namespace
            .get(name)
            .and_then(|index| self.declarations.get(index))
    }
}
