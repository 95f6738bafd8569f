//! Import binding
//!
//! Turns one `import("...")` site into an [`ImportBinding`] and wires the names it introduces into
//! the importing module's [`LocalScope`].
//!
//! ## Forms
//!
//! | Source                           | Form                                 | Local names       |
//! |----------------------------------|--------------------------------------|-------------------|
//! | `import("lib/sub/c");`           | `Qualified { alias: None }`          | `c`               |
//! | `geo := import("lib/geo");`      | `Qualified { alias: Some("geo") }`   | `geo`             |
//! | `{Point: P, Line} := import(..)` | `Destructured([..])`                 | `P`, `Line`       |
//!
//! The local scope is owned by the importer. Renames never touch the target module's
//! [`Namespace`](super::namespace::Namespace), so two importers can alias the same export
//! differently.

use hash_syntax::ast::{QualifiedRef, Span, Spanned};
use indexmap::IndexMap;

use super::errors::ModuleError;
use super::module::{DeclRef, DeclarationKind, ModuleId, ModuleKey};
use super::table::{Compilation, ModuleTable};

// ============================================================================
// Import sites (binder input)
// ============================================================================

/// How an import binds the target module.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportForm {
    /// Bind the whole namespace under `alias`, or under the module's base name when omitted.
    Qualified { alias: Option<Spanned<String>> },
    /// Bind individual exports into the importing scope.
    Destructured(Vec<ImportRequest>),
}

/// One `exported` or `exported: local` entry of a destructured import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRequest {
    pub exported: Spanned<String>,
    pub local: Option<Spanned<String>>,
}

impl ImportRequest {
    /// The name bound in the importer: `local` if given, else `exported`.
    pub fn local_name(&self) -> &Spanned<String> {
        self.local.as_ref().unwrap_or(&self.exported)
    }
}

/// An import as written in a module.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSite {
    /// Raw path string and the span of its literal.
    pub path: Spanned<String>,
    pub form: ImportForm,
    /// Span of the whole import item.
    pub span: Span,
}

// ============================================================================
// Import bindings (binder output)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundName {
    pub exported: String,
    pub local: String,
    pub decl: DeclRef,
}

/// The result of binding one import site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    Qualified { alias: String, module: ModuleId },
    Destructured { module: ModuleId, names: Vec<BoundName> },
}

impl ImportBinding {
    /// The imported module.
    pub fn module(&self) -> ModuleId {
        match self {
            ImportBinding::Qualified { module, .. } | ImportBinding::Destructured { module, .. } => *module,
        }
    }
}

// ============================================================================
// Local scope
// ============================================================================

/// What a top-level name in a module refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalBinding {
    /// The module's own declaration, by index.
    Declaration(usize),
    /// A module bound by a qualified import.
    Namespace(ModuleId),
    /// A declaration of another module bound by a destructured import.
    Imported(DeclRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeEntry {
    pub binding: LocalBinding,
    /// Where the name was bound.
    pub span: Span,
}

/// Top-level names of one module, in binding order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalScope {
    entries: IndexMap<String, ScopeEntry>,
}

impl LocalScope {
    /// Bind `name` in the scope of module `key`.
    ///
    /// ## Errors
    /// [`ModuleError::NameCollision`] if `name` is already bound.
    pub fn insert(
        &mut self,
        key: &ModuleKey,
        name: &str,
        binding: LocalBinding,
        span: Span,
    ) -> Result<(), ModuleError> {
        if let Some(previous) = self.entries.get(name) {
            return Err(ModuleError::NameCollision {
                key: key.clone(),
                name: name.to_string(),
                previous: previous.span,
                span,
            });
        }
        tracing::trace!(module = %key, name, ?binding, "bound");
        self.entries.insert(name.to_string(), ScopeEntry { binding, span });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ScopeEntry> {
        self.entries.get(name)
    }

    pub fn lookup(&self, name: &str) -> Option<LocalBinding> {
        self.entries.get(name).map(|entry| entry.binding)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScopeEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Binding
// ============================================================================

/// Resolve `site` from module `importer`, load its target and bind the resulting names in `scope`.
///
/// Failures from path resolution and module loading propagate unchanged.
#[tracing::instrument(skip_all, fields(importer = %importer, path = %site.path.node))]
pub fn bind(
    table: &mut ModuleTable,
    cx: &Compilation<'_>,
    importer: &ModuleKey,
    scope: &mut LocalScope,
    site: &ImportSite,
) -> Result<ImportBinding, ModuleError> {
    let key = cx
        .resolver
        .resolve(importer.dir(), &site.path.node)
        .map_err(|reason| ModuleError::InvalidPath {
            importer: Some(importer.clone()),
            path: site.path.node.clone(),
            reason,
            span: Some(site.path.span),
        })?;
    let target = table.get_or_load(&key, cx)?;

    match &site.form {
        ImportForm::Qualified { alias } => {
            let (alias, span) = match alias {
                Some(alias) => (alias.node.clone(), alias.span),
                None => (key.base_name().to_string(), site.path.span),
            };
            scope.insert(importer, &alias, LocalBinding::Namespace(target), span)?;
            Ok(ImportBinding::Qualified { alias, module: target })
        }
        ImportForm::Destructured(requests) => {
            let namespace = &table.module(target).namespace;
            let mut names = Vec::with_capacity(requests.len());
            for request in requests {
                let Some(index) = namespace.get(&request.exported.node) else {
                    return Err(ModuleError::UnknownExport {
                        key: key.clone(),
                        importer: importer.clone(),
                        name: request.exported.node.clone(),
                        span: request.exported.span,
                    });
                };
                let local = request.local_name();
                let decl = DeclRef { module: target, index };
                scope.insert(importer, &local.node, LocalBinding::Imported(decl), local.span)?;
                names.push(BoundName {
                    exported: request.exported.node.clone(),
                    local: local.node.clone(),
                    decl,
                });
            }
            Ok(ImportBinding::Destructured { module: target, names })
        }
    }
}

/// What a qualified path names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualifiedTarget {
    /// A declaration, possibly a type whose members the type checker resolves later.
    Declaration(DeclRef),
    /// A module reached through a chain of import aliases.
    Module(ModuleId),
}

/// Resolve a qualified path such as `geo::Point`, `a::b::Foo` or `Colour::Red` written in module
/// `importer`.
///
/// The first segment is looked up in the importer's scope, later ones in each reached module's
/// namespace and then its scope. A path whose prefix names a type stops there: the remaining
/// segments are members of that type.
///
/// ## Errors
/// - [`ModuleError::NotANamespace`] if a prefix is unbound or names a function or variable
/// - [`ModuleError::UnknownExport`] if a reached module has no such export or module alias
/// - [`ModuleError::NotAType`] if a construction `path { ... }` names something other than a type
pub fn resolve_qualified(
    table: &ModuleTable,
    importer: ModuleId,
    reference: &QualifiedRef,
    span: Span,
) -> Result<QualifiedTarget, ModuleError> {
    let importer_key = &table.module(importer).key;
    let not_a_namespace = |segments: usize| ModuleError::NotANamespace {
        key: importer_key.clone(),
        name: reference.path[..segments].join("::"),
        span,
    };

    let Some((root, rest)) = reference.path.split_first() else {
        return Err(not_a_namespace(0));
    };
    let mut module = match table.module(importer).scope.lookup(root) {
        Some(LocalBinding::Namespace(module)) => module,
        Some(LocalBinding::Declaration(index)) => {
            let decl = DeclRef { module: importer, index };
            return type_subject(table, decl).ok_or_else(|| not_a_namespace(1));
        }
        Some(LocalBinding::Imported(decl)) => {
            return type_subject(table, decl).ok_or_else(|| not_a_namespace(1));
        }
        None => return Err(not_a_namespace(1)),
    };

    for (position, segment) in rest.iter().enumerate() {
        let target = table.module(module);
        let last = position + 1 == rest.len();
        if let Some(index) = target.namespace.get(segment) {
            let decl = DeclRef { module, index };
            if last {
                return constructed(table, decl, reference, importer_key, span);
            }
            return type_subject(table, decl).ok_or_else(|| not_a_namespace(position + 2));
        }
        match target.scope.lookup(segment) {
            Some(LocalBinding::Namespace(next)) if !last => module = next,
            Some(LocalBinding::Namespace(next)) if !reference.constructs => {
                return Ok(QualifiedTarget::Module(next));
            }
            Some(LocalBinding::Namespace(_)) => {
                return Err(ModuleError::NotAType {
                    key: importer_key.clone(),
                    name: reference.to_string(),
                    span,
                });
            }
            _ => {
                return Err(ModuleError::UnknownExport {
                    key: target.key.clone(),
                    importer: importer_key.clone(),
                    name: segment.clone(),
                    span,
                });
            }
        }
    }
    Err(not_a_namespace(reference.path.len()))
}

/// `decl` as the subject of a longer path, which only a type can be.
fn type_subject(table: &ModuleTable, decl: DeclRef) -> Option<QualifiedTarget> {
    let kind = table.declaration(decl)?.kind;
    (kind == DeclarationKind::TypeDef).then_some(QualifiedTarget::Declaration(decl))
}

/// The declaration a path ends at, checked against `path { ... }` construction.
fn constructed(
    table: &ModuleTable,
    decl: DeclRef,
    reference: &QualifiedRef,
    importer_key: &ModuleKey,
    span: Span,
) -> Result<QualifiedTarget, ModuleError> {
    let is_type = table.declaration(decl).is_some_and(|d| d.kind == DeclarationKind::TypeDef);
    if reference.constructs && !is_type {
        return Err(ModuleError::NotAType {
            key: importer_key.clone(),
            name: reference.to_string(),
            span,
        });
    }
    Ok(QualifiedTarget::Declaration(decl))
}
