//! The module table
//!
//! One [`ModuleTable`] lives for one compilation run. It owns every [`Module`] that run touches and
//! guarantees each [`ModuleKey`] is read, parsed and bound at most once.
//!
//! ## Loading
//!
//! [`ModuleTable::get_or_load`] is the only entry into loading:
//!
//! - **Ready**: the cached module is returned, nothing is re-parsed
//! - **Loading**: the key is on the active stack, so this is a cycle and a
//!   [`CircularImport`](ModuleError::CircularImport) is returned with the chain
//! - **Failed**: the stored failure is re-surfaced as a
//!   [`PropagatedFailure`](ModuleError::PropagatedFailure), never loaded again
//! - **absent**: the module is inserted as Loading, its key pushed on the active stack, and it is
//!   read, parsed, given a namespace and has its imports bound (which may recurse into this method)
//!
//! A module's imports are bound in source order, interleaved with its own declarations entering
//! the local scope, so a declaration that reuses an earlier import's name is a collision and vice
//! versa.

use std::collections::HashMap;
use std::path::Path;

use hash_syntax::ast::{QualifiedRef, Span};

use super::errors::ModuleError;
use super::imports::{self, ImportSite, LocalBinding, QualifiedTarget};
use super::loader::{FsLoader, ModuleParser, SourceLoader, SyntaxParser};
use super::module::{DeclRef, Declaration, Module, ModuleId, ModuleItem, ModuleKey, ModuleState};
use super::namespace::Namespace;
use super::resolver::PathResolver;

/// The collaborators of one compilation run.
#[derive(Clone, Copy)]
pub struct Compilation<'a> {
    pub resolver: &'a PathResolver,
    pub loader: &'a dyn SourceLoader,
    pub parser: &'a dyn ModuleParser,
}

impl<'a> Compilation<'a> {
    pub fn new(resolver: &'a PathResolver, loader: &'a dyn SourceLoader, parser: &'a dyn ModuleParser) -> Self {
        Self { resolver, loader, parser }
    }

    /// Filesystem loader and the `hash_syntax` parser.
    pub fn from_fs(resolver: &'a PathResolver) -> Self {
        Self::new(resolver, &FsLoader, &SyntaxParser)
    }
}

/// Owner of every module loaded during a compilation run.
#[derive(Debug, Default)]
pub struct ModuleTable {
    modules: Vec<Module>,
    by_key: HashMap<ModuleKey, ModuleId>,
    /// Keys currently being loaded, outermost first.
    active: Vec<ModuleKey>,
    /// Ready modules in the order they finished loading (dependencies first).
    load_order: Vec<ModuleId>,
}

/// One top-level item in source order, by index into the module's declarations or import sites.
enum Step {
    Declare(usize),
    Import(usize),
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve and load a compilation entry point (absolute or relative to the project root).
    pub fn load_entry(&mut self, path: &Path, cx: &Compilation<'_>) -> Result<ModuleId, ModuleError> {
        let key = cx.resolver.entry(path).map_err(|reason| ModuleError::InvalidPath {
            importer: None,
            path: path.display().to_string(),
            reason,
            span: None,
        })?;
        self.get_or_load(&key, cx)
    }

    /// Return the Ready module for `key`, loading it first if it has never been seen.
    ///
    /// ## Errors
    /// - [`ModuleError::CircularImport`] if `key` is still being loaded further up the stack
    /// - [`ModuleError::PropagatedFailure`] if `key` failed earlier in this run
    /// - any error raised while loading `key` itself
    #[tracing::instrument(skip_all, fields(module = %key))]
    pub fn get_or_load(&mut self, key: &ModuleKey, cx: &Compilation<'_>) -> Result<ModuleId, ModuleError> {
        if let Some(&id) = self.by_key.get(key) {
            return match &self.modules[id.index()].state {
                ModuleState::Ready => {
                    tracing::debug!("cache hit");
                    Ok(id)
                }
                ModuleState::Loading => Err(self.cycle_error(key)),
                ModuleState::Failed(cause) => {
                    tracing::warn!("import of a module that already failed");
                    Err(ModuleError::PropagatedFailure {
                        key: key.clone(),
                        cause: Box::new(cause.root_cause().clone()),
                    })
                }
            };
        }

        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(Module::loading(key.clone()));
        self.by_key.insert(key.clone(), id);
        self.active.push(key.clone());
        tracing::trace!(id = id.0, "loading");

        let result = self.load(id, cx);
        self.active.pop();

        match result {
            Ok(()) => {
                self.modules[id.index()].state = ModuleState::Ready;
                self.load_order.push(id);
                tracing::trace!("ready");
                Ok(id)
            }
            Err(err) => {
                tracing::trace!(error = %err, "failed");
                self.modules[id.index()].state = ModuleState::Failed(err.clone());
                Err(err)
            }
        }
    }

    /// `CircularImport` for a key found on the active stack: the chain from its first appearance
    /// back to itself.
    fn cycle_error(&self, key: &ModuleKey) -> ModuleError {
        let start = self.active.iter().position(|k| k == key).unwrap_or(0);
        let mut chain = self.active[start..].to_vec();
        chain.push(key.clone());
        tracing::debug!(length = chain.len(), "import cycle");
        ModuleError::CircularImport { key: key.clone(), chain }
    }

    fn load(&mut self, id: ModuleId, cx: &Compilation<'_>) -> Result<(), ModuleError> {
        let key = self.modules[id.index()].key.clone();
        self.modules[id.index()].source = cx.loader.read(&key)?;
        let items = cx.parser.parse(&key, &self.modules[id.index()].source)?;

        let mut declarations: Vec<Declaration> = Vec::new();
        let mut sites: Vec<ImportSite> = Vec::new();
        let mut steps = Vec::with_capacity(items.len());
        for item in items {
            match item {
                ModuleItem::Declaration(decl) => {
                    steps.push(Step::Declare(declarations.len()));
                    declarations.push(decl);
                }
                ModuleItem::Import(site) => {
                    steps.push(Step::Import(sites.len()));
                    sites.push(site);
                }
            }
        }

        let namespace = Namespace::build(&key, &declarations)?;

        let mut scope = std::mem::take(&mut self.modules[id.index()].scope);
        let mut bindings = Vec::with_capacity(sites.len());
        let mut dependencies: Vec<ModuleId> = Vec::new();
        for step in steps {
            match step {
                Step::Declare(index) => {
                    let decl = &declarations[index];
                    scope.insert(&key, &decl.name, LocalBinding::Declaration(index), decl.name_span)?;
                }
                Step::Import(index) => {
                    let binding = imports::bind(self, cx, &key, &mut scope, &sites[index])?;
                    if !dependencies.contains(&binding.module()) {
                        dependencies.push(binding.module());
                    }
                    bindings.push(binding);
                }
            }
        }

        tracing::debug!(
            declarations = declarations.len(),
            imports = bindings.len(),
            "module bound"
        );

        let module = &mut self.modules[id.index()];
        module.declarations = declarations;
        module.namespace = namespace;
        module.scope = scope;
        module.imports = bindings;
        module.dependencies = dependencies;

        for decl in &self.modules[id.index()].declarations {
            for reference in &decl.payload.qualified_refs {
                imports::resolve_qualified(self, id, &reference.node, reference.span)?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Handle of a module already in the table, in any state.
    pub fn lookup(&self, key: &ModuleKey) -> Option<ModuleId> {
        self.by_key.get(key).copied()
    }

    /// The module behind a handle minted by this table.
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.index()]
    }

    pub fn get(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id.index())
    }

    pub fn declaration(&self, decl: DeclRef) -> Option<&Declaration> {
        self.get(decl.module)?.declarations.get(decl.index)
    }

    /// Resolve a qualified path such as `["geo", "Point"]` as written in module `id`.
    pub fn resolve_qualified(&self, id: ModuleId, path: &[&str]) -> Result<QualifiedTarget, ModuleError> {
        let reference = QualifiedRef {
            path: path.iter().map(|segment| segment.to_string()).collect(),
            constructs: false,
        };
        imports::resolve_qualified(self, id, &reference, Span::default())
    }

    /// Ready modules, dependencies before their importers.
    pub fn load_order(&self) -> &[ModuleId] {
        &self.load_order
    }

    /// Every module in the table with its handle, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules
            .iter()
            .enumerate()
            .map(|(index, module)| (ModuleId(index as u32), module))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
