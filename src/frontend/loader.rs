//! Source loading collaborators
//!
//! The module table does not read files or parse source itself. It asks a [`SourceLoader`] for the
//! text behind a [`ModuleKey`] and a [`ModuleParser`] for the module's top-level items. The
//! defaults are [`FsLoader`] and [`SyntaxParser`]; tests swap in [`MemoryLoader`] or a counting
//! parser.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use hash_syntax::ast::{ImportTarget, Item};

use super::errors::ModuleError;
use super::imports::{ImportForm, ImportRequest, ImportSite};
use super::module::{Declaration, DeclarationPayload, ModuleItem, ModuleKey, Visibility};

/// Reads the source text of a module.
pub trait SourceLoader {
    /// ## Errors
    /// [`ModuleError::NotFound`] if nothing exists at the key, [`ModuleError::Io`] for any other
    /// read failure.
    fn read(&self, key: &ModuleKey) -> Result<String, ModuleError>;
}

/// Turns module source into top-level items, in source order.
pub trait ModuleParser {
    /// ## Errors
    /// [`ModuleError::Parse`] carrying every syntax error found.
    fn parse(&self, key: &ModuleKey, source: &str) -> Result<Vec<ModuleItem>, ModuleError>;
}

// ============================================================================
// Loaders
// ============================================================================

/// Reads modules from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn read(&self, key: &ModuleKey) -> Result<String, ModuleError> {
        fs::read_to_string(key.path()).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ModuleError::NotFound { key: key.clone() },
            _ => ModuleError::Io {
                key: key.clone(),
                message: err.to_string(),
            },
        })
    }
}

/// Serves modules from memory, keyed by absolute path.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, source: impl Into<String>) {
        self.files.insert(path.into(), source.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_file(mut self, path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

impl SourceLoader for MemoryLoader {
    fn read(&self, key: &ModuleKey) -> Result<String, ModuleError> {
        self.files
            .get(key.path())
            .cloned()
            .ok_or_else(|| ModuleError::NotFound { key: key.clone() })
    }
}

// ============================================================================
// Parser
// ============================================================================

/// [`ModuleParser`] backed by `hash_syntax`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxParser;

impl ModuleParser for SyntaxParser {
    fn parse(&self, key: &ModuleKey, source: &str) -> Result<Vec<ModuleItem>, ModuleError> {
        let program = hash_syntax::parse_source(source).map_err(|errors| ModuleError::Parse {
            key: key.clone(),
            errors,
        })?;

        Ok(program
            .items
            .into_iter()
            .map(|item| match item.node {
                Item::Decl(decl) => ModuleItem::Declaration(Declaration {
                    name: decl.name.node,
                    name_span: decl.name.span,
                    kind: decl.kind,
                    visibility: Visibility::Public,
                    payload: DeclarationPayload {
                        body: decl.body,
                        qualified_refs: decl.qualified_refs,
                    },
                }),
                Item::Import(import) => {
                    let form = match import.target {
                        ImportTarget::Bare => ImportForm::Qualified { alias: None },
                        ImportTarget::Alias(alias) => ImportForm::Qualified { alias: Some(alias) },
                        ImportTarget::Destructure(entries) => ImportForm::Destructured(
                            entries
                                .into_iter()
                                .map(|entry| ImportRequest {
                                    exported: entry.name,
                                    local: entry.alias,
                                })
                                .collect(),
                        ),
                    };
                    ModuleItem::Import(ImportSite {
                        path: import.path,
                        form,
                        span: item.span,
                    })
                }
            })
            .collect())
    }
}
