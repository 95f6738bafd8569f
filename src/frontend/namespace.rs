//! Module namespaces: the name → declaration map a module exports.

use indexmap::IndexMap;

use super::errors::ModuleError;
use super::module::{Declaration, ModuleKey};

/// Exported names of one module, in declaration order.
///
/// Values are indices into the owning module's declaration list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Namespace {
    entries: IndexMap<String, usize>,
}

impl Namespace {
    /// Build the namespace of `key` from its declarations.
    ///
    /// Names must be unique across all top-level declarations, exported or not; only exported
    /// declarations are entered.
    ///
    /// ## Errors
    /// [`ModuleError::DuplicateExport`] for the second definition of a name.
    #[tracing::instrument(skip_all, fields(module = %key))]
    pub fn build(key: &ModuleKey, declarations: &[Declaration]) -> Result<Self, ModuleError> {
        let mut seen: IndexMap<&str, usize> = IndexMap::with_capacity(declarations.len());
        let mut entries = IndexMap::new();

        for (index, decl) in declarations.iter().enumerate() {
            if let Some(&first) = seen.get(decl.name.as_str()) {
                return Err(ModuleError::DuplicateExport {
                    key: key.clone(),
                    name: decl.name.clone(),
                    first: declarations[first].name_span,
                    second: decl.name_span,
                });
            }
            seen.insert(&decl.name, index);
            if decl.visibility.is_exported() {
                entries.insert(decl.name.clone(), index);
            }
        }

        tracing::debug!(exports = entries.len(), "namespace built");
        Ok(Self { entries })
    }

    /// Declaration index of an exported name.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(name, &index)| (name.as_str(), index))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
