//! Error taxonomy for module resolution.
//!
//! Every failure in the module system is a [`ModuleError`]. Errors are `Clone` because a failed
//! module keeps its root cause so that later imports of it can re-surface the failure
//! ([`ModuleError::PropagatedFailure`]) without loading it again.

use std::fmt;
use std::path::PathBuf;

use hash_syntax::ast::Span;
use hash_syntax::diagnostics::SyntaxError;
use miette::Diagnostic;
use thiserror::Error;

use super::module::ModuleKey;

/// Why an import path could not be turned into a [`ModuleKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("the path is empty")]
    Empty,

    #[error("absolute paths are not supported, import paths are relative to the importing file")]
    Absolute,

    #[error("unsupported character {0:?}")]
    UnsupportedCharacter(char),

    #[error("the path does not name a module file")]
    NotAFile,

    #[error("the path escapes the project root `{}`", .0.display())]
    EscapesRoot(PathBuf),

    #[error("the project root must be an absolute path, got `{}`", .0.display())]
    RelativeRoot(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ModuleError {
    #[error("invalid import path \"{path}\": {reason}")]
    #[diagnostic(
        code(hash::modules::invalid_path),
        help("import paths are relative to the importing file and must stay inside the project root")
    )]
    InvalidPath {
        /// `None` when the path is the compilation entry point.
        importer: Option<ModuleKey>,
        path: String,
        reason: PathError,
        span: Option<Span>,
    },

    #[error("module `{key}` was not found")]
    #[diagnostic(code(hash::modules::not_found))]
    NotFound { key: ModuleKey },

    #[error("failed to read module `{key}`: {message}")]
    #[diagnostic(code(hash::modules::io))]
    Io { key: ModuleKey, message: String },

    #[error("module `{key}` could not be parsed")]
    #[diagnostic(code(hash::modules::parse))]
    Parse {
        key: ModuleKey,
        #[related]
        errors: Vec<SyntaxError>,
    },

    #[error("circular import: {}", ImportChain(.chain))]
    #[diagnostic(
        code(hash::modules::circular_import),
        help("move the shared definitions into a module that neither side imports")
    )]
    CircularImport { key: ModuleKey, chain: Vec<ModuleKey> },

    #[error("`{name}` is defined more than once in module `{key}`")]
    #[diagnostic(code(hash::modules::duplicate_export))]
    DuplicateExport {
        key: ModuleKey,
        name: String,
        first: Span,
        second: Span,
    },

    #[error("module `{key}` has no export named `{name}`")]
    #[diagnostic(code(hash::modules::unknown_export))]
    UnknownExport {
        /// The module that was searched.
        key: ModuleKey,
        importer: ModuleKey,
        name: String,
        span: Span,
    },

    #[error("`{name}` is already bound in module `{key}`")]
    #[diagnostic(
        code(hash::modules::name_collision),
        help("give one of the bindings a different local name, e.g. `Name: OtherName` in a destructuring import")
    )]
    NameCollision {
        key: ModuleKey,
        name: String,
        previous: Span,
        span: Span,
    },

    #[error("`{name}` is not an imported module or a type in `{key}`")]
    #[diagnostic(code(hash::modules::not_a_namespace))]
    NotANamespace { key: ModuleKey, name: String, span: Span },

    #[error("`{name}` is not a type and cannot be constructed in `{key}`")]
    #[diagnostic(code(hash::modules::not_a_type))]
    NotAType { key: ModuleKey, name: String, span: Span },

    #[error("module `{key}` failed to load earlier: {cause}")]
    #[diagnostic(code(hash::modules::propagated_failure))]
    PropagatedFailure { key: ModuleKey, cause: Box<ModuleError> },
}

impl ModuleError {
    /// The module this error is about.
    pub fn key(&self) -> Option<&ModuleKey> {
        match self {
            ModuleError::InvalidPath { importer, .. } => importer.as_ref(),
            ModuleError::NotFound { key }
            | ModuleError::Io { key, .. }
            | ModuleError::Parse { key, .. }
            | ModuleError::CircularImport { key, .. }
            | ModuleError::DuplicateExport { key, .. }
            | ModuleError::UnknownExport { key, .. }
            | ModuleError::NameCollision { key, .. }
            | ModuleError::NotANamespace { key, .. }
            | ModuleError::NotAType { key, .. }
            | ModuleError::PropagatedFailure { key, .. } => Some(key),
        }
    }

    /// The module whose source text the [`labels`](Self::labels) point into.
    pub fn source_key(&self) -> Option<&ModuleKey> {
        match self {
            ModuleError::UnknownExport { importer, .. } => Some(importer),
            ModuleError::InvalidPath { importer, .. } => importer.as_ref(),
            ModuleError::Parse { .. }
            | ModuleError::DuplicateExport { .. }
            | ModuleError::NameCollision { .. }
            | ModuleError::NotANamespace { .. }
            | ModuleError::NotAType { .. } => self.key(),
            _ => None,
        }
    }

    /// Source locations worth pointing at, with a short caption each.
    pub fn labels(&self) -> Vec<(Span, String)> {
        match self {
            ModuleError::InvalidPath { span: Some(span), .. } => {
                vec![(*span, "imported here".to_string())]
            }
            ModuleError::DuplicateExport { first, second, .. } => vec![
                (*first, "first defined here".to_string()),
                (*second, "redefined here".to_string()),
            ],
            ModuleError::UnknownExport { name, span, .. } => {
                vec![(*span, format!("`{name}` is not exported"))]
            }
            ModuleError::NameCollision { previous, span, .. } => vec![
                (*previous, "previously bound here".to_string()),
                (*span, "bound again here".to_string()),
            ],
            ModuleError::NotANamespace { span, .. } => {
                vec![(*span, "used as a module here".to_string())]
            }
            ModuleError::NotAType { span, .. } => {
                vec![(*span, "constructed here".to_string())]
            }
            _ => Vec::new(),
        }
    }

    /// Strip [`ModuleError::PropagatedFailure`] wrappers down to the original failure.
    pub fn root_cause(&self) -> &ModuleError {
        match self {
            ModuleError::PropagatedFailure { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}

/// Displays an import chain as `a.hash imports b.hash imports a.hash`.
struct ImportChain<'a>(&'a [ModuleKey]);

impl fmt::Display for ImportChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " imports ")?;
            }
            write!(f, "`{key}`")?;
        }
        Ok(())
    }
}
