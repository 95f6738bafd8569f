#![forbid(unsafe_code)]
//! Hash module resolver
//!
//! Resolves `import("...")` expressions across a multi-file Hash project: canonical module keys,
//! a per-run module cache with cycle detection, exported namespaces and qualified or destructured
//! import bindings. The `hash` binary in this crate drives it from the command line.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module
//!   enforces `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod frontend;

pub use frontend::ast;
pub use frontend::diagnostics;

pub use frontend::errors::{ModuleError, PathError};
pub use frontend::loader::{FsLoader, MemoryLoader, ModuleParser, SourceLoader, SyntaxParser};
pub use frontend::module::{DeclRef, Declaration, DeclarationKind, Module, ModuleId, ModuleKey, ModuleState};
pub use frontend::resolver::{PathResolver, ResolverConfig};
pub use frontend::table::{Compilation, ModuleTable};
