//! Hash module system
//!
//! This module contains the components that turn a set of source files into resolved modules:
//! - `resolver`: import path → canonical [`ModuleKey`](module::ModuleKey)
//! - `loader`: source reading and parsing collaborators
//! - `table`: the per-run module cache and cycle detector
//! - `namespace`: exported-name maps
//! - `imports`: import binding and local scopes
//! - `module`: the module record and its declarations
//! - `errors`: the error taxonomy

// Syntax components are provided by the hash_syntax crate.
pub use hash_syntax::{ast, diagnostics, lexer, parser};

pub mod errors;
pub mod imports;
pub mod loader;
pub mod module;
pub mod namespace;
pub mod resolver;
pub mod table;
