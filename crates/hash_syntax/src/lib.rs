//! Declaration-level syntax frontend for Hash: lexer, AST, parser, diagnostics.
//!
//! The parser only understands the *top level* of a module: bindings (`name := expr;`), typed
//! bindings (`name: Type = expr;`) and the three `import(...)` forms. Declaration bodies are kept
//! as opaque spans; the only thing extracted from them are the `alias::Name` references the module
//! resolver needs to validate.
//!
//! ## Notes
//! - This crate is intentionally "syntax-only": it does no path resolution, module loading or name
//!   binding. Those live in the `hashc` crate's `frontend` module.
//!
//! ## Examples
//! ```rust,no_run
//! use hash_syntax::{lexer, parser};
//!
//! let tokens = lexer::lex("{Point: P} := import(\"lib/a\");\n").unwrap();
//! let program = parser::parse(&tokens).unwrap();
//! assert_eq!(program.items.len(), 1);
//! ```

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;

/// Lex and parse a whole source file in one step.
///
/// Lexer errors short-circuit parsing, matching how the compiler reports them.
pub fn parse_source(source: &str) -> Result<ast::Program, Vec<diagnostics::SyntaxError>> {
    let tokens = lexer::lex(source)?;
    parser::parse(&tokens)
}
