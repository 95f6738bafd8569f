//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.
//!
//! Output goes to the writer passed in, so commands can be driven from tests.

use std::io::Write;
use std::path::Path;

use miette::{Diagnostic, LabeledSpan, MietteDiagnostic, NamedSource, Report};

use crate::frontend::errors::ModuleError;
use crate::frontend::module::{Module, ModuleId};
use crate::frontend::resolver::{PathResolver, ResolverConfig};
use crate::frontend::table::{Compilation, ModuleTable};

use super::{CliError, CliResult, ExitCode};

// ============================================================================
// Commands
// ============================================================================

/// Resolve `file` and everything it imports.
pub fn check(out: &mut impl Write, config: ResolverConfig, file: &Path) -> CliResult<ExitCode> {
    let (table, entry) = load(config, file)?;
    let module = table.module(entry);
    write_out(
        out,
        &format!(
            "✓ {} resolved: {} module(s), {} export(s)\n",
            module.key,
            table.len(),
            module.namespace.len()
        ),
    )?;
    Ok(ExitCode::SUCCESS)
}

/// Print every loaded module, dependencies first, with its direct imports.
pub fn deps(out: &mut impl Write, config: ResolverConfig, file: &Path) -> CliResult<ExitCode> {
    let (table, _) = load(config, file)?;
    write_out(out, &format_deps(&table))?;
    Ok(ExitCode::SUCCESS)
}

/// Print the namespace of `file`: one exported name and its kind per line.
pub fn exports(out: &mut impl Write, config: ResolverConfig, file: &Path) -> CliResult<ExitCode> {
    let (table, entry) = load(config, file)?;
    write_out(out, &format_exports(table.module(entry)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Loading
// ============================================================================

fn load(config: ResolverConfig, file: &Path) -> CliResult<(ModuleTable, ModuleId)> {
    let resolver = PathResolver::new(config).map_err(|e| CliError::failure(format!("Error: {e}")))?;
    let cx = Compilation::from_fs(&resolver);
    let mut table = ModuleTable::new();
    match table.load_entry(file, &cx) {
        Ok(entry) => Ok((table, entry)),
        Err(err) => Err(CliError::failure(render(&err, &table))),
    }
}

fn write_out(out: &mut impl Write, text: &str) -> CliResult<()> {
    out.write_all(text.as_bytes())
        .map_err(|e| CliError::failure(format!("Error writing output: {e}")))
}

// ============================================================================
// Formatting
// ============================================================================

/// `module -> dep, dep` per line, in load order.
pub fn format_deps(table: &ModuleTable) -> String {
    let mut text = String::new();
    for &id in table.load_order() {
        let module = table.module(id);
        text.push_str(module.key.relative());
        if !module.dependencies.is_empty() {
            let deps: Vec<&str> = module
                .dependencies
                .iter()
                .map(|&dep| table.module(dep).key.relative())
                .collect();
            text.push_str(" -> ");
            text.push_str(&deps.join(", "));
        }
        text.push('\n');
    }
    text
}

/// Exported names padded to a column, each followed by its declaration kind.
pub fn format_exports(module: &Module) -> String {
    let width = module.namespace.names().map(str::len).max().unwrap_or(0);
    let mut text = String::new();
    for (name, index) in module.namespace.iter() {
        let Some(decl) = module.declarations.get(index) else {
            continue;
        };
        text.push_str(&format!("{name:<width$}  {}\n", decl.kind));
    }
    text
}

/// Render a module error as a diagnostic, with source context when the table still holds the
/// offending module's text.
pub fn render(err: &ModuleError, table: &ModuleTable) -> String {
    let module = err
        .source_key()
        .and_then(|key| table.lookup(key))
        .map(|id| table.module(id));
    let Some(module) = module else {
        return format!("{:?}", Report::new(err.clone()));
    };
    let source = || NamedSource::new(module.key.relative(), module.source.clone());

    if let ModuleError::Parse { errors, .. } = err {
        return errors
            .iter()
            .map(|e| format!("{:?}", Report::new(e.clone()).with_source_code(source())))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let labels = err.labels();
    if labels.is_empty() {
        return format!("{:?}", Report::new(err.clone()));
    }

    let mut diagnostic = MietteDiagnostic::new(err.to_string()).with_labels(
        labels
            .into_iter()
            .map(|(span, text)| LabeledSpan::new_with_span(Some(text), span)),
    );
    if let Some(code) = err.code() {
        diagnostic = diagnostic.with_code(code.to_string());
    }
    if let Some(help) = err.help() {
        diagnostic = diagnostic.with_help(help.to_string());
    }
    format!("{:?}", Report::new(diagnostic).with_source_code(source()))
}
