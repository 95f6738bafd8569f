//! End-to-end tests for module resolution against real project directories.

use std::fs;
use std::path::Path;

use hashc::frontend::imports::{LocalBinding, QualifiedTarget};
use hashc::{Compilation, DeclarationKind, ModuleError, ModuleId, ModuleTable, PathResolver, ResolverConfig};
use tempfile::TempDir;

/// Write `files` (root-relative path, source) into a fresh project directory.
fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, source) in files {
        let path = dir.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, source).unwrap();
    }
    dir
}

fn resolver(root: &Path) -> PathResolver {
    PathResolver::new(ResolverConfig::new(root)).unwrap()
}

fn load(root: &Path, entry: &str) -> (ModuleTable, Result<ModuleId, ModuleError>) {
    let resolver = resolver(root);
    let cx = Compilation::from_fs(&resolver);
    let mut table = ModuleTable::new();
    let result = table.load_entry(Path::new(entry), &cx);
    (table, result)
}

#[test]
fn test_geometry_project_resolves() {
    let dir = project(&[
        (
            "main.hash",
            r#"
            // Qualified and destructured imports of the same library.
            geo := import("lib/geometry");
            {Point: P, distance} := import("./lib/geometry.hash");
            import("lib/shapes/circle");

            origin := geo::Point { x = 0.0; y = 0.0; };
            unit := circle::Circle { centre = origin; radius = 1.0; };
            main := () => {
                d := distance(origin, geo::Point { x = 1.0; y = 1.0; });
            };
            "#,
        ),
        (
            "lib/geometry.hash",
            r#"
            Point := struct(x: f64, y: f64);
            distance := (a: Point, b: Point) -> f64 => 0.0;
            "#,
        ),
        (
            "lib/shapes/circle.hash",
            r#"
            {Point} := import("../geometry");
            Circle := struct(centre: Point, radius: f64);
            "#,
        ),
    ]);

    let (table, result) = load(dir.path(), "main.hash");
    let main = result.unwrap();
    assert_eq!(table.len(), 3);

    let module = table.module(main);
    assert_eq!(
        module.namespace.names().collect::<Vec<_>>(),
        vec!["origin", "unit", "main"]
    );
    assert_eq!(module.export("main").map(|d| d.kind), Some(DeclarationKind::Function));
    assert!(matches!(module.scope.lookup("geo"), Some(LocalBinding::Namespace(_))));
    assert!(matches!(module.scope.lookup("circle"), Some(LocalBinding::Namespace(_))));
    assert!(matches!(module.scope.lookup("P"), Some(LocalBinding::Imported(_))));
    assert!(!module.scope.contains("Point"));

    let QualifiedTarget::Declaration(circle) = table.resolve_qualified(main, &["circle", "Circle"]).unwrap() else {
        panic!("Expected a declaration");
    };
    assert_eq!(table.declaration(circle).map(|d| d.kind), Some(DeclarationKind::TypeDef));
}

#[test]
fn test_cycle_across_directories() {
    let dir = project(&[
        ("main.hash", "import(\"a/x\");"),
        ("a/x.hash", "import(\"../b/y\");"),
        ("b/y.hash", "import(\"../a/x\");"),
    ]);
    let (table, result) = load(dir.path(), "main.hash");
    let err = result.unwrap_err();
    let ModuleError::CircularImport { chain, .. } = &err else {
        panic!("Expected CircularImport, got {err:?}");
    };
    let chain: Vec<&str> = chain.iter().map(|k| k.relative()).collect();
    assert_eq!(chain, vec!["a/x.hash", "b/y.hash", "a/x.hash"]);
    assert!(table.load_order().is_empty());
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = project(&[("main.hash", "import(\"lib/nope\");")]);
    let (_, result) = load(dir.path(), "main.hash");
    let err = result.unwrap_err();
    assert!(matches!(err, ModuleError::NotFound { ref key } if key.relative() == "lib/nope.hash"));
}

#[test]
fn test_directory_import_is_io_error() {
    let dir = project(&[("main.hash", "import(\"lib\");"), ("lib.hash/inner.hash", "x := 1;")]);
    let (_, result) = load(dir.path(), "main.hash");
    assert!(matches!(result, Err(ModuleError::Io { .. })));
}

#[test]
fn test_escape_from_root_is_rejected() {
    let dir = project(&[("app/main.hash", "import(\"../../secret\");")]);
    let (_, result) = load(dir.path(), "app/main.hash");
    assert!(matches!(result, Err(ModuleError::InvalidPath { .. })));
}

#[test]
fn test_entry_outside_root_is_rejected() {
    let dir = project(&[("main.hash", "x := 1;")]);
    let other = tempfile::tempdir().unwrap();
    let (_, result) = load(dir.path(), &other.path().join("main.hash").to_string_lossy());
    assert!(matches!(result, Err(ModuleError::InvalidPath { importer: None, .. })));
}

#[test]
fn test_custom_extension() {
    let dir = project(&[("main.hs", "import(\"util\");"), ("util.hs", "x := 1;")]);
    let resolver = PathResolver::new(ResolverConfig::new(dir.path()).with_extension("hs")).unwrap();
    let cx = Compilation::from_fs(&resolver);
    let mut table = ModuleTable::new();
    assert!(table.load_entry(Path::new("main.hs"), &cx).is_ok());
    assert_eq!(table.len(), 2);
}

#[test]
fn test_one_table_serves_several_entries() {
    let dir = project(&[
        ("one.hash", "{shared} := import(\"common\");"),
        ("two.hash", "c := import(\"common\");"),
        ("common.hash", "shared := 1;"),
    ]);
    let resolver = resolver(dir.path());
    let cx = Compilation::from_fs(&resolver);
    let mut table = ModuleTable::new();

    let one = table.load_entry(Path::new("one.hash"), &cx).unwrap();
    let two = table.load_entry(Path::new("two.hash"), &cx).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.module(one).dependencies, table.module(two).dependencies);
}

#[test]
fn test_nested_path_and_enum_variants() {
    let dir = project(&[
        (
            "main.hash",
            r#"
            app := import("app");
            {Mode} := import("app/config");
            default := app::config::Settings { mode = Mode::Fast; };
            "#,
        ),
        ("app.hash", "config := import(\"app/config\");"),
        (
            "app/config.hash",
            r#"
            Mode := enum(Fast, Safe);
            Settings := struct(mode: Mode);
            fallback := Mode::Safe;
            "#,
        ),
    ]);
    let (table, result) = load(dir.path(), "main.hash");
    let main = result.unwrap();
    let QualifiedTarget::Declaration(settings) = table.resolve_qualified(main, &["app", "config", "Settings"]).unwrap()
    else {
        panic!("Expected a declaration");
    };
    assert_eq!(table.declaration(settings).map(|d| d.name.as_str()), Some("Settings"));
}
