//! Parser unit tests.
//!
//! These cover each top-level form and the parser's recovery behaviour (one error per broken item,
//! no cascades).

use super::*;
use crate::lexer;

fn parse_str(source: &str) -> Result<Program, Vec<SyntaxError>> {
    let tokens = lexer::lex(source).map_err(|_| vec![])?;
    parse(&tokens)
}

fn single_decl(source: &str) -> Decl {
    let program = parse_str(source).unwrap();
    assert_eq!(program.items.len(), 1);
    match program.items.into_iter().next().map(|i| i.node) {
        Some(Item::Decl(decl)) => decl,
        other => panic!("Expected declaration, got {:?}", other),
    }
}

fn single_import(source: &str) -> ImportDecl {
    let program = parse_str(source).unwrap();
    assert_eq!(program.items.len(), 1);
    match program.items.into_iter().next().map(|i| i.node) {
        Some(Item::Import(import)) => import,
        other => panic!("Expected import, got {:?}", other),
    }
}

#[test]
fn test_parse_variable() {
    let decl = single_decl("answer := 42;");
    assert_eq!(decl.name.node, "answer");
    assert_eq!(decl.kind, DeclKind::Variable);
    assert_eq!(decl.body, Span::new(10, 12));
}

#[test]
fn test_parse_typed_variable() {
    let decl = single_decl("limit: u32 = 10;");
    assert_eq!(decl.name.node, "limit");
    assert_eq!(decl.kind, DeclKind::Variable);
}

#[test]
fn test_parse_function() {
    let decl = single_decl("add := (a: i32, b: i32) -> i32 => a + b;");
    assert_eq!(decl.kind, DeclKind::Function);

    let decl = single_decl("noop := () => {};");
    assert_eq!(decl.kind, DeclKind::Function);
}

#[test]
fn test_parenthesised_expression_is_variable() {
    let decl = single_decl("x := (1 + 2) * 3;");
    assert_eq!(decl.kind, DeclKind::Variable);
}

#[test]
fn test_parse_type_definitions() {
    assert_eq!(single_decl("Point := struct(x: f64, y: f64);").kind, DeclKind::TypeDef);
    assert_eq!(single_decl("Color := enum(Red, Green);").kind, DeclKind::TypeDef);
    assert_eq!(single_decl("Show := trait { show: (Self) -> str; };").kind, DeclKind::TypeDef);
    assert_eq!(single_decl("Id := type u64;").kind, DeclKind::TypeDef);
}

#[test]
fn test_identifier_named_type_is_variable() {
    assert_eq!(single_decl("kind := type;").kind, DeclKind::Variable);
}

#[test]
fn test_block_body_with_inner_semicolons() {
    let decl = single_decl("main := () => { a := 1; b := 2; };");
    assert_eq!(decl.kind, DeclKind::Function);
}

#[test]
fn test_parse_bare_import() {
    let import = single_import("import(\"lib/sub/c\");");
    assert_eq!(import.path.node, "lib/sub/c");
    assert_eq!(import.target, ImportTarget::Bare);
}

#[test]
fn test_parse_alias_import() {
    let import = single_import("c := import(\"lib/sub/c\");");
    match import.target {
        ImportTarget::Alias(alias) => assert_eq!(alias.node, "c"),
        other => panic!("Expected alias import, got {:?}", other),
    }
}

#[test]
fn test_parse_destructuring_import_with_rename() {
    let import = single_import("{Point: LibPoint, Line,} := import(\"lib/a\");");
    assert_eq!(import.path.node, "lib/a");
    let ImportTarget::Destructure(entries) = import.target else {
        panic!("Expected destructuring import");
    };
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name.node, "Point");
    assert_eq!(entries[0].local().node, "LibPoint");
    assert_eq!(entries[1].name.node, "Line");
    assert!(entries[1].alias.is_none());
    assert_eq!(entries[1].local().node, "Line");
}

#[test]
fn test_parse_empty_destructuring_import() {
    let import = single_import("{} := import(\"lib/a\");");
    assert_eq!(import.target, ImportTarget::Destructure(vec![]));
}

#[test]
fn test_import_path_must_be_string() {
    let err = parse_str("a := import(lib);").unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err[0].message.contains("import path which should be a string"));
}

#[test]
fn test_destructuring_requires_import() {
    let err = parse_str("{a, b} := pair;").unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err[0].message.contains("import(...)"));
}

#[test]
fn test_nested_import_rejected() {
    let err = parse_str("x := f(import(\"a\"));").unwrap_err();
    assert!(err[0].message.contains("must be bound directly"));
}

#[test]
fn test_qualified_refs_recorded() {
    let decl = single_decl("p := c::Foo { x = geo::origin; };");
    let refs: Vec<_> = decl
        .qualified_refs
        .iter()
        .map(|r| (r.node.to_string(), r.node.constructs))
        .collect();
    assert_eq!(refs, vec![("c::Foo".to_string(), true), ("geo::origin".to_string(), false)]);
    assert_eq!(decl.qualified_refs[0].span, Span::new(5, 11));
}

#[test]
fn test_qualified_refs_in_type_annotation() {
    let decl = single_decl("p: geo::Point = make();");
    assert_eq!(decl.qualified_refs.len(), 1);
    assert_eq!(decl.qualified_refs[0].node.member(), "Point");
}

#[test]
fn test_nested_qualified_path_recorded_whole() {
    let decl = single_decl("x := a::b::Foo { };");
    assert_eq!(decl.qualified_refs.len(), 1);
    let reference = &decl.qualified_refs[0];
    assert_eq!(reference.node.path, vec!["a", "b", "Foo"]);
    assert_eq!(reference.node.root(), "a");
    assert!(reference.node.constructs);
    assert_eq!(reference.span, Span::new(5, 14));
}

#[test]
fn test_trailing_path_separator_ends_the_path() {
    let decl = single_decl("x := a::b::(1);");
    assert_eq!(decl.qualified_refs.len(), 1);
    assert_eq!(decl.qualified_refs[0].node.path, vec!["a", "b"]);
    assert!(!decl.qualified_refs[0].node.constructs);
}

#[test]
fn test_missing_semicolon() {
    let err = parse_str("x := 1").unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err[0].message.contains("Expected `;`"), "got: {}", err[0].message);
}

#[test]
fn test_unmatched_closer() {
    let err = parse_str("x := 1);").unwrap_err();
    assert!(err[0].message.contains("Unmatched `)`"));
}

#[test]
fn test_unclosed_delimiter_points_at_opener() {
    let err = parse_str("x := f(1;").unwrap_err();
    assert_eq!(err[0].message, "Unclosed delimiter");
    assert_eq!(err[0].span, Span::new(6, 7));
}

#[test]
fn test_recovers_after_error() {
    let source = "1 := 2;\ngood := 3;\n:= bad;\nalso_good := 4;";
    let err = parse_str(source).unwrap_err();
    assert_eq!(err.len(), 2, "one error per broken item: {:?}", err);
}

#[test]
fn test_items_keep_source_order() {
    let source = r#"
        a := 1;
        {b} := import("lib/b");
        c := import("lib/c");
        import("lib/d");
        e := () => a;
    "#;
    let program = parse_str(source).unwrap();
    let shapes: Vec<&str> = program
        .items
        .iter()
        .map(|item| match &item.node {
            Item::Decl(_) => "decl",
            Item::Import(ImportDecl { target: ImportTarget::Bare, .. }) => "bare",
            Item::Import(ImportDecl { target: ImportTarget::Alias(_), .. }) => "alias",
            Item::Import(ImportDecl { target: ImportTarget::Destructure(_), .. }) => "destructure",
        })
        .collect();
    assert_eq!(shapes, vec!["decl", "destructure", "alias", "bare", "decl"]);
}

#[test]
fn test_stray_semicolons_ignored() {
    let program = parse_str(";; a := 1;;").unwrap();
    assert_eq!(program.items.len(), 1);
}

#[test]
fn test_empty_source() {
    let program = parse_str("").unwrap();
    assert!(program.items.is_empty());
}
