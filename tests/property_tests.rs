//! Property-based tests for the Hash module resolver
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use std::path::{Path, PathBuf};

use hashc::frontend::errors::PathError;
use hashc::frontend::resolver::{PathResolver, ResolverConfig};
use proptest::prelude::*;

const ROOT: &str = "/project";

fn resolver() -> PathResolver {
    PathResolver::new(ResolverConfig::new(ROOT)).unwrap()
}

// Strategy for generating path segments
fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}"
}

fn segments_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment_strategy(), 1..4)
}

fn dir_for(segments: &[String]) -> PathBuf {
    segments.iter().fold(PathBuf::from(ROOT), |dir, s| dir.join(s))
}

// =============================================================================
// Path Resolution Properties
// =============================================================================

proptest! {
    /// Property: every spelling of the same location yields the same key
    #[test]
    fn equivalent_spellings_resolve_equal(
        dir in prop::collection::vec(segment_strategy(), 0..3),
        target in segments_strategy(),
        detour in segment_strategy(),
    ) {
        let r = resolver();
        let dir = dir_for(&dir);
        let plain = target.join("/");

        let expected = r.resolve(&dir, &plain).unwrap();
        let spellings = [
            format!("./{plain}.hash"),
            target.join("//"),
            target.join("/./"),
            format!("{detour}/../{plain}"),
            target.join("\\"),
        ];
        for spelling in &spellings {
            prop_assert_eq!(&r.resolve(&dir, spelling).unwrap(), &expected, "spelling {:?}", spelling);
        }
    }

    /// Property: keys are normalized (no `.`/`..` segments, extension present, under the root)
    #[test]
    fn keys_are_normalized(
        dir in prop::collection::vec(segment_strategy(), 0..3),
        target in segments_strategy(),
    ) {
        let r = resolver();
        let key = r.resolve(&dir_for(&dir), &format!("./{}", target.join("/./"))).unwrap();

        prop_assert!(key.relative().ends_with(".hash"));
        prop_assert!(key.relative().split('/').all(|s| !s.is_empty() && s != "." && s != ".."));
        prop_assert!(key.path().starts_with(ROOT));
        let expected = Path::new(ROOT).join(key.relative());
        prop_assert_eq!(key.path(), expected.as_path());
    }

    /// Property: resolving a key's relative path from the root gives the key back
    #[test]
    fn resolution_is_idempotent(
        dir in prop::collection::vec(segment_strategy(), 0..3),
        target in segments_strategy(),
    ) {
        let r = resolver();
        let key = r.resolve(&dir_for(&dir), &target.join("/")).unwrap();
        let again = r.resolve(Path::new(ROOT), key.relative()).unwrap();
        prop_assert_eq!(key, again);
    }

    /// Property: `../x` from a subdirectory equals `x` from its parent
    #[test]
    fn parent_segments_climb_one_directory(
        dir in prop::collection::vec(segment_strategy(), 0..3),
        child in segment_strategy(),
        target in segments_strategy(),
    ) {
        let r = resolver();
        let parent = dir_for(&dir);
        let from_child = r.resolve(&parent.join(&child), &format!("../{}", target.join("/"))).unwrap();
        let from_parent = r.resolve(&parent, &target.join("/")).unwrap();
        prop_assert_eq!(from_child, from_parent);
    }

    /// Property: climbing above the root is always rejected
    #[test]
    fn climbing_above_root_is_rejected(
        dir in prop::collection::vec(segment_strategy(), 0..3),
        extra in 1usize..3,
        target in segment_strategy(),
    ) {
        let r = resolver();
        let raw = format!("{}{}", "../".repeat(dir.len() + extra), target);
        let result = r.resolve(&dir_for(&dir), &raw);
        prop_assert!(matches!(result, Err(PathError::EscapesRoot(_))), "got {:?}", result);
    }

    /// Property: the default alias of a module is its final segment
    #[test]
    fn base_name_is_final_segment(target in segments_strategy()) {
        let key = resolver().resolve(Path::new(ROOT), &target.join("/")).unwrap();
        prop_assert_eq!(key.base_name(), target.last().unwrap().as_str());
    }
}

// =============================================================================
// Parser Properties
// =============================================================================

fn ident_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_]{0,8}".prop_filter("Not a keyword", |s| {
        !matches!(s.as_str(), "import" | "struct" | "enum" | "trait" | "type")
    })
}

proptest! {
    /// Property: destructuring imports keep every entry, in order, with its rename
    #[test]
    fn destructuring_entries_survive_parsing(
        entries in prop::collection::vec((ident_strategy(), prop::option::of(ident_strategy())), 0..6),
        path in segments_strategy(),
    ) {
        use hashc::ast::{ImportTarget, Item};

        let pattern: Vec<String> = entries
            .iter()
            .map(|(name, alias)| match alias {
                Some(alias) => format!("{name}: {alias}"),
                None => name.clone(),
            })
            .collect();
        let source = format!("{{{}}} := import(\"{}\");", pattern.join(", "), path.join("/"));

        let program = hash_syntax::parse_source(&source).unwrap();
        prop_assert_eq!(program.items.len(), 1);
        let Item::Import(import) = &program.items[0].node else {
            return Err(TestCaseError::fail("expected an import"));
        };
        let ImportTarget::Destructure(parsed) = &import.target else {
            return Err(TestCaseError::fail("expected a destructuring import"));
        };
        prop_assert_eq!(parsed.len(), entries.len());
        for (parsed, (name, alias)) in parsed.iter().zip(&entries) {
            prop_assert_eq!(&parsed.name.node, name);
            prop_assert_eq!(&parsed.local().node, alias.as_ref().unwrap_or(name));
        }
    }

    /// Property: arbitrary input never panics the parser
    #[test]
    fn parser_does_not_panic(source in "[ -~\n]{0,80}") {
        let _ = hash_syntax::parse_source(&source);
    }
}
