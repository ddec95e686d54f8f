//! End-to-end symbol propagation scenarios.
//!
//! Graphs are wired the way the builder produces them: entry dependencies
//! hang off the root, assets own their outgoing dependency nodes, and
//! dependencies point at their target asset (directly, or through an asset
//! group where resolution matters).

use rustc_hash::FxHashSet;

use braid_core::SourceLocation;

use super::Fixture;

/// Scenario: a single named re-export that the importer does use, while
/// the intermediary itself uses nothing.
///
/// `index -> lib.js (export {bar} from './b') -> b.js (export const bar)`
#[test]
fn test_single_named_reexport() {
    let mut f = Fixture::new();
    let a = f.asset("lib.js", false, Some(&[("bar", "$bar", true)]));
    let b = f.asset("b.js", false, Some(&[("bar", "bar", false)]));
    let d1 = f.dep("index->lib", None, Some(&[("bar", "bar", false)]));
    f.connect(d1, a);
    let d2 = f.dep("lib->b", Some(a), Some(&[("bar", "$bar", true)]));
    f.connect(d2, b);

    let errors = f.propagate();

    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(f.down(d2), vec!["bar"]);
    // The re-export is not a use of lib.js itself.
    assert!(f.used(a).is_empty());
    assert_eq!(f.used(b), vec!["bar"]);
    // The import resolves through the side-effect-free intermediary
    // straight to b.js.
    assert_eq!(
        f.up(d1),
        vec![("bar".into(), Some(("b.js".into(), Some("bar".into()))))]
    );
    f.assert_clean(&[]);
    f.assert_down_superset_of_up();
}

/// Scenario: the re-exported symbol does not exist at the target.
#[test]
fn test_missing_export_reports_single_diagnostic() {
    let loc = SourceLocation::new("lib.js", (1, 10), (1, 13));

    let mut f = Fixture::new();
    let a = f.asset("lib.js", false, Some(&[("bar", "$bar", true)]));
    let b = f.asset("b.js", false, Some(&[("foo", "foo", false)]));
    let d1 = f.dep("index->lib", None, Some(&[("bar", "bar", false)]));
    f.connect(d1, a);
    let d2 = f.dep("lib->b", Some(a), Some(&[("bar", "$bar", true)]));
    f.set_dep_symbol_loc(d2, "bar", loc.clone());
    f.connect(d2, b);

    let errors = f.propagate();

    // Exactly one diagnostic, at the re-exporting dependency, naming the
    // file that failed to provide the symbol.
    assert_eq!(errors.len(), 1);
    let diagnostics = errors.get(&d2).expect("diagnostic keyed by the offending dependency");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("does not export 'bar'"));
    assert_eq!(
        diagnostics[0].file.as_deref(),
        Some(std::path::Path::new("b.js"))
    );
    assert_eq!(diagnostics[0].loc.as_ref(), Some(&loc));

    // The importer still resolves, degraded, against the intermediary.
    assert_eq!(
        f.up(d1),
        vec![("bar".into(), Some(("lib.js".into(), Some("bar".into()))))]
    );
    f.assert_down_superset_of_up();
}

/// Scenario: a namespace import of an asset that re-exports two namespaces
/// both providing the same name. The name is ambiguous, so the
/// intermediary is forced into a runtime namespace lookup.
#[test]
fn test_ambiguous_namespace_reexport_falls_back_to_namespace() {
    let mut f = Fixture::new();
    let a = f.asset("lib.js", false, Some(&[]));
    let x = f.asset("x.js", false, Some(&[("a", "a", false)]));
    let y = f.asset("y.js", false, Some(&[("a", "a", false)]));
    let d1 = f.dep(
        "index->lib",
        None,
        Some(&[("*", "ns", false), ("a", "a", false)]),
    );
    f.connect(d1, a);
    let dx = f.dep("lib->x", Some(a), Some(&[("*", "*", true)]));
    f.connect(dx, x);
    let dy = f.dep("lib->y", Some(a), Some(&[("*", "*", true)]));
    f.connect(dy, y);

    let errors = f.propagate();

    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    // The forced namespace import shows up on the intermediary.
    assert!(f.used(a).contains(&"*".to_string()));
    // Both namespace re-exports carry the full deferred request.
    assert!(f.down(dx).contains(&"*".to_string()));
    assert!(f.down(dy).contains(&"*".to_string()));
    // The ambiguous name resolves to the intermediary itself, where the
    // runtime lookup can happen.
    let up = f.up(d1);
    assert!(up.contains(&("a".into(), Some(("lib.js".into(), Some("a".into()))))));
    f.assert_down_superset_of_up();
}

/// Running propagation twice without mutations returns an equal error map
/// and leaves no dirty flags beyond the erroring assets.
#[test]
fn test_propagation_is_a_fixpoint() {
    let mut f = Fixture::new();
    let a = f.asset("lib.js", false, Some(&[("bar", "$bar", true)]));
    let b = f.asset("b.js", false, Some(&[("foo", "foo", false)]));
    let d1 = f.dep("index->lib", None, Some(&[("bar", "bar", false)]));
    f.connect(d1, a);
    let d2 = f.dep("lib->b", Some(a), Some(&[("bar", "$bar", true)]));
    f.connect(d2, b);

    let first = f.propagate();
    let snapshot = f.up(d1);

    let second = f.propagate_changed(&FxHashSet::default(), Some(first.clone()));

    assert_eq!(first, second);
    assert_eq!(f.up(d1), snapshot);
    f.assert_clean(&[b]);
}

/// A weak re-export nobody requests is shaken off entirely: nothing is
/// requested through its dependency.
#[test]
fn test_unused_weak_reexport_requests_nothing() {
    let mut f = Fixture::new();
    let a = f.asset(
        "lib.js",
        false,
        Some(&[("pub", "pub", false), ("priv", "$priv", true)]),
    );
    let b = f.asset("b.js", false, Some(&[("priv", "priv", false)]));
    let d1 = f.dep("index->lib", None, Some(&[("pub", "pub", false)]));
    f.connect(d1, a);
    let db = f.dep("lib->b", Some(a), Some(&[("priv", "$priv", true)]));
    f.connect(db, b);

    let errors = f.propagate();

    assert!(errors.is_empty());
    assert_eq!(f.used(a), vec!["pub"]);
    assert!(f.down(db).is_empty());
    assert!(f.used(b).is_empty());
    assert!(f.up(db).is_empty());
    f.assert_clean(&[]);
}

/// A dependency with an empty request whose sole target is a
/// side-effect-free asset group is marked excluded.
#[test]
fn test_unused_dependency_through_asset_group_is_excluded() {
    let mut f = Fixture::new();
    let a = f.asset(
        "lib.js",
        false,
        Some(&[("pub", "pub", false), ("priv", "$priv", true)]),
    );
    let b = f.asset("b.js", false, Some(&[("priv", "priv", false)]));
    let d1 = f.dep("index->lib", None, Some(&[("pub", "pub", false)]));
    f.connect(d1, a);
    let db = f.dep("lib->b", Some(a), Some(&[("priv", "$priv", true)]));
    let group = f.graph.add_asset_group("group:b.js", "b.js", false).unwrap();
    f.connect(db, group);
    f.connect(group, b);

    let errors = f.propagate();

    assert!(errors.is_empty());
    let dep = f.graph.dependency_node(db).unwrap();
    assert!(dep.used_symbols_up.is_empty());
    assert!(dep.excluded);

    // The used sibling dependency is not excluded.
    let entry = f.graph.dependency_node(d1).unwrap();
    assert!(!entry.excluded);
}

/// Entry assets keep their outgoing requests even when nothing marks
/// their own exports as used.
#[test]
fn test_entry_asset_keeps_outgoing_requests() {
    let mut f = Fixture::new();
    let a = f.asset("entry.js", false, Some(&[]));
    let b = f.asset("b.js", false, Some(&[("x", "x", false)]));
    // An entry dependency without symbol data marks the target as entry.
    let d1 = f.dep("index->entry", None, None);
    f.connect(d1, a);
    let db = f.dep("entry->b", Some(a), Some(&[("x", "x", false)]));
    f.connect(db, b);

    let errors = f.propagate();

    assert!(errors.is_empty());
    assert_eq!(f.down(db), vec!["x"]);
    assert_eq!(f.used(b), vec!["x"]);
    f.assert_clean(&[]);
}

/// An incoming dependency with cleared symbols makes the asset expose its
/// whole export table.
#[test]
fn test_cleared_symbols_use_every_export() {
    let mut f = Fixture::new();
    let c = f.asset("c.js", true, None);
    let a = f.asset("lib.js", false, Some(&[("a", "a", false), ("b", "b", false)]));
    let d1 = f.dep("index->c", None, None);
    f.connect(d1, c);
    // A dependency whose requested bindings escaped analysis.
    let dc = f.dep("c->lib", Some(c), None);
    f.connect(dc, a);

    let errors = f.propagate();

    assert!(errors.is_empty());
    assert_eq!(f.used(a), vec!["a", "b"]);
}

/// A namespace import requests the whole target namespace.
#[test]
fn test_namespace_import_requests_star() {
    let mut f = Fixture::new();
    let a = f.asset("a.js", false, Some(&[("a", "a", false)]));
    let d1 = f.dep("index->a", None, Some(&[("*", "ns", false)]));
    f.connect(d1, a);

    let errors = f.propagate();

    assert!(errors.is_empty());
    assert_eq!(f.used(a), vec!["*"]);
    assert_eq!(
        f.up(d1),
        vec![("*".into(), Some(("a.js".into(), Some("*".into()))))]
    );
}

/// A missing name is not reported through an `export * from` dependency;
/// the error surfaces once, at the original import site.
#[test]
fn test_missing_export_not_reported_through_namespace_reexport() {
    let mut f = Fixture::new();
    let a = f.asset("lib.js", false, Some(&[]));
    let x = f.asset("x.js", false, Some(&[("a", "a", false)]));
    let d1 = f.dep("index->lib", None, Some(&[("zzz", "zzz", false)]));
    f.connect(d1, a);
    let dx = f.dep("lib->x", Some(a), Some(&[("*", "*", true)]));
    f.connect(dx, x);

    let errors = f.propagate();

    // No diagnostic at the re-exporting dependency, one at the import.
    assert_eq!(errors.len(), 1);
    let diagnostics = errors.get(&d1).expect("error keyed by the importing dependency");
    assert!(diagnostics[0].message.contains("does not export 'zzz'"));
    assert!(!errors.contains_key(&dx));
}

/// Scenario: incremental re-propagation after fixing a missing export.
/// Only the changed asset and its transitive importers move; the fix
/// clears the previous diagnostic.
#[test]
fn test_incremental_propagation_clears_fixed_error() {
    let mut f = Fixture::new();
    let a = f.asset("lib.js", false, Some(&[("x", "$x", true)]));
    let b = f.asset("b.js", false, Some(&[]));
    let d1 = f.dep("index->lib", None, Some(&[("x", "x", false)]));
    f.connect(d1, a);
    let db = f.dep("lib->b", Some(a), Some(&[("x", "$x", true)]));
    f.connect(db, b);

    let first = f.propagate();
    assert_eq!(first.len(), 1);
    assert!(first.contains_key(&db));

    // The user adds the export to b.js.
    let b_handle = f.graph.asset_node(b).unwrap().asset;
    let x = f.sym("x");
    f.db.asset_mut(b_handle).set_symbols(vec![braid_core::AssetSymbol {
        exported: x,
        local: x,
        flags: braid_core::SymbolFlags::empty(),
        loc: None,
    }]);

    let changed: FxHashSet<String> = FxHashSet::from_iter(["b.js".to_string()]);
    let second = f.propagate_changed(&changed, Some(first));

    assert!(second.is_empty(), "fixed error should clear: {second:?}");
    assert_eq!(f.used(b), vec!["x"]);
    assert_eq!(
        f.up(d1),
        vec![("x".into(), Some(("b.js".into(), Some("x".into()))))]
    );
    f.assert_clean(&[]);
}

/// Scenario: an unrelated change leaves every other node's symbol sets
/// untouched.
#[test]
fn test_incremental_propagation_is_stable_for_unrelated_nodes() {
    let mut f = Fixture::new();
    let a = f.asset("a.js", false, Some(&[("one", "one", false)]));
    let b = f.asset("b.js", false, Some(&[("two", "two", false)]));
    let d1 = f.dep("index->a", None, Some(&[("one", "one", false)]));
    f.connect(d1, a);
    let d2 = f.dep("index->b", None, Some(&[("two", "two", false)]));
    f.connect(d2, b);

    let first = f.propagate();
    assert!(first.is_empty());
    let a_before = (f.used(a), f.up(d1));

    // Re-propagate with only b.js changed.
    let changed: FxHashSet<String> = FxHashSet::from_iter(["b.js".to_string()]);
    let second = f.propagate_changed(&changed, Some(first));

    assert!(second.is_empty());
    assert_eq!((f.used(a), f.up(d1)), a_before);
    f.assert_clean(&[]);
}

/// Cyclic imports settle to a fixpoint instead of looping.
#[test]
fn test_cyclic_graph_terminates() {
    let mut f = Fixture::new();
    let a = f.asset(
        "a.js",
        false,
        Some(&[("a", "a", false), ("b", "$b", true)]),
    );
    let b = f.asset(
        "b.js",
        false,
        Some(&[("b", "b", false), ("a", "$a", true)]),
    );
    let d1 = f.dep("index->a", None, Some(&[("a", "a", false), ("b", "b", false)]));
    f.connect(d1, a);
    let dab = f.dep("a->b", Some(a), Some(&[("b", "$b", true)]));
    f.connect(dab, b);
    let dba = f.dep("b->a", Some(b), Some(&[("a", "$a", true)]));
    f.connect(dba, a);

    let errors = f.propagate();

    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(f.used(a), vec!["a"]);
    assert_eq!(f.used(b), vec!["b"]);
    assert_eq!(
        f.up(d1),
        vec![
            ("a".into(), Some(("a.js".into(), Some("a".into())))),
            ("b".into(), Some(("b.js".into(), Some("b".into())))),
        ]
    );
    f.assert_clean(&[]);
    f.assert_down_superset_of_up();
}

/// On a graph large enough to skip the full sweep, an incremental
/// re-propagation of an unchanged leaf settles immediately and disturbs
/// nothing upstream.
#[test]
fn test_queue_mode_incremental_chain() {
    let mut f = Fixture::new();
    let names = ["a1.js", "a2.js", "a3.js", "a4.js"];
    let exports = ["x1", "x2", "x3", "x4"];
    let assets: Vec<_> = names
        .iter()
        .zip(exports)
        .map(|(name, export)| f.asset(name, false, Some(&[(export, export, false)])))
        .collect();

    let d1 = f.dep("index->a1", None, Some(&[("x1", "x1", false)]));
    f.connect(d1, assets[0]);
    let mut deps = vec![d1];
    for i in 0..3 {
        let key = format!("a{}->a{}", i + 1, i + 2);
        let dep = f.dep(
            &key,
            Some(assets[i]),
            Some(&[(exports[i + 1], exports[i + 1], false)]),
        );
        f.connect(dep, assets[i + 1]);
        deps.push(dep);
    }

    let first = f.propagate();
    assert!(first.is_empty());
    let snapshot: Vec<_> = deps.iter().map(|&d| (f.down(d), f.up(d))).collect();

    // Re-propagate with only the leaf marked changed. With 9 nodes and a
    // single seed this goes through the work queue, not the full sweep.
    let changed: FxHashSet<String> = FxHashSet::from_iter(["a4.js".to_string()]);
    let second = f.propagate_changed(&changed, Some(first));

    assert!(second.is_empty());
    let after: Vec<_> = deps.iter().map(|&d| (f.down(d), f.up(d))).collect();
    assert_eq!(snapshot, after);
    f.assert_clean(&[]);
}

/// `used_symbols_up` keys come back in ascending symbol order.
#[test]
fn test_resolution_keys_are_ordered() {
    let mut f = Fixture::new();
    let a = f.asset(
        "a.js",
        false,
        Some(&[("zeta", "zeta", false), ("alpha", "alpha", false), ("mid", "mid", false)]),
    );
    let d1 = f.dep(
        "index->a",
        None,
        Some(&[("zeta", "zeta", false), ("alpha", "alpha", false), ("mid", "mid", false)]),
    );
    f.connect(d1, a);

    let errors = f.propagate();
    assert!(errors.is_empty());

    let dep = f.graph.dependency_node(d1).unwrap();
    let keys: Vec<_> = dep.used_symbols_up.keys().copied().collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(keys.len(), 3);
}
