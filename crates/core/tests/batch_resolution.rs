//! Stateless resolution over temporary source trees.

mod common;

use common::{Workspace, caps, id_of, source};
use gnodriver_api::{ErrorKind, PackageId};
use gnodriver_core::graph::ResolvedGraph;
use gnodriver_core::{BatchLoader, GnoRoot};

fn resolve(gno_root: Option<GnoRoot>, patterns: &[String]) -> ResolvedGraph {
    BatchLoader::new(caps(), gno_root, None)
        .unwrap()
        .resolve(patterns)
}

#[test]
fn test_directories_without_manifest_are_skipped() {
    let ws = Workspace::new();
    ws.package("a", "gno.land/p/demo/a", &[("a.gno", source("a", &[]))]);
    ws.package("b", "gno.land/p/demo/b", &[("b.gno", source("b", &[]))]);
    ws.package("c", "gno.land/p/demo/c", &[("c.gno", source("c", &[]))]);
    ws.write("d/d.gno", &source("d", &[]));

    let graph = resolve(None, &[ws.recursive("")]);

    assert_eq!(graph.packages.len(), 3);
    assert_eq!(graph.roots.len(), 3);
    let names: Vec<_> = graph.packages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_file_pattern_resolves_owning_package() {
    let ws = Workspace::new();
    let x = ws.package("pkgX", "gno.land/p/demo/x", &[("x.gno", source("x", &[]))]);
    ws.package("pkgY", "gno.land/p/demo/y", &[("y.gno", source("y", &[]))]);

    let graph = resolve(None, &[ws.file_pattern("pkgX")]);
    assert_eq!(graph.roots, vec![PackageId::new(id_of(&x))]);
    assert_eq!(graph.packages.len(), 1);

    let graph = resolve(None, &[ws.file_pattern("pkgX/x.gno")]);
    assert_eq!(graph.roots, vec![PackageId::new(id_of(&x))]);
}

#[test]
fn test_file_pattern_without_owner_yields_nothing() {
    let ws = Workspace::new();
    ws.write("loose/loose.gno", &source("loose", &[]));

    let graph = resolve(None, &[ws.file_pattern("loose/loose.gno")]);
    assert!(graph.roots.is_empty());
    assert!(graph.packages.is_empty());
}

#[test]
fn test_unresolved_imports_are_dropped() {
    let ws = Workspace::new();
    let a = ws.package(
        "a",
        "gno.land/p/demo/a",
        &[("a.gno", source("a", &["b/c", "z/missing"]))],
    );
    let b = ws.package("b", "b/c", &[("b.gno", source("c", &[]))]);

    let graph = resolve(None, &[ws.recursive("")]);
    let pkg_a = graph
        .packages
        .iter()
        .find(|p| p.id.as_str() == id_of(&a))
        .unwrap();

    assert_eq!(pkg_a.imports.get("b/c"), Some(&PackageId::new(id_of(&b))));
    assert!(!pkg_a.imports.contains_key("z/missing"));
    assert!(pkg_a.raw_imports.contains("z/missing"));
}

#[test]
fn test_name_vote() {
    let ws = Workspace::new();
    ws.package(
        "majority",
        "gno.land/p/demo/majority",
        &[
            ("a.gno", source("foo", &[])),
            ("b.gno", source("bar", &[])),
            ("c.gno", source("foo", &[])),
        ],
    );
    ws.package(
        "tie",
        "gno.land/p/demo/tie",
        &[("a.gno", source("bar", &[])), ("b.gno", source("foo", &[]))],
    );

    let graph = resolve(None, &[ws.recursive("")]);
    assert_eq!(graph.packages[0].name, "foo");
    assert_eq!(graph.packages[1].name, "bar");
}

#[test]
fn test_malformed_manifest_is_isolated() {
    let ws = Workspace::new();
    ws.package("a", "gno.land/p/demo/a", &[("a.gno", source("a", &[]))]);
    ws.package("b", "gno.land/p/demo/b", &[("b.gno", source("b", &[]))]);
    ws.package("c", "gno.land/p/demo/c", &[("c.gno", source("c", &[]))]);
    ws.write("broken/gno.mod", "module gno.land/p/demo/broken\nfrobnicate x\n");
    ws.write("broken/broken.gno", &source("broken", &[]));
    ws.package(
        "broken/nested",
        "gno.land/p/demo/nested",
        &[("n.gno", source("nested", &[]))],
    );

    let graph = resolve(None, &[ws.recursive("")]);
    let paths: Vec<_> = graph.packages.iter().map(|p| p.pkg_path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "gno.land/p/demo/a",
            "gno.land/p/demo/b",
            "gno.land/p/demo/nested",
            "gno.land/p/demo/c",
        ]
    );
}

#[test]
fn test_header_syntax_error_drops_package() {
    let ws = Workspace::new();
    ws.package("good", "gno.land/p/demo/good", &[("g.gno", source("good", &[]))]);
    ws.package(
        "bad",
        "gno.land/p/demo/bad",
        &[
            ("a.gno", source("bad", &[])),
            ("b.gno", "import \"std\"\n".to_string()),
        ],
    );
    ws.package(
        "late",
        "gno.land/p/demo/late",
        &[("l.gno", "package late\n\nfunc broken( {\n")],
    );

    let graph = resolve(None, &[ws.recursive("")]);
    let paths: Vec<_> = graph.packages.iter().map(|p| p.pkg_path.as_str()).collect();
    assert_eq!(paths, vec!["gno.land/p/demo/good", "gno.land/p/demo/late"]);
}

#[test]
fn test_file_lists() {
    let ws = Workspace::new();
    let dir = ws.package(
        "files",
        "gno.land/p/demo/files",
        &[
            ("b.gno", source("files", &[])),
            ("a.gno", source("files", &[])),
            ("a_test.gno", source("files", &["testing"])),
            ("z0_filetest.gno", source("main", &[])),
            (".hidden.gno", source("hidden", &[])),
            ("README.md", "# files\n".to_string()),
        ],
    );
    ws.write("files/sub/ignored.gno", &source("sub", &[]));

    let graph = resolve(None, &[ws.file_pattern("files")]);
    let pkg = &graph.packages[0];

    let file = |name: &str| dir.join(name).display().to_string();
    assert_eq!(pkg.source_files, vec![file("a.gno"), file("b.gno")]);
    assert_eq!(pkg.other_files, vec![file("README.md"), file("gno.mod")]);
    assert!(!pkg.raw_imports.contains("testing"));
}

#[test]
fn test_package_without_sources_reports_list_error() {
    let ws = Workspace::new();
    let dir = ws.package("empty", "gno.land/p/demo/empty", &[("notes.txt", "")]);

    let graph = resolve(None, &[ws.recursive("")]);
    assert_eq!(graph.packages.len(), 1);

    let pkg = &graph.packages[0];
    assert_eq!(pkg.name, "");
    assert_eq!(pkg.errors.len(), 1);
    assert_eq!(pkg.errors[0].kind, ErrorKind::ListError);
    assert_eq!(
        pkg.errors[0].msg,
        format!("no Gno source files in {}", dir.display())
    );
}

#[test]
fn test_stdlibs_and_examples_are_injected() {
    let ws = Workspace::new();
    ws.write("gno/gnovm/stdlibs/std/std.gno", &source("std", &[]));
    ws.write("gno/gnovm/stdlibs/std/README.md", "stdlib\n");
    ws.write(
        "gno/gnovm/stdlibs/crypto/sha256/sha256.gno",
        &source("sha256", &[]),
    );
    ws.write("gno/gnovm/stdlibs/empty/notes.txt", "");
    let avl = ws.package(
        "gno/examples/gno.land/p/demo/avl",
        "gno.land/p/demo/avl",
        &[("avl.gno", source("avl", &["std"]))],
    );
    let app = ws.package(
        "work/app",
        "gno.land/r/demo/app",
        &[(
            "app.gno",
            source("app", &["std", "gno.land/p/demo/avl", "strings"]),
        )],
    );

    let graph = resolve(ws.gno_root("gno"), &[ws.recursive("work")]);

    let ids: Vec<_> = graph.packages.iter().map(|p| p.id.to_string()).collect();
    assert_eq!(
        ids,
        vec![
            "crypto/sha256".to_string(),
            "std".to_string(),
            id_of(&app),
            id_of(&avl),
        ]
    );
    assert_eq!(graph.roots, vec![PackageId::new(id_of(&app))]);

    let std = &graph.packages[1];
    assert_eq!(std.pkg_path, "std");
    assert!(std.other_files.is_empty());

    let app_pkg = &graph.packages[2];
    assert_eq!(app_pkg.imports.get("std"), Some(&PackageId::new("std")));
    assert_eq!(
        app_pkg.imports.get("gno.land/p/demo/avl"),
        Some(&PackageId::new(id_of(&avl)))
    );
    assert!(!app_pkg.imports.contains_key("strings"));

    let avl_pkg = &graph.packages[3];
    assert_eq!(avl_pkg.imports.get("std"), Some(&PackageId::new("std")));
}

#[test]
fn test_explicit_example_pattern_is_root() {
    let ws = Workspace::new();
    ws.write("gno/gnovm/stdlibs/.keep", "");
    let avl = ws.package(
        "gno/examples/gno.land/p/demo/avl",
        "gno.land/p/demo/avl",
        &[("avl.gno", source("avl", &[]))],
    );

    let graph = resolve(
        ws.gno_root("gno"),
        &[ws.file_pattern("gno/examples/gno.land/p/demo/avl/avl.gno")],
    );
    assert_eq!(graph.packages.len(), 1);
    assert_eq!(graph.roots, vec![PackageId::new(id_of(&avl))]);
}

#[test]
fn test_overlapping_patterns_collapse() {
    let ws = Workspace::new();
    let a = ws.package("a", "gno.land/p/demo/a", &[("a.gno", source("a", &[]))]);
    let b = ws.package("b", "gno.land/p/demo/b", &[("b.gno", source("b", &[]))]);

    let graph = resolve(
        None,
        &[
            ws.file_pattern("b"),
            "bogus".to_string(),
            ws.recursive(""),
        ],
    );
    assert_eq!(graph.packages.len(), 2);
    assert_eq!(
        graph.roots,
        vec![PackageId::new(id_of(&b)), PackageId::new(id_of(&a))]
    );
}

#[test]
fn test_duplicate_package_path_first_wins() {
    let ws = Workspace::new();
    let first = ws.package("dup1", "gno.land/p/demo/dup", &[("d.gno", source("dup", &[]))]);
    ws.package("dup2", "gno.land/p/demo/dup", &[("d.gno", source("dup", &[]))]);
    ws.package(
        "user",
        "gno.land/p/demo/user",
        &[("u.gno", source("user", &["gno.land/p/demo/dup"]))],
    );

    let graph = resolve(None, &[ws.recursive("")]);
    assert_eq!(graph.packages.len(), 3);
    assert_eq!(
        graph.packages[2].imports.get("gno.land/p/demo/dup"),
        Some(&PackageId::new(id_of(&first)))
    );
}

#[test]
fn test_missing_scan_root() {
    let ws = Workspace::new();
    let graph = resolve(None, &[ws.recursive("does-not-exist")]);
    assert!(graph.packages.is_empty());
    assert!(graph.roots.is_empty());
}

#[test]
fn test_resolution_is_deterministic() {
    let ws = Workspace::new();
    for i in 0..8 {
        let next = format!("gno.land/p/demo/p{}", (i + 1) % 8);
        ws.package(
            &format!("p{i}"),
            &format!("gno.land/p/demo/p{i}"),
            &[("p.gno", source(&format!("p{i}"), &[next.as_str()]))],
        );
    }

    let loader = BatchLoader::new(caps(), None, Some(4)).unwrap();
    let first = serde_json::to_string(&loader.resolve(&[ws.recursive("")]).into_response()).unwrap();
    let second =
        serde_json::to_string(&loader.resolve(&[ws.recursive("")]).into_response()).unwrap();
    assert_eq!(first, second);
}
