//! Cross-package propagation of renamed internal exports.
//!
//! `m/internal/u` defines an exported `Foo`; `m/top` uses it and must be
//! rewritten; `n/other` cannot import the internal package at all, so the
//! rewriter skips it.

use std::collections::{HashMap, HashSet};

use murk_core::config::KeepSet;
use murk_engine::crosspkg::{can_import, is_internal_package, rename_used_exports};
use murk_engine::idgen::Generator;
use murk_engine::rename::{rename_package, RenameOptions};
use murk_syntax::builder::PackageBuilder;
use murk_syntax::{BasicKind, IdentId, Package, Pos, ScopeId};

fn internal_package() -> (Package, Pos, IdentId) {
    let mut b = PackageBuilder::new("m/internal/u");
    let f = b.file_sized("u.go", 100);
    let int = b.basic(BasicKind::Int);
    let foo = b.var("Foo", f.pos(20), int, ScopeId::PACKAGE);
    let foo_def = b.def(foo);
    (b.build(), f.pos(20), foo_def)
}

fn importer(path: &str, base: u32, foo_pos: Pos) -> (Package, IdentId) {
    let mut b = PackageBuilder::new(path);
    b.start_at(base);
    let f = b.file_sized("use.go", 100);
    let foo = b.external_type_name("Foo", "m/internal/u", foo_pos);
    let use_foo = b.use_at("Foo", f.pos(30), foo);
    (b.build(), use_foo)
}

#[test]
fn internal_exports_propagate_to_legal_importers_only() {
    let (mut u, foo_pos, foo_def) = internal_package();
    let (mut top, top_use) = importer("m/top", 1000, foo_pos);
    let (other, other_use) = importer("n/other", 2000, foo_pos);

    assert!(is_internal_package(&u.path));

    // Pass 1: rename the internal package with export obfuscation on.
    let gen = Generator::new(["X", "Y", "a", "b"]);
    let keep = KeepSet::new();
    let opts = RenameOptions {
        rename_exported: true,
        keep: &keep,
        forbid: HashSet::new(),
    };
    let mut exports = HashMap::new();
    rename_package(&mut u, &gen, &opts, &mut exports);

    let new_foo = u.ident(foo_def).name.clone();
    assert_ne!(new_foo, "Foo");
    assert!(new_foo.chars().next().unwrap().is_uppercase());
    assert_eq!(exports.get(&foo_pos), Some(&new_foo));

    // Pass 2: only the subtree under m/ may import m/internal/u.
    assert!(can_import(&u.path, &top.path));
    assert!(!can_import(&u.path, &other.path));

    rename_used_exports(&mut top, &exports);
    assert_eq!(top.ident(top_use).name, new_foo);

    // n/other is skipped by the pipeline; its text never changes.
    assert_eq!(other.ident(other_use).name, "Foo");
}
