//! End-to-end scenarios for the rename engine: shadowing refusal,
//! interface lockstep, generic-aware grouping, embedded-field linkage, and
//! ambiguity prevention.

use std::collections::{HashMap, HashSet};

use murk_core::config::KeepSet;
use murk_engine::idgen::Generator;
use murk_engine::rename::{rename_package, RenameOptions};
use murk_engine::selection::Selection;
use murk_syntax::builder::PackageBuilder;
use murk_syntax::{BasicKind, Package, Pos, ScopeId};

fn run(pkg: &mut Package, seeds: &[&str], rename_exported: bool) -> HashMap<Pos, String> {
    let gen = Generator::new(seeds.iter().copied());
    let keep = KeepSet::new();
    let opts = RenameOptions {
        rename_exported,
        keep: &keep,
        forbid: HashSet::new(),
    };
    let mut exports = HashMap::new();
    rename_package(pkg, &gen, &opts, &mut exports)
}

// ----------------------------------------------------------------------------
// Scenario: shadowing refusal.
//
//   package p
//   var a = 1
//   func f() { var b = a }
//
// Renaming b to `a` would capture the use of the package-level a in f's
// body; the driver must skip that candidate and take the next one.
// ----------------------------------------------------------------------------
#[test]
fn shadowing_candidate_is_refused() {
    let mut b = PackageBuilder::new("example.com/p");
    let f = b.file_sized("a.go", 200);
    b.def_at("p", f.pos(8), None);
    let int = b.basic(BasicKind::Int);
    let var_a = b.var("a", f.pos(14), int, ScopeId::PACKAGE);
    let a_def = b.def(var_a);
    let sig = b.signature(None, vec![], vec![]);
    let func_f = b.func("f", f.pos(30), sig, ScopeId::PACKAGE);
    b.def(func_f);
    let body = b.scope(f.scope, f.pos(34), f.pos(90));
    let var_b = b.var("b", f.pos(44), int, body);
    let b_def = b.def(var_b);
    let a_use = b.use_at("a", f.pos(52), var_a);
    let mut pkg = b.build();

    run(&mut pkg, &["a", "x"], false);

    // a drew candidate "a" and kept its name; its use is untouched.
    assert_eq!(pkg.ident(a_def).name, "a");
    assert_eq!(pkg.ident(a_use).name, "a");
    // b was offered "a" first and had to refuse it.
    assert_ne!(pkg.ident(b_def).name, "a");
}

// ----------------------------------------------------------------------------
// Scenario: interface satisfaction lockstep.
//
//   type I interface{ F(int) }
//   type A int; func (A) F(int) {}
//   type B int; func (B) F(int) {}
//
// The three F's form one equivalence class; a rename commits them all to
// the same new name, so both concrete types keep satisfying I.
// ----------------------------------------------------------------------------
#[test]
fn interface_methods_rename_in_lockstep() {
    let mut b = PackageBuilder::new("example.com/p");
    let f = b.file_sized("a.go", 400);
    let int = b.basic(BasicKind::Int);

    let i_obj = b.type_name("I", f.pos(10), Some(ScopeId::PACKAGE));
    let placeholder = b.external();
    let i_named = b.named(i_obj, placeholder);
    let fi_sig = b.signature(Some(i_named), vec![int], vec![]);
    let fi = b.method("F", f.pos(22), fi_sig);
    let i_lit = b.interface_type(f.pos(18), vec![fi], vec![]);
    b.set_underlying(i_named, i_lit);
    b.def(i_obj);
    let fi_def = b.def(fi);

    let a_obj = b.type_name("A", f.pos(50), Some(ScopeId::PACKAGE));
    let a_named = b.named(a_obj, int);
    let fa_sig = b.signature(Some(a_named), vec![int], vec![]);
    let fa = b.method("F", f.pos(60), fa_sig);
    b.add_method(a_named, fa);
    b.def(a_obj);
    let fa_def = b.def(fa);

    let b_obj = b.type_name("B", f.pos(80), Some(ScopeId::PACKAGE));
    let b_named = b.named(b_obj, int);
    let fb_sig = b.signature(Some(b_named), vec![int], vec![]);
    let fb = b.method("F", f.pos(90), fb_sig);
    b.add_method(b_named, fb);
    b.def(b_obj);
    let fb_def = b.def(fb);

    // A call site of A.F.
    let f_use = b.use_at("F", f.pos(120), fa);

    let mut pkg = b.build();
    run(&mut pkg, &["A", "B", "C", "a", "b"], true);

    let new_name = pkg.ident(fa_def).name.clone();
    assert_ne!(new_name, "F");
    assert_eq!(pkg.ident(fb_def).name, new_name, "B.F follows A.F");
    assert_eq!(pkg.ident(fi_def).name, new_name, "I.F follows A.F");
    assert_eq!(pkg.ident(f_use).name, new_name, "call site follows");
    assert!(new_name.chars().next().unwrap().is_uppercase());
}

// ----------------------------------------------------------------------------
// Scenario: generic-aware grouping.
//
//   type I interface{ F(int) }
//   type G[T int|string] struct{}
//   func (G[T]) F(T) {}
//
// The instantiation T=int makes G[T].F a plausible implementation of I.F,
// so the two rename together.
// ----------------------------------------------------------------------------
#[test]
fn generic_method_groups_with_interface_method() {
    let mut b = PackageBuilder::new("example.com/p");
    let f = b.file_sized("a.go", 400);
    let int = b.basic(BasicKind::Int);
    let string = b.basic(BasicKind::String);

    let i_obj = b.type_name("I", f.pos(10), Some(ScopeId::PACKAGE));
    let placeholder = b.external();
    let i_named = b.named(i_obj, placeholder);
    let fi_sig = b.signature(Some(i_named), vec![int], vec![]);
    let fi = b.method("F", f.pos(22), fi_sig);
    let i_lit = b.interface_type(f.pos(18), vec![fi], vec![]);
    b.set_underlying(i_named, i_lit);
    b.def(i_obj);
    let fi_def = b.def(fi);

    let g_obj = b.type_name("G", f.pos(50), Some(ScopeId::PACKAGE));
    let g_struct = b.struct_type(f.pos(58), vec![]);
    let g_named = b.named_generic(g_obj, g_struct, 1);
    let constraint_union = b.union(vec![
        murk_syntax::Term {
            tilde: false,
            ty: int,
        },
        murk_syntax::Term {
            tilde: false,
            ty: string,
        },
    ]);
    let constraint = b.interface_type(f.pos(54), vec![], vec![constraint_union]);
    let t_param = b.type_param(constraint);
    let fg_sig = b.signature(Some(g_named), vec![t_param], vec![]);
    let fg = b.method("F", f.pos(70), fg_sig);
    b.add_method(g_named, fg);
    b.def(g_obj);
    let fg_def = b.def(fg);

    let mut pkg = b.build();
    run(&mut pkg, &["A", "B", "a", "b"], true);

    let new_name = pkg.ident(fg_def).name.clone();
    assert_ne!(new_name, "F");
    assert_eq!(pkg.ident(fi_def).name, new_name, "I.F renamed with G.F");
}

// ----------------------------------------------------------------------------
// Scenario: embedded-field promotion.
//
//   type A struct{ X int }
//   type B struct{ A }
//
// The embedded field is named by its type; renaming A moves the field name
// in B and every selector through it, and X stays reachable by promotion.
// ----------------------------------------------------------------------------
fn embedded_fixture() -> (Package, EmbeddedMarks) {
    let mut b = PackageBuilder::new("example.com/p");
    let f = b.file_sized("a.go", 400);
    let int = b.basic(BasicKind::Int);

    let a_obj = b.type_name("A", f.pos(10), Some(ScopeId::PACKAGE));
    let (x_obj, x_field) = b.field_def("X", f.pos(20), int, false);
    let a_struct = b.struct_type(f.pos(16), vec![x_field]);
    let a_named = b.named(a_obj, a_struct);
    b.def(a_obj);
    b.def(x_obj);

    let b_obj = b.type_name("B", f.pos(50), Some(ScopeId::PACKAGE));
    let (emb_obj, emb_field) = b.field_def("A", f.pos(60), a_named, true);
    let b_struct_pos = f.pos(56);
    let b_struct = b.struct_type(b_struct_pos, vec![emb_field]);
    b.named(b_obj, b_struct);
    b.def(b_obj);
    // The embedded field ident both defines the field and uses the type.
    let emb_def = b.def(emb_obj);
    let emb_use = b.use_at("A", f.pos(60), a_obj);

    // A selector b.A.X somewhere in a function body.
    let sel_use = b.use_at("A", f.pos(120), emb_obj);
    let x_use = b.use_at("X", f.pos(126), x_obj);

    let marks = EmbeddedMarks {
        a_pos: f.pos(10),
        x_pos: f.pos(20),
        b_struct_pos,
        emb_def,
        emb_use,
        sel_use,
        x_use,
    };
    (b.build(), marks)
}

struct EmbeddedMarks {
    a_pos: Pos,
    x_pos: Pos,
    b_struct_pos: Pos,
    emb_def: murk_syntax::IdentId,
    emb_use: murk_syntax::IdentId,
    sel_use: murk_syntax::IdentId,
    x_use: murk_syntax::IdentId,
}

#[test]
fn renaming_a_type_renames_its_embedded_fields() {
    let (mut pkg, m) = embedded_fixture();
    let renamed = run(&mut pkg, &["Z", "Q", "z", "q"], true);

    let new_a = renamed.get(&m.a_pos).expect("A renamed").clone();
    assert_eq!(pkg.ident(m.emb_use).name, new_a, "embedded field follows type");
    assert_eq!(pkg.ident(m.sel_use).name, new_a, "selector follows type");
    assert_eq!(pkg.ident(m.emb_def).name, new_a, "field def follows type");

    // X was renamed on its own, and every X selector followed.
    let new_x = renamed.get(&m.x_pos).expect("X renamed");
    assert_ne!(new_x, &new_a, "embedded name and field stay distinct");
    assert_eq!(&pkg.ident(m.x_use).name, new_x);
}

#[test]
fn embedded_rename_keeps_promotion_reachable() {
    let (pkg, m) = embedded_fixture();
    let mut sel = Selection::build(&pkg);

    assert_eq!(sel.depth_of(m.b_struct_pos, false, "X"), 1, "one hop before");
    assert!(sel.can_rename_embedded(m.a_pos, "Z"));
    sel.rename_embedded(m.a_pos, "Z");

    // The embedded slot answers to its new name; promotion is unchanged.
    assert_eq!(sel.depth_of(m.b_struct_pos, false, "Z"), 0);
    assert_eq!(sel.depth_of(m.b_struct_pos, false, "A"), -1);
    assert_eq!(sel.depth_of(m.b_struct_pos, false, "X"), 1, "one hop after");

    // Renaming X to the embedded slot's name would shadow the promotion.
    assert!(!sel.can_rename_field_method(m.x_pos, "Z"));
}

// ----------------------------------------------------------------------------
// Scenario: ambiguity prevention.
//
//   type A struct{ X int }
//   type D struct{ foo int }
//   type C struct{ A; D }
//
// C.X currently resolves through A; renaming D.foo to X would tie the
// promotion depths and break that selector, so it is rejected.
// ----------------------------------------------------------------------------
#[test]
fn rename_that_would_create_ambiguity_is_rejected() {
    let mut b = PackageBuilder::new("example.com/p");
    let f = b.file_sized("a.go", 400);
    let int = b.basic(BasicKind::Int);

    let a_obj = b.type_name("A", f.pos(10), Some(ScopeId::PACKAGE));
    let (_, x_field) = b.field_def("X", f.pos(20), int, false);
    let a_struct = b.struct_type(f.pos(16), vec![x_field]);
    let a_named = b.named(a_obj, a_struct);
    b.def(a_obj);

    let d_obj = b.type_name("D", f.pos(40), Some(ScopeId::PACKAGE));
    let (foo_obj, foo_field) = b.field_def("foo", f.pos(50), int, false);
    let d_struct = b.struct_type(f.pos(46), vec![foo_field]);
    let d_named = b.named(d_obj, d_struct);
    b.def(d_obj);
    b.def(foo_obj);

    let c_obj = b.type_name("C", f.pos(80), Some(ScopeId::PACKAGE));
    let (emb_a_obj, emb_a) = b.field_def("A", f.pos(90), a_named, true);
    let (emb_d_obj, emb_d) = b.field_def("D", f.pos(95), d_named, true);
    let c_struct = b.struct_type(f.pos(86), vec![emb_a, emb_d]);
    b.named(c_obj, c_struct);
    b.def(c_obj);
    b.def(emb_a_obj);
    b.use_at("A", f.pos(90), a_obj);
    b.def(emb_d_obj);
    b.use_at("D", f.pos(95), d_obj);

    let pkg = b.build();
    let sel = Selection::build(&pkg);

    let foo_pos = f.pos(50);
    assert!(
        !sel.can_rename_field_method(foo_pos, "X"),
        "X would become ambiguous on C"
    );
    assert!(sel.can_rename_field_method(foo_pos, "Y"));

    // C.X resolves through A today; that is what the rejection protects.
    assert_eq!(sel.depth_of(f.pos(86), false, "X"), 1);
}
