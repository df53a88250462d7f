//! The rename driver.
//!
//! For one package, the driver builds the scope graph, the selector model
//! and the method groups, then walks every defining identifier in position
//! order and draws candidate names until one passes all safety checks.
//! Commits are atomic: every check precedes every mutation, so a rejected
//! candidate leaves no partial state behind.
//!
//! Skipped outright: blank and dot names, keep-listed names, the package
//! clause name, `init` functions, test functions, and embedded fields
//! (those are renamed with their type). Exported symbols are skipped unless
//! the caller asked for export obfuscation; successful exported renames are
//! recorded for the cross-package rewriter.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use murk_core::config::KeepSet;
use murk_syntax::{IdentId, Object, ObjectKind, Package, Pos, ScopeId, Type, TypeId};

use crate::group::{self, Method};
use crate::idgen::Generator;
use crate::scope::{self, NodeId, ScopeGraph, ScopeInfo};
use crate::selection::Selection;

// TestXxx where Xxx does not start with a lower-case letter.
static RE_TEST_FUNC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Test[^\p{Ll}]").expect("test func regex"));

/// Options for one package's rename pass.
pub struct RenameOptions<'a> {
    /// Rename exported symbols too (internal packages with export
    /// obfuscation enabled).
    pub rename_exported: bool,
    /// Names excluded from renaming.
    pub keep: &'a KeepSet,
    /// Names the generator must never produce for this package (import
    /// aliases in use).
    pub forbid: HashSet<String>,
}

/// Rename every eligible definition in `pkg`, rewrite all use sites, and
/// return the map from definition position to new name. Exported renames
/// are additionally recorded in `renamed_exports`.
pub fn rename_package(
    pkg: &mut Package,
    generator: &Generator,
    opts: &RenameOptions<'_>,
    renamed_exports: &mut HashMap<Pos, String>,
) -> HashMap<Pos, String> {
    let (graph, info) = scope::build(pkg);
    let mut driver = Driver {
        graph,
        info,
        sel: Selection::build(pkg),
        groups: group::group_methods(pkg),
        testing_imported: pkg.imports_path("testing"),
    };

    let mut renamed: HashMap<Pos, String> = HashMap::new();

    let mut defs = pkg.info.defs.clone();
    defs.sort_by_key(|(id, _)| pkg.ident(*id).pos);

    for (ident_id, obj_opt) in defs {
        let ident = pkg.ident(ident_id);
        let pos = ident.pos;
        let name = ident.name.clone();
        if renamed.contains_key(&pos) {
            continue; // renamed with its method group
        }
        if name == "." || name == "_" {
            continue;
        }
        if opts.keep.contains(&pkg.path, &name) {
            tracing::debug!(name = %name, "keeping listed name");
            continue;
        }

        let mut exported = false;
        let field_method = match obj_opt {
            None => {
                if !driver.is_symbolic(pkg, ident_id) {
                    continue; // package clause name
                }
                false
            }
            Some(obj_id) => {
                let obj = pkg.object(obj_id);
                if is_init_func(pkg, obj) {
                    continue;
                }
                if driver.testing_imported && is_test_func(pkg, obj) {
                    tracing::debug!(name = %name, "keeping test function");
                    continue;
                }
                if obj.parent.is_none() {
                    // Methods and struct fields.
                    if obj.is_embedded_field() {
                        continue; // renamed with its type
                    }
                    exported = obj.is_exported();
                    true
                } else {
                    // Exported means package scope and an upper-case initial.
                    exported = obj.parent == Some(ScopeId::PACKAGE) && obj.is_exported();
                    false
                }
            }
        };
        if exported && !opts.rename_exported {
            continue;
        }

        let mut stream = if exported {
            generator.exported(opts.forbid.clone())
        } else {
            generator.unexported(opts.forbid.clone())
        };
        loop {
            let new_name = stream.next_id();
            if new_name == name {
                break; // the current name came up; nothing to change
            }
            let committed = if field_method {
                driver.rename_field_method(pkg, ident_id, &new_name)
            } else {
                driver.rename_scoped(pkg, ident_id, &new_name)
            };
            if !committed.is_empty() {
                for r in committed {
                    let rpos = pkg.ident(r).pos;
                    renamed.insert(rpos, new_name.clone());
                    if exported {
                        renamed_exports.insert(rpos, new_name.clone());
                    }
                }
                break;
            }
        }
    }

    // Overwrite every use site whose referent was renamed.
    for (use_ident, obj_id) in pkg.info.uses.clone() {
        let def_pos = pkg.object(obj_id).pos;
        if let Some(new_name) = renamed.get(&def_pos) {
            pkg.ident_mut(use_ident).name = new_name.clone();
        }
    }

    renamed
}

struct Driver {
    graph: ScopeGraph,
    info: ScopeInfo,
    sel: Selection,
    groups: HashMap<Pos, Vec<Method>>,
    testing_imported: bool,
}

impl Driver {
    /// Whether an object-less definition is a type-switch symbolic
    /// variable (resolved through its use sites).
    fn is_symbolic(&self, pkg: &Package, ident_id: IdentId) -> bool {
        self.info
            .def_objects
            .get(&ident_id)
            .is_some_and(|obj_id| matches!(pkg.object(*obj_id).kind, ObjectKind::Var { .. }))
    }

    /// Whether renaming the definition to `new_name` preserves every
    /// resolution: the new name is definable at the definition, and every
    /// use of the old definition still reaches it.
    fn can_rename_scoped(&self, name: &str, def_pos: Pos, def_scope: NodeId, new_name: &str) -> bool {
        if !self.graph.can_def(def_scope, new_name, def_pos) {
            return false;
        }
        self.info
            .uses
            .lookup(name)
            .iter()
            .filter(|u| u.def == def_pos)
            .all(|u| self.graph.can_use(u.scope, new_name, u.use_pos, def_scope))
    }

    /// Rename a scoped identifier (anything that is not a field or
    /// method). Returns the renamed identifiers, empty on rejection.
    fn rename_scoped(&mut self, pkg: &mut Package, ident_id: IdentId, new_name: &str) -> Vec<IdentId> {
        let ident = pkg.ident(ident_id);
        let (name, pos) = (ident.name.clone(), ident.pos);
        // A named type's rename moves the embedded-field name it injects.
        if !self.sel.can_rename_embedded(pos, new_name) {
            return Vec::new();
        }
        let Some(&def_scope) = self.info.def_scopes.get(&ident_id) else {
            return Vec::new();
        };
        if !self.can_rename_scoped(&name, pos, def_scope, new_name) {
            return Vec::new();
        }

        self.graph.rename_children(def_scope, &name, pos, new_name);
        self.info.uses.rename(&name, |u| u.def == pos, new_name);
        self.info.defs.rename(&name, |d| d.0 == pos, new_name);
        pkg.ident_mut(ident_id).name = new_name.to_string();
        self.sel.rename_embedded(pos, new_name);

        // Embedded fields are named by their type; every struct embedding
        // this type renames its field (and the field's selector uses) too.
        let mut committed = vec![ident_id];
        for emb in embedded_field_defs(pkg, pos) {
            pkg.ident_mut(emb).name = new_name.to_string();
            committed.push(emb);
        }
        committed
    }

    /// Rename a field or method. Methods commit their whole equivalence
    /// class in one step. Returns the renamed identifiers, empty on
    /// rejection.
    fn rename_field_method(
        &mut self,
        pkg: &mut Package,
        ident_id: IdentId,
        new_name: &str,
    ) -> Vec<IdentId> {
        let pos = pkg.ident(ident_id).pos;

        if let Some(members) = self.groups.get(&pos).cloned() {
            for m in &members {
                if !self.sel.can_rename_field_method(pkg.object(m.obj).pos, new_name) {
                    return Vec::new();
                }
            }
            let mut committed = Vec::with_capacity(members.len());
            for m in members {
                let mpos = pkg.object(m.obj).pos;
                let mname = pkg.ident(m.ident).name.clone();
                self.sel.rename_field_method(&mname, mpos, new_name);
                pkg.ident_mut(m.ident).name = new_name.to_string();
                committed.push(m.ident);
            }
            return committed;
        }

        // A plain field.
        if !self.sel.can_rename_field_method(pos, new_name) {
            return Vec::new();
        }
        let name = pkg.ident(ident_id).name.clone();
        self.sel.rename_field_method(&name, pos, new_name);
        pkg.ident_mut(ident_id).name = new_name.to_string();
        vec![ident_id]
    }
}

/// The defining identifiers of every embedded field whose type is defined
/// at `type_pos`.
fn embedded_field_defs(pkg: &Package, type_pos: Pos) -> Vec<IdentId> {
    pkg.info
        .defs
        .iter()
        .filter_map(|(id, obj_opt)| {
            let obj_id = obj_opt.as_ref()?;
            let obj = pkg.object(*obj_id);
            if !obj.is_embedded_field() {
                return None;
            }
            (embedded_type_pos(pkg, obj.ty?)? == type_pos).then_some(*id)
        })
        .collect()
}

/// The definition position of the named type an embedded field denotes,
/// through a pointer if need be.
fn embedded_type_pos(pkg: &Package, ty: TypeId) -> Option<Pos> {
    match pkg.ty(pkg.unalias(ty)) {
        Type::Named { obj, .. } => Some(pkg.object(*obj).pos),
        Type::Pointer { elem } => match pkg.ty(pkg.unalias(*elem)) {
            Type::Named { obj, .. } => Some(pkg.object(*obj).pos),
            _ => None,
        },
        _ => None,
    }
}

/// Whether an object is a package `init` function: receiver-less,
/// parameter-less, result-less, named `init`.
fn is_init_func(pkg: &Package, obj: &Object) -> bool {
    if obj.name != "init" || !matches!(obj.kind, ObjectKind::Func) {
        return false;
    }
    let Some(sig) = obj.ty else { return false };
    matches!(
        pkg.ty(pkg.unalias(sig)),
        Type::Signature {
            recv: None,
            params,
            results,
            ..
        } if params.is_empty() && results.is_empty()
    )
}

/// Whether an object is a test function: `TestXxx` in a `_test` file,
/// receiver-less, exactly one `*testing.T` parameter, no results, no type
/// parameters, not variadic.
fn is_test_func(pkg: &Package, obj: &Object) -> bool {
    let Some(file) = pkg.file_name_of(obj.pos) else {
        return false;
    };
    if !file.ends_with("_test.go") {
        return false;
    }
    if !matches!(obj.kind, ObjectKind::Func) || !RE_TEST_FUNC.is_match(&obj.name) {
        return false;
    }
    let Some(sig) = obj.ty else { return false };
    let Type::Signature {
        recv,
        params,
        results,
        variadic,
        type_params,
    } = pkg.ty(pkg.unalias(sig))
    else {
        return false;
    };
    if recv.is_some() || *variadic || *type_params > 0 {
        return false;
    }
    if params.len() != 1 || !results.is_empty() {
        return false;
    }
    is_testing_t_ptr(pkg, params[0])
}

/// Whether a type is `*testing.T`.
fn is_testing_t_ptr(pkg: &Package, tid: TypeId) -> bool {
    let Type::Pointer { elem } = pkg.ty(pkg.unalias(tid)) else {
        return false;
    };
    match pkg.ty(pkg.unalias(*elem)) {
        Type::Named { obj, .. } => {
            let o = pkg.object(*obj);
            o.name == "T" && o.pkg.as_deref() == Some("testing")
        }
        _ => false,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use murk_syntax::builder::PackageBuilder;
    use murk_syntax::BasicKind;

    fn options(keep: &KeepSet) -> RenameOptions<'_> {
        RenameOptions {
            rename_exported: false,
            keep,
            forbid: HashSet::new(),
        }
    }

    #[test]
    fn renames_defs_and_rewrites_uses() {
        let mut b = PackageBuilder::new("example.com/p");
        let f = b.file_sized("a.go", 200);
        b.def_at("p", f.pos(8), None);
        let int = b.basic(BasicKind::Int);
        let alpha = b.var("alpha", f.pos(20), int, ScopeId::PACKAGE);
        let alpha_def = b.def(alpha);
        let fn_sig = b.signature(None, vec![], vec![]);
        let func = b.func("run", f.pos(40), fn_sig, ScopeId::PACKAGE);
        b.def(func);
        b.scope(f.scope, f.pos(44), f.pos(120));
        let use1 = b.use_at("alpha", f.pos(60), alpha);
        let mut pkg = b.build();

        let gen = Generator::new(["a", "b", "c"]);
        let keep = KeepSet::new();
        let mut exports = HashMap::new();
        let renamed = rename_package(&mut pkg, &gen, &options(&keep), &mut exports);

        let new_name = renamed.get(&f.pos(20)).expect("alpha renamed");
        assert_eq!(&pkg.ident(alpha_def).name, new_name);
        assert_eq!(&pkg.ident(use1).name, new_name);
        assert!(exports.is_empty());
    }

    #[test]
    fn package_clause_is_never_renamed() {
        let mut b = PackageBuilder::new("example.com/p");
        let f = b.file_sized("a.go", 100);
        let clause = b.def_at("p", f.pos(8), None);
        let mut pkg = b.build();

        let gen = Generator::new(["a"]);
        let keep = KeepSet::new();
        let mut exports = HashMap::new();
        rename_package(&mut pkg, &gen, &options(&keep), &mut exports);
        assert_eq!(pkg.ident(clause).name, "p");
    }

    #[test]
    fn collision_with_sibling_makes_the_driver_retry() {
        let mut b = PackageBuilder::new("example.com/p");
        let f = b.file_sized("a.go", 200);
        let int = b.basic(BasicKind::Int);
        let fn_sig = b.signature(None, vec![], vec![]);
        let func = b.func("run", f.pos(10), fn_sig, ScopeId::PACKAGE);
        b.def(func);
        let body = b.scope(f.scope, f.pos(14), f.pos(180));
        let va = b.var("a", f.pos(20), int, body);
        let va_def = b.def(va);
        b.use_at("a", f.pos(40), va);
        let vx = b.var("x", f.pos(30), int, body);
        let vx_def = b.def(vx);
        b.use_at("x", f.pos(50), vx);
        let mut pkg = b.build();

        let gen = Generator::new(["a", "b", "c"]);
        let keep = KeepSet::new();
        let mut exports = HashMap::new();
        rename_package(&mut pkg, &gen, &options(&keep), &mut exports);

        // `a` draws candidate "a" first and keeps its name; `x` must skip
        // "a" (sibling def) and land on "b".
        assert_eq!(pkg.ident(va_def).name, "a");
        assert_eq!(pkg.ident(vx_def).name, "b");
    }

    #[test]
    fn init_and_test_functions_are_kept() {
        let mut b = PackageBuilder::new("example.com/p");
        b.import("testing", None);
        let f = b.file_sized("a_test.go", 200);
        let init_sig = b.signature(None, vec![], vec![]);
        let init = b.func("init", f.pos(10), init_sig, ScopeId::PACKAGE);
        let init_def = b.def(init);

        let t_obj = b.external_type_name("T", "testing", murk_syntax::Pos::NONE);
        let ext = b.external();
        let t_named = b.named(t_obj, ext);
        let t_ptr = b.pointer(t_named);
        let test_sig = b.signature(None, vec![t_ptr], vec![]);
        let test_fn = b.func("TestThing", f.pos(30), test_sig, ScopeId::PACKAGE);
        let test_def = b.def(test_fn);
        let mut pkg = b.build();

        let gen = Generator::new(["a", "b"]);
        let keep = KeepSet::new();
        let mut exports = HashMap::new();
        rename_package(&mut pkg, &gen, &options(&keep), &mut exports);

        assert_eq!(pkg.ident(init_def).name, "init");
        assert_eq!(pkg.ident(test_def).name, "TestThing");
    }

    #[test]
    fn keep_list_is_honored() {
        let mut b = PackageBuilder::new("example.com/p");
        let f = b.file_sized("a.go", 100);
        let int = b.basic(BasicKind::Int);
        let v = b.var("version", f.pos(10), int, ScopeId::PACKAGE);
        let v_def = b.def(v);
        let mut pkg = b.build();

        let gen = Generator::new(["a"]);
        let mut keep = KeepSet::new();
        keep.add("p.version").unwrap();
        let mut exports = HashMap::new();
        rename_package(&mut pkg, &gen, &options(&keep), &mut exports);
        assert_eq!(pkg.ident(v_def).name, "version");
    }

    #[test]
    fn exported_names_need_the_flag() {
        let mut b = PackageBuilder::new("m/internal/u");
        let f = b.file_sized("u.go", 100);
        let int = b.basic(BasicKind::Int);
        let v = b.var("Exported", f.pos(10), int, ScopeId::PACKAGE);
        let v_def = b.def(v);
        let mut pkg = b.build();
        let gen = Generator::new(["A", "B", "a", "b"]);
        let keep = KeepSet::new();

        let mut exports = HashMap::new();
        rename_package(&mut pkg, &gen, &options(&keep), &mut exports);
        assert_eq!(pkg.ident(v_def).name, "Exported");
        assert!(exports.is_empty());

        let opts = RenameOptions {
            rename_exported: true,
            keep: &keep,
            forbid: HashSet::new(),
        };
        let renamed = rename_package(&mut pkg, &gen, &opts, &mut exports);
        let new_name = &renamed[&f.pos(10)];
        assert!(new_name.chars().next().unwrap().is_uppercase());
        assert_eq!(&pkg.ident(v_def).name, new_name);
        assert_eq!(exports.get(&f.pos(10)), Some(new_name));
    }

    #[test]
    fn forbid_set_excludes_import_aliases() {
        let mut b = PackageBuilder::new("example.com/p");
        let f = b.file_sized("a.go", 100);
        let int = b.basic(BasicKind::Int);
        let v = b.var("x", f.pos(10), int, ScopeId::PACKAGE);
        let v_def = b.def(v);
        let mut pkg = b.build();

        let gen = Generator::new(["a", "b"]);
        let keep = KeepSet::new();
        let opts = RenameOptions {
            rename_exported: false,
            keep: &keep,
            forbid: ["a".to_string()].into_iter().collect(),
        };
        let mut exports = HashMap::new();
        rename_package(&mut pkg, &gen, &opts, &mut exports);
        assert_eq!(pkg.ident(v_def).name, "b", "candidate a is forbidden");
    }
}
