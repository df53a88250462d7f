//! Cross-package propagation of renamed exports.
//!
//! A package is internal when its path ends in an `internal` element or
//! contains one; only packages rooted at the element's parent may import
//! it. After every package is renamed, the use sites of an internal
//! package's renamed exports are rewritten in each importer the path rule
//! admits.

use std::collections::HashMap;

use murk_syntax::{Package, Pos};

/// Byte index of the `internal` path element, or `None` when the path is
/// not an internal package path. A path *starting* with `internal` is not
/// internal (it has no parent to restrict imports to).
fn internal_pos(pkg_path: &str) -> Option<usize> {
    let idx = if let Some(stripped) = pkg_path.strip_suffix("/internal") {
        stripped.len()
    } else {
        pkg_path.rfind("/internal/")?
    };
    if idx > 0 {
        Some(idx)
    } else {
        None
    }
}

/// Whether `pkg_path` names an internal package.
pub fn is_internal_package(pkg_path: &str) -> bool {
    internal_pos(pkg_path).is_some()
}

/// Whether `pkg` may import the internal package at `internal_pkg`: it
/// must be the parent of the `internal` element or live under it.
///
/// # Panics
/// Panics when `internal_pkg` is not an internal path; callers check with
/// [`is_internal_package`] first.
pub fn can_import(internal_pkg: &str, pkg: &str) -> bool {
    let Some(idx) = internal_pos(internal_pkg) else {
        panic!("not an internal package");
    };
    let parent = &internal_pkg[..idx + 1];
    let mut pkg = pkg.to_string();
    if !pkg.ends_with('/') {
        pkg.push('/');
    }
    pkg.starts_with(parent)
}

/// Rewrite every use site in `pkg` whose referent's definition position is
/// in the exported-rename table.
pub fn rename_used_exports(pkg: &mut Package, renamed: &HashMap<Pos, String>) {
    for (use_ident, obj_id) in pkg.info.uses.clone() {
        let def_pos = pkg.object(obj_id).pos;
        if let Some(new_name) = renamed.get(&def_pos) {
            tracing::debug!(
                old = %pkg.ident(use_ident).name,
                new = %new_name,
                "rewriting exported use"
            );
            pkg.ident_mut(use_ident).name = new_name.clone();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
