//! Method grouping.
//!
//! Every declared method in a package lands in an equivalence class with
//! the methods it may share an interface method with (see
//! [`crate::signature::impl_same_method`]). A class is the rename-atomic
//! unit: one rename commits every member to the same new name.
//!
//! Classes are the connected components of the pairwise relation, computed
//! with a union-find.

use std::collections::HashMap;

use murk_syntax::{IdentId, ObjectId, ObjectKind, Package, Pos, Type};

use crate::signature::impl_same_method;

/// A declared method: its defining identifier and object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Method {
    pub ident: IdentId,
    pub obj: ObjectId,
}

/// Group all declared methods of a package. The result maps each method's
/// definition position to its full equivalence class (itself included).
pub fn group_methods(pkg: &Package) -> HashMap<Pos, Vec<Method>> {
    let mut methods = Vec::new();
    for (ident_id, obj_opt) in &pkg.info.defs {
        let Some(obj_id) = obj_opt else { continue };
        let obj = pkg.object(*obj_id);
        if !matches!(obj.kind, ObjectKind::Func) {
            continue;
        }
        let Some(sig) = obj.ty else { continue };
        if !matches!(pkg.ty(pkg.unalias(sig)), Type::Signature { recv: Some(_), .. }) {
            continue; // skip plain funcs
        }
        methods.push(Method {
            ident: *ident_id,
            obj: *obj_id,
        });
    }

    let mut uf = UnionFind::new(methods.len());
    for i in 0..methods.len() {
        for j in (i + 1)..methods.len() {
            if impl_same_method(pkg, methods[i].obj, methods[j].obj) {
                uf.union(i, j);
            }
        }
    }

    let mut classes: HashMap<usize, Vec<Method>> = HashMap::new();
    for (i, m) in methods.iter().enumerate() {
        classes.entry(uf.find(i)).or_default().push(*m);
    }

    let mut out = HashMap::new();
    for members in classes.into_values() {
        for m in &members {
            out.insert(pkg.object(m.obj).pos, members.clone());
        }
    }
    out
}

/// Union-find with path compression.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> UnionFind {
        UnionFind {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::signature_fixture;

    fn class_names(pkg: &Package, groups: &HashMap<Pos, Vec<Method>>, pos: Pos) -> Vec<String> {
        let mut names: Vec<String> = groups[&pos]
            .iter()
            .map(|m| format!("{}", pkg.object(m.obj).pos))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn matching_methods_share_one_class() {
        let fx = signature_fixture();
        let groups = group_methods(&fx.pkg);

        let p1 = fx.pkg.object(fx.method("t1")).pos;
        let p2 = fx.pkg.object(fx.method("t2")).pos;
        let p17 = fx.pkg.object(fx.method("t17")).pos;
        let pi = fx.pkg.object(fx.method("iface")).pos;

        // t1, t2, t17 and the interface method all take f(int)-compatible
        // shapes; they must rename in lockstep.
        let c1 = class_names(&fx.pkg, &groups, p1);
        assert_eq!(c1, class_names(&fx.pkg, &groups, p2));
        assert_eq!(c1, class_names(&fx.pkg, &groups, p17));
        assert_eq!(c1, class_names(&fx.pkg, &groups, pi));
        assert!(c1.len() >= 4);
    }

    #[test]
    fn variadic_pair_is_isolated() {
        let fx = signature_fixture();
        let groups = group_methods(&fx.pkg);
        let p3 = fx.pkg.object(fx.method("t3")).pos;
        let p4 = fx.pkg.object(fx.method("t4")).pos;
        let c3 = class_names(&fx.pkg, &groups, p3);
        assert_eq!(c3, class_names(&fx.pkg, &groups, p4));
        assert_eq!(c3.len(), 2);
    }

    #[test]
    fn unique_defined_type_stays_singleton() {
        let fx = signature_fixture();
        let groups = group_methods(&fx.pkg);
        let p5 = fx.pkg.object(fx.method("t5")).pos;
        assert_eq!(groups[&p5].len(), 1);
    }

    #[test]
    fn transitive_merging_reaches_a_fixed_point() {
        let fx = signature_fixture();
        let groups = group_methods(&fx.pkg);
        // t6 and t7 match through the alias; whatever else joins them must
        // land in the same single class for both.
        let p6 = fx.pkg.object(fx.method("t6")).pos;
        let p7 = fx.pkg.object(fx.method("t7")).pos;
        assert_eq!(
            class_names(&fx.pkg, &groups, p6),
            class_names(&fx.pkg, &groups, p7)
        );
    }

    #[test]
    fn every_method_is_in_its_own_class() {
        let fx = signature_fixture();
        let groups = group_methods(&fx.pkg);
        for (pos, members) in &groups {
            assert!(
                members.iter().any(|m| fx.pkg.object(m.obj).pos == *pos),
                "class at {pos} misses its own method"
            );
        }
    }
}
