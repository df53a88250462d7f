//! Signature matching under generics.
//!
//! Two methods *may* implement the same interface method when their
//! qualified ids agree and their signatures have an intersection: every
//! parameter and result pair can denote the same type under some
//! instantiation of the type parameters involved.
//!
//! Constraint satisfaction is approximated structurally by intersecting
//! type-term unions and method sets. The approximation only ever errs
//! toward "these may match", which widens rename groups; that direction is
//! sound.

use murk_syntax::{ObjectId, Package, Type, TypeId};

/// Whether two method declarations may implement the same interface method.
pub fn impl_same_method(pkg: &Package, m1: ObjectId, m2: ObjectId) -> bool {
    let o1 = pkg.object(m1);
    let o2 = pkg.object(m2);
    if o1.qualified_id() != o2.qualified_id() {
        return false;
    }
    match (o1.ty, o2.ty) {
        (Some(s1), Some(s2)) => match_signature(pkg, s1, s2),
        _ => false,
    }
}

/// Whether two signatures have an intersection.
pub fn match_signature(pkg: &Package, s1: TypeId, s2: TypeId) -> bool {
    let (
        Type::Signature {
            params: p1,
            results: r1,
            variadic: v1,
            ..
        },
        Type::Signature {
            params: p2,
            results: r2,
            variadic: v2,
            ..
        },
    ) = (pkg.ty(pkg.unalias(s1)), pkg.ty(pkg.unalias(s2)))
    else {
        return false;
    };
    if v1 != v2 {
        return false;
    }
    if p1.len() != p2.len() || r1.len() != r2.len() {
        return false;
    }
    match_tuple(pkg, p1, p2) && match_tuple(pkg, r1, r2)
}

fn match_tuple(pkg: &Package, t1: &[TypeId], t2: &[TypeId]) -> bool {
    t1.iter()
        .zip(t2)
        .all(|(a, b)| match_type(pkg, *a, *b))
}

/// Whether two types can be the same.
pub fn match_type(pkg: &Package, t1: TypeId, t2: TypeId) -> bool {
    let t1 = pkg.unalias(t1);
    let t2 = pkg.unalias(t2);
    if t1 == t2 {
        return true;
    }

    match pkg.ty(t1) {
        Type::Basic(k1) => match pkg.ty(t2) {
            Type::Basic(k2) => k1 == k2,
            // e.g. int and {int | other} can be the same.
            Type::TypeParam { constraint } => satisfies(pkg, t1, *constraint),
            _ => false,
        },
        Type::Pointer { elem: e1 } => match pkg.ty(t2) {
            // Two pointer types can be the same only if their base types can.
            Type::Pointer { elem: e2 } => match_type(pkg, *e1, *e2),
            Type::TypeParam { constraint } => satisfies(pkg, t1, *constraint),
            _ => false,
        },
        Type::Slice { elem: e1 } => match pkg.ty(t2) {
            Type::Slice { elem: e2 } => match_type(pkg, *e1, *e2),
            Type::TypeParam { constraint } => satisfies(pkg, t1, *constraint),
            _ => false,
        },
        Type::Array { len: l1, elem: e1 } => match pkg.ty(t2) {
            Type::Array { len: l2, elem: e2 } => l1 != l2 && match_type(pkg, *e1, *e2),
            Type::TypeParam { constraint } => satisfies(pkg, t1, *constraint),
            _ => false,
        },
        Type::Map { key: k1, value: v1 } => match pkg.ty(t2) {
            Type::Map { key: k2, value: v2 } => {
                match_type(pkg, *k1, *k2) && match_type(pkg, *v1, *v2)
            }
            Type::TypeParam { constraint } => satisfies(pkg, t1, *constraint),
            _ => false,
        },
        Type::Chan { dir: d1, elem: e1 } => match pkg.ty(t2) {
            // Element types must match and the directions must be
            // compatible: either side bidirectional, or equal.
            Type::Chan { dir: d2, elem: e2 } => {
                match_type(pkg, *e1, *e2)
                    && (*d1 == murk_syntax::ChanDir::SendRecv
                        || *d2 == murk_syntax::ChanDir::SendRecv
                        || d1 == d2)
            }
            Type::TypeParam { constraint } => satisfies(pkg, t1, *constraint),
            _ => false,
        },
        Type::Struct { fields: f1, .. } => match pkg.ty(t2) {
            // Same field count, and corresponding fields agree on name,
            // tag, and potentially-same types.
            Type::Struct { fields: f2, .. } => {
                f1.len() == f2.len()
                    && f1.iter().zip(f2).all(|(a, b)| {
                        a.qualified_id() == b.qualified_id()
                            && a.tag == b.tag
                            && match_type(pkg, a.ty, b.ty)
                    })
            }
            Type::TypeParam { constraint } => satisfies(pkg, t1, *constraint),
            _ => false,
        },
        Type::Interface { .. } => match pkg.ty(t2) {
            // Not raw identity: interface methods may carry generic
            // parameters, so signatures are matched pairwise.
            Type::Interface { .. } => {
                let m1 = pkg.interface_method_set(t1);
                let m2 = pkg.interface_method_set(t2);
                m1.len() == m2.len()
                    && m1.iter().all(|(id1, sig1)| {
                        m2.iter()
                            .any(|(id2, sig2)| id1 == id2 && match_signature(pkg, *sig1, *sig2))
                    })
            }
            Type::TypeParam { constraint } => satisfies(pkg, t1, *constraint),
            _ => false,
        },
        Type::TypeParam { constraint: c1 } => match pkg.ty(t2) {
            // Two type parameters can be the same if their method sets
            // intersect and their type-term unions intersect.
            Type::TypeParam { constraint: c2 } => {
                let u1 = constraint_interface(pkg, *c1);
                let u2 = constraint_interface(pkg, *c2);
                intersect_method_set(pkg, u1, u2) && intersect_terms(pkg, u1, u2)
            }
            _ => {
                // Satisfaction of an uninstantiated generic is undefined.
                if is_uninstantiated_generic(pkg, t2) {
                    panic!("uninstantiated generic type");
                }
                satisfies(pkg, t2, *c1)
            }
        },
        Type::Named { type_args: a1, .. } => match pkg.ty(t2) {
            Type::Named { type_args: a2, .. } => {
                let under2 = pkg.underlying(t2);
                if matches!(pkg.ty(under2), Type::Interface { .. }) {
                    return match_type(pkg, t1, under2);
                }
                // Two distinct defined types can only be the same when they
                // are instantiations of one origin with matching arguments.
                if !pkg.identical(origin_of(pkg, t1), origin_of(pkg, t2)) {
                    return false;
                }
                if a1.len() != a2.len() {
                    panic!("same origin but different type args");
                }
                a1.iter().zip(a2).all(|(x, y)| match_type(pkg, *x, *y))
            }
            Type::TypeParam { constraint } => satisfies(pkg, t1, *constraint),
            _ => false,
        },
        Type::Signature { .. } => match pkg.ty(t2) {
            Type::Signature { .. } => match_signature(pkg, t1, t2),
            Type::TypeParam { constraint } => satisfies(pkg, t1, *constraint),
            _ => false,
        },
        _ => true, // safety first
    }
}

fn origin_of(pkg: &Package, t: TypeId) -> TypeId {
    match pkg.ty(pkg.unalias(t)) {
        Type::Named {
            origin: Some(origin),
            ..
        } => *origin,
        _ => t,
    }
}

/// Resolve a constraint to the interface carrying its method set and terms.
fn constraint_interface(pkg: &Package, constraint: TypeId) -> TypeId {
    let under = pkg.underlying(constraint);
    if matches!(pkg.ty(under), Type::Interface { .. }) {
        under
    } else {
        constraint
    }
}

/// Whether a type is a generic named type that was never instantiated.
fn is_uninstantiated_generic(pkg: &Package, t: TypeId) -> bool {
    matches!(
        pkg.ty(pkg.unalias(t)),
        Type::Named {
            origin: None,
            type_params,
            ..
        } if *type_params > 0
    )
}

// ============================================================================
// Constraint satisfaction (structural approximation)
// ============================================================================

/// Whether `t` can satisfy the interface behind `constraint`.
///
/// Declared methods with mismatching signatures reject; methods the model
/// cannot see (promotions, external types) are assumed present. The type-set
/// check is exact over the terms the constraint spells out.
pub fn satisfies(pkg: &Package, t: TypeId, constraint: TypeId) -> bool {
    let iface = constraint_interface(pkg, constraint);
    if !matches!(pkg.ty(iface), Type::Interface { .. }) {
        return true;
    }

    let t = pkg.unalias(t);
    let t_under = pkg.underlying(t);
    if matches!(pkg.ty(t_under), Type::Interface { .. }) {
        // Implements-direction for interface types: every constraint method
        // must be present with a matching signature, and the type set must
        // be contained in the constraint's.
        let t_set = pkg.interface_method_set(t_under);
        for (qid, csig) in pkg.interface_method_set(iface) {
            match t_set.iter().find(|(id, _)| *id == qid) {
                Some((_, sig)) if match_signature(pkg, *sig, csig) => {}
                _ => return false,
            }
        }
        return terms_subset(pkg, &all_terms(pkg, t_under), &all_terms(pkg, iface));
    }

    for (qid, csig) in pkg.interface_method_set(iface) {
        if let Type::Named { methods, .. } = pkg.ty(t) {
            let declared = methods.iter().find(|m| pkg.object(**m).qualified_id() == qid);
            if let Some(m) = declared {
                match pkg.object(*m).ty {
                    Some(sig) if match_signature(pkg, sig, csig) => {}
                    _ => return false,
                }
            }
        }
    }

    let terms = all_terms(pkg, iface);
    let as_term = TermEntry {
        tilde: false,
        ty: Some(t),
    };
    terms.iter().any(|term| term_subsumed(pkg, as_term, *term))
}

/// Whether two interfaces' method sets intersect: a shared method name with
/// incompatible signatures is a contradiction.
fn intersect_method_set(pkg: &Package, i1: TypeId, i2: TypeId) -> bool {
    let set1 = pkg.interface_method_set(i1);
    let set2 = pkg.interface_method_set(i2);
    for (qid, sig1) in &set1 {
        if let Some((_, sig2)) = set2.iter().find(|(id, _)| id == qid) {
            if !match_signature(pkg, *sig1, *sig2) {
                return false;
            }
        }
    }
    true
}

/// Whether the type-term unions of two interfaces intersect.
fn intersect_terms(pkg: &Package, i1: TypeId, i2: TypeId) -> bool {
    !intersect(pkg, &all_terms(pkg, i1), &all_terms(pkg, i2)).is_empty()
}

/// A term in a computed type set; `ty == None` is the `any` term.
#[derive(Debug, Clone, Copy)]
struct TermEntry {
    tilde: bool,
    ty: Option<TypeId>,
}

const ANY_TERM: TermEntry = TermEntry {
    tilde: false,
    ty: None,
};

/// All type terms of an interface: the terms of its explicit unions
/// intersected with the terms of its embedded interfaces. A plain embedded
/// interface contributes its own term set; an embedded non-interface type
/// contributes itself as a single term.
fn all_terms(pkg: &Package, iface: TypeId) -> Vec<TermEntry> {
    let mut result = vec![ANY_TERM];
    let resolved = pkg.underlying(iface);
    let Type::Interface { embeddeds, .. } = pkg.ty(resolved) else {
        return result;
    };
    for e in embeddeds {
        let components: Vec<TermEntry> = match pkg.ty(pkg.unalias(*e)) {
            Type::Union { terms } => {
                let mut out = Vec::new();
                for term in terms {
                    let under = pkg.underlying(term.ty);
                    if matches!(pkg.ty(under), Type::Interface { .. }) {
                        out.extend(all_terms(pkg, term.ty));
                    } else {
                        out.push(TermEntry {
                            tilde: term.tilde,
                            ty: Some(term.ty),
                        });
                    }
                }
                out
            }
            _ => {
                let under = pkg.underlying(*e);
                if matches!(pkg.ty(under), Type::Interface { .. }) {
                    all_terms(pkg, *e)
                } else {
                    vec![TermEntry {
                        tilde: false,
                        ty: Some(*e),
                    }]
                }
            }
        };
        result = intersect(pkg, &result, &components);
    }
    result
}

/// Intersection of two term lists, deduplicated. A bare term subsumes its
/// tilde-marked variant only when the tilde version is broader.
fn intersect(pkg: &Package, terms1: &[TermEntry], terms2: &[TermEntry]) -> Vec<TermEntry> {
    let mut result = Vec::with_capacity(terms1.len().max(terms2.len()));
    for t1 in terms1 {
        for t2 in terms2 {
            if term_subsumed(pkg, *t1, *t2) {
                result.push(*t1);
            } else if term_subsumed(pkg, *t2, *t1) {
                result.push(*t2);
            }
        }
    }

    let mut unique: Vec<TermEntry> = Vec::new();
    'result_loop: for r in result {
        for u in unique.iter_mut() {
            match (r.ty, u.ty) {
                (None, None) => continue 'result_loop,
                (Some(rt), Some(ut)) => {
                    if pkg.identical(rt, ut) {
                        if r.tilde == u.tilde || u.tilde {
                            // u is at least as broad; keep u.
                            continue 'result_loop;
                        }
                        if r.tilde {
                            *u = r;
                            continue 'result_loop;
                        }
                    } else if pkg.identical(pkg.underlying(rt), pkg.underlying(ut)) {
                        // The base types share an underlying type.
                        if u.tilde {
                            continue 'result_loop;
                        }
                        if r.tilde {
                            *u = r;
                            continue 'result_loop;
                        }
                    }
                }
                _ => {}
            }
        }
        unique.push(r);
    }
    unique
}

/// Whether every term of `a` is contained in some term of `b`.
fn terms_subset(pkg: &Package, a: &[TermEntry], b: &[TermEntry]) -> bool {
    a.iter()
        .all(|x| b.iter().any(|y| term_subsumed(pkg, *x, *y)))
}

/// Whether the type set of `x` is contained in the type set of `y`.
fn term_subsumed(pkg: &Package, x: TermEntry, y: TermEntry) -> bool {
    match (x.ty, y.ty) {
        (_, None) => true,
        (None, Some(_)) => false,
        (Some(xt), Some(yt)) => {
            if y.tilde {
                if x.tilde {
                    pkg.identical(xt, yt)
                } else {
                    pkg.identical(pkg.underlying(xt), yt)
                }
            } else {
                !x.tilde && pkg.identical(xt, yt)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{signature_fixture, SignatureFixture};

    fn same(fx: &SignatureFixture, a: &str, b: &str) -> bool {
        impl_same_method(&fx.pkg, fx.method(a), fx.method(b))
    }

    #[test]
    fn simple_match_and_mismatch() {
        let fx = signature_fixture();
        assert!(same(&fx, "t1", "t2"), "f(int) vs f(int)");
        assert!(!same(&fx, "t12", "t1"), "argument mismatch");
        assert!(!same(&fx, "t13", "t1"), "result mismatch");
        assert!(same(&fx, "t18", "t18"), "no params or results");
    }

    #[test]
    fn variadic_must_agree() {
        let fx = signature_fixture();
        assert!(!same(&fx, "t1", "t3"), "variadic vs non-variadic");
        assert!(same(&fx, "t3", "t4"), "variadic on both sides");
    }

    #[test]
    fn defined_types_are_unique() {
        let fx = signature_fixture();
        assert!(!same(&fx, "t5", "t6"), "IntSlice vs []int");
        assert!(!same(&fx, "t5", "t8"), "IntSlice vs IntSlice2");
        assert!(!same(&fx, "t6", "t8"), "[]int vs IntSlice2");
    }

    #[test]
    fn aliases_are_transparent() {
        let fx = signature_fixture();
        assert!(same(&fx, "t6", "t7"), "[]int vs IntSliceAlias");
    }

    #[test]
    fn type_parameter_satisfaction() {
        let fx = signature_fixture();
        assert!(!same(&fx, "t1", "t9"), "int does not satisfy {string}");
        assert!(same(&fx, "t1", "t17"), "int satisfies ~int|byte|I1|~struct");
    }

    #[test]
    fn type_terms_intersect() {
        let fx = signature_fixture();
        assert!(same(&fx, "t10", "t11"), "{string|byte} meets {byte}");
        assert!(!same(&fx, "t14", "t9"), "empty term set meets {string}");
    }

    #[test]
    fn struct_matching() {
        let fx = signature_fixture();
        assert!(same(&fx, "t19", "t20"), "identical structs");
        assert!(!same(&fx, "t19", "t21"), "tags differ");
        assert!(same(&fx, "t19", "t22"), "field type may instantiate");
    }

    #[test]
    fn interfaces_match_by_method_set() {
        let fx = signature_fixture();
        assert!(same(&fx, "t24", "t25"), "potentially identical interfaces");
    }

    #[test]
    fn array_rule_is_preserved_as_stated() {
        // Arrays "match" when their lengths DIFFER and elements match; this
        // mirrors the upstream rule verbatim (see DESIGN.md).
        let fx = signature_fixture();
        assert!(!same(&fx, "a3", "a3b"), "same length does not match");
        assert!(same(&fx, "a3", "a4"), "different lengths match");
    }

    #[test]
    fn channel_directions() {
        let fx = signature_fixture();
        assert!(same(&fx, "cboth", "csend"), "bidirectional meets send-only");
        assert!(!same(&fx, "csend", "crecv"), "opposed directions");
    }
}
