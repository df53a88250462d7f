//! The type model.
//!
//! Types live in a [`TypeTable`] arena and reference each other by
//! [`TypeId`]. The shapes mirror what the upstream type checker knows:
//! basics, composites, defined (named) types with underlyings and declared
//! methods, interfaces with embedded interfaces and type-term unions,
//! signatures, type parameters with interface constraints, and aliases.
//!
//! Cross-package types the frontend chose not to expand bottom out at
//! [`Type::External`]; the matcher treats them as opaque.

use serde::{Deserialize, Serialize};

use crate::object::ObjectId;
use crate::package::Package;
use crate::pos::Pos;

/// Index of a type in the package's [`TypeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Predeclared basic type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    UnsafePointer,
}

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChanDir {
    SendRecv,
    SendOnly,
    RecvOnly,
}

/// A term in a type-set union. `tilde` admits every type whose underlying
/// type is `ty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub tilde: bool,
    pub ty: TypeId,
}

/// A struct field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    /// Defining package path; `None` for fields of predeclared origin.
    #[serde(default)]
    pub pkg: Option<String>,
    pub pos: Pos,
    pub ty: TypeId,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub embedded: bool,
}

impl StructField {
    /// Qualified id: unexported field names are package-scoped.
    pub fn qualified_id(&self) -> String {
        qualified_id(&self.name, self.pkg.as_deref())
    }
}

/// Qualified-id form shared by fields and methods: exported names stand
/// alone, unexported names carry their defining package.
pub fn qualified_id(name: &str, pkg: Option<&str>) -> String {
    let exported = name.chars().next().is_some_and(|c| c.is_uppercase());
    match pkg {
        Some(pkg) if !exported => format!("{}.{}", pkg, name),
        _ => name.to_string(),
    }
}

/// A type node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Type {
    Basic(BasicKind),
    Pointer {
        elem: TypeId,
    },
    Slice {
        elem: TypeId,
    },
    Array {
        len: u64,
        elem: TypeId,
    },
    Map {
        key: TypeId,
        value: TypeId,
    },
    Chan {
        dir: ChanDir,
        elem: TypeId,
    },
    /// A struct literal. `pos` is the literal's source position and keys the
    /// selector model for anonymous structs.
    Struct {
        pos: Pos,
        fields: Vec<StructField>,
    },
    /// An interface literal. Explicit methods are `Func` objects; embeddeds
    /// may be interfaces, defined types with interface underlyings, other
    /// defined types (contributing type terms), or unions.
    Interface {
        pos: Pos,
        methods: Vec<ObjectId>,
        embeddeds: Vec<TypeId>,
    },
    /// A union of type terms inside an interface constraint.
    Union {
        terms: Vec<Term>,
    },
    /// A defined type. `origin` is set on instantiations and points at the
    /// generic type; `methods` are the directly declared methods (value and
    /// pointer receivers both).
    Named {
        obj: ObjectId,
        underlying: TypeId,
        #[serde(default)]
        origin: Option<TypeId>,
        #[serde(default)]
        type_args: Vec<TypeId>,
        #[serde(default)]
        methods: Vec<ObjectId>,
        #[serde(default)]
        type_params: u32,
    },
    /// A type parameter; `constraint` resolves to an interface.
    TypeParam {
        constraint: TypeId,
    },
    Signature {
        #[serde(default)]
        recv: Option<TypeId>,
        #[serde(default)]
        params: Vec<TypeId>,
        #[serde(default)]
        results: Vec<TypeId>,
        #[serde(default)]
        variadic: bool,
        #[serde(default)]
        type_params: u32,
    },
    Alias {
        actual: TypeId,
    },
    /// An opaque type from a package the frontend did not expand.
    External,
}

/// Arena of type nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeTable {
    types: Vec<Type>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn alloc(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id.index()]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &Type)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, t)| (TypeId(i as u32), t))
    }
}

// ============================================================================
// Type algebra
// ============================================================================

impl Package {
    /// Resolve alias chains.
    pub fn unalias(&self, mut id: TypeId) -> TypeId {
        while let Type::Alias { actual } = self.ty(id) {
            id = *actual;
        }
        id
    }

    /// The underlying type: defined types resolve through their underlying,
    /// type parameters through their constraint interface.
    pub fn underlying(&self, id: TypeId) -> TypeId {
        let id = self.unalias(id);
        match self.ty(id) {
            Type::Named { underlying, .. } => self.unalias(*underlying),
            Type::TypeParam { constraint } => self.underlying(*constraint),
            _ => id,
        }
    }

    /// Structural type identity, the way the checker would decide it.
    pub fn identical(&self, a: TypeId, b: TypeId) -> bool {
        let a = self.unalias(a);
        let b = self.unalias(b);
        if a == b {
            return true;
        }
        match (self.ty(a), self.ty(b)) {
            (Type::Basic(k1), Type::Basic(k2)) => k1 == k2,
            (Type::Pointer { elem: e1 }, Type::Pointer { elem: e2 })
            | (Type::Slice { elem: e1 }, Type::Slice { elem: e2 }) => self.identical(*e1, *e2),
            (Type::Array { len: l1, elem: e1 }, Type::Array { len: l2, elem: e2 }) => {
                l1 == l2 && self.identical(*e1, *e2)
            }
            (Type::Map { key: k1, value: v1 }, Type::Map { key: k2, value: v2 }) => {
                self.identical(*k1, *k2) && self.identical(*v1, *v2)
            }
            (Type::Chan { dir: d1, elem: e1 }, Type::Chan { dir: d2, elem: e2 }) => {
                d1 == d2 && self.identical(*e1, *e2)
            }
            (Type::Struct { fields: f1, .. }, Type::Struct { fields: f2, .. }) => {
                f1.len() == f2.len()
                    && f1.iter().zip(f2).all(|(a, b)| {
                        a.qualified_id() == b.qualified_id()
                            && a.tag == b.tag
                            && a.embedded == b.embedded
                            && self.identical(a.ty, b.ty)
                    })
            }
            (
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
            ) => {
                v1 == v2
                    && p1.len() == p2.len()
                    && r1.len() == r2.len()
                    && p1.iter().zip(p2).all(|(a, b)| self.identical(*a, *b))
                    && r1.iter().zip(r2).all(|(a, b)| self.identical(*a, *b))
            }
            (Type::Interface { .. }, Type::Interface { .. }) => {
                let m1 = self.interface_method_set(a);
                let m2 = self.interface_method_set(b);
                m1.len() == m2.len()
                    && m1.iter().all(|(id1, sig1)| {
                        m2.iter()
                            .any(|(id2, sig2)| id1 == id2 && self.identical(*sig1, *sig2))
                    })
            }
            (
                Type::Named {
                    obj: o1,
                    type_args: a1,
                    ..
                },
                Type::Named {
                    obj: o2,
                    type_args: a2,
                    ..
                },
            ) => {
                o1 == o2
                    && a1.len() == a2.len()
                    && a1.iter().zip(a2).all(|(x, y)| self.identical(*x, *y))
            }
            _ => false,
        }
    }

    /// The full method set of an interface: explicit methods plus the
    /// methods of recursively embedded interfaces, as `(qualified id, sig)`.
    pub fn interface_method_set(&self, iface: TypeId) -> Vec<(String, TypeId)> {
        let mut out = Vec::new();
        let mut visited = Vec::new();
        self.collect_iface_methods(iface, &mut out, &mut visited);
        out
    }

    fn collect_iface_methods(
        &self,
        id: TypeId,
        out: &mut Vec<(String, TypeId)>,
        visited: &mut Vec<TypeId>,
    ) {
        let id = self.underlying(id);
        if visited.contains(&id) {
            return;
        }
        visited.push(id);
        if let Type::Interface {
            methods, embeddeds, ..
        } = self.ty(id)
        {
            for m in methods {
                let obj = self.object(*m);
                let qid = obj.qualified_id();
                if !out.iter().any(|(existing, _)| *existing == qid) {
                    if let Some(sig) = obj.ty {
                        out.push((qid, sig));
                    }
                }
            }
            for e in embeddeds {
                if matches!(self.ty(self.underlying(*e)), Type::Interface { .. }) {
                    self.collect_iface_methods(*e, out, visited);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PackageBuilder;

    #[test]
    fn basics_identical_by_kind() {
        let mut b = PackageBuilder::new("p");
        let i1 = b.basic(BasicKind::Int);
        let i2 = b.basic(BasicKind::Int);
        let s = b.basic(BasicKind::String);
        let pkg = b.build();
        assert!(pkg.identical(i1, i2));
        assert!(!pkg.identical(i1, s));
    }

    #[test]
    fn alias_resolves_before_comparison() {
        let mut b = PackageBuilder::new("p");
        let int = b.basic(BasicKind::Int);
        let sl = b.slice(int);
        let al = b.alias(sl);
        let sl2 = b.slice(int);
        let pkg = b.build();
        assert!(pkg.identical(al, sl2));
    }

    #[test]
    fn named_types_are_unique() {
        let mut b = PackageBuilder::new("p");
        let int = b.basic(BasicKind::Int);
        let sl = b.slice(int);
        let o1 = b.type_name("IntSlice", Pos::new(10), None);
        let n1 = b.named(o1, sl);
        let o2 = b.type_name("IntSlice2", Pos::new(20), None);
        let n2 = b.named(o2, sl);
        let pkg = b.build();
        assert!(!pkg.identical(n1, n2));
        assert!(pkg.identical(pkg.underlying(n1), pkg.underlying(n2)));
    }

    #[test]
    fn qualified_id_scopes_unexported_names() {
        assert_eq!(qualified_id("Read", Some("io")), "Read");
        assert_eq!(qualified_id("read", Some("io")), "io.read");
        assert_eq!(qualified_id("read", None), "read");
    }
}
