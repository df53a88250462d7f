//! Language objects: the typed entities identifiers resolve to.

use serde::{Deserialize, Serialize};

use crate::pos::Pos;
use crate::scope::ScopeId;
use crate::types::{qualified_id, TypeId};

/// Index of an object in the package's object arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub(crate) u32);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What kind of entity an object is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Const,
    Var {
        /// True for embedded struct fields; they are renamed with their type.
        embedded: bool,
    },
    Func,
    TypeName,
    PkgName,
    Label,
}

/// A typed entity.
///
/// `parent` is the scope that declares the object; fields and methods have
/// no parent scope, which is how the driver classifies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Object {
    pub name: String,
    pub pos: Pos,
    /// Defining package path; `None` for predeclared objects.
    #[serde(default)]
    pub pkg: Option<String>,
    #[serde(default)]
    pub ty: Option<TypeId>,
    #[serde(default)]
    pub parent: Option<ScopeId>,
    pub kind: ObjectKind,
}

impl Object {
    /// Whether the name starts with an upper-case letter.
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().is_some_and(|c| c.is_uppercase())
    }

    /// Qualified id: exported names stand alone, unexported names carry
    /// their defining package so same-named methods from different packages
    /// never collide.
    pub fn qualified_id(&self) -> String {
        qualified_id(&self.name, self.pkg.as_deref())
    }

    pub fn is_embedded_field(&self) -> bool {
        matches!(self.kind, ObjectKind::Var { embedded: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(name: &str, pkg: Option<&str>) -> Object {
        Object {
            name: name.to_string(),
            pos: Pos::new(1),
            pkg: pkg.map(str::to_string),
            ty: None,
            parent: None,
            kind: ObjectKind::Func,
        }
    }

    #[test]
    fn exported_is_upper_initial() {
        assert!(obj("Foo", Some("p")).is_exported());
        assert!(!obj("foo", Some("p")).is_exported());
        assert!(!obj("_x", Some("p")).is_exported());
    }

    #[test]
    fn qualified_id_for_unexported() {
        assert_eq!(obj("f", Some("a/b")).qualified_id(), "a/b.f");
        assert_eq!(obj("F", Some("a/b")).qualified_id(), "F");
    }
}
