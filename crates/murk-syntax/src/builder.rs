//! Programmatic package construction.
//!
//! Frontends assemble [`Package`]s through this builder; the test suites use
//! it to write down small typed programs without going through JSON. The
//! builder keeps the invariants the loader would otherwise check: scope 0 is
//! the package scope, file bases never overlap, and object/type cross
//! references stay in bounds.

use std::collections::HashMap;

use crate::info::TypeInfo;
use crate::object::{Object, ObjectId, ObjectKind};
use crate::package::{Comment, Ident, IdentId, Import, Package, SourceFile};
use crate::pos::Pos;
use crate::scope::{ScopeData, ScopeId};
use crate::types::{BasicKind, ChanDir, StructField, Term, Type, TypeId, TypeTable};

/// Handle for a file added to the builder: its base offset, its file scope
/// and its index in the file list.
#[derive(Debug, Clone, Copy)]
pub struct FileHandle {
    pub base: u32,
    pub scope: ScopeId,
    pub index: usize,
}

impl FileHandle {
    /// Position at `offset` bytes into this file.
    pub fn pos(&self, offset: u32) -> Pos {
        Pos::new(self.base + offset)
    }
}

/// Builder for [`Package`].
pub struct PackageBuilder {
    pkg: Package,
    next_base: u32,
    basics: HashMap<BasicKind, TypeId>,
}

impl PackageBuilder {
    pub fn new(path: &str) -> Self {
        let pkg = Package {
            path: path.to_string(),
            id: path.to_string(),
            for_test: None,
            dir: path.rsplit('/').next().unwrap_or(path).to_string(),
            files: Vec::new(),
            idents: Vec::new(),
            types: TypeTable::new(),
            objects: Vec::new(),
            scopes: vec![ScopeData {
                parent: None,
                children: Vec::new(),
                pos: Pos::NONE,
                end: Pos::NONE,
            }],
            info: TypeInfo::default(),
            imports: Vec::new(),
            other_files: Vec::new(),
            embed_files: Vec::new(),
            errors: Vec::new(),
        };
        PackageBuilder {
            pkg,
            next_base: 1,
            basics: HashMap::new(),
        }
    }

    pub fn set_id(&mut self, id: &str) {
        self.pkg.id = id.to_string();
    }

    pub fn set_for_test(&mut self, path: &str) {
        self.pkg.for_test = Some(path.to_string());
    }

    pub fn set_dir(&mut self, dir: &str) {
        self.pkg.dir = dir.to_string();
    }

    pub fn add_error(&mut self, msg: &str) {
        self.pkg.errors.push(msg.to_string());
    }

    /// Start assigning file bases at `base`. Packages loaded together share
    /// one position space, so their builders must not overlap.
    pub fn start_at(&mut self, base: u32) {
        assert!(base > 0, "positions start at 1");
        self.next_base = self.next_base.max(base);
    }

    // ========================================================================
    // Files and scopes
    // ========================================================================

    /// Add a source file; its base is assigned after the previous file.
    pub fn file(&mut self, name: &str, source: &str) -> FileHandle {
        self.push_file(name, source.len() as u32, source.to_string())
    }

    /// Add a file with a synthetic length and no source text. Useful for
    /// fixtures that only exercise the analyses, not emission.
    pub fn file_sized(&mut self, name: &str, len: u32) -> FileHandle {
        self.push_file(name, len, String::new())
    }

    fn push_file(&mut self, name: &str, len: u32, source: String) -> FileHandle {
        let base = self.next_base;
        self.next_base = base + len + 1;
        let scope = self.scope(
            self.pkg.package_scope(),
            Pos::new(base),
            Pos::new(base + len + 1),
        );
        let index = self.pkg.files.len();
        self.pkg.files.push(SourceFile {
            name: name.to_string(),
            base,
            len,
            source,
            comments: Vec::new(),
        });
        FileHandle { base, scope, index }
    }

    /// Record a comment at a file-local offset.
    pub fn comment(&mut self, file: FileHandle, offset: u32, text: &str) -> Pos {
        let pos = file.pos(offset);
        self.pkg.files[file.index].comments.push(Comment {
            pos,
            text: text.to_string(),
        });
        pos
    }

    /// Add a scope under `parent` with the given extent.
    pub fn scope(&mut self, parent: ScopeId, pos: Pos, end: Pos) -> ScopeId {
        let id = ScopeId(self.pkg.scopes.len() as u32);
        self.pkg.scopes.push(ScopeData {
            parent: Some(parent),
            children: Vec::new(),
            pos,
            end,
        });
        self.pkg.scopes[parent.index()].children.push(id);
        id
    }

    pub fn import(&mut self, path: &str, alias: Option<&str>) {
        self.pkg.imports.push(Import {
            path: path.to_string(),
            alias: alias.map(str::to_string),
        });
    }

    // ========================================================================
    // Types
    // ========================================================================

    pub fn basic(&mut self, kind: BasicKind) -> TypeId {
        if let Some(id) = self.basics.get(&kind) {
            return *id;
        }
        let id = self.pkg.types.alloc(Type::Basic(kind));
        self.basics.insert(kind, id);
        id
    }

    pub fn pointer(&mut self, elem: TypeId) -> TypeId {
        self.pkg.types.alloc(Type::Pointer { elem })
    }

    pub fn slice(&mut self, elem: TypeId) -> TypeId {
        self.pkg.types.alloc(Type::Slice { elem })
    }

    pub fn array(&mut self, len: u64, elem: TypeId) -> TypeId {
        self.pkg.types.alloc(Type::Array { len, elem })
    }

    pub fn map_type(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.pkg.types.alloc(Type::Map { key, value })
    }

    pub fn chan(&mut self, dir: ChanDir, elem: TypeId) -> TypeId {
        self.pkg.types.alloc(Type::Chan { dir, elem })
    }

    pub fn struct_type(&mut self, pos: Pos, fields: Vec<StructField>) -> TypeId {
        self.pkg.types.alloc(Type::Struct { pos, fields })
    }

    pub fn interface_type(
        &mut self,
        pos: Pos,
        methods: Vec<ObjectId>,
        embeddeds: Vec<TypeId>,
    ) -> TypeId {
        self.pkg.types.alloc(Type::Interface {
            pos,
            methods,
            embeddeds,
        })
    }

    pub fn union(&mut self, terms: Vec<Term>) -> TypeId {
        self.pkg.types.alloc(Type::Union { terms })
    }

    pub fn type_param(&mut self, constraint: TypeId) -> TypeId {
        self.pkg.types.alloc(Type::TypeParam { constraint })
    }

    pub fn signature(
        &mut self,
        recv: Option<TypeId>,
        params: Vec<TypeId>,
        results: Vec<TypeId>,
    ) -> TypeId {
        self.signature_full(recv, params, results, false, 0)
    }

    pub fn signature_full(
        &mut self,
        recv: Option<TypeId>,
        params: Vec<TypeId>,
        results: Vec<TypeId>,
        variadic: bool,
        type_params: u32,
    ) -> TypeId {
        self.pkg.types.alloc(Type::Signature {
            recv,
            params,
            results,
            variadic,
            type_params,
        })
    }

    pub fn alias(&mut self, actual: TypeId) -> TypeId {
        self.pkg.types.alloc(Type::Alias { actual })
    }

    pub fn external(&mut self) -> TypeId {
        self.pkg.types.alloc(Type::External)
    }

    /// Define a named type for `obj`, fixing up the object's type.
    pub fn named(&mut self, obj: ObjectId, underlying: TypeId) -> TypeId {
        self.named_generic(obj, underlying, 0)
    }

    /// Define a generic named type with `type_params` parameters.
    pub fn named_generic(&mut self, obj: ObjectId, underlying: TypeId, type_params: u32) -> TypeId {
        let id = self.pkg.types.alloc(Type::Named {
            obj,
            underlying,
            origin: None,
            type_args: Vec::new(),
            methods: Vec::new(),
            type_params,
        });
        self.pkg.objects[obj.index()].ty = Some(id);
        id
    }

    /// Instantiate a generic named type with type arguments.
    pub fn instantiate(&mut self, origin: TypeId, args: Vec<TypeId>) -> TypeId {
        let (obj, underlying) = match self.pkg.types.get(origin) {
            Type::Named {
                obj, underlying, ..
            } => (*obj, *underlying),
            _ => panic!("instantiate: origin is not a named type"),
        };
        self.pkg.types.alloc(Type::Named {
            obj,
            underlying,
            origin: Some(origin),
            type_args: args,
            methods: Vec::new(),
            type_params: 0,
        })
    }

    /// Record a declared method on a named type.
    pub fn add_method(&mut self, named: TypeId, method: ObjectId) {
        match self.pkg.types.get_mut(named) {
            Type::Named { methods, .. } => methods.push(method),
            _ => panic!("add_method: not a named type"),
        }
    }

    /// Replace the underlying of a named type. Needed when the underlying
    /// refers back to the named type (interfaces listing their own methods).
    pub fn set_underlying(&mut self, named: TypeId, new_underlying: TypeId) {
        match self.pkg.types.get_mut(named) {
            Type::Named { underlying, .. } => *underlying = new_underlying,
            _ => panic!("set_underlying: not a named type"),
        }
    }

    // ========================================================================
    // Objects
    // ========================================================================

    fn object(
        &mut self,
        name: &str,
        pos: Pos,
        pkg: Option<String>,
        ty: Option<TypeId>,
        parent: Option<ScopeId>,
        kind: ObjectKind,
    ) -> ObjectId {
        let id = ObjectId(self.pkg.objects.len() as u32);
        self.pkg.objects.push(Object {
            name: name.to_string(),
            pos,
            pkg,
            ty,
            parent,
            kind,
        });
        id
    }

    pub fn type_name(&mut self, name: &str, pos: Pos, parent: Option<ScopeId>) -> ObjectId {
        let path = self.pkg.path.clone();
        self.object(name, pos, Some(path), None, parent, ObjectKind::TypeName)
    }

    /// A type name from another package (e.g. `testing.T`), carrying its
    /// definition position in that package's file space (`Pos::NONE` when
    /// the position does not matter).
    pub fn external_type_name(&mut self, name: &str, pkg_path: &str, pos: Pos) -> ObjectId {
        self.object(
            name,
            pos,
            Some(pkg_path.to_string()),
            None,
            None,
            ObjectKind::TypeName,
        )
    }

    pub fn var(&mut self, name: &str, pos: Pos, ty: TypeId, parent: ScopeId) -> ObjectId {
        let path = self.pkg.path.clone();
        self.object(
            name,
            pos,
            Some(path),
            Some(ty),
            Some(parent),
            ObjectKind::Var { embedded: false },
        )
    }

    /// A struct field: a var with no parent scope. Returns the object and
    /// the matching [`StructField`] entry for the struct type.
    pub fn field_def(
        &mut self,
        name: &str,
        pos: Pos,
        ty: TypeId,
        embedded: bool,
    ) -> (ObjectId, StructField) {
        let path = self.pkg.path.clone();
        let obj = self.object(
            name,
            pos,
            Some(path.clone()),
            Some(ty),
            None,
            ObjectKind::Var { embedded },
        );
        let field = StructField {
            name: name.to_string(),
            pkg: Some(path),
            pos,
            ty,
            tag: String::new(),
            embedded,
        };
        (obj, field)
    }

    pub fn func(&mut self, name: &str, pos: Pos, sig: TypeId, parent: ScopeId) -> ObjectId {
        let path = self.pkg.path.clone();
        self.object(name, pos, Some(path), Some(sig), Some(parent), ObjectKind::Func)
    }

    /// A method: a func with no parent scope.
    pub fn method(&mut self, name: &str, pos: Pos, sig: TypeId) -> ObjectId {
        let path = self.pkg.path.clone();
        self.object(name, pos, Some(path), Some(sig), None, ObjectKind::Func)
    }

    pub fn pkg_name(&mut self, name: &str, pos: Pos, parent: ScopeId) -> ObjectId {
        let path = self.pkg.path.clone();
        self.object(name, pos, Some(path), None, Some(parent), ObjectKind::PkgName)
    }

    pub fn const_(&mut self, name: &str, pos: Pos, ty: TypeId, parent: ScopeId) -> ObjectId {
        let path = self.pkg.path.clone();
        self.object(
            name,
            pos,
            Some(path),
            Some(ty),
            Some(parent),
            ObjectKind::Const,
        )
    }

    // ========================================================================
    // Defs and uses
    // ========================================================================

    /// Record the defining identifier for `obj`, spelled as the object's
    /// name at the object's position.
    pub fn def(&mut self, obj: ObjectId) -> IdentId {
        let (name, pos) = {
            let o = &self.pkg.objects[obj.index()];
            (o.name.clone(), o.pos)
        };
        self.def_at(&name, pos, Some(obj))
    }

    /// Record a defining identifier; `obj` is `None` for the package clause
    /// name and type-switch symbolic variables.
    pub fn def_at(&mut self, name: &str, pos: Pos, obj: Option<ObjectId>) -> IdentId {
        let id = self.push_ident(name, pos);
        self.pkg.info.defs.push((id, obj));
        id
    }

    /// Record a using identifier resolving to `obj`.
    pub fn use_at(&mut self, name: &str, pos: Pos, obj: ObjectId) -> IdentId {
        let id = self.push_ident(name, pos);
        self.pkg.info.uses.push((id, obj));
        id
    }

    fn push_ident(&mut self, name: &str, pos: Pos) -> IdentId {
        let id = IdentId(self.pkg.idents.len() as u32);
        self.pkg.idents.push(Ident {
            name: name.to_string(),
            pos,
            orig_len: name.len() as u32,
        });
        id
    }

    pub fn build(mut self) -> Package {
        self.pkg.normalize();
        self.pkg
    }
}
