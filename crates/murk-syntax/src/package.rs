//! The package: files, identifier nodes, arenas, and resolution info.

use serde::{Deserialize, Serialize};

use crate::info::TypeInfo;
use crate::object::{Object, ObjectId};
use crate::pos::Pos;
use crate::scope::{ScopeData, ScopeId};
use crate::types::{Type, TypeId, TypeTable};

/// Index of an identifier node in the package's ident arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentId(pub(crate) u32);

impl IdentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An identifier occurrence: a name at a position.
///
/// The name is the one mutable thing in the model; `orig_len` remembers the
/// byte length of the original spelling so emission can splice the current
/// name over it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub pos: Pos,
    #[serde(default)]
    pub orig_len: u32,
}

impl Ident {
    /// End position of the original spelling (exclusive).
    pub fn end(&self) -> u32 {
        self.pos.raw() + self.orig_len
    }
}

/// An import clause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Import {
    pub path: String,
    /// `None` for unnamed imports; `Some(".")` for dot imports;
    /// `Some("_")` for blank imports.
    #[serde(default)]
    pub alias: Option<String>,
}

/// A comment, raw text including its delimiters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub pos: Pos,
    pub text: String,
}

/// A source file with its base offset in the run's position space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    pub base: u32,
    /// Byte length; defaults to `source.len()` when loading.
    #[serde(default)]
    pub len: u32,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl SourceFile {
    /// Whether `pos` falls inside this file (end position included, so a
    /// scope ending at end-of-file still maps here).
    pub fn contains(&self, pos: Pos) -> bool {
        pos.is_valid() && self.base <= pos.raw() && pos.raw() <= self.base + self.len
    }

    /// File-local byte offset of `pos`.
    pub fn offset(&self, pos: Pos) -> u32 {
        pos.raw() - self.base
    }
}

/// A typed package as produced by the upstream frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    /// Import path.
    pub path: String,
    /// Loader id; test binary packages end in `.test`, black-box test
    /// packages in `.test]`.
    #[serde(default)]
    pub id: String,
    /// For test packages, the path of the package under test.
    #[serde(default)]
    pub for_test: Option<String>,
    /// Package directory relative to the workspace root; mirrored under the
    /// output directory on emission.
    #[serde(default)]
    pub dir: String,
    #[serde(default)]
    pub files: Vec<SourceFile>,
    #[serde(default)]
    pub idents: Vec<Ident>,
    #[serde(default)]
    pub types: TypeTable,
    #[serde(default)]
    pub objects: Vec<Object>,
    #[serde(default)]
    pub scopes: Vec<ScopeData>,
    #[serde(default)]
    pub info: TypeInfo,
    #[serde(default)]
    pub imports: Vec<Import>,
    /// Non-source files to copy byte-identically (including module
    /// manifests).
    #[serde(default)]
    pub other_files: Vec<String>,
    /// Files referenced by embedding directives, copied byte-identically.
    #[serde(default)]
    pub embed_files: Vec<String>,
    /// Diagnostics reported by the type checker. Non-empty means the engine
    /// refuses to run.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl Package {
    pub fn ident(&self, id: IdentId) -> &Ident {
        &self.idents[id.index()]
    }

    pub fn ident_mut(&mut self, id: IdentId) -> &mut Ident {
        &mut self.idents[id.index()]
    }

    pub fn object(&self, id: ObjectId) -> &Object {
        &self.objects[id.index()]
    }

    pub fn ty(&self, id: TypeId) -> &Type {
        self.types.get(id)
    }

    pub fn scope(&self, id: ScopeId) -> &ScopeData {
        &self.scopes[id.index()]
    }

    /// The package scope is always scope 0.
    pub fn package_scope(&self) -> ScopeId {
        ScopeId(0)
    }

    /// The innermost scope whose extent contains `pos`; the package scope
    /// when no file or local scope does.
    pub fn innermost(&self, pos: Pos) -> ScopeId {
        fn descend(pkg: &Package, id: ScopeId, pos: Pos) -> ScopeId {
            for child in &pkg.scope(id).children {
                if pkg.scope(*child).contains(pos) {
                    return descend(pkg, *child, pos);
                }
            }
            id
        }
        descend(self, self.package_scope(), pos)
    }

    pub fn file_containing(&self, pos: Pos) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.contains(pos))
    }

    /// Name of the file containing `pos`.
    pub fn file_name_of(&self, pos: Pos) -> Option<&str> {
        self.file_containing(pos).map(|f| f.name.as_str())
    }

    /// Whether the package imports `path` (under any alias).
    pub fn imports_path(&self, path: &str) -> bool {
        self.imports.iter().any(|i| i.path == path)
    }

    /// Normalize fields the bundle may omit: ident spelling lengths and
    /// file lengths.
    pub fn normalize(&mut self) {
        for ident in &mut self.idents {
            if ident.orig_len == 0 {
                ident.orig_len = ident.name.len() as u32;
            }
        }
        for file in &mut self.files {
            if file.len == 0 {
                file.len = file.source.len() as u32;
            }
        }
    }
}
