//! Typed-package input model for murk.
//!
//! The rename engine consumes an already-typed package: a file set, source
//! files with identifier nodes, a type table, objects, the type checker's
//! scope tree, and the def/use maps. Loading and type checking happen in an
//! upstream frontend; this crate defines the data it must produce and a
//! JSON bundle loader for it.
//!
//! Everything is arena-shaped: nodes live in flat vectors owned by
//! [`package::Package`] and refer to each other by copyable index newtypes
//! (`TypeId`, `ObjectId`, `ScopeId`, `IdentId`). Identifier names are the
//! only thing the engine mutates.

pub mod builder;
pub mod info;
pub mod load;
pub mod object;
pub mod package;
pub mod pos;
pub mod scope;
pub mod types;
pub mod universe;

pub use info::TypeInfo;
pub use object::{Object, ObjectId, ObjectKind};
pub use package::{Comment, Ident, IdentId, Import, Package, SourceFile};
pub use pos::Pos;
pub use scope::{ScopeData, ScopeId};
pub use types::{BasicKind, ChanDir, StructField, Term, Type, TypeId, TypeTable};
