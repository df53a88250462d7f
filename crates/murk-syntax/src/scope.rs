//! The type checker's scope tree.
//!
//! Scope 0 is always the package scope; its children are file scopes and
//! everything below is local (function, block, type-parameter scopes).
//! The universe scope is not materialized here — the engine models it with
//! the predeclared-name list from [`crate::universe`].

use serde::{Deserialize, Serialize};

use crate::pos::Pos;

/// Index of a scope in the package's scope arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeId(pub(crate) u32);

impl ScopeId {
    /// The package scope is always scope 0.
    pub const PACKAGE: ScopeId = ScopeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A scope node. The extent `[pos, end)` is empty for the package scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeData {
    #[serde(default)]
    pub parent: Option<ScopeId>,
    #[serde(default)]
    pub children: Vec<ScopeId>,
    #[serde(default)]
    pub pos: Pos,
    #[serde(default)]
    pub end: Pos,
}

impl ScopeData {
    /// Whether the scope's extent contains `pos`.
    pub fn contains(&self, pos: Pos) -> bool {
        pos.is_valid() && self.pos.is_valid() && self.pos <= pos && pos < self.end
    }
}
