//! Def/use maps from the type checker.

use serde::{Deserialize, Serialize};

use crate::object::ObjectId;
use crate::package::IdentId;

/// The checker's identifier resolution tables.
///
/// `defs` maps defining identifiers to the object they introduce; the entry
/// is `None` for exactly two cases: the package clause name and the symbolic
/// variable of a type-switch header. `uses` maps every using identifier to
/// the object it resolves to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeInfo {
    #[serde(default)]
    pub defs: Vec<(IdentId, Option<ObjectId>)>,
    #[serde(default)]
    pub uses: Vec<(IdentId, ObjectId)>,
}
