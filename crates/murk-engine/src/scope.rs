//! The lexical scope graph.
//!
//! The graph mirrors the type checker's scope tree node for node and
//! distributes every defining and using identifier into the scope that owns
//! it: definitions by their object's parent scope, object-less definitions
//! and all uses by innermost position. Fields and methods belong to the
//! selector model and are filtered out here, as are `.` and `_`.
//!
//! Four node variants exist. Universe is read-only and holds the
//! predeclared names; Package holds package-level declarations; File holds
//! per-file names (import aliases); everything else is Local with a source
//! extent.

use std::collections::HashMap;

use murk_syntax::{IdentId, ObjectId, Package, Pos, ScopeId};

use crate::multimap::MultiMap;

/// Index of a node in the scope graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The scope variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Universe,
    Package,
    File,
    Local,
}

/// A definition/use position pair stored in per-scope use tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefUse {
    pub def: Pos,
    pub use_pos: Pos,
}

/// A use site with the scope that owns it, stored in the package-wide
/// side table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UseSite {
    pub def: Pos,
    pub use_pos: Pos,
    pub scope: NodeId,
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    defs: HashMap<String, Pos>,
    uses: MultiMap<DefUse>,
}

/// Package-wide def/use side tables built together with the graph.
#[derive(Debug, Default)]
pub struct ScopeInfo {
    /// Every use site in the package, by name.
    pub uses: MultiMap<UseSite>,
    /// Every scoped definition in the package, by name.
    pub defs: MultiMap<(Pos, NodeId)>,
    /// Defining identifier to its scope node.
    pub def_scopes: HashMap<IdentId, NodeId>,
    /// Object-less defining identifiers resolved through their use sites;
    /// an entry whose object is a var marks a type-switch symbolic variable.
    pub def_objects: HashMap<IdentId, ObjectId>,
}

/// The mirrored scope tree with def/use tables.
#[derive(Debug)]
pub struct ScopeGraph {
    nodes: Vec<Node>,
}

const UNIVERSE: NodeId = NodeId(0);
const PACKAGE: NodeId = NodeId(1);

/// Build the scope graph and side tables for one package.
pub fn build(pkg: &Package) -> (ScopeGraph, ScopeInfo) {
    let mut graph = ScopeGraph { nodes: Vec::new() };
    graph.push(NodeKind::Universe, None);
    graph.push(NodeKind::Package, Some(UNIVERSE));
    graph.nodes[UNIVERSE.index()].children.push(PACKAGE);

    // Mirror the checker tree: children of the package scope are file
    // scopes, everything deeper is local.
    let mut by_checker: HashMap<ScopeId, NodeId> = HashMap::new();
    by_checker.insert(pkg.package_scope(), PACKAGE);
    for file_scope in pkg.scope(pkg.package_scope()).children.clone() {
        let file_node = graph.push(NodeKind::File, Some(PACKAGE));
        graph.nodes[PACKAGE.index()].children.push(file_node);
        by_checker.insert(file_scope, file_node);
        mirror_children(pkg, &mut graph, &mut by_checker, file_scope, file_node);
    }

    let mut info = ScopeInfo::default();

    // Objects indexed by definition position resolve the object-less
    // definitions (type-switch symbolic variables) through their uses.
    let mut use_obj_by_pos: HashMap<Pos, ObjectId> = HashMap::new();
    for (_, obj_id) in &pkg.info.uses {
        let obj = pkg.object(*obj_id);
        if obj.pos.is_valid() {
            use_obj_by_pos.entry(obj.pos).or_insert(*obj_id);
        }
    }

    for (ident_id, obj_opt) in &pkg.info.defs {
        let ident = pkg.ident(*ident_id);
        if ident.name == "." || ident.name == "_" {
            continue;
        }
        match obj_opt {
            Some(obj_id) => {
                let obj = pkg.object(*obj_id);
                let Some(parent) = obj.parent else {
                    continue; // fields and methods
                };
                let node = by_checker[&parent];
                graph.nodes[node.index()].defs.insert(obj.name.clone(), obj.pos);
                info.defs.add(obj.name.clone(), (obj.pos, node));
                info.def_scopes.insert(*ident_id, node);
            }
            None => {
                let node = by_checker[&pkg.innermost(ident.pos)];
                graph.nodes[node.index()]
                    .defs
                    .insert(ident.name.clone(), ident.pos);
                info.defs.add(ident.name.clone(), (ident.pos, node));
                info.def_scopes.insert(*ident_id, node);
                if let Some(obj_id) = use_obj_by_pos.get(&ident.pos) {
                    info.def_objects.insert(*ident_id, *obj_id);
                }
            }
        }
    }

    for (ident_id, obj_id) in &pkg.info.uses {
        let ident = pkg.ident(*ident_id);
        let obj = pkg.object(*obj_id);
        let node = by_checker[&pkg.innermost(ident.pos)];
        graph.nodes[node.index()].uses.add(
            ident.name.clone(),
            DefUse {
                def: obj.pos,
                use_pos: ident.pos,
            },
        );
        info.uses.add(
            ident.name.clone(),
            UseSite {
                def: obj.pos,
                use_pos: ident.pos,
                scope: node,
            },
        );
    }

    (graph, info)
}

fn mirror_children(
    pkg: &Package,
    graph: &mut ScopeGraph,
    by_checker: &mut HashMap<ScopeId, NodeId>,
    checker: ScopeId,
    node: NodeId,
) {
    for child in pkg.scope(checker).children.clone() {
        let child_node = graph.push(NodeKind::Local, Some(node));
        graph.nodes[node.index()].children.push(child_node);
        by_checker.insert(child, child_node);
        mirror_children(pkg, graph, by_checker, child, child_node);
    }
}

impl ScopeGraph {
    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
            defs: HashMap::new(),
            uses: MultiMap::new(),
        });
        id
    }

    pub fn universe(&self) -> NodeId {
        UNIVERSE
    }

    pub fn package(&self) -> NodeId {
        PACKAGE
    }

    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.nodes[node.index()].kind
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].parent
    }

    /// The definition of `name` in this scope alone.
    pub fn lookup_def(&self, node: NodeId, name: &str) -> Option<Pos> {
        self.nodes[node.index()].defs.get(name).copied()
    }

    /// The use sites of `name` whose innermost scope is this one.
    pub fn lookup_use(&self, node: NodeId, name: &str) -> &[DefUse] {
        self.nodes[node.index()].uses.lookup(name)
    }

    /// A definition of `name` anywhere at package level: the package scope
    /// or any file scope.
    fn pkg_lookup_def(&self, name: &str) -> Option<Pos> {
        if let Some(pos) = self.nodes[PACKAGE.index()].defs.get(name) {
            return Some(*pos);
        }
        for file in &self.nodes[PACKAGE.index()].children {
            if let Some(pos) = self.nodes[file.index()].defs.get(name) {
                return Some(*pos);
            }
        }
        None
    }

    /// The first use of `name` after `pos` in this scope or any descendant.
    /// An invalid `pos` matches every use.
    fn lookup_use_children(&self, node: NodeId, name: &str, pos: Pos) -> Option<(NodeId, Pos)> {
        for u in self.nodes[node.index()].uses.lookup(name) {
            if !pos.is_valid() || u.use_pos > pos {
                return Some((node, u.use_pos));
            }
        }
        for child in &self.nodes[node.index()].children {
            if let Some(hit) = self.lookup_use_children(*child, name, pos) {
                return Some(hit);
            }
        }
        None
    }

    /// Whether introducing `name` at `pos` in this scope neither collides
    /// with an existing definition nor captures a use of `name` that occurs
    /// after `pos` in this scope or below.
    ///
    /// The package and file variants have no position to be "before", so
    /// only the collision rule applies there — and it spans the package
    /// scope plus every file scope. The universe is read-only.
    pub fn can_def(&self, node: NodeId, name: &str, pos: Pos) -> bool {
        match self.kind(node) {
            NodeKind::Universe => false,
            NodeKind::Package | NodeKind::File => self.pkg_lookup_def(name).is_none(),
            NodeKind::Local => {
                self.lookup_def(node, name).is_none()
                    && self.lookup_use_children(node, name, pos).is_none()
            }
        }
    }

    /// Whether a reference to `name` at `pos` in this scope still resolves
    /// to a definition in `def_scope`: no scope between here and there may
    /// define `name` visibly at `pos`.
    pub fn can_use(&self, node: NodeId, name: &str, pos: Pos, def_scope: NodeId) -> bool {
        let mut cur = node;
        loop {
            if cur == def_scope {
                return true;
            }
            if let Some(def_pos) = self.lookup_def(cur, name) {
                let shadows = match self.kind(cur) {
                    NodeKind::Local => def_pos <= pos,
                    _ => true,
                };
                if shadows {
                    return false;
                }
            }
            match self.parent(cur) {
                Some(p) => cur = p,
                None => return true,
            }
        }
    }

    /// Rename the definition keyed at `def` and every `(def, *)` use entry
    /// from `name` to `new_name`, in this scope and all descendants, in one
    /// traversal.
    pub fn rename_children(&mut self, node: NodeId, name: &str, def: Pos, new_name: &str) {
        match self.kind(node) {
            NodeKind::Universe => self.rename_children(PACKAGE, name, def, new_name),
            NodeKind::Package => {
                let n = &mut self.nodes[node.index()];
                n.defs.remove(name);
                n.defs.insert(new_name.to_string(), def);
                n.uses.rename(name, |u| u.def == def, new_name);
                for child in self.nodes[node.index()].children.clone() {
                    self.rename_children_rec(child, name, def, new_name, false);
                }
            }
            NodeKind::File | NodeKind::Local => {
                self.rename_children_rec(node, name, def, new_name, false);
            }
        }
    }

    fn rename_children_rec(
        &mut self,
        node: NodeId,
        name: &str,
        def: Pos,
        new_name: &str,
        mut def_renamed: bool,
    ) {
        let n = &mut self.nodes[node.index()];
        if !def_renamed {
            if let Some(pos) = n.defs.remove(name) {
                n.defs.insert(new_name.to_string(), pos);
                def_renamed = true;
            }
        }
        n.uses.rename(name, |u| u.def == def, new_name);
        for child in self.nodes[node.index()].children.clone() {
            self.rename_children_rec(child, name, def, new_name, def_renamed);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
