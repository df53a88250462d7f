//! The selector model: fields, methods, and promotion through embedding.
//!
//! Every struct, interface, defined type and pointer-to-defined type in a
//! package gets a structural summary node, keyed by `(definition position,
//! is-pointer)`. Nodes carry back-edges to their embedders so rename impact
//! can propagate upward.
//!
//! Depth queries answer "at which promotion depth does `T.name` select a
//! field or method?". `-1` means not selectable — including the case where
//! two embeddings tie at the same minimum depth, which makes the selection
//! ambiguous. A visited set with push/pop discipline guards embedding
//! cycles.
//!
//! Pointer rules: a value receiver method belongs to `T` and `*T`; a
//! pointer receiver method only to `*T`. Embedding a value promotes value
//! methods only; embedding a pointer promotes both.

use std::collections::{HashMap, HashSet};

use murk_syntax::{ObjectKind, Package, Pos, Type, TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TypeKey {
    pos: Pos,
    ptr: bool,
}

type NodeRef = usize;

#[derive(Debug)]
enum Kind {
    /// A defined type: directly declared methods and its underlying node
    /// (`None` when the underlying type lives outside this package).
    Defined {
        methods: HashSet<String>,
        ptr_methods: HashSet<String>,
        underlying: Option<NodeRef>,
    },
    Struct {
        fields: HashSet<String>,
        embedded: Vec<(String, NodeRef)>,
    },
    Interface {
        methods: HashSet<String>,
        embedded: Vec<NodeRef>,
    },
    Pointer {
        base: Option<NodeRef>,
    },
}

#[derive(Debug)]
struct Node {
    kind: Kind,
    /// Types that embed this one.
    embedders: Vec<NodeRef>,
}

/// The per-package selector model.
#[derive(Debug, Default)]
pub struct Selection {
    nodes: Vec<Node>,
    keys: HashMap<TypeKey, NodeRef>,
    /// Field/method definition position to owning node.
    fmm: HashMap<Pos, NodeRef>,
}

// ============================================================================
// Construction
// ============================================================================

impl Selection {
    /// Build the model from a typed package: every struct and interface
    /// literal plus every method receiver contributes nodes.
    pub fn build(pkg: &Package) -> Selection {
        let mut sel = Selection::default();
        for (tid, ty) in pkg.types.iter() {
            if matches!(ty, Type::Struct { .. } | Type::Interface { .. }) {
                sel.add_type(pkg, tid);
            }
        }
        for (_, obj_opt) in &pkg.info.defs {
            let Some(obj_id) = obj_opt else { continue };
            let obj = pkg.object(*obj_id);
            if !matches!(obj.kind, ObjectKind::Func) {
                continue;
            }
            let Some(sig) = obj.ty else { continue };
            let Type::Signature { recv: Some(recv), .. } = pkg.ty(sig) else {
                continue;
            };
            let Some(node) = sel.add_type(pkg, *recv) else {
                continue;
            };
            sel.fmm.insert(obj.pos, node);
            enum Recv {
                Value { is_iface: bool },
                Ptr { base: NodeRef },
                Other,
            }
            let recv_kind = match &sel.nodes[node].kind {
                Kind::Defined { underlying, .. } => {
                    let u = *underlying;
                    Recv::Value {
                        is_iface: u
                            .is_some_and(|u| matches!(sel.nodes[u].kind, Kind::Interface { .. })),
                    }
                }
                Kind::Pointer { base: Some(base) } => Recv::Ptr { base: *base },
                _ => Recv::Other,
            };
            match recv_kind {
                // Interface methods are registered by their literal.
                Recv::Value { is_iface: false } => {
                    if let Kind::Defined { methods, .. } = &mut sel.nodes[node].kind {
                        methods.insert(obj.name.clone());
                    }
                }
                Recv::Ptr { base } => {
                    if let Kind::Defined { ptr_methods, .. } = &mut sel.nodes[base].kind {
                        ptr_methods.insert(obj.name.clone());
                    }
                }
                Recv::Value { is_iface: true } | Recv::Other => {}
            }
        }
        sel
    }

    fn push(&mut self, kind: Kind) -> NodeRef {
        self.nodes.push(Node {
            kind,
            embedders: Vec::new(),
        });
        self.nodes.len() - 1
    }

    fn add_type(&mut self, pkg: &Package, tid: TypeId) -> Option<NodeRef> {
        let tid = pkg.unalias(tid);
        match pkg.ty(tid) {
            Type::Named {
                obj, underlying, ..
            } => {
                let key = TypeKey {
                    pos: pkg.object(*obj).pos,
                    ptr: false,
                };
                if let Some(existing) = self.keys.get(&key) {
                    return Some(*existing);
                }
                let node = self.push(Kind::Defined {
                    methods: HashSet::new(),
                    ptr_methods: HashSet::new(),
                    underlying: None,
                });
                self.keys.insert(key, node);
                let under = self.add_type(pkg, *underlying);
                if let Kind::Defined { underlying, .. } = &mut self.nodes[node].kind {
                    *underlying = under;
                }
                if let Some(under) = under {
                    // Selections on the defined type reach through the
                    // underlying node; collisions must propagate back up.
                    self.nodes[under].embedders.push(node);
                }
                Some(node)
            }
            Type::Pointer { elem } => {
                let elem = pkg.unalias(*elem);
                let pos = match pkg.ty(elem) {
                    Type::Named { obj, .. } => pkg.object(*obj).pos,
                    Type::Struct { pos, .. } | Type::Interface { pos, .. } => *pos,
                    _ => panic!("invalid base type"),
                };
                let key = TypeKey { pos, ptr: true };
                if let Some(existing) = self.keys.get(&key) {
                    return Some(*existing);
                }
                let node = self.push(Kind::Pointer { base: None });
                self.keys.insert(key, node);
                let base = self.add_type(pkg, elem);
                if let Kind::Pointer { base: slot } = &mut self.nodes[node].kind {
                    *slot = base;
                }
                if let Some(base) = base {
                    // The pointer's selections include the base's; same
                    // upward propagation as for defined types.
                    self.nodes[base].embedders.push(node);
                }
                Some(node)
            }
            Type::Struct { pos, fields } => {
                let key = TypeKey {
                    pos: *pos,
                    ptr: false,
                };
                if let Some(existing) = self.keys.get(&key) {
                    return Some(*existing);
                }
                let node = self.push(Kind::Struct {
                    fields: HashSet::new(),
                    embedded: Vec::new(),
                });
                self.keys.insert(key, node);
                for f in fields {
                    if f.embedded {
                        let name = embedded_name(pkg, f.ty);
                        if let Some(embedded) = self.add_type(pkg, f.ty) {
                            if let Kind::Struct { embedded: list, .. } = &mut self.nodes[node].kind
                            {
                                list.push((name, embedded));
                            }
                            self.nodes[embedded].embedders.push(node);
                        }
                    } else if let Kind::Struct { fields: set, .. } = &mut self.nodes[node].kind {
                        set.insert(f.name.clone());
                    }
                    self.fmm.insert(f.pos, node);
                }
                Some(node)
            }
            Type::Interface {
                pos,
                methods,
                embeddeds,
            } => {
                let key = TypeKey {
                    pos: *pos,
                    ptr: false,
                };
                if let Some(existing) = self.keys.get(&key) {
                    return Some(*existing);
                }
                let node = self.push(Kind::Interface {
                    methods: HashSet::new(),
                    embedded: Vec::new(),
                });
                self.keys.insert(key, node);
                for m in methods {
                    let obj = pkg.object(*m);
                    if let Kind::Interface { methods: set, .. } = &mut self.nodes[node].kind {
                        set.insert(obj.name.clone());
                    }
                    self.fmm.insert(obj.pos, node);
                }
                for e in embeddeds {
                    // Union terms contribute to the type set, not to
                    // selections; only interface-underlying embeddings
                    // promote methods.
                    let under = pkg.underlying(*e);
                    if !matches!(pkg.ty(under), Type::Interface { .. }) {
                        continue;
                    }
                    let Some(embedded) = self.add_type(pkg, *e) else {
                        continue;
                    };
                    let iface = self.as_interface_node(embedded);
                    if let Kind::Interface { embedded: list, .. } = &mut self.nodes[node].kind {
                        list.push(iface);
                    }
                    self.nodes[embedded].embedders.push(node);
                }
                Some(node)
            }
            _ => None,
        }
    }

    /// Resolve a defined node to its interface underlying for interface
    /// embedding lists.
    fn as_interface_node(&self, node: NodeRef) -> NodeRef {
        match &self.nodes[node].kind {
            Kind::Defined {
                underlying: Some(u),
                ..
            } if matches!(self.nodes[*u].kind, Kind::Interface { .. }) => *u,
            Kind::Interface { .. } => node,
            _ => panic!("invalid embed"),
        }
    }
}

/// The field name an embedded type injects: the defined type's name, through
/// a pointer if need be.
fn embedded_name(pkg: &Package, tid: TypeId) -> String {
    let tid = pkg.unalias(tid);
    match pkg.ty(tid) {
        Type::Named { obj, .. } => pkg.object(*obj).name.clone(),
        Type::Pointer { elem } => match pkg.ty(pkg.unalias(*elem)) {
            Type::Named { obj, .. } => pkg.object(*obj).name.clone(),
            _ => panic!("invalid embed"),
        },
        _ => panic!("invalid embed"),
    }
}

// ============================================================================
// Depth queries
// ============================================================================

impl Selection {
    fn field(&self, n: NodeRef, name: &str, visited: &mut HashSet<NodeRef>) -> i32 {
        match &self.nodes[n].kind {
            Kind::Defined { underlying, .. } => match underlying {
                Some(u) => self.field(*u, name, visited),
                None => -1,
            },
            Kind::Struct { fields, embedded } => {
                if fields.contains(name) || embedded.iter().any(|(nm, _)| nm == name) {
                    return 0;
                }
                self.promoted(n, visited, |sel, e, visited| sel.field(e, name, visited))
            }
            Kind::Interface { .. } => -1,
            Kind::Pointer { base } => match base {
                Some(b) => self.ptr_field(*b, name, visited),
                None => -1,
            },
        }
    }

    fn ptr_field(&self, n: NodeRef, name: &str, visited: &mut HashSet<NodeRef>) -> i32 {
        match &self.nodes[n].kind {
            Kind::Defined { underlying, .. } => match underlying {
                Some(u) => self.ptr_field(*u, name, visited),
                None => -1,
            },
            Kind::Struct { .. } => self.field(n, name, visited),
            Kind::Interface { .. } | Kind::Pointer { .. } => -1,
        }
    }

    fn method(&self, n: NodeRef, name: &str, visited: &mut HashSet<NodeRef>) -> i32 {
        match &self.nodes[n].kind {
            Kind::Defined {
                methods,
                underlying,
                ..
            } => {
                // The method set of an interface type is its interface's.
                if let Some(u) = underlying {
                    if matches!(self.nodes[*u].kind, Kind::Interface { .. }) {
                        return self.method(*u, name, visited);
                    }
                }
                if methods.contains(name) {
                    return 0;
                }
                // Promoted through an underlying struct.
                if let Some(u) = underlying {
                    if matches!(self.nodes[*u].kind, Kind::Struct { .. }) {
                        return self.method(*u, name, visited);
                    }
                }
                -1
            }
            Kind::Struct { .. } => {
                self.promoted(n, visited, |sel, e, visited| sel.method(e, name, visited))
            }
            Kind::Interface { methods, embedded } => {
                if methods.contains(name) {
                    return 0;
                }
                // Depth through an interface is always reported as 0.
                if embedded
                    .iter()
                    .any(|e| self.method(*e, name, visited) > -1)
                {
                    return 0;
                }
                -1
            }
            Kind::Pointer { base } => match base {
                Some(b) => self.ptr_method(*b, name, visited),
                None => -1,
            },
        }
    }

    fn ptr_method(&self, n: NodeRef, name: &str, visited: &mut HashSet<NodeRef>) -> i32 {
        match &self.nodes[n].kind {
            Kind::Defined {
                ptr_methods,
                underlying,
                ..
            } => {
                if underlying.is_some_and(|u| matches!(self.nodes[u].kind, Kind::Pointer { .. })) {
                    panic!("bad receiver");
                }
                let depth = self.method(n, name, visited);
                if depth > -1 {
                    return depth;
                }
                if ptr_methods.contains(name) {
                    return 0;
                }
                match underlying {
                    Some(u) => self.ptr_method(*u, name, visited),
                    None => -1,
                }
            }
            Kind::Struct { .. } => {
                self.promoted(n, visited, |sel, e, visited| match &sel.nodes[e].kind {
                    Kind::Defined { .. } => sel.ptr_method(e, name, visited),
                    Kind::Pointer { base: Some(b) } => sel.ptr_method(*b, name, visited),
                    _ => -1,
                })
            }
            Kind::Interface { .. } | Kind::Pointer { .. } => -1,
        }
    }

    /// Shallowest depth of a promoted selection over the embedded list of a
    /// struct node; two paths at the same minimum depth are ambiguous.
    fn promoted(
        &self,
        n: NodeRef,
        visited: &mut HashSet<NodeRef>,
        f: impl Fn(&Selection, NodeRef, &mut HashSet<NodeRef>) -> i32,
    ) -> i32 {
        if visited.contains(&n) {
            return -1;
        }
        visited.insert(n);
        let Kind::Struct { embedded, .. } = &self.nodes[n].kind else {
            visited.remove(&n);
            return -1;
        };
        let mut depths: Vec<i32> = embedded
            .iter()
            .map(|(_, e)| f(self, *e, visited))
            .filter(|d| *d > -1)
            .collect();
        visited.remove(&n);
        depths.sort_unstable();
        match depths.len() {
            0 => -1,
            1 => depths[0] + 1,
            _ if depths[0] == depths[1] => -1, // more than one shallowest path
            _ => depths[0] + 1,
        }
    }

    /// Shallowest depth at which `name` selects a field or method on the
    /// node, or -1.
    fn has_name(&self, n: NodeRef, name: &str) -> i32 {
        let depth = self.field(n, name, &mut HashSet::new());
        if depth > -1 {
            return depth;
        }
        self.method(n, name, &mut HashSet::new())
    }

    /// Depth of `name` on the type defined at `def` (`ptr` selects the
    /// pointer variant), or -1 when the type has no selection entry.
    pub fn depth_of(&self, def: Pos, ptr: bool, name: &str) -> i32 {
        match self.keys.get(&TypeKey { pos: def, ptr }) {
            Some(node) => self.has_name(*node, name),
            None => -1,
        }
    }
}

// ============================================================================
// Rename impact
// ============================================================================

impl Selection {
    /// Whether a name is free on the node and its transitive embedders.
    fn can_rename_sel_to(&self, n: NodeRef, name: &str) -> bool {
        let mut stack = vec![n];
        let mut seen = HashSet::new();
        while let Some(cur) = stack.pop() {
            if !seen.insert(cur) {
                continue;
            }
            if self.has_name(cur, name) > -1 {
                return false;
            }
            stack.extend(self.nodes[cur].embedders.iter().copied());
        }
        true
    }

    /// Whether the embedded-field name injected by the type defined at
    /// `def` can become `new_name` in every embedder. Interfaces carry no
    /// field names and are exempt.
    pub fn can_rename_embedded(&self, def: Pos, new_name: &str) -> bool {
        for ptr in [false, true] {
            let Some(node) = self.keys.get(&TypeKey { pos: def, ptr }) else {
                continue;
            };
            for embedder in &self.nodes[*node].embedders {
                if matches!(self.nodes[*embedder].kind, Kind::Interface { .. }) {
                    continue;
                }
                if !self.can_rename_sel_to(*embedder, new_name) {
                    return false;
                }
            }
        }
        true
    }

    /// Rewrite the embedded-field name slots for the type defined at `def`.
    pub fn rename_embedded(&mut self, def: Pos, new_name: &str) {
        for ptr in [false, true] {
            let Some(node) = self.keys.get(&TypeKey { pos: def, ptr }).copied() else {
                continue;
            };
            let embedders = self.nodes[node].embedders.clone();
            for embedder in embedders {
                if let Kind::Struct { embedded, .. } = &mut self.nodes[embedder].kind {
                    for slot in embedded.iter_mut() {
                        if slot.1 == node {
                            slot.0 = new_name.to_string();
                        }
                    }
                }
            }
        }
    }

    /// Whether the field or method defined at `def` can be renamed to
    /// `new_name` without colliding with an existing selection on the
    /// owning type or any embedder upward.
    pub fn can_rename_field_method(&self, def: Pos, new_name: &str) -> bool {
        let node = self.owner(def);
        self.can_rename_sel_to(node, new_name)
    }

    /// Commit a field/method rename in the model.
    ///
    /// # Panics
    /// Panics when `def` has no entry or the old name is not present — the
    /// caller must have checked with [`Self::can_rename_field_method`].
    pub fn rename_field_method(&mut self, name: &str, def: Pos, new_name: &str) {
        let node = self.owner(def);
        if !self.rename_in(node, name, new_name) {
            panic!("rename failed");
        }
    }

    fn owner(&self, def: Pos) -> NodeRef {
        *self
            .fmm
            .get(&def)
            .unwrap_or_else(|| panic!("no selection entry at {def}"))
    }

    fn rename_in(&mut self, n: NodeRef, name: &str, new_name: &str) -> bool {
        let next = match &mut self.nodes[n].kind {
            Kind::Defined {
                methods,
                underlying,
                ..
            } => {
                if methods.remove(name) {
                    methods.insert(new_name.to_string());
                    return true;
                }
                match underlying {
                    Some(u) => *u,
                    None => return false,
                }
            }
            Kind::Struct { fields, .. } => {
                if fields.remove(name) {
                    fields.insert(new_name.to_string());
                    return true;
                }
                return false;
            }
            Kind::Interface { methods, .. } => {
                if methods.remove(name) {
                    methods.insert(new_name.to_string());
                    return true;
                }
                return false;
            }
            Kind::Pointer { base } => match base {
                Some(b) => {
                    let b = *b;
                    if let Kind::Defined { ptr_methods, .. } = &mut self.nodes[b].kind {
                        if ptr_methods.remove(name) {
                            ptr_methods.insert(new_name.to_string());
                            return true;
                        }
                    }
                    b
                }
                None => return false,
            },
        };
        self.rename_in(next, name, new_name)
    }
}

// ============================================================================
// Tests
// ============================================================================
