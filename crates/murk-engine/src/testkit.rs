//! Shared test fixtures.
//!
//! Fixtures assemble typed packages through [`PackageBuilder`]; each one
//! documents the source program it stands for. They are used by the unit
//! tests in this crate and by the integration tests under `tests/`.

use std::collections::HashMap;

use murk_syntax::builder::{FileHandle, PackageBuilder};
use murk_syntax::{BasicKind, ChanDir, IdentId, ObjectId, Package, Pos, ScopeId, Term, TypeId};

// ============================================================================
// Scope fixture
// ============================================================================

/// A two-file package exercising the scope graph:
///
/// ```go
/// // a.go
/// package p
/// import "fmt"
/// var pkgVar1 int
/// func f1(b int) {
///     if pkgVar1 == 0 {
///         var tag int
///         _ = tag
///         fmt.Println(pkgVar1)
///     }
/// }
/// func f2() {
///     for {
///         var tag int
///         _ = tag
///         b := ""
///         _ = b
///     }
/// }
/// func f3(x any) {
///     switch t := x.(type) {
///     case int:
///         _ = t
///     }
/// }
/// var _ = pkgVar1
///
/// // b.go
/// package p
/// var pkgVar2 int
/// ```
pub struct ScopedFixture {
    pub pkg: Package,
    pub f1_if_scope: ScopeId,
    pub f2_for_scope: ScopeId,
    pub f1_tag_pos: Pos,
    pub f2_tag_pos: Pos,
    pub f1_use_pkgvar1_pos: Pos,
    pub f2_use_tag_pos: Pos,
    pub pkgvar1_pos: Pos,
    pub pkg_tag_pos: Pos,
    pub blank_def_ident: IdentId,
    pub symbolic_def_ident: IdentId,
}

pub fn scoped_fixture() -> ScopedFixture {
    let mut b = PackageBuilder::new("example.com/scope");
    b.import("fmt", None);
    let f = b.file_sized("a.go", 300);
    let pkg_scope = ScopeId::PACKAGE;

    b.def_at("p", f.pos(8), None);

    let int = b.basic(BasicKind::Int);
    let fmt_obj = b.pkg_name("fmt", f.pos(20), f.scope);
    b.def(fmt_obj);

    let pkgvar1 = b.var("pkgVar1", f.pos(30), int, pkg_scope);
    b.def(pkgvar1);

    // func f1(b int)
    let sig_f1 = b.signature(None, vec![int], vec![]);
    let f1 = b.func("f1", f.pos(40), sig_f1, pkg_scope);
    b.def(f1);
    let f1_scope = b.scope(f.scope, f.pos(44), f.pos(120));
    let param_b = b.var("b", f.pos(45), int, f1_scope);
    b.def(param_b);
    let if_scope = b.scope(f1_scope, f.pos(55), f.pos(120));
    b.use_at("pkgVar1", f.pos(58), pkgvar1);
    let body = b.scope(if_scope, f.pos(62), f.pos(118));
    let tag1 = b.var("tag", f.pos(70), int, body);
    b.def(tag1);
    b.use_at("tag", f.pos(80), tag1);
    b.use_at("fmt", f.pos(90), fmt_obj);
    b.use_at("pkgVar1", f.pos(95), pkgvar1);

    // func f2()
    let sig_f2 = b.signature(None, vec![], vec![]);
    let f2 = b.func("f2", f.pos(130), sig_f2, pkg_scope);
    b.def(f2);
    let f2_scope = b.scope(f.scope, f.pos(134), f.pos(220));
    let for_scope = b.scope(f2_scope, f.pos(140), f.pos(215));
    let tag2 = b.var("tag", f.pos(150), int, for_scope);
    b.def(tag2);
    b.use_at("tag", f.pos(160), tag2);
    let str_ty = b.basic(BasicKind::String);
    let local_b = b.var("b", f.pos(170), str_ty, for_scope);
    b.def(local_b);
    b.use_at("b", f.pos(180), local_b);

    // var _ = pkgVar1
    let blank = b.var("_", f.pos(226), int, pkg_scope);
    let blank_def_ident = b.def(blank);
    b.use_at("pkgVar1", f.pos(230), pkgvar1);

    // func f3 with a type switch; the symbolic t has an object-less def.
    let sig_f3 = b.signature(None, vec![], vec![]);
    let f3 = b.func("f3", f.pos(240), sig_f3, pkg_scope);
    b.def(f3);
    let f3_scope = b.scope(f.scope, f.pos(244), f.pos(290));
    let sw_scope = b.scope(f3_scope, f.pos(250), f.pos(288));
    let symbolic_def_ident = b.def_at("t", f.pos(255), None);
    let case_scope = b.scope(sw_scope, f.pos(260), f.pos(286));
    let sym_obj = b.var("t", f.pos(255), int, case_scope);
    b.use_at("t", f.pos(265), sym_obj);

    let fb = b.file_sized("b.go", 100);
    b.def_at("p", fb.pos(8), None);
    let pkgvar2 = b.var("pkgVar2", fb.pos(20), int, pkg_scope);
    b.def(pkgvar2);

    ScopedFixture {
        f1_if_scope: body,
        f2_for_scope: for_scope,
        f1_tag_pos: f.pos(70),
        f2_tag_pos: f.pos(150),
        f1_use_pkgvar1_pos: f.pos(95),
        f2_use_tag_pos: f.pos(160),
        pkgvar1_pos: f.pos(30),
        pkg_tag_pos: f.pos(30),
        blank_def_ident,
        symbolic_def_ident,
        pkg: b.build(),
    }
}

// ============================================================================
// Signature fixture
// ============================================================================

/// A package of single-method types exercising the signature matcher. Each
/// receiver is `type tN int` (or an array/channel variant) with one method
/// `f`; the map keys are the receiver names.
///
/// ```go
/// type t1 int;  func (t1) f(int)
/// type t2 int;  func (t2) f(int)
/// type t3 int;  func (t3) f(...int)
/// type t4 int;  func (t4) f(f ...int)
/// type IntSlice []int;      func (t5) f(IntSlice)
/// func (t6) f([]int)
/// type IntSliceAlias = []int; func (t7) f(IntSliceAlias)
/// type IntSlice2 []int;     func (t8) f(IntSlice2)
/// type t9[T string] int;    func (t9[T]) f(T)
/// type Pair[T1, T2 any] struct{ ... }
/// type t10[T string | byte] int; func (t10[T]) f(Pair[T, byte])
/// type t11[T byte] int;     func (t11[T]) f(Pair[T, T])
/// func (t12) f(func() int)
/// func (t13) f(int) func() int
/// type C interface { ~byte; t12 }
/// type t14[T C] int;        func (t14[T]) f(T)
/// type St1 struct{ a int }
/// type I1 interface { int | string | St1 }
/// type I2 interface { ~int | byte | I1 | ~struct{ a int } }
/// type t17[T I2] int;       func (t17[T]) f(T)
/// func (t18) f()
/// func (t19) f(struct{ A int })
/// func (t20) f(struct{ A int })
/// func (t21) f(struct{ A int "tag" })
/// type t22[T int | string] int; func (t22[T]) f(struct{ A T })
/// func (t24) f(interface{ g() int })
/// type t25[T int] int;      func (t25[T]) f(interface{ g() T })
/// type iface interface{ f(int) }
/// func (a3) f([3]int); func (a3b) f([3]int); func (a4) f([4]int)
/// func (cboth) f(chan int); func (csend) f(chan<- int); func (crecv) f(<-chan int)
/// ```
pub struct SignatureFixture {
    pub pkg: Package,
    methods: HashMap<String, ObjectId>,
}

impl SignatureFixture {
    /// The `f` method declared on the named receiver.
    pub fn method(&self, receiver: &str) -> ObjectId {
        self.methods[receiver]
    }
}

struct SigRig {
    b: PackageBuilder,
    f: FileHandle,
    off: u32,
    int: TypeId,
    methods: HashMap<String, ObjectId>,
}

impl SigRig {
    fn pos(&mut self) -> Pos {
        self.off += 10;
        self.f.pos(self.off)
    }

    /// `type <name> int` with one method `f` of the given shape.
    fn recv(&mut self, name: &str, params: Vec<TypeId>, results: Vec<TypeId>, variadic: bool) {
        let under = self.int;
        self.recv_over(name, under, params, results, variadic);
    }

    fn recv_over(
        &mut self,
        name: &str,
        underlying: TypeId,
        params: Vec<TypeId>,
        results: Vec<TypeId>,
        variadic: bool,
    ) -> TypeId {
        let pos = self.pos();
        let obj = self.b.type_name(name, pos, Some(ScopeId::PACKAGE));
        let named = self.b.named(obj, underlying);
        self.method_on(name, named, params, results, variadic);
        named
    }

    fn method_on(
        &mut self,
        key: &str,
        recv: TypeId,
        params: Vec<TypeId>,
        results: Vec<TypeId>,
        variadic: bool,
    ) {
        let pos = self.pos();
        let sig = self
            .b
            .signature_full(Some(recv), params, results, variadic, 0);
        let m = self.b.method("f", pos, sig);
        self.b.add_method(recv, m);
        self.b.def(m);
        self.methods.insert(key.to_string(), m);
    }

    /// An interface whose type set is the given union.
    fn constraint(&mut self, terms: Vec<Term>) -> TypeId {
        let pos = self.pos();
        let union = self.b.union(terms);
        self.b.interface_type(pos, vec![], vec![union])
    }
}

pub fn signature_fixture() -> SignatureFixture {
    let mut b = PackageBuilder::new("example.com/sig");
    let f = b.file_sized("sig.go", 4000);
    let int = b.basic(BasicKind::Int);
    let mut r = SigRig {
        b,
        f,
        off: 0,
        int,
        methods: HashMap::new(),
    };

    let byte = r.b.basic(BasicKind::Uint8);
    let string = r.b.basic(BasicKind::String);
    let int_slice = r.b.slice(int);

    r.recv("t1", vec![int], vec![], false);
    r.recv("t2", vec![int], vec![], false);
    r.recv("t3", vec![int_slice], vec![], true);
    r.recv("t4", vec![int_slice], vec![], true);

    // type IntSlice []int, IntSlice2 []int, IntSliceAlias = []int
    let pos = r.pos();
    let is_obj = r.b.type_name("IntSlice", pos, Some(ScopeId::PACKAGE));
    let int_slice_named = r.b.named(is_obj, int_slice);
    let pos = r.pos();
    let is2_obj = r.b.type_name("IntSlice2", pos, Some(ScopeId::PACKAGE));
    let int_slice2_named = r.b.named(is2_obj, int_slice);
    let int_slice_alias = r.b.alias(int_slice);

    r.recv("t5", vec![int_slice_named], vec![], false);
    r.recv("t6", vec![int_slice], vec![], false);
    r.recv("t7", vec![int_slice_alias], vec![], false);
    r.recv("t8", vec![int_slice2_named], vec![], false);

    // t9[T string]
    let c9 = r.constraint(vec![Term {
        tilde: false,
        ty: string,
    }]);
    let t9_param = r.b.type_param(c9);
    r.recv("t9", vec![t9_param], vec![], false);

    // Pair[T1, T2 any]
    let pos = r.pos();
    let pair_obj = r.b.type_name("Pair", pos, Some(ScopeId::PACKAGE));
    let ext = r.b.external();
    let pair = r.b.named_generic(pair_obj, ext, 2);

    // t10[T string|byte], t11[T byte]
    let c10 = r.constraint(vec![
        Term {
            tilde: false,
            ty: string,
        },
        Term {
            tilde: false,
            ty: byte,
        },
    ]);
    let t10_param = r.b.type_param(c10);
    let pair10 = r.b.instantiate(pair, vec![t10_param, byte]);
    r.recv("t10", vec![pair10], vec![], false);

    let c11 = r.constraint(vec![Term {
        tilde: false,
        ty: byte,
    }]);
    let t11_param = r.b.type_param(c11);
    let pair11 = r.b.instantiate(pair, vec![t11_param, t11_param]);
    r.recv("t11", vec![pair11], vec![], false);

    // t12, t13 with function-typed params/results
    let fn_int = r.b.signature(None, vec![], vec![int]);
    let t12_named = r.recv_over("t12", int, vec![fn_int], vec![], false);
    r.recv("t13", vec![int], vec![fn_int], false);

    // C interface { ~byte; t12 } — term set is empty.
    let pos = r.pos();
    let tilde_byte = r.b.union(vec![Term {
        tilde: true,
        ty: byte,
    }]);
    let c14 = r.b.interface_type(pos, vec![], vec![tilde_byte, t12_named]);
    let t14_param = r.b.type_param(c14);
    r.recv("t14", vec![t14_param], vec![], false);

    // St1, I1, I2, t17[T I2]
    let pos = r.pos();
    let (_, st1_field) = r.b.field_def("a", pos, int, false);
    let pos = r.pos();
    let st1_struct = r.b.struct_type(pos, vec![st1_field]);
    let pos = r.pos();
    let st1_obj = r.b.type_name("St1", pos, Some(ScopeId::PACKAGE));
    let st1 = r.b.named(st1_obj, st1_struct);

    let pos = r.pos();
    let i1_union = r.b.union(vec![
        Term {
            tilde: false,
            ty: int,
        },
        Term {
            tilde: false,
            ty: string,
        },
        Term {
            tilde: false,
            ty: st1,
        },
    ]);
    let i1_lit = r.b.interface_type(pos, vec![], vec![i1_union]);
    let pos = r.pos();
    let i1_obj = r.b.type_name("I1", pos, Some(ScopeId::PACKAGE));
    let i1 = r.b.named(i1_obj, i1_lit);

    let pos = r.pos();
    let (_, anon_field) = r.b.field_def("a", pos, int, false);
    let pos = r.pos();
    let anon_struct = r.b.struct_type(pos, vec![anon_field]);
    let pos = r.pos();
    let i2_union = r.b.union(vec![
        Term {
            tilde: true,
            ty: int,
        },
        Term {
            tilde: false,
            ty: byte,
        },
        Term {
            tilde: false,
            ty: i1,
        },
        Term {
            tilde: true,
            ty: anon_struct,
        },
    ]);
    let i2_lit = r.b.interface_type(pos, vec![], vec![i2_union]);
    let pos = r.pos();
    let i2_obj = r.b.type_name("I2", pos, Some(ScopeId::PACKAGE));
    let i2 = r.b.named(i2_obj, i2_lit);
    let t17_param = r.b.type_param(i2);
    r.recv("t17", vec![t17_param], vec![], false);

    r.recv("t18", vec![], vec![], false);

    // Struct-parameter methods.
    let s19 = anon_struct_a(&mut r, int, "");
    r.recv("t19", vec![s19], vec![], false);
    let s20 = anon_struct_a(&mut r, int, "");
    r.recv("t20", vec![s20], vec![], false);
    let s21 = anon_struct_a(&mut r, int, "tag");
    r.recv("t21", vec![s21], vec![], false);
    let c22 = r.constraint(vec![
        Term {
            tilde: false,
            ty: int,
        },
        Term {
            tilde: false,
            ty: string,
        },
    ]);
    let t22_param = r.b.type_param(c22);
    let s22 = anon_struct_a(&mut r, t22_param, "");
    r.recv("t22", vec![s22], vec![], false);

    // Interface-parameter methods t24/t25.
    let g24_sig = r.b.signature(None, vec![], vec![int]);
    let pos = r.pos();
    let g24 = r.b.method("g", pos, g24_sig);
    let pos = r.pos();
    let i24 = r.b.interface_type(pos, vec![g24], vec![]);
    r.recv("t24", vec![i24], vec![], false);

    let c25 = r.constraint(vec![Term {
        tilde: false,
        ty: int,
    }]);
    let t25_param = r.b.type_param(c25);
    let g25_sig = r.b.signature(None, vec![], vec![t25_param]);
    let pos = r.pos();
    let g25 = r.b.method("g", pos, g25_sig);
    let pos = r.pos();
    let i25 = r.b.interface_type(pos, vec![g25], vec![]);
    r.recv("t25", vec![i25], vec![], false);

    // type iface interface { f(int) } — its method groups with t1's.
    let pos = r.pos();
    let iface_obj = r.b.type_name("iface", pos, Some(ScopeId::PACKAGE));
    let placeholder = r.b.external();
    let iface_named = r.b.named(iface_obj, placeholder);
    let fi_sig = r.b.signature(Some(iface_named), vec![int], vec![]);
    let pos = r.pos();
    let fi = r.b.method("f", pos, fi_sig);
    let pos = r.pos();
    let iface_lit = r.b.interface_type(pos, vec![fi], vec![]);
    r.b.set_underlying(iface_named, iface_lit);
    r.b.def(fi);
    r.methods.insert("iface".to_string(), fi);

    // Arrays (the preserved length rule) and channels.
    let arr3 = r.b.array(3, int);
    let arr4 = r.b.array(4, int);
    r.recv("a3", vec![arr3], vec![], false);
    r.recv("a3b", vec![arr3], vec![], false);
    r.recv("a4", vec![arr4], vec![], false);

    let ch_both = r.b.chan(ChanDir::SendRecv, int);
    let ch_send = r.b.chan(ChanDir::SendOnly, int);
    let ch_recv = r.b.chan(ChanDir::RecvOnly, int);
    r.recv("cboth", vec![ch_both], vec![], false);
    r.recv("csend", vec![ch_send], vec![], false);
    r.recv("crecv", vec![ch_recv], vec![], false);

    SignatureFixture {
        methods: r.methods,
        pkg: r.b.build(),
    }
}

/// `struct{ A <ty> }`, optionally tagged.
fn anon_struct_a(r: &mut SigRig, ty: TypeId, tag: &str) -> TypeId {
    let pos = r.pos();
    let (_, mut field) = r.b.field_def("A", pos, ty, false);
    field.tag = tag.to_string();
    let pos = r.pos();
    r.b.struct_type(pos, vec![field])
}
