//! The per-package resolver.
//!
//! Two passes over a package's files:
//!
//! 1. Register package-scope entities: type names, functions, methods
//!    (with their receivers and single-result types), package variables.
//! 2. Walk every function body with a lexical scope stack, recording
//!    definition and use sites for identifiers and assigning static types
//!    to expressions.
//!
//! Go scoping rules that matter to the analysis are honored: `:=` defines
//! a fresh symbol unless the name already exists in the innermost scope;
//! blocks, compound statements, and function literals open new scopes;
//! range clauses bind loop variables without counting as definitions the
//! taint tracker would seed from.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::syntax::ast::{
    AssignStmt, Decl, Expr, File, FuncDecl, Ident, ParamGroup, Stmt, TypeExpr, UnaryOp, VarDecl,
};

use super::{
    is_predeclared, GoType, ReceiverInfo, Symbol, SymbolId, SymbolKind, TypeInfo, TypeUniverse,
};

/// Resolve one package. `files` must all carry the same package clause;
/// `universe` spans every loaded package.
pub fn resolve_package(pkg_path: &str, files: &[File], universe: &TypeUniverse) -> TypeInfo {
    let mut r = Resolver {
        pkg: pkg_path,
        universe,
        info: TypeInfo::new(),
        scopes: Vec::new(),
        package_scope: FxHashMap::default(),
        methods: FxHashMap::default(),
        type_names: FxHashSet::default(),
        imports: FxHashMap::default(),
    };

    // Pass 1: package-scope entities, per file so signature types resolve
    // against that file's imports.
    for file in files {
        r.set_imports(file);
        for decl in &file.decls {
            match decl {
                Decl::Type(td) => {
                    r.type_names.insert(td.name.name.clone());
                }
                Decl::Func(fd) => r.register_func(fd),
                Decl::Var(vd) => r.register_package_var(vd),
            }
        }
    }

    // Pass 2: bodies and package-level initializers.
    for file in files {
        r.set_imports(file);
        for decl in &file.decls {
            match decl {
                Decl::Func(fd) => r.resolve_func(fd),
                Decl::Var(vd) => {
                    r.scopes.push(FxHashMap::default());
                    for value in &vd.values {
                        r.resolve_expr(value);
                    }
                    r.scopes.pop();
                }
                Decl::Type(_) => {}
            }
        }
    }

    r.info
}

struct Resolver<'a> {
    pkg: &'a str,
    universe: &'a TypeUniverse,
    info: TypeInfo,
    scopes: Vec<FxHashMap<String, SymbolId>>,
    package_scope: FxHashMap<String, SymbolId>,
    /// Same-package methods: `(receiver base type, method name)` → symbol.
    methods: FxHashMap<(String, String), SymbolId>,
    type_names: FxHashSet<String>,
    /// Current file's imports: local name → package path.
    imports: FxHashMap<String, String>,
}

/// Local import name → package path for one file. Blank and dot imports
/// contribute no referenceable name.
pub(crate) fn import_map(file: &File) -> FxHashMap<String, String> {
    let mut imports = FxHashMap::default();
    for imp in &file.imports {
        let local = match imp.alias.as_deref() {
            Some("_") | Some(".") => continue,
            Some(alias) => alias.to_string(),
            None => imp
                .path
                .rsplit('/')
                .next()
                .unwrap_or(&imp.path)
                .to_string(),
        };
        imports.insert(local, imp.path.clone());
    }
    imports
}

/// Resolve a written type against a file's imports and the current
/// package path.
pub(crate) fn resolve_type_expr_in(
    ty: &TypeExpr,
    pkg: &str,
    imports: &FxHashMap<String, String>,
) -> GoType {
    match ty {
        TypeExpr::Name {
            qualifier: None,
            name,
            ..
        } => {
            if is_predeclared(name) {
                GoType::Basic(name.clone())
            } else {
                GoType::named(pkg, name)
            }
        }
        TypeExpr::Name {
            qualifier: Some(q),
            name,
            ..
        } => match imports.get(q) {
            Some(path) => GoType::named(path.clone(), name),
            None => GoType::Unknown,
        },
        TypeExpr::Pointer { elem, .. } => {
            let inner = resolve_type_expr_in(elem, pkg, imports);
            if inner.is_unknown() {
                GoType::Unknown
            } else {
                GoType::pointer_to(inner)
            }
        }
        TypeExpr::Other { .. } => GoType::Unknown,
    }
}

impl<'a> Resolver<'a> {
    fn set_imports(&mut self, file: &File) {
        self.imports = import_map(file);
    }

    // -----------------------------------------------------------------
    // Pass 1
    // -----------------------------------------------------------------

    fn register_func(&mut self, fd: &FuncDecl) {
        let result = self.single_result(fd);
        match &fd.receiver {
            None => {
                let sym = self.info.symbols.push(Symbol {
                    name: fd.name.name.clone(),
                    kind: SymbolKind::Func,
                    pkg: Some(self.pkg.to_string()),
                    recv: None,
                    ty: GoType::Unknown,
                    result,
                });
                self.info.record_def(fd.name.id, sym);
                self.package_scope.insert(fd.name.name.clone(), sym);
            }
            Some(recv) => {
                let (base, pointer) = receiver_base(&recv.ty);
                let Some(base) = base else { return };
                let sym = self.info.symbols.push(Symbol {
                    name: fd.name.name.clone(),
                    kind: SymbolKind::Func,
                    pkg: Some(self.pkg.to_string()),
                    recv: Some(ReceiverInfo {
                        pkg: self.pkg.to_string(),
                        name: base.clone(),
                        pointer,
                    }),
                    ty: GoType::Unknown,
                    result,
                });
                self.info.record_def(fd.name.id, sym);
                self.methods.insert((base, fd.name.name.clone()), sym);
            }
        }
    }

    fn single_result(&mut self, fd: &FuncDecl) -> Option<GoType> {
        if fd.results.len() != 1 {
            return None;
        }
        Some(self.resolve_type_expr(&fd.results[0]))
    }

    fn register_package_var(&mut self, vd: &VarDecl) {
        let declared = vd.ty.as_ref().map(|t| self.resolve_type_expr(t));
        for name in &vd.names {
            if name.name == "_" {
                continue;
            }
            let sym = self.info.symbols.push(Symbol {
                name: name.name.clone(),
                kind: SymbolKind::Var,
                pkg: Some(self.pkg.to_string()),
                recv: None,
                ty: declared.clone().unwrap_or(GoType::Unknown),
                result: None,
            });
            self.info.record_def(name.id, sym);
            self.package_scope.insert(name.name.clone(), sym);
        }
    }

    // -----------------------------------------------------------------
    // Pass 2
    // -----------------------------------------------------------------

    fn resolve_func(&mut self, fd: &FuncDecl) {
        self.scopes.push(FxHashMap::default());

        if let Some(recv) = &fd.receiver {
            let ty = self.resolve_type_expr(&recv.ty);
            if let Some(name) = &recv.name {
                if name.name != "_" {
                    let sym = self.info.symbols.push(Symbol {
                        name: name.name.clone(),
                        kind: SymbolKind::Var,
                        pkg: Some(self.pkg.to_string()),
                        recv: None,
                        ty,
                        result: None,
                    });
                    self.info.record_def(name.id, sym);
                    self.bind(&name.name, sym);
                }
            }
        }

        self.bind_params(&fd.params);

        if let Some(body) = &fd.body {
            self.resolve_stmts(body);
        }

        self.scopes.pop();
    }

    fn bind_params(&mut self, params: &[ParamGroup]) {
        for group in params {
            // A variadic parameter's value is a slice of the written type;
            // leave it untyped rather than claim the element type.
            let ty = if group.variadic {
                GoType::Unknown
            } else {
                self.resolve_type_expr(&group.ty)
            };
            for name in &group.names {
                if name.name == "_" {
                    continue;
                }
                let sym = self.info.symbols.push(Symbol {
                    name: name.name.clone(),
                    kind: SymbolKind::Param,
                    pkg: Some(self.pkg.to_string()),
                    recv: None,
                    ty: ty.clone(),
                    result: None,
                });
                self.info.record_def(name.id, sym);
                self.bind(&name.name, sym);
            }
        }
    }

    fn resolve_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            match stmt {
                Stmt::Define(a) => self.resolve_define(a),
                Stmt::Assign(a) => {
                    for e in &a.rhs {
                        self.resolve_expr(e);
                    }
                    for e in &a.lhs {
                        self.resolve_expr(e);
                    }
                }
                Stmt::Var(vd) => self.resolve_local_var(vd),
                Stmt::Return { results, .. } => {
                    for e in results {
                        self.resolve_expr(e);
                    }
                }
                Stmt::Expr(e) => {
                    self.resolve_expr(e);
                }
                Stmt::Block(inner) => {
                    self.scopes.push(FxHashMap::default());
                    self.resolve_stmts(inner);
                    self.scopes.pop();
                }
                Stmt::Range { vars, expr, .. } => {
                    if let Some(e) = expr {
                        self.resolve_expr(e);
                    }
                    for var in vars {
                        self.resolve_range_var(var);
                    }
                }
                Stmt::Other { exprs, children, .. } => {
                    self.scopes.push(FxHashMap::default());
                    for e in exprs {
                        self.resolve_expr(e);
                    }
                    self.resolve_stmts(children);
                    self.scopes.pop();
                }
            }
        }
    }

    /// `lhs := rhs`. RHS resolves in the enclosing scope first; each LHS
    /// identifier defines a fresh symbol unless the name already lives in
    /// the innermost scope (Go's redeclaration rule).
    fn resolve_define(&mut self, a: &AssignStmt) {
        let rhs_types: Vec<GoType> = a.rhs.iter().map(|e| self.resolve_expr(e)).collect();
        let paired = a.lhs.len() == a.rhs.len();

        for (i, lhs) in a.lhs.iter().enumerate() {
            match lhs {
                Expr::Ident(ident) if ident.name == "_" => {}
                Expr::Ident(ident) => {
                    if let Some(&existing) = self
                        .scopes
                        .last()
                        .and_then(|scope| scope.get(&ident.name))
                    {
                        self.info.record_use(ident.id, existing);
                        continue;
                    }
                    let ty = if paired {
                        rhs_types[i].clone()
                    } else {
                        GoType::Unknown
                    };
                    let sym = self.info.symbols.push(Symbol {
                        name: ident.name.clone(),
                        kind: SymbolKind::Var,
                        pkg: Some(self.pkg.to_string()),
                        recv: None,
                        ty: ty.clone(),
                        result: None,
                    });
                    self.info.record_def(ident.id, sym);
                    self.info.record_type(ident.id, ty);
                    self.bind(&ident.name, sym);
                }
                other => {
                    self.resolve_expr(other);
                }
            }
        }
    }

    fn resolve_local_var(&mut self, vd: &VarDecl) {
        let value_types: Vec<GoType> = vd.values.iter().map(|e| self.resolve_expr(e)).collect();
        let declared = vd.ty.as_ref().map(|t| self.resolve_type_expr(t));
        let paired = vd.names.len() == vd.values.len();

        for (i, name) in vd.names.iter().enumerate() {
            if name.name == "_" {
                continue;
            }
            let ty = declared
                .clone()
                .or_else(|| paired.then(|| value_types[i].clone()))
                .unwrap_or(GoType::Unknown);
            let sym = self.info.symbols.push(Symbol {
                name: name.name.clone(),
                kind: SymbolKind::Var,
                pkg: Some(self.pkg.to_string()),
                recv: None,
                ty,
                result: None,
            });
            self.info.record_def(name.id, sym);
            self.bind(&name.name, sym);
        }
    }

    fn resolve_range_var(&mut self, var: &Expr) {
        match var {
            Expr::Ident(ident) if ident.name == "_" => {}
            Expr::Ident(ident) => {
                if let Some(&existing) = self
                    .scopes
                    .last()
                    .and_then(|scope| scope.get(&ident.name))
                {
                    self.info.record_use(ident.id, existing);
                    return;
                }
                let sym = self.info.symbols.push(Symbol {
                    name: ident.name.clone(),
                    kind: SymbolKind::Var,
                    pkg: Some(self.pkg.to_string()),
                    recv: None,
                    ty: GoType::Unknown,
                    result: None,
                });
                self.info.record_def(ident.id, sym);
                self.bind(&ident.name, sym);
            }
            other => {
                self.resolve_expr(other);
            }
        }
    }

    // -----------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------

    fn resolve_expr(&mut self, expr: &Expr) -> GoType {
        let ty = match expr {
            Expr::Ident(ident) => self.resolve_ident(ident),
            Expr::Selector { base, field, .. } => self.resolve_selector(expr, base, field),
            Expr::Call { func, args, .. } => {
                self.resolve_expr(func);
                for arg in args {
                    self.resolve_expr(arg);
                }
                self.call_result(func)
            }
            Expr::Composite { ty, elems, .. } => {
                for elem in elems {
                    self.resolve_expr(elem);
                }
                ty.as_ref()
                    .map(|t| self.resolve_type_expr(t))
                    .unwrap_or(GoType::Unknown)
            }
            Expr::Unary { op, operand, .. } => {
                let inner = self.resolve_expr(operand);
                match op {
                    UnaryOp::Addr if !inner.is_unknown() => GoType::pointer_to(inner),
                    UnaryOp::Deref => match inner {
                        GoType::Pointer(elem) => *elem,
                        _ => GoType::Unknown,
                    },
                    _ => GoType::Unknown,
                }
            }
            Expr::FuncLit { params, body, .. } => {
                self.scopes.push(FxHashMap::default());
                // Bind literal parameters so they shadow correctly; the
                // registry never sees closures, so they stay out of the
                // interprocedural mapping.
                for group in params {
                    let ty = if group.variadic {
                        GoType::Unknown
                    } else {
                        self.resolve_type_expr(&group.ty)
                    };
                    for name in &group.names {
                        if name.name == "_" {
                            continue;
                        }
                        let sym = self.info.symbols.push(Symbol {
                            name: name.name.clone(),
                            kind: SymbolKind::Param,
                            pkg: Some(self.pkg.to_string()),
                            recv: None,
                            ty: ty.clone(),
                            result: None,
                        });
                        self.info.record_def(name.id, sym);
                        self.bind(&name.name, sym);
                    }
                }
                self.resolve_stmts(body);
                self.scopes.pop();
                GoType::Unknown
            }
            Expr::Lit { .. } => GoType::Unknown,
            Expr::Other { children, .. } => {
                for child in children {
                    self.resolve_expr(child);
                }
                GoType::Unknown
            }
        };
        self.info.record_type(expr.id(), ty.clone());
        ty
    }

    fn resolve_ident(&mut self, ident: &Ident) -> GoType {
        if ident.name == "_" {
            return GoType::Unknown;
        }
        if let Some(sym) = self.lookup(&ident.name) {
            self.info.record_use(ident.id, sym);
            return self.info.symbols.get(sym).ty.clone();
        }
        GoType::Unknown
    }

    fn resolve_selector(&mut self, _whole: &Expr, base: &Expr, field: &Ident) -> GoType {
        // Qualified reference `pkg.Name` when the base names an import that
        // no local symbol shadows.
        if let Expr::Ident(base_ident) = base {
            if self.lookup(&base_ident.name).is_none() {
                if let Some(pkg_path) = self.imports.get(&base_ident.name).cloned() {
                    let result = builtin_constructor_result(&pkg_path, &field.name);
                    let sym = self.info.symbols.intern_foreign_func(
                        &pkg_path,
                        &field.name,
                        None,
                        result,
                    );
                    self.info.record_use(field.id, sym);
                    return GoType::Unknown;
                }
            }
        }

        let base_ty = self.resolve_expr(base);
        let elem = base_ty.deref_once().clone();
        let Some((pkg, name)) = elem.as_named() else {
            return GoType::Unknown;
        };
        let (pkg, name) = (pkg.to_string(), name.to_string());

        // Field access wins when the struct declares (or promotes) the name.
        if let Some(ft) = self.universe.field_type(&pkg, &name, &field.name) {
            return ft;
        }

        // Method reference.
        if pkg == self.pkg {
            if let Some(&sym) = self.methods.get(&(name.clone(), field.name.clone())) {
                self.info.record_use(field.id, sym);
                return GoType::Unknown;
            }
            return GoType::Unknown;
        }
        let sym = self.info.symbols.intern_foreign_func(
            &pkg,
            &field.name,
            Some(ReceiverInfo {
                pkg: pkg.clone(),
                name,
                pointer: base_ty.is_pointer(),
            }),
            None,
        );
        self.info.record_use(field.id, sym);
        GoType::Unknown
    }

    /// Result type of a call: the callee's single declared result, or a
    /// type conversion when the callee names a type.
    fn call_result(&mut self, func: &Expr) -> GoType {
        let callee = match func {
            Expr::Ident(i) => self.info.use_of(i.id),
            Expr::Selector { field, .. } => self.info.use_of(field.id),
            _ => None,
        };
        if let Some(sym) = callee {
            let symbol = self.info.symbols.get(sym);
            if symbol.kind == SymbolKind::Func {
                return symbol.result.clone().unwrap_or(GoType::Unknown);
            }
            return GoType::Unknown;
        }
        // Unresolved bare identifier: a conversion `T(x)` or `string(x)`.
        if let Expr::Ident(i) = func {
            if self.type_names.contains(&i.name) {
                return GoType::named(self.pkg, &i.name);
            }
            if is_predeclared(&i.name) {
                return GoType::Basic(i.name.clone());
            }
        }
        GoType::Unknown
    }

    fn resolve_type_expr(&mut self, ty: &TypeExpr) -> GoType {
        resolve_type_expr_in(ty, self.pkg, &self.imports)
    }

    // -----------------------------------------------------------------
    // Scopes
    // -----------------------------------------------------------------

    fn bind(&mut self, name: &str, sym: SymbolId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), sym);
        } else {
            self.package_scope.insert(name.to_string(), sym);
        }
    }

    fn lookup(&self, name: &str) -> Option<SymbolId> {
        for scope in self.scopes.iter().rev() {
            if let Some(&sym) = scope.get(name) {
                return Some(sym);
            }
        }
        self.package_scope.get(name).copied()
    }
}

/// Base type name and pointer-ness of a method receiver type expression.
fn receiver_base(ty: &TypeExpr) -> (Option<String>, bool) {
    match ty {
        TypeExpr::Name { name, .. } => (Some(name.clone()), false),
        TypeExpr::Pointer { elem, .. } => match &**elem {
            TypeExpr::Name { name, .. } => (Some(name.clone()), true),
            _ => (None, true),
        },
        TypeExpr::Other { .. } => (None, false),
    }
}

/// Known standard-library constructor signatures for the logger types the
/// built-in sink rules care about.
fn builtin_constructor_result(pkg: &str, name: &str) -> Option<GoType> {
    match (pkg, name) {
        ("log/slog", "Default") | ("log/slog", "New") | ("log/slog", "With") => Some(
            GoType::pointer_to(GoType::named("log/slog", "Logger")),
        ),
        ("log", "Default") | ("log", "New") => {
            Some(GoType::pointer_to(GoType::named("log", "Logger")))
        }
        _ => None,
    }
}
