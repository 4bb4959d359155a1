//! The lowered Go AST.
//!
//! This is a deliberately small subset of Go's syntax tree. Statement and
//! expression forms the analysis does not distinguish are preserved through
//! the generic [`Stmt::Other`] / [`Expr::Other`] nodes so that traversal
//! still reaches every nested call and selector.

use super::{NodeId, Pos};

/// One parsed Go source file.
#[derive(Debug)]
pub struct File {
    pub package_name: String,
    pub package_pos: Pos,
    pub imports: Vec<Import>,
    pub decls: Vec<Decl>,
}

/// A single import line. `alias` is the local name when the import is
/// renamed (`import l "log"`), `.` for dot imports, `_` for blank imports.
#[derive(Debug, Clone)]
pub struct Import {
    pub path: String,
    pub alias: Option<String>,
    pub pos: Pos,
}

/// Top-level declaration.
#[derive(Debug)]
pub enum Decl {
    Type(TypeDecl),
    Func(FuncDecl),
    Var(VarDecl),
}

/// `type Name …`. Only struct types carry detail; other kinds are opaque.
#[derive(Debug)]
pub struct TypeDecl {
    pub name: Ident,
    pub kind: TypeDeclKind,
}

#[derive(Debug)]
pub enum TypeDeclKind {
    Struct(StructType),
    Other,
}

#[derive(Debug)]
pub struct StructType {
    pub fields: Vec<Field>,
}

/// A struct field group. An empty `names` list marks an embedded field.
/// `tag` is the tag text with its surrounding quotes stripped.
#[derive(Debug)]
pub struct Field {
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub tag: Option<String>,
    pub pos: Pos,
}

/// A function or method declaration.
#[derive(Debug)]
pub struct FuncDecl {
    pub name: Ident,
    pub receiver: Option<Receiver>,
    pub params: Vec<ParamGroup>,
    pub results: Vec<TypeExpr>,
    /// `None` for bodyless declarations (assembly stubs); still indexed by
    /// the registry but contributing no propagation.
    pub body: Option<Vec<Stmt>>,
    pub pos: Pos,
}

#[derive(Debug)]
pub struct Receiver {
    pub name: Option<Ident>,
    pub ty: TypeExpr,
}

/// One parameter declaration, possibly multi-named (`a, b string`).
/// Parameter-to-argument mapping advances per group, not per name.
#[derive(Debug)]
pub struct ParamGroup {
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub variadic: bool,
    pub pos: Pos,
}

/// `var` declaration, at package level or inside a body.
#[derive(Debug)]
pub struct VarDecl {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
    pub pos: Pos,
}

/// Statements. Only the forms the analysis reads are first-class.
#[derive(Debug)]
pub enum Stmt {
    /// `lhs := rhs` — defines fresh bindings and seeds taint.
    Define(AssignStmt),
    /// `lhs = rhs` (and compound forms) — never seeds taint.
    Assign(AssignStmt),
    Var(VarDecl),
    Return {
        results: Vec<Expr>,
        pos: Pos,
    },
    Expr(Expr),
    Block(Vec<Stmt>),
    /// `for … := range expr` — binds loop variables without seeding.
    Range {
        vars: Vec<Expr>,
        expr: Option<Expr>,
        pos: Pos,
    },
    /// Any other statement, with its nested statements and the expressions
    /// it mentions (conditions, channel operands, …) preserved.
    Other {
        exprs: Vec<Expr>,
        children: Vec<Stmt>,
        pos: Pos,
    },
}

#[derive(Debug)]
pub struct AssignStmt {
    pub lhs: Vec<Expr>,
    pub rhs: Vec<Expr>,
    pub pos: Pos,
}

/// An identifier occurrence.
#[derive(Debug, Clone)]
pub struct Ident {
    pub id: NodeId,
    pub pos: Pos,
    pub name: String,
}

/// Expressions.
#[derive(Debug)]
pub enum Expr {
    Ident(Ident),
    /// `base.field` — field access, method value, or qualified reference.
    Selector {
        id: NodeId,
        pos: Pos,
        base: Box<Expr>,
        field: Ident,
    },
    Call {
        id: NodeId,
        pos: Pos,
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `T{…}` composite literal; element values are kept for traversal.
    Composite {
        id: NodeId,
        pos: Pos,
        ty: Option<TypeExpr>,
        elems: Vec<Expr>,
    },
    Unary {
        id: NodeId,
        pos: Pos,
        op: UnaryOp,
        operand: Box<Expr>,
    },
    FuncLit {
        id: NodeId,
        pos: Pos,
        params: Vec<ParamGroup>,
        body: Vec<Stmt>,
    },
    /// A literal of no analysis interest.
    Lit {
        id: NodeId,
        pos: Pos,
    },
    /// Any other expression with its sub-expressions preserved.
    Other {
        id: NodeId,
        pos: Pos,
        children: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `&x`
    Addr,
    /// `*x`
    Deref,
    Other,
}

/// Type expressions as written in source. Package qualifiers are the local
/// import names; the resolver maps them to package paths.
#[derive(Debug, Clone)]
pub enum TypeExpr {
    Name {
        id: NodeId,
        pos: Pos,
        qualifier: Option<String>,
        name: String,
    },
    Pointer {
        id: NodeId,
        pos: Pos,
        elem: Box<TypeExpr>,
    },
    Other {
        id: NodeId,
        pos: Pos,
    },
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Ident(i) => i.id,
            Expr::Selector { id, .. }
            | Expr::Call { id, .. }
            | Expr::Composite { id, .. }
            | Expr::Unary { id, .. }
            | Expr::FuncLit { id, .. }
            | Expr::Lit { id, .. }
            | Expr::Other { id, .. } => *id,
        }
    }

    pub fn pos(&self) -> Pos {
        match self {
            Expr::Ident(i) => i.pos,
            Expr::Selector { pos, .. }
            | Expr::Call { pos, .. }
            | Expr::Composite { pos, .. }
            | Expr::Unary { pos, .. }
            | Expr::FuncLit { pos, .. }
            | Expr::Lit { pos, .. }
            | Expr::Other { pos, .. } => *pos,
        }
    }

    /// Immediate sub-expressions, in source order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Ident(_) | Expr::Lit { .. } => Vec::new(),
            Expr::Selector { base, .. } => vec![&**base],
            Expr::Call { func, args, .. } => {
                let mut v: Vec<&Expr> = vec![&**func];
                v.extend(args.iter());
                v
            }
            Expr::Composite { elems, .. } => elems.iter().collect(),
            Expr::Unary { operand, .. } => vec![&**operand],
            Expr::FuncLit { .. } => Vec::new(),
            Expr::Other { children, .. } => children.iter().collect(),
        }
    }
}

impl Stmt {
    pub fn pos(&self) -> Pos {
        match self {
            Stmt::Define(a) | Stmt::Assign(a) => a.pos,
            Stmt::Var(v) => v.pos,
            Stmt::Return { pos, .. } | Stmt::Range { pos, .. } | Stmt::Other { pos, .. } => *pos,
            Stmt::Expr(e) => e.pos(),
            Stmt::Block(stmts) => stmts.first().map(Stmt::pos).unwrap_or(Pos {
                file: super::FileId(0),
                line: 0,
                column: 0,
            }),
        }
    }

    /// Expressions mentioned directly by this statement (not by nested
    /// statements).
    pub fn top_exprs(&self) -> Vec<&Expr> {
        match self {
            Stmt::Define(a) | Stmt::Assign(a) => a.lhs.iter().chain(a.rhs.iter()).collect(),
            Stmt::Var(v) => v.values.iter().collect(),
            Stmt::Return { results, .. } => results.iter().collect(),
            Stmt::Expr(e) => vec![e],
            Stmt::Block(_) => Vec::new(),
            Stmt::Range { vars, expr, .. } => {
                let mut v: Vec<&Expr> = vars.iter().collect();
                if let Some(e) = expr {
                    v.push(e);
                }
                v
            }
            Stmt::Other { exprs, .. } => exprs.iter().collect(),
        }
    }

    /// Nested statements of this statement.
    pub fn child_stmts(&self) -> &[Stmt] {
        match self {
            Stmt::Block(stmts) => stmts,
            Stmt::Other { children, .. } => children,
            _ => &[],
        }
    }
}

/// Pre-order walk over statements, descending into nested statements and
/// into function-literal bodies reachable through expressions.
pub fn walk_stmts<'a>(stmts: &'a [Stmt], visit: &mut dyn FnMut(&'a Stmt)) {
    for stmt in stmts {
        visit(stmt);
        for expr in stmt.top_exprs() {
            walk_func_lits(expr, visit);
        }
        walk_stmts(stmt.child_stmts(), visit);
    }
}

fn walk_func_lits<'a>(expr: &'a Expr, visit: &mut dyn FnMut(&'a Stmt)) {
    if let Expr::FuncLit { body, .. } = expr {
        walk_stmts(body, visit);
    }
    for child in expr.children() {
        walk_func_lits(child, visit);
    }
}

/// Pre-order walk over an expression tree. The visitor returns `false` to
/// stop descending below the current node.
pub fn walk_expr<'a>(expr: &'a Expr, visit: &mut dyn FnMut(&'a Expr) -> bool) {
    if !visit(expr) {
        return;
    }
    for child in expr.children() {
        walk_expr(child, visit);
    }
}

/// Every call expression inside `expr`, in pre-order.
pub fn collect_calls<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    walk_expr(expr, &mut |e| {
        if matches!(e, Expr::Call { .. }) {
            out.push(e);
        }
        true
    });
}
