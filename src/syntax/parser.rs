//! Tree-sitter based Go parser.
//!
//! Parses a source file with the `tree-sitter-go` grammar and lowers the
//! concrete syntax tree into the AST subset in [`super::ast`]. Lowering is
//! tolerant: unknown or malformed nodes become generic `Other` nodes (or
//! are dropped when they carry nothing traversable), never errors.

use tree_sitter::{Node, Parser};

use crate::error::{HoundError, Result};
use crate::syntax::ast::{
    AssignStmt, Decl, Expr, Field, File, FuncDecl, Ident, Import, ParamGroup, Receiver, Stmt,
    StructType, TypeDecl, TypeDeclKind, TypeExpr, UnaryOp, VarDecl,
};
use crate::syntax::{FileId, NodeIdGen, Pos};

/// Go parser handle. Construction fails only if the grammar version is
/// incompatible with the linked tree-sitter runtime.
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| HoundError::TreeSitter(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse one file and lower it. `file_id` must come from the package's
    /// [`crate::syntax::FileSet`]; `ids` is the package-wide node id
    /// allocator.
    pub fn parse_file(
        &mut self,
        file_id: FileId,
        file_name: &str,
        source: &str,
        ids: &mut NodeIdGen,
    ) -> Result<File> {
        let tree = self
            .parser
            .parse(source.as_bytes(), None)
            .ok_or_else(|| HoundError::Parse {
                file: file_name.to_string(),
                message: "tree-sitter returned no tree".to_string(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            tracing::warn!(file = file_name, "syntax errors in file; lowering best-effort");
        }

        let mut lower = Lowerer {
            source: source.as_bytes(),
            file: file_id,
            ids,
        };
        Ok(lower.file(root))
    }
}

struct Lowerer<'a> {
    source: &'a [u8],
    file: FileId,
    ids: &'a mut NodeIdGen,
}

impl<'a> Lowerer<'a> {
    fn text(&self, node: Node) -> &str {
        std::str::from_utf8(&self.source[node.start_byte()..node.end_byte()]).unwrap_or("")
    }

    fn pos(&self, node: Node) -> Pos {
        let p = node.start_position();
        Pos::new(self.file, p.row as u32 + 1, p.column as u32 + 1)
    }

    fn ident(&mut self, node: Node) -> Ident {
        Ident {
            id: self.ids.next(),
            pos: self.pos(node),
            name: self.text(node).to_string(),
        }
    }

    // ---------------------------------------------------------------------
    // File level
    // ---------------------------------------------------------------------

    fn file(&mut self, root: Node) -> File {
        let mut package_name = String::new();
        let mut package_pos = Pos::new(self.file, 1, 1);
        let mut imports = Vec::new();
        let mut decls = Vec::new();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_clause" => {
                    let mut c = child.walk();
                    for n in child.named_children(&mut c) {
                        if n.kind() == "package_identifier" {
                            package_name = self.text(n).to_string();
                            package_pos = self.pos(n);
                        }
                    }
                }
                "import_declaration" => self.imports(child, &mut imports),
                "function_declaration" | "method_declaration" => {
                    if let Some(f) = self.func_decl(child) {
                        decls.push(Decl::Func(f));
                    }
                }
                "type_declaration" => self.type_decls(child, &mut decls),
                "var_declaration" => {
                    for v in self.var_decl(child) {
                        decls.push(Decl::Var(v));
                    }
                }
                _ => {}
            }
        }

        File {
            package_name,
            package_pos,
            imports,
            decls,
        }
    }

    fn imports(&mut self, node: Node, out: &mut Vec<Import>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => {
                    if let Some(imp) = self.import_spec(child) {
                        out.push(imp);
                    }
                }
                "import_spec_list" => {
                    let mut inner = child.walk();
                    for spec in child.named_children(&mut inner) {
                        if spec.kind() == "import_spec" {
                            if let Some(imp) = self.import_spec(spec) {
                                out.push(imp);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn import_spec(&mut self, node: Node) -> Option<Import> {
        let path_node = node.child_by_field_name("path")?;
        let path = self.text(path_node).trim_matches('"').to_string();
        let alias = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string());
        Some(Import {
            path,
            alias,
            pos: self.pos(node),
        })
    }

    fn type_decls(&mut self, node: Node, out: &mut Vec<Decl>) {
        let mut cursor = node.walk();
        for spec in node.named_children(&mut cursor) {
            if spec.kind() != "type_spec" {
                continue;
            }
            let Some(name_node) = spec.child_by_field_name("name") else {
                continue;
            };
            let name = self.ident(name_node);
            let kind = match spec.child_by_field_name("type") {
                Some(ty) if ty.kind() == "struct_type" => {
                    TypeDeclKind::Struct(self.struct_type(ty))
                }
                _ => TypeDeclKind::Other,
            };
            out.push(Decl::Type(TypeDecl { name, kind }));
        }
    }

    fn struct_type(&mut self, node: Node) -> StructType {
        let mut fields = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() != "field_declaration_list" {
                continue;
            }
            let mut inner = child.walk();
            for field in child.named_children(&mut inner) {
                if field.kind() != "field_declaration" {
                    continue;
                }
                fields.push(self.field(field));
            }
        }
        StructType { fields }
    }

    fn field(&mut self, node: Node) -> Field {
        let mut names = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "field_identifier" {
                names.push(self.ident(child));
            }
        }

        // Embedded fields have no name; their type is the sole type-like child.
        let ty = match node.child_by_field_name("type") {
            Some(t) => self.type_expr(t),
            None => {
                let mut found = None;
                let mut c = node.walk();
                for child in node.named_children(&mut c) {
                    if matches!(
                        child.kind(),
                        "type_identifier" | "qualified_type" | "pointer_type"
                    ) {
                        found = Some(self.type_expr(child));
                        break;
                    }
                }
                found.unwrap_or(TypeExpr::Other {
                    id: self.ids.next(),
                    pos: self.pos(node),
                })
            }
        };

        // Strip only the literal's own delimiters; the tag text itself
        // contains double quotes that must survive.
        let tag = node.child_by_field_name("tag").map(|t| {
            let text = self.text(t);
            let delim = if t.kind() == "raw_string_literal" {
                '`'
            } else {
                '"'
            };
            text.strip_prefix(delim)
                .and_then(|s| s.strip_suffix(delim))
                .unwrap_or(text)
                .to_string()
        });

        Field {
            names,
            ty,
            tag,
            pos: self.pos(node),
        }
    }

    fn func_decl(&mut self, node: Node) -> Option<FuncDecl> {
        let name = self.ident(node.child_by_field_name("name")?);

        let receiver = node.child_by_field_name("receiver").and_then(|recv| {
            let mut cursor = recv.walk();
            let found = recv
                .named_children(&mut cursor)
                .find(|c| c.kind() == "parameter_declaration");
            found.map(|decl| {
                let name = decl
                    .child_by_field_name("name")
                    .map(|n| self.ident(n));
                let ty = decl
                    .child_by_field_name("type")
                    .map(|t| self.type_expr(t))
                    .unwrap_or(TypeExpr::Other {
                        id: self.ids.next(),
                        pos: self.pos(decl),
                    });
                Receiver { name, ty }
            })
        });

        let params = node
            .child_by_field_name("parameters")
            .map(|p| self.param_groups(p))
            .unwrap_or_default();

        let results = node
            .child_by_field_name("result")
            .map(|r| self.result_types(r))
            .unwrap_or_default();

        let body = node
            .child_by_field_name("body")
            .map(|b| self.block_stmts(b));

        Some(FuncDecl {
            name,
            receiver,
            params,
            results,
            body,
            pos: self.pos(node),
        })
    }

    fn param_groups(&mut self, node: Node) -> Vec<ParamGroup> {
        let mut groups = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            let variadic = match child.kind() {
                "parameter_declaration" => false,
                "variadic_parameter_declaration" => true,
                _ => continue,
            };
            let mut names = Vec::new();
            let mut inner = child.walk();
            for n in child.named_children(&mut inner) {
                if n.kind() == "identifier" {
                    names.push(self.ident(n));
                }
            }
            let ty = child
                .child_by_field_name("type")
                .map(|t| self.type_expr(t))
                .unwrap_or(TypeExpr::Other {
                    id: self.ids.next(),
                    pos: self.pos(child),
                });
            groups.push(ParamGroup {
                names,
                ty,
                variadic,
                pos: self.pos(child),
            });
        }
        groups
    }

    /// Result clause: either a bare type or a parenthesized parameter list.
    /// Named results contribute one entry per name so the arity is right.
    fn result_types(&mut self, node: Node) -> Vec<TypeExpr> {
        if node.kind() != "parameter_list" {
            return vec![self.type_expr(node)];
        }
        let mut results = Vec::new();
        for group in self.param_groups(node) {
            let n = group.names.len().max(1);
            for _ in 0..n {
                results.push(group.ty.clone());
            }
        }
        results
    }

    fn type_expr(&mut self, node: Node) -> TypeExpr {
        let id = self.ids.next();
        let pos = self.pos(node);
        match node.kind() {
            "type_identifier" => TypeExpr::Name {
                id,
                pos,
                qualifier: None,
                name: self.text(node).to_string(),
            },
            "qualified_type" => {
                let qualifier = node
                    .child_by_field_name("package")
                    .map(|p| self.text(p).to_string());
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default();
                TypeExpr::Name {
                    id,
                    pos,
                    qualifier,
                    name,
                }
            }
            "pointer_type" => {
                let mut cursor = node.walk();
                let elem = node
                    .named_children(&mut cursor)
                    .next()
                    .map(|n| self.type_expr(n))
                    .unwrap_or(TypeExpr::Other { id, pos });
                TypeExpr::Pointer {
                    id: self.ids.next(),
                    pos,
                    elem: Box::new(elem),
                }
            }
            _ => TypeExpr::Other { id, pos },
        }
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn block_stmts(&mut self, node: Node) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.stmt_into(child, &mut stmts);
        }
        stmts
    }

    fn stmt_into(&mut self, node: Node, out: &mut Vec<Stmt>) {
        match node.kind() {
            "short_var_declaration" => out.push(Stmt::Define(self.assign_stmt(node))),
            "assignment_statement" => out.push(Stmt::Assign(self.assign_stmt(node))),
            "var_declaration" => {
                for v in self.var_decl(node) {
                    out.push(Stmt::Var(v));
                }
            }
            "return_statement" => {
                let mut results = Vec::new();
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    if child.kind() == "expression_list" {
                        let mut inner = child.walk();
                        for e in child.named_children(&mut inner) {
                            results.push(self.expr(e));
                        }
                    }
                }
                out.push(Stmt::Return {
                    results,
                    pos: self.pos(node),
                });
            }
            "expression_statement" => {
                let mut cursor = node.walk();
                let child = node.named_children(&mut cursor).next();
                if let Some(child) = child {
                    out.push(Stmt::Expr(self.expr(child)));
                }
            }
            "block" => out.push(Stmt::Block(self.block_stmts(node))),
            "comment" => {}
            _ => out.push(self.generic_stmt(node)),
        }
    }

    fn assign_stmt(&mut self, node: Node) -> AssignStmt {
        let lhs = node
            .child_by_field_name("left")
            .map(|n| self.expr_list(n))
            .unwrap_or_default();
        let rhs = node
            .child_by_field_name("right")
            .map(|n| self.expr_list(n))
            .unwrap_or_default();
        AssignStmt {
            lhs,
            rhs,
            pos: self.pos(node),
        }
    }

    fn expr_list(&mut self, node: Node) -> Vec<Expr> {
        if node.kind() != "expression_list" {
            return vec![self.expr(node)];
        }
        let mut exprs = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            exprs.push(self.expr(child));
        }
        exprs
    }

    fn var_decl(&mut self, node: Node) -> Vec<VarDecl> {
        let mut decls = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "var_spec" => decls.push(self.var_spec(child)),
                "var_spec_list" => {
                    let mut inner = child.walk();
                    for spec in child.named_children(&mut inner) {
                        if spec.kind() == "var_spec" {
                            decls.push(self.var_spec(spec));
                        }
                    }
                }
                _ => {}
            }
        }
        decls
    }

    fn var_spec(&mut self, node: Node) -> VarDecl {
        let mut names = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "identifier" {
                names.push(self.ident(child));
            }
        }
        let ty = node.child_by_field_name("type").map(|t| self.type_expr(t));
        let values = node
            .child_by_field_name("value")
            .map(|v| self.expr_list(v))
            .unwrap_or_default();
        VarDecl {
            names,
            ty,
            values,
            pos: self.pos(node),
        }
    }

    /// Lower any other statement form, keeping nested statements and
    /// mentioned expressions traversable. Clause containers (for clauses,
    /// case clauses) are scanned recursively; range clauses get their own
    /// variant so the resolver can bind loop variables without letting
    /// the tracker mistake them for seeded definitions.
    fn generic_stmt(&mut self, node: Node) -> Stmt {
        let pos = self.pos(node);
        let mut exprs = Vec::new();
        let mut children = Vec::new();
        self.scan_generic(node, &mut exprs, &mut children);
        Stmt::Other {
            exprs,
            children,
            pos,
        }
    }

    fn scan_generic(&mut self, node: Node, exprs: &mut Vec<Expr>, children: &mut Vec<Stmt>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            let kind = child.kind();
            if kind == "range_clause" {
                let vars = child
                    .child_by_field_name("left")
                    .map(|n| self.expr_list(n))
                    .unwrap_or_default();
                let expr = child.child_by_field_name("right").map(|n| self.expr(n));
                children.push(Stmt::Range {
                    vars,
                    expr,
                    pos: self.pos(child),
                });
            } else if kind.ends_with("_clause") {
                // e.g. for_clause: initializer; condition; update
                self.scan_generic(child, exprs, children);
            } else if is_stmt_kind(kind) {
                self.stmt_into(child, children);
            } else if kind == "expression_list" {
                for e in self.expr_list(child) {
                    exprs.push(e);
                }
            } else if kind != "comment" && !kind.ends_with("_type") && kind != "type_identifier" {
                exprs.push(self.expr(child));
            }
        }
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    fn expr(&mut self, node: Node) -> Expr {
        let id = self.ids.next();
        let pos = self.pos(node);
        match node.kind() {
            "identifier" | "field_identifier" | "package_identifier" | "type_identifier"
            | "blank_identifier" => Expr::Ident(Ident {
                id,
                pos,
                name: self.text(node).to_string(),
            }),
            "selector_expression" => {
                let base = node
                    .child_by_field_name("operand")
                    .map(|n| self.expr(n))
                    .unwrap_or(Expr::Other {
                        id: self.ids.next(),
                        pos,
                        children: Vec::new(),
                    });
                let field = node
                    .child_by_field_name("field")
                    .map(|n| self.ident(n))
                    .unwrap_or(Ident {
                        id: self.ids.next(),
                        pos,
                        name: String::new(),
                    });
                Expr::Selector {
                    id,
                    pos,
                    base: Box::new(base),
                    field,
                }
            }
            "call_expression" => {
                let func = node
                    .child_by_field_name("function")
                    .map(|n| self.expr(n))
                    .unwrap_or(Expr::Other {
                        id: self.ids.next(),
                        pos,
                        children: Vec::new(),
                    });
                let mut args = Vec::new();
                if let Some(arglist) = node.child_by_field_name("arguments") {
                    let mut cursor = arglist.walk();
                    for arg in arglist.named_children(&mut cursor) {
                        args.push(self.expr(arg));
                    }
                }
                Expr::Call {
                    id,
                    pos,
                    func: Box::new(func),
                    args,
                }
            }
            "composite_literal" => {
                let ty = node.child_by_field_name("type").map(|t| self.type_expr(t));
                let mut elems = Vec::new();
                if let Some(body) = node.child_by_field_name("body") {
                    let mut cursor = body.walk();
                    for elem in body.named_children(&mut cursor) {
                        match elem.kind() {
                            "keyed_element" => {
                                let mut inner = elem.walk();
                                if let Some(value) = elem.named_children(&mut inner).last() {
                                    elems.push(self.expr(value));
                                }
                            }
                            "literal_element" => {
                                let mut inner = elem.walk();
                                let value = elem.named_children(&mut inner).next();
                                if let Some(value) = value {
                                    elems.push(self.expr(value));
                                }
                            }
                            _ => elems.push(self.expr(elem)),
                        }
                    }
                }
                Expr::Composite { id, pos, ty, elems }
            }
            "unary_expression" => {
                let op = match node
                    .child_by_field_name("operator")
                    .map(|o| self.text(o).to_string())
                    .as_deref()
                {
                    Some("&") => UnaryOp::Addr,
                    Some("*") => UnaryOp::Deref,
                    _ => UnaryOp::Other,
                };
                let operand = node
                    .child_by_field_name("operand")
                    .map(|n| self.expr(n))
                    .unwrap_or(Expr::Other {
                        id: self.ids.next(),
                        pos,
                        children: Vec::new(),
                    });
                Expr::Unary {
                    id,
                    pos,
                    op,
                    operand: Box::new(operand),
                }
            }
            "parenthesized_expression" => {
                let mut cursor = node.walk();
                let child = node.named_children(&mut cursor).next();
                match child {
                    Some(inner) => self.expr(inner),
                    None => Expr::Other {
                        id,
                        pos,
                        children: Vec::new(),
                    },
                }
            }
            "func_literal" => {
                let params = node
                    .child_by_field_name("parameters")
                    .map(|p| self.param_groups(p))
                    .unwrap_or_default();
                let body = node
                    .child_by_field_name("body")
                    .map(|b| self.block_stmts(b))
                    .unwrap_or_default();
                Expr::FuncLit {
                    id,
                    pos,
                    params,
                    body,
                }
            }
            "interpreted_string_literal" | "raw_string_literal" | "int_literal"
            | "float_literal" | "imaginary_literal" | "rune_literal" | "true" | "false" | "nil"
            | "iota" => Expr::Lit { id, pos },
            _ => {
                let mut children = Vec::new();
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    let kind = child.kind();
                    if kind == "comment" || kind.ends_with("_type") || is_stmt_kind(kind) {
                        continue;
                    }
                    children.push(self.expr(child));
                }
                Expr::Other { id, pos, children }
            }
        }
    }
}

fn is_stmt_kind(kind: &str) -> bool {
    kind.ends_with("_statement")
        || kind.ends_with("_declaration")
        || kind.ends_with("_case")
        || kind == "block"
        || kind == "communication_case"
        || kind == "default_case"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::FileSet;

    fn parse(source: &str) -> File {
        let mut fset = FileSet::new();
        let id = fset.add("test.go");
        let mut ids = NodeIdGen::new();
        GoParser::new()
            .unwrap()
            .parse_file(id, "test.go", source, &mut ids)
            .unwrap()
    }

    #[test]
    fn test_parse_struct_with_tag() {
        let file = parse(
            r#"
package main

type User struct {
	Name     string
	Password string `sensitive:"true"`
}
"#,
        );
        assert_eq!(file.package_name, "main");
        let Decl::Type(td) = &file.decls[0] else {
            panic!("expected type decl");
        };
        assert_eq!(td.name.name, "User");
        let TypeDeclKind::Struct(st) = &td.kind else {
            panic!("expected struct");
        };
        assert_eq!(st.fields.len(), 2);
        assert_eq!(st.fields[1].names[0].name, "Password");
        assert_eq!(st.fields[1].tag.as_deref(), Some(r#"sensitive:"true""#));
    }

    #[test]
    fn test_parse_embedded_field() {
        let file = parse(
            r#"
package main

type Inner struct {
	S string `sensitive:"true"`
}

type Outer struct {
	Inner
	D string
}
"#,
        );
        let Decl::Type(outer) = &file.decls[1] else {
            panic!("expected type decl");
        };
        let TypeDeclKind::Struct(st) = &outer.kind else {
            panic!("expected struct");
        };
        assert!(st.fields[0].names.is_empty(), "embedded field has no names");
        assert!(matches!(
            &st.fields[0].ty,
            TypeExpr::Name { name, .. } if name == "Inner"
        ));
    }

    #[test]
    fn test_parse_function_and_method() {
        let file = parse(
            r#"
package main

func getPwd(u User) string {
	return u.Password
}

func (l *Logger) Log(msg string) {
	slog.Info("log", "msg", msg)
}
"#,
        );
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func");
        };
        assert_eq!(f.name.name, "getPwd");
        assert!(f.receiver.is_none());
        assert_eq!(f.params.len(), 1);
        assert_eq!(f.params[0].names[0].name, "u");
        assert_eq!(f.results.len(), 1);
        let body = f.body.as_ref().unwrap();
        assert!(matches!(body[0], Stmt::Return { .. }));

        let Decl::Func(m) = &file.decls[1] else {
            panic!("expected method");
        };
        let recv = m.receiver.as_ref().unwrap();
        assert_eq!(recv.name.as_ref().unwrap().name, "l");
        assert!(matches!(recv.ty, TypeExpr::Pointer { .. }));
    }

    #[test]
    fn test_parse_short_var_and_call() {
        let file = parse(
            r#"
package main

func f() {
	u := User{Name: "a", Password: "b"}
	p := u.Password
	slog.Info("msg", "pass", p)
}
"#,
        );
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func");
        };
        let body = f.body.as_ref().unwrap();
        assert!(matches!(&body[0], Stmt::Define(a) if a.lhs.len() == 1 && a.rhs.len() == 1));
        let Stmt::Define(assign) = &body[1] else {
            panic!("expected define");
        };
        assert!(matches!(&assign.rhs[0], Expr::Selector { field, .. } if field.name == "Password"));
        let Stmt::Expr(Expr::Call { func, args, .. }) = &body[2] else {
            panic!("expected call stmt");
        };
        assert!(matches!(&**func, Expr::Selector { field, .. } if field.name == "Info"));
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_parse_imports() {
        let file = parse(
            r#"
package main

import (
	"log/slog"
	l "log"
)
"#,
        );
        assert_eq!(file.imports.len(), 2);
        assert_eq!(file.imports[0].path, "log/slog");
        assert!(file.imports[0].alias.is_none());
        assert_eq!(file.imports[1].path, "log");
        assert_eq!(file.imports[1].alias.as_deref(), Some("l"));
    }

    #[test]
    fn test_parse_nested_control_flow() {
        let file = parse(
            r#"
package main

func f() {
	if true {
		p := u.Password
		_ = p
	}
	for _, v := range vals {
		slog.Info("msg", v)
	}
}
"#,
        );
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func");
        };
        let body = f.body.as_ref().unwrap();
        // if statement lowers to Other with a nested block
        let Stmt::Other { children, .. } = &body[0] else {
            panic!("expected generic stmt for if");
        };
        assert!(children.iter().any(|s| matches!(s, Stmt::Block(_))));
        // range loop carries a Range child
        let Stmt::Other { children, .. } = &body[1] else {
            panic!("expected generic stmt for for-range");
        };
        assert!(matches!(children[0], Stmt::Range { .. }));
    }
}
