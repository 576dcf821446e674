//! Read-only AST traversal
//!
//! A minimal enter/leave visitor over statements and expressions. Analyses
//! that need richer context (the escape validator tracks loop and tag
//! stacks) hand-roll their walks instead; this trait covers the common
//! "look at every node" cases.

use super::nodes::*;

pub trait Visitor {
    /// Called before a statement's children are walked. Return false to
    /// skip the children.
    fn visit_stmt(&mut self, _stmt: &Stmt) -> bool {
        true
    }
    fn leave_stmt(&mut self, _stmt: &Stmt) {}

    fn visit_expr(&mut self, _expr: &Expr) -> bool {
        true
    }
}

pub fn walk_file(v: &mut dyn Visitor, file: &File) {
    for decl in &file.decls {
        walk_stmts(v, &decl.body.stmts);
    }
}

pub fn walk_stmts(v: &mut dyn Visitor, stmts: &[Stmt]) {
    for stmt in stmts {
        walk_stmt(v, stmt);
    }
}

pub fn walk_stmt(v: &mut dyn Visitor, stmt: &Stmt) {
    if !v.visit_stmt(stmt) {
        v.leave_stmt(stmt);
        return;
    }
    match stmt {
        Stmt::Let { value, .. } => walk_expr(v, value),
        Stmt::Assign { target, value, .. } => {
            walk_expr(v, target);
            walk_expr(v, value);
        }
        Stmt::Expr { expr } => walk_expr(v, expr),
        Stmt::If(s) => {
            walk_expr(v, &s.cond);
            walk_stmts(v, &s.then.stmts);
            if let Some(e) = &s.else_branch {
                walk_stmt(v, e);
            }
        }
        Stmt::For(s) => {
            if let Some(cond) = &s.cond {
                walk_expr(v, cond);
            }
            walk_stmts(v, &s.body.stmts);
        }
        Stmt::Switch(s) => {
            walk_expr(v, &s.tag);
            for arm in &s.arms {
                if let Some(p) = &arm.pattern {
                    walk_expr(v, p);
                }
                walk_stmts(v, &arm.body);
            }
        }
        Stmt::Labeled { stmt, .. } => walk_stmt(v, stmt),
        Stmt::Block(b) => walk_stmts(v, &b.stmts),
        Stmt::OpenTag(t) => walk_stmts(v, &t.body),
        Stmt::EndTag(_) => {}
        Stmt::Attribute(a) => {
            if let Some(value) = &a.value {
                walk_expr(v, value);
            }
        }
        Stmt::ElementBlock(b) => {
            walk_stmts(v, &b.open_tag.body);
            walk_stmts(v, &b.body);
        }
        Stmt::Return { value, .. } => {
            if let Some(expr) = value {
                walk_expr(v, expr);
            }
        }
        Stmt::Branch(_) | Stmt::Empty { .. } | Stmt::Bad { .. } => {}
    }
    v.leave_stmt(stmt);
}

pub fn walk_expr(v: &mut dyn Visitor, expr: &Expr) {
    if !v.visit_expr(expr) {
        return;
    }
    match expr {
        Expr::Template(t) => {
            for part in &t.parts {
                walk_expr(v, &part.expr);
            }
        }
        Expr::Unary { expr, .. } => walk_expr(v, expr),
        Expr::Binary { lhs, rhs, .. } => {
            walk_expr(v, lhs);
            walk_expr(v, rhs);
        }
        Expr::Call { callee, args, .. } => {
            walk_expr(v, callee);
            for arg in args {
                walk_expr(v, arg);
            }
        }
        Expr::Field { base, .. } => walk_expr(v, base),
        Expr::Index { base, index, .. } => {
            walk_expr(v, base);
            walk_expr(v, index);
        }
        Expr::Paren { expr, .. } => walk_expr(v, expr),
        Expr::Ident(_)
        | Expr::IntLit { .. }
        | Expr::CharLit { .. }
        | Expr::StrLit { .. }
        | Expr::Bad { .. } => {}
    }
}
