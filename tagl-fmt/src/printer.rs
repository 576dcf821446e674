//! The emit pass
//!
//! Renders the tree to text, asking the [measurer](crate::measure) before
//! committing to a layout. Emission is strictly append-only; the
//! speculative questions ("would this body break?") never touch the
//! output buffer, so the printer nests to arbitrary depth without shared
//! mutable state between the two passes.
//!
//! Comments ride along by position: before each statement the printer
//! flushes every not-yet-emitted comment that starts earlier, each on its
//! own line at the current indent. Single-line block comments inside an
//! open tag print inline between the attributes. A comment that sits
//! inside a statement's span migrates after it; the result is stable on
//! the next pass, which is what the idempotence guarantee asks for.

use crate::config::FormatConfig;
use crate::measure::Measurer;
use tagl_parser::tagl::ast::nodes::*;
use tagl_parser::tagl::ast::span::Pos;

/// Render a reconciled file to formatted source text.
pub fn format_file(file: &File, cfg: &FormatConfig) -> String {
    let printer = Printer {
        cfg,
        comments: &file.comments,
        measurer: Measurer::new(&file.comments),
        out: String::new(),
        indent: 0,
        next_comment: 0,
    };
    printer.render(file)
}

struct Printer<'a> {
    cfg: &'a FormatConfig,
    comments: &'a [Comment],
    measurer: Measurer<'a>,
    out: String,
    indent: usize,
    next_comment: usize,
}

impl Printer<'_> {
    fn render(mut self, file: &File) -> String {
        for (i, decl) in file.decls.iter().enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            self.emit_comments_before(decl.fn_pos);
            self.print_func(decl);
        }
        self.emit_comments_before(file.eof);
        self.out
    }

    // Output helpers

    fn line(&mut self, text: &str) {
        let unit = self.cfg.indent_unit();
        for _ in 0..self.indent {
            self.out.push_str(&unit);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Flush comments that start before `pos`, each on its own line.
    fn emit_comments_before(&mut self, pos: Pos) {
        while self.next_comment < self.comments.len()
            && self.comments[self.next_comment].span.start < pos
        {
            let text = self.comments[self.next_comment].text.clone();
            let mut lines = text.split('\n');
            if let Some(first) = lines.next() {
                self.line(first);
            }
            // Continuation lines of a block comment keep their own text.
            for rest in lines {
                self.out.push_str(rest);
                self.out.push('\n');
            }
            self.next_comment += 1;
        }
    }

    /// Advance past comments already rendered inline.
    fn skip_comments_until(&mut self, pos: Pos) {
        while self.next_comment < self.comments.len()
            && self.comments[self.next_comment].span.start < pos
        {
            self.next_comment += 1;
        }
    }

    // Declarations

    fn print_func(&mut self, decl: &FuncDecl) {
        let params: Vec<&str> = decl.params.iter().map(|p| p.name.as_str()).collect();
        let result = match &decl.result {
            Some(r) => format!(" -> {}", r.name),
            None => String::new(),
        };
        self.line(&format!("fn {}({}){} {{", decl.name.name, params.join(", "), result));
        self.print_stmts_indented(&decl.body.stmts, decl.body.rbrace);
        self.line("}");
    }

    fn print_stmts_indented(&mut self, stmts: &[Stmt], end: Pos) {
        self.indent += 1;
        for stmt in stmts {
            self.emit_comments_before(stmt.pos());
            self.print_stmt(stmt, "");
        }
        self.emit_comments_before(end);
        self.indent -= 1;
    }

    // Statements

    fn print_stmt(&mut self, stmt: &Stmt, prefix: &str) {
        match stmt {
            Stmt::Labeled { label, stmt, .. } => {
                let prefix = format!("{prefix}{}: ", label.name);
                self.print_stmt(stmt, &prefix);
            }
            Stmt::Let { name, value, .. } => {
                let value = self.expr_str(value);
                self.line(&format!("{prefix}let {} = {};", name.name, value));
            }
            Stmt::Assign { target, value, .. } => {
                let target = self.expr_str(target);
                let value = self.expr_str(value);
                self.line(&format!("{prefix}{target} = {value};"));
            }
            Stmt::Expr { expr } => {
                let expr = self.expr_str(expr);
                self.line(&format!("{prefix}{expr};"));
            }
            Stmt::Return { value, .. } => match value {
                Some(v) => {
                    let v = self.expr_str(v);
                    self.line(&format!("{prefix}return {v};"));
                }
                None => self.line(&format!("{prefix}return;")),
            },
            Stmt::Branch(b) => {
                let stmt = match &b.label {
                    Some(l) => format!("{} {}", b.kind.as_str(), l.name),
                    None => b.kind.as_str().to_string(),
                };
                self.line(&format!("{prefix}{stmt};"));
            }
            Stmt::Empty { .. } => self.line(&format!("{prefix};")),
            Stmt::Block(b) => {
                self.line(&format!("{prefix}{{"));
                self.print_stmts_indented(&b.stmts, b.rbrace);
                self.line("}");
            }
            Stmt::If(s) => self.print_if(s, prefix),
            Stmt::For(s) => {
                let header = match &s.cond {
                    Some(cond) => format!("{prefix}for {} {{", self.expr_str(cond)),
                    None => format!("{prefix}for {{"),
                };
                self.line(&header);
                self.print_stmts_indented(&s.body.stmts, s.body.rbrace);
                self.line("}");
            }
            Stmt::Switch(s) => {
                let tag = self.expr_str(&s.tag);
                self.line(&format!("{prefix}switch {tag} {{"));
                for arm in &s.arms {
                    self.emit_comments_before(arm.case_pos);
                    match &arm.pattern {
                        Some(p) => {
                            let p = self.expr_str(p);
                            self.line(&format!("case {p}:"));
                        }
                        None => self.line("default:"),
                    }
                    let end = arm.body.last().map(|s| s.end()).unwrap_or(arm.colon);
                    self.print_stmts_indented(&arm.body, end);
                }
                self.emit_comments_before(s.rbrace);
                self.line("}");
            }
            Stmt::ElementBlock(b) => self.print_element_block(b, prefix),
            Stmt::OpenTag(t) => self.print_open_tag(t, prefix),
            Stmt::EndTag(t) => {
                let name = t.name.as_ref().map(|n| n.name.as_str()).unwrap_or("_");
                self.line(&format!("{prefix}</{name}>"));
            }
            Stmt::Attribute(a) => {
                let attr = self.attr_str(a);
                self.line(&format!("{prefix}{attr};"));
            }
            Stmt::Bad { .. } => self.line(&format!("{prefix};")),
        }
    }

    fn print_if(&mut self, s: &IfStmt, prefix: &str) {
        let cond = self.expr_str(&s.cond);
        self.line(&format!("{prefix}if {cond} {{"));
        self.print_stmts_indented(&s.then.stmts, s.then.rbrace);

        let mut else_branch = &s.else_branch;
        loop {
            match else_branch {
                None => {
                    self.line("}");
                    return;
                }
                Some(stmt) => match stmt.as_ref() {
                    Stmt::If(inner) => {
                        let cond = self.expr_str(&inner.cond);
                        self.line(&format!("}} else if {cond} {{"));
                        self.print_stmts_indented(&inner.then.stmts, inner.then.rbrace);
                        else_branch = &inner.else_branch;
                    }
                    Stmt::Block(b) => {
                        self.line("} else {");
                        self.print_stmts_indented(&b.stmts, b.rbrace);
                        self.line("}");
                        return;
                    }
                    other => {
                        self.line("} else {");
                        self.indent += 1;
                        self.print_stmt(other, "");
                        self.indent -= 1;
                        self.line("}");
                        return;
                    }
                },
            }
        }
    }

    // Tags

    fn print_element_block(&mut self, b: &ElementBlockStmt, prefix: &str) {
        if self.measurer.one_line_eligible(b) {
            let rendered = self.render_block_inline(b);
            self.line(&format!("{prefix}{rendered}"));
            self.skip_comments_until(b.end_tag.end());
            return;
        }

        self.print_open_tag(&b.open_tag, prefix);
        self.indent += 1;
        for stmt in &b.body {
            self.emit_comments_before(stmt.pos());
            self.print_stmt(stmt, "");
        }
        self.emit_comments_before(b.end_tag.open_pos);
        self.indent -= 1;
        let name = b.end_tag.name.as_ref().map(|n| n.name.as_str()).unwrap_or("_");
        self.line(&format!("</{name}>"));
    }

    fn print_open_tag(&mut self, tag: &OpenTagStmt, prefix: &str) {
        if self.measurer.open_tag_inline(tag) {
            let rendered = self.open_tag_inline_str(tag);
            self.line(&format!("{prefix}{rendered}"));
            self.skip_comments_until(tag.end());
            return;
        }

        let name = tag.name.as_ref().map(|n| n.name.as_str()).unwrap_or("_");
        self.line(&format!("{prefix}<{name}"));
        self.indent += 1;
        for (i, stmt) in tag.body.iter().enumerate() {
            self.emit_comments_before(stmt.pos());
            match stmt {
                Stmt::Attribute(a) => {
                    // The separator is only needed before a non-attribute
                    // statement; the closing `>` and further attributes
                    // terminate an attribute on their own.
                    let needs_semi =
                        matches!(tag.body.get(i + 1), Some(s) if !matches!(s, Stmt::Attribute(_)));
                    let attr = self.attr_str(a);
                    if needs_semi {
                        self.line(&format!("{attr};"));
                    } else {
                        self.line(&attr);
                    }
                }
                other => self.print_stmt(other, ""),
            }
        }
        let close = if tag.close_pos.is_valid() { tag.close_pos } else { tag.end() };
        self.emit_comments_before(close);
        self.indent -= 1;
        self.line(">");
    }

    /// `<name @a="b" /* c */ @d>`: attributes and same-line block comments
    /// merged by position.
    fn open_tag_inline_str(&mut self, tag: &OpenTagStmt) -> String {
        let name = tag.name.as_ref().map(|n| n.name.as_str()).unwrap_or("_");
        let mut rendered = format!("<{name}");

        let from = tag.name.as_ref().map(|n| n.end()).unwrap_or(tag.open_pos);
        let to = if tag.close_pos.is_valid() { tag.close_pos } else { tag.end() };
        let mut items: Vec<(Pos, String)> = Vec::new();
        for stmt in &tag.body {
            if let Stmt::Attribute(a) = stmt {
                items.push((a.at_pos, self.attr_str(a)));
            }
        }
        for comment in Measurer::comments_within(self.comments, from, to) {
            items.push((comment.span.start, comment.text.clone()));
        }
        items.sort_by_key(|(pos, _)| *pos);

        for (_, item) in items {
            rendered.push(' ');
            rendered.push_str(&item);
        }
        rendered.push('>');
        rendered
    }

    fn render_block_inline(&mut self, b: &ElementBlockStmt) -> String {
        let mut rendered = self.open_tag_inline_str(&b.open_tag);
        let mut first = true;
        for stmt in &b.body {
            if !first {
                rendered.push(' ');
            }
            first = false;
            match stmt {
                Stmt::Expr { expr } => rendered.push_str(&self.expr_str(expr)),
                Stmt::ElementBlock(child) => rendered.push_str(&self.render_block_inline(child)),
                // Eligibility only admits text and nested one-liners.
                _ => {}
            }
        }
        let name = b.end_tag.name.as_ref().map(|n| n.name.as_str()).unwrap_or("_");
        rendered.push_str(&format!("</{name}>"));
        rendered
    }

    fn attr_str(&self, a: &AttributeStmt) -> String {
        match &a.value {
            Some(value) => format!("@{}={}", a.name.name, self.expr_str(value)),
            None => format!("@{}", a.name.name),
        }
    }

    // Expressions

    fn expr_str(&self, expr: &Expr) -> String {
        match expr {
            Expr::Ident(id) => id.name.clone(),
            Expr::IntLit { text, .. } => self.int_str(text),
            Expr::CharLit { text, .. } => text.clone(),
            Expr::StrLit { text, .. } => text.clone(),
            Expr::Template(t) => self.template_str(t),
            Expr::Unary { op, expr, .. } => {
                let op = match op {
                    UnOp::Neg => "-",
                    UnOp::Not => "!",
                };
                format!("{op}{}", self.expr_str(expr))
            }
            Expr::Binary { op, lhs, rhs, .. } => {
                format!("{} {} {}", self.expr_str(lhs), op.as_str(), self.expr_str(rhs))
            }
            Expr::Call { callee, args, .. } => {
                let args: Vec<String> = args.iter().map(|a| self.expr_str(a)).collect();
                format!("{}({})", self.expr_str(callee), args.join(", "))
            }
            Expr::Field { base, name } => format!("{}.{}", self.expr_str(base), name.name),
            Expr::Index { base, index, .. } => {
                format!("{}[{}]", self.expr_str(base), self.expr_str(index))
            }
            Expr::Paren { expr, .. } => format!("({})", self.expr_str(expr)),
            Expr::Bad { .. } => "0".to_string(),
        }
    }

    /// Interleave segments with `\{part}`; interpolated expressions drop
    /// redundant grouping parentheses.
    fn template_str(&self, t: &TemplateLiteral) -> String {
        let mut rendered = t.segments[0].clone();
        for (i, part) in t.parts.iter().enumerate() {
            rendered.push_str("\\{");
            rendered.push_str(&self.expr_str(strip_parens(&part.expr)));
            rendered.push('}');
            if let Some(segment) = t.segments.get(i + 1) {
                rendered.push_str(segment);
            }
        }
        rendered
    }

    fn int_str(&self, text: &str) -> String {
        if !self.cfg.normalize_numbers {
            return text.to_string();
        }
        let lower_prefix = |p: &str, t: &str| -> String {
            format!("{}{}", p, t[2..].to_lowercase())
        };
        if text.len() > 2 {
            match &text[..2] {
                "0x" | "0X" => return lower_prefix("0x", text),
                "0b" | "0B" => return lower_prefix("0b", text),
                "0o" | "0O" => return lower_prefix("0o", text),
                _ => {}
            }
        }
        text.to_string()
    }
}

fn strip_parens(expr: &Expr) -> &Expr {
    let mut expr = expr;
    while let Expr::Paren { expr: inner, .. } = expr {
        expr = inner;
    }
    expr
}
