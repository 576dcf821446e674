//! Recursive-descent parser
//!
//! A hand-written single-lookahead parser in the classic `tok`/`lit`/`span`
//! style. Tag markers are parsed as flat statements at their surrounding
//! list level; nesting is established later by the reconciler. The one
//! statement-list wrinkle is the tag attribute body: between `<name` and
//! `>` a nested statement list runs until a token that ends a tag body
//! (`>`, `case`, `default`, `}`, end of file).

use crate::tagl::ast::nodes::*;
use crate::tagl::ast::span::{Pos, Span, NO_POS};
use crate::tagl::diagnostics::Diagnostics;
use crate::tagl::reconciling::reconcile_file;
use crate::tagl::scanning::Scanner;
use crate::tagl::token::Token;

/// Parse a source file and reconcile tag markers into element blocks.
///
/// Total: always returns a tree plus the accumulated diagnostics.
pub fn parse_file(src: &str) -> (File, Diagnostics) {
    let (file, mut diags) = parse_file_flat(src);
    let file = reconcile_file(file, &mut diags);
    (file, diags)
}

/// Parse a source file, leaving open/end tag markers flat (unreconciled).
pub fn parse_file_flat(src: &str) -> (File, Diagnostics) {
    let mut parser = Parser::new(src);
    let decls = parser.parse_decls();
    parser.finish(decls)
}

struct Parser<'a> {
    scn: Scanner<'a>,
    tok: Token,
    span: Span,
    lit: String,
    diags: Diagnostics,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        let mut parser = Parser {
            scn: Scanner::new(src),
            tok: Token::Eof,
            span: Span::new(Pos(0), Pos(0)),
            lit: String::new(),
            diags: Diagnostics::new(),
        };
        parser.advance();
        parser
    }

    fn finish(self, decls: Vec<FuncDecl>) -> (File, Diagnostics) {
        let eof = self.span.start;
        let mut diags = self.diags;
        let (comments, scan_diags) = self.scn.into_parts();
        diags.extend(scan_diags);
        (File { decls, comments, eof }, diags)
    }

    fn advance(&mut self) {
        let scanned = self.scn.next();
        self.tok = scanned.tok;
        self.span = scanned.span;
        self.lit = scanned.lit;
    }

    fn pos(&self) -> Pos {
        self.span.start
    }

    fn error_expected(&mut self, pos: Pos, what: &str) {
        self.diags.error(pos, format!("expected {what}"));
    }

    fn expect(&mut self, tok: Token) -> Pos {
        if self.tok == tok {
            let pos = self.pos();
            self.advance();
            pos
        } else {
            self.error_expected(self.pos(), &tok.to_string());
            NO_POS
        }
    }

    fn expect_semi(&mut self) {
        if self.tok == Token::Semicolon {
            self.advance();
        } else {
            self.error_expected(self.pos(), "';'");
        }
    }

    /// Statement terminator after a string/template statement: the `;` may
    /// be omitted when the next token starts or closes a tag construct, or
    /// starts another string statement.
    fn expect_semi_allow_tag(&mut self) {
        match self.tok {
            Token::Semicolon => self.advance(),
            Token::EndTagOpen | Token::Lss | Token::Gtr | Token::Str | Token::TemplateStr => {}
            _ => self.error_expected(self.pos(), "';'"),
        }
    }

    fn parse_ident(&mut self) -> Ident {
        if self.tok == Token::Ident {
            let ident = Ident::new(self.pos(), self.lit.clone());
            self.advance();
            ident
        } else {
            self.error_expected(self.pos(), "identifier");
            Ident::new(self.pos(), "_")
        }
    }

    // Declarations

    fn parse_decls(&mut self) -> Vec<FuncDecl> {
        let mut decls = Vec::new();
        while self.tok != Token::Eof {
            if self.tok == Token::Fn {
                decls.push(self.parse_func_decl());
            } else {
                self.error_expected(self.pos(), "'fn'");
                self.advance();
            }
        }
        decls
    }

    fn parse_func_decl(&mut self) -> FuncDecl {
        let fn_pos = self.expect(Token::Fn);
        let name = self.parse_ident();
        self.expect(Token::LParen);
        let mut params = Vec::new();
        while self.tok == Token::Ident {
            params.push(self.parse_ident());
            if self.tok == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(Token::RParen);
        let result = if self.tok == Token::Arrow {
            self.advance();
            Some(self.parse_ident())
        } else {
            None
        };
        let body = self.parse_block();
        FuncDecl { fn_pos, name, params, result, body }
    }

    // Statements

    fn parse_block(&mut self) -> Block {
        let lbrace = self.expect(Token::LBrace);
        let stmts = self.parse_stmt_list();
        let rbrace = self.expect(Token::RBrace);
        Block { lbrace, stmts, rbrace }
    }

    fn parse_stmt_list(&mut self) -> Vec<Stmt> {
        let mut list = Vec::new();
        while !matches!(self.tok, Token::Case | Token::Default | Token::RBrace | Token::Eof) {
            list.push(self.parse_stmt());
        }
        list
    }

    fn parse_tag_stmt_list(&mut self) -> Vec<Stmt> {
        let mut list = Vec::new();
        while !self.tok.ends_tag_body() {
            list.push(self.parse_stmt());
        }
        list
    }

    fn parse_stmt(&mut self) -> Stmt {
        match self.tok {
            Token::Let => {
                let let_pos = self.pos();
                self.advance();
                let name = self.parse_ident();
                self.expect(Token::Assign);
                let value = self.parse_expr();
                self.expect_semi();
                Stmt::Let { let_pos, name, value }
            }
            Token::If => Stmt::If(self.parse_if()),
            Token::For => {
                let for_pos = self.pos();
                self.advance();
                let cond = if self.tok != Token::LBrace { Some(self.parse_expr()) } else { None };
                let body = self.parse_block();
                Stmt::For(ForStmt { for_pos, cond, body })
            }
            Token::Switch => Stmt::Switch(self.parse_switch()),
            Token::Break | Token::Continue => {
                let pos = self.pos();
                let kind = if self.tok == Token::Break {
                    BranchKind::Break
                } else {
                    BranchKind::Continue
                };
                self.advance();
                let label = if self.tok == Token::Ident { Some(self.parse_ident()) } else { None };
                self.expect_semi();
                Stmt::Branch(BranchStmt { pos, kind, label })
            }
            Token::Goto => {
                let pos = self.pos();
                self.advance();
                let label = if self.tok == Token::Ident {
                    Some(self.parse_ident())
                } else {
                    self.error_expected(self.pos(), "label");
                    None
                };
                self.expect_semi();
                Stmt::Branch(BranchStmt { pos, kind: BranchKind::Goto, label })
            }
            Token::Return => {
                let pos = self.pos();
                self.advance();
                let value = if !matches!(self.tok, Token::Semicolon | Token::RBrace | Token::Eof) {
                    Some(self.parse_expr())
                } else {
                    None
                };
                let end = value.as_ref().map(|v| v.end()).unwrap_or(Pos(pos.0 + 6));
                self.expect_semi();
                Stmt::Return { pos, value, end }
            }
            Token::LBrace => Stmt::Block(self.parse_block()),
            Token::Semicolon => {
                let pos = self.pos();
                self.advance();
                Stmt::Empty { pos, implicit: false }
            }
            Token::Lss => Stmt::OpenTag(self.parse_open_tag()),
            Token::EndTagOpen => Stmt::EndTag(self.parse_end_tag()),
            Token::At => Stmt::Attribute(self.parse_attribute()),
            Token::Str | Token::TemplateStr => {
                let expr = self.parse_expr();
                self.expect_semi_allow_tag();
                Stmt::Expr { expr }
            }
            Token::Ident
            | Token::Int
            | Token::Char
            | Token::LParen
            | Token::Minus
            | Token::Not => self.parse_simple_stmt(),
            _ => {
                let span = self.span;
                self.error_expected(self.pos(), "statement");
                self.advance();
                Stmt::Bad { span }
            }
        }
    }

    /// Expression statement, assignment, or labeled statement. Which one
    /// is only known after the leading expression is parsed.
    fn parse_simple_stmt(&mut self) -> Stmt {
        let expr = self.parse_expr();
        if let Expr::Ident(label) = &expr {
            if self.tok == Token::Colon {
                let colon = self.pos();
                let label = label.clone();
                self.advance();
                let stmt = Box::new(self.parse_stmt());
                return Stmt::Labeled { label, colon, stmt };
            }
        }
        if self.tok == Token::Assign {
            let assign_pos = self.pos();
            self.advance();
            let value = self.parse_expr();
            self.expect_semi();
            return Stmt::Assign { target: expr, assign_pos, value };
        }
        self.expect_semi();
        Stmt::Expr { expr }
    }

    fn parse_if(&mut self) -> IfStmt {
        let if_pos = self.expect(Token::If);
        let cond = self.parse_expr();
        let then = self.parse_block();
        let else_branch = if self.tok == Token::Else {
            self.advance();
            if self.tok == Token::If {
                Some(Box::new(Stmt::If(self.parse_if())))
            } else {
                Some(Box::new(Stmt::Block(self.parse_block())))
            }
        } else {
            None
        };
        IfStmt { if_pos, cond, then, else_branch }
    }

    fn parse_switch(&mut self) -> SwitchStmt {
        let switch_pos = self.expect(Token::Switch);
        let tag = self.parse_expr();
        let lbrace = self.expect(Token::LBrace);
        let mut arms = Vec::new();
        while matches!(self.tok, Token::Case | Token::Default) {
            let case_pos = self.pos();
            let is_default = self.tok == Token::Default;
            self.advance();
            let pattern = if is_default { None } else { Some(self.parse_expr()) };
            let colon = self.expect(Token::Colon);
            let mut body = Vec::new();
            while !matches!(self.tok, Token::Case | Token::Default | Token::RBrace | Token::Eof) {
                body.push(self.parse_stmt());
            }
            arms.push(SwitchArm { case_pos, pattern, colon, body });
        }
        let rbrace = self.expect(Token::RBrace);
        SwitchStmt { switch_pos, tag, lbrace, arms, rbrace }
    }

    // Markup statement forms

    fn parse_open_tag(&mut self) -> OpenTagStmt {
        let open_pos = self.pos();
        self.advance();

        if matches!(
            self.tok,
            Token::RBrace | Token::Case | Token::Default | Token::EndTagOpen | Token::Lss
        ) {
            self.error_expected(self.pos(), "identifier");
            return OpenTagStmt { open_pos, name: None, body: Vec::new(), close_pos: NO_POS };
        }

        let name = self.parse_ident();

        if matches!(self.tok, Token::RBrace | Token::EndTagOpen | Token::Lss) {
            self.error_expected(self.pos(), "'>'");
            return OpenTagStmt { open_pos, name: Some(name), body: Vec::new(), close_pos: NO_POS };
        }

        let body = self.parse_tag_stmt_list();

        let close_pos;
        if self.tok == Token::Gtr {
            close_pos = self.pos();
            self.advance();
        } else {
            close_pos = NO_POS;
            self.error_expected(self.pos(), "'>'");
            // Do not consume a terminating '}': the enclosing block still
            // needs it to close.
            if !matches!(self.tok, Token::RBrace | Token::Eof) {
                self.advance();
            }
        }

        OpenTagStmt { open_pos, name: Some(name), body, close_pos }
    }

    fn parse_end_tag(&mut self) -> EndTagStmt {
        let open_pos = self.pos();
        self.advance();

        if matches!(
            self.tok,
            Token::RBrace | Token::Case | Token::Default | Token::EndTagOpen | Token::Lss
        ) {
            self.error_expected(self.pos(), "identifier");
            return EndTagStmt { open_pos, name: None, close_pos: NO_POS };
        }

        let name = self.parse_ident();

        let close_pos;
        if self.tok == Token::Gtr {
            close_pos = self.pos();
            self.advance();
        } else {
            close_pos = NO_POS;
            self.error_expected(self.pos(), "'>'");
            if !matches!(self.tok, Token::RBrace | Token::Eof) {
                self.advance();
            }
        }

        EndTagStmt { open_pos, name: Some(name), close_pos }
    }

    fn parse_attribute(&mut self) -> AttributeStmt {
        let at_pos = self.pos();
        self.advance();
        let name = self.parse_ident();

        let stmt = if self.tok == Token::Assign {
            let assign_pos = self.pos();
            self.advance();
            let value = match self.tok {
                Token::Str => {
                    let value = Expr::StrLit { pos: self.pos(), text: self.lit.clone() };
                    self.advance();
                    Some(value)
                }
                Token::TemplateStr => Some(Expr::Template(self.parse_template_literal())),
                _ => {
                    self.error_expected(self.pos(), "string literal");
                    None
                }
            };
            let end_pos = value.as_ref().map(|v| Pos(v.end().0 - 1)).unwrap_or(assign_pos);
            AttributeStmt { at_pos, name, assign_pos, value, end_pos }
        } else {
            let end_pos = Pos(name.end().0 - 1);
            AttributeStmt { at_pos, name, assign_pos: NO_POS, value: None, end_pos }
        };

        if !matches!(self.tok, Token::At | Token::Gtr) {
            self.expect_semi();
        }
        stmt
    }

    /// Parse a template literal; the current token is the first segment
    /// (`TemplateStr`). Consumes through the closing quote and advances to
    /// the following token.
    fn parse_template_literal(&mut self) -> TemplateLiteral {
        let open_pos = self.pos();
        let mut cur_seg_span = self.span;
        let mut segments = vec![self.lit.clone()];
        let mut parts = Vec::new();
        let close_pos;

        loop {
            // The `\{` sits right after the segment text.
            let lbrace = Pos(cur_seg_span.end.0 + 1);
            self.advance();
            let expr = self.parse_expr();
            let rbrace = self.span.start;
            if self.tok != Token::RBrace {
                self.error_expected(self.pos(), "'}'");
            }
            parts.push(TemplatePart { lbrace, expr, rbrace });

            let seg = self.scn.template_continue();
            segments.push(seg.lit.clone());
            if seg.tok == Token::Str {
                close_pos = Pos(seg.span.end.0.saturating_sub(1));
                break;
            }
            cur_seg_span = seg.span;
        }

        self.advance();
        TemplateLiteral { open_pos, segments, parts, close_pos }
    }

    // Expressions

    fn parse_expr(&mut self) -> Expr {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Expr {
        let mut lhs = self.parse_unary();
        loop {
            let prec = self.tok.precedence();
            if prec == 0 || prec < min_prec {
                return lhs;
            }
            let op = match self.tok {
                Token::OrOr => BinOp::Or,
                Token::AndAnd => BinOp::And,
                Token::EqEq => BinOp::Eq,
                Token::Neq => BinOp::Neq,
                Token::Lss => BinOp::Lss,
                Token::Leq => BinOp::Leq,
                Token::Gtr => BinOp::Gtr,
                Token::Geq => BinOp::Geq,
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Rem,
                _ => unreachable!("precedence() returned nonzero for non-operator"),
            };
            let op_pos = self.pos();
            self.advance();
            let rhs = self.parse_binary(prec + 1);
            lhs = Expr::Binary { op, op_pos, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
    }

    fn parse_unary(&mut self) -> Expr {
        match self.tok {
            Token::Minus => {
                let op_pos = self.pos();
                self.advance();
                Expr::Unary { op_pos, op: UnOp::Neg, expr: Box::new(self.parse_unary()) }
            }
            Token::Not => {
                let op_pos = self.pos();
                self.advance();
                Expr::Unary { op_pos, op: UnOp::Not, expr: Box::new(self.parse_unary()) }
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        loop {
            match self.tok {
                Token::LParen => {
                    let lparen = self.pos();
                    self.advance();
                    let mut args = Vec::new();
                    while !matches!(self.tok, Token::RParen | Token::Eof) {
                        args.push(self.parse_expr());
                        if self.tok == Token::Comma {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    let rparen = self.expect(Token::RParen);
                    expr = Expr::Call { callee: Box::new(expr), lparen, args, rparen };
                }
                Token::Dot => {
                    self.advance();
                    let name = self.parse_ident();
                    expr = Expr::Field { base: Box::new(expr), name };
                }
                Token::LBrack => {
                    self.advance();
                    let index = self.parse_expr();
                    let rbrack = self.expect(Token::RBrack);
                    expr = Expr::Index { base: Box::new(expr), index: Box::new(index), rbrack };
                }
                _ => return expr,
            }
        }
    }

    fn parse_primary(&mut self) -> Expr {
        match self.tok {
            Token::Ident => {
                let ident = Ident::new(self.pos(), self.lit.clone());
                self.advance();
                Expr::Ident(ident)
            }
            Token::Int => {
                let expr = Expr::IntLit { pos: self.pos(), text: self.lit.clone() };
                self.advance();
                expr
            }
            Token::Char => {
                let expr = Expr::CharLit { pos: self.pos(), text: self.lit.clone() };
                self.advance();
                expr
            }
            Token::Str => {
                let expr = Expr::StrLit { pos: self.pos(), text: self.lit.clone() };
                self.advance();
                expr
            }
            Token::TemplateStr => Expr::Template(self.parse_template_literal()),
            Token::LParen => {
                let lparen = self.pos();
                self.advance();
                let expr = self.parse_expr();
                let rparen = self.expect(Token::RParen);
                Expr::Paren { lparen, expr: Box::new(expr), rparen }
            }
            _ => {
                let span = self.span;
                self.error_expected(self.pos(), "expression");
                self.advance();
                Expr::Bad { span }
            }
        }
    }
}
