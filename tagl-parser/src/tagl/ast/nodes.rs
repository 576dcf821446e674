//! AST node definitions
//!
//! The markup statement forms are plain statement variants before
//! reconciliation: an open tag, an end tag and an attribute are each parsed
//! as one statement in the surrounding list. Reconciliation rewrites
//! matched open/end pairs (and everything between them) into a single
//! [`ElementBlockStmt`]; the rewrite is total and one-way, so a flat marker
//! pair and an element block never coexist for the same tag occurrence.
//!
//! Nodes are created once by the parser and not mutated afterwards, except
//! that reconciliation takes ownership of markers when folding them into
//! element blocks. Analyses attach nothing to the tree; they key auxiliary
//! data by node position.

use super::span::{Pos, Span, NO_POS};

/// An identifier with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub pos: Pos,
    pub name: String,
}

impl Ident {
    pub fn new(pos: Pos, name: impl Into<String>) -> Self {
        Self { pos, name: name.into() }
    }

    pub fn end(&self) -> Pos {
        Pos(self.pos.0 + self.name.len() as u32)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Neq,
    Lss,
    Leq,
    Gtr,
    Geq,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::Lss => "<",
            BinOp::Leq => "<=",
            BinOp::Gtr => ">",
            BinOp::Geq => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
        }
    }
}

/// One `\{expr}` part of a template literal.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplatePart {
    pub lbrace: Pos,
    pub expr: Expr,
    pub rbrace: Pos,
}

/// A string template literal `"...\{expr}..."`.
///
/// `segments` holds the raw source text of each literal segment, including
/// the opening quote on the first segment and the closing quote on the
/// last. Invariant: `segments.len() == parts.len() + 1`; interleaving
/// segments with `\{part}` in order reproduces the literal source.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLiteral {
    pub open_pos: Pos,
    pub segments: Vec<String>,
    pub parts: Vec<TemplatePart>,
    pub close_pos: Pos,
}

/// Expressions of the host language.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(Ident),
    /// Integer literal, raw source text (`42`, `0xff`, ...).
    IntLit { pos: Pos, text: String },
    /// Char literal, raw source text including quotes.
    CharLit { pos: Pos, text: String },
    /// Plain string literal, raw source text including quotes.
    StrLit { pos: Pos, text: String },
    Template(TemplateLiteral),
    Unary { op_pos: Pos, op: UnOp, expr: Box<Expr> },
    Binary { op: BinOp, op_pos: Pos, lhs: Box<Expr>, rhs: Box<Expr> },
    Call { callee: Box<Expr>, lparen: Pos, args: Vec<Expr>, rparen: Pos },
    Field { base: Box<Expr>, name: Ident },
    Index { base: Box<Expr>, index: Box<Expr>, rbrack: Pos },
    Paren { lparen: Pos, expr: Box<Expr>, rparen: Pos },
    /// Placeholder for an expression that failed to parse.
    Bad { span: Span },
}

impl Expr {
    pub fn pos(&self) -> Pos {
        match self {
            Expr::Ident(id) => id.pos,
            Expr::IntLit { pos, .. } => *pos,
            Expr::CharLit { pos, .. } => *pos,
            Expr::StrLit { pos, .. } => *pos,
            Expr::Template(t) => t.open_pos,
            Expr::Unary { op_pos, .. } => *op_pos,
            Expr::Binary { lhs, .. } => lhs.pos(),
            Expr::Call { callee, .. } => callee.pos(),
            Expr::Field { base, .. } => base.pos(),
            Expr::Index { base, .. } => base.pos(),
            Expr::Paren { lparen, .. } => *lparen,
            Expr::Bad { span } => span.start,
        }
    }

    pub fn end(&self) -> Pos {
        match self {
            Expr::Ident(id) => id.end(),
            Expr::IntLit { pos, text } => Pos(pos.0 + text.len() as u32),
            Expr::CharLit { pos, text } => Pos(pos.0 + text.len() as u32),
            Expr::StrLit { pos, text } => Pos(pos.0 + text.len() as u32),
            Expr::Template(t) => Pos(t.close_pos.0 + 1),
            Expr::Unary { expr, .. } => expr.end(),
            Expr::Binary { rhs, .. } => rhs.end(),
            Expr::Call { rparen, .. } => Pos(rparen.0 + 1),
            Expr::Field { name, .. } => name.end(),
            Expr::Index { rbrack, .. } => Pos(rbrack.0 + 1),
            Expr::Paren { rparen, .. } => Pos(rparen.0 + 1),
            Expr::Bad { span } => span.end,
        }
    }
}

/// An open tag marker `<name ... >` parsed as a statement.
///
/// `body` holds the statements between the tag name and the closing `>`
/// (attributes and ordinary statements). `close_pos` is [`NO_POS`] when the
/// `>` was missing; such markers are parse-error leftovers and never
/// participate in reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenTagStmt {
    pub open_pos: Pos,
    pub name: Option<Ident>,
    pub body: Vec<Stmt>,
    pub close_pos: Pos,
}

impl OpenTagStmt {
    pub fn end(&self) -> Pos {
        if self.close_pos.is_valid() {
            Pos(self.close_pos.0 + 1)
        } else if let Some(name) = &self.name {
            name.end()
        } else {
            Pos(self.open_pos.0 + 1)
        }
    }
}

/// An end tag marker `</name>` parsed as a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct EndTagStmt {
    pub open_pos: Pos,
    pub name: Option<Ident>,
    pub close_pos: Pos,
}

impl EndTagStmt {
    pub fn end(&self) -> Pos {
        if self.close_pos.is_valid() {
            Pos(self.close_pos.0 + 1)
        } else if let Some(name) = &self.name {
            name.end()
        } else {
            Pos(self.open_pos.0 + 2)
        }
    }
}

/// An attribute statement `@name` or `@name="value"`.
///
/// `value` is present iff `assign_pos` is valid; the value is either a
/// plain string literal or a template literal.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeStmt {
    pub at_pos: Pos,
    pub name: Ident,
    pub assign_pos: Pos,
    pub value: Option<Expr>,
    pub end_pos: Pos,
}

/// A reconciled element block: one fully matched tag and its body.
///
/// Owns its open tag, body and end tag exclusively; body statements may
/// themselves contain nested element blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBlockStmt {
    pub open_tag: OpenTagStmt,
    pub body: Vec<Stmt>,
    pub end_tag: EndTagStmt,
}

impl ElementBlockStmt {
    /// The tag name; reconciliation only matches named markers.
    pub fn name(&self) -> &str {
        self.open_tag.name.as_ref().map(|n| n.name.as_str()).unwrap_or("")
    }
}

/// A braced statement list.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub lbrace: Pos,
    pub stmts: Vec<Stmt>,
    pub rbrace: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub if_pos: Pos,
    pub cond: Expr,
    pub then: Block,
    /// `else` branch: a [`Stmt::Block`] or a nested [`Stmt::If`].
    pub else_branch: Option<Box<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub for_pos: Pos,
    /// None for the infinite `for { ... }` form.
    pub cond: Option<Expr>,
    pub body: Block,
}

/// One `case expr:` or `default:` arm of a switch.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchArm {
    pub case_pos: Pos,
    /// None for `default`.
    pub pattern: Option<Expr>,
    pub colon: Pos,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub switch_pos: Pos,
    pub tag: Expr,
    pub lbrace: Pos,
    pub arms: Vec<SwitchArm>,
    pub rbrace: Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
}

impl BranchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchKind::Break => "break",
            BranchKind::Continue => "continue",
            BranchKind::Goto => "goto",
        }
    }
}

/// `break [label]`, `continue [label]` or `goto label`.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchStmt {
    pub pos: Pos,
    pub kind: BranchKind,
    pub label: Option<Ident>,
}

/// Statements of the host language plus the markup forms.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let { let_pos: Pos, name: Ident, value: Expr },
    Assign { target: Expr, assign_pos: Pos, value: Expr },
    Expr { expr: Expr },
    If(IfStmt),
    For(ForStmt),
    Switch(SwitchStmt),
    Branch(BranchStmt),
    Return { pos: Pos, value: Option<Expr>, end: Pos },
    Labeled { label: Ident, colon: Pos, stmt: Box<Stmt> },
    Block(Block),
    OpenTag(OpenTagStmt),
    EndTag(EndTagStmt),
    Attribute(AttributeStmt),
    ElementBlock(ElementBlockStmt),
    /// `;` on its own; `implicit` marks placeholders synthesized during
    /// reconciliation (a labeled end tag's label lands on one of these).
    Empty { pos: Pos, implicit: bool },
    /// Placeholder for a statement that failed to parse.
    Bad { span: Span },
}

impl Stmt {
    pub fn pos(&self) -> Pos {
        match self {
            Stmt::Let { let_pos, .. } => *let_pos,
            Stmt::Assign { target, .. } => target.pos(),
            Stmt::Expr { expr } => expr.pos(),
            Stmt::If(s) => s.if_pos,
            Stmt::For(s) => s.for_pos,
            Stmt::Switch(s) => s.switch_pos,
            Stmt::Branch(s) => s.pos,
            Stmt::Return { pos, .. } => *pos,
            Stmt::Labeled { label, .. } => label.pos,
            Stmt::Block(b) => b.lbrace,
            Stmt::OpenTag(t) => t.open_pos,
            Stmt::EndTag(t) => t.open_pos,
            Stmt::Attribute(a) => a.at_pos,
            Stmt::ElementBlock(b) => b.open_tag.open_pos,
            Stmt::Empty { pos, .. } => *pos,
            Stmt::Bad { span } => span.start,
        }
    }

    pub fn end(&self) -> Pos {
        match self {
            Stmt::Let { value, .. } => value.end(),
            Stmt::Assign { value, .. } => value.end(),
            Stmt::Expr { expr } => expr.end(),
            Stmt::If(s) => match &s.else_branch {
                Some(e) => e.end(),
                None => Pos(s.then.rbrace.0 + 1),
            },
            Stmt::For(s) => Pos(s.body.rbrace.0 + 1),
            Stmt::Switch(s) => Pos(s.rbrace.0 + 1),
            Stmt::Branch(s) => match &s.label {
                Some(l) => l.end(),
                None => Pos(s.pos.0 + s.kind.as_str().len() as u32),
            },
            Stmt::Return { end, .. } => *end,
            Stmt::Labeled { stmt, .. } => stmt.end(),
            Stmt::Block(b) => Pos(b.rbrace.0 + 1),
            Stmt::OpenTag(t) => t.end(),
            Stmt::EndTag(t) => t.end(),
            Stmt::Attribute(a) => Pos(a.end_pos.0 + 1),
            Stmt::ElementBlock(b) => b.end_tag.end(),
            Stmt::Empty { pos, .. } => Pos(pos.0 + 1),
            Stmt::Bad { span } => span.end,
        }
    }
}

/// A function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub fn_pos: Pos,
    pub name: Ident,
    pub params: Vec<Ident>,
    /// Result name after `->`, e.g. `-> error`; None when the function
    /// declares no result.
    pub result: Option<Ident>,
    pub body: Block,
}

impl FuncDecl {
    /// Whether this function is a template function (may contain tags,
    /// attributes and template literals): its first parameter is `ctx`.
    pub fn is_template_fn(&self) -> bool {
        self.params.first().is_some_and(|p| p.name == "ctx")
    }
}

/// A comment collected by the scanner, ordered by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub span: Span,
    pub text: String,
}

impl Comment {
    pub fn is_line(&self) -> bool {
        self.text.starts_with("//")
    }

    pub fn is_multiline(&self) -> bool {
        self.text.contains('\n')
    }
}

/// A parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub decls: Vec<FuncDecl>,
    pub comments: Vec<Comment>,
    pub eof: Pos,
}

/// Void tag names: exempt from the unclosed-tag error, no end tag expected.
pub static VOID_TAGS: once_cell::sync::Lazy<std::collections::HashSet<&'static str>> =
    once_cell::sync::Lazy::new(|| {
        ["br", "hr", "img", "input", "meta", "link"].into_iter().collect()
    });

/// Whether `name` is a void tag.
pub fn is_void_tag(name: &str) -> bool {
    VOID_TAGS.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ident_end() {
        let id = Ident::new(Pos(10), "div");
        assert_eq!(id.end(), Pos(13));
    }

    #[test]
    fn test_open_tag_end_with_recovery() {
        let tag = OpenTagStmt {
            open_pos: Pos(0),
            name: Some(Ident::new(Pos(1), "div")),
            body: vec![],
            close_pos: NO_POS,
        };
        // Missing '>' falls back to the name's end.
        assert_eq!(tag.end(), Pos(4));

        let closed = OpenTagStmt { close_pos: Pos(4), ..tag };
        assert_eq!(closed.end(), Pos(5));
    }

    #[test]
    fn test_void_tags() {
        assert!(is_void_tag("br"));
        assert!(is_void_tag("img"));
        assert!(!is_void_tag("div"));
    }

    #[test]
    fn test_stmt_positions() {
        let stmt = Stmt::Branch(BranchStmt {
            pos: Pos(5),
            kind: BranchKind::Break,
            label: Some(Ident::new(Pos(11), "outer")),
        });
        assert_eq!(stmt.pos(), Pos(5));
        assert_eq!(stmt.end(), Pos(16));
    }
}
