//! AST types for the Tagl language
//!
//! All nodes carry mandatory positions (byte offsets into the source);
//! recovery fields use the [`span::NO_POS`] sentinel rather than options so
//! downstream code can compare positions uniformly.

pub mod nodes;
pub mod span;
pub mod walk;

pub use nodes::{
    is_void_tag, AttributeStmt, BinOp, Block, BranchKind, BranchStmt, Comment, ElementBlockStmt,
    EndTagStmt, Expr, File, ForStmt, FuncDecl, Ident, IfStmt, OpenTagStmt, Stmt, SwitchArm,
    SwitchStmt, TemplateLiteral, TemplatePart, UnOp,
};
pub use span::{LineCol, LineIndex, Pos, Span, NO_POS};
pub use walk::{walk_expr, walk_file, walk_stmt, walk_stmts, Visitor};
