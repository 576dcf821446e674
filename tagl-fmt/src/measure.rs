//! Speculative layout measurement
//!
//! The pure half of the formatter: given an element block, would rendering
//! it on one line work? The answer for a parent depends on the answers for
//! its children, and ancestors probe the same subtree repeatedly while
//! deciding their own layout, so results are memoized per block, keyed by
//! the open tag's position (node identity). Memoization is a performance
//! matter only; recomputing would give the same answers.
//!
//! One-line eligibility:
//! 1. the open tag renders inline: its attribute body holds only
//!    attributes, and no comment between the tag name and its `>` forces a
//!    break (a line comment always forces one, a block comment only when
//!    it spans multiple lines);
//! 2. the body would render without a line break: only string/template
//!    statements and nested one-line-eligible element blocks;
//! 3. the body does not mix text content with nested tag children;
//! 4. no comment sits anywhere else in the block's span (there would be
//!    nowhere to put it on one line).

use std::collections::HashMap;
use tagl_parser::tagl::ast::nodes::*;
use tagl_parser::tagl::ast::span::Pos;

pub struct Measurer<'a> {
    comments: &'a [Comment],
    memo: HashMap<u32, bool>,
}

impl<'a> Measurer<'a> {
    pub fn new(comments: &'a [Comment]) -> Self {
        Self { comments, memo: HashMap::new() }
    }

    /// Whether the block's whole span renders on one line.
    pub fn one_line_eligible(&mut self, block: &ElementBlockStmt) -> bool {
        let key = block.open_tag.open_pos.0;
        if let Some(&cached) = self.memo.get(&key) {
            return cached;
        }
        let eligible = self.compute(block);
        self.memo.insert(key, eligible);
        eligible
    }

    /// Whether a statement would introduce a line break if rendered as
    /// part of a one-line body.
    pub fn stmt_would_break(&mut self, stmt: &Stmt) -> bool {
        match stmt {
            Stmt::Expr { expr } => {
                !matches!(expr, Expr::StrLit { .. } | Expr::Template(_))
            }
            Stmt::ElementBlock(b) => !self.one_line_eligible(b),
            _ => true,
        }
    }

    fn compute(&mut self, block: &ElementBlockStmt) -> bool {
        if !self.open_tag_inline(&block.open_tag) {
            return false;
        }
        // A comment between the `>` and the end tag's end has no home on
        // a single line.
        let after_open = Pos(block.open_tag.close_pos.0 + 1);
        if self.has_comment_between(after_open, block.end_tag.end()) {
            return false;
        }

        let mut has_text = false;
        let mut has_tag = false;
        for stmt in &block.body {
            match stmt {
                Stmt::Expr { expr: Expr::StrLit { .. } } | Stmt::Expr { expr: Expr::Template(_) } => {
                    has_text = true;
                }
                Stmt::ElementBlock(child) => {
                    if !self.one_line_eligible(child) {
                        return false;
                    }
                    has_tag = true;
                }
                _ => return false,
            }
        }
        // Mixing free-floating text with tag children forces multi-line.
        !(has_text && has_tag)
    }

    /// Whether the open tag itself renders inline: attributes only, and no
    /// break-forcing comment between the name and the `>`.
    pub fn open_tag_inline(&self, tag: &OpenTagStmt) -> bool {
        tag.body.iter().all(|s| matches!(s, Stmt::Attribute(_)))
            && !self.open_tag_comment_forces_break(tag)
    }

    /// A comment between a tag's name and its closing `>` forces a line
    /// break there when it is a line comment or spans multiple lines.
    pub fn open_tag_comment_forces_break(&self, tag: &OpenTagStmt) -> bool {
        let from = tag.name.as_ref().map(|n| n.end()).unwrap_or(tag.open_pos);
        let to = if tag.close_pos.is_valid() { tag.close_pos } else { tag.end() };
        self.comments
            .iter()
            .filter(|c| c.span.start >= from && c.span.start < to)
            .any(|c| c.is_line() || c.is_multiline())
    }

    pub fn has_comment_between(&self, from: Pos, to: Pos) -> bool {
        self.comments.iter().any(|c| c.span.start >= from && c.span.start < to)
    }

    /// Comments inside an open tag's span, for inline emission.
    pub fn comments_within<'c>(
        comments: &'c [Comment],
        from: Pos,
        to: Pos,
    ) -> impl Iterator<Item = &'c Comment> {
        comments.iter().filter(move |c| c.span.start >= from && c.span.start < to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagl_parser::tagl::parsing::parse_file;

    fn first_block(src: &str) -> (File, ElementBlockStmt) {
        let (file, diags) = parse_file(src);
        assert!(!diags.has_errors(), "parse errors: {diags:?}");
        let block = file.decls[0]
            .body
            .stmts
            .iter()
            .find_map(|s| match s {
                Stmt::ElementBlock(b) => Some(b.clone()),
                _ => None,
            })
            .expect("no element block");
        (file, block)
    }

    fn eligible(src: &str) -> bool {
        let (file, block) = first_block(src);
        Measurer::new(&file.comments).one_line_eligible(&block)
    }

    #[test]
    fn test_text_only_body_is_eligible() {
        assert!(eligible("fn f(ctx) { <div>\"x\"</div> }"));
    }

    #[test]
    fn test_empty_body_is_eligible() {
        assert!(eligible("fn f(ctx) { <div></div> }"));
    }

    #[test]
    fn test_attrs_stay_inline() {
        assert!(eligible("fn f(ctx) { <div @a=\"b\" @c>\"x\"</div> }"));
    }

    #[test]
    fn test_nested_eligible_tag_children() {
        assert!(eligible("fn f(ctx) { <div><span></span></div> }"));
    }

    #[test]
    fn test_mixed_text_and_tags_forces_multiline() {
        assert!(!eligible("fn f(ctx) { <div><span></span>\"x\"</div> }"));
    }

    #[test]
    fn test_host_statement_in_body_forces_multiline() {
        assert!(!eligible("fn f(ctx) { <div> let x = 1; </div> }"));
    }

    #[test]
    fn test_host_statement_in_attr_body_forces_multiline() {
        assert!(!eligible("fn f(ctx) { <div let x = 1; >\"x\"</div> }"));
    }

    #[test]
    fn test_deep_break_propagates_to_ancestors() {
        // The innermost tag wraps, so every ancestor wraps too.
        assert!(!eligible(
            "fn f(ctx) { <a><b><c> let x = 1; </c></b></a> }"
        ));
    }

    #[test]
    fn test_line_comment_in_open_tag_forces_break() {
        assert!(!eligible("fn f(ctx) { <div // note\n >\"x\"</div> }"));
    }

    #[test]
    fn test_single_line_block_comment_does_not_force() {
        assert!(eligible("fn f(ctx) { <div /* note */ >\"x\"</div> }"));
    }

    #[test]
    fn test_multiline_block_comment_forces_break() {
        assert!(!eligible("fn f(ctx) { <div /* a\n b */ >\"x\"</div> }"));
    }

    #[test]
    fn test_comment_in_body_forces_multiline() {
        assert!(!eligible("fn f(ctx) { <div> /* x */ \"x\"</div> }"));
    }

    #[test]
    fn test_memo_is_stable_across_probes() {
        let (file, block) = first_block("fn f(ctx) { <div><span>\"x\"</span></div> }");
        let mut measurer = Measurer::new(&file.comments);
        let first = measurer.one_line_eligible(&block);
        let second = measurer.one_line_eligible(&block);
        assert_eq!(first, second);
        assert!(first);
    }
}
