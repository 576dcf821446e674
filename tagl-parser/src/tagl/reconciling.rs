//! Tag reconciliation: flat marker sequences to nested element blocks
//!
//! # The High-Level Concept
//!
//! The parser emits open and end tags as flat sibling statements; an
//! element block spans from an open tag statement to a later end tag
//! statement *in the same list*. Reconciliation rewrites each statement
//! list so that every matched span becomes one nested [`ElementBlockStmt`].
//! The stack of in-progress frames acts as a memory of open tags: while a
//! frame is open, statements are redirected into its accumulated body
//! instead of the output list.
//!
//! # The Algorithm
//!
//! 1. On an open tag (with a valid `>`), push a frame.
//! 2. On an end tag, search the stack from the top for a frame with the
//!    same name. Matching always prefers the nearest enclosing open tag,
//!    never a farther ancestor. Frames above the match are mismatched
//!    intermediates: each is reported as an unclosed tag (void tags
//!    excepted) and flattened into the matched frame's body, open marker
//!    first, accumulated body after. The matched span is replaced by one
//!    element block.
//! 3. An end tag with no matching frame is an unopened tag: reported and
//!    left dangling in place, not wrapped.
//! 4. At end of input, remaining frames are unclosed tags: reported (void
//!    tags excepted) and flattened verbatim onto the output.
//!
//! Ordinary statements always go to the current target (top frame's body,
//! or the output list when no frame is open) through a single append
//! point; nothing indexes the output list directly.
//!
//! # Labels
//!
//! A label on a marker binds to the marker statement, not to the eventual
//! element block, so folding has to rebind it: an open tag's labels move
//! onto the produced element block; an end tag's labels move onto an
//! implicit empty statement inserted right after the block (the end tag
//! stops being an independent statement, and a label must keep referring
//! to exactly one final tree node).
//!
//! Markers whose `>` was never found have already been diagnosed by the
//! parser and pass through here as ordinary statements.

use super::ast::nodes::*;
use super::ast::span::Pos;
use super::diagnostics::Diagnostics;

/// Reconcile every statement list in a file, bottom-up.
pub fn reconcile_file(mut file: File, diags: &mut Diagnostics) -> File {
    for decl in &mut file.decls {
        reconcile_block(&mut decl.body, diags);
    }
    file
}

fn reconcile_block(block: &mut Block, diags: &mut Diagnostics) {
    let stmts = std::mem::take(&mut block.stmts);
    block.stmts = reconcile_list(stmts, diags);
}

/// Reconcile one statement list: recurse into nested lists first, then
/// match sibling-level open/end pairs.
pub fn reconcile_list(list: Vec<Stmt>, diags: &mut Diagnostics) -> Vec<Stmt> {
    let list: Vec<Stmt> = list
        .into_iter()
        .map(|stmt| {
            let mut stmt = stmt;
            reconcile_nested(&mut stmt, diags);
            stmt
        })
        .collect();

    let mut out: Vec<Stmt> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for stmt in list {
        let (labels, inner) = peel_labels(stmt);
        match inner {
            Stmt::OpenTag(tag) if tag.close_pos.is_valid() => {
                stack.push(Frame { labels, open: tag, body: Vec::new() });
            }
            Stmt::EndTag(tag) if tag.close_pos.is_valid() => {
                let name = tag.name.as_ref().map(|n| n.name.as_str()).unwrap_or("");
                match stack.iter().rposition(|f| f.name() == name) {
                    Some(matched) => {
                        let unmatched = stack.split_off(matched + 1);
                        let mut frame = stack.pop().expect("matched frame exists");
                        for f in unmatched {
                            if !is_void_tag(f.name()) {
                                diags.error(f.open.open_pos, "unclosed tag");
                            }
                            let body = f.body;
                            frame.body.push(rewrap_labels(f.labels, Stmt::OpenTag(f.open)));
                            frame.body.extend(body);
                        }

                        let trailing = if labels.is_empty() {
                            None
                        } else {
                            Some(rewrap_labels(
                                labels,
                                Stmt::Empty { pos: tag.open_pos, implicit: true },
                            ))
                        };

                        let block = Stmt::ElementBlock(ElementBlockStmt {
                            open_tag: frame.open,
                            body: frame.body,
                            end_tag: tag,
                        });
                        append(&mut stack, &mut out, rewrap_labels(frame.labels, block));
                        if let Some(trailing) = trailing {
                            append(&mut stack, &mut out, trailing);
                        }
                    }
                    None => {
                        diags.error(tag.open_pos, format!("unopened tag: {name}"));
                        append(&mut stack, &mut out, rewrap_labels(labels, Stmt::EndTag(tag)));
                    }
                }
            }
            other => append(&mut stack, &mut out, rewrap_labels(labels, other)),
        }
    }

    // Whatever is still open at end of input flattens back out, in order.
    for f in stack {
        if !is_void_tag(f.name()) {
            diags.error(f.open.open_pos, "unclosed tag");
        }
        let body = f.body;
        out.push(rewrap_labels(f.labels, Stmt::OpenTag(f.open)));
        out.extend(body);
    }

    out
}

/// An in-progress element block: an open tag and the statements collected
/// since it was pushed.
struct Frame {
    labels: Vec<(Ident, Pos)>,
    open: OpenTagStmt,
    body: Vec<Stmt>,
}

impl Frame {
    fn name(&self) -> &str {
        self.open.name.as_ref().map(|n| n.name.as_str()).unwrap_or("")
    }
}

/// Append to the current target: the top frame's body, or the output list
/// when the stack is empty.
fn append(stack: &mut [Frame], out: &mut Vec<Stmt>, stmt: Stmt) {
    match stack.last_mut() {
        Some(frame) => frame.body.push(stmt),
        None => out.push(stmt),
    }
}

/// Strip label wrappers, outermost first, returning them with the inner
/// statement.
fn peel_labels(stmt: Stmt) -> (Vec<(Ident, Pos)>, Stmt) {
    let mut labels = Vec::new();
    let mut cur = stmt;
    loop {
        match cur {
            Stmt::Labeled { label, colon, stmt } => {
                labels.push((label, colon));
                cur = *stmt;
            }
            other => return (labels, other),
        }
    }
}

/// Rewrap a statement in label wrappers, restoring the original order.
fn rewrap_labels(labels: Vec<(Ident, Pos)>, stmt: Stmt) -> Stmt {
    labels.into_iter().rev().fold(stmt, |stmt, (label, colon)| Stmt::Labeled {
        label,
        colon,
        stmt: Box::new(stmt),
    })
}

/// Recurse into every nested statement list of a single statement.
fn reconcile_nested(stmt: &mut Stmt, diags: &mut Diagnostics) {
    match stmt {
        Stmt::If(s) => {
            reconcile_block(&mut s.then, diags);
            if let Some(e) = &mut s.else_branch {
                reconcile_nested(e, diags);
            }
        }
        Stmt::For(s) => reconcile_block(&mut s.body, diags),
        Stmt::Switch(s) => {
            for arm in &mut s.arms {
                let body = std::mem::take(&mut arm.body);
                arm.body = reconcile_list(body, diags);
            }
        }
        Stmt::Labeled { stmt, .. } => reconcile_nested(stmt, diags),
        Stmt::Block(b) => reconcile_block(b, diags),
        Stmt::OpenTag(t) => {
            let body = std::mem::take(&mut t.body);
            t.body = reconcile_list(body, diags);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagl::ast::span::NO_POS;

    fn open(pos: u32, name: &str) -> Stmt {
        Stmt::OpenTag(OpenTagStmt {
            open_pos: Pos(pos),
            name: Some(Ident::new(Pos(pos + 1), name)),
            body: vec![],
            close_pos: Pos(pos + 1 + name.len() as u32),
        })
    }

    fn end(pos: u32, name: &str) -> Stmt {
        Stmt::EndTag(EndTagStmt {
            open_pos: Pos(pos),
            name: Some(Ident::new(Pos(pos + 2), name)),
            close_pos: Pos(pos + 2 + name.len() as u32),
        })
    }

    fn text(pos: u32, s: &str) -> Stmt {
        Stmt::Expr { expr: Expr::StrLit { pos: Pos(pos), text: format!("\"{s}\"") } }
    }

    fn reconcile(list: Vec<Stmt>) -> (Vec<Stmt>, Diagnostics) {
        let mut diags = Diagnostics::new();
        let out = reconcile_list(list, &mut diags);
        (out, diags)
    }

    #[test]
    fn test_simple_pair() {
        let (out, diags) = reconcile(vec![open(0, "div"), text(5, "x"), end(10, "div")]);
        assert!(diags.is_empty());
        assert_eq!(out.len(), 1);
        match &out[0] {
            Stmt::ElementBlock(b) => {
                assert_eq!(b.name(), "div");
                assert_eq!(b.body.len(), 1);
            }
            other => panic!("expected element block, got {other:?}"),
        }
    }

    #[test]
    fn test_properly_nested_pairs() {
        let (out, diags) = reconcile(vec![
            open(0, "a"),
            open(10, "b"),
            text(20, "x"),
            end(30, "b"),
            end(40, "a"),
        ]);
        assert!(diags.is_empty());
        assert_eq!(out.len(), 1);
        match &out[0] {
            Stmt::ElementBlock(a) => {
                assert_eq!(a.name(), "a");
                assert_eq!(a.body.len(), 1);
                match &a.body[0] {
                    Stmt::ElementBlock(b) => {
                        assert_eq!(b.name(), "b");
                        assert_eq!(b.body.len(), 1);
                    }
                    other => panic!("expected nested block, got {other:?}"),
                }
            }
            other => panic!("expected element block, got {other:?}"),
        }
    }

    #[test]
    fn test_innermost_match_for_same_name() {
        // <a><a></a></a>: the close matches the nearest open, never an
        // outer one.
        let (out, diags) = reconcile(vec![open(0, "a"), open(10, "a"), end(20, "a"), end(30, "a")]);
        assert!(diags.is_empty());
        assert_eq!(out.len(), 1);
        match &out[0] {
            Stmt::ElementBlock(outer) => {
                assert_eq!(outer.open_tag.open_pos, Pos(0));
                assert_eq!(outer.end_tag.open_pos, Pos(30));
                match &outer.body[0] {
                    Stmt::ElementBlock(inner) => {
                        assert_eq!(inner.open_tag.open_pos, Pos(10));
                        assert_eq!(inner.end_tag.open_pos, Pos(20));
                    }
                    other => panic!("expected inner block, got {other:?}"),
                }
            }
            other => panic!("expected element block, got {other:?}"),
        }
    }

    #[test]
    fn test_unopened_tag_left_dangling() {
        let (out, diags) = reconcile(vec![text(0, "x"), end(10, "div")]);
        assert_eq!(diags.len(), 1);
        assert!(diags.iter().any(|d| d.message == "unopened tag: div"));
        assert_eq!(out.len(), 2);
        assert!(matches!(out[1], Stmt::EndTag(_)));
    }

    #[test]
    fn test_unclosed_tag_flattened() {
        let (out, diags) = reconcile(vec![open(0, "div"), text(10, "x")]);
        assert_eq!(diags.len(), 1);
        assert!(diags.iter().any(|d| d.message == "unclosed tag"));
        // Flattened: the open marker and its collected body, un-wrapped.
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0], Stmt::OpenTag(_)));
        assert!(matches!(out[1], Stmt::Expr { .. }));
    }

    #[test]
    fn test_void_tag_exempt_from_unclosed() {
        let (out, diags) = reconcile(vec![open(0, "br")]);
        assert!(diags.is_empty());
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], Stmt::OpenTag(_)));
    }

    #[test]
    fn test_mismatched_intermediate_folds_into_match() {
        // <a><b></a>: b is unclosed but does not block a's match.
        let (out, diags) = reconcile(vec![
            open(0, "a"),
            open(10, "b"),
            text(20, "x"),
            end(30, "a"),
        ]);
        assert_eq!(diags.len(), 1);
        assert!(diags.iter().any(|d| d.message == "unclosed tag" && d.pos == Pos(10)));
        assert_eq!(out.len(), 1);
        match &out[0] {
            Stmt::ElementBlock(a) => {
                assert_eq!(a.name(), "a");
                // b's open marker flattened first, then its collected body.
                assert!(matches!(a.body[0], Stmt::OpenTag(_)));
                assert!(matches!(a.body[1], Stmt::Expr { .. }));
            }
            other => panic!("expected element block, got {other:?}"),
        }
    }

    #[test]
    fn test_void_intermediate_no_error() {
        let (out, diags) = reconcile(vec![open(0, "a"), open(10, "br"), end(30, "a")]);
        assert!(diags.is_empty());
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_invalid_markers_pass_through() {
        let broken = Stmt::OpenTag(OpenTagStmt {
            open_pos: Pos(0),
            name: Some(Ident::new(Pos(1), "div")),
            body: vec![],
            close_pos: NO_POS,
        });
        let (out, diags) = reconcile(vec![broken, end(10, "div")]);
        // The broken open never joins matching; the end tag is unopened.
        assert!(diags.iter().any(|d| d.message == "unopened tag: div"));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_labeled_open_tag_label_moves_to_block() {
        let labeled = Stmt::Labeled {
            label: Ident::new(Pos(0), "lbl"),
            colon: Pos(3),
            stmt: Box::new(open(5, "div")),
        };
        let (out, diags) = reconcile(vec![labeled, end(20, "div")]);
        assert!(diags.is_empty());
        assert_eq!(out.len(), 1);
        match &out[0] {
            Stmt::Labeled { label, stmt, .. } => {
                assert_eq!(label.name, "lbl");
                assert!(matches!(stmt.as_ref(), Stmt::ElementBlock(_)));
            }
            other => panic!("expected labeled block, got {other:?}"),
        }
    }

    #[test]
    fn test_labeled_end_tag_label_moves_to_empty_stmt() {
        let labeled_end = Stmt::Labeled {
            label: Ident::new(Pos(20), "lbl"),
            colon: Pos(23),
            stmt: Box::new(end(25, "div")),
        };
        let (out, diags) = reconcile(vec![open(0, "div"), labeled_end]);
        assert!(diags.is_empty());
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0], Stmt::ElementBlock(_)));
        match &out[1] {
            Stmt::Labeled { label, stmt, .. } => {
                assert_eq!(label.name, "lbl");
                assert!(matches!(stmt.as_ref(), Stmt::Empty { implicit: true, .. }));
            }
            other => panic!("expected labeled empty stmt, got {other:?}"),
        }
    }

    #[test]
    fn test_statements_between_blocks_keep_order() {
        let (out, diags) = reconcile(vec![
            text(0, "before"),
            open(10, "div"),
            end(20, "div"),
            text(30, "after"),
        ]);
        assert!(diags.is_empty());
        assert_eq!(out.len(), 3);
        assert!(matches!(out[0], Stmt::Expr { .. }));
        assert!(matches!(out[1], Stmt::ElementBlock(_)));
        assert!(matches!(out[2], Stmt::Expr { .. }));
    }

    #[test]
    fn test_sibling_blocks() {
        let (out, diags) = reconcile(vec![
            open(0, "a"),
            end(10, "a"),
            open(20, "b"),
            end(30, "b"),
        ]);
        assert!(diags.is_empty());
        assert_eq!(out.len(), 2);
    }
}
