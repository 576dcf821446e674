//! Terminating-statement analysis (missing return)
//!
//! A function that declares a result must end in a terminating statement.
//! The host rules are the usual ones (return and goto terminate; an
//! if/else terminates when both branches do; an infinite `for` terminates
//! unless something breaks out of it; a `switch` terminates when it has a
//! `default`, nothing breaks out of it, and every arm terminates).
//!
//! An element block is terminating only if its body, taken as a plain
//! statement list, is terminating by those rules AND no escaping jump
//! inside it bypasses the close point; the escape pass reports which
//! blocks are crossed.

use std::collections::HashSet;
use tagl_parser::tagl::ast::nodes::*;
use tagl_parser::tagl::ast::span::Pos;
use tagl_parser::tagl::diagnostics::Diagnostics;

/// Check every result-declaring function for a missing return.
/// `crossed_blocks` comes from [`crate::escape::check`].
pub fn check(file: &File, crossed_blocks: &HashSet<Pos>, diags: &mut Diagnostics) {
    for decl in &file.decls {
        if decl.result.is_none() {
            continue;
        }
        if !is_terminating_list(&decl.body.stmts, crossed_blocks) {
            diags.error(decl.body.rbrace, "missing return");
        }
    }
}

fn is_terminating_list(stmts: &[Stmt], crossed: &HashSet<Pos>) -> bool {
    stmts
        .iter()
        .rev()
        .find(|s| !matches!(s, Stmt::Empty { .. }))
        .is_some_and(|last| is_terminating(last, None, crossed))
}

fn is_terminating(stmt: &Stmt, label: Option<&str>, crossed: &HashSet<Pos>) -> bool {
    match stmt {
        Stmt::Return { .. } => true,
        Stmt::Branch(b) => b.kind == BranchKind::Goto,
        Stmt::Block(b) => is_terminating_list(&b.stmts, crossed),
        Stmt::If(s) => {
            s.else_branch.as_ref().is_some_and(|e| {
                is_terminating_list(&s.then.stmts, crossed) && is_terminating(e, None, crossed)
            })
        }
        Stmt::For(s) => s.cond.is_none() && !has_break(&s.body.stmts, label, true),
        Stmt::Switch(s) => {
            s.arms.iter().any(|arm| arm.pattern.is_none())
                && !s.arms.iter().any(|arm| has_break(&arm.body, label, true))
                && s.arms.iter().all(|arm| is_terminating_list(&arm.body, crossed))
        }
        Stmt::Labeled { label, stmt, .. } => is_terminating(stmt, Some(&label.name), crossed),
        Stmt::ElementBlock(b) => {
            is_terminating_list(&b.body, crossed) && !crossed.contains(&b.open_tag.open_pos)
        }
        _ => false,
    }
}

/// Whether `stmts` contains a break that targets the construct under
/// inspection: an unlabeled break at the top breakable level (`top`), or a
/// break naming `label` at any depth.
fn has_break(stmts: &[Stmt], label: Option<&str>, top: bool) -> bool {
    stmts.iter().any(|stmt| stmt_has_break(stmt, label, top))
}

fn stmt_has_break(stmt: &Stmt, label: Option<&str>, top: bool) -> bool {
    match stmt {
        Stmt::Branch(BranchStmt { kind: BranchKind::Break, label: l, .. }) => match l {
            None => top,
            Some(l) => label == Some(l.name.as_str()),
        },
        Stmt::If(s) => {
            has_break(&s.then.stmts, label, top)
                || s.else_branch.as_ref().is_some_and(|e| stmt_has_break(e, label, top))
        }
        // Unlabeled breaks inside a nested loop or switch bind to it, not
        // to the construct under inspection; labeled ones still might.
        Stmt::For(s) => has_break(&s.body.stmts, label, false),
        Stmt::Switch(s) => s.arms.iter().any(|arm| has_break(&arm.body, label, false)),
        Stmt::Labeled { stmt, .. } => stmt_has_break(stmt, label, top),
        Stmt::Block(b) => has_break(&b.stmts, label, top),
        Stmt::OpenTag(t) => has_break(&t.body, label, top),
        Stmt::ElementBlock(b) => {
            has_break(&b.open_tag.body, label, top) || has_break(&b.body, label, top)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape;
    use tagl_parser::tagl::parsing::parse_file;

    fn missing_return(src: &str) -> bool {
        let (file, _) = parse_file(src);
        let mut diags = Diagnostics::new();
        let report = escape::check(&file, &mut diags);
        let before = diags.len();
        check(&file, &report.crossed_blocks, &mut diags);
        diags.len() > before
    }

    #[test]
    fn test_return_terminates() {
        assert!(!missing_return("fn f(ctx) -> error { return nil; }"));
    }

    #[test]
    fn test_fallthrough_is_missing_return() {
        assert!(missing_return("fn f(ctx) -> error { let x = 1; }"));
    }

    #[test]
    fn test_no_result_no_check() {
        assert!(!missing_return("fn f(ctx) { let x = 1; }"));
    }

    #[test]
    fn test_infinite_for_terminates() {
        assert!(!missing_return("fn f(ctx) -> error { for { let x = 1; } }"));
    }

    #[test]
    fn test_for_with_break_does_not_terminate() {
        assert!(missing_return("fn f(ctx) -> error { for { break; } }"));
    }

    #[test]
    fn test_break_inside_nested_loop_is_fine() {
        assert!(!missing_return("fn f(ctx) -> error { for { for { break; } } }"));
    }

    #[test]
    fn test_labeled_break_from_nested_loop_counts() {
        assert!(missing_return(
            "fn f(ctx) -> error { outer: for { for { break outer; } } }"
        ));
    }

    #[test]
    fn test_escaping_break_through_tag_still_counts() {
        // The break escapes the tag, but it still exits the loop.
        assert!(missing_return("fn f(ctx) -> error { for { <div> break; </div> } }"));
    }

    #[test]
    fn test_infinite_for_with_escaping_continue_terminates() {
        assert!(!missing_return(
            "fn f(ctx) -> error { for { <div> continue; </div> } }"
        ));
    }

    #[test]
    fn test_element_block_with_terminating_body() {
        assert!(!missing_return("fn f(ctx) -> error { <div> for { continue; } </div> }"));
    }

    #[test]
    fn test_element_block_with_non_terminating_body() {
        assert!(missing_return("fn f(ctx) -> error { <div> for { break; } </div> }"));
    }

    #[test]
    fn test_if_else_both_terminate() {
        assert!(!missing_return(
            "fn f(ctx) -> error { if x { return a; } else { return b; } }"
        ));
    }

    #[test]
    fn test_if_without_else_does_not_terminate() {
        assert!(missing_return("fn f(ctx) -> error { if x { return a; } }"));
    }

    #[test]
    fn test_switch_with_default_terminates() {
        assert!(!missing_return(
            "fn f(ctx) -> error { switch x { case 1: return a; default: return b; } }"
        ));
    }

    #[test]
    fn test_switch_without_default_does_not_terminate() {
        assert!(missing_return(
            "fn f(ctx) -> error { switch x { case 1: return a; } }"
        ));
    }

    #[test]
    fn test_switch_with_break_does_not_terminate() {
        assert!(missing_return(
            "fn f(ctx) -> error { switch x { case 1: break; default: return b; } }"
        ));
    }

    #[test]
    fn test_goto_terminates() {
        assert!(!missing_return("fn f(ctx) -> error { again: for { } goto again; }"));
    }
}
