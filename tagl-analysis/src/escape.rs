//! Escape validation: jumps versus tag boundaries
//!
//! For every element block, normal control flow reaching the end of the
//! block's body must pass through the synthesized close point before
//! leaving the block's lexical scope. A `break`, `continue` or `goto`
//! whose target lies outside an enclosing block would skip that close
//! point; this pass finds and classifies them.
//!
//! Labels are function-scoped and visible regardless of tag nesting, so
//! they are collected up front into a flat table, each entry recording the
//! chain of enclosing element blocks at its definition site. That makes
//! the per-jump tag-crossing computation a prefix comparison of two
//! chains, O(depth), instead of a tree re-walk per jump.
//!
//! Verdicts per jump (none means the jump is fine):
//! - `invalid break label L exits body tag` / `invalid continue label L
//!   exits body tag`: the labeled target is declared outside a crossed
//!   block; the tag's close-out cannot be synthesized at the jump site.
//! - `break prevents reaching the end tag` / `continue prevents reaching
//!   the end tag`: an unlabeled jump whose innermost loop or switch lives
//!   outside a block that wraps the jump; legal host control flow, but
//!   incompatible with guaranteed close-out.
//! - `goto L prevents reaching the end tag` and/or `goto L jumps into
//!   block`: the two goto checks are independent and may both fire for
//!   the same statement; they are deliberately not deduplicated.
//!
//! Host-level jump errors (undeclared label, break outside any loop) are
//! reported here as well, since the same walk has all the context.

use std::collections::{HashMap, HashSet};
use tagl_parser::tagl::ast::nodes::*;
use tagl_parser::tagl::ast::span::Pos;
use tagl_parser::tagl::diagnostics::Diagnostics;

/// The outcome of escape validation, beyond the diagnostics themselves:
/// which element blocks are crossed by at least one escaping jump. The
/// terminating analysis needs this to decide whether a block's close
/// point is always reached.
#[derive(Debug, Default)]
pub struct EscapeReport {
    pub crossed_blocks: HashSet<Pos>,
}

/// Validate every jump in the file.
pub fn check(file: &File, diags: &mut Diagnostics) -> EscapeReport {
    let mut report = EscapeReport::default();
    for decl in &file.decls {
        check_func(decl, diags, &mut report);
    }
    report
}

#[derive(Debug, Clone)]
struct LabelInfo {
    pos: Pos,
    /// Enclosing element blocks at the definition site, outermost first,
    /// identified by their open tag position.
    tag_chain: Vec<Pos>,
}

/// An enclosing `for` or `switch`, as seen from inside.
struct JumpTarget {
    is_loop: bool,
    /// Element block depth at the target's position; a jump from a deeper
    /// tag depth crosses blocks on the way out.
    tag_depth: usize,
    labels: Vec<String>,
}

fn check_func(decl: &FuncDecl, diags: &mut Diagnostics, report: &mut EscapeReport) {
    let mut labels = HashMap::new();
    collect_labels(&decl.body.stmts, &mut Vec::new(), &mut labels, diags);

    let mut checker = Checker {
        diags,
        labels,
        tag_stack: Vec::new(),
        targets: Vec::new(),
        crossed: &mut report.crossed_blocks,
    };
    checker.walk_list(&decl.body.stmts, &mut Vec::new());
}

/// Pass 1: the flat label table.
fn collect_labels(
    stmts: &[Stmt],
    tag_chain: &mut Vec<Pos>,
    labels: &mut HashMap<String, LabelInfo>,
    diags: &mut Diagnostics,
) {
    for stmt in stmts {
        collect_labels_stmt(stmt, tag_chain, labels, diags);
    }
}

fn collect_labels_stmt(
    stmt: &Stmt,
    tag_chain: &mut Vec<Pos>,
    labels: &mut HashMap<String, LabelInfo>,
    diags: &mut Diagnostics,
) {
    match stmt {
        Stmt::Labeled { label, stmt, .. } => {
            if labels.contains_key(&label.name) {
                diags.error(label.pos, format!("label {} already declared", label.name));
            } else {
                labels.insert(
                    label.name.clone(),
                    LabelInfo { pos: label.pos, tag_chain: tag_chain.clone() },
                );
            }
            collect_labels_stmt(stmt, tag_chain, labels, diags);
        }
        Stmt::If(s) => {
            collect_labels(&s.then.stmts, tag_chain, labels, diags);
            if let Some(e) = &s.else_branch {
                collect_labels_stmt(e, tag_chain, labels, diags);
            }
        }
        Stmt::For(s) => collect_labels(&s.body.stmts, tag_chain, labels, diags),
        Stmt::Switch(s) => {
            for arm in &s.arms {
                collect_labels(&arm.body, tag_chain, labels, diags);
            }
        }
        Stmt::Block(b) => collect_labels(&b.stmts, tag_chain, labels, diags),
        Stmt::OpenTag(t) => collect_labels(&t.body, tag_chain, labels, diags),
        Stmt::ElementBlock(b) => {
            tag_chain.push(b.open_tag.open_pos);
            collect_labels(&b.open_tag.body, tag_chain, labels, diags);
            collect_labels(&b.body, tag_chain, labels, diags);
            tag_chain.pop();
        }
        _ => {}
    }
}

struct Checker<'a> {
    diags: &'a mut Diagnostics,
    labels: HashMap<String, LabelInfo>,
    tag_stack: Vec<Pos>,
    targets: Vec<JumpTarget>,
    crossed: &'a mut HashSet<Pos>,
}

impl Checker<'_> {
    /// Pass 2: classify jumps. `pending` carries label names down to the
    /// loop or switch they bind to.
    fn walk_list(&mut self, stmts: &[Stmt], pending: &mut Vec<String>) {
        for stmt in stmts {
            self.walk_stmt(stmt, pending);
        }
    }

    fn walk_stmt(&mut self, stmt: &Stmt, pending: &mut Vec<String>) {
        match stmt {
            Stmt::Labeled { label, stmt, .. } => {
                pending.push(label.name.clone());
                self.walk_stmt(stmt, pending);
                pending.pop();
            }
            Stmt::If(s) => {
                self.walk_list(&s.then.stmts, &mut Vec::new());
                if let Some(e) = &s.else_branch {
                    self.walk_stmt(e, &mut Vec::new());
                }
            }
            Stmt::For(s) => {
                self.targets.push(JumpTarget {
                    is_loop: true,
                    tag_depth: self.tag_stack.len(),
                    labels: pending.clone(),
                });
                self.walk_list(&s.body.stmts, &mut Vec::new());
                self.targets.pop();
            }
            Stmt::Switch(s) => {
                self.targets.push(JumpTarget {
                    is_loop: false,
                    tag_depth: self.tag_stack.len(),
                    labels: pending.clone(),
                });
                for arm in &s.arms {
                    self.walk_list(&arm.body, &mut Vec::new());
                }
                self.targets.pop();
            }
            Stmt::Block(b) => self.walk_list(&b.stmts, &mut Vec::new()),
            Stmt::OpenTag(t) => self.walk_list(&t.body, &mut Vec::new()),
            Stmt::ElementBlock(b) => {
                self.tag_stack.push(b.open_tag.open_pos);
                self.walk_list(&b.open_tag.body, &mut Vec::new());
                self.walk_list(&b.body, &mut Vec::new());
                self.tag_stack.pop();
            }
            Stmt::Branch(branch) => self.check_branch(branch),
            _ => {}
        }
    }

    fn check_branch(&mut self, branch: &BranchStmt) {
        match branch.kind {
            BranchKind::Goto => self.check_goto(branch),
            BranchKind::Break | BranchKind::Continue => match &branch.label {
                Some(label) => self.check_labeled_jump(branch, label),
                None => self.check_unlabeled_jump(branch),
            },
        }
    }

    fn check_unlabeled_jump(&mut self, branch: &BranchStmt) {
        let kind = branch.kind.as_str();
        let target = match branch.kind {
            BranchKind::Break => self.targets.last(),
            _ => self.targets.iter().rev().find(|t| t.is_loop),
        };
        let Some(target) = target else {
            let message = match branch.kind {
                BranchKind::Break => "break not in for or switch statement".to_string(),
                _ => "continue not in for statement".to_string(),
            };
            self.diags.error(branch.pos, message);
            return;
        };
        if target.tag_depth < self.tag_stack.len() {
            self.crossed.extend(self.tag_stack[target.tag_depth..].iter().copied());
            self.diags.error(branch.pos, format!("{kind} prevents reaching the end tag"));
        }
    }

    fn check_labeled_jump(&mut self, branch: &BranchStmt, label: &Ident) {
        let kind = branch.kind.as_str();
        let target = self.targets.iter().rev().find(|t| {
            t.labels.iter().any(|l| l == &label.name)
                && (t.is_loop || branch.kind == BranchKind::Break)
        });
        match target {
            Some(target) => {
                if target.tag_depth < self.tag_stack.len() {
                    let depth = target.tag_depth;
                    self.crossed.extend(self.tag_stack[depth..].iter().copied());
                    self.diags.error(
                        branch.pos,
                        format!("invalid {kind} label {} exits body tag", label.name),
                    );
                }
            }
            None if self.labels.contains_key(&label.name) => {
                self.diags
                    .error(branch.pos, format!("invalid {kind} label {}", label.name));
            }
            None => {
                self.diags
                    .error(label.pos, format!("label {} not declared", label.name));
            }
        }
    }

    fn check_goto(&mut self, branch: &BranchStmt) {
        let Some(label) = &branch.label else {
            return; // missing label already reported by the parser
        };
        let Some(info) = self.labels.get(&label.name).cloned() else {
            self.diags
                .error(label.pos, format!("label {} not declared", label.name));
            return;
        };

        let common = self
            .tag_stack
            .iter()
            .zip(info.tag_chain.iter())
            .take_while(|(a, b)| a == b)
            .count();

        // Jumping out: some enclosing block does not contain the label.
        if self.tag_stack.len() > common {
            self.crossed.extend(self.tag_stack[common..].iter().copied());
            self.diags.error(
                branch.pos,
                format!("goto {} prevents reaching the end tag", label.name),
            );
        }
        // Jumping in: the label sits inside a block the goto is not in.
        // Both diagnostics may fire for the same statement.
        if info.tag_chain.len() > common {
            self.diags
                .error(branch.pos, format!("goto {} jumps into block", label.name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagl_parser::tagl::parsing::parse_file;

    fn check_src(body: &str) -> Vec<String> {
        let src = format!("fn test(ctx) -> error {{ {body} return nil; }}");
        let (file, parse_diags) = parse_file(&src);
        assert!(!parse_diags.has_errors(), "parse errors: {parse_diags:?}");
        let mut diags = Diagnostics::new();
        check(&file, &mut diags);
        diags.into_sorted().into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn test_local_jumps_inside_tag_are_fine() {
        let messages = check_src("<div> for { continue; break; } </div>");
        assert!(messages.is_empty(), "{messages:?}");
    }

    #[test]
    fn test_unlabeled_escape() {
        let messages = check_src("for { <div> continue; break; </div> }");
        assert_eq!(
            messages,
            vec![
                "continue prevents reaching the end tag",
                "break prevents reaching the end tag",
            ]
        );
    }

    #[test]
    fn test_labeled_escape_is_hard_error() {
        let messages = check_src("outer: for { <div> for { continue outer; break outer; } </div> }");
        assert_eq!(
            messages,
            vec![
                "invalid continue label outer exits body tag",
                "invalid break label outer exits body tag",
            ]
        );
    }

    #[test]
    fn test_labeled_loop_inside_tag_is_fine() {
        let messages = check_src("<div> outer: for { for { continue outer; break outer; } } </div>");
        assert!(messages.is_empty(), "{messages:?}");
    }

    #[test]
    fn test_switch_break_stays_local() {
        let messages = check_src("for { <div> switch x { case 1: break; } </div> }");
        assert!(messages.is_empty(), "{messages:?}");
    }

    #[test]
    fn test_switch_continue_escapes() {
        let messages = check_src("for { <div> switch x { default: continue; } </div> }");
        assert_eq!(messages, vec!["continue prevents reaching the end tag"]);
    }

    #[test]
    fn test_jump_outside_any_loop() {
        let messages = check_src("<div> continue; break; </div>");
        assert_eq!(
            messages,
            vec![
                "continue not in for statement",
                "break not in for or switch statement",
            ]
        );
    }

    #[test]
    fn test_goto_out_of_tag() {
        let messages = check_src("for { <div> goto done; </div> } done: ;");
        assert_eq!(messages, vec!["goto done prevents reaching the end tag"]);
    }

    #[test]
    fn test_goto_into_sibling_tag_only_jumps_into_block() {
        let messages = check_src("goto inner; <div> inner: ; </div>");
        assert_eq!(messages, vec!["goto inner jumps into block"]);
    }

    #[test]
    fn test_goto_both_diagnostics_fire() {
        let messages = check_src("<div> goto inner; </div> <span> inner: ; </span>");
        assert_eq!(
            messages,
            vec![
                "goto inner prevents reaching the end tag",
                "goto inner jumps into block",
            ]
        );
    }

    #[test]
    fn test_goto_undeclared_label() {
        let messages = check_src("goto nowhere;");
        assert_eq!(messages, vec!["label nowhere not declared"]);
    }

    #[test]
    fn test_duplicate_label() {
        let messages = check_src("a: ; a: ;");
        assert_eq!(messages, vec!["label a already declared"]);
    }

    #[test]
    fn test_attr_body_jump_is_inside_tag_scope() {
        let messages = check_src("<div for { continue; break; } > </div>");
        assert!(messages.is_empty(), "{messages:?}");
    }

    #[test]
    fn test_crossed_blocks_reported() {
        let src = "fn test(ctx) { for { <div> break; </div> } }";
        let (file, _) = parse_file(src);
        let mut diags = Diagnostics::new();
        let report = check(&file, &mut diags);
        assert_eq!(report.crossed_blocks.len(), 1);
    }

    #[test]
    fn test_validation_does_not_stop_early() {
        let messages = check_src("for { <div> break; </div> <div> continue; </div> }");
        assert_eq!(messages.len(), 2);
    }
}
