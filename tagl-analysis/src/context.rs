//! Statement placement checks
//!
//! The markup statement forms are only meaningful in certain positions:
//!
//! - attributes belong directly in a tag's attribute body (between the
//!   tag name and its `>`), nowhere else;
//! - template literal statements may not appear in an attribute body
//!   (write text in the element body instead);
//! - tags may not be nested inside an attribute body, not even within a
//!   braced block;
//! - none of the markup forms belong in a non-template function (one
//!   whose first parameter is not `ctx`).
//!
//! These checks run after reconciliation, so a matched tag appears as one
//! element block; its open and end markers are still reported separately
//! where the original markers were, so nothing is silently swallowed.

use tagl_parser::tagl::ast::nodes::*;
use tagl_parser::tagl::diagnostics::Diagnostics;

/// Where the walk currently is, for placement purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Place {
    /// Function or element body: tags and template literals are fine,
    /// attributes are not.
    Body,
    /// A tag's attribute body: attributes are fine, templates and nested
    /// tags are not.
    AttrBody,
    /// Nested inside a block under an attribute body: nothing markup-like
    /// is allowed.
    AttrBodyNested,
}

pub fn check(file: &File, diags: &mut Diagnostics) {
    for decl in &file.decls {
        if decl.is_template_fn() {
            check_list(&decl.body.stmts, Place::Body, diags);
        } else {
            check_non_template(&decl.body.stmts, diags);
        }
    }
}

fn check_list(stmts: &[Stmt], place: Place, diags: &mut Diagnostics) {
    for stmt in stmts {
        check_stmt(stmt, place, diags);
    }
}

fn check_stmt(stmt: &Stmt, place: Place, diags: &mut Diagnostics) {
    match stmt {
        Stmt::Attribute(a) => {
            if place != Place::AttrBody {
                diags.error(a.at_pos, "attribute is not allowed outside a tag");
            }
        }
        Stmt::Expr { expr: Expr::Template(t) } => {
            if place != Place::Body {
                diags.error(t.open_pos, "template literal inside of a tag");
            }
        }
        Stmt::ElementBlock(b) => {
            if place != Place::Body {
                diags.error(b.open_tag.open_pos, "tag is not allowed inside a tag");
                diags.error(b.end_tag.open_pos, "end tag is not allowed inside a tag");
            }
            check_list(&b.open_tag.body, Place::AttrBody, diags);
            check_list(&b.body, Place::Body, diags);
        }
        Stmt::OpenTag(t) => {
            if place != Place::Body {
                diags.error(t.open_pos, "tag is not allowed inside a tag");
            }
            check_list(&t.body, Place::AttrBody, diags);
        }
        Stmt::EndTag(t) => {
            if place != Place::Body {
                diags.error(t.open_pos, "end tag is not allowed inside a tag");
            }
        }
        Stmt::If(s) => {
            let nested = nested_place(place);
            check_list(&s.then.stmts, nested, diags);
            if let Some(e) = &s.else_branch {
                check_stmt(e, nested, diags);
            }
        }
        Stmt::For(s) => check_list(&s.body.stmts, nested_place(place), diags),
        Stmt::Switch(s) => {
            for arm in &s.arms {
                check_list(&arm.body, nested_place(place), diags);
            }
        }
        Stmt::Block(b) => check_list(&b.stmts, nested_place(place), diags),
        Stmt::Labeled { stmt, .. } => check_stmt(stmt, place, diags),
        _ => {}
    }
}

/// Entering any nested statement list leaves the attribute body proper;
/// inside it, markup stays forbidden.
fn nested_place(place: Place) -> Place {
    match place {
        Place::Body => Place::Body,
        Place::AttrBody | Place::AttrBodyNested => Place::AttrBodyNested,
    }
}

/// In a non-template function every markup form is an error; the walk
/// still recurses so nested occurrences all get reported.
fn check_non_template(stmts: &[Stmt], diags: &mut Diagnostics) {
    use tagl_parser::tagl::ast::walk::{walk_stmts, Visitor};

    struct NonTemplate<'a> {
        diags: &'a mut Diagnostics,
    }

    impl Visitor for NonTemplate<'_> {
        fn visit_stmt(&mut self, stmt: &Stmt) -> bool {
            match stmt {
                Stmt::OpenTag(t) => {
                    self.diags
                        .error(t.open_pos, "open tag is not allowed inside a non-template function");
                }
                Stmt::ElementBlock(b) => {
                    self.diags.error(
                        b.open_tag.open_pos,
                        "open tag is not allowed inside a non-template function",
                    );
                    self.diags.error(
                        b.end_tag.open_pos,
                        "end tag is not allowed inside a non-template function",
                    );
                }
                Stmt::EndTag(t) => {
                    self.diags
                        .error(t.open_pos, "end tag is not allowed inside a non-template function");
                }
                Stmt::Attribute(a) => {
                    self.diags
                        .error(a.at_pos, "attribute is not allowed inside a non-template function");
                }
                _ => {}
            }
            true
        }

        fn visit_expr(&mut self, expr: &Expr) -> bool {
            if let Expr::Template(t) = expr {
                self.diags.error(
                    t.open_pos,
                    "template literal is not allowed inside a non-template function",
                );
            }
            true
        }
    }

    let mut visitor = NonTemplate { diags };
    walk_stmts(&mut visitor, stmts);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagl_parser::tagl::parsing::parse_file;

    fn messages(src: &str) -> Vec<String> {
        let (file, _) = parse_file(src);
        let mut diags = Diagnostics::new();
        check(&file, &mut diags);
        diags.into_sorted().into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn test_well_placed_markup() {
        let msgs = messages(
            "fn f(ctx) -> error { <div @attr=\"v\" @id> \"text\" \"t \\{x}\" </div> return nil; }",
        );
        assert!(msgs.is_empty(), "{msgs:?}");
    }

    #[test]
    fn test_attribute_outside_tag() {
        let msgs = messages("fn f(ctx) { @attr=\"v\"; }");
        assert_eq!(msgs, vec!["attribute is not allowed outside a tag"]);
    }

    #[test]
    fn test_attribute_in_element_body() {
        let msgs = messages("fn f(ctx) { <div> @attr=\"v\"; </div> }");
        assert_eq!(msgs, vec!["attribute is not allowed outside a tag"]);
    }

    #[test]
    fn test_template_literal_in_attr_body() {
        let msgs = messages("fn f(ctx) { <div \"t \\{x}\" > </div> }");
        assert_eq!(msgs, vec!["template literal inside of a tag"]);
    }

    #[test]
    fn test_tag_inside_attr_body_block() {
        let msgs = messages("fn f(ctx) { <div { <span> </span> } > </div> }");
        assert_eq!(
            msgs,
            vec![
                "tag is not allowed inside a tag",
                "end tag is not allowed inside a tag",
            ]
        );
    }

    #[test]
    fn test_markup_in_non_template_function() {
        let msgs = messages("fn f(x) { <div> \"a \\{b}\" </div> @attr; }");
        assert_eq!(
            msgs,
            vec![
                "open tag is not allowed inside a non-template function",
                "template literal is not allowed inside a non-template function",
                "end tag is not allowed inside a non-template function",
                "attribute is not allowed inside a non-template function",
            ]
        );
    }
}
