//! Template interpolation type constraint
//!
//! Interpolated expressions must belong to a closed union of permitted
//! categories: text-like, signed integer, unsigned integer, single
//! character, a pre-escaped wrapper, or a generic type parameter whose
//! constraint set is a subset of these. The actual type inference is the
//! host type system's job; this module only defines the contract — a
//! [`TypeProvider`] supplies the static type of an expression, and the
//! checker surfaces the verdict as a diagnostic at the expression's
//! position. An expression the provider cannot type is skipped, not
//! reported.
//!
//! [`LiteralTypeProvider`] is the built-in provider: it types literals and
//! the `pre_escaped(...)` / `uint(...)` wrapper calls, which is enough for
//! the CLI and the test suites.

use tagl_parser::tagl::ast::nodes::*;
use tagl_parser::tagl::diagnostics::Diagnostics;
use tagl_parser::tagl::ast::walk::{walk_file, Visitor};

/// The static type of an interpolated expression, as far as this check is
/// concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticType {
    Text,
    Int,
    Uint,
    Char,
    PreEscaped,
    /// A generic type parameter with its constraint set.
    Param { name: String, constraint: Vec<StaticType> },
    /// Anything else, carrying a display name for the diagnostic.
    Other(String),
}

impl StaticType {
    /// Whether this type satisfies the interpolation constraint. A
    /// parameter satisfies it when its constraint set is non-empty and
    /// every member does.
    pub fn is_allowed(&self) -> bool {
        match self {
            StaticType::Text
            | StaticType::Int
            | StaticType::Uint
            | StaticType::Char
            | StaticType::PreEscaped => true,
            StaticType::Param { constraint, .. } => {
                !constraint.is_empty() && constraint.iter().all(StaticType::is_allowed)
            }
            StaticType::Other(_) => false,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            StaticType::Text => "string",
            StaticType::Int => "int",
            StaticType::Uint => "uint",
            StaticType::Char => "char",
            StaticType::PreEscaped => "pre_escaped",
            StaticType::Param { name, .. } => name,
            StaticType::Other(name) => name,
        }
    }
}

/// The seam to the host type system.
pub trait TypeProvider {
    /// The static type of `expr`, or None when it cannot be resolved.
    fn type_of(&self, expr: &Expr) -> Option<StaticType>;
}

/// Types literals and the two wrapper calls; everything else is untyped.
#[derive(Debug, Default)]
pub struct LiteralTypeProvider;

impl TypeProvider for LiteralTypeProvider {
    fn type_of(&self, expr: &Expr) -> Option<StaticType> {
        match expr {
            Expr::StrLit { .. } | Expr::Template(_) => Some(StaticType::Text),
            Expr::IntLit { .. } => Some(StaticType::Int),
            Expr::CharLit { .. } => Some(StaticType::Char),
            Expr::Unary { op: UnOp::Neg, expr, .. } => self.type_of(expr),
            Expr::Paren { expr, .. } => self.type_of(expr),
            Expr::Call { callee, .. } => match callee.as_ref() {
                Expr::Ident(id) if id.name == "pre_escaped" => Some(StaticType::PreEscaped),
                Expr::Ident(id) if id.name == "uint" => Some(StaticType::Uint),
                _ => None,
            },
            Expr::Binary { op, lhs, .. } => match op {
                BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => self.type_of(lhs),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Check every template-literal part in the file against the constraint.
pub fn check(file: &File, provider: &dyn TypeProvider, diags: &mut Diagnostics) {
    struct InterpCheck<'a> {
        provider: &'a dyn TypeProvider,
        diags: &'a mut Diagnostics,
    }

    impl Visitor for InterpCheck<'_> {
        fn visit_expr(&mut self, expr: &Expr) -> bool {
            if let Expr::Template(t) = expr {
                for part in &t.parts {
                    if let Some(ty) = self.provider.type_of(&part.expr) {
                        if !ty.is_allowed() {
                            self.diags.error(
                                part.expr.pos(),
                                format!(
                                    "{} does not satisfy the template interpolation constraint",
                                    ty.display_name()
                                ),
                            );
                        }
                    }
                }
            }
            true
        }
    }

    let mut visitor = InterpCheck { provider, diags };
    walk_file(&mut visitor, file);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagl_parser::tagl::parsing::parse_file;

    fn messages(src: &str) -> Vec<String> {
        let (file, _) = parse_file(src);
        let mut diags = Diagnostics::new();
        check(&file, &LiteralTypeProvider, &mut diags);
        diags.into_sorted().into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn test_permitted_literal_kinds() {
        let msgs = messages(
            r#"fn f(ctx) { "\{"str"} \{100} \{-100} \{'r'} \{uint(100)} \{pre_escaped("<b>")}"; }"#,
        );
        assert!(msgs.is_empty(), "{msgs:?}");
    }

    #[test]
    fn test_unresolved_expressions_are_skipped() {
        let msgs = messages(r#"fn f(ctx) { "\{someVar} \{f(x)}"; }"#);
        assert!(msgs.is_empty(), "{msgs:?}");
    }

    #[test]
    fn test_attribute_template_parts_checked() {
        struct FloatProvider;
        impl TypeProvider for FloatProvider {
            fn type_of(&self, _expr: &Expr) -> Option<StaticType> {
                Some(StaticType::Other("float".into()))
            }
        }

        let (file, _) = parse_file("fn f(ctx) { <div @a=\"\\{x}\"> </div> }");
        let mut diags = Diagnostics::new();
        check(&file, &FloatProvider, &mut diags);
        let msgs: Vec<_> = diags.into_sorted().into_iter().map(|d| d.message).collect();
        assert_eq!(
            msgs,
            vec!["float does not satisfy the template interpolation constraint"]
        );
    }

    #[test]
    fn test_param_constraint_subset() {
        let ok = StaticType::Param {
            name: "T".into(),
            constraint: vec![StaticType::Int, StaticType::Text],
        };
        assert!(ok.is_allowed());

        let bad = StaticType::Param {
            name: "T".into(),
            constraint: vec![StaticType::Int, StaticType::Other("float".into())],
        };
        assert!(!bad.is_allowed());

        let empty = StaticType::Param { name: "T".into(), constraint: vec![] };
        assert!(!empty.is_allowed());
    }
}
