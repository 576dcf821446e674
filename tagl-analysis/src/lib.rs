//! Analyses over the reconciled Tagl tree
//!
//! Three independent read-only passes plus the delegated interpolation
//! type check:
//!
//! - [`escape`]: classifies every `break`/`continue`/`goto` against the
//!   element blocks it would have to cross, and reports jumps that leave a
//!   tag's body without passing through its close point.
//! - [`terminating`]: the missing-return check; an element block only
//!   counts as terminating when its body does and no escaping jump
//!   bypasses that conclusion.
//! - [`context`]: statement placement (attributes outside a tag, template
//!   literals inside a tag's attribute body, tags nested inside a tag's
//!   attribute body, markup in non-template functions).
//! - [`interpolation`]: checks each `\{expr}` against the closed set of
//!   permitted interpolation types, given a [`interpolation::TypeProvider`]
//!   for the static types.
//!
//! All passes are total: they only append diagnostics and never stop at
//! the first problem.

pub mod context;
pub mod escape;
pub mod interpolation;
pub mod terminating;

use tagl_parser::tagl::ast::File;
use tagl_parser::tagl::diagnostics::Diagnostics;

/// Run the control-flow and placement analyses over a reconciled file.
pub fn check_file(file: &File) -> Diagnostics {
    let mut diags = Diagnostics::new();
    context::check(file, &mut diags);
    let report = escape::check(file, &mut diags);
    terminating::check(file, &report.crossed_blocks, &mut diags);
    diags
}
