//! Parsing module for the Tagl language
//!
//!     The pipeline from source text to the reconciled tree:
//!         1. Scanning: tokenization (logos plus manual string-segment
//!            scanning). See [scanning](crate::tagl::scanning).
//!         2. Parsing: recursive-descent statement/expression parsing with
//!            the four markup statement forms recognized inline. Open and
//!            end tags come out as flat sibling statements.
//!         3. Reconciling: matching sibling open/end pairs into nested
//!            element blocks. See [reconciling](crate::tagl::reconciling).
//!
//! Error Recovery
//!
//!     Every parse error is recorded in the diagnostic list and parsing
//!     continues; the parser never aborts a file over one malformed tag.
//!     The recovery decisions that downstream stages rely on:
//!         - An open/end tag missing its name or `>` yields a marker with
//!           an invalid close position. Such markers never participate in
//!           reconciliation.
//!         - A missing `>` does not consume the terminating token when it
//!           is `}`, so enclosing blocks still close correctly.
//!         - An unterminated string literal closes at the end of its line.

pub mod parser;

pub use parser::{parse_file, parse_file_flat};
