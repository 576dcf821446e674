//! Layout-aware formatter for the Tagl language
//!
//! Renders a reconciled tree back to text. The interesting decision is
//! per element block: does the whole span (open tag, body, end tag) fit on
//! one source line, or does it wrap with indentation? Answering that for a
//! parent requires speculatively measuring its children, which is why
//! measuring and emitting are two separate passes over the same tree
//! shape: [`measure`] is pure and memoized, [`printer`] writes output and
//! asks the measurer before committing to a layout.
//!
//! Formatting is total (any tree renders) and idempotent: formatting
//! already-formatted output is a fixed point.

pub mod config;
pub mod measure;
pub mod printer;

pub use config::FormatConfig;
pub use printer::format_file;
