//! # tagl-parser
//!
//! A parser for the Tagl templating language: a small, statically-typed,
//! C-family host language extended with markup tag blocks (`<name> ... </name>`),
//! attributes (`@name="..."`) and string template literals with embedded
//! expressions (`"...\{expr}..."`).
//!
//! The pipeline is strictly one-way:
//!
//!     source text -> tokens -> flat statement lists -> reconciled tree
//!
//! Tag open/close markers are first parsed as ordinary statements at their
//! surrounding list level; a separate reconciliation pass matches sibling
//! open/close pairs into nested element blocks. See the [reconciling]
//! module for why matching is not done during recursive descent.
//!
//! Every entry point is total: parsing and reconciliation always return a
//! tree plus a list of recorded diagnostics, never an early failure. A
//! single malformed tag must not mask unrelated errors elsewhere in the
//! same file.
//!
//! [reconciling]: tagl::reconciling

#![allow(rustdoc::invalid_html_tags)]

pub mod tagl;
