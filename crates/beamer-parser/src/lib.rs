//! Parsing front end for beamer slide sources.
//!
//! The crate turns raw LaTeX text into a [tree::Node] tree. Source preprocessing (comment removal,
//! display-math rewriting) and the verbatim listing pre-scan live in [source], because listing
//! bodies are taken from the raw text rather than from the tree.

mod common;

pub use common::*;
pub mod source;
pub mod tree;
