//! Turns a parsed beamer document into an ordered list of slideshow notebook cells.
//!
//! The entry point is [converter::Converter]. Macro handling is table driven: [converter::HandlerSet]
//! maps macro names to handler functions and can be overlaid by callers.

/// Cell and notebook types, serialized in the Jupyter (nbformat 4) layout.
pub mod notebook;

/// The tree walker, cell state and built-in macro handlers.
pub mod converter;

/// Lookup of image files referenced without an extension.
pub mod images;

/// Title page metadata gathered from the whole document.
pub mod titles;
