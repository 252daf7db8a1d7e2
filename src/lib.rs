//! Converts LaTeX beamer slides into slideshow notebooks.
//!
//! The heavy lifting lives in the workspace crates: `beamer-parser` builds the markup tree and
//! `beamer-cells` walks it into notebook cells. This crate ties them to a configuration file and
//! the filesystem.

use anyhow::Context;
use log::info;
use std::fs;
use std::path::Path;

pub mod config;

pub use beamer_cells::{converter, notebook};
pub use beamer_parser::tree;

use crate::config::Config;
use crate::converter::Converter;
use crate::notebook::Notebook;

/// Convert beamer source text into a notebook using the handlers and metadata from `config`.
pub fn convert(source: &str, config: &Config) -> anyhow::Result<Notebook> {
    let converter = Converter::with_handlers(config.handlers()?);
    let cells = converter.parse(source).context("Could not convert document")?;
    Ok(Notebook::new(config.notebook_meta(), cells))
}

/// Read `input`, convert it and write the notebook to `output`.
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    config: &Config,
) -> anyhow::Result<Notebook> {
    let input = input.as_ref();
    let output = output.as_ref();

    let source = fs::read_to_string(input)
        .with_context(|| format!("Could not read {}", input.display()))?;
    let notebook = convert(&source, config)
        .with_context(|| format!("Error in {}", input.display()))?;

    notebook
        .write_to_path(output)
        .with_context(|| format!("Could not write {}", output.display()))?;
    info!(
        "wrote {} cells to {}",
        notebook.cells.len(),
        output.display()
    );

    Ok(notebook)
}
