use log::debug;
use std::mem;

use crate::notebook::{Cell, CellKind, SlideType};

/// The growing output. Cells are append-only; only the most recently started cell is open for
/// writing, and only while `open` is set (it is cleared before the document body starts).
#[derive(Debug, Default)]
pub struct CellList {
    cells: Vec<Cell>,
    open: bool,
}

impl CellList {
    /// Append a fresh, empty cell and make it current. The only way cells are created.
    pub fn start_cell(&mut self, kind: CellKind, slide_type: SlideType) {
        debug!("new {kind:?} cell ({slide_type:?})");
        self.cells.push(Cell::new(kind, slide_type));
        self.open = true;
    }

    pub fn reset(&mut self) {
        self.cells.clear();
        self.open = false;
    }

    pub fn current(&self) -> Option<&Cell> {
        self.open.then(|| self.cells.last()).flatten()
    }

    pub fn current_mut(&mut self) -> Option<&mut Cell> {
        if self.open {
            self.cells.last_mut()
        } else {
            None
        }
    }

    pub fn current_is_empty(&self) -> bool {
        self.current().map_or(false, |c| c.source().is_empty())
    }

    /// The current cell for markdown output. Code cells only ever receive listing bodies, so
    /// writing after one opens a markdown continuation cell.
    fn prose_cell(&mut self) -> Option<&mut Cell> {
        if self.current().map_or(false, |c| c.kind() == CellKind::Code) {
            self.start_cell(CellKind::Markdown, SlideType::Continuation);
        }
        self.current_mut()
    }

    /// Start a new fragment in the current cell.
    pub fn push_fragment<S: Into<String>>(&mut self, fragment: S) {
        if let Some(cell) = self.prose_cell() {
            cell.source_mut().push(fragment.into());
        }
    }

    /// Extend the last fragment of the current cell, creating it if needed.
    pub fn append(&mut self, text: &str) {
        if let Some(cell) = self.prose_cell() {
            let source = cell.source_mut();
            match source.last_mut() {
                Some(last) => last.push_str(text),
                None => source.push(text.to_string()),
            }
        }
    }

    pub fn last_fragment(&self) -> Option<&str> {
        self.current()
            .and_then(|c| c.source().last())
            .map(String::as_str)
    }

    pub fn ensure_trailing_newline(&mut self) {
        if let Some(last) = self.current_mut().and_then(|c| c.source_mut().last_mut()) {
            if !last.ends_with('\n') {
                last.push('\n');
            }
        }
    }

    pub fn set_source(&mut self, source: Vec<String>) {
        if let Some(cell) = self.current_mut() {
            *cell.source_mut() = source;
        }
    }

    pub fn set_slide_type(&mut self, slide_type: SlideType) {
        if let Some(cell) = self.current_mut() {
            cell.set_slide_type(slide_type);
        }
    }

    /// Retag the current cell as a code cell in place.
    pub fn convert_current_to_code(&mut self) {
        if let Some(cell) = self.current_mut() {
            let placeholder = Cell::new(CellKind::Code, SlideType::Continuation);
            let old = mem::replace(cell, placeholder);
            *cell = old.into_code();
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }
}
