//! The tree-to-cell transducer.
//!
//! [Converter::parse] prepares the source, pre-collects listings and title fields, and then walks
//! the `document` environment. Each node is dispatched by name through a [HandlerSet]; the
//! handler's [Flow] decides whether the walker descends into the node's contents afterwards.

mod cells;
pub mod handlers;

pub use cells::CellList;
pub use handlers::{Handler, HandlerSet};

use beamer_parser::source::{get_all_listings, normalize, Listing};
use beamer_parser::tree::{parse_tree, Content, Node, NodeKind, ParserError};
use log::debug;
use thiserror::Error;

use crate::notebook::Cell;
use crate::titles::TitleInfo;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("document parsing error")]
    Parse(#[from] ParserError),
    #[error("listing {index} has no extracted body ({available} listings were found in the source)")]
    MissingListing { index: usize, available: usize },
    #[error("no handler named `{0}`")]
    UnknownHandler(String),
}

/// What the walker does with a node's contents once its handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Descend,
    Skip,
}

/// Everything a single conversion mutates.
#[derive(Debug, Default)]
pub struct WalkState {
    pub cells: CellList,
    pub info: TitleInfo,
    pub listings: Vec<Listing>,
    /// Number of listing nodes handled so far; indexes into `listings`.
    pub listing_cursor: usize,
    /// Set between inline `$` delimiters. Nodes are then copied as source text.
    pub in_equation: bool,
}

impl WalkState {
    pub fn new(info: TitleInfo, listings: Vec<Listing>) -> Self {
        WalkState {
            info,
            listings,
            ..Default::default()
        }
    }

    /// Add a text run to the current cell.
    ///
    /// Outside math the run is trimmed (see [clear_newline]) and leading blanks are dropped when
    /// the fragment already ends in a space. Every unescaped `$` flips `in_equation`.
    pub fn accumulate_text(&mut self, text: &str) {
        if self.in_equation {
            self.cells.append(text);
        } else {
            let cleared = clear_newline(text);
            let cleared = match self.cells.last_fragment() {
                Some(last) if last.ends_with(' ') => cleared.trim_start_matches([' ', '\t']),
                _ => cleared.as_str(),
            };
            if !cleared.is_empty() {
                self.cells.append(cleared);
            }
        }

        if count_math_delimiters(text) % 2 == 1 {
            self.in_equation = !self.in_equation;
        }
    }
}

/// Trim a text run. Trailing whitespace collapses to a single newline if it contained one, and
/// a run that starts on a new line loses its leading whitespace.
pub fn clear_newline(text: &str) -> String {
    let trimmed = text.trim_end();
    let cleared = if text[trimmed.len()..].contains('\n') {
        format!("{trimmed}\n")
    } else {
        trimmed.to_string()
    };

    if cleared.starts_with(['\n', '\r']) {
        cleared.trim_start().to_string()
    } else {
        cleared
    }
}

fn count_math_delimiters(text: &str) -> usize {
    let mut escaped = false;
    let mut count = 0;
    for c in text.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '$' => count += 1,
            _ => {}
        }
    }
    count
}

struct Scope {
    name: String,
    /// Whether non-blank siblings follow the element currently being walked.
    more_content: bool,
}

/// Recursive walker over the markup tree. Handlers receive it mutably so they can write cells
/// through [Walker::state] and walk sub-trees themselves.
pub struct Walker<'h> {
    handlers: &'h HandlerSet,
    pub state: WalkState,
    scopes: Vec<Scope>,
}

impl<'h> Walker<'h> {
    pub fn new(handlers: &'h HandlerSet, state: WalkState) -> Self {
        Walker {
            handlers,
            state,
            scopes: vec![],
        }
    }

    pub fn walk(&mut self, content: &Content) -> Result<(), ConvertError> {
        match content {
            Content::Node(node) => self.walk_node(node),
            Content::Text(text) => {
                if self.state.cells.current().is_some() {
                    self.state.accumulate_text(text);
                }
                Ok(())
            }
        }
    }

    pub fn walk_node(&mut self, node: &Node) -> Result<(), ConvertError> {
        if self.state.in_equation {
            self.state.cells.append(&node.raw);
            return Ok(());
        }

        let flow = match node.kind {
            NodeKind::Root | NodeKind::Group => Flow::Descend,
            NodeKind::Command | NodeKind::Environment => {
                let handlers = self.handlers;
                match handlers.get(&node.name) {
                    Some(handler) => handler(self, node)?,
                    None => (handlers.fallback())(self, node)?,
                }
            }
        };

        match flow {
            Flow::Descend => self.walk_children(node),
            Flow::Skip => Ok(()),
        }
    }

    /// Walk a node's contents in order. Groups are transparent: their children see the enclosing
    /// node as parent.
    pub fn walk_children(&mut self, node: &Node) -> Result<(), ConvertError> {
        let name = match node.kind {
            NodeKind::Group => self.parent_name().unwrap_or_default().to_string(),
            _ => node.name.clone(),
        };
        let last_content = node.contents.iter().rposition(|c| !c.is_blank());

        self.scopes.push(Scope {
            name,
            more_content: false,
        });
        let result = node
            .contents
            .iter()
            .enumerate()
            .try_for_each(|(idx, child)| {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.more_content = last_content.map_or(false, |last| last > idx);
                }
                self.walk(child)
            });
        self.scopes.pop();

        result
    }

    /// Walk content that is not a node body, such as the contents of an argument.
    pub fn walk_contents(&mut self, contents: &[Content]) -> Result<(), ConvertError> {
        contents.iter().try_for_each(|c| self.walk(c))
    }

    /// Name of the node whose contents are being walked.
    pub fn parent_name(&self) -> Option<&str> {
        self.scopes.last().map(|s| s.name.as_str())
    }

    /// Whether anything other than whitespace follows the current element in its parent.
    pub fn has_following_content(&self) -> bool {
        self.scopes.last().map_or(false, |s| s.more_content)
    }

    pub fn finish(self) -> WalkState {
        self.state
    }
}

/// Converts beamer sources to cells using a fixed set of handlers.
#[derive(Default)]
pub struct Converter {
    handlers: HandlerSet,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handlers(handlers: HandlerSet) -> Self {
        Converter { handlers }
    }

    pub fn handlers(&self) -> &HandlerSet {
        &self.handlers
    }

    pub fn handlers_mut(&mut self) -> &mut HandlerSet {
        &mut self.handlers
    }

    /// Convert a complete source file. Only the `document` environment produces cells.
    pub fn parse(&self, source: &str) -> Result<Vec<Cell>, ConvertError> {
        let code = normalize(source);
        let listings = get_all_listings(&code);
        let root = parse_tree(&code)?;
        let info = TitleInfo::collect(&root);

        let mut walker = Walker::new(&self.handlers, WalkState::new(info, listings));
        match root.find("document") {
            Some(document) => walker.walk_node(document)?,
            None => debug!("no document environment, nothing to convert"),
        }

        Ok(walker.finish().cells.into_cells())
    }
}

#[cfg(test)]
mod tests;
