//! Built-in macro handlers and the name-to-handler table.
//!
//! Every handler has the same shape: it gets the walker and the node, writes to the current cell,
//! and returns whether the walker should descend into the node's contents. The functions are
//! public so that a replacement handler can delegate to the built-in one.

use beamer_parser::tree::{Argument, Content, Delimiter, Node};
use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::mem;
use std::path::Path;
use std::sync::Arc;

use crate::converter::{ConvertError, Flow, Walker};
use crate::images::resolve_image;
use crate::notebook::{CellKind, SlideType};
use crate::titles::TITLE_FIELDS;

pub type Handler =
    Arc<dyn Fn(&mut Walker<'_>, &Node) -> Result<Flow, ConvertError> + Send + Sync>;

type HandlerResult = Result<Flow, ConvertError>;

/// Key used for handler lookup. A trailing `*` maps to a `_star` suffix, so `equation*` and
/// `equation_star` name the same handler.
pub fn handler_key(name: &str) -> Cow<str> {
    match name.strip_suffix('*') {
        Some(base) => Cow::Owned(format!("{base}_star")),
        None => Cow::Borrowed(name),
    }
}

/// Maps macro and environment names to handlers. Names without an entry go to the fallback,
/// which by default is [unknown].
#[derive(Clone)]
pub struct HandlerSet {
    handlers: HashMap<String, Handler>,
    fallback: Handler,
}

impl HandlerSet {
    /// A table with no entries; every node goes to the fallback.
    pub fn empty() -> Self {
        HandlerSet {
            handlers: HashMap::new(),
            fallback: Arc::new(unknown),
        }
    }

    /// Add a handler, replacing any existing one with the same name.
    pub fn insert<F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Walker<'_>, &Node) -> Result<Flow, ConvertError> + Send + Sync + 'static,
    {
        self.handlers
            .insert(handler_key(name).into_owned(), Arc::new(handler));
        self
    }

    pub fn with<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&mut Walker<'_>, &Node) -> Result<Flow, ConvertError> + Send + Sync + 'static,
    {
        self.insert(name, handler);
        self
    }

    /// Handle `name` exactly like the already registered `existing`.
    pub fn alias(&mut self, name: &str, existing: &str) -> Result<&mut Self, ConvertError> {
        let handler = self
            .get(existing)
            .cloned()
            .ok_or_else(|| ConvertError::UnknownHandler(existing.to_string()))?;
        self.handlers.insert(handler_key(name).into_owned(), handler);
        Ok(self)
    }

    /// Overlay another table on this one. Entries of `other` win.
    pub fn extend(&mut self, other: HandlerSet) {
        self.handlers.extend(other.handlers);
    }

    pub fn set_fallback<F>(&mut self, handler: F)
    where
        F: Fn(&mut Walker<'_>, &Node) -> Result<Flow, ConvertError> + Send + Sync + 'static,
    {
        self.fallback = Arc::new(handler);
    }

    pub fn get(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(&*handler_key(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn fallback(&self) -> &Handler {
        &self.fallback
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for HandlerSet {
    fn default() -> Self {
        let mut set = HandlerSet::empty();

        set.insert("document", document)
            .insert("frame", frame)
            .insert("frametitle", frametitle)
            .insert("section", section)
            .insert("subsection", subsection)
            .insert("subsubsection", subsubsection)
            .insert("block", block)
            .insert("itemize", list)
            .insert("enumerate", list)
            .insert("item", item)
            .insert("pause", pause)
            .insert("titlepage", titlepage)
            .insert("hrule", hrule)
            .insert("ldots", ldots)
            .insert("url", url)
            .insert("quote", quote);

        for name in [
            "equation", "equation*", "align", "align*", "eqnarray", "eqnarray*",
        ] {
            set.insert(name, equation);
        }

        set.insert("emph", emph).insert("textbf", textbf);
        for name in ["texttt", "lstinline", "py", "PythonCode", "typ", "kwrd"] {
            set.insert(name, texttt);
        }

        set.insert("lstlisting", listing).insert("verbatim", listing);

        for name in ["pgfimage", "includegraphics"] {
            set.insert(name, image);
        }
        for name in ["movie", "media"] {
            set.insert(name, movie);
        }

        for name in TITLE_FIELDS {
            set.insert(name, title_field);
        }

        for name in ["center", "figure"] {
            set.insert(name, transparent);
        }
        for name in [
            "minipage",
            "centering",
            "tiny",
            "scriptsize",
            "footnotesize",
            "small",
            "normalsize",
            "large",
            "Large",
            "LARGE",
            "huge",
            "Huge",
        ] {
            set.insert(name, ignore);
        }
        for name in ["hspace", "vspace", "hspace*", "vspace*"] {
            set.insert(name, ignore_children);
        }

        set.insert("BackgroundPicture", background_width)
            .insert("BackgroundPictureWidth", background_width)
            .insert("BackgroundPictureHeight", background_height);

        set
    }
}

const BLANK_IMAGES: [&str; 2] = ["blank", "blank.png"];

lazy_static! {
    static ref INPUT_PROMPT: Regex =
        Regex::new(r"^(?:In \[\d*\]|\.{3,5}):").expect("invalid regex expression");
    static ref OUTPUT_PROMPT: Regex = Regex::new(r"^Out\[\d*\]:").expect("invalid regex expression");
}

pub fn document(walker: &mut Walker, _node: &Node) -> HandlerResult {
    walker.state.cells.reset();
    Ok(Flow::Descend)
}

fn brace_args(node: &Node) -> impl Iterator<Item = &Argument> {
    node.args
        .iter()
        .filter(|arg| arg.delimiter == Delimiter::Brace)
}

/// `\begin{frame}[options]{Title}` takes its title from the first brace argument.
pub fn frame(walker: &mut Walker, node: &Node) -> HandlerResult {
    walker
        .state
        .cells
        .start_cell(CellKind::Markdown, SlideType::Slide);
    if let Some(title) = brace_args(node).next() {
        heading_line(walker, &title.contents)?;
    }
    Ok(Flow::Descend)
}

fn heading_line(walker: &mut Walker, contents: &[Content]) -> Result<(), ConvertError> {
    walker.state.cells.push_fragment("## ");
    walker.walk_contents(contents)?;
    walker.state.cells.append("\n");
    walker.state.cells.push_fragment("");
    Ok(())
}

pub fn frametitle(walker: &mut Walker, node: &Node) -> HandlerResult {
    heading_line(walker, &node.contents)?;
    Ok(Flow::Skip)
}

fn heading(walker: &mut Walker, node: &Node, level: &str) -> HandlerResult {
    let cells = &mut walker.state.cells;
    cells.start_cell(CellKind::Markdown, SlideType::Slide);
    cells.push_fragment(format!("{level} {}\n", node.string()));
    Ok(Flow::Skip)
}

pub fn section(walker: &mut Walker, node: &Node) -> HandlerResult {
    heading(walker, node, "##")
}

pub fn subsection(walker: &mut Walker, node: &Node) -> HandlerResult {
    heading(walker, node, "###")
}

pub fn subsubsection(walker: &mut Walker, node: &Node) -> HandlerResult {
    heading(walker, node, "####")
}

pub fn block(walker: &mut Walker, node: &Node) -> HandlerResult {
    let cells = &mut walker.state.cells;
    cells.push_fragment(format!("### {}\n", node.string()));
    cells.push_fragment("");
    walker.walk_children(node)?;
    Ok(Flow::Skip)
}

/// List content never goes into a code cell.
fn ensure_markdown(walker: &mut Walker) {
    let cells = &mut walker.state.cells;
    if cells.current().map_or(false, |c| c.kind() == CellKind::Code) {
        cells.start_cell(CellKind::Markdown, SlideType::Continuation);
    }
}

/// `itemize` and `enumerate`. The children are walked here so the trailing newline is added only
/// after nested lists are complete.
pub fn list(walker: &mut Walker, node: &Node) -> HandlerResult {
    ensure_markdown(walker);
    walker.walk_children(node)?;
    walker.state.cells.ensure_trailing_newline();
    Ok(Flow::Skip)
}

pub fn item(walker: &mut Walker, _node: &Node) -> HandlerResult {
    ensure_markdown(walker);
    let marker = match walker.parent_name() {
        Some("itemize") => Some("* "),
        Some("enumerate") => Some("1. "),
        other => {
            warn!("\\item has unknown parent node {}", other.unwrap_or("(none)"));
            None
        }
    };

    let cells = &mut walker.state.cells;
    if cells.last_fragment().is_some() {
        cells.append("\n");
    }
    if let Some(marker) = marker {
        cells.push_fragment(marker);
    }
    Ok(Flow::Descend)
}

pub fn equation(walker: &mut Walker, node: &Node) -> HandlerResult {
    let cells = &mut walker.state.cells;
    cells.push_fragment("$$\n");
    cells.push_fragment(format!("{}\n", node.contents_raw().trim()));
    cells.push_fragment("$$\n");
    Ok(Flow::Skip)
}

fn embellish(walker: &mut Walker, node: &Node, marker: &str) -> HandlerResult {
    walker
        .state
        .cells
        .append(&format!("{marker}{}{marker} ", node.string()));
    Ok(Flow::Skip)
}

pub fn emph(walker: &mut Walker, node: &Node) -> HandlerResult {
    embellish(walker, node, "*")
}

pub fn textbf(walker: &mut Walker, node: &Node) -> HandlerResult {
    embellish(walker, node, "**")
}

pub fn texttt(walker: &mut Walker, node: &Node) -> HandlerResult {
    embellish(walker, node, "`")
}

pub fn ldots(walker: &mut Walker, _node: &Node) -> HandlerResult {
    walker.state.accumulate_text(" ...");
    Ok(Flow::Skip)
}

fn strip_input_prompt(line: &str) -> Option<&str> {
    INPUT_PROMPT.find(line).map(|m| {
        let rest = &line[m.end()..];
        rest.strip_prefix(' ').unwrap_or(rest)
    })
}

/// `lstlisting` and `verbatim`.
///
/// The body comes from the pre-extracted listings, not from the tree. REPL sessions are split:
/// each `Out[]:` line closes the current code cell and opens a new one, and input prompts are
/// stripped. Any other line is kept as is.
pub fn listing(walker: &mut Walker, _node: &Node) -> HandlerResult {
    let state = &mut walker.state;
    if state.cells.current_is_empty() {
        state.cells.convert_current_to_code();
    } else {
        state
            .cells
            .start_cell(CellKind::Code, SlideType::Continuation);
    }

    let index = state.listing_cursor;
    let code = state
        .listings
        .get(index)
        .ok_or(ConvertError::MissingListing {
            index,
            available: state.listings.len(),
        })?;
    state.listing_cursor += 1;

    let mut src = vec![];
    for line in code {
        let trimmed = line.trim_start();
        if let Some(input) = strip_input_prompt(trimmed) {
            src.push(input.to_string());
        } else if OUTPUT_PROMPT.is_match(trimmed) {
            state.cells.set_source(mem::take(&mut src));
            state
                .cells
                .start_cell(CellKind::Code, SlideType::Continuation);
        } else {
            src.push(line.clone());
        }
    }
    if !src.is_empty() {
        state.cells.set_source(src);
    }

    if walker.has_following_content() {
        walker
            .state
            .cells
            .start_cell(CellKind::Markdown, SlideType::Continuation);
    }
    Ok(Flow::Skip)
}

pub fn image(walker: &mut Walker, node: &Node) -> HandlerResult {
    let image = resolve_image(node.string());
    walker
        .state
        .cells
        .push_fragment(format!("<img src=\"{image}\"/>\n"));
    Ok(Flow::Skip)
}

pub fn movie(walker: &mut Walker, node: &Node) -> HandlerResult {
    let cells = &mut walker.state.cells;
    cells.push_fragment("<div align=\"center\">\n");
    cells.push_fragment(format!("<video loop controls src=\"{}\"/>\n", node.string()));
    cells.push_fragment("</div>\n");
    Ok(Flow::Skip)
}

pub fn url(walker: &mut Walker, node: &Node) -> HandlerResult {
    walker
        .state
        .cells
        .push_fragment(format!("<{}> ", node.string()));
    Ok(Flow::Skip)
}

pub fn quote(walker: &mut Walker, node: &Node) -> HandlerResult {
    let body = node.contents_raw();
    for line in body.trim().lines() {
        walker.state.cells.push_fragment(format!("> {line}\n"));
    }
    Ok(Flow::Skip)
}

pub fn hrule(walker: &mut Walker, _node: &Node) -> HandlerResult {
    walker.state.cells.push_fragment("\n----\n");
    Ok(Flow::Descend)
}

/// An empty continuation cell becomes the fragment itself; otherwise a new fragment cell starts.
/// A slide cell is never retagged, so the slide boundary it carries survives.
pub fn pause(walker: &mut Walker, _node: &Node) -> HandlerResult {
    let cells = &mut walker.state.cells;
    let retag = match cells.current() {
        Some(cell) => cell.source().is_empty() && cell.slide_type() != SlideType::Slide,
        None => return Ok(Flow::Descend),
    };

    if retag {
        cells.set_slide_type(SlideType::Fragment);
    } else {
        cells.start_cell(CellKind::Markdown, SlideType::Fragment);
    }
    Ok(Flow::Descend)
}

pub fn title_field(walker: &mut Walker, node: &Node) -> HandlerResult {
    walker.state.info.record_if_absent(node);
    Ok(Flow::Skip)
}

pub fn titlepage(walker: &mut Walker, _node: &Node) -> HandlerResult {
    let state = &mut walker.state;
    let info = &state.info;
    let fragments = [
        format!("# {}\n", info.get_or("title", "Title")),
        format!("**{}**\n", info.get_or("author", "Author")),
        format!("**{}**\n", info.get_or("institute", "Institute")),
        format!("**{}**\n", info.get_or("date", "Date")),
    ];

    for fragment in fragments {
        state.cells.push_fragment(fragment);
        state.cells.push_fragment("\n");
    }
    Ok(Flow::Descend)
}

pub fn ignore(_walker: &mut Walker, _node: &Node) -> HandlerResult {
    Ok(Flow::Descend)
}

/// Like [ignore], for environments whose brace arguments are ordinary content
/// (`\begin{center}{\Large hi}`).
pub fn transparent(walker: &mut Walker, node: &Node) -> HandlerResult {
    for arg in brace_args(node) {
        walker.walk_contents(&arg.contents)?;
    }
    Ok(Flow::Descend)
}

pub fn ignore_children(_walker: &mut Walker, _node: &Node) -> HandlerResult {
    Ok(Flow::Skip)
}

fn background(walker: &mut Walker, node: &Node, attribute: &str) -> HandlerResult {
    let path = node.string();
    let basename = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    if BLANK_IMAGES.contains(&basename) {
        return Ok(Flow::Skip);
    }

    let image = resolve_image(path);
    let cells = &mut walker.state.cells;
    cells.start_cell(CellKind::Markdown, SlideType::Slide);
    cells.push_fragment(format!("<img {attribute}=\"100%\" src=\"{image}\"/>\n"));
    Ok(Flow::Skip)
}

pub fn background_width(walker: &mut Walker, node: &Node) -> HandlerResult {
    background(walker, node, "width")
}

pub fn background_height(walker: &mut Walker, node: &Node) -> HandlerResult {
    background(walker, node, "height")
}

/// Fallback for macros without a handler: the macro name is kept in the text as `\name ` and its
/// arguments are walked as ordinary content.
pub fn unknown(walker: &mut Walker, node: &Node) -> HandlerResult {
    warn!(
        "No handler for \\{} at byte {}",
        node.name, node.span.range.start
    );
    walker.state.cells.append(&format!("\\{} ", node.name));
    Ok(Flow::Descend)
}
