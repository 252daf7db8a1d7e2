mod parser;

pub use parser::*;

use crate::common::Span;

/// Name given to the node that wraps a whole source file.
pub const ROOT: &str = "[tex]";

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum NodeKind {
    Root,
    /// `\name[opt]{arg}`
    Command,
    /// `\begin{name} ... \end{name}`
    Environment,
    /// A bare `{ ... }` group.
    Group,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Delimiter {
    Brace,
    Bracket,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Argument {
    pub delimiter: Delimiter,
    pub contents: Vec<Content>,
    /// Argument source without the surrounding delimiters.
    pub raw: String,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Content {
    Node(Node),
    Text(String),
}

impl Content {
    /// Source text of the element, exactly as written.
    pub fn raw(&self) -> &str {
        match self {
            Content::Node(node) => &node.raw,
            Content::Text(text) => text,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Content::Node(_) => false,
            Content::Text(text) => text.trim().is_empty(),
        }
    }
}

/// A parsed macro, environment or group.
///
/// For commands, `contents` holds the bodies of the brace arguments in order, so walking a
/// command visits its argument text. Bracket (option) arguments are only kept in `args`.
/// Environments keep their arguments in `args` and their body in `contents`.
#[derive(Debug, PartialEq, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub args: Vec<Argument>,
    pub contents: Vec<Content>,
    pub raw: String,
    pub span: Span,
}

impl Node {
    /// Raw text of the last brace argument, or an empty string when there is none.
    pub fn string(&self) -> &str {
        self.args
            .iter()
            .rev()
            .find(|arg| arg.delimiter == Delimiter::Brace)
            .map(|arg| arg.raw.as_str())
            .unwrap_or_default()
    }

    /// The contents re-serialized to source text.
    pub fn contents_raw(&self) -> String {
        self.contents.iter().map(Content::raw).collect()
    }

    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.contents.iter().filter_map(|c| match c {
            Content::Node(node) => Some(node),
            Content::Text(_) => None,
        })
    }

    /// First descendant with the given name, depth first.
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.children()
            .find_map(|child| (child.name == name).then_some(child).or_else(|| child.find(name)))
    }

    /// Every descendant with the given name, in document order.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Node> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a Node>) {
        for child in self.children() {
            if child.name == name {
                found.push(child);
            }
            child.collect_named(name, found);
        }
    }
}
