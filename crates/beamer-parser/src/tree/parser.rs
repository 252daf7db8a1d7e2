use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use crate::common::Span;
use crate::tree::{Argument, Content, Delimiter, Node, NodeKind, ROOT};

#[derive(Parser)]
#[grammar = "grammars/tex.pest"]
pub struct TexParser;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("document parsing error")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),
}

/// Parse a (normalized) source into a tree rooted at a [ROOT] node.
pub fn parse_tree(input: &str) -> Result<Node, ParserError> {
    let mut pairs = TexParser::parse(Rule::document, input).map_err(Box::new)?;
    let contents = match pairs.next() {
        Some(document) => parse_contents(document.into_inner()),
        None => vec![],
    };

    Ok(Node {
        name: ROOT.to_string(),
        kind: NodeKind::Root,
        args: vec![],
        contents,
        raw: input.to_string(),
        span: Span::new(0, input.len()),
    })
}

fn parse_contents(pairs: Pairs<Rule>) -> Vec<Content> {
    pairs
        .filter(|p| p.as_rule() != Rule::EOI)
        .map(parse_content)
        .collect()
}

fn parse_content(pair: Pair<Rule>) -> Content {
    match pair.as_rule() {
        Rule::text | Rule::option_text | Rule::stray_marker => {
            Content::Text(pair.as_str().to_string())
        }
        Rule::command => Content::Node(parse_command(pair)),
        Rule::environment => Content::Node(parse_environment(pair)),
        Rule::listing => Content::Node(parse_listing(pair)),
        Rule::group => Content::Node(parse_group(pair)),
        _ => unreachable!(),
    }
}

fn parse_command(pair: Pair<Rule>) -> Node {
    let span = Span::from(pair.as_span());
    let raw = pair.as_str().to_string();
    let mut inner = pair.into_inner();
    let name = inner.next().expect("missing command name").as_str().to_string();

    let args: Vec<Argument> = inner.map(parse_argument).collect();
    let contents = args
        .iter()
        .filter(|arg| arg.delimiter == Delimiter::Brace)
        .flat_map(|arg| arg.contents.iter().cloned())
        .collect();

    Node {
        name,
        kind: NodeKind::Command,
        args,
        contents,
        raw,
        span,
    }
}

fn parse_environment(pair: Pair<Rule>) -> Node {
    let span = Span::from(pair.as_span());
    let raw = pair.as_str().to_string();
    let mut inner = pair.into_inner();
    let name = inner.next().expect("missing environment name").as_str().to_string();

    let mut args = vec![];
    let mut contents = vec![];
    for elem in inner {
        match elem.as_rule() {
            Rule::brace_arg | Rule::bracket_arg if contents.is_empty() => {
                args.push(parse_argument(elem))
            }
            _ => contents.push(parse_content(elem)),
        }
    }

    Node {
        name,
        kind: NodeKind::Environment,
        args,
        contents,
        raw,
        span,
    }
}

fn parse_listing(pair: Pair<Rule>) -> Node {
    let span = Span::from(pair.as_span());
    let raw = pair.as_str().to_string();
    let mut inner = pair.into_inner();
    let name = inner.next().expect("missing listing name").as_str().to_string();

    let mut args = vec![];
    let mut body = String::new();
    for elem in inner {
        match elem.as_rule() {
            Rule::bracket_arg => args.push(parse_argument(elem)),
            _ => body = elem.as_str().to_string(),
        }
    }

    Node {
        name,
        kind: NodeKind::Environment,
        args,
        contents: vec![Content::Text(body)],
        raw,
        span,
    }
}

fn parse_group(pair: Pair<Rule>) -> Node {
    let span = Span::from(pair.as_span());
    let raw = pair.as_str().to_string();

    Node {
        name: String::new(),
        kind: NodeKind::Group,
        args: vec![],
        contents: parse_contents(pair.into_inner()),
        raw,
        span,
    }
}

fn parse_argument(pair: Pair<Rule>) -> Argument {
    let delimiter = match pair.as_rule() {
        Rule::brace_arg => Delimiter::Brace,
        Rule::bracket_arg => Delimiter::Bracket,
        _ => unreachable!(),
    };
    let outer = pair.as_str();
    let raw = outer[1..outer.len() - 1].to_string();

    Argument {
        delimiter,
        contents: parse_contents(pair.into_inner()),
        raw,
    }
}
