use beamer_parser::tree::Node;
use std::collections::HashMap;

/// Macros whose values feed `\titlepage`.
pub const TITLE_FIELDS: [&str; 5] = ["title", "author", "institute", "date", "logo"];

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TitleInfo {
    fields: HashMap<String, String>,
}

impl TitleInfo {
    /// Scan the whole tree, preamble included. Later occurrences overwrite earlier ones.
    pub fn collect(root: &Node) -> Self {
        let mut info = TitleInfo::default();
        for field in TITLE_FIELDS {
            for node in root.find_all(field) {
                info.record(node);
            }
        }
        info
    }

    pub fn record(&mut self, node: &Node) {
        if let Some(value) = field_value(node) {
            self.fields.insert(node.name.clone(), value);
        }
    }

    /// Record a value only if the field was not seen before. Used while walking, where the
    /// pre-collected value already reflects the whole document.
    pub fn record_if_absent(&mut self, node: &Node) {
        if let Some(value) = field_value(node) {
            self.fields.entry(node.name.clone()).or_insert(value);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, field: &str, default: &'a str) -> &'a str {
        self.get(field).unwrap_or(default)
    }
}

fn field_value(node: &Node) -> Option<String> {
    let value = node.string().trim();
    (!value.is_empty()).then(|| value.to_string())
}
