//! JSON codec
//!
//! The printer has two standard layouts (compact and human readable) that
//! differ only in whitespace. Primitive values are printed by what their
//! stored string looks like: integers and finite floats unquoted, `true` /
//! `false` as lowercase literals and anything else as a quoted string. This
//! means a quoted numeric string such as `"007"` comes back as the number
//! `7` after a round trip.
//!
//! JSON `null` has no place in the tree: a `null` member or element is
//! dropped from its parent, and a document that is only `null` parses to an
//! unknown node (which prints as `null`).
//!
//! Objects and arrays may nest at most 512 levels deep.

mod parser;

use crate::{DataFormat, JsonOptions, Result};
use parser::Parser;
use strata_core::{format_f64, DataNode, NodeMap};

/// JSON implementation of [`DataFormat`]
///
/// ```
/// use strata_format::{DataFormat, JsonFormat};
///
/// let node = JsonFormat::compact().deserialize(r#"{"a":1,"b":[1,2,3]}"#).unwrap();
/// assert_eq!(node.get("b").unwrap().content_count(), 3);
/// assert_eq!(JsonFormat::compact().serialize(&node).unwrap(), r#"{"a":1,"b":[1,2,3]}"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonFormat {
    options: JsonOptions,
}

impl JsonFormat {
    /// Create a codec with custom whitespace options
    pub fn new(options: JsonOptions) -> Self {
        Self { options }
    }

    /// Codec printing without any whitespace
    pub fn compact() -> Self {
        Self::new(JsonOptions::compact())
    }

    /// Codec printing one entry per line with tab indentation
    pub fn human_readable() -> Self {
        Self::new(JsonOptions::human_readable())
    }

    pub fn options(&self) -> &JsonOptions {
        &self.options
    }

    fn write_node(&self, out: &mut String, node: &DataNode, level: usize) {
        match node {
            DataNode::Object(map) => self.write_object(out, map, level),
            DataNode::Collection(items) => self.write_array(out, items, level),
            DataNode::Primitive(value) => write_primitive(out, value),
            DataNode::Unknown => out.push_str("null"),
        }
    }

    fn write_object(&self, out: &mut String, map: &NodeMap, level: usize) {
        out.push('{');
        for (i, (key, value)) in map.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.line_break(out, level + 1);
            out.push('"');
            escape_into(out, key);
            out.push_str("\":");
            if !self.options.is_compact() {
                out.push(' ');
            }
            self.write_node(out, value, level + 1);
        }
        if !map.is_empty() {
            self.line_break(out, level);
        }
        out.push('}');
    }

    fn write_array(&self, out: &mut String, items: &[DataNode], level: usize) {
        out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.line_break(out, level + 1);
            self.write_node(out, item, level + 1);
        }
        if !items.is_empty() {
            self.line_break(out, level);
        }
        out.push(']');
    }

    fn line_break(&self, out: &mut String, level: usize) {
        out.push_str(&self.options.newline);
        for _ in 0..level {
            out.push_str(&self.options.indent);
        }
    }
}

impl DataFormat for JsonFormat {
    fn serialize(&self, node: &DataNode) -> Result<String> {
        let mut out = String::new();
        self.write_node(&mut out, node, 0);
        Ok(out)
    }

    fn deserialize(&self, text: &str) -> Result<DataNode> {
        Ok(Parser::new(text).parse_document()?)
    }
}

fn write_primitive(out: &mut String, value: &str) {
    if let Ok(int) = value.parse::<i64>() {
        out.push_str(&int.to_string());
    } else if let Some(float) = value.parse::<f64>().ok().filter(|f| f.is_finite()) {
        out.push_str(&format_f64(float));
    } else if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
        out.push_str(&value.to_ascii_lowercase());
    } else {
        out.push('"');
        escape_into(out, value);
        out.push('"');
    }
}

fn escape_into(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
}
