//! Binary encoder.

use indexmap::IndexSet;
use trellis_core::{Length, Node, Payload, StyleBlock, StyleValue};

use super::{FORMAT_VERSION, LENGTH_AUTO, LENGTH_FIXED, LENGTH_PERCENT, MAGIC, NO_STYLE};

/// Deduplicating tables shared by every node record.
#[derive(Default)]
struct Tables {
    strings: IndexSet<String>,
    styles: IndexSet<Vec<u8>>,
}

impl Tables {
    fn string(&mut self, value: &str) -> u32 {
        if let Some(index) = self.strings.get_index_of(value) {
            return index as u32;
        }
        self.strings.insert_full(value.to_string()).0 as u32
    }

    /// Index of `block`. Equal blocks encode to equal bytes, since entries
    /// are written in canonical order.
    fn style(&mut self, block: &StyleBlock) -> u32 {
        let mut bytes = Vec::new();
        let entries = block.canonical();
        bytes.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        for (property, value) in entries {
            bytes.push(property.tag());
            self.style_value(&mut bytes, value);
        }
        self.styles.insert_full(bytes).0 as u32
    }

    fn style_value(&mut self, out: &mut Vec<u8>, value: &StyleValue) {
        match value {
            StyleValue::Length(Length::Fixed(v)) => {
                out.push(LENGTH_FIXED);
                out.extend_from_slice(&v.to_le_bytes());
            }
            StyleValue::Length(Length::Percent(v)) => {
                out.push(LENGTH_PERCENT);
                out.extend_from_slice(&v.to_le_bytes());
            }
            StyleValue::Length(Length::Auto) => out.push(LENGTH_AUTO),
            StyleValue::Color(c) => out.extend_from_slice(&[c.r, c.g, c.b, c.a]),
            StyleValue::Number(v) => out.extend_from_slice(&v.to_le_bytes()),
            StyleValue::Text(s) => {
                let index = self.string(s);
                out.extend_from_slice(&index.to_le_bytes());
            }
            StyleValue::Direction(d) => out.push(d.tag()),
            StyleValue::Distribution(d) => out.push(d.tag()),
            StyleValue::Alignment(a) => out.push(a.tag()),
            StyleValue::Wrap(w) => out.push(w.tag()),
            StyleValue::TextAlign(t) => out.push(t.tag()),
        }
    }

    fn payload(&mut self, out: &mut Vec<u8>, payload: &Payload) {
        match payload {
            Payload::None => {}
            Payload::Text(text) => {
                let index = self.string(text);
                out.extend_from_slice(&index.to_le_bytes());
            }
            Payload::Image { source, width, height } => {
                let index = self.string(source);
                out.extend_from_slice(&index.to_le_bytes());
                out.extend_from_slice(&width.to_le_bytes());
                out.extend_from_slice(&height.to_le_bytes());
            }
            Payload::Input { value, placeholder } => {
                let value = self.string(value);
                let placeholder = self.string(placeholder);
                out.extend_from_slice(&value.to_le_bytes());
                out.extend_from_slice(&placeholder.to_le_bytes());
            }
            Payload::Checkbox { label, checked } => {
                let index = self.string(label);
                out.extend_from_slice(&index.to_le_bytes());
                out.push(u8::from(*checked));
            }
            Payload::Slider { value, min, max } => {
                out.extend_from_slice(&value.to_le_bytes());
                out.extend_from_slice(&min.to_le_bytes());
                out.extend_from_slice(&max.to_le_bytes());
            }
        }
    }
}

/// Encode a tree. Counts and indices are `u32`.
pub fn encode(root: &Node) -> Vec<u8> {
    let mut tables = Tables::default();
    let mut nodes = Vec::new();
    let mut node_count = 0u32;

    for node in root.iter() {
        node_count += 1;
        nodes.push(node.kind().tag());
        nodes.extend_from_slice(&node.id().0.to_le_bytes());
        nodes.extend_from_slice(&(node.children().len() as u32).to_le_bytes());

        let style = match node.style() {
            Some(block) if !block.is_empty() => tables.style(block),
            _ => NO_STYLE,
        };
        nodes.extend_from_slice(&style.to_le_bytes());

        tables.payload(&mut nodes, node.payload());

        match node.computed_rect() {
            Some(rect) => {
                nodes.push(1);
                for v in [rect.x, rect.y, rect.width, rect.height] {
                    nodes.extend_from_slice(&v.to_le_bytes());
                }
            }
            None => nodes.push(0),
        }
    }

    let mut out = Vec::with_capacity(super::HEADER_LEN + nodes.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.0.to_le_bytes());
    out.extend_from_slice(&FORMAT_VERSION.1.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&(tables.strings.len() as u32).to_le_bytes());
    out.extend_from_slice(&(tables.styles.len() as u32).to_le_bytes());
    out.extend_from_slice(&node_count.to_le_bytes());

    for s in &tables.strings {
        out.extend_from_slice(&(s.len() as u32).to_le_bytes());
        out.extend_from_slice(s.as_bytes());
    }
    for style in &tables.styles {
        out.extend_from_slice(style);
    }
    out.extend_from_slice(&nodes);

    log::debug!(
        target: "trellis_io",
        "encoded {} nodes, {} strings, {} styles into {} bytes",
        node_count,
        tables.strings.len(),
        tables.styles.len(),
        out.len()
    );
    out
}
