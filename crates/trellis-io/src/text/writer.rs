//! Writer for the text interchange format.

use std::fmt::Write as _;

use trellis_core::{Length, Node, Payload, StyleValue};

use super::lexer::{is_identifier, quote};
use super::{TextOptions, FORMAT_VERSION, HEADER_KEYWORD};

enum Step<'a> {
    Open(&'a Node, usize),
    Close(usize),
}

/// Serialize `root` with a header, optional metadata, and one item per line.
pub fn write_document(root: &Node, options: &TextOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{HEADER_KEYWORD} {}.{}", FORMAT_VERSION.0, FORMAT_VERSION.1);

    if !options.metadata.is_empty() {
        out.push_str("@meta {\n");
        for (key, value) in &options.metadata {
            pad(&mut out, options.indent);
            if is_identifier(key) {
                out.push_str(key);
            } else {
                out.push_str(&quote(key));
            }
            let _ = writeln!(out, ": {};", quote(value));
        }
        out.push_str("}\n");
    }

    let mut stack = vec![Step::Open(root, 0)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Close(depth) => {
                pad(&mut out, depth * options.indent);
                out.push_str("}\n");
            }
            Step::Open(node, depth) => {
                pad(&mut out, depth * options.indent);
                let _ = write!(out, "{} {}", node.kind().name(), node.id());
                if let Some(payload) = payload(node.payload()) {
                    let _ = write!(out, " = {payload}");
                }

                let style = node.style().map(|s| s.canonical()).unwrap_or_default();
                if style.is_empty() && node.computed_rect().is_none() && node.children().is_empty() {
                    out.push_str(";\n");
                    continue;
                }

                out.push_str(" {\n");
                let inner = (depth + 1) * options.indent;
                for (property, value) in style {
                    pad(&mut out, inner);
                    let _ = writeln!(out, "{}: {};", property.name(), style_value(value));
                }
                if let Some(rect) = node.computed_rect() {
                    pad(&mut out, inner);
                    let _ = writeln!(
                        out,
                        "@rect {} {} {} {};",
                        rect.x, rect.y, rect.width, rect.height
                    );
                }

                stack.push(Step::Close(depth));
                stack.extend(node.children().iter().rev().map(|c| Step::Open(c, depth + 1)));
            }
        }
    }
    out
}

fn pad(out: &mut String, width: usize) {
    out.extend(std::iter::repeat(' ').take(width));
}

fn payload(payload: &Payload) -> Option<String> {
    let text = match payload {
        Payload::None => return None,
        Payload::Text(text) => quote(text),
        Payload::Image { source, width, height } => format!("image({}, {width}, {height})", quote(source)),
        Payload::Input { value, placeholder } => format!("input({}, {})", quote(value), quote(placeholder)),
        Payload::Checkbox { label, checked } => format!("checkbox({}, {checked})", quote(label)),
        Payload::Slider { value, min, max } => format!("slider({value}, {min}, {max})"),
    };
    Some(text)
}

// f64's Display is the shortest form that parses back to the same bits.
fn style_value(value: &StyleValue) -> String {
    match value {
        StyleValue::Length(Length::Fixed(v)) => v.to_string(),
        StyleValue::Length(Length::Percent(v)) => format!("{v}%"),
        StyleValue::Length(Length::Auto) => "auto".to_string(),
        StyleValue::Number(v) => v.to_string(),
        StyleValue::Color(c) => c.to_hex(),
        StyleValue::Text(s) => quote(s),
        StyleValue::Direction(d) => d.as_str().to_string(),
        StyleValue::Distribution(d) => d.as_str().to_string(),
        StyleValue::Alignment(a) => a.as_str().to_string(),
        StyleValue::Wrap(w) => w.as_str().to_string(),
        StyleValue::TextAlign(t) => t.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{Color, Property, Rect, Session};

    #[test]
    fn test_leaf_is_single_line() {
        let mut s = Session::new();
        let out = write_document(&s.text("hi"), &TextOptions::default());
        assert_eq!(out, "trellis 1.0\nText #1 = \"hi\";\n");
    }

    #[test]
    fn test_items_are_ordered() {
        let mut s = Session::new();
        let mut row = s.row();
        row.set_style(Property::Gap, Length::px(4.0)).unwrap();
        row.set_style(Property::Width, Length::percent(50.0)).unwrap();
        row.append_child(s.checkbox("ok", false)).unwrap();
        row.set_computed_rect(Some(Rect::new(0.0, 0.5, 10.0, 20.0)));

        let out = write_document(&row, &TextOptions::default().with_indent(4));
        assert_eq!(
            out,
            "trellis 1.0\n\
             Row #1 {\n    \
                 width: 50%;\n    \
                 gap: 4;\n    \
                 @rect 0 0.5 10 20;\n    \
                 Checkbox #2 = checkbox(\"ok\", false);\n\
             }\n"
        );
    }

    #[test]
    fn test_colors_are_canonical() {
        assert_eq!(style_value(&StyleValue::Color(Color::rgb(255, 0, 0))), "#ff0000ff");
        assert_eq!(style_value(&StyleValue::Number(0.1)), "0.1");
    }

    #[test]
    fn test_metadata_block() {
        let mut s = Session::new();
        let options = TextOptions::default().with_metadata("generator", "tests");
        let out = write_document(&s.container(), &options);
        assert!(out.starts_with("trellis 1.0\n@meta {\n  generator: \"tests\";\n}\nContainer #1;"));
    }

    #[test]
    fn test_metadata_keys_survive_reading() {
        let mut s = Session::new();
        let options = TextOptions::default()
            .with_metadata("generator", "tests")
            .with_metadata("a b", "spaced")
            .with_metadata("build.id", "7")
            .with_metadata("", "empty");
        let out = write_document(&s.container(), &options);
        assert!(out.contains("  \"a b\": \"spaced\";\n"));

        let doc = crate::text::parse_document(&out).unwrap();
        assert_eq!(doc.meta, options.metadata);
    }
}
