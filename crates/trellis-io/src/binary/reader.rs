//! Binary decoder.
//!
//! Every count in the input is untrusted: nothing is pre-allocated from a
//! count, and each record is bounds-checked as it is read.

use std::collections::{HashMap, HashSet};

use trellis_core::{
    Alignment, Color, Direction, Distribution, FormatError, Length, Node, NodeId, NodeKind, Payload, Property, Rect,
    StyleBlock, StyleValue, TextAlign, ValueKind, Wrap,
};

use super::{FORMAT_VERSION, LENGTH_AUTO, LENGTH_FIXED, LENGTH_PERCENT, MAGIC, NO_STYLE};

struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize, context: &'static str) -> Result<&'a [u8], FormatError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(FormatError::Truncated { offset: self.offset, context })?;
        let bytes = &self.data[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N], FormatError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, context)?);
        Ok(out)
    }

    fn u8(&mut self, context: &'static str) -> Result<u8, FormatError> {
        Ok(self.array::<1>(context)?[0])
    }

    fn u16(&mut self, context: &'static str) -> Result<u16, FormatError> {
        Ok(u16::from_le_bytes(self.array(context)?))
    }

    fn u32(&mut self, context: &'static str) -> Result<u32, FormatError> {
        Ok(u32::from_le_bytes(self.array(context)?))
    }

    fn f64(&mut self, context: &'static str) -> Result<f64, FormatError> {
        Ok(f64::from_le_bytes(self.array(context)?))
    }
}

struct Decoder<'a> {
    cursor: Cursor<'a>,
    strings: Vec<String>,
    styles: Vec<StyleBlock>,
}

impl<'a> Decoder<'a> {
    fn string(&mut self, context: &'static str) -> Result<String, FormatError> {
        let offset = self.cursor.offset;
        let index = self.cursor.u32(context)?;
        self.strings
            .get(index as usize)
            .cloned()
            .ok_or(FormatError::IndexOutOfRange { table: "string", index, len: self.strings.len(), offset })
    }

    fn tag<T>(&mut self, what: &'static str, parse: impl FnOnce(u8) -> Option<T>) -> Result<T, FormatError> {
        let offset = self.cursor.offset;
        let tag = self.cursor.u8(what)?;
        parse(tag).ok_or(FormatError::InvalidTag { what, tag, offset })
    }

    fn read_strings(&mut self, count: u32) -> Result<(), FormatError> {
        for index in 0..count as usize {
            let len = self.cursor.u32("string length")?;
            let bytes = self.cursor.take(len as usize, "string bytes")?;
            let s = std::str::from_utf8(bytes).map_err(|_| FormatError::InvalidUtf8 { index })?;
            self.strings.push(s.to_string());
        }
        Ok(())
    }

    fn read_styles(&mut self, count: u32) -> Result<(), FormatError> {
        for index in 0..count as usize {
            let entries = self.cursor.u16("style entry count")?;
            let mut block = StyleBlock::new();
            for _ in 0..entries {
                let property = self.tag("property", Property::from_tag)?;
                let value = self.style_value(property.kind())?;
                block.set(property, value).map_err(|source| FormatError::InvalidStyle { index, source })?;
            }
            self.styles.push(block);
        }
        Ok(())
    }

    fn style_value(&mut self, kind: ValueKind) -> Result<StyleValue, FormatError> {
        let value = match kind {
            ValueKind::Length => {
                let offset = self.cursor.offset;
                match self.cursor.u8("length subtag")? {
                    LENGTH_FIXED => StyleValue::Length(Length::Fixed(self.cursor.f64("length")?)),
                    LENGTH_PERCENT => StyleValue::Length(Length::Percent(self.cursor.f64("length")?)),
                    LENGTH_AUTO => StyleValue::Length(Length::Auto),
                    tag => return Err(FormatError::InvalidTag { what: "length", tag, offset }),
                }
            }
            ValueKind::Color => {
                let [r, g, b, a] = self.cursor.array::<4>("color")?;
                StyleValue::Color(Color::rgba(r, g, b, a))
            }
            ValueKind::Number => StyleValue::Number(self.cursor.f64("number")?),
            ValueKind::Text => StyleValue::Text(self.string("style text")?),
            ValueKind::Direction => StyleValue::Direction(self.tag("direction", Direction::from_tag)?),
            ValueKind::Distribution => StyleValue::Distribution(self.tag("distribution", Distribution::from_tag)?),
            ValueKind::Alignment => StyleValue::Alignment(self.tag("alignment", Alignment::from_tag)?),
            ValueKind::Wrap => StyleValue::Wrap(self.tag("wrap", Wrap::from_tag)?),
            ValueKind::TextAlign => StyleValue::TextAlign(self.tag("text-align", TextAlign::from_tag)?),
        };
        Ok(value)
    }

    fn payload(&mut self, kind: NodeKind) -> Result<Payload, FormatError> {
        let payload = match kind {
            NodeKind::Container | NodeKind::Row | NodeKind::Column | NodeKind::Center => Payload::None,
            NodeKind::Text | NodeKind::Button => Payload::Text(self.string("label")?),
            NodeKind::Image => Payload::Image {
                source: self.string("image source")?,
                width: self.cursor.f64("image width")?,
                height: self.cursor.f64("image height")?,
            },
            NodeKind::Input => Payload::Input {
                value: self.string("input value")?,
                placeholder: self.string("input placeholder")?,
            },
            NodeKind::Checkbox => {
                let label = self.string("checkbox label")?;
                let checked = self.tag("checkbox state", |t| match t {
                    0 => Some(false),
                    1 => Some(true),
                    _ => None,
                })?;
                Payload::Checkbox { label, checked }
            }
            NodeKind::Slider => Payload::Slider {
                value: self.cursor.f64("slider value")?,
                min: self.cursor.f64("slider min")?,
                max: self.cursor.f64("slider max")?,
            },
        };
        Ok(payload)
    }

    fn rect(&mut self) -> Result<Option<Rect>, FormatError> {
        let present = self.tag("rect flag", |t| match t {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        })?;
        if !present {
            return Ok(None);
        }
        Ok(Some(Rect::new(
            self.cursor.f64("rect")?,
            self.cursor.f64("rect")?,
            self.cursor.f64("rect")?,
            self.cursor.f64("rect")?,
        )))
    }
}

/// A parent still waiting for children.
struct Open {
    node: Node,
    remaining: u32,
}

/// Decode a tree written by [`encode`](super::encode).
pub fn decode(data: &[u8]) -> Result<Node, FormatError> {
    if data.len() < MAGIC.len() || &data[..MAGIC.len()] != MAGIC {
        return Err(FormatError::BadMagic { found: data.iter().take(MAGIC.len()).copied().collect() });
    }

    let mut decoder = Decoder {
        cursor: Cursor { data, offset: MAGIC.len() },
        strings: Vec::new(),
        styles: Vec::new(),
    };

    let major = decoder.cursor.u16("version")?;
    let minor = decoder.cursor.u16("version")?;
    if major != FORMAT_VERSION.0 {
        return Err(FormatError::UnsupportedVersion { major, minor });
    }
    let _flags = decoder.cursor.u16("flags")?;
    let string_count = decoder.cursor.u32("header")?;
    let style_count = decoder.cursor.u32("header")?;
    let node_count = decoder.cursor.u32("header")?;

    decoder.read_strings(string_count)?;
    decoder.read_styles(style_count)?;

    let mut seen = HashSet::new();
    let mut rects = HashMap::new();
    let mut stack: Vec<Open> = Vec::new();
    let mut root = None;

    for index in 0..node_count {
        if root.is_some() {
            return Err(FormatError::DetachedNode { index });
        }

        let kind = decoder.tag("node kind", NodeKind::from_tag)?;
        let id = decoder.cursor.u32("node id")?;
        let children = decoder.cursor.u32("child count")?;
        let style_offset = decoder.cursor.offset;
        let style = decoder.cursor.u32("style index")?;
        let payload = decoder.payload(kind)?;
        let rect = decoder.rect()?;

        if !seen.insert(id) {
            return Err(FormatError::DuplicateId { id });
        }
        let structure = |source| FormatError::InvalidStructure { id, source };

        let mut node = Node::from_parts(kind, NodeId(id), payload).map_err(structure)?;
        if style != NO_STYLE {
            let block = decoder.styles.get(style as usize).cloned().ok_or(FormatError::IndexOutOfRange {
                table: "style",
                index: style,
                len: decoder.styles.len(),
                offset: style_offset,
            })?;
            node.set_style_block(Some(block)).map_err(structure)?;
        }
        if let Some(rect) = rect {
            rects.insert(NodeId(id), rect);
        }

        let mut finished = if children > 0 {
            stack.push(Open { node, remaining: children });
            None
        } else {
            Some(node)
        };

        while let Some(done) = finished.take() {
            match stack.last_mut() {
                None => root = Some(done),
                Some(parent) => {
                    let parent_id = parent.node.id().0;
                    parent
                        .node
                        .append_child(done)
                        .map_err(|source| FormatError::InvalidStructure { id: parent_id, source })?;
                    parent.remaining -= 1;
                    if parent.remaining == 0 {
                        finished = stack.pop().map(|open| open.node);
                    }
                }
            }
        }
    }

    if !stack.is_empty() {
        return Err(FormatError::CountMismatch { open: stack.len() });
    }
    let mut root = root.ok_or(FormatError::EmptyTree)?;

    let trailing = data.len() - decoder.cursor.offset;
    if trailing > 0 {
        return Err(FormatError::TrailingBytes { count: trailing });
    }

    crate::apply_rects(&mut root, &rects);
    log::debug!(target: "trellis_io", "decoded {} nodes from {} bytes", node_count, data.len());
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::encode;
    use trellis_core::Session;

    fn sample() -> Node {
        let mut s = Session::new();
        s.row()
            .with_style(Property::Gap, Length::px(8.0))
            .unwrap()
            .with_children([s.text("a"), s.checkbox("b", true)])
            .unwrap()
    }

    #[test]
    fn test_decodes_encoded_tree() {
        let tree = sample();
        assert_eq!(decode(&encode(&tree)).unwrap(), tree);
    }

    #[test]
    fn test_bad_magic() {
        assert_eq!(decode(b"TRL"), Err(FormatError::BadMagic { found: b"TRL".to_vec() }));
        let mut bytes = encode(&sample());
        bytes[0] = b'X';
        assert!(matches!(decode(&bytes), Err(FormatError::BadMagic { .. })));
    }

    #[test]
    fn test_newer_major_is_rejected() {
        let mut bytes = encode(&sample());
        bytes[4..6].copy_from_slice(&2u16.to_le_bytes());
        assert_eq!(decode(&bytes), Err(FormatError::UnsupportedVersion { major: 2, minor: 0 }));
    }

    #[test]
    fn test_every_truncation_fails() {
        let bytes = encode(&sample());
        for len in 0..bytes.len() {
            assert!(decode(&bytes[..len]).is_err(), "prefix of {len} bytes decoded");
        }
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = encode(&sample());
        bytes.push(0);
        assert_eq!(decode(&bytes), Err(FormatError::TrailingBytes { count: 1 }));
    }

    #[test]
    fn test_huge_counts_do_not_allocate() {
        let mut bytes = encode(&sample());
        bytes[18..22].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(FormatError::Truncated { .. }) | Err(FormatError::DetachedNode { .. })));
    }

    #[test]
    fn test_out_of_range_string() {
        let mut s = Session::new();
        let mut bytes = encode(&s.text("x"));
        // header, then one string: len 1 + "x", then the node record
        let label = super::super::HEADER_LEN + 4 + 1 + 1 + 4 + 4 + 4;
        bytes[label..label + 4].copy_from_slice(&7u32.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(FormatError::IndexOutOfRange { table: "string", index: 7, .. })));
    }

    #[test]
    fn test_leaf_with_children_is_rejected() {
        let mut s = Session::new();
        let mut bytes = encode(&s.column().with_child(s.text("x")).unwrap());
        // the text record is last: kind, id, then child count
        let text_record = bytes.len() - (1 + 4 + 4 + 4 + 4 + 1);
        bytes[text_record + 5..text_record + 9].copy_from_slice(&1u32.to_le_bytes());
        assert!(decode(&bytes).is_err());
    }
}
