//! Parser for the text interchange format.
//!
//! Nesting is tracked with an explicit stack, so deeply nested documents
//! cannot overflow the call stack.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use trellis_core::{
    Alignment, Color, ConstructionError, Direction, Distribution, Length, Node, NodeId, NodeKind, ParseError,
    Payload, Property, Rect, StyleValue, TextAlign, ValueKind, Wrap,
};

use super::lexer::{tokenize, Tok, Token};
use super::{TextDocument, FORMAT_VERSION, HEADER_KEYWORD};

/// Parse a complete document.
pub fn parse_document(input: &str) -> Result<TextDocument, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0, seen: HashSet::new(), rects: HashMap::new() };

    parser.header()?;
    let meta = parser.meta()?;
    let mut root = parser.tree()?;
    if let Some(token) = parser.peek() {
        return Err(unexpected(token, "end of input"));
    }
    crate::apply_rects(&mut root, &parser.rects);

    log::debug!(target: "trellis_io", "parsed text document with {} nodes", parser.seen.len());
    Ok(TextDocument { meta, root })
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    seen: HashSet<NodeId>,
    /// Rects are applied once the tree is complete; attaching a child
    /// clears its rect and the parent's.
    rects: HashMap<NodeId, Rect>,
}

/// A node whose block is still open.
struct Open {
    node: Node,
    line: u32,
    column: u32,
}

fn unexpected(token: &Token<'_>, expected: &str) -> ParseError {
    ParseError::UnexpectedToken {
        found: token.tok.describe(),
        expected: expected.to_string(),
        line: token.line,
        column: token.column,
    }
}

fn structure(source: ConstructionError, line: u32, column: u32) -> ParseError {
    ParseError::InvalidStructure { source, line, column }
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token<'a>> {
        self.tokens.get(self.pos + offset)
    }

    fn next(&mut self) -> Result<Token<'a>, ParseError> {
        let token = self.tokens.get(self.pos).cloned().ok_or(ParseError::UnexpectedEof)?;
        self.pos += 1;
        Ok(token)
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<Token<'a>, ParseError> {
        let token = self.next()?;
        if token.tok != Tok::Symbol(symbol) {
            return Err(unexpected(&token, &format!("'{symbol}'")));
        }
        Ok(token)
    }

    fn eat_symbol(&mut self, symbol: char) -> bool {
        if self.peek().map(|t| &t.tok) == Some(&Tok::Symbol(symbol)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// `trellis <major>.<minor>`
    fn header(&mut self) -> Result<(), ParseError> {
        let token = self.next()?;
        if token.tok != Tok::Ident(HEADER_KEYWORD) {
            return Err(ParseError::InvalidHeader {
                found: token.tok.describe(),
                line: token.line,
                column: token.column,
            });
        }
        let version = self.next()?;
        let invalid = || ParseError::InvalidHeader {
            found: version.tok.describe(),
            line: version.line,
            column: version.column,
        };
        let Tok::Number(text) = version.tok else {
            return Err(invalid());
        };
        let (major, minor) = text.split_once('.').ok_or_else(invalid)?;
        let major: u16 = major.parse().map_err(|_| invalid())?;
        let minor: u16 = minor.parse().map_err(|_| invalid())?;
        if major != FORMAT_VERSION.0 {
            return Err(ParseError::UnsupportedVersion {
                major,
                minor,
                line: version.line,
                column: version.column,
            });
        }
        Ok(())
    }

    /// Optional `@meta { key: "value"; ... }`.
    fn meta(&mut self) -> Result<IndexMap<String, String>, ParseError> {
        let mut meta = IndexMap::new();
        if self.peek().map(|t| &t.tok) != Some(&Tok::At("meta")) {
            return Ok(meta);
        }
        let open = self.next()?;
        self.expect_symbol('{')?;
        loop {
            let token = self.next().map_err(|_| ParseError::UnterminatedBlock {
                line: open.line,
                column: open.column,
            })?;
            // Keys that are not identifiers are written quoted.
            let key = match token.tok {
                Tok::Symbol('}') => break,
                Tok::Ident(key) => key.to_string(),
                Tok::Str(key) => key,
                _ => return Err(unexpected(&token, "a metadata key or '}'")),
            };
            self.expect_symbol(':')?;
            let value = self.next()?;
            let Tok::Str(value) = value.tok else {
                return Err(unexpected(&value, "a string"));
            };
            self.expect_symbol(';')?;
            meta.insert(key, value);
        }
        Ok(meta)
    }

    /// The root node and everything below it.
    fn tree(&mut self) -> Result<Node, ParseError> {
        let mut stack: Vec<Open> = Vec::new();
        loop {
            let (open, has_block) = self.node_head()?;
            let mut finished = if has_block {
                stack.push(open);
                None
            } else {
                Some(open)
            };

            // Consume items of the innermost open block until a nested node
            // starts or the root closes.
            loop {
                if let Some(done) = finished.take() {
                    match stack.last_mut() {
                        None => return Ok(done.node),
                        Some(parent) => {
                            parent
                                .node
                                .append_child(done.node)
                                .map_err(|e| structure(e, done.line, done.column))?;
                        }
                    }
                }

                let Some(top) = stack.last() else {
                    return Err(ParseError::UnexpectedEof);
                };
                let Some(token) = self.peek().cloned() else {
                    return Err(ParseError::UnterminatedBlock { line: top.line, column: top.column });
                };

                match &token.tok {
                    Tok::Symbol('}') => {
                        self.pos += 1;
                        finished = stack.pop();
                    }
                    Tok::At("rect") => {
                        self.pos += 1;
                        let rect = self.rect()?;
                        let id = top.node.id();
                        self.rects.insert(id, rect);
                    }
                    Tok::Ident(name) if self.peek_at(1).map(|t| &t.tok) == Some(&Tok::Symbol(':')) => {
                        self.pos += 2;
                        let property = Property::from_name(name).ok_or_else(|| ParseError::UnknownProperty {
                            name: name.to_string(),
                            line: token.line,
                            column: token.column,
                        })?;
                        let value = self.value(property)?;
                        self.expect_symbol(';')?;
                        if let Some(top) = stack.last_mut() {
                            top.node.set_style(property, value).map_err(|_| ParseError::InvalidValue {
                                property: property.name().to_string(),
                                value: "non-finite number".to_string(),
                                line: token.line,
                                column: token.column,
                            })?;
                        }
                    }
                    Tok::Ident(_) => break,
                    _ => return Err(unexpected(&token, "a property, node, or '}'")),
                }
            }
        }
    }

    /// `<Kind> #<id> [= payload]` followed by `;` or `{`.
    fn node_head(&mut self) -> Result<(Open, bool), ParseError> {
        let token = self.next()?;
        let Tok::Ident(name) = token.tok else {
            return Err(unexpected(&token, "a node kind"));
        };
        let kind = NodeKind::from_name(name).ok_or_else(|| ParseError::UnknownNodeKind {
            name: name.to_string(),
            line: token.line,
            column: token.column,
        })?;

        let id_token = self.next()?;
        let id = match &id_token.tok {
            Tok::Hash(digits) => digits.parse::<u32>().map(NodeId).map_err(|_| unexpected(&id_token, "a node id"))?,
            _ => return Err(unexpected(&id_token, "a node id")),
        };
        if !self.seen.insert(id) {
            return Err(ParseError::DuplicateId { id: id.0, line: id_token.line, column: id_token.column });
        }

        let payload = if self.eat_symbol('=') {
            self.payload(kind)?
        } else {
            kind.default_payload()
        };
        let node = Node::from_parts(kind, id, payload).map_err(|e| structure(e, token.line, token.column))?;
        let open = Open { node, line: token.line, column: token.column };

        let end = self.next()?;
        match end.tok {
            Tok::Symbol(';') => Ok((open, false)),
            Tok::Symbol('{') => Ok((open, true)),
            _ => Err(unexpected(&end, "';' or '{'")),
        }
    }

    fn payload(&mut self, kind: NodeKind) -> Result<Payload, ParseError> {
        let token = self.next()?;
        match (&token.tok, kind) {
            (Tok::Str(text), NodeKind::Text | NodeKind::Button) => Ok(Payload::Text(text.clone())),
            (Tok::Ident("image"), NodeKind::Image) => {
                self.expect_symbol('(')?;
                let source = self.string()?;
                self.expect_symbol(',')?;
                let width = self.number()?;
                self.expect_symbol(',')?;
                let height = self.number()?;
                self.expect_symbol(')')?;
                Ok(Payload::Image { source, width, height })
            }
            (Tok::Ident("input"), NodeKind::Input) => {
                self.expect_symbol('(')?;
                let value = self.string()?;
                self.expect_symbol(',')?;
                let placeholder = self.string()?;
                self.expect_symbol(')')?;
                Ok(Payload::Input { value, placeholder })
            }
            (Tok::Ident("checkbox"), NodeKind::Checkbox) => {
                self.expect_symbol('(')?;
                let label = self.string()?;
                self.expect_symbol(',')?;
                let flag = self.next()?;
                let checked = match flag.tok {
                    Tok::Ident("true") => true,
                    Tok::Ident("false") => false,
                    _ => return Err(unexpected(&flag, "true or false")),
                };
                self.expect_symbol(')')?;
                Ok(Payload::Checkbox { label, checked })
            }
            (Tok::Ident("slider"), NodeKind::Slider) => {
                self.expect_symbol('(')?;
                let value = self.number()?;
                self.expect_symbol(',')?;
                let min = self.number()?;
                self.expect_symbol(',')?;
                let max = self.number()?;
                self.expect_symbol(')')?;
                Ok(Payload::Slider { value, min, max })
            }
            _ => Err(unexpected(&token, &format!("a payload for {}", kind.name()))),
        }
    }

    fn string(&mut self) -> Result<String, ParseError> {
        let token = self.next()?;
        match token.tok {
            Tok::Str(s) => Ok(s),
            _ => Err(unexpected(&token, "a string")),
        }
    }

    fn number(&mut self) -> Result<f64, ParseError> {
        let token = self.next()?;
        let text = match token.tok {
            Tok::Number(text) => text,
            Tok::Ident(text @ ("inf" | "NaN")) => text,
            _ => return Err(unexpected(&token, "a number")),
        };
        text.parse::<f64>().map_err(|_| unexpected(&token, "a number"))
    }

    /// `x y width height;`
    fn rect(&mut self) -> Result<Rect, ParseError> {
        let x = self.number()?;
        let y = self.number()?;
        let width = self.number()?;
        let height = self.number()?;
        self.expect_symbol(';')?;
        Ok(Rect::new(x, y, width, height))
    }

    fn value(&mut self, property: Property) -> Result<StyleValue, ParseError> {
        let token = self.next()?;
        let invalid = || ParseError::InvalidValue {
            property: property.name().to_string(),
            value: token.tok.describe(),
            line: token.line,
            column: token.column,
        };

        let value = match (property.kind(), &token.tok) {
            (ValueKind::Length, Tok::Ident("auto")) => StyleValue::Length(Length::Auto),
            (ValueKind::Length, Tok::Number(text)) => {
                let v: f64 = text.parse().map_err(|_| invalid())?;
                if self.eat_symbol('%') {
                    StyleValue::Length(Length::Percent(v))
                } else {
                    StyleValue::Length(Length::Fixed(v))
                }
            }
            (ValueKind::Number, Tok::Number(text)) => StyleValue::Number(text.parse().map_err(|_| invalid())?),
            (ValueKind::Color, Tok::Hash(hex)) => StyleValue::Color(Color::from_hex(hex).ok_or_else(invalid)?),
            (ValueKind::Color, Tok::Ident(name)) => StyleValue::Color(Color::from_name(name).ok_or_else(invalid)?),
            (ValueKind::Text, Tok::Str(s)) => StyleValue::Text(s.clone()),
            (ValueKind::Direction, Tok::Ident(name)) => StyleValue::Direction(Direction::from_name(name).ok_or_else(invalid)?),
            (ValueKind::Distribution, Tok::Ident(name)) => {
                StyleValue::Distribution(Distribution::from_name(name).ok_or_else(invalid)?)
            }
            (ValueKind::Alignment, Tok::Ident(name)) => StyleValue::Alignment(Alignment::from_name(name).ok_or_else(invalid)?),
            (ValueKind::Wrap, Tok::Ident(name)) => StyleValue::Wrap(Wrap::from_name(name).ok_or_else(invalid)?),
            (ValueKind::TextAlign, Tok::Ident(name)) => StyleValue::TextAlign(TextAlign::from_name(name).ok_or_else(invalid)?),
            _ => return Err(invalid()),
        };
        Ok(value)
    }
}
