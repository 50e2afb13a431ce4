//! Fully resolved styles.

use trellis_core::{
    Alignment, Color, Direction, Distribution, Length, Node, Property, StyleValue, TextAlign, Wrap,
};

/// Per-edge lengths, used for padding and margins.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl Edges {
    pub const ZERO: Edges = Edges::uniform(Length::ZERO);

    pub const fn uniform(value: Length) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    pub const fn symmetric(vertical: Length, horizontal: Length) -> Self {
        Self { top: vertical, right: horizontal, bottom: vertical, left: horizontal }
    }
}

/// Every property of a node, populated.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub width: Length,
    pub height: Length,
    pub min_width: Length,
    pub min_height: Length,
    pub max_width: Length,
    pub max_height: Length,
    pub padding: Edges,
    /// Outer spacing; never inherited.
    pub margin: Edges,
    pub gap: Length,
    pub border_width: Length,
    pub border_radius: Length,
    pub flex_grow: f64,
    pub flex_shrink: f64,
    pub opacity: f64,
    pub direction: Direction,
    pub justify_content: Distribution,
    pub align_items: Alignment,
    pub wrap: Wrap,
    pub background_color: Color,
    pub border_color: Color,
    pub color: Color,
    /// Always an absolute size once resolved.
    pub font_size: f64,
    pub font_weight: f64,
    pub font_family: String,
    pub line_height: f64,
    pub text_align: TextAlign,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self {
            width: Length::Auto,
            height: Length::Auto,
            min_width: Length::Auto,
            min_height: Length::Auto,
            max_width: Length::Auto,
            max_height: Length::Auto,
            padding: Edges::ZERO,
            margin: Edges::ZERO,
            gap: Length::ZERO,
            border_width: Length::ZERO,
            border_radius: Length::ZERO,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            opacity: 1.0,
            direction: Direction::Column,
            justify_content: Distribution::Start,
            align_items: Alignment::Start,
            wrap: Wrap::NoWrap,
            background_color: Color::TRANSPARENT,
            border_color: Color::BLACK,
            color: Color::BLACK,
            font_size: 16.0,
            font_weight: 400.0,
            font_family: "sans-serif".to_string(),
            line_height: 1.2,
            text_align: TextAlign::Left,
        }
    }
}

impl ResolvedStyle {
    /// Read one property back as a style value.
    pub fn get(&self, property: Property) -> StyleValue {
        match property {
            Property::Width => self.width.into(),
            Property::Height => self.height.into(),
            Property::MinWidth => self.min_width.into(),
            Property::MinHeight => self.min_height.into(),
            Property::MaxWidth => self.max_width.into(),
            Property::MaxHeight => self.max_height.into(),
            Property::PaddingTop => self.padding.top.into(),
            Property::PaddingRight => self.padding.right.into(),
            Property::PaddingBottom => self.padding.bottom.into(),
            Property::PaddingLeft => self.padding.left.into(),
            Property::Gap => self.gap.into(),
            Property::BorderWidth => self.border_width.into(),
            Property::BorderRadius => self.border_radius.into(),
            Property::FlexGrow => self.flex_grow.into(),
            Property::FlexShrink => self.flex_shrink.into(),
            Property::Opacity => self.opacity.into(),
            Property::Direction => self.direction.into(),
            Property::JustifyContent => self.justify_content.into(),
            Property::AlignItems => self.align_items.into(),
            Property::Wrap => self.wrap.into(),
            Property::BackgroundColor => self.background_color.into(),
            Property::BorderColor => self.border_color.into(),
            Property::Color => self.color.into(),
            Property::FontSize => Length::Fixed(self.font_size).into(),
            Property::FontWeight => self.font_weight.into(),
            Property::FontFamily => StyleValue::Text(self.font_family.clone()),
            Property::LineHeight => self.line_height.into(),
            Property::TextAlign => self.text_align.into(),
            Property::MarginTop => self.margin.top.into(),
            Property::MarginRight => self.margin.right.into(),
            Property::MarginBottom => self.margin.bottom.into(),
            Property::MarginLeft => self.margin.left.into(),
        }
    }

    /// Store one value. Values of the wrong kind were rejected when the
    /// style block was built, so a mismatch here is ignored.
    pub(crate) fn apply(&mut self, property: Property, value: &StyleValue) {
        match (property, value) {
            (Property::Width, StyleValue::Length(l)) => self.width = *l,
            (Property::Height, StyleValue::Length(l)) => self.height = *l,
            (Property::MinWidth, StyleValue::Length(l)) => self.min_width = *l,
            (Property::MinHeight, StyleValue::Length(l)) => self.min_height = *l,
            (Property::MaxWidth, StyleValue::Length(l)) => self.max_width = *l,
            (Property::MaxHeight, StyleValue::Length(l)) => self.max_height = *l,
            (Property::PaddingTop, StyleValue::Length(l)) => self.padding.top = *l,
            (Property::PaddingRight, StyleValue::Length(l)) => self.padding.right = *l,
            (Property::PaddingBottom, StyleValue::Length(l)) => self.padding.bottom = *l,
            (Property::PaddingLeft, StyleValue::Length(l)) => self.padding.left = *l,
            (Property::Gap, StyleValue::Length(l)) => self.gap = *l,
            (Property::BorderWidth, StyleValue::Length(l)) => self.border_width = *l,
            (Property::BorderRadius, StyleValue::Length(l)) => self.border_radius = *l,
            (Property::FlexGrow, StyleValue::Number(n)) => self.flex_grow = *n,
            (Property::FlexShrink, StyleValue::Number(n)) => self.flex_shrink = *n,
            (Property::Opacity, StyleValue::Number(n)) => self.opacity = *n,
            (Property::Direction, StyleValue::Direction(d)) => self.direction = *d,
            (Property::JustifyContent, StyleValue::Distribution(d)) => self.justify_content = *d,
            (Property::AlignItems, StyleValue::Alignment(a)) => self.align_items = *a,
            (Property::Wrap, StyleValue::Wrap(w)) => self.wrap = *w,
            (Property::BackgroundColor, StyleValue::Color(c)) => self.background_color = *c,
            (Property::BorderColor, StyleValue::Color(c)) => self.border_color = *c,
            (Property::Color, StyleValue::Color(c)) => self.color = *c,
            (Property::FontSize, StyleValue::Length(l)) => {
                // Relative font sizes scale the inherited size; auto keeps it.
                self.font_size = match *l {
                    Length::Fixed(v) => v,
                    Length::Percent(p) => self.font_size * p / 100.0,
                    Length::Auto => self.font_size,
                }
            }
            (Property::FontWeight, StyleValue::Number(n)) => self.font_weight = *n,
            (Property::FontFamily, StyleValue::Text(s)) => self.font_family = s.clone(),
            (Property::LineHeight, StyleValue::Number(n)) => self.line_height = *n,
            (Property::TextAlign, StyleValue::TextAlign(t)) => self.text_align = *t,
            (Property::MarginTop, StyleValue::Length(l)) => self.margin.top = *l,
            (Property::MarginRight, StyleValue::Length(l)) => self.margin.right = *l,
            (Property::MarginBottom, StyleValue::Length(l)) => self.margin.bottom = *l,
            (Property::MarginLeft, StyleValue::Length(l)) => self.margin.left = *l,
            _ => {}
        }
    }

    /// Copy the inheritable properties of `parent`.
    pub(crate) fn inherit_from(&mut self, parent: &ResolvedStyle) {
        self.color = parent.color;
        self.font_size = parent.font_size;
        self.font_weight = parent.font_weight;
        self.font_family.clone_from(&parent.font_family);
        self.line_height = parent.line_height;
        self.text_align = parent.text_align;
    }
}

/// A node paired with its resolved style.
#[derive(Debug, Clone)]
pub struct ResolvedNode<'a> {
    pub node: &'a Node,
    pub style: ResolvedStyle,
    /// Positions of the children in [`ResolvedStyleTree::nodes`], in order.
    pub children: Vec<usize>,
}

/// The output of style resolution.
///
/// Nodes are stored flat in pre-order, so the root is first and every
/// node comes before its descendants.
#[derive(Debug, Clone)]
pub struct ResolvedStyleTree<'a> {
    pub(crate) nodes: Vec<ResolvedNode<'a>>,
}

impl<'a> ResolvedStyleTree<'a> {
    pub fn root(&self) -> &ResolvedNode<'a> {
        &self.nodes[0]
    }

    /// Every node in pre-order.
    pub fn nodes(&self) -> &[ResolvedNode<'a>] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&ResolvedNode<'a>> {
        self.nodes.get(index)
    }

    pub fn children<'t>(&'t self, node: &'t ResolvedNode<'a>) -> impl Iterator<Item = &'t ResolvedNode<'a>> + 't {
        node.children.iter().filter_map(move |&i| self.nodes.get(i))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order traversal.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedNode<'a>> {
        self.nodes.iter()
    }

    pub fn get(&self, id: trellis_core::NodeId) -> Option<&ResolvedStyle> {
        self.iter().find(|n| n.node.id() == id).map(|n| &n.style)
    }
}
