//! Style properties, values, and per-node style blocks.

use crate::errors::ConstructionError;
use crate::types::{Alignment, Color, Direction, Distribution, Length, TextAlign, Wrap};
use indexmap::IndexMap;

/// The kind of value a property accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Length,
    Color,
    Number,
    Text,
    Direction,
    Distribution,
    Alignment,
    Wrap,
    TextAlign,
}

/// Static description of a property.
#[derive(Debug, Clone, Copy)]
pub struct PropertyInfo {
    pub property: Property,
    pub name: &'static str,
    pub kind: ValueKind,
    pub inherited: bool,
}

/// The closed set of style properties.
///
/// Discriminants are the stable wire tags used by the binary format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[repr(u8)]
pub enum Property {
    Width = 0,
    Height = 1,
    MinWidth = 2,
    MinHeight = 3,
    MaxWidth = 4,
    MaxHeight = 5,
    PaddingTop = 6,
    PaddingRight = 7,
    PaddingBottom = 8,
    PaddingLeft = 9,
    Gap = 10,
    BorderWidth = 11,
    BorderRadius = 12,
    FlexGrow = 13,
    FlexShrink = 14,
    Opacity = 15,
    Direction = 16,
    JustifyContent = 17,
    AlignItems = 18,
    Wrap = 19,
    BackgroundColor = 20,
    BorderColor = 21,
    Color = 22,
    FontSize = 23,
    FontWeight = 24,
    FontFamily = 25,
    LineHeight = 26,
    TextAlign = 27,
    MarginTop = 28,
    MarginRight = 29,
    MarginBottom = 30,
    MarginLeft = 31,
}

const fn info(property: Property, name: &'static str, kind: ValueKind, inherited: bool) -> PropertyInfo {
    PropertyInfo { property, name, kind, inherited }
}

/// Indexed by wire tag.
static PROPERTIES: [PropertyInfo; 32] = [
    info(Property::Width, "width", ValueKind::Length, false),
    info(Property::Height, "height", ValueKind::Length, false),
    info(Property::MinWidth, "minWidth", ValueKind::Length, false),
    info(Property::MinHeight, "minHeight", ValueKind::Length, false),
    info(Property::MaxWidth, "maxWidth", ValueKind::Length, false),
    info(Property::MaxHeight, "maxHeight", ValueKind::Length, false),
    info(Property::PaddingTop, "paddingTop", ValueKind::Length, false),
    info(Property::PaddingRight, "paddingRight", ValueKind::Length, false),
    info(Property::PaddingBottom, "paddingBottom", ValueKind::Length, false),
    info(Property::PaddingLeft, "paddingLeft", ValueKind::Length, false),
    info(Property::Gap, "gap", ValueKind::Length, false),
    info(Property::BorderWidth, "borderWidth", ValueKind::Length, false),
    info(Property::BorderRadius, "borderRadius", ValueKind::Length, false),
    info(Property::FlexGrow, "flexGrow", ValueKind::Number, false),
    info(Property::FlexShrink, "flexShrink", ValueKind::Number, false),
    info(Property::Opacity, "opacity", ValueKind::Number, false),
    info(Property::Direction, "direction", ValueKind::Direction, false),
    info(Property::JustifyContent, "justifyContent", ValueKind::Distribution, false),
    info(Property::AlignItems, "alignItems", ValueKind::Alignment, false),
    info(Property::Wrap, "wrap", ValueKind::Wrap, false),
    info(Property::BackgroundColor, "backgroundColor", ValueKind::Color, false),
    info(Property::BorderColor, "borderColor", ValueKind::Color, false),
    info(Property::Color, "color", ValueKind::Color, true),
    info(Property::FontSize, "fontSize", ValueKind::Length, true),
    info(Property::FontWeight, "fontWeight", ValueKind::Number, true),
    info(Property::FontFamily, "fontFamily", ValueKind::Text, true),
    info(Property::LineHeight, "lineHeight", ValueKind::Number, true),
    info(Property::TextAlign, "textAlign", ValueKind::TextAlign, true),
    info(Property::MarginTop, "marginTop", ValueKind::Length, false),
    info(Property::MarginRight, "marginRight", ValueKind::Length, false),
    info(Property::MarginBottom, "marginBottom", ValueKind::Length, false),
    info(Property::MarginLeft, "marginLeft", ValueKind::Length, false),
];

impl Property {
    /// Every property, in tag order.
    pub fn all() -> impl Iterator<Item = Property> {
        PROPERTIES.iter().map(|p| p.property)
    }

    pub fn info(self) -> &'static PropertyInfo {
        &PROPERTIES[self as usize]
    }

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Property> {
        PROPERTIES.get(tag as usize).map(|p| p.property)
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn from_name(name: &str) -> Option<Property> {
        PROPERTIES.iter().find(|p| p.name == name).map(|p| p.property)
    }

    pub fn kind(self) -> ValueKind {
        self.info().kind
    }

    /// Whether children inherit this property when they do not set it.
    pub fn is_inherited(self) -> bool {
        self.info().inherited
    }
}

/// A single style value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StyleValue {
    Length(Length),
    Color(Color),
    Number(f64),
    Text(String),
    Direction(Direction),
    Distribution(Distribution),
    Alignment(Alignment),
    Wrap(Wrap),
    TextAlign(TextAlign),
}

impl StyleValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            StyleValue::Length(_) => ValueKind::Length,
            StyleValue::Color(_) => ValueKind::Color,
            StyleValue::Number(_) => ValueKind::Number,
            StyleValue::Text(_) => ValueKind::Text,
            StyleValue::Direction(_) => ValueKind::Direction,
            StyleValue::Distribution(_) => ValueKind::Distribution,
            StyleValue::Alignment(_) => ValueKind::Alignment,
            StyleValue::Wrap(_) => ValueKind::Wrap,
            StyleValue::TextAlign(_) => ValueKind::TextAlign,
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            StyleValue::Length(l) => l.value().map_or(true, f64::is_finite),
            StyleValue::Number(n) => n.is_finite(),
            _ => true,
        }
    }

    pub fn as_length(&self) -> Option<Length> {
        match self {
            StyleValue::Length(l) => Some(*l),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            StyleValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            StyleValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StyleValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Check that this value may be stored under `property`.
    pub fn check(&self, property: Property) -> Result<(), ConstructionError> {
        if self.kind() != property.kind() {
            return Err(ConstructionError::ValueMismatch {
                property: property.name(),
                expected: property.kind(),
                found: self.kind(),
            });
        }
        if !self.is_finite() {
            return Err(ConstructionError::NonFiniteValue { property: property.name() });
        }
        Ok(())
    }
}

impl From<Length> for StyleValue {
    fn from(v: Length) -> Self {
        StyleValue::Length(v)
    }
}

impl From<Color> for StyleValue {
    fn from(v: Color) -> Self {
        StyleValue::Color(v)
    }
}

impl From<f64> for StyleValue {
    fn from(v: f64) -> Self {
        StyleValue::Number(v)
    }
}

impl From<&str> for StyleValue {
    fn from(v: &str) -> Self {
        StyleValue::Text(v.to_string())
    }
}

impl From<Direction> for StyleValue {
    fn from(v: Direction) -> Self {
        StyleValue::Direction(v)
    }
}

impl From<Distribution> for StyleValue {
    fn from(v: Distribution) -> Self {
        StyleValue::Distribution(v)
    }
}

impl From<Alignment> for StyleValue {
    fn from(v: Alignment) -> Self {
        StyleValue::Alignment(v)
    }
}

impl From<Wrap> for StyleValue {
    fn from(v: Wrap) -> Self {
        StyleValue::Wrap(v)
    }
}

impl From<TextAlign> for StyleValue {
    fn from(v: TextAlign) -> Self {
        StyleValue::TextAlign(v)
    }
}

/// The explicit style of one node.
///
/// Each property appears at most once. Equality ignores insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StyleBlock {
    entries: IndexMap<Property, StyleValue>,
}

impl StyleBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any earlier value.
    pub fn set(&mut self, property: Property, value: impl Into<StyleValue>) -> Result<(), ConstructionError> {
        let value = value.into();
        value.check(property)?;
        self.entries.insert(property, value);
        Ok(())
    }

    pub fn with(mut self, property: Property, value: impl Into<StyleValue>) -> Result<Self, ConstructionError> {
        self.set(property, value)?;
        Ok(self)
    }

    pub fn get(&self, property: Property) -> Option<&StyleValue> {
        self.entries.get(&property)
    }

    pub fn remove(&mut self, property: Property) -> Option<StyleValue> {
        self.entries.shift_remove(&property)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Property, &StyleValue)> {
        self.entries.iter().map(|(p, v)| (*p, v))
    }

    /// Entries sorted by property tag, the order every writer emits.
    pub fn canonical(&self) -> Vec<(Property, &StyleValue)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by_key(|(p, _)| *p);
        entries
    }

    /// Validate every entry. Used after deserializing from untrusted input.
    pub fn check(&self) -> Result<(), ConstructionError> {
        self.entries.iter().try_for_each(|(p, v)| v.check(*p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_table_is_indexed_by_tag() {
        for (i, p) in Property::all().enumerate() {
            assert_eq!(p.tag() as usize, i);
            assert_eq!(Property::from_name(p.name()), Some(p));
        }
        assert_eq!(Property::from_tag(32), None);
    }

    #[test]
    fn test_only_text_properties_inherit() {
        let inherited: Vec<_> = Property::all().filter(|p| p.is_inherited()).collect();
        assert_eq!(
            inherited,
            vec![
                Property::Color,
                Property::FontSize,
                Property::FontWeight,
                Property::FontFamily,
                Property::LineHeight,
                Property::TextAlign,
            ]
        );
    }

    #[test]
    fn test_set_rejects_wrong_kind() {
        let mut block = StyleBlock::new();
        let err = block.set(Property::Width, Color::BLACK).unwrap_err();
        assert!(matches!(err, ConstructionError::ValueMismatch { property: "width", .. }));
        assert!(block.is_empty());
    }

    #[test]
    fn test_set_rejects_non_finite() {
        let mut block = StyleBlock::new();
        assert!(block.set(Property::FlexGrow, f64::NAN).is_err());
        assert!(block.set(Property::Width, Length::px(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = StyleBlock::new()
            .with(Property::Width, Length::px(10.0))
            .and_then(|b| b.with(Property::Color, Color::WHITE))
            .unwrap();
        let b = StyleBlock::new()
            .with(Property::Color, Color::WHITE)
            .and_then(|b| b.with(Property::Width, Length::px(10.0)))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.canonical(), b.canonical());
        assert_eq!(a.canonical()[0].0, Property::Width);
    }

    #[test]
    fn test_set_replaces() {
        let mut block = StyleBlock::new();
        block.set(Property::Gap, Length::px(4.0)).unwrap();
        block.set(Property::Gap, Length::px(8.0)).unwrap();
        assert_eq!(block.len(), 1);
        assert_eq!(block.get(Property::Gap), Some(&StyleValue::Length(Length::px(8.0))));
    }
}
