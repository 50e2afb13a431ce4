//! Core value types shared by every stage of the pipeline.

/// A length along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Length {
    /// An absolute size in layout units.
    Fixed(f64),
    /// A percentage of the parent's inner size on the same axis.
    Percent(f64),
    /// Sized from content.
    #[default]
    Auto,
}

impl Length {
    pub const ZERO: Length = Length::Fixed(0.0);

    pub fn px(value: f64) -> Self {
        Length::Fixed(value)
    }

    pub fn percent(value: f64) -> Self {
        Length::Percent(value)
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Length::Auto)
    }

    /// The numeric component, if any.
    pub fn value(&self) -> Option<f64> {
        match *self {
            Length::Fixed(v) | Length::Percent(v) => Some(v),
            Length::Auto => None,
        }
    }

    /// Resolve against an optional reference size.
    ///
    /// Percentages resolve to `None` when the reference is unknown.
    pub fn resolve(&self, reference: Option<f64>) -> Option<f64> {
        match *self {
            Length::Fixed(v) => Some(v),
            Length::Percent(p) => reference.map(|r| r * p / 100.0),
            Length::Auto => None,
        }
    }
}

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => {
                let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|n| n * 17);
                Some(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Look up one of the small set of named colors.
    pub fn from_name(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "red" => Color::rgb(255, 0, 0),
            "green" => Color::rgb(0, 128, 0),
            "blue" => Color::rgb(0, 0, 255),
            "yellow" => Color::rgb(255, 255, 0),
            "gray" | "grey" => Color::rgb(128, 128, 128),
            "transparent" => Color::TRANSPARENT,
            _ => return None,
        };
        Some(color)
    }

    /// Canonical `#rrggbbaa` form.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// Main axis of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Row,
    #[default]
    Column,
}

/// How free space is distributed along the main axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Distribution {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Cross-axis alignment of children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Wrap {
    #[default]
    NoWrap,
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Implements the stable wire tag and kebab-case name for a fieldless enum.
macro_rules! keyword_enum {
    ($ty:ty { $($variant:ident = $tag:literal, $name:literal;)* }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$(<$ty>::$variant),*];

            pub fn tag(self) -> u8 {
                match self {
                    $(<$ty>::$variant => $tag,)*
                }
            }

            pub fn from_tag(tag: u8) -> Option<Self> {
                match tag {
                    $($tag => Some(<$ty>::$variant),)*
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $(<$ty>::$variant => $name,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(<$ty>::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

keyword_enum!(Direction {
    Row = 0, "row";
    Column = 1, "column";
});

keyword_enum!(Distribution {
    Start = 0, "start";
    Center = 1, "center";
    End = 2, "end";
    SpaceBetween = 3, "space-between";
    SpaceAround = 4, "space-around";
    SpaceEvenly = 5, "space-evenly";
});

keyword_enum!(Alignment {
    Start = 0, "start";
    Center = 1, "center";
    End = 2, "end";
    Stretch = 3, "stretch";
});

keyword_enum!(Wrap {
    NoWrap = 0, "nowrap";
    Wrap = 1, "wrap";
});

keyword_enum!(TextAlign {
    Left = 0, "left";
    Center = 1, "center";
    Right = 2, "right";
    Justify = 3, "justify";
});

/// An axis-aligned rectangle in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#ff8000"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(Color::from_hex("#f80"), Some(Color::rgb(255, 136, 0)));
        assert_eq!(Color::from_hex("11223344"), Some(Color::rgba(0x11, 0x22, 0x33, 0x44)));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
    }

    #[test]
    fn test_color_hex_is_canonical() {
        let c = Color::from_name("Red").unwrap();
        assert_eq!(c.to_hex(), "#ff0000ff");
        assert_eq!(Color::from_hex(&c.to_hex()), Some(c));
    }

    #[test]
    fn test_length_resolve() {
        assert_eq!(Length::px(12.0).resolve(None), Some(12.0));
        assert_eq!(Length::percent(50.0).resolve(Some(300.0)), Some(150.0));
        assert_eq!(Length::percent(50.0).resolve(None), None);
        assert_eq!(Length::Auto.resolve(Some(300.0)), None);
    }

    #[test]
    fn test_keyword_tags_round_trip() {
        for d in Distribution::ALL {
            assert_eq!(Distribution::from_tag(d.tag()), Some(*d));
            assert_eq!(Distribution::from_name(d.as_str()), Some(*d));
        }
        assert_eq!(Alignment::from_name("stretch"), Some(Alignment::Stretch));
        assert_eq!(Wrap::from_tag(9), None);
    }

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(10.0, 10.0));
        assert!(r.contains(29.9, 29.9));
        assert!(!r.contains(30.0, 15.0));
        let u = r.union(&Rect::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(u, Rect::new(0.0, 0.0, 30.0, 30.0));
    }
}
