//! CSS Values
//!
//! Specified values as a closed sum type. A value is immutable once built and
//! is shared through `Arc`, so pointer identity doubles as "unchanged" for the
//! match-result cache.

use std::sync::Arc;

/// Shared, immutable string (identifiers, custom property names, URLs)
pub type Atom = Arc<str>;

/// A specified CSS value
#[derive(Debug, Clone, PartialEq)]
pub enum CssValue {
    /// Keyword (`auto`, `block`, `flip-block`, `--anchor-name`, ...)
    Ident(Atom),
    Length(Length),
    Number(f32),
    Integer(i32),
    Color(Color),
    CurrentColor,
    Ratio(Ratio),
    Url(Atom),
    Image(Image),
    String(Atom),
    PositionArea(PositionArea),
    /// `var(--name, fallback)`
    Var(VarReference),
    /// `anchor(--name side, fallback)`
    Anchor(AnchorFunction),
    /// `anchor-size(--name dimension, fallback)`
    AnchorSize(AnchorSizeFunction),
    /// Space or comma separated list
    List(Vec<CssValue>),
    CssWide(CssWideKeyword),
}

impl CssValue {
    pub fn ident(name: &str) -> Self {
        Self::Ident(Atom::from(name))
    }

    pub fn px(value: f32) -> Self {
        Self::Length(Length::new(value, LengthUnit::Px))
    }

    pub fn em(value: f32) -> Self {
        Self::Length(Length::new(value, LengthUnit::Em))
    }

    pub fn rem(value: f32) -> Self {
        Self::Length(Length::new(value, LengthUnit::Rem))
    }

    pub fn percent(value: f32) -> Self {
        Self::Length(Length::new(value, LengthUnit::Percent))
    }

    pub fn string(value: &str) -> Self {
        Self::String(Atom::from(value))
    }

    pub fn var(name: &str, fallback: Option<CssValue>) -> Self {
        Self::Var(VarReference {
            name: Atom::from(name),
            fallback: fallback.map(Box::new),
        })
    }

    pub fn anchor(name: Option<&str>, side: AnchorSide, fallback: Option<CssValue>) -> Self {
        Self::Anchor(AnchorFunction {
            name: name.map(Atom::from),
            side,
            fallback: fallback.map(Box::new),
        })
    }

    pub fn anchor_size(name: Option<&str>, dimension: Option<AnchorSizeDimension>, fallback: Option<CssValue>) -> Self {
        Self::AnchorSize(AnchorSizeFunction {
            name: name.map(Atom::from),
            dimension,
            fallback: fallback.map(Box::new),
        })
    }

    pub fn inherit() -> Self {
        Self::CssWide(CssWideKeyword::Inherit)
    }

    pub fn initial() -> Self {
        Self::CssWide(CssWideKeyword::Initial)
    }

    pub fn unset() -> Self {
        Self::CssWide(CssWideKeyword::Unset)
    }

    /// Keyword text, if this is an identifier
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Self::Ident(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_css_wide(&self) -> bool {
        matches!(self, Self::CssWide(_))
    }

    /// Whether the value contains a `var()` reference anywhere
    pub fn has_var(&self) -> bool {
        match self {
            Self::Var(_) => true,
            Self::List(items) => items.iter().any(CssValue::has_var),
            Self::Anchor(f) => f.fallback.as_deref().is_some_and(CssValue::has_var),
            Self::AnchorSize(f) => f.fallback.as_deref().is_some_and(CssValue::has_var),
            _ => false,
        }
    }

    /// Whether the value contains `anchor()` or `anchor-size()`
    pub fn has_anchor_function(&self) -> bool {
        match self {
            Self::Anchor(_) | Self::AnchorSize(_) => true,
            Self::List(items) => items.iter().any(CssValue::has_anchor_function),
            Self::Var(v) => v.fallback.as_deref().is_some_and(CssValue::has_anchor_function),
            _ => false,
        }
    }

    /// A value whose computed form depends only on the property it is applied
    /// to and the parent style: no CSS-wide keyword, `var()` or anchor function.
    pub fn is_context_free(&self) -> bool {
        !self.is_css_wide() && !self.has_var() && !self.has_anchor_function()
    }
}

impl From<Color> for CssValue {
    fn from(color: Color) -> Self {
        Self::Color(color)
    }
}

impl From<Length> for CssValue {
    fn from(length: Length) -> Self {
        Self::Length(length)
    }
}

/// `initial`, `inherit` and `unset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssWideKeyword {
    Initial,
    Inherit,
    Unset,
}

/// Length units understood by the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Px,
    Em,
    Rem,
    Percent,
    Vw,
    Vh,
}

/// Length or percentage with its unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f32,
    pub unit: LengthUnit,
}

impl Length {
    pub const fn new(value: f32, unit: LengthUnit) -> Self {
        Self { value, unit }
    }
}

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Named colors
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "red" => Self::RED,
            "green" => Self::GREEN,
            "blue" => Self::BLUE,
            "yellow" => Self::rgb(255, 255, 0),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "orange" => Self::rgb(255, 165, 0),
            "purple" => Self::rgb(128, 0, 128),
            "transparent" => Self::TRANSPARENT,
            _ => return None,
        })
    }
}

/// `<ratio>` such as `16 / 9`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratio {
    pub numerator: f32,
    pub denominator: f32,
}

impl Ratio {
    pub const fn new(numerator: f32, denominator: f32) -> Self {
        Self { numerator, denominator }
    }

    /// Width over height, `None` for degenerate ratios
    pub fn value(&self) -> Option<f32> {
        (self.numerator > 0.0 && self.denominator > 0.0).then(|| self.numerator / self.denominator)
    }
}

/// Image value
#[derive(Debug, Clone, PartialEq)]
pub enum Image {
    Url(Atom),
    LinearGradient { angle_deg: f32, stops: Vec<Color> },
}

/// `var()` reference
#[derive(Debug, Clone, PartialEq)]
pub struct VarReference {
    pub name: Atom,
    pub fallback: Option<Box<CssValue>>,
}

/// Side argument of `anchor()`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnchorSide {
    Top,
    Right,
    Bottom,
    Left,
    /// Logical start of the axis the property lives on
    Start,
    End,
    Center,
    /// Fraction of the way from the start edge (0.0 to 1.0)
    Percent(f32),
}

impl AnchorSide {
    /// Opposite side along the same axis
    pub fn mirrored(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Start => Self::End,
            Self::End => Self::Start,
            Self::Center => Self::Center,
            Self::Percent(p) => Self::Percent(1.0 - p),
        }
    }

    /// Transpose across the top-left to bottom-right diagonal
    pub fn transposed(self) -> Self {
        match self {
            Self::Top => Self::Left,
            Self::Left => Self::Top,
            Self::Bottom => Self::Right,
            Self::Right => Self::Bottom,
            other => other,
        }
    }
}

/// `anchor()` function
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorFunction {
    /// Anchor name; `None` uses the element's default anchor
    pub name: Option<Atom>,
    pub side: AnchorSide,
    pub fallback: Option<Box<CssValue>>,
}

/// Dimension argument of `anchor-size()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSizeDimension {
    Width,
    Height,
    Block,
    Inline,
}

/// `anchor-size()` function
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorSizeFunction {
    pub name: Option<Atom>,
    /// `None` measures along the axis of the property it is used in
    pub dimension: Option<AnchorSizeDimension>,
    pub fallback: Option<Box<CssValue>>,
}

/// Tracks covered by a `position-area` along one axis.
///
/// The axis is split into three tracks by the anchor's edges:
/// 0 = before the anchor, 1 = the anchor itself, 2 = after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AreaSpan {
    pub start: u8,
    pub end: u8,
}

impl AreaSpan {
    pub const ALL: AreaSpan = AreaSpan { start: 0, end: 3 };

    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    /// Mirror the span across the anchor track
    pub fn flipped(self) -> Self {
        Self { start: 3 - self.end, end: 3 - self.start }
    }
}

/// `position-area` grid selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionArea {
    pub horizontal: AreaSpan,
    pub vertical: AreaSpan,
}

impl PositionArea {
    /// Build from one or two keywords (`top`, `span-left`, `center`, ...).
    /// A single keyword spans the whole other axis.
    pub fn from_keywords(keywords: &[&str]) -> Option<Self> {
        if keywords.is_empty() || keywords.len() > 2 {
            return None;
        }
        let mut horizontal = None;
        let mut vertical = None;
        let mut ambiguous = Vec::new();
        for keyword in keywords {
            match *keyword {
                "top" => vertical = Some(AreaSpan::new(0, 1)),
                "bottom" => vertical = Some(AreaSpan::new(2, 3)),
                "span-top" => vertical = Some(AreaSpan::new(0, 2)),
                "span-bottom" => vertical = Some(AreaSpan::new(1, 3)),
                "left" => horizontal = Some(AreaSpan::new(0, 1)),
                "right" => horizontal = Some(AreaSpan::new(2, 3)),
                "span-left" => horizontal = Some(AreaSpan::new(0, 2)),
                "span-right" => horizontal = Some(AreaSpan::new(1, 3)),
                "center" => ambiguous.push(AreaSpan::new(1, 2)),
                "span-all" => ambiguous.push(AreaSpan::ALL),
                _ => return None,
            }
        }
        for span in ambiguous {
            if vertical.is_none() {
                vertical = Some(span);
            } else if horizontal.is_none() {
                horizontal = Some(span);
            } else {
                return None;
            }
        }
        Some(Self {
            horizontal: horizontal.unwrap_or(AreaSpan::ALL),
            vertical: vertical.unwrap_or(AreaSpan::ALL),
        })
    }

    pub fn flip_block(self) -> Self {
        Self { vertical: self.vertical.flipped(), ..self }
    }

    pub fn flip_inline(self) -> Self {
        Self { horizontal: self.horizontal.flipped(), ..self }
    }

    pub fn flip_start(self) -> Self {
        Self { horizontal: self.vertical, vertical: self.horizontal }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_area_keywords() {
        let area = PositionArea::from_keywords(&["top", "span-right"]).unwrap();
        assert_eq!(area.vertical, AreaSpan::new(0, 1));
        assert_eq!(area.horizontal, AreaSpan::new(1, 3));

        let single = PositionArea::from_keywords(&["bottom"]).unwrap();
        assert_eq!(single.horizontal, AreaSpan::ALL);

        let centered = PositionArea::from_keywords(&["center", "left"]).unwrap();
        assert_eq!(centered.vertical, AreaSpan::new(1, 2));
        assert!(PositionArea::from_keywords(&["top", "bottom", "left"]).is_none());
    }

    #[test]
    fn test_position_area_flips() {
        let area = PositionArea::from_keywords(&["top", "left"]).unwrap();
        assert_eq!(area.flip_block().vertical, AreaSpan::new(2, 3));
        assert_eq!(area.flip_inline().horizontal, AreaSpan::new(2, 3));
        let spanning = PositionArea::from_keywords(&["span-top", "right"]).unwrap();
        assert_eq!(spanning.flip_start().horizontal, AreaSpan::new(0, 2));
    }

    #[test]
    fn test_value_classification() {
        assert!(CssValue::px(4.0).is_context_free());
        assert!(!CssValue::inherit().is_context_free());
        assert!(!CssValue::var("--x", None).is_context_free());
        let anchored = CssValue::anchor(Some("--a"), AnchorSide::Top, Some(CssValue::var("--gap", None)));
        assert!(anchored.has_anchor_function());
        assert!(anchored.has_var());
    }

    #[test]
    fn test_anchor_side_flips() {
        assert_eq!(AnchorSide::Top.mirrored(), AnchorSide::Bottom);
        assert_eq!(AnchorSide::Start.mirrored(), AnchorSide::End);
        assert_eq!(AnchorSide::Percent(0.25).mirrored(), AnchorSide::Percent(0.75));
        assert_eq!(AnchorSide::Bottom.transposed(), AnchorSide::Right);
        assert_eq!(AnchorSide::Center.transposed(), AnchorSide::Center);
        assert_eq!(Color::from_name("Green"), Some(Color::GREEN));
    }
}
