//! CSS Property Definitions
//!
//! Longhand identifiers with their cascade metadata: priority tier,
//! inheritance, and fast-path inheritability.

use crate::values::Atom;
use fos_dom::PhysicalAxis;

/// Longhand property identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LonghandId {
    // Top priority: affect how every other property resolves
    WritingMode,
    Direction,
    Zoom,

    // High priority: font-affecting
    FontFamily,
    FontSize,
    FontStyle,
    FontWeight,
    LineHeight,

    // Inherited
    Color,
    Visibility,
    WhiteSpace,
    TextAlign,

    // Box
    Display,
    Position,
    Float,
    ColumnSpan,
    Width,
    Height,
    MinWidth,
    MinHeight,
    MaxWidth,
    MaxHeight,
    AspectRatio,
    Opacity,
    ZIndex,

    // Surround
    MarginTop,
    MarginRight,
    MarginBottom,
    MarginLeft,
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    PaddingLeft,
    BorderTopWidth,
    BorderRightWidth,
    BorderBottomWidth,
    BorderLeftWidth,
    Top,
    Right,
    Bottom,
    Left,

    // Rare
    BackgroundColor,
    BackgroundImage,
    Content,
    ContainerType,
    ContainerName,
    AnchorName,
    PositionAnchor,
    PositionArea,
    PositionTryFallbacks,
    PositionTryOrder,
    PositionVisibility,
    JustifySelf,
    AlignSelf,
    GridColumnStart,
    GridColumnEnd,
    GridRowStart,
    GridRowEnd,
    GridTemplateColumns,
    GridTemplateRows,
}

/// Cascade application tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyPriority {
    Top,
    High,
    Normal,
}

impl LonghandId {
    pub const COUNT: usize = LonghandId::GridTemplateRows as usize + 1;

    /// Every longhand in application order
    pub const ALL: [LonghandId; LonghandId::COUNT] = {
        use LonghandId::*;
        [
            WritingMode, Direction, Zoom,
            FontFamily, FontSize, FontStyle, FontWeight, LineHeight,
            Color, Visibility, WhiteSpace, TextAlign,
            Display, Position, Float, ColumnSpan, Width, Height, MinWidth, MinHeight, MaxWidth, MaxHeight,
            AspectRatio, Opacity, ZIndex,
            MarginTop, MarginRight, MarginBottom, MarginLeft,
            PaddingTop, PaddingRight, PaddingBottom, PaddingLeft,
            BorderTopWidth, BorderRightWidth, BorderBottomWidth, BorderLeftWidth,
            Top, Right, Bottom, Left,
            BackgroundColor, BackgroundImage, Content, ContainerType, ContainerName,
            AnchorName, PositionAnchor, PositionArea, PositionTryFallbacks, PositionTryOrder, PositionVisibility,
            JustifySelf, AlignSelf,
            GridColumnStart, GridColumnEnd, GridRowStart, GridRowEnd, GridTemplateColumns, GridTemplateRows,
        ]
    };

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn priority(self) -> PropertyPriority {
        use LonghandId::*;
        match self {
            WritingMode | Direction | Zoom => PropertyPriority::Top,
            FontFamily | FontSize | FontStyle | FontWeight | LineHeight => PropertyPriority::High,
            _ => PropertyPriority::Normal,
        }
    }

    pub fn is_inherited(self) -> bool {
        use LonghandId::*;
        matches!(
            self,
            WritingMode | Direction | FontFamily | FontSize | FontStyle | FontWeight | LineHeight
                | Color | Visibility | WhiteSpace | TextAlign
        )
    }

    /// Inherited properties that can be copied straight from the parent
    /// without running the cascade for the child.
    pub fn is_fast_path_inheritable(self) -> bool {
        use LonghandId::*;
        matches!(self, Color | Visibility | WhiteSpace | TextAlign)
    }

    /// Properties accepted inside `@position-try` blocks
    pub fn is_allowed_in_position_try(self) -> bool {
        use LonghandId::*;
        matches!(
            self,
            Top | Right | Bottom | Left
                | MarginTop | MarginRight | MarginBottom | MarginLeft
                | Width | Height | MinWidth | MinHeight | MaxWidth | MaxHeight
                | JustifySelf | AlignSelf | PositionAnchor | PositionArea
        )
    }

    /// Physical axis of a box-geometry property, if it has one
    pub fn physical_axis(self) -> Option<PhysicalAxis> {
        use LonghandId::*;
        match self {
            Top | Bottom | Height | MinHeight | MaxHeight | MarginTop | MarginBottom | PaddingTop
            | PaddingBottom | BorderTopWidth | BorderBottomWidth | AlignSelf => Some(PhysicalAxis::Vertical),
            Left | Right | Width | MinWidth | MaxWidth | MarginLeft | MarginRight | PaddingLeft
            | PaddingRight | BorderLeftWidth | BorderRightWidth | JustifySelf => Some(PhysicalAxis::Horizontal),
            _ => None,
        }
    }

    /// Counterpart under the `flip-block` tactic
    pub fn flip_block(self) -> Self {
        use LonghandId::*;
        match self {
            Top => Bottom,
            Bottom => Top,
            MarginTop => MarginBottom,
            MarginBottom => MarginTop,
            other => other,
        }
    }

    /// Counterpart under the `flip-inline` tactic
    pub fn flip_inline(self) -> Self {
        use LonghandId::*;
        match self {
            Left => Right,
            Right => Left,
            MarginLeft => MarginRight,
            MarginRight => MarginLeft,
            other => other,
        }
    }

    /// Counterpart under the `flip-start` tactic (axis transpose)
    pub fn flip_start(self) -> Self {
        use LonghandId::*;
        match self {
            Top => Left,
            Left => Top,
            Bottom => Right,
            Right => Bottom,
            MarginTop => MarginLeft,
            MarginLeft => MarginTop,
            MarginBottom => MarginRight,
            MarginRight => MarginBottom,
            Width => Height,
            Height => Width,
            MinWidth => MinHeight,
            MinHeight => MinWidth,
            MaxWidth => MaxHeight,
            MaxHeight => MaxWidth,
            JustifySelf => AlignSelf,
            AlignSelf => JustifySelf,
            other => other,
        }
    }

    pub fn name(self) -> &'static str {
        use LonghandId::*;
        match self {
            WritingMode => "writing-mode",
            Direction => "direction",
            Zoom => "zoom",
            FontFamily => "font-family",
            FontSize => "font-size",
            FontStyle => "font-style",
            FontWeight => "font-weight",
            LineHeight => "line-height",
            Color => "color",
            Visibility => "visibility",
            WhiteSpace => "white-space",
            TextAlign => "text-align",
            Display => "display",
            Position => "position",
            Float => "float",
            ColumnSpan => "column-span",
            Width => "width",
            Height => "height",
            MinWidth => "min-width",
            MinHeight => "min-height",
            MaxWidth => "max-width",
            MaxHeight => "max-height",
            AspectRatio => "aspect-ratio",
            Opacity => "opacity",
            ZIndex => "z-index",
            MarginTop => "margin-top",
            MarginRight => "margin-right",
            MarginBottom => "margin-bottom",
            MarginLeft => "margin-left",
            PaddingTop => "padding-top",
            PaddingRight => "padding-right",
            PaddingBottom => "padding-bottom",
            PaddingLeft => "padding-left",
            BorderTopWidth => "border-top-width",
            BorderRightWidth => "border-right-width",
            BorderBottomWidth => "border-bottom-width",
            BorderLeftWidth => "border-left-width",
            Top => "top",
            Right => "right",
            Bottom => "bottom",
            Left => "left",
            BackgroundColor => "background-color",
            BackgroundImage => "background-image",
            Content => "content",
            ContainerType => "container-type",
            ContainerName => "container-name",
            AnchorName => "anchor-name",
            PositionAnchor => "position-anchor",
            PositionArea => "position-area",
            PositionTryFallbacks => "position-try-fallbacks",
            PositionTryOrder => "position-try-order",
            PositionVisibility => "position-visibility",
            JustifySelf => "justify-self",
            AlignSelf => "align-self",
            GridColumnStart => "grid-column-start",
            GridColumnEnd => "grid-column-end",
            GridRowStart => "grid-row-start",
            GridRowEnd => "grid-row-end",
            GridTemplateColumns => "grid-template-columns",
            GridTemplateRows => "grid-template-rows",
        }
    }

    /// Look up a longhand by its CSS name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.name() == name)
    }
}

/// Any property a declaration can target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyId {
    Longhand(LonghandId),
    /// Custom property (`--name`)
    Custom(Atom),
}

impl PropertyId {
    pub fn custom(name: &str) -> Self {
        Self::Custom(Atom::from(name))
    }

    pub fn as_longhand(&self) -> Option<LonghandId> {
        match self {
            Self::Longhand(id) => Some(*id),
            Self::Custom(_) => None,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Custom properties are resolved in the top tier since any other
    /// property may reference them through `var()`.
    pub fn priority(&self) -> PropertyPriority {
        match self {
            Self::Longhand(id) => id.priority(),
            Self::Custom(_) => PropertyPriority::Top,
        }
    }
}

impl From<LonghandId> for PropertyId {
    fn from(id: LonghandId) -> Self {
        Self::Longhand(id)
    }
}

impl std::fmt::Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Longhand(id) => f.write_str(id.name()),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// Fixed-size bit set of longhands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LonghandIdSet {
    bits: [u64; 2],
}

impl LonghandIdSet {
    pub const fn new() -> Self {
        Self { bits: [0; 2] }
    }

    /// Every longhand in the given tier
    pub fn with_priority(priority: PropertyPriority) -> Self {
        LonghandId::ALL.iter().copied().filter(|id| id.priority() == priority).collect()
    }

    #[inline]
    pub fn insert(&mut self, id: LonghandId) {
        let i = id.index();
        self.bits[i / 64] |= 1 << (i % 64);
    }

    #[inline]
    pub fn remove(&mut self, id: LonghandId) {
        let i = id.index();
        self.bits[i / 64] &= !(1 << (i % 64));
    }

    #[inline]
    pub fn contains(&self, id: LonghandId) -> bool {
        let i = id.index();
        self.bits[i / 64] & (1 << (i % 64)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|b| *b == 0)
    }

    pub fn len(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    pub fn union(&self, other: &Self) -> Self {
        Self { bits: [self.bits[0] | other.bits[0], self.bits[1] | other.bits[1]] }
    }

    /// Members in application order
    pub fn iter(&self) -> impl Iterator<Item = LonghandId> + '_ {
        LonghandId::ALL.iter().copied().filter(|id| self.contains(*id))
    }
}

impl FromIterator<LonghandId> for LonghandIdSet {
    fn from_iter<I: IntoIterator<Item = LonghandId>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_discriminant_order() {
        for (i, id) in LonghandId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i, "{} out of order", id.name());
        }
        assert!(LonghandId::COUNT <= 128);
    }

    #[test]
    fn test_priorities() {
        assert_eq!(LonghandId::Zoom.priority(), PropertyPriority::Top);
        assert_eq!(LonghandId::LineHeight.priority(), PropertyPriority::High);
        assert_eq!(LonghandId::Color.priority(), PropertyPriority::Normal);
        assert_eq!(PropertyId::custom("--x").priority(), PropertyPriority::Top);
        assert!(LonghandId::Color.is_fast_path_inheritable());
        assert!(!LonghandId::FontSize.is_fast_path_inheritable());
    }

    #[test]
    fn test_id_set() {
        let mut set = LonghandIdSet::new();
        set.insert(LonghandId::Top);
        set.insert(LonghandId::GridTemplateRows);
        assert!(set.contains(LonghandId::GridTemplateRows));
        assert_eq!(set.len(), 2);
        set.remove(LonghandId::Top);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![LonghandId::GridTemplateRows]);
        assert_eq!(LonghandIdSet::with_priority(PropertyPriority::High).len(), 5);
    }

    #[test]
    fn test_tactic_mappings() {
        assert_eq!(LonghandId::Top.flip_block(), LonghandId::Bottom);
        assert_eq!(LonghandId::Top.flip_inline(), LonghandId::Top);
        assert_eq!(LonghandId::Width.flip_start(), LonghandId::Height);
        assert_eq!(LonghandId::from_name("margin-left"), Some(LonghandId::MarginLeft));
    }
}
