//! Computed Styles
//!
//! The final computed values for an element or pseudo-element after cascade.
//! Properties live in shared sub-records (`Arc`) so that copying a style is
//! cheap and only the records a declaration touches get cloned on write.

use std::sync::{Arc, LazyLock};

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::values::{Atom, Color, CssValue, Image, PositionArea};
use fos_dom::{BoxSide, LogicalAxis, PhysicalAxis};

macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident = $kw:literal),+ $(,)? }
        default = $default:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl $name {
            pub fn from_ident(ident: &str) -> Option<Self> {
                match ident {
                    $($kw => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $kw),+
                }
            }
        }
    };
}

keyword_enum! {
    /// `display`
    pub enum Display {
        None = "none",
        Block = "block",
        Inline = "inline",
        InlineBlock = "inline-block",
        Flex = "flex",
        Grid = "grid",
        ListItem = "list-item",
        Contents = "contents",
    }
    default = Inline;
}

impl Display {
    pub fn is_block_level(self) -> bool {
        matches!(self, Self::Block | Self::Flex | Self::Grid | Self::ListItem)
    }

    /// Block-level equivalent used for floats, positioned boxes and the root
    pub fn blockified(self) -> Self {
        match self {
            Self::Inline | Self::InlineBlock => Self::Block,
            other => other,
        }
    }
}

keyword_enum! {
    /// `position`
    pub enum Position {
        Static = "static",
        Relative = "relative",
        Absolute = "absolute",
        Fixed = "fixed",
    }
    default = Static;
}

impl Position {
    pub fn is_out_of_flow(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }

    /// Whether the box establishes a containing block for absolute descendants
    pub fn is_positioned(self) -> bool {
        self != Self::Static
    }
}

keyword_enum! {
    /// `float`
    pub enum Float {
        None = "none",
        Left = "left",
        Right = "right",
    }
    default = None;
}

keyword_enum! {
    /// `column-span`
    pub enum ColumnSpan {
        None = "none",
        All = "all",
    }
    default = None;
}

keyword_enum! {
    /// `writing-mode`
    pub enum WritingMode {
        HorizontalTb = "horizontal-tb",
        VerticalRl = "vertical-rl",
        VerticalLr = "vertical-lr",
    }
    default = HorizontalTb;
}

impl WritingMode {
    pub fn is_horizontal(self) -> bool {
        self == Self::HorizontalTb
    }

    /// Physical axis a logical axis maps to
    pub fn physical_axis(self, axis: LogicalAxis) -> PhysicalAxis {
        match (self.is_horizontal(), axis) {
            (true, LogicalAxis::Inline) | (false, LogicalAxis::Block) => PhysicalAxis::Horizontal,
            (true, LogicalAxis::Block) | (false, LogicalAxis::Inline) => PhysicalAxis::Vertical,
        }
    }

    /// Whether the block axis runs right-to-left
    pub fn is_block_flipped(self) -> bool {
        self == Self::VerticalRl
    }
}

keyword_enum! {
    /// `direction`
    pub enum Direction {
        Ltr = "ltr",
        Rtl = "rtl",
    }
    default = Ltr;
}

keyword_enum! {
    /// `font-style`
    pub enum FontStyle {
        Normal = "normal",
        Italic = "italic",
        Oblique = "oblique",
    }
    default = Normal;
}

keyword_enum! {
    /// `visibility`
    pub enum Visibility {
        Visible = "visible",
        Hidden = "hidden",
        Collapse = "collapse",
    }
    default = Visible;
}

keyword_enum! {
    /// `white-space`
    pub enum WhiteSpace {
        Normal = "normal",
        Pre = "pre",
        Nowrap = "nowrap",
        PreWrap = "pre-wrap",
        PreLine = "pre-line",
    }
    default = Normal;
}

keyword_enum! {
    /// `text-align`
    pub enum TextAlign {
        Start = "start",
        End = "end",
        Left = "left",
        Right = "right",
        Center = "center",
        Justify = "justify",
    }
    default = Start;
}

keyword_enum! {
    /// `container-type`
    pub enum ContainerType {
        Normal = "normal",
        Size = "size",
        InlineSize = "inline-size",
    }
    default = Normal;
}

keyword_enum! {
    /// `position-try-order`
    pub enum PositionTryOrder {
        Normal = "normal",
        MostWidth = "most-width",
        MostHeight = "most-height",
        MostBlockSize = "most-block-size",
        MostInlineSize = "most-inline-size",
    }
    default = Normal;
}

keyword_enum! {
    /// Transformation applied to a position-try fallback
    pub enum TryTactic {
        FlipBlock = "flip-block",
        FlipInline = "flip-inline",
        FlipStart = "flip-start",
    }
    default = FlipBlock;
}

bitflags! {
    /// `position-visibility`; the empty set is `always`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PositionVisibility: u8 {
        /// Hide the box when its default anchor is invisible
        const ANCHORS_VISIBLE = 1 << 0;
        /// Hide the box when it overflows its inset-modified containing block
        const NO_OVERFLOW = 1 << 1;
    }
}

impl Default for PositionVisibility {
    fn default() -> Self {
        Self::ANCHORS_VISIBLE
    }
}

keyword_enum! {
    /// Self-alignment position (`justify-self` / `align-self`)
    pub enum ItemPosition {
        Auto = "auto",
        Normal = "normal",
        Start = "start",
        End = "end",
        Center = "center",
        Stretch = "stretch",
        AnchorCenter = "anchor-center",
    }
    default = Auto;
}

impl ItemPosition {
    /// Mirror start/end
    pub fn flipped(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
            other => other,
        }
    }
}

keyword_enum! {
    /// Overflow alignment modifier
    pub enum OverflowPosition {
        Default = "default",
        Safe = "safe",
        Unsafe = "unsafe",
    }
    default = Default;
}

/// `justify-self` / `align-self` computed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SelfAlignment {
    pub position: ItemPosition,
    pub overflow: OverflowPosition,
}

impl SelfAlignment {
    pub const fn new(position: ItemPosition, overflow: OverflowPosition) -> Self {
        Self { position, overflow }
    }
}

/// Length-percentage-or-auto computed value
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    #[default]
    Auto,
    Px(f32),
    Percent(f32),
}

impl Dimension {
    pub fn is_auto(self) -> bool {
        self == Self::Auto
    }

    /// Resolve against a percentage basis; `None` for `auto` or an
    /// indefinite basis
    pub fn resolve(self, basis: Option<f32>) -> Option<f32> {
        match self {
            Self::Auto => None,
            Self::Px(px) => Some(px),
            Self::Percent(p) => basis.map(|b| b * p / 100.0),
        }
    }
}

/// `line-height`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LineHeight {
    #[default]
    Normal,
    Number(f32),
    Px(f32),
}

impl LineHeight {
    pub fn used(self, font_size: f32) -> f32 {
        match self {
            Self::Normal => font_size * 1.2,
            Self::Number(n) => font_size * n,
            Self::Px(px) => px,
        }
    }
}

/// Color that may track the element's `color`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleColor {
    CurrentColor,
    Rgba(Color),
}

impl Default for StyleColor {
    fn default() -> Self {
        Self::Rgba(Color::TRANSPARENT)
    }
}

impl StyleColor {
    pub fn resolve(self, current: Color) -> Color {
        match self {
            Self::CurrentColor => current,
            Self::Rgba(c) => c,
        }
    }
}

/// `content`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Content {
    #[default]
    Normal,
    None,
    Text(Atom),
}

impl Content {
    /// Whether `::before` / `::after` with this value generate a box
    pub fn generates_box(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

/// Grid line reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GridLine {
    #[default]
    Auto,
    /// 1-based line number, negative counts from the end
    Line(i32),
}

/// Start and end lines along one grid axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridPlacement {
    pub start: GridLine,
    pub end: GridLine,
}

/// One entry of `position-try-fallbacks`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PositionTryFallback {
    /// Named `@position-try` rule
    pub rule_name: Option<Atom>,
    pub tactics: SmallVec<[TryTactic; 3]>,
    /// `position-area` shorthand fallback
    pub position_area: Option<PositionArea>,
}

/// Physical box edges
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl<T: Copy> Edges<T> {
    pub const fn all(value: T) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    pub fn get(&self, side: BoxSide) -> T {
        match side {
            BoxSide::Top => self.top,
            BoxSide::Right => self.right,
            BoxSide::Bottom => self.bottom,
            BoxSide::Left => self.left,
        }
    }

    pub fn set(&mut self, side: BoxSide, value: T) {
        match side {
            BoxSide::Top => self.top = value,
            BoxSide::Right => self.right = value,
            BoxSide::Bottom => self.bottom = value,
            BoxSide::Left => self.left = value,
        }
    }

    /// (start, end) edges along a physical axis
    pub fn along(&self, axis: PhysicalAxis) -> (T, T) {
        match axis {
            PhysicalAxis::Horizontal => (self.left, self.right),
            PhysicalAxis::Vertical => (self.top, self.bottom),
        }
    }
}

/// Pseudo-element identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PseudoId {
    Before,
    After,
    FirstLine,
    FirstLetter,
    Marker,
    Backdrop,
    ViewTransition,
}

impl PseudoId {
    pub const ALL: [PseudoId; 7] = [
        Self::Before,
        Self::After,
        Self::FirstLine,
        Self::FirstLetter,
        Self::Marker,
        Self::Backdrop,
        Self::ViewTransition,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "before" => Self::Before,
            "after" => Self::After,
            "first-line" => Self::FirstLine,
            "first-letter" => Self::FirstLetter,
            "marker" => Self::Marker,
            "backdrop" => Self::Backdrop,
            "view-transition" => Self::ViewTransition,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::FirstLine => "first-line",
            Self::FirstLetter => "first-letter",
            Self::Marker => "marker",
            Self::Backdrop => "backdrop",
            Self::ViewTransition => "view-transition",
        }
    }

    /// `::backdrop` and the view-transition tree inherit from the initial
    /// style rather than their originating element
    pub fn inherits_from_originating_element(self) -> bool {
        !matches!(self, Self::Backdrop | Self::ViewTransition)
    }
}

bitflags! {
    /// Bookkeeping recorded while building a style
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        /// Some non-inherited property was set with `inherit`
        const HAS_EXPLICITLY_INHERITED_PROPERTIES = 1 << 0;
        /// A fast-path inheritable property was set explicitly
        const DISALLOWS_FAST_PATH_INHERITANCE = 1 << 1;
        /// `anchor()` / `anchor-size()` were evaluated
        const USES_ANCHOR_FUNCTIONS = 1 << 2;
        /// Some anchor reference failed to resolve
        const HAS_UNRESOLVED_ANCHORS = 1 << 3;
        /// Viewport units were used
        const USES_VIEWPORT_UNITS = 1 << 4;
        /// Hidden by `position-visibility`
        const IS_FORCE_HIDDEN = 1 << 5;
    }
}

/// Inherited properties
#[derive(Debug, Clone, PartialEq)]
pub struct InheritedData {
    // Fast-path inheritable
    pub color: Color,
    pub visibility: Visibility,
    pub white_space: WhiteSpace,
    pub text_align: TextAlign,

    pub writing_mode: WritingMode,
    pub direction: Direction,
    /// Product of `zoom` on this element and all its ancestors
    pub effective_zoom: f32,
    pub font_family: Atom,
    /// Computed font size in pixels
    pub font_size: f32,
    pub font_style: FontStyle,
    pub font_weight: u16,
    pub line_height: LineHeight,
}

impl Default for InheritedData {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            visibility: Visibility::Visible,
            white_space: WhiteSpace::Normal,
            text_align: TextAlign::Start,
            writing_mode: WritingMode::HorizontalTb,
            direction: Direction::Ltr,
            effective_zoom: 1.0,
            font_family: Atom::from("serif"),
            font_size: 16.0,
            font_style: FontStyle::Normal,
            font_weight: 400,
            line_height: LineHeight::Normal,
        }
    }
}

impl InheritedData {
    fn fast_path_equal(&self, other: &Self) -> bool {
        self.color == other.color
            && self.visibility == other.visibility
            && self.white_space == other.white_space
            && self.text_align == other.text_align
    }

    fn equal_ignoring_fast_path(&self, other: &Self) -> bool {
        self.writing_mode == other.writing_mode
            && self.direction == other.direction
            && self.effective_zoom == other.effective_zoom
            && self.font_family == other.font_family
            && self.font_size == other.font_size
            && self.font_style == other.font_style
            && self.font_weight == other.font_weight
            && self.line_height == other.line_height
    }
}

/// Non-inherited box properties
#[derive(Debug, Clone, PartialEq)]
pub struct BoxData {
    pub display: Display,
    pub position: Position,
    pub float: Float,
    pub column_span: ColumnSpan,
    pub zoom: f32,
    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub min_height: Dimension,
    /// `Auto` means `none`
    pub max_width: Dimension,
    pub max_height: Dimension,
    pub aspect_ratio: Option<f32>,
    pub opacity: f32,
    pub z_index: Option<i32>,
}

impl Default for BoxData {
    fn default() -> Self {
        Self {
            display: Display::Inline,
            position: Position::Static,
            float: Float::None,
            column_span: ColumnSpan::None,
            zoom: 1.0,
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Auto,
            min_height: Dimension::Auto,
            max_width: Dimension::Auto,
            max_height: Dimension::Auto,
            aspect_ratio: None,
            opacity: 1.0,
            z_index: None,
        }
    }
}

/// Margins, padding, borders and insets
#[derive(Debug, Clone, PartialEq)]
pub struct SurroundData {
    pub margin: Edges<Dimension>,
    pub padding: Edges<Dimension>,
    pub border_width: Edges<f32>,
    pub inset: Edges<Dimension>,
}

impl Default for SurroundData {
    fn default() -> Self {
        Self {
            margin: Edges::all(Dimension::Px(0.0)),
            padding: Edges::all(Dimension::Px(0.0)),
            border_width: Edges::all(0.0),
            inset: Edges::all(Dimension::Auto),
        }
    }
}

/// Rarely set non-inherited properties
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RareData {
    pub background_color: StyleColor,
    pub background_image: Option<Image>,
    pub content: Content,
    pub container_type: ContainerType,
    pub container_names: SmallVec<[Atom; 1]>,
    pub anchor_names: SmallVec<[Atom; 1]>,
    pub position_anchor: Option<Atom>,
    pub position_area: Option<PositionArea>,
    pub position_try_fallbacks: Vec<PositionTryFallback>,
    pub position_try_order: PositionTryOrder,
    pub position_visibility: PositionVisibility,
    pub justify_self: SelfAlignment,
    pub align_self: SelfAlignment,
    pub grid_column: GridPlacement,
    pub grid_row: GridPlacement,
    /// Explicit track sizes in pixels
    pub grid_template_columns: Vec<f32>,
    pub grid_template_rows: Vec<f32>,
}

/// Resolved custom properties (all inherited)
pub type CustomPropertyMap = FxHashMap<Atom, Arc<CssValue>>;

static INITIAL_STYLE: LazyLock<Style> = LazyLock::new(|| Style {
    inherited: Arc::default(),
    box_data: Arc::default(),
    surround: Arc::default(),
    rare: Arc::default(),
    custom: Arc::default(),
    pseudo: None,
    flags: StyleFlags::empty(),
});

/// Computed style for an element or pseudo-element
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    inherited: Arc<InheritedData>,
    box_data: Arc<BoxData>,
    surround: Arc<SurroundData>,
    rare: Arc<RareData>,
    custom: Arc<CustomPropertyMap>,
    pseudo: Option<PseudoId>,
    flags: StyleFlags,
}

impl Default for Style {
    fn default() -> Self {
        Self::initial()
    }
}

impl Style {
    /// Style with every property at its initial value
    pub fn initial() -> Self {
        INITIAL_STYLE.clone()
    }

    /// Fresh style inheriting from `parent`: inherited records are shared,
    /// everything else starts at its initial value
    pub fn inherit_from(parent: &Style) -> Self {
        Self {
            inherited: Arc::clone(&parent.inherited),
            custom: Arc::clone(&parent.custom),
            ..Self::initial()
        }
    }

    /// Copy the fast-path inheritable properties down from `parent`
    pub fn fast_path_inherit_from(&mut self, parent: &Style) {
        if self.inherited.fast_path_equal(&parent.inherited) {
            return;
        }
        let from = &parent.inherited;
        let to = Arc::make_mut(&mut self.inherited);
        to.color = from.color;
        to.visibility = from.visibility;
        to.white_space = from.white_space;
        to.text_align = from.text_align;
    }

    pub fn inherited(&self) -> &InheritedData {
        &self.inherited
    }

    pub fn inherited_mut(&mut self) -> &mut InheritedData {
        Arc::make_mut(&mut self.inherited)
    }

    pub fn box_data(&self) -> &BoxData {
        &self.box_data
    }

    pub fn box_data_mut(&mut self) -> &mut BoxData {
        Arc::make_mut(&mut self.box_data)
    }

    pub fn surround(&self) -> &SurroundData {
        &self.surround
    }

    pub fn surround_mut(&mut self) -> &mut SurroundData {
        Arc::make_mut(&mut self.surround)
    }

    pub fn rare(&self) -> &RareData {
        &self.rare
    }

    pub fn rare_mut(&mut self) -> &mut RareData {
        Arc::make_mut(&mut self.rare)
    }

    pub fn custom_properties(&self) -> &CustomPropertyMap {
        &self.custom
    }

    pub fn custom_properties_mut(&mut self) -> &mut CustomPropertyMap {
        Arc::make_mut(&mut self.custom)
    }

    pub fn custom_property(&self, name: &str) -> Option<&Arc<CssValue>> {
        self.custom.get(name)
    }

    pub fn pseudo(&self) -> Option<PseudoId> {
        self.pseudo
    }

    pub fn set_pseudo(&mut self, pseudo: Option<PseudoId>) {
        self.pseudo = pseudo;
    }

    pub fn flags(&self) -> StyleFlags {
        self.flags
    }

    pub fn set_flag(&mut self, flag: StyleFlags) {
        self.flags.insert(flag);
    }

    pub fn clear_flag(&mut self, flag: StyleFlags) {
        self.flags.remove(flag);
    }

    pub fn display(&self) -> Display {
        self.box_data.display
    }

    pub fn position(&self) -> Position {
        self.box_data.position
    }

    pub fn color(&self) -> Color {
        self.inherited.color
    }

    pub fn font_size(&self) -> f32 {
        self.inherited.font_size
    }

    pub fn writing_mode(&self) -> WritingMode {
        self.inherited.writing_mode
    }

    pub fn used_line_height(&self) -> f32 {
        self.inherited.line_height.used(self.inherited.font_size)
    }

    pub fn used_background_color(&self) -> Color {
        self.rare.background_color.resolve(self.inherited.color)
    }

    pub fn is_floating(&self) -> bool {
        self.box_data.float != Float::None
    }

    pub fn is_out_of_flow_positioned(&self) -> bool {
        self.box_data.position.is_out_of_flow()
    }

    pub fn is_query_container(&self) -> bool {
        self.rare.container_type != ContainerType::Normal
    }

    pub fn has_position_try_fallbacks(&self) -> bool {
        !self.rare.position_try_fallbacks.is_empty()
    }

    pub fn has_explicitly_inherited_properties(&self) -> bool {
        self.flags.contains(StyleFlags::HAS_EXPLICITLY_INHERITED_PROPERTIES)
    }

    pub fn disallows_fast_path_inheritance(&self) -> bool {
        self.flags.contains(StyleFlags::DISALLOWS_FAST_PATH_INHERITANCE)
    }

    pub fn is_force_hidden(&self) -> bool {
        self.flags.contains(StyleFlags::IS_FORCE_HIDDEN)
    }

    pub fn set_force_hidden(&mut self, hidden: bool) {
        self.flags.set(StyleFlags::IS_FORCE_HIDDEN, hidden);
    }

    /// `visibility` after `position-visibility` hiding
    pub fn used_visibility(&self) -> Visibility {
        if self.is_force_hidden() { Visibility::Hidden } else { self.inherited.visibility }
    }

    pub fn uses_anchor_functions(&self) -> bool {
        self.flags.contains(StyleFlags::USES_ANCHOR_FUNCTIONS)
    }

    /// Inherited values other than the fast-path set, plus custom properties
    pub fn inherited_equal_ignoring_fast_path(&self, other: &Style) -> bool {
        (Arc::ptr_eq(&self.inherited, &other.inherited)
            || self.inherited.equal_ignoring_fast_path(&other.inherited))
            && self.custom_properties_equal(other)
    }

    pub fn fast_path_inherited_equal(&self, other: &Style) -> bool {
        self.inherited.fast_path_equal(&other.inherited)
    }

    pub fn custom_properties_equal(&self, other: &Style) -> bool {
        Arc::ptr_eq(&self.custom, &other.custom) || self.custom == other.custom
    }

    /// Every non-inherited record
    pub fn non_inherited_equal(&self, other: &Style) -> bool {
        self.box_data == other.box_data && self.surround == other.surround && self.rare == other.rare
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inherit_shares_inherited_record() {
        let mut parent = Style::initial();
        parent.inherited_mut().color = Color::GREEN;
        parent.box_data_mut().display = Display::Block;

        let child = Style::inherit_from(&parent);
        assert_eq!(child.color(), Color::GREEN);
        assert_eq!(child.display(), Display::Inline);
        assert!(Arc::ptr_eq(&child.inherited, &parent.inherited));
    }

    #[test]
    fn test_fast_path_inherit() {
        let parent = Style::initial();
        let mut child = Style::inherit_from(&parent);

        let mut new_parent = parent.clone();
        new_parent.inherited_mut().color = Color::RED;
        assert!(new_parent.inherited_equal_ignoring_fast_path(&parent));
        assert!(!new_parent.fast_path_inherited_equal(&parent));

        child.fast_path_inherit_from(&new_parent);
        assert_eq!(child, Style::inherit_from(&new_parent));
    }

    #[test]
    fn test_keyword_enums() {
        assert_eq!(Display::from_ident("list-item"), Some(Display::ListItem));
        assert_eq!(Display::InlineBlock.blockified(), Display::Block);
        assert_eq!(Position::from_ident("sticky"), None);
        assert_eq!(WritingMode::VerticalRl.physical_axis(LogicalAxis::Block), PhysicalAxis::Horizontal);
        assert_eq!(TryTactic::FlipStart.as_str(), "flip-start");
    }

    #[test]
    fn test_used_values() {
        assert_eq!(Dimension::Percent(50.0).resolve(Some(200.0)), Some(100.0));
        assert_eq!(Dimension::Percent(50.0).resolve(None), None);
        assert_eq!(LineHeight::Number(1.5).used(10.0), 15.0);
        let mut style = Style::initial();
        style.inherited_mut().color = Color::BLUE;
        style.rare_mut().background_color = StyleColor::CurrentColor;
        assert_eq!(style.used_background_color(), Color::BLUE);
    }
}
