//! Cascade Builder
//!
//! Applies a ranked `MatchResult` onto a style in three tiers: top priority
//! (writing mode, direction, zoom and custom properties), high priority (font
//! properties) and everything else. Within a tier the winning declaration of
//! each property is the one from the highest cascade level, with ties broken
//! by match-result order.
//!
//! Invalid values never abort the build: the property is treated as `unset`.

use std::borrow::Cow;
use std::sync::Arc;

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::anchor::{AnchorEvaluator, AnchorQuery};
use crate::declarations::CascadeLevel;
use crate::match_result::MatchResult;
use crate::properties::{LonghandId, LonghandIdSet, PropertyId, PropertyPriority};
use crate::style::{
    ColumnSpan, Content, ContainerType, Dimension, Direction, Display, Float, FontStyle, GridLine, ItemPosition,
    LineHeight, OverflowPosition, Position, PositionTryFallback, PositionTryOrder, PositionVisibility, PseudoId,
    SelfAlignment, Style, StyleColor, StyleFlags, TextAlign, TryTactic, Visibility, WhiteSpace, WritingMode,
};
use crate::values::{
    AnchorFunction, AnchorSizeDimension, AnchorSizeFunction, Atom, Color, CssValue, CssWideKeyword, Image, Length,
    LengthUnit, PositionArea,
};
use fos_dom::{LogicalAxis, PhysicalAxis, Size};

bitflags! {
    /// Property tiers to apply
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyTypes: u8 {
        const TOP = 1 << 0;
        const HIGH = 1 << 1;
        const NORMAL = 1 << 2;
        /// Normal-tier properties re-applied on top of an animated style
        const AFTER_ANIMATION = 1 << 3;
        const ALL = Self::TOP.bits() | Self::HIGH.bits() | Self::NORMAL.bits();
    }
}

/// Which properties an `apply` call touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySelection {
    types: PropertyTypes,
    only: Option<LonghandIdSet>,
    skip: LonghandIdSet,
}

impl PropertySelection {
    pub fn all() -> Self {
        Self { types: PropertyTypes::ALL, only: None, skip: LonghandIdSet::new() }
    }

    /// Normal-priority properties only
    pub fn normal() -> Self {
        Self { types: PropertyTypes::NORMAL, only: None, skip: LonghandIdSet::new() }
    }

    /// Just the listed normal-priority longhands
    pub fn only(properties: LonghandIdSet) -> Self {
        Self { types: PropertyTypes::NORMAL, only: Some(properties), skip: LonghandIdSet::new() }
    }

    /// Normal-priority properties the animation did not set
    pub fn after_animation(animated: LonghandIdSet) -> Self {
        Self { types: PropertyTypes::AFTER_ANIMATION, only: None, skip: animated }
    }

    pub fn types(&self) -> PropertyTypes {
        self.types
    }

    fn applies_custom_properties(&self) -> bool {
        self.types.contains(PropertyTypes::TOP) && self.only.is_none()
    }

    fn includes(&self, id: LonghandId) -> bool {
        let tier = match id.priority() {
            PropertyPriority::Top => PropertyTypes::TOP,
            PropertyPriority::High => PropertyTypes::HIGH,
            PropertyPriority::Normal => PropertyTypes::NORMAL | PropertyTypes::AFTER_ANIMATION,
        };
        self.types.intersects(tier) && self.only.is_none_or(|only| only.contains(id)) && !self.skip.contains(id)
    }
}

/// Inputs a build needs beyond the declarations
pub struct BuilderContext<'a> {
    pub parent: &'a Style,
    /// Font size of the document element, for `rem`
    pub root_font_size: f32,
    pub viewport: Size,
    /// Position-try tactics applied to inset, margin, sizing and alignment
    pub tactics: &'a [TryTactic],
    pub anchors: Option<&'a mut dyn AnchorEvaluator>,
}

impl<'a> BuilderContext<'a> {
    pub fn new(parent: &'a Style) -> Self {
        Self { parent, root_font_size: parent.font_size(), viewport: Size::default(), tactics: &[], anchors: None }
    }

    pub fn with_root_font_size(mut self, size: f32) -> Self {
        self.root_font_size = size;
        self
    }

    pub fn with_viewport(mut self, viewport: Size) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_tactics(mut self, tactics: &'a [TryTactic]) -> Self {
        self.tactics = tactics;
        self
    }

    pub fn with_anchors(mut self, anchors: &'a mut dyn AnchorEvaluator) -> Self {
        self.anchors = Some(anchors);
        self
    }
}

type CascadeKey = (CascadeLevel, usize);

#[derive(Debug, Clone)]
struct Cascaded<'m> {
    key: CascadeKey,
    value: Cow<'m, CssValue>,
}

fn place<'m>(slot: &mut Option<Cascaded<'m>>, candidate: Cascaded<'m>) {
    if slot.as_ref().is_none_or(|current| current.key <= candidate.key) {
        *slot = Some(candidate);
    }
}

/// Winning declaration per property
struct PropertyCascade<'m> {
    longhands: Vec<Option<Cascaded<'m>>>,
    custom: FxHashMap<Atom, (CascadeKey, &'m CssValue)>,
    custom_order: Vec<Atom>,
}

impl<'m> PropertyCascade<'m> {
    fn collect(match_result: &'m MatchResult) -> Self {
        let mut cascade = Self {
            longhands: (0..LonghandId::COUNT).map(|_| None).collect(),
            custom: FxHashMap::default(),
            custom_order: Vec::new(),
        };
        for (index, entry) in match_result.declarations.iter().enumerate() {
            for declaration in entry.block.iter() {
                let Some(level) = entry.level(declaration.important) else { continue };
                let key = (level, index);
                match &declaration.property {
                    PropertyId::Longhand(id) => place(
                        &mut cascade.longhands[id.index()],
                        Cascaded { key, value: Cow::Borrowed(&*declaration.value) },
                    ),
                    PropertyId::Custom(name) => match cascade.custom.get_mut(name) {
                        Some(existing) if existing.0 <= key => *existing = (key, &*declaration.value),
                        Some(_) => {}
                        None => {
                            cascade.custom.insert(Atom::clone(name), (key, &*declaration.value));
                            cascade.custom_order.push(Atom::clone(name));
                        }
                    },
                }
            }
        }
        cascade
    }

    fn get(&self, id: LonghandId) -> Option<&CssValue> {
        self.longhands[id.index()].as_ref().map(|c| &*c.value)
    }

    /// Remap non-important geometry declarations through the try tactics
    fn apply_tactics(&mut self, tactics: &[TryTactic], writing_mode: WritingMode) {
        let mut remapped: Vec<Option<Cascaded<'m>>> = (0..LonghandId::COUNT).map(|_| None).collect();
        for id in LonghandId::ALL {
            let Some(cascaded) = self.longhands[id.index()].take() else { continue };
            if cascaded.key.0 > CascadeLevel::POSITION_FALLBACK || !id.is_allowed_in_position_try() {
                place(&mut remapped[id.index()], cascaded);
                continue;
            }
            let (target, value) = tactics.iter().fold((id, cascaded.value.into_owned()), |(property, value), tactic| {
                let flip = PhysicalFlip::new(*tactic, writing_mode);
                (flip.property(property), flip.value(property, value))
            });
            place(&mut remapped[target.index()], Cascaded { key: cascaded.key, value: Cow::Owned(value) });
        }
        self.longhands = remapped;
    }
}

/// A try tactic resolved against the writing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhysicalFlip {
    Vertical,
    Horizontal,
    Transpose,
}

impl PhysicalFlip {
    fn new(tactic: TryTactic, writing_mode: WritingMode) -> Self {
        let along = |axis| match writing_mode.physical_axis(axis) {
            PhysicalAxis::Vertical => Self::Vertical,
            PhysicalAxis::Horizontal => Self::Horizontal,
        };
        match tactic {
            TryTactic::FlipBlock => along(LogicalAxis::Block),
            TryTactic::FlipInline => along(LogicalAxis::Inline),
            TryTactic::FlipStart => Self::Transpose,
        }
    }

    fn axis(self) -> Option<PhysicalAxis> {
        match self {
            Self::Vertical => Some(PhysicalAxis::Vertical),
            Self::Horizontal => Some(PhysicalAxis::Horizontal),
            Self::Transpose => None,
        }
    }

    fn property(self, id: LonghandId) -> LonghandId {
        match self {
            Self::Vertical => id.flip_block(),
            Self::Horizontal => id.flip_inline(),
            Self::Transpose => id.flip_start(),
        }
    }

    /// Rewrite `value`, declared for `property`, for the flipped property
    fn value(self, property: LonghandId, value: CssValue) -> CssValue {
        let mirrors = self.axis().is_some() && self.axis() == property.physical_axis();
        match value {
            CssValue::Anchor(mut f) => {
                f.side = match self {
                    Self::Transpose => f.side.transposed(),
                    _ if mirrors => f.side.mirrored(),
                    _ => f.side,
                };
                f.fallback = f.fallback.map(|fb| Box::new(self.value(property, *fb)));
                CssValue::Anchor(f)
            }
            CssValue::AnchorSize(mut f) => {
                if self == Self::Transpose {
                    f.dimension = f.dimension.map(|d| match d {
                        AnchorSizeDimension::Width => AnchorSizeDimension::Height,
                        AnchorSizeDimension::Height => AnchorSizeDimension::Width,
                        AnchorSizeDimension::Block => AnchorSizeDimension::Inline,
                        AnchorSizeDimension::Inline => AnchorSizeDimension::Block,
                    });
                }
                f.fallback = f.fallback.map(|fb| Box::new(self.value(property, *fb)));
                CssValue::AnchorSize(f)
            }
            other if property == LonghandId::PositionArea => match position_area_value(&other) {
                Some(Some(area)) => CssValue::PositionArea(match self {
                    Self::Vertical => area.flip_block(),
                    Self::Horizontal => area.flip_inline(),
                    Self::Transpose => area.flip_start(),
                }),
                _ => other,
            },
            CssValue::Ident(kw) if mirrors && matches!(property, LonghandId::JustifySelf | LonghandId::AlignSelf) => {
                match ItemPosition::from_ident(&kw) {
                    Some(position) => CssValue::ident(position.flipped().as_str()),
                    None => CssValue::Ident(kw),
                }
            }
            CssValue::List(items) if mirrors => {
                CssValue::List(items.into_iter().map(|item| self.value(property, item)).collect())
            }
            other => other,
        }
    }
}

/// Replace `var()` references. `None` if a reference has neither a value
/// nor a fallback.
fn substitute_vars(value: &CssValue, lookup: &mut dyn FnMut(&Atom) -> Option<Arc<CssValue>>) -> Option<CssValue> {
    Some(match value {
        CssValue::Var(reference) => match lookup(&reference.name) {
            Some(resolved) => (*resolved).clone(),
            None => substitute_vars(reference.fallback.as_deref()?, lookup)?,
        },
        CssValue::List(items) => {
            CssValue::List(items.iter().map(|item| substitute_vars(item, lookup)).collect::<Option<Vec<_>>>()?)
        }
        CssValue::Anchor(f) => CssValue::Anchor(AnchorFunction {
            fallback: match f.fallback.as_deref() {
                Some(fb) => Some(Box::new(substitute_vars(fb, lookup)?)),
                None => None,
            },
            ..f.clone()
        }),
        CssValue::AnchorSize(f) => CssValue::AnchorSize(AnchorSizeFunction {
            fallback: match f.fallback.as_deref() {
                Some(fb) => Some(Box::new(substitute_vars(fb, lookup)?)),
                None => None,
            },
            ..f.clone()
        }),
        other => other.clone(),
    })
}

fn ident(value: &CssValue) -> Option<&str> {
    value.as_ident()
}

/// `Some(None)` for `none`, `Some(Some(area))` for a valid area
fn position_area_value(value: &CssValue) -> Option<Option<PositionArea>> {
    match value {
        CssValue::PositionArea(area) => Some(Some(*area)),
        CssValue::Ident(kw) if &**kw == "none" => Some(None),
        CssValue::Ident(kw) => PositionArea::from_keywords(&[&**kw]).map(Some),
        CssValue::List(items) => {
            let keywords: Option<SmallVec<[&str; 2]>> = items.iter().map(CssValue::as_ident).collect();
            PositionArea::from_keywords(&keywords?).map(Some)
        }
        _ => None,
    }
}

fn ident_list(value: &CssValue) -> Option<SmallVec<[Atom; 1]>> {
    match value {
        CssValue::Ident(kw) if &**kw == "none" => Some(SmallVec::new()),
        CssValue::Ident(kw) => Some(smallvec::smallvec![Atom::clone(kw)]),
        CssValue::List(items) => items
            .iter()
            .map(|item| match item {
                CssValue::Ident(kw) if &**kw != "none" => Some(Atom::clone(kw)),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

/// `always` or any combination of `anchors-visible` and `no-overflow`
fn position_visibility(value: &CssValue) -> Option<PositionVisibility> {
    let keyword = |kw: &str| match kw {
        "anchors-visible" => Some(PositionVisibility::ANCHORS_VISIBLE),
        "no-overflow" => Some(PositionVisibility::NO_OVERFLOW),
        _ => None,
    };
    match value {
        CssValue::Ident(kw) if &**kw == "always" => Some(PositionVisibility::empty()),
        CssValue::Ident(kw) => keyword(&**kw),
        CssValue::List(items) => items.iter().try_fold(PositionVisibility::empty(), |set, item| match item {
            CssValue::Ident(kw) => Some(set | keyword(&**kw)?),
            _ => None,
        }),
        _ => None,
    }
}

fn self_alignment(value: &CssValue) -> Option<SelfAlignment> {
    match value {
        CssValue::Ident(kw) => Some(SelfAlignment::new(ItemPosition::from_ident(kw)?, OverflowPosition::Default)),
        CssValue::List(items) if items.len() == 2 => {
            let overflow = OverflowPosition::from_ident(items[0].as_ident()?)?;
            let position = ItemPosition::from_ident(items[1].as_ident()?)?;
            Some(SelfAlignment::new(position, overflow))
        }
        _ => None,
    }
}

fn try_fallback_entry(value: &CssValue) -> Option<PositionTryFallback> {
    let mut entry = PositionTryFallback::default();
    let words: SmallVec<[&CssValue; 3]> = match value {
        CssValue::List(words) => words.iter().collect(),
        single => smallvec::smallvec![single],
    };
    if let Some(Some(area)) = position_area_value(value) {
        entry.position_area = Some(area);
        return Some(entry);
    }
    for word in words {
        let kw = word.as_ident()?;
        if kw.starts_with("--") && entry.rule_name.is_none() {
            entry.rule_name = Some(Atom::from(kw));
        } else {
            entry.tactics.push(TryTactic::from_ident(kw)?);
        }
    }
    Some(entry)
}

/// `position-try-fallbacks`: a comma list of entries, each an ident, a
/// space list of idents, or a position area
fn try_fallbacks(value: &CssValue) -> Option<Vec<PositionTryFallback>> {
    match value {
        CssValue::Ident(kw) if &**kw == "none" => Some(Vec::new()),
        CssValue::List(entries) => entries.iter().map(try_fallback_entry).collect(),
        single => Some(vec![try_fallback_entry(single)?]),
    }
}

fn color(value: &CssValue) -> Option<Color> {
    match value {
        CssValue::Color(c) => Some(*c),
        CssValue::Ident(name) => Color::from_name(name),
        _ => None,
    }
}

/// Builds one computed style
pub struct Builder<'a> {
    style: Style,
    ctx: BuilderContext<'a>,
    resolved_custom: FxHashMap<Atom, Option<Arc<CssValue>>>,
}

impl<'a> Builder<'a> {
    /// Fresh style inheriting from the context's parent
    pub fn new(ctx: BuilderContext<'a>, pseudo: Option<PseudoId>) -> Self {
        let mut style = Style::inherit_from(ctx.parent);
        style.set_pseudo(pseudo);
        Self::from_style(style, ctx)
    }

    /// Continue building on top of an existing style
    pub fn from_style(style: Style, ctx: BuilderContext<'a>) -> Self {
        Self { style, ctx, resolved_custom: FxHashMap::default() }
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn finish(self) -> Style {
        self.style
    }

    /// Apply the selected tiers of `match_result`
    pub fn apply(&mut self, match_result: &MatchResult, selection: PropertySelection) {
        let mut cascade = PropertyCascade::collect(match_result);
        if selection.applies_custom_properties() {
            self.apply_custom_properties(&cascade);
        }
        self.apply_tier(&cascade, PropertyPriority::Top, &selection);
        if !self.ctx.tactics.is_empty() {
            cascade.apply_tactics(self.ctx.tactics, self.style.writing_mode());
        }
        self.apply_tier(&cascade, PropertyPriority::High, &selection);
        self.apply_tier(&cascade, PropertyPriority::Normal, &selection);
    }

    fn apply_tier(&mut self, cascade: &PropertyCascade<'_>, tier: PropertyPriority, selection: &PropertySelection) {
        // The default anchor must be known before insets evaluate anchor().
        for anchor_first in [true, false] {
            for id in LonghandId::ALL {
                if id.priority() != tier || (id == LonghandId::PositionAnchor) != anchor_first || !selection.includes(id) {
                    continue;
                }
                if let Some(value) = cascade.get(id) {
                    self.apply_declared(id, value);
                }
            }
        }
    }

    fn apply_custom_properties(&mut self, cascade: &PropertyCascade<'_>) {
        if cascade.custom.is_empty() {
            return;
        }
        let mut stack = SmallVec::<[Atom; 4]>::new();
        for name in &cascade.custom_order {
            let value = self.custom_value(cascade, name, &mut stack);
            let map = self.style.custom_properties_mut();
            match value {
                Some(value) => {
                    map.insert(Atom::clone(name), value);
                }
                None => {
                    map.remove(name);
                }
            }
        }
    }

    fn custom_value(
        &mut self,
        cascade: &PropertyCascade<'_>,
        name: &Atom,
        stack: &mut SmallVec<[Atom; 4]>,
    ) -> Option<Arc<CssValue>> {
        if let Some(done) = self.resolved_custom.get(name) {
            return done.clone();
        }
        let Some(&(_, declared)) = cascade.custom.get(name) else {
            return self.ctx.parent.custom_property(name).cloned();
        };
        if stack.contains(name) {
            tracing::trace!(property = %name, "custom property cycle");
            return None;
        }
        stack.push(Atom::clone(name));
        let resolved = match declared {
            CssValue::CssWide(CssWideKeyword::Initial) => None,
            CssValue::CssWide(_) => self.ctx.parent.custom_property(name).cloned(),
            value if value.has_var() => {
                substitute_vars(value, &mut |reference: &Atom| self.custom_value(cascade, reference, stack))
                    .map(Arc::new)
            }
            value => Some(Arc::new(value.clone())),
        };
        stack.pop();
        self.resolved_custom.insert(Atom::clone(name), resolved.clone());
        resolved
    }

    fn apply_declared(&mut self, id: LonghandId, value: &CssValue) {
        let substituted = value
            .has_var()
            .then(|| substitute_vars(value, &mut |name: &Atom| self.style.custom_property(name).cloned()));
        let value = match &substituted {
            None => value,
            Some(Some(resolved)) => resolved,
            Some(None) => {
                tracing::trace!(property = id.name(), "unresolvable var(), treating as unset");
                self.apply_css_wide(id, CssWideKeyword::Unset);
                return;
            }
        };

        if let CssValue::CssWide(keyword) = value {
            self.apply_css_wide(id, *keyword);
            return;
        }
        if self.apply_value(id, value).is_some() {
            if id.is_fast_path_inheritable() {
                self.style.set_flag(StyleFlags::DISALLOWS_FAST_PATH_INHERITANCE);
            }
        } else {
            tracing::trace!(property = id.name(), ?value, "invalid value, treating as unset");
            self.apply_css_wide(id, CssWideKeyword::Unset);
        }
    }

    fn apply_css_wide(&mut self, id: LonghandId, keyword: CssWideKeyword) {
        let inherit = match keyword {
            CssWideKeyword::Inherit => true,
            CssWideKeyword::Initial => false,
            CssWideKeyword::Unset => id.is_inherited(),
        };
        if inherit {
            let parent = self.ctx.parent;
            self.copy_property(id, parent);
            // Children must follow later changes to a non-inherited value.
            if keyword == CssWideKeyword::Inherit && !id.is_inherited() {
                self.style.set_flag(StyleFlags::HAS_EXPLICITLY_INHERITED_PROPERTIES);
            }
        } else {
            self.copy_property(id, &Style::initial());
        }
    }

    fn length(&mut self, property: LonghandId, value: &CssValue) -> Option<Dimension> {
        match value {
            CssValue::Length(length) => Some(self.resolve_length(*length, self.style.font_size())),
            CssValue::Number(n) if *n == 0.0 => Some(Dimension::Px(0.0)),
            CssValue::Integer(0) => Some(Dimension::Px(0.0)),
            CssValue::Anchor(f) => self.anchor(property, f),
            CssValue::AnchorSize(f) => self.anchor_size(property, f),
            _ => None,
        }
    }

    /// Length, percentage, anchor function or the given keyword as `Auto`
    fn dimension(&mut self, property: LonghandId, value: &CssValue, auto_keyword: &str) -> Option<Dimension> {
        match value {
            CssValue::Ident(kw) if &**kw == auto_keyword => Some(Dimension::Auto),
            other => self.length(property, other),
        }
    }

    fn px(&mut self, property: LonghandId, value: &CssValue) -> Option<f32> {
        match self.length(property, value)? {
            Dimension::Px(px) => Some(px),
            _ => None,
        }
    }

    fn resolve_length(&mut self, length: Length, em_basis: f32) -> Dimension {
        let v = length.value;
        match length.unit {
            LengthUnit::Px => Dimension::Px(v * self.style.inherited().effective_zoom),
            LengthUnit::Em => Dimension::Px(v * em_basis),
            LengthUnit::Rem => Dimension::Px(v * self.ctx.root_font_size),
            LengthUnit::Percent => Dimension::Percent(v),
            LengthUnit::Vw => {
                self.style.set_flag(StyleFlags::USES_VIEWPORT_UNITS);
                Dimension::Px(self.ctx.viewport.width * v / 100.0)
            }
            LengthUnit::Vh => {
                self.style.set_flag(StyleFlags::USES_VIEWPORT_UNITS);
                Dimension::Px(self.ctx.viewport.height * v / 100.0)
            }
        }
    }

    fn evaluate_anchor(&mut self, name: Option<&Atom>, query: impl FnOnce(&Atom) -> AnchorQuery<'_>) -> Option<f32> {
        self.style.set_flag(StyleFlags::USES_ANCHOR_FUNCTIONS);
        let name = name.cloned().or_else(|| self.style.rare().position_anchor.clone())?;
        let resolved = self.ctx.anchors.as_mut().and_then(|anchors| anchors.evaluate(query(&name)));
        if resolved.is_none() {
            self.style.set_flag(StyleFlags::HAS_UNRESOLVED_ANCHORS);
        }
        resolved
    }

    fn anchor(&mut self, property: LonghandId, f: &AnchorFunction) -> Option<Dimension> {
        if !matches!(property, LonghandId::Top | LonghandId::Right | LonghandId::Bottom | LonghandId::Left) {
            return None;
        }
        let side = f.side;
        match self.evaluate_anchor(f.name.as_ref(), |name| AnchorQuery::Edge { name, side, property }) {
            Some(px) => Some(Dimension::Px(px)),
            None => self.length(property, f.fallback.as_deref()?),
        }
    }

    fn anchor_size(&mut self, property: LonghandId, f: &AnchorSizeFunction) -> Option<Dimension> {
        let axis = match f.dimension {
            Some(AnchorSizeDimension::Width) => PhysicalAxis::Horizontal,
            Some(AnchorSizeDimension::Height) => PhysicalAxis::Vertical,
            Some(AnchorSizeDimension::Inline) => self.style.writing_mode().physical_axis(LogicalAxis::Inline),
            Some(AnchorSizeDimension::Block) => self.style.writing_mode().physical_axis(LogicalAxis::Block),
            None => property.physical_axis()?,
        };
        let allowed = property.is_allowed_in_position_try() && property.physical_axis().is_some();
        if !allowed {
            return None;
        }
        match self.evaluate_anchor(f.name.as_ref(), |name| AnchorQuery::Size { name, axis }) {
            Some(px) => Some(Dimension::Px(px)),
            None => self.length(property, f.fallback.as_deref()?),
        }
    }

    fn set_zoom(&mut self, zoom: f32) {
        let parent_zoom = self.ctx.parent.inherited().effective_zoom;
        self.style.box_data_mut().zoom = zoom;
        self.style.inherited_mut().effective_zoom = parent_zoom * zoom;
    }

    /// Convert and store a specified value. `None` if the value is invalid
    /// for the property.
    fn apply_value(&mut self, id: LonghandId, value: &CssValue) -> Option<()> {
        use LonghandId as L;
        match id {
            L::WritingMode => self.style.inherited_mut().writing_mode = WritingMode::from_ident(ident(value)?)?,
            L::Direction => self.style.inherited_mut().direction = Direction::from_ident(ident(value)?)?,
            L::Zoom => {
                let zoom = match value {
                    CssValue::Number(n) if *n > 0.0 => *n,
                    CssValue::Length(Length { value, unit: LengthUnit::Percent }) if *value > 0.0 => value / 100.0,
                    CssValue::Ident(kw) if &**kw == "normal" => 1.0,
                    _ => return None,
                };
                self.set_zoom(zoom);
            }
            L::FontFamily => {
                let family = match value {
                    CssValue::Ident(name) | CssValue::String(name) => Atom::clone(name),
                    CssValue::List(items) => match items.first()? {
                        CssValue::Ident(name) | CssValue::String(name) => Atom::clone(name),
                        _ => return None,
                    },
                    _ => return None,
                };
                self.style.inherited_mut().font_family = family;
            }
            L::FontSize => {
                let parent_size = self.ctx.parent.font_size();
                let zoom = self.style.inherited().effective_zoom;
                let size = match value {
                    CssValue::Length(length) => match self.resolve_length(*length, parent_size) {
                        Dimension::Px(px) => px,
                        Dimension::Percent(p) => parent_size * p / 100.0,
                        Dimension::Auto => return None,
                    },
                    CssValue::Ident(kw) => match &**kw {
                        "small" => 13.0 * zoom,
                        "medium" => 16.0 * zoom,
                        "large" => 18.0 * zoom,
                        "x-large" => 24.0 * zoom,
                        "smaller" => parent_size / 1.2,
                        "larger" => parent_size * 1.2,
                        _ => return None,
                    },
                    _ => return None,
                };
                if size < 0.0 {
                    return None;
                }
                self.style.inherited_mut().font_size = size;
            }
            L::FontStyle => self.style.inherited_mut().font_style = FontStyle::from_ident(ident(value)?)?,
            L::FontWeight => {
                let parent_weight = self.ctx.parent.inherited().font_weight;
                let weight = match value {
                    CssValue::Integer(n) if (1..=1000).contains(n) => *n as u16,
                    CssValue::Number(n) if (1.0..=1000.0).contains(n) => *n as u16,
                    CssValue::Ident(kw) => match &**kw {
                        "normal" => 400,
                        "bold" => 700,
                        "bolder" => (parent_weight + 300).min(900),
                        "lighter" => parent_weight.saturating_sub(300).max(100),
                        _ => return None,
                    },
                    _ => return None,
                };
                self.style.inherited_mut().font_weight = weight;
            }
            L::LineHeight => {
                let line_height = match value {
                    CssValue::Ident(kw) if &**kw == "normal" => LineHeight::Normal,
                    CssValue::Number(n) if *n >= 0.0 => LineHeight::Number(*n),
                    CssValue::Length(length) => {
                        let font_size = self.style.font_size();
                        match self.resolve_length(*length, font_size) {
                            Dimension::Px(px) => LineHeight::Px(px),
                            Dimension::Percent(p) => LineHeight::Px(font_size * p / 100.0),
                            Dimension::Auto => return None,
                        }
                    }
                    _ => return None,
                };
                self.style.inherited_mut().line_height = line_height;
            }
            L::Color => {
                let resolved = match value {
                    CssValue::CurrentColor => self.ctx.parent.color(),
                    other => color(other)?,
                };
                self.style.inherited_mut().color = resolved;
            }
            L::Visibility => self.style.inherited_mut().visibility = Visibility::from_ident(ident(value)?)?,
            L::WhiteSpace => self.style.inherited_mut().white_space = WhiteSpace::from_ident(ident(value)?)?,
            L::TextAlign => self.style.inherited_mut().text_align = TextAlign::from_ident(ident(value)?)?,
            L::Display => self.style.box_data_mut().display = Display::from_ident(ident(value)?)?,
            L::Position => self.style.box_data_mut().position = Position::from_ident(ident(value)?)?,
            L::Float => self.style.box_data_mut().float = Float::from_ident(ident(value)?)?,
            L::ColumnSpan => self.style.box_data_mut().column_span = ColumnSpan::from_ident(ident(value)?)?,
            L::Width => self.style.box_data_mut().width = self.dimension(id, value, "auto")?,
            L::Height => self.style.box_data_mut().height = self.dimension(id, value, "auto")?,
            L::MinWidth => self.style.box_data_mut().min_width = self.dimension(id, value, "auto")?,
            L::MinHeight => self.style.box_data_mut().min_height = self.dimension(id, value, "auto")?,
            L::MaxWidth => self.style.box_data_mut().max_width = self.dimension(id, value, "none")?,
            L::MaxHeight => self.style.box_data_mut().max_height = self.dimension(id, value, "none")?,
            L::AspectRatio => {
                self.style.box_data_mut().aspect_ratio = match value {
                    CssValue::Ident(kw) if &**kw == "auto" => None,
                    CssValue::Ratio(ratio) => Some(ratio.value()?),
                    CssValue::Number(n) if *n > 0.0 => Some(*n),
                    _ => return None,
                };
            }
            L::Opacity => {
                self.style.box_data_mut().opacity = match value {
                    CssValue::Number(n) => n.clamp(0.0, 1.0),
                    CssValue::Length(Length { value, unit: LengthUnit::Percent }) => (value / 100.0).clamp(0.0, 1.0),
                    _ => return None,
                };
            }
            L::ZIndex => {
                self.style.box_data_mut().z_index = match value {
                    CssValue::Integer(n) => Some(*n),
                    CssValue::Ident(kw) if &**kw == "auto" => None,
                    _ => return None,
                };
            }
            L::MarginTop => self.style.surround_mut().margin.top = self.dimension(id, value, "auto")?,
            L::MarginRight => self.style.surround_mut().margin.right = self.dimension(id, value, "auto")?,
            L::MarginBottom => self.style.surround_mut().margin.bottom = self.dimension(id, value, "auto")?,
            L::MarginLeft => self.style.surround_mut().margin.left = self.dimension(id, value, "auto")?,
            L::PaddingTop => self.style.surround_mut().padding.top = self.length(id, value)?,
            L::PaddingRight => self.style.surround_mut().padding.right = self.length(id, value)?,
            L::PaddingBottom => self.style.surround_mut().padding.bottom = self.length(id, value)?,
            L::PaddingLeft => self.style.surround_mut().padding.left = self.length(id, value)?,
            L::BorderTopWidth | L::BorderRightWidth | L::BorderBottomWidth | L::BorderLeftWidth => {
                let zoom = self.style.inherited().effective_zoom;
                let width = match value {
                    CssValue::Ident(kw) => match &**kw {
                        "thin" => 1.0 * zoom,
                        "medium" => 3.0 * zoom,
                        "thick" => 5.0 * zoom,
                        _ => return None,
                    },
                    other => self.px(id, other)?,
                };
                if width < 0.0 {
                    return None;
                }
                let border = &mut self.style.surround_mut().border_width;
                match id {
                    L::BorderTopWidth => border.top = width,
                    L::BorderRightWidth => border.right = width,
                    L::BorderBottomWidth => border.bottom = width,
                    _ => border.left = width,
                }
            }
            L::Top => self.style.surround_mut().inset.top = self.dimension(id, value, "auto")?,
            L::Right => self.style.surround_mut().inset.right = self.dimension(id, value, "auto")?,
            L::Bottom => self.style.surround_mut().inset.bottom = self.dimension(id, value, "auto")?,
            L::Left => self.style.surround_mut().inset.left = self.dimension(id, value, "auto")?,
            L::BackgroundColor => {
                self.style.rare_mut().background_color = match value {
                    CssValue::CurrentColor => StyleColor::CurrentColor,
                    CssValue::Ident(kw) if kw.eq_ignore_ascii_case("currentcolor") => StyleColor::CurrentColor,
                    other => StyleColor::Rgba(color(other)?),
                };
            }
            L::BackgroundImage => {
                self.style.rare_mut().background_image = match value {
                    CssValue::Ident(kw) if &**kw == "none" => None,
                    CssValue::Image(image) => Some(image.clone()),
                    CssValue::Url(url) => Some(Image::Url(Atom::clone(url))),
                    _ => return None,
                };
            }
            L::Content => {
                self.style.rare_mut().content = match value {
                    CssValue::String(text) => Content::Text(Atom::clone(text)),
                    CssValue::Ident(kw) if &**kw == "normal" => Content::Normal,
                    CssValue::Ident(kw) if &**kw == "none" => Content::None,
                    _ => return None,
                };
            }
            L::ContainerType => self.style.rare_mut().container_type = ContainerType::from_ident(ident(value)?)?,
            L::ContainerName => self.style.rare_mut().container_names = ident_list(value)?,
            L::AnchorName => self.style.rare_mut().anchor_names = ident_list(value)?,
            L::PositionAnchor => {
                self.style.rare_mut().position_anchor = match ident(value)? {
                    "auto" => None,
                    name => Some(Atom::from(name)),
                };
            }
            L::PositionArea => self.style.rare_mut().position_area = position_area_value(value)?,
            L::PositionTryFallbacks => self.style.rare_mut().position_try_fallbacks = try_fallbacks(value)?,
            L::PositionTryOrder => {
                self.style.rare_mut().position_try_order = PositionTryOrder::from_ident(ident(value)?)?;
            }
            L::PositionVisibility => self.style.rare_mut().position_visibility = position_visibility(value)?,
            L::JustifySelf => self.style.rare_mut().justify_self = self_alignment(value)?,
            L::AlignSelf => self.style.rare_mut().align_self = self_alignment(value)?,
            L::GridColumnStart | L::GridColumnEnd | L::GridRowStart | L::GridRowEnd => {
                let line = match value {
                    CssValue::Integer(n) if *n != 0 => GridLine::Line(*n),
                    CssValue::Ident(kw) if &**kw == "auto" => GridLine::Auto,
                    _ => return None,
                };
                let rare = self.style.rare_mut();
                match id {
                    L::GridColumnStart => rare.grid_column.start = line,
                    L::GridColumnEnd => rare.grid_column.end = line,
                    L::GridRowStart => rare.grid_row.start = line,
                    _ => rare.grid_row.end = line,
                }
            }
            L::GridTemplateColumns | L::GridTemplateRows => {
                let tracks: Vec<f32> = match value {
                    CssValue::Ident(kw) if &**kw == "none" => Vec::new(),
                    CssValue::List(items) => {
                        items.iter().map(|item| self.px(id, item)).collect::<Option<Vec<_>>>()?
                    }
                    single => vec![self.px(id, single)?],
                };
                let rare = self.style.rare_mut();
                if id == L::GridTemplateColumns {
                    rare.grid_template_columns = tracks;
                } else {
                    rare.grid_template_rows = tracks;
                }
            }
        }
        Some(())
    }

    /// Copy the computed value of `id` from `from`
    fn copy_property(&mut self, id: LonghandId, from: &Style) {
        use LonghandId as L;
        let style = &mut self.style;
        match id {
            L::WritingMode => style.inherited_mut().writing_mode = from.inherited().writing_mode,
            L::Direction => style.inherited_mut().direction = from.inherited().direction,
            L::Zoom => {
                let zoom = from.box_data().zoom;
                self.set_zoom(zoom);
            }
            L::FontFamily => style.inherited_mut().font_family = Atom::clone(&from.inherited().font_family),
            L::FontSize => style.inherited_mut().font_size = from.inherited().font_size,
            L::FontStyle => style.inherited_mut().font_style = from.inherited().font_style,
            L::FontWeight => style.inherited_mut().font_weight = from.inherited().font_weight,
            L::LineHeight => style.inherited_mut().line_height = from.inherited().line_height,
            L::Color => style.inherited_mut().color = from.inherited().color,
            L::Visibility => style.inherited_mut().visibility = from.inherited().visibility,
            L::WhiteSpace => style.inherited_mut().white_space = from.inherited().white_space,
            L::TextAlign => style.inherited_mut().text_align = from.inherited().text_align,
            L::Display => style.box_data_mut().display = from.box_data().display,
            L::Position => style.box_data_mut().position = from.box_data().position,
            L::Float => style.box_data_mut().float = from.box_data().float,
            L::ColumnSpan => style.box_data_mut().column_span = from.box_data().column_span,
            L::Width => style.box_data_mut().width = from.box_data().width,
            L::Height => style.box_data_mut().height = from.box_data().height,
            L::MinWidth => style.box_data_mut().min_width = from.box_data().min_width,
            L::MinHeight => style.box_data_mut().min_height = from.box_data().min_height,
            L::MaxWidth => style.box_data_mut().max_width = from.box_data().max_width,
            L::MaxHeight => style.box_data_mut().max_height = from.box_data().max_height,
            L::AspectRatio => style.box_data_mut().aspect_ratio = from.box_data().aspect_ratio,
            L::Opacity => style.box_data_mut().opacity = from.box_data().opacity,
            L::ZIndex => style.box_data_mut().z_index = from.box_data().z_index,
            L::MarginTop => style.surround_mut().margin.top = from.surround().margin.top,
            L::MarginRight => style.surround_mut().margin.right = from.surround().margin.right,
            L::MarginBottom => style.surround_mut().margin.bottom = from.surround().margin.bottom,
            L::MarginLeft => style.surround_mut().margin.left = from.surround().margin.left,
            L::PaddingTop => style.surround_mut().padding.top = from.surround().padding.top,
            L::PaddingRight => style.surround_mut().padding.right = from.surround().padding.right,
            L::PaddingBottom => style.surround_mut().padding.bottom = from.surround().padding.bottom,
            L::PaddingLeft => style.surround_mut().padding.left = from.surround().padding.left,
            L::BorderTopWidth => style.surround_mut().border_width.top = from.surround().border_width.top,
            L::BorderRightWidth => style.surround_mut().border_width.right = from.surround().border_width.right,
            L::BorderBottomWidth => style.surround_mut().border_width.bottom = from.surround().border_width.bottom,
            L::BorderLeftWidth => style.surround_mut().border_width.left = from.surround().border_width.left,
            L::Top => style.surround_mut().inset.top = from.surround().inset.top,
            L::Right => style.surround_mut().inset.right = from.surround().inset.right,
            L::Bottom => style.surround_mut().inset.bottom = from.surround().inset.bottom,
            L::Left => style.surround_mut().inset.left = from.surround().inset.left,
            L::BackgroundColor => style.rare_mut().background_color = from.rare().background_color,
            L::BackgroundImage => style.rare_mut().background_image = from.rare().background_image.clone(),
            L::Content => style.rare_mut().content = from.rare().content.clone(),
            L::ContainerType => style.rare_mut().container_type = from.rare().container_type,
            L::ContainerName => style.rare_mut().container_names = from.rare().container_names.clone(),
            L::AnchorName => style.rare_mut().anchor_names = from.rare().anchor_names.clone(),
            L::PositionAnchor => style.rare_mut().position_anchor = from.rare().position_anchor.clone(),
            L::PositionArea => style.rare_mut().position_area = from.rare().position_area,
            L::PositionTryFallbacks => {
                style.rare_mut().position_try_fallbacks = from.rare().position_try_fallbacks.clone();
            }
            L::PositionTryOrder => style.rare_mut().position_try_order = from.rare().position_try_order,
            L::PositionVisibility => style.rare_mut().position_visibility = from.rare().position_visibility,
            L::JustifySelf => style.rare_mut().justify_self = from.rare().justify_self,
            L::AlignSelf => style.rare_mut().align_self = from.rare().align_self,
            L::GridColumnStart => style.rare_mut().grid_column.start = from.rare().grid_column.start,
            L::GridColumnEnd => style.rare_mut().grid_column.end = from.rare().grid_column.end,
            L::GridRowStart => style.rare_mut().grid_row.start = from.rare().grid_row.start,
            L::GridRowEnd => style.rare_mut().grid_row.end = from.rare().grid_row.end,
            L::GridTemplateColumns => {
                style.rare_mut().grid_template_columns = from.rare().grid_template_columns.clone();
            }
            L::GridTemplateRows => style.rare_mut().grid_template_rows = from.rare().grid_template_rows.clone(),
        }
    }
}
