//! Declarations and Cascade Levels
//!
//! Declaration blocks shared via `Arc`, the cascade level ordering used by
//! the builder, and the mutable inline style object of an element.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::properties::{LonghandId, PropertyId};
use crate::values::CssValue;

/// Style sheet origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Origin {
    UserAgent,
    User,
    Author,
}

/// Cascade level for ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CascadeLevel(pub u8);

impl CascadeLevel {
    pub const UA_NORMAL: CascadeLevel = CascadeLevel(0);
    pub const USER_NORMAL: CascadeLevel = CascadeLevel(1);
    pub const AUTHOR_NORMAL: CascadeLevel = CascadeLevel(2);
    /// Declarations from a chosen `@position-try` fallback
    pub const POSITION_FALLBACK: CascadeLevel = CascadeLevel(3);
    pub const AUTHOR_IMPORTANT: CascadeLevel = CascadeLevel(4);
    pub const USER_IMPORTANT: CascadeLevel = CascadeLevel(5);
    pub const UA_IMPORTANT: CascadeLevel = CascadeLevel(6);

    /// Levels in ascending precedence
    pub const ALL: [CascadeLevel; 7] = [
        Self::UA_NORMAL,
        Self::USER_NORMAL,
        Self::AUTHOR_NORMAL,
        Self::POSITION_FALLBACK,
        Self::AUTHOR_IMPORTANT,
        Self::USER_IMPORTANT,
        Self::UA_IMPORTANT,
    ];

    /// Level of a normal or important declaration from `origin`
    pub fn for_origin(origin: Origin, important: bool) -> Self {
        match (origin, important) {
            (Origin::UserAgent, false) => Self::UA_NORMAL,
            (Origin::User, false) => Self::USER_NORMAL,
            (Origin::Author, false) => Self::AUTHOR_NORMAL,
            (Origin::Author, true) => Self::AUTHOR_IMPORTANT,
            (Origin::User, true) => Self::USER_IMPORTANT,
            (Origin::UserAgent, true) => Self::UA_IMPORTANT,
        }
    }

    pub fn is_important(self) -> bool {
        self >= Self::AUTHOR_IMPORTANT
    }
}

/// CSS specificity (compact)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RuleSpecificity(pub u32);

impl RuleSpecificity {
    /// Inline style beats every selector
    pub const INLINE: RuleSpecificity = RuleSpecificity(1 << 24);

    pub fn new(ids: u8, classes: u8, types: u8) -> Self {
        Self(((ids as u32) << 16) | ((classes as u32) << 8) | (types as u32))
    }

    pub fn ids(&self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    pub fn classes(&self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    pub fn types(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

/// Single declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: PropertyId,
    pub value: Arc<CssValue>,
    pub important: bool,
}

/// Declaration block (shared via Arc)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclarationBlock {
    declarations: Vec<Declaration>,
}

impl DeclarationBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style normal declaration
    pub fn with(mut self, property: impl Into<PropertyId>, value: CssValue) -> Self {
        self.set(property.into(), value, false);
        self
    }

    /// Builder-style `!important` declaration
    pub fn with_important(mut self, property: impl Into<PropertyId>, value: CssValue) -> Self {
        self.set(property.into(), value, true);
        self
    }

    /// Builder-style custom property declaration
    pub fn with_custom(mut self, name: &str, value: CssValue) -> Self {
        self.set(PropertyId::custom(name), value, false);
        self
    }

    /// Set a declaration, replacing any existing one for the same property in place
    pub fn set(&mut self, property: PropertyId, value: CssValue, important: bool) {
        let value = Arc::new(value);
        match self.declarations.iter_mut().find(|d| d.property == property) {
            Some(existing) => {
                existing.value = value;
                existing.important = important;
            }
            None => self.declarations.push(Declaration { property, value, important }),
        }
    }

    /// Remove the declaration for `property`; returns whether it existed
    pub fn remove(&mut self, property: &PropertyId) -> bool {
        let before = self.declarations.len();
        self.declarations.retain(|d| &d.property != property);
        before != self.declarations.len()
    }

    pub fn get(&self, property: &PropertyId) -> Option<&Declaration> {
        self.declarations.iter().find(|d| &d.property == property)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Declaration> {
        self.declarations.iter()
    }

    pub fn has_custom_properties(&self) -> bool {
        self.declarations.iter().any(|d| d.property.is_custom())
    }

    /// Keep only longhands allowed by `filter`, dropping custom properties
    /// and `!important` flags
    pub fn filtered(&self, filter: impl Fn(LonghandId) -> bool) -> Self {
        Self {
            declarations: self
                .declarations
                .iter()
                .filter(|d| d.property.as_longhand().is_some_and(&filter))
                .map(|d| Declaration { important: false, ..d.clone() })
                .collect(),
        }
    }
}

/// Stable identity of an inline style object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InlineStyleId(u64);

impl InlineStyleId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// An element's mutable inline style (`style` attribute / CSSOM).
///
/// Changing a value replaces that declaration's `Arc<CssValue>` in place;
/// the object identity only changes when a new inline style object is created.
#[derive(Debug, Clone)]
pub struct InlineStyle {
    id: InlineStyleId,
    block: DeclarationBlock,
}

impl Default for InlineStyle {
    fn default() -> Self {
        Self::new()
    }
}

impl InlineStyle {
    pub fn new() -> Self {
        Self { id: InlineStyleId::next(), block: DeclarationBlock::new() }
    }

    pub fn from_block(block: DeclarationBlock) -> Self {
        Self { id: InlineStyleId::next(), block }
    }

    pub fn id(&self) -> InlineStyleId {
        self.id
    }

    pub fn block(&self) -> &DeclarationBlock {
        &self.block
    }

    pub fn set(&mut self, property: PropertyId, value: CssValue, important: bool) {
        self.block.set(property, value, important);
    }

    pub fn remove(&mut self, property: &PropertyId) -> bool {
        self.block.remove(property)
    }

    /// Immutable snapshot for a match result; values stay pointer-shared
    pub fn snapshot(&self) -> Arc<DeclarationBlock> {
        Arc::new(self.block.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cascade_level_order() {
        assert!(CascadeLevel::for_origin(Origin::User, true) > CascadeLevel::for_origin(Origin::Author, true));
        assert!(CascadeLevel::for_origin(Origin::Author, true) > CascadeLevel::POSITION_FALLBACK);
        assert!(CascadeLevel::POSITION_FALLBACK > CascadeLevel::AUTHOR_NORMAL);
        assert!(CascadeLevel::UA_IMPORTANT.is_important());
        assert!(!CascadeLevel::AUTHOR_NORMAL.is_important());
    }

    #[test]
    fn test_specificity_packing() {
        let s = RuleSpecificity::new(1, 2, 3);
        assert_eq!((s.ids(), s.classes(), s.types()), (1, 2, 3));
        assert!(RuleSpecificity::new(1, 0, 0) > RuleSpecificity::new(0, 255, 255));
        assert!(RuleSpecificity::INLINE > RuleSpecificity::new(255, 255, 255));
    }

    #[test]
    fn test_inline_set_replaces_value_pointer() {
        let mut inline = InlineStyle::new();
        inline.set(LonghandId::Width.into(), CssValue::px(10.0), false);
        let before = Arc::clone(&inline.block().iter().next().unwrap().value);
        let id = inline.id();

        inline.set(LonghandId::Width.into(), CssValue::px(20.0), false);
        let after = &inline.block().iter().next().unwrap().value;
        assert!(!Arc::ptr_eq(&before, after));
        assert_eq!(inline.block().len(), 1);
        assert_eq!(inline.id(), id);
        assert_ne!(InlineStyle::new().id(), id);
    }

    #[test]
    fn test_filtered_block() {
        let block = DeclarationBlock::new()
            .with(LonghandId::Top, CssValue::px(1.0))
            .with_important(LonghandId::Color, CssValue::CurrentColor)
            .with_custom("--x", CssValue::Number(1.0));
        let filtered = block.filtered(LonghandId::is_allowed_in_position_try);
        assert_eq!(filtered.len(), 1);
        assert!(filtered.get(&LonghandId::Top.into()).is_some());
    }
}
