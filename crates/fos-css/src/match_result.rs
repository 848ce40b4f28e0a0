//! Match Results
//!
//! The ranked list of declaration blocks that matched an element. Entries are
//! ordered by non-decreasing (origin, specificity, source order) so the
//! builder can resolve each cascade level by simple last-write-wins.

use std::sync::Arc;

use crate::declarations::{CascadeLevel, DeclarationBlock, Origin, RuleSpecificity};

/// Where a matched block came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationSource {
    Rule,
    Inline,
    /// `@position-try` fallback block; normal declarations only
    PositionTry,
}

/// One matched declaration block
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedDeclarations {
    pub block: Arc<DeclarationBlock>,
    pub origin: Origin,
    pub specificity: RuleSpecificity,
    pub source: DeclarationSource,
}

impl MatchedDeclarations {
    /// Cascade level of a declaration from this block, `None` if the
    /// declaration is not allowed to participate
    pub fn level(&self, important: bool) -> Option<CascadeLevel> {
        match self.source {
            DeclarationSource::PositionTry if important => None,
            DeclarationSource::PositionTry => Some(CascadeLevel::POSITION_FALLBACK),
            _ => Some(CascadeLevel::for_origin(self.origin, important)),
        }
    }
}

/// Ranked declarations for an element or pseudo-element
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub declarations: Vec<MatchedDeclarations>,
    /// False when matching depended on layout (container queries), so the
    /// result must not be reused across layout changes
    pub is_cacheable: bool,
    /// A matched block declares custom properties
    pub has_custom_properties: bool,
}

impl Default for MatchResult {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchResult {
    pub fn new() -> Self {
        Self { declarations: Vec::new(), is_cacheable: true, has_custom_properties: false }
    }

    pub fn push(&mut self, block: Arc<DeclarationBlock>, origin: Origin, specificity: RuleSpecificity, source: DeclarationSource) {
        self.has_custom_properties |= block.has_custom_properties();
        self.declarations.push(MatchedDeclarations { block, origin, specificity, source });
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Index of the inline style entry
    pub fn inline_index(&self) -> Option<usize> {
        self.declarations.iter().position(|d| d.source == DeclarationSource::Inline)
    }

    /// Copy of this result with the inline entry replaced by `block`
    pub fn with_inline_block(&self, block: Arc<DeclarationBlock>) -> Self {
        let mut result = self.clone();
        match result.inline_index() {
            Some(index) => result.declarations[index].block = block,
            None => result.push(block, Origin::Author, RuleSpecificity::INLINE, DeclarationSource::Inline),
        }
        result.has_custom_properties = result.declarations.iter().any(|d| d.block.has_custom_properties());
        result
    }

    /// Copy of this result with a position-try fallback block appended
    pub fn with_position_try(&self, block: Arc<DeclarationBlock>) -> Self {
        let mut result = self.clone();
        result.push(block, Origin::Author, RuleSpecificity::default(), DeclarationSource::PositionTry);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::LonghandId;
    use crate::values::CssValue;

    #[test]
    fn test_inline_replacement() {
        let rule = Arc::new(DeclarationBlock::new().with(LonghandId::Color, CssValue::ident("red")));
        let inline = Arc::new(DeclarationBlock::new().with(LonghandId::Width, CssValue::px(1.0)));
        let mut result = MatchResult::new();
        result.push(rule, Origin::Author, RuleSpecificity::new(0, 1, 0), DeclarationSource::Rule);
        result.push(inline, Origin::Author, RuleSpecificity::INLINE, DeclarationSource::Inline);

        let replaced = result.with_inline_block(Arc::new(DeclarationBlock::new().with_custom("--x", CssValue::Number(1.0))));
        assert_eq!(replaced.inline_index(), Some(1));
        assert!(replaced.has_custom_properties);
        assert!(!result.has_custom_properties);
    }

    #[test]
    fn test_position_try_level() {
        let result = MatchResult::new().with_position_try(Arc::new(DeclarationBlock::new()));
        let entry = &result.declarations[0];
        assert_eq!(entry.level(false), Some(CascadeLevel::POSITION_FALLBACK));
        assert_eq!(entry.level(true), None);
    }
}
