//! Match-Result Cache
//!
//! Remembers, per element, the declarations that matched and the style the
//! cascade produced from them, keyed on the identity of the element's inline
//! style object. When only inline values changed, the tree resolver can reuse
//! the match result and reapply just the properties whose values changed.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::declarations::{InlineStyle, InlineStyleId};
use crate::match_result::MatchResult;
use crate::properties::{LonghandIdSet, PropertyId, PropertyPriority};
use crate::style::Style;
use crate::values::CssValue;
use fos_dom::NodeId;

/// Inline style state captured when the entry was built
#[derive(Debug, Clone)]
struct InlineSnapshot {
    id: InlineStyleId,
    properties: Vec<(PropertyId, Arc<CssValue>)>,
}

impl InlineSnapshot {
    fn capture(inline: &InlineStyle) -> Self {
        Self {
            id: inline.id(),
            properties: inline.block().iter().map(|d| (d.property.clone(), Arc::clone(&d.value))).collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct MatchResultCacheEntry {
    unadjusted_style: Arc<Style>,
    match_result: Arc<MatchResult>,
    parent_style: Arc<Style>,
    inline: InlineSnapshot,
}

/// Which properties must be reapplied on a cache hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangedProperties {
    /// A change may affect how other properties resolve; reapply everything
    All,
    /// Only these normal-priority longhands changed
    Only(LonghandIdSet),
}

/// Usable cache entry with the current inline style spliced in
#[derive(Debug, Clone)]
pub struct CachedMatchResult {
    pub unadjusted_style: Arc<Style>,
    pub match_result: MatchResult,
    pub changed: ChangedProperties,
}

/// Outcome of a lookup, for statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    Hit,
    Miss,
    /// An entry existed but no longer matched the inline style
    Invalidated,
}

/// Per-element match-result cache
#[derive(Debug, Default)]
pub struct MatchResultCache {
    entries: FxHashMap<NodeId, MatchResultCacheEntry>,
}

impl MatchResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for `element` if its inline style object is the one
    /// recorded and carries the same property ids in the same order.
    pub fn lookup(
        &mut self,
        element: NodeId,
        inline: Option<&InlineStyle>,
        parent_style: &Arc<Style>,
    ) -> (Option<CachedMatchResult>, CacheLookup) {
        let Some(entry) = self.entries.get_mut(&element) else {
            return (None, CacheLookup::Miss);
        };
        let Some(inline) = inline else {
            self.entries.remove(&element);
            return (None, CacheLookup::Invalidated);
        };
        let block = inline.block();
        let same_ids = entry.inline.id == inline.id()
            && entry.inline.properties.len() == block.len()
            && entry.inline.properties.iter().zip(block.iter()).all(|((id, _), d)| *id == d.property);
        if !same_ids {
            tracing::trace!(%element, "inline style shape changed, dropping match result cache entry");
            self.entries.remove(&element);
            return (None, CacheLookup::Invalidated);
        }
        if !Arc::ptr_eq(&entry.parent_style, parent_style) && *entry.parent_style != **parent_style {
            return (None, CacheLookup::Miss);
        }

        let changed = compute_and_update_changed_properties(&mut entry.inline, inline);
        let result = CachedMatchResult {
            unadjusted_style: Arc::clone(&entry.unadjusted_style),
            match_result: entry.match_result.with_inline_block(inline.snapshot()),
            changed,
        };
        (Some(result), CacheLookup::Hit)
    }

    /// Record the result of a full resolution. Without an inline style any
    /// existing entry is dropped.
    pub fn set(
        &mut self,
        element: NodeId,
        inline: Option<&InlineStyle>,
        unadjusted_style: Arc<Style>,
        match_result: Arc<MatchResult>,
        parent_style: Arc<Style>,
    ) {
        match inline {
            Some(inline) if match_result.is_cacheable => {
                self.entries.insert(
                    element,
                    MatchResultCacheEntry {
                        unadjusted_style,
                        match_result,
                        parent_style,
                        inline: InlineSnapshot::capture(inline),
                    },
                );
            }
            _ => {
                self.entries.remove(&element);
            }
        }
    }

    /// Keep the entry usable after `element` took its parent's fast-path
    /// inheritable values without a cascade.
    pub fn update_for_fast_path_inherit(&mut self, element: NodeId, parent_style: &Arc<Style>) {
        let Some(entry) = self.entries.get_mut(&element) else { return };
        let mut style = (*entry.unadjusted_style).clone();
        style.fast_path_inherit_from(parent_style);
        entry.unadjusted_style = Arc::new(style);
        entry.parent_style = Arc::clone(parent_style);
    }

    pub fn remove(&mut self, element: NodeId) {
        self.entries.remove(&element);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Diff the snapshot against the live inline style by value pointer and
/// adopt the live values.
fn compute_and_update_changed_properties(snapshot: &mut InlineSnapshot, inline: &InlineStyle) -> ChangedProperties {
    let mut changed = LonghandIdSet::new();
    let mut needs_all = false;
    for ((property, old), current) in snapshot.properties.iter_mut().zip(inline.block().iter()) {
        if Arc::ptr_eq(old, &current.value) {
            continue;
        }
        match property.as_longhand() {
            Some(id)
                if id.priority() == PropertyPriority::Normal
                    && old.is_context_free()
                    && current.value.is_context_free() =>
            {
                changed.insert(id)
            }
            _ => needs_all = true,
        }
        *old = Arc::clone(&current.value);
    }
    if needs_all { ChangedProperties::All } else { ChangedProperties::Only(changed) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::LonghandId;

    fn entry_for(cache: &mut MatchResultCache, element: NodeId, inline: &InlineStyle, parent: &Arc<Style>) {
        cache.set(
            element,
            Some(inline),
            Arc::new(Style::initial()),
            Arc::new(MatchResult::new().with_inline_block(inline.snapshot())),
            Arc::clone(parent),
        );
    }

    #[test]
    fn test_value_change_is_partial() {
        let element = NodeId::ROOT;
        let parent = Arc::new(Style::initial());
        let mut inline = InlineStyle::new();
        inline.set(LonghandId::Width.into(), CssValue::px(10.0), false);
        inline.set(LonghandId::Color.into(), CssValue::ident("red"), false);
        let mut cache = MatchResultCache::new();
        entry_for(&mut cache, element, &inline, &parent);

        inline.set(LonghandId::Width.into(), CssValue::px(20.0), false);
        let (hit, outcome) = cache.lookup(element, Some(&inline), &parent);
        assert_eq!(outcome, CacheLookup::Hit);
        let hit = hit.unwrap();
        assert_eq!(hit.changed, ChangedProperties::Only([LonghandId::Width].into_iter().collect()));
        assert_eq!(hit.match_result.declarations[0].block.len(), 2);

        // The snapshot adopted the new pointer, so a second lookup sees no change.
        let (hit, _) = cache.lookup(element, Some(&inline), &parent);
        assert_eq!(hit.unwrap().changed, ChangedProperties::Only(LonghandIdSet::new()));
    }

    #[test]
    fn test_high_priority_or_custom_change_reapplies_all() {
        let element = NodeId::ROOT;
        let parent = Arc::new(Style::initial());
        let mut inline = InlineStyle::new();
        inline.set(LonghandId::LineHeight.into(), CssValue::Number(1.0), false);
        inline.set(PropertyId::custom("--gap"), CssValue::px(1.0), false);
        let mut cache = MatchResultCache::new();
        entry_for(&mut cache, element, &inline, &parent);

        inline.set(LonghandId::LineHeight.into(), CssValue::Number(2.0), false);
        assert_eq!(cache.lookup(element, Some(&inline), &parent).0.unwrap().changed, ChangedProperties::All);

        inline.set(PropertyId::custom("--gap"), CssValue::px(2.0), false);
        assert_eq!(cache.lookup(element, Some(&inline), &parent).0.unwrap().changed, ChangedProperties::All);
    }

    #[test]
    fn test_added_property_invalidates() {
        let element = NodeId::ROOT;
        let parent = Arc::new(Style::initial());
        let mut inline = InlineStyle::new();
        inline.set(LonghandId::Width.into(), CssValue::px(10.0), false);
        let mut cache = MatchResultCache::new();
        entry_for(&mut cache, element, &inline, &parent);

        inline.set(LonghandId::Height.into(), CssValue::px(10.0), false);
        let (hit, outcome) = cache.lookup(element, Some(&inline), &parent);
        assert!(hit.is_none());
        assert_eq!(outcome, CacheLookup::Invalidated);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_fast_path_inherit_refreshes_entry() {
        let element = NodeId::ROOT;
        let parent = Arc::new(Style::initial());
        let mut inline = InlineStyle::new();
        inline.set(LonghandId::Width.into(), CssValue::px(10.0), false);
        let mut cache = MatchResultCache::new();
        entry_for(&mut cache, element, &inline, &parent);

        let mut recolored = Style::initial();
        recolored.inherited_mut().color = crate::values::Color::RED;
        let recolored = Arc::new(recolored);
        assert_eq!(cache.lookup(element, Some(&inline), &recolored).1, CacheLookup::Miss);

        cache.update_for_fast_path_inherit(element, &recolored);
        let (hit, outcome) = cache.lookup(element, Some(&inline), &recolored);
        assert_eq!(outcome, CacheLookup::Hit);
        assert_eq!(hit.unwrap().unadjusted_style.color(), crate::values::Color::RED);
    }

    #[test]
    fn test_new_inline_object_invalidates() {
        let element = NodeId::ROOT;
        let parent = Arc::new(Style::initial());
        let inline = InlineStyle::new();
        let mut cache = MatchResultCache::new();
        entry_for(&mut cache, element, &inline, &parent);

        let replacement = InlineStyle::new();
        assert_eq!(cache.lookup(element, Some(&replacement), &parent).1, CacheLookup::Invalidated);
        assert_eq!(cache.lookup(element, None, &parent).1, CacheLookup::Miss);
    }
}
