//! Stylist
//!
//! Holds the active rules for a document and turns them into ranked match
//! results for elements. Container query conditions are evaluated here
//! against the nearest ancestor query container's laid-out size.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::declarations::{DeclarationBlock, InlineStyle, Origin, RuleSpecificity};
use crate::element_data::ElementDataMap;
use crate::layout_queries::LayoutQueries;
use crate::match_result::{DeclarationSource, MatchResult};
use crate::properties::LonghandId;
use crate::selectors::Selector;
use crate::style::{ContainerType, PseudoId, Style};
use crate::values::{Atom, CssValue};
use fos_dom::{DomTree, NodeId};

/// `@container` condition
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerCondition {
    MinWidth(f32),
    MaxWidth(f32),
    MinHeight(f32),
    MaxHeight(f32),
    /// `style(--name: value)`
    Style { name: Atom, value: CssValue },
    And(Box<ContainerCondition>, Box<ContainerCondition>),
    Not(Box<ContainerCondition>),
}

impl ContainerCondition {
    pub fn style(name: &str, value: CssValue) -> Self {
        Self::Style { name: Atom::from(name), value }
    }

    pub fn and(self, other: ContainerCondition) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    fn has_size_features(&self) -> bool {
        match self {
            Self::MinWidth(_) | Self::MaxWidth(_) | Self::MinHeight(_) | Self::MaxHeight(_) => true,
            Self::Style { .. } => false,
            Self::And(a, b) => a.has_size_features() || b.has_size_features(),
            Self::Not(inner) => inner.has_size_features(),
        }
    }

    fn collect_style_properties(&self, out: &mut FxHashSet<Atom>) {
        match self {
            Self::Style { name, .. } => {
                out.insert(Atom::clone(name));
            }
            Self::And(a, b) => {
                a.collect_style_properties(out);
                b.collect_style_properties(out);
            }
            Self::Not(inner) => inner.collect_style_properties(out),
            _ => {}
        }
    }
}

/// `@container [name] <condition>`
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerQuery {
    pub name: Option<Atom>,
    pub condition: ContainerCondition,
}

impl ContainerQuery {
    pub fn new(name: Option<&str>, condition: ContainerCondition) -> Self {
        Self { name: name.map(Atom::from), condition }
    }
}

/// Style rule
#[derive(Debug, Clone)]
pub struct Rule {
    pub selector: Selector,
    pub block: Arc<DeclarationBlock>,
    pub origin: Origin,
    pub container: Option<ContainerQuery>,
    /// Declared inside `@starting-style`
    pub starting_style: bool,
}

impl Rule {
    pub fn new(origin: Origin, selector: Selector, block: DeclarationBlock) -> Self {
        Self { selector, block: Arc::new(block), origin, container: None, starting_style: false }
    }

    pub fn author(selector: Selector, block: DeclarationBlock) -> Self {
        Self::new(Origin::Author, selector, block)
    }

    pub fn with_container(mut self, query: ContainerQuery) -> Self {
        self.container = Some(query);
        self
    }

    pub fn in_starting_style(mut self) -> Self {
        self.starting_style = true;
        self
    }
}

/// What the rules need to see while matching
pub struct MatchingContext<'a> {
    pub dom: &'a DomTree,
    pub styles: &'a ElementDataMap,
    pub layout: &'a dyn LayoutQueries,
}

impl MatchingContext<'_> {
    /// Nearest composed-tree ancestor able to answer `query`
    fn find_container(&self, element: NodeId, query: &ContainerQuery, needs_size: bool) -> Option<(NodeId, &Style)> {
        let mut current = self.dom.composed_parent_element(element);
        while let Some(ancestor) = current {
            if let Some(style) = self.styles.style(ancestor) {
                let name_matches = query
                    .name
                    .as_ref()
                    .is_none_or(|name| style.rare().container_names.iter().any(|n| n == name));
                if name_matches && (!needs_size || style.is_query_container()) {
                    return Some((ancestor, style));
                }
            }
            current = self.dom.composed_parent_element(ancestor);
        }
        None
    }

    fn evaluate_container_query(&self, element: NodeId, query: &ContainerQuery) -> bool {
        let needs_size = query.condition.has_size_features();
        let Some((container, style)) = self.find_container(element, query, needs_size) else {
            return false;
        };
        self.evaluate_condition(container, style, &query.condition)
    }

    fn evaluate_condition(&self, container: NodeId, style: &Style, condition: &ContainerCondition) -> bool {
        let size = || self.layout.content_size(container);
        let height_queryable = style.rare().container_type == ContainerType::Size;
        match condition {
            ContainerCondition::MinWidth(w) => size().is_some_and(|s| s.width >= *w),
            ContainerCondition::MaxWidth(w) => size().is_some_and(|s| s.width <= *w),
            ContainerCondition::MinHeight(h) => height_queryable && size().is_some_and(|s| s.height >= *h),
            ContainerCondition::MaxHeight(h) => height_queryable && size().is_some_and(|s| s.height <= *h),
            ContainerCondition::Style { name, value } => {
                style.custom_property(name).is_some_and(|actual| **actual == *value)
            }
            ContainerCondition::And(a, b) => {
                self.evaluate_condition(container, style, a) && self.evaluate_condition(container, style, b)
            }
            ContainerCondition::Not(inner) => !self.evaluate_condition(container, style, inner),
        }
    }
}

/// Document rule set
#[derive(Debug, Default)]
pub struct Stylist {
    rules: Vec<Rule>,
    position_try_rules: FxHashMap<Atom, Arc<DeclarationBlock>>,
    version: u64,
    has_container_queries: bool,
    style_query_properties: FxHashSet<Atom>,
    pseudo_elements_with_rules: SmallVec<[PseudoId; 4]>,
}

impl Stylist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stylist preloaded with the default user agent display rules
    pub fn with_default_user_agent_sheet() -> Self {
        const BLOCK: &[&str] = &[
            "html", "body", "div", "p", "main", "section", "article", "aside", "header", "footer", "nav", "ul",
            "ol", "h1", "h2", "h3", "form", "dialog",
        ];
        const HIDDEN: &[&str] = &["head", "style", "script", "title", "template", "meta", "link"];

        let mut stylist = Self::new();
        let sheet = BLOCK
            .iter()
            .map(|tag| (*tag, "block"))
            .chain(HIDDEN.iter().map(|tag| (*tag, "none")))
            .chain([("li", "list-item")]);
        for (tag, display) in sheet {
            if let Ok(selector) = Selector::parse(tag) {
                let block = DeclarationBlock::new().with(LonghandId::Display, CssValue::ident(display));
                stylist.add_rule(Rule::new(Origin::UserAgent, selector, block));
            }
        }
        stylist
    }

    pub fn add_rule(&mut self, rule: Rule) {
        if let Some(query) = &rule.container {
            self.has_container_queries = true;
            query.condition.collect_style_properties(&mut self.style_query_properties);
        }
        if let Some(pseudo) = rule.selector.pseudo_element() {
            if !self.pseudo_elements_with_rules.contains(&pseudo) {
                self.pseudo_elements_with_rules.push(pseudo);
            }
        }
        self.rules.push(rule);
        self.version += 1;
    }

    /// Register a named `@position-try` block. Only inset, margin, sizing,
    /// self-alignment and anchor-reference properties are kept.
    pub fn add_position_try_rule(&mut self, name: &str, block: DeclarationBlock) {
        let filtered = block.filtered(LonghandId::is_allowed_in_position_try);
        self.position_try_rules.insert(Atom::from(name), Arc::new(filtered));
        self.version += 1;
    }

    pub fn position_try_rule(&self, name: &str) -> Option<&Arc<DeclarationBlock>> {
        self.position_try_rules.get(name)
    }

    pub fn clear(&mut self) {
        self.rules.clear();
        self.position_try_rules.clear();
        self.style_query_properties.clear();
        self.pseudo_elements_with_rules.clear();
        self.has_container_queries = false;
        self.version += 1;
    }

    /// Bumped on every rule change
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn has_container_queries(&self) -> bool {
        self.has_container_queries
    }

    /// Custom properties some `style()` container query looks at
    pub fn style_query_properties(&self) -> &FxHashSet<Atom> {
        &self.style_query_properties
    }

    pub fn has_rules_for_pseudo(&self, pseudo: PseudoId) -> bool {
        self.pseudo_elements_with_rules.contains(&pseudo)
    }

    /// Rank every rule matching `element` (or its `pseudo`) by origin,
    /// specificity and source order, then append the inline style.
    pub fn match_element(
        &self,
        ctx: &MatchingContext<'_>,
        element: NodeId,
        pseudo: Option<PseudoId>,
        inline: Option<&InlineStyle>,
    ) -> MatchResult {
        let mut result = self.collect(ctx, element, pseudo, false);
        if pseudo.is_none() {
            if let Some(inline) = inline.filter(|i| !i.block().is_empty()) {
                result.push(inline.snapshot(), Origin::Author, RuleSpecificity::INLINE, DeclarationSource::Inline);
            }
        }
        result
    }

    /// Match result including `@starting-style` rules, if any of them match
    pub fn match_starting_style(&self, ctx: &MatchingContext<'_>, element: NodeId) -> Option<MatchResult> {
        let has_starting_rule = self
            .rules
            .iter()
            .any(|r| r.starting_style && r.selector.pseudo_element().is_none() && r.selector.matches(ctx.dom, element));
        has_starting_rule.then(|| self.collect(ctx, element, None, true))
    }

    /// Pseudo-elements with at least one rule matching `element`
    pub fn matched_pseudo_elements(&self, ctx: &MatchingContext<'_>, element: NodeId) -> SmallVec<[PseudoId; 4]> {
        let mut found: SmallVec<[PseudoId; 4]> = SmallVec::new();
        for pseudo in &self.pseudo_elements_with_rules {
            let matched = self.rules.iter().any(|rule| {
                !rule.starting_style
                    && rule.selector.pseudo_element() == Some(*pseudo)
                    && rule.selector.matches(ctx.dom, element)
            });
            if matched {
                found.push(*pseudo);
            }
        }
        found
    }

    fn collect(
        &self,
        ctx: &MatchingContext<'_>,
        element: NodeId,
        pseudo: Option<PseudoId>,
        include_starting_style: bool,
    ) -> MatchResult {
        let mut result = MatchResult::new();
        let mut matched: Vec<(Origin, RuleSpecificity, usize)> = Vec::new();
        for (index, rule) in self.rules.iter().enumerate() {
            if (rule.starting_style && !include_starting_style) || rule.selector.pseudo_element() != pseudo {
                continue;
            }
            if !rule.selector.matches(ctx.dom, element) {
                continue;
            }
            if let Some(query) = &rule.container {
                result.is_cacheable = false;
                if !ctx.evaluate_container_query(element, query) {
                    continue;
                }
            }
            matched.push((rule.origin, rule.selector.specificity(), index));
        }
        matched.sort_unstable();
        for (origin, specificity, index) in matched {
            let block = Arc::clone(&self.rules[index].block);
            result.push(block, origin, specificity, DeclarationSource::Rule);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element_data::ElementDataMap;
    use crate::layout_queries::NoLayout;

    #[test]
    fn test_ranking() {
        let mut dom = DomTree::new();
        let div = dom.create_element("div");
        dom.set_attribute(div, "class", "box").unwrap();
        dom.append_child(dom.root(), div).unwrap();

        let mut stylist = Stylist::with_default_user_agent_sheet();
        let author_class = DeclarationBlock::new().with(LonghandId::Color, CssValue::ident("red"));
        let author_type = DeclarationBlock::new().with(LonghandId::Color, CssValue::ident("blue"));
        let user = DeclarationBlock::new().with(LonghandId::Color, CssValue::ident("green"));
        stylist.add_rule(Rule::author(Selector::parse(".box").unwrap(), author_class));
        stylist.add_rule(Rule::author(Selector::parse("div").unwrap(), author_type));
        stylist.add_rule(Rule::new(Origin::User, Selector::parse("div").unwrap(), user));

        let styles = ElementDataMap::default();
        let ctx = MatchingContext { dom: &dom, styles: &styles, layout: &NoLayout };
        let mut inline = InlineStyle::new();
        inline.set(LonghandId::Width.into(), CssValue::px(5.0), false);
        let result = stylist.match_element(&ctx, div, None, Some(&inline));

        let origins: Vec<_> = result.declarations.iter().map(|d| (d.origin, d.source)).collect();
        assert_eq!(
            origins,
            vec![
                (Origin::UserAgent, DeclarationSource::Rule),
                (Origin::User, DeclarationSource::Rule),
                (Origin::Author, DeclarationSource::Rule),
                (Origin::Author, DeclarationSource::Rule),
                (Origin::Author, DeclarationSource::Inline),
            ]
        );
        // Type selector ranks below the class selector despite coming later.
        assert_eq!(result.declarations[2].specificity, RuleSpecificity::new(0, 0, 1));
        assert!(result.is_cacheable);
    }

    #[test]
    fn test_version_and_query_bookkeeping() {
        let mut stylist = Stylist::new();
        assert_eq!(stylist.version(), 0);
        let query = ContainerQuery::new(None, ContainerCondition::style("--theme", CssValue::ident("dark")).and(ContainerCondition::MinWidth(10.0)));
        stylist.add_rule(Rule::author(Selector::parse("p").unwrap(), DeclarationBlock::new()).with_container(query));
        stylist.add_position_try_rule("--below", DeclarationBlock::new().with(LonghandId::Color, CssValue::ident("red")));
        assert_eq!(stylist.version(), 2);
        assert!(stylist.has_container_queries());
        assert!(stylist.style_query_properties().contains("--theme"));
        assert!(stylist.position_try_rule("--below").unwrap().is_empty());
    }

    #[test]
    fn test_container_query_without_layout_fails() {
        let mut dom = DomTree::new();
        let outer = dom.create_element("section");
        let inner = dom.create_element("p");
        dom.append_child(dom.root(), outer).unwrap();
        dom.append_child(outer, inner).unwrap();

        let mut styles = ElementDataMap::default();
        let mut container = Style::initial();
        container.rare_mut().container_type = ContainerType::InlineSize;
        styles.ensure(outer).style = Some(Arc::new(container));

        let mut stylist = Stylist::new();
        let query = ContainerQuery::new(None, ContainerCondition::MinWidth(0.0));
        stylist.add_rule(Rule::author(Selector::parse("p").unwrap(), DeclarationBlock::new()).with_container(query));

        let ctx = MatchingContext { dom: &dom, styles: &styles, layout: &NoLayout };
        let result = stylist.match_element(&ctx, inner, None, None);
        assert!(result.is_empty());
        assert!(!result.is_cacheable);
    }
}
