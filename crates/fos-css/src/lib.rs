//! fOS Style System
//!
//! Cascade and style resolution: computed values, rule matching, the
//! cascade builder, change classification, anchor positioning state, and
//! the tree resolver that interleaves style passes with layout.

mod values;
mod properties;
mod declarations;
mod style;
mod selectors;
mod match_result;
mod match_result_cache;
mod layout_queries;
mod element_data;
mod stylist;
mod anchor;
mod builder;
mod adjuster;
mod change;
mod animation;
mod update;
mod config;
mod scope;
mod session;
mod tree_resolver;

pub use values::{
    AnchorFunction, AnchorSide, AnchorSizeDimension, AnchorSizeFunction, AreaSpan, Atom, Color, CssValue,
    CssWideKeyword, Image, Length, LengthUnit, PositionArea, Ratio, VarReference,
};
pub use properties::{LonghandId, LonghandIdSet, PropertyId, PropertyPriority};
pub use declarations::{
    CascadeLevel, Declaration, DeclarationBlock, InlineStyle, InlineStyleId, Origin, RuleSpecificity,
};
pub use style::{
    BoxData, ColumnSpan, Content, ContainerType, CustomPropertyMap, Dimension, Direction, Display, Edges,
    Float, FontStyle, GridLine, GridPlacement, InheritedData, ItemPosition, LineHeight, OverflowPosition,
    Position, PositionTryFallback, PositionTryOrder, PositionVisibility, PseudoId, RareData, SelfAlignment, Style, StyleColor,
    StyleFlags, SurroundData, TextAlign, TryTactic, Visibility, WhiteSpace, WritingMode,
};
pub use selectors::{Combinator, Selector, SelectorParseError, SimpleSelector};
pub use match_result::{DeclarationSource, MatchResult, MatchedDeclarations};
pub use match_result_cache::{CacheLookup, CachedMatchResult, ChangedProperties, MatchResultCache};
pub use layout_queries::{LayoutQueries, NoLayout};
pub use element_data::{ElementDataMap, ElementStyleData, ElementStyleFlags, Validity};
pub use stylist::{ContainerCondition, ContainerQuery, MatchingContext, Rule, Stylist};
pub use anchor::{
    AnchorEvaluator, AnchorKey, AnchorMap, AnchorPositionedState, AnchorQuery, AnchorStage,
    ElementAnchorEvaluator, PositionOptions, edge_distance,
};
pub use builder::{Builder, BuilderContext, PropertySelection, PropertyTypes};
pub use adjuster::{AdjustContext, adjust};
pub use change::{
    Change, DescendantsToResolve, compute_change, compute_descendants_to_resolve, root_change_affects_relative_units,
    style_query_properties_changed,
};
pub use animation::{AnimatedStyle, AnimationController, AnimationImpact, NoAnimations};
pub use update::{ElementUpdate, TextUpdate, Update};
pub use config::ResolverConfig;
pub use scope::StyleScope;
pub use session::{DeferredWork, ResolutionSession, ResolverStats, StageTransition};
pub use tree_resolver::{ResolutionType, TreeResolver, determine_resolution_type};
