//! Style change classification
//!
//! Diffs an element's old and new computed style and decides how much of its
//! subtree has to be revisited.

use bitflags::bitflags;

use crate::element_data::Validity;
use crate::style::Style;
use crate::values::Atom;

bitflags! {
    /// Kinds of difference between two computed styles
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Change: u8 {
        const NON_INHERITED = 1 << 0;
        /// Inherited values outside the fast-path set changed
        const INHERITED = 1 << 1;
        /// Only fast-path inheritable values changed among the inherited ones
        const FAST_PATH_INHERITED = 1 << 2;
        /// Query container type or names changed
        const CONTAINER = 1 << 3;
        /// The box for this element must be rebuilt
        const RENDERER = 1 << 4;
    }
}

/// How many descendants must be re-resolved after an element changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum DescendantsToResolve {
    #[default]
    None,
    /// Boxes must be rebuilt but existing styles can be reused
    RebuildAllUsingExisting,
    /// Only children that used `inherit` explicitly
    ChildrenWithExplicitInherit,
    Children,
    All,
}

/// Classify the difference between `old` and `new`
pub fn compute_change(old: Option<&Style>, new: &Style) -> Change {
    let Some(old) = old else {
        return Change::RENDERER;
    };
    let mut change = Change::empty();

    let old_box = old.box_data();
    let new_box = new.box_data();
    if old.display() != new.display() || old.rare().content != new.rare().content {
        change |= Change::RENDERER;
    }
    let out_of_flow_toggled = old.is_floating() != new.is_floating()
        || old.is_out_of_flow_positioned() != new.is_out_of_flow_positioned();
    if old_box.column_span != new_box.column_span && out_of_flow_toggled {
        change |= Change::RENDERER;
    }

    let (old_rare, new_rare) = (old.rare(), new.rare());
    if old_rare.container_type != new_rare.container_type || old_rare.container_names != new_rare.container_names {
        change |= Change::CONTAINER;
    }

    if !old.inherited_equal_ignoring_fast_path(new) {
        change |= Change::INHERITED;
    } else if !old.fast_path_inherited_equal(new) {
        change |= Change::FAST_PATH_INHERITED;
    }
    if !old.non_inherited_equal(new) || old.is_force_hidden() != new.is_force_hidden() {
        change |= Change::NON_INHERITED;
    }
    change
}

/// Whether any custom property looked at by a `style()` container query
/// differs between the two styles
pub fn style_query_properties_changed<'a>(
    old: Option<&Style>,
    new: &Style,
    properties: impl IntoIterator<Item = &'a Atom>,
) -> bool {
    let Some(old) = old else { return false };
    if old.custom_properties_equal(new) {
        return false;
    }
    properties.into_iter().any(|name| old.custom_property(name) != new.custom_property(name))
}

/// Descendant work implied by an element's change
pub fn compute_descendants_to_resolve(
    change: Change,
    validity: Validity,
    style_query_properties_changed: bool,
) -> DescendantsToResolve {
    if validity == Validity::SubtreeInvalid
        || change.intersects(Change::RENDERER | Change::CONTAINER)
        || style_query_properties_changed
    {
        return DescendantsToResolve::All;
    }
    if change.intersects(Change::INHERITED | Change::FAST_PATH_INHERITED) {
        return DescendantsToResolve::Children;
    }
    if change.contains(Change::NON_INHERITED) {
        return DescendantsToResolve::ChildrenWithExplicitInherit;
    }
    DescendantsToResolve::None
}

/// Whether a change to the document element's style invalidates lengths
/// relative to the root font
pub fn root_change_affects_relative_units(old: Option<&Style>, new: &Style) -> bool {
    let Some(old) = old else { return true };
    let (a, b) = (old.inherited(), new.inherited());
    a.font_family != b.font_family
        || a.font_size != b.font_size
        || a.font_style != b.font_style
        || a.font_weight != b.font_weight
        || old.used_line_height() != new.used_line_height()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{ColumnSpan, ContainerType, Display, Float};
    use crate::values::{Color, CssValue};
    use std::sync::Arc;

    #[test]
    fn test_identical_styles_have_no_change() {
        let style = Style::initial();
        assert_eq!(compute_change(Some(&style), &style.clone()), Change::empty());
        assert_eq!(compute_change(None, &style), Change::RENDERER);
    }

    #[test]
    fn test_inherited_vs_fast_path() {
        let old = Style::initial();
        let mut new = old.clone();
        new.inherited_mut().color = Color::RED;
        assert_eq!(compute_change(Some(&old), &new), Change::FAST_PATH_INHERITED);

        new.inherited_mut().font_size = 30.0;
        assert_eq!(compute_change(Some(&old), &new), Change::INHERITED);
    }

    #[test]
    fn test_renderer_changes() {
        let old = Style::initial();
        let mut new = old.clone();
        new.box_data_mut().display = Display::Block;
        assert!(compute_change(Some(&old), &new).contains(Change::RENDERER));

        let mut spanning = old.clone();
        spanning.box_data_mut().column_span = ColumnSpan::All;
        assert_eq!(compute_change(Some(&old), &spanning), Change::NON_INHERITED);
        spanning.box_data_mut().float = Float::Left;
        assert!(compute_change(Some(&old), &spanning).contains(Change::RENDERER));

        let mut hidden = old.clone();
        hidden.set_force_hidden(true);
        assert_eq!(compute_change(Some(&old), &hidden), Change::NON_INHERITED);

        let mut container = old.clone();
        container.rare_mut().container_type = ContainerType::Size;
        assert!(compute_change(Some(&old), &container).contains(Change::CONTAINER));
    }

    #[test]
    fn test_descendants_to_resolve() {
        use DescendantsToResolve as D;
        assert_eq!(compute_descendants_to_resolve(Change::empty(), Validity::Valid, false), D::None);
        assert_eq!(compute_descendants_to_resolve(Change::NON_INHERITED, Validity::Valid, false), D::ChildrenWithExplicitInherit);
        assert_eq!(compute_descendants_to_resolve(Change::FAST_PATH_INHERITED, Validity::Valid, false), D::Children);
        assert_eq!(compute_descendants_to_resolve(Change::CONTAINER, Validity::Valid, false), D::All);
        assert_eq!(compute_descendants_to_resolve(Change::empty(), Validity::SubtreeInvalid, false), D::All);
        assert_eq!(compute_descendants_to_resolve(Change::NON_INHERITED, Validity::Valid, true), D::All);
    }

    #[test]
    fn test_root_font_changes_affect_relative_units() {
        let old = Style::initial();
        assert!(root_change_affects_relative_units(None, &old));
        let mut new = old.clone();
        new.inherited_mut().color = Color::RED;
        assert!(!root_change_affects_relative_units(Some(&old), &new));
        new.inherited_mut().font_size = 20.0;
        assert!(root_change_affects_relative_units(Some(&old), &new));

        let mut taller = old.clone();
        taller.inherited_mut().line_height = crate::style::LineHeight::Px(40.0);
        assert!(root_change_affects_relative_units(Some(&old), &taller));
    }

    #[test]
    fn test_style_query_property_change() {
        let old = Style::initial();
        let mut new = old.clone();
        new.custom_properties_mut().insert(Atom::from("--theme"), Arc::new(CssValue::ident("dark")));
        let watched = [Atom::from("--theme")];
        let unrelated = [Atom::from("--other")];
        assert!(style_query_properties_changed(Some(&old), &new, &watched));
        assert!(!style_query_properties_changed(Some(&old), &new, &unrelated));
    }
}
