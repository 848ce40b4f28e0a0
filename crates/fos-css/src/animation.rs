//! Animation hook
//!
//! The resolver hands every freshly built style to an `AnimationController`
//! together with the element's previous style. Keyframe blending itself lives
//! outside this crate.

use bitflags::bitflags;

use crate::properties::LonghandIdSet;
use crate::style::{PseudoId, Style};
use fos_dom::NodeId;

bitflags! {
    /// Side effects of applying an animation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AnimationImpact: u8 {
        const REQUIRES_RECOMPOSITE = 1 << 0;
        const FORCES_STACKING_CONTEXT = 1 << 1;
    }
}

/// Output of keyframe blending
#[derive(Debug, Clone)]
pub struct AnimatedStyle {
    pub style: Style,
    pub impact: AnimationImpact,
    /// Properties whose values came from an animation
    pub animated_properties: LonghandIdSet,
}

/// Source of animated styles
pub trait AnimationController {
    /// Blend running animations for `element` between `old` and `new`.
    /// `None` when nothing is animating.
    fn animate(&mut self, element: NodeId, pseudo: Option<PseudoId>, old: Option<&Style>, new: &Style)
    -> Option<AnimatedStyle>;
}

/// Controller with no running animations
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAnimations;

impl AnimationController for NoAnimations {
    fn animate(
        &mut self,
        _element: NodeId,
        _pseudo: Option<PseudoId>,
        _old: Option<&Style>,
        _new: &Style,
    ) -> Option<AnimatedStyle> {
        None
    }
}
