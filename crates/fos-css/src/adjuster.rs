//! Style adjustment
//!
//! Fix-ups applied after the cascade that depend on the element's context
//! rather than its declarations.

use crate::style::{Display, Float, Style};

/// Where the style being adjusted sits in the tree
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjustContext<'a> {
    pub parent: Option<&'a Style>,
    pub is_document_element: bool,
}

/// Blockify floats, out-of-flow boxes, the root and flex/grid items
pub fn adjust(style: &mut Style, ctx: AdjustContext<'_>) {
    let display = style.display();
    if display == Display::None {
        return;
    }
    if ctx.is_document_element && display == Display::Contents {
        style.box_data_mut().display = Display::Block;
        return;
    }

    let out_of_flow = style.is_out_of_flow_positioned();
    if out_of_flow && style.is_floating() {
        style.box_data_mut().float = Float::None;
    }

    let parent_is_item_container =
        ctx.parent.is_some_and(|parent| matches!(parent.display(), Display::Flex | Display::Grid));
    let blockify = ctx.is_document_element || out_of_flow || style.is_floating() || parent_is_item_container;
    if blockify && display != Display::Contents {
        let blockified = display.blockified();
        if blockified != display {
            style.box_data_mut().display = blockified;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Position;

    #[test]
    fn test_floats_and_positioned_blockify() {
        let mut style = Style::initial();
        style.box_data_mut().float = Float::Left;
        adjust(&mut style, AdjustContext::default());
        assert_eq!(style.display(), Display::Block);

        let mut style = Style::initial();
        style.box_data_mut().position = Position::Absolute;
        style.box_data_mut().float = Float::Right;
        style.box_data_mut().display = Display::InlineBlock;
        adjust(&mut style, AdjustContext::default());
        assert_eq!(style.display(), Display::Block);
        assert!(!style.is_floating());
    }

    #[test]
    fn test_root_and_flex_items() {
        let mut root = Style::initial();
        root.box_data_mut().display = Display::Contents;
        adjust(&mut root, AdjustContext { parent: None, is_document_element: true });
        assert_eq!(root.display(), Display::Block);

        let mut flex = Style::initial();
        flex.box_data_mut().display = Display::Flex;
        let mut item = Style::inherit_from(&flex);
        adjust(&mut item, AdjustContext { parent: Some(&flex), is_document_element: false });
        assert_eq!(item.display(), Display::Block);

        let mut hidden = Style::initial();
        hidden.box_data_mut().display = Display::None;
        hidden.box_data_mut().float = Float::Left;
        adjust(&mut hidden, AdjustContext::default());
        assert_eq!(hidden.display(), Display::None);
    }
}
