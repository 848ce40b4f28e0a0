//! Style resolution over whole documents
//!
//! Drives the tree resolver without a layout engine and checks what each
//! pass resolves, reuses and reports.

use fos_css::{
    Change, Color, CssValue, DeclarationBlock, Dimension, Display, LonghandId, NoAnimations, NoLayout, PseudoId,
    ResolutionSession, ResolverConfig, Rule, Selector, StyleScope, Stylist, TreeResolver, Update,
};
use fos_dom::{DomTree, NodeId};

struct Doc {
    dom: DomTree,
    html: NodeId,
    body: NodeId,
    div: NodeId,
    text: NodeId,
}

fn doc() -> Doc {
    let mut dom = DomTree::new();
    let html = dom.create_element("html");
    let body = dom.create_element("body");
    let div = dom.create_element("div");
    let text = dom.create_text("hello");
    dom.append_child(dom.root(), html).unwrap();
    dom.append_child(html, body).unwrap();
    dom.append_child(body, div).unwrap();
    dom.append_child(div, text).unwrap();
    Doc { dom, html, body, div, text }
}

fn stylist() -> Stylist {
    let mut stylist = Stylist::with_default_user_agent_sheet();
    stylist.add_rule(Rule::author(
        Selector::parse("html").unwrap(),
        DeclarationBlock::new().with(LonghandId::Color, CssValue::ident("blue")),
    ));
    stylist
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).try_init();
}

fn resolve(dom: &DomTree, scope: &mut StyleScope, session: &mut ResolutionSession) -> Update {
    TreeResolver::new(dom, scope, session, &NoLayout, &mut NoAnimations).resolve()
}

#[test]
fn test_first_pass_styles_every_element() {
    init_tracing();
    let d = doc();
    let mut scope = StyleScope::new(stylist(), ResolverConfig::default());
    let mut session = ResolutionSession::new();
    assert!(scope.needs_style_recalc(&d.dom));

    let update = resolve(&d.dom, &mut scope, &mut session);
    assert_eq!(update.len(), 3);
    for element in [d.html, d.body, d.div] {
        assert_eq!(update.element(element).unwrap().change, Change::RENDERER);
        assert_eq!(scope.computed_style(element).unwrap().color(), Color::BLUE);
    }
    assert_eq!(scope.computed_style(d.div).unwrap().display(), Display::Block);
    assert!(update.texts().any(|(node, _)| node == d.text));
    assert!(!scope.needs_style_recalc(&d.dom));
}

#[test]
fn test_clean_tree_resolves_nothing() {
    let d = doc();
    let mut scope = StyleScope::new(stylist(), ResolverConfig::default());
    let mut session = ResolutionSession::new();
    resolve(&d.dom, &mut scope, &mut session);

    let update = resolve(&d.dom, &mut scope, &mut session);
    assert!(update.is_empty());
}

#[test]
fn test_color_change_takes_fast_path() {
    let d = doc();
    let mut scope = StyleScope::new(stylist(), ResolverConfig::default());
    let mut session = ResolutionSession::new();
    resolve(&d.dom, &mut scope, &mut session);

    scope.set_inline_property(&d.dom, d.html, LonghandId::Color, CssValue::ident("red"), false);
    let mut session = ResolutionSession::new();
    let update = resolve(&d.dom, &mut scope, &mut session);

    assert_eq!(update.element(d.html).unwrap().change, Change::FAST_PATH_INHERITED);
    assert_eq!(session.stats().fast_path_inherits, 2);
    assert_eq!(scope.computed_style(d.div).unwrap().color(), Color::RED);
}

#[test]
fn test_font_size_change_recascades_children() {
    let d = doc();
    let mut scope = StyleScope::new(stylist(), ResolverConfig::default());
    let mut session = ResolutionSession::new();
    resolve(&d.dom, &mut scope, &mut session);

    scope.set_inline_property(&d.dom, d.body, LonghandId::FontSize, CssValue::px(30.0), false);
    let mut session = ResolutionSession::new();
    let update = resolve(&d.dom, &mut scope, &mut session);

    assert!(update.element(d.html).is_none());
    assert!(update.element(d.body).unwrap().change.contains(Change::INHERITED));
    assert_eq!(session.stats().fast_path_inherits, 0);
    assert_eq!(scope.computed_style(d.div).unwrap().font_size(), 30.0);
}

#[test]
fn test_repeated_inline_edit_hits_match_result_cache() {
    let d = doc();
    let mut scope = StyleScope::new(stylist(), ResolverConfig::default());
    let mut session = ResolutionSession::new();
    scope.set_inline_property(&d.dom, d.div, LonghandId::Width, CssValue::px(10.0), false);
    resolve(&d.dom, &mut scope, &mut session);
    assert_eq!(scope.match_result_cache().len(), 1);

    scope.set_inline_property(&d.dom, d.div, LonghandId::Width, CssValue::px(20.0), false);
    let mut session = ResolutionSession::new();
    let update = resolve(&d.dom, &mut scope, &mut session);

    assert_eq!(session.stats().cache_partial_hits, 1);
    assert_eq!(update.element(d.div).unwrap().change, Change::NON_INHERITED);
    let width = scope.computed_style(d.div).unwrap().box_data().width;
    assert_eq!(width, Dimension::Px(20.0));
}

#[test]
fn test_display_none_drops_descendant_styles() {
    let d = doc();
    let mut scope = StyleScope::new(stylist(), ResolverConfig::default());
    let mut session = ResolutionSession::new();
    resolve(&d.dom, &mut scope, &mut session);

    scope.set_inline_property(&d.dom, d.body, LonghandId::Display, CssValue::ident("none"), false);
    let mut session = ResolutionSession::new();
    let update = resolve(&d.dom, &mut scope, &mut session);

    assert!(update.element(d.body).unwrap().change.contains(Change::RENDERER));
    assert!(update.element(d.div).is_none());
    assert!(scope.computed_style(d.div).is_none());
}

#[test]
fn test_rule_change_restyles_document() {
    let d = doc();
    let mut scope = StyleScope::new(stylist(), ResolverConfig::default());
    let mut session = ResolutionSession::new();
    resolve(&d.dom, &mut scope, &mut session);

    scope.stylist_mut().add_rule(Rule::author(
        Selector::parse("div").unwrap(),
        DeclarationBlock::new().with(LonghandId::Width, CssValue::px(5.0)),
    ));
    assert!(scope.needs_style_recalc(&d.dom));
    let mut session = ResolutionSession::new();
    let update = resolve(&d.dom, &mut scope, &mut session);

    assert_eq!(update.len(), 3);
    assert_eq!(update.element(d.html).unwrap().change, Change::empty());
    assert_eq!(update.element(d.div).unwrap().change, Change::NON_INHERITED);
}

#[test]
fn test_generated_content() {
    let d = doc();
    let mut stylist = stylist();
    stylist.add_rule(Rule::author(
        Selector::parse("div::before").unwrap(),
        DeclarationBlock::new().with(LonghandId::Content, CssValue::string("*")),
    ));
    stylist.add_rule(Rule::author(
        Selector::parse("body::after").unwrap(),
        DeclarationBlock::new().with(LonghandId::Color, CssValue::ident("red")),
    ));
    let mut scope = StyleScope::new(stylist, ResolverConfig::default());
    let mut session = ResolutionSession::new();
    resolve(&d.dom, &mut scope, &mut session);

    let before = scope.pseudo_style(d.div, PseudoId::Before).unwrap();
    assert_eq!(before.color(), Color::BLUE);
    // No `content`, no box.
    assert!(scope.pseudo_style(d.body, PseudoId::After).is_none());
}

#[test]
fn test_deep_trees_are_cut_off() {
    let mut dom = DomTree::new();
    let mut parent = dom.root();
    let mut chain = Vec::new();
    for _ in 0..6 {
        let div = dom.create_element("div");
        dom.append_child(parent, div).unwrap();
        chain.push(div);
        parent = div;
    }
    let config = ResolverConfig { max_tree_depth: 4, ..ResolverConfig::default() };
    let mut scope = StyleScope::new(Stylist::with_default_user_agent_sheet(), config);
    let mut session = ResolutionSession::new();
    resolve(&dom, &mut scope, &mut session);

    assert_eq!(scope.computed_style(chain[3]).unwrap().display(), Display::Block);
    assert_eq!(scope.computed_style(chain[4]).unwrap().display(), Display::None);
    assert!(scope.computed_style(chain[5]).is_none());
}

#[test]
fn test_root_font_size_change_reresolves_rem_users() {
    let d = doc();
    let mut stylist = stylist();
    stylist.add_rule(Rule::author(
        Selector::parse("body").unwrap(),
        DeclarationBlock::new().with(LonghandId::FontSize, CssValue::px(16.0)),
    ));
    stylist.add_rule(Rule::author(
        Selector::parse("div").unwrap(),
        DeclarationBlock::new().with(LonghandId::Width, CssValue::rem(2.0)),
    ));
    let mut scope = StyleScope::new(stylist, ResolverConfig::default());
    scope.set_inline_property(&d.dom, d.div, LonghandId::Height, CssValue::rem(1.0), false);
    let mut session = ResolutionSession::new();
    resolve(&d.dom, &mut scope, &mut session);
    assert_eq!(scope.computed_style(d.div).unwrap().box_data().width, Dimension::Px(32.0));

    // body pins its own font size, so only `rem` links div to the root.
    scope.set_inline_property(&d.dom, d.html, LonghandId::FontSize, CssValue::px(20.0), false);
    let mut session = ResolutionSession::new();
    let update = resolve(&d.dom, &mut scope, &mut session);

    assert!(update.element(d.div).is_some());
    let data = scope.computed_style(d.div).unwrap().box_data().clone();
    assert_eq!(data.width, Dimension::Px(40.0));
    assert_eq!(data.height, Dimension::Px(20.0));
    assert_eq!(session.stats().cache_partial_hits + session.stats().cache_full_hits, 0);
}

#[test]
fn test_root_color_change_keeps_fast_path() {
    let d = doc();
    let mut scope = StyleScope::new(stylist(), ResolverConfig::default());
    let mut session = ResolutionSession::new();
    resolve(&d.dom, &mut scope, &mut session);

    scope.set_inline_property(&d.dom, d.html, LonghandId::Color, CssValue::ident("green"), false);
    let mut session = ResolutionSession::new();
    resolve(&d.dom, &mut scope, &mut session);
    assert_eq!(session.stats().elements_resolved, 3);
    assert_eq!(session.stats().fast_path_inherits, 2);
}

#[test]
fn test_fast_path_inherit_keeps_match_result_cache_entry() {
    let d = doc();
    let mut scope = StyleScope::new(stylist(), ResolverConfig::default());
    scope.set_inline_property(&d.dom, d.div, LonghandId::Width, CssValue::px(10.0), false);
    let mut session = ResolutionSession::new();
    resolve(&d.dom, &mut scope, &mut session);

    scope.set_inline_property(&d.dom, d.body, LonghandId::Color, CssValue::ident("red"), false);
    let mut session = ResolutionSession::new();
    resolve(&d.dom, &mut scope, &mut session);
    assert_eq!(session.stats().fast_path_inherits, 1);

    scope.set_inline_property(&d.dom, d.div, LonghandId::Width, CssValue::px(20.0), false);
    let mut session = ResolutionSession::new();
    resolve(&d.dom, &mut scope, &mut session);

    assert_eq!(session.stats().cache_partial_hits, 1);
    assert_eq!(session.stats().cache_misses, 0);
    let style = scope.computed_style(d.div).unwrap();
    assert_eq!(style.color(), Color::RED);
    assert_eq!(style.box_data().width, Dimension::Px(20.0));
}

/// `div` with `::first-line` and `::first-letter` rules over `children`
fn first_line_doc(children: &[&str]) -> (DomTree, StyleScope, NodeId, Vec<NodeId>) {
    let mut dom = DomTree::new();
    let html = dom.create_element("html");
    let body = dom.create_element("body");
    let div = dom.create_element("div");
    dom.append_child(dom.root(), html).unwrap();
    dom.append_child(html, body).unwrap();
    dom.append_child(body, div).unwrap();
    let mut nodes = Vec::new();
    for child in children {
        let node = match child.strip_prefix('#') {
            Some(text) => dom.create_text(text),
            None => {
                // `outer>inner` nests one element with the text inside it
                let mut names = child.split('>');
                let element = dom.create_element(names.next().unwrap());
                let mut parent = element;
                for name in names {
                    let inner = dom.create_element(name);
                    dom.append_child(parent, inner).unwrap();
                    parent = inner;
                }
                let text = dom.create_text("words");
                dom.append_child(parent, text).unwrap();
                element
            }
        };
        dom.append_child(div, node).unwrap();
        nodes.push(node);
    }

    let mut stylist = stylist();
    stylist.add_rule(Rule::author(
        Selector::parse("div::first-line").unwrap(),
        DeclarationBlock::new().with(LonghandId::Color, CssValue::ident("red")),
    ));
    stylist.add_rule(Rule::author(
        Selector::parse("div::first-letter").unwrap(),
        DeclarationBlock::new().with(LonghandId::Color, CssValue::ident("green")),
    ));
    let scope = StyleScope::new(stylist, ResolverConfig::default());
    (dom, scope, div, nodes)
}

#[test]
fn test_first_line_goes_to_first_block_child_only() {
    let (dom, mut scope, _, nodes) = first_line_doc(&["p", "p"]);
    let (p1, p2) = (nodes[0], nodes[1]);
    let mut session = ResolutionSession::new();
    resolve(&dom, &mut scope, &mut session);

    assert_eq!(scope.pseudo_style(p1, PseudoId::FirstLine).unwrap().color(), Color::RED);
    assert_eq!(scope.pseudo_style(p1, PseudoId::FirstLetter).unwrap().color(), Color::GREEN);
    assert!(scope.pseudo_style(p2, PseudoId::FirstLine).is_none());
    assert!(scope.pseudo_style(p2, PseudoId::FirstLetter).is_none());

    // p1 is skipped this time but still owns the first line.
    scope.set_inline_property(&dom, p2, LonghandId::Width, CssValue::px(10.0), false);
    let mut session = ResolutionSession::new();
    let update = resolve(&dom, &mut scope, &mut session);
    assert!(update.element(p1).is_none());
    assert!(update.element(p2).is_some());
    assert!(scope.pseudo_style(p2, PseudoId::FirstLine).is_none());
    assert!(scope.pseudo_style(p2, PseudoId::FirstLetter).is_none());
    assert!(scope.pseudo_style(p1, PseudoId::FirstLine).is_some());
}

#[test]
fn test_leading_text_takes_first_line() {
    let (dom, mut scope, _, nodes) = first_line_doc(&["#  ", "p", "#lead", "p"]);
    let mut session = ResolutionSession::new();
    resolve(&dom, &mut scope, &mut session);
    // Blank text does not count; the first block still gets the first line.
    assert!(scope.pseudo_style(nodes[1], PseudoId::FirstLine).is_some());
    assert!(scope.pseudo_style(nodes[3], PseudoId::FirstLine).is_none());

    let (dom, mut scope, _, nodes) = first_line_doc(&["#lead", "p"]);
    let mut session = ResolutionSession::new();
    resolve(&dom, &mut scope, &mut session);
    assert!(scope.pseudo_style(nodes[1], PseudoId::FirstLine).is_none());
}

#[test]
fn test_first_line_reaches_nested_first_block() {
    let (dom, mut scope, _, nodes) = first_line_doc(&["section>p", "p"]);
    let section = nodes[0];
    let inner = dom.element_children(section).next().unwrap();

    let mut session = ResolutionSession::new();
    resolve(&dom, &mut scope, &mut session);
    assert!(scope.pseudo_style(section, PseudoId::FirstLine).is_some());
    assert_eq!(scope.pseudo_style(inner, PseudoId::FirstLine).unwrap().color(), Color::RED);
    assert!(scope.pseudo_style(nodes[1], PseudoId::FirstLine).is_none());
}
