//! Selectors
//!
//! Compound selectors joined by descendant and child combinators, with an
//! optional trailing pseudo-element. Matching runs right to left.

use smallvec::SmallVec;

use crate::declarations::RuleSpecificity;
use crate::style::PseudoId;
use fos_dom::{DomTree, NodeId};

/// Selector parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorParseError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected character {0:?} at offset {1}")]
    UnexpectedChar(char, usize),
    #[error("unexpected end of selector")]
    UnexpectedEnd,
    #[error("unknown pseudo-class or pseudo-element `{0}`")]
    UnknownPseudo(String),
    #[error("unterminated attribute selector")]
    UnterminatedAttribute,
    #[error("pseudo-element must be the last component")]
    PseudoElementNotLast,
}

/// Simple selector within a compound
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    Type(Box<str>),
    Id(Box<str>),
    Class(Box<str>),
    Attribute { name: Box<str>, value: Option<Box<str>> },
    FirstChild,
    LastChild,
    Root,
}

/// Relationship between two compounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    simple: SmallVec<[SimpleSelector; 2]>,
}

impl Compound {
    fn matches(&self, dom: &DomTree, element: NodeId) -> bool {
        let Some(data) = dom.element(element) else {
            return false;
        };
        self.simple.iter().all(|simple| match simple {
            SimpleSelector::Universal => true,
            SimpleSelector::Type(name) => data.local_name == *name,
            SimpleSelector::Id(id) => data.id.as_deref() == Some(&**id),
            SimpleSelector::Class(class) => data.has_class(class),
            SimpleSelector::Attribute { name, value } => match (data.get_attr(name), value) {
                (Some(actual), Some(expected)) => actual == &**expected,
                (Some(_), None) => true,
                (None, _) => false,
            },
            SimpleSelector::FirstChild => {
                selector_parent(dom, element).is_some() && dom.previous_element_sibling(element).is_none()
            }
            SimpleSelector::LastChild => {
                selector_parent(dom, element).is_some() && dom.next_element_sibling(element).is_none()
            }
            SimpleSelector::Root => dom.parent(element) == dom.root(),
        })
    }
}

/// Parent element within the same tree scope
fn selector_parent(dom: &DomTree, element: NodeId) -> Option<NodeId> {
    let parent = dom.parent(element);
    dom.is_element(parent).then_some(parent)
}

/// Parsed complex selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// Rightmost (subject) compound first
    compounds: SmallVec<[Compound; 3]>,
    /// `combinators[i]` joins `compounds[i]` to `compounds[i + 1]`
    combinators: SmallVec<[Combinator; 2]>,
    pseudo_element: Option<PseudoId>,
    specificity: RuleSpecificity,
}

impl Selector {
    /// Parse selector text such as `main > .card:first-child::before`
    pub fn parse(text: &str) -> Result<Self, SelectorParseError> {
        Parser::new(text).parse()
    }

    pub fn specificity(&self) -> RuleSpecificity {
        self.specificity
    }

    pub fn pseudo_element(&self) -> Option<PseudoId> {
        self.pseudo_element
    }

    /// Whether the selector matches `element` (ignoring the pseudo-element)
    pub fn matches(&self, dom: &DomTree, element: NodeId) -> bool {
        self.matches_from(dom, element, 0)
    }

    fn matches_from(&self, dom: &DomTree, element: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(dom, element) {
            return false;
        }
        let Some(combinator) = self.combinators.get(index) else {
            return true;
        };
        match combinator {
            Combinator::Child => {
                selector_parent(dom, element).is_some_and(|parent| self.matches_from(dom, parent, index + 1))
            }
            Combinator::Descendant => {
                let mut current = selector_parent(dom, element);
                while let Some(ancestor) = current {
                    if self.matches_from(dom, ancestor, index + 1) {
                        return true;
                    }
                    current = selector_parent(dom, ancestor);
                }
                false
            }
        }
    }
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    fn unexpected(&self) -> SelectorParseError {
        match self.peek() {
            Some(c) => SelectorParseError::UnexpectedChar(c, self.pos),
            None => SelectorParseError::UnexpectedEnd,
        }
    }

    fn ident(&mut self) -> Result<&'a str, SelectorParseError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            self.bump();
        }
        if start == self.pos {
            return Err(self.unexpected());
        }
        Ok(&self.text[start..self.pos])
    }

    fn parse(mut self) -> Result<Selector, SelectorParseError> {
        let mut compounds: SmallVec<[Compound; 3]> = SmallVec::new();
        let mut combinators: SmallVec<[Combinator; 2]> = SmallVec::new();
        let mut pseudo_element = None;

        loop {
            let saw_whitespace = self.skip_whitespace();
            if self.peek().is_none() {
                break;
            }
            if !compounds.is_empty() {
                if pseudo_element.is_some() {
                    return Err(SelectorParseError::PseudoElementNotLast);
                }
                if self.peek() == Some('>') {
                    self.bump();
                    self.skip_whitespace();
                    combinators.push(Combinator::Child);
                } else if saw_whitespace {
                    combinators.push(Combinator::Descendant);
                } else {
                    return Err(self.unexpected());
                }
            }
            compounds.push(self.compound(&mut pseudo_element)?);
        }

        if compounds.is_empty() {
            return Err(SelectorParseError::Empty);
        }
        if combinators.len() + 1 != compounds.len() {
            return Err(SelectorParseError::UnexpectedEnd);
        }

        let (mut ids, mut classes, mut types) = (0u8, 0u8, 0u8);
        for simple in compounds.iter().flat_map(|c| c.simple.iter()) {
            match simple {
                SimpleSelector::Id(_) => ids = ids.saturating_add(1),
                SimpleSelector::Class(_)
                | SimpleSelector::Attribute { .. }
                | SimpleSelector::FirstChild
                | SimpleSelector::LastChild
                | SimpleSelector::Root => classes = classes.saturating_add(1),
                SimpleSelector::Type(_) => types = types.saturating_add(1),
                SimpleSelector::Universal => {}
            }
        }
        if pseudo_element.is_some() {
            types = types.saturating_add(1);
        }

        compounds.reverse();
        combinators.reverse();
        Ok(Selector {
            compounds,
            combinators,
            pseudo_element,
            specificity: RuleSpecificity::new(ids, classes, types),
        })
    }

    fn compound(&mut self, pseudo_element: &mut Option<PseudoId>) -> Result<Compound, SelectorParseError> {
        let mut compound = Compound::default();
        loop {
            match self.peek() {
                None | Some('>') => break,
                Some(c) if c.is_whitespace() => break,
                Some(_) if pseudo_element.is_some() => return Err(SelectorParseError::PseudoElementNotLast),
                Some('*') => {
                    self.bump();
                    compound.simple.push(SimpleSelector::Universal);
                }
                Some('#') => {
                    self.bump();
                    compound.simple.push(SimpleSelector::Id(self.ident()?.into()));
                }
                Some('.') => {
                    self.bump();
                    compound.simple.push(SimpleSelector::Class(self.ident()?.into()));
                }
                Some('[') => {
                    self.bump();
                    compound.simple.push(self.attribute()?);
                }
                Some(':') => {
                    self.bump();
                    if self.peek() == Some(':') {
                        self.bump();
                        let name = self.ident()?;
                        let pseudo = PseudoId::from_name(&name.to_ascii_lowercase())
                            .ok_or_else(|| SelectorParseError::UnknownPseudo(name.to_string()))?;
                        *pseudo_element = Some(pseudo);
                    } else {
                        let name = self.ident()?;
                        compound.simple.push(match name.to_ascii_lowercase().as_str() {
                            "first-child" => SimpleSelector::FirstChild,
                            "last-child" => SimpleSelector::LastChild,
                            "root" => SimpleSelector::Root,
                            _ => return Err(SelectorParseError::UnknownPseudo(name.to_string())),
                        });
                    }
                }
                Some(c) if c.is_alphabetic() || c == '-' || c == '_' => {
                    if !compound.simple.is_empty() {
                        return Err(self.unexpected());
                    }
                    let name = self.ident()?.to_ascii_lowercase();
                    compound.simple.push(SimpleSelector::Type(name.into()));
                }
                Some(_) => return Err(self.unexpected()),
            }
        }
        if compound.simple.is_empty() {
            if pseudo_element.is_none() {
                return Err(self.unexpected());
            }
            compound.simple.push(SimpleSelector::Universal);
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<SimpleSelector, SelectorParseError> {
        self.skip_whitespace();
        let name: Box<str> = self.ident()?.to_ascii_lowercase().into();
        self.skip_whitespace();
        let value = match self.bump() {
            Some(']') => return Ok(SimpleSelector::Attribute { name, value: None }),
            Some('=') => {
                self.skip_whitespace();
                let value = match self.peek() {
                    Some(quote @ ('"' | '\'')) => {
                        self.bump();
                        let start = self.pos;
                        while self.peek().is_some_and(|c| c != quote) {
                            self.bump();
                        }
                        let value = &self.text[start..self.pos];
                        if self.bump().is_none() {
                            return Err(SelectorParseError::UnterminatedAttribute);
                        }
                        value
                    }
                    _ => self.ident()?,
                };
                Some(value.into())
            }
            _ => return Err(SelectorParseError::UnterminatedAttribute),
        };
        self.skip_whitespace();
        if self.bump() != Some(']') {
            return Err(SelectorParseError::UnterminatedAttribute);
        }
        Ok(SimpleSelector::Attribute { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut dom = DomTree::new();
        let html = dom.create_element("html");
        dom.append_child(dom.root(), html).unwrap();
        let main = dom.create_element("main");
        dom.set_attribute(main, "id", "content").unwrap();
        dom.append_child(html, main).unwrap();
        let card = dom.create_element("div");
        dom.set_attribute(card, "class", "card wide").unwrap();
        dom.set_attribute(card, "data-kind", "note").unwrap();
        dom.append_child(main, card).unwrap();
        (dom, html, main, card)
    }

    #[test]
    fn test_specificity() {
        let s = Selector::parse("#content > div.card:first-child::before").unwrap();
        assert_eq!(s.specificity(), RuleSpecificity::new(1, 2, 2));
        assert_eq!(s.pseudo_element(), Some(PseudoId::Before));
    }

    #[test]
    fn test_matching() {
        let (dom, html, main, card) = tree();
        assert!(Selector::parse("html .card").unwrap().matches(&dom, card));
        assert!(Selector::parse("main > div.wide").unwrap().matches(&dom, card));
        assert!(!Selector::parse("html > div").unwrap().matches(&dom, card));
        assert!(Selector::parse("[data-kind='note']").unwrap().matches(&dom, card));
        assert!(Selector::parse("[data-kind]").unwrap().matches(&dom, card));
        assert!(!Selector::parse("[data-kind=todo]").unwrap().matches(&dom, card));
        assert!(Selector::parse(":root").unwrap().matches(&dom, html));
        assert!(Selector::parse("#content").unwrap().matches(&dom, main));
        assert!(Selector::parse("div:first-child:last-child").unwrap().matches(&dom, card));
        assert!(Selector::parse("::marker").unwrap().matches(&dom, card));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Selector::parse("  "), Err(SelectorParseError::Empty));
        assert!(matches!(Selector::parse("div >"), Err(SelectorParseError::UnexpectedEnd)));
        assert!(matches!(Selector::parse(":hover"), Err(SelectorParseError::UnknownPseudo(_))));
        assert_eq!(Selector::parse("[x"), Err(SelectorParseError::UnterminatedAttribute));
        assert_eq!(Selector::parse("p::before span"), Err(SelectorParseError::PseudoElementNotLast));
        assert!(matches!(Selector::parse("a+b"), Err(SelectorParseError::UnexpectedChar('+', 1))));
    }
}
