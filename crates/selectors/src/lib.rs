//! Selectors Level 3 element matching.
//! See <https://www.w3.org/TR/selectors-3/>
//!
//! This crate implements the subset needed to resolve declarative swap targets
//! and to find interactive elements in a document:
//! - Type, universal, class, id, attribute presence and attribute equals selectors
//! - Combinators: descendant, child, adjacent sibling, general sibling
//! - Comma separated selector lists
//!
//! Anything outside that subset (pseudo-classes, namespaces, `~=` and friends)
//! makes the whole list invalid, and an invalid list matches nothing.

mod matcher;
mod parser;

pub use matcher::{matches_complex, matches_compound, matches_selector_list};
pub use parser::{parse_complex_selector, parse_selector_list};

/// An adapter that abstracts DOM access for selector matching.
/// Implement this for your DOM layer.
pub trait ElementAdapter {
    type Handle: Copy + Eq;

    /// Parent element if any (document and fragment roots are not elements).
    fn parent(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Previous sibling element, skipping text and comment nodes.
    fn previous_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Tag name in ASCII lowercase (per HTML parsing conventions).
    fn tag_name(&self, element: Self::Handle) -> &str;

    /// Returns the attribute value if present.
    fn attr(&self, element: Self::Handle, name: &str) -> Option<&str>;

    /// Returns Some(id) if the element has an id attribute, else None.
    #[inline]
    fn element_id(&self, element: Self::Handle) -> Option<&str> {
        self.attr(element, "id")
    }

    /// True if the element has the given class token.
    #[inline]
    fn has_class(&self, element: Self::Handle, class: &str) -> bool {
        self.attr(element, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|token| token == class))
    }
}

/// Simple selectors (subset).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimpleSelector {
    /// Type selector, lower-cased.
    Type(String),
    /// Class selector; case-sensitive.
    Class(String),
    /// ID selector; case-sensitive.
    IdSelector(String),
    /// `[attr]`
    AttrExists { name: String },
    /// `[attr=value]`, value quoted or bare.
    AttrEquals { name: String, value: String },
    /// `*`
    Universal,
}

/// A compound selector is a sequence of simple selectors (no combinators).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

/// Combinators between compounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

/// A complex selector is one or more compounds separated by combinators.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    pub first: CompoundSelector,
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

/// A selector list separated by commas.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parse a selector list; an invalid list comes back empty.
    #[inline]
    pub fn parse(input: &str) -> Self {
        parse_selector_list(input).unwrap_or_default()
    }

    /// True when the list can never match (empty or invalid source).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}
