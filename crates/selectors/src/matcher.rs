//! Selector matching engine.
//! See <https://www.w3.org/TR/selectors-3/>

use crate::{
    Combinator, ComplexSelector, CompoundSelector, ElementAdapter, SelectorList, SimpleSelector,
};

/// Match a selector list against an element.
pub fn matches_selector_list<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    list: &SelectorList,
) -> bool {
    list.selectors
        .iter()
        .any(|selector_item| matches_complex(adapter, element, selector_item))
}

/// Match a complex selector against an element, right to left.
pub fn matches_complex<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
) -> bool {
    let rightmost = sel.rest.last().map_or(&sel.first, |pair| &pair.1);
    if !matches_compound(adapter, element, rightmost) {
        return false;
    }
    matches_leftwards(adapter, element, sel, sel.rest.len())
}

/// `element` already matched the compound at `depth` (0 = `sel.first`);
/// check that everything to its left matches as well.
fn matches_leftwards<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
    depth: usize,
) -> bool {
    let Some(index) = depth.checked_sub(1) else {
        return true;
    };
    let Some(&(combinator, _)) = sel.rest.get(index) else {
        return false;
    };
    let left = if index == 0 {
        &sel.first
    } else {
        match sel.rest.get(index - 1) {
            Some(pair) => &pair.1,
            None => return false,
        }
    };
    let accept = |candidate: A::Handle| {
        matches_compound(adapter, candidate, left)
            && matches_leftwards(adapter, candidate, sel, index)
    };
    match combinator {
        Combinator::Child => adapter.parent(element).is_some_and(accept),
        Combinator::AdjacentSibling => adapter.previous_sibling_element(element).is_some_and(accept),
        Combinator::Descendant => {
            let mut current = adapter.parent(element);
            while let Some(ancestor) = current {
                if accept(ancestor) {
                    return true;
                }
                current = adapter.parent(ancestor);
            }
            false
        }
        Combinator::GeneralSibling => {
            let mut current = adapter.previous_sibling_element(element);
            while let Some(sibling) = current {
                if accept(sibling) {
                    return true;
                }
                current = adapter.previous_sibling_element(sibling);
            }
            false
        }
    }
}

/// Match a compound selector against a single element.
pub fn matches_compound<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    compound: &CompoundSelector,
) -> bool {
    compound.simples.iter().all(|simple| match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(type_name) => adapter.tag_name(element) == type_name.as_str(),
        SimpleSelector::Class(class_name) => adapter.has_class(element, class_name),
        SimpleSelector::IdSelector(id_value) => adapter
            .element_id(element)
            .is_some_and(|value| value == id_value.as_str()),
        SimpleSelector::AttrExists { name } => adapter.attr(element, name).is_some(),
        SimpleSelector::AttrEquals { name, value } => adapter
            .attr(element, name)
            .is_some_and(|attr_value| attr_value == value.as_str()),
    })
}
