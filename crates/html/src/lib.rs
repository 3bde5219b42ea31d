#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

//! Host document for the fragment-exchange engine: an arena DOM with
//! html5ever parsing, selector queries, serialisation and form-control state.

pub mod dom;
pub mod parser;

pub use css_selectors::SelectorList;
pub use dom::forms::{FormEntry, FormValue};
pub use dom::{DOM, DOMNode, NodeId, NodeKind};
