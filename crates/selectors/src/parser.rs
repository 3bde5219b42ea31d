//! Selector parsing.

use crate::{Combinator, ComplexSelector, CompoundSelector, SelectorList, SimpleSelector};
use core::mem::take;

/// Internal tokenizer token kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Tok {
    /// A combinator token like child/adjacent/general sibling.
    Combinator(Combinator),
    /// Whitespace that implies a descendant combinator.
    DescendantWS,
    /// A simple selector token (type, class, id, attribute, universal).
    Simple(SimpleSelector),
}

/// Tokenizer over a selector string.
struct SelectorTokenizer<'src> {
    /// Underlying bytes of the selector.
    input_bytes: &'src [u8],
    /// Current cursor index into `input_bytes`.
    index: usize,
    /// Set when whitespace was skipped before the current token.
    pending_whitespace: bool,
}

impl<'src> SelectorTokenizer<'src> {
    fn new(input: &'src str) -> Self {
        Self {
            input_bytes: input.as_bytes(),
            index: 0,
            pending_whitespace: false,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input_bytes.get(self.index).copied()
    }

    fn bump(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    /// Return the next token, `Ok(None)` at end of input, `Err(())` on unsupported syntax.
    fn next_token(&mut self) -> Result<Option<Tok>, ()> {
        self.skip_whitespace_descendant();
        if take(&mut self.pending_whitespace) && self.peek().is_some() {
            return Ok(Some(Tok::DescendantWS));
        }
        let Some(current) = self.peek() else {
            return Ok(None);
        };
        let token = match current {
            b'*' => {
                self.bump();
                Tok::Simple(SimpleSelector::Universal)
            }
            b'.' => {
                self.bump();
                Tok::Simple(SimpleSelector::Class(self.consume_ident(false)?))
            }
            b'#' => {
                self.bump();
                Tok::Simple(SimpleSelector::IdSelector(self.consume_ident(false)?))
            }
            b'[' => self.consume_attr()?,
            b'>' => {
                self.bump();
                Tok::Combinator(Combinator::Child)
            }
            b'+' => {
                self.bump();
                Tok::Combinator(Combinator::AdjacentSibling)
            }
            b'~' => {
                self.bump();
                Tok::Combinator(Combinator::GeneralSibling)
            }
            _ => Tok::Simple(SimpleSelector::Type(self.consume_ident(true)?)),
        };
        Ok(Some(token))
    }

    /// Skip whitespace and mark that a descendant combinator may follow.
    fn skip_whitespace_descendant(&mut self) {
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.pending_whitespace = true;
            self.bump();
        }
    }

    /// Consume an identifier of ASCII alphanumerics, '-' and '_' (plus non-ASCII bytes).
    fn consume_ident(&mut self, lowercase: bool) -> Result<String, ()> {
        let start = self.index;
        while self
            .peek()
            .is_some_and(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || !byte.is_ascii())
        {
            self.bump();
        }
        let slice = self.input_bytes.get(start..self.index).unwrap_or(&[]);
        if slice.is_empty() {
            return Err(());
        }
        let ident = String::from_utf8_lossy(slice).into_owned();
        Ok(if lowercase { ident.to_ascii_lowercase() } else { ident })
    }

    /// Parse `[name]` and `[name=value]` (value quoted or unquoted).
    fn consume_attr(&mut self) -> Result<Tok, ()> {
        // skip '['
        self.bump();
        self.skip_spaces();
        let name = self.consume_ident(true)?;
        self.skip_spaces();
        let simple = match self.peek() {
            Some(b']') => SimpleSelector::AttrExists { name },
            Some(b'=') => {
                self.bump();
                self.skip_spaces();
                let value = match self.peek() {
                    Some(quote @ (b'"' | b'\'')) => {
                        self.bump();
                        self.consume_quoted_attr_value(quote)?
                    }
                    _ => self.consume_unquoted_attr_value()?,
                };
                self.skip_spaces();
                SimpleSelector::AttrEquals { name, value }
            }
            _ => return Err(()),
        };
        if self.peek() != Some(b']') {
            return Err(());
        }
        self.bump();
        Ok(Tok::Simple(simple))
    }

    /// Consume an unquoted attribute value until whitespace or a closing bracket.
    fn consume_unquoted_attr_value(&mut self) -> Result<String, ()> {
        let start = self.index;
        while self
            .peek()
            .is_some_and(|byte| !byte.is_ascii_whitespace() && byte != b']')
        {
            self.bump();
        }
        let slice = self.input_bytes.get(start..self.index).unwrap_or(&[]);
        if slice.is_empty() {
            return Err(());
        }
        Ok(String::from_utf8_lossy(slice).into_owned())
    }

    /// Consume a quoted attribute value until the matching quote byte.
    fn consume_quoted_attr_value(&mut self, quote: u8) -> Result<String, ()> {
        let start = self.index;
        while self.peek().is_some_and(|byte| byte != quote) {
            self.bump();
        }
        if self.peek().is_none() {
            return Err(());
        }
        let slice = self.input_bytes.get(start..self.index).unwrap_or(&[]);
        let out = String::from_utf8_lossy(slice).into_owned();
        self.bump();
        Ok(out)
    }

    /// Skip ASCII whitespace.
    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.bump();
        }
    }
}

/// Parse a selector list from CSS text. Returns `None` if any member is invalid.
pub fn parse_selector_list(input: &str) -> Option<SelectorList> {
    let mut list = SelectorList::default();
    for part in input.split(',') {
        list.selectors.push(parse_complex_selector(part.trim())?);
    }
    Some(list)
}

/// Parse one complex selector. Returns `None` for empty or unsupported input.
pub fn parse_complex_selector(input: &str) -> Option<ComplexSelector> {
    let mut tokens = SelectorTokenizer::new(input);
    let mut current = CompoundSelector::default();
    let mut first: Option<CompoundSelector> = None;
    let mut rest: Vec<(Combinator, CompoundSelector)> = Vec::new();
    let mut pending_combinator: Option<Combinator> = None;

    while let Some(token) = tokens.next_token().ok()? {
        match token {
            Tok::Combinator(comb) => {
                // Explicit combinators override an implied descendant one.
                if current.simples.is_empty() {
                    if !matches!(pending_combinator, None | Some(Combinator::Descendant)) {
                        return None;
                    }
                    if first.is_none() {
                        return None;
                    }
                } else {
                    close_compound(&mut first, &mut rest, pending_combinator, take(&mut current));
                }
                pending_combinator = Some(comb);
            }
            Tok::DescendantWS => {
                if !current.simples.is_empty() {
                    close_compound(&mut first, &mut rest, pending_combinator, take(&mut current));
                    pending_combinator = Some(Combinator::Descendant);
                }
            }
            Tok::Simple(simple) => {
                current.simples.push(simple);
            }
        }
    }

    if current.simples.is_empty() {
        // Trailing combinator, or nothing at all.
        if first.is_none() || !matches!(pending_combinator, None | Some(Combinator::Descendant)) {
            return None;
        }
    } else {
        close_compound(&mut first, &mut rest, pending_combinator, current);
    }

    Some(ComplexSelector {
        first: first?,
        rest,
    })
}

fn close_compound(
    first: &mut Option<CompoundSelector>,
    rest: &mut Vec<(Combinator, CompoundSelector)>,
    pending: Option<Combinator>,
    compound: CompoundSelector,
) {
    if first.is_none() {
        *first = Some(compound);
    } else {
        rest.push((pending.unwrap_or(Combinator::Descendant), compound));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_and_id_keep_case() {
        let sel = parse_complex_selector("#Links-Table.Card").unwrap();
        assert_eq!(
            sel.first.simples,
            vec![
                SimpleSelector::IdSelector("Links-Table".into()),
                SimpleSelector::Class("Card".into()),
            ]
        );
        assert!(sel.rest.is_empty());
    }

    #[test]
    fn attribute_forms() {
        let list = parse_selector_list("[hx-get], [hx-delete]").unwrap();
        assert_eq!(list.selectors.len(), 2);
        assert_eq!(
            list.selectors[0].first.simples,
            vec![SimpleSelector::AttrExists { name: "hx-get".into() }]
        );

        let quoted = parse_complex_selector("input[data-random-code='true']").unwrap();
        assert_eq!(
            quoted.first.simples,
            vec![
                SimpleSelector::Type("input".into()),
                SimpleSelector::AttrEquals {
                    name: "data-random-code".into(),
                    value: "true".into()
                },
            ]
        );
    }

    #[test]
    fn combinators_with_and_without_spaces() {
        let sel = parse_complex_selector("form > .card  button").unwrap();
        assert_eq!(sel.first.simples, vec![SimpleSelector::Type("form".into())]);
        assert_eq!(sel.rest.len(), 2);
        assert_eq!(sel.rest[0].0, Combinator::Child);
        assert_eq!(sel.rest[1].0, Combinator::Descendant);

        let tight = parse_complex_selector("li+li").unwrap();
        assert_eq!(tight.rest[0].0, Combinator::AdjacentSibling);
    }

    #[test]
    fn unsupported_syntax_is_rejected() {
        assert!(parse_selector_list("a:hover").is_none());
        assert!(parse_selector_list("div >").is_none());
        assert!(parse_selector_list("[data-x='open").is_none());
        assert!(parse_selector_list("").is_none());
        assert!(parse_selector_list("div,").is_none());
    }
}
