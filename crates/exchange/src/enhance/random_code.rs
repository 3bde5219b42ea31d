use html::{DOM, NodeId, SelectorList};
use rand::Rng as _;
use rand::distributions::Alphanumeric;

use super::{Enhancer, scoped};
use crate::host::HostServices;

const INPUTS: &str = "input[data-random-code='true']";
const DEFAULT_LENGTH: usize = 6;

/// Refills random-code inputs with a fresh code after a successful submit.
pub struct RandomCode;

/// Code of `[A-Za-z0-9]`; non-positive or unparsable lengths fall back to 6.
pub fn generate(length: Option<&str>) -> String {
    let length = length
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|len| *len > 0)
        .unwrap_or(DEFAULT_LENGTH);
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

impl Enhancer for RandomCode {
    fn name(&self) -> &'static str {
        "random-code"
    }

    fn activate(&self, _document: &mut DOM, _root: NodeId, _host: &HostServices) {}

    fn after_success(&self, document: &mut DOM, form: NodeId, _host: &HostServices) {
        for input in scoped(document, form, &SelectorList::parse(INPUTS)) {
            let code = generate(document.attr(input, "data-random-code-length"));
            log::trace!("new random code for {input:?}");
            document.set_value(input, &code);
            document.set_default_value(input, &code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths_and_alphabet() {
        assert_eq!(generate(None).len(), 6);
        assert_eq!(generate(Some("10")).len(), 10);
        assert_eq!(generate(Some("0")).len(), 6);
        assert_eq!(generate(Some("abc")).len(), 6);
        assert!(generate(Some("64")).chars().all(|ch| ch.is_ascii_alphanumeric()));
    }

    #[test]
    fn refreshes_value_and_default() {
        let mut document = DOM::parse(
            r#"<form id="f"><input id="code" name="code" value="old" data-random-code="true" data-random-code-length="8"></form>"#,
        )
        .unwrap();
        let form = document.get_element_by_id("f").unwrap();
        let input = document.get_element_by_id("code").unwrap();
        RandomCode.after_success(&mut document, form, &HostServices::in_memory());
        let code = document.value(input);
        assert_eq!(code.len(), 8);
        assert_ne!(code, "old");
        document.reset(form);
        assert_eq!(document.value(input), code);
    }
}
