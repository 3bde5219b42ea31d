use html::{DOM, NodeId, SelectorList};

use super::{Enhancer, scoped};
use crate::host::HostServices;

const GROUP: &str = "[data-domain-input]";
const FIELD: &str = "[data-domain-input-field]";
const HIDDEN: &str = "[data-domain-input-hidden]";
const SUFFIX_ATTR: &str = "data-domain-suffix";
const ENHANCED_ATTR: &str = "data-domain-enhanced";

/// Keeps a hidden `prefix.suffix` field in sync with a prefix input.
pub struct DomainInput;

impl DomainInput {
    fn is_enhanced(document: &DOM, group: NodeId) -> bool {
        document.attr(group, ENHANCED_ATTR) == Some("true")
    }

    fn update(document: &mut DOM, group: NodeId) {
        let Some(hidden) = document.query_selector(group, &SelectorList::parse(HIDDEN)) else {
            return;
        };
        let suffix = document
            .attr(group, SUFFIX_ATTR)
            .unwrap_or_default()
            .trim()
            .to_owned();
        let Some(field) = document.query_selector(group, &SelectorList::parse(FIELD)) else {
            document.set_value(hidden, &suffix);
            return;
        };
        let typed = document.value(field);
        let prefix = typed.trim().to_lowercase();
        if !prefix.is_empty() && prefix != typed.trim() {
            document.set_value(field, &prefix);
        }
        let full = if suffix.is_empty() {
            prefix
        } else if prefix.is_empty() {
            String::new()
        } else {
            format!("{prefix}.{suffix}")
        };
        log::trace!("domain value {full:?}");
        document.set_value(hidden, &full);
    }

    /// Refresh every enhanced group below `form`.
    fn refresh_within(document: &mut DOM, form: NodeId) {
        for group in scoped(document, form, &SelectorList::parse(GROUP)) {
            if Self::is_enhanced(document, group) {
                Self::update(document, group);
            }
        }
    }
}

impl Enhancer for DomainInput {
    fn name(&self) -> &'static str {
        "domain-input"
    }

    fn activate(&self, document: &mut DOM, root: NodeId, _host: &HostServices) {
        for group in scoped(document, root, &SelectorList::parse(GROUP)) {
            if !Self::is_enhanced(document, group) {
                document.set_attr(group, ENHANCED_ATTR, "true");
            }
            Self::update(document, group);
        }
    }

    fn before_submit(&self, document: &mut DOM, form: NodeId, host: &HostServices) {
        self.activate(document, form, host);
    }

    fn after_reset(&self, document: &mut DOM, form: NodeId, _host: &HostServices) {
        Self::refresh_within(document, form);
    }

    fn after_success(&self, document: &mut DOM, form: NodeId, _host: &HostServices) {
        Self::refresh_within(document, form);
    }

    fn on_input(&self, document: &mut DOM, node: NodeId, _host: &HostServices) {
        if !document.matches(node, &SelectorList::parse(FIELD)) {
            return;
        }
        let group = document.closest(node, &SelectorList::parse(GROUP));
        if let Some(group) = group.filter(|group| Self::is_enhanced(document, *group)) {
            Self::update(document, group);
        }
    }
}
