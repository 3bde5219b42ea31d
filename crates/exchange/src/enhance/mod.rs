//! Peripheral enhancers and the hook that (re)activates them.
//!
//! Activation is idempotent: each enhancer flags what it has bound and only
//! refreshes already-bound elements on later passes. Gestures on elements
//! that were never activated are not handled.

mod copy_button;
mod domain_input;
mod random_code;
mod theme;

use core::time::Duration;

use html::{DOM, NodeId, SelectorList};

use crate::host::HostServices;

pub use copy_button::CopyButton;
pub use domain_input::DomainInput;
pub use random_code::RandomCode;
pub use theme::{DEFAULT_THEME, THEMES, Theme};

/// What an enhancer did with a click.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickEffect {
    Ignored,
    /// Handled; native behaviour suppressed.
    Handled,
    /// Handled, with `class` shown on `node` for `duration`.
    Feedback {
        node: NodeId,
        class: &'static str,
        duration: Duration,
    },
}

pub trait Enhancer {
    fn name(&self) -> &'static str;

    /// Once per page, before the first activation.
    fn boot(&self, _document: &mut DOM, _host: &HostServices) {}

    /// Bind (or refresh) everything at or below `root`.
    fn activate(&self, document: &mut DOM, root: NodeId, host: &HostServices);

    fn before_submit(&self, _document: &mut DOM, _form: NodeId, _host: &HostServices) {}

    fn after_reset(&self, _document: &mut DOM, _form: NodeId, _host: &HostServices) {}

    fn after_success(&self, _document: &mut DOM, _form: NodeId, _host: &HostServices) {}

    fn on_input(&self, _document: &mut DOM, _node: NodeId, _host: &HostServices) {}

    fn on_click(&self, _document: &mut DOM, _node: NodeId, _host: &HostServices) -> ClickEffect {
        ClickEffect::Ignored
    }
}

/// `root` itself (if it matches) followed by matching descendants.
pub(crate) fn scoped(document: &DOM, root: NodeId, selector: &SelectorList) -> Vec<NodeId> {
    let mut found = Vec::new();
    if document.matches(root, selector) {
        found.push(root);
    }
    found.extend(document.query_selector_all(root, selector));
    found
}

pub struct EnhancementHook {
    enhancers: Vec<Box<dyn Enhancer>>,
    host: HostServices,
}

impl EnhancementHook {
    pub fn new(host: HostServices, enhancers: Vec<Box<dyn Enhancer>>) -> Self {
        Self { enhancers, host }
    }

    /// Theme, domain input, copy button and random code enhancers.
    pub fn standard(host: HostServices) -> Self {
        Self::new(
            host,
            vec![
                Box::new(Theme),
                Box::new(DomainInput),
                Box::new(CopyButton),
                Box::new(RandomCode),
            ],
        )
    }

    pub fn host(&self) -> &HostServices {
        &self.host
    }

    pub fn boot(&self, document: &mut DOM) {
        for enhancer in &self.enhancers {
            enhancer.boot(document, &self.host);
        }
    }

    pub fn activate(&self, document: &mut DOM, root: NodeId) {
        log::trace!("activating enhancers under {root:?}");
        for enhancer in &self.enhancers {
            enhancer.activate(document, root, &self.host);
        }
    }

    pub fn before_submit(&self, document: &mut DOM, form: NodeId) {
        for enhancer in &self.enhancers {
            enhancer.before_submit(document, form, &self.host);
        }
    }

    pub fn after_reset(&self, document: &mut DOM, form: NodeId) {
        for enhancer in &self.enhancers {
            enhancer.after_reset(document, form, &self.host);
        }
    }

    pub fn after_success(&self, document: &mut DOM, form: NodeId) {
        for enhancer in &self.enhancers {
            enhancer.after_success(document, form, &self.host);
        }
    }

    pub fn on_input(&self, document: &mut DOM, node: NodeId) {
        for enhancer in &self.enhancers {
            enhancer.on_input(document, node, &self.host);
        }
    }

    /// First enhancer that does not ignore the click wins.
    pub fn on_click(&self, document: &mut DOM, node: NodeId) -> ClickEffect {
        for enhancer in &self.enhancers {
            let effect = enhancer.on_click(document, node, &self.host);
            if effect != ClickEffect::Ignored {
                log::debug!("click handled by {}", enhancer.name());
                return effect;
            }
        }
        ClickEffect::Ignored
    }
}
