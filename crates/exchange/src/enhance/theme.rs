use html::{DOM, NodeId, SelectorList};

use super::{ClickEffect, Enhancer, scoped};
use crate::host::HostServices;

pub const THEMES: [&str; 2] = ["aurora", "nebula"];
pub const DEFAULT_THEME: &str = "aurora";

const TOGGLES: &str = "[data-theme-toggle]";
const CARDS: &str = "[data-theme-option]";
const APPLY: &str = "[data-theme-apply]";
const TOGGLE_BOUND_ATTR: &str = "data-theme-toggle-bound";
const ACTIVE_CLASS: &str = "is-active";

/// Theme toggles and the theme gallery.
pub struct Theme;

fn sanitize(theme: Option<&str>) -> &'static str {
    theme
        .and_then(|theme| THEMES.iter().copied().find(|known| *known == theme))
        .unwrap_or(DEFAULT_THEME)
}

fn pressed(active: bool) -> &'static str {
    if active { "true" } else { "false" }
}

impl Theme {
    /// Persisted theme, else the `<html data-theme>` attribute, else the default.
    pub fn stored(document: &DOM, host: &HostServices) -> &'static str {
        match host.theme_store.load() {
            Some(saved) => sanitize(Some(saved.as_str())),
            None => sanitize(
                document
                    .attr(document.document_element(), "data-theme")
                    .filter(|attr| !attr.is_empty()),
            ),
        }
    }

    pub fn set(document: &mut DOM, host: &HostServices, theme: Option<&str>, persist: bool) {
        let theme = sanitize(theme);
        let html = document.document_element();
        let body = document.body();
        for node in [html, body] {
            if document.is_element(node) {
                document.set_attr(node, "data-theme", theme);
            }
        }
        if persist {
            if let Err(err) = host.theme_store.save(theme) {
                log::debug!("theme not persisted: {err}");
            }
        }
        log::debug!("theme {theme} (persisted: {persist})");
        Self::highlight(document, theme);
    }

    fn highlight(document: &mut DOM, active: &str) {
        let root = document.root();
        for toggle in document.query_selector_all(root, &SelectorList::parse(TOGGLES)) {
            let is_active = document.attr(toggle, "data-theme-toggle") == Some(active);
            document.toggle_class(toggle, ACTIVE_CLASS, is_active);
            document.set_attr(toggle, "aria-pressed", pressed(is_active));
        }
        let apply = SelectorList::parse(APPLY);
        for card in document.query_selector_all(root, &SelectorList::parse(CARDS)) {
            let is_active = document.attr(card, "data-theme-option") == Some(active);
            document.toggle_class(card, ACTIVE_CLASS, is_active);
            if let Some(button) = document.query_selector(card, &apply) {
                document.set_attr(button, "aria-pressed", pressed(is_active));
            }
        }
    }
}

impl Enhancer for Theme {
    fn name(&self) -> &'static str {
        "theme"
    }

    fn boot(&self, document: &mut DOM, host: &HostServices) {
        let theme = Self::stored(document, host);
        Self::set(document, host, Some(theme), false);
    }

    fn activate(&self, document: &mut DOM, root: NodeId, host: &HostServices) {
        let toggles = scoped(document, root, &SelectorList::parse(TOGGLES));
        let cards = scoped(document, root, &SelectorList::parse(CARDS));
        if toggles.is_empty() && cards.is_empty() {
            return;
        }
        for toggle in toggles {
            document.set_attr(toggle, TOGGLE_BOUND_ATTR, "true");
        }
        let stored = Self::stored(document, host);
        Self::highlight(document, stored);
    }

    fn on_click(&self, document: &mut DOM, node: NodeId, host: &HostServices) -> ClickEffect {
        if let Some(toggle) = document.closest(node, &SelectorList::parse(TOGGLES)) {
            if document.attr(toggle, TOGGLE_BOUND_ATTR) != Some("true") {
                return ClickEffect::Ignored;
            }
            let theme = document.attr(toggle, "data-theme-toggle").map(str::to_owned);
            Self::set(document, host, theme.as_deref(), true);
            return ClickEffect::Handled;
        }
        if let Some(button) = document.closest(node, &SelectorList::parse(APPLY)) {
            let Some(theme) = document
                .attr(button, "data-theme-apply")
                .filter(|theme| !theme.is_empty())
                .map(str::to_owned)
            else {
                return ClickEffect::Ignored;
            };
            Self::set(document, host, Some(&theme), true);
            return ClickEffect::Handled;
        }
        if let Some(card) = document.closest(node, &SelectorList::parse(CARDS)) {
            if let Some(theme) = document
                .attr(card, "data-theme-option")
                .filter(|theme| !theme.is_empty())
                .map(str::to_owned)
            {
                Self::set(document, host, Some(&theme), true);
            }
        }
        ClickEffect::Ignored
    }
}
