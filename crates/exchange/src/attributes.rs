//! Declarative attribute surface, read into a record on every interaction.

use core::fmt;

use html::{DOM, NodeId, SelectorList};
use serde::Deserialize;

pub const HX_GET: &str = "hx-get";
pub const HX_POST: &str = "hx-post";
pub const HX_PUT: &str = "hx-put";
pub const HX_DELETE: &str = "hx-delete";
pub const HX_TARGET: &str = "hx-target";
pub const HX_SWAP: &str = "hx-swap";
pub const HX_CONFIRM: &str = "hx-confirm";
pub const SUCCESS_EVENT: &str = "data-success-event";
pub const RESET_ON_SUCCESS: &str = "data-reset-on-success";

/// Keyword of an ancestor-relative target reference (`closest <selector>`).
const CLOSEST_KEYWORD: &str = "closest";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum SwapMode {
    /// Replace the target's children.
    #[default]
    #[serde(rename = "innerHTML")]
    Inner,
    /// Replace the target itself.
    #[serde(rename = "outerHTML")]
    Outer,
}

impl SwapMode {
    /// `outerHTML` selects outer replacement; anything else is inner.
    #[inline]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("outerHTML") => Self::Outer,
            _ => Self::Inner,
        }
    }
}

/// Where a swap lands, relative to the trigger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetRef {
    /// Nearest element (the trigger included) matching the selector.
    Closest(SelectorList),
    /// First match in the whole document.
    Query(SelectorList),
}

impl TargetRef {
    /// `None` for an empty reference or an empty `closest` selector.
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        if let Some(selector) = reference.strip_prefix(CLOSEST_KEYWORD) {
            if selector.is_empty() || selector.starts_with(char::is_whitespace) {
                let selector = selector.trim();
                return (!selector.is_empty()).then(|| Self::Closest(SelectorList::parse(selector)));
            }
        }
        Some(Self::Query(SelectorList::parse(reference)))
    }
}

/// Exchange attributes of one element. A missing field disables the feature.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExchangeAttrs {
    pub get: Option<String>,
    pub post: Option<String>,
    pub put: Option<String>,
    pub delete: Option<String>,
    pub target: Option<TargetRef>,
    pub swap: SwapMode,
    pub confirm: Option<String>,
    pub success_event: Option<String>,
    pub reset_on_success: bool,
}

fn non_empty(document: &DOM, node: NodeId, name: &str) -> Option<String> {
    document
        .attr(node, name)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

impl ExchangeAttrs {
    pub fn read(document: &DOM, node: NodeId) -> Self {
        Self {
            get: non_empty(document, node, HX_GET),
            post: non_empty(document, node, HX_POST),
            put: non_empty(document, node, HX_PUT),
            delete: non_empty(document, node, HX_DELETE),
            target: document.attr(node, HX_TARGET).and_then(TargetRef::parse),
            swap: SwapMode::parse(document.attr(node, HX_SWAP)),
            confirm: non_empty(document, node, HX_CONFIRM),
            success_event: non_empty(document, node, SUCCESS_EVENT),
            reset_on_success: document.attr(node, RESET_ON_SUCCESS) == Some("true"),
        }
    }

    /// State-changing request of a form: POST wins over PUT.
    pub fn submit_request(&self) -> Option<(Method, &str)> {
        self.post
            .as_deref()
            .map(|url| (Method::Post, url))
            .or_else(|| self.put.as_deref().map(|url| (Method::Put, url)))
    }

    /// Trigger request of a link or button: DELETE wins over GET.
    pub fn trigger_request(&self) -> Option<(Method, &str)> {
        self.delete
            .as_deref()
            .map(|url| (Method::Delete, url))
            .or_else(|| self.get.as_deref().map(|url| (Method::Get, url)))
    }
}

/// True when `node` declares a GET or DELETE exchange.
pub fn is_trigger(document: &DOM, node: NodeId) -> bool {
    [HX_GET, HX_DELETE]
        .iter()
        .any(|name| document.attr(node, name).is_some_and(|url| !url.is_empty()))
}
