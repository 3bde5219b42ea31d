use core::time::Duration;

use html::{DOM, NodeId, SelectorList};

use super::{ClickEffect, Enhancer, scoped};
use crate::host::HostServices;

const BUTTONS: &str = "button[data-copy-value]";
const BOUND: &str = "button[data-copy-value][data-copy-bound=true]";
const COPIED_CLASS: &str = "is-copied";
const FEEDBACK: Duration = Duration::from_millis(2000);

/// Copies `data-copy-value` to the clipboard and flashes `is-copied`.
pub struct CopyButton;

impl Enhancer for CopyButton {
    fn name(&self) -> &'static str {
        "copy-button"
    }

    fn activate(&self, document: &mut DOM, root: NodeId, _host: &HostServices) {
        for button in scoped(document, root, &SelectorList::parse(BUTTONS)) {
            if document.attr(button, "data-copy-bound") != Some("true") {
                document.set_attr(button, "data-copy-bound", "true");
            }
        }
    }

    fn on_click(&self, document: &mut DOM, node: NodeId, host: &HostServices) -> ClickEffect {
        let Some(button) = document.closest(node, &SelectorList::parse(BOUND)) else {
            return ClickEffect::Ignored;
        };
        let value = document.attr(button, "data-copy-value").unwrap_or_default();
        if value.is_empty() {
            return ClickEffect::Handled;
        }
        match host.clipboard.write_text(value) {
            Ok(()) => {
                log::debug!("copied {} bytes", value.len());
                document.toggle_class(button, COPIED_CLASS, true);
                ClickEffect::Feedback {
                    node: button,
                    class: COPIED_CLASS,
                    duration: FEEDBACK,
                }
            }
            Err(err) => {
                log::warn!("Failed to copy value: {err}");
                ClickEffect::Handled
            }
        }
    }
}
