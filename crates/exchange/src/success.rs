use html::NodeId;

use crate::attributes::ExchangeAttrs;
use crate::page::Page;

/// Side effects of a successful state-changing exchange.
///
/// `attrs` are the ones read when the gesture started, so a success event
/// still fires when the originating element was swapped away.
pub fn on_success(page: &Page, element: NodeId, attrs: &ExchangeAttrs) {
    {
        let mut document = page.document_mut();
        if document.is_attached(element) && document.tag(element) == Some("form") {
            if attrs.reset_on_success {
                document.reset(element);
                page.hook().after_reset(&mut document, element);
            }
            page.hook().after_success(&mut document, element);
        }
    }
    if let Some(event) = &attrs.success_event {
        log::debug!("broadcasting {event}");
        page.runtime().broadcast(page, event);
    }
}
