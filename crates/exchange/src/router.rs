//! Delegated submit and click handling for self-contained mode.
//!
//! No borrow of the document is held across the network call: targets are
//! resolved before it and re-checked for liveness after it.

use html::{DOM, NodeId};

use crate::attributes::{ExchangeAttrs, Method, is_trigger};
use crate::page::Page;
use crate::success;
use crate::swap::swap;
use crate::target::resolve;
use crate::transport::{ExchangeRequest, ExchangeResult, FormBody};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Not an exchange gesture.
    Ignored,
    /// The form already has an exchange in flight.
    Busy,
    /// The user declined the confirmation prompt.
    Declined,
    /// The library handles this gesture.
    Delegated,
    /// An enhancer handled the gesture.
    Enhanced,
    /// The exchange succeeded. `swapped` is false when no live target existed.
    Completed { status: u16, swapped: bool },
    /// The exchange failed; `status` is `None` for network failures.
    Failed { status: Option<u16> },
}

/// Result of routing one gesture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatch {
    /// Whether native browser behaviour is suppressed.
    pub default_prevented: bool,
    pub outcome: Outcome,
}

impl Dispatch {
    pub const fn ignored() -> Self {
        Self {
            default_prevented: false,
            outcome: Outcome::Ignored,
        }
    }

    pub const fn delegated() -> Self {
        Self {
            default_prevented: false,
            outcome: Outcome::Delegated,
        }
    }

    pub const fn prevented(outcome: Outcome) -> Self {
        Self {
            default_prevented: true,
            outcome,
        }
    }
}

/// Submit gesture on `node` (the form or anything inside it).
pub async fn submit(page: &Page, node: NodeId, submitter: Option<NodeId>) -> Dispatch {
    let form = {
        let document = page.document();
        document.closest_where(node, |document, candidate| document.tag(candidate) == Some("form"))
    };
    let Some(form) = form else {
        return Dispatch::ignored();
    };
    if page.guard().is_busy(form) {
        log::debug!("submit dropped, form busy");
        return Dispatch::prevented(Outcome::Busy);
    }
    submit_form(page, form, submitter).await
}

async fn submit_form(page: &Page, form: NodeId, submitter: Option<NodeId>) -> Dispatch {
    let attrs = ExchangeAttrs::read(&page.document(), form);
    let Some((method, url)) = attrs.submit_request() else {
        return Dispatch::ignored();
    };
    let Some(_permit) = page.guard().try_enter(form) else {
        log::debug!("submit dropped, form busy");
        return Dispatch::prevented(Outcome::Busy);
    };
    let (target, body) = {
        let mut document = page.document_mut();
        let target = resolve(&document, form, attrs.target.as_ref());
        page.hook().before_submit(&mut document, form);
        let mut body = FormBody::from_entries(document.form_data(form));
        if let Some(submitter) = submitter {
            if let Some(name) = document.attr(submitter, "name") {
                body.append_if_absent(name, &document.value(submitter));
            }
        }
        (target, body)
    };
    let request = ExchangeRequest::new(method, url).with_body(body);
    let result = page.transport().exchange(request).await;
    Dispatch::prevented(complete(page, form, target, &attrs, &result, true))
}

/// Click gesture on `node`. With `prevented` set, untyped buttons no longer
/// submit their form.
pub async fn click(page: &Page, node: NodeId, prevented: bool) -> Dispatch {
    let submit_form_of = {
        let document = page.document();
        document
            .closest_where(node, DOM::is_submit_control)
            .filter(|submitter| !skips_submission(&document, *submitter, prevented))
            .and_then(|submitter| document.form_owner(submitter).map(|form| (submitter, form)))
    };
    if let Some((submitter, form)) = submit_form_of {
        if page.guard().is_busy(form) {
            log::debug!("click dropped, form busy");
            return Dispatch::prevented(Outcome::Busy);
        }
        let declares = ExchangeAttrs::read(&page.document(), form).submit_request().is_some();
        if declares {
            return submit_form(page, form, Some(submitter)).await;
        }
    }

    let trigger = page.document().closest_where(node, is_trigger);
    let Some(trigger) = trigger else {
        return Dispatch::ignored();
    };
    let attrs = ExchangeAttrs::read(&page.document(), trigger);
    let Some((method, url)) = attrs.trigger_request() else {
        return Dispatch::ignored();
    };
    if method == Method::Delete {
        if let Some(message) = &attrs.confirm {
            if !page.host().prompt.confirm(message) {
                log::debug!("DELETE {url} declined");
                return Dispatch {
                    default_prevented: false,
                    outcome: Outcome::Declined,
                };
            }
        }
    }
    let target = resolve(&page.document(), trigger, attrs.target.as_ref());
    let result = page
        .transport()
        .exchange(ExchangeRequest::new(method, url))
        .await;
    Dispatch::prevented(complete(page, trigger, target, &attrs, &result, method != Method::Get))
}

/// An untyped `<button>` only submits through the native action: not when that
/// was suppressed, and not when it declares its own GET or DELETE.
fn skips_submission(document: &DOM, submitter: NodeId, prevented: bool) -> bool {
    document.tag(submitter) == Some("button")
        && document.attr(submitter, "type").is_none()
        && (prevented || is_trigger(document, submitter))
}

/// Apply a finished exchange: swap or failure notice, then success side effects.
fn complete(
    page: &Page,
    origin: NodeId,
    target: Option<NodeId>,
    attrs: &ExchangeAttrs,
    result: &ExchangeResult,
    fire_success: bool,
) -> Outcome {
    let mut document = page.document_mut();
    let target = target.filter(|target| {
        let live = document.is_attached(*target);
        if !live {
            log::debug!("swap target left the document during the exchange");
        }
        live
    });
    if !result.ok {
        if let Some(target) = target {
            document.set_text_content(target, &page.config().failure_notice);
        }
        if result.error.is_some() {
            log::error!("Failed to process request: {result}");
        }
        return Outcome::Failed {
            status: result.error.is_none().then_some(result.status),
        };
    }
    let swapped = match target {
        Some(target) => match swap(&mut document, page.hook(), target, &result.text, attrs.swap) {
            Ok(_) => true,
            Err(err) => {
                log::error!("swap failed: {err:#}");
                if document.is_attached(target) {
                    document.set_text_content(target, &page.config().failure_notice);
                }
                return Outcome::Failed {
                    status: Some(result.status),
                };
            }
        },
        None => false,
    };
    drop(document);
    if fire_success {
        success::on_success(page, origin, attrs);
    }
    Outcome::Completed {
        status: result.status,
        swapped,
    }
}
