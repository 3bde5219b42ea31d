//! The two exchange runtimes and the startup detector that picks one.

use std::rc::Rc;

use futures::FutureExt as _;
use futures::future::{self, LocalBoxFuture};
use html::{NodeId, SelectorList};

use crate::attributes::{ExchangeAttrs, SUCCESS_EVENT};
use crate::page::{EventSource, Job, Page};
use crate::router::{self, Dispatch};
use crate::success;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuntimeMode {
    /// The engine performs exchanges itself.
    SelfContained,
    /// A declarative-AJAX library performs exchanges.
    Library,
}

/// A declarative-AJAX library loaded on the page.
pub trait DeclarativeLibrary {
    fn name(&self) -> &str;
    /// Raise `event` on the document body through the library.
    fn trigger(&self, event: &str);
}

/// Lifecycle notifications a library reports to the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LibraryEvent {
    AfterSwap {
        target: Option<NodeId>,
    },
    ConfigRequest {
        source: NodeId,
    },
    AfterRequest {
        source: NodeId,
        successful: Option<bool>,
        status: u16,
    },
}

pub trait ExchangeRuntime {
    fn mode(&self) -> RuntimeMode;

    /// Called once, right after the page is built.
    fn install(&self, page: &Page);

    fn submit<'page>(
        &'page self,
        page: &'page Page,
        form: NodeId,
        submitter: Option<NodeId>,
    ) -> LocalBoxFuture<'page, Dispatch>;

    /// `prevented` is set when an enhancer already suppressed the native action.
    fn click<'page>(&'page self, page: &'page Page, node: NodeId, prevented: bool) -> LocalBoxFuture<'page, Dispatch>;

    /// Deliver a success event to body-level listeners.
    fn broadcast(&self, page: &Page, event: &str);

    fn library_event(&self, page: &Page, event: LibraryEvent);
}

/// Runtime used when no library is present.
pub struct SelfContainedRuntime;

impl ExchangeRuntime for SelfContainedRuntime {
    fn mode(&self) -> RuntimeMode {
        RuntimeMode::SelfContained
    }

    fn install(&self, page: &Page) {
        for group in &page.config().refresh_groups {
            let jobs = page.job_queue();
            let event = group.event.clone();
            page.add_event_listener(&group.event, move |_| {
                jobs.borrow_mut().push(Job::Refresh(event.clone()));
            });
            page.queue(Job::Refresh(group.event.clone()));
        }
    }

    fn submit<'page>(
        &'page self,
        page: &'page Page,
        form: NodeId,
        submitter: Option<NodeId>,
    ) -> LocalBoxFuture<'page, Dispatch> {
        router::submit(page, form, submitter).boxed_local()
    }

    fn click<'page>(&'page self, page: &'page Page, node: NodeId, prevented: bool) -> LocalBoxFuture<'page, Dispatch> {
        router::click(page, node, prevented).boxed_local()
    }

    fn broadcast(&self, page: &Page, event: &str) {
        page.emit(event, EventSource::CustomEvent);
    }

    fn library_event(&self, _page: &Page, event: LibraryEvent) {
        log::trace!("no library loaded, ignoring {event:?}");
    }
}

/// Runtime used when a library owns the exchange mechanics.
pub struct LibraryRuntime {
    library: Rc<dyn DeclarativeLibrary>,
}

impl LibraryRuntime {
    pub fn new(library: Rc<dyn DeclarativeLibrary>) -> Self {
        Self { library }
    }
}

impl ExchangeRuntime for LibraryRuntime {
    fn mode(&self) -> RuntimeMode {
        RuntimeMode::Library
    }

    fn install(&self, _page: &Page) {
        log::debug!("exchanges delegated to {}", self.library.name());
    }

    fn submit<'page>(
        &'page self,
        _page: &'page Page,
        _form: NodeId,
        _submitter: Option<NodeId>,
    ) -> LocalBoxFuture<'page, Dispatch> {
        future::ready(Dispatch::delegated()).boxed_local()
    }

    fn click<'page>(&'page self, _page: &'page Page, _node: NodeId, _prevented: bool) -> LocalBoxFuture<'page, Dispatch> {
        future::ready(Dispatch::delegated()).boxed_local()
    }

    fn broadcast(&self, page: &Page, event: &str) {
        self.library.trigger(event);
        page.emit(event, EventSource::Library);
    }

    fn library_event(&self, page: &Page, event: LibraryEvent) {
        match event {
            LibraryEvent::AfterSwap { target } => {
                let mut document = page.document_mut();
                let root = target
                    .filter(|target| document.is_element(*target))
                    .unwrap_or_else(|| document.root());
                page.hook().activate(&mut document, root);
            }
            LibraryEvent::ConfigRequest { source } => {
                let mut document = page.document_mut();
                let form = document.closest(source, &SelectorList::parse("form"));
                if let Some(form) = form {
                    page.hook().before_submit(&mut document, form);
                }
            }
            LibraryEvent::AfterRequest {
                source,
                successful,
                status,
            } => {
                let succeeded = successful.unwrap_or((200..400).contains(&status));
                if !succeeded {
                    return;
                }
                let (element, attrs) = {
                    let document = page.document();
                    if !document.is_element(source) {
                        return;
                    }
                    let element = document
                        .closest(source, &SelectorList::parse(&format!("[{SUCCESS_EVENT}]")))
                        .unwrap_or(source);
                    (element, ExchangeAttrs::read(&document, element))
                };
                success::on_success(page, element, &attrs);
            }
        }
    }
}

/// Pick the runtime once, at startup.
pub fn detect(library: Option<Rc<dyn DeclarativeLibrary>>) -> Box<dyn ExchangeRuntime> {
    match library {
        Some(library) => Box::new(LibraryRuntime::new(library)),
        None => {
            log::warn!("declarative-AJAX library not loaded, using the built-in exchange fallback");
            Box::new(SelfContainedRuntime)
        }
    }
}
