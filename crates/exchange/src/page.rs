//! The page host: owns the document and wires gestures to the runtime.

use core::cell::{Ref, RefCell, RefMut};
use core::mem::take;
use core::time::Duration;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Error;
use futures::FutureExt as _;
use futures::StreamExt as _;
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use html::{DOM, NodeId};
use tokio::time::Instant;

use crate::config::{AuthCredential, ExchangeConfig};
use crate::enhance::{ClickEffect, EnhancementHook};
use crate::guard::FlightGuard;
use crate::host::HostServices;
use crate::regions;
use crate::router::{Dispatch, Outcome};
use crate::runtime::{DeclarativeLibrary, ExchangeRuntime, LibraryEvent, RuntimeMode, detect};
use crate::transport::{HttpBackend, ReqwestBackend, Transport};

/// How a body-level event was raised.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventSource {
    /// A generic bubbling custom event.
    CustomEvent,
    /// The library's trigger facility.
    Library,
}

/// A named event observed at the document body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppEvent {
    pub name: String,
    pub source: EventSource,
}

type Listener = Rc<dyn Fn(&AppEvent)>;

/// Deferred work driven by `Page::run_jobs`.
#[derive(Clone, Debug)]
pub(crate) enum Job {
    Refresh(String),
    ClearFeedback {
        node: NodeId,
        class: &'static str,
        deadline: Instant,
        token: u64,
    },
}

pub struct Page {
    document: RefCell<DOM>,
    config: ExchangeConfig,
    transport: Transport,
    guard: FlightGuard,
    hook: EnhancementHook,
    listeners: RefCell<Vec<(String, Listener)>>,
    jobs: Rc<RefCell<Vec<Job>>>,
    feedback: RefCell<HashMap<NodeId, u64>>,
    next_token: RefCell<u64>,
    runtime: Box<dyn ExchangeRuntime>,
}

impl Page {
    /// Activate `document` and install the runtime chosen for it.
    ///
    /// The credential comes from `config.auth`, else from the body attribute,
    /// and is fixed for the lifetime of the page.
    pub fn boot(
        mut document: DOM,
        config: ExchangeConfig,
        backend: Rc<dyn HttpBackend>,
        host: HostServices,
        library: Option<Rc<dyn DeclarativeLibrary>>,
    ) -> Self {
        let auth = config
            .auth
            .clone()
            .or_else(|| AuthCredential::from_document(&document));
        let transport = Transport::new(config.origin.clone(), auth, backend);
        let hook = EnhancementHook::standard(host);
        hook.boot(&mut document);
        let root = document.root();
        hook.activate(&mut document, root);

        let page = Self {
            document: RefCell::new(document),
            config,
            transport,
            guard: FlightGuard::new(),
            hook,
            listeners: RefCell::new(Vec::new()),
            jobs: Rc::new(RefCell::new(Vec::new())),
            feedback: RefCell::new(HashMap::new()),
            next_token: RefCell::new(0),
            runtime: detect(library),
        };
        page.runtime.install(&page);
        log::info!("page ready ({:?} mode)", page.runtime.mode());
        page
    }

    /// `boot` over a reqwest backend configured from `config`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_reqwest(
        document: DOM,
        config: ExchangeConfig,
        host: HostServices,
        library: Option<Rc<dyn DeclarativeLibrary>>,
    ) -> Result<Self, Error> {
        let backend = Rc::new(ReqwestBackend::new(config.request_timeout)?);
        Ok(Self::boot(document, config, backend, host, library))
    }

    pub fn document(&self) -> Ref<'_, DOM> {
        self.document.borrow()
    }

    pub fn document_mut(&self) -> RefMut<'_, DOM> {
        self.document.borrow_mut()
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn guard(&self) -> &FlightGuard {
        &self.guard
    }

    pub fn hook(&self) -> &EnhancementHook {
        &self.hook
    }

    pub fn host(&self) -> &HostServices {
        self.hook.host()
    }

    pub fn runtime(&self) -> &dyn ExchangeRuntime {
        self.runtime.as_ref()
    }

    pub fn mode(&self) -> RuntimeMode {
        self.runtime.mode()
    }

    pub fn is_busy(&self, form: NodeId) -> bool {
        self.guard.is_busy(form)
    }

    // -----------------------
    // Gestures
    // -----------------------

    /// A click on `node`. Enhancers see it first, then the runtime.
    ///
    /// An enhancer handling the click suppresses the native action but does
    /// not stop delegation: an enclosing trigger still runs.
    pub async fn click(&self, node: NodeId) -> Dispatch {
        let effect = {
            let mut document = self.document.borrow_mut();
            self.hook.on_click(&mut document, node)
        };
        let prevented = match effect {
            ClickEffect::Ignored => false,
            ClickEffect::Handled => true,
            ClickEffect::Feedback {
                node,
                class,
                duration,
            } => {
                self.schedule_feedback(node, class, duration);
                true
            }
        };
        let dispatch = self.runtime.click(self, node, prevented).await;
        if !prevented {
            return dispatch;
        }
        match dispatch.outcome {
            Outcome::Ignored | Outcome::Delegated => Dispatch::prevented(Outcome::Enhanced),
            outcome => Dispatch::prevented(outcome),
        }
    }

    /// A submit event targeting `node`, optionally naming the submit control.
    pub async fn submit(&self, node: NodeId, submitter: Option<NodeId>) -> Dispatch {
        self.runtime.submit(self, node, submitter).await
    }

    /// The user typed `value` into `node`.
    pub fn input(&self, node: NodeId, value: &str) {
        let mut document = self.document.borrow_mut();
        document.set_value(node, value);
        self.hook.on_input(&mut document, node);
    }

    /// The user reset `form`.
    pub fn reset(&self, form: NodeId) {
        let mut document = self.document.borrow_mut();
        document.reset(form);
        self.hook.after_reset(&mut document, form);
    }

    /// A lifecycle notification from the declarative-AJAX library.
    pub fn library_event(&self, event: LibraryEvent) {
        self.runtime.library_event(self, event);
    }

    // -----------------------
    // Body-level events
    // -----------------------

    pub fn add_event_listener<F>(&self, event: &str, listener: F)
    where
        F: Fn(&AppEvent) + 'static,
    {
        self.listeners
            .borrow_mut()
            .push((event.to_owned(), Rc::new(listener)));
    }

    /// Raise `event` on the body from outside the engine.
    pub fn trigger(&self, event: &str) {
        self.emit(event, EventSource::CustomEvent);
    }

    pub(crate) fn emit(&self, event: &str, source: EventSource) {
        let matching: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        log::trace!("{event} -> {} listeners", matching.len());
        let app_event = AppEvent {
            name: event.to_owned(),
            source,
        };
        for listener in matching {
            listener(&app_event);
        }
    }

    // -----------------------
    // Jobs
    // -----------------------

    pub(crate) fn job_queue(&self) -> Rc<RefCell<Vec<Job>>> {
        Rc::clone(&self.jobs)
    }

    pub(crate) fn queue(&self, job: Job) {
        self.jobs.borrow_mut().push(job);
    }

    /// Number of queued jobs not yet started.
    pub fn pending_jobs(&self) -> usize {
        self.jobs.borrow().len()
    }

    fn schedule_feedback(&self, node: NodeId, class: &'static str, after: Duration) {
        let token = {
            let mut next = self.next_token.borrow_mut();
            *next += 1;
            *next
        };
        // A newer click restarts the timer.
        self.feedback.borrow_mut().insert(node, token);
        self.queue(Job::ClearFeedback {
            node,
            class,
            deadline: Instant::now() + after,
            token,
        });
    }

    /// Run queued jobs, and any jobs they queue, until none are left.
    pub async fn run_jobs(&self) {
        loop {
            let batch = take(&mut *self.jobs.borrow_mut());
            if batch.is_empty() {
                break;
            }
            let mut pending: FuturesUnordered<_> =
                batch.into_iter().map(|job| self.run_job(job)).collect();
            while pending.next().await.is_some() {}
        }
    }

    fn run_job(&self, job: Job) -> LocalBoxFuture<'_, ()> {
        match job {
            Job::Refresh(event) => async move {
                let group = self
                    .config
                    .refresh_groups
                    .iter()
                    .find(|group| group.event == event);
                if let Some(group) = group {
                    regions::refresh(self, group).await;
                }
            }
            .boxed_local(),
            Job::ClearFeedback {
                node,
                class,
                deadline,
                token,
            } => async move {
                tokio::time::sleep_until(deadline).await;
                let current = self.feedback.borrow().get(&node) == Some(&token);
                if current {
                    self.feedback.borrow_mut().remove(&node);
                    self.document.borrow_mut().toggle_class(node, class, false);
                }
            }
            .boxed_local(),
        }
    }
}
