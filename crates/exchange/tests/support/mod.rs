#![allow(dead_code, reason = "Each test binary uses a different subset of helpers")]

use core::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use exchange::{
    BackendResponse, DeclarativeLibrary, ExchangeConfig, HostServices, HttpBackend, Page,
    PreparedRequest, StaticPrompt, TransportError,
};
use futures::FutureExt as _;
use futures::future::LocalBoxFuture;
use html::{DOM, NodeId};
use url::Url;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Answers from a table keyed by `"METHOD /path"`; unknown routes get a 404.
/// With `yielding`, every answer suspends once first, so two gestures can
/// overlap deterministically.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: RefCell<HashMap<String, Result<BackendResponse, TransportError>>>,
    requests: RefCell<Vec<PreparedRequest>>,
    yielding: bool,
}

impl ScriptedBackend {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn yielding() -> Rc<Self> {
        Rc::new(Self {
            yielding: true,
            ..Self::default()
        })
    }

    pub fn reply(&self, route: &str, status: u16, text: &str) {
        self.replies.borrow_mut().insert(
            route.to_owned(),
            Ok(BackendResponse {
                status,
                text: text.to_owned(),
            }),
        );
    }

    pub fn fail(&self, route: &str) {
        self.replies.borrow_mut().insert(
            route.to_owned(),
            Err(TransportError::Network("connection refused".to_owned())),
        );
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.borrow().clone()
    }

    /// `"METHOD /path"` of every request, in order.
    pub fn routes(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|request| format!("{} {}", request.method, request.url.path()))
            .collect()
    }
}

impl HttpBackend for ScriptedBackend {
    fn send(&self, request: PreparedRequest) -> LocalBoxFuture<'_, Result<BackendResponse, TransportError>> {
        let route = format!("{} {}", request.method, request.url.path());
        self.requests.borrow_mut().push(request);
        let reply = self.replies.borrow().get(&route).cloned().unwrap_or(Ok(BackendResponse {
            status: 404,
            text: String::new(),
        }));
        let yielding = self.yielding;
        async move {
            if yielding {
                tokio::task::yield_now().await;
            }
            reply
        }
        .boxed_local()
    }
}

/// Library double that records what it was asked to trigger.
#[derive(Default)]
pub struct FakeLibrary {
    triggered: RefCell<Vec<String>>,
}

impl FakeLibrary {
    pub fn triggered(&self) -> Vec<String> {
        self.triggered.borrow().clone()
    }
}

impl DeclarativeLibrary for FakeLibrary {
    fn name(&self) -> &str {
        "htmx"
    }

    fn trigger(&self, event: &str) {
        self.triggered.borrow_mut().push(event.to_owned());
    }
}

pub fn config() -> ExchangeConfig {
    ExchangeConfig::new(Url::parse("https://admin.example/").unwrap())
}

pub struct Harness {
    pub page: Page,
    pub backend: Rc<ScriptedBackend>,
    pub prompt: Rc<StaticPrompt>,
}

impl Harness {
    pub fn boot(markup: &str, backend: Rc<ScriptedBackend>) -> Self {
        Self::boot_with(markup, backend, true, None)
    }

    pub fn boot_with(
        markup: &str,
        backend: Rc<ScriptedBackend>,
        confirm: bool,
        library: Option<Rc<dyn DeclarativeLibrary>>,
    ) -> Self {
        init_logging();
        let prompt = Rc::new(StaticPrompt::new(confirm));
        let host = HostServices {
            prompt: Rc::clone(&prompt) as Rc<dyn exchange::Prompt>,
            ..HostServices::in_memory()
        };
        let document = DOM::parse(markup).unwrap();
        let page = Page::boot(
            document,
            config(),
            Rc::clone(&backend) as Rc<dyn HttpBackend>,
            host,
            library,
        );
        Self {
            page,
            backend,
            prompt,
        }
    }

    pub fn el(&self, id: &str) -> NodeId {
        self.page
            .document()
            .get_element_by_id(id)
            .unwrap_or_else(|| panic!("no element #{id}"))
    }

    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.page.document().get_element_by_id(id)
    }

    pub fn text(&self, id: &str) -> String {
        let node = self.el(id);
        self.page.document().text_content(node)
    }

    pub fn inner_html(&self, id: &str) -> String {
        let node = self.el(id);
        self.page.document().inner_html(node)
    }

    /// Count body-level deliveries of `event`.
    pub fn count_event(&self, event: &str) -> Rc<RefCell<usize>> {
        let seen = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&seen);
        self.page.add_event_listener(event, move |_| *counter.borrow_mut() += 1);
        seen
    }
}
