#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

//! Declarative fragment exchange.
//!
//! Markup declares requests through `hx-*` attributes; the engine intercepts
//! clicks and submissions, performs the request and splices the returned HTML
//! into the document. When a declarative-AJAX library is present the engine
//! steps back and only reacts to the library's lifecycle notifications.

pub mod attributes;
pub mod config;
pub mod enhance;
pub mod guard;
pub mod host;
pub mod page;
pub mod regions;
pub mod router;
pub mod runtime;
pub mod success;
pub mod swap;
pub mod target;
pub mod transport;

pub use attributes::{ExchangeAttrs, Method, SwapMode, TargetRef};
pub use config::{AuthCredential, ExchangeConfig};
pub use enhance::{ClickEffect, EnhancementHook, Enhancer};
pub use guard::{FlightGuard, FlightPermit};
pub use host::{Clipboard, HostServices, MemoryClipboard, MemoryThemeStore, Prompt, StaticPrompt, ThemeStore};
pub use page::{AppEvent, EventSource, Page};
pub use regions::{RefreshGroup, Region};
pub use router::{Dispatch, Outcome};
pub use runtime::{DeclarativeLibrary, ExchangeRuntime, LibraryEvent, RuntimeMode};
pub use transport::{
    BackendResponse, ExchangeRequest, ExchangeResult, FormBody, HttpBackend, PreparedRequest,
    ReqwestBackend, Transport, TransportError,
};
