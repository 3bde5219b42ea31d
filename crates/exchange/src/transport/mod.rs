//! Request construction and dispatch.
//!
//! `Transport::exchange` never fails: network errors and non-2xx statuses both
//! come back as an `ExchangeResult` with `ok == false`.

mod backend;

use core::error::Error;
use core::fmt::{self, Display, Formatter, Result as FmtResult};
use std::rc::Rc;

use html::{FormEntry, FormValue};
use url::Url;
use url::form_urlencoded;

use crate::attributes::Method;
use crate::config::{ACCEPT_HTML, AuthCredential, FORM_CONTENT_TYPE, FRAGMENT_REQUEST_HEADER};

pub use backend::{BackendResponse, HttpBackend, ReqwestBackend};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportError {
    /// The URL could not be resolved against the page origin.
    InvalidUrl(String),
    /// The request was rejected before a response arrived.
    Network(String),
    /// The response body could not be read.
    Body(String),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::InvalidUrl(message) => write!(f, "InvalidUrl: {message}"),
            Self::Network(message) => write!(f, "Network: {message}"),
            Self::Body(message) => write!(f, "Body: {message}"),
        }
    }
}

impl Error for TransportError {}

/// URL-encoded form fields, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormBody {
    pairs: Vec<(String, String)>,
}

impl FormBody {
    /// Keep text entries; file entries cannot be URL-encoded and are dropped.
    pub fn from_entries(entries: Vec<FormEntry>) -> Self {
        let pairs = entries
            .into_iter()
            .filter_map(|entry| match entry.value {
                FormValue::Text(value) => Some((entry.name, value)),
                FormValue::File { file_name } => {
                    log::trace!("dropping file field {:?} ({file_name:?})", entry.name);
                    None
                }
            })
            .collect();
        Self { pairs }
    }

    pub fn has(&self, name: &str) -> bool {
        self.pairs.iter().any(|(key, _)| key == name)
    }

    pub fn append(&mut self, name: &str, value: &str) {
        self.pairs.push((name.to_owned(), value.to_owned()));
    }

    /// Append unless a field of that name is already present.
    pub fn append_if_absent(&mut self, name: &str, value: &str) {
        if !name.is_empty() && !self.has(name) {
            self.append(name, value);
        }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// What the router asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<FormBody>,
}

impl ExchangeRequest {
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            method,
            url: url.to_owned(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: FormBody) -> Self {
        self.body = Some(body);
        self
    }
}

/// A request ready for the wire: absolute URL and the full header set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl PreparedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeResult {
    pub status: u16,
    pub ok: bool,
    pub text: String,
    pub error: Option<TransportError>,
}

impl ExchangeResult {
    fn from_response(response: BackendResponse) -> Self {
        Self {
            ok: (200..300).contains(&response.status),
            status: response.status,
            text: response.text,
            error: None,
        }
    }

    /// A rejected call: no status, empty fragment text.
    pub fn failed(error: TransportError) -> Self {
        Self {
            status: 0,
            ok: false,
            text: String::new(),
            error: Some(error),
        }
    }
}

impl fmt::Display for ExchangeResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.error {
            Some(error) => write!(f, "failed ({error})"),
            None => write!(f, "status {}", self.status),
        }
    }
}

/// Same-origin fragment transport with an injected credential.
pub struct Transport {
    origin: Url,
    auth: Option<AuthCredential>,
    backend: Rc<dyn HttpBackend>,
}

impl Transport {
    /// Relative URLs resolve against the scheme and host of `origin` only.
    pub fn new(mut origin: Url, auth: Option<AuthCredential>, backend: Rc<dyn HttpBackend>) -> Self {
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);
        Self {
            origin,
            auth,
            backend,
        }
    }

    /// Resolve the URL and attach protocol headers.
    ///
    /// # Errors
    /// Returns `InvalidUrl` when the URL does not resolve against the origin.
    pub fn prepare(&self, request: ExchangeRequest) -> Result<PreparedRequest, TransportError> {
        let url = self
            .origin
            .join(&request.url)
            .map_err(|err| TransportError::InvalidUrl(format!("{:?}: {err}", request.url)))?;
        let mut headers = vec![
            (FRAGMENT_REQUEST_HEADER.to_owned(), "true".to_owned()),
            ("Accept".to_owned(), ACCEPT_HTML.to_owned()),
        ];
        if let Some(auth) = &self.auth {
            headers.push(("Authorization".to_owned(), auth.as_str().to_owned()));
        }
        let body = request.body.map(|body| {
            headers.push(("Content-Type".to_owned(), FORM_CONTENT_TYPE.to_owned()));
            body.encode()
        });
        Ok(PreparedRequest {
            method: request.method,
            url,
            headers,
            body,
        })
    }

    pub async fn exchange(&self, request: ExchangeRequest) -> ExchangeResult {
        let prepared = match self.prepare(request) {
            Ok(prepared) => prepared,
            Err(err) => {
                log::error!("exchange not sent: {err}");
                return ExchangeResult::failed(err);
            }
        };
        let method = prepared.method;
        let url = prepared.url.clone();
        log::debug!("{method} {url}");
        match self.backend.send(prepared).await {
            Ok(response) => {
                let result = ExchangeResult::from_response(response);
                if !result.ok {
                    log::warn!("{method} {url} answered {}", result.status);
                }
                result
            }
            Err(err) => {
                log::error!("{method} {url} failed: {err}");
                ExchangeResult::failed(err)
            }
        }
    }
}
