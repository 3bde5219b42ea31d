use core::time::Duration;

use anyhow::{Context as _, Error};
use futures::FutureExt as _;
use futures::future::LocalBoxFuture;
use reqwest::{Client, Method as HttpMethod};

use super::{PreparedRequest, TransportError};
use crate::attributes::Method;

/// Status and body text of an HTTP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendResponse {
    pub status: u16,
    pub text: String,
}

/// The wire. Implementations may suspend; the engine runs on one thread.
pub trait HttpBackend {
    fn send(&self, request: PreparedRequest) -> LocalBoxFuture<'_, Result<BackendResponse, TransportError>>;
}

/// Production backend over a shared `reqwest::Client` with a cookie store,
/// so session cookies travel with every same-origin exchange.
pub struct ReqwestBackend {
    client: Client,
}

impl ReqwestBackend {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Option<Duration>) -> Result<Self, Error> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build HTTP client")?;
        Ok(Self { client })
    }
}

fn http_method(method: Method) -> HttpMethod {
    match method {
        Method::Get => HttpMethod::GET,
        Method::Post => HttpMethod::POST,
        Method::Put => HttpMethod::PUT,
        Method::Delete => HttpMethod::DELETE,
    }
}

impl HttpBackend for ReqwestBackend {
    fn send(&self, request: PreparedRequest) -> LocalBoxFuture<'_, Result<BackendResponse, TransportError>> {
        let mut req = self
            .client
            .request(http_method(request.method), request.url);
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            req = req.body(body);
        }
        async move {
            let resp = req
                .send()
                .await
                .map_err(|err| TransportError::Network(err.to_string()))?;
            let status = resp.status().as_u16();
            let text = resp
                .text()
                .await
                .map_err(|err| TransportError::Body(err.to_string()))?;
            Ok(BackendResponse { status, text })
        }
        .boxed_local()
    }
}
