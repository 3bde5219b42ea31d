//! Configuration for the fragment-exchange engine.
//!
//! This module defines the page origin, the auth credential injected into the
//! transport, the failure notice and the refresh groups used in self-contained
//! mode. Configuration can be loaded from environment variables or constructed
//! programmatically.

use core::fmt;
use core::time::Duration;
use std::env;

use anyhow::{Context as _, Error, anyhow};
use html::DOM;
use url::Url;

use crate::regions::{RefreshGroup, default_groups};

/// Notice written into a swap target when its exchange fails.
pub const FAILURE_NOTICE: &str = "请求失败，请稍后再试";

/// `Accept` header sent with every exchange.
pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Header marking a request as a fragment exchange.
pub const FRAGMENT_REQUEST_HEADER: &str = "HX-Request";

/// Body attribute through which the host page publishes its credential.
pub const AUTH_HEADER_ATTR: &str = "data-auth-header";

/// `Content-Type` of state-changing request bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

/// Opaque `Authorization` header value. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthCredential(String);

impl AuthCredential {
    /// Wrap a header value; empty values mean "no credential".
    #[inline]
    #[must_use]
    pub fn new(value: &str) -> Option<Self> {
        (!value.is_empty()).then(|| Self(value.to_owned()))
    }

    /// Read the credential published on `<body data-auth-header>`.
    #[inline]
    #[must_use]
    pub fn from_document(document: &DOM) -> Option<Self> {
        document
            .attr(document.body(), AUTH_HEADER_ATTR)
            .and_then(Self::new)
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthCredential(<redacted>)")
    }
}

/// Runtime configuration for a page driven by the engine.
#[derive(Clone, Debug)]
pub struct ExchangeConfig {
    /// Origin of the hosting page; relative exchange URLs resolve against it
    pub origin: Url,
    /// Credential attached to every request; read from the document at boot when `None`
    pub auth: Option<AuthCredential>,
    /// Text written into a swap target when its exchange fails
    pub failure_notice: String,
    /// Per-request timeout applied by the reqwest backend
    pub request_timeout: Option<Duration>,
    /// Named events and the page regions they refresh in self-contained mode
    pub refresh_groups: Vec<RefreshGroup>,
}

impl ExchangeConfig {
    /// Configuration with default notice, no timeout and the default refresh groups.
    #[inline]
    #[must_use]
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            auth: None,
            failure_notice: FAILURE_NOTICE.to_owned(),
            request_timeout: None,
            refresh_groups: default_groups(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `EXCHANGE_ORIGIN`: Origin of the hosting page (required)
    /// - `EXCHANGE_FAILURE_NOTICE`: Failure notice text
    /// - `EXCHANGE_TIMEOUT_MS`: Request timeout in milliseconds (ignored unless > 0)
    /// - `EXCHANGE_REFRESH_GROUPS`: JSON array of refresh groups
    ///
    /// # Errors
    /// Returns an error when the origin is missing or invalid, or when the
    /// refresh groups are not valid JSON.
    pub fn from_env() -> Result<Self, Error> {
        let origin = env::var("EXCHANGE_ORIGIN").map_err(|_| anyhow!("EXCHANGE_ORIGIN is not set"))?;
        let origin = Url::parse(&origin).with_context(|| format!("invalid EXCHANGE_ORIGIN {origin:?}"))?;
        let mut config = Self::new(origin);
        if let Some(notice) = env::var("EXCHANGE_FAILURE_NOTICE")
            .ok()
            .filter(|notice| !notice.is_empty())
        {
            config.failure_notice = notice;
        }
        config.request_timeout = env::var("EXCHANGE_TIMEOUT_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .and_then(|millis| (millis > 0).then_some(millis))
            .map(Duration::from_millis);
        if let Ok(groups) = env::var("EXCHANGE_REFRESH_GROUPS") {
            config.refresh_groups = serde_json::from_str(&groups)
                .context("EXCHANGE_REFRESH_GROUPS is not a valid group list")?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_debug_is_redacted() {
        let credential = AuthCredential::new("Bearer secret").unwrap();
        assert_eq!(format!("{credential:?}"), "AuthCredential(<redacted>)");
        assert_eq!(credential.as_str(), "Bearer secret");
        assert!(AuthCredential::new("").is_none());
    }

    #[test]
    fn credential_from_body_attribute() {
        let document = DOM::parse(r#"<body data-auth-header="Token abc"></body>"#).unwrap();
        let credential = AuthCredential::from_document(&document).unwrap();
        assert_eq!(credential.as_str(), "Token abc");

        let bare = DOM::parse("<body></body>").unwrap();
        assert!(AuthCredential::from_document(&bare).is_none());
    }

    #[test]
    fn defaults() {
        let config = ExchangeConfig::new(Url::parse("https://admin.example").unwrap());
        assert_eq!(config.failure_notice, FAILURE_NOTICE);
        assert!(config.request_timeout.is_none());
        let events: Vec<&str> = config.refresh_groups.iter().map(|group| group.event.as_str()).collect();
        assert_eq!(events, vec!["refresh-links", "refresh-subdomains"]);
    }
}
