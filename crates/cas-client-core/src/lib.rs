#![warn(missing_docs)]
//! # cas-client-core
//!
//! ## Purpose
//! Defines the shared vocabulary of the `cas-client` workspace: protocol
//! tags, proxy chains, framework constants and the collaborator traits the
//! configuration layer consumes.
//!
//! ## Responsibilities
//! - Name the CAS protocol variants and their proxy capabilities.
//! - Model allowed proxy chains and membership checks.
//! - Abstract the web request ([`WebContext`]) and URL rewriting
//!   ([`UrlResolver`]).
//! - Abstract the framework ticket store ([`TicketStore`]).
//!
//! ## Data flow
//! The framework implements [`WebContext`] per request and hands it to the
//! configuration, which resolves configured URLs through a [`UrlResolver`]
//! before building validators.
//!
//! ## Ownership and lifetimes
//! Contexts are borrowed for the duration of one call. Resolvers and stores
//! are shared behind `Arc` by their owners, so all collaborator traits are
//! `Send + Sync`.
//!
//! ## Error model
//! Parsing failures (unknown protocol tag) return [`CoreError`].
//!
//! ## Security and privacy notes
//! Tickets and session ids must never reach logs verbatim. Use
//! [`fingerprint`] to derive a stable, non-reversible log token.
//!
//! ## Example
//! ```rust
//! use cas_client_core::{Protocol, ProxyChain, ProxyList};
//!
//! let protocol: Protocol = "CAS30_PROXY".parse().unwrap();
//! assert!(protocol.checks_proxy_chain());
//!
//! let allowed = ProxyList::new(vec![ProxyChain::new(["https://proxy.example.org/*"])]);
//! assert!(allowed.contains(&["https://proxy.example.org/cb".to_string()]));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

/// Request parameter carrying a service or proxy ticket.
pub const TICKET_PARAMETER: &str = "ticket";
/// Request parameter carrying the service URL.
pub const SERVICE_PARAMETER: &str = "service";
/// Request parameter carrying a single-logout request.
pub const LOGOUT_REQUEST_PARAMETER: &str = "logoutRequest";
/// SAML element naming the ticket inside a logout request.
pub const SESSION_INDEX_TAG: &str = "SessionIndex";
/// Request parameter carrying relay state on front-channel logout.
pub const RELAY_STATE_PARAMETER: &str = "RelayState";
/// Validation parameter carrying the proxy callback URL.
pub const PGT_URL_PARAMETER: &str = "pgtUrl";
/// Proxy callback parameter carrying the PGT-IOU.
pub const PGT_IOU_PARAMETER: &str = "pgtIou";
/// Proxy callback parameter carrying the PGT.
pub const PGT_ID_PARAMETER: &str = "pgtId";
/// Login redirect parameter forcing re-authentication.
pub const RENEW_PARAMETER: &str = "renew";
/// Login redirect parameter requesting a silent login.
pub const GATEWAY_PARAMETER: &str = "gateway";
/// SAML 1.1 validation parameter carrying the service URL.
pub const SAML_TARGET_PARAMETER: &str = "TARGET";
/// Default character encoding for validation responses.
pub const DEFAULT_ENCODING: &str = "UTF-8";
/// Default SAML clock-skew tolerance in milliseconds.
pub const DEFAULT_TIME_TOLERANCE_MS: u64 = 1_000;

/// CAS protocol variants a configuration can validate tickets with.
///
/// Serialized as its tag name (`CAS10`, `CAS20_PROXY`, `SAML`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Protocol {
    /// CAS 1.0 plain-text validation.
    Cas10,
    /// CAS 2.0 service ticket validation.
    Cas20,
    /// CAS 2.0 proxy ticket validation.
    Cas20Proxy,
    /// CAS 3.0 service ticket validation (attributes released).
    #[default]
    Cas30,
    /// CAS 3.0 proxy ticket validation.
    Cas30Proxy,
    /// SAML 1.1 validation.
    Saml,
}

impl Protocol {
    /// Every supported protocol, in declaration order.
    pub const ALL: [Protocol; 6] = [
        Protocol::Cas10,
        Protocol::Cas20,
        Protocol::Cas20Proxy,
        Protocol::Cas30,
        Protocol::Cas30Proxy,
        Protocol::Saml,
    ];

    /// Returns the canonical tag name (`CAS20_PROXY`, `SAML`, ...).
    pub fn tag(self) -> &'static str {
        match self {
            Protocol::Cas10 => "CAS10",
            Protocol::Cas20 => "CAS20",
            Protocol::Cas20Proxy => "CAS20_PROXY",
            Protocol::Cas30 => "CAS30",
            Protocol::Cas30Proxy => "CAS30_PROXY",
            Protocol::Saml => "SAML",
        }
    }

    /// Returns `true` when validators of this protocol accept a proxy
    /// callback URL and proxy-granting-ticket storage.
    pub fn supports_proxy_callback(self) -> bool {
        matches!(
            self,
            Protocol::Cas20 | Protocol::Cas20Proxy | Protocol::Cas30 | Protocol::Cas30Proxy
        )
    }

    /// Returns `true` when validators of this protocol enforce the allowed
    /// proxy chains.
    pub fn checks_proxy_chain(self) -> bool {
        matches!(self, Protocol::Cas20Proxy | Protocol::Cas30Proxy)
    }

    /// Path, relative to the CAS prefix URL, of the validation endpoint.
    pub fn validation_endpoint(self) -> &'static str {
        match self {
            Protocol::Cas10 => "validate",
            Protocol::Cas20 => "serviceValidate",
            Protocol::Cas20Proxy => "proxyValidate",
            Protocol::Cas30 => "p3/serviceValidate",
            Protocol::Cas30Proxy => "p3/proxyValidate",
            Protocol::Saml => "samlValidate",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl TryFrom<String> for Protocol {
    type Error = CoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Protocol> for String {
    fn from(protocol: Protocol) -> Self {
        protocol.tag().to_string()
    }
}

impl FromStr for Protocol {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Protocol::ALL
            .into_iter()
            .find(|protocol| protocol.tag() == raw)
            .ok_or_else(|| CoreError::UnknownProtocol(raw.to_string()))
    }
}

/// One accepted proxy chain, ordered from the closest proxy outwards.
///
/// A pattern ending with `*` matches every proxy URL starting with the text
/// before the `*`. Any other pattern matches only the identical URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProxyChain {
    patterns: Vec<String>,
}

impl ProxyChain {
    /// Builds a chain from its URL patterns.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the chain patterns.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns `true` when `proxies` has the same length as the chain and
    /// every URL matches the pattern at its position.
    pub fn matches(&self, proxies: &[String]) -> bool {
        self.patterns.len() == proxies.len()
            && self
                .patterns
                .iter()
                .zip(proxies)
                .all(|(pattern, proxy)| pattern_matches(pattern, proxy))
    }
}

fn pattern_matches(pattern: &str, url: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => url.starts_with(prefix),
        None => pattern == url,
    }
}

/// Ordered allow-list of proxy chains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProxyList {
    chains: Vec<ProxyChain>,
}

impl ProxyList {
    /// Builds a list from its chains.
    pub fn new(chains: Vec<ProxyChain>) -> Self {
        Self { chains }
    }

    /// Returns `true` when any allowed chain matches the presented one.
    pub fn contains(&self, proxies: &[String]) -> bool {
        self.chains.iter().any(|chain| chain.matches(proxies))
    }

    /// Returns the allowed chains in order.
    pub fn chains(&self) -> &[ProxyChain] {
        &self.chains
    }

    /// Returns `true` when no chain is allowed.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Returns the number of allowed chains.
    pub fn len(&self) -> usize {
        self.chains.len()
    }
}

impl fmt::Display for ProxyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .chains
            .iter()
            .map(|chain| format!("[{}]", chain.patterns.join(", ")))
            .collect();
        write!(f, "[{}]", rendered.join(", "))
    }
}

/// One HTTP exchange as seen by the CAS layer.
pub trait WebContext {
    /// Full URL of the current request.
    fn request_url(&self) -> String;

    /// HTTP method of the current request (`GET`, `POST`, ...).
    fn request_method(&self) -> String;

    /// Value of a query or form parameter.
    fn request_parameter(&self, name: &str) -> Option<String>;

    /// Identifier of the current session, if one exists.
    fn session_id(&self) -> Option<String>;

    /// Destroys the current session. Returns `true` when one was destroyed.
    fn destroy_session(&self) -> bool;

    /// Destroys another session by identifier (back-channel logout).
    /// Returns `true` when the session existed.
    fn destroy_session_by_id(&self, session_id: &str) -> bool;
}

/// Turns a configured URL into the final absolute URL for a request.
pub trait UrlResolver: Send + Sync + fmt::Debug {
    /// Computes the final URL for `url` in the given request context.
    fn compute(&self, url: &str, context: &dyn WebContext) -> String;
}

/// Identity resolver, optionally completing relative URLs against the
/// origin of the current request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultUrlResolver {
    complete_relative_url: bool,
}

impl DefaultUrlResolver {
    /// Creates the identity resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver that turns `/path` URLs into absolute URLs using
    /// the scheme and authority of the current request.
    pub fn completing_relative_urls() -> Self {
        Self {
            complete_relative_url: true,
        }
    }

    /// Returns `true` when relative URLs are completed.
    pub fn completes_relative_url(&self) -> bool {
        self.complete_relative_url
    }
}

impl UrlResolver for DefaultUrlResolver {
    fn compute(&self, url: &str, context: &dyn WebContext) -> String {
        if !self.complete_relative_url || !url.starts_with('/') {
            return url.to_string();
        }

        Url::parse(&context.request_url())
            .and_then(|base| base.join(url))
            .map(String::from)
            .unwrap_or_else(|_| url.to_string())
    }
}

/// Framework key/value store shared with the proxy-callback endpoint.
pub trait TicketStore: Send + Sync + fmt::Debug {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String);

    /// Removes `key`. Returns the previous value.
    fn remove(&self, key: &str) -> Option<String>;
}

/// Process-local [`TicketStore`] backed by a lock-protected map.
#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryTicketStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TicketStore for InMemoryTicketStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) -> Option<String> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }
}

/// Returns `true` for an absent, empty or whitespace-only value.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|value| value.trim().is_empty())
}

/// Derives a short log-safe token from a secret value (ticket, session id).
///
/// The token is the first 12 hex characters of the SHA-256 digest, stable
/// across calls so log lines about the same ticket can be correlated.
pub fn fingerprint(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(12);
    encoded
}

/// Error type for core vocabulary parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Protocol tag does not name a supported CAS variant.
    #[error("Unable to initialize the TicketValidator for protocol: {0}")]
    UnknownProtocol(String),
}
