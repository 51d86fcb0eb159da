#![warn(missing_docs)]
//! # cas-client-validation
//!
//! ## Purpose
//! Provides the ticket validators a CAS configuration builds: one type per
//! protocol variant, all exposed through the [`TicketValidator`] capability.
//!
//! ## Responsibilities
//! - Build the validation request for a ticket (endpoint, `service`,
//!   `ticket`, `pgtUrl`).
//! - Hand the request to an injectable [`ValidationBackend`], which owns the
//!   transport and response parsing.
//! - Apply local trust policy to the returned [`Assertion`]: proxy-chain
//!   allow-list, SAML clock-skew window, PGT-IOU resolution through
//!   [`ProxyGrantingTicketStorage`].
//!
//! ## Data flow
//! `validate(ticket, service)` -> [`ValidationRequest`] ->
//! [`ValidationBackend::exchange`] -> [`Assertion`] -> local policy checks.
//!
//! ## Ownership and lifetimes
//! Validators own their settings. Backends and PGT storage are shared
//! (`Arc`) with the configuration that wired them.
//!
//! ## Error model
//! Policy violations and missing collaborators return [`ValidationError`].
//! Backend failures are propagated unchanged.
//!
//! ## Security and privacy notes
//! Tickets and proxy-granting tickets are only logged as fingerprints.
//!
//! ## Example
//! ```rust
//! use cas_client_core::Protocol;
//! use cas_client_validation::{Saml11TicketValidator, TicketValidator};
//!
//! let mut validator = Saml11TicketValidator::new("https://sso.example.org/cas/");
//! validator.set_tolerance(2_000);
//! assert_eq!(validator.protocol(), Protocol::Saml);
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use cas_client_core::{
    DEFAULT_ENCODING, DEFAULT_TIME_TOLERANCE_MS, PGT_URL_PARAMETER, Protocol, ProxyList,
    SAML_TARGET_PARAMETER, SERVICE_PARAMETER, TICKET_PARAMETER, fingerprint,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Authenticated principal returned by a successful validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assertion {
    /// Principal identifier released by the CAS server.
    pub principal: String,
    /// Released attributes, multi-valued.
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,
    /// Proxies the ticket travelled through, closest first.
    #[serde(default)]
    pub proxies: Vec<String>,
    /// PGT-IOU returned when a proxy callback was requested.
    #[serde(default)]
    pub proxy_granting_ticket_iou: Option<String>,
    /// PGT resolved from storage through the IOU.
    #[serde(default)]
    pub proxy_granting_ticket: Option<String>,
    /// Start of the assertion validity window (epoch ms).
    #[serde(default)]
    pub valid_from_ms: Option<u64>,
    /// End (exclusive) of the assertion validity window (epoch ms).
    #[serde(default)]
    pub valid_until_ms: Option<u64>,
}

impl Assertion {
    /// Creates an assertion for `principal` with no attributes.
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            ..Self::default()
        }
    }
}

/// Request handed to the backend for one ticket validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    /// Protocol the request follows.
    pub protocol: Protocol,
    /// Fully built validation URL.
    pub url: Url,
    /// Ticket being validated (also present in the URL except for SAML).
    pub ticket: String,
    /// Expected response encoding.
    pub encoding: String,
}

/// Transport and response parsing half of ticket validation.
pub trait ValidationBackend: Send + Sync + fmt::Debug {
    /// Sends the request to the CAS server and parses its answer.
    fn exchange(&self, request: &ValidationRequest) -> Result<Assertion, ValidationError>;
}

/// Storage shape validators use to turn a PGT-IOU into a PGT.
pub trait ProxyGrantingTicketStorage: Send + Sync + fmt::Debug {
    /// Stores the PGT delivered to the proxy callback under its IOU.
    fn save(&self, proxy_granting_ticket_iou: &str, proxy_granting_ticket: &str);

    /// Returns the PGT stored under the IOU.
    fn retrieve(&self, proxy_granting_ticket_iou: &str) -> Option<String>;

    /// Drops expired entries, if the storage tracks expiry.
    fn clean_up(&self);
}

/// Common capability of every CAS ticket validator.
pub trait TicketValidator: Send + Sync + fmt::Debug {
    /// Protocol variant this validator speaks.
    fn protocol(&self) -> Protocol;

    /// CAS prefix URL the validator was built against.
    fn prefix_url(&self) -> &str;

    /// Expected response encoding.
    fn encoding(&self) -> &str;

    /// Validates `ticket` issued for `service`.
    ///
    /// # Errors
    /// Returns [`ValidationError`] for blank tickets, missing backend, local
    /// policy violations, or whatever the backend reports.
    fn validate(&self, ticket: &str, service: &str) -> Result<Assertion, ValidationError>;

    /// Downcasting hook for callers that need the concrete validator.
    fn as_any(&self) -> &dyn Any;
}

/// Validators that can request a proxy-granting ticket.
pub trait ProxyCallbackTarget {
    /// Sets the callback URL the CAS server delivers the PGT to.
    fn set_proxy_callback_url(&mut self, url: impl Into<String>);

    /// Sets the storage the PGT-IOU is resolved against.
    fn set_proxy_granting_ticket_storage(&mut self, storage: Arc<dyn ProxyGrantingTicketStorage>);

    /// Returns the configured callback URL.
    fn proxy_callback_url(&self) -> Option<&str>;

    /// Returns the configured storage.
    fn proxy_granting_ticket_storage(&self) -> Option<&Arc<dyn ProxyGrantingTicketStorage>>;
}

#[derive(Debug, Clone)]
struct ValidatorBase {
    protocol: Protocol,
    prefix_url: String,
    encoding: String,
    backend: Option<Arc<dyn ValidationBackend>>,
}

impl ValidatorBase {
    fn new(protocol: Protocol, prefix_url: impl Into<String>) -> Self {
        Self {
            protocol,
            prefix_url: prefix_url.into(),
            encoding: DEFAULT_ENCODING.to_string(),
            backend: None,
        }
    }

    fn build_request(
        &self,
        ticket: &str,
        service: &str,
        proxy_callback_url: Option<&str>,
    ) -> Result<ValidationRequest, ValidationError> {
        if ticket.trim().is_empty() {
            return Err(ValidationError::BlankTicket);
        }

        let mut url = Url::parse(&self.prefix_url)
            .and_then(|prefix| {
                with_trailing_slash(prefix).join(self.protocol.validation_endpoint())
            })
            .map_err(|error| {
                ValidationError::InvalidPrefixUrl(format!("{}: {error}", self.prefix_url))
            })?;

        {
            let mut query = url.query_pairs_mut();
            if self.protocol == Protocol::Saml {
                query.append_pair(SAML_TARGET_PARAMETER, service);
            } else {
                query.append_pair(SERVICE_PARAMETER, service);
                query.append_pair(TICKET_PARAMETER, ticket);
                if let Some(callback) = proxy_callback_url {
                    query.append_pair(PGT_URL_PARAMETER, callback);
                }
            }
        }

        Ok(ValidationRequest {
            protocol: self.protocol,
            url,
            ticket: ticket.to_string(),
            encoding: self.encoding.clone(),
        })
    }

    fn exchange(
        &self,
        ticket: &str,
        service: &str,
        proxy_callback_url: Option<&str>,
    ) -> Result<Assertion, ValidationError> {
        let request = self.build_request(ticket, service, proxy_callback_url)?;
        let backend = self
            .backend
            .as_ref()
            .ok_or(ValidationError::BackendUnavailable)?;

        debug!(
            protocol = %self.protocol,
            ticket = %fingerprint(ticket),
            "Validating CAS ticket"
        );
        backend.exchange(&request)
    }
}

// `Url::join` replaces the last segment unless the path ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[derive(Debug, Clone, Default)]
struct ProxyCallback {
    url: Option<String>,
    storage: Option<Arc<dyn ProxyGrantingTicketStorage>>,
}

impl ProxyCallback {
    fn resolve_pgt(&self, assertion: &mut Assertion) {
        let (Some(iou), Some(storage)) = (&assertion.proxy_granting_ticket_iou, &self.storage)
        else {
            return;
        };

        match storage.retrieve(iou) {
            Some(pgt) => assertion.proxy_granting_ticket = Some(pgt),
            None => warn!(
                pgt_iou = %fingerprint(iou),
                "No proxy-granting ticket stored for IOU"
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct ProxyPolicy {
    accept_any_proxy: bool,
    allowed_proxy_chains: ProxyList,
}

impl ProxyPolicy {
    fn check(&self, assertion: &Assertion) -> Result<(), ValidationError> {
        if assertion.proxies.is_empty() || self.accept_any_proxy {
            return Ok(());
        }
        if self.allowed_proxy_chains.contains(&assertion.proxies) {
            return Ok(());
        }

        warn!(
            proxies = assertion.proxies.len(),
            "Rejected proxy ticket with unauthorized proxy chain"
        );
        Err(ValidationError::UnauthorizedProxyChain(
            assertion.proxies.clone(),
        ))
    }
}

/// CAS 1.0 validator (`/validate`).
#[derive(Debug, Clone)]
pub struct Cas10TicketValidator {
    base: ValidatorBase,
}

impl Cas10TicketValidator {
    /// Creates a validator against the CAS prefix URL.
    pub fn new(prefix_url: impl Into<String>) -> Self {
        Self {
            base: ValidatorBase::new(Protocol::Cas10, prefix_url),
        }
    }

    /// Sets the expected response encoding.
    pub fn set_encoding(&mut self, encoding: impl Into<String>) {
        self.base.encoding = encoding.into();
    }

    /// Sets the backend used to reach the CAS server.
    pub fn set_backend(&mut self, backend: Arc<dyn ValidationBackend>) {
        self.base.backend = Some(backend);
    }
}

impl TicketValidator for Cas10TicketValidator {
    fn protocol(&self) -> Protocol {
        self.base.protocol
    }

    fn prefix_url(&self) -> &str {
        &self.base.prefix_url
    }

    fn encoding(&self) -> &str {
        &self.base.encoding
    }

    fn validate(&self, ticket: &str, service: &str) -> Result<Assertion, ValidationError> {
        self.base.exchange(ticket, service, None)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// CAS 2.0 service ticket validator (`/serviceValidate`).
#[derive(Debug, Clone)]
pub struct Cas20ServiceTicketValidator {
    base: ValidatorBase,
    callback: ProxyCallback,
}

/// CAS 3.0 service ticket validator (`/p3/serviceValidate`).
#[derive(Debug, Clone)]
pub struct Cas30ServiceTicketValidator {
    base: ValidatorBase,
    callback: ProxyCallback,
}

/// CAS 2.0 proxy ticket validator (`/proxyValidate`).
#[derive(Debug, Clone)]
pub struct Cas20ProxyTicketValidator {
    base: ValidatorBase,
    callback: ProxyCallback,
    policy: ProxyPolicy,
}

/// CAS 3.0 proxy ticket validator (`/p3/proxyValidate`).
#[derive(Debug, Clone)]
pub struct Cas30ProxyTicketValidator {
    base: ValidatorBase,
    callback: ProxyCallback,
    policy: ProxyPolicy,
}

impl Cas20ServiceTicketValidator {
    /// Creates a validator against the CAS prefix URL.
    pub fn new(prefix_url: impl Into<String>) -> Self {
        Self {
            base: ValidatorBase::new(Protocol::Cas20, prefix_url),
            callback: ProxyCallback::default(),
        }
    }

    fn check_proxy_chain(&self, _assertion: &Assertion) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Cas30ServiceTicketValidator {
    /// Creates a validator against the CAS prefix URL.
    pub fn new(prefix_url: impl Into<String>) -> Self {
        Self {
            base: ValidatorBase::new(Protocol::Cas30, prefix_url),
            callback: ProxyCallback::default(),
        }
    }

    fn check_proxy_chain(&self, _assertion: &Assertion) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Cas20ProxyTicketValidator {
    /// Creates a validator against the CAS prefix URL.
    pub fn new(prefix_url: impl Into<String>) -> Self {
        Self {
            base: ValidatorBase::new(Protocol::Cas20Proxy, prefix_url),
            callback: ProxyCallback::default(),
            policy: ProxyPolicy::default(),
        }
    }

    fn check_proxy_chain(&self, assertion: &Assertion) -> Result<(), ValidationError> {
        self.policy.check(assertion)
    }
}

impl Cas30ProxyTicketValidator {
    /// Creates a validator against the CAS prefix URL.
    pub fn new(prefix_url: impl Into<String>) -> Self {
        Self {
            base: ValidatorBase::new(Protocol::Cas30Proxy, prefix_url),
            callback: ProxyCallback::default(),
            policy: ProxyPolicy::default(),
        }
    }

    fn check_proxy_chain(&self, assertion: &Assertion) -> Result<(), ValidationError> {
        self.policy.check(assertion)
    }
}

/// Validators that enforce an allow-list of proxy chains.
pub trait ProxyChainPolicy {
    /// Accepts any presented proxy chain when `true`.
    fn set_accept_any_proxy(&mut self, accept_any_proxy: bool);

    /// Sets the allowed proxy chains.
    fn set_allowed_proxy_chains(&mut self, chains: ProxyList);

    /// Returns `true` when any chain is accepted.
    fn accept_any_proxy(&self) -> bool;

    /// Returns the allowed proxy chains.
    fn allowed_proxy_chains(&self) -> &ProxyList;
}

impl ProxyChainPolicy for Cas20ProxyTicketValidator {
    fn set_accept_any_proxy(&mut self, accept_any_proxy: bool) {
        self.policy.accept_any_proxy = accept_any_proxy;
    }

    fn set_allowed_proxy_chains(&mut self, chains: ProxyList) {
        self.policy.allowed_proxy_chains = chains;
    }

    fn accept_any_proxy(&self) -> bool {
        self.policy.accept_any_proxy
    }

    fn allowed_proxy_chains(&self) -> &ProxyList {
        &self.policy.allowed_proxy_chains
    }
}

impl ProxyChainPolicy for Cas30ProxyTicketValidator {
    fn set_accept_any_proxy(&mut self, accept_any_proxy: bool) {
        self.policy.accept_any_proxy = accept_any_proxy;
    }

    fn set_allowed_proxy_chains(&mut self, chains: ProxyList) {
        self.policy.allowed_proxy_chains = chains;
    }

    fn accept_any_proxy(&self) -> bool {
        self.policy.accept_any_proxy
    }

    fn allowed_proxy_chains(&self) -> &ProxyList {
        &self.policy.allowed_proxy_chains
    }
}

/// Settings shared by the four validators that accept a proxy callback.
pub trait CasServiceValidator: ProxyCallbackTarget {
    /// Sets the expected response encoding.
    fn set_encoding(&mut self, encoding: impl Into<String>);

    /// Sets the backend used to reach the CAS server.
    fn set_backend(&mut self, backend: Arc<dyn ValidationBackend>);
}

macro_rules! proxy_capable_validator {
    ($validator:ty) => {
        impl ProxyCallbackTarget for $validator {
            fn set_proxy_callback_url(&mut self, url: impl Into<String>) {
                self.callback.url = Some(url.into());
            }

            fn set_proxy_granting_ticket_storage(
                &mut self,
                storage: Arc<dyn ProxyGrantingTicketStorage>,
            ) {
                self.callback.storage = Some(storage);
            }

            fn proxy_callback_url(&self) -> Option<&str> {
                self.callback.url.as_deref()
            }

            fn proxy_granting_ticket_storage(
                &self,
            ) -> Option<&Arc<dyn ProxyGrantingTicketStorage>> {
                self.callback.storage.as_ref()
            }
        }

        impl CasServiceValidator for $validator {
            fn set_encoding(&mut self, encoding: impl Into<String>) {
                self.base.encoding = encoding.into();
            }

            fn set_backend(&mut self, backend: Arc<dyn ValidationBackend>) {
                self.base.backend = Some(backend);
            }
        }

        impl TicketValidator for $validator {
            fn protocol(&self) -> Protocol {
                self.base.protocol
            }

            fn prefix_url(&self) -> &str {
                &self.base.prefix_url
            }

            fn encoding(&self) -> &str {
                &self.base.encoding
            }

            fn validate(&self, ticket: &str, service: &str) -> Result<Assertion, ValidationError> {
                let mut assertion =
                    self.base
                        .exchange(ticket, service, self.callback.url.as_deref())?;
                self.check_proxy_chain(&assertion)?;
                self.callback.resolve_pgt(&mut assertion);
                Ok(assertion)
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

proxy_capable_validator!(Cas20ServiceTicketValidator);
proxy_capable_validator!(Cas30ServiceTicketValidator);
proxy_capable_validator!(Cas20ProxyTicketValidator);
proxy_capable_validator!(Cas30ProxyTicketValidator);

/// SAML 1.1 validator (`/samlValidate`).
#[derive(Debug, Clone)]
pub struct Saml11TicketValidator {
    base: ValidatorBase,
    tolerance_ms: u64,
}

impl Saml11TicketValidator {
    /// Creates a validator against the CAS prefix URL.
    pub fn new(prefix_url: impl Into<String>) -> Self {
        Self {
            base: ValidatorBase::new(Protocol::Saml, prefix_url),
            tolerance_ms: DEFAULT_TIME_TOLERANCE_MS,
        }
    }

    /// Sets the expected response encoding.
    pub fn set_encoding(&mut self, encoding: impl Into<String>) {
        self.base.encoding = encoding.into();
    }

    /// Sets the backend used to reach the CAS server.
    pub fn set_backend(&mut self, backend: Arc<dyn ValidationBackend>) {
        self.base.backend = Some(backend);
    }

    /// Sets the clock-skew tolerance in milliseconds.
    pub fn set_tolerance(&mut self, tolerance_ms: u64) {
        self.tolerance_ms = tolerance_ms;
    }

    /// Returns the clock-skew tolerance in milliseconds.
    pub fn tolerance(&self) -> u64 {
        self.tolerance_ms
    }

    /// Validates a ticket as of `now_ms` (epoch milliseconds).
    ///
    /// # Errors
    /// Returns [`ValidationError::AssertionOutsideValidity`] when `now_ms`
    /// falls outside the assertion window widened by the tolerance.
    pub fn validate_at(
        &self,
        ticket: &str,
        service: &str,
        now_ms: u64,
    ) -> Result<Assertion, ValidationError> {
        let assertion = self.base.exchange(ticket, service, None)?;

        let too_early = assertion
            .valid_from_ms
            .is_some_and(|from| now_ms.saturating_add(self.tolerance_ms) < from);
        let too_late = assertion
            .valid_until_ms
            .is_some_and(|until| now_ms >= until.saturating_add(self.tolerance_ms));
        if too_early || too_late {
            return Err(ValidationError::AssertionOutsideValidity {
                now_ms,
                valid_from_ms: assertion.valid_from_ms,
                valid_until_ms: assertion.valid_until_ms,
            });
        }

        Ok(assertion)
    }
}

impl TicketValidator for Saml11TicketValidator {
    fn protocol(&self) -> Protocol {
        self.base.protocol
    }

    fn prefix_url(&self) -> &str {
        &self.base.prefix_url
    }

    fn encoding(&self) -> &str {
        &self.base.encoding
    }

    fn validate(&self, ticket: &str, service: &str) -> Result<Assertion, ValidationError> {
        self.validate_at(ticket, service, now_ms())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Errors produced while validating a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Ticket parameter was missing or blank.
    #[error("ticket must not be blank")]
    BlankTicket,
    /// No backend was wired to reach the CAS server.
    #[error("no validation backend configured")]
    BackendUnavailable,
    /// Prefix URL could not be turned into a validation URL.
    #[error("invalid CAS prefix url: {0}")]
    InvalidPrefixUrl(String),
    /// Proxy ticket came through a chain that is not allowed.
    #[error("unauthorized proxy chain: {0:?}")]
    UnauthorizedProxyChain(Vec<String>),
    /// SAML assertion is not valid at the current time.
    #[error("assertion not valid at {now_ms} (from {valid_from_ms:?}, until {valid_until_ms:?})")]
    AssertionOutsideValidity {
        /// Validation time in epoch milliseconds.
        now_ms: u64,
        /// Assertion start in epoch milliseconds.
        valid_from_ms: Option<u64>,
        /// Assertion end in epoch milliseconds.
        valid_until_ms: Option<u64>,
    },
    /// Failure reported by the backend (transport or CAS error code).
    #[error("validation backend failure: {0}")]
    Backend(String),
}
