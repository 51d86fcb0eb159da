#![warn(missing_docs)]
//! # cas-client-config
//!
//! ## Purpose
//! Turns declarative CAS client settings into the collaborators a web
//! framework drives a CAS login with: a ticket validator per request, a
//! logout handler, and the final login/prefix/REST URLs.
//!
//! ## Responsibilities
//! - Hold every CAS client setting ([`CasConfiguration`]).
//! - Normalize and cross-fill `loginUrl`, `prefixUrl` and `restUrl` exactly
//!   once, on first [`CasConfiguration::init`].
//! - Build the validator matching the configured [`Protocol`], wiring trust
//!   options and the proxy callback.
//! - Compute login and logout redirect URLs.
//!
//! ## Data flow
//! [`CasSettings`] (or setters) -> [`CasConfiguration`] ->
//! [`CasConfiguration::init`] on first authentication event ->
//! [`CasConfiguration::retrieve_ticket_validator`] per validation.
//!
//! ## Ownership and lifetimes
//! The configuration shares ownership (`Arc`) of its resolver, logout
//! handler and validation backend. The proxy receptor is only read from; its
//! lifecycle belongs to the framework. Built validators are owned by the
//! caller.
//!
//! ## Error model
//! Contract violations detected here return [`ConfigurationError`].
//! Collaborator failures are not caught or transformed.
//!
//! ## Security and privacy notes
//! The `Display` rendering lists every field for debugging. Logs never carry
//! tickets or session ids verbatim.
//!
//! ## Example
//! ```rust
//! use cas_client_config::CasConfiguration;
//! # use cas_client_core::WebContext;
//! # struct Request;
//! # impl WebContext for Request {
//! #     fn request_url(&self) -> String { "https://app.example.org/".into() }
//! #     fn request_method(&self) -> String { "GET".into() }
//! #     fn request_parameter(&self, _: &str) -> Option<String> { None }
//! #     fn session_id(&self) -> Option<String> { None }
//! #     fn destroy_session(&self) -> bool { false }
//! #     fn destroy_session_by_id(&self, _: &str) -> bool { false }
//! # }
//!
//! let configuration = CasConfiguration::with_login_url("https://sso.example.org/cas/login");
//! configuration.init(&Request).unwrap();
//! assert_eq!(configuration.prefix_url().as_deref(), Some("https://sso.example.org/cas/"));
//! ```

mod proxy;
mod settings;

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

pub use cas_client_core::{
    CoreError, DefaultUrlResolver, GATEWAY_PARAMETER, LOGOUT_REQUEST_PARAMETER, Protocol,
    ProxyChain, ProxyList, RELAY_STATE_PARAMETER, RENEW_PARAMETER, SERVICE_PARAMETER,
    SESSION_INDEX_TAG, TICKET_PARAMETER, TicketStore, UrlResolver, WebContext,
};
pub use cas_client_logout::{CasLogoutHandler, DefaultCasLogoutHandler};
pub use cas_client_validation::{TicketValidator, ValidationBackend};
pub use proxy::{
    CasProxyReceptor, ProxyCallbackOutcome, ProxyGrantingTicketStore, StoreProxyReceptor,
};
pub use settings::CasSettings;

use cas_client_core::is_blank;
use cas_client_validation::{
    Cas10TicketValidator, Cas20ProxyTicketValidator, Cas20ServiceTicketValidator,
    Cas30ProxyTicketValidator, Cas30ServiceTicketValidator, CasServiceValidator,
    ProxyChainPolicy, Saml11TicketValidator,
};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Message raised when no CAS URL was configured.
pub const ALL_URLS_BLANK: &str = "loginUrl, prefixUrl and restUrl cannot be all blank";
/// Message raised when the URL resolver was removed.
pub const URL_RESOLVER_MISSING: &str = "urlResolver must not be null";
/// Message raised when only `restUrl` was configured.
pub const PREFIX_UNDERIVABLE: &str =
    "loginUrl and prefixUrl cannot be both blank when only restUrl is set";

/// The three related CAS server URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CasUrls {
    /// Login page URL.
    pub login_url: Option<String>,
    /// Base URL every CAS endpoint is relative to.
    pub prefix_url: Option<String>,
    /// REST tickets endpoint URL.
    pub rest_url: Option<String>,
}

impl CasUrls {
    /// Cross-derives missing URLs from the ones given.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::Configuration`] when all three are
    /// blank, or when only `rest_url` is given.
    pub fn normalized(&self) -> Result<CasUrls, ConfigurationError> {
        let login_blank = is_blank(self.login_url.as_deref());
        let prefix_blank = is_blank(self.prefix_url.as_deref());
        if login_blank && prefix_blank && is_blank(self.rest_url.as_deref()) {
            return Err(ConfigurationError::configuration(ALL_URLS_BLANK));
        }

        let mut urls = self.clone();
        let prefix = if prefix_blank {
            let login = urls
                .login_url
                .as_deref()
                .filter(|_| !login_blank)
                .ok_or_else(|| ConfigurationError::configuration(PREFIX_UNDERIVABLE))?;
            let derived = match login.strip_suffix("/login") {
                Some(base) => format!("{base}/"),
                None => login.to_string(),
            };
            with_trailing_slash(derived)
        } else {
            let prefix = with_trailing_slash(urls.prefix_url.clone().unwrap_or_default());
            if login_blank {
                urls.login_url = Some(format!("{prefix}login"));
            }
            prefix
        };

        if is_blank(urls.rest_url.as_deref()) {
            urls.rest_url = Some(format!("{prefix}v1/tickets"));
        }
        urls.prefix_url = Some(prefix);
        Ok(urls)
    }
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

/// CAS client configuration and validator factory.
pub struct CasConfiguration {
    encoding: String,
    urls: RwLock<CasUrls>,
    time_tolerance: u64,
    protocol: Protocol,
    renew: bool,
    gateway: bool,
    accept_any_proxy: bool,
    allowed_proxy_chains: ProxyList,
    logout_handler: RwLock<Option<Arc<dyn CasLogoutHandler>>>,
    default_ticket_validator: Option<Arc<dyn TicketValidator>>,
    proxy_receptor: Option<Arc<dyn CasProxyReceptor>>,
    url_resolver: Option<Arc<dyn UrlResolver>>,
    post_logout_url_parameter: String,
    validation_backend: Option<Arc<dyn ValidationBackend>>,
    init_lock: Mutex<()>,
    initialized: AtomicBool,
}

impl CasConfiguration {
    /// Creates a configuration with every default and no URL.
    pub fn new() -> Self {
        Self::from_settings(CasSettings::default())
    }

    /// Creates a configuration from its login URL.
    pub fn with_login_url(login_url: impl Into<String>) -> Self {
        let mut configuration = Self::new();
        configuration.set_login_url(login_url);
        configuration
    }

    /// Creates a configuration from its login URL and protocol.
    pub fn with_login_url_and_protocol(login_url: impl Into<String>, protocol: Protocol) -> Self {
        let mut configuration = Self::with_login_url(login_url);
        configuration.set_protocol(protocol);
        configuration
    }

    /// Creates a configuration from its login and prefix URLs.
    pub fn with_login_and_prefix_url(
        login_url: impl Into<String>,
        prefix_url: impl Into<String>,
    ) -> Self {
        let mut configuration = Self::with_login_url(login_url);
        configuration.set_prefix_url(prefix_url);
        configuration
    }

    /// Creates a configuration from a settings document.
    pub fn from_settings(settings: CasSettings) -> Self {
        Self {
            encoding: settings.encoding,
            urls: RwLock::new(CasUrls {
                login_url: settings.login_url,
                prefix_url: settings.prefix_url,
                rest_url: settings.rest_url,
            }),
            time_tolerance: settings.time_tolerance,
            protocol: settings.protocol,
            renew: settings.renew,
            gateway: settings.gateway,
            accept_any_proxy: settings.accept_any_proxy,
            allowed_proxy_chains: settings.allowed_proxy_chains,
            logout_handler: RwLock::new(None),
            default_ticket_validator: None,
            proxy_receptor: None,
            url_resolver: Some(Arc::new(DefaultUrlResolver::new())),
            post_logout_url_parameter: settings.post_logout_url_parameter,
            validation_backend: None,
            init_lock: Mutex::new(()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Exports the plain settings (current URLs included).
    pub fn settings(&self) -> CasSettings {
        let urls = self.urls();
        CasSettings {
            encoding: self.encoding.clone(),
            login_url: urls.login_url,
            prefix_url: urls.prefix_url,
            rest_url: urls.rest_url,
            time_tolerance: self.time_tolerance,
            protocol: self.protocol,
            renew: self.renew,
            gateway: self.gateway,
            accept_any_proxy: self.accept_any_proxy,
            allowed_proxy_chains: self.allowed_proxy_chains.clone(),
            post_logout_url_parameter: self.post_logout_url_parameter.clone(),
        }
    }

    /// Validates inputs, normalizes URLs and installs the default logout
    /// handler. Runs once; later calls return immediately.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::Configuration`] when all URLs are blank
    /// or the URL resolver is missing. A failed call leaves the
    /// configuration uninitialized.
    pub fn init(&self, context: &dyn WebContext) -> Result<(), ConfigurationError> {
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }

        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }

        self.internal_init(context)?;
        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    fn internal_init(&self, context: &dyn WebContext) -> Result<(), ConfigurationError> {
        let current = self.urls();
        if is_blank(current.login_url.as_deref())
            && is_blank(current.prefix_url.as_deref())
            && is_blank(current.rest_url.as_deref())
        {
            return Err(ConfigurationError::configuration(ALL_URLS_BLANK));
        }
        if self.url_resolver.is_none() {
            return Err(ConfigurationError::configuration(URL_RESOLVER_MISSING));
        }

        let normalized = current.normalized()?;
        info!(
            login_url = normalized.login_url.as_deref().unwrap_or_default(),
            prefix_url = normalized.prefix_url.as_deref().unwrap_or_default(),
            rest_url = normalized.rest_url.as_deref().unwrap_or_default(),
            request_url = %context.request_url(),
            "Initialized CAS configuration"
        );
        *self.urls.write().unwrap_or_else(PoisonError::into_inner) = normalized;

        let mut handler = self
            .logout_handler
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if handler.is_none() {
            *handler = Some(Arc::new(DefaultCasLogoutHandler::new()));
        }
        Ok(())
    }

    /// Returns the caller-supplied validator, or builds a fresh one for the
    /// configured protocol.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::Configuration`] when the URL resolver is
    /// missing.
    pub fn retrieve_ticket_validator(
        &self,
        context: &dyn WebContext,
    ) -> Result<Arc<dyn TicketValidator>, ConfigurationError> {
        if let Some(validator) = &self.default_ticket_validator {
            return Ok(Arc::clone(validator));
        }

        let prefix_url = self.compute_final_prefix_url(context)?;
        debug!(
            protocol = %self.protocol,
            prefix_url = %prefix_url,
            "Building CAS ticket validator"
        );

        let validator: Arc<dyn TicketValidator> = match self.protocol {
            Protocol::Cas10 => {
                let mut validator = Cas10TicketValidator::new(prefix_url);
                validator.set_encoding(self.encoding.clone());
                if let Some(backend) = &self.validation_backend {
                    validator.set_backend(Arc::clone(backend));
                }
                Arc::new(validator)
            }
            Protocol::Cas20 => Arc::new(
                self.wire_service_validator(Cas20ServiceTicketValidator::new(prefix_url), context),
            ),
            Protocol::Cas20Proxy => {
                let validator = self.with_proxy_policy(Cas20ProxyTicketValidator::new(prefix_url));
                Arc::new(self.wire_service_validator(validator, context))
            }
            Protocol::Cas30 => Arc::new(
                self.wire_service_validator(Cas30ServiceTicketValidator::new(prefix_url), context),
            ),
            Protocol::Cas30Proxy => {
                let validator = self.with_proxy_policy(Cas30ProxyTicketValidator::new(prefix_url));
                Arc::new(self.wire_service_validator(validator, context))
            }
            Protocol::Saml => {
                let mut validator = Saml11TicketValidator::new(prefix_url);
                validator.set_tolerance(self.time_tolerance);
                validator.set_encoding(self.encoding.clone());
                if let Some(backend) = &self.validation_backend {
                    validator.set_backend(Arc::clone(backend));
                }
                Arc::new(validator)
            }
        };
        Ok(validator)
    }

    fn with_proxy_policy<V: ProxyChainPolicy>(&self, mut validator: V) -> V {
        validator.set_accept_any_proxy(self.accept_any_proxy);
        validator.set_allowed_proxy_chains(self.allowed_proxy_chains.clone());
        validator
    }

    fn wire_service_validator<V: CasServiceValidator>(
        &self,
        mut validator: V,
        context: &dyn WebContext,
    ) -> V {
        validator.set_encoding(self.encoding.clone());
        if let Some(backend) = &self.validation_backend {
            validator.set_backend(Arc::clone(backend));
        }
        if let Some(receptor) = &self.proxy_receptor {
            validator.set_proxy_callback_url(receptor.compute_final_callback_url(context));
            validator.set_proxy_granting_ticket_storage(Arc::new(ProxyGrantingTicketStore::new(
                receptor.store(),
            )));
        }
        validator
    }

    /// Resolves `url` for the current request.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::Configuration`] when the URL resolver is
    /// missing.
    pub fn compute_final_url(
        &self,
        url: &str,
        context: &dyn WebContext,
    ) -> Result<String, ConfigurationError> {
        let resolver = self
            .url_resolver
            .as_ref()
            .ok_or_else(|| ConfigurationError::configuration(URL_RESOLVER_MISSING))?;
        Ok(resolver.compute(url, context))
    }

    /// Resolves the login URL for the current request.
    ///
    /// # Errors
    /// See [`CasConfiguration::compute_final_url`].
    pub fn compute_final_login_url(
        &self,
        context: &dyn WebContext,
    ) -> Result<String, ConfigurationError> {
        self.compute_final_url(&self.login_url().unwrap_or_default(), context)
    }

    /// Resolves the prefix URL for the current request.
    ///
    /// # Errors
    /// See [`CasConfiguration::compute_final_url`].
    pub fn compute_final_prefix_url(
        &self,
        context: &dyn WebContext,
    ) -> Result<String, ConfigurationError> {
        self.compute_final_url(&self.prefix_url().unwrap_or_default(), context)
    }

    /// Resolves the REST URL for the current request.
    ///
    /// # Errors
    /// See [`CasConfiguration::compute_final_url`].
    pub fn compute_final_rest_url(
        &self,
        context: &dyn WebContext,
    ) -> Result<String, ConfigurationError> {
        self.compute_final_url(&self.rest_url().unwrap_or_default(), context)
    }

    /// Builds the CAS login redirect for `service_url`, adding `renew` and
    /// `gateway` when configured.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::InvalidUrl`] when the final login URL is
    /// not absolute.
    pub fn compute_login_redirect_url(
        &self,
        service_url: &str,
        context: &dyn WebContext,
    ) -> Result<String, ConfigurationError> {
        let mut url = parse_absolute(&self.compute_final_login_url(context)?)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(SERVICE_PARAMETER, service_url);
            if self.renew {
                query.append_pair(RENEW_PARAMETER, "true");
            }
            if self.gateway {
                query.append_pair(GATEWAY_PARAMETER, "true");
            }
        }
        Ok(url.into())
    }

    /// Builds the CAS logout redirect, carrying `target_url` in the
    /// post-logout parameter when given.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::InvalidUrl`] when the final prefix URL
    /// is not absolute.
    pub fn compute_logout_redirect_url(
        &self,
        target_url: Option<&str>,
        context: &dyn WebContext,
    ) -> Result<String, ConfigurationError> {
        let prefix = self.compute_final_prefix_url(context)?;
        let mut url = parse_absolute(&format!("{}logout", with_trailing_slash(prefix)))?;
        if let Some(target) = target_url.filter(|target| !target.trim().is_empty()) {
            url.query_pairs_mut()
                .append_pair(&self.post_logout_url_parameter, target);
        }
        Ok(url.into())
    }

    /// Current URL triple (normalized once initialized).
    pub fn urls(&self) -> CasUrls {
        self.urls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn urls_mut(&mut self) -> &mut CasUrls {
        self.urls.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Expected validation response encoding.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Sets the expected validation response encoding.
    pub fn set_encoding(&mut self, encoding: impl Into<String>) {
        self.encoding = encoding.into();
    }

    /// CAS login URL.
    pub fn login_url(&self) -> Option<String> {
        self.urls().login_url
    }

    /// Sets the CAS login URL.
    pub fn set_login_url(&mut self, login_url: impl Into<String>) {
        self.urls_mut().login_url = Some(login_url.into());
    }

    /// CAS prefix URL.
    pub fn prefix_url(&self) -> Option<String> {
        self.urls().prefix_url
    }

    /// Sets the CAS prefix URL.
    pub fn set_prefix_url(&mut self, prefix_url: impl Into<String>) {
        self.urls_mut().prefix_url = Some(prefix_url.into());
    }

    /// CAS REST tickets URL.
    pub fn rest_url(&self) -> Option<String> {
        self.urls().rest_url
    }

    /// Sets the CAS REST tickets URL.
    pub fn set_rest_url(&mut self, rest_url: impl Into<String>) {
        self.urls_mut().rest_url = Some(rest_url.into());
    }

    /// SAML clock-skew tolerance in milliseconds.
    pub fn time_tolerance(&self) -> u64 {
        self.time_tolerance
    }

    /// Sets the SAML clock-skew tolerance in milliseconds.
    pub fn set_time_tolerance(&mut self, time_tolerance: u64) {
        self.time_tolerance = time_tolerance;
    }

    /// Configured protocol.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Sets the protocol.
    pub fn set_protocol(&mut self, protocol: Protocol) {
        self.protocol = protocol;
    }

    /// Sets the protocol from its tag name.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::Core`] for an unknown tag.
    pub fn set_protocol_tag(&mut self, tag: &str) -> Result<(), ConfigurationError> {
        self.protocol = tag.parse()?;
        Ok(())
    }

    /// Whether login redirects force re-authentication.
    pub fn is_renew(&self) -> bool {
        self.renew
    }

    /// Sets whether login redirects force re-authentication.
    pub fn set_renew(&mut self, renew: bool) {
        self.renew = renew;
    }

    /// Whether login redirects request a silent login.
    pub fn is_gateway(&self) -> bool {
        self.gateway
    }

    /// Sets whether login redirects request a silent login.
    pub fn set_gateway(&mut self, gateway: bool) {
        self.gateway = gateway;
    }

    /// Whether proxy validators accept any proxy chain.
    pub fn is_accept_any_proxy(&self) -> bool {
        self.accept_any_proxy
    }

    /// Sets whether proxy validators accept any proxy chain.
    pub fn set_accept_any_proxy(&mut self, accept_any_proxy: bool) {
        self.accept_any_proxy = accept_any_proxy;
    }

    /// Allowed proxy chains for proxy validators.
    pub fn allowed_proxy_chains(&self) -> &ProxyList {
        &self.allowed_proxy_chains
    }

    /// Sets the allowed proxy chains.
    pub fn set_allowed_proxy_chains(&mut self, allowed_proxy_chains: ProxyList) {
        self.allowed_proxy_chains = allowed_proxy_chains;
    }

    /// Logout handler (the default one is installed by `init`).
    pub fn logout_handler(&self) -> Option<Arc<dyn CasLogoutHandler>> {
        self.logout_handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sets the logout handler.
    pub fn set_logout_handler(&mut self, logout_handler: Arc<dyn CasLogoutHandler>) {
        *self
            .logout_handler
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner) = Some(logout_handler);
    }

    /// Caller-supplied validator overriding the factory.
    pub fn default_ticket_validator(&self) -> Option<&Arc<dyn TicketValidator>> {
        self.default_ticket_validator.as_ref()
    }

    /// Sets or clears the validator overriding the factory.
    pub fn set_default_ticket_validator(&mut self, validator: Option<Arc<dyn TicketValidator>>) {
        self.default_ticket_validator = validator;
    }

    /// Proxy-callback receptor.
    pub fn proxy_receptor(&self) -> Option<&Arc<dyn CasProxyReceptor>> {
        self.proxy_receptor.as_ref()
    }

    /// Sets or clears the proxy-callback receptor.
    pub fn set_proxy_receptor(&mut self, receptor: Option<Arc<dyn CasProxyReceptor>>) {
        self.proxy_receptor = receptor;
    }

    /// URL resolver.
    pub fn url_resolver(&self) -> Option<&Arc<dyn UrlResolver>> {
        self.url_resolver.as_ref()
    }

    /// Sets or clears the URL resolver. `init` fails without one.
    pub fn set_url_resolver(&mut self, url_resolver: Option<Arc<dyn UrlResolver>>) {
        self.url_resolver = url_resolver;
    }

    /// Query parameter carrying the post-logout URL.
    pub fn post_logout_url_parameter(&self) -> &str {
        &self.post_logout_url_parameter
    }

    /// Sets the query parameter carrying the post-logout URL.
    pub fn set_post_logout_url_parameter(&mut self, parameter: impl Into<String>) {
        self.post_logout_url_parameter = parameter.into();
    }

    /// Backend handed to every built validator.
    pub fn validation_backend(&self) -> Option<&Arc<dyn ValidationBackend>> {
        self.validation_backend.as_ref()
    }

    /// Sets or clears the backend handed to every built validator.
    pub fn set_validation_backend(&mut self, backend: Option<Arc<dyn ValidationBackend>>) {
        self.validation_backend = backend;
    }
}

impl Default for CasConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_absolute(raw: &str) -> Result<Url, ConfigurationError> {
    Url::parse(raw).map_err(|error| ConfigurationError::InvalidUrl {
        url: raw.to_string(),
        reason: error.to_string(),
    })
}

struct Shown<'a, T: fmt::Display>(&'a Option<T>);

impl<T: fmt::Display> fmt::Display for Shown<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => fmt::Display::fmt(value, f),
            None => f.write_str("none"),
        }
    }
}

struct Described<'a, T: fmt::Debug + ?Sized>(Option<&'a T>);

impl<T: fmt::Debug + ?Sized> fmt::Display for Described<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value:?}"),
            None => f.write_str("none"),
        }
    }
}

impl fmt::Display for CasConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let urls = self.urls();
        let logout_handler = self.logout_handler();
        write!(
            f,
            "#CasConfiguration# | loginUrl: {} | prefixUrl: {} | restUrl: {} | protocol: {} | \
             renew: {} | gateway: {} | encoding: {} | logoutHandler: {} | acceptAnyProxy: {} | \
             allowedProxyChains: {} | proxyReceptor: {} | timeTolerance: {} | \
             postLogoutUrlParameter: {} | defaultTicketValidator: {} | urlResolver: {} |",
            Shown(&urls.login_url),
            Shown(&urls.prefix_url),
            Shown(&urls.rest_url),
            self.protocol,
            self.renew,
            self.gateway,
            self.encoding,
            Described(logout_handler.as_deref()),
            self.accept_any_proxy,
            self.allowed_proxy_chains,
            Described(self.proxy_receptor.as_deref()),
            self.time_tolerance,
            self.post_logout_url_parameter,
            Described(self.default_ticket_validator.as_deref()),
            Described(self.url_resolver.as_deref()),
        )
    }
}

impl fmt::Debug for CasConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CasConfiguration")
            .field("urls", &self.urls())
            .field("protocol", &self.protocol)
            .field("encoding", &self.encoding)
            .field("initialized", &self.initialized.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

/// Errors raised by the configuration layer.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Contract violation detected by the configuration.
    #[error("{0}")]
    Configuration(String),
    /// Vocabulary parsing failure (unknown protocol tag).
    #[error(transparent)]
    Core(#[from] CoreError),
    /// Configured URL is not absolute.
    #[error("invalid url {url}: {reason}")]
    InvalidUrl {
        /// Offending URL.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// Settings document could not be decoded or encoded.
    #[error("invalid settings document: {0}")]
    Settings(#[source] serde_json::Error),
    /// Settings file could not be read.
    #[error("cannot read settings file {}: {source}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
}

impl ConfigurationError {
    fn configuration(message: &str) -> Self {
        ConfigurationError::Configuration(message.to_string())
    }
}
