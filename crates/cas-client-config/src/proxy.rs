//! Proxy-callback integration: the receptor endpoint the CAS server delivers
//! proxy-granting tickets to, and the adapter exposing its store to
//! validators.

use std::fmt;
use std::sync::Arc;

use cas_client_core::{
    DefaultUrlResolver, PGT_ID_PARAMETER, PGT_IOU_PARAMETER, TicketStore, UrlResolver, WebContext,
    fingerprint,
};
use cas_client_validation::ProxyGrantingTicketStorage;
use tracing::debug;

/// Proxy-callback endpoint a configuration reads from on demand.
pub trait CasProxyReceptor: Send + Sync + fmt::Debug {
    /// Final absolute callback URL for the current request.
    fn compute_final_callback_url(&self, context: &dyn WebContext) -> String;

    /// Store the callback writes `PGT-IOU -> PGT` pairs into.
    fn store(&self) -> Arc<dyn TicketStore>;
}

/// Outcome of one proxy callback request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyCallbackOutcome {
    /// Both parameters were present and the pair was stored.
    Stored,
    /// The CAS server probed the callback without a ticket pair.
    MissingParameters,
}

/// [`CasProxyReceptor`] writing callbacks into a [`TicketStore`].
#[derive(Debug, Clone)]
pub struct StoreProxyReceptor {
    callback_url: String,
    store: Arc<dyn TicketStore>,
    url_resolver: Arc<dyn UrlResolver>,
}

impl StoreProxyReceptor {
    /// Creates a receptor answering at `callback_url`.
    pub fn new(callback_url: impl Into<String>, store: Arc<dyn TicketStore>) -> Self {
        Self {
            callback_url: callback_url.into(),
            store,
            url_resolver: Arc::new(DefaultUrlResolver::new()),
        }
    }

    /// Replaces the resolver used to compute the final callback URL.
    pub fn set_url_resolver(&mut self, url_resolver: Arc<dyn UrlResolver>) {
        self.url_resolver = url_resolver;
    }

    /// Configured (unresolved) callback URL.
    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    /// Handles a callback request from the CAS server, storing the
    /// `pgtIou -> pgtId` pair it carries.
    pub fn handle_callback(&self, context: &dyn WebContext) -> ProxyCallbackOutcome {
        let iou = context.request_parameter(PGT_IOU_PARAMETER);
        let pgt = context.request_parameter(PGT_ID_PARAMETER);

        match (iou, pgt) {
            (Some(iou), Some(pgt)) if !iou.trim().is_empty() && !pgt.trim().is_empty() => {
                debug!(pgt_iou = %fingerprint(&iou), "Stored proxy-granting ticket");
                self.store.set(&iou, pgt);
                ProxyCallbackOutcome::Stored
            }
            _ => ProxyCallbackOutcome::MissingParameters,
        }
    }
}

impl CasProxyReceptor for StoreProxyReceptor {
    fn compute_final_callback_url(&self, context: &dyn WebContext) -> String {
        self.url_resolver.compute(&self.callback_url, context)
    }

    fn store(&self) -> Arc<dyn TicketStore> {
        Arc::clone(&self.store)
    }
}

/// Presents a framework [`TicketStore`] as validator PGT storage.
#[derive(Debug, Clone)]
pub struct ProxyGrantingTicketStore {
    store: Arc<dyn TicketStore>,
}

impl ProxyGrantingTicketStore {
    /// Wraps `store` without copying its content.
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    /// Wrapped store.
    pub fn store(&self) -> &Arc<dyn TicketStore> {
        &self.store
    }
}

impl ProxyGrantingTicketStorage for ProxyGrantingTicketStore {
    fn save(&self, proxy_granting_ticket_iou: &str, proxy_granting_ticket: &str) {
        self.store
            .set(proxy_granting_ticket_iou, proxy_granting_ticket.to_string());
    }

    fn retrieve(&self, proxy_granting_ticket_iou: &str) -> Option<String> {
        self.store.get(proxy_granting_ticket_iou)
    }

    // Expiry belongs to the wrapped store.
    fn clean_up(&self) {}
}
