#![warn(missing_docs)]
//! # cas-client-logout
//!
//! ## Purpose
//! Implements single-logout bookkeeping for CAS: remembering which session a
//! service ticket opened, and destroying that session when the CAS server
//! (back channel) or the browser (front channel) asks for it.
//!
//! ## Responsibilities
//! - Define the [`CasLogoutHandler`] capability the configuration holds.
//! - Provide [`DefaultCasLogoutHandler`], a process-wide in-memory mapping
//!   from ticket to session id.
//! - Recognize logout requests and extract their `SessionIndex`.
//!
//! ## Data flow
//! Ticket validated -> [`CasLogoutHandler::record_session`] -> ... -> CAS
//! server posts `logoutRequest` -> [`extract_session_index`] ->
//! [`CasLogoutHandler::destroy_session_back`] -> session destroyed through
//! the [`WebContext`].
//!
//! ## Ownership and lifetimes
//! The mapping owns copies of tickets and session ids; contexts are only
//! borrowed per call.
//!
//! ## Error model
//! Logout is best effort: unknown tickets are ignored and reported through
//! logs, never as errors.
//!
//! ## Security and privacy notes
//! Tickets and session ids are logged only as fingerprints.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use cas_client_core::{LOGOUT_REQUEST_PARAMETER, SESSION_INDEX_TAG, WebContext, fingerprint};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::debug;

/// Session-indexed logout bookkeeping.
pub trait CasLogoutHandler: Send + Sync + fmt::Debug {
    /// Associates `ticket` with the current session.
    fn record_session(&self, context: &dyn WebContext, ticket: &str);

    /// Front-channel logout: destroys the current session and forgets the
    /// ticket.
    fn destroy_session_front(&self, context: &dyn WebContext, ticket: &str);

    /// Back-channel logout: destroys the session recorded for `ticket`.
    fn destroy_session_back(&self, context: &dyn WebContext, ticket: &str);

    /// Moves the ticket recorded for `old_session_id` to the current session.
    fn renew_session(&self, old_session_id: &str, context: &dyn WebContext);
}

/// In-memory [`CasLogoutHandler`] keyed by ticket.
#[derive(Default)]
pub struct DefaultCasLogoutHandler {
    sessions: RwLock<HashMap<String, String>>,
}

impl DefaultCasLogoutHandler {
    /// Creates a handler with no recorded sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session id recorded for `ticket`.
    pub fn session_for_ticket(&self, ticket: &str) -> Option<String> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(ticket)
            .cloned()
    }

    /// Returns the number of recorded tickets.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when no ticket is recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn forget(&self, ticket: &str) -> Option<String> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(ticket)
    }
}

impl fmt::Debug for DefaultCasLogoutHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultCasLogoutHandler")
            .field("recorded", &self.len())
            .finish()
    }
}

impl CasLogoutHandler for DefaultCasLogoutHandler {
    fn record_session(&self, context: &dyn WebContext, ticket: &str) {
        let Some(session_id) = context.session_id() else {
            debug!(ticket = %fingerprint(ticket), "No session to record for ticket");
            return;
        };

        debug!(
            ticket = %fingerprint(ticket),
            session = %fingerprint(&session_id),
            "Recording CAS session"
        );
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ticket.to_string(), session_id);
    }

    fn destroy_session_front(&self, context: &dyn WebContext, ticket: &str) {
        self.forget(ticket);
        let destroyed = context.destroy_session();
        debug!(
            ticket = %fingerprint(ticket),
            destroyed,
            "Front-channel logout"
        );
    }

    fn destroy_session_back(&self, context: &dyn WebContext, ticket: &str) {
        match self.forget(ticket) {
            Some(session_id) => {
                let destroyed = context.destroy_session_by_id(&session_id);
                debug!(
                    ticket = %fingerprint(ticket),
                    session = %fingerprint(&session_id),
                    destroyed,
                    "Back-channel logout"
                );
            }
            None => debug!(
                ticket = %fingerprint(ticket),
                "Back-channel logout for unknown ticket"
            ),
        }
    }

    fn renew_session(&self, old_session_id: &str, context: &dyn WebContext) {
        let Some(new_session_id) = context.session_id() else {
            return;
        };

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        for session_id in sessions.values_mut() {
            if session_id == old_session_id {
                *session_id = new_session_id.clone();
            }
        }
        debug!(
            old_session = %fingerprint(old_session_id),
            new_session = %fingerprint(&new_session_id),
            "Renewed CAS session"
        );
    }
}

/// Returns `true` for a CAS server logout notification (POST with a
/// `logoutRequest` parameter).
pub fn is_back_channel_logout(context: &dyn WebContext) -> bool {
    context.request_method().eq_ignore_ascii_case("POST")
        && context.request_parameter(LOGOUT_REQUEST_PARAMETER).is_some()
}

/// Returns `true` for a browser-relayed logout (GET with a `logoutRequest`
/// parameter). Decompressing its payload is left to the framework.
pub fn is_front_channel_logout(context: &dyn WebContext) -> bool {
    context.request_method().eq_ignore_ascii_case("GET")
        && context.request_parameter(LOGOUT_REQUEST_PARAMETER).is_some()
}

/// Extracts the ticket named by the first non-empty `SessionIndex` element
/// of a SAML logout request, matching the local name so any namespace prefix
/// is accepted. Returns `None` for malformed XML.
pub fn extract_session_index(logout_request: &str) -> Option<String> {
    let mut reader = Reader::from_str(logout_request);
    let mut inside = false;
    let mut value = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                inside = start.local_name().as_ref() == SESSION_INDEX_TAG.as_bytes();
                value.clear();
            }
            Ok(Event::Text(text)) if inside => match text.unescape() {
                Ok(unescaped) => value.push_str(&unescaped),
                Err(error) => {
                    debug!(%error, "Cannot unescape SessionIndex text");
                    return None;
                }
            },
            Ok(Event::CData(data)) if inside => {
                value.push_str(&String::from_utf8_lossy(&data.into_inner()));
            }
            Ok(Event::End(_)) if inside => {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
                inside = false;
            }
            Ok(Event::Eof) => return None,
            Err(error) => {
                debug!(
                    %error,
                    position = reader.error_position(),
                    "Malformed logout request"
                );
                return None;
            }
            _ => {}
        }
    }
}
